/// Result of delivering one value to a fan-in point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// Slot already satisfied this tick; the value was dropped.
    Duplicate,
    /// Recorded, but other slots are still outstanding.
    Waiting,
    /// Recorded, and it was the last outstanding slot. The set is disarmed.
    Complete,
}

/// Per-tick synchronization set over a node's incoming slots.
///
/// Unarmed until the first arrival of a tick, then a bitset of satisfied
/// slots plus a countdown of the ones still missing. Reaching zero disarms
/// the set so nothing carries into the next tick.
#[derive(Debug, Clone, Default)]
pub struct FanIn {
    seen: Option<Vec<bool>>,
    remaining: usize,
}

impl FanIn {
    pub fn is_armed(&self) -> bool {
        self.seen.is_some()
    }

    /// Slots still outstanding, or `None` when unarmed.
    pub fn remaining(&self) -> Option<usize> {
        self.seen.as_ref().map(|_| self.remaining)
    }

    /// Marks `slot` of a `degree`-wide set as arrived.
    pub fn arrive(&mut self, degree: usize, slot: usize) -> Arrival {
        let needs_arming = self.seen.as_ref().map_or(true, |seen| seen.len() != degree);
        if needs_arming {
            self.seen = Some(vec![false; degree]);
            self.remaining = degree;
        }
        let Some(seen) = self.seen.as_mut() else {
            return Arrival::Duplicate;
        };

        if slot >= degree || seen[slot] {
            return Arrival::Duplicate;
        }
        seen[slot] = true;
        self.remaining -= 1;

        if self.remaining == 0 {
            self.disarm();
            Arrival::Complete
        } else {
            Arrival::Waiting
        }
    }

    pub fn disarm(&mut self) {
        self.seen = None;
        self.remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_once_every_slot_arrived() {
        let mut fan_in = FanIn::default();
        assert!(!fan_in.is_armed());

        assert_eq!(fan_in.arrive(3, 2), Arrival::Waiting);
        assert_eq!(fan_in.remaining(), Some(2));
        assert_eq!(fan_in.arrive(3, 0), Arrival::Waiting);
        assert_eq!(fan_in.arrive(3, 1), Arrival::Complete);
        assert!(!fan_in.is_armed());
    }

    #[test]
    fn repeated_slot_is_ignored() {
        let mut fan_in = FanIn::default();
        assert_eq!(fan_in.arrive(2, 0), Arrival::Waiting);
        assert_eq!(fan_in.arrive(2, 0), Arrival::Duplicate);
        assert_eq!(fan_in.remaining(), Some(1));
        assert_eq!(fan_in.arrive(2, 1), Arrival::Complete);
    }

    #[test]
    fn single_slot_completes_immediately() {
        let mut fan_in = FanIn::default();
        assert_eq!(fan_in.arrive(1, 0), Arrival::Complete);
        // next tick re-arms from scratch
        assert_eq!(fan_in.arrive(1, 0), Arrival::Complete);
    }
}
