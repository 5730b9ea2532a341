use log::debug;

use crate::network::Network;
use crate::train::observer::{EpochEvent, EpochObserver};

/// Keeps a copy of the best network seen so far.
///
/// At the end of every epoch the named error is compared against the best
/// recorded one; a strictly lower error replaces the pocket's contents with a
/// clone of the network as it was when that error was measured, i.e. before
/// the epoch's weight update.
#[derive(Debug, Clone)]
pub struct Pocket {
    error_name: String,
    best: Option<Pocketed>,
}

#[derive(Debug, Clone)]
struct Pocketed {
    network: Network,
    epoch: usize,
    error: f64,
}

impl Pocket {
    pub fn new(error_name: impl Into<String>) -> Pocket {
        Pocket { error_name: error_name.into(), best: None }
    }

    pub fn error_name(&self) -> &str {
        &self.error_name
    }

    /// The best network so far, if any epoch has completed.
    pub fn contents(&self) -> Option<&Network> {
        self.best.as_ref().map(|b| &b.network)
    }

    /// Takes the pocketed network, leaving the pocket empty.
    pub fn take(&mut self) -> Option<Network> {
        self.best.take().map(|b| b.network)
    }

    pub fn last_update_epoch(&self) -> Option<usize> {
        self.best.as_ref().map(|b| b.epoch)
    }

    /// Error of the pocketed network; `f64::MAX` while empty.
    pub fn last_update_error(&self) -> f64 {
        self.best.as_ref().map_or(f64::MAX, |b| b.error)
    }
}

impl EpochObserver for Pocket {
    fn end_epoch(&mut self, event: &mut EpochEvent<'_>) {
        let Some(error) = event.trainer.errors().get(&self.error_name) else {
            return;
        };
        if error < self.last_update_error() {
            let epoch = event.trainer.epoch_count();
            debug!("pocketing network from epoch {} ({} = {})", epoch, self.error_name, error);
            self.best = Some(Pocketed { network: event.network.clone(), epoch, error });
        }
    }
}
