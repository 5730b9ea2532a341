use std::cell::RefCell;
use std::rc::Rc;

use crate::network::Network;
use crate::train::trainer::Trainer;

/// What an observer sees at each notification point: the trainer (to read
/// errors or request termination) and the network being trained.
pub struct EpochEvent<'a> {
    pub trainer: &'a mut Trainer,
    pub network: &'a Network,
}

/// Hooks called by the trainer at the four points of its loop.
///
/// Every hook defaults to doing nothing, so an observer implements only the
/// points it cares about.
pub trait EpochObserver {
    /// Once, before the first epoch.
    fn start_training(&mut self, _event: &mut EpochEvent<'_>) {}

    /// After every example's forward and backward pass.
    fn end_presentation(&mut self, _event: &mut EpochEvent<'_>) {}

    /// After the epoch counter moves, while the epoch's errors are readable
    /// and before weights change.
    fn end_epoch(&mut self, _event: &mut EpochEvent<'_>) {}

    /// After the weights have been updated.
    fn post_update(&mut self, _event: &mut EpochEvent<'_>) {}

    /// Whether this observer may call `request_termination`. While at least
    /// one registered observer says yes, the trainer ignores its hard cap.
    fn requests_termination(&self) -> bool {
        false
    }
}

/// Lets a caller keep a handle on an observer the trainer owns.
impl<O: EpochObserver> EpochObserver for Rc<RefCell<O>> {
    fn start_training(&mut self, event: &mut EpochEvent<'_>) {
        self.borrow_mut().start_training(event);
    }

    fn end_presentation(&mut self, event: &mut EpochEvent<'_>) {
        self.borrow_mut().end_presentation(event);
    }

    fn end_epoch(&mut self, event: &mut EpochEvent<'_>) {
        self.borrow_mut().end_epoch(event);
    }

    fn post_update(&mut self, event: &mut EpochEvent<'_>) {
        self.borrow_mut().post_update(event);
    }

    fn requests_termination(&self) -> bool {
        self.borrow().requests_termination()
    }
}
