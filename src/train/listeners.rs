use log::info;

use crate::train::observer::{EpochEvent, EpochObserver};

/// Ends training once a named error falls below a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct StopOnError {
    pub error_name: String,
    pub threshold: f64,
}

impl StopOnError {
    pub fn new(error_name: impl Into<String>, threshold: f64) -> StopOnError {
        StopOnError { error_name: error_name.into(), threshold }
    }
}

impl EpochObserver for StopOnError {
    fn end_epoch(&mut self, event: &mut EpochEvent<'_>) {
        let Some(error) = event.trainer.errors().get(&self.error_name) else {
            return;
        };
        if error < self.threshold {
            info!(
                "{} = {} below {} at epoch {}; stopping",
                self.error_name,
                error,
                self.threshold,
                event.trainer.epoch_count()
            );
            event.trainer.request_termination();
        }
    }

    fn requests_termination(&self) -> bool {
        true
    }
}

/// Ends training after a fixed number of epochs.
///
/// Registering any terminating observer turns the trainer's own hard cap
/// off, so pair this with observers like `StopOnError` to keep a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochLimit(pub usize);

impl EpochObserver for EpochLimit {
    fn end_epoch(&mut self, event: &mut EpochEvent<'_>) {
        if event.trainer.epoch_count() >= self.0 {
            event.trainer.request_termination();
        }
    }

    fn requests_termination(&self) -> bool {
        true
    }
}
