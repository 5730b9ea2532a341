use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `Trainer::train`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the trainer
/// sends one `EpochStats` value after the end-epoch observers have run and
/// before the weights are updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Every registered error, by name, summed over the epoch.
    pub errors: BTreeMap<String, f64>,
    /// Wall-clock duration of the epoch's presentations in milliseconds.
    pub elapsed_ms: u64,
}
