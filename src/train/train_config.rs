use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use serde::{Serialize, Deserialize};

use crate::error::ConfigError;
use crate::loss::LossType;
use crate::train::epoch_stats::EpochStats;

/// How the trainer picks the next example within an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOrder {
    /// Uniformly at random, with replacement.
    #[default]
    Random,
    /// Cycle through the set in index order.
    Sequential,
}

/// Configuration for a `Trainer` run.
///
/// # Fields
/// - `learning_rate`: step size applied to the epoch's summed partials
/// - `momentum`:      fraction of the previous epoch's weight delta carried over
/// - `epoch_size`:    presentations per epoch; `None` means one per example
/// - `hard_max`:      epoch cap used when no observer can request termination
/// - `seed`:          seeds example selection; entropy when `None`
/// - `sample_order`:  random (default) or sequential presentation
/// - `default_error`: calculator registered when none was added explicitly
/// - `progress_tx`:   optional channel sender; one `EpochStats` is sent per
///                    completed epoch.  If the receiver is dropped training
///                    stops at that epoch boundary.
/// - `stop_flag`:     optional atomic flag; when set to `true` from another
///                    thread training stops at the next epoch boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub momentum: f64,
    pub epoch_size: Option<usize>,
    pub hard_max: usize,
    pub seed: Option<u64>,
    pub sample_order: SampleOrder,
    pub default_error: LossType,
    #[serde(skip)]
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    #[serde(skip)]
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 0.20,
            momentum: 0.0,
            epoch_size: None,
            hard_max: 10_000,
            seed: None,
            sample_order: SampleOrder::Random,
            default_error: LossType::Mse,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

impl TrainConfig {
    /// Creates a `TrainConfig` with no progress channel and no stop flag.
    pub fn new(learning_rate: f64, momentum: f64) -> Self {
        TrainConfig { learning_rate, momentum, ..TrainConfig::default() }
    }

    pub fn with_hard_max(mut self, hard_max: usize) -> Self {
        self.hard_max = hard_max;
        self
    }

    pub fn with_epoch_size(mut self, epoch_size: usize) -> Self {
        self.epoch_size = Some(epoch_size);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_sample_order(mut self, order: SampleOrder) -> Self {
        self.sample_order = order;
        self
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config; absent fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<TrainConfig, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_takes_defaults() {
        let config: TrainConfig =
            serde_json::from_str(r#"{ "learning_rate": 0.5, "sample_order": "sequential" }"#).unwrap();
        assert_eq!(config.learning_rate, 0.5);
        assert_eq!(config.momentum, 0.0);
        assert_eq!(config.hard_max, 10_000);
        assert_eq!(config.sample_order, SampleOrder::Sequential);
        assert_eq!(config.default_error, LossType::Mse);
        assert!(config.progress_tx.is_none());
    }

    #[test]
    fn json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("ferrite-graph-config-{}.json", std::process::id()));
        let config = TrainConfig::new(0.3, 0.9).with_hard_max(12).with_seed(4);
        config.save_json(&path).unwrap();
        let loaded = TrainConfig::load_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.learning_rate, 0.3);
        assert_eq!(loaded.momentum, 0.9);
        assert_eq!(loaded.hard_max, 12);
        assert_eq!(loaded.seed, Some(4));
    }
}
