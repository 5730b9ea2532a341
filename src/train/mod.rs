pub mod epoch_stats;
pub mod gradient;
pub mod listeners;
pub mod observer;
pub mod pocket;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::EpochStats;
pub use gradient::GradientAccumulator;
pub use listeners::{EpochLimit, StopOnError};
pub use observer::{EpochEvent, EpochObserver};
pub use pocket::Pocket;
pub use train_config::{SampleOrder, TrainConfig};
pub use trainer::{Trainer, TrainerState};
