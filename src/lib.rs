pub mod activation;
pub mod data;
pub mod error;
pub mod loss;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::ActivationFunction;
pub use data::{Dataset, Example, ExampleSet};
pub use error::{ConfigError, DataError, NetworkError, TrainingError};
pub use loss::{ErrorCalculator, Evaluator, LossType, MseErrorCalculator};
pub use network::{Network, NetworkBuilder, TraversalOrder, Values};
pub use train::{EpochLimit, EpochObserver, Pocket, StopOnError, TrainConfig, Trainer};
