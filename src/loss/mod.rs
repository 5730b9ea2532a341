pub mod aggregator;
pub mod calculator;
pub mod classification;
pub mod evaluator;
pub mod loss_type;
pub mod mae;
pub mod mse;

pub use aggregator::ErrorAggregator;
pub use calculator::ErrorCalculator;
pub use classification::ClassificationErrorCalculator;
pub use evaluator::Evaluator;
pub use loss_type::LossType;
pub use mae::MaeErrorCalculator;
pub use mse::MseErrorCalculator;
