use serde::{Serialize, Deserialize};

use crate::loss::calculator::ErrorCalculator;
use crate::loss::classification::ClassificationErrorCalculator;
use crate::loss::mae::MaeErrorCalculator;
use crate::loss::mse::MseErrorCalculator;

/// Selects an error calculator from configuration.
///
/// - `Mse`:            half squared error averaged over the epoch
/// - `Mae`:            absolute error averaged over the epoch
/// - `Classification`: count of misclassified examples (one-hot outputs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    Mse,
    Mae,
    Classification,
}

impl LossType {
    /// Builds the calculator; `size` is the number of presentations it will
    /// be averaged over.
    pub fn calculator(self, size: usize) -> Box<dyn ErrorCalculator> {
        match self {
            LossType::Mse => Box::new(MseErrorCalculator::new(size)),
            LossType::Mae => Box::new(MaeErrorCalculator::new(size)),
            LossType::Classification => Box::new(ClassificationErrorCalculator),
        }
    }
}
