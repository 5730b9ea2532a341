use crate::loss::calculator::ErrorCalculator;
use crate::network::Values;

/// Mean squared error, reported as a per-example share.
///
/// Each example contributes `sum((expected - actual)^2) / 2 / size`, so after
/// `size` presentations the aggregated value is the epoch's mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MseErrorCalculator {
    size: f64,
}

impl MseErrorCalculator {
    pub fn new(size: usize) -> MseErrorCalculator {
        MseErrorCalculator { size: size.max(1) as f64 }
    }
}

impl ErrorCalculator for MseErrorCalculator {
    fn calculate(&self, expected: &Values, actual: &Values) -> f64 {
        actual.iter()
            .filter_map(|(name, a)| expected.get(name).map(|e| (e - a).powi(2) / 2.0))
            .sum::<f64>() / self.size
    }

    fn default_name(&self) -> &str {
        "MSE"
    }
}
