use crate::loss::calculator::ErrorCalculator;
use crate::network::Values;

/// Mean absolute error share: `sum(|expected - actual|) / size` per example.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaeErrorCalculator {
    size: f64,
}

impl MaeErrorCalculator {
    pub fn new(size: usize) -> MaeErrorCalculator {
        MaeErrorCalculator { size: size.max(1) as f64 }
    }
}

impl ErrorCalculator for MaeErrorCalculator {
    fn calculate(&self, expected: &Values, actual: &Values) -> f64 {
        actual.iter()
            .filter_map(|(name, a)| expected.get(name).map(|e| (e - a).abs()))
            .sum::<f64>() / self.size
    }

    fn default_name(&self) -> &str {
        "MAE"
    }
}
