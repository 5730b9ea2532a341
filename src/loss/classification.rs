use crate::loss::calculator::ErrorCalculator;
use crate::network::Values;

/// 0/1 classification error over one-hot outputs.
///
/// An output "indicates" its class when it rounds to 1.0, with ties going to
/// the even neighbour so 0.5 indicates nothing. The example counts
/// as an error (1.0) when the actual outputs indicate more than one class or
/// a different class than the expected values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationErrorCalculator;

impl ClassificationErrorCalculator {
    fn class_of(values: &Values) -> Option<&str> {
        values.iter()
            .filter(|(_, v)| v.round_ties_even() == 1.0)
            .map(|(name, _)| name.as_str())
            .last()
    }

    fn indicated(values: &Values) -> usize {
        values.values().filter(|v| v.round_ties_even() == 1.0).count()
    }
}

impl ErrorCalculator for ClassificationErrorCalculator {
    fn calculate(&self, expected: &Values, actual: &Values) -> f64 {
        if Self::indicated(actual) > 1 || Self::class_of(expected) != Self::class_of(actual) {
            1.0
        } else {
            0.0
        }
    }

    fn default_name(&self) -> &str {
        "ClassError"
    }
}
