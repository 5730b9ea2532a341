use crate::network::Values;

/// Per-example error contribution. An epoch's error is the sum of the
/// contributions of every example presented in it.
pub trait ErrorCalculator {
    fn calculate(&self, expected: &Values, actual: &Values) -> f64;

    /// Name used when the calculator is registered without one.
    fn default_name(&self) -> &str;
}
