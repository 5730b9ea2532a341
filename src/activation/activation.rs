use serde::{Serialize, Deserialize};
use std::fmt;

/// Element-wise transfer function applied to a node's weighted sum.
///
/// Both `function` and `derivative` take the raw (pre-activation) value;
/// nodes keep that value around after firing so the backward pass can ask
/// for the slope at the same point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    Identity,
    ReLU,
    LeakyReLU { alpha: f64 },
}

impl Default for ActivationFunction {
    fn default() -> Self {
        ActivationFunction::Sigmoid
    }
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Identity => x,
            ActivationFunction::ReLU => x.max(0.0),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    pub fn derivative(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::Identity => 1.0,
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { alpha },
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Hands out an activation function for every node a network creates.
///
/// A network asks its factory once per node, at the time the node is added,
/// so swapping the factory only affects nodes added afterwards.
pub trait ActivationFactory: fmt::Debug + Send + Sync {
    fn make(&self) -> ActivationFunction;
}

/// Every function is its own factory.
impl ActivationFactory for ActivationFunction {
    fn make(&self) -> ActivationFunction {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sigmoid_at_half() {
        let f = ActivationFunction::Sigmoid;
        assert_abs_diff_eq!(f.function(0.5), 0.622_459_3, epsilon = 1e-6);
        assert_abs_diff_eq!(f.derivative(0.5), 0.235_003_7, epsilon = 1e-6);
    }

    #[test]
    fn sigmoid_derivative_peaks_at_zero() {
        let f = ActivationFunction::Sigmoid;
        assert_abs_diff_eq!(f.derivative(0.0), 0.25, epsilon = 1e-12);
        assert!(f.derivative(3.0) < f.derivative(0.0));
        assert!(f.derivative(-3.0) < f.derivative(0.0));
    }

    #[test]
    fn piecewise_functions() {
        let relu = ActivationFunction::ReLU;
        assert_eq!(relu.function(-2.0), 0.0);
        assert_eq!(relu.derivative(3.0), 1.0);

        let leaky = ActivationFunction::LeakyReLU { alpha: 0.1 };
        assert_abs_diff_eq!(leaky.function(-2.0), -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(leaky.derivative(-2.0), 0.1, epsilon = 1e-12);

        assert_abs_diff_eq!(ActivationFunction::Tanh.derivative(0.0), 1.0, epsilon = 1e-12);
        assert_eq!(ActivationFunction::Identity.derivative(42.0), 1.0);
    }

    #[test]
    fn function_is_its_own_factory() {
        let factory: &dyn ActivationFactory = &ActivationFunction::Tanh;
        assert_eq!(factory.make(), ActivationFunction::Tanh);
    }
}
