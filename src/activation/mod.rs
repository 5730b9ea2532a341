pub mod activation;

pub use activation::{ActivationFactory, ActivationFunction};
