pub mod example;
pub mod scaler;

pub use example::{Dataset, Example, ExampleSet};
pub use scaler::{KClassTranslator, NMinusOneClassTranslator, RangeScaler};
