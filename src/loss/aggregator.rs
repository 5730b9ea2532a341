use std::collections::BTreeMap;

use crate::loss::calculator::ErrorCalculator;
use crate::network::Values;

/// Sums every registered calculator's contribution over an epoch.
///
/// All calculators see every example; values are read by name and cleared
/// by the trainer once the epoch's observers have run.
#[derive(Default)]
pub struct ErrorAggregator {
    calculators: BTreeMap<String, Box<dyn ErrorCalculator>>,
    values: BTreeMap<String, f64>,
}

impl ErrorAggregator {
    pub fn new() -> ErrorAggregator {
        ErrorAggregator::default()
    }

    /// Registers `calculator` under its default name.
    pub fn add(&mut self, calculator: Box<dyn ErrorCalculator>) {
        let name = calculator.default_name().to_string();
        self.add_named(name, calculator);
    }

    /// Registers `calculator` under `name`, replacing any calculator already
    /// registered there.
    pub fn add_named(&mut self, name: impl Into<String>, calculator: Box<dyn ErrorCalculator>) {
        let name = name.into();
        self.values.insert(name.clone(), 0.0);
        self.calculators.insert(name, calculator);
    }

    pub fn accumulate(&mut self, expected: &Values, actual: &Values) {
        for (name, calculator) in &self.calculators {
            let contribution = calculator.calculate(expected, actual);
            *self.values.entry(name.clone()).or_insert(0.0) += contribution;
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.calculators.keys().map(String::as_str)
    }

    /// Current value of every error, by name.
    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.values.clone()
    }

    /// Zeroes every value; registrations are kept.
    pub fn clear(&mut self) {
        self.values.values_mut().for_each(|v| *v = 0.0);
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }
}

impl std::fmt::Debug for ErrorAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorAggregator").field("values", &self.values).finish()
    }
}
