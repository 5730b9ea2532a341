use std::collections::BTreeMap;

use crate::data::Dataset;
use crate::error::TrainingError;
use crate::loss::aggregator::ErrorAggregator;
use crate::loss::calculator::ErrorCalculator;
use crate::network::Network;

/// Scores a network over a dataset without training it.
///
/// Runs forward only; no feedback is sent and no accumulator moves.
#[derive(Debug, Default)]
pub struct Evaluator {
    errors: ErrorAggregator,
}

impl Evaluator {
    pub fn new() -> Evaluator {
        Evaluator::default()
    }

    pub fn add(&mut self, calculator: Box<dyn ErrorCalculator>) {
        self.errors.add(calculator);
    }

    pub fn add_named(&mut self, name: impl Into<String>, calculator: Box<dyn ErrorCalculator>) {
        self.errors.add_named(name, calculator);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.errors.get(name)
    }

    /// Summed error per calculator over every example in `examples`.
    ///
    /// A dataset that reports more examples than it yields fails with
    /// `MissingExample`; a failed forward pass is wrapped with its index.
    /// Either way the network is left without a pending pass.
    pub fn evaluate<D: Dataset + ?Sized>(
        &mut self,
        network: &mut Network,
        examples: &D,
    ) -> Result<BTreeMap<String, f64>, TrainingError> {
        self.errors.clear();
        let outcome = self.score(network, examples);
        // leave the network as if no pass had happened
        network.reset_tick();
        outcome.map(|()| self.errors.snapshot())
    }

    fn score<D: Dataset + ?Sized>(
        &mut self,
        network: &mut Network,
        examples: &D,
    ) -> Result<(), TrainingError> {
        for index in 0..examples.len() {
            let example = examples.get(index).ok_or(TrainingError::MissingExample(index))?;
            let actual = network
                .forward(&example.inputs)
                .map_err(|source| TrainingError::Evaluation { index, source })?;
            self.errors.accumulate(&example.expected, &actual);
        }
        Ok(())
    }
}
