use std::fmt;
use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::Dataset;
use crate::error::TrainingError;
use crate::loss::{ErrorAggregator, ErrorCalculator};
use crate::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::observer::{EpochEvent, EpochObserver};
use crate::train::train_config::{SampleOrder, TrainConfig};

/// Where the trainer is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Idle,
    /// Running forward/backward over the epoch's examples.
    Presenting,
    /// Epoch finished; errors are final and observers are reading them.
    Aggregating,
    /// Applying the epoch's weight changes.
    Updating,
    Terminated,
}

#[derive(Clone, Copy)]
enum Hook {
    StartTraining,
    EndPresentation,
    EndEpoch,
    PostUpdate,
}

/// Drives epoch-based (batch) back-propagation over a network.
///
/// Each epoch presents `epoch_size` examples, summing every node's partial
/// derivatives, then applies all weight changes at once. Training ends when
/// an observer calls `request_termination`, when the `stop_flag` is raised,
/// when the progress receiver goes away, or, if no registered observer can
/// request termination, after `hard_max` epochs.
pub struct Trainer {
    config: TrainConfig,
    errors: ErrorAggregator,
    default_error_name: Option<String>,
    observers: Vec<Box<dyn EpochObserver>>,
    epoch_count: usize,
    terminating: bool,
    state: TrainerState,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Trainer {
        Trainer {
            config,
            errors: ErrorAggregator::new(),
            default_error_name: None,
            observers: Vec::new(),
            epoch_count: 0,
            terminating: false,
            state: TrainerState::Idle,
        }
    }

    pub fn add_observer<O: EpochObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    /// Registers an error calculator under its default name. The first one
    /// registered becomes the default error unless one is named explicitly.
    pub fn add_error_calculator(&mut self, calculator: Box<dyn ErrorCalculator>) {
        let name = calculator.default_name().to_string();
        self.add_named_error_calculator(name, calculator);
    }

    pub fn add_named_error_calculator(
        &mut self,
        name: impl Into<String>,
        calculator: Box<dyn ErrorCalculator>,
    ) {
        let name = name.into();
        if self.default_error_name.is_none() {
            self.default_error_name = Some(name.clone());
        }
        self.errors.add_named(name, calculator);
    }

    pub fn set_default_error_name(&mut self, name: impl Into<String>) {
        self.default_error_name = Some(name.into());
    }

    pub fn default_error_name(&self) -> Option<&str> {
        self.default_error_name.as_deref()
    }

    /// Current value of the default error.
    pub fn default_error(&self) -> Option<f64> {
        self.default_error_name.as_deref().and_then(|name| self.errors.get(name))
    }

    pub fn errors(&self) -> &ErrorAggregator {
        &self.errors
    }

    /// Stops training at the next epoch boundary.
    pub fn request_termination(&mut self) {
        self.terminating = true;
    }

    pub fn epoch_count(&self) -> usize {
        self.epoch_count
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Trains `network` on `examples` and returns the number of epochs run.
    ///
    /// The network's topology is frozen from here on. If a presentation
    /// fails, the failing epoch's partials are discarded and the error is
    /// returned; weights from completed epochs are kept.
    pub fn train<D: Dataset + ?Sized>(
        &mut self,
        network: &mut Network,
        examples: &D,
    ) -> Result<usize, TrainingError> {
        if examples.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        self.validate_config()?;

        let epoch_size = self.config.epoch_size.unwrap_or(examples.len());
        if self.errors.is_empty() {
            let calculator = self.config.default_error.calculator(epoch_size);
            self.add_error_calculator(calculator);
        }
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut cursor = 0;

        self.terminating = false;
        self.epoch_count = 0;
        self.errors.clear();
        network.begin_training(self.config.learning_rate, self.config.momentum);
        info!(
            "training on {} examples: epoch size {}, learning rate {}, momentum {}",
            examples.len(),
            epoch_size,
            self.config.learning_rate,
            self.config.momentum
        );
        self.notify(network, Hook::StartTraining);

        while !self.terminating {
            self.state = TrainerState::Presenting;
            let started = Instant::now();
            if let Err(e) = self.present_epoch(network, examples, epoch_size, &mut rng, &mut cursor) {
                warn!("epoch {} aborted: {}", self.epoch_count + 1, e);
                network.reset_tick();
                network.discard_gradients();
                self.errors.clear();
                self.state = TrainerState::Terminated;
                return Err(e);
            }
            let elapsed_ms = started.elapsed().as_millis() as u64;

            self.epoch_count += 1;
            self.state = TrainerState::Aggregating;
            self.notify(network, Hook::EndEpoch);

            let stats = EpochStats {
                epoch: self.epoch_count,
                errors: self.errors.snapshot(),
                elapsed_ms,
            };
            debug!(
                "epoch {}: {} = {:?}",
                stats.epoch,
                self.default_error_name.as_deref().unwrap_or("error"),
                self.default_error()
            );
            let receiver_gone = match self.config.progress_tx {
                Some(ref tx) => tx.send(stats).is_err(),
                None => false,
            };

            self.state = TrainerState::Updating;
            network.apply_weight_updates();
            self.notify(network, Hook::PostUpdate);
            self.errors.clear();

            if receiver_gone {
                warn!("progress receiver dropped; stopping after epoch {}", self.epoch_count);
                self.terminating = true;
            }
            if let Some(ref flag) = self.config.stop_flag {
                if flag.load(Ordering::Relaxed) {
                    self.terminating = true;
                }
            }
            let observer_can_stop = self.observers.iter().any(|o| o.requests_termination());
            if !observer_can_stop && self.epoch_count >= self.config.hard_max {
                self.terminating = true;
            }
        }

        self.state = TrainerState::Terminated;
        info!("training finished after {} epochs", self.epoch_count);
        Ok(self.epoch_count)
    }

    fn validate_config(&self) -> Result<(), TrainingError> {
        let config = &self.config;
        if !config.learning_rate.is_finite() || !config.momentum.is_finite() {
            return Err(TrainingError::InvalidConfig(
                "learning rate and momentum must be finite".into(),
            ));
        }
        if config.epoch_size == Some(0) {
            return Err(TrainingError::InvalidConfig("epoch size must be at least 1".into()));
        }
        if config.hard_max == 0 {
            return Err(TrainingError::InvalidConfig("hard max must be at least 1".into()));
        }
        Ok(())
    }

    fn present_epoch<D: Dataset + ?Sized>(
        &mut self,
        network: &mut Network,
        examples: &D,
        epoch_size: usize,
        rng: &mut StdRng,
        cursor: &mut usize,
    ) -> Result<(), TrainingError> {
        let epoch = self.epoch_count + 1;
        for _ in 0..epoch_size {
            let index = match self.config.sample_order {
                SampleOrder::Random => rng.gen_range(0..examples.len()),
                SampleOrder::Sequential => {
                    let index = *cursor % examples.len();
                    *cursor += 1;
                    index
                }
            };
            let example = examples
                .get(index)
                .ok_or(TrainingError::MissingExample(index))?;
            let failed = |source| TrainingError::Failed { epoch, source };

            let actual = network.forward(&example.inputs).map_err(failed)?;
            self.errors.accumulate(&example.expected, &actual);
            network.backward(&actual, &example.expected).map_err(failed)?;
            self.notify(network, Hook::EndPresentation);
        }
        Ok(())
    }

    fn notify(&mut self, network: &Network, hook: Hook) {
        if self.observers.is_empty() {
            return;
        }
        let mut observers = std::mem::take(&mut self.observers);
        {
            let mut event = EpochEvent { trainer: &mut *self, network };
            for observer in observers.iter_mut() {
                match hook {
                    Hook::StartTraining => observer.start_training(&mut event),
                    Hook::EndPresentation => observer.end_presentation(&mut event),
                    Hook::EndEpoch => observer.end_epoch(&mut event),
                    Hook::PostUpdate => observer.post_update(&mut event),
                }
            }
        }
        // keep anything registered from inside a hook
        let added = std::mem::replace(&mut self.observers, observers);
        self.observers.extend(added);
    }
}

impl fmt::Debug for Trainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trainer")
            .field("config", &self.config)
            .field("errors", &self.errors)
            .field("observers", &self.observers.len())
            .field("epoch_count", &self.epoch_count)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Example;
    use crate::network::NetworkBuilder;

    fn or_examples() -> Vec<Example> {
        vec![
            Example::from_pairs(&[("a", 0.0), ("b", 0.0)], &[("y", 0.0)]),
            Example::from_pairs(&[("a", 0.0), ("b", 1.0)], &[("y", 1.0)]),
            Example::from_pairs(&[("a", 1.0), ("b", 0.0)], &[("y", 1.0)]),
            Example::from_pairs(&[("a", 1.0), ("b", 1.0)], &[("y", 1.0)]),
        ]
    }

    #[test]
    fn registers_default_mse_and_terminates() {
        let mut net = NetworkBuilder::new().inputs(["a", "b"]).output("y").seed(2).build().unwrap();
        let mut trainer = Trainer::new(TrainConfig::default().with_hard_max(3).with_seed(1));
        assert_eq!(trainer.state(), TrainerState::Idle);

        let epochs = trainer.train(&mut net, or_examples().as_slice()).unwrap();

        assert_eq!(epochs, 3);
        assert_eq!(trainer.state(), TrainerState::Terminated);
        assert_eq!(trainer.default_error_name(), Some("MSE"));
        // cleared after the last update
        assert_eq!(trainer.default_error(), Some(0.0));
        assert!(net.is_frozen());
    }

    #[test]
    fn rejects_zero_epoch_size() {
        let mut net = NetworkBuilder::new().input("a").output("y").seed(2).build().unwrap();
        let mut trainer = Trainer::new(TrainConfig::default().with_epoch_size(0));
        assert!(matches!(
            trainer.train(&mut net, or_examples().as_slice()),
            Err(TrainingError::InvalidConfig(_))
        ));
    }
}
