use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{ConfigError, Result};
use crate::network::network::Network;

/// Describes a fully connected feed-forward network by its named inputs,
/// named outputs and hidden layer sizes.
///
/// Hidden nodes are named `hidden {layer}.{index}`. Without hidden layers the
/// inputs connect straight to the outputs. Serializable so a topology can be
/// kept in a JSON file next to its `TrainConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkBuilder {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    #[serde(default)]
    pub hidden_layers: Vec<usize>,
    #[serde(default)]
    pub activation: ActivationFunction,
    /// Seed for initial weights; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        NetworkBuilder::new()
    }
}

impl NetworkBuilder {
    pub fn new() -> NetworkBuilder {
        NetworkBuilder {
            inputs: Vec::new(),
            outputs: Vec::new(),
            hidden_layers: Vec::new(),
            activation: ActivationFunction::Sigmoid,
            seed: None,
        }
    }

    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(name.into());
        self
    }

    pub fn inputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    pub fn outputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn hidden_layer(mut self, size: usize) -> Self {
        self.hidden_layers.push(size);
        self
    }

    pub fn activation(mut self, activation: ActivationFunction) -> Self {
        self.activation = activation;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn hidden_name(layer: usize, index: usize) -> String {
        format!("hidden {layer}.{index}")
    }

    pub fn build(&self) -> Result<Network> {
        let mut net = match self.seed {
            Some(seed) => Network::with_seed(seed),
            None => Network::new(),
        };
        net.set_activation_factory(self.activation);

        for name in &self.inputs {
            net.add_input_node(name)?;
        }
        for name in &self.outputs {
            net.add_output_node(name)?;
        }

        // Each stage is a list of node names; consecutive stages are fully
        // connected.
        let mut previous: Vec<String> = self.inputs.clone();
        for (layer, &size) in self.hidden_layers.iter().enumerate() {
            let mut current = Vec::with_capacity(size);
            for index in 0..size {
                let name = Self::hidden_name(layer, index);
                net.add_hidden_node(&name)?;
                current.push(name);
            }
            for target in &current {
                for source in &previous {
                    net.connect(source, target)?;
                }
            }
            previous = current;
        }
        for target in &self.outputs {
            for source in &previous {
                net.connect(source, target)?;
            }
        }
        Ok(net)
    }

    /// Serializes the description to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::result::Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> std::result::Result<NetworkBuilder, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
