use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{NetworkError, Result};
use crate::network::edge::EdgeId;
use crate::network::fan_in::{Arrival, FanIn};
use crate::train::gradient::GradientAccumulator;

/// Role a node plays in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Takes its value from the forward-pass arguments.
    Input,
    Hidden,
    /// Seeds the backward pass and is read into the forward result.
    Output,
    /// Always outputs 1.0; feeds every hidden and output node.
    Bias,
}

/// A single neuron.
///
/// `input_edges` is the index space for `weights`, `inputs` and the
/// partial derivatives; `output_edges` is the index space for `feedback`.
/// Both orders are fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    name: String,
    kind: NodeKind,
    activation: ActivationFunction,
    input_edges: Vec<EdgeId>,
    output_edges: Vec<EdgeId>,
    weights: Vec<f64>,
    inputs: Vec<f64>,
    feedback: Vec<f64>,
    raw_value: f64,
    output_value: f64,
    #[serde(skip)]
    missing_inputs: FanIn,
    #[serde(skip)]
    missing_feedback: FanIn,
    #[serde(skip)]
    training: GradientAccumulator,
    #[serde(skip)]
    fire_count: u64,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind, activation: ActivationFunction) -> Node {
        Node {
            name: name.into(),
            kind,
            activation,
            input_edges: Vec::new(),
            output_edges: Vec::new(),
            weights: Vec::new(),
            inputs: Vec::new(),
            feedback: Vec::new(),
            raw_value: 0.0,
            output_value: 0.0,
            missing_inputs: FanIn::default(),
            missing_feedback: FanIn::default(),
            training: GradientAccumulator::default(),
            fire_count: 0,
        }
    }

    // --- topology ---------------------------------------------------------

    /// Appends an input edge with its freshly drawn weight. Returns the slot.
    pub(crate) fn add_input_edge(&mut self, edge: EdgeId, weight: f64) -> usize {
        self.input_edges.push(edge);
        self.weights.push(weight);
        self.inputs.push(0.0);
        self.training.resize(self.weights.len());
        self.input_edges.len() - 1
    }

    pub(crate) fn add_output_edge(&mut self, edge: EdgeId) -> usize {
        self.output_edges.push(edge);
        self.feedback.push(0.0);
        self.output_edges.len() - 1
    }

    // --- forward ----------------------------------------------------------

    /// Sets the value of a node that has no inputs (input or bias) and counts
    /// it as fired.
    pub(crate) fn inject(&mut self, value: f64) {
        self.output_value = value;
        self.fire_count += 1;
    }

    /// Stores a signal for `slot`. Returns `Ok(true)` when it completed the
    /// fan-in and the node fired.
    pub(crate) fn receive_signal(&mut self, slot: usize, value: f64) -> Result<bool> {
        let degree = self.input_edges.len();
        match self.missing_inputs.arrive(degree, slot) {
            Arrival::Duplicate => Ok(false),
            Arrival::Waiting => {
                self.inputs[slot] = value;
                Ok(false)
            }
            Arrival::Complete => {
                self.inputs[slot] = value;
                self.fire()?;
                Ok(true)
            }
        }
    }

    fn fire(&mut self) -> Result<()> {
        if self.weights.len() != self.inputs.len() {
            return Err(NetworkError::DimensionMismatch {
                node: self.name.clone(),
                weights: self.weights.len(),
                inputs: self.inputs.len(),
            });
        }
        self.raw_value = dot(&self.inputs, &self.weights);
        self.output_value = self.activation.function(self.raw_value);
        self.fire_count += 1;
        Ok(())
    }

    // --- backward ---------------------------------------------------------

    /// Seeds the backward pass at an output node and records its partials.
    pub(crate) fn set_error(&mut self, actual: f64, expected: f64) {
        let derivative = self.activation.derivative(self.raw_value);
        let delta = self.training.output_delta(expected, actual, derivative);
        self.training.accumulate(&self.inputs, delta);
    }

    /// Stores weighted feedback arriving on output `slot`. Returns `true` when
    /// every downstream node has reported and this node's delta is ready.
    ///
    /// Nodes without inputs (input and bias) have nothing to learn and
    /// ignore feedback.
    pub(crate) fn receive_feedback(&mut self, slot: usize, value: f64) -> bool {
        if self.input_edges.is_empty() {
            return false;
        }
        let degree = self.output_edges.len();
        match self.missing_feedback.arrive(degree, slot) {
            Arrival::Duplicate => false,
            Arrival::Waiting => {
                self.feedback[slot] = value;
                false
            }
            Arrival::Complete => {
                self.feedback[slot] = value;
                let derivative = self.activation.derivative(self.raw_value);
                let delta = self.training.hidden_delta(&self.feedback, derivative);
                self.training.accumulate(&self.inputs, delta);
                true
            }
        }
    }

    /// `delta * weight[i]` for each input slot, the values sent upstream.
    pub(crate) fn weighted_deltas(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        let delta = self.training.delta();
        self.weights.iter().enumerate().map(move |(i, w)| (i, delta * w))
    }

    /// Forgets any feedback left over from an earlier backward pass.
    pub(crate) fn reset_feedback(&mut self) {
        self.missing_feedback.disarm();
    }

    /// Disarms both synchronization sets.
    pub(crate) fn reset_tick(&mut self) {
        self.missing_inputs.disarm();
        self.missing_feedback.disarm();
    }

    // --- epoch end --------------------------------------------------------

    pub(crate) fn compute_weight_delta(&mut self) {
        self.training.compute_weight_delta();
    }

    pub(crate) fn apply_weights(&mut self) {
        self.training.apply(&mut self.weights);
    }

    pub(crate) fn end_epoch(&mut self) {
        self.training.end_epoch();
    }

    pub(crate) fn configure_training(&mut self, learning_rate: f64, momentum: f64) {
        self.training = GradientAccumulator::new(learning_rate, momentum);
        self.training.resize(self.weights.len());
    }

    pub(crate) fn discard_partials(&mut self) {
        self.training.discard_partials();
    }

    pub(crate) fn set_weights(&mut self, weights: &[f64]) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(NetworkError::DimensionMismatch {
                node: self.name.clone(),
                weights: weights.len(),
                inputs: self.weights.len(),
            });
        }
        self.weights.copy_from_slice(weights);
        Ok(())
    }

    pub(crate) fn set_weight(&mut self, slot: usize, weight: f64) {
        self.weights[slot] = weight;
    }

    // --- accessors --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn input_edges(&self) -> &[EdgeId] {
        &self.input_edges
    }

    pub fn output_edges(&self) -> &[EdgeId] {
        &self.output_edges
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    pub fn feedback(&self) -> &[f64] {
        &self.feedback
    }

    pub fn raw_value(&self) -> f64 {
        self.raw_value
    }

    pub fn output_value(&self) -> f64 {
        self.output_value
    }

    pub fn delta(&self) -> f64 {
        self.training.delta()
    }

    pub fn training(&self) -> &GradientAccumulator {
        &self.training
    }

    /// How many times this node has fired since it was created or loaded.
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// `true` while a forward tick has delivered some but not all inputs.
    pub fn awaiting_inputs(&self) -> bool {
        self.missing_inputs.is_armed()
    }

    /// `true` while a backward tick has delivered some but not all feedback.
    pub fn awaiting_feedback(&self) -> bool {
        self.missing_feedback.is_armed()
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
