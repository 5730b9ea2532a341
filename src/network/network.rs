use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::activation::{ActivationFactory, ActivationFunction};
use crate::error::{ConfigError, NetworkError, Result};
use crate::network::edge::{Edge, EdgeId, NodeId};
use crate::network::node::{Node, NodeKind};

/// Named scalar values, keyed by node name. Used for forward inputs, forward
/// results and expected values.
pub type Values = BTreeMap<String, f64>;

/// Name reserved for the bias node every network owns.
pub const BIAS_NAME: &str = "bias";

/// Discipline of the ready-queue that drives propagation.
///
/// Either order produces the same values; only the moment at which a node
/// fires differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TraversalOrder {
    /// Process ready nodes first-in, first-out.
    #[default]
    BreadthFirst,
    /// Process the most recently readied node first.
    DepthFirst,
}

/// A feed-forward network held as an arena of nodes and edges.
///
/// Forward and backward passes are dataflow: a node fires once every input
/// edge has delivered a signal, and computes its delta once every output edge
/// has delivered feedback. Firing order therefore never affects the values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    names: HashMap<String, NodeId>,
    input_nodes: Vec<NodeId>,
    output_nodes: Vec<NodeId>,
    bias: NodeId,
    traversal: TraversalOrder,
    frozen: bool,
    #[serde(skip)]
    forward_pending: bool,
    #[serde(skip, default = "default_factory")]
    activation_factory: Arc<dyn ActivationFactory>,
    #[serde(skip, default = "entropy_rng")]
    rng: StdRng,
}

fn default_factory() -> Arc<dyn ActivationFactory> {
    Arc::new(ActivationFunction::Sigmoid)
}

fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

impl Default for Network {
    fn default() -> Self {
        Network::with_rng(entropy_rng())
    }
}

impl Network {
    /// Empty network (bias node only) with entropy-seeded weight init.
    pub fn new() -> Network {
        Network::default()
    }

    /// Empty network whose initial weights are reproducible from `seed`.
    pub fn with_seed(seed: u64) -> Network {
        Network::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Network {
        let factory = default_factory();
        let bias = Node::new(BIAS_NAME, NodeKind::Bias, factory.make());
        let mut names = HashMap::new();
        names.insert(BIAS_NAME.to_string(), NodeId(0));
        Network {
            nodes: vec![bias],
            edges: Vec::new(),
            names,
            input_nodes: Vec::new(),
            output_nodes: Vec::new(),
            bias: NodeId(0),
            traversal: TraversalOrder::default(),
            frozen: false,
            forward_pending: false,
            activation_factory: factory,
            rng,
        }
    }

    // ------------------------------------------------------------------------
    // Topology
    // ------------------------------------------------------------------------

    /// Sets the factory asked for an activation function by every node added
    /// from now on.
    pub fn set_activation_factory<F: ActivationFactory + 'static>(&mut self, factory: F) {
        self.activation_factory = Arc::new(factory);
    }

    pub fn set_traversal_order(&mut self, order: TraversalOrder) {
        self.traversal = order;
    }

    pub fn traversal_order(&self) -> TraversalOrder {
        self.traversal
    }

    pub fn add_input_node(&mut self, name: &str) -> Result<NodeId> {
        let id = self.add_node(name, NodeKind::Input)?;
        self.input_nodes.push(id);
        Ok(id)
    }

    /// Adds a hidden node already connected to the bias node.
    pub fn add_hidden_node(&mut self, name: &str) -> Result<NodeId> {
        let id = self.add_node(name, NodeKind::Hidden)?;
        self.link(self.bias, id)?;
        Ok(id)
    }

    /// Adds an output node already connected to the bias node.
    pub fn add_output_node(&mut self, name: &str) -> Result<NodeId> {
        let id = self.add_node(name, NodeKind::Output)?;
        self.link(self.bias, id)?;
        self.output_nodes.push(id);
        Ok(id)
    }

    fn add_node(&mut self, name: &str, kind: NodeKind) -> Result<NodeId> {
        if self.frozen {
            return Err(NetworkError::TopologyFrozen);
        }
        if self.names.contains_key(name) {
            return Err(NetworkError::DuplicateNode(name.to_string()));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, kind, self.activation_factory.make()));
        self.names.insert(name.to_string(), id);
        trace!("added {:?} node '{}' as #{}", kind, name, id.0);
        Ok(id)
    }

    /// Connects `source_name -> target_name` with a random initial weight.
    pub fn connect(&mut self, source_name: &str, target_name: &str) -> Result<EdgeId> {
        let source = self.require(source_name)?;
        let target = self.require(target_name)?;
        self.link(source, target)
    }

    fn link(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId> {
        if self.frozen {
            return Err(NetworkError::TopologyFrozen);
        }
        let invalid = |net: &Network, reason: &'static str| NetworkError::InvalidConnection {
            source_name: net.nodes[source.0].name().to_string(),
            target: net.nodes[target.0].name().to_string(),
            reason,
        };
        match self.nodes[target.0].kind() {
            NodeKind::Input | NodeKind::Bias => {
                return Err(invalid(self, "input and bias nodes take no inputs"))
            }
            NodeKind::Hidden | NodeKind::Output => {}
        }
        if self.nodes[source.0].kind() == NodeKind::Output {
            return Err(invalid(self, "output nodes cannot feed other nodes"));
        }
        if self.edge_between(source, target).is_some() {
            return Err(invalid(self, "nodes are already connected"));
        }
        if source == target || self.reaches(target, source) {
            return Err(NetworkError::CycleDetected {
                source_name: self.nodes[source.0].name().to_string(),
                target: self.nodes[target.0].name().to_string(),
            });
        }

        let id = EdgeId(self.edges.len());
        let weight = self.rng.gen_range(-1.0..=1.0);
        let source_slot = self.nodes[source.0].add_output_edge(id);
        let target_slot = self.nodes[target.0].add_input_edge(id, weight);
        self.edges.push(Edge { id, source, target, source_slot, target_slot });
        trace!(
            "connected '{}' -> '{}' (edge #{}, weight {:.4})",
            self.nodes[source.0].name(),
            self.nodes[target.0].name(),
            id.0,
            weight
        );
        Ok(id)
    }

    /// Whether `to` is reachable from `from` following signal direction.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            stack.extend(
                self.nodes[id.0]
                    .output_edges()
                    .iter()
                    .map(|e| self.edges[e.0].target),
            );
        }
        false
    }

    fn edge_between(&self, source: NodeId, target: NodeId) -> Option<&Edge> {
        self.nodes[target.0]
            .input_edges()
            .iter()
            .map(|e| &self.edges[e.0])
            .find(|e| e.source == source)
    }

    fn require(&self, name: &str) -> Result<NodeId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownNode(name.to_string()))
    }

    // ------------------------------------------------------------------------
    // Forward
    // ------------------------------------------------------------------------

    /// Presents one example and returns the output values keyed by output
    /// node name. Every input node must have a value; extra names are
    /// ignored.
    pub fn forward(&mut self, inputs: &Values) -> Result<Values> {
        let mut seeds = Vec::with_capacity(self.input_nodes.len());
        for &id in &self.input_nodes {
            let name = self.nodes[id.0].name();
            let value = inputs
                .get(name)
                .copied()
                .ok_or_else(|| NetworkError::MissingInput(name.to_string()))?;
            seeds.push((id, value));
        }

        let mut ready = VecDeque::with_capacity(self.nodes.len());
        self.nodes[self.bias.0].inject(1.0);
        ready.push_back(self.bias);
        for (id, value) in seeds {
            self.nodes[id.0].inject(value);
            ready.push_back(id);
        }

        if let Err(e) = self.propagate_signals(ready) {
            self.reset_tick();
            return Err(e);
        }
        self.forward_pending = true;

        Ok(self
            .output_nodes
            .iter()
            .map(|id| {
                let node = &self.nodes[id.0];
                (node.name().to_string(), node.output_value())
            })
            .collect())
    }

    fn propagate_signals(&mut self, mut ready: VecDeque<NodeId>) -> Result<()> {
        while let Some(id) = self.next_ready(&mut ready) {
            let value = self.nodes[id.0].output_value();
            for k in 0..self.nodes[id.0].output_edges().len() {
                let edge = &self.edges[self.nodes[id.0].output_edges()[k].0];
                let (target, slot) = (edge.target, edge.target_slot);
                if self.nodes[target.0].receive_signal(slot, value)? {
                    ready.push_back(target);
                }
            }
        }
        Ok(())
    }

    fn next_ready(&self, ready: &mut VecDeque<NodeId>) -> Option<NodeId> {
        match self.traversal {
            TraversalOrder::BreadthFirst => ready.pop_front(),
            TraversalOrder::DepthFirst => ready.pop_back(),
        }
    }

    // ------------------------------------------------------------------------
    // Backward
    // ------------------------------------------------------------------------

    /// Back-propagates the error of the immediately preceding `forward` and
    /// adds this example's partial derivatives to every node's accumulator.
    ///
    /// `actual` should be the map `forward` returned; `expected` needs a value
    /// for every output node. Nodes that reach no output get no feedback,
    /// and the edges into them count as carrying zero error.
    pub fn backward(&mut self, actual: &Values, expected: &Values) -> Result<()> {
        if !self.forward_pending {
            return Err(NetworkError::NoForwardPass);
        }
        let mut seeds = Vec::with_capacity(self.output_nodes.len());
        for &id in &self.output_nodes {
            let name = self.nodes[id.0].name();
            let a = actual
                .get(name)
                .copied()
                .ok_or_else(|| NetworkError::MissingActual(name.to_string()))?;
            let e = expected
                .get(name)
                .copied()
                .ok_or_else(|| NetworkError::MissingExpected(name.to_string()))?;
            seeds.push((id, a, e));
        }
        self.forward_pending = false;
        self.nodes.iter_mut().for_each(Node::reset_feedback);

        // Edges into nodes that reach no output carry zero error. Filling
        // those slots up front keeps them out of the feedback count.
        let live = self.feeds_output();
        for edge in &self.edges {
            if live[edge.source.0] && !live[edge.target.0] {
                let complete = self.nodes[edge.source.0].receive_feedback(edge.source_slot, 0.0);
                debug_assert!(!complete, "a live node has at least one live successor");
            }
        }

        let mut ready = VecDeque::with_capacity(self.nodes.len());
        for (id, a, e) in seeds {
            self.nodes[id.0].set_error(a, e);
            ready.push_back(id);
        }

        while let Some(id) = self.next_ready(&mut ready) {
            let node = &self.nodes[id.0];
            let sends: Vec<(NodeId, usize, f64)> = node
                .weighted_deltas()
                .map(|(slot, value)| {
                    let edge = &self.edges[node.input_edges()[slot].0];
                    (edge.source, edge.source_slot, value)
                })
                .collect();
            for (source, slot, value) in sends {
                if self.nodes[source.0].receive_feedback(slot, value) {
                    ready.push_back(source);
                }
            }
        }
        Ok(())
    }

    /// Marks every node from which at least one output node is reachable.
    fn feeds_output(&self) -> Vec<bool> {
        let mut live = vec![false; self.nodes.len()];
        let mut stack = self.output_nodes.clone();
        for id in &stack {
            live[id.0] = true;
        }
        while let Some(id) = stack.pop() {
            for edge in self.nodes[id.0].input_edges() {
                let source = self.edges[edge.0].source;
                if !live[source.0] {
                    live[source.0] = true;
                    stack.push(source);
                }
            }
        }
        live
    }

    /// Disarms every fan-in set and forgets the pending forward pass.
    pub fn reset_tick(&mut self) {
        self.forward_pending = false;
        self.nodes.iter_mut().for_each(Node::reset_tick);
    }

    // ------------------------------------------------------------------------
    // Training hooks
    // ------------------------------------------------------------------------

    /// Freezes the topology and gives every node fresh accumulators.
    pub fn begin_training(&mut self, learning_rate: f64, momentum: f64) {
        self.frozen = true;
        self.reset_tick();
        for node in &mut self.nodes {
            node.configure_training(learning_rate, momentum);
        }
    }

    /// Turns the epoch's accumulated partials into weight changes.
    ///
    /// Every node computes its delta before any node's weights move, so no
    /// node ever reads a half-updated weight set.
    pub fn apply_weight_updates(&mut self) {
        self.nodes.iter_mut().for_each(Node::compute_weight_delta);
        self.nodes.iter_mut().for_each(Node::apply_weights);
        self.nodes.iter_mut().for_each(Node::end_epoch);
    }

    /// Drops this epoch's partials without touching any weight.
    pub fn discard_gradients(&mut self) {
        self.nodes.iter_mut().for_each(Node::discard_partials);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    // ------------------------------------------------------------------------
    // Weights
    // ------------------------------------------------------------------------

    /// Overwrites all weights of a node, in `input_edges` order.
    pub fn set_weights(&mut self, name: &str, weights: &[f64]) -> Result<()> {
        let id = self.require(name)?;
        self.nodes[id.0].set_weights(weights)
    }

    pub fn set_edge_weight(&mut self, source_name: &str, target_name: &str, weight: f64) -> Result<()> {
        let source = self.require(source_name)?;
        let target = self.require(target_name)?;
        let slot = self
            .edge_between(source, target)
            .map(|e| e.target_slot)
            .ok_or_else(|| NetworkError::InvalidConnection {
                source_name: source_name.to_string(),
                target: target_name.to_string(),
                reason: "nodes are not connected",
            })?;
        self.nodes[target.0].set_weight(slot, weight);
        Ok(())
    }

    pub fn edge_weight(&self, source_name: &str, target_name: &str) -> Option<f64> {
        let source = self.names.get(source_name)?;
        let target = self.names.get(target_name)?;
        let edge = self.edge_between(*source, *target)?;
        self.nodes[target.0].weights().get(edge.target_slot).copied()
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Serializes topology and weights to a pretty-printed JSON file.
    /// Training state is not saved.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::result::Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network written by `save_json`. The loaded network
    /// uses sigmoid for nodes added later and draws new weights from entropy.
    pub fn load_json(path: impl AsRef<Path>) -> std::result::Result<Network, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.names.get(name).map(|id| &self.nodes[id.0])
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn bias(&self) -> &Node {
        &self.nodes[self.bias.0]
    }

    pub fn input_names(&self) -> Vec<&str> {
        self.input_nodes.iter().map(|id| self.nodes[id.0].name()).collect()
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.output_nodes.iter().map(|id| self.nodes[id.0].name()).collect()
    }

    /// Names of the nodes feeding `name`, in `input_edges` (weight) order.
    pub fn input_sources(&self, name: &str) -> Option<Vec<&str>> {
        let node = self.node(name)?;
        Some(
            node.input_edges()
                .iter()
                .map(|e| self.nodes[self.edges[e.0].source.0].name())
                .collect(),
        )
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
