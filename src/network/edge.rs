use serde::{Serialize, Deserialize};

/// Stable index of a node inside its network's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable index of an edge inside its network's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Directed connector between two nodes. Signals travel source -> target,
/// feedback travels target -> source.
///
/// The edge carries no numeric state. `source_slot` is the edge's position in
/// the source's `output_edges` (the index into its feedback buffer) and
/// `target_slot` its position in the target's `input_edges` (the index into
/// its weights and inputs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub source_slot: usize,
    pub target_slot: usize,
}
