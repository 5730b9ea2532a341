pub mod builder;
pub mod edge;
pub mod fan_in;
pub mod network;
pub mod node;

pub use builder::NetworkBuilder;
pub use edge::{Edge, EdgeId, NodeId};
pub use network::{Network, TraversalOrder, Values, BIAS_NAME};
pub use node::{Node, NodeKind};
