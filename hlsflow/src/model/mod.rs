mod attrs;
mod graph;
mod node;
mod tensor;
mod types;

pub use attrs::{AttrValue, Attributes};
pub use graph::ModelGraph;
pub use node::{describe_node, LayerKind, Node, NodeId};
pub use tensor::WeightTensor;
pub use types::{NamedType, Precision};
