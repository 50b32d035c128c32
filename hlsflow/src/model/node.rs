use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::attrs::Attributes;
use super::tensor::WeightTensor;

/// Stable identity of a node within a model graph.
///
/// Allocated monotonically by the graph, so identical imports always produce
/// identical identities.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Closed set of layer kinds the pipeline operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Input,
    Dense,
    Conv1D,
    Conv2D,
    Pooling,
    Activation,
    Softmax,
    PointwiseConv1D,
    PointwiseConv2D,
}

impl LayerKind {
    /// String identifier for the layer kind.
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Input => "input",
            LayerKind::Dense => "dense",
            LayerKind::Conv1D => "conv1d",
            LayerKind::Conv2D => "conv2d",
            LayerKind::Pooling => "pooling",
            LayerKind::Activation => "activation",
            LayerKind::Softmax => "softmax",
            LayerKind::PointwiseConv1D => "pointwise_conv1d",
            LayerKind::PointwiseConv2D => "pointwise_conv2d",
        }
    }

    pub fn is_convolution(self) -> bool {
        matches!(self, LayerKind::Conv1D | LayerKind::Conv2D)
    }

    /// The pointwise kind replacing this convolution kind, if any.
    pub fn pointwise_variant(self) -> Option<LayerKind> {
        match self {
            LayerKind::Conv1D => Some(LayerKind::PointwiseConv1D),
            LayerKind::Conv2D => Some(LayerKind::PointwiseConv2D),
            _ => None,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LayerKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "input" => Ok(LayerKind::Input),
            "dense" => Ok(LayerKind::Dense),
            "conv1d" => Ok(LayerKind::Conv1D),
            "conv2d" => Ok(LayerKind::Conv2D),
            "pooling" => Ok(LayerKind::Pooling),
            "activation" => Ok(LayerKind::Activation),
            "softmax" => Ok(LayerKind::Softmax),
            "pointwise_conv1d" => Ok(LayerKind::PointwiseConv1D),
            "pointwise_conv2d" => Ok(LayerKind::PointwiseConv2D),
            _ => Err(anyhow!("unsupported layer kind {}", value)),
        }
    }
}

/// One layer of the model graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: LayerKind,
    pub attributes: Attributes,
    pub weights: HashMap<String, WeightTensor>,
    pub inputs: Vec<NodeId>,
}

impl Node {
    /// Named weight tensor, erroring on absence.
    pub fn weight(&self, name: &str) -> Result<&WeightTensor> {
        self.weights
            .get(name)
            .ok_or_else(|| anyhow!("layer '{}' has no weight '{}'", self.name, name))
    }

    pub fn weight_mut(&mut self, name: &str) -> Result<&mut WeightTensor> {
        match self.weights.get_mut(name) {
            Some(tensor) => Ok(tensor),
            None => Err(anyhow!("layer '{}' has no weight '{}'", self.name, name)),
        }
    }

    pub fn set_weight(&mut self, name: impl Into<String>, tensor: WeightTensor) {
        self.weights.insert(name.into(), tensor);
    }
}

/// One-line summary of a node for trace output.
pub fn describe_node(node: &Node) -> String {
    if node.inputs.is_empty() {
        format!("{} {} ({})", node.kind, node.name, node.id)
    } else {
        let inputs = node
            .inputs
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{} {} ({}) <- {}", node.kind, node.name, node.id, inputs)
    }
}
