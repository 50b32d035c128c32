mod backend;
mod flows;
mod graph_serde;
pub mod logging;
mod model;
mod passes;
mod runner;

pub use backend::HlsBackend;
pub use flows::{Flow, FlowRegistry};
pub use graph_serde::{GraphDeserialize, GraphSerialize};
pub use model::{
    describe_node, AttrValue, Attributes, LayerKind, ModelGraph, NamedType, Node, NodeId,
    Precision, WeightTensor,
};
pub use passes::{
    ApplyResourceStrategy, InitActivation, InitConv1D, InitConv2D, InitDense, InitSoftmax,
    OptimizePointwiseConv, OptimizerPass, PassRegistry, WinogradKernelTransform, ATTR_STRATEGY,
    ATTR_WEIGHTS_TRANSPOSED, ATTR_WINOGRAD_APPLIED, STRATEGY_RESOURCE,
};
pub use runner::{PassRunner, MAX_PASS_RESCANS};
