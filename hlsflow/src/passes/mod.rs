//! Optimizer pass contract and the backend-scoped pass registry.
mod init_layers;
mod pointwise;
mod resource_strategy;
mod winograd;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::model::{ModelGraph, Node, NodeId};

pub use init_layers::{InitActivation, InitConv1D, InitConv2D, InitDense, InitSoftmax};
pub use pointwise::OptimizePointwiseConv;
pub use resource_strategy::ApplyResourceStrategy;
pub use winograd::WinogradKernelTransform;

/// Attribute key carrying the resolved mapping strategy.
pub const ATTR_STRATEGY: &str = "strategy";
/// Strategy value selecting the area/throughput-balanced mapping.
pub const STRATEGY_RESOURCE: &str = "resource";
/// Guard set once weights have been relaid for the resource mapping.
pub const ATTR_WEIGHTS_TRANSPOSED: &str = "weights_transposed";
/// Guard set once the Winograd kernel transform has fired.
pub const ATTR_WINOGRAD_APPLIED: &str = "winograd_applied";

/// A match-and-transform rewrite over the model graph.
///
/// `matches` is a pure eligibility predicate. `transform` may mutate the
/// model and reports whether the graph changed *structurally* (node added,
/// removed or replaced) as opposed to only having data mutated in place; the
/// runner re-snapshots the node set only on structural change.
///
/// One-shot passes use one of two idioms: a guard attribute checked by
/// `matches` and set by `transform`, or a structural rewrite that changes the
/// node's kind so the predicate no longer matches the replacement.
pub trait OptimizerPass: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, node: &Node) -> bool;

    fn transform(&self, model: &mut ModelGraph, node: NodeId) -> Result<bool>;
}

/// Pass instances owned by one backend, populated once at construction.
#[derive(Default)]
pub struct PassRegistry {
    passes: HashMap<String, Arc<dyn OptimizerPass>>,
}

impl PassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pass: Arc<dyn OptimizerPass>) -> Result<()> {
        let name = pass.name().to_string();
        if self.passes.contains_key(&name) {
            bail!("pass '{}' is already registered", name);
        }
        self.passes.insert(name, pass);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn OptimizerPass>> {
        match self.passes.get(name) {
            Some(pass) => Ok(Arc::clone(pass)),
            None => bail!("unknown pass '{}'", name),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.passes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

/// Whether a node's resolved strategy is the resource mapping.
pub(crate) fn is_resource_strategy(node: &Node) -> bool {
    node.attributes
        .get_str(ATTR_STRATEGY)
        .map(|s| s.eq_ignore_ascii_case(STRATEGY_RESOURCE))
        .unwrap_or(false)
}
