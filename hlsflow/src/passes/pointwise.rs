//! Specialization of 1x1 convolutions into dedicated pointwise layers.
//!
//! A convolution whose spatial kernel extent is 1 in every dimension is a
//! per-pixel matrix multiply; the emitter has a cheaper implementation for
//! that shape. The rewrite is structural: the replacement's kind no longer
//! matches this pass, so re-matching terminates without a guard flag.
use anyhow::{anyhow, Result};

use crate::model::{ModelGraph, Node, NodeId};

use super::{is_resource_strategy, OptimizerPass};

pub struct OptimizePointwiseConv;

impl OptimizerPass for OptimizePointwiseConv {
    fn name(&self) -> &'static str {
        "optimize_pointwise_conv"
    }

    fn matches(&self, node: &Node) -> bool {
        node.kind.is_convolution()
            && is_resource_strategy(node)
            && node.attributes.get_int_or("filt_height", 1) == 1
            && node.attributes.get_int("filt_width") == Some(1)
    }

    fn transform(&self, model: &mut ModelGraph, id: NodeId) -> Result<bool> {
        let node = model.node(id)?;
        let pointwise_kind = node.kind.pointwise_variant().ok_or_else(|| {
            anyhow!(
                "unexpected layer '{}' of kind {} in pass '{}'",
                node.name,
                node.kind,
                self.name()
            )
        })?;

        let name = node.name.clone();
        let attributes = node.attributes.clone();
        let inputs = node.inputs.clone();
        let weight = node.weight("weight")?.clone();
        let bias = node.weights.get("bias").cloned();

        let replacement = model.make_replacement(pointwise_kind, name, attributes, inputs);
        // Dense weights assigned to a 1x1 convolution arrive rank-2.
        let weight = if weight.rank() == 2 {
            weight.expand_to_rank4()?
        } else {
            weight
        };
        model.set_weight(replacement, "weight", weight)?;
        if let Some(bias) = bias {
            model.set_weight(replacement, "bias", bias)?;
        }
        model.replace_node(id, replacement)?;
        Ok(true)
    }
}
