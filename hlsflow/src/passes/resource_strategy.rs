//! Weight relayout for the resource (area/throughput-balanced) mapping.
//!
//! Dense weights are transposed and flattened so the matrix-multiply routine
//! streams them in reuse order; large matrices with a non-power-of-two reuse
//! factor are additionally padded into a pow2-aligned block grid. Convolution
//! kernels only need their output-channel axis moved to the front.
use anyhow::{anyhow, bail, Result};

use crate::model::{AttrValue, LayerKind, ModelGraph, Node, NodeId};

use super::{is_resource_strategy, OptimizerPass, ATTR_WEIGHTS_TRANSPOSED};

/// Matrices above this element count get the padded block layout when the
/// reuse factor is not a power of two.
const PAD_THRESHOLD: usize = 2048;

pub struct ApplyResourceStrategy;

impl OptimizerPass for ApplyResourceStrategy {
    fn name(&self) -> &'static str {
        "apply_resource_strategy"
    }

    fn matches(&self, node: &Node) -> bool {
        let kind_matches = matches!(
            node.kind,
            LayerKind::Dense | LayerKind::Conv1D | LayerKind::Conv2D
        );
        kind_matches
            && is_resource_strategy(node)
            && !node.attributes.get_bool_or(ATTR_WEIGHTS_TRANSPOSED, false)
    }

    fn transform(&self, model: &mut ModelGraph, id: NodeId) -> Result<bool> {
        let node = model.node_mut(id)?;
        if node.attributes.get_bool_or(ATTR_WEIGHTS_TRANSPOSED, false) {
            bail!(
                "guard violation: weights of '{}' already transposed when pass '{}' ran",
                node.name,
                self.name()
            );
        }
        match node.kind {
            LayerKind::Dense => transform_dense(node)?,
            // (W,C,F) => (F,W,C)
            LayerKind::Conv1D => {
                let permuted = node.weight("weight")?.permute(&[2, 0, 1])?;
                node.set_weight("weight", permuted);
            }
            // (H,W,C,F) => (F,C,H,W)
            LayerKind::Conv2D => {
                let permuted = node.weight("weight")?.permute(&[3, 2, 0, 1])?;
                node.set_weight("weight", permuted);
            }
            other => bail!(
                "unexpected layer '{}' of kind {} in pass '{}'",
                node.name,
                other,
                self.name()
            ),
        }
        node.attributes
            .set(ATTR_WEIGHTS_TRANSPOSED, AttrValue::Bool(true));
        Ok(false)
    }
}

fn transform_dense(node: &mut Node) -> Result<()> {
    let rf = require_usize(node, "reuse_factor")?;
    if rf == 0 {
        bail!("dense layer '{}' has reuse_factor 0", node.name);
    }
    let n_in = require_usize(node, "n_in")?;
    let n_out = require_usize(node, "n_out")?;
    let total = n_in * n_out;
    // A reuse factor beyond the element count would make the block grid
    // degenerate (BF = 0) and drop the whole weight.
    if rf > total {
        bail!(
            "dense layer '{}' has reuse_factor {} exceeding n_in*n_out = {}",
            node.name,
            rf,
            total
        );
    }

    let weight = node.weight("weight")?;
    if weight.len() != total {
        bail!(
            "dense layer '{}' weight holds {} elements, expected n_in*n_out = {}",
            node.name,
            weight.len(),
            total
        );
    }

    // [n_in, n_out] -> [n_out, n_in], flattened row-major.
    let data = weight.data();
    let mut transposed = vec![0.0; total];
    for i in 0..n_in {
        for o in 0..n_out {
            transposed[o * n_in + i] = data[i * n_out + o];
        }
    }

    let bf = total / rf;
    let rf_rounded = rf.next_power_of_two();
    let bf_rounded = bf.next_power_of_two();

    if total > PAD_THRESHOLD && rf_rounded != rf {
        node.attributes
            .set("rfpad", AttrValue::Int((rf_rounded - rf) as i64));
        node.attributes
            .set("bfpad", AttrValue::Int((bf_rounded - bf) as i64));

        // BF' rows of R' columns; element at flat i + rf*j lands at (j, i),
        // every other cell stays zero.
        let mut padded = vec![0.0; bf_rounded * rf_rounded];
        for j in 0..bf {
            for i in 0..rf {
                padded[j * rf_rounded + i] = transposed[i + rf * j];
            }
        }
        node.weight_mut("weight")?
            .assign(vec![bf_rounded * rf_rounded], padded)?;
    } else {
        node.weight_mut("weight")?.assign(vec![total], transposed)?;
    }
    Ok(())
}

fn require_usize(node: &Node, key: &str) -> Result<usize> {
    let value = node
        .attributes
        .get_int(key)
        .ok_or_else(|| anyhow!("dense layer '{}' missing attribute '{}'", node.name, key))?;
    usize::try_from(value)
        .map_err(|_| anyhow!("dense layer '{}' has negative '{}' = {}", node.name, key, value))
}
