//! Winograd kernel transform for 3x3 convolutions under the resource mapping.
//!
//! Replaces each 3x3 kernel K with the 4x4 kernel G·K·Gᵀ of the minimal
//! filtering algorithm (Lavin & Gray, 2015). The transform is only valid on
//! the already-transposed (F,C,H,W) layout, so eligibility requires the
//! blocked-transpose guard in addition to flow ordering.
use anyhow::{bail, Result};

use crate::model::{AttrValue, LayerKind, ModelGraph, Node, NodeId};

use super::{is_resource_strategy, OptimizerPass, ATTR_WEIGHTS_TRANSPOSED, ATTR_WINOGRAD_APPLIED};

const G: [[f64; 3]; 4] = [
    [1.0, 0.0, 0.0],
    [0.5, 0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.0, 0.0, 1.0],
];

const GT: [[f64; 4]; 3] = [
    [1.0, 0.5, 0.5, 0.0],
    [0.0, 0.5, -0.5, 0.0],
    [0.0, 0.5, 0.5, 1.0],
];

pub struct WinogradKernelTransform;

impl OptimizerPass for WinogradKernelTransform {
    fn name(&self) -> &'static str {
        "apply_winograd_transform"
    }

    fn matches(&self, node: &Node) -> bool {
        node.kind == LayerKind::Conv2D
            && is_resource_strategy(node)
            && node.attributes.get_bool_or(ATTR_WEIGHTS_TRANSPOSED, false)
            && !node.attributes.get_bool_or(ATTR_WINOGRAD_APPLIED, false)
            && node.attributes.get_int("filt_height") == Some(3)
            && node.attributes.get_int("filt_width") == Some(3)
    }

    fn transform(&self, model: &mut ModelGraph, id: NodeId) -> Result<bool> {
        let node = model.node_mut(id)?;
        if node.kind != LayerKind::Conv2D {
            bail!(
                "unexpected layer '{}' of kind {} in pass '{}'",
                node.name,
                node.kind,
                self.name()
            );
        }
        if !node.attributes.get_bool_or(ATTR_WEIGHTS_TRANSPOSED, false) {
            bail!(
                "guard violation: '{}' reached pass '{}' before its weights were transposed",
                node.name,
                self.name()
            );
        }
        if node.attributes.get_bool_or(ATTR_WINOGRAD_APPLIED, false) {
            bail!(
                "guard violation: kernel of '{}' already transformed when pass '{}' ran",
                node.name,
                self.name()
            );
        }

        let weight = node.weight("weight")?;
        let (filters, channels) = match weight.shape() {
            [f, c, 3, 3] => (*f, *c),
            other => bail!(
                "layer '{}' weight shape {:?} is not (F,C,3,3) in pass '{}'",
                node.name,
                other,
                self.name()
            ),
        };

        let data = weight.data();
        let mut out = vec![0.0; filters * channels * 16];
        for f in 0..filters {
            for c in 0..channels {
                let kernel = &data[(f * channels + c) * 9..(f * channels + c) * 9 + 9];
                let tile = &mut out[(f * channels + c) * 16..(f * channels + c) * 16 + 16];
                winograd_tile(kernel, tile);
            }
        }
        node.weight_mut("weight")?
            .assign(vec![filters, channels, 4, 4], out)?;
        node.attributes
            .set(ATTR_WINOGRAD_APPLIED, AttrValue::Bool(true));
        Ok(false)
    }
}

/// G·K·Gᵀ for one 3x3 kernel, written into a 4x4 tile.
fn winograd_tile(kernel: &[f64], tile: &mut [f64]) {
    // G (4x3) · K (3x3)
    let mut gk = [[0.0; 3]; 4];
    for (r, row) in gk.iter_mut().enumerate() {
        for (c, slot) in row.iter_mut().enumerate() {
            *slot = (0..3).map(|k| G[r][k] * kernel[k * 3 + c]).sum();
        }
    }
    // (G·K) (4x3) · Gᵀ (3x4)
    for r in 0..4 {
        for c in 0..4 {
            tile[r * 4 + c] = (0..3).map(|k| gk[r][k] * GT[k][c]).sum();
        }
    }
}
