//! Per-kind layer initializers.
//!
//! These run first and normalize the attributes later passes and the source
//! emitter read: padding counters start at zero, a mapping strategy is chosen
//! when the resolver left none, and lookup-table layers get their default
//! table types. All of them only mutate attributes in place and are
//! idempotent, so they need no guard flags.
use anyhow::{bail, Result};

use crate::model::{AttrValue, LayerKind, ModelGraph, NamedType, Node, NodeId, Precision};

use super::{is_resource_strategy, OptimizerPass, ATTR_STRATEGY, STRATEGY_RESOURCE};

const STRATEGY_COMPRESSED: &str = "compressed";

fn default_strategy(node: &mut Node) {
    if node.attributes.contains(ATTR_STRATEGY) {
        return;
    }
    let strategy = if node.attributes.get_bool_or("compression", false) {
        STRATEGY_COMPRESSED
    } else {
        STRATEGY_RESOURCE
    };
    node.attributes
        .set(ATTR_STRATEGY, AttrValue::Str(strategy.to_string()));
}

fn default_pads(node: &mut Node) {
    // Recorded pad counts from an earlier relayout must survive a re-run.
    node.attributes.set_default("rfpad", AttrValue::Int(0));
    node.attributes.set_default("bfpad", AttrValue::Int(0));
}

fn expect_kind(node: &Node, pass: &str, expected: &[LayerKind]) -> Result<()> {
    if expected.contains(&node.kind) {
        Ok(())
    } else {
        bail!(
            "unexpected layer '{}' of kind {} in pass '{}'",
            node.name,
            node.kind,
            pass
        )
    }
}

pub struct InitDense;

impl OptimizerPass for InitDense {
    fn name(&self) -> &'static str {
        "init_dense"
    }

    fn matches(&self, node: &Node) -> bool {
        node.kind == LayerKind::Dense
    }

    fn transform(&self, model: &mut ModelGraph, id: NodeId) -> Result<bool> {
        let node = model.node_mut(id)?;
        expect_kind(node, self.name(), &[LayerKind::Dense])?;
        default_pads(node);
        default_strategy(node);
        let index_t = NamedType::new(format!("{}_index", node.name), Precision::uint(1));
        node.attributes
            .set_default("index_t", AttrValue::Type(index_t));
        Ok(false)
    }
}

pub struct InitConv1D;

impl OptimizerPass for InitConv1D {
    fn name(&self) -> &'static str {
        "init_conv1d"
    }

    fn matches(&self, node: &Node) -> bool {
        node.kind == LayerKind::Conv1D
    }

    fn transform(&self, model: &mut ModelGraph, id: NodeId) -> Result<bool> {
        let node = model.node_mut(id)?;
        expect_kind(node, self.name(), &[LayerKind::Conv1D])?;
        default_pads(node);
        default_strategy(node);
        Ok(false)
    }
}

pub struct InitConv2D;

impl OptimizerPass for InitConv2D {
    fn name(&self) -> &'static str {
        "init_conv2d"
    }

    fn matches(&self, node: &Node) -> bool {
        node.kind == LayerKind::Conv2D
    }

    fn transform(&self, model: &mut ModelGraph, id: NodeId) -> Result<bool> {
        let node = model.node_mut(id)?;
        expect_kind(node, self.name(), &[LayerKind::Conv2D])?;
        // Dense weights assigned to a 1x1 convolution arrive rank-2.
        if let Ok(weight) = node.weight("weight") {
            if weight.rank() == 2 {
                let expanded = weight.expand_to_rank4()?;
                node.set_weight("weight", expanded);
            }
        }
        default_pads(node);
        default_strategy(node);
        Ok(false)
    }
}

pub struct InitActivation;

impl OptimizerPass for InitActivation {
    fn name(&self) -> &'static str {
        "init_activation"
    }

    fn matches(&self, node: &Node) -> bool {
        matches!(node.kind, LayerKind::Activation | LayerKind::Softmax)
    }

    fn transform(&self, model: &mut ModelGraph, id: NodeId) -> Result<bool> {
        let node = model.node_mut(id)?;
        expect_kind(
            node,
            self.name(),
            &[LayerKind::Activation, LayerKind::Softmax],
        )?;
        let table_t = NamedType::new(format!("{}_table_t", node.name), Precision::fixed(18, 8));
        node.attributes
            .set_default("table_t", AttrValue::Type(table_t));
        node.attributes
            .set_default("table_size", AttrValue::Int(1024));
        Ok(false)
    }
}

pub struct InitSoftmax;

impl OptimizerPass for InitSoftmax {
    fn name(&self) -> &'static str {
        "init_softmax"
    }

    fn matches(&self, node: &Node) -> bool {
        node.kind == LayerKind::Softmax
    }

    fn transform(&self, model: &mut ModelGraph, id: NodeId) -> Result<bool> {
        let node = model.node_mut(id)?;
        expect_kind(node, self.name(), &[LayerKind::Softmax])?;
        let table_t = node
            .attributes
            .get_type("table_t")
            .cloned()
            .unwrap_or_else(|| {
                NamedType::new(format!("{}_table_t", node.name), Precision::fixed(18, 8))
            });
        node.attributes
            .set_default("exp_table_t", AttrValue::Type(table_t.clone()));
        node.attributes
            .set_default("inv_table_t", AttrValue::Type(table_t));
        // Resource strategy means latency implementation for softmax.
        let implementation = if is_resource_strategy(node) {
            "latency".to_string()
        } else {
            node.attributes
                .get_str(ATTR_STRATEGY)
                .unwrap_or("latency")
                .to_ascii_lowercase()
        };
        node.attributes
            .set("implementation", AttrValue::Str(implementation));
        Ok(false)
    }
}
