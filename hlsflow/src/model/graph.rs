//! The model graph: an arena of layers with a separate execution order.
//!
//! Node slots are never reused, so a `NodeId` snapshot taken before a pass
//! stays meaningful after later replacements: a replaced id simply stops
//! resolving. Replacement preserves the replaced node's position and rewires
//! every downstream consumer.
use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use super::attrs::{AttrValue, Attributes};
use super::node::{LayerKind, Node, NodeId};
use super::tensor::WeightTensor;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelGraph {
    slots: Vec<Option<Node>>,
    order: Vec<NodeId>,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(
        &mut self,
        kind: LayerKind,
        name: impl Into<String>,
        attributes: Attributes,
        inputs: Vec<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.slots.len() as u64);
        self.slots.push(Some(Node {
            id,
            name: name.into(),
            kind,
            attributes,
            weights: HashMap::new(),
            inputs,
        }));
        id
    }

    /// Create a node and append it to the execution order.
    pub fn make_node(
        &mut self,
        kind: LayerKind,
        name: impl Into<String>,
        attributes: Attributes,
        inputs: Vec<NodeId>,
    ) -> NodeId {
        let id = self.alloc(kind, name, attributes, inputs);
        self.order.push(id);
        id
    }

    /// Create a node at a specific position in the execution order.
    pub fn make_node_at(
        &mut self,
        position: usize,
        kind: LayerKind,
        name: impl Into<String>,
        attributes: Attributes,
        inputs: Vec<NodeId>,
    ) -> Result<NodeId> {
        if position > self.order.len() {
            bail!(
                "insert position {} out of bounds for graph of {} nodes",
                position,
                self.order.len()
            );
        }
        let id = self.alloc(kind, name, attributes, inputs);
        self.order.insert(position, id);
        Ok(id)
    }

    /// Create a detached node intended to replace an existing one via
    /// [`ModelGraph::replace_node`]. It has a slot but no position yet.
    pub fn make_replacement(
        &mut self,
        kind: LayerKind,
        name: impl Into<String>,
        attributes: Attributes,
        inputs: Vec<NodeId>,
    ) -> NodeId {
        self.alloc(kind, name, attributes, inputs)
    }

    /// Swap `new` into `old`'s position and rewire every input edge that
    /// pointed at `old`. The old slot is cleared; its id stops resolving.
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        if !self.contains(new) {
            return Err(self.unknown(new));
        }
        self.order.retain(|&id| id != new);
        let position = self
            .order
            .iter()
            .position(|&id| id == old)
            .ok_or_else(|| self.unknown(old))?;
        self.order[position] = new;
        self.slot_mut(old)?.take();
        for slot in self.slots.iter_mut().flatten() {
            for input in &mut slot.inputs {
                if *input == old {
                    *input = new;
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.0 as usize)
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.0 as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| self.unknown(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        let err = self.unknown(id);
        self.slots
            .get_mut(id.0 as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(err)
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut Option<Node>> {
        let err = self.unknown(id);
        match self.slots.get_mut(id.0 as usize) {
            Some(slot) if slot.is_some() => Ok(slot),
            _ => Err(err),
        }
    }

    fn unknown(&self, id: NodeId) -> anyhow::Error {
        anyhow!("internal error: unknown {}", id)
    }

    /// Snapshot of the current execution order.
    pub fn node_order(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    /// Nodes in execution order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|&id| {
            self.slots
                .get(id.0 as usize)
                .and_then(|slot| slot.as_ref())
        })
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes().find(|node| node.name == name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get_attr(&self, id: NodeId, key: &str) -> Result<Option<&AttrValue>> {
        Ok(self.node(id)?.attributes.get(key))
    }

    pub fn set_attr(&mut self, id: NodeId, key: &str, value: AttrValue) -> Result<()> {
        self.node_mut(id)?.attributes.set(key, value);
        Ok(())
    }

    pub fn set_weight(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        tensor: WeightTensor,
    ) -> Result<()> {
        self.node_mut(id)?.set_weight(name, tensor);
        Ok(())
    }
}
