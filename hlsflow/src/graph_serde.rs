use anyhow::Result;
use serde_json::Value;

use crate::model::ModelGraph;

/// JSON handoff of a finished model graph to the source emitter.
pub struct GraphSerialize;

impl GraphSerialize {
    pub fn json(graph: &ModelGraph) -> Result<Value> {
        Ok(serde_json::to_value(graph)?)
    }
}

pub struct GraphDeserialize;

impl GraphDeserialize {
    pub fn from_json(value: Value) -> Result<ModelGraph> {
        Ok(serde_json::from_value(value)?)
    }
}
