//! Per-node attribute storage.
//!
//! Layer configuration resolved before the pipeline runs (strategy, reuse
//! factor, compression flag) and everything the passes record (padding
//! counters, guard flags, type descriptors) live in a string-keyed bag of
//! tagged values with an explicit get-with-default contract.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::NamedType;

/// Attribute value attached to a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Type(NamedType),
}

impl AttrValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&NamedType> {
        match self {
            AttrValue::Type(v) => Some(v),
            _ => None,
        }
    }
}

/// String-keyed attribute map for a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    items: HashMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: AttrValue) {
        self.items.insert(key.into(), value);
    }

    /// Set a value only when the key is not already present.
    pub fn set_default(&mut self, key: impl Into<String>, value: AttrValue) {
        self.items.entry(key.into()).or_insert(value);
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttrValue::as_int)
    }

    pub fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AttrValue::as_float)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AttrValue::as_bool)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    pub fn get_type(&self, key: &str) -> Option<&NamedType> {
        self.get(key).and_then(AttrValue::as_type)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
