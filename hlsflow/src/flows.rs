//! Named pass flows and their dependency resolution.
//!
//! A flow is an ordered pass list plus the flows it requires. Resolution
//! flattens a requested flow into one linear pass order: requirements expand
//! depth-first in listed order, each distinct flow at most once per
//! resolution run, own passes last. Deliberately a first-encounter
//! linearization rather than a general topological sort; flow graphs here are
//! small and authored.
use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::passes::PassRegistry;

/// A named ordered pass list with requirements on other flows. An empty pass
/// list is a valid join point in the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    pub name: String,
    pub passes: Vec<String>,
    pub requires: Vec<String>,
}

/// Flows owned by one backend, populated once at construction.
#[derive(Debug, Clone, Default)]
pub struct FlowRegistry {
    flows: HashMap<String, Flow>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flow. Every pass must exist in `passes` and every required
    /// flow must already be registered; flows are created in dependency
    /// order at backend construction, which also rules out cycles.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        pass_names: Vec<String>,
        requires: Vec<String>,
        passes: &PassRegistry,
    ) -> Result<()> {
        let name = name.into();
        if self.flows.contains_key(&name) {
            bail!("flow '{}' is already registered", name);
        }
        for pass in &pass_names {
            if !passes.contains(pass) {
                bail!("flow '{}' references unknown pass '{}'", name, pass);
            }
        }
        for required in &requires {
            if !self.flows.contains_key(required) {
                bail!("flow '{}' requires unknown flow '{}'", name, required);
            }
        }
        self.flows.insert(
            name.clone(),
            Flow {
                name,
                passes: pass_names,
                requires,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Flow> {
        match self.flows.get(name) {
            Some(flow) => Ok(flow),
            None => bail!("unknown flow '{}'", name),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flows.contains_key(name)
    }

    /// Flatten a flow into its linear pass execution order.
    pub fn resolve(&self, name: &str) -> Result<Vec<String>> {
        let mut done = HashSet::new();
        let mut in_progress = HashSet::new();
        let mut order = Vec::new();
        self.resolve_into(name, &mut done, &mut in_progress, &mut order)?;
        Ok(order)
    }

    fn resolve_into(
        &self,
        name: &str,
        done: &mut HashSet<String>,
        in_progress: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if !in_progress.insert(name.to_string()) {
            bail!("cyclic flow requirement involving '{}'", name);
        }
        let flow = self.get(name)?;
        for required in &flow.requires {
            self.resolve_into(required, done, in_progress, order)?;
        }
        in_progress.remove(name);
        done.insert(name.to_string());
        order.extend(flow.passes.iter().cloned());
        Ok(())
    }
}
