//! Drives a resolved pass list against a model graph.
use anyhow::{bail, Result};

use crate::model::{describe_node, ModelGraph};
use crate::passes::{OptimizerPass, PassRegistry};
use crate::trace;

/// Upper bound on full-snapshot rescans of one pass after structural changes.
/// A legitimate pipeline needs at most one rescan per replaced node; hitting
/// this bound means a pass keeps reporting structural change without ever
/// falling out of its own match set.
pub const MAX_PASS_RESCANS: usize = 10_000;

pub struct PassRunner<'a> {
    registry: &'a PassRegistry,
}

impl<'a> PassRunner<'a> {
    pub fn new(registry: &'a PassRegistry) -> Self {
        Self { registry }
    }

    /// Apply each named pass in order.
    pub fn run(&self, model: &mut ModelGraph, pass_names: &[String]) -> Result<()> {
        for name in pass_names {
            let pass = self.registry.get(name)?;
            self.run_pass(model, pass.as_ref())?;
        }
        Ok(())
    }

    /// Apply one pass until a full scan of the node set fires no structural
    /// change. Nodes are visited in snapshot order; identities replaced
    /// during the scan are skipped. In-place-only passes therefore visit
    /// each node exactly once.
    fn run_pass(&self, model: &mut ModelGraph, pass: &dyn OptimizerPass) -> Result<()> {
        let mut rescans = 0usize;
        'scan: loop {
            rescans += 1;
            if rescans > MAX_PASS_RESCANS {
                bail!(
                    "runaway pass '{}': graph still changing after {} rescans",
                    pass.name(),
                    MAX_PASS_RESCANS
                );
            }
            let snapshot = model.node_order();
            for id in snapshot {
                if !model.contains(id) {
                    continue;
                }
                if !pass.matches(model.node(id)?) {
                    continue;
                }
                trace!("{} <- {}", describe_node(model.node(id)?), pass.name());
                let structural = pass.transform(model, id)?;
                if structural {
                    // The snapshot may now hold stale identities; retake it.
                    continue 'scan;
                }
            }
            break;
        }
        Ok(())
    }
}
