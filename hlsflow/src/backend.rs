//! Backend construction: pass and flow registries plus the named entry
//! points the external build driver uses.
use std::sync::Arc;

use anyhow::Result;

use crate::flows::FlowRegistry;
use crate::model::ModelGraph;
use crate::passes::{
    ApplyResourceStrategy, InitActivation, InitConv1D, InitConv2D, InitDense, InitSoftmax,
    OptimizePointwiseConv, PassRegistry, WinogradKernelTransform,
};
use crate::runner::PassRunner;
use crate::trace;

/// One backend instance owns its registries; both are immutable after
/// construction. The model graph is handed to exactly one pipeline run at a
/// time.
pub struct HlsBackend {
    passes: PassRegistry,
    flows: FlowRegistry,
    default_flow: String,
    writer_flow: String,
}

impl HlsBackend {
    pub fn new() -> Result<Self> {
        let mut passes = PassRegistry::new();
        passes.register(Arc::new(InitDense))?;
        passes.register(Arc::new(InitConv1D))?;
        passes.register(Arc::new(InitConv2D))?;
        passes.register(Arc::new(InitActivation))?;
        passes.register(Arc::new(InitSoftmax))?;
        passes.register(Arc::new(OptimizePointwiseConv))?;
        passes.register(Arc::new(ApplyResourceStrategy))?;
        passes.register(Arc::new(WinogradKernelTransform))?;

        let mut flows = FlowRegistry::new();
        flows.register(
            "init_layers",
            vec![
                "init_dense".into(),
                "init_conv1d".into(),
                "init_conv2d".into(),
                "init_activation".into(),
                "init_softmax".into(),
            ],
            vec![],
            &passes,
        )?;
        flows.register(
            "optimize",
            vec!["optimize_pointwise_conv".into()],
            vec!["init_layers".into()],
            &passes,
        )?;
        flows.register(
            "transform_weights",
            vec![
                "apply_resource_strategy".into(),
                "apply_winograd_transform".into(),
            ],
            vec!["init_layers".into(), "optimize".into()],
            &passes,
        )?;
        // The default flow is an empty join point over its requirements.
        flows.register(
            "ip",
            vec![],
            vec![
                "init_layers".into(),
                "optimize".into(),
                "transform_weights".into(),
            ],
            &passes,
        )?;
        // Source emission and toolchain invocation happen outside this crate;
        // the writer flow only pins everything it depends on.
        flows.register("write", vec![], vec!["ip".into()], &passes)?;

        Ok(Self {
            passes,
            flows,
            default_flow: "ip".to_string(),
            writer_flow: "write".to_string(),
        })
    }

    pub fn default_flow(&self) -> &str {
        &self.default_flow
    }

    pub fn writer_flow(&self) -> &str {
        &self.writer_flow
    }

    pub fn passes(&self) -> &PassRegistry {
        &self.passes
    }

    pub fn flows(&self) -> &FlowRegistry {
        &self.flows
    }

    /// Resolve and run a named flow against a model graph.
    pub fn run_flow(&self, model: &mut ModelGraph, flow_name: &str) -> Result<()> {
        let order = self.flows.resolve(flow_name)?;
        trace!("flow '{}' resolved to {} passes", flow_name, order.len());
        PassRunner::new(&self.passes).run(model, &order)
    }

    /// Run the default flow, leaving the graph ready for source emission.
    pub fn compile(&self, model: &mut ModelGraph) -> Result<()> {
        self.run_flow(model, self.default_flow.as_str())
    }
}
