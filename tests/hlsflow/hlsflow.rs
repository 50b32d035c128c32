#[path = "common/mod.rs"]
mod common;

#[path = "model/model_graph.rs"]
mod model_graph;
#[path = "model/model_tensor.rs"]
mod model_tensor;
#[path = "model/model_serde.rs"]
mod model_serde;

#[path = "passes/passes_resource.rs"]
mod passes_resource;
#[path = "passes/passes_winograd.rs"]
mod passes_winograd;
#[path = "passes/passes_pointwise.rs"]
mod passes_pointwise;

#[path = "flows/flows_resolve.rs"]
mod flows_resolve;
#[path = "flows/flows_runner.rs"]
mod flows_runner;

#[path = "backend/backend_compile.rs"]
mod backend_compile;
