use anyhow::Result;

use hlsflow::{Attributes, LayerKind, ModelGraph};

use crate::common;

#[test]
fn make_node_preserves_order() -> Result<()> {
    let mut graph = ModelGraph::new();
    let a = graph.make_node(LayerKind::Input, "in", Attributes::new(), vec![]);
    let b = common::make_dense(&mut graph, "fc1", 4, 4, 2, vec![a])?;
    let c = graph.make_node(LayerKind::Activation, "relu1", Attributes::new(), vec![b]);

    assert_eq!(graph.node_order(), vec![a, b, c]);
    assert_eq!(graph.len(), 3);
    let names: Vec<&str> = graph.nodes().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["in", "fc1", "relu1"]);
    Ok(())
}

#[test]
fn make_node_at_inserts_in_position() -> Result<()> {
    let mut graph = ModelGraph::new();
    let a = graph.make_node(LayerKind::Input, "in", Attributes::new(), vec![]);
    let c = graph.make_node(LayerKind::Softmax, "sm", Attributes::new(), vec![a]);
    let b = graph.make_node_at(1, LayerKind::Activation, "relu", Attributes::new(), vec![a])?;

    assert_eq!(graph.node_order(), vec![a, b, c]);
    assert!(graph.make_node_at(9, LayerKind::Input, "x", Attributes::new(), vec![]).is_err());
    Ok(())
}

#[test]
fn replace_node_keeps_position_and_rewires_consumers() -> Result<()> {
    let mut graph = ModelGraph::new();
    let a = graph.make_node(LayerKind::Input, "in", Attributes::new(), vec![]);
    let b = common::make_dense(&mut graph, "fc1", 4, 4, 2, vec![a])?;
    let c = graph.make_node(LayerKind::Activation, "relu1", Attributes::new(), vec![b]);

    let node = graph.node(b)?.clone();
    let replacement = graph.make_replacement(
        LayerKind::PointwiseConv2D,
        node.name.clone(),
        node.attributes.clone(),
        node.inputs.clone(),
    );
    graph.replace_node(b, replacement)?;

    assert_eq!(graph.node_order(), vec![a, replacement, c]);
    assert!(!graph.contains(b));
    assert!(graph.node(b).is_err());
    assert_eq!(graph.node(c)?.inputs, vec![replacement]);
    assert_eq!(graph.node(replacement)?.inputs, vec![a]);
    assert_eq!(graph.node(replacement)?.name, "fc1");
    Ok(())
}

#[test]
fn unknown_node_lookup_is_internal_error() {
    let graph = ModelGraph::new();
    let err = graph.node(hlsflow::NodeId(42)).unwrap_err();
    assert!(err.to_string().contains("unknown"));
}

#[test]
fn attribute_passthrough() -> Result<()> {
    let mut graph = ModelGraph::new();
    let a = graph.make_node(LayerKind::Input, "in", Attributes::new(), vec![]);
    graph.set_attr(a, "n_in", hlsflow::AttrValue::Int(16))?;
    assert_eq!(graph.node(a)?.attributes.get_int("n_in"), Some(16));
    assert!(graph.get_attr(a, "missing")?.is_none());
    Ok(())
}
