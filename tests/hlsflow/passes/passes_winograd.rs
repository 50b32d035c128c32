use anyhow::Result;

use hlsflow::{
    AttrValue, ModelGraph, NodeId, OptimizerPass, WeightTensor, WinogradKernelTransform,
    ATTR_WEIGHTS_TRANSPOSED, ATTR_WINOGRAD_APPLIED,
};

use crate::common;

/// Conv2D whose weight is already in the transposed (F,C,3,3) layout.
fn make_transposed_conv(
    graph: &mut ModelGraph,
    filters: usize,
    channels: usize,
    kernels: &[f64],
) -> Result<NodeId> {
    let conv = common::make_conv2d(graph, "conv1", 3, 3, channels, filters, vec![])?;
    graph.node_mut(conv)?.weight_mut("weight")?.assign(
        vec![filters, channels, 3, 3],
        kernels.to_vec(),
    )?;
    graph.set_attr(conv, ATTR_WEIGHTS_TRANSPOSED, AttrValue::Bool(true))?;
    Ok(conv)
}

#[test]
fn unit_kernel_produces_exact_tile() -> Result<()> {
    // K = e11: G·K·Gᵀ is the outer product of G's and Gᵀ's first columns.
    let mut graph = ModelGraph::new();
    let kernel = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    let conv = make_transposed_conv(&mut graph, 1, 1, &kernel)?;

    let pass = WinogradKernelTransform;
    assert!(pass.matches(graph.node(conv)?));
    let structural = pass.transform(&mut graph, conv)?;
    assert!(!structural);

    let node = graph.node(conv)?;
    assert!(node.attributes.get_bool_or(ATTR_WINOGRAD_APPLIED, false));
    let weight = node.weight("weight")?;
    assert_eq!(weight.shape(), &[1, 1, 4, 4]);
    #[rustfmt::skip]
    let expected = [
        1.0,  0.5,  0.5,  0.0,
        0.5,  0.25, 0.25, 0.0,
        0.5,  0.25, 0.25, 0.0,
        0.0,  0.0,  0.0,  0.0,
    ];
    assert_eq!(weight.data(), &expected);
    Ok(())
}

#[test]
fn ones_kernel_is_outer_product_of_row_sums() -> Result<()> {
    let mut graph = ModelGraph::new();
    let conv = make_transposed_conv(&mut graph, 1, 1, &[1.0; 9])?;
    WinogradKernelTransform.transform(&mut graph, conv)?;

    let weight = graph.node(conv)?.weight("weight")?.clone();
    let s = [1.0, 1.5, 0.5, 1.0];
    for r in 0..4 {
        for c in 0..4 {
            assert_eq!(weight.at(&[0, 0, r, c])?, s[r] * s[c]);
        }
    }
    Ok(())
}

#[test]
fn every_filter_channel_pair_is_transformed() -> Result<()> {
    let mut graph = ModelGraph::new();
    let kernels = common::seeded_values(7, 2 * 3 * 9);
    let conv = make_transposed_conv(&mut graph, 2, 3, &kernels)?;
    WinogradKernelTransform.transform(&mut graph, conv)?;

    let weight = graph.node(conv)?.weight("weight")?.clone();
    assert_eq!(weight.shape(), &[2, 3, 4, 4]);
    // Spot-check one tile corner: tile[0][0] = K[0][0] exactly.
    for f in 0..2 {
        for c in 0..3 {
            assert_eq!(weight.at(&[f, c, 0, 0])?, kernels[(f * 3 + c) * 9]);
        }
    }
    Ok(())
}

#[test]
fn match_requires_transpose_guard() -> Result<()> {
    let mut graph = ModelGraph::new();
    let conv = common::make_conv2d(&mut graph, "conv1", 3, 3, 2, 2, vec![])?;

    let pass = WinogradKernelTransform;
    assert!(!pass.matches(graph.node(conv)?));

    graph.set_attr(conv, ATTR_WEIGHTS_TRANSPOSED, AttrValue::Bool(false))?;
    assert!(!pass.matches(graph.node(conv)?));
    Ok(())
}

#[test]
fn match_excludes_non_3x3_kernels() -> Result<()> {
    let mut graph = ModelGraph::new();
    let conv = common::make_conv2d(&mut graph, "conv1", 5, 5, 2, 2, vec![])?;
    graph.set_attr(conv, ATTR_WEIGHTS_TRANSPOSED, AttrValue::Bool(true))?;
    assert!(!WinogradKernelTransform.matches(graph.node(conv)?));
    Ok(())
}

#[test]
fn transform_without_prerequisite_guard_is_fatal() -> Result<()> {
    let mut graph = ModelGraph::new();
    let conv = common::make_conv2d(&mut graph, "conv1", 3, 3, 1, 1, vec![])?;
    let err = WinogradKernelTransform.transform(&mut graph, conv).unwrap_err();
    assert!(err.to_string().contains("guard violation"));
    Ok(())
}

#[test]
fn second_application_is_refused() -> Result<()> {
    let mut graph = ModelGraph::new();
    let kernels = common::seeded_values(11, 9);
    let conv = make_transposed_conv(&mut graph, 1, 1, &kernels)?;

    let pass = WinogradKernelTransform;
    pass.transform(&mut graph, conv)?;
    assert!(!pass.matches(graph.node(conv)?));
    let err = pass.transform(&mut graph, conv).unwrap_err();
    assert!(err.to_string().contains("guard violation"));
    Ok(())
}

#[test]
fn make_transposed_conv_shape_is_checked() -> Result<()> {
    // A weight that is not (F,C,3,3) fails loudly instead of transforming.
    let mut graph = ModelGraph::new();
    let conv = common::make_conv2d(&mut graph, "conv1", 3, 3, 1, 1, vec![])?;
    graph.set_attr(conv, ATTR_WEIGHTS_TRANSPOSED, AttrValue::Bool(true))?;
    graph
        .node_mut(conv)?
        .weight_mut("weight")?
        .assign(vec![9], vec![0.0; 9])?;
    let err = WinogradKernelTransform.transform(&mut graph, conv).unwrap_err();
    assert!(err.to_string().contains("(F,C,3,3)"));
    Ok(())
}

#[test]
fn weight_tensor_helper_builds_valid_kernels() -> Result<()> {
    let tensor = WeightTensor::new(vec![1, 1, 3, 3], common::seeded_values(3, 9))?;
    assert_eq!(tensor.len(), 9);
    Ok(())
}
