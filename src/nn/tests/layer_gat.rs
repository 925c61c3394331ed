use std::sync::Arc;

use approx::assert_abs_diff_eq;

use super::{assert_grads_match_numerical, one_hot_labels, path_graph, path_graph_features};
use crate::nn::functional::gat_head;
use crate::nn::{GatLayer, Graph, GraphError, Init, Module};
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

#[test]
fn test_gat_layer_creation() {
    let edges = path_graph();
    let mut graph = Graph::new();
    let layer = GatLayer::new(&mut graph, &edges, 3, 2, "gat").unwrap();

    assert_eq!(layer.in_features(), 3);
    assert_eq!(layer.out_features(), 2);
    assert_abs_diff_eq!(layer.negative_slope(), 0.2);
    assert_eq!(graph.get_node_name(layer.weight()).unwrap(), "gat_W");
    assert_eq!(graph.get_node_name(layer.attn()).unwrap(), "gat_a");
    assert_eq!(graph.get_node_shape(layer.weight()).unwrap(), &[3, 2]);
    assert_eq!(graph.get_node_shape(layer.attn()).unwrap(), &[4, 1]);
    assert_eq!(layer.parameters(), vec![layer.weight(), layer.attn()]);
    assert_eq!(layer.num_params(&graph).unwrap(), 10);

    // 同名层重复创建
    assert!(matches!(
        GatLayer::new(&mut graph, &edges, 3, 2, "gat"),
        Err(GraphError::DuplicateNodeName(_))
    ));
    assert!(matches!(
        GatLayer::new(&mut graph, &edges, 0, 2, "empty"),
        Err(GraphError::InvalidOperation(_))
    ));
}

#[test]
fn test_gat_layer_rejects_wrong_input_width() {
    let edges = path_graph();
    let mut graph = Graph::new();
    let mut layer = GatLayer::new(&mut graph, &edges, 3, 2, "gat").unwrap();
    let h = graph.new_input_node(&[4, 5], None).unwrap();
    assert!(matches!(
        layer.forward(&mut graph, h),
        Err(GraphError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_gat_layer_path_graph_end_to_end() {
    let edges = path_graph();
    let mut graph = Graph::new();
    let mut layer = GatLayer::new(&mut graph, &edges, 3, 2, "gat").unwrap();
    graph
        .set_node_value(layer.weight(), Some(&Tensor::new(&[1., 0., 0., 1., 1., 1.], &[3, 2])))
        .unwrap();
    graph
        .set_node_value(layer.attn(), Some(&Tensor::new(&[1., 0., 0., -1.], &[4, 1])))
        .unwrap();

    let h = graph.new_input_node(&[4, 3], Some("h")).unwrap();
    graph.set_node_value(h, Some(&path_graph_features())).unwrap();
    assert_eq!(layer.attention_coefficients(&graph).unwrap(), None);
    let out = layer.forward(&mut graph, h).unwrap();
    graph.forward_node(out).unwrap();

    let alpha_low = 1.0 / (1.0 + 1.2f32.exp());
    let expected = Tensor::new(
        &[
            0.0, 1.0,
            1.0, 0.5,
            2.0 * (1.0 - alpha_low), alpha_low + 2.0 * (1.0 - alpha_low),
            1.0, 1.0,
        ],
        &[4, 2],
    );
    let value = graph.get_node_value(out).unwrap().unwrap();
    assert_eq!(value.shape(), &[4, 2]);
    assert_abs_diff_eq!(value.max_abs_diff(&expected), 0.0, epsilon = 1e-5);

    // 边顺序：(0,1) (1,0) (1,2) (2,1) (2,3) (3,2)
    let alpha = layer.attention_coefficients(&graph).unwrap().unwrap();
    let expected_alpha = [0.5, 1.0, alpha_low, 0.5, 1.0, 1.0 - alpha_low];
    for (k, &e) in expected_alpha.iter().enumerate() {
        assert_abs_diff_eq!(alpha[[k, 0]], e, epsilon = 1e-6);
    }
}

#[test]
fn test_gat_layer_with_self_loops_has_no_zero_rows() {
    let edges = Arc::new(EdgeIndex::new(3, &[(0, 1)]).unwrap());
    let mut graph = Graph::new_with_seed(2);
    let h = graph.new_input_node(&[3, 2], None).unwrap();
    graph
        .set_node_value(h, Some(&Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2])))
        .unwrap();

    // 1. 无自环：节点0和2没有入边，输出零向量
    let mut layer = GatLayer::new(&mut graph, &edges, 2, 2, "plain").unwrap();
    let out = layer.forward(&mut graph, h).unwrap();
    graph.forward_node(out).unwrap();
    let value = graph.get_node_value(out).unwrap().unwrap();
    assert!(!value.has_non_finite());
    for r in [0, 2] {
        assert_eq!(value[[r, 0]], 0.0);
        assert_eq!(value[[r, 1]], 0.0);
    }

    // 2. 加自环后，只有自环的节点输出自身的投影特征
    let looped = Arc::new(edges.with_self_loops());
    let mut layer = GatLayer::new(&mut graph, &looped, 2, 2, "looped").unwrap();
    let out = layer.forward(&mut graph, h).unwrap();
    graph.forward_node(out).unwrap();
    let value = graph.get_node_value(out).unwrap().unwrap();
    let w = graph.get_node_value(layer.weight()).unwrap().unwrap();
    let z2 = Tensor::new(&[5., 6.], &[1, 2]).mat_mul(w);
    assert_abs_diff_eq!(value[[2, 0]], z2[[0, 0]], epsilon = 1e-5);
    assert_abs_diff_eq!(value[[2, 1]], z2[[0, 1]], epsilon = 1e-5);
}

#[test]
fn test_gat_layer_matches_functional_form() {
    let edges = path_graph().with_self_loops();
    let edges = Arc::new(edges);
    let mut graph = Graph::new_with_seed(9);
    let mut layer = GatLayer::new_with_slope(&mut graph, &edges, 3, 4, 0.1, "gat").unwrap();
    let h = graph.new_input_node(&[4, 3], None).unwrap();
    graph.set_node_value(h, Some(&path_graph_features())).unwrap();
    let out = layer.forward(&mut graph, h).unwrap();
    graph.forward_node(out).unwrap();

    let w = graph.get_node_value(layer.weight()).unwrap().unwrap();
    let a = graph.get_node_value(layer.attn()).unwrap().unwrap();
    let expected = gat_head(&path_graph_features(), w, a, &edges, 0.1).unwrap();
    let value = graph.get_node_value(out).unwrap().unwrap();
    assert_abs_diff_eq!(value.max_abs_diff(&expected), 0.0, epsilon = 1e-6);
}

#[test]
fn test_gat_layer_grads() {
    let edges = Arc::new(path_graph().with_self_loops());
    let mut graph = Graph::new_with_seed(4);
    let mut layer = GatLayer::new_with_init(
        &mut graph,
        &edges,
        3,
        2,
        0.2,
        Init::Normal { mean: 0.0, std: 1.0 },
        "gat",
    )
    .unwrap();
    let h = graph.new_input_node(&[4, 3], None).unwrap();
    let labels = graph.new_input_node(&[4, 2], None).unwrap();
    let out = layer.forward(&mut graph, h).unwrap();
    let loss = graph
        .new_masked_cross_entropy_node(out, labels, &[0, 2, 3], None)
        .unwrap();

    let features = Tensor::new(
        &[0.2, -0.7, 1.1, 0.9, 0.3, -0.5, -1.3, 0.6, 0.4, 0.8, -0.1, -0.9],
        &[4, 3],
    );
    graph.set_node_value(h, Some(&features)).unwrap();
    graph
        .set_node_value(labels, Some(&one_hot_labels(&[1, 0, 0, 1], 2)))
        .unwrap();
    assert_grads_match_numerical(&mut graph, loss, &layer.parameters());
}
