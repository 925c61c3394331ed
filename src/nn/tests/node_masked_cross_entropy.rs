use approx::assert_abs_diff_eq;

use crate::nn::{Graph, GraphError, Init};
use crate::tensor::Tensor;

#[test]
fn test_masked_cross_entropy_ignores_unmasked_rows() {
    let mut graph = Graph::new();
    let logits = graph.new_parameter_node(&[3, 2], Init::Zeros, Some("logits")).unwrap();
    let labels = graph.new_input_node(&[3, 2], None).unwrap();
    let loss = graph
        .new_masked_cross_entropy_node(logits, labels, &[0, 2], None)
        .unwrap();

    // 第1行不在掩码中，它的logits再极端也不影响损失
    graph
        .set_node_value(logits, Some(&Tensor::new(&[2., 0., -50., 50., 0., 0.], &[3, 2])))
        .unwrap();
    graph
        .set_node_value(labels, Some(&Tensor::new(&[1., 0., 1., 0., 0., 1.], &[3, 2])))
        .unwrap();
    graph.forward_node(loss).unwrap();

    let row0 = (1.0 + (-2f32).exp()).ln();
    let row2 = 2f32.ln();
    let value = graph.backward(loss).unwrap();
    assert_abs_diff_eq!(value, (row0 + row2) / 2.0, epsilon = 1e-6);

    let grad = graph.get_node_grad(logits).unwrap().unwrap();
    assert_abs_diff_eq!(grad[[1, 0]], 0.0);
    assert_abs_diff_eq!(grad[[1, 1]], 0.0);
    // (softmax - y) / |mask|
    assert_abs_diff_eq!(grad[[2, 0]], 0.25, epsilon = 1e-6);
    assert_abs_diff_eq!(grad[[2, 1]], -0.25, epsilon = 1e-6);
    let p0 = 1.0 / (1.0 + (-2f32).exp());
    assert_abs_diff_eq!(grad[[0, 0]], (p0 - 1.0) / 2.0, epsilon = 1e-6);
}

#[test]
fn test_masked_cross_entropy_invalid_arguments() {
    let mut graph = Graph::new();
    let logits = graph.new_input_node(&[3, 2], None).unwrap();
    let labels = graph.new_input_node(&[3, 2], None).unwrap();
    let wrong_labels = graph.new_input_node(&[3, 3], None).unwrap();

    assert!(matches!(
        graph.new_masked_cross_entropy_node(logits, wrong_labels, &[0], None),
        Err(GraphError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        graph.new_masked_cross_entropy_node(logits, labels, &[], None),
        Err(GraphError::InvalidOperation(_))
    ));
    assert!(matches!(
        graph.new_masked_cross_entropy_node(logits, labels, &[0, 3], None),
        Err(GraphError::InvalidOperation(_))
    ));
}
