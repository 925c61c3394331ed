use crate::nn::{Graph, GraphError, Init};
use crate::tensor::Tensor;

fn build(seed: u64) -> (Graph, crate::nn::NodeId, crate::nn::NodeId) {
    let mut graph = Graph::new_with_seed(seed);
    let w = graph.new_parameter_node(&[3, 2], Init::xavier_relu(), Some("w")).unwrap();
    let a = graph.new_parameter_node(&[4, 1], Init::xavier_relu(), Some("a")).unwrap();
    (graph, w, a)
}

#[test]
fn test_save_and_load_params_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.bin");

    let (source, src_w, src_a) = build(1);
    source.save_params(&path).unwrap();

    let (mut target, w, a) = build(2);
    assert_ne!(
        target.get_node_value(w).unwrap(),
        source.get_node_value(src_w).unwrap()
    );
    assert_eq!(target.load_params(&path).unwrap(), 2);
    assert_eq!(
        target.get_node_value(w).unwrap(),
        source.get_node_value(src_w).unwrap()
    );
    assert_eq!(
        target.get_node_value(a).unwrap(),
        source.get_node_value(src_a).unwrap()
    );
}

#[test]
fn test_load_ignores_unknown_names() {
    let (source, _, _) = build(1);
    let mut buffer = Vec::new();
    assert_eq!(source.write_params(&mut buffer).unwrap(), 2);

    let mut target = Graph::new();
    let w = target.new_parameter_node(&[3, 2], Init::Zeros, Some("w")).unwrap();
    assert_eq!(target.read_params(buffer.as_slice()).unwrap(), 1);
    assert_ne!(target.get_node_value(w).unwrap(), Some(&Tensor::zeros(&[3, 2])));
}

#[test]
fn test_load_rejects_shape_mismatch() {
    let (source, _, _) = build(1);
    let mut buffer = Vec::new();
    source.write_params(&mut buffer).unwrap();

    let mut target = Graph::new();
    target.new_parameter_node(&[2, 2], Init::Zeros, Some("w")).unwrap();
    assert!(matches!(
        target.read_params(buffer.as_slice()),
        Err(GraphError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_load_rejects_foreign_file() {
    let mut graph = Graph::new();
    let result = graph.read_params(&b"NOPE\x01\x00\x00\x00"[..]);
    assert!(matches!(result, Err(GraphError::Serialization(_))));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.bin");
    assert!(matches!(
        graph.load_params(&missing),
        Err(GraphError::Serialization(_))
    ));
}

#[test]
fn test_failed_load_leaves_params_untouched() {
    let mut source = Graph::new_with_seed(1);
    source.new_parameter_node(&[3, 2], Init::xavier_relu(), Some("a_first")).unwrap();
    source.new_parameter_node(&[5, 1], Init::xavier_relu(), Some("b_second")).unwrap();
    let mut buffer = Vec::new();
    assert_eq!(source.write_params(&mut buffer).unwrap(), 2);

    // 第一个参数形状相同，第二个不同
    let mut target = Graph::new();
    let first = target.new_parameter_node(&[3, 2], Init::Zeros, Some("a_first")).unwrap();
    let second = target.new_parameter_node(&[4, 1], Init::Ones, Some("b_second")).unwrap();
    assert!(matches!(
        target.read_params(buffer.as_slice()),
        Err(GraphError::ShapeMismatch { .. })
    ));
    assert_eq!(target.get_node_value(first).unwrap(), Some(&Tensor::zeros(&[3, 2])));
    assert_eq!(target.get_node_value(second).unwrap(), Some(&Tensor::ones(&[4, 1])));
}
