use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{path_graph, path_graph_features};
use crate::nn::GraphError;
use crate::nn::functional::{
    DEFAULT_NEGATIVE_SLOPE, aggregate, edge_softmax, elu, gat_head, leaky_relu, merge_concat,
    merge_mean, project, score_edges, weighted_aggregate,
};
use crate::tensor::Tensor;
use crate::topology::{EdgeIndex, TopologyError};

/// W = [[1,0],[0,1],[1,1]]
fn path_graph_weight() -> Tensor {
    Tensor::new(&[1., 0., 0., 1., 1., 1.], &[3, 2])
}

/// a = [1, 0, 0, -1]ᵀ：e = Z[src][0] - Z[dst][1]
fn path_graph_attn() -> Tensor {
    Tensor::new(&[1., 0., 0., -1.], &[4, 1])
}

#[test]
fn test_project() {
    let z = project(&path_graph_features(), &path_graph_weight()).unwrap();
    let expected = Tensor::new(&[1., 0., 0., 1., 1., 1., 2., 2.], &[4, 2]);
    assert_eq!(z, expected);

    let result = project(&path_graph_features(), &Tensor::zeros(&[2, 2]));
    assert!(matches!(result, Err(GraphError::ShapeMismatch { .. })));
}

#[test]
fn test_activations() {
    let x = Tensor::new(&[-1., 0., 2.], &[1, 3]);
    let y = leaky_relu(&x, 0.2);
    assert_abs_diff_eq!(y[[0, 0]], -0.2);
    assert_abs_diff_eq!(y[[0, 1]], 0.0);
    assert_abs_diff_eq!(y[[0, 2]], 2.0);

    let y = elu(&x, 1.0);
    assert_abs_diff_eq!(y[[0, 0]], (-1f32).exp() - 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(y[[0, 2]], 2.0);
}

#[test]
fn test_score_edges_shape_and_values() {
    let edges = path_graph();
    let z = project(&path_graph_features(), &path_graph_weight()).unwrap();
    let scores = score_edges(&z, &path_graph_attn(), &edges, DEFAULT_NEGATIVE_SLOPE).unwrap();
    assert_eq!(scores.shape(), &[6, 1]);
    let expected = [0.0, 0.0, -0.2, 0.0, -0.2, 1.0];
    for (k, &e) in expected.iter().enumerate() {
        assert_abs_diff_eq!(scores[[k, 0]], e, epsilon = 1e-6);
    }
}

#[test]
fn test_score_edges_rejects_wrong_attention_length() {
    let edges = path_graph();
    let z = project(&path_graph_features(), &path_graph_weight()).unwrap();
    let result = score_edges(&z, &Tensor::zeros(&[2, 1]), &edges, DEFAULT_NEGATIVE_SLOPE);
    assert_eq!(
        result,
        Err(GraphError::ShapeMismatch {
            expected: vec![4, 1],
            got: vec![2, 1],
            message: "注意力向量a的长度须为投影特征宽度的2倍".to_string(),
        })
    );
}

#[test]
fn test_edge_softmax_sums_to_one_per_destination() {
    let mut rng = StdRng::seed_from_u64(11);
    let edges = EdgeIndex::new(
        5,
        &[(0, 1), (2, 1), (3, 1), (4, 1), (1, 2), (0, 2), (3, 4), (4, 4)],
    )
    .unwrap();
    // 含很大的分数，检查减去最大值后的数值稳定性
    let mut scores = Tensor::uniform_with_rng(-5.0, 5.0, &[8, 1], &mut rng);
    scores[[0, 0]] = 80.0;
    scores[[6, 0]] = -90.0;

    let alpha = edge_softmax(&scores, &edges).unwrap();
    assert!(!alpha.has_non_finite());
    for i in 0..edges.num_nodes() {
        let group = edges.incoming(i);
        if group.is_empty() {
            continue;
        }
        let sum: f32 = group.iter().map(|&k| alpha[[k, 0]]).sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
        assert!(group.iter().all(|&k| alpha[[k, 0]] >= 0.0));
    }
}

#[test]
fn test_isolated_node_yields_zero_row() {
    // 节点2没有任何入边
    let edges = EdgeIndex::new(3, &[(0, 1), (1, 0), (2, 0)]).unwrap();
    let z = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2]);
    let scores = Tensor::new(&[0.3, -0.1, 0.7], &[3, 1]);

    let alpha = edge_softmax(&scores, &edges).unwrap();
    assert!(!alpha.has_non_finite());
    let out = aggregate(&z, &scores, &edges).unwrap();
    assert!(!out.has_non_finite());
    assert_eq!(out[[2, 0]], 0.0);
    assert_eq!(out[[2, 1]], 0.0);
}

#[test]
fn test_single_neighbor_collapses_to_neighbor_features() {
    let edges = EdgeIndex::new(3, &[(2, 0), (0, 1), (2, 1)]).unwrap();
    let z = Tensor::new(&[1., -1., 0.5, 0.5, 3., 4.], &[3, 2]);
    let scores = Tensor::new(&[-7.5, 0.1, 0.2], &[3, 1]);

    let alpha = edge_softmax(&scores, &edges).unwrap();
    assert_abs_diff_eq!(alpha[[0, 0]], 1.0);
    let out = weighted_aggregate(&z, &alpha, &edges).unwrap();
    assert_abs_diff_eq!(out[[0, 0]], 3.0);
    assert_abs_diff_eq!(out[[0, 1]], 4.0);
}

#[test]
fn test_permuting_edge_list_does_not_change_output() {
    let mut rng = StdRng::seed_from_u64(5);
    let pairs = [(0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (3, 2), (0, 3), (3, 3)];
    let mut permuted = pairs;
    permuted.reverse();
    permuted.swap(1, 5);

    let h = Tensor::normal_with_rng(0.0, 1.0, &[4, 3], &mut rng);
    let w = Tensor::normal_with_rng(0.0, 1.0, &[3, 2], &mut rng);
    let a = Tensor::normal_with_rng(0.0, 1.0, &[4, 1], &mut rng);

    let out1 = gat_head(&h, &w, &a, &EdgeIndex::new(4, &pairs).unwrap(), 0.2).unwrap();
    let out2 = gat_head(&h, &w, &a, &EdgeIndex::new(4, &permuted).unwrap(), 0.2).unwrap();
    assert_abs_diff_eq!(out1.max_abs_diff(&out2), 0.0, epsilon = 1e-6);
}

#[test]
fn test_path_graph_end_to_end() {
    let edges = path_graph();
    let out = gat_head(
        &path_graph_features(),
        &path_graph_weight(),
        &path_graph_attn(),
        &edges,
        DEFAULT_NEGATIVE_SLOPE,
    )
    .unwrap();
    assert_eq!(out.shape(), &[4, 2]);

    // 节点0只有邻居1，节点3只有邻居2：输出等于邻居的投影特征
    let z = project(&path_graph_features(), &path_graph_weight()).unwrap();
    for c in 0..2 {
        assert_abs_diff_eq!(out[[0, c]], z[[1, c]], epsilon = 1e-6);
        assert_abs_diff_eq!(out[[3, c]], z[[2, c]], epsilon = 1e-6);
    }

    // 节点1的两条入边分数相同；节点2的入边分数为-0.2与1.0
    let alpha_1 = 1.0 / (1.0 + 1.2f32.exp());
    let alpha_3 = 1.0 - alpha_1;
    let expected = Tensor::new(
        &[
            0.0, 1.0,
            1.0, 0.5,
            2.0 * alpha_3, alpha_1 + 2.0 * alpha_3,
            1.0, 1.0,
        ],
        &[4, 2],
    );
    assert_abs_diff_eq!(out.max_abs_diff(&expected), 0.0, epsilon = 1e-5);
    assert_abs_diff_eq!(out[[2, 0]], 1.537_049_6, epsilon = 1e-5);
    assert_abs_diff_eq!(out[[2, 1]], 1.768_524_8, epsilon = 1e-5);
}

#[test]
fn test_merge_heads() {
    let h1 = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    let h2 = Tensor::new(&[3., 0., 1., 0.], &[2, 2]);

    let cat = merge_concat(&[h1.clone(), h2.clone()]).unwrap();
    assert_eq!(cat, Tensor::new(&[1., 2., 3., 0., 3., 4., 1., 0.], &[2, 4]));

    // 逐特征平均，而不是对所有元素取一个标量
    let mean = merge_mean(&[h1, h2]).unwrap();
    assert_eq!(mean, Tensor::new(&[2., 1., 2., 2.], &[2, 2]));

    assert!(matches!(merge_mean(&[]), Err(GraphError::InvalidOperation(_))));
    let narrow = Tensor::zeros(&[2, 1]);
    assert!(matches!(
        merge_mean(&[Tensor::zeros(&[2, 2]), narrow]),
        Err(GraphError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_invalid_graph_reference() {
    let result = EdgeIndex::new(4, &[(0, 1), (1, 4)]);
    assert_eq!(
        result,
        Err(TopologyError::InvalidGraphReference {
            edge: 1,
            node: 4,
            num_nodes: 4,
        })
    );
    let wrapped: GraphError = result.unwrap_err().into();
    assert!(matches!(wrapped, GraphError::Topology(_)));
}
