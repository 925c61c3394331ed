mod functional;
mod graph_serialization;
mod layer_gat;
mod node_masked_cross_entropy;

use std::sync::Arc;

use crate::nn::{Graph, NodeId};
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

/// 4节点路径图 0-1-2-3，每条无向边拆为两条有向边，不含自环
pub(super) fn path_graph() -> Arc<EdgeIndex> {
    Arc::new(EdgeIndex::new(4, &[(0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (3, 2)]).unwrap())
}

/// [[1,0,0],[0,1,0],[0,0,1],[1,1,1]]
pub(super) fn path_graph_features() -> Tensor {
    Tensor::new(
        &[1., 0., 0., 0., 1., 0., 0., 0., 1., 1., 1., 1.],
        &[4, 3],
    )
}

/// 每行一个类别的独热标签
pub(super) fn one_hot_labels(labels: &[usize], classes: usize) -> Tensor {
    let mut t = Tensor::zeros(&[labels.len(), classes]);
    for (i, &c) in labels.iter().enumerate() {
        t[[i, c]] = 1.0;
    }
    t
}

/// 用中心差分估计损失对参数节点的梯度
pub(super) fn numerical_grad(graph: &mut Graph, loss: NodeId, param: NodeId, eps: f32) -> Tensor {
    let original = graph.get_node_value(param).unwrap().unwrap().clone();
    let mut grad = Tensor::zeros(original.shape());
    for r in 0..original.rows() {
        for c in 0..original.cols() {
            let mut plus = original.clone();
            plus[[r, c]] += eps;
            graph.set_node_value(param, Some(&plus)).unwrap();
            graph.forward_node(loss).unwrap();
            let loss_plus = graph.get_node_value(loss).unwrap().unwrap()[[0, 0]];

            let mut minus = original.clone();
            minus[[r, c]] -= eps;
            graph.set_node_value(param, Some(&minus)).unwrap();
            graph.forward_node(loss).unwrap();
            let loss_minus = graph.get_node_value(loss).unwrap().unwrap()[[0, 0]];

            grad[[r, c]] = (loss_plus - loss_minus) / (2.0 * eps);
        }
    }
    graph.set_node_value(param, Some(&original)).unwrap();
    graph.forward_node(loss).unwrap();
    grad
}

/// 对每个参数比较反向传播梯度与数值梯度
pub(super) fn assert_grads_match_numerical(graph: &mut Graph, loss: NodeId, params: &[NodeId]) {
    graph.zero_grad();
    graph.forward_node(loss).unwrap();
    graph.backward(loss).unwrap();
    let analytic = params
        .iter()
        .map(|&p| graph.get_node_grad(p).unwrap().unwrap().clone())
        .collect::<Vec<_>>();

    for (&param, analytic) in params.iter().zip(analytic.iter()) {
        let numerical = numerical_grad(graph, loss, param, 1e-3);
        let diff = analytic.max_abs_diff(&numerical);
        assert!(
            diff < 3e-3,
            "参数{}的梯度与数值梯度相差{diff}\n解析: {analytic}\n数值: {numerical}",
            graph.get_node_name(param).unwrap()
        );
    }
}
