use std::sync::Arc;

use super::invalid_parent_index;
use crate::nn::GraphError;
use crate::nn::functional;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

/// 加权聚合节点：`H'[i] = Σ_{k: dst_k = i} α_k · Z[src_k]`
///
/// ## 输入
/// - 父节点 0: 投影特征 Z，[N, F]
/// - 父节点 1: 注意力系数 α，[E, 1]
///
/// ## 反向传播
/// - dL/dZ[src_k] += α_k · G[dst_k]
/// - dL/dα_k = G[dst_k] · Z[src_k]
#[derive(Clone)]
pub(in crate::nn) struct EdgeAggregate {
    shape: Vec<usize>,
    edges: Arc<EdgeIndex>,
}

impl EdgeAggregate {
    pub(in crate::nn) fn new(z_shape: &[usize], edges: &Arc<EdgeIndex>) -> Self {
        Self {
            shape: z_shape.to_vec(),
            edges: Arc::clone(edges),
        }
    }
}

impl TraitNode for EdgeAggregate {
    fn type_name(&self) -> &'static str {
        "EdgeAggregate"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        functional::weighted_aggregate(parents[0], parents[1], &self.edges)
    }

    fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let (z, alpha) = (parents[0], parents[1]);
        match parent_index {
            0 => {
                let mut grad = Tensor::zeros(z.shape());
                for k in 0..self.edges.num_edges() {
                    let (s, d) = self.edges.edge(k);
                    let weight = alpha[[k, 0]];
                    for c in 0..z.cols() {
                        grad[[s, c]] += weight * upstream_grad[[d, c]];
                    }
                }
                Ok(grad)
            }
            1 => {
                let mut grad = Tensor::zeros(alpha.shape());
                for k in 0..self.edges.num_edges() {
                    let (s, d) = self.edges.edge(k);
                    grad[[k, 0]] = upstream_grad.row(d).dot(&z.row(s));
                }
                Ok(grad)
            }
            _ => Err(invalid_parent_index(self.type_name(), parent_index)),
        }
    }
}
