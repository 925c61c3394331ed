use std::sync::Arc;

use super::invalid_parent_index;
use crate::nn::GraphError;
use crate::nn::functional;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

/// 边打分节点（未激活）：`s_k = a · [Z[src_k] ‖ Z[dst_k]]`
///
/// ## 输入
/// - 父节点 0: 投影特征 Z，[N, F]
/// - 父节点 1: 注意力向量 a，[2F, 1]
///
/// ## 输出
/// - 每条边一个分数，[E, 1]；LeakyReLU由其后的独立节点完成
///
/// ## 反向传播
/// 记a的前后两半为a₁、a₂，上游梯度为g：
/// - dL/dZ[src_k] += g_k · a₁，dL/dZ[dst_k] += g_k · a₂
/// - dL/da₁ = Σ_k g_k · Z[src_k]，dL/da₂ = Σ_k g_k · Z[dst_k]
#[derive(Clone)]
pub(in crate::nn) struct EdgeScore {
    shape: Vec<usize>,
    edges: Arc<EdgeIndex>,
}

impl EdgeScore {
    pub(in crate::nn) fn new(edges: &Arc<EdgeIndex>) -> Self {
        Self {
            shape: vec![edges.num_edges(), 1],
            edges: Arc::clone(edges),
        }
    }
}

impl TraitNode for EdgeScore {
    fn type_name(&self) -> &'static str {
        "EdgeScore"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        functional::edge_logits(parents[0], parents[1], &self.edges)
    }

    fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let (z, a) = (parents[0], parents[1]);
        let f = z.cols();
        match parent_index {
            0 => {
                let mut grad = Tensor::zeros(z.shape());
                for k in 0..self.edges.num_edges() {
                    let (s, d) = self.edges.edge(k);
                    let g = upstream_grad[[k, 0]];
                    for c in 0..f {
                        grad[[s, c]] += g * a[[c, 0]];
                        grad[[d, c]] += g * a[[f + c, 0]];
                    }
                }
                Ok(grad)
            }
            1 => {
                let mut grad = Tensor::zeros(a.shape());
                for k in 0..self.edges.num_edges() {
                    let (s, d) = self.edges.edge(k);
                    let g = upstream_grad[[k, 0]];
                    for c in 0..f {
                        grad[[c, 0]] += g * z[[s, c]];
                        grad[[f + c, 0]] += g * z[[d, c]];
                    }
                }
                Ok(grad)
            }
            _ => Err(invalid_parent_index(self.type_name(), parent_index)),
        }
    }
}
