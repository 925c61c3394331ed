use std::sync::Arc;

use crate::nn::GraphError;
use crate::nn::functional;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

/// 按目标节点分组的softmax节点，输入输出均为[E, 1]
///
/// 每个目标节点i只在自己的入边集合N(i)内归一化；没有入边的节点不产生任何系数。
///
/// 反向传播（组内）：dL/de_k = α_k · (g_k - Σ_{j∈N(i)} α_j · g_j)
#[derive(Clone)]
pub(in crate::nn) struct EdgeSoftmax {
    shape: Vec<usize>,
    edges: Arc<EdgeIndex>,
    /// 缓存前向得到的注意力系数，用于反向传播
    alpha_cache: Option<Tensor>,
}

impl EdgeSoftmax {
    pub(in crate::nn) fn new(edges: &Arc<EdgeIndex>) -> Self {
        Self {
            shape: vec![edges.num_edges(), 1],
            edges: Arc::clone(edges),
            alpha_cache: None,
        }
    }
}

impl TraitNode for EdgeSoftmax {
    fn type_name(&self) -> &'static str {
        "EdgeSoftmax"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let alpha = functional::edge_softmax(parents[0], &self.edges)?;
        self.alpha_cache = Some(alpha.clone());
        Ok(alpha)
    }

    fn calc_grad_to_parent(
        &self,
        _parent_index: usize,
        _parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let alpha = self.alpha_cache.as_ref().ok_or_else(|| {
            GraphError::ComputationError(
                "EdgeSoftmax没有缓存的注意力系数，请先执行前向传播".to_string(),
            )
        })?;

        let mut grad = Tensor::zeros(&self.shape);
        for i in 0..self.edges.num_nodes() {
            let group = self.edges.incoming(i);
            let weighted: f32 = group
                .iter()
                .map(|&k| alpha[[k, 0]] * upstream_grad[[k, 0]])
                .sum();
            for &k in group {
                grad[[k, 0]] = alpha[[k, 0]] * (upstream_grad[[k, 0]] - weighted);
            }
        }
        Ok(grad)
    }
}
