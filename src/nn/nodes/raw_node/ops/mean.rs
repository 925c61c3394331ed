use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 逐元素平均节点：K个同形[N, F]父节点 -> [N, F]
///
/// 多头GAT的输出层用它对各头求平均（对头这一维平均，每个特征各自独立）。
#[derive(Clone)]
pub(in crate::nn) struct Mean {
    shape: Vec<usize>,
    num_parents: usize,
}

impl Mean {
    pub(in crate::nn) fn new(parent_shapes: &[&[usize]]) -> Result<Self, GraphError> {
        let first = parent_shapes.first().ok_or_else(|| {
            GraphError::InvalidOperation("Mean节点至少需要1个父节点".to_string())
        })?;
        for shape in parent_shapes {
            if shape != first {
                return Err(GraphError::ShapeMismatch {
                    expected: first.to_vec(),
                    got: shape.to_vec(),
                    message: "逐元素平均要求所有父节点形状相同".to_string(),
                });
            }
        }
        Ok(Self {
            shape: first.to_vec(),
            num_parents: parent_shapes.len(),
        })
    }
}

impl TraitNode for Mean {
    fn type_name(&self) -> &'static str {
        "Mean"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let mut sum = Tensor::zeros(&self.shape);
        for parent in parents {
            sum += *parent;
        }
        Ok(&sum / self.num_parents as f32)
    }

    fn calc_grad_to_parent(
        &self,
        _parent_index: usize,
        _parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad / self.num_parents as f32)
    }
}
