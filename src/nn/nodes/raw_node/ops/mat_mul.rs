use super::invalid_parent_index;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 矩阵乘法节点：`C = A·B`
///
/// backward：
/// - dL/dA = dL/dC · Bᵀ
/// - dL/dB = Aᵀ · dL/dC
#[derive(Clone)]
pub(in crate::nn) struct MatMul {
    shape: Vec<usize>,
}

impl MatMul {
    pub(in crate::nn) fn new(left_shape: &[usize], right_shape: &[usize]) -> Result<Self, GraphError> {
        if left_shape[1] != right_shape[0] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![left_shape[1], right_shape[1]],
                got: right_shape.to_vec(),
                message: format!(
                    "矩阵乘法要求左矩阵的列数等于右矩阵的行数，左矩阵形状为{left_shape:?}"
                ),
            });
        }
        Ok(Self {
            shape: vec![left_shape[0], right_shape[1]],
        })
    }
}

impl TraitNode for MatMul {
    fn type_name(&self) -> &'static str {
        "MatMul"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].mat_mul(parents[1]))
    }

    fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        match parent_index {
            0 => Ok(upstream_grad.mat_mul(&parents[1].transpose())),
            1 => Ok(parents[0].transpose().mat_mul(upstream_grad)),
            _ => Err(invalid_parent_index(self.type_name(), parent_index)),
        }
    }
}
