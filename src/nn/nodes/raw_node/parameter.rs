use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 参数节点：投影矩阵W、注意力向量a等可训练参数，由优化器在两次前向传播之间原地更新
#[derive(Clone)]
pub(in crate::nn) struct Parameter {
    shape: Vec<usize>,
}

impl Parameter {
    pub(in crate::nn) fn new(shape: &[usize]) -> Result<Self, GraphError> {
        if shape.len() != 2 {
            return Err(GraphError::InvalidOperation(format!(
                "参数形状须为二维[行, 列]，但得到{shape:?}"
            )));
        }
        Ok(Self {
            shape: shape.to_vec(),
        })
    }
}

impl TraitNode for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn is_leaf(&self) -> bool {
        true
    }

    fn is_trainable(&self) -> bool {
        true
    }

    fn calc_value_by_parents(&mut self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "参数节点的值只能被初始化或由优化器更新".to_string(),
        ))
    }

    fn calc_grad_to_parent(
        &self,
        _parent_index: usize,
        _parents: &[&Tensor],
        _upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation("参数节点没有父节点".to_string()))
    }
}
