use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 输入节点：节点特征、标签等由外部提供且不参与训练的数据
#[derive(Clone)]
pub(in crate::nn) struct Input {
    shape: Vec<usize>,
}

impl Input {
    pub(in crate::nn) fn new(shape: &[usize]) -> Result<Self, GraphError> {
        if shape.len() != 2 {
            return Err(GraphError::InvalidOperation(format!(
                "节点形状须为二维[行, 列]，但得到{shape:?}"
            )));
        }
        Ok(Self {
            shape: shape.to_vec(),
        })
    }
}

impl TraitNode for Input {
    fn type_name(&self) -> &'static str {
        "Input"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn is_leaf(&self) -> bool {
        true
    }

    fn calc_value_by_parents(&mut self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "输入节点不能通过前向传播计算，请先手动设置其值".to_string(),
        ))
    }

    fn calc_grad_to_parent(
        &self,
        _parent_index: usize,
        _parents: &[&Tensor],
        _upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation("输入节点没有父节点".to_string()))
    }
}
