mod input;
mod loss;
mod ops;
mod parameter;

pub(in crate::nn) use input::Input;
pub(in crate::nn) use loss::*;
pub(in crate::nn) use ops::*;
pub(in crate::nn) use parameter::Parameter;

use enum_dispatch::enum_dispatch;

use crate::nn::GraphError;
use crate::tensor::Tensor;

#[enum_dispatch]
pub(in crate::nn) enum NodeType {
    Input(Input),
    Parameter(Parameter),
    MatMul(MatMul),
    LeakyReLU(LeakyReLU),
    Elu(Elu),
    EdgeScore(EdgeScore),
    EdgeSoftmax(EdgeSoftmax),
    EdgeAggregate(EdgeAggregate),
    Concat(Concat),
    Mean(Mean),
    MaskedCrossEntropy(MaskedCrossEntropy),
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    /// 节点类型名，用于显示与自动命名
    fn type_name(&self) -> &'static str;

    /// 节点值的形状，在节点创建时即已确定
    fn value_expected_shape(&self) -> &[usize];

    /// 叶子节点（输入、参数）的值只能被手动设置，不能由前向传播得到
    fn is_leaf(&self) -> bool {
        false
    }

    /// 返回该节点的值是否应该在训练过程中被更新
    fn is_trainable(&self) -> bool {
        false
    }

    // 根据父节点的值计算本节点的值（由Graph保证调用前所有父节点都已有值）
    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError>;

    /// 给定损失对本节点值的梯度`upstream_grad`，计算损失对第`parent_index`个父节点值的梯度
    fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError>;
}
