/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 计算图节点：节点编号、节点句柄（持有值与梯度）以及具体的节点类型
 */

pub(in crate::nn) mod raw_node;

use std::fmt;

use raw_node::{NodeType, TraitNode};

use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 节点在所属计算图中的唯一编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// 节点句柄：在具体节点类型之外统一保存名称、值、梯度与前向传播批次
pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
    value: Option<Tensor>,
    /// 结果节点（损失）对本节点值的梯度，形状与值相同
    grad: Option<Tensor>,
    last_forward_pass_id: u64,
}

impl NodeHandle {
    pub(in crate::nn) fn new<T: Into<NodeType>>(id: NodeId, name: &str, raw_node: T) -> Self {
        Self {
            id,
            name: name.to_string(),
            raw_node: raw_node.into(),
            value: None,
            grad: None,
            last_forward_pass_id: 0,
        }
    }

    pub(in crate::nn) fn id(&self) -> NodeId {
        self.id
    }

    pub(in crate::nn) fn name(&self) -> &str {
        &self.name
    }

    pub(in crate::nn) fn type_name(&self) -> &'static str {
        self.raw_node.type_name()
    }

    pub(in crate::nn) fn value_expected_shape(&self) -> &[usize] {
        self.raw_node.value_expected_shape()
    }

    pub(in crate::nn) fn is_leaf(&self) -> bool {
        self.raw_node.is_leaf()
    }

    pub(in crate::nn) fn is_trainable(&self) -> bool {
        self.raw_node.is_trainable()
    }

    pub(in crate::nn) fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    /// 设置叶子节点（输入/参数）的值
    pub(in crate::nn) fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        if !self.is_leaf() {
            return Err(GraphError::InvalidOperation(format!(
                "{self}的值只能通过前向传播计算得到，不能直接设置"
            )));
        }
        if let Some(v) = value {
            if v.shape() != self.value_expected_shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: self.value_expected_shape().to_vec(),
                    got: v.shape().to_vec(),
                    message: format!("{self}的新值形状与节点形状不一致"),
                });
            }
        }
        self.value = value.cloned();
        Ok(())
    }

    pub(in crate::nn) fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    /// 将`grad`累加到本节点已有的梯度上
    pub(in crate::nn) fn accumulate_grad(&mut self, grad: Tensor) {
        match self.grad.as_mut() {
            Some(existing) => *existing += &grad,
            None => self.grad = Some(grad),
        }
    }

    pub(in crate::nn) fn clear_grad(&mut self) {
        self.grad = None;
    }

    pub(in crate::nn) fn last_forward_pass_id(&self) -> u64 {
        self.last_forward_pass_id
    }

    pub(in crate::nn) fn set_last_forward_pass_id(&mut self, pass_id: u64) {
        self.last_forward_pass_id = pass_id;
    }

    /// 根据父节点的值计算并保存本节点的值
    pub(in crate::nn) fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let value = self.raw_node.calc_value_by_parents(parents)?;
        self.value = Some(value);
        Ok(())
    }

    /// 计算损失对第`parent_index`个父节点的梯度（向量-雅可比积）
    pub(in crate::nn) fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        parents: &[&Tensor],
    ) -> Result<Tensor, GraphError> {
        let upstream_grad = self.grad.as_ref().ok_or_else(|| {
            GraphError::ComputationError(format!("{self}没有梯度，无法继续反向传播"))
        })?;
        self.raw_node
            .calc_grad_to_parent(parent_index, parents, upstream_grad)
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "节点[id={}, name={}, type={}]",
            self.id.0,
            self.name,
            self.type_name()
        )
    }
}
