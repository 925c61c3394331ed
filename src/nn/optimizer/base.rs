/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 优化器基础trait和辅助结构
 */

use crate::nn::{Graph, GraphError, NodeId};
use crate::tensor::Tensor;

/// 优化器核心 trait
///
/// 训练循环：
/// ```ignore
/// optimizer.zero_grad(&mut graph);
/// graph.forward_node(loss)?;
/// graph.backward(loss)?;
/// optimizer.step(&mut graph)?; // 只更新参数，不做 forward/backward
/// ```
pub trait Optimizer {
    /// 用节点上已计算的梯度更新参数；没有梯度的参数保持不变
    fn step(&mut self, graph: &mut Graph) -> Result<(), GraphError>;

    /// 重置累积状态（如Adam的矩估计）
    fn reset(&mut self);

    fn learning_rate(&self) -> f32;

    fn set_learning_rate(&mut self, lr: f32);

    /// 清空计算图中所有节点的梯度
    fn zero_grad(&self, graph: &mut Graph) {
        graph.zero_grad();
    }

    /// 前向 + 反向 + 更新，返回更新前的损失值
    fn minimize(&mut self, graph: &mut Graph, loss: NodeId) -> Result<f32, GraphError> {
        self.zero_grad(graph);
        graph.forward_node(loss)?;
        let loss_value = graph.backward(loss)?;
        self.step(graph)?;
        Ok(loss_value)
    }
}

/// 优化器状态管理（内部实现，不对外暴露）
pub(super) struct OptimizerState {
    /// 可训练参数的节点 ID 列表
    trainable_nodes: Vec<NodeId>,
    learning_rate: f32,
}

impl OptimizerState {
    /// 自动获取图中所有可训练节点
    pub(super) fn new(graph: &Graph, learning_rate: f32) -> Result<Self, GraphError> {
        check_learning_rate(learning_rate)?;
        Ok(Self {
            trainable_nodes: graph.get_trainable_nodes(),
            learning_rate,
        })
    }

    /// 只优化指定的参数（如冻结部分层）
    pub(super) fn with_params(params: &[NodeId], learning_rate: f32) -> Result<Self, GraphError> {
        check_learning_rate(learning_rate)?;
        Ok(Self {
            trainable_nodes: params.to_vec(),
            learning_rate,
        })
    }

    pub(super) const fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub(super) const fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }

    /// 收集`(参数, 当前值, 梯度)`；先复制出来以免与随后的写入冲突
    pub(super) fn collect_updates(&self, graph: &Graph) -> Result<Vec<(NodeId, Tensor, Tensor)>, GraphError> {
        let mut updates = Vec::with_capacity(self.trainable_nodes.len());
        for &node_id in &self.trainable_nodes {
            let Some(grad) = graph.get_node_grad(node_id)? else {
                continue;
            };
            let value = graph.get_node_value(node_id)?.ok_or_else(|| {
                GraphError::ComputationError(format!("参数{node_id:?}没有值，无法更新"))
            })?;
            updates.push((node_id, value.clone(), grad.clone()));
        }
        Ok(updates)
    }
}

fn check_learning_rate(learning_rate: f32) -> Result<(), GraphError> {
    if learning_rate <= 0.0 || !learning_rate.is_finite() {
        return Err(GraphError::InvalidOperation(format!(
            "学习率须为正数，但得到: {learning_rate}"
        )));
    }
    Ok(())
}
