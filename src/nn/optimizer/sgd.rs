/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 梯度下降优化器实现
 */

use super::base::{Optimizer, OptimizerState};
use crate::nn::{Graph, GraphError, NodeId};

/// SGD (随机梯度下降) 优化器：`θ = θ - α * ∇θ`
pub struct SGD {
    state: OptimizerState,
}

impl SGD {
    /// 优化图中当前所有可训练节点
    pub fn new(graph: &Graph, learning_rate: f32) -> Result<Self, GraphError> {
        Ok(Self {
            state: OptimizerState::new(graph, learning_rate)?,
        })
    }

    pub fn with_params(params: &[NodeId], learning_rate: f32) -> Result<Self, GraphError> {
        Ok(Self {
            state: OptimizerState::with_params(params, learning_rate)?,
        })
    }
}

impl Optimizer for SGD {
    fn step(&mut self, graph: &mut Graph) -> Result<(), GraphError> {
        let lr = self.state.learning_rate();
        for (node_id, value, grad) in self.state.collect_updates(graph)? {
            let new_value = value - lr * &grad;
            graph.set_node_value(node_id, Some(&new_value))?;
        }
        Ok(())
    }

    fn reset(&mut self) {}

    fn learning_rate(&self) -> f32 {
        self.state.learning_rate()
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.state.set_learning_rate(lr);
    }
}
