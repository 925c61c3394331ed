/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : Adam优化器实现
 */

use std::collections::HashMap;

use super::base::{Optimizer, OptimizerState};
use crate::nn::{Graph, GraphError, NodeId};
use crate::tensor::Tensor;

/// Adam优化器
///
/// `weight_decay > 0`时在梯度上加`λθ`（L2正则，与原始GAT训练设置一致）
pub struct Adam {
    state: OptimizerState,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    /// 一阶矩估计
    m: HashMap<NodeId, Tensor>,
    /// 二阶矩估计
    v: HashMap<NodeId, Tensor>,
    /// 时间步
    t: usize,
}

impl Adam {
    /// 创建新的Adam优化器（自动优化图中所有可训练节点）
    pub fn new(
        graph: &Graph,
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Result<Self, GraphError> {
        let state = OptimizerState::new(graph, learning_rate)?;
        Ok(Self::from_state(state, beta1, beta2, epsilon))
    }

    /// 使用默认参数创建Adam优化器
    pub fn new_default(graph: &Graph, learning_rate: f32) -> Result<Self, GraphError> {
        Self::new(graph, learning_rate, 0.9, 0.999, 1e-8)
    }

    /// 只优化指定的参数
    pub fn with_params(
        params: &[NodeId],
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Result<Self, GraphError> {
        let state = OptimizerState::with_params(params, learning_rate)?;
        Ok(Self::from_state(state, beta1, beta2, epsilon))
    }

    fn from_state(state: OptimizerState, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            state,
            beta1,
            beta2,
            epsilon,
            weight_decay: 0.0,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    /// 设置L2权重衰减系数
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }

    fn adam_update(&mut self, node_id: NodeId, value: &Tensor, gradient: &Tensor) -> Tensor {
        let gradient = if self.weight_decay > 0.0 {
            gradient + &(value * self.weight_decay)
        } else {
            gradient.clone()
        };

        // m = β1 * m + (1 - β1) * g
        let m = self
            .m
            .entry(node_id)
            .or_insert_with(|| Tensor::zeros(gradient.shape()));
        *m *= self.beta1;
        *m += &(&gradient * (1.0 - self.beta1));

        // v = β2 * v + (1 - β2) * g²
        let v = self
            .v
            .entry(node_id)
            .or_insert_with(|| Tensor::zeros(gradient.shape()));
        *v *= self.beta2;
        *v += &(&(&gradient * &gradient) * (1.0 - self.beta2));

        // 偏差修正
        let m_hat = &*m / (1.0 - self.beta1.powi(self.t as i32));
        let v_hat = &*v / (1.0 - self.beta2.powi(self.t as i32));

        // θ = θ - α * m_hat / (√v_hat + ε)
        let update = &m_hat / &(&v_hat.sqrt() + self.epsilon);
        value - &(self.state.learning_rate() * &update)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, graph: &mut Graph) -> Result<(), GraphError> {
        self.t += 1;
        for (node_id, value, gradient) in self.state.collect_updates(graph)? {
            let new_value = self.adam_update(node_id, &value, &gradient);
            graph.set_node_value(node_id, Some(&new_value))?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.state.learning_rate()
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.state.set_learning_rate(lr);
    }
}
