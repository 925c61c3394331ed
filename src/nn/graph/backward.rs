/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 反向传播（VJP 模式）
 *
 * 从损失节点（[1, 1]）出发，按逆拓扑序把上游梯度逐层传给父节点；
 * 只有祖先中含参数节点的节点才会收到梯度。
 */

use std::collections::HashSet;

use tracing::debug;

use super::{Graph, GraphError};
use crate::nn::NodeId;
use crate::tensor::Tensor;

impl Graph {
    /// 反向传播，返回损失值
    ///
    /// 参数节点的梯度在多次调用间累加，直到`zero_grad`；其余节点的梯度每次重置。
    pub fn backward(&mut self, loss_id: NodeId) -> Result<f32, GraphError> {
        let loss_node = self.get_node(loss_id)?;
        let loss_value = loss_node.value().ok_or_else(|| {
            GraphError::ComputationError(format!("损失{loss_node}没有值，请先执行forward_node"))
        })?;
        if !loss_value.is_scalar() {
            return Err(GraphError::InvalidOperation(format!(
                "反向传播要求损失为标量[1, 1]，但得到{:?}",
                loss_value.shape()
            )));
        }
        let loss_scalar = loss_value[[0, 0]];

        self.reset_intermediate_grad();

        let topo_order = self.topological_sort_backward(loss_id)?;
        let requires_grad = self.collect_requires_grad(&topo_order)?;

        self.get_node_mut(loss_id)?.accumulate_grad(Tensor::ones(&[1, 1]));
        for node_id in topo_order.iter().rev() {
            if requires_grad.contains(node_id) {
                self.propagate_grad_to_parents(*node_id, &requires_grad)?;
            }
        }

        debug!(graph = %self.name, loss = loss_scalar, nodes = topo_order.len(), "反向传播完成");
        Ok(loss_scalar)
    }

    /// 清除非参数节点的梯度
    fn reset_intermediate_grad(&mut self) {
        for node in self.nodes.values_mut() {
            if !node.is_trainable() {
                node.clear_grad();
            }
        }
    }

    /// 后序DFS：每个节点都排在它的所有父节点之后
    fn topological_sort_backward(&self, loss_id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        fn dfs(
            graph: &Graph,
            node_id: NodeId,
            visited: &mut HashSet<NodeId>,
            result: &mut Vec<NodeId>,
        ) -> Result<(), GraphError> {
            if !visited.insert(node_id) {
                return Ok(());
            }
            for parent_id in graph.get_node_parents(node_id)? {
                dfs(graph, parent_id, visited, result)?;
            }
            result.push(node_id);
            Ok(())
        }

        let mut result = Vec::new();
        let mut visited = HashSet::new();
        dfs(self, loss_id, &mut visited, &mut result)?;
        Ok(result)
    }

    /// 本身可训练或者有可训练祖先的节点
    fn collect_requires_grad(&self, topo_order: &[NodeId]) -> Result<HashSet<NodeId>, GraphError> {
        let mut requires_grad = HashSet::new();
        for node_id in topo_order {
            let needs = self.get_node(*node_id)?.is_trainable()
                || self
                    .get_node_parents(*node_id)?
                    .iter()
                    .any(|p| requires_grad.contains(p));
            if needs {
                requires_grad.insert(*node_id);
            }
        }
        Ok(requires_grad)
    }

    fn propagate_grad_to_parents(
        &mut self,
        node_id: NodeId,
        requires_grad: &HashSet<NodeId>,
    ) -> Result<(), GraphError> {
        let parents_ids = self.get_node_parents(node_id)?;
        if parents_ids.is_empty() {
            return Ok(());
        }
        let parent_values = self.collect_parent_values(&parents_ids)?;
        let parent_refs = parent_values.iter().collect::<Vec<_>>();

        let mut grads = Vec::with_capacity(parents_ids.len());
        {
            let node = self.get_node(node_id)?;
            for (index, parent_id) in parents_ids.iter().enumerate() {
                if requires_grad.contains(parent_id) {
                    grads.push((*parent_id, node.calc_grad_to_parent(index, &parent_refs)?));
                }
            }
        }

        for (parent_id, grad) in grads {
            self.get_node_mut(parent_id)?.accumulate_grad(grad);
        }
        Ok(())
    }
}
