/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 计算图的定义与基础操作（节点查询、取值/赋值、前向传播）
 *
 * 各 impl 块分散在子模块中：
 * - builders.rs: new_*_node
 * - backward.rs: VJP 反向传播
 * - serialization.rs: save_params/load_params
 */

mod backward;
mod builders;
mod error;
mod serialization;

pub use error::GraphError;

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use crate::tensor::Tensor;

/// 计算图
///
/// 图是静态的：模型的`forward`只需调用一次来建立节点，之后每个训练步只需
/// 更新输入值，再依次调用`forward_node`、`backward`与优化器的`step`。
/// 图以`&mut`方式被独占使用，因此参数更新与前向/反向传播天然串行。
pub struct Graph {
    name: String,
    nodes: HashMap<NodeId, NodeHandle>,
    /// 正向边：parent_id -> child_ids（父节点指向子节点）
    forward_edges: HashMap<NodeId, Vec<NodeId>>,
    /// 反向边：child_id -> parent_ids（有序，顺序即父节点序号）
    backward_edges: HashMap<NodeId, Vec<NodeId>>,
    next_id: u64,
    /// 最后一次前向传播的 id
    last_forward_pass_id: u64,
    /// 图级别的随机数生成器（用于参数初始化）
    /// None 表示使用默认的 thread_rng（非确定性）
    rng: Option<StdRng>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_name("default_graph")
    }

    /// 创建带种子的图（用于确定性训练）
    pub fn new_with_seed(seed: u64) -> Self {
        let mut graph = Self::new();
        graph.rng = Some(StdRng::seed_from_u64(seed));
        graph
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: HashMap::new(),
            forward_edges: HashMap::new(),
            backward_edges: HashMap::new(),
            next_id: 0,
            last_forward_pass_id: 0,
            rng: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 按创建顺序返回所有节点编号
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut ids = self.nodes.keys().copied().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn get_node_parents(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.get_node(id)?;
        Ok(self.backward_edges.get(&id).cloned().unwrap_or_default())
    }

    pub fn get_node_children(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.get_node(id)?;
        Ok(self.forward_edges.get(&id).cloned().unwrap_or_default())
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    /// 按名称查找节点
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.name() == name)
            .map(NodeHandle::id)
    }

    /// 节点值的形状（节点创建时即已确定，无需先前向传播）
    pub fn get_node_shape(&self, id: NodeId) -> Result<&[usize], GraphError> {
        Ok(self.get_node(id)?.value_expected_shape())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    /// 设置输入或参数节点的值；运算节点的值只能通过前向传播得到
    pub fn set_node_value(&mut self, id: NodeId, value: Option<&Tensor>) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    /// 最近一次反向传播后损失对该节点的梯度
    pub fn get_node_grad(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.grad())
    }

    /// 所有可训练（参数）节点，按创建顺序
    pub fn get_trainable_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .into_iter()
            .filter(|id| self.nodes[id].is_trainable())
            .collect()
    }

    /// 清空所有节点的梯度
    pub fn zero_grad(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_grad();
        }
    }

    /// 前向传播计算`node_id`的值。同一次调用中每个祖先节点只计算一次
    pub fn forward_node(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        self.last_forward_pass_id += 1;
        let pass_id = self.last_forward_pass_id;
        self.forward_node_internal(node_id, pass_id)?;
        debug!(graph = %self.name, node = node_id.0, pass_id, "前向传播完成");
        Ok(())
    }

    fn forward_node_internal(&mut self, node_id: NodeId, pass_id: u64) -> Result<(), GraphError> {
        let node = self.get_node_mut(node_id)?;

        if node.is_leaf() {
            if node.value().is_none() {
                return Err(GraphError::InvalidOperation(format!(
                    "{node}没有值，不能参与前向传播"
                )));
            }
            node.set_last_forward_pass_id(pass_id);
            return Ok(());
        }
        if node.last_forward_pass_id() == pass_id {
            return Ok(());
        }

        let parents_ids = self.get_node_parents(node_id)?;
        for parent_id in &parents_ids {
            self.forward_node_internal(*parent_id, pass_id)?;
        }

        let parent_values = self.collect_parent_values(&parents_ids)?;
        let parent_refs = parent_values.iter().collect::<Vec<_>>();

        let node = self.get_node_mut(node_id)?;
        node.calc_value_by_parents(&parent_refs)?;
        node.set_last_forward_pass_id(pass_id);
        Ok(())
    }

    /// 复制父节点的值（父节点与本节点同在一个HashMap中，无法同时借用）
    fn collect_parent_values(&self, parents_ids: &[NodeId]) -> Result<Vec<Tensor>, GraphError> {
        parents_ids
            .iter()
            .map(|id| {
                let parent = self.get_node(*id)?;
                parent.value().cloned().ok_or_else(|| {
                    GraphError::ComputationError(format!(
                        "{parent}没有值。不该触及本错误，否则说明crate代码有问题"
                    ))
                })
            })
            .collect()
    }
}
