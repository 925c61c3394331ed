/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 节点创建方法。所有形状检查都在建图时完成，
 *                 因此前向传播阶段不会再出现形状错误
 */

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Graph, GraphError};
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{
    Concat, EdgeAggregate, EdgeScore, EdgeSoftmax, Elu, Input, LeakyReLU, MaskedCrossEntropy,
    MatMul, Mean, NodeType, Parameter,
};
use crate::nn::{Init, NodeId};
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

impl Graph {
    fn generate_valid_node_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    fn check_duplicate_node_name(&self, name: &str) -> Result<(), GraphError> {
        if self.nodes.values().any(|node| node.name() == name) {
            return Err(GraphError::DuplicateNodeName(format!(
                "节点{}在图{}中重复",
                name,
                self.name()
            )));
        }
        Ok(())
    }

    fn generate_valid_new_node_name(&self, name: Option<&str>, prefix: &str) -> Result<String, GraphError> {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.check_duplicate_node_name(name)?;
            return Ok(name.to_string());
        }
        let mut counter = 1;
        loop {
            let name = format!("{prefix}_{counter}");
            if self.check_duplicate_node_name(&name).is_ok() {
                return Ok(name);
            }
            counter += 1;
        }
    }

    fn add_node_to_list(
        &mut self,
        raw_node: impl Into<NodeType>,
        name: Option<&str>,
        prefix: &str,
        parents: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        for parent_id in parents {
            self.get_node(*parent_id)?;
        }
        let node_name = self.generate_valid_new_node_name(name, prefix)?;
        let node_id = self.generate_valid_node_id();

        for &parent_id in parents {
            self.forward_edges.entry(parent_id).or_default().push(node_id);
        }
        self.backward_edges
            .entry(node_id)
            .or_default()
            .extend(parents);

        self.nodes
            .insert(node_id, NodeHandle::new(node_id, &node_name, raw_node));
        Ok(node_id)
    }

    fn shape_of(&self, id: NodeId) -> Result<Vec<usize>, GraphError> {
        Ok(self.get_node_shape(id)?.to_vec())
    }

    /// 输入节点，值需通过`set_node_value`设置
    pub fn new_input_node(&mut self, shape: &[usize], name: Option<&str>) -> Result<NodeId, GraphError> {
        let node = Input::new(shape)?;
        self.add_node_to_list(node, name, "input", &[])
    }

    /// 参数节点：若图带有种子则用图的RNG初始化，否则使用thread_rng
    pub fn new_parameter_node(
        &mut self,
        shape: &[usize],
        init: Init,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let value = match self.rng.as_mut() {
            Some(rng) => init.generate_with_rng(shape, rng),
            None => init.generate_with_rng(shape, &mut rand::thread_rng()),
        };
        self.new_parameter_node_with_value(shape, &value, name)
    }

    /// 以独立的种子初始化参数节点（不影响图自身的RNG状态）
    pub fn new_parameter_node_seeded(
        &mut self,
        shape: &[usize],
        init: Init,
        name: Option<&str>,
        seed: u64,
    ) -> Result<NodeId, GraphError> {
        let value = init.generate_with_rng(shape, &mut StdRng::seed_from_u64(seed));
        self.new_parameter_node_with_value(shape, &value, name)
    }

    fn new_parameter_node_with_value(
        &mut self,
        shape: &[usize],
        value: &Tensor,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Parameter::new(shape)?;
        let id = self.add_node_to_list(node, name, "parameter", &[])?;
        self.set_node_value(id, Some(value))?;
        Ok(id)
    }

    /// `left · right`
    pub fn new_mat_mul_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = MatMul::new(&self.shape_of(left)?, &self.shape_of(right)?)?;
        self.add_node_to_list(node, name, "mat_mul", &[left, right])
    }

    pub fn new_leaky_relu_node(
        &mut self,
        parent: NodeId,
        negative_slope: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = LeakyReLU::new(&self.shape_of(parent)?, negative_slope)?;
        self.add_node_to_list(node, name, "leaky_relu", &[parent])
    }

    pub fn new_elu_node(&mut self, parent: NodeId, alpha: f32, name: Option<&str>) -> Result<NodeId, GraphError> {
        let node = Elu::new(&self.shape_of(parent)?, alpha)?;
        self.add_node_to_list(node, name, "elu", &[parent])
    }

    /// 每条边的未激活注意力分数`a · [Z[src] ‖ Z[dst]]`，形状[E, 1]
    ///
    /// `z`须为[N, F]（N与边表节点数一致），`attn`须为[2F, 1]
    pub fn new_edge_score_node(
        &mut self,
        z: NodeId,
        attn: NodeId,
        edges: &Arc<EdgeIndex>,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let z_shape = self.shape_of(z)?;
        check_node_count(&z_shape, edges)?;
        let a_shape = self.shape_of(attn)?;
        let expected = vec![2 * z_shape[1], 1];
        if a_shape != expected {
            return Err(GraphError::ShapeMismatch {
                expected,
                got: a_shape,
                message: "注意力向量的长度须为投影特征宽度的2倍".to_string(),
            });
        }
        self.add_node_to_list(EdgeScore::new(edges), name, "edge_score", &[z, attn])
    }

    /// 按目标节点分组的softmax，形状[E, 1]
    pub fn new_edge_softmax_node(
        &mut self,
        scores: NodeId,
        edges: &Arc<EdgeIndex>,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        check_edge_count(&self.shape_of(scores)?, edges)?;
        self.add_node_to_list(EdgeSoftmax::new(edges), name, "edge_softmax", &[scores])
    }

    /// `H'[i] = Σ_{k: dst_k = i} α_k Z[src_k]`，形状与`z`相同
    pub fn new_edge_aggregate_node(
        &mut self,
        z: NodeId,
        alpha: NodeId,
        edges: &Arc<EdgeIndex>,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let z_shape = self.shape_of(z)?;
        check_node_count(&z_shape, edges)?;
        check_edge_count(&self.shape_of(alpha)?, edges)?;
        let node = EdgeAggregate::new(&z_shape, edges);
        self.add_node_to_list(node, name, "edge_aggregate", &[z, alpha])
    }

    /// 沿特征轴（列）拼接
    pub fn new_concat_node(&mut self, parents: &[NodeId], name: Option<&str>) -> Result<NodeId, GraphError> {
        let shapes = parents
            .iter()
            .map(|id| self.shape_of(*id))
            .collect::<Result<Vec<_>, _>>()?;
        let shape_refs = shapes.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let node = Concat::new(&shape_refs)?;
        self.add_node_to_list(node, name, "concat", parents)
    }

    /// 同形状父节点的逐元素平均
    pub fn new_mean_node(&mut self, parents: &[NodeId], name: Option<&str>) -> Result<NodeId, GraphError> {
        let shapes = parents
            .iter()
            .map(|id| self.shape_of(*id))
            .collect::<Result<Vec<_>, _>>()?;
        let shape_refs = shapes.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let node = Mean::new(&shape_refs)?;
        self.add_node_to_list(node, name, "mean", parents)
    }

    /// 只在`mask`所列行上求平均的交叉熵；`labels`为独热编码
    pub fn new_masked_cross_entropy_node(
        &mut self,
        logits: NodeId,
        labels: NodeId,
        mask: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = MaskedCrossEntropy::new(&self.shape_of(logits)?, &self.shape_of(labels)?, mask)?;
        self.add_node_to_list(node, name, "masked_cross_entropy", &[logits, labels])
    }
}

fn check_node_count(z_shape: &[usize], edges: &EdgeIndex) -> Result<(), GraphError> {
    if z_shape[0] != edges.num_nodes() {
        return Err(GraphError::ShapeMismatch {
            expected: vec![edges.num_nodes(), z_shape[1]],
            got: z_shape.to_vec(),
            message: "特征矩阵的行数须等于图的节点数".to_string(),
        });
    }
    Ok(())
}

fn check_edge_count(shape: &[usize], edges: &EdgeIndex) -> Result<(), GraphError> {
    let expected = vec![edges.num_edges(), 1];
    if shape != expected.as_slice() {
        return Err(GraphError::ShapeMismatch {
            expected,
            got: shape.to_vec(),
            message: "边值须为每条边一行的列向量".to_string(),
        });
    }
    Ok(())
}
