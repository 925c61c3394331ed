/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : 单头图注意力层（GAT）
 */

use std::sync::Arc;

use crate::nn::functional::DEFAULT_NEGATIVE_SLOPE;
use crate::nn::{Graph, GraphError, Init, Module, NodeId};
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

/// 单头图注意力层
///
/// 在固定拓扑上把`[N, F_in]`的节点特征映射为`[N, F_out]`：
/// 1. 投影：`Z = H · W`
/// 2. 打分：`e_k = LeakyReLU(a · [Z[src_k] ‖ Z[dst_k]])`
/// 3. 按目标节点分组做softmax得到注意力系数`α`
/// 4. 聚合：`H'[i] = Σ_{k: dst_k = i} α_k Z[src_k]`，没有入边的节点输出零向量
///
/// # 参数
/// - `W`: [in_features, out_features]，无偏置
/// - `a`: [2 * out_features, 1]，前半作用于源节点，后半作用于目标节点
///
/// # 使用示例
/// ```ignore
/// let mut layer = GatLayer::new(&mut graph, &edges, 1433, 8, "gat")?;
/// let out = layer.forward(&mut graph, x)?;
/// graph.forward_node(out)?;
/// ```
pub struct GatLayer {
    weight: NodeId,
    attn: NodeId,
    edges: Arc<EdgeIndex>,
    in_features: usize,
    out_features: usize,
    negative_slope: f32,
    name: String,
    /// 最近一次`forward`建立的注意力系数节点
    attention: Option<NodeId>,
}

impl GatLayer {
    /// 以默认负斜率（0.2）创建
    pub fn new(
        graph: &mut Graph,
        edges: &Arc<EdgeIndex>,
        in_features: usize,
        out_features: usize,
        name: &str,
    ) -> Result<Self, GraphError> {
        Self::new_with_slope(graph, edges, in_features, out_features, DEFAULT_NEGATIVE_SLOPE, name)
    }

    pub fn new_with_slope(
        graph: &mut Graph,
        edges: &Arc<EdgeIndex>,
        in_features: usize,
        out_features: usize,
        negative_slope: f32,
        name: &str,
    ) -> Result<Self, GraphError> {
        Self::new_with_init(graph, edges, in_features, out_features, negative_slope, Init::xavier_relu(), name)
    }

    /// 以指定的初始化策略创建`W`与`a`
    pub fn new_with_init(
        graph: &mut Graph,
        edges: &Arc<EdgeIndex>,
        in_features: usize,
        out_features: usize,
        negative_slope: f32,
        init: Init,
        name: &str,
    ) -> Result<Self, GraphError> {
        if in_features == 0 || out_features == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "GAT层{name}的输入/输出宽度须大于0，但得到{in_features}/{out_features}"
            )));
        }
        if negative_slope < 0.0 || !negative_slope.is_finite() {
            return Err(GraphError::InvalidOperation(format!(
                "GAT层{name}的负斜率应为非负数，但得到: {negative_slope}"
            )));
        }
        let weight = graph.new_parameter_node(&[in_features, out_features], init, Some(&format!("{name}_W")))?;
        let attn = graph.new_parameter_node(&[2 * out_features, 1], init, Some(&format!("{name}_a")))?;
        Ok(Self {
            weight,
            attn,
            edges: Arc::clone(edges),
            in_features,
            out_features,
            negative_slope,
            name: name.to_string(),
            attention: None,
        })
    }

    /// `Z = H · W`；`h`的列数须等于`in_features`
    pub fn project(&self, graph: &mut Graph, h: NodeId) -> Result<NodeId, GraphError> {
        let cols = graph.get_node_shape(h)?[1];
        if cols != self.in_features {
            return Err(GraphError::ShapeMismatch {
                expected: vec![self.edges.num_nodes(), self.in_features],
                got: graph.get_node_shape(h)?.to_vec(),
                message: format!("GAT层{}的输入宽度与投影矩阵的行数不一致", self.name),
            });
        }
        graph.new_mat_mul_node(h, self.weight, None)
    }

    /// 每条边的注意力分数`LeakyReLU(a · [Z[src] ‖ Z[dst]])`，形状[E, 1]
    pub fn score_edges(&self, graph: &mut Graph, z: NodeId) -> Result<NodeId, GraphError> {
        let raw = graph.new_edge_score_node(z, self.attn, &self.edges, None)?;
        graph.new_leaky_relu_node(raw, self.negative_slope, None)
    }

    /// 分组softmax后按系数聚合源节点特征，形状[N, out_features]
    pub fn aggregate(&mut self, graph: &mut Graph, z: NodeId, scores: NodeId) -> Result<NodeId, GraphError> {
        let alpha = graph.new_edge_softmax_node(scores, &self.edges, None)?;
        self.attention = Some(alpha);
        graph.new_edge_aggregate_node(z, alpha, &self.edges, None)
    }

    /// 依次建立投影、打分与聚合节点，返回输出节点
    pub fn forward(&mut self, graph: &mut Graph, h: NodeId) -> Result<NodeId, GraphError> {
        let z = self.project(graph, h)?;
        let scores = self.score_edges(graph, z)?;
        self.aggregate(graph, z, scores)
    }

    /// 最近一次前向传播得到的注意力系数`[E, 1]`；尚未建图或未计算时为None
    pub fn attention_coefficients(&self, graph: &Graph) -> Result<Option<Tensor>, GraphError> {
        match self.attention {
            Some(id) => Ok(graph.get_node_value(id)?.cloned()),
            None => Ok(None),
        }
    }

    pub fn weight(&self) -> NodeId {
        self.weight
    }

    pub fn attn(&self) -> NodeId {
        self.attn
    }

    pub fn edges(&self) -> &Arc<EdgeIndex> {
        &self.edges
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn negative_slope(&self) -> f32 {
        self.negative_slope
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Module for GatLayer {
    fn parameters(&self) -> Vec<NodeId> {
        vec![self.weight, self.attn]
    }
}
