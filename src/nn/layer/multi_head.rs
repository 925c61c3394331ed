/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : 多头图注意力：K个独立参数的单头层作用于同一张图，再合并输出
 */

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::GatLayer;
use crate::nn::functional::DEFAULT_NEGATIVE_SLOPE;
use crate::nn::{Graph, GraphError, Module, NodeId};
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

/// 多头输出的合并方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadMerge {
    /// 沿特征轴拼接：[N, K*F]
    Concat,
    /// 逐特征对各头取平均：[N, F]
    Mean,
}

/// 多头GAT层
///
/// 各头的参数互不共享，头与头之间没有数据依赖，因此头的顺序只影响拼接时的列顺序。
pub struct MultiHeadGat {
    heads: Vec<GatLayer>,
    merge: HeadMerge,
    name: String,
}

impl MultiHeadGat {
    /// 创建`num_heads`个单头层，第k个头的参数名前缀为`{name}_head{k}`
    pub fn new(
        graph: &mut Graph,
        edges: &Arc<EdgeIndex>,
        in_features: usize,
        out_features: usize,
        num_heads: usize,
        merge: HeadMerge,
        name: &str,
    ) -> Result<Self, GraphError> {
        Self::new_with_slope(
            graph,
            edges,
            in_features,
            out_features,
            num_heads,
            merge,
            DEFAULT_NEGATIVE_SLOPE,
            name,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_with_slope(
        graph: &mut Graph,
        edges: &Arc<EdgeIndex>,
        in_features: usize,
        out_features: usize,
        num_heads: usize,
        merge: HeadMerge,
        negative_slope: f32,
        name: &str,
    ) -> Result<Self, GraphError> {
        if num_heads == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "多头层{name}至少需要1个头"
            )));
        }
        let heads = (0..num_heads)
            .map(|k| {
                GatLayer::new_with_slope(
                    graph,
                    edges,
                    in_features,
                    out_features,
                    negative_slope,
                    &format!("{name}_head{k}"),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_heads(heads, merge, name)
    }

    /// 由已有的单头层组装；各头须作用于同一张图且输入/输出宽度一致
    pub fn from_heads(heads: Vec<GatLayer>, merge: HeadMerge, name: &str) -> Result<Self, GraphError> {
        let first = heads.first().ok_or_else(|| {
            GraphError::InvalidOperation(format!("多头层{name}至少需要1个头"))
        })?;
        for head in &heads[1..] {
            if head.in_features() != first.in_features() || head.out_features() != first.out_features() {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![first.in_features(), first.out_features()],
                    got: vec![head.in_features(), head.out_features()],
                    message: format!("多头层{name}中{}的宽度与其他头不一致", head.name()),
                });
            }
            if head.edges() != first.edges() {
                return Err(GraphError::InvalidOperation(format!(
                    "多头层{name}中{}作用于不同的图",
                    head.name()
                )));
            }
        }
        Ok(Self {
            heads,
            merge,
            name: name.to_string(),
        })
    }

    /// 按建层时指定的方式合并
    pub fn forward(&mut self, graph: &mut Graph, h: NodeId) -> Result<NodeId, GraphError> {
        match self.merge {
            HeadMerge::Concat => self.forward_cat(graph, h),
            HeadMerge::Mean => self.forward_avg(graph, h),
        }
    }

    /// 各头输出沿特征轴拼接：[N, K*F_out]，第k个头占第`k*F_out..(k+1)*F_out`列
    pub fn forward_cat(&mut self, graph: &mut Graph, h: NodeId) -> Result<NodeId, GraphError> {
        let outputs = self.forward_heads(graph, h)?;
        let name = self.unique_output_name(graph, "cat");
        graph.new_concat_node(&outputs, Some(&name))
    }

    /// 各头输出逐特征平均：[N, F_out]
    pub fn forward_avg(&mut self, graph: &mut Graph, h: NodeId) -> Result<NodeId, GraphError> {
        let outputs = self.forward_heads(graph, h)?;
        let name = self.unique_output_name(graph, "avg");
        graph.new_mean_node(&outputs, Some(&name))
    }

    fn forward_heads(&mut self, graph: &mut Graph, h: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.heads
            .iter_mut()
            .map(|head| head.forward(graph, h))
            .collect()
    }

    /// 同一层被多次forward时，为合并节点生成不重复的名字
    fn unique_output_name(&self, graph: &Graph, suffix: &str) -> String {
        let base = format!("{}_{suffix}", self.name);
        if graph.find_node(&base).is_none() {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if graph.find_node(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// 合并后的输出宽度
    pub fn out_features(&self) -> usize {
        let per_head = self.heads[0].out_features();
        match self.merge {
            HeadMerge::Concat => per_head * self.heads.len(),
            HeadMerge::Mean => per_head,
        }
    }

    pub fn in_features(&self) -> usize {
        self.heads[0].in_features()
    }

    pub fn num_heads(&self) -> usize {
        self.heads.len()
    }

    pub fn heads(&self) -> &[GatLayer] {
        &self.heads
    }

    pub fn merge(&self) -> HeadMerge {
        self.merge
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 每个头最近一次前向传播的注意力系数
    pub fn attention_coefficients(&self, graph: &Graph) -> Result<Vec<Option<Tensor>>, GraphError> {
        self.heads
            .iter()
            .map(|head| head.attention_coefficients(graph))
            .collect()
    }
}

impl Module for MultiHeadGat {
    fn parameters(&self) -> Vec<NodeId> {
        self.heads.iter().flat_map(|head| head.parameters()).collect()
    }
}
