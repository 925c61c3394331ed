/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 两层GAT模型：多头拼接 -> ELU -> 多头平均
 */

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::functional::DEFAULT_NEGATIVE_SLOPE;
use super::{Graph, GraphError, HeadMerge, Module, MultiHeadGat, NodeId};
use crate::topology::EdgeIndex;

/// 模型超参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatConfig {
    /// 输入特征宽度
    pub in_features: usize,
    /// 第一层每个头的输出宽度
    pub hidden_features: usize,
    /// 第一层的头数
    pub heads: usize,
    /// 类别数，即第二层每个头的输出宽度
    pub num_classes: usize,
    /// 第二层的头数
    pub out_heads: usize,
    pub negative_slope: f32,
    pub elu_alpha: f32,
}

impl Default for GatConfig {
    fn default() -> Self {
        Self {
            in_features: 0,
            hidden_features: 8,
            heads: 8,
            num_classes: 0,
            out_heads: 1,
            negative_slope: DEFAULT_NEGATIVE_SLOPE,
            elu_alpha: 1.0,
        }
    }
}

impl GatConfig {
    pub fn new(in_features: usize, num_classes: usize) -> Self {
        Self {
            in_features,
            num_classes,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        let widths = [
            ("in_features", self.in_features),
            ("hidden_features", self.hidden_features),
            ("heads", self.heads),
            ("num_classes", self.num_classes),
            ("out_heads", self.out_heads),
        ];
        if let Some((field, _)) = widths.iter().find(|(_, v)| *v == 0) {
            return Err(GraphError::InvalidOperation(format!(
                "模型配置中{field}须大于0"
            )));
        }
        Ok(())
    }
}

/// 两层GAT
///
/// `layer1`（拼接，`heads`个头，每头`hidden_features`）-> ELU ->
/// `layer2`（平均，`out_heads`个头，每头`num_classes`），输出即各类别的logits。
pub struct GatModel {
    layer1: MultiHeadGat,
    layer2: MultiHeadGat,
    elu_alpha: f32,
}

impl GatModel {
    pub fn new(graph: &mut Graph, edges: &Arc<EdgeIndex>, config: &GatConfig) -> Result<Self, GraphError> {
        config.validate()?;
        let layer1 = MultiHeadGat::new_with_slope(
            graph,
            edges,
            config.in_features,
            config.hidden_features,
            config.heads,
            HeadMerge::Concat,
            config.negative_slope,
            "layer1",
        )?;
        let layer2 = MultiHeadGat::new_with_slope(
            graph,
            edges,
            config.hidden_features * config.heads,
            config.num_classes,
            config.out_heads,
            HeadMerge::Mean,
            config.negative_slope,
            "layer2",
        )?;
        Self::from_layers(layer1, layer2, config.elu_alpha)
    }

    /// 由已有的两层组装：`layer1`须为拼接、`layer2`须为平均，
    /// 且`layer2`的输入宽度须等于`layer1`拼接后的输出宽度
    pub fn from_layers(layer1: MultiHeadGat, layer2: MultiHeadGat, elu_alpha: f32) -> Result<Self, GraphError> {
        if layer1.merge() != HeadMerge::Concat || layer2.merge() != HeadMerge::Mean {
            return Err(GraphError::InvalidOperation(format!(
                "第一层须拼接各头、第二层须平均各头，但得到{:?}/{:?}",
                layer1.merge(),
                layer2.merge()
            )));
        }
        if layer2.in_features() != layer1.out_features() {
            return Err(GraphError::ShapeMismatch {
                expected: vec![layer1.out_features()],
                got: vec![layer2.in_features()],
                message: "第二层的输入宽度须等于第一层合并后的输出宽度".to_string(),
            });
        }
        Ok(Self {
            layer1,
            layer2,
            elu_alpha,
        })
    }

    /// 建立整条前向路径，返回logits节点[N, num_classes]
    pub fn forward(&mut self, graph: &mut Graph, h: NodeId) -> Result<NodeId, GraphError> {
        let hidden = self.layer1.forward_cat(graph, h)?;
        let hidden = graph.new_elu_node(hidden, self.elu_alpha, None)?;
        self.layer2.forward_avg(graph, hidden)
    }

    pub fn layer1(&self) -> &MultiHeadGat {
        &self.layer1
    }

    pub fn layer2(&self) -> &MultiHeadGat {
        &self.layer2
    }

    pub fn num_classes(&self) -> usize {
        self.layer2.out_features()
    }
}

impl Module for GatModel {
    fn parameters(&self) -> Vec<NodeId> {
        let mut params = self.layer1.parameters();
        params.extend(self.layer2.parameters());
        params
    }
}
