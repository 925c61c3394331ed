//! 图拓扑错误类型定义

use thiserror::Error;

/// 构建图拓扑（边表）时的错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// 边引用了不存在的节点
    #[error("第{edge}条边引用了节点{node}，但节点编号须在[0, {num_nodes})内")]
    InvalidGraphReference {
        edge: usize,
        node: usize,
        num_nodes: usize,
    },

    /// 源节点列表与目标节点列表长度不一致
    #[error("源节点列表长度{src}与目标节点列表长度{dst}不一致")]
    LengthMismatch { src: usize, dst: usize },
}
