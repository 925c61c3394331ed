/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Graph 模块的错误类型
 */

use thiserror::Error;

use crate::nn::NodeId;
use crate::topology::TopologyError;

/// Graph 操作错误类型
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("节点{0:?}不存在")]
    NodeNotFound(NodeId),

    #[error("非法操作：{0}")]
    InvalidOperation(String),

    /// 投影输入的列数与W的行数不符、注意力向量长度不等于2*F_out等
    #[error("形状不匹配：期望{expected:?}，实际{got:?}。{message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    #[error("计算错误：{0}")]
    ComputationError(String),

    #[error("{0}")]
    DuplicateNodeName(String),

    /// 边表引用了越界的节点等拓扑错误
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error("参数读写失败：{0}")]
    Serialization(String),
}
