//! 数据集构造错误类型定义

use thiserror::Error;

use crate::topology::TopologyError;

/// 数据集构造相关错误
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    /// 配置不合法（节点数不足以划分训练/验证/测试集、概率越界等）
    #[error("数据集配置错误: {0}")]
    InvalidConfig(String),

    /// 索引越界（标签超出类别数、掩码超出节点数）
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 形状不匹配
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 边表错误
    #[error(transparent)]
    Topology(#[from] TopologyError),
}
