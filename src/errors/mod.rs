use thiserror::Error;
mod ops;
pub use self::ops::*;

/// 张量层面的错误。
/// 张量运算中的形状问题属于调用方的编程错误，故按惯例以本类型的信息`panic`，
/// 而面向用户的形状校验统一在构建计算图节点时以`GraphError`返回。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    #[error("数据长度{len}与形状{shape:?}所需的元素个数不一致")]
    DataLengthMismatch { len: usize, shape: Vec<usize> },
    #[error("张量的形状须为二维（[行, 列]），但得到{0:?}")]
    NotMatrix(Vec<usize>),
    #[error("张量列表为空")]
    EmptyList,
    #[error("列索引范围{start}..{end}超出列数{cols}")]
    ColumnRangeOutOfBounds { start: usize, end: usize, cols: usize },
}
