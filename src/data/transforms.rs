//! 数据变换函数
//!
//! 节点特征与标签的常用预处理：one-hot 编码、按行归一化。

use super::DataError;
use crate::tensor::Tensor;

/// 将类别索引转换为 one-hot 编码
///
/// # 参数
/// - `labels`: 每个节点的类别索引，值为 0..num_classes
/// - `num_classes`: 类别总数
///
/// # 返回
/// one-hot 编码 Tensor，形状 [N, num_classes]；任一标签越界时返回错误
///
/// # 示例
/// ```ignore
/// let encoded = one_hot(&[0, 2, 1], 3)?;
/// // 结果: [[1,0,0], [0,0,1], [0,1,0]]
/// ```
pub fn one_hot(labels: &[usize], num_classes: usize) -> Result<Tensor, DataError> {
    let mut encoded = Tensor::zeros(&[labels.len(), num_classes]);
    for (i, &class_idx) in labels.iter().enumerate() {
        if class_idx >= num_classes {
            return Err(DataError::IndexOutOfBounds {
                index: class_idx,
                len: num_classes,
            });
        }
        encoded[[i, class_idx]] = 1.0;
    }
    Ok(encoded)
}

/// 按行归一化，使每行元素之和为 1（词袋特征的常规预处理）
///
/// 全零行保持为零，不会产生 NaN。
pub fn row_normalize(features: &Tensor) -> Tensor {
    let mut normalized = features.clone();
    for r in 0..features.rows() {
        let sum: f32 = features.row(r).sum();
        if sum == 0.0 {
            continue;
        }
        for c in 0..features.cols() {
            normalized[[r, c]] /= sum;
        }
    }
    normalized
}
