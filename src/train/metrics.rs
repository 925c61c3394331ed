//! 评估指标

use crate::tensor::Tensor;

/// `mask`中预测类别（logits 每行的 argmax）与标签一致的节点所占比例；空掩码返回 0
pub fn accuracy(logits: &Tensor, labels: &[usize], mask: &[usize]) -> f32 {
    if mask.is_empty() {
        return 0.0;
    }
    let predictions = logits.argmax_rows();
    let correct = mask
        .iter()
        .filter(|&&node| predictions[node] == labels[node])
        .count();
    correct as f32 / mask.len() as f32
}
