/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : 运算节点。每个节点只负责两件事：由父节点的值计算本节点的值，
 *                 以及给定上游梯度时计算对某个父节点的梯度（向量-雅可比积）
 */

mod concat;
mod edge_aggregate;
mod edge_score;
mod edge_softmax;
mod elu;
mod leaky_relu;
mod mat_mul;
mod mean;

pub(in crate::nn) use concat::Concat;
pub(in crate::nn) use edge_aggregate::EdgeAggregate;
pub(in crate::nn) use edge_score::EdgeScore;
pub(in crate::nn) use edge_softmax::EdgeSoftmax;
pub(in crate::nn) use elu::Elu;
pub(in crate::nn) use leaky_relu::LeakyReLU;
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use mean::Mean;

use crate::nn::GraphError;

/// 反向传播时传入了不存在的父节点序号
fn invalid_parent_index(node_type: &str, parent_index: usize) -> GraphError {
    GraphError::ComputationError(format!(
        "{node_type}节点没有第{parent_index}个父节点。不该触及本错误，否则说明crate代码有问题"
    ))
}
