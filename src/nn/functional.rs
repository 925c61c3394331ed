/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : GAT的纯函数形式：不依赖计算图，只依赖输入张量、参数与边表。
 *                 计算图中的各GAT节点的前向计算也直接调用这里的实现
 */

//! 单头图注意力的四个步骤：
//!
//! 1. `project`：`Z = H·W`
//! 2. `score_edges`：对每条边`(src, dst)`计算`e = LeakyReLU(a · [Z[src] ‖ Z[dst]])`
//! 3. `edge_softmax`：在每个目标节点`i`的入边集合`N(i)`上做softmax，得到`α`
//! 4. `weighted_aggregate`：`H'[i] = Σ_{j∈N(i)} α_ij · Z[j]`
//!
//! 入边集合为空的节点聚合结果为零向量。

use crate::nn::GraphError;
use crate::tensor::Tensor;
use crate::topology::EdgeIndex;

/// GAT论文中LeakyReLU的默认负半轴斜率
pub const DEFAULT_NEGATIVE_SLOPE: f32 = 0.2;

/// 投影：`Z = H·W`，要求`H`的列数等于`W`的行数
pub fn project(h: &Tensor, w: &Tensor) -> Result<Tensor, GraphError> {
    if h.cols() != w.rows() {
        return Err(GraphError::ShapeMismatch {
            expected: vec![h.rows(), w.rows()],
            got: h.shape().to_vec(),
            message: "节点特征的列数须等于投影矩阵W的行数".to_string(),
        });
    }
    Ok(h.mat_mul(w))
}

pub fn leaky_relu(x: &Tensor, negative_slope: f32) -> Tensor {
    x.where_with_f32(|v| v > 0.0, |v| v, |v| negative_slope * v)
}

pub fn elu(x: &Tensor, alpha: f32) -> Tensor {
    x.where_with_f32(|v| v > 0.0, |v| v, |v| alpha * (v.exp() - 1.0))
}

/// 检查投影特征`z`与边表、注意力向量`a`的形状是否兼容
pub(crate) fn check_attention_shapes(z: &Tensor, a: &Tensor, edges: &EdgeIndex) -> Result<(), GraphError> {
    check_node_rows(z, edges)?;
    let expected = [2 * z.cols(), 1];
    if a.shape() != expected {
        return Err(GraphError::ShapeMismatch {
            expected: expected.to_vec(),
            got: a.shape().to_vec(),
            message: "注意力向量a的长度须为投影特征宽度的2倍".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn check_node_rows(z: &Tensor, edges: &EdgeIndex) -> Result<(), GraphError> {
    if z.rows() != edges.num_nodes() {
        return Err(GraphError::ShapeMismatch {
            expected: vec![edges.num_nodes(), z.cols()],
            got: z.shape().to_vec(),
            message: "节点特征的行数须等于图的节点数".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn check_edge_rows(scores: &Tensor, edges: &EdgeIndex) -> Result<(), GraphError> {
    let expected = [edges.num_edges(), 1];
    if scores.shape() != expected {
        return Err(GraphError::ShapeMismatch {
            expected: expected.to_vec(),
            got: scores.shape().to_vec(),
            message: "边上的量须为每条边一行的列向量".to_string(),
        });
    }
    Ok(())
}

/// 未经激活的边分数：`a · [Z[src] ‖ Z[dst]]`，形状为[E, 1]。
/// 拼接后再点积等价于`a`的前半段点乘源节点特征加上后半段点乘目标节点特征
pub fn edge_logits(z: &Tensor, a: &Tensor, edges: &EdgeIndex) -> Result<Tensor, GraphError> {
    check_attention_shapes(z, a, edges)?;
    let f = z.cols();
    let a_view = a.view();
    let a_src: ndarray::ArrayView1<f32> = a_view.slice(ndarray::s![..f, 0]);
    let a_dst: ndarray::ArrayView1<f32> = a_view.slice(ndarray::s![f.., 0]);

    let mut logits = Tensor::zeros(&[edges.num_edges(), 1]);
    for k in 0..edges.num_edges() {
        let (s, d) = edges.edge(k);
        logits[[k, 0]] = a_src.dot(&z.row(s)) + a_dst.dot(&z.row(d));
    }
    Ok(logits)
}

/// 边的注意力分数：`LeakyReLU(a · [Z[src] ‖ Z[dst]])`，每条边彼此独立
pub fn score_edges(z: &Tensor, a: &Tensor, edges: &EdgeIndex, negative_slope: f32) -> Result<Tensor, GraphError> {
    Ok(leaky_relu(&edge_logits(z, a, edges)?, negative_slope))
}

/// 按目标节点分组的softmax：`α_ij = exp(e_ij - m_i) / Σ_k exp(e_ik - m_i)`，`m_i = max_k e_ik`
pub fn edge_softmax(scores: &Tensor, edges: &EdgeIndex) -> Result<Tensor, GraphError> {
    check_edge_rows(scores, edges)?;
    let mut alpha = Tensor::zeros(&[edges.num_edges(), 1]);
    for i in 0..edges.num_nodes() {
        let group = edges.incoming(i);
        if group.is_empty() {
            continue;
        }
        let max = group
            .iter()
            .map(|&k| scores[[k, 0]])
            .fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0;
        for &k in group {
            let exp = (scores[[k, 0]] - max).exp();
            alpha[[k, 0]] = exp;
            sum += exp;
        }
        for &k in group {
            alpha[[k, 0]] /= sum;
        }
    }
    Ok(alpha)
}

/// 按注意力系数加权聚合：`H'[i] = Σ_{j∈N(i)} α_ij · Z[j]`，无入边的节点为零向量
pub fn weighted_aggregate(z: &Tensor, alpha: &Tensor, edges: &EdgeIndex) -> Result<Tensor, GraphError> {
    check_node_rows(z, edges)?;
    check_edge_rows(alpha, edges)?;
    let mut out = Tensor::zeros(z.shape());
    for i in 0..edges.num_nodes() {
        for &k in edges.incoming(i) {
            let weight = alpha[[k, 0]];
            let src = edges.src()[k];
            for c in 0..z.cols() {
                out[[i, c]] += weight * z[[src, c]];
            }
        }
    }
    Ok(out)
}

/// 分组softmax与加权聚合的组合
pub fn aggregate(z: &Tensor, scores: &Tensor, edges: &EdgeIndex) -> Result<Tensor, GraphError> {
    let alpha = edge_softmax(scores, edges)?;
    weighted_aggregate(z, &alpha, edges)
}

/// 单头GAT层的完整前向计算，是`H`与参数`(W, a)`的纯函数
pub fn gat_head(
    h: &Tensor,
    w: &Tensor,
    a: &Tensor,
    edges: &EdgeIndex,
    negative_slope: f32,
) -> Result<Tensor, GraphError> {
    let z = project(h, w)?;
    let scores = score_edges(&z, a, edges, negative_slope)?;
    aggregate(&z, &scores, edges)
}

/// 多头输出按特征轴拼接：K个[N, F]得到[N, K*F]
pub fn merge_concat(heads: &[Tensor]) -> Result<Tensor, GraphError> {
    check_heads(heads, false)?;
    Ok(Tensor::concat_cols(&heads.iter().collect::<Vec<_>>()))
}

/// 多头输出逐元素取平均：K个[N, F]得到[N, F]（按头平均，而非对全部元素取一个标量均值）
pub fn merge_mean(heads: &[Tensor]) -> Result<Tensor, GraphError> {
    check_heads(heads, true)?;
    let mut sum = Tensor::zeros(heads[0].shape());
    for head in heads {
        sum += head;
    }
    Ok(&sum / heads.len() as f32)
}

/// 拼接只要求各头节点数一致，平均还要求特征宽度一致
fn check_heads(heads: &[Tensor], same_width: bool) -> Result<(), GraphError> {
    let first = heads.first().ok_or_else(|| {
        GraphError::InvalidOperation("合并多头输出时至少需要1个头".to_string())
    })?;
    for head in &heads[1..] {
        if head.rows() != first.rows() || (same_width && head.cols() != first.cols()) {
            return Err(GraphError::ShapeMismatch {
                expected: first.shape().to_vec(),
                got: head.shape().to_vec(),
                message: "各头输出的形状不一致".to_string(),
            });
        }
    }
    Ok(())
}

/// 按行的数值稳定softmax
pub fn softmax_rows(logits: &Tensor) -> Tensor {
    let mut result = Tensor::zeros(logits.shape());
    for r in 0..logits.rows() {
        let max = logits.row(r).iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0;
        for c in 0..logits.cols() {
            let exp = (logits[[r, c]] - max).exp();
            result[[r, c]] = exp;
            sum += exp;
        }
        for c in 0..logits.cols() {
            result[[r, c]] /= sum;
        }
    }
    result
}

/// 按行的log-softmax：`x - max - log(Σ exp(x - max))`
pub fn log_softmax_rows(logits: &Tensor) -> Tensor {
    let mut result = Tensor::zeros(logits.shape());
    for r in 0..logits.rows() {
        let max = logits.row(r).iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let log_sum_exp = logits
            .row(r)
            .iter()
            .map(|&x| (x - max).exp())
            .sum::<f32>()
            .ln();
        for c in 0..logits.cols() {
            result[[r, c]] = logits[[r, c]] - max - log_sum_exp;
        }
    }
    result
}
