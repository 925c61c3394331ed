use crate::nn::GraphError;
use crate::nn::functional;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 带节点掩码的 Softmax + CrossEntropy 融合损失节点
///
/// 半监督节点分类只在训练集节点上计算损失，其余节点不产生梯度。
///
/// ## 输入
/// - 父节点 0: logits，[N, C]（未经 softmax 的原始分数）
/// - 父节点 1: labels，[N, C]（one-hot 编码的真实标签）
///
/// ## 输出
/// - 标量损失 L = -(1/|M|) Σ_{i∈M} Σ_c y_ic · log_softmax(x_i)_c
///
/// ## 反向传播
/// - i∈M：dL/dx_i = (softmax(x_i) - y_i) / |M|
/// - 其余行为0
#[derive(Clone)]
pub(in crate::nn) struct MaskedCrossEntropy {
    /// 输出形状固定为 [1, 1]（标量损失）
    shape: Vec<usize>,
    /// 参与计算损失的节点编号
    mask: Vec<usize>,
    /// 缓存 softmax 结果，用于反向传播
    softmax_cache: Option<Tensor>,
}

impl MaskedCrossEntropy {
    pub(in crate::nn) fn new(
        logits_shape: &[usize],
        labels_shape: &[usize],
        mask: &[usize],
    ) -> Result<Self, GraphError> {
        if logits_shape != labels_shape {
            return Err(GraphError::ShapeMismatch {
                expected: logits_shape.to_vec(),
                got: labels_shape.to_vec(),
                message: "logits 和 labels 形状必须相同".to_string(),
            });
        }
        if mask.is_empty() {
            return Err(GraphError::InvalidOperation(
                "损失的节点掩码不能为空".to_string(),
            ));
        }
        if let Some(&node) = mask.iter().find(|&&i| i >= logits_shape[0]) {
            return Err(GraphError::InvalidOperation(format!(
                "掩码中的节点{node}超出节点数{}",
                logits_shape[0]
            )));
        }
        Ok(Self {
            shape: vec![1, 1],
            mask: mask.to_vec(),
            softmax_cache: None,
        })
    }
}

impl TraitNode for MaskedCrossEntropy {
    fn type_name(&self) -> &'static str {
        "MaskedCrossEntropy"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let (logits, labels) = (parents[0], parents[1]);
        let log_probs = functional::log_softmax_rows(logits);

        let mut total = 0.0f32;
        for &i in &self.mask {
            total -= log_probs.row(i).dot(&labels.row(i));
        }
        let loss = total / self.mask.len() as f32;

        self.softmax_cache = Some(log_probs.map(f32::exp));
        Ok(Tensor::new(&[loss], &[1, 1]))
    }

    fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if parent_index != 0 {
            return Err(GraphError::InvalidOperation(
                "MaskedCrossEntropy 不对 labels 求梯度".to_string(),
            ));
        }
        let softmax = self.softmax_cache.as_ref().ok_or_else(|| {
            GraphError::ComputationError(
                "MaskedCrossEntropy没有缓存的softmax结果，请先执行前向传播".to_string(),
            )
        })?;
        let labels = parents[1];
        let scale = upstream_grad[[0, 0]] / self.mask.len() as f32;

        let mut grad = Tensor::zeros(softmax.shape());
        for &i in &self.mask {
            for c in 0..softmax.cols() {
                grad[[i, c]] += scale * (softmax[[i, c]] - labels[[i, c]]);
            }
        }
        Ok(grad)
    }
}
