use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 按特征轴（列）拼接节点：[N, F1], [N, F2], ... -> [N, F1+F2+...]
///
/// 多头GAT的中间层用它合并各头的输出；反向传播时把上游梯度按列切回各父节点。
#[derive(Clone)]
pub(in crate::nn) struct Concat {
    shape: Vec<usize>,
    /// 各父节点的列数
    widths: Vec<usize>,
}

impl Concat {
    pub(in crate::nn) fn new(parent_shapes: &[&[usize]]) -> Result<Self, GraphError> {
        let first = parent_shapes.first().ok_or_else(|| {
            GraphError::InvalidOperation("Concat节点至少需要1个父节点".to_string())
        })?;
        for shape in parent_shapes {
            if shape[0] != first[0] {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![first[0], shape[1]],
                    got: shape.to_vec(),
                    message: "按列拼接要求所有父节点的行数相同".to_string(),
                });
            }
        }
        let widths = parent_shapes.iter().map(|s| s[1]).collect::<Vec<_>>();
        Ok(Self {
            shape: vec![first[0], widths.iter().sum()],
            widths,
        })
    }
}

impl TraitNode for Concat {
    fn type_name(&self) -> &'static str {
        "Concat"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(Tensor::concat_cols(parents))
    }

    fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        _parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let start: usize = self.widths[..parent_index].iter().sum();
        let end = start + self.widths[parent_index];
        Ok(upstream_grad.slice_cols(start, end))
    }
}
