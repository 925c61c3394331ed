use crate::nn::GraphError;
use crate::nn::functional;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// Leaky ReLU 激活函数节点
///
/// forward: f(x) = x if x > 0, else negative_slope * x
/// backward: d(f)/dx = 1 if x > 0, else negative_slope
///
/// GAT中用于边上的注意力分数，斜率默认为0.2
#[derive(Clone)]
pub(in crate::nn) struct LeakyReLU {
    shape: Vec<usize>,
    /// 负半轴斜率
    negative_slope: f32,
}

impl LeakyReLU {
    pub(in crate::nn) fn new(parent_shape: &[usize], negative_slope: f32) -> Result<Self, GraphError> {
        // 通常应该是非负小数
        if negative_slope < 0.0 || !negative_slope.is_finite() {
            return Err(GraphError::InvalidOperation(format!(
                "LeakyReLU的negative_slope应为非负数，但得到: {negative_slope}"
            )));
        }
        Ok(Self {
            shape: parent_shape.to_vec(),
            negative_slope,
        })
    }
}

impl TraitNode for LeakyReLU {
    fn type_name(&self) -> &'static str {
        "LeakyReLU"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(functional::leaky_relu(parents[0], self.negative_slope))
    }

    fn calc_grad_to_parent(
        &self,
        _parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let slope = self.negative_slope;
        let local_grad = parents[0].where_with_f32(|x| x > 0.0, |_| 1.0, |_| slope);
        Ok(upstream_grad * &local_grad)
    }
}
