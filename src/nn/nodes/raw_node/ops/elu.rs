use crate::nn::GraphError;
use crate::nn::functional;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// ELU 激活函数节点，用于两层GAT之间
///
/// forward: f(x) = x if x > 0, else alpha * (exp(x) - 1)
/// backward: d(f)/dx = 1 if x > 0, else alpha * exp(x)
#[derive(Clone)]
pub(in crate::nn) struct Elu {
    shape: Vec<usize>,
    alpha: f32,
}

impl Elu {
    pub(in crate::nn) fn new(parent_shape: &[usize], alpha: f32) -> Result<Self, GraphError> {
        if alpha < 0.0 || !alpha.is_finite() {
            return Err(GraphError::InvalidOperation(format!(
                "ELU的alpha应为非负数，但得到: {alpha}"
            )));
        }
        Ok(Self {
            shape: parent_shape.to_vec(),
            alpha,
        })
    }
}

impl TraitNode for Elu {
    fn type_name(&self) -> &'static str {
        "ELU"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(functional::elu(parents[0], self.alpha))
    }

    fn calc_grad_to_parent(
        &self,
        _parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let alpha = self.alpha;
        let local_grad = parents[0].where_with_f32(|x| x > 0.0, |_| 1.0, |x| alpha * x.exp());
        Ok(upstream_grad * &local_grad)
    }
}
