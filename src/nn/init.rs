/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : 参数初始化策略
 */

use rand::Rng;

use crate::tensor::Tensor;

/// 参数初始化策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Xavier/Glorot 正态初始化，`std = gain * sqrt(2 / (fan_in + fan_out))`
    Xavier { gain: f32 },
    /// Kaiming/He 初始化（适用于 ReLU 族激活）
    Kaiming,
}

impl Init {
    /// GAT 的投影矩阵与注意力向量默认采用的初始化（ReLU 增益下的 Xavier）
    pub fn xavier_relu() -> Self {
        Self::Xavier {
            gain: 2f32.sqrt(),
        }
    }

    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, shape: &[usize], rng: &mut R) -> Tensor {
        match *self {
            Self::Constant(v) => Tensor::full(v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(mean, std, shape, rng),
            Self::Xavier { gain } => {
                let (fan_in, fan_out) = (shape[0], shape.get(1).copied().unwrap_or(1));
                let std = gain * (2.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::Kaiming => {
                let std = (2.0 / shape[0] as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}
