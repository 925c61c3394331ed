/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 张量（仅限矩阵）的定义。GAT中所有量都可以表示为二维矩阵：
 *                 节点特征[N, F]、投影权重[F_in, F_out]、注意力向量[2*F_out, 1]、边分数[E, 1]
 */

use ndarray::Array2;
use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::errors::TensorError;

mod index;
mod ops;
mod print;
mod property;
mod save_load;

#[cfg(test)]
mod tests;

/// 定义张量的结构体，内部始终是二维矩阵。
/// 注：标量用形状`[1, 1]`表示，列向量用`[n, 1]`表示，这与计算图中各节点的约定一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    data: Array2<f32>,
}

impl Tensor {
    /// 创建一个张量，`shape`必须为`[rows, cols]`，且`data`的长度须等于`rows * cols`（行优先）。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        let (rows, cols) = Self::check_matrix_shape(shape);
        assert!(
            data.len() == rows * cols,
            "{}",
            TensorError::DataLengthMismatch {
                len: data.len(),
                shape: shape.to_vec(),
            }
        );
        let data = Array2::from_shape_fn((rows, cols), |(i, j)| data[i * cols + j]);
        Tensor { data }
    }

    /// 由ndarray矩阵直接构造
    pub fn from_array(data: Array2<f32>) -> Tensor {
        Tensor { data }
    }

    pub fn zeros(shape: &[usize]) -> Tensor {
        let (rows, cols) = Self::check_matrix_shape(shape);
        Tensor {
            data: Array2::zeros((rows, cols)),
        }
    }

    pub fn ones(shape: &[usize]) -> Tensor {
        Self::full(1.0, shape)
    }

    /// 创建所有元素均为`value`的张量
    pub fn full(value: f32, shape: &[usize]) -> Tensor {
        let (rows, cols) = Self::check_matrix_shape(shape);
        Tensor {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// 创建一个`n`阶单位矩阵
    pub fn eyes(n: usize) -> Tensor {
        Tensor {
            data: Array2::eye(n),
        }
    }

    /// 创建一个随机张量，其值服从[min, max]闭区间上的均匀分布
    pub fn uniform_with_rng<R: Rng + ?Sized>(min: f32, max: f32, shape: &[usize], rng: &mut R) -> Tensor {
        let (rows, cols) = Self::check_matrix_shape(shape);
        let dist = Uniform::from(min..=max);
        Tensor {
            data: Array2::from_shape_fn((rows, cols), |_| dist.sample(rng)),
        }
    }

    /// 创建一个服从正态分布的随机张量（Box-Muller变换）
    pub fn normal_with_rng<R: Rng + ?Sized>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Tensor {
        let (rows, cols) = Self::check_matrix_shape(shape);
        let data_len = rows * cols;
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Tensor::new(&data, shape)
    }

    /// 使用线程随机数生成器的正态分布张量
    pub fn normal(mean: f32, std_dev: f32, shape: &[usize]) -> Tensor {
        Self::normal_with_rng(mean, std_dev, shape, &mut rand::thread_rng())
    }
}

// 私有方法
impl Tensor {
    fn check_matrix_shape(shape: &[usize]) -> (usize, usize) {
        assert!(shape.len() == 2, "{}", TensorError::NotMatrix(shape.to_vec()));
        (shape[0], shape[1])
    }
}
