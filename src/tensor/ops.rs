/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 张量运算：逐元素四则运算、矩阵乘法、按列拼接/切片以及若干归约
 */

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use ndarray::{Axis, concatenate, s};

use super::Tensor;
use crate::errors::{Operator, TensorError};

impl Tensor {
    fn assert_same_shape(&self, other: &Tensor, operator: Operator) {
        assert!(
            self.is_same_shape(other),
            "{}",
            TensorError::OperatorError {
                operator,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        );
    }

    /// 矩阵乘法：[n, k] x [k, m] -> [n, m]
    pub fn mat_mul(&self, other: &Tensor) -> Tensor {
        assert!(
            self.cols() == other.rows(),
            "{}",
            TensorError::OperatorError {
                operator: Operator::MatMul,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        );
        Tensor::from_array(self.data.dot(&other.data))
    }

    /// 转置
    pub fn transpose(&self) -> Tensor {
        Tensor::from_array(self.data.t().to_owned())
    }

    /// 逐元素映射
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Tensor {
        Tensor::from_array(self.data.mapv(f))
    }

    /// 逐元素按条件选择：满足`condition`的元素取`true_fn(x)`，否则取`false_fn(x)`
    pub fn where_with_f32<C, T, F>(&self, condition: C, true_fn: T, false_fn: F) -> Tensor
    where
        C: Fn(f32) -> bool,
        T: Fn(f32) -> f32,
        F: Fn(f32) -> f32,
    {
        self.map(|x| if condition(x) { true_fn(x) } else { false_fn(x) })
    }

    pub fn sqrt(&self) -> Tensor {
        self.map(f32::sqrt)
    }

    /// 所有元素之和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 所有元素的均值（空张量返回0）
    pub fn mean(&self) -> f32 {
        if self.size() == 0 {
            0.0
        } else {
            self.sum() / self.size() as f32
        }
    }

    /// 两个同形张量对应元素差的最大绝对值
    pub fn max_abs_diff(&self, other: &Tensor) -> f32 {
        self.assert_same_shape(other, Operator::Sub);
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }

    /// 每一行最大元素所在的列号
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.data
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |(best_j, best), (j, &x)| {
                        if x > best { (j, x) } else { (best_j, best) }
                    })
                    .0
            })
            .collect()
    }

    /// 沿列方向（特征轴）拼接若干行数相同的张量：[N, F1], [N, F2], ... -> [N, F1+F2+...]
    pub fn concat_cols(tensors: &[&Tensor]) -> Tensor {
        assert!(!tensors.is_empty(), "{}", TensorError::EmptyList);
        let first = tensors[0];
        for t in &tensors[1..] {
            assert!(
                t.rows() == first.rows(),
                "{}",
                TensorError::OperatorError {
                    operator: Operator::ConcatCols,
                    tensor1_shape: first.shape().to_vec(),
                    tensor2_shape: t.shape().to_vec(),
                }
            );
        }
        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        // 行数已校验一致，拼接不会失败
        match concatenate(Axis(1), &views) {
            Ok(data) => Tensor::from_array(data),
            Err(e) => panic!("{e}"),
        }
    }

    /// 取出第`start`到`end`（不含）列组成的新张量
    pub fn slice_cols(&self, start: usize, end: usize) -> Tensor {
        assert!(
            start <= end && end <= self.cols(),
            "{}",
            TensorError::ColumnRangeOutOfBounds {
                start,
                end,
                cols: self.cols(),
            }
        );
        Tensor::from_array(self.data.slice(s![.., start..end]).to_owned())
    }
}

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓逐元素二元运算↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl Add<&Tensor> for &Tensor {
    type Output = Tensor;

    fn add(self, rhs: &Tensor) -> Tensor {
        self.assert_same_shape(rhs, Operator::Add);
        Tensor::from_array(&self.data + &rhs.data)
    }
}

impl Add<Tensor> for Tensor {
    type Output = Tensor;

    fn add(self, rhs: Tensor) -> Tensor {
        &self + &rhs
    }
}

impl Add<f32> for &Tensor {
    type Output = Tensor;

    fn add(self, rhs: f32) -> Tensor {
        self.map(|x| x + rhs)
    }
}

impl Sub<&Tensor> for &Tensor {
    type Output = Tensor;

    fn sub(self, rhs: &Tensor) -> Tensor {
        self.assert_same_shape(rhs, Operator::Sub);
        Tensor::from_array(&self.data - &rhs.data)
    }
}

impl Sub<Tensor> for Tensor {
    type Output = Tensor;

    fn sub(self, rhs: Tensor) -> Tensor {
        &self - &rhs
    }
}

impl Sub<&Tensor> for Tensor {
    type Output = Tensor;

    fn sub(self, rhs: &Tensor) -> Tensor {
        &self - rhs
    }
}

impl Mul<&Tensor> for &Tensor {
    type Output = Tensor;

    fn mul(self, rhs: &Tensor) -> Tensor {
        self.assert_same_shape(rhs, Operator::Mul);
        Tensor::from_array(&self.data * &rhs.data)
    }
}

impl Mul<f32> for &Tensor {
    type Output = Tensor;

    fn mul(self, rhs: f32) -> Tensor {
        self.map(|x| x * rhs)
    }
}

impl Mul<f32> for Tensor {
    type Output = Tensor;

    fn mul(self, rhs: f32) -> Tensor {
        &self * rhs
    }
}

impl Mul<&Tensor> for f32 {
    type Output = Tensor;

    fn mul(self, rhs: &Tensor) -> Tensor {
        rhs * self
    }
}

impl Div<&Tensor> for &Tensor {
    type Output = Tensor;

    fn div(self, rhs: &Tensor) -> Tensor {
        self.assert_same_shape(rhs, Operator::Div);
        Tensor::from_array(&self.data / &rhs.data)
    }
}

impl Div<f32> for &Tensor {
    type Output = Tensor;

    fn div(self, rhs: f32) -> Tensor {
        self.map(|x| x / rhs)
    }
}

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        self.map(|x| -x)
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑逐元素二元运算↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓自运算↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl AddAssign<&Tensor> for Tensor {
    fn add_assign(&mut self, rhs: &Tensor) {
        self.assert_same_shape(rhs, Operator::AddAssign);
        self.data += &rhs.data;
    }
}

impl SubAssign<&Tensor> for Tensor {
    fn sub_assign(&mut self, rhs: &Tensor) {
        self.assert_same_shape(rhs, Operator::SubAssign);
        self.data -= &rhs.data;
    }
}

impl MulAssign<f32> for Tensor {
    fn mul_assign(&mut self, rhs: f32) {
        self.data *= rhs;
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑自运算↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
