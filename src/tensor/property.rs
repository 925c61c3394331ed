/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 本类仅包含一些属性方法，不包含任何运算方法，所以不会需要用到mut
 */

use super::Tensor;
use ndarray::{Array2, ArrayView1, ArrayView2};

impl Tensor {
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 内部ndarray矩阵的引用
    pub fn as_array(&self) -> &Array2<f32> {
        &self.data
    }

    /// 形状，始终为`[rows, cols]`
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// 计算张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 第`i`行的快照
    pub fn row(&self, i: usize) -> ArrayView1<'_, f32> {
        self.data.row(i)
    }

    /// 判断两个张量的形状是否严格一致
    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 判断张量是否为标量（形状为[1, 1]）
    pub fn is_scalar(&self) -> bool {
        self.size() == 1
    }

    /// 转化为纯数（number）。若为标量，则返回Some(number)，否则返回None
    pub fn number(&self) -> Option<f32> {
        if self.is_scalar() {
            Some(self.data[[0, 0]])
        } else {
            None
        }
    }

    /// 是否含有NaN或无穷
    pub fn has_non_finite(&self) -> bool {
        self.data.iter().any(|x| !x.is_finite())
    }

    /// 按行优先顺序导出所有元素
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }
}
