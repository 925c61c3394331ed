use approx::assert_abs_diff_eq;

use crate::tensor::Tensor;

#[test]
fn test_mat_mul() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = Tensor::new(&[5.0, 6.0, 7.0, 8.0, 9.0, 10.0], &[2, 3]);
    let expected = Tensor::new(&[21.0, 24.0, 27.0, 47.0, 54.0, 61.0], &[2, 3]);
    assert_eq!(a.mat_mul(&b), expected);

    // 单位矩阵
    assert_eq!(Tensor::eyes(2).mat_mul(&b), b);
}

#[test]
#[should_panic(expected = "形状不一致，故无法矩阵相乘")]
fn test_mat_mul_panic_on_invalid_shape() {
    let a = Tensor::zeros(&[2, 3]);
    let b = Tensor::zeros(&[2, 3]);
    a.mat_mul(&b);
}

#[test]
fn test_elementwise_ops() {
    let a = Tensor::new(&[1.0, -2.0, 3.0, 4.0], &[2, 2]);
    let b = Tensor::new(&[2.0, 2.0, 2.0, 2.0], &[2, 2]);
    assert_eq!(&a + &b, Tensor::new(&[3.0, 0.0, 5.0, 6.0], &[2, 2]));
    assert_eq!(&a - &b, Tensor::new(&[-1.0, -4.0, 1.0, 2.0], &[2, 2]));
    assert_eq!(&a * &b, Tensor::new(&[2.0, -4.0, 6.0, 8.0], &[2, 2]));
    assert_eq!(&a / &b, Tensor::new(&[0.5, -1.0, 1.5, 2.0], &[2, 2]));
    assert_eq!(&a * 3.0, Tensor::new(&[3.0, -6.0, 9.0, 12.0], &[2, 2]));
    assert_eq!(-&a, Tensor::new(&[-1.0, 2.0, -3.0, -4.0], &[2, 2]));

    let mut c = a.clone();
    c += &b;
    c *= 2.0;
    c -= &b;
    assert_eq!(c, Tensor::new(&[4.0, -2.0, 8.0, 10.0], &[2, 2]));
}

#[test]
#[should_panic(expected = "形状不一致，故无法相加")]
fn test_add_panic_on_shape_mismatch() {
    let _ = &Tensor::zeros(&[2, 2]) + &Tensor::zeros(&[2, 1]);
}

#[test]
fn test_where_with_f32() {
    let a = Tensor::new(&[1.0, -2.0, 0.0, 4.0], &[2, 2]);
    let r = a.where_with_f32(|x| x > 0.0, |x| x, |x| 0.2 * x);
    assert_eq!(r, Tensor::new(&[1.0, -0.4, 0.0, 4.0], &[2, 2]));
}

#[test]
fn test_reductions() {
    let a = Tensor::new(&[1.0, 5.0, 3.0, 4.0, 2.0, 0.0], &[2, 3]);
    assert_abs_diff_eq!(a.sum(), 15.0);
    assert_abs_diff_eq!(a.mean(), 2.5);
    assert_eq!(a.argmax_rows(), vec![1, 0]);
    assert_abs_diff_eq!(a.max_abs_diff(&Tensor::zeros(&[2, 3])), 5.0);
}

#[test]
fn test_concat_and_slice_cols() {
    let a = Tensor::new(&[1.0, 2.0], &[2, 1]);
    let b = Tensor::new(&[3.0, 4.0, 5.0, 6.0], &[2, 2]);
    let c = Tensor::concat_cols(&[&a, &b]);
    assert_eq!(c, Tensor::new(&[1.0, 3.0, 4.0, 2.0, 5.0, 6.0], &[2, 3]));
    assert_eq!(c.slice_cols(0, 1), a);
    assert_eq!(c.slice_cols(1, 3), b);
}

#[test]
#[should_panic(expected = "张量列表为空")]
fn test_concat_empty_list() {
    Tensor::concat_cols(&[]);
}

#[test]
fn test_transpose() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let t = a.transpose();
    assert_eq!(t.shape(), &[3, 2]);
    assert_eq!(t[[2, 1]], 6.0);
}
