use crate::tensor::Tensor;

#[test]
fn test_new_and_shape() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    assert_eq!(t.shape(), &[2, 3]);
    assert_eq!(t.rows(), 2);
    assert_eq!(t.cols(), 3);
    assert_eq!(t.size(), 6);
    // 行优先
    assert_eq!(t[[1, 0]], 4.0);
    assert_eq!(t.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
#[should_panic(expected = "数据长度5与形状[2, 3]所需的元素个数不一致")]
fn test_new_with_wrong_data_len() {
    Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2, 3]);
}

#[test]
#[should_panic(expected = "张量的形状须为二维")]
fn test_new_with_non_matrix_shape() {
    Tensor::new(&[1.0, 2.0], &[2]);
}

#[test]
fn test_number() {
    assert_eq!(Tensor::new(&[3.5], &[1, 1]).number(), Some(3.5));
    assert_eq!(Tensor::zeros(&[2, 1]).number(), None);
}

#[test]
fn test_has_non_finite() {
    let mut t = Tensor::zeros(&[2, 2]);
    assert!(!t.has_non_finite());
    t[[0, 1]] = f32::NAN;
    assert!(t.has_non_finite());
}

#[test]
fn test_seeded_random_is_reproducible() {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    let a = Tensor::normal_with_rng(0.0, 1.0, &[3, 4], &mut StdRng::seed_from_u64(7));
    let b = Tensor::normal_with_rng(0.0, 1.0, &[3, 4], &mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);

    let u = Tensor::uniform_with_rng(-0.5, 0.5, &[10, 10], &mut StdRng::seed_from_u64(7));
    assert!(u.to_vec().iter().all(|x| (-0.5..=0.5).contains(x)));
}

#[test]
fn test_display() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let text = format!("{t}");
    assert!(text.contains("1.0000"));
    assert!(text.contains("形状: [2, 2]"));

    // 超过6行时省略中间部分
    let big = Tensor::zeros(&[10, 2]);
    assert!(format!("{big}").contains(".."));
}
