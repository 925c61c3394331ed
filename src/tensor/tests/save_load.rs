use crate::tensor::Tensor;

#[test]
fn test_save_and_load() {
    let t = Tensor::new(&[1.5, -2.0, 3.25, 0.0], &[2, 2]);
    let mut buffer = Vec::new();
    t.save(&mut buffer).unwrap();
    let loaded = Tensor::load(buffer.as_slice()).unwrap();
    assert_eq!(loaded, t);
}
