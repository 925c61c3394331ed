use super::Tensor;
use std::ops::{Index, IndexMut};

impl Index<[usize; 2]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; 2]) -> &f32 {
        &self.data[index]
    }
}

impl IndexMut<[usize; 2]> for Tensor {
    fn index_mut(&mut self, index: [usize; 2]) -> &mut f32 {
        &mut self.data[index]
    }
}
