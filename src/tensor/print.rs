use crate::tensor::Tensor;
use std::fmt;

impl Tensor {
    pub fn print(&self) {
        println!("{self}");
    }
}

/// 行或列超过该数量时，只展示首尾各3个
const MAX_SHOWN: usize = 6;

fn shown_indices(len: usize) -> Vec<Option<usize>> {
    if len > MAX_SHOWN {
        (0..3)
            .map(Some)
            .chain(std::iter::once(None))
            .chain((len - 3..len).map(Some))
            .collect()
    } else {
        (0..len).map(Some).collect()
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let row_indices = shown_indices(self.rows());
        let col_indices = shown_indices(self.cols());

        write!(f, "[")?;
        for (n, row) in row_indices.iter().enumerate() {
            if n > 0 {
                write!(f, ",\n ")?;
            }
            match row {
                Some(i) => {
                    write!(f, "[")?;
                    for (m, col) in col_indices.iter().enumerate() {
                        if m > 0 {
                            write!(f, ", ")?;
                        }
                        match col {
                            Some(j) => write!(f, "{:8.4}", self[[*i, *j]])?,
                            None => write!(f, "   ..   ")?,
                        }
                    }
                    write!(f, "]")?;
                }
                None => write!(f, " ..")?,
            }
        }
        write!(f, "]")?;
        writeln!(f, "\n形状: {:?}", self.shape())
    }
}
