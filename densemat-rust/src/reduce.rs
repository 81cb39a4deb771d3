//! Row, column and global reductions
//!
//! All reductions are total. Min and max skip NaN entries unless every entry
//! of the reduced range is NaN, in which case the result is NaN.

use crate::matrix::DoubleMatrix;

#[inline]
fn pick_min(acc: f64, x: f64) -> f64 {
    if acc.is_nan() || x < acc { x } else { acc }
}

#[inline]
fn pick_max(acc: f64, x: f64) -> f64 {
    if acc.is_nan() || x > acc { x } else { acc }
}

impl DoubleMatrix {
    fn fold_columns(&self, init: f64, f: impl Fn(f64, f64) -> f64) -> DoubleMatrix {
        let mut out = vec![init; self.cols];
        for row in self.data.chunks_exact(self.cols) {
            for (acc, &x) in out.iter_mut().zip(row) {
                *acc = f(*acc, x);
            }
        }
        DoubleMatrix::from_parts(1, self.cols, out)
    }

    fn fold_rows(&self, init: f64, f: impl Fn(f64, f64) -> f64) -> DoubleMatrix {
        let out = self
            .data
            .chunks_exact(self.cols)
            .map(|row| row.iter().fold(init, |acc, &x| f(acc, x)))
            .collect();
        DoubleMatrix::from_parts(self.rows, 1, out)
    }

    /// Column sums as a `1 x cols` row vector
    pub fn column_sums(&self) -> DoubleMatrix {
        self.fold_columns(0.0, |acc, x| acc + x)
    }

    pub fn column_mins(&self) -> DoubleMatrix {
        self.fold_columns(f64::NAN, pick_min)
    }

    pub fn column_maxs(&self) -> DoubleMatrix {
        self.fold_columns(f64::NAN, pick_max)
    }

    pub fn column_means(&self) -> DoubleMatrix {
        let mut sums = self.column_sums();
        sums.div_scalar_mut(self.rows as f64);
        sums
    }

    /// Row sums as a `rows x 1` column vector
    pub fn row_sums(&self) -> DoubleMatrix {
        self.fold_rows(0.0, |acc, x| acc + x)
    }

    pub fn row_mins(&self) -> DoubleMatrix {
        self.fold_rows(f64::NAN, pick_min)
    }

    pub fn row_maxs(&self) -> DoubleMatrix {
        self.fold_rows(f64::NAN, pick_max)
    }

    pub fn row_means(&self) -> DoubleMatrix {
        let mut sums = self.row_sums();
        sums.div_scalar_mut(self.cols as f64);
        sums
    }

    pub fn min(&self) -> f64 {
        self.data.iter().fold(f64::NAN, |acc, &x| pick_min(acc, x))
    }

    pub fn max(&self) -> f64 {
        self.data.iter().fold(f64::NAN, |acc, &x| pick_max(acc, x))
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// The 1-norm of the matrix as vector (sum of absolute values)
    pub fn norm1(&self) -> f64 {
        self.data.iter().map(|x| x.abs()).sum()
    }

    /// The Euclidean norm of the matrix as vector, also the Frobenius norm
    pub fn norm2(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum::<f64>().sqrt()
    }
}
