//! Common test utilities

#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use densemat_rust::DoubleMatrix;

/// Simple deterministic pseudo-random number generator (LCG)
///
/// Uses the Numerical Recipes parameters: a = 1664525, c = 1013904223.
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in `[-1, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        2.0 * ((self.state >> 16) as f64) / ((1u64 << 48) as f64) - 1.0
    }

    pub fn matrix(&mut self, rows: usize, cols: usize) -> DoubleMatrix {
        DoubleMatrix::from_fn(rows, cols, |_, _| self.next_f64()).unwrap()
    }
}

pub fn assert_matrix_eq(a: &DoubleMatrix, b: &DoubleMatrix, epsilon: f64) {
    assert_eq!(a.shape(), b.shape(), "Shape mismatch: {:?} != {:?}", a.shape(), b.shape());
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        assert_abs_diff_eq!(*x, *y, epsilon = epsilon);
    }
}

/// `QᵗQ = I` for the columns of `q`
pub fn assert_orthonormal_columns(q: &DoubleMatrix, epsilon: f64) {
    let qtq = q.transpose().unwrap().mmul(q).unwrap();
    let eye = DoubleMatrix::identity(q.cols(), q.cols()).unwrap();
    assert_matrix_eq(&qtq, &eye, epsilon);
}
