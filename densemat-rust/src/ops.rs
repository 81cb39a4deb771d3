//! Arithmetic kernels
//!
//! Elementwise operations come in four flavours each: scalar and matrix operand,
//! producing a new matrix or mutating the receiver. Matrix operands must have the
//! receiver's shape; the check runs before any element is written.
//!
//! Division follows IEEE 754: dividing by zero yields `inf` or `NaN` and is not
//! reported as an error.

use crate::error::{MatrixError, Result};
use crate::gemm;
use crate::matrix::{DoubleMatrix, alloc_buffer};

macro_rules! elementwise_op {
    ($name:literal, $scalar_mut:ident, $scalar:ident, $matrix_mut:ident, $matrix:ident, $op:tt) => {
        pub fn $scalar_mut(&mut self, value: f64) {
            for x in self.data.iter_mut() {
                *x = *x $op value;
            }
        }

        pub fn $scalar(&self, value: f64) -> Result<DoubleMatrix> {
            let mut out = alloc_buffer(self.data.len())?;
            out.extend(self.data.iter().map(|&x| x $op value));
            Ok(DoubleMatrix::from_parts(self.rows, self.cols, out))
        }

        pub fn $matrix_mut(&mut self, other: &DoubleMatrix) -> Result<()> {
            self.check_same_shape($name, other)?;
            for (x, &y) in self.data.iter_mut().zip(other.data.iter()) {
                *x = *x $op y;
            }
            Ok(())
        }

        pub fn $matrix(&self, other: &DoubleMatrix) -> Result<DoubleMatrix> {
            self.check_same_shape($name, other)?;
            let mut out = alloc_buffer(self.data.len())?;
            out.extend(self.data.iter().zip(other.data.iter()).map(|(&x, &y)| x $op y));
            Ok(DoubleMatrix::from_parts(self.rows, self.cols, out))
        }
    };
}

impl DoubleMatrix {
    fn check_same_shape(&self, op: &str, other: &DoubleMatrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(MatrixError::shape_mismatch(op, self.shape(), other.shape()));
        }
        Ok(())
    }

    elementwise_op!("add", add_scalar_mut, add_scalar, add_matrix_mut, add_matrix, +);
    elementwise_op!("sub", sub_scalar_mut, sub_scalar, sub_matrix_mut, sub_matrix, -);
    elementwise_op!("mul", mul_scalar_mut, mul_scalar, mul_matrix_mut, mul_matrix, *);
    elementwise_op!("div", div_scalar_mut, div_scalar, div_matrix_mut, div_matrix, /);

    /// Matrix product `self * other`
    ///
    /// Requires `self.cols == other.rows`; the result is `self.rows x other.cols`.
    /// Runs on the currently registered GEMM backend.
    pub fn mmul(&self, other: &DoubleMatrix) -> Result<DoubleMatrix> {
        if self.cols != other.rows {
            return Err(MatrixError::dimension(format!(
                "matrix multiplication requires lhs columns == rhs rows, got {}x{} * {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let (m, k, n) = (self.rows, self.cols, other.cols);
        let len = m.checked_mul(n).ok_or_else(|| {
            MatrixError::allocation(format!("{} x {} product overflows the address space", m, n))
        })?;
        let mut out = alloc_buffer(len)?;
        out.resize(len, 0.0);
        gemm::dgemm(m, n, k, &self.data, &other.data, &mut out)?;
        Ok(DoubleMatrix::from_parts(m, n, out))
    }

    /// In-place matrix product: `self <- self * other`
    ///
    /// The product is computed into a temporary and swapped in, so the receiver
    /// may change shape to `self.rows x other.cols`. On error the receiver is
    /// left untouched.
    pub fn mmul_assign(&mut self, other: &DoubleMatrix) -> Result<()> {
        let product = self.mmul(other)?;
        *self = product;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_matrix(a: &DoubleMatrix, b: &DoubleMatrix) {
        assert_eq!(a.shape(), b.shape(), "Shape mismatch: {:?} != {:?}", a, b);
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_elementwise_add() {
        let exp = DoubleMatrix::filled(4, 3, 4.4).unwrap();
        let matrix = DoubleMatrix::ones(4, 3).unwrap();
        assert_matrix(&matrix.add_scalar(3.4).unwrap(), &exp);

        let mut matrix = DoubleMatrix::ones(4, 3).unwrap();
        matrix.add_scalar_mut(3.4);
        assert_matrix(&matrix, &exp);

        let exp = DoubleMatrix::from_vec(4, 3, vec![
            2.0, 1.0, 1.0,
            1.0, 2.0, 1.0,
            1.0, 1.0, 2.0,
            1.0, 1.0, 1.0
        ]).unwrap();
        let identity = DoubleMatrix::identity(4, 3).unwrap();
        let matrix = DoubleMatrix::ones(4, 3).unwrap();
        assert_matrix(&matrix.add_matrix(&identity).unwrap(), &exp);

        let mut matrix = DoubleMatrix::ones(4, 3).unwrap();
        matrix.add_matrix_mut(&identity).unwrap();
        assert_matrix(&matrix, &exp);
    }

    #[test]
    fn test_elementwise_sub_mul_div() {
        let a = DoubleMatrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = DoubleMatrix::from_vec(2, 2, vec![4.0, 3.0, 2.0, 1.0]).unwrap();

        assert_eq!(a.sub_matrix(&b).unwrap().as_slice(), &[-3.0, -1.0, 1.0, 3.0]);
        assert_eq!(a.mul_matrix(&b).unwrap().as_slice(), &[4.0, 6.0, 6.0, 4.0]);
        assert_eq!(a.div_matrix(&b).unwrap().as_slice(), &[0.25, 2.0 / 3.0, 1.5, 4.0]);
        assert_eq!(a.sub_scalar(1.0).unwrap().as_slice(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(a.mul_scalar(-2.0).unwrap().as_slice(), &[-2.0, -4.0, -6.0, -8.0]);
        assert_eq!(a.div_scalar(2.0).unwrap().as_slice(), &[0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_division_by_zero_propagates_ieee() {
        let a = DoubleMatrix::from_vec(1, 3, vec![1.0, -1.0, 0.0]).unwrap();
        let res = a.div_scalar(0.0).unwrap();
        assert_eq!(res.as_slice()[0], f64::INFINITY);
        assert_eq!(res.as_slice()[1], f64::NEG_INFINITY);
        assert!(res.as_slice()[2].is_nan());

        let zeros = DoubleMatrix::zeros(1, 3).unwrap();
        let res = a.div_matrix(&zeros).unwrap();
        assert_eq!(res.as_slice()[0], f64::INFINITY);
        assert!(res.as_slice()[2].is_nan());
    }

    #[test]
    fn test_shape_mismatch_leaves_receiver_untouched() {
        let mut a = DoubleMatrix::ones(2, 3).unwrap();
        let b = DoubleMatrix::ones(3, 2).unwrap();
        assert!(a.add_matrix(&b).is_err());
        assert!(a.div_matrix(&b).is_err());

        let err = a.mul_matrix_mut(&b).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Dimension);
        assert_eq!(a, DoubleMatrix::ones(2, 3).unwrap());
    }

    #[test]
    fn test_mmul() {
        let a = DoubleMatrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = DoubleMatrix::from_vec(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]).unwrap();
        let c = a.mmul(&b).unwrap();
        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);

        let err = a.mmul(&a).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Dimension);
    }

    #[test]
    fn test_mmul_assign_changes_shape() {
        let mut a = DoubleMatrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = DoubleMatrix::from_vec(3, 1, vec![7.0, 8.0, 9.0]).unwrap();
        a.mmul_assign(&b).unwrap();
        assert_eq!(a.shape(), (2, 1));
        assert_eq!(a.as_slice(), &[50.0, 122.0]);

        let before = a.clone();
        assert!(a.mmul_assign(&b).is_err());
        assert_eq!(a, before);
    }
}
