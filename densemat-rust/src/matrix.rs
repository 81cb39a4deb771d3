//! Dense matrix storage
//!
//! [`DoubleMatrix`] owns a contiguous row-major buffer of `f64` together with its
//! extents. Every public constructor rejects empty shapes, so `rows >= 1` and
//! `cols >= 1` hold for every matrix handed out by this crate.

use rand::Rng;

use crate::error::{MatrixError, Result};

/// Dynamically sized, heap allocated matrix of doubles in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleMatrix {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) data: Vec<f64>,
}

/// Validate extents and return the element count
fn checked_len(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(MatrixError::dimension(format!(
            "matrix must have at least one row and one column, got {}x{}",
            rows, cols
        )));
    }
    rows.checked_mul(cols).ok_or_else(|| {
        MatrixError::allocation(format!("{} x {} elements overflow the address space", rows, cols))
    })
}

/// Reserve an empty buffer able to hold `len` doubles without reallocation
pub(crate) fn alloc_buffer(len: usize) -> Result<Vec<f64>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|e| {
        MatrixError::allocation(format!("cannot reserve {} doubles: {}", len, e))
    })?;
    Ok(data)
}

impl DoubleMatrix {
    /// Wrap an existing buffer
    ///
    /// Fails with a dimension error when `rows * cols != data.len()`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        if len != data.len() {
            return Err(MatrixError::dimension(format!(
                "{} * {} != {}: expected {} values, got {}",
                rows,
                cols,
                data.len(),
                len,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Copy a row-major slice into a new matrix
    pub fn from_slice(rows: usize, cols: usize, values: &[f64]) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        if len != values.len() {
            return Err(MatrixError::dimension(format!(
                "{} * {} != {}: expected {} values, got {}",
                rows,
                cols,
                values.len(),
                len,
                values.len()
            )));
        }
        let mut data = alloc_buffer(len)?;
        data.extend_from_slice(values);
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix by evaluating `f(row, col)` for every element
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let len = checked_len(rows, cols)?;
        let mut data = alloc_buffer(len)?;
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Ok(Self { rows, cols, data })
    }

    /// Matrix with every element set to `value`
    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        let mut data = alloc_buffer(len)?;
        data.resize(len, value);
        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::filled(rows, cols, 0.0)
    }

    pub fn ones(rows: usize, cols: usize) -> Result<Self> {
        Self::filled(rows, cols, 1.0)
    }

    /// Identity-like matrix: 1s on the main diagonal up to `min(rows, cols)`,
    /// 0s elsewhere. Non-square shapes are accepted.
    pub fn identity(rows: usize, cols: usize) -> Result<Self> {
        let mut matrix = Self::zeros(rows, cols)?;
        for i in 0..rows.min(cols) {
            matrix.put(i, i, 1.0);
        }
        Ok(matrix)
    }

    /// Matrix of i.i.d. values drawn uniformly from `[0, 1)`
    ///
    /// Uses the calling thread's generator, so concurrent allocations never
    /// contend on shared state.
    pub fn random(rows: usize, cols: usize) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        let mut data = alloc_buffer(len)?;
        let mut rng = rand::thread_rng();
        data.extend((0..len).map(|_| rng.gen_range(0.0..1.0)));
        Ok(Self { rows, cols, data })
    }

    /// Fallible deep copy, surfacing allocation failure as an error
    pub fn try_clone(&self) -> Result<Self> {
        let mut data = alloc_buffer(self.data.len())?;
        data.extend_from_slice(&self.data);
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Internal constructor for kernels whose output shape is derived from a
    /// valid input
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(rows * cols, data.len());
        Self { rows, cols, data }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for matrices built through the public constructors
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major view of the elements
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    #[inline]
    pub fn is_vector(&self) -> bool {
        self.rows == 1 || self.cols == 1
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// # Panics
    /// Panics if `row` or `col` is out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of range", row, col);
        self.data[self.index(row, col)]
    }

    /// # Panics
    /// Panics if `row` or `col` is out of range.
    #[inline]
    pub fn put(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of range", row, col);
        let i = self.index(row, col);
        self.data[i] = value;
    }

    /// Copy of row `row` as a `1 x cols` matrix
    pub fn get_row(&self, row: usize) -> Result<DoubleMatrix> {
        if row >= self.rows {
            return Err(MatrixError::dimension(format!(
                "row index {} out of range for {} rows",
                row, self.rows
            )));
        }
        let start = row * self.cols;
        Self::from_slice(1, self.cols, &self.data[start..start + self.cols])
    }

    /// Copy of column `col` as a `rows x 1` matrix
    pub fn get_column(&self, col: usize) -> Result<DoubleMatrix> {
        if col >= self.cols {
            return Err(MatrixError::dimension(format!(
                "column index {} out of range for {} columns",
                col, self.cols
            )));
        }
        Self::from_fn(self.rows, 1, |i, _| self.data[i * self.cols + col])
    }

    /// Overwrite row `row` with the elements of a vector of length `cols`
    pub fn put_row(&mut self, row: usize, vector: &DoubleMatrix) -> Result<()> {
        if row >= self.rows {
            return Err(MatrixError::dimension(format!(
                "row index {} out of range for {} rows",
                row, self.rows
            )));
        }
        if !vector.is_vector() || vector.len() != self.cols {
            return Err(MatrixError::dimension(format!(
                "row update requires a vector of length {}, got {}x{}",
                self.cols, vector.rows, vector.cols
            )));
        }
        let start = row * self.cols;
        self.data[start..start + self.cols].copy_from_slice(&vector.data);
        Ok(())
    }

    /// Overwrite column `col` with the elements of a vector of length `rows`
    pub fn put_column(&mut self, col: usize, vector: &DoubleMatrix) -> Result<()> {
        if col >= self.cols {
            return Err(MatrixError::dimension(format!(
                "column index {} out of range for {} columns",
                col, self.cols
            )));
        }
        if !vector.is_vector() || vector.len() != self.rows {
            return Err(MatrixError::dimension(format!(
                "column update requires a vector of length {}, got {}x{}",
                self.rows, vector.rows, vector.cols
            )));
        }
        for (i, &value) in vector.data.iter().enumerate() {
            self.data[i * self.cols + col] = value;
        }
        Ok(())
    }

    pub fn transpose(&self) -> Result<DoubleMatrix> {
        Self::from_fn(self.cols, self.rows, |i, j| self.data[j * self.cols + i])
    }

    /// Main diagonal of a square matrix as a `n x 1` column vector
    pub fn diag(&self) -> Result<DoubleMatrix> {
        if self.rows != self.cols {
            return Err(MatrixError::dimension(format!(
                "diagonal requires a square matrix, got {}x{}",
                self.rows, self.cols
            )));
        }
        Self::from_fn(self.rows, 1, |i, _| self.data[i * self.cols + i])
    }

    pub fn abs(&self) -> Result<DoubleMatrix> {
        let mut out = alloc_buffer(self.data.len())?;
        out.extend(self.data.iter().map(|x| x.abs()));
        Ok(Self::from_parts(self.rows, self.cols, out))
    }
}
