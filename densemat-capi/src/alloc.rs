//! Allocation and lifecycle API
//!
//! Functions for creating matrices and releasing their handles.

use densemat_rust::{DoubleMatrix, MatrixError};
use libc::{c_double, c_int, size_t};

use crate::types::dmat_ptr_result;
use crate::utils::{to_usize, try_ptr};

// Generate lifecycle functions: matrix_dealloc, matrix_clone, matrix_is_valid
impl_handle_lifecycle!(matrix);

/// Create a matrix from a row-major array
///
/// The values are copied; the caller keeps ownership of `data`.
///
/// # Arguments
/// * `rows`, `cols` - Extents (must be positive)
/// * `len` - Number of values in `data` (must equal `rows * cols`)
/// * `data` - Row-major values
///
/// # Returns
/// * `DMAT_DIMENSION_ERROR` if `len != rows * cols` or an extent is not positive
/// * `DMAT_INVALID_ARGUMENT` if `data` is null while `len > 0`
///
/// # Safety
/// `data` must point to at least `len` readable doubles.
///
/// # Example (C)
/// ```c
/// double values[] = {1.0, 2.0, 3.0, 4.0, 5.0, 6.0};
/// dmat_ptr_result res = alloc_from_array(2, 3, 6, values);
/// if (res.status == DMAT_SUCCESS) {
///     // Use res.handle...
///     matrix_dealloc(res.handle);
/// } else {
///     fprintf(stderr, "%s\n", res.err);
///     matrix_error_free(res.err);
/// }
/// ```
#[unsafe(no_mangle)]
pub unsafe extern "C" fn alloc_from_array(
    rows: c_int,
    cols: c_int,
    len: size_t,
    data: *const c_double,
) -> dmat_ptr_result {
    try_ptr("alloc_from_array", || {
        let rows = to_usize(rows, "rows")?;
        let cols = to_usize(cols, "cols")?;
        let values: &[f64] = if data.is_null() {
            if len != 0 {
                return Err(MatrixError::invalid_argument("data is null but len > 0"));
            }
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(data, len) }
        };
        DoubleMatrix::from_slice(rows, cols, values)
    })
}

/// Matrix of values drawn uniformly from `[0, 1)`
#[unsafe(no_mangle)]
pub extern "C" fn alloc_rand(rows: c_int, cols: c_int) -> dmat_ptr_result {
    try_ptr("alloc_rand", || {
        DoubleMatrix::random(to_usize(rows, "rows")?, to_usize(cols, "cols")?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn alloc_zeros(rows: c_int, cols: c_int) -> dmat_ptr_result {
    try_ptr("alloc_zeros", || {
        DoubleMatrix::zeros(to_usize(rows, "rows")?, to_usize(cols, "cols")?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn alloc_ones(rows: c_int, cols: c_int) -> dmat_ptr_result {
    try_ptr("alloc_ones", || {
        DoubleMatrix::ones(to_usize(rows, "rows")?, to_usize(cols, "cols")?)
    })
}

/// Identity-like matrix
///
/// Non-square shapes are accepted: 1s are placed on the main diagonal up to
/// `min(rows, cols)`.
#[unsafe(no_mangle)]
pub extern "C" fn alloc_identity(rows: c_int, cols: c_int) -> dmat_ptr_result {
    try_ptr("alloc_identity", || {
        DoubleMatrix::identity(to_usize(rows, "rows")?, to_usize(cols, "cols")?)
    })
}
