//! Element access, rendering and release of returned buffers

use std::ffi::CString;

use densemat_rust::PrettyConfig;
use libc::{c_char, c_int};

use crate::handles::{with_matrix, with_matrix_mut, with_pair_mut};
use crate::types::{dmat_double_array, dmat_handle, dmat_ptr_result, dmat_void_result};
use crate::utils::{run, to_c_int, to_c_string, to_usize, try_ptr, try_void};

/// Number of rows, or -1 for an invalid handle
#[unsafe(no_mangle)]
pub extern "C" fn matrix_rows(handle: dmat_handle) -> c_int {
    run("matrix_rows", || with_matrix(handle, |m| Ok(to_c_int(m.rows())))).unwrap_or(-1)
}

/// Number of columns, or -1 for an invalid handle
#[unsafe(no_mangle)]
pub extern "C" fn matrix_cols(handle: dmat_handle) -> c_int {
    run("matrix_cols", || with_matrix(handle, |m| Ok(to_c_int(m.cols())))).unwrap_or(-1)
}

/// Row-major copy of the elements
///
/// Returns an empty array (`len == 0`, `data == NULL`) for an invalid handle.
/// Matrices always hold at least one element, so an empty array only ever
/// signals a bad handle. Release with `matrix_double_array_free`.
#[unsafe(no_mangle)]
pub extern "C" fn matrix_data_array(handle: dmat_handle) -> dmat_double_array {
    run("matrix_data_array", || {
        with_matrix(handle, |m| Ok(dmat_double_array::from_slice(m.as_slice())))
    })
    .unwrap_or_else(|_| dmat_double_array::empty())
}

/// Human-readable rendering
///
/// With `truncate != 0`, at most 8 leading rows and columns are rendered,
/// followed by an ellipsis when more exist. Returns NULL for an invalid
/// handle, the only failure; no error message is produced. Release with
/// `matrix_string_free`.
#[unsafe(no_mangle)]
pub extern "C" fn matrix_pretty_string(handle: dmat_handle, truncate: c_int) -> *mut c_char {
    let config = if truncate != 0 {
        PrettyConfig::truncated()
    } else {
        PrettyConfig::full()
    };
    run("matrix_pretty_string", || with_matrix(handle, |m| Ok(m.pretty_string(&config))))
        .map(to_c_string)
        .unwrap_or(std::ptr::null_mut())
}

/// Copy of row `index` as a `1 x cols` matrix
#[unsafe(no_mangle)]
pub extern "C" fn matrix_get_row(handle: dmat_handle, index: c_int) -> dmat_ptr_result {
    try_ptr("matrix_get_row", || {
        let index = to_usize(index, "row index")?;
        with_matrix(handle, |m| m.get_row(index))
    })
}

/// Copy of column `index` as a `rows x 1` matrix
#[unsafe(no_mangle)]
pub extern "C" fn matrix_get_column(handle: dmat_handle, index: c_int) -> dmat_ptr_result {
    try_ptr("matrix_get_column", || {
        let index = to_usize(index, "column index")?;
        with_matrix(handle, |m| m.get_column(index))
    })
}

/// Overwrite row `index` with the elements of `vector`
#[unsafe(no_mangle)]
pub extern "C" fn matrix_put_row(
    handle: dmat_handle,
    index: c_int,
    vector: dmat_handle,
) -> dmat_void_result {
    try_void("matrix_put_row", || {
        let index = to_usize(index, "row index")?;
        with_pair_mut(handle, vector, |m, v| m.put_row(index, v))
    })
}

/// Overwrite column `index` with the elements of `vector`
#[unsafe(no_mangle)]
pub extern "C" fn matrix_put_column(
    handle: dmat_handle,
    index: c_int,
    vector: dmat_handle,
) -> dmat_void_result {
    try_void("matrix_put_column", || {
        let index = to_usize(index, "column index")?;
        with_pair_mut(handle, vector, |m, v| m.put_column(index, v))
    })
}

/// Set a single element
#[unsafe(no_mangle)]
pub extern "C" fn matrix_put(
    handle: dmat_handle,
    row: c_int,
    col: c_int,
    value: f64,
) -> dmat_void_result {
    try_void("matrix_put", || {
        let (row, col) = (to_usize(row, "row index")?, to_usize(col, "column index")?);
        with_matrix_mut(handle, |m| {
            if row >= m.rows() || col >= m.cols() {
                return Err(densemat_rust::MatrixError::dimension(format!(
                    "index ({}, {}) out of range for {}x{}",
                    row,
                    col,
                    m.rows(),
                    m.cols()
                )));
            }
            m.put(row, col, value);
            Ok(())
        })
    })
}

/// Release an error message returned in a result struct
///
/// # Safety
/// `err` must be NULL or a message produced by this library, and must not be
/// used after this call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn matrix_error_free(err: *mut c_char) {
    if err.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(err) });
}

/// Release a string returned by `matrix_pretty_string`
///
/// # Safety
/// Same contract as `matrix_error_free`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn matrix_string_free(s: *mut c_char) {
    unsafe { matrix_error_free(s) }
}

/// Release an array returned by `matrix_data_array`
///
/// # Safety
/// `array` must come from `matrix_data_array` and must not be released twice.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn matrix_double_array_free(array: dmat_double_array) {
    if array.data.is_null() {
        return;
    }
    let slice = std::ptr::slice_from_raw_parts_mut(array.data, array.len);
    drop(unsafe { Box::from_raw(slice) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{alloc_from_array, alloc_identity, matrix_dealloc, matrix_is_valid};
    use crate::{DMAT_DIMENSION_ERROR, DMAT_SUCCESS};
    use std::ffi::CStr;

    fn from_values(rows: c_int, cols: c_int, values: &[f64]) -> dmat_handle {
        let res = unsafe { alloc_from_array(rows, cols, values.len(), values.as_ptr()) };
        assert_eq!(res.status, DMAT_SUCCESS);
        res.handle
    }

    #[test]
    fn test_shape_and_data() {
        let h = from_values(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(matrix_rows(h), 2);
        assert_eq!(matrix_cols(h), 3);

        let array = matrix_data_array(h);
        assert_eq!(array.len, 6);
        let data = unsafe { std::slice::from_raw_parts(array.data, array.len) };
        assert_eq!(data, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        unsafe { matrix_double_array_free(array) };

        matrix_dealloc(h);
        assert_eq!(matrix_rows(h), -1);
        assert_eq!(matrix_cols(h), -1);
        let missing = matrix_data_array(h);
        assert_eq!(missing.len, 0);
        assert!(missing.data.is_null());
        assert_eq!(matrix_is_valid(h), 0);

        // The smallest matrix still yields a non-empty array
        let one = from_values(1, 1, &[7.0]);
        let array = matrix_data_array(one);
        assert_eq!(array.len, 1);
        assert!(!array.data.is_null());
        unsafe { matrix_double_array_free(array) };
        matrix_dealloc(one);
    }

    #[test]
    fn test_pretty_string() {
        let h = alloc_identity(20, 20).handle;
        let full = matrix_pretty_string(h, 0);
        let truncated = matrix_pretty_string(h, 1);
        let full_text = unsafe { CStr::from_ptr(full) }.to_str().unwrap().to_string();
        let short_text = unsafe { CStr::from_ptr(truncated) }.to_str().unwrap().to_string();
        assert!(full_text.starts_with("20 x 20"));
        assert_eq!(full_text.lines().count(), 23);
        assert_eq!(short_text.lines().count(), 12);
        assert!(short_text.contains('…'));
        unsafe { matrix_string_free(full) };
        unsafe { matrix_string_free(truncated) };
        matrix_dealloc(h);
        assert!(matrix_pretty_string(h, 1).is_null());
    }

    #[test]
    fn test_rows_and_columns() {
        let h = from_values(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let row = matrix_get_row(h, 1);
        assert_eq!(row.status, DMAT_SUCCESS);
        assert_eq!(matrix_cols(row.handle), 3);

        let column = matrix_get_column(h, 2);
        assert_eq!(matrix_rows(column.handle), 2);

        let bad = matrix_get_row(h, 5);
        assert_eq!(bad.status, DMAT_DIMENSION_ERROR);
        unsafe { matrix_error_free(bad.err) };

        assert_eq!(matrix_put_row(h, 0, row.handle).status, DMAT_SUCCESS);
        assert_eq!(matrix_put_column(h, 0, column.handle).status, DMAT_SUCCESS);
        assert_eq!(matrix_put(h, 1, 1, -1.0).status, DMAT_SUCCESS);

        let array = matrix_data_array(h);
        let data = unsafe { std::slice::from_raw_parts(array.data, array.len) };
        assert_eq!(data, &[3.0, 5.0, 6.0, 6.0, -1.0, 6.0]);
        unsafe { matrix_double_array_free(array) };

        let res = matrix_put(h, 2, 0, 0.0);
        assert_eq!(res.status, DMAT_DIMENSION_ERROR);
        unsafe { matrix_error_free(res.err) };

        for handle in [h, row.handle, column.handle] {
            matrix_dealloc(handle);
        }
    }
}
