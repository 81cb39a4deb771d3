//! Reductions and norms
//!
//! Column reductions return a `1 x cols` row vector, row reductions a
//! `rows x 1` column vector. Scalar reductions report their value in a
//! `dmat_scalar_result`, which holds NaN on failure.

impl_matrix_unary! {
    column_mins => |m| Ok(m.column_mins()),
    column_maxs => |m| Ok(m.column_maxs()),
    column_means => |m| Ok(m.column_means()),
    column_sums => |m| Ok(m.column_sums()),
    row_mins => |m| Ok(m.row_mins()),
    row_maxs => |m| Ok(m.row_maxs()),
    row_means => |m| Ok(m.row_means()),
    row_sums => |m| Ok(m.row_sums()),
}

impl_scalar_reductions!(min, max, sum, norm1, norm2);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{
        matrix_cols, matrix_data_array, matrix_double_array_free, matrix_error_free, matrix_rows,
    };
    use crate::alloc::{alloc_from_array, matrix_dealloc};
    use crate::types::dmat_ptr_result;
    use crate::{DMAT_INVALID_HANDLE, DMAT_SUCCESS};
    use approx::assert_abs_diff_eq;

    fn values(result: dmat_ptr_result) -> (i32, i32, Vec<f64>) {
        assert_eq!(result.status, DMAT_SUCCESS);
        let array = matrix_data_array(result.handle);
        let out = unsafe { std::slice::from_raw_parts(array.data, array.len) }.to_vec();
        unsafe { matrix_double_array_free(array) };
        let shape = (matrix_rows(result.handle), matrix_cols(result.handle));
        matrix_dealloc(result.handle);
        (shape.0, shape.1, out)
    }

    #[test]
    fn test_row_and_column_reductions() {
        let data = [1.0, 5.0, 3.0, 4.0, 2.0, 6.0];
        let h = unsafe { alloc_from_array(2, 3, data.len(), data.as_ptr()) }.handle;

        assert_eq!(values(matrix_column_sums(h)), (1, 3, vec![5.0, 7.0, 9.0]));
        assert_eq!(values(matrix_column_mins(h)), (1, 3, vec![1.0, 2.0, 3.0]));
        assert_eq!(values(matrix_column_maxs(h)), (1, 3, vec![4.0, 5.0, 6.0]));
        assert_eq!(values(matrix_column_means(h)), (1, 3, vec![2.5, 3.5, 4.5]));
        assert_eq!(values(matrix_row_sums(h)), (2, 1, vec![9.0, 12.0]));
        assert_eq!(values(matrix_row_mins(h)), (2, 1, vec![1.0, 2.0]));
        assert_eq!(values(matrix_row_maxs(h)), (2, 1, vec![5.0, 6.0]));
        assert_eq!(values(matrix_row_means(h)), (2, 1, vec![3.0, 4.0]));
        matrix_dealloc(h);
    }

    #[test]
    fn test_scalar_reductions() {
        let data = [3.0, -4.0];
        let h = unsafe { alloc_from_array(1, 2, data.len(), data.as_ptr()) }.handle;

        assert_eq!(matrix_min(h).value, -4.0);
        assert_eq!(matrix_max(h).value, 3.0);
        assert_eq!(matrix_sum(h).value, -1.0);
        assert_eq!(matrix_norm1(h).value, 7.0);
        assert_abs_diff_eq!(matrix_norm2(h).value, 5.0, epsilon = 1e-15);

        matrix_dealloc(h);
        let res = matrix_sum(h);
        assert_eq!(res.status, DMAT_INVALID_HANDLE);
        assert!(res.value.is_nan());
        unsafe { matrix_error_free(res.err) };
    }
}
