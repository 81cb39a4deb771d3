//! Elementwise arithmetic, products and structural transforms

use crate::handles::{with_pair, with_pair_mut};
use crate::types::{dmat_handle, dmat_ptr_result, dmat_void_result};
use crate::utils::{try_ptr, try_void};

// matrix_{add,sub,mul,div}_{scalar,matrix} and their in-place forms
impl_elementwise_ops!(add);
impl_elementwise_ops!(sub);
impl_elementwise_ops!(mul);
impl_elementwise_ops!(div);

/// Matrix product `lhs * rhs` under a new handle
///
/// # Returns
/// `DMAT_DIMENSION_ERROR` unless `cols(lhs) == rows(rhs)`
#[unsafe(no_mangle)]
pub extern "C" fn matrix_mmul_matrix(lhs: dmat_handle, rhs: dmat_handle) -> dmat_ptr_result {
    try_ptr("matrix_mmul_matrix", || with_pair(lhs, rhs, |a, b| a.mmul(b)))
}

/// Replace `target` with `target * operand`
///
/// The receiver takes the shape of the product. On error it is left untouched.
#[unsafe(no_mangle)]
pub extern "C" fn matrix_mmul_in_place_matrix(
    target: dmat_handle,
    operand: dmat_handle,
) -> dmat_void_result {
    try_void("matrix_mmul_in_place_matrix", || {
        with_pair_mut(target, operand, |a, b| a.mmul_assign(b))
    })
}

impl_matrix_unary! {
    transpose => |m| m.transpose(),
    abs => |m| m.abs(),
    diag => |m| m.diag(),
}
