//! Singular value decompositions
//!
//! Decompositions publish `U`, `S` and `V` as three new handles. `V` is
//! returned, not `Vᵗ`, so `A ≈ U · diag(S) · Vᵗ`. On failure no handle is
//! published and all three slots hold `DMAT_NULL_HANDLE`.

use densemat_rust::{LanczosConfig, SvdConfig, full_svd, lanczos_svd_k, singular_values, svd_k};
use libc::c_int;

use crate::handles::with_matrix;
use crate::types::{dmat_handle, dmat_ptr_result, dmat_svd_result};
use crate::utils::{to_usize, try_ptr, try_svd};

/// Full SVD
///
/// # Returns
/// `U` (rows × rows), `S` (min(rows, cols) × 1, descending) and
/// `V` (cols × cols), or `DMAT_CONVERGENCE_ERROR` when the Jacobi sweeps do
/// not converge. Non-finite entries give `DMAT_ARITHMETIC_ERROR`.
///
/// # Example (C)
/// ```c
/// dmat_svd_result res = matrix_full_svd(a);
/// if (res.status == DMAT_SUCCESS) {
///     // ...
///     matrix_dealloc(res.u);
///     matrix_dealloc(res.s);
///     matrix_dealloc(res.v);
/// } else {
///     matrix_error_free(res.err);
/// }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn matrix_full_svd(handle: dmat_handle) -> dmat_svd_result {
    try_svd("matrix_full_svd", || {
        with_matrix(handle, |m| full_svd(m, &SvdConfig::default()))
    })
}

/// Singular values only, as a `min(rows, cols) × 1` column vector
#[unsafe(no_mangle)]
pub extern "C" fn matrix_singular_values(handle: dmat_handle) -> dmat_ptr_result {
    try_ptr("matrix_singular_values", || {
        with_matrix(handle, |m| singular_values(m, &SvdConfig::default()))
    })
}

/// Leading `k` singular triplets from the Jacobi engine
///
/// # Returns
/// `U` (rows × k), `S` (k × 1) and `V` (cols × k), or `DMAT_DIMENSION_ERROR`
/// unless `1 <= k <= min(rows, cols)`
#[unsafe(no_mangle)]
pub extern "C" fn matrix_svd_k(handle: dmat_handle, k: c_int) -> dmat_svd_result {
    try_svd("matrix_svd_k", || {
        let k = to_usize(k, "k")?;
        with_matrix(handle, |m| svd_k(m, k, &SvdConfig::default()))
    })
}

/// Leading `k` singular triplets from the Lanczos engine
///
/// Same shapes and errors as `matrix_svd_k`. Singular values agree with
/// `matrix_full_svd` to about `1e-8` relative to the largest one.
#[unsafe(no_mangle)]
pub extern "C" fn matrix_lansvd_k(handle: dmat_handle, k: c_int) -> dmat_svd_result {
    try_svd("matrix_lansvd_k", || {
        let k = to_usize(k, "k")?;
        with_matrix(handle, |m| lanczos_svd_k(m, k, &LanczosConfig::default()))
    })
}
