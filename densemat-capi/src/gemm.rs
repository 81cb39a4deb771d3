//! GEMM backend registration
//!
//! Matrix products run on a pure Rust kernel by default. A host may inject its
//! own CBLAS `dgemm` (OpenBLAS, MKL, Accelerate, ...) at runtime.
//!
//! # Example (C)
//! ```c
//! #include <cblas.h>
//!
//! register_blas_dgemm((void*)cblas_dgemm);
//! // All matrix products now use the registered dgemm
//! clear_blas_backend();
//! ```

use crate::StatusCode;
use crate::{DMAT_INVALID_ARGUMENT, DMAT_SUCCESS};

/// Register a CBLAS `dgemm` (LP64: 32-bit integers)
///
/// The function is always called with `CblasRowMajor` (101) and
/// `CblasNoTrans` (111) for both operands.
///
/// # Returns
/// * `DMAT_SUCCESS` on success
/// * `DMAT_INVALID_ARGUMENT` if `cblas_dgemm` is null
///
/// # Safety
/// The pointer must:
/// - be a valid CBLAS `dgemm` using 32-bit integer dimensions
/// - be safe to call from any thread
/// - remain valid for the rest of the program
#[unsafe(no_mangle)]
pub unsafe extern "C" fn register_blas_dgemm(cblas_dgemm: *const libc::c_void) -> StatusCode {
    if cblas_dgemm.is_null() {
        return DMAT_INVALID_ARGUMENT;
    }

    let dgemm_fn: densemat_rust::gemm::DgemmFnPtr = unsafe { std::mem::transmute(cblas_dgemm) };
    unsafe { densemat_rust::gemm::set_blas_backend(dgemm_fn) };

    DMAT_SUCCESS
}

/// Go back to the built-in pure Rust kernel
#[unsafe(no_mangle)]
pub extern "C" fn clear_blas_backend() -> StatusCode {
    densemat_rust::gemm::clear_blas_backend();
    DMAT_SUCCESS
}
