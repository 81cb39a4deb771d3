//! C API for the densemat dense matrix engine
//!
//! Matrices live behind opaque [`dmat_handle`] tokens. Every fallible call
//! returns a tagged result struct carrying a status code and, on failure, an
//! owned error message. Handles are released with `matrix_dealloc`; using a
//! released handle reports `DMAT_INVALID_HANDLE`.

#[macro_use]
mod macros;

mod handles;
mod utils;
mod types;
mod alloc;
mod access;
mod arith;
mod reduce;
mod svd;
mod gemm;

pub use types::*;
pub use alloc::*;
pub use access::*;
pub use arith::*;
pub use reduce::*;
pub use svd::*;
pub use gemm::*;

/// Status codes returned across the C boundary
pub type StatusCode = libc::c_int;

pub const DMAT_SUCCESS: StatusCode = 0;
pub const DMAT_DIMENSION_ERROR: StatusCode = -1;
pub const DMAT_ALLOCATION_ERROR: StatusCode = -2;
pub const DMAT_ARITHMETIC_ERROR: StatusCode = -3;
pub const DMAT_CONVERGENCE_ERROR: StatusCode = -4;
pub const DMAT_INVALID_HANDLE: StatusCode = -5;
pub const DMAT_INVALID_ARGUMENT: StatusCode = -6;
pub const DMAT_INTERNAL_ERROR: StatusCode = -7;
