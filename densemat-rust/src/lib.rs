//! Dense double-precision matrices
//!
//! This crate provides the numerical core behind the `densemat` C API:
//! - [`DoubleMatrix`]: row-major storage with fallible constructors
//! - Elementwise arithmetic, matrix products and transposition
//! - Row, column and global reductions and norms
//! - Singular value decompositions (Jacobi and Lanczos engines)
//!
//! Every fallible operation returns [`Result`] with a [`MatrixError`].

pub mod error;
pub mod format;
pub mod gemm;
pub mod matrix;
pub mod ops;
pub mod reduce;
pub mod svd;

pub use error::{ErrorKind, MatrixError, Result};
pub use format::PrettyConfig;
pub use matrix::DoubleMatrix;
pub use svd::{
    LanczosConfig, SvdConfig, SvdResult, full_svd, lanczos_svd_k, singular_values, svd_k,
};
