//! Matrix multiplication with a pluggable BLAS backend
//!
//! All products go through a process-wide dispatcher.
//!
//! # Design
//! - **Default**: pure Rust row-major kernel (no external dependencies)
//! - **Optional**: external CBLAS `dgemm` injected as a function pointer
//! - **Thread-safe**: dispatcher protected by an `RwLock`
//!
//! # Example
//! ```ignore
//! use densemat_rust::gemm::{dgemm, set_blas_backend};
//!
//! // Default backend
//! dgemm(m, n, k, &a, &b, &mut c)?;
//!
//! // Or inject cblas_dgemm (from the C API)
//! unsafe {
//!     set_blas_backend(my_dgemm_ptr);
//! }
//! ```

use once_cell::sync::Lazy;
use std::sync::RwLock;

use crate::error::{MatrixError, Result};

/// CBLAS dgemm function pointer type (LP64: 32-bit integers)
///
/// Signature matches CBLAS dgemm:
/// ```c
/// void cblas_dgemm(
///     CblasOrder order,          // 101 (RowMajor) or 102 (ColMajor)
///     CblasTranspose transa,     // 111 (NoTrans), 112 (Trans)
///     CblasTranspose transb,
///     int m, int n, int k,
///     double alpha,
///     const double *a, int lda,
///     const double *b, int ldb,
///     double beta,
///     double *c, int ldc
/// );
/// ```
pub type DgemmFnPtr = unsafe extern "C" fn(
    order: libc::c_int,
    transa: libc::c_int,
    transb: libc::c_int,
    m: libc::c_int,
    n: libc::c_int,
    k: libc::c_int,
    alpha: libc::c_double,
    a: *const libc::c_double,
    lda: libc::c_int,
    b: *const libc::c_double,
    ldb: libc::c_int,
    beta: libc::c_double,
    c: *mut libc::c_double,
    ldc: libc::c_int,
);

const CBLAS_ROW_MAJOR: libc::c_int = 101;
const CBLAS_NO_TRANS: libc::c_int = 111;

/// GEMM backend trait for runtime dispatch
///
/// All slices are row-major: `a` is `m x k`, `b` is `k x n`, `c` is `m x n`.
/// Implementations overwrite `c` with `a * b`.
pub trait GemmBackend: Send + Sync {
    fn dgemm(&self, m: usize, n: usize, k: usize, a: &[f64], b: &[f64], c: &mut [f64]) -> Result<()>;

    /// Returns backend name for debugging
    fn name(&self) -> &'static str;
}

/// Default backend: straightforward i-l-j loop over row-major buffers
struct NativeBackend;

impl GemmBackend for NativeBackend {
    fn dgemm(&self, m: usize, n: usize, k: usize, a: &[f64], b: &[f64], c: &mut [f64]) -> Result<()> {
        c.fill(0.0);
        for i in 0..m {
            let c_row = &mut c[i * n..(i + 1) * n];
            for l in 0..k {
                let a_il = a[i * k + l];
                let b_row = &b[l * n..(l + 1) * n];
                for (cij, &blj) in c_row.iter_mut().zip(b_row) {
                    *cij += a_il * blj;
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Native (Pure Rust)"
    }
}

/// External BLAS backend (LP64: 32-bit integers)
struct ExternalBlasBackend {
    dgemm: DgemmFnPtr,
}

impl GemmBackend for ExternalBlasBackend {
    fn dgemm(&self, m: usize, n: usize, k: usize, a: &[f64], b: &[f64], c: &mut [f64]) -> Result<()> {
        let to_c_int = |value: usize, what: &str| {
            libc::c_int::try_from(value).map_err(|_| {
                MatrixError::dimension(format!("{} = {} too large for LP64 BLAS", what, value))
            })
        };
        let (mi, ni, ki) = (to_c_int(m, "m")?, to_c_int(n, "n")?, to_c_int(k, "k")?);

        unsafe {
            (self.dgemm)(
                CBLAS_ROW_MAJOR,
                CBLAS_NO_TRANS,
                CBLAS_NO_TRANS,
                mi,
                ni,
                ki,
                1.0, // alpha
                a.as_ptr(),
                ki.max(1), // lda
                b.as_ptr(),
                ni.max(1), // ldb
                0.0,       // beta
                c.as_mut_ptr(),
                ni.max(1), // ldc
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "External BLAS (LP64)"
    }
}

/// Global GEMM dispatcher (thread-safe)
static GEMM_DISPATCHER: Lazy<RwLock<Box<dyn GemmBackend>>> =
    Lazy::new(|| RwLock::new(Box::new(NativeBackend)));

/// Set BLAS backend (LP64: 32-bit integers)
///
/// # Safety
/// - Function pointer must be a valid, thread-safe CBLAS `dgemm`
/// - Must remain valid for the lifetime of the program
pub unsafe fn set_blas_backend(dgemm: DgemmFnPtr) {
    let backend = ExternalBlasBackend { dgemm };
    let mut dispatcher = GEMM_DISPATCHER.write().unwrap_or_else(|e| e.into_inner());
    *dispatcher = Box::new(backend);
    tracing::debug!(backend = dispatcher.name(), "GEMM backend registered");
}

/// Reset the dispatcher to the default pure Rust backend
pub fn clear_blas_backend() {
    let mut dispatcher = GEMM_DISPATCHER.write().unwrap_or_else(|e| e.into_inner());
    *dispatcher = Box::new(NativeBackend);
    tracing::debug!(backend = dispatcher.name(), "GEMM backend reset");
}

/// Get current backend information
///
/// Returns:
/// - `(backend_name, is_external)`
pub fn get_backend_info() -> (&'static str, bool) {
    let dispatcher = GEMM_DISPATCHER.read().unwrap_or_else(|e| e.into_inner());
    let name = dispatcher.name();
    (name, !name.starts_with("Native"))
}

/// Matrix multiplication `c = a * b` on row-major buffers
///
/// # Arguments
/// * `a` - Left matrix (m x k)
/// * `b` - Right matrix (k x n)
/// * `c` - Output (m x n), overwritten
pub fn dgemm(m: usize, n: usize, k: usize, a: &[f64], b: &[f64], c: &mut [f64]) -> Result<()> {
    if a.len() != m * k || b.len() != k * n || c.len() != m * n {
        return Err(MatrixError::dimension(format!(
            "gemm buffers do not match m={}, n={}, k={}: |a|={}, |b|={}, |c|={}",
            m,
            n,
            k,
            a.len(),
            b.len(),
            c.len()
        )));
    }
    let dispatcher = GEMM_DISPATCHER.read().unwrap_or_else(|e| e.into_inner());
    dispatcher.dgemm(m, n, k, a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_is_native() {
        let (name, is_external) = get_backend_info();
        assert_eq!(name, "Native (Pure Rust)");
        assert!(!is_external);
    }

    #[test]
    fn test_dgemm_f64() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut c = [0.0; 4];
        dgemm(2, 2, 3, &a, &b, &mut c).unwrap();
        // First row: [1*7+2*9+3*11, 1*8+2*10+3*12] = [58, 64]
        // Second row: [4*7+5*9+6*11, 4*8+5*10+6*12] = [139, 154]
        assert_eq!(c, [58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_dgemm_overwrites_output() {
        let a = [1.0, 2.0];
        let b = [3.0, 4.0];
        let mut c = [100.0];
        dgemm(1, 1, 2, &a, &b, &mut c).unwrap();
        assert_eq!(c, [11.0]);
    }

    #[test]
    fn test_dgemm_buffer_mismatch() {
        let mut c = [0.0; 4];
        assert!(dgemm(2, 2, 3, &[1.0; 5], &[1.0; 6], &mut c).is_err());
    }
}
