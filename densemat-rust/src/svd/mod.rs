//! Singular value decompositions
//!
//! Two engines are available:
//! - one-sided Jacobi ([`full_svd`], [`singular_values`], [`svd_k`]), accurate
//!   for every singular value;
//! - Golub-Kahan-Lanczos bidiagonalization ([`lanczos_svd_k`]), which only
//!   resolves the leading `k` triplets.
//!
//! Both return `V`, not `Vᵗ`: `A ≈ U · diag(S) · Vᵗ`. Signs of singular
//! vectors are arbitrary, but every returned triplet satisfies
//! `A · v_i ≈ s_i · u_i`.

mod jacobi;
mod lanczos;

use mdarray::DTensor;

use crate::error::{MatrixError, Result};
use crate::matrix::DoubleMatrix;

use jacobi::{complete_basis, jacobi_singular_values, jacobi_svd};

/// Default sweep budget of the Jacobi engine
pub const DEFAULT_MAX_SWEEPS: usize = 60;

/// Default relative orthogonality tolerance of the Jacobi engine
pub const DEFAULT_TOLERANCE: f64 = 2.0 * f64::EPSILON;

/// Default residual tolerance of the Lanczos engine, relative to `S[0]`
pub const DEFAULT_LANCZOS_TOLERANCE: f64 = 1e-12;

/// Default number of subspace enlargements of the Lanczos engine
pub const DEFAULT_MAX_RESTARTS: usize = 16;

/// Configuration for the Jacobi engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvdConfig {
    /// Maximum number of cyclic sweeps before giving up
    pub max_sweeps: usize,
    /// Column pairs count as orthogonal when `|w_p . w_q|` is below
    /// `tolerance * sqrt(rows) * |w_p| * |w_q|`
    pub tolerance: f64,
}

impl SvdConfig {
    pub fn new(tolerance: f64) -> Self {
        Self {
            max_sweeps: DEFAULT_MAX_SWEEPS,
            tolerance,
        }
    }
}

impl Default for SvdConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

/// Configuration for the Lanczos engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanczosConfig {
    /// A triplet is accepted once its residual bound is below
    /// `tolerance * S[0]`
    pub tolerance: f64,
    /// How many times the Krylov subspace may be doubled
    pub max_restarts: usize,
    /// Seed of the start vector, fixed so results are reproducible
    pub seed: u64,
    /// Settings for the projected bidiagonal problem and the fallback path
    pub svd: SvdConfig,
}

impl LanczosConfig {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            max_restarts: DEFAULT_MAX_RESTARTS,
            seed: 0x5eed,
            svd: SvdConfig::default(),
        }
    }
}

impl Default for LanczosConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LANCZOS_TOLERANCE)
    }
}

/// Singular triplets of a matrix
#[derive(Debug, Clone, PartialEq)]
pub struct SvdResult {
    /// Left singular vectors as columns
    pub u: DoubleMatrix,
    /// Singular values as a column vector, descending
    pub s: DoubleMatrix,
    /// Right singular vectors as columns
    pub v: DoubleMatrix,
}

fn check_finite(a: &DoubleMatrix) -> Result<()> {
    if let Some(pos) = a.as_slice().iter().position(|x| !x.is_finite()) {
        return Err(MatrixError::arithmetic(format!(
            "cannot decompose a matrix with non-finite entry {} at ({}, {})",
            a.as_slice()[pos],
            pos / a.cols(),
            pos % a.cols()
        )));
    }
    Ok(())
}

fn check_rank(k: usize, rows: usize, cols: usize) -> Result<()> {
    let p = rows.min(cols);
    if k == 0 || k > p {
        return Err(MatrixError::dimension(format!(
            "requested {} singular triplets of a {}x{} matrix, expected 1..={}",
            k, rows, cols, p
        )));
    }
    Ok(())
}

/// Power of two closest below `max |a_ij|`, or 1 for a zero matrix
///
/// Dividing by it is exact and keeps the Gram sums of the work columns away
/// from overflow and underflow.
fn magnitude(a: &DoubleMatrix) -> f64 {
    let max = a.as_slice().iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
    if max == 0.0 {
        return 1.0;
    }
    2f64.powi(max.log2().floor().clamp(-1022.0, 1023.0) as i32)
}

/// Work copy of `a / scale` in its taller orientation
struct Work {
    tensor: DTensor<f64, 2>,
    transposed: bool,
    scale: f64,
}

fn tall_work(a: &DoubleMatrix) -> Work {
    let (m, n) = a.shape();
    let scale = magnitude(a);
    let transposed = m < n;
    let tensor = if transposed {
        DTensor::<f64, 2>::from_fn([n, m], |idx| a.get(idx[1], idx[0]) / scale)
    } else {
        DTensor::<f64, 2>::from_fn([m, n], |idx| a.get(idx[0], idx[1]) / scale)
    };
    Work {
        tensor,
        transposed,
        scale,
    }
}

/// Leading `cols` columns of a work tensor
fn to_matrix(t: &DTensor<f64, 2>, cols: usize) -> Result<DoubleMatrix> {
    DoubleMatrix::from_fn(t.shape().0, cols, |i, j| t[[i, j]])
}

fn column_vector(values: &[f64]) -> Result<DoubleMatrix> {
    DoubleMatrix::from_slice(values.len(), 1, values)
}

/// Extend `d × c` orthonormal columns to a square orthogonal `d × d` tensor
fn extend_to_square(q: &DTensor<f64, 2>) -> DTensor<f64, 2> {
    let (d, c) = *q.shape();
    if c == d {
        return q.clone();
    }
    let mut full = DTensor::<f64, 2>::from_fn([d, d], |idx| {
        if idx[1] < c { q[[idx[0], idx[1]]] } else { 0.0 }
    });
    let mut valid: Vec<bool> = (0..d).map(|j| j < c).collect();
    complete_basis(&mut full, &mut valid);
    full
}

/// Thin decomposition: `U` (m × p), `S` (p), `V` (n × p), `p = min(m, n)`
fn thin_svd(
    a: &DoubleMatrix,
    config: &SvdConfig,
) -> Result<(DTensor<f64, 2>, Vec<f64>, DTensor<f64, 2>)> {
    check_finite(a)?;
    let Work {
        tensor,
        transposed,
        scale,
    } = tall_work(a);
    let jacobi::Decomposition { u, mut s, v } = jacobi_svd(tensor, config)?;
    s.iter_mut().for_each(|x| *x *= scale);
    // A = U S Vᵗ  <=>  Aᵗ = V S Uᵗ
    if transposed {
        Ok((v, s, u))
    } else {
        Ok((u, s, v))
    }
}

/// Full SVD: `U` (rows × rows), `S` (min × 1), `V` (cols × cols)
pub fn full_svd(a: &DoubleMatrix, config: &SvdConfig) -> Result<SvdResult> {
    let (u, s, v) = thin_svd(a, config)?;
    let u = extend_to_square(&u);
    let v = extend_to_square(&v);
    Ok(SvdResult {
        u: to_matrix(&u, a.rows())?,
        s: column_vector(&s)?,
        v: to_matrix(&v, a.cols())?,
    })
}

/// Singular values only, as a `min(rows, cols) × 1` column vector
pub fn singular_values(a: &DoubleMatrix, config: &SvdConfig) -> Result<DoubleMatrix> {
    check_finite(a)?;
    let work = tall_work(a);
    let mut s = jacobi_singular_values(work.tensor, config)?;
    s.iter_mut().for_each(|x| *x *= work.scale);
    column_vector(&s)
}

/// Leading `k` triplets from the Jacobi engine: `U` (rows × k), `S` (k × 1),
/// `V` (cols × k)
pub fn svd_k(a: &DoubleMatrix, k: usize, config: &SvdConfig) -> Result<SvdResult> {
    check_rank(k, a.rows(), a.cols())?;
    let (u, s, v) = thin_svd(a, config)?;
    Ok(SvdResult {
        u: to_matrix(&u, k)?,
        s: column_vector(&s[..k])?,
        v: to_matrix(&v, k)?,
    })
}

/// Leading `k` triplets from the Lanczos engine
///
/// Falls back to [`svd_k`] when the Krylov subspace becomes invariant before
/// it spans the column space, since it then misses repeated singular values.
pub fn lanczos_svd_k(a: &DoubleMatrix, k: usize, config: &LanczosConfig) -> Result<SvdResult> {
    check_rank(k, a.rows(), a.cols())?;
    check_finite(a)?;
    let scale = magnitude(a);
    let scaled = a.div_scalar(scale)?;
    match lanczos::lanczos_svd(&scaled, k, config)? {
        Some(mut result) => {
            result.s.mul_scalar_mut(scale);
            Ok(result)
        }
        None => {
            tracing::debug!(
                rows = a.rows(),
                cols = a.cols(),
                k,
                "Krylov subspace exhausted early, falling back to Jacobi SVD"
            );
            svd_k(a, k, &config.svd)
        }
    }
}

impl DoubleMatrix {
    /// [`full_svd`] with the default configuration
    pub fn full_svd(&self) -> Result<SvdResult> {
        full_svd(self, &SvdConfig::default())
    }

    /// [`singular_values`] with the default configuration
    pub fn singular_values(&self) -> Result<DoubleMatrix> {
        singular_values(self, &SvdConfig::default())
    }

    /// [`svd_k`] with the default configuration
    pub fn svd_k(&self, k: usize) -> Result<SvdResult> {
        svd_k(self, k, &SvdConfig::default())
    }

    /// [`lanczos_svd_k`] with the default configuration
    pub fn lanczos_svd_k(&self, k: usize) -> Result<SvdResult> {
        lanczos_svd_k(self, k, &LanczosConfig::default())
    }
}
