//! One-sided (Hestenes) Jacobi SVD

use mdarray::DTensor;

use super::SvdConfig;
use crate::error::{MatrixError, Result};

/// Result of a Jacobi decomposition of an `m x n` work matrix with `m >= n`
#[derive(Debug, Clone)]
pub(crate) struct Decomposition {
    /// Left singular vectors (m × n), orthonormal columns
    pub u: DTensor<f64, 2>,
    /// Singular values (n), descending
    pub s: Vec<f64>,
    /// Right singular vectors (n × n)
    pub v: DTensor<f64, 2>,
}

pub(crate) fn identity(n: usize) -> DTensor<f64, 2> {
    DTensor::<f64, 2>::from_fn([n, n], |idx| if idx[0] == idx[1] { 1.0 } else { 0.0 })
}

/// Rotation `(c, s)` that orthogonalizes two columns with Gram entries
/// `alpha = |w_p|^2`, `beta = |w_q|^2`, `gamma = w_p . w_q`
fn rotation(alpha: f64, beta: f64, gamma: f64) -> (f64, f64) {
    let zeta = (beta - alpha) / (2.0 * gamma);
    let t = zeta.signum() / (zeta.abs() + zeta.hypot(1.0));
    let c = 1.0 / t.hypot(1.0);
    (c, c * t)
}

/// `[w_p, w_q] <- [w_p, w_q] * [[c, s], [-s, c]]`
fn rotate_columns(matrix: &mut DTensor<f64, 2>, p: usize, q: usize, c: f64, s: f64) {
    let rows = matrix.shape().0;
    for i in 0..rows {
        let x = matrix[[i, p]];
        let y = matrix[[i, q]];
        matrix[[i, p]] = c * x - s * y;
        matrix[[i, q]] = s * x + c * y;
    }
}

fn column_norm(matrix: &DTensor<f64, 2>, j: usize) -> f64 {
    let rows = matrix.shape().0;
    (0..rows).map(|i| matrix[[i, j]] * matrix[[i, j]]).sum::<f64>().sqrt()
}

/// Fill every column `j` with `valid[j] == false` so that all columns of
/// `basis` form an orthonormal set
///
/// Candidates are canonical vectors, picked by the size of their component
/// outside the current span and orthogonalized with two passes of modified
/// Gram-Schmidt. Valid columns must already be orthonormal, and `basis` must
/// not have more columns than rows.
pub(crate) fn complete_basis(basis: &mut DTensor<f64, 2>, valid: &mut [bool]) {
    let (d, c) = *basis.shape();
    debug_assert!(c <= d);
    for j in 0..c {
        if valid[j] {
            continue;
        }
        let best = (0..d)
            .map(|i| {
                let captured: f64 = (0..c)
                    .filter(|&k| valid[k])
                    .map(|k| basis[[i, k]] * basis[[i, k]])
                    .sum();
                (i, 1.0 - captured)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(0, |(i, _)| i);

        let mut x = vec![0.0; d];
        x[best] = 1.0;
        for _ in 0..2 {
            for k in (0..c).filter(|&k| valid[k]) {
                let dot: f64 = (0..d).map(|i| basis[[i, k]] * x[i]).sum();
                for (i, xi) in x.iter_mut().enumerate() {
                    *xi -= dot * basis[[i, k]];
                }
            }
        }
        let norm = x.iter().map(|xi| xi * xi).sum::<f64>().sqrt();
        for (i, xi) in x.iter().enumerate() {
            basis[[i, j]] = xi / norm;
        }
        valid[j] = true;
    }
}

/// Rotate column pairs of `w` (m × n, m >= n) by cyclic sweeps until every
/// pair is orthogonal to within `tolerance * sqrt(m)` relative to the product
/// of their norms, accumulating the rotations into `v`
///
/// Returns the final column norms, in column order.
fn orthogonalize(
    w: &mut DTensor<f64, 2>,
    mut v: Option<&mut DTensor<f64, 2>>,
    config: &SvdConfig,
) -> Result<Vec<f64>> {
    let (m, n) = *w.shape();
    debug_assert!(m >= n && n >= 1);
    let threshold = config.tolerance * (m as f64).sqrt();

    let mut sweeps = 0;
    loop {
        if sweeps == config.max_sweeps {
            return Err(MatrixError::Convergence {
                algorithm: "Jacobi SVD",
                iterations: sweeps,
            });
        }
        sweeps += 1;
        let mut rotated = false;
        for p in 0..n - 1 {
            for q in (p + 1)..n {
                let (mut alpha, mut beta, mut gamma) = (0.0, 0.0, 0.0);
                for i in 0..m {
                    let x = w[[i, p]];
                    let y = w[[i, q]];
                    alpha += x * x;
                    beta += y * y;
                    gamma += x * y;
                }
                if gamma == 0.0 || gamma.abs() <= threshold * alpha.sqrt() * beta.sqrt() {
                    continue;
                }
                rotated = true;
                let (c, s) = rotation(alpha, beta, gamma);
                rotate_columns(w, p, q, c, s);
                if let Some(v) = v.as_deref_mut() {
                    rotate_columns(v, p, q, c, s);
                }
            }
        }
        if !rotated {
            break;
        }
    }
    tracing::trace!(m, n, sweeps, "Jacobi SVD converged");

    Ok((0..n).map(|j| column_norm(w, j)).collect())
}

fn descending_order(norms: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..norms.len()).collect();
    order.sort_by(|&a, &b| norms[b].total_cmp(&norms[a]));
    order
}

/// Singular values of `w` (m × n, m >= n), descending
pub(crate) fn jacobi_singular_values(mut w: DTensor<f64, 2>, config: &SvdConfig) -> Result<Vec<f64>> {
    let norms = orthogonalize(&mut w, None, config)?;
    Ok(descending_order(&norms).into_iter().map(|j| norms[j]).collect())
}

/// Full thin decomposition of `w` (m × n, m >= n)
///
/// The normalized columns give `U` and the accumulated rotations give `V`.
/// Columns of `U` belonging to numerically zero singular values are completed
/// to an orthonormal set.
pub(crate) fn jacobi_svd(mut w: DTensor<f64, 2>, config: &SvdConfig) -> Result<Decomposition> {
    let (m, n) = *w.shape();
    let mut v = identity(n);
    let norms = orthogonalize(&mut w, Some(&mut v), config)?;
    let order = descending_order(&norms);
    let s: Vec<f64> = order.iter().map(|&j| norms[j]).collect();

    // Columns at the rounding level of the largest one carry no direction.
    let rank_tol = s[0] * f64::EPSILON * m as f64;
    let mut u = DTensor::<f64, 2>::from_elem((m, n), 0.0);
    let mut valid = vec![false; n];
    for (new_idx, &old_idx) in order.iter().enumerate() {
        let sigma = norms[old_idx];
        if sigma > 0.0 && sigma > rank_tol {
            for i in 0..m {
                u[[i, new_idx]] = w[[i, old_idx]] / sigma;
            }
            valid[new_idx] = true;
        }
    }
    complete_basis(&mut u, &mut valid);

    let v = DTensor::<f64, 2>::from_fn([n, n], |idx| v[[idx[0], order[idx[1]]]]);
    Ok(Decomposition { u, s, v })
}
