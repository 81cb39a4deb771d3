//! Golub-Kahan-Lanczos bidiagonalization with full reorthogonalization
//!
//! The operator is bidiagonalized as `Op · V_l = U_l · B_l` with `B_l` upper
//! bidiagonal. Ritz triplets come from the SVD of `B_l`; the residual of
//! triplet `i` is `beta_l * |X[l-1, i]|` where `X` holds the left singular
//! vectors of `B_l`. The subspace is doubled until the leading `k` residuals
//! are small enough or it spans the whole column space.

use mdarray::DTensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::jacobi::{Decomposition, jacobi_svd};
use super::{LanczosConfig, SvdResult};
use crate::error::{MatrixError, Result};
use crate::matrix::DoubleMatrix;

fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

fn norm(x: &[f64]) -> f64 {
    dot(x, x).sqrt()
}

/// `x <- x - Q Qᵗ x`, applied twice
fn reorthogonalize(x: &mut [f64], basis: &[Vec<f64>]) {
    for _ in 0..2 {
        for q in basis {
            let c = dot(q, x);
            for (xi, qi) in x.iter_mut().zip(q) {
                *xi -= c * qi;
            }
        }
    }
}

/// `A` or `Aᵗ`, whichever has at least as many rows as columns
struct TallOperator<'a> {
    a: &'a DoubleMatrix,
    transposed: bool,
}

impl<'a> TallOperator<'a> {
    fn new(a: &'a DoubleMatrix) -> Self {
        Self {
            a,
            transposed: a.rows() < a.cols(),
        }
    }

    fn rows(&self) -> usize {
        if self.transposed { self.a.cols() } else { self.a.rows() }
    }

    fn cols(&self) -> usize {
        if self.transposed { self.a.rows() } else { self.a.cols() }
    }

    fn a_times(&self, x: &[f64]) -> Vec<f64> {
        self.a
            .as_slice()
            .chunks_exact(self.a.cols())
            .map(|row| dot(row, x))
            .collect()
    }

    fn at_times(&self, x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; self.a.cols()];
        for (row, &xi) in self.a.as_slice().chunks_exact(self.a.cols()).zip(x) {
            for (yj, &aij) in y.iter_mut().zip(row) {
                *yj += aij * xi;
            }
        }
        y
    }

    /// `Op · x`
    fn apply(&self, x: &[f64]) -> Vec<f64> {
        if self.transposed { self.at_times(x) } else { self.a_times(x) }
    }

    /// `Opᵗ · x`
    fn apply_transpose(&self, x: &[f64]) -> Vec<f64> {
        if self.transposed { self.a_times(x) } else { self.at_times(x) }
    }
}

/// Partial bidiagonalization of length `l = alpha.len()`
struct Bidiagonalization {
    u: Vec<Vec<f64>>,
    v: Vec<Vec<f64>>,
    alpha: Vec<f64>,
    /// Superdiagonal of `B_l`, `l - 1` entries
    beta: Vec<f64>,
    /// `beta_l`, the coupling to the next right vector
    residual: f64,
    /// Next right Lanczos vector, `None` once the subspace is invariant
    next_v: Option<Vec<f64>>,
    breakdown: f64,
}

impl Bidiagonalization {
    /// Start from a seeded random unit vector; `None` when `Op · v_0` vanishes
    fn start(op: &TallOperator<'_>, seed: u64, breakdown: f64) -> Option<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut v0: Vec<f64> = (0..op.cols()).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let v0_norm = norm(&v0);
        if v0_norm == 0.0 {
            return None;
        }
        v0.iter_mut().for_each(|x| *x /= v0_norm);

        let mut u0 = op.apply(&v0);
        let alpha0 = norm(&u0);
        if alpha0 <= breakdown {
            return None;
        }
        u0.iter_mut().for_each(|x| *x /= alpha0);

        let mut state = Self {
            u: vec![u0],
            v: vec![v0],
            alpha: vec![alpha0],
            beta: Vec::new(),
            residual: 0.0,
            next_v: None,
            breakdown,
        };
        state.update_residual(op);
        Some(state)
    }

    fn len(&self) -> usize {
        self.alpha.len()
    }

    /// `r = Opᵗ u_{l-1} - alpha_{l-1} v_{l-1}`, orthogonalized against `V_l`
    fn update_residual(&mut self, op: &TallOperator<'_>) {
        let l = self.len();
        let mut r = op.apply_transpose(&self.u[l - 1]);
        for (ri, vi) in r.iter_mut().zip(&self.v[l - 1]) {
            *ri -= self.alpha[l - 1] * vi;
        }
        reorthogonalize(&mut r, &self.v);
        let beta = norm(&r);
        self.residual = beta;
        self.next_v = (beta > self.breakdown).then(|| r.into_iter().map(|x| x / beta).collect());
    }

    /// Append one Lanczos step; `false` when the subspace cannot grow
    fn grow(&mut self, op: &TallOperator<'_>) -> bool {
        let Some(v_next) = self.next_v.take() else {
            return false;
        };
        let l = self.len();
        let beta = self.residual;
        let mut p = op.apply(&v_next);
        for (pi, ui) in p.iter_mut().zip(&self.u[l - 1]) {
            *pi -= beta * ui;
        }
        reorthogonalize(&mut p, &self.u);
        let alpha = norm(&p);
        if alpha <= self.breakdown {
            self.next_v = Some(v_next);
            return false;
        }
        p.iter_mut().for_each(|x| *x /= alpha);

        self.v.push(v_next);
        self.u.push(p);
        self.beta.push(beta);
        self.alpha.push(alpha);
        self.update_residual(op);
        true
    }

    /// `B_l` as a dense work tensor
    fn projected(&self) -> DTensor<f64, 2> {
        let l = self.len();
        DTensor::<f64, 2>::from_fn([l, l], |idx| {
            let (i, j) = (idx[0], idx[1]);
            if i == j {
                self.alpha[i]
            } else if j == i + 1 {
                self.beta[i]
            } else {
                0.0
            }
        })
    }

    /// Ritz vectors `basis · coefficients[:, i]` for the leading `k` columns
    fn ritz(basis: &[Vec<f64>], coefficients: &DTensor<f64, 2>, k: usize) -> Vec<Vec<f64>> {
        (0..k)
            .map(|i| {
                let mut out = vec![0.0; basis[0].len()];
                for (j, q) in basis.iter().enumerate() {
                    let c = coefficients[[j, i]];
                    for (o, qj) in out.iter_mut().zip(q) {
                        *o += c * qj;
                    }
                }
                out
            })
            .collect()
    }
}

fn columns_to_matrix(columns: &[Vec<f64>]) -> Result<DoubleMatrix> {
    DoubleMatrix::from_fn(columns[0].len(), columns.len(), |i, j| columns[j][i])
}

/// Leading `k` triplets of `a`, or `None` when the Krylov subspace became
/// invariant before `k` triplets were resolved
///
/// `a` must be finite and `1 <= k <= min(rows, cols)`.
pub(super) fn lanczos_svd(
    a: &DoubleMatrix,
    k: usize,
    config: &LanczosConfig,
) -> Result<Option<SvdResult>> {
    let op = TallOperator::new(a);
    let p = op.cols();
    let breakdown = a.norm2() * f64::EPSILON * (op.rows() + op.cols()) as f64;

    let Some(mut bidiag) = Bidiagonalization::start(&op, config.seed, breakdown) else {
        return Ok(None);
    };

    let mut target = p.min((2 * k).max(k + 8));
    let mut restarts = 0;
    loop {
        let mut exhausted = false;
        while bidiag.len() < target {
            if !bidiag.grow(&op) {
                exhausted = true;
                break;
            }
        }
        let l = bidiag.len();
        // An invariant subspace short of the full column space holds at most
        // one copy of each repeated singular value.
        if l < k || (exhausted && l < p) {
            return Ok(None);
        }

        let Decomposition { u: x, s, v: y } = jacobi_svd(bidiag.projected(), &config.svd)?;
        let bound = config.tolerance * s[0];
        let converged = l == p
            || (0..k).all(|i| bidiag.residual * x[[l - 1, i]].abs() <= bound);
        tracing::trace!(l, restarts, residual = bidiag.residual, converged, "Lanczos step");

        if converged {
            let left = Bidiagonalization::ritz(&bidiag.u, &x, k);
            let right = Bidiagonalization::ritz(&bidiag.v, &y, k);
            // Op = Aᵗ swaps the roles of the two bases
            let (u, v) = if op.transposed { (right, left) } else { (left, right) };
            return Ok(Some(SvdResult {
                u: columns_to_matrix(&u)?,
                s: DoubleMatrix::from_slice(k, 1, &s[..k])?,
                v: columns_to_matrix(&v)?,
            }));
        }
        if restarts == config.max_restarts {
            return Err(MatrixError::Convergence {
                algorithm: "Lanczos SVD",
                iterations: l,
            });
        }
        restarts += 1;
        target = p.min(2 * target);
    }
}
