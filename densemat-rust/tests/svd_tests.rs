//! SVD engine tests against reconstruction and known values

mod common;

use approx::assert_abs_diff_eq;
use common::{SimpleRng, assert_matrix_eq, assert_orthonormal_columns};
use densemat_rust::{DoubleMatrix, ErrorKind, LanczosConfig, SvdConfig, SvdResult};

/// `U[:, :p] · diag(S) · V[:, :p]ᵗ`
fn reconstruct(result: &SvdResult) -> DoubleMatrix {
    let p = result.s.rows();
    let mut us = DoubleMatrix::zeros(result.u.rows(), p).unwrap();
    for l in 0..p {
        let column = result.u.get_column(l).unwrap().mul_scalar(result.s.get(l, 0)).unwrap();
        us.put_column(l, &column).unwrap();
    }
    let mut vt = DoubleMatrix::zeros(p, result.v.rows()).unwrap();
    for l in 0..p {
        vt.put_row(l, &result.v.get_column(l).unwrap()).unwrap();
    }
    us.mmul(&vt).unwrap()
}

#[test]
fn test_full_svd_reconstructs_square() {
    // Second-difference matrix: S = (2 + √2, 2, 2 - √2) with right singular
    // vectors (1, ∓√2, 1)/2 and (1, 0, -1)/√2
    let a = DoubleMatrix::from_vec(3, 3, vec![
        2.0, -1.0, 0.0,
        -1.0, 2.0, -1.0,
        0.0, -1.0, 2.0
    ]).unwrap();
    let result = a.full_svd().unwrap();

    let r2 = 2f64.sqrt();
    let expected_s = [2.0 + r2, 2.0, 2.0 - r2];
    for (i, s) in expected_s.iter().enumerate() {
        assert_abs_diff_eq!(result.s.get(i, 0), *s, epsilon = 1e-12);
    }
    let expected_v = [
        [0.5, r2 / 2.0, 0.5],
        [r2 / 2.0, 0.0, r2 / 2.0],
        [0.5, r2 / 2.0, 0.5],
    ];
    for i in 0..3 {
        for j in 0..3 {
            assert_abs_diff_eq!(result.v.get(i, j).abs(), expected_v[i][j], epsilon = 1e-10);
        }
    }

    assert_matrix_eq(&reconstruct(&result), &a, 1e-9);
    assert_orthonormal_columns(&result.u, 1e-10);
    assert_orthonormal_columns(&result.v, 1e-10);
}

#[test]
fn test_full_svd_shapes() {
    let mut rng = SimpleRng::new(42);
    for (rows, cols) in [(1, 1), (1, 5), (5, 1), (4, 7), (9, 3)] {
        let a = rng.matrix(rows, cols);
        let result = a.full_svd().unwrap();
        let p = rows.min(cols);
        assert_eq!(result.u.shape(), (rows, rows));
        assert_eq!(result.s.shape(), (p, 1));
        assert_eq!(result.v.shape(), (cols, cols));
        assert!(result.s.as_slice().windows(2).all(|w| w[0] >= w[1]));
        assert!(result.s.as_slice().iter().all(|&s| s >= 0.0));
        assert_orthonormal_columns(&result.u, 1e-10);
        assert_orthonormal_columns(&result.v, 1e-10);
        assert_matrix_eq(&reconstruct(&result), &a, 1e-10);
    }
}

#[test]
fn test_top_singular_value_is_spectral_norm() {
    // diag(3, 2) embedded in a rotation-free 2x3 matrix
    let a = DoubleMatrix::from_vec(2, 3, vec![3.0, 0.0, 0.0, 0.0, 2.0, 0.0]).unwrap();
    let s = a.singular_values().unwrap();
    assert_eq!(s.shape(), (2, 1));
    assert_abs_diff_eq!(s.get(0, 0), 3.0, epsilon = 1e-14);
    assert_abs_diff_eq!(s.get(1, 0), 2.0, epsilon = 1e-14);
    assert!(a.norm2() >= s.get(0, 0));
}

#[test]
fn test_svd_k_is_prefix_of_full_svd() {
    let a = SimpleRng::new(7).matrix(8, 6);
    let full = a.full_svd().unwrap();
    let top = a.svd_k(3).unwrap();
    assert_eq!(top.u.shape(), (8, 3));
    assert_eq!(top.v.shape(), (6, 3));
    for i in 0..3 {
        assert_abs_diff_eq!(top.s.get(i, 0), full.s.get(i, 0), epsilon = 1e-12);
        // same triplet up to sign
        let dot: f64 = (0..6).map(|r| top.v.get(r, i) * full.v.get(r, i)).sum();
        assert_abs_diff_eq!(dot.abs(), 1.0, epsilon = 1e-8);
    }
}

#[test]
fn test_rank_out_of_range() {
    let a = DoubleMatrix::ones(3, 5).unwrap();
    for k in [0, 4, 100] {
        assert_eq!(a.svd_k(k).unwrap_err().kind(), ErrorKind::Dimension);
        assert_eq!(a.lanczos_svd_k(k).unwrap_err().kind(), ErrorKind::Dimension);
    }
}

#[test]
fn test_lanczos_agrees_with_full_svd() {
    let mut rng = SimpleRng::new(2024);
    for (rows, cols, k) in [(50, 40, 6), (20, 64, 4), (33, 33, 33)] {
        let a = rng.matrix(rows, cols);
        let exact = a.full_svd().unwrap();
        let approx = a.lanczos_svd_k(k).unwrap();
        let s0 = exact.s.get(0, 0);
        for i in 0..k {
            assert_abs_diff_eq!(approx.s.get(i, 0), exact.s.get(i, 0), epsilon = 1e-8 * s0);
        }
        assert_orthonormal_columns(&approx.u, 1e-8);
        assert_orthonormal_columns(&approx.v, 1e-8);
    }
}

#[test]
fn test_lanczos_with_custom_config() {
    let a = SimpleRng::new(5).matrix(40, 30);
    let config = LanczosConfig {
        seed: 99,
        ..LanczosConfig::new(1e-10)
    };
    let result = densemat_rust::lanczos_svd_k(&a, 2, &config).unwrap();
    let exact = densemat_rust::svd_k(&a, 2, &SvdConfig::default()).unwrap();
    assert_abs_diff_eq!(result.s.get(0, 0), exact.s.get(0, 0), epsilon = 1e-8);
    assert_abs_diff_eq!(result.s.get(1, 0), exact.s.get(1, 0), epsilon = 1e-8);
}
