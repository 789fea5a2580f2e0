// QuiTK - Rust library for quantum information theory calculations:
//         states, channels, entropies, and distance measures
// Copyright (C) 2025 - QuiTK developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dense linear algebra helpers shared by the rest of the crate: adjoints,
//! norms, Hermitian matrix functions, Gram-Schmidt, and Haar-random
//! unitaries.

use ndarray::prelude::*;
use ndarray_linalg::{Eigh, QR, SVD, UPLO};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{Error, Result};
use crate::tensor::{C64, Mat};

/// Complex conjugate transpose.
pub fn dag(x: &Mat) -> Mat {
    x.t().mapv(|v| v.conj())
}

/// Trace of a square matrix.
pub fn trace(x: &Mat) -> C64 {
    x.diag().sum()
}

/// `m` raised to the non-negative integer power `k`.
pub fn matrix_power(m: &Mat, k: usize) -> Mat {
    let mut out = Mat::eye(m.nrows());
    for _ in 0..k {
        out = out.dot(m);
    }
    out
}

/// Frobenius norm; the Euclidean norm for column vectors.
pub fn frobenius_norm(x: &Mat) -> f64 {
    x.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt()
}

/// Elementwise comparison up to an absolute tolerance.
pub fn allclose(a: &Mat, b: &Mat, tol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= tol)
}

/// Trace (nuclear) norm: the sum of the singular values.
pub fn trace_norm(x: &Mat) -> Result<f64> {
    let (_, s, _) = x.svd(false, false)?;
    Ok(s.sum())
}

/// Spectral norm: the largest singular value.
pub fn spectral_norm(x: &Mat) -> Result<f64> {
    let (_, s, _) = x.svd(false, false)?;
    Ok(s.iter().cloned().fold(0.0, f64::max))
}

/// Distance measure `1 - |Tr[U V^dag]| / d` between two unitaries.
///
/// Zero exactly when `U` and `V` agree up to a global phase.
pub fn unitary_distance(u: &Mat, v: &Mat) -> Result<f64> {
    if u.dim() != v.dim() || u.nrows() != u.ncols() {
        return Err(Error::DimensionMismatch(format!(
            "unitary_distance expects square operators of equal size, got {:?} and {:?}",
            u.dim(),
            v.dim()
        )));
    }
    let d = u.nrows() as f64;
    Ok(1.0 - trace(&u.dot(&dag(v))).norm() / d)
}

/// Squared trace distance `|| |psi><psi| - |phi><phi| ||_1^2` between two
/// pure states, computed as `1 - Tr[psi_dm phi_dm]`.
///
/// Accepts state vectors or the corresponding rank-one density matrices.
pub fn trace_distance_pure_states(psi: &Mat, phi: &Mat) -> Result<f64> {
    let p = rank_one_projector(psi);
    let q = rank_one_projector(phi);
    if p.dim() != q.dim() {
        return Err(Error::DimensionMismatch(format!(
            "states have incompatible shapes {:?} and {:?}",
            psi.dim(),
            phi.dim()
        )));
    }
    Ok(1.0 - trace(&p.dot(&q)).re)
}

fn rank_one_projector(psi: &Mat) -> Mat {
    if psi.ncols() == 1 {
        psi.dot(&dag(psi))
    } else {
        psi.clone()
    }
}

/// Projection of the vector `v` onto the vector `u`.
pub fn proj(u: &Mat, v: &Mat) -> Mat {
    let inner = trace(&dag(u).dot(v));
    let scale = inner / C64::new(frobenius_norm(u).powi(2), 0.0);
    u * scale
}

/// Gram-Schmidt orthogonalization of the given vectors, in order.
///
/// Returns normalized vectors when `normalize` is set, the raw orthogonal
/// family otherwise. Fails on a (numerically) linearly dependent input.
pub fn gram_schmidt(states: &[Mat], normalize: bool) -> Result<Vec<Mat>> {
    if states.is_empty() {
        return Ok(Vec::new());
    }
    let mut u: Vec<Mat> = Vec::with_capacity(states.len());
    let mut e: Vec<Mat> = Vec::with_capacity(states.len());
    for (k, state) in states.iter().enumerate() {
        let mut residual = state.clone();
        for prev in &u {
            residual = residual - proj(prev, state);
        }
        let norm = frobenius_norm(&residual);
        if norm < 1e-14 {
            return Err(Error::IllDefined(format!(
                "vector {k} is linearly dependent on its predecessors"
            )));
        }
        e.push(&residual / C64::new(norm, 0.0));
        u.push(residual);
    }
    Ok(if normalize { e } else { u })
}

/// Eigendecomposition of a Hermitian matrix: ascending real eigenvalues and
/// the matrix of eigenvectors as columns.
pub fn eigh(x: &Mat) -> Result<(Array1<f64>, Mat)> {
    let (w, v) = x.eigh(UPLO::Lower)?;
    Ok((w, v))
}

/// Applies the scalar function `f` to a Hermitian matrix through its
/// eigendecomposition: `U diag(f(w)) U^dag`.
pub fn funm_hermitian(x: &Mat, f: impl Fn(f64) -> C64) -> Result<Mat> {
    let (w, v) = eigh(x)?;
    let fw = Array1::from_iter(w.iter().map(|&l| f(l)));
    let scaled = &v * &fw; // scales column j by f(w_j)
    Ok(scaled.dot(&dag(&v)))
}

/// Principal square root of a positive semi-definite Hermitian matrix.
/// Eigenvalues pushed below zero by rounding are clamped.
pub fn sqrtm_psd(x: &Mat) -> Result<Mat> {
    funm_hermitian(x, |l| C64::new(l.max(0.0).sqrt(), 0.0))
}

/// Fractional power `x^p` of a positive semi-definite Hermitian matrix.
///
/// Eigenvalues at most `tol` are treated as zero, so negative powers are
/// taken on the support only (the pseudo-inverse convention).
pub fn frac_power_psd(x: &Mat, p: f64, tol: f64) -> Result<Mat> {
    funm_hermitian(x, |l| {
        if l > tol {
            C64::new(l.powf(p), 0.0)
        } else {
            C64::new(0.0, 0.0)
        }
    })
}

/// Matrix with independent standard complex Gaussian entries.
pub fn ginibre(rows: usize, cols: usize, rng: &mut impl Rng) -> Mat {
    Mat::from_shape_fn((rows, cols), |_| {
        C64::new(StandardNormal.sample(rng), StandardNormal.sample(rng))
    })
}

/// Haar-random unitary of dimension `d`, obtained by QR-decomposing a
/// Ginibre matrix and absorbing the phases of the diagonal of R.
pub fn random_unitary(d: usize, rng: &mut impl Rng) -> Result<Mat> {
    let g = ginibre(d, d, rng);
    let (q, r) = g.qr()?;
    let phases = Array1::from_iter((0..d).map(|i| {
        let rii = r[(i, i)];
        if rii.norm() > 0.0 {
            rii / rii.norm()
        } else {
            C64::new(1.0, 0.0)
        }
    }));
    Ok(&q * &phases)
}

/// Interprets `digits` as a number in the given base, most significant digit
/// first.
pub fn base_number_to_int(digits: &[usize], base: usize) -> usize {
    digits.iter().fold(0, |acc, &d| acc * base + d)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn counting_matrix(n: usize) -> Mat {
        Mat::from_shape_fn((n, n), |(i, j)| C64::new((i * n + j + 1) as f64, 0.0))
    }

    #[test]
    fn dag_counting() {
        let x = counting_matrix(4);
        let xd = dag(&x);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(xd[(i, j)], x[(j, i)].conj());
            }
        }
    }

    #[test]
    fn spectral_norm_counting() {
        // Largest singular value of the 4x4 counting matrix.
        let x = counting_matrix(4);
        assert_abs_diff_eq!(spectral_norm(&x).unwrap(), 38.62266, epsilon = 1e-5);
    }

    #[test]
    fn trace_norm_of_diagonal() {
        let mut x = Mat::zeros((3, 3));
        x[(0, 0)] = C64::new(-2.0, 0.0);
        x[(1, 1)] = C64::new(0.5, 0.0);
        x[(2, 2)] = C64::new(1.0, 0.0);
        assert_abs_diff_eq!(trace_norm(&x).unwrap(), 3.5, epsilon = 1e-12);
    }

    #[test]
    fn matrix_power_basic() {
        let x = counting_matrix(2);
        assert!(allclose(&matrix_power(&x, 0), &Mat::eye(2), 1e-12));
        assert!(allclose(&matrix_power(&x, 2), &x.dot(&x), 1e-12));
    }

    #[test]
    fn sqrtm_squares_back() {
        let mut rng = StdRng::seed_from_u64(7);
        let g = ginibre(3, 3, &mut rng);
        let psd = g.dot(&dag(&g));
        let s = sqrtm_psd(&psd).unwrap();
        assert!(allclose(&s.dot(&s), &psd, 1e-9));
    }

    #[test]
    fn frac_power_negative_on_support() {
        let mut x = Mat::zeros((2, 2));
        x[(0, 0)] = C64::new(4.0, 0.0);
        x[(1, 1)] = C64::new(0.25, 0.0);
        let inv = frac_power_psd(&x, -1.0, 1e-12).unwrap();
        assert_abs_diff_eq!(inv[(0, 0)].re, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[(1, 1)].re, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn random_unitary_is_unitary() {
        let mut rng = StdRng::seed_from_u64(3);
        let u = random_unitary(4, &mut rng).unwrap();
        assert!(allclose(&u.dot(&dag(&u)), &Mat::eye(4), 1e-10));
        assert!(allclose(&dag(&u).dot(&u), &Mat::eye(4), 1e-10));
    }

    #[test]
    fn unitary_distance_phase_invariant() {
        let mut rng = StdRng::seed_from_u64(11);
        let u = random_unitary(3, &mut rng).unwrap();
        let phase = C64::from_polar(1.0, 0.7);
        assert_abs_diff_eq!(unitary_distance(&u, &(&u * phase)).unwrap(), 0.0, epsilon = 1e-10);
        let v = random_unitary(3, &mut rng).unwrap();
        assert!(unitary_distance(&u, &v).unwrap() > 1e-3);
    }

    #[test]
    fn gram_schmidt_orthonormal() {
        let mut rng = StdRng::seed_from_u64(5);
        let states: Vec<Mat> = (0..3).map(|_| ginibre(4, 1, &mut rng)).collect();
        let ortho = gram_schmidt(&states, true).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let inner = trace(&dag(&ortho[i]).dot(&ortho[j]));
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(inner.norm(), expected, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn base_number_conversion() {
        assert_eq!(base_number_to_int(&[1, 0, 1], 2), 5);
        assert_eq!(base_number_to_int(&[2, 1], 3), 7);
        assert_eq!(base_number_to_int(&[0, 0], 4), 0);
    }
}
