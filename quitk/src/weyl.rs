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

//! Discrete Weyl (generalized Pauli) operators for qudits: the cyclic shift
//! X, the phase operator Z built from d-th roots of unity, and products
//! `X^a Z^b` indexed by digit strings.

use std::f64::consts::PI;

use itertools::Itertools;
use ndarray::linalg::kron;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::linalg::{dag, matrix_power, trace};
use crate::tensor::{C64, Mat, ket};

fn check_qudit_dim(d: usize) -> Result<()> {
    if d < 2 {
        return Err(Error::DimensionMismatch(format!(
            "qudit dimension must be at least 2, got {d}"
        )));
    }
    Ok(())
}

/// The cyclic shift operator `X|i> = |i+1 mod d>`.
///
/// For `d = 2` this is the Pauli X matrix.
pub fn discrete_weyl_x(d: usize) -> Result<Mat> {
    check_qudit_dim(d)?;
    let mut x = Mat::zeros((d, d));
    for i in 0..d {
        x += &ket(d, (i + 1) % d)?.dot(&dag(&ket(d, i)?));
    }
    Ok(x)
}

/// The phase operator `Z|i> = w^i |i>` with `w = exp(2 pi i / d)`.
pub fn discrete_weyl_z(d: usize) -> Result<Mat> {
    check_qudit_dim(d)?;
    let mut z = Mat::zeros((d, d));
    for i in 0..d {
        let phase = C64::from_polar(1.0, 2.0 * PI * i as f64 / d as f64);
        z[(i, i)] = phase;
    }
    Ok(z)
}

/// The discrete Weyl operator `X^a Z^b`.
pub fn discrete_weyl(d: usize, a: usize, b: usize) -> Result<Mat> {
    let x = discrete_weyl_x(d)?;
    let z = discrete_weyl_z(d)?;
    Ok(matrix_power(&x, a).dot(&matrix_power(&z, b)))
}

fn check_digits(d: usize, digits: &[usize]) -> Result<()> {
    for &g in digits {
        if g >= d {
            return Err(Error::InvalidIndex(format!(
                "digit {g} out of range for qudit dimension {d}"
            )));
        }
    }
    Ok(())
}

/// Tensor product of shift powers `X^{g_1} ⊗ ... ⊗ X^{g_n}` for a digit list
/// `g` in base `d`.
pub fn n_qudit_x(d: usize, digits: &[usize]) -> Result<Mat> {
    check_digits(d, digits)?;
    let x = discrete_weyl_x(d)?;
    let mut out = Mat::ones((1, 1));
    for &g in digits {
        out = kron(&out, &matrix_power(&x, g));
    }
    Ok(out)
}

/// Tensor product of phase powers `Z^{g_1} ⊗ ... ⊗ Z^{g_n}` for a digit list
/// `g` in base `d`.
pub fn n_qudit_z(d: usize, digits: &[usize]) -> Result<Mat> {
    check_digits(d, digits)?;
    let z = discrete_weyl_z(d)?;
    let mut out = Mat::ones((1, 1));
    for &g in digits {
        out = kron(&out, &matrix_power(&z, g));
    }
    Ok(out)
}

/// Coefficients `Tr[X^dag (X(s) Z(t))]` of an n-qudit operator in the
/// discrete Weyl basis, keyed by the digit-string pair `(s, t)`.
pub fn n_qudit_weyl_coeffs(
    x: &Mat,
    d: usize,
    n: usize,
) -> Result<FxHashMap<(Vec<usize>, Vec<usize>), C64>> {
    check_qudit_dim(d)?;
    let dim = d.pow(n as u32);
    if x.dim() != (dim, dim) {
        return Err(Error::DimensionMismatch(format!(
            "operator of shape {:?} is not an n-qudit operator ({dim}x{dim})",
            x.dim()
        )));
    }
    let mut coeffs = FxHashMap::default();
    let digit_strings: Vec<Vec<usize>> = (0..n)
        .map(|_| 0..d)
        .multi_cartesian_product()
        .collect();
    for s in &digit_strings {
        let xs = n_qudit_x(d, s)?;
        for t in &digit_strings {
            let g = xs.dot(&n_qudit_z(d, t)?);
            coeffs.insert((s.clone(), t.clone()), trace(&dag(x).dot(&g)));
        }
    }
    Ok(coeffs)
}

/// The 2n qudit "quadrature" operators: X on site k and Z on site k, for
/// each site in turn.
pub fn n_qudit_quadratures(d: usize, n: usize) -> Result<Vec<Mat>> {
    let mut out = Vec::with_capacity(2 * n);
    for k in 0..n {
        let mut digits = vec![0usize; n];
        digits[k] = 1;
        out.push(n_qudit_x(d, &digits)?);
        out.push(n_qudit_z(d, &digits)?);
    }
    Ok(out)
}

/// Matrix of second moments `V_{ij} = Tr[X S_i S_j^dag]` over the n-qudit
/// quadrature operators.
pub fn n_qudit_cov_matrix(x: &Mat, d: usize, n: usize) -> Result<Mat> {
    let s = n_qudit_quadratures(d, n)?;
    let dim = d.pow(n as u32);
    if x.dim() != (dim, dim) {
        return Err(Error::DimensionMismatch(format!(
            "operator of shape {:?} is not an n-qudit operator ({dim}x{dim})",
            x.dim()
        )));
    }
    let mut v = Mat::zeros((2 * n, 2 * n));
    for i in 0..2 * n {
        for j in 0..2 * n {
            v[(i, j)] = trace(&x.dot(&s[i]).dot(&dag(&s[j])));
        }
    }
    Ok(v)
}
