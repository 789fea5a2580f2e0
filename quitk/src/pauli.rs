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

//! The n-qubit Pauli basis: tensor products of `{I, X, Y, Z}` and the
//! expansion of operators in that basis.
//!
//! An operator decomposes as `X = (1/2^n) sum_a c_a sigma_a` with
//! `c_a = Tr[sigma_a^dag X]`; coefficients are ordered lexicographically
//! over the index tuples in `{0,1,2,3}^n`.

use itertools::Itertools;
use ndarray::linalg::kron;

use crate::error::{Error, Result};
use crate::linalg::{dag, trace};
use crate::tensor::{C64, Mat};

/// The 2x2 identity.
pub fn pauli_i() -> Mat {
    Mat::eye(2)
}

/// The Pauli X matrix.
pub fn pauli_x() -> Mat {
    let mut m = Mat::zeros((2, 2));
    m[(0, 1)] = C64::new(1.0, 0.0);
    m[(1, 0)] = C64::new(1.0, 0.0);
    m
}

/// The Pauli Y matrix.
pub fn pauli_y() -> Mat {
    let mut m = Mat::zeros((2, 2));
    m[(0, 1)] = C64::new(0.0, -1.0);
    m[(1, 0)] = C64::new(0.0, 1.0);
    m
}

/// The Pauli Z matrix.
pub fn pauli_z() -> Mat {
    let mut m = Mat::eye(2);
    m[(1, 1)] = C64::new(-1.0, 0.0);
    m
}

/// Tensor product of Pauli operators, one per qubit: index 0 is the
/// identity, 1 is X, 2 is Y, 3 is Z.
pub fn n_qubit_pauli(indices: &[usize]) -> Result<Mat> {
    let mut out = Mat::ones((1, 1));
    for &index in indices {
        let factor = match index {
            0 => pauli_i(),
            1 => pauli_x(),
            2 => pauli_y(),
            3 => pauli_z(),
            _ => {
                return Err(Error::InvalidIndex(format!(
                    "Pauli index {index} must be 0, 1, 2, or 3"
                )));
            }
        };
        out = kron(&out, &factor);
    }
    Ok(out)
}

fn bit_indexed_product(bits: &[usize], op: &Mat) -> Result<Mat> {
    let mut out = Mat::ones((1, 1));
    for &b in bits {
        match b {
            0 => out = kron(&out, &pauli_i()),
            1 => out = kron(&out, op),
            _ => {
                return Err(Error::InvalidIndex(format!(
                    "indices must be bits, either 0 or 1, got {b}"
                )));
            }
        }
    }
    Ok(out)
}

/// Tensor product of Pauli-X operators selected by a bit list.
pub fn n_qubit_pauli_x(bits: &[usize]) -> Result<Mat> {
    bit_indexed_product(bits, &pauli_x())
}

/// Tensor product of Pauli-Z operators selected by a bit list.
pub fn n_qubit_pauli_z(bits: &[usize]) -> Result<Mat> {
    bit_indexed_product(bits, &pauli_z())
}

fn check_n_qubit_operator(x: &Mat, n: usize) -> Result<()> {
    let d = 1usize << n;
    if x.dim() != (d, d) {
        return Err(Error::DimensionMismatch(format!(
            "operator of shape {:?} is not a {n}-qubit operator ({d}x{d})",
            x.dim()
        )));
    }
    Ok(())
}

/// Coefficients of `x` in the n-qubit Pauli basis, `c_a = Tr[sigma_a^dag x]`,
/// in lexicographic order over `{0,1,2,3}^n`.
pub fn pauli_coeffs(x: &Mat, n: usize) -> Result<Vec<C64>> {
    check_n_qubit_operator(x, n)?;
    (0..n)
        .map(|_| 0..4usize)
        .multi_cartesian_product()
        .map(|ix| {
            let sigma = n_qubit_pauli(&ix)?;
            Ok(trace(&dag(&sigma).dot(x)))
        })
        .collect()
}

/// Reassembles an operator from its n-qubit Pauli coefficients:
/// `X = (1/2^n) sum_a c_a sigma_a`.
pub fn pauli_coeffs_to_matrix(coeffs: &[C64], n: usize) -> Result<Mat> {
    let expected = 1usize << (2 * n);
    if coeffs.len() != expected {
        return Err(Error::DimensionMismatch(format!(
            "{} coefficients given, but the {n}-qubit Pauli basis has {expected} elements",
            coeffs.len()
        )));
    }
    let d = 1usize << n;
    let weight = C64::new(1.0 / d as f64, 0.0);
    let mut out = Mat::zeros((d, d));
    for (c, ix) in coeffs
        .iter()
        .zip((0..n).map(|_| 0..4usize).multi_cartesian_product())
    {
        out = out + n_qubit_pauli(&ix)? * (weight * c);
    }
    Ok(out)
}

/// The 2n "quadrature" operators: X on qubit k and Z on qubit k, for each
/// qubit in turn.
pub fn n_qubit_quadratures(n: usize) -> Result<Vec<Mat>> {
    let mut out = Vec::with_capacity(2 * n);
    for k in 0..n {
        let mut bits = vec![0usize; n];
        bits[k] = 1;
        out.push(n_qubit_pauli_x(&bits)?);
        out.push(n_qubit_pauli_z(&bits)?);
    }
    Ok(out)
}

/// Matrix of second moments `V_{ij} = Tr[X S_i S_j]` over the n-qubit
/// quadrature operators.
pub fn n_qubit_cov_matrix(x: &Mat, n: usize) -> Result<Mat> {
    check_n_qubit_operator(x, n)?;
    let s = n_qubit_quadratures(n)?;
    let mut v = Mat::zeros((2 * n, 2 * n));
    for i in 0..2 * n {
        for j in 0..2 * n {
            v[(i, j)] = trace(&x.dot(&s[i]).dot(&s[j]));
        }
    }
    Ok(v)
}

/// Mean vector `r_i = Tr[X S_i]` over the n-qubit quadrature operators.
pub fn n_qubit_mean_vector(x: &Mat, n: usize) -> Result<Mat> {
    check_n_qubit_operator(x, n)?;
    let s = n_qubit_quadratures(n)?;
    let mut r = Mat::zeros((2 * n, 1));
    for i in 0..2 * n {
        r[(i, 0)] = trace(&x.dot(&s[i]));
    }
    Ok(r)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    use crate::linalg::allclose;
    use crate::tensor::tensor;

    #[test]
    fn single_qubit_paulis() {
        assert!(allclose(&n_qubit_pauli(&[1]).unwrap(), &pauli_x(), 1e-15));
        assert!(allclose(&n_qubit_pauli(&[2]).unwrap(), &pauli_y(), 1e-15));
        assert!(allclose(&n_qubit_pauli(&[3]).unwrap(), &pauli_z(), 1e-15));
        assert!(allclose(&n_qubit_pauli(&[0]).unwrap(), &Mat::eye(2), 1e-15));
    }

    #[test]
    fn two_qubit_pauli_is_kron() {
        let xz = n_qubit_pauli(&[1, 3]).unwrap();
        assert!(allclose(&xz, &tensor(&[&pauli_x(), &pauli_z()]), 1e-15));
    }

    #[test]
    fn pauli_products_square_to_identity() {
        for ix in [[0, 1], [2, 3], [1, 1], [3, 2]] {
            let sigma = n_qubit_pauli(&ix).unwrap();
            assert!(allclose(&sigma.dot(&sigma), &Mat::eye(4), 1e-12));
        }
    }

    #[rstest]
    #[case(&[0, 2])]
    #[case(&[4])]
    fn x_product_rejects_non_bits(#[case] bits: &[usize]) {
        assert!(n_qubit_pauli_x(bits).is_err());
        assert!(n_qubit_pauli_z(bits).is_err());
    }

    #[test]
    fn coeff_roundtrip_from_matrix() {
        let x = n_qubit_pauli(&[1, 2]).unwrap() * C64::new(0.5, -1.5)
            + n_qubit_pauli(&[3, 0]).unwrap() * C64::new(2.0, 0.0);
        let c = pauli_coeffs(&x, 2).unwrap();
        let back = pauli_coeffs_to_matrix(&c, 2).unwrap();
        assert!(allclose(&back, &x, 1e-10));
    }

    #[test]
    fn coeff_roundtrip_from_coeffs() {
        // Any 4^n coefficient vector survives matrix assembly and re-expansion.
        let n = 2;
        let coeffs: Vec<C64> = (0..16)
            .map(|k| C64::new(k as f64 - 3.0, 0.25 * k as f64))
            .collect();
        let x = pauli_coeffs_to_matrix(&coeffs, n).unwrap();
        let back = pauli_coeffs(&x, n).unwrap();
        for (a, b) in coeffs.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-10);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn quadratures_anticommute_on_site() {
        let s = n_qubit_quadratures(2).unwrap();
        assert_eq!(s.len(), 4);
        // X and Z on the same qubit anticommute; on different qubits they
        // commute.
        let anti = s[0].dot(&s[1]) + s[1].dot(&s[0]);
        assert!(allclose(&anti, &Mat::zeros((4, 4)), 1e-12));
        let comm = s[0].dot(&s[3]) - s[3].dot(&s[0]);
        assert!(allclose(&comm, &Mat::zeros((4, 4)), 1e-12));
    }

    #[test]
    fn mean_vector_of_pauli_state() {
        // For X = X_1 the only nonvanishing moment is Tr[X S_0] = 2.
        let x = n_qubit_pauli(&[1]).unwrap();
        let r = n_qubit_mean_vector(&x, 1).unwrap();
        assert_abs_diff_eq!(r[(0, 0)].re, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r[(1, 0)].re, 0.0, epsilon = 1e-12);
    }

}
