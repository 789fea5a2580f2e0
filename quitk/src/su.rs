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

//! Generators of the su(d) Lie algebra and their structure constants.
//!
//! The basis used here contains the identity followed by the d^2 - 1
//! traceless Hermitian generators, normalized so that
//! `Tr[S_i S_j] = d * delta_{ij}`. For d = 2 the non-identity generators are
//! the Pauli matrices.

use ndarray::prelude::*;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::linalg::{dag, trace};
use crate::tensor::{C64, Mat, ket};

/// The d^2 basis elements of the space of `d x d` matrices: the identity
/// followed by the su(d) generators (symmetric, antisymmetric, and diagonal
/// families), under the normalization `Tr[S_i S_j] = d * delta_{ij}`.
pub fn su_generators(d: usize) -> Result<Vec<Mat>> {
    if d < 2 {
        return Err(Error::DimensionMismatch(format!(
            "su(d) requires dimension at least 2, got {d}"
        )));
    }
    let mut gens = Vec::with_capacity(d * d);
    gens.push(Mat::eye(d));

    let scale = C64::new((d as f64 / 2.0).sqrt(), 0.0);
    for l in 0..d {
        for k in 0..l {
            let ekl = ket(d, k)?.dot(&dag(&ket(d, l)?));
            let elk = ket(d, l)?.dot(&dag(&ket(d, k)?));
            gens.push((&ekl + &elk) * scale);
            gens.push((&ekl * C64::new(0.0, -1.0) + &elk * C64::new(0.0, 1.0)) * scale);
        }
    }

    for k in 1..d {
        let mut x = Mat::zeros((d, d));
        for j in 0..k {
            x += &ket(d, j)?.dot(&dag(&ket(d, j)?));
        }
        x -= &(ket(d, k)?.dot(&dag(&ket(d, k)?)) * C64::new(k as f64, 0.0));
        let norm = C64::new((d as f64 / (k as f64 * (k + 1) as f64)).sqrt(), 0.0);
        gens.push(x * norm);
    }

    Ok(gens)
}

fn trace_of_product(a: &Mat, b: &Mat) -> C64 {
    // Tr[A B] without forming the product matrix.
    let mut acc = C64::new(0.0, 0.0);
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            acc += a[(i, j)] * b[(j, i)];
        }
    }
    acc
}

/// Structure constants of su(d):
///
/// `f[(i, j, k)] = (1/(i d^2)) Tr[S_k [S_i, S_j]]` and
/// `g[(i, j, k)] = (1/d^2) Tr[S_k {S_i, S_j}]`,
///
/// with zero-based indices running over the d^2 - 1 non-identity generators
/// (generator `i` here is `su_generators(d)[i + 1]`). The sweep over all
/// `(d^2 - 1)^3` triples is the most expensive routine in the base layer and
/// is parallelized over the first index.
pub fn su_structure_constants(d: usize) -> Result<(Array3<f64>, Array3<f64>)> {
    let gens = su_generators(d)?;
    let m = d * d - 1;
    let dd = (d * d) as f64;

    // Pairwise products of the non-identity generators, row-major in (i, j).
    let products: Vec<Mat> = (0..m * m)
        .into_par_iter()
        .map(|ij| gens[ij / m + 1].dot(&gens[ij % m + 1]))
        .collect();

    let entries: Vec<(f64, f64)> = (0..m * m * m)
        .into_par_iter()
        .map(|ijk| {
            let i = ijk / (m * m);
            let j = (ijk / m) % m;
            let k = ijk % m;
            let forward = trace_of_product(&gens[k + 1], &products[i * m + j]);
            let backward = trace_of_product(&gens[k + 1], &products[j * m + i]);
            let comm = forward - backward;
            let anti = forward + backward;
            // Tr[S_k [S_i, S_j]] is purely imaginary and Tr[S_k {S_i, S_j}]
            // purely real for a Hermitian basis.
            (comm.im / dd, anti.re / dd)
        })
        .collect();

    let mut f = Array3::zeros((m, m, m));
    let mut g = Array3::zeros((m, m, m));
    for (ijk, (fv, gv)) in entries.into_iter().enumerate() {
        let i = ijk / (m * m);
        let j = (ijk / m) % m;
        let k = ijk % m;
        f[(i, j, k)] = fv;
        g[(i, j, k)] = gv;
    }
    Ok((f, g))
}

/// For each pair `(i, j)` of non-identity generators, the indices of the
/// basis elements spanning `S_i S_j`, i.e. those `k` with
/// `|Tr[S_k S_i S_j]| > tol`. Index 0 stands for the identity and appears
/// exactly when `i == j`.
pub fn su_generator_products(
    d: usize,
    tol: f64,
) -> Result<rustc_hash::FxHashMap<(usize, usize), Vec<usize>>> {
    let gens = su_generators(d)?;
    let m = d * d - 1;
    let mut span = rustc_hash::FxHashMap::default();
    for i in 1..=m {
        for j in 1..=m {
            let prod = gens[i].dot(&gens[j]);
            let mut ks = Vec::new();
            if i == j {
                ks.push(0);
            }
            for k in 1..=m {
                if trace_of_product(&gens[k], &prod).norm() > tol {
                    ks.push(k);
                }
            }
            span.insert((i, j), ks);
        }
    }
    Ok(span)
}

/// Builds the operator `(1/d)(I + sum_i n_i S_i)` from a coherence vector of
/// length d^2 - 1 (skipping the identity).
pub fn state_from_coherence_vector(n: &[f64], d: usize) -> Result<Mat> {
    let gens = su_generators(d)?;
    if n.len() != d * d - 1 {
        return Err(Error::DimensionMismatch(format!(
            "coherence vector has {} entries, expected {}",
            n.len(),
            d * d - 1
        )));
    }
    let inv_d = C64::new(1.0 / d as f64, 0.0);
    let mut rho = Mat::eye(d) * inv_d;
    for (i, &ni) in n.iter().enumerate() {
        rho = rho + &gens[i + 1] * (inv_d * C64::new(ni, 0.0));
    }
    Ok(rho)
}

/// Builds the general operator `(1/d) sum_i n_i S_i` from a full-length
/// coefficient vector (d^2 entries, identity included).
pub fn operator_from_coherence_vector(n: &[f64], d: usize) -> Result<Mat> {
    let gens = su_generators(d)?;
    if n.len() != d * d {
        return Err(Error::DimensionMismatch(format!(
            "coefficient vector has {} entries, expected {}",
            n.len(),
            d * d
        )));
    }
    let inv_d = C64::new(1.0 / d as f64, 0.0);
    let mut x = Mat::zeros((d, d));
    for (i, &ni) in n.iter().enumerate() {
        x = x + &gens[i] * (inv_d * C64::new(ni, 0.0));
    }
    Ok(x)
}

/// Star product of two coherence vectors of states,
/// `p_k = (d/2) sum_{ij} n1_i n2_j g_{ijk}`.
pub fn coherence_vector_star_product(n1: &[f64], n2: &[f64], d: usize) -> Result<Vec<f64>> {
    let m = d * d - 1;
    if n1.len() != m || n2.len() != m {
        return Err(Error::DimensionMismatch(format!(
            "coherence vectors have {} and {} entries, expected {m}",
            n1.len(),
            n2.len()
        )));
    }
    let (_, g) = su_structure_constants(d)?;
    let half_d = d as f64 / 2.0;
    let mut p = Vec::with_capacity(m);
    for k in 0..m {
        let mut pk = 0.0;
        for i in 0..m {
            for j in 0..m {
                pk += half_d * n1[i] * n2[j] * g[(i, j, k)];
            }
        }
        p.push(pk);
    }
    Ok(p)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    use crate::linalg::allclose;
    use crate::pauli::{pauli_x, pauli_y, pauli_z};

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    fn generator_count_and_orthogonality(#[case] d: usize) {
        let gens = su_generators(d).unwrap();
        assert_eq!(gens.len(), d * d);
        for (i, a) in gens.iter().enumerate() {
            for (j, b) in gens.iter().enumerate() {
                let inner = trace(&a.dot(b));
                let expected = if i == j { d as f64 } else { 0.0 };
                assert_abs_diff_eq!(inner.re, expected, epsilon = 1e-10);
                assert_abs_diff_eq!(inner.im, 0.0, epsilon = 1e-10);
            }
        }
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    fn generators_are_hermitian_and_traceless(#[case] d: usize) {
        let gens = su_generators(d).unwrap();
        for (i, s) in gens.iter().enumerate() {
            assert!(allclose(s, &dag(s), 1e-12));
            if i > 0 {
                assert_abs_diff_eq!(trace(s).norm(), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn qubit_generators_are_paulis() {
        let gens = su_generators(2).unwrap();
        assert!(allclose(&gens[1], &pauli_x(), 1e-12));
        assert!(allclose(&gens[2], &pauli_y(), 1e-12));
        assert!(allclose(&gens[3], &pauli_z(), 1e-12));
    }

    #[test]
    fn qubit_structure_constants() {
        // For su(2) with this normalization, [S_i, S_j] = 2i eps_{ijk} S_k,
        // so f_{ijk} = eps_{ijk}, while {S_i, S_j} is proportional to the
        // identity and g vanishes identically.
        let (f, g) = su_structure_constants(2).unwrap();
        assert_abs_diff_eq!(f[(0, 1, 2)], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(f[(1, 0, 2)], -1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(f[(0, 0, 0)], 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(g[(0, 0, 0)], 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(g[(0, 1, 2)], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn antisymmetry_of_f() {
        let (f, _) = su_structure_constants(3).unwrap();
        let m = 8;
        for i in 0..m {
            for j in 0..m {
                for k in 0..m {
                    assert_abs_diff_eq!(f[(i, j, k)], -f[(j, i, k)], epsilon = 1e-10);
                }
            }
        }
    }

    #[test]
    fn products_span_contains_identity_on_diagonal() {
        let span = su_generator_products(2, 1e-10).unwrap();
        assert!(span[&(1, 1)].contains(&0));
        assert!(!span[&(1, 2)].contains(&0));
    }

    #[test]
    fn coherence_vector_of_pure_z_state() {
        // n = (0, 0, 1) gives (I + Z)/2 = |0><0|.
        let rho = state_from_coherence_vector(&[0.0, 0.0, 1.0], 2).unwrap();
        let expected = ket(2, 0).unwrap().dot(&dag(&ket(2, 0).unwrap()));
        assert!(allclose(&rho, &expected, 1e-12));

        let x = operator_from_coherence_vector(&[2.0, 0.0, 0.0, 0.0], 2).unwrap();
        assert!(allclose(&x, &Mat::eye(2), 1e-12));
    }

    #[test]
    fn star_product_symmetry() {
        let n1 = [0.3, -0.2, 0.5];
        let n2 = [0.1, 0.4, -0.6];
        let p12 = coherence_vector_star_product(&n1, &n2, 2).unwrap();
        let p21 = coherence_vector_star_product(&n2, &n1, 2).unwrap();
        for (a, b) in p12.iter().zip(p21.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }
    }
}
