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

//! Constructors for the standard states of quantum information theory
//! (maximally entangled, Bell, GHZ, graph, isotropic, Werner, random) and a
//! few state functionals built directly on them (twirls, log-negativity,
//! k-extendibility).

use rand::Rng;

use crate::error::{Error, Result};
use crate::gates::cz_at;
use crate::linalg::{dag, frobenius_norm, ginibre, matrix_power, trace, trace_norm};
use crate::sdp::{MatExpr, SdpBuilder, Solution};
use crate::tensor::{
    C64, Mat, ket, ket_list, partial_trace, partial_transpose, swap_operator, syspermute, tensor,
};
use crate::weyl::{discrete_weyl_x, discrete_weyl_z};

/// The maximally entangled vector `sum_i |i,i>` on two d-dimensional
/// systems, normalized by `1/sqrt(d)` unless `normalized` is false.
pub fn max_entangled_vector(d: usize, normalized: bool) -> Result<Mat> {
    let mut gamma = Mat::zeros((d * d, 1));
    for i in 0..d {
        gamma += &ket_list(&[d, d], &[i, i])?;
    }
    if normalized {
        gamma /= C64::new((d as f64).sqrt(), 0.0);
    }
    Ok(gamma)
}

/// The maximally entangled state as a density matrix; unnormalized it is
/// the projector `|Gamma><Gamma|` with trace d.
pub fn max_entangled_state(d: usize, normalized: bool) -> Result<Mat> {
    let v = max_entangled_vector(d, normalized)?;
    Ok(v.dot(&dag(&v)))
}

/// The d-dimensional maximally mixed state `I/d`.
pub fn max_mixed_state(d: usize) -> Mat {
    Mat::eye(d) / C64::new(d as f64, 0.0)
}

/// The qudit Bell vector `|Phi_{z,x}> = (Z^z X^x ⊗ I)|Phi^+>` for
/// `0 <= z, x < d`.
pub fn bell_vector(d: usize, z: usize, x: usize) -> Result<Mat> {
    if z >= d || x >= d {
        return Err(Error::InvalidIndex(format!(
            "Bell labels ({z}, {x}) out of range for dimension {d}"
        )));
    }
    let w = matrix_power(&discrete_weyl_z(d)?, z).dot(&matrix_power(&discrete_weyl_x(d)?, x));
    let phi = max_entangled_vector(d, true)?;
    Ok(tensor(&[&w, &Mat::eye(d)]).dot(&phi))
}

/// The qudit Bell state `|Phi_{z,x}><Phi_{z,x}|` as a density matrix.
pub fn bell_state(d: usize, z: usize, x: usize) -> Result<Mat> {
    let v = bell_vector(d, z, x)?;
    Ok(v.dot(&dag(&v)))
}

/// The n-party GHZ vector `(1/sqrt(d)) sum_i |i, i, ..., i>`.
pub fn ghz_vector(d: usize, n: usize) -> Result<Mat> {
    let dim = d.pow(n as u32);
    let mut v = Mat::zeros((dim, 1));
    for i in 0..d {
        v += &ket_list(&vec![d; n], &vec![i; n])?;
    }
    Ok(v / C64::new((d as f64).sqrt(), 0.0))
}

/// The n-party GHZ state as a density matrix.
pub fn ghz_state(d: usize, n: usize) -> Result<Mat> {
    let v = ghz_vector(d, n)?;
    Ok(v.dot(&dag(&v)))
}

/// The graph state vector of the graph with (binary, symmetric, hollow)
/// adjacency matrix `adj` on `n` vertices: CZ gates on the edges applied to
/// `|+>^n`.
pub fn graph_state_vector(adj: &ndarray::Array2<u8>, n: usize) -> Result<Mat> {
    if adj.dim() != (n, n) {
        return Err(Error::DimensionMismatch(format!(
            "adjacency matrix of shape {:?} does not match {n} vertices",
            adj.dim()
        )));
    }
    for i in 0..n {
        for j in 0..n {
            if adj[(i, j)] > 1 || adj[(i, j)] != adj[(j, i)] || (i == j && adj[(i, j)] != 0) {
                return Err(Error::IllDefined(
                    "adjacency matrix must be binary, symmetric, and zero on the diagonal"
                        .into(),
                ));
            }
        }
    }
    let plus = (ket(2, 0)? + ket(2, 1)?) / C64::new(f64::sqrt(2.0), 0.0);
    let mut state = crate::tensor::tensor_pow(&plus, n);
    for i in 0..n {
        for j in (i + 1)..n {
            if adj[(i, j)] == 1 {
                state = cz_at(i + 1, j + 1, n)?.dot(&state);
            }
        }
    }
    Ok(state)
}

/// The graph state as a density matrix.
pub fn graph_state(adj: &ndarray::Array2<u8>, n: usize) -> Result<Mat> {
    let v = graph_state_vector(adj, n)?;
    Ok(v.dot(&dag(&v)))
}

/// The isotropic state `p |Phi+><Phi+| + (1-p) I/d^2` on two d-dimensional
/// systems, for `-1/(d^2-1) <= p <= 1`.
///
/// With `fidelity_param` set, `p` is instead the fidelity with the
/// maximally entangled state: `p Phi + ((1-p)/(d^2-1))(I - Phi)`.
pub fn isotropic_state(p: f64, d: usize, fidelity_param: bool) -> Result<Mat> {
    let d2 = (d * d) as f64;
    if fidelity_param {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::IllDefined(format!(
                "fidelity parameter {p} outside [0, 1]"
            )));
        }
    } else if p < -1.0 / (d2 - 1.0) || p > 1.0 {
        return Err(Error::IllDefined(format!(
            "isotropic parameter {p} outside [-1/(d^2-1), 1]"
        )));
    }
    let phi = max_entangled_state(d, true)?;
    let eye = Mat::eye(d * d);
    if fidelity_param {
        Ok(&phi * C64::new(p, 0.0) + (&eye - &phi) * C64::new((1.0 - p) / (d2 - 1.0), 0.0))
    } else {
        Ok(&phi * C64::new(p, 0.0) + &eye * C64::new((1.0 - p) / d2, 0.0))
    }
}

/// Projects `x` onto the isotropic family: the result of averaging
/// `(U ⊗ conj(U)) x (U ⊗ conj(U))^dag` over the Haar measure.
pub fn isotropic_twirl(x: &Mat, d: usize) -> Result<Mat> {
    let d2 = (d * d) as f64;
    let g = max_entangled_state(d, false)?;
    let tx = trace(x);
    let tgx = trace(&g.dot(x));
    let a = tx / C64::new(d2 - 1.0, 0.0) - tgx / C64::new(d as f64 * (d2 - 1.0), 0.0);
    let b = tgx / C64::new(d2 - 1.0, 0.0) - tx / C64::new(d as f64 * (d2 - 1.0), 0.0);
    Ok(Mat::eye(d * d) * a + g * b)
}

/// The singlet state `(1/(d^2-d))(I - F)` with `F` the swap operator.
pub fn singlet_state(d: usize) -> Result<Mat> {
    let f = swap_operator((1, 2), &[d, d])?;
    let d2 = (d * d) as f64;
    Ok((Mat::eye(d * d) - f) / C64::new(d2 - d as f64, 0.0))
}

/// The state orthogonal to the singlet, `(1/(d^2+d))(I + F)`.
pub fn singlet_perp_state(d: usize) -> Result<Mat> {
    let f = swap_operator((1, 2), &[d, d])?;
    let d2 = (d * d) as f64;
    Ok((Mat::eye(d * d) + f) / C64::new(d2 + d as f64, 0.0))
}

/// The Werner state `p * singlet + (1-p) * singlet_perp` for `0 <= p <= 1`.
///
/// With `alt_param` set, uses the parameterization
/// `(1/(d^2 - d p))(I - p F)` for `-1 <= p <= 1`.
pub fn werner_state(p: f64, d: usize, alt_param: bool) -> Result<Mat> {
    if alt_param {
        if !(-1.0..=1.0).contains(&p) {
            return Err(Error::IllDefined(format!(
                "Werner parameter {p} outside [-1, 1]"
            )));
        }
        let f = swap_operator((1, 2), &[d, d])?;
        let d2 = (d * d) as f64;
        Ok((Mat::eye(d * d) - f * C64::new(p, 0.0)) / C64::new(d2 - d as f64 * p, 0.0))
    } else {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::IllDefined(format!(
                "Werner parameter {p} outside [0, 1]"
            )));
        }
        let s = singlet_state(d)?;
        let sp = singlet_perp_state(d)?;
        Ok(s * C64::new(p, 0.0) + sp * C64::new(1.0 - p, 0.0))
    }
}

/// Projects `x` onto the Werner family: the result of averaging
/// `(U ⊗ U) x (U ⊗ U)^dag` over the Haar measure.
pub fn werner_twirl(x: &Mat, d: usize) -> Result<Mat> {
    let d2 = (d * d) as f64;
    let f = swap_operator((1, 2), &[d, d])?;
    let tx = trace(x);
    let tfx = trace(&f.dot(x));
    let a = tx / C64::new(d2 - 1.0, 0.0) - tfx / C64::new(d as f64 * (d2 - 1.0), 0.0);
    let b = tfx / C64::new(d2 - 1.0, 0.0) - tx / C64::new(d as f64 * (d2 - 1.0), 0.0);
    Ok(Mat::eye(d * d) * a + f * b)
}

/// Random density matrix of the given dimension and rank (full rank when
/// `rank` is `None`), sampled by normalizing a Ginibre product `G G^dag`.
pub fn random_density_matrix(dim: usize, rank: Option<usize>, rng: &mut impl Rng) -> Result<Mat> {
    let r = rank.unwrap_or(dim);
    if r == 0 || r > dim {
        return Err(Error::IllDefined(format!(
            "rank {r} invalid for dimension {dim}"
        )));
    }
    let g = ginibre(dim, r, rng);
    let rho = g.dot(&dag(&g));
    let tr = trace(&rho);
    Ok(rho / tr)
}

/// Haar-random pure state vector of the given dimension.
pub fn random_state_vector(dim: usize, rng: &mut impl Rng) -> Result<Mat> {
    if dim == 0 {
        return Err(Error::DimensionMismatch("dimension must be positive".into()));
    }
    let psi = ginibre(dim, 1, rng);
    let norm = frobenius_norm(&psi);
    Ok(psi / C64::new(norm, 0.0))
}

/// Random bipartite pure state of Schmidt rank (at most) `rank` on systems
/// of dimensions `dim_a` and `dim_b`.
pub fn random_state_vector_schmidt(
    dim_a: usize,
    dim_b: usize,
    rank: usize,
    rng: &mut impl Rng,
) -> Result<Mat> {
    if rank == 0 || rank > dim_a.min(dim_b) {
        return Err(Error::IllDefined(format!(
            "Schmidt rank {rank} invalid for dimensions {dim_a} x {dim_b}"
        )));
    }
    let k = rank;
    let psi_k = max_entangled_vector(k, false)?;
    let a = Mat::from_shape_fn((dim_a * k, 1), |_| {
        C64::new(rng.random::<f64>(), rng.random::<f64>())
    });
    let b = Mat::from_shape_fn((dim_b * k, 1), |_| {
        C64::new(rng.random::<f64>(), rng.random::<f64>())
    });
    let psi_init = syspermute(&tensor(&[&a, &b]), &[1, 3, 2, 4], &[k, dim_a, k, dim_b])?;
    let psi = tensor(&[&dag(&psi_k), &Mat::eye(dim_a * dim_b)]).dot(&psi_init);
    let norm = frobenius_norm(&psi);
    Ok(psi / C64::new(norm, 0.0))
}

/// Log-negativity `log2 || rho^{T_B} ||_1` of a bipartite state.
pub fn log_negativity(rho_ab: &Mat, dim_a: usize, dim_b: usize) -> Result<f64> {
    let pt = partial_transpose(rho_ab, &[2], &[dim_a, dim_b])?;
    Ok(trace_norm(&pt)?.log2())
}

/// Checks k-extendibility of the bipartite state `rho_ab` by maximizing `t`
/// such that some extension `R` on `A B^k` with `R ⪰ t I` has every
/// `A B_j` marginal equal to `rho_ab`.
///
/// The state is k-extendible exactly when the optimal `t` is non-negative.
/// Returns the optimal value and the extension found.
pub fn check_kext(
    rho_ab: &Mat,
    dim_a: usize,
    dim_b: usize,
    k: usize,
    eps: f64,
) -> Result<(f64, Mat)> {
    if k == 0 {
        return Err(Error::IllDefined("extension order k must be positive".into()));
    }
    let dims: Vec<usize> = std::iter::once(dim_a)
        .chain(std::iter::repeat(dim_b).take(k))
        .collect();
    let total: usize = dims.iter().product();
    if rho_ab.dim() != (dim_a * dim_b, dim_a * dim_b) {
        return Err(Error::DimensionMismatch(format!(
            "state of shape {:?} is not on A ⊗ B with dimensions {dim_a} x {dim_b}",
            rho_ab.dim()
        )));
    }

    let mut sdp = SdpBuilder::new();
    let t = sdp.scalar_var();
    let r = sdp.hermitian_var(total);

    sdp.psd(&(&r - &t.times_matrix(&Mat::eye(total))));

    for j in 2..=(k + 1) {
        let sys: Vec<usize> = (2..=(k + 1)).filter(|&s| s != j).collect();
        let marginal = r.try_map_linear(|m| partial_trace(m, &sys, &dims))?;
        sdp.eq_zero(&(&marginal - &MatExpr::constant(rho_ab)));
    }

    sdp.maximize(&t);
    let sol: Solution = sdp.solve(eps)?;
    let extension = sol.value_of(&r);
    Ok((sol.value, extension))
}
