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

//! Protocol simulators: state and channel discrimination, teleportation
//! (single hop and repeater chains), entanglement-swapping GHZ
//! distribution, graph-state distribution, and recurrence-style
//! entanglement distillation.
//!
//! Each protocol is a plain composition of channel and state primitives,
//! summed over the classical outcome tuples of its measurements.

use itertools::Itertools;

use crate::channels::diamond_norm;
use crate::error::{Error, Result};
use crate::fidelity::fidelity;
use crate::gates::cnot_at;
use crate::linalg::{dag, matrix_power, trace, trace_norm};
use crate::pauli::{n_qubit_pauli_z, pauli_x};
use crate::sdp::{MatExpr, SdpBuilder};
use crate::states::{bell_state, bell_vector, graph_state_vector, isotropic_twirl};
use crate::tensor::{C64, Mat, ket, partial_trace, syspermute, tensor};
use crate::weyl::{discrete_weyl_x, discrete_weyl_z};

fn check_prior(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::IllDefined(format!("prior {p} is not a probability")));
    }
    Ok(())
}

/// Optimal error probability for discriminating `rho` (prior `p`) from
/// `sigma` (prior `1-p`) by the Holevo-Helstrom formula
/// `(1/2)(1 - || p rho - (1-p) sigma ||_1)`.
///
/// Returns the success probability instead when `succ` is set.
pub fn state_discrimination(rho: &Mat, sigma: &Mat, p: f64, succ: bool) -> Result<f64> {
    check_prior(p)?;
    let biased = rho * C64::new(p, 0.0) - sigma * C64::new(1.0 - p, 0.0);
    let p_err = 0.5 * (1.0 - trace_norm(&biased)?);
    Ok(if succ { 1.0 - p_err } else { p_err })
}

/// State discrimination error (or success) probability by SDP.
///
/// The primal optimizes over the measurement operator `0 ⪯ M ⪯ I`; the
/// dual over Hermitian `W ⪯ p rho`, `W ⪯ (1-p) sigma`. Both agree with the
/// closed form up to solver tolerance.
pub fn state_discrimination_sdp(
    rho: &Mat,
    sigma: &Mat,
    p: f64,
    succ: bool,
    dual: bool,
    eps: f64,
) -> Result<f64> {
    check_prior(p)?;
    if rho.dim() != sigma.dim() || rho.nrows() != rho.ncols() {
        return Err(Error::DimensionMismatch(format!(
            "states have incompatible shapes {:?} and {:?}",
            rho.dim(),
            sigma.dim()
        )));
    }
    let dim = rho.nrows();

    let p_err = if !dual {
        let mut sdp = SdpBuilder::new();
        let m = sdp.hermitian_var(dim);
        sdp.psd(&m);
        sdp.psd(&(&MatExpr::constant(&Mat::eye(dim)) - &m));
        // p Tr[(I - M) rho] + (1-p) Tr[M sigma].
        let miss = &MatExpr::constant(&Mat::eye(dim)) - &m;
        let objective = &miss.inner_with(&dag(rho)).scale(p)
            + &m.inner_with(&dag(sigma)).scale(1.0 - p);
        sdp.minimize(&objective);
        sdp.solve(eps)?.value
    } else {
        let mut sdp = SdpBuilder::new();
        let w = sdp.hermitian_var(dim);
        sdp.psd(&(&MatExpr::constant(rho).scale(C64::new(p, 0.0)) - &w));
        sdp.psd(&(&MatExpr::constant(sigma).scale(C64::new(1.0 - p, 0.0)) - &w));
        sdp.maximize(&w.trace());
        sdp.solve(eps)?.value
    };
    Ok(if succ { 1.0 - p_err } else { p_err })
}

/// Optimal error probability for discriminating two channels with Choi
/// representations `j0` (prior `p`) and `j1`, via the diamond norm of the
/// biased difference.
pub fn channel_discrimination(
    j0: &Mat,
    j1: &Mat,
    dim_a: usize,
    dim_b: usize,
    p: f64,
    succ: bool,
    eps: f64,
) -> Result<f64> {
    check_prior(p)?;
    let biased = j0 * C64::new(p, 0.0) - j1 * C64::new(1.0 - p, 0.0);
    let p_err = 0.5 * (1.0 - diamond_norm(&biased, dim_a, dim_b, eps)?);
    Ok(if succ { 1.0 - p_err } else { p_err })
}

/// Channel discrimination error (or success) probability by SDP, primal or
/// dual.
pub fn channel_discrimination_sdp(
    j0: &Mat,
    j1: &Mat,
    dim_a: usize,
    dim_b: usize,
    p: f64,
    succ: bool,
    dual: bool,
    eps: f64,
) -> Result<f64> {
    check_prior(p)?;
    let n = dim_a * dim_b;
    if j0.dim() != (n, n) || j1.dim() != (n, n) {
        return Err(Error::DimensionMismatch(format!(
            "Choi matrices of shapes {:?} and {:?} do not match dimensions {dim_a} x {dim_b}",
            j0.dim(),
            j1.dim()
        )));
    }

    let p_err = if !dual {
        // Work in the (B, A) ordering so the strategy constraint is a
        // Kronecker product with a constant factor on the left.
        let j0p = syspermute(j0, &[2, 1], &[dim_a, dim_b])?;
        let j1p = syspermute(j1, &[2, 1], &[dim_a, dim_b])?;

        let mut sdp = SdpBuilder::new();
        let q0 = sdp.hermitian_var(n);
        let q1 = sdp.hermitian_var(n);
        let rho = sdp.hermitian_var(dim_a);
        sdp.psd(&q0);
        sdp.psd(&q1);
        sdp.psd(&rho);
        sdp.eq_scalar(&rho.trace(), 1.0);
        sdp.eq_zero(&(&(&q0 + &q1) - &rho.kron_left(&Mat::eye(dim_b))));

        let objective = &q1.inner_with(&dag(&j0p)).scale(p)
            + &q0.inner_with(&dag(&j1p)).scale(1.0 - p);
        sdp.minimize(&objective);
        sdp.solve(eps)?.value
    } else {
        let mut sdp = SdpBuilder::new();
        let mu = sdp.scalar_var();
        let w = sdp.hermitian_var(n);
        sdp.psd(&(&MatExpr::constant(j0).scale(C64::new(p, 0.0)) - &w));
        sdp.psd(&(&MatExpr::constant(j1).scale(C64::new(1.0 - p, 0.0)) - &w));
        let w_a = w.try_map_linear(|m| partial_trace(m, &[2], &[dim_a, dim_b]))?;
        sdp.psd(&(&w_a - &mu.times_matrix(&Mat::eye(dim_a))));
        sdp.maximize(&mu);
        sdp.solve(eps)?.value
    };
    Ok(if succ { 1.0 - p_err } else { p_err })
}

/// Applies the d-dimensional teleportation channel to a state
/// `rho_{A R1 R2 B}`: a Bell measurement on `R1 R2` followed by the
/// matching Weyl correction on `B`. All of `R1`, `R2`, `B` have dimension
/// `d`; the bystander `A` has dimension `dim_a` (possibly 1).
///
/// With `rho = psi_{R1} ⊗ Phi^+_{R2 B}` (and `dim_a = 1`) this teleports
/// `psi` to `B`; with `rho = Phi^+_{A R1} ⊗ Phi^+_{R2 B}` it performs
/// entanglement swapping.
pub fn apply_teleportation_channel(rho: &Mat, dim_a: usize, d: usize) -> Result<Mat> {
    let total = dim_a * d * d * d;
    if rho.dim() != (total, total) {
        return Err(Error::DimensionMismatch(format!(
            "state of shape {:?} does not match A R1 R2 B dimensions [{dim_a}, {d}, {d}, {d}]",
            rho.dim()
        )));
    }
    let x = discrete_weyl_x(d)?;
    let z = discrete_weyl_z(d)?;
    let eye_a = Mat::eye(dim_a);

    let mut out = Mat::zeros((dim_a * d, dim_a * d));
    for zi in 0..d {
        for xi in 0..d {
            let bell = bell_vector(d, zi, xi)?;
            let w = matrix_power(&z, zi).dot(&matrix_power(&x, xi));
            let left = tensor(&[&eye_a, &dag(&bell), &w]);
            let right = tensor(&[&eye_a, &bell, &dag(&w)]);
            out = out + left.dot(rho).dot(&right);
        }
    }
    Ok(out)
}

/// Applies the teleportation chain channel to
/// `rho_{A R11 R12 ... Rn1 Rn2 B}`: independent Bell measurements on every
/// repeater pair `Ri1 Ri2` and a single accumulated correction on `B`.
pub fn apply_teleportation_chain_channel(
    rho: &Mat,
    n: usize,
    dim_a: usize,
    d: usize,
) -> Result<Mat> {
    if n == 0 {
        return Err(Error::IllDefined("chain length must be at least 1".into()));
    }
    let total = dim_a * d.pow(2 * n as u32) * d;
    if rho.dim() != (total, total) {
        return Err(Error::DimensionMismatch(format!(
            "state of shape {:?} does not match a chain of {n} repeater pairs",
            rho.dim()
        )));
    }
    let x = discrete_weyl_x(d)?;
    let z = discrete_weyl_z(d)?;
    let eye_a = Mat::eye(dim_a);

    let mut out = Mat::zeros((dim_a * d, dim_a * d));
    let outcomes: Vec<Vec<usize>> = (0..n).map(|_| 0..d).multi_cartesian_product().collect();
    for z_indices in &outcomes {
        for x_indices in &outcomes {
            let mut bell = bell_vector(d, z_indices[0], x_indices[0])?;
            for j in 1..n {
                bell = tensor(&[&bell, &bell_vector(d, z_indices[j], x_indices[j])?]);
            }
            let z_sum = z_indices.iter().sum::<usize>() % d;
            let x_sum = x_indices.iter().sum::<usize>() % d;
            let w = matrix_power(&z, z_sum).dot(&matrix_power(&x, x_sum));

            let left = tensor(&[&eye_a, &dag(&bell), &w]);
            let right = tensor(&[&eye_a, &bell, &dag(&w)]);
            out = out + left.dot(rho).dot(&right);
        }
    }
    Ok(out)
}

/// Fidelity of a state `rho_{A R1 R2 B}` (all subsystems d-dimensional)
/// with the Bell-pair products `Phi_{z,x} ⊗ Phi_{z,x}`, summed over
/// outcomes: the post-teleportation fidelity with the maximally entangled
/// state.
pub fn post_teleportation_fidelity(rho: &Mat, d: usize) -> Result<f64> {
    let mut f = 0.0;
    for z in 0..d {
        for x in 0..d {
            let phi = bell_state(d, z, x)?;
            f += fidelity(rho, &tensor(&[&phi, &phi]))?;
        }
    }
    Ok(f)
}

/// Chain version of [`post_teleportation_fidelity`]: the fidelity with the
/// accumulated-correction Bell product, summed over the repeater outcome
/// tuples.
pub fn post_teleportation_chain_fidelity(rho: &Mat, n: usize, d: usize) -> Result<f64> {
    let outcomes: Vec<Vec<usize>> = (0..n).map(|_| 0..d).multi_cartesian_product().collect();
    let mut f = 0.0;
    for z_indices in &outcomes {
        for x_indices in &outcomes {
            let z_sum = z_indices.iter().sum::<usize>() % d;
            let x_sum = x_indices.iter().sum::<usize>() % d;
            let mut bell_tot = bell_state(d, z_sum, x_sum)?;
            for j in 0..n {
                bell_tot = tensor(&[&bell_tot, &bell_state(d, z_indices[j], x_indices[j])?]);
            }
            f += fidelity(rho, &bell_tot)?;
        }
    }
    Ok(f)
}

/// Applies the channel turning two maximally entangled qubit pairs
/// `rho_{A R1 R2 B}` into a three-party GHZ state on `A R1 B`: CNOT from
/// `R1` to `R2`, measurement of `R2` in the standard basis, and an X
/// correction on `B`.
pub fn apply_ent_swap_ghz_channel(rho: &Mat) -> Result<Mat> {
    if rho.dim() != (16, 16) {
        return Err(Error::DimensionMismatch(format!(
            "state of shape {:?} is not a four-qubit operator",
            rho.dim()
        )));
    }
    let c = cnot_at(2, 3, 4)?;
    let mut out = Mat::zeros((8, 8));
    for xi in 0..2 {
        let correction = matrix_power(&pauli_x(), xi);
        let l = tensor(&[&Mat::eye(4), &dag(&ket(2, xi)?), &Mat::eye(2)])
            .dot(&c)
            .dot(&tensor(&[&Mat::eye(8), &correction]));
        out = out + l.dot(rho).dot(&dag(&l));
    }
    Ok(out)
}

/// Chain version of [`apply_ent_swap_ghz_channel`]: takes
/// `rho_{A R11 R12 ... Rn1 Rn2 B}` (2n+2 qubits), performs a CNOT and
/// standard-basis measurement inside every repeater pair with an X
/// correction on `B`, and traces out the measured qubits, leaving an
/// (n+2)-qubit state.
pub fn apply_ent_swap_ghz_chain_channel(rho: &Mat, n: usize) -> Result<Mat> {
    if n == 0 {
        return Err(Error::IllDefined("chain length must be at least 1".into()));
    }
    let qubits = 2 * n + 2;
    let dim = 1usize << qubits;
    if rho.dim() != (dim, dim) {
        return Err(Error::DimensionMismatch(format!(
            "state of shape {:?} is not a {qubits}-qubit operator",
            rho.dim()
        )));
    }

    let kraus_term = |j: usize, x: usize| -> Result<Mat> {
        let projector = ket(2, x)?.dot(&dag(&ket(2, x)?));
        let mx = tensor(&[
            &Mat::eye(2),
            &Mat::eye(1 << (2 * j - 2)),
            &Mat::eye(2),
            &projector,
            &Mat::eye(1 << (2 * (n - j))),
            &Mat::eye(2),
        ]);
        let c = cnot_at(2 * j, 2 * j + 1, qubits)?;
        let correction = crate::gates::rx_at(2 * j + 2, std::f64::consts::PI, qubits)?
            * C64::new(0.0, 1.0);
        Ok(mx.dot(&c).dot(&matrix_power(&correction, x)))
    };

    let mut out = Mat::zeros((dim, dim));
    for index in (0..n).map(|_| 0..2usize).multi_cartesian_product() {
        let mut l = kraus_term(1, index[0])?;
        for j in 2..=n {
            l = kraus_term(j, index[j - 1])?.dot(&l);
        }
        out = out + l.dot(rho).dot(&dag(&l));
    }

    let measured: Vec<usize> = (1..=n).map(|j| 2 * j + 1).collect();
    partial_trace(&out, &measured, &vec![2; qubits])
}

/// Fidelity of a four-qubit state with the Bell-product targets
/// `Phi_{z,0} ⊗ Phi_{z,0}`, summed over the measurement outcome `z`.
pub fn post_ent_swap_ghz_fidelity(rho: &Mat) -> Result<f64> {
    let mut f = 0.0;
    for z in 0..2 {
        let phi = bell_state(2, z, 0)?;
        f += fidelity(&tensor(&[&phi, &phi]), rho)?;
    }
    Ok(f)
}

/// Chain version of [`post_ent_swap_ghz_fidelity`], summed over the
/// repeater outcome tuples with the accumulated parity on the first pair.
pub fn post_ent_swap_ghz_chain_fidelity(rho: &Mat, n: usize) -> Result<f64> {
    let mut f = 0.0;
    for index in (0..n).map(|_| 0..2usize).multi_cartesian_product() {
        let s = index.iter().sum::<usize>() % 2;
        let mut bell = bell_state(2, s, 0)?;
        for &z in &index {
            bell = tensor(&[&bell, &bell_state(2, z, 0)?]);
        }
        f += fidelity(&bell, rho)?;
    }
    Ok(f)
}

/// Applies the graph state distribution channel to a 2n-qubit state
/// `rho_{A_1 ... A_n R_1 ... R_n}`: the graph-state measurement on the R
/// qubits with a Z-string correction on the A qubits. When `rho` is a
/// product of maximally entangled pairs `Phi^+_{A_k R_k}` the output on
/// `A_1 ... A_n` is the graph state of `adj`.
pub fn apply_graph_state_dist_channel(
    adj: &ndarray::Array2<u8>,
    n: usize,
    rho: &Mat,
) -> Result<Mat> {
    let dim = 1usize << n;
    if rho.dim() != (dim * dim, dim * dim) {
        return Err(Error::DimensionMismatch(format!(
            "state of shape {:?} is not a 2n-qubit operator for n = {n}",
            rho.dim()
        )));
    }
    let ket_g = graph_state_vector(adj, n)?;

    let mut out = Mat::zeros((dim, dim));
    for index in (0..n).map(|_| 0..2usize).multi_cartesian_product() {
        let zx = n_qubit_pauli_z(&index)?;
        let gx = zx.dot(&ket_g);
        let left = tensor(&[&zx, &dag(&gx)]);
        let right = tensor(&[&zx, &gx]);
        out = out + left.dot(rho).dot(&right);
    }
    Ok(out)
}

/// Fidelity of the 2n-qubit pre-correction state with the Bell-pair
/// targets indexed by the graph's parity pattern `z = adj x mod 2`,
/// summed over the X-measurement outcomes.
pub fn post_graph_state_dist_fidelity(
    adj: &ndarray::Array2<u8>,
    n: usize,
    rho: &Mat,
) -> Result<f64> {
    if adj.dim() != (n, n) {
        return Err(Error::DimensionMismatch(format!(
            "adjacency matrix of shape {:?} does not match {n} vertices",
            adj.dim()
        )));
    }
    let mut f = 0.0;
    for x_n in (0..n).map(|_| 0..2usize).multi_cartesian_product() {
        let z_n: Vec<usize> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| adj[(i, j)] as usize * x_n[j])
                    .sum::<usize>()
                    % 2
            })
            .collect();

        let mut bell = bell_state(2, z_n[0], x_n[0])?;
        for k in 1..n {
            bell = tensor(&[&bell, &bell_state(2, z_n[k], x_n[k])?]);
        }
        let mut perm: Vec<usize> = (1..2 * n).step_by(2).collect();
        perm.extend((2..=2 * n).step_by(2));
        let bell = syspermute(&bell, &perm, &vec![2; 2 * n])?;

        f += fidelity(rho, &bell)?;
    }
    Ok(f)
}

/// Applies the recurrence entanglement distillation channel to two
/// two-qubit states shared between the same parties: bilateral CNOTs
/// followed by standard-basis measurements on the second pair.
///
/// With `success` the returned (unnormalized) state is conditioned on
/// agreeing outcomes and its trace is the success probability; otherwise
/// it is conditioned on disagreeing outcomes. `twirl_after` applies the
/// isotropic twirl to the successful output, and `normalize` rescales the
/// output to unit trace.
pub fn entanglement_distillation(
    rho1: &Mat,
    rho2: &Mat,
    success: bool,
    twirl_after: bool,
    normalize: bool,
) -> Result<Mat> {
    if rho1.dim() != (4, 4) || rho2.dim() != (4, 4) {
        return Err(Error::DimensionMismatch(
            "entanglement distillation expects two two-qubit states".into(),
        ));
    }
    let cnot = cnot_at(1, 2, 2)?;
    let proj0 = ket(2, 0)?.dot(&dag(&ket(2, 0)?));
    let proj1 = ket(2, 1)?.dot(&dag(&ket(2, 1)?));

    let p0 = tensor(&[&Mat::eye(2), &proj0, &Mat::eye(2), &proj0]);
    let p1 = tensor(&[&Mat::eye(2), &proj1, &Mat::eye(2), &proj1]);
    let p2 = Mat::eye(16) - &p0 - &p1;
    let c = tensor(&[&cnot, &cnot]);
    let k0 = p0.dot(&c);
    let k1 = p1.dot(&c);
    let k2 = p2.dot(&c);

    // rho1 ⊗ rho2 is ordered A1 B1 A2 B2; regroup to A1 A2 B1 B2.
    let rho_in = syspermute(&tensor(&[rho1, rho2]), &[1, 3, 2, 4], &[2, 2, 2, 2])?;

    let mut out = if success {
        let kept =
            k0.dot(&rho_in).dot(&dag(&k0)) + k1.dot(&rho_in).dot(&dag(&k1));
        partial_trace(&kept, &[2, 4], &[2, 2, 2, 2])?
    } else {
        let kept = k2.dot(&rho_in).dot(&dag(&k2));
        partial_trace(&kept, &[2, 4], &[2, 2, 2, 2])?
    };

    if success && twirl_after {
        out = isotropic_twirl(&out, 2)?;
    }
    if normalize {
        let tr = trace(&out);
        if tr.norm() < 1e-15 {
            return Err(Error::IllDefined(
                "conditional state has zero probability; cannot normalize".into(),
            ));
        }
        out = out / tr;
    }
    Ok(out)
}
