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

//! Quantum channels: Kraus, Choi, and natural representations, channel
//! application, isometric extensions, the diamond norm, and constructors
//! for the standard channel families (Pauli, depolarizing, dephasing,
//! damping).
//!
//! A channel is carried around as its Kraus set, a `Vec` of equally-shaped
//! operators `K_i` acting as `rho -> sum_i K_i rho K_i^dag`. The Choi
//! representation is taken with the channel acting on the second half of
//! the unnormalized maximally entangled vector, `J = (I ⊗ N)(|Γ><Γ|)`.

use itertools::Itertools;
use ndarray::linalg::kron;

use crate::error::{Error, Result};
use crate::linalg::{allclose, dag, eigh, gram_schmidt, trace};
use crate::pauli::{n_qubit_pauli, n_qubit_pauli_x, n_qubit_pauli_z, pauli_x, pauli_y, pauli_z};
use crate::sdp::{MatExpr, SdpBuilder};
use crate::states::{max_entangled_state, random_state_vector};
use crate::tensor::{C64, Mat, ket, partial_trace, syspermute, tensor};

fn check_kraus(k: &[Mat]) -> Result<(usize, usize)> {
    let first = k
        .first()
        .ok_or_else(|| Error::IllDefined("empty Kraus set".into()))?;
    let shape = first.dim();
    if k.iter().any(|m| m.dim() != shape) {
        return Err(Error::DimensionMismatch(
            "Kraus operators must all have the same shape".into(),
        ));
    }
    Ok(shape)
}

fn check_probability(p: f64, what: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::IllDefined(format!(
            "{what} {p} is not a probability"
        )));
    }
    Ok(())
}

/// The adjoint Kraus set `{K_i^dag}`.
pub fn kraus_adjoint(k: &[Mat]) -> Vec<Mat> {
    k.iter().map(dag).collect()
}

/// Applies the channel with the given Kraus set to `rho`:
/// `sum_i K_i rho K_i^dag`.
pub fn apply_channel(k: &[Mat], rho: &Mat) -> Result<Mat> {
    let (rows, cols) = check_kraus(k)?;
    if rho.dim() != (cols, cols) {
        return Err(Error::DimensionMismatch(format!(
            "channel input space has dimension {cols}, got operator of shape {:?}",
            rho.dim()
        )));
    }
    let mut out = Mat::zeros((rows, rows));
    for ki in k {
        out = out + ki.dot(rho).dot(&dag(ki));
    }
    Ok(out)
}

/// Applies the channel to the subsystem `sys` (1-based) of a state on
/// subsystems with the given dimensions, tensoring each Kraus operator with
/// identities elsewhere.
pub fn apply_channel_local(k: &[Mat], rho: &Mat, sys: usize, dims: &[usize]) -> Result<Mat> {
    let (_, cols) = check_kraus(k)?;
    crate::tensor::check_sys(&[sys], dims.len())?;
    if dims[sys - 1] != cols {
        return Err(Error::DimensionMismatch(format!(
            "subsystem {sys} has dimension {} but the channel input space has dimension {cols}",
            dims[sys - 1]
        )));
    }
    let mut out: Option<Mat> = None;
    for ki in k {
        let mut embedded = Mat::ones((1, 1));
        for (j, &d) in dims.iter().enumerate() {
            if j + 1 == sys {
                embedded = kron(&embedded, ki);
            } else {
                embedded = kron(&embedded, &Mat::eye(d));
            }
        }
        let term = embedded.dot(rho).dot(&dag(&embedded));
        out = Some(match out {
            Some(acc) => acc + term,
            None => term,
        });
    }
    out.ok_or_else(|| Error::IllDefined("empty Kraus set".into()))
}

/// The Choi representation `J = (I ⊗ N)(|Γ><Γ|)` of the channel, with
/// `dim_a` the dimension of the input space.
pub fn choi_representation(k: &[Mat], dim_a: usize) -> Result<Mat> {
    let gamma = max_entangled_state(dim_a, false)?;
    apply_channel_local(k, &gamma, 2, &[dim_a, dim_a])
}

/// The natural representation `N = sum_i K_i ⊗ conj(K_i)`, acting on
/// row-major vectorizations: `vec(N(rho)) = N vec(rho)`.
pub fn natural_representation(k: &[Mat]) -> Result<Mat> {
    let (rows, cols) = check_kraus(k)?;
    let mut out = Mat::zeros((rows * rows, cols * cols));
    for ki in k {
        out = out + kron(ki, &ki.mapv(|v| v.conj()));
    }
    Ok(out)
}

/// Converts a Choi representation into the natural representation by the
/// fixed index reshuffle `reshape -> transpose(0,2,1,3) -> reshape -> T`.
pub fn choi_to_natural(c_ab: &Mat, dim_a: usize, dim_b: usize) -> Result<Mat> {
    if c_ab.dim() != (dim_a * dim_b, dim_a * dim_b) {
        return Err(Error::DimensionMismatch(format!(
            "Choi matrix of shape {:?} does not match dimensions {dim_a} x {dim_b}",
            c_ab.dim()
        )));
    }
    let t = ndarray::ArrayD::from_shape_vec(
        ndarray::IxDyn(&[dim_a, dim_b, dim_a, dim_b]),
        c_ab.iter().cloned().collect(),
    )
    .expect("shape was validated against the Choi matrix size")
    .permuted_axes(vec![0, 2, 1, 3].as_slice());
    let flat: Vec<C64> = t.iter().cloned().collect();
    let reshaped = Mat::from_shape_vec((dim_a * dim_a, dim_b * dim_b), flat)
        .expect("axis permutations preserve the element count");
    Ok(reshaped.t().to_owned())
}

/// Extracts a Kraus set from a Choi representation by eigendecomposition.
///
/// Falls back to Gram-Schmidt re-orthogonalization if the eigenvector
/// matrix returned by the backend is not unitary to within `tol`. Fails if
/// the Choi matrix has an eigenvalue below `-tol` (the map is not
/// completely positive).
pub fn kraus_representation(j: &Mat, dim_a: usize, dim_b: usize, tol: f64) -> Result<Vec<Mat>> {
    let n = dim_a * dim_b;
    if j.dim() != (n, n) {
        return Err(Error::DimensionMismatch(format!(
            "Choi matrix of shape {:?} does not match dimensions {dim_a} x {dim_b}",
            j.dim()
        )));
    }
    let (w, mut u) = eigh(j)?;
    let unitary = allclose(&u.dot(&dag(&u)), &Mat::eye(n), tol.max(1e-8))
        && allclose(&dag(&u).dot(&u), &Mat::eye(n), tol.max(1e-8));
    if !unitary {
        let columns: Vec<Mat> = (0..n)
            .map(|i| u.column(i).insert_axis(ndarray::Axis(1)).to_owned())
            .collect();
        let ortho = gram_schmidt(&columns, true)?;
        for (i, col) in ortho.iter().enumerate() {
            u.column_mut(i).assign(&col.column(0));
        }
    }

    let mut kraus = Vec::with_capacity(n);
    for (i, &wi) in w.iter().enumerate() {
        if wi < -tol {
            return Err(Error::IllDefined(format!(
                "Choi matrix has negative eigenvalue {wi}; the map is not completely positive"
            )));
        }
        let scale = C64::new(wi.max(0.0).sqrt(), 0.0);
        let col = u.column(i);
        let ki = Mat::from_shape_fn((dim_b, dim_a), |(b, a)| scale * col[a * dim_b + b]);
        kraus.push(ki);
    }
    Ok(kraus)
}

/// The isometric extension `V = sum_i K_i ⊗ |i>_E` of the channel, with an
/// environment of dimension equal to the number of Kraus operators.
pub fn channel_isometry(k: &[Mat]) -> Result<Mat> {
    let (rows, cols) = check_kraus(k)?;
    let dim_e = k.len();
    let mut v = Mat::zeros((rows * dim_e, cols));
    for (i, ki) in k.iter().enumerate() {
        v = v + kron(ki, &ket(dim_e, i)?);
    }
    Ok(v)
}

/// Extends the isometry of a square channel (`dim_a == dim_b`) to a full
/// unitary on system ⊗ environment, completing the basis with
/// Gram-Schmidt over random states.
pub fn channel_unitary_extension(k: &[Mat], rng: &mut impl rand::Rng) -> Result<Mat> {
    let (rows, cols) = check_kraus(k)?;
    if rows != cols {
        return Err(Error::DimensionMismatch(format!(
            "unitary extension requires a square channel, got {rows} x {cols}"
        )));
    }
    let dim_a = cols;
    let dim_e = k.len();
    let v = channel_isometry(k)?;

    let mut u = kron(&v, &dag(&ket(dim_e, 0)?));
    let mut states: Vec<Mat> = (0..dim_a)
        .map(|i| Ok(v.dot(&ket(dim_a, i)?)))
        .collect::<Result<_>>()?;
    for _ in 0..(dim_a * dim_e - dim_a) {
        states.push(random_state_vector(dim_a * dim_e, rng)?);
    }
    let completed = gram_schmidt(&states, true)?;

    let mut count = dim_a;
    for i in 0..dim_a {
        for j in 1..dim_e {
            let bra = kron(&dag(&ket(dim_a, i)?), &dag(&ket(dim_e, j)?));
            u = u + completed[count].dot(&bra);
            count += 1;
        }
    }
    Ok(u)
}

/// Kraus operators of the qubit Pauli channel
/// `rho -> pI rho + px X rho X + py Y rho Y + pz Z rho Z`.
pub fn pauli_channel(px: f64, py: f64, pz: f64) -> Result<Vec<Mat>> {
    let pi = 1.0 - px - py - pz;
    for (p, name) in [(px, "px"), (py, "py"), (pz, "pz"), (pi, "1-px-py-pz")] {
        check_probability(p, name)?;
    }
    Ok(vec![
        Mat::eye(2) * C64::new(pi.sqrt(), 0.0),
        pauli_x() * C64::new(px.sqrt(), 0.0),
        pauli_y() * C64::new(py.sqrt(), 0.0),
        pauli_z() * C64::new(pz.sqrt(), 0.0),
    ])
}

/// Kraus operators of the n-qubit Pauli channel with 4^n probabilities.
///
/// With `alt_repr`, the channel takes the form
/// `rho -> sum_{a,b} p_{a,b} X^a Z^b rho Z^b X^a` over n-bit strings `a`
/// and `b` (lexicographic over the pair), instead of running over
/// tensor products of `{I, X, Y, Z}`.
pub fn n_qubit_pauli_channel(n: usize, p: &[f64], alt_repr: bool) -> Result<Vec<Mat>> {
    let expected = 1usize << (2 * n);
    if p.len() != expected {
        return Err(Error::DimensionMismatch(format!(
            "{} probabilities given, expected {expected}",
            p.len()
        )));
    }
    let total: f64 = p.iter().sum();
    if p.iter().any(|&x| x < 0.0) || (total - 1.0).abs() > 1e-10 {
        return Err(Error::IllDefined(
            "Pauli channel probabilities must be non-negative and sum to one".into(),
        ));
    }

    let mut kraus = Vec::with_capacity(expected);
    if !alt_repr {
        for (i, ix) in (0..n)
            .map(|_| 0..4usize)
            .multi_cartesian_product()
            .enumerate()
        {
            kraus.push(n_qubit_pauli(&ix)? * C64::new(p[i].sqrt(), 0.0));
        }
    } else {
        let bitstrings: Vec<Vec<usize>> = (0..n)
            .map(|_| 0..2usize)
            .multi_cartesian_product()
            .collect();
        let mut count = 0;
        for a in &bitstrings {
            for b in &bitstrings {
                let op = n_qubit_pauli_x(a)?.dot(&n_qubit_pauli_z(b)?);
                kraus.push(op * C64::new(p[count].sqrt(), 0.0));
                count += 1;
            }
        }
    }
    Ok(kraus)
}

/// Coefficients `c_{a,b}` with `N(X^a Z^b) = c_{a,b} X^a Z^b` for a Pauli
/// channel, in lexicographic order over the bit-string pairs `(a, b)`.
pub fn pauli_channel_coeffs(k: &[Mat], n: usize) -> Result<Vec<C64>> {
    let norm = C64::new(1.0 / (1 << n) as f64, 0.0);
    let bitstrings: Vec<Vec<usize>> = (0..n)
        .map(|_| 0..2usize)
        .multi_cartesian_product()
        .collect();
    let mut coeffs = Vec::with_capacity(bitstrings.len() * bitstrings.len());
    for a in &bitstrings {
        for b in &bitstrings {
            let g = n_qubit_pauli_x(a)?.dot(&n_qubit_pauli_z(b)?);
            let image = apply_channel(k, &g)?;
            coeffs.push(norm * trace(&dag(&g).dot(&image)));
        }
    }
    Ok(coeffs)
}

/// The qubit depolarizing channel with `px = py = pz = p/3`.
pub fn depolarizing_channel(p: f64) -> Result<Vec<Mat>> {
    check_probability(p, "depolarizing probability")?;
    pauli_channel(p / 3.0, p / 3.0, p / 3.0)
}

/// The n-qubit depolarizing channel: probability `1 - p` of doing nothing
/// and `p/(4^n - 1)` for every non-identity Pauli.
pub fn n_qubit_depolarizing_channel(n: usize, p: f64) -> Result<Vec<Mat>> {
    check_probability(p, "depolarizing probability")?;
    let m = (1usize << (2 * n)) - 1;
    let mut probs = vec![p / m as f64; m + 1];
    probs[0] = 1.0 - p;
    n_qubit_pauli_channel(n, &probs, true)
}

/// Output of the depolarizing channel applied independently to the last `n`
/// of the `m` qubits of `rho`, computed through the partial-trace expansion
/// `N(rho) = (1 - 4p/3) rho + (4p/3) (I/2) ⊗ Tr_i[rho]` per site.
pub fn depolarizing_channel_n_uses(p: f64, n: usize, rho: &Mat, m: usize) -> Result<Mat> {
    check_probability(p, "depolarizing probability")?;
    if n > m {
        return Err(Error::DimensionMismatch(format!(
            "cannot act on {n} of {m} qubits"
        )));
    }
    let dims = vec![2usize; m];
    let dim = 1usize << m;
    if rho.dim() != (dim, dim) {
        return Err(Error::DimensionMismatch(format!(
            "state of shape {:?} is not an {m}-qubit operator",
            rho.dim()
        )));
    }
    let q = 4.0 * p / 3.0;

    let mut rho_out = Mat::zeros((dim, dim));
    for k in 0..=n {
        for combo in (1..=n).combinations(k) {
            let index: Vec<usize> = combo.iter().map(|i| i + (m - n)).collect();
            let rest: Vec<usize> = (1..=m).filter(|i| !index.contains(i)).collect();
            let mut arrange = index.clone();
            arrange.extend(&rest);
            let rearrange = crate::tensor::inverse_permutation(&arrange);

            let mix = Mat::eye(1 << k) / C64::new((1 << k) as f64, 0.0);
            let rho_part = partial_trace(rho, &index, &dims)?;
            let weight = q.powi(k as i32) * (1.0 - q).powi((n - k) as i32);
            let term = syspermute(&tensor(&[&mix, &rho_part]), &rearrange, &dims)?;
            rho_out = rho_out + term * C64::new(weight, 0.0);
        }
    }
    Ok(rho_out)
}

/// The bit flip channel `rho -> (1-p) rho + p X rho X`.
pub fn bit_flip_channel(p: f64) -> Result<Vec<Mat>> {
    pauli_channel(p, 0.0, 0.0)
}

/// The qubit dephasing channel `rho -> (1-p) rho + p Z rho Z`.
pub fn dephasing_channel(p: f64) -> Result<Vec<Mat>> {
    pauli_channel(0.0, 0.0, p)
}

/// The qudit dephasing channel built from the diagonal su(d) generators,
/// with `d` weights `p`.
pub fn dephasing_channel_qudit(p: &[f64], d: usize) -> Result<Vec<Mat>> {
    if p.len() != d {
        return Err(Error::DimensionMismatch(format!(
            "{} weights given for dimension {d}",
            p.len()
        )));
    }
    for &x in p {
        check_probability(x, "dephasing weight")?;
    }
    let gens = crate::su::su_generators(d)?;
    let diagonal = &gens[d * d - (d - 1)..d * d];
    let mut kraus = Vec::with_capacity(d);
    kraus.push(Mat::eye(d) * C64::new(p[0].sqrt(), 0.0));
    for k in 1..d {
        kraus.push(&diagonal[k - 1] * C64::new(p[k].sqrt(), 0.0));
    }
    Ok(kraus)
}

/// The completely dephasing channel in dimension `d`, which removes all
/// off-diagonal matrix elements in the standard basis.
pub fn completely_dephasing_channel(d: usize) -> Result<Vec<Mat>> {
    if d == 2 {
        dephasing_channel(0.5)
    } else {
        dephasing_channel_qudit(&vec![1.0 / d as f64; d], d)
    }
}

/// The phase damping channel with parameter `p`.
pub fn phase_damping_channel(p: f64) -> Result<Vec<Mat>> {
    check_probability(p, "phase damping parameter")?;
    let mut k1 = Mat::eye(2);
    k1[(1, 1)] = C64::new(p.sqrt(), 0.0);
    let mut k2 = Mat::zeros((2, 2));
    k2[(1, 1)] = C64::new((1.0 - p).sqrt(), 0.0);
    Ok(vec![k1, k2])
}

/// The amplitude damping channel with decay probability `gamma`.
pub fn amplitude_damping_channel(gamma: f64) -> Result<Vec<Mat>> {
    check_probability(gamma, "damping parameter")?;
    let mut a1 = Mat::eye(2);
    a1[(1, 1)] = C64::new((1.0 - gamma).sqrt(), 0.0);
    let mut a2 = Mat::zeros((2, 2));
    a2[(0, 1)] = C64::new(gamma.sqrt(), 0.0);
    Ok(vec![a1, a2])
}

/// The generalized amplitude damping channel with decay `gamma` and thermal
/// parameter `n`.
pub fn generalized_amplitude_damping_channel(gamma: f64, n: f64) -> Result<Vec<Mat>> {
    check_probability(gamma, "damping parameter")?;
    check_probability(n, "thermal parameter")?;
    if n == 0.0 {
        return amplitude_damping_channel(gamma);
    }
    if n == 1.0 {
        let mut a1 = Mat::eye(2);
        a1[(0, 0)] = C64::new((1.0 - gamma).sqrt(), 0.0);
        let mut a2 = Mat::zeros((2, 2));
        a2[(1, 0)] = C64::new(gamma.sqrt(), 0.0);
        return Ok(vec![a1, a2]);
    }
    let cool = C64::new((1.0 - n).sqrt(), 0.0);
    let hot = C64::new(n.sqrt(), 0.0);
    let mut a1 = Mat::eye(2);
    a1[(1, 1)] = C64::new((1.0 - gamma).sqrt(), 0.0);
    let mut a2 = Mat::zeros((2, 2));
    a2[(0, 1)] = C64::new(gamma.sqrt(), 0.0);
    let mut a3 = Mat::eye(2);
    a3[(0, 0)] = C64::new((1.0 - gamma).sqrt(), 0.0);
    let mut a4 = Mat::zeros((2, 2));
    a4[(1, 0)] = C64::new(gamma.sqrt(), 0.0);
    Ok(vec![a1 * cool, a2 * cool, a3 * hot, a4 * hot])
}

/// The BB84 channel with quantum bit error rate `q`: equal and independent
/// X and Z errors.
pub fn bb84_channel(q: f64) -> Result<Vec<Mat>> {
    check_probability(q, "QBER")?;
    pauli_channel(q - q * q, q * q, q - q * q)
}

/// Kraus set of the composition of the given channels, applied first to
/// last.
pub fn compose_channels(channels: &[Vec<Mat>]) -> Result<Vec<Mat>> {
    if channels.is_empty() {
        return Err(Error::IllDefined("no channels to compose".into()));
    }
    for c in channels {
        check_kraus(c)?;
    }
    let combos = channels
        .iter()
        .map(|c| 0..c.len())
        .multi_cartesian_product();
    let mut out = Vec::new();
    for combo in combos {
        let mut op: Option<Mat> = None;
        for (i, &j) in combo.iter().enumerate() {
            op = Some(match op {
                Some(acc) => channels[i][j].dot(&acc),
                None => channels[i][j].clone(),
            });
        }
        out.push(op.expect("combo is non-empty"));
    }
    Ok(out)
}

/// Kraus set of the tensor product of the given channels.
pub fn tensor_channels(channels: &[Vec<Mat>]) -> Result<Vec<Mat>> {
    if channels.is_empty() {
        return Err(Error::IllDefined("no channels to tensor".into()));
    }
    for c in channels {
        check_kraus(c)?;
    }
    let combos = channels
        .iter()
        .map(|c| 0..c.len())
        .multi_cartesian_product();
    let mut out = Vec::new();
    for combo in combos {
        let mut op = Mat::ones((1, 1));
        for (i, &j) in combo.iter().enumerate() {
            op = kron(&op, &channels[i][j]);
        }
        out.push(op);
    }
    Ok(out)
}

/// Kraus set of the n-fold tensor power of the channel.
pub fn n_channel_uses(k: &[Mat], n: usize) -> Result<Vec<Mat>> {
    check_kraus(k)?;
    tensor_channels(&vec![k.to_vec(); n])
}

/// Scales the channel by a non-negative scalar `x` (each Kraus operator by
/// `sqrt(x)`).
pub fn channel_scalar_multiply(k: &[Mat], x: f64) -> Result<Vec<Mat>> {
    check_kraus(k)?;
    if x < 0.0 {
        return Err(Error::IllDefined(format!(
            "channel scale factor {x} must be non-negative"
        )));
    }
    let s = C64::new(x.sqrt(), 0.0);
    Ok(k.iter().map(|ki| ki * s).collect())
}

/// The diamond (completely bounded trace) norm of the superoperator with
/// Choi representation `j`, via the Watrous SDP.
///
/// `j` uses this crate's convention `J = (I ⊗ N)(|Γ><Γ|)`; it is permuted
/// internally to the `(N ⊗ I)` convention the SDP is written in.
pub fn diamond_norm(j: &Mat, dim_a: usize, dim_b: usize, eps: f64) -> Result<f64> {
    if j.dim() != (dim_a * dim_b, dim_a * dim_b) {
        return Err(Error::DimensionMismatch(format!(
            "Choi matrix of shape {:?} does not match dimensions {dim_a} x {dim_b}",
            j.dim()
        )));
    }
    let jp = syspermute(j, &[2, 1], &[dim_a, dim_b])?;
    let n = dim_a * dim_b;

    let k00 = ket(2, 0)?.dot(&dag(&ket(2, 0)?));
    let k01 = ket(2, 0)?.dot(&dag(&ket(2, 1)?));
    let k10 = ket(2, 1)?.dot(&dag(&ket(2, 0)?));
    let k11 = ket(2, 1)?.dot(&dag(&ket(2, 1)?));

    let mut sdp = SdpBuilder::new();
    let x = sdp.complex_var(n, n);
    let rho0 = sdp.hermitian_var(dim_a);
    let rho1 = sdp.hermitian_var(dim_a);

    sdp.psd(&rho0);
    sdp.psd(&rho1);
    sdp.eq_scalar(&rho0.trace(), 1.0);
    sdp.eq_scalar(&rho1.trace(), 1.0);

    let block0 = rho0.kron_left(&Mat::eye(dim_b)).kron_left(&k00);
    let block1 = rho1.kron_left(&Mat::eye(dim_b)).kron_left(&k11);
    let m = &(&block0 + &x.kron_left(&k01)) + &(&x.adjoint().kron_left(&k10) + &block1);
    sdp.psd(&m);

    sdp.maximize(&x.inner_with(&jp));
    Ok(sdp.solve(eps)?.value)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::linalg::kron;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    use crate::states::random_density_matrix;

    fn counting_matrix(n: usize) -> Mat {
        Mat::from_shape_fn((n, n), |(i, j)| C64::new((i * n + j + 1) as f64, 0.0))
    }

    fn kraus_complete(k: &[Mat], dim: usize) -> bool {
        let mut acc = Mat::zeros((dim, dim));
        for ki in k {
            acc = acc + dag(ki).dot(ki);
        }
        allclose(&acc, &Mat::eye(dim), 1e-10)
    }

    #[rstest]
    #[case(pauli_channel(0.1, 0.2, 0.3).unwrap())]
    #[case(depolarizing_channel(0.75).unwrap())]
    #[case(amplitude_damping_channel(0.4).unwrap())]
    #[case(generalized_amplitude_damping_channel(0.4, 0.3).unwrap())]
    #[case(phase_damping_channel(0.2).unwrap())]
    #[case(bb84_channel(0.1).unwrap())]
    #[case(completely_dephasing_channel(2).unwrap())]
    fn standard_channels_are_trace_preserving(#[case] k: Vec<Mat>) {
        assert!(kraus_complete(&k, 2));
        let mut rng = StdRng::seed_from_u64(9);
        let rho = random_density_matrix(2, None, &mut rng).unwrap();
        let out = apply_channel(&k, &rho).unwrap();
        assert_abs_diff_eq!(trace(&out).re, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn pauli_channel_rejects_bad_probabilities() {
        assert!(pauli_channel(0.6, 0.6, 0.0).is_err());
        assert!(pauli_channel(-0.1, 0.0, 0.0).is_err());
    }

    #[test]
    fn choi_to_natural_counting() {
        let x = counting_matrix(4);
        let got = choi_to_natural(&x, 2, 2).unwrap();
        let expected = [
            [1.0, 3.0, 9.0, 11.0],
            [2.0, 4.0, 10.0, 12.0],
            [5.0, 7.0, 13.0, 15.0],
            [6.0, 8.0, 14.0, 16.0],
        ];
        for i in 0..4 {
            for j in 0..4 {
                assert_abs_diff_eq!(got[(i, j)].re, expected[i][j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn natural_representation_acts_on_vec() {
        let k = amplitude_damping_channel(0.3).unwrap();
        let nat = natural_representation(&k).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let rho = random_density_matrix(2, None, &mut rng).unwrap();
        let out = apply_channel(&k, &rho).unwrap();

        // Row-major vectorization.
        let vec_rho = Mat::from_shape_vec((4, 1), rho.iter().cloned().collect()).unwrap();
        let vec_out = Mat::from_shape_vec((4, 1), out.iter().cloned().collect()).unwrap();
        assert!(allclose(&nat.dot(&vec_rho), &vec_out, 1e-10));
    }

    #[test]
    fn choi_and_natural_agree() {
        let k = pauli_channel(0.1, 0.0, 0.25).unwrap();
        let j = choi_representation(&k, 2).unwrap();
        let from_choi = choi_to_natural(&j, 2, 2).unwrap();
        let direct = natural_representation(&k).unwrap();
        assert!(allclose(&from_choi, &direct, 1e-10));
    }

    #[test]
    fn kraus_roundtrip_through_choi() {
        let k = amplitude_damping_channel(0.35).unwrap();
        let j = choi_representation(&k, 2).unwrap();
        let k2 = kraus_representation(&j, 2, 2, 1e-10).unwrap();
        // The recovered operators can differ from the originals, but must
        // implement the same channel.
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..3 {
            let rho = random_density_matrix(2, None, &mut rng).unwrap();
            let a = apply_channel(&k, &rho).unwrap();
            let b = apply_channel(&k2, &rho).unwrap();
            assert!(allclose(&a, &b, 1e-9));
        }
    }

    #[test]
    fn local_application_leaves_other_system_alone() {
        let k = depolarizing_channel(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(23);
        let rho_a = random_density_matrix(2, None, &mut rng).unwrap();
        let rho_b = random_density_matrix(3, None, &mut rng).unwrap();
        let rho = kron(&rho_a, &rho_b);
        let out = apply_channel_local(&k, &rho, 1, &[2, 3]).unwrap();
        // Full depolarizing on A: output is I/2 ⊗ rho_B.
        let expected = kron(&crate::states::max_mixed_state(2), &rho_b);
        assert!(allclose(&out, &expected, 1e-9));
    }

    #[test]
    fn isometry_reproduces_channel() {
        let k = amplitude_damping_channel(0.2).unwrap();
        let v = channel_isometry(&k).unwrap();
        // V^dag V = I on the input space.
        assert!(allclose(&dag(&v).dot(&v), &Mat::eye(2), 1e-10));
        let mut rng = StdRng::seed_from_u64(5);
        let rho = random_density_matrix(2, None, &mut rng).unwrap();
        let lifted = v.dot(&rho).dot(&dag(&v));
        let out = partial_trace(&lifted, &[2], &[2, 2]).unwrap();
        assert!(allclose(&out, &apply_channel(&k, &rho).unwrap(), 1e-10));
    }

    #[test]
    fn unitary_extension_is_unitary() {
        let k = amplitude_damping_channel(0.2).unwrap();
        let mut rng = StdRng::seed_from_u64(31);
        let u = channel_unitary_extension(&k, &mut rng).unwrap();
        let dim = u.nrows();
        assert_eq!(dim, 4);
        assert!(allclose(&u.dot(&dag(&u)), &Mat::eye(dim), 1e-9));
        assert!(allclose(&dag(&u).dot(&u), &Mat::eye(dim), 1e-9));
        // U agrees with V on |psi>|0>.
        let v = channel_isometry(&k).unwrap();
        let psi = crate::states::random_state_vector(2, &mut rng).unwrap();
        let inp = kron(&psi, &ket(2, 0).unwrap());
        assert!(allclose(&u.dot(&inp), &v.dot(&psi), 1e-9));
    }

    #[test]
    fn composition_and_tensoring() {
        let k1 = dephasing_channel(0.3).unwrap();
        let k2 = amplitude_damping_channel(0.5).unwrap();
        let composed = compose_channels(&[k1.clone(), k2.clone()]).unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        let rho = random_density_matrix(2, None, &mut rng).unwrap();
        let direct = apply_channel(&k2, &apply_channel(&k1, &rho).unwrap()).unwrap();
        assert!(allclose(&apply_channel(&composed, &rho).unwrap(), &direct, 1e-9));

        let prod = tensor_channels(&[k1.clone(), k2.clone()]).unwrap();
        assert!(kraus_complete(&prod, 4));
        let uses = n_channel_uses(&k1, 2).unwrap();
        assert!(kraus_complete(&uses, 4));
    }

    #[test]
    fn depolarizing_n_uses_matches_direct_application() {
        let p = 0.3;
        let k = depolarizing_channel(p).unwrap();
        let mut rng = StdRng::seed_from_u64(37);
        let rho = random_density_matrix(4, None, &mut rng).unwrap();
        // Apply to both qubits of a two-qubit state.
        let via_formula = depolarizing_channel_n_uses(p, 2, &rho, 2).unwrap();
        let both = tensor_channels(&[k.clone(), k.clone()]).unwrap();
        let direct = apply_channel(&both, &rho).unwrap();
        assert!(allclose(&via_formula, &direct, 1e-9));
    }

    #[test]
    fn pauli_coeffs_of_dephasing() {
        // Dephasing with probability p sends X -> (1-2p) X and fixes I, Z.
        let p = 0.25;
        let k = dephasing_channel(p).unwrap();
        let c = pauli_channel_coeffs(&k, 1).unwrap();
        // Order over (a, b): (0,0) -> I, (0,1) -> Z, (1,0) -> X, (1,1) -> XZ.
        assert_abs_diff_eq!(c[0].re, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(c[1].re, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(c[2].re, 1.0 - 2.0 * p, epsilon = 1e-10);
        assert_abs_diff_eq!(c[3].re, 1.0 - 2.0 * p, epsilon = 1e-10);
    }

    #[test]
    fn diamond_norm_of_identity_channel() {
        let id = vec![Mat::eye(2)];
        let j = choi_representation(&id, 2).unwrap();
        let value = diamond_norm(&j, 2, 2, 1e-8).unwrap();
        assert_abs_diff_eq!(value, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn diamond_norm_of_channel_difference() {
        // || id - Z . ||_diamond = 2 for the perfectly distinguishable pair.
        let id = vec![Mat::eye(2)];
        let zch = vec![pauli_z()];
        let j_id = choi_representation(&id, 2).unwrap();
        let j_z = choi_representation(&zch, 2).unwrap();
        let diff = &j_id - &j_z;
        let value = diamond_norm(&diff, 2, 2, 1e-8).unwrap();
        assert_abs_diff_eq!(value, 2.0, epsilon = 1e-4);
    }
}
