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

//! Entropic quantities: von Neumann and binary entropy, relative entropy
//! and its variance, the Petz and sandwiched Renyi families, mutual and
//! coherent information, Holevo information of an ensemble, and the
//! SDP-defined hypothesis-testing and max relative entropies.
//!
//! Everything is measured in bits (logarithms base 2). Quantities that are
//! only defined under a support condition (`supp(rho) ⊆ supp(sigma)`)
//! check it eagerly against the caller's tolerance and report
//! [`Error::IllDefined`] on violation.

use ndarray::linalg::kron;

use crate::error::{Error, Result};
use crate::linalg::{dag, eigh, funm_hermitian, trace};
use crate::sdp::{MatExpr, SdpBuilder};
use crate::tensor::{C64, Mat, partial_trace};

const LN2: f64 = std::f64::consts::LN_2;

fn check_state(rho: &Mat, what: &str) -> Result<()> {
    if rho.nrows() != rho.ncols() {
        return Err(Error::DimensionMismatch(format!(
            "{what} of shape {:?} is not square",
            rho.dim()
        )));
    }
    Ok(())
}

fn check_same_shape(rho: &Mat, sigma: &Mat) -> Result<()> {
    check_state(rho, "state")?;
    check_state(sigma, "state")?;
    if rho.dim() != sigma.dim() {
        return Err(Error::DimensionMismatch(format!(
            "states have different shapes {:?} and {:?}",
            rho.dim(),
            sigma.dim()
        )));
    }
    Ok(())
}

/// Verifies `supp(rho) ⊆ supp(sigma)` by checking that `rho` has no weight
/// on the eigenvectors of `sigma` with eigenvalue at most `tol`.
fn check_support(rho: &Mat, sigma_vals: &ndarray::Array1<f64>, sigma_vecs: &Mat, tol: f64) -> Result<()> {
    for (j, &mu) in sigma_vals.iter().enumerate() {
        if mu <= tol {
            let v = sigma_vecs.column(j).insert_axis(ndarray::Axis(1)).to_owned();
            let weight = trace(&dag(&v).dot(rho).dot(&v)).re;
            if weight > tol {
                return Err(Error::IllDefined(
                    "support of rho is not contained in the support of sigma".into(),
                ));
            }
        }
    }
    Ok(())
}

/// Von Neumann entropy `-Tr[rho log2 rho]` in bits.
pub fn entropy(rho: &Mat) -> Result<f64> {
    check_state(rho, "state")?;
    let (w, _) = eigh(rho)?;
    Ok(-w
        .iter()
        .filter(|&&l| l > 0.0)
        .map(|&l| l * l.log2())
        .sum::<f64>())
}

/// Binary entropy `-p log2 p - (1-p) log2 (1-p)` for `0 <= p <= 1`.
pub fn bin_entropy(p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::IllDefined(format!("{p} is not a probability")));
    }
    if p == 0.0 || p == 1.0 {
        return Ok(0.0);
    }
    Ok(-p * p.log2() - (1.0 - p) * (1.0 - p).log2())
}

/// Quantum relative entropy `Tr[rho (log2 rho - log2 sigma)]`, defined when
/// `supp(rho) ⊆ supp(sigma)` (checked against `tol`).
pub fn relative_entropy(rho: &Mat, sigma: &Mat, tol: f64) -> Result<f64> {
    check_same_shape(rho, sigma)?;
    let (lr, _) = eigh(rho)?;
    let (ls, vs) = eigh(sigma)?;
    check_support(rho, &ls, &vs, tol)?;

    let term1: f64 = lr
        .iter()
        .filter(|&&l| l > tol)
        .map(|&l| l * l.log2())
        .sum();
    let mut term2 = 0.0;
    for (j, &mu) in ls.iter().enumerate() {
        if mu > tol {
            let v = vs.column(j).insert_axis(ndarray::Axis(1)).to_owned();
            let weight = trace(&dag(&v).dot(rho).dot(&v)).re;
            term2 += weight * mu.log2();
        }
    }
    Ok(term1 - term2)
}

fn log2m_psd(x: &Mat, tol: f64) -> Result<Mat> {
    funm_hermitian(x, |l| {
        if l > tol {
            C64::new(l.ln() / LN2, 0.0)
        } else {
            C64::new(0.0, 0.0)
        }
    })
}

/// Relative entropy variance
/// `V(rho||sigma) = Tr[rho (log2 rho - log2 sigma)^2] - D(rho||sigma)^2`.
pub fn relative_entropy_variance(rho: &Mat, sigma: &Mat, tol: f64) -> Result<f64> {
    let d = relative_entropy(rho, sigma, tol)?;
    let l = log2m_psd(rho, tol)? - log2m_psd(sigma, tol)?;
    let v = trace(&rho.dot(&l).dot(&l)).re;
    Ok(v - d * d)
}

/// Petz-Renyi relative entropy
/// `(1/(alpha-1)) log2 Tr[rho^alpha sigma^(1-alpha)]` for `0 <= alpha < 1`.
pub fn petz_renyi_rel_ent(rho: &Mat, sigma: &Mat, alpha: f64, tol: f64) -> Result<f64> {
    check_same_shape(rho, sigma)?;
    if !(0.0..1.0).contains(&alpha) {
        return Err(Error::IllDefined(format!(
            "Petz-Renyi order {alpha} outside [0, 1)"
        )));
    }
    let rho_a = crate::linalg::frac_power_psd(rho, alpha, tol)?;
    let sigma_a = crate::linalg::frac_power_psd(sigma, 1.0 - alpha, tol)?;
    let q = trace(&rho_a.dot(&sigma_a)).re;
    Ok(q.log2() / (alpha - 1.0))
}

/// Sandwiched Renyi relative entropy
/// `(1/(alpha-1)) log2 Tr[(sigma^((1-alpha)/(2 alpha)) rho
/// sigma^((1-alpha)/(2 alpha)))^alpha]` for `alpha > 0`, `alpha != 1`.
///
/// For `alpha > 1` the negative power of `sigma` is taken on its support.
pub fn sandwiched_renyi_rel_ent(rho: &Mat, sigma: &Mat, alpha: f64, tol: f64) -> Result<f64> {
    check_same_shape(rho, sigma)?;
    if alpha <= 0.0 || (alpha - 1.0).abs() < 1e-12 {
        return Err(Error::IllDefined(format!(
            "sandwiched Renyi order {alpha} must be positive and different from 1"
        )));
    }
    let exponent = (1.0 - alpha) / (2.0 * alpha);
    let sigma_a = crate::linalg::frac_power_psd(sigma, exponent, tol)?;
    let inner = sigma_a.dot(rho).dot(&sigma_a);
    let (w, _) = eigh(&inner)?;
    let q: f64 = w
        .iter()
        .filter(|&&l| l > tol)
        .map(|&l| l.powf(alpha))
        .sum();
    Ok(q.log2() / (alpha - 1.0))
}

/// Mutual information `I(A;B) = D(rho_AB || rho_A ⊗ rho_B)`.
pub fn mutual_information(rho_ab: &Mat, dim_a: usize, dim_b: usize, tol: f64) -> Result<f64> {
    let rho_a = partial_trace(rho_ab, &[2], &[dim_a, dim_b])?;
    let rho_b = partial_trace(rho_ab, &[1], &[dim_a, dim_b])?;
    relative_entropy(rho_ab, &kron(&rho_a, &rho_b), tol)
}

/// Petz-Renyi mutual information of a bipartite state, in the
/// non-optimized form `D_alpha(rho_AB || rho_A ⊗ rho_B)`.
pub fn petz_renyi_mut_inf(
    rho_ab: &Mat,
    dim_a: usize,
    dim_b: usize,
    alpha: f64,
    tol: f64,
) -> Result<f64> {
    let rho_a = partial_trace(rho_ab, &[2], &[dim_a, dim_b])?;
    let rho_b = partial_trace(rho_ab, &[1], &[dim_a, dim_b])?;
    petz_renyi_rel_ent(rho_ab, &kron(&rho_a, &rho_b), alpha, tol)
}

/// Sandwiched Renyi mutual information of a bipartite state, in the
/// non-optimized form `D_alpha(rho_AB || rho_A ⊗ rho_B)`.
pub fn sandwiched_renyi_mut_inf(
    rho_ab: &Mat,
    dim_a: usize,
    dim_b: usize,
    alpha: f64,
    tol: f64,
) -> Result<f64> {
    let rho_a = partial_trace(rho_ab, &[2], &[dim_a, dim_b])?;
    let rho_b = partial_trace(rho_ab, &[1], &[dim_a, dim_b])?;
    sandwiched_renyi_rel_ent(rho_ab, &kron(&rho_a, &rho_b), alpha, tol)
}

/// Coherent information `I_c(A>B) = H(B) - H(AB)` of a bipartite state;
/// with `reverse` set, the reverse coherent information `H(A) - H(AB)`.
pub fn coherent_inf_state(
    rho_ab: &Mat,
    dim_a: usize,
    dim_b: usize,
    reverse: bool,
) -> Result<f64> {
    let marginal = if reverse {
        partial_trace(rho_ab, &[2], &[dim_a, dim_b])?
    } else {
        partial_trace(rho_ab, &[1], &[dim_a, dim_b])?
    };
    Ok(entropy(&marginal)? - entropy(rho_ab)?)
}

/// Holevo information `H(sum_i p_i rho_i) - sum_i p_i H(rho_i)` of an
/// ensemble.
pub fn holevo_inf_ensemble(p: &[f64], states: &[Mat]) -> Result<f64> {
    if p.len() != states.len() {
        return Err(Error::DimensionMismatch(format!(
            "{} probabilities given for {} states",
            p.len(),
            states.len()
        )));
    }
    if states.is_empty() {
        return Err(Error::IllDefined("empty ensemble".into()));
    }
    if p.iter().any(|&x| x < 0.0) {
        return Err(Error::IllDefined("negative ensemble probability".into()));
    }
    let dim = states[0].nrows();
    let mut avg_state = Mat::zeros((dim, dim));
    let mut avg_entropy = 0.0;
    for (&pi, rho) in p.iter().zip(states) {
        check_same_shape(rho, &avg_state)?;
        avg_state = avg_state + rho * C64::new(pi, 0.0);
        avg_entropy += pi * entropy(rho)?;
    }
    Ok(entropy(&avg_state)? - avg_entropy)
}

/// The eps-hypothesis-testing quantity `beta_eps(rho||sigma)`: the smallest
/// `Tr[L sigma]` over measurement operators `0 ⪯ L ⪯ I` with
/// `Tr[L rho] >= 1 - eps`. The hypothesis-testing relative entropy is
/// `-log2` of this value.
///
/// Returns the optimal value together with the optimal primal operator `L`
/// (or the dual certificate `Z` when `dual` is set; primal and dual values
/// agree up to solver tolerance).
pub fn hypo_testing_rel_ent(
    rho: &Mat,
    sigma: &Mat,
    eps: f64,
    dual: bool,
    sdp_eps: f64,
) -> Result<(f64, Mat)> {
    check_same_shape(rho, sigma)?;
    if !(0.0..1.0).contains(&eps) {
        return Err(Error::IllDefined(format!(
            "smoothing parameter {eps} outside [0, 1)"
        )));
    }
    let dim = rho.nrows();

    if !dual {
        let mut sdp = SdpBuilder::new();
        let l = sdp.hermitian_var(dim);
        sdp.psd(&l);
        sdp.psd(&(&MatExpr::constant(&Mat::eye(dim)) - &l));
        sdp.ge_zero(
            &(&l.inner_with(&dag(rho)) - &crate::sdp::ScalarExpr::constant(1.0 - eps)),
        );
        sdp.minimize(&l.inner_with(&dag(sigma)));
        let sol = sdp.solve(sdp_eps)?;
        let operator = sol.value_of(&l);
        Ok((sol.value, operator))
    } else {
        let mut sdp = SdpBuilder::new();
        let z = sdp.hermitian_var(dim);
        let mu = sdp.scalar_var();
        sdp.psd(&z);
        sdp.ge_zero(&mu);
        // mu rho ⪯ sigma + Z.
        let slack = &(&MatExpr::constant(sigma) + &z) - &mu.times_matrix(rho);
        sdp.psd(&slack);
        let objective = &mu.scale(1.0 - eps) - &z.trace();
        sdp.maximize(&objective);
        let sol = sdp.solve(sdp_eps)?;
        let operator = sol.value_of(&z);
        Ok((sol.value, operator))
    }
}

/// Max-relative entropy `D_max(rho||sigma) = log2 min{t : rho ⪯ t sigma}`,
/// via SDP. Requires `supp(rho) ⊆ supp(sigma)`.
pub fn max_relative_entropy(rho: &Mat, sigma: &Mat, tol: f64, sdp_eps: f64) -> Result<f64> {
    check_same_shape(rho, sigma)?;
    let (ls, vs) = eigh(sigma)?;
    check_support(rho, &ls, &vs, tol)?;

    let mut sdp = SdpBuilder::new();
    let t = sdp.scalar_var();
    sdp.psd(&(&t.times_matrix(sigma) - &MatExpr::constant(rho)));
    sdp.minimize(&t);
    let sol = sdp.solve(sdp_eps)?;
    if sol.value <= 0.0 {
        return Err(Error::Solver(format!(
            "max-relative entropy SDP returned non-positive optimum {}",
            sol.value
        )));
    }
    Ok(sol.value.log2())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::linalg::allclose;
    use crate::states::{max_entangled_state, max_mixed_state, random_density_matrix};
    use crate::tensor::ket;

    const TOL: f64 = 1e-10;

    fn diagonal_state(probs: &[f64]) -> Mat {
        let mut rho = Mat::zeros((probs.len(), probs.len()));
        for (i, &p) in probs.iter().enumerate() {
            rho[(i, i)] = C64::new(p, 0.0);
        }
        rho
    }

    #[test]
    fn entropy_of_maximally_mixed_qubit_is_one_bit() {
        assert_abs_diff_eq!(entropy(&max_mixed_state(2)).unwrap(), 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(
            entropy(&max_mixed_state(4)).unwrap(),
            2.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn entropy_of_pure_state_is_zero() {
        let k = ket(3, 1).unwrap();
        let rho = k.dot(&dag(&k));
        assert_abs_diff_eq!(entropy(&rho).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn binary_entropy_values() {
        assert_abs_diff_eq!(bin_entropy(0.5).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bin_entropy(0.0).unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bin_entropy(1.0).unwrap(), 0.0, epsilon = 1e-12);
        assert!(bin_entropy(1.5).is_err());
    }

    #[test]
    fn relative_entropy_of_state_with_itself_is_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let rho = random_density_matrix(3, None, &mut rng).unwrap();
        assert_abs_diff_eq!(
            relative_entropy(&rho, &rho, TOL).unwrap(),
            0.0,
            epsilon = 1e-8
        );
    }

    #[test]
    fn relative_entropy_matches_classical_kl() {
        let rho = diagonal_state(&[0.75, 0.25]);
        let sigma = diagonal_state(&[0.5, 0.5]);
        let expected = 0.75 * (0.75f64 / 0.5).log2() + 0.25 * (0.25f64 / 0.5).log2();
        assert_abs_diff_eq!(
            relative_entropy(&rho, &sigma, TOL).unwrap(),
            expected,
            epsilon = 1e-10
        );
    }

    #[test]
    fn relative_entropy_checks_support() {
        let rho = max_mixed_state(2);
        let k = ket(2, 0).unwrap();
        let sigma = k.dot(&dag(&k));
        assert!(matches!(
            relative_entropy(&rho, &sigma, TOL),
            Err(Error::IllDefined(_))
        ));
    }

    #[test]
    fn relative_entropy_variance_classical() {
        let rho = diagonal_state(&[0.75, 0.25]);
        let sigma = diagonal_state(&[0.5, 0.5]);
        let d = relative_entropy(&rho, &sigma, TOL).unwrap();
        let expected = 0.75 * (0.75f64 / 0.5).log2().powi(2)
            + 0.25 * (0.25f64 / 0.5).log2().powi(2)
            - d * d;
        assert_abs_diff_eq!(
            relative_entropy_variance(&rho, &sigma, TOL).unwrap(),
            expected,
            epsilon = 1e-10
        );
        let mut rng = StdRng::seed_from_u64(8);
        let tau = random_density_matrix(3, None, &mut rng).unwrap();
        assert_abs_diff_eq!(
            relative_entropy_variance(&tau, &tau, TOL).unwrap(),
            0.0,
            epsilon = 1e-8
        );
    }

    #[test]
    fn renyi_families_match_classical_formulas() {
        let p = [0.7, 0.3];
        let q = [0.4, 0.6];
        let rho = diagonal_state(&p);
        let sigma = diagonal_state(&q);
        for alpha in [0.3, 0.5, 0.9] {
            let classical: f64 = (0..2).map(|i| p[i].powf(alpha) * q[i].powf(1.0 - alpha)).sum();
            let expected = classical.log2() / (alpha - 1.0);
            assert_abs_diff_eq!(
                petz_renyi_rel_ent(&rho, &sigma, alpha, TOL).unwrap(),
                expected,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                sandwiched_renyi_rel_ent(&rho, &sigma, alpha, TOL).unwrap(),
                expected,
                epsilon = 1e-9
            );
        }
        // alpha > 1 is allowed for the sandwiched family.
        let alpha = 2.0;
        let classical: f64 = (0..2).map(|i| p[i].powf(alpha) * q[i].powf(1.0 - alpha)).sum();
        assert_abs_diff_eq!(
            sandwiched_renyi_rel_ent(&rho, &sigma, alpha, TOL).unwrap(),
            classical.log2() / (alpha - 1.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn renyi_rejects_bad_order() {
        let rho = max_mixed_state(2);
        assert!(petz_renyi_rel_ent(&rho, &rho, 1.0, TOL).is_err());
        assert!(sandwiched_renyi_rel_ent(&rho, &rho, 1.0, TOL).is_err());
        assert!(sandwiched_renyi_rel_ent(&rho, &rho, -0.5, TOL).is_err());
    }

    #[test]
    fn mutual_information_of_product_state_is_zero() {
        let mut rng = StdRng::seed_from_u64(21);
        let a = random_density_matrix(2, None, &mut rng).unwrap();
        let b = random_density_matrix(3, None, &mut rng).unwrap();
        let rho = kron(&a, &b);
        assert_abs_diff_eq!(
            mutual_information(&rho, 2, 3, TOL).unwrap(),
            0.0,
            epsilon = 1e-7
        );
    }

    #[test]
    fn mutual_information_of_bell_state() {
        let rho = max_entangled_state(2, true).unwrap();
        assert_abs_diff_eq!(
            mutual_information(&rho, 2, 2, TOL).unwrap(),
            2.0,
            epsilon = 1e-7
        );
    }

    #[test]
    fn coherent_information_of_bell_state() {
        let rho = max_entangled_state(2, true).unwrap();
        assert_abs_diff_eq!(
            coherent_inf_state(&rho, 2, 2, false).unwrap(),
            1.0,
            epsilon = 1e-8
        );
        assert_abs_diff_eq!(
            coherent_inf_state(&rho, 2, 2, true).unwrap(),
            1.0,
            epsilon = 1e-8
        );
    }

    #[test]
    fn holevo_information_of_orthogonal_ensemble() {
        let k0 = ket(2, 0).unwrap();
        let k1 = ket(2, 1).unwrap();
        let states = [k0.dot(&dag(&k0)), k1.dot(&dag(&k1))];
        let chi = holevo_inf_ensemble(&[0.5, 0.5], &states).unwrap();
        assert_abs_diff_eq!(chi, 1.0, epsilon = 1e-10);
        let same = holevo_inf_ensemble(&[0.5, 0.5], &[states[0].clone(), states[0].clone()])
            .unwrap();
        assert_abs_diff_eq!(same, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn hypo_testing_identical_states() {
        // For rho == sigma the optimum is exactly 1 - eps.
        let rho = max_mixed_state(2);
        let eps = 0.25;
        let (primal, l) = hypo_testing_rel_ent(&rho, &rho, eps, false, 1e-8).unwrap();
        assert_abs_diff_eq!(primal, 1.0 - eps, epsilon = 1e-5);
        assert_eq!(l.dim(), (2, 2));
        let (dual, _) = hypo_testing_rel_ent(&rho, &rho, eps, true, 1e-8).unwrap();
        assert_abs_diff_eq!(primal, dual, epsilon = 1e-4);
    }

    #[test]
    fn hypo_testing_primal_dual_agreement() {
        let mut rng = StdRng::seed_from_u64(12);
        let rho = random_density_matrix(2, None, &mut rng).unwrap();
        let sigma = random_density_matrix(2, None, &mut rng).unwrap();
        let eps = 0.1;
        let (primal, _) = hypo_testing_rel_ent(&rho, &sigma, eps, false, 1e-8).unwrap();
        let (dual, _) = hypo_testing_rel_ent(&rho, &sigma, eps, true, 1e-8).unwrap();
        assert_abs_diff_eq!(primal, dual, epsilon = 1e-4);
    }

    #[test]
    fn max_relative_entropy_diagonal() {
        let rho = diagonal_state(&[0.75, 0.25]);
        let sigma = diagonal_state(&[0.5, 0.5]);
        // min t with rho <= t sigma is max_i p_i / q_i = 1.5.
        assert_abs_diff_eq!(
            max_relative_entropy(&rho, &sigma, TOL, 1e-8).unwrap(),
            1.5f64.log2(),
            epsilon = 1e-5
        );
        let mut rng = StdRng::seed_from_u64(19);
        let tau = random_density_matrix(3, None, &mut rng).unwrap();
        assert_abs_diff_eq!(
            max_relative_entropy(&tau, &tau, TOL, 1e-8).unwrap(),
            0.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn max_relative_entropy_checks_support() {
        let rho = max_mixed_state(2);
        let k = ket(2, 0).unwrap();
        let sigma = k.dot(&dag(&k));
        assert!(max_relative_entropy(&rho, &sigma, TOL, 1e-8).is_err());
    }
}
