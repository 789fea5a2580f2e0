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

//! Fidelity measures between states and for channels: Uhlmann fidelity,
//! entanglement fidelity, and average channel fidelities.

use crate::channels::{apply_channel, choi_representation};
use crate::error::{Error, Result};
use crate::linalg::{dag, sqrtm_psd, trace, trace_norm};
use crate::states::max_entangled_state;
use crate::tensor::{C64, Mat, ket};

/// Uhlmann fidelity `F(rho, sigma) = || sqrt(rho) sqrt(sigma) ||_1^2`.
pub fn fidelity(rho: &Mat, sigma: &Mat) -> Result<f64> {
    if rho.dim() != sigma.dim() || rho.nrows() != rho.ncols() {
        return Err(Error::DimensionMismatch(format!(
            "fidelity expects square states of equal shape, got {:?} and {:?}",
            rho.dim(),
            sigma.dim()
        )));
    }
    let product = sqrtm_psd(rho)?.dot(&sqrtm_psd(sigma)?);
    Ok(trace_norm(&product)?.powi(2))
}

/// Entanglement fidelity of a state on two d-dimensional systems: overlap
/// `Tr[Phi^+ sigma]` with the maximally entangled state.
pub fn ent_fidelity(sigma: &Mat, d: usize) -> Result<f64> {
    let phi = max_entangled_state(d, true)?;
    if sigma.dim() != phi.dim() {
        return Err(Error::DimensionMismatch(format!(
            "state of shape {:?} is not on two {d}-dimensional systems",
            sigma.dim()
        )));
    }
    Ok(trace(&phi.dot(sigma)).re)
}

/// Entanglement fidelity of a channel: overlap of its normalized Choi
/// state with the maximally entangled state.
pub fn ent_fidelity_channel(k: &[Mat], d: usize) -> Result<f64> {
    let choi_state = choi_representation(k, d)? / C64::new(d as f64, 0.0);
    ent_fidelity(&choi_state, d)
}

/// Average fidelity of a channel over Haar-random pure inputs, via its
/// entanglement fidelity: `(d F_ent + 1) / (d + 1)`.
pub fn avg_fidelity(k: &[Mat], dim_a: usize) -> Result<f64> {
    let f_ent = ent_fidelity_channel(k, dim_a)?;
    Ok((dim_a as f64 * f_ent + 1.0) / (dim_a as f64 + 1.0))
}

/// Average fidelity of a qubit channel computed directly from the six
/// eigenstates of the Pauli operators.
pub fn avg_fidelity_qubit(k: &[Mat]) -> Result<f64> {
    let rt2 = C64::new(1.0 / f64::sqrt(2.0), 0.0);
    let k0 = ket(2, 0)?;
    let k1 = ket(2, 1)?;
    let states = [
        k0.clone(),
        k1.clone(),
        (&k0 + &k1) * rt2,
        (&k0 - &k1) * rt2,
        (&k0 + &(&k1 * C64::new(0.0, 1.0))) * rt2,
        (&k0 - &(&k1 * C64::new(0.0, 1.0))) * rt2,
    ];
    let mut f = 0.0;
    for psi in &states {
        let rho = psi.dot(&dag(psi));
        let out = apply_channel(k, &rho)?;
        f += trace(&rho.dot(&out)).re;
    }
    Ok(f / 6.0)
}
