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

//! Distance measures: the normalized trace distance between states (closed
//! form and SDP, primal and dual) and the normalized diamond distance
//! between channels.
//!
//! The SDP variants exist alongside the closed forms deliberately; their
//! agreement up to solver tolerance is a property the test suite leans on.

use crate::error::{Error, Result};
use crate::linalg::trace_norm;
use crate::sdp::{MatExpr, SdpBuilder};
use crate::tensor::{Mat, partial_trace};

fn check_pair(rho: &Mat, sigma: &Mat) -> Result<()> {
    if rho.dim() != sigma.dim() || rho.nrows() != rho.ncols() {
        return Err(Error::DimensionMismatch(format!(
            "expected square operators of equal shape, got {:?} and {:?}",
            rho.dim(),
            sigma.dim()
        )));
    }
    Ok(())
}

/// Normalized trace distance `(1/2) || rho - sigma ||_1`.
pub fn norm_trace_dist(rho: &Mat, sigma: &Mat) -> Result<f64> {
    check_pair(rho, sigma)?;
    Ok(0.5 * trace_norm(&(rho - sigma))?)
}

/// Normalized trace distance via SDP.
///
/// The primal maximizes `(1/2) Tr[(L1 - L2)(rho - sigma)]` over measurement
/// operators `0 ⪯ L1, L2 ⪯ I`; the dual minimizes `(1/2) Tr[Y1 + Y2]` over
/// PSD `Y1 ⪰ rho - sigma`, `Y2 ⪰ -(rho - sigma)`.
pub fn norm_trace_dist_sdp(rho: &Mat, sigma: &Mat, dual: bool, eps: f64) -> Result<f64> {
    check_pair(rho, sigma)?;
    let dim = rho.nrows();
    let diff = rho - sigma;

    if !dual {
        let mut sdp = SdpBuilder::new();
        let l1 = sdp.hermitian_var(dim);
        let l2 = sdp.hermitian_var(dim);
        let eye = MatExpr::constant(&Mat::eye(dim));
        sdp.psd(&l1);
        sdp.psd(&l2);
        sdp.psd(&(&eye - &l1));
        sdp.psd(&(&eye - &l2));
        let objective = (&l1 - &l2).inner_with(&crate::linalg::dag(&diff));
        sdp.maximize(&objective);
        Ok(0.5 * sdp.solve(eps)?.value)
    } else {
        let mut sdp = SdpBuilder::new();
        let y1 = sdp.hermitian_var(dim);
        let y2 = sdp.hermitian_var(dim);
        let dexpr = MatExpr::constant(&diff);
        sdp.psd(&y1);
        sdp.psd(&y2);
        sdp.psd(&(&y1 - &dexpr));
        sdp.psd(&(&y2 + &dexpr));
        sdp.minimize(&(&y1.trace() + &y2.trace()));
        Ok(0.5 * sdp.solve(eps)?.value)
    }
}

/// Normalized diamond distance between two channels given by their Choi
/// representations `J = (I ⊗ N)(|Γ><Γ|)` on `A ⊗ B`.
///
/// The primal maximizes `Re Tr[P (J1 - J2)]` over `0 ⪯ P ⪯ rho_A ⊗ I_B`
/// with `rho_A` a state; the dual minimizes `mu` over PSD `Z ⪰ J1 - J2`
/// with `Tr_B[Z] ⪯ mu I_A`.
pub fn norm_diamond_dist(
    j1: &Mat,
    j2: &Mat,
    dim_a: usize,
    dim_b: usize,
    dual: bool,
    eps: f64,
) -> Result<f64> {
    check_pair(j1, j2)?;
    let n = dim_a * dim_b;
    if j1.dim() != (n, n) {
        return Err(Error::DimensionMismatch(format!(
            "Choi matrices of shape {:?} do not match dimensions {dim_a} x {dim_b}",
            j1.dim()
        )));
    }
    let diff = j1 - j2;

    if !dual {
        let mut sdp = SdpBuilder::new();
        let rho = sdp.hermitian_var(dim_a);
        let p = sdp.hermitian_var(n);
        sdp.psd(&rho);
        sdp.psd(&p);
        sdp.eq_scalar(&rho.trace(), 1.0);
        // P ⪯ rho ⊗ I_B.
        sdp.psd(&(&rho.kron_right(&Mat::eye(dim_b)) - &p));
        sdp.maximize(&p.inner_with(&crate::linalg::dag(&diff)));
        Ok(sdp.solve(eps)?.value)
    } else {
        let mut sdp = SdpBuilder::new();
        let mu = sdp.scalar_var();
        let z = sdp.hermitian_var(n);
        sdp.psd(&z);
        sdp.psd(&(&z - &MatExpr::constant(&diff)));
        let z_a = z.try_map_linear(|m| partial_trace(m, &[2], &[dim_a, dim_b]))?;
        sdp.psd(&(&mu.times_matrix(&Mat::eye(dim_a)) - &z_a));
        sdp.minimize(&mu);
        Ok(sdp.solve(eps)?.value)
    }
}
