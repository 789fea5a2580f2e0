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

//! The Clifford group: generators, breadth-first closure under
//! phase-equivalence, state 2-designs, and the one-qubit Clifford twirl.
//!
//! Group elements are deduplicated up to a global phase with
//! [`unitary_distance`] and a caller-supplied tolerance. Even for two
//! qubits the closure is large (11520 elements), so expect
//! [`generate_clifford_group`] to be slow beyond one qubit.

use crate::channels::apply_channel_local;
use crate::error::{Error, Result};
use crate::gates::{cnot_at, hadamard_at, rx, rx_at, ry, ry_at, rz, rz_at, s_at};
use crate::linalg::{dag, trace_distance_pure_states, unitary_distance};
use crate::tensor::{C64, Mat, ket};

use std::f64::consts::PI;

/// The 24 one-qubit Clifford unitaries, composed from X/Y/Z rotations.
pub fn one_qubit_clifford_group() -> Vec<Mat> {
    let h = PI / 2.0;
    vec![
        Mat::eye(2),
        rx(PI),
        rx(h),
        rx(-h),
        rz(PI),
        rx(PI).dot(&rz(PI)),
        rx(h).dot(&rz(PI)),
        rx(-h).dot(&rz(PI)),
        rz(h),
        ry(PI).dot(&rz(h)),
        ry(-h).dot(&rz(h)),
        ry(h).dot(&rz(h)),
        rz(-h),
        ry(PI).dot(&rz(-h)),
        ry(-h).dot(&rz(-h)),
        ry(h).dot(&rz(-h)),
        rz(-h).dot(&rx(h)).dot(&rz(h)),
        rz(h).dot(&rx(h)).dot(&rz(h)),
        rz(PI).dot(&rx(h)).dot(&rz(h)),
        rx(h).dot(&rz(h)),
        rz(h).dot(&rx(-h)).dot(&rz(h)),
        rz(-h).dot(&rx(-h)).dot(&rz(h)),
        rx(-h).dot(&rz(h)),
        rx(h).dot(&rz(-h)),
    ]
}

/// Generators of the n-qubit Clifford group: H and S on every qubit, plus
/// a CNOT for every ordered qubit pair `i < j`.
pub fn clifford_group_generators(n: usize) -> Result<Vec<Mat>> {
    if n == 0 {
        return Err(Error::DimensionMismatch(
            "Clifford group needs at least one qubit".into(),
        ));
    }
    let mut gens = Vec::new();
    if n == 1 {
        gens.push(hadamard_at(1, 1)?);
        gens.push(s_at(1, 1)?);
    } else {
        for i in 1..=n {
            gens.push(hadamard_at(i, n)?);
            gens.push(s_at(i, n)?);
            for j in (i + 1)..=n {
                gens.push(cnot_at(i, j, n)?);
            }
        }
    }
    Ok(gens)
}

fn in_list(list: &[Mat], elem: &Mat, tol: f64) -> Result<bool> {
    for u in list {
        if unitary_distance(u, elem)? < tol {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Generates the full n-qubit Clifford group by breadth-first closure of
/// the generators, deduplicating up to a global phase with tolerance `tol`.
pub fn generate_clifford_group(n: usize, tol: f64) -> Result<Vec<Mat>> {
    let gens = clifford_group_generators(n)?;
    let mut group = vec![Mat::eye(1 << n)];

    loop {
        let mut fresh: Vec<Mat> = Vec::new();
        for c in &group {
            for g in &gens {
                let t1 = c.dot(g);
                let t2 = c.dot(&dag(g));
                let same = unitary_distance(&t1, &t2)? < tol;
                for t in if same { vec![t1] } else { vec![t1, t2] } {
                    if !in_list(&group, &t, tol)? && !in_list(&fresh, &t, tol)? {
                        fresh.push(t);
                    }
                }
            }
        }
        if fresh.is_empty() {
            break;
        }
        group.extend(fresh);
        log::debug!("Clifford closure at {} elements", group.len());
    }
    Ok(group)
}

/// Builds a state 2-design from a set of n-qubit Clifford unitaries by
/// collecting the orbit of `|0...0>`, deduplicated with tolerance `tol`.
pub fn state_2design(group: &[Mat], n: usize, tol: f64) -> Result<Vec<Mat>> {
    let zero = ket(1 << n, 0)?;
    let mut states = vec![zero.clone()];
    for c in group {
        let candidate = c.dot(&zero);
        let mut seen = false;
        for s in &states {
            if trace_distance_pure_states(s, &candidate)?.abs() < tol {
                seen = true;
                break;
            }
        }
        if !seen {
            states.push(candidate);
        }
    }
    log::debug!("state 2-design with {} states", states.len());
    Ok(states)
}

/// Twirls the channel with Kraus set `k` by the one-qubit Clifford group on
/// subsystem `sys` of a register with the given dimensions:
///
/// `rho -> (1/24) sum_i C_i N(C_i^dag rho C_i) C_i^dag`.
///
/// Returns the twirled output for the input `rho` together with the 24
/// Clifford unitaries used.
pub fn clifford_twirl_one_qubit(
    k: &[Mat],
    rho: &Mat,
    sys: usize,
    dims: &[usize],
) -> Result<(Mat, Vec<Mat>)> {
    let total: usize = dims.iter().product();
    let n = total.trailing_zeros() as usize;
    if 1 << n != total || dims.iter().any(|&d| d != 2) {
        return Err(Error::DimensionMismatch(
            "one-qubit Clifford twirl expects a register of qubits".into(),
        ));
    }
    crate::tensor::check_sys(&[sys], dims.len())?;

    let h = PI / 2.0;
    let rxs = |t: f64| rx_at(sys, t, n);
    let rys = |t: f64| ry_at(sys, t, n);
    let rzs = |t: f64| rz_at(sys, t, n);
    let cliffords = vec![
        Mat::eye(total),
        rxs(PI)?,
        rxs(h)?,
        rxs(-h)?,
        rzs(PI)?,
        rxs(PI)?.dot(&rzs(PI)?),
        rxs(h)?.dot(&rzs(PI)?),
        rxs(-h)?.dot(&rzs(PI)?),
        rzs(h)?,
        rys(PI)?.dot(&rzs(h)?),
        rys(-h)?.dot(&rzs(h)?),
        rys(h)?.dot(&rzs(h)?),
        rzs(-h)?,
        rys(PI)?.dot(&rzs(-h)?),
        rys(-h)?.dot(&rzs(-h)?),
        rys(h)?.dot(&rzs(-h)?),
        rzs(-h)?.dot(&rxs(h)?).dot(&rzs(h)?),
        rzs(h)?.dot(&rxs(h)?).dot(&rzs(h)?),
        rzs(PI)?.dot(&rxs(h)?).dot(&rzs(h)?),
        rxs(h)?.dot(&rzs(h)?),
        rzs(h)?.dot(&rxs(-h)?).dot(&rzs(h)?),
        rzs(-h)?.dot(&rxs(-h)?).dot(&rzs(h)?),
        rxs(-h)?.dot(&rzs(h)?),
        rxs(h)?.dot(&rzs(-h)?),
    ];

    let weight = C64::new(1.0 / 24.0, 0.0);
    let mut twirled = Mat::zeros((total, total));
    for c in &cliffords {
        let conjugated = dag(c).dot(rho).dot(c);
        let out = apply_channel_local(k, &conjugated, sys, dims)?;
        twirled = twirled + c.dot(&out).dot(&dag(c)) * weight;
    }
    Ok((twirled, cliffords))
}
