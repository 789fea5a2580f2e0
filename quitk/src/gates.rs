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

//! Qubit gates and their embeddings into registers: Bloch-sphere rotations,
//! Hadamard, phase, CNOT, and CZ, each placeable on named qubits of an
//! n-qubit system via the `_at` constructors.
//!
//! Embedding works by tensoring the gate with identities and permuting the
//! affected qubits into place, so qubit labels follow the same 1-based
//! convention as the rest of the tensor layer.

use ndarray::array;

use crate::error::{Error, Result};
use crate::tensor::{C64, Mat, check_sys, inverse_permutation, syspermute, tensor};

/// Rotation by angle `t` about the X axis of the Bloch sphere.
pub fn rx(t: f64) -> Mat {
    let c = C64::new((t / 2.0).cos(), 0.0);
    let s = C64::new(0.0, -(t / 2.0).sin());
    array![[c, s], [s, c]]
}

/// Rotation by angle `t` about the Y axis of the Bloch sphere.
pub fn ry(t: f64) -> Mat {
    let c = C64::new((t / 2.0).cos(), 0.0);
    let s = C64::new((t / 2.0).sin(), 0.0);
    array![[c, -s], [s, c]]
}

/// Rotation by angle `t` about the Z axis of the Bloch sphere.
pub fn rz(t: f64) -> Mat {
    let zero = C64::new(0.0, 0.0);
    array![
        [C64::from_polar(1.0, -t / 2.0), zero],
        [zero, C64::from_polar(1.0, t / 2.0)]
    ]
}

/// The Hadamard gate.
pub fn hadamard() -> Mat {
    let n = C64::new(1.0 / f64::sqrt(2.0), 0.0);
    array![[n, n], [n, -n]]
}

/// The phase gate `S = diag(1, i)`, one of the Clifford group generators.
pub fn s_gate() -> Mat {
    let zero = C64::new(0.0, 0.0);
    array![
        [C64::new(1.0, 0.0), zero],
        [zero, C64::new(0.0, 1.0)]
    ]
}

/// Embeds a one-qubit gate on qubit `i` of an n-qubit register.
fn embed_one(op: &Mat, i: usize, n: usize) -> Result<Mat> {
    check_sys(&[i], n)?;
    let mut arrange = vec![i];
    arrange.extend((1..=n).filter(|&j| j != i));
    let rearrange = inverse_permutation(&arrange);
    let padded = tensor(&[op, &Mat::eye(1 << (n - 1))]);
    syspermute(&padded, &rearrange, &vec![2; n])
}

/// Embeds a two-qubit gate on qubits `(i, j)` of an n-qubit register, with
/// `i` the first factor of the gate.
fn embed_two(op: &Mat, i: usize, j: usize, n: usize) -> Result<Mat> {
    check_sys(&[i, j], n)?;
    let mut arrange = vec![i, j];
    arrange.extend((1..=n).filter(|&k| k != i && k != j));
    let rearrange = inverse_permutation(&arrange);
    let padded = tensor(&[op, &Mat::eye(1 << (n - 2))]);
    syspermute(&padded, &rearrange, &vec![2; n])
}

/// X rotation by `t` on qubit `i` of `n`.
pub fn rx_at(i: usize, t: f64, n: usize) -> Result<Mat> {
    embed_one(&rx(t), i, n)
}

/// Y rotation by `t` on qubit `i` of `n`.
pub fn ry_at(i: usize, t: f64, n: usize) -> Result<Mat> {
    embed_one(&ry(t), i, n)
}

/// Z rotation by `t` on qubit `i` of `n`.
pub fn rz_at(i: usize, t: f64, n: usize) -> Result<Mat> {
    embed_one(&rz(t), i, n)
}

/// Hadamard on qubit `i` of `n`.
pub fn hadamard_at(i: usize, n: usize) -> Result<Mat> {
    embed_one(&hadamard(), i, n)
}

/// Phase gate on qubit `i` of `n`.
pub fn s_at(i: usize, n: usize) -> Result<Mat> {
    embed_one(&s_gate(), i, n)
}

/// CNOT with control `i` and target `j` on an n-qubit register.
pub fn cnot_at(i: usize, j: usize, n: usize) -> Result<Mat> {
    let x = crate::pauli::pauli_x();
    let p0 = projector(0)?;
    let p1 = projector(1)?;
    let cx = tensor(&[&p0, &Mat::eye(2)]) + tensor(&[&p1, &x]);
    embed_two(&cx, i, j, n)
}

/// CZ between qubits `i` and `j` on an n-qubit register.
pub fn cz_at(i: usize, j: usize, n: usize) -> Result<Mat> {
    let z = crate::pauli::pauli_z();
    let p0 = projector(0)?;
    let p1 = projector(1)?;
    let cz = tensor(&[&p0, &Mat::eye(2)]) + tensor(&[&p1, &z]);
    embed_two(&cz, i, j, n)
}

fn projector(b: usize) -> Result<Mat> {
    let k = crate::tensor::ket(2, b)?;
    Ok(k.dot(&crate::linalg::dag(&k)))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    use crate::linalg::{allclose, dag};
    use crate::pauli::{pauli_x, pauli_y, pauli_z};
    use crate::tensor::ket_list;

    #[test]
    fn rotations_are_unitary() {
        for t in [0.0, 0.3, PI / 2.0, PI] {
            for u in [rx(t), ry(t), rz(t)] {
                assert!(allclose(&u.dot(&dag(&u)), &Mat::eye(2), 1e-12));
            }
        }
    }

    #[test]
    fn pi_rotations_give_paulis_up_to_phase() {
        // exp(-i pi sigma/2) = -i sigma.
        let phase = C64::new(0.0, -1.0);
        assert!(allclose(&rx(PI), &(pauli_x() * phase), 1e-12));
        assert!(allclose(&ry(PI), &(pauli_y() * phase), 1e-12));
        assert!(allclose(&rz(PI), &(pauli_z() * phase), 1e-12));
    }

    #[test]
    fn hadamard_conjugates_x_to_z() {
        let h = hadamard();
        assert!(allclose(&h.dot(&pauli_x()).dot(&h), &pauli_z(), 1e-12));
        assert!(allclose(&h.dot(&h), &Mat::eye(2), 1e-12));
    }

    #[test]
    fn s_gate_squares_to_z() {
        let s = s_gate();
        assert!(allclose(&s.dot(&s), &pauli_z(), 1e-12));
    }

    #[test]
    fn cnot_on_basis_states() {
        let c = cnot_at(1, 2, 2).unwrap();
        let dims = [2, 2];
        for (inp, out) in [
            ([0, 0], [0, 0]),
            ([0, 1], [0, 1]),
            ([1, 0], [1, 1]),
            ([1, 1], [1, 0]),
        ] {
            let v = ket_list(&dims, &inp).unwrap();
            let w = ket_list(&dims, &out).unwrap();
            assert!(allclose(&c.dot(&v), &w, 1e-12));
        }
    }

    #[test]
    fn cnot_reversed_control() {
        // Control on qubit 2, target on qubit 1.
        let c = cnot_at(2, 1, 2).unwrap();
        let v = ket_list(&[2, 2], &[0, 1]).unwrap();
        let w = ket_list(&[2, 2], &[1, 1]).unwrap();
        assert!(allclose(&c.dot(&v), &w, 1e-12));
    }

    #[test]
    fn embedded_gate_acts_on_named_qubit() {
        let x1 = rx_at(2, PI, 3).unwrap();
        let v = ket_list(&[2, 2, 2], &[0, 0, 0]).unwrap();
        let expected = ket_list(&[2, 2, 2], &[0, 1, 0]).unwrap() * C64::new(0.0, -1.0);
        assert!(allclose(&x1.dot(&v), &expected, 1e-12));
    }

    #[test]
    fn cz_is_symmetric() {
        let a = cz_at(1, 3, 3).unwrap();
        let b = cz_at(3, 1, 3).unwrap();
        assert!(allclose(&a, &b, 1e-12));
    }
}
