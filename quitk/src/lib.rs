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

pub mod channels;
pub mod clifford;
pub mod distance;
pub mod entropies;
pub mod error;
pub mod fidelity;
pub mod gates;
pub mod linalg;
pub mod pauli;
pub mod protocols;
pub mod sdp;
pub mod states;
pub mod su;
pub mod tensor;
pub mod weyl;

/// Default tolerance for equality-up-to-phase and support checks.
pub const DEFAULT_TOL: f64 = 1e-10;

/// Default accuracy requested from the SDP solver.
pub const DEFAULT_SDP_EPS: f64 = 1e-7;
