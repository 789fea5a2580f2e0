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

//! Error type shared by all fallible operations in the crate.
//!
//! Every public function validates its dimension lists and subsystem indices
//! eagerly and reports problems through [`Error`] rather than letting shape
//! errors surface from deep inside an array operation.

/// Error type for quitk operations.
#[derive(Debug, Clone, derive_more::Display)]
pub enum Error {
    /// Declared subsystem dimensions are incompatible with the operator shape.
    #[display("dimension mismatch: {_0}")]
    DimensionMismatch(String),
    /// A subsystem index, basis index, digit, or permutation is out of range.
    #[display("invalid index: {_0}")]
    InvalidIndex(String),
    /// The requested quantity is not defined for the given input.
    ///
    /// Raised, for example, when a relative entropy is requested for states
    /// violating the support condition, or when a probability argument lies
    /// outside the simplex.
    #[display("ill-defined input: {_0}")]
    IllDefined(String),
    /// A numerical backend (SDP solver or eigensolver) failed.
    #[display("solver failure: {_0}")]
    Solver(String),
}

impl std::error::Error for Error {}

impl From<ndarray_linalg::error::LinalgError> for Error {
    fn from(e: ndarray_linalg::error::LinalgError) -> Error {
        Error::Solver(format!("linear algebra backend: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
