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

//! Semidefinite-program formulation layer.
//!
//! The distance measures, discrimination tasks, and entropic quantities in
//! this crate are phrased as small SDPs over complex Hermitian matrix
//! variables. This module lowers such formulations to the real conic form
//! the clarabel solver accepts: a Hermitian linear matrix inequality
//! `E(x) ⪰ 0` becomes a PSD-triangle cone constraint on the real symmetric
//! embedding `[[Re E, -Im E], [Im E, Re E]]`.
//!
//! Variables are declared on an [`SdpBuilder`]; affine matrix expressions
//! ([`MatExpr`]) are combined with `+`/`-`, scaled, conjugate-transposed,
//! Kronecker-multiplied by constants, or mapped through any linear matrix
//! function (e.g. a partial trace). Objectives and scalar constraints use
//! the real part of trace expressions ([`ScalarExpr`]).

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{self, NonnegativeConeT, PSDTriangleConeT, ZeroConeT},
};
use ndarray::prelude::*;

use crate::error::{Error, Result};
use crate::linalg::dag;
use crate::tensor::{C64, Mat};

/// Affine matrix-valued expression `C + sum_k x_k B_k` in the real solver
/// variables `x`.
#[derive(Clone)]
pub struct MatExpr {
    constant: Mat,
    terms: Vec<(usize, Mat)>,
}

/// Affine scalar expression `c + sum_k a_k x_k`.
#[derive(Clone)]
pub struct ScalarExpr {
    constant: C64,
    terms: Vec<(usize, C64)>,
}

impl MatExpr {
    /// Wraps a constant matrix.
    pub fn constant(m: &Mat) -> MatExpr {
        MatExpr {
            constant: m.clone(),
            terms: Vec::new(),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.constant.dim()
    }

    /// Scales by a complex constant.
    pub fn scale(&self, s: C64) -> MatExpr {
        MatExpr {
            constant: &self.constant * s,
            terms: self.terms.iter().map(|(k, b)| (*k, b * s)).collect(),
        }
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> MatExpr {
        MatExpr {
            constant: dag(&self.constant),
            terms: self.terms.iter().map(|(k, b)| (*k, dag(b))).collect(),
        }
    }

    /// Kronecker product `c ⊗ self` with a constant on the left.
    pub fn kron_left(&self, c: &Mat) -> MatExpr {
        self.map_linear(|m| ndarray::linalg::kron(c, m))
    }

    /// Kronecker product `self ⊗ c` with a constant on the right.
    pub fn kron_right(&self, c: &Mat) -> MatExpr {
        self.map_linear(|m| ndarray::linalg::kron(m, c))
    }

    /// Applies an arbitrary linear matrix map to the expression by mapping
    /// its constant and every coefficient matrix.
    ///
    /// This is how structural operations from the tensor layer (partial
    /// trace, subsystem permutation) act on SDP variables.
    pub fn map_linear(&self, f: impl Fn(&Mat) -> Mat) -> MatExpr {
        MatExpr {
            constant: f(&self.constant),
            terms: self.terms.iter().map(|(k, b)| (*k, f(b))).collect(),
        }
    }

    /// Fallible version of [`MatExpr::map_linear`].
    pub fn try_map_linear(&self, f: impl Fn(&Mat) -> Result<Mat>) -> Result<MatExpr> {
        Ok(MatExpr {
            constant: f(&self.constant)?,
            terms: self
                .terms
                .iter()
                .map(|(k, b)| Ok((*k, f(b)?)))
                .collect::<Result<_>>()?,
        })
    }

    /// Trace as a scalar expression.
    pub fn trace(&self) -> ScalarExpr {
        ScalarExpr {
            constant: self.constant.diag().sum(),
            terms: self
                .terms
                .iter()
                .map(|(k, b)| (*k, b.diag().sum()))
                .collect(),
        }
    }

    /// `Re Tr[c^dag self]` as a scalar expression, for a constant `c`.
    pub fn inner_with(&self, c: &Mat) -> ScalarExpr {
        let cd = dag(c);
        ScalarExpr {
            constant: cd.dot(&self.constant).diag().sum(),
            terms: self
                .terms
                .iter()
                .map(|(k, b)| (*k, cd.dot(b).diag().sum()))
                .collect(),
        }
    }

    /// Coefficient matrices with duplicate variable indices summed.
    fn consolidated(&self) -> Vec<(usize, Mat)> {
        let mut out: Vec<(usize, Mat)> = Vec::new();
        for (k, b) in &self.terms {
            match out.iter_mut().find(|(k2, _)| k2 == k) {
                Some((_, acc)) => *acc += b,
                None => out.push((*k, b.clone())),
            }
        }
        out
    }
}

impl std::ops::Add for &MatExpr {
    type Output = MatExpr;
    fn add(self, rhs: &MatExpr) -> MatExpr {
        let mut terms = self.terms.clone();
        terms.extend(rhs.terms.iter().cloned());
        MatExpr {
            constant: &self.constant + &rhs.constant,
            terms,
        }
    }
}

impl std::ops::Sub for &MatExpr {
    type Output = MatExpr;
    fn sub(self, rhs: &MatExpr) -> MatExpr {
        self + &rhs.scale(C64::new(-1.0, 0.0))
    }
}

impl ScalarExpr {
    pub fn constant(c: f64) -> ScalarExpr {
        ScalarExpr {
            constant: C64::new(c, 0.0),
            terms: Vec::new(),
        }
    }

    pub fn scale(&self, s: f64) -> ScalarExpr {
        let sc = C64::new(s, 0.0);
        ScalarExpr {
            constant: self.constant * sc,
            terms: self.terms.iter().map(|(k, a)| (*k, a * sc)).collect(),
        }
    }

    /// Multiplies this scalar expression into a constant matrix, giving the
    /// matrix expression `self * m`.
    pub fn times_matrix(&self, m: &Mat) -> MatExpr {
        MatExpr {
            constant: m * self.constant,
            terms: self.terms.iter().map(|(k, a)| (*k, m * *a)).collect(),
        }
    }

    fn consolidated(&self) -> Vec<(usize, C64)> {
        let mut out: Vec<(usize, C64)> = Vec::new();
        for (k, a) in &self.terms {
            match out.iter_mut().find(|(k2, _)| k2 == k) {
                Some((_, acc)) => *acc += a,
                None => out.push((*k, *a)),
            }
        }
        out
    }
}

impl std::ops::Add for &ScalarExpr {
    type Output = ScalarExpr;
    fn add(self, rhs: &ScalarExpr) -> ScalarExpr {
        let mut terms = self.terms.clone();
        terms.extend(rhs.terms.iter().cloned());
        ScalarExpr {
            constant: self.constant + rhs.constant,
            terms,
        }
    }
}

impl std::ops::Sub for &ScalarExpr {
    type Output = ScalarExpr;
    fn sub(self, rhs: &ScalarExpr) -> ScalarExpr {
        self + &rhs.scale(-1.0)
    }
}

type SparseRow = (Vec<(usize, f64)>, f64);

/// Incrementally built semidefinite program.
#[derive(Default)]
pub struct SdpBuilder {
    nvars: usize,
    zero_rows: Vec<SparseRow>,
    nonneg_rows: Vec<SparseRow>,
    psd_blocks: Vec<(usize, Vec<SparseRow>)>,
    objective: Vec<(usize, f64)>,
    obj_constant: f64,
    maximize: bool,
}

/// Optimal point returned by [`SdpBuilder::solve`].
pub struct Solution {
    /// Optimal objective value (in the original maximize/minimize sense).
    pub value: f64,
    x: Vec<f64>,
}

impl Solution {
    /// Evaluates a matrix expression at the optimal point.
    pub fn value_of(&self, e: &MatExpr) -> Mat {
        let mut out = e.constant.clone();
        for (k, b) in e.consolidated() {
            out = out + b * C64::new(self.x[k], 0.0);
        }
        out
    }

    /// Evaluates the real part of a scalar expression at the optimal point.
    pub fn scalar_value_of(&self, s: &ScalarExpr) -> f64 {
        let mut out = s.constant.re;
        for (k, a) in s.consolidated() {
            out += a.re * self.x[k];
        }
        out
    }
}

impl SdpBuilder {
    pub fn new() -> SdpBuilder {
        SdpBuilder::default()
    }

    fn fresh_var(&mut self) -> usize {
        let k = self.nvars;
        self.nvars += 1;
        k
    }

    /// Declares an `n x n` complex Hermitian matrix variable (n^2 real
    /// parameters).
    pub fn hermitian_var(&mut self, n: usize) -> MatExpr {
        let mut terms = Vec::with_capacity(n * n);
        for i in 0..n {
            let k = self.fresh_var();
            let mut b = Mat::zeros((n, n));
            b[(i, i)] = C64::new(1.0, 0.0);
            terms.push((k, b));
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let k_re = self.fresh_var();
                let mut b = Mat::zeros((n, n));
                b[(i, j)] = C64::new(1.0, 0.0);
                b[(j, i)] = C64::new(1.0, 0.0);
                terms.push((k_re, b));

                let k_im = self.fresh_var();
                let mut b = Mat::zeros((n, n));
                b[(i, j)] = C64::new(0.0, 1.0);
                b[(j, i)] = C64::new(0.0, -1.0);
                terms.push((k_im, b));
            }
        }
        MatExpr {
            constant: Mat::zeros((n, n)),
            terms,
        }
    }

    /// Declares a general complex matrix variable (2 rc real parameters).
    pub fn complex_var(&mut self, rows: usize, cols: usize) -> MatExpr {
        let mut terms = Vec::with_capacity(2 * rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                let k_re = self.fresh_var();
                let mut b = Mat::zeros((rows, cols));
                b[(i, j)] = C64::new(1.0, 0.0);
                terms.push((k_re, b));

                let k_im = self.fresh_var();
                let mut b = Mat::zeros((rows, cols));
                b[(i, j)] = C64::new(0.0, 1.0);
                terms.push((k_im, b));
            }
        }
        MatExpr {
            constant: Mat::zeros((rows, cols)),
            terms,
        }
    }

    /// Declares a real scalar variable.
    pub fn scalar_var(&mut self) -> ScalarExpr {
        let k = self.fresh_var();
        ScalarExpr {
            constant: C64::new(0.0, 0.0),
            terms: vec![(k, C64::new(1.0, 0.0))],
        }
    }

    /// Adds the linear matrix inequality `e ⪰ 0`. The expression must be
    /// Hermitian by construction.
    pub fn psd(&mut self, e: &MatExpr) {
        let (n, _cols) = e.dim();
        debug_assert_eq!(n, _cols, "LMI expressions must be square");
        let embed_dim = 2 * n;
        let mut rows: Vec<SparseRow> =
            vec![(Vec::new(), 0.0); embed_dim * (embed_dim + 1) / 2];

        let b_emb = svec(&real_embed(&hermitize(&e.constant)));
        for (r, row) in rows.iter_mut().enumerate() {
            row.1 = b_emb[r];
        }
        for (k, coeff) in e.consolidated() {
            let c_emb = svec(&real_embed(&hermitize(&coeff)));
            for (r, row) in rows.iter_mut().enumerate() {
                if c_emb[r] != 0.0 {
                    // s = b - A x must equal svec(E(x)), so A carries -B_k.
                    row.0.push((k, -c_emb[r]));
                }
            }
        }
        self.psd_blocks.push((embed_dim, rows));
    }

    /// Adds the constraint `e == 0` for a Hermitian expression.
    pub fn eq_zero(&mut self, e: &MatExpr) {
        let (n, _) = e.dim();
        let terms = e.consolidated();
        let mut push_row = |re_part: bool, i: usize, j: usize, sb: &mut SdpBuilder| {
            let pick = |m: &Mat| {
                if re_part {
                    m[(i, j)].re
                } else {
                    m[(i, j)].im
                }
            };
            let coeffs: Vec<(usize, f64)> = terms
                .iter()
                .filter_map(|(k, b)| {
                    let v = pick(b);
                    (v != 0.0).then_some((*k, v))
                })
                .collect();
            sb.zero_rows.push((coeffs, -pick(&e.constant)));
        };
        for i in 0..n {
            push_row(true, i, i, self);
            for j in (i + 1)..n {
                push_row(true, i, j, self);
                push_row(false, i, j, self);
            }
        }
    }

    /// Adds the scalar constraint `Re(s) >= 0`.
    pub fn ge_zero(&mut self, s: &ScalarExpr) {
        let coeffs: Vec<(usize, f64)> = s
            .consolidated()
            .into_iter()
            .map(|(k, a)| (k, -a.re))
            .collect();
        self.nonneg_rows.push((coeffs, s.constant.re));
    }

    /// Adds the scalar constraint `Re(s) == rhs`.
    pub fn eq_scalar(&mut self, s: &ScalarExpr, rhs: f64) {
        let coeffs: Vec<(usize, f64)> = s
            .consolidated()
            .into_iter()
            .map(|(k, a)| (k, a.re))
            .collect();
        self.zero_rows.push((coeffs, rhs - s.constant.re));
    }

    /// Sets the objective to minimize `Re(s)`.
    pub fn minimize(&mut self, s: &ScalarExpr) {
        self.maximize = false;
        self.obj_constant = s.constant.re;
        self.objective = s
            .consolidated()
            .into_iter()
            .map(|(k, a)| (k, a.re))
            .collect();
    }

    /// Sets the objective to maximize `Re(s)`.
    pub fn maximize(&mut self, s: &ScalarExpr) {
        self.minimize(s);
        self.maximize = true;
    }

    /// Solves the program to accuracy `eps`.
    pub fn solve(&self, eps: f64) -> Result<Solution> {
        let n = self.nvars;

        let mut all_rows: Vec<&SparseRow> = Vec::new();
        let mut cones: Vec<SupportedConeT<f64>> = Vec::new();
        if !self.zero_rows.is_empty() {
            all_rows.extend(self.zero_rows.iter());
            cones.push(ZeroConeT(self.zero_rows.len()));
        }
        if !self.nonneg_rows.is_empty() {
            all_rows.extend(self.nonneg_rows.iter());
            cones.push(NonnegativeConeT(self.nonneg_rows.len()));
        }
        for (embed_dim, rows) in &self.psd_blocks {
            all_rows.extend(rows.iter());
            cones.push(PSDTriangleConeT(*embed_dim));
        }

        let m = all_rows.len();
        let mut cols: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut b = Vec::with_capacity(m);
        for (r, (coeffs, rhs)) in all_rows.iter().enumerate() {
            for &(k, v) in coeffs {
                cols[k].push((r, v));
            }
            b.push(*rhs);
        }

        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        colptr.push(0);
        for col in &cols {
            for &(r, v) in col {
                rowval.push(r);
                nzval.push(v);
            }
            colptr.push(rowval.len());
        }
        let a = CscMatrix::new(m, n, colptr, rowval, nzval);
        let p = CscMatrix::zeros((n, n));

        let sign = if self.maximize { -1.0 } else { 1.0 };
        let mut q = vec![0.0; n];
        for &(k, v) in &self.objective {
            q[k] += sign * v;
        }

        let settings = DefaultSettings {
            verbose: false,
            tol_gap_abs: eps,
            tol_gap_rel: eps,
            tol_feas: eps,
            ..DefaultSettings::default()
        };

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        solver.solve();

        let status = solver.solution.status.clone();
        log::debug!("SDP solved: status {status:?}, {n} vars, {m} rows");

        match status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => Ok(Solution {
                value: sign * solver.solution.obj_val + self.obj_constant,
                x: solver.solution.x.clone(),
            }),
            status => Err(Error::Solver(format!(
                "SDP solver terminated with status {status:?}"
            ))),
        }
    }
}

fn hermitize(m: &Mat) -> Mat {
    (m + &dag(m)) * C64::new(0.5, 0.0)
}

/// Real symmetric embedding of a Hermitian matrix: `H ⪰ 0` iff
/// `[[Re H, -Im H], [Im H, Re H]] ⪰ 0`.
fn real_embed(m: &Mat) -> Array2<f64> {
    let n = m.nrows();
    let mut out = Array2::zeros((2 * n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            out[(i, j)] = m[(i, j)].re;
            out[(i, n + j)] = -m[(i, j)].im;
            out[(n + i, j)] = m[(i, j)].im;
            out[(n + i, n + j)] = m[(i, j)].re;
        }
    }
    out
}

/// Scaled upper-triangle vectorization in column order, with off-diagonal
/// entries multiplied by sqrt(2), matching clarabel's PSD-triangle cone.
fn svec(m: &Array2<f64>) -> Vec<f64> {
    let n = m.nrows();
    let rt2 = f64::sqrt(2.0);
    let mut out = Vec::with_capacity(n * (n + 1) / 2);
    for j in 0..n {
        for i in 0..=j {
            if i == j {
                out.push(m[(i, i)]);
            } else {
                out.push(rt2 * m[(i, j)]);
            }
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::linalg::allclose;

    #[test]
    fn largest_eigenvalue_as_sdp() {
        let _ = env_logger::builder().is_test(true).try_init();
        // min t subject to t I - A >= 0 finds the top eigenvalue of A.
        let mut a = Mat::zeros((2, 2));
        a[(0, 0)] = C64::new(2.0, 0.0);
        a[(0, 1)] = C64::new(0.0, 1.0);
        a[(1, 0)] = C64::new(0.0, -1.0);
        a[(1, 1)] = C64::new(2.0, 0.0);
        // Eigenvalues of [[2, i], [-i, 2]] are 1 and 3.

        let mut sdp = SdpBuilder::new();
        let t = sdp.scalar_var();
        let lmi = &t.times_matrix(&Mat::eye(2)) - &MatExpr::constant(&a);
        sdp.psd(&lmi);
        sdp.minimize(&t);
        let sol = sdp.solve(1e-8).unwrap();
        assert_abs_diff_eq!(sol.value, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn bounded_trace_maximization() {
        // max Tr(X) over Hermitian 0 <= X <= I in dimension 3 is 3.
        let mut sdp = SdpBuilder::new();
        let x = sdp.hermitian_var(3);
        sdp.psd(&x);
        sdp.psd(&(&MatExpr::constant(&Mat::eye(3)) - &x));
        sdp.maximize(&x.trace());
        let sol = sdp.solve(1e-8).unwrap();
        assert_abs_diff_eq!(sol.value, 3.0, epsilon = 1e-5);
        let xv = sol.value_of(&x);
        assert!(allclose(&xv, &Mat::eye(3), 1e-4));
    }

    #[test]
    fn equality_constraint_pins_variable() {
        // max Tr(A X) over X >= 0 with X == diag(1, 2) fixed by equality.
        let mut target = Mat::zeros((2, 2));
        target[(0, 0)] = C64::new(1.0, 0.0);
        target[(1, 1)] = C64::new(2.0, 0.0);

        let mut sdp = SdpBuilder::new();
        let x = sdp.hermitian_var(2);
        sdp.psd(&x);
        sdp.eq_zero(&(&x - &MatExpr::constant(&target)));
        sdp.maximize(&x.trace());
        let sol = sdp.solve(1e-8).unwrap();
        assert_abs_diff_eq!(sol.value, 3.0, epsilon = 1e-5);
        assert!(allclose(&sol.value_of(&x), &target, 1e-4));
    }

    #[test]
    fn infeasible_program_reports_solver_error() {
        // X >= 0 and Tr(X) == -1 cannot hold together.
        let mut sdp = SdpBuilder::new();
        let x = sdp.hermitian_var(2);
        sdp.psd(&x);
        sdp.eq_scalar(&x.trace(), -1.0);
        sdp.minimize(&x.trace());
        assert!(matches!(sdp.solve(1e-8), Err(Error::Solver(_))));
    }

    #[test]
    fn scalar_inequality_floor() {
        // min t with t >= 5.
        let mut sdp = SdpBuilder::new();
        let t = sdp.scalar_var();
        sdp.ge_zero(&(&t - &ScalarExpr::constant(5.0)));
        sdp.minimize(&t);
        let sol = sdp.solve(1e-8).unwrap();
        assert_abs_diff_eq!(sol.value, 5.0, epsilon = 1e-6);
    }
}
