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

//! Index algebra for multipartite operators.
//!
//! An operator on a composite Hilbert space is stored as a dense 2D array
//! together with a caller-supplied list of per-subsystem dimensions. All
//! reshuffling operations (`syspermute`, `partial_trace`,
//! `partial_transpose`, `get_subblock`) work by reshaping the array into one
//! axis per subsystem factor, permuting or slicing axes, and reshaping back.
//! Row-major (C) order is used throughout, so the first subsystem is the
//! slowest-varying index.
//!
//! Subsystem labels are 1-based: `sys = &[1, 3]` names the first and third
//! tensor factors. Index arguments into a single factor (e.g. [`ket`]) are
//! 0-based.

use itertools::Itertools;
use ndarray::linalg::kron;
use ndarray::prelude::*;
use ndarray::{SliceInfoElem, s};
use num::Complex;

use crate::error::{Error, Result};
use crate::linalg::dag;

pub type C64 = Complex<f64>;

/// Dense complex operator on a finite-dimensional Hilbert space.
///
/// Column vectors (`cols == 1`) double as state vectors.
pub type Mat = Array2<C64>;

/// Checks that `sys` is a list of distinct 1-based subsystem labels in
/// `1..=n`.
pub(crate) fn check_sys(sys: &[usize], n: usize) -> Result<()> {
    for (i, &s) in sys.iter().enumerate() {
        if s == 0 || s > n {
            return Err(Error::InvalidIndex(format!(
                "subsystem label {s} out of range for {n} subsystems (labels are 1-based)"
            )));
        }
        if sys[..i].contains(&s) {
            return Err(Error::InvalidIndex(format!(
                "subsystem label {s} appears more than once"
            )));
        }
    }
    Ok(())
}

/// Checks that `perm` is a bijection on `{1, ..., n}`.
pub(crate) fn check_perm(perm: &[usize], n: usize) -> Result<()> {
    if perm.len() != n {
        return Err(Error::InvalidIndex(format!(
            "permutation has {} entries but there are {n} subsystems",
            perm.len()
        )));
    }
    check_sys(perm, n)
}

/// Checks that the dimension list multiplies to `len`.
pub(crate) fn check_total_dim(len: usize, dims: &[usize], what: &str) -> Result<()> {
    let total: usize = dims.iter().product();
    if total != len {
        return Err(Error::DimensionMismatch(format!(
            "{what} has size {len}, but the declared subsystem dimensions {dims:?} multiply to {total}"
        )));
    }
    Ok(())
}

/// Inverse of a 1-based permutation.
pub(crate) fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inv[p - 1] = i + 1;
    }
    inv
}

/// Standard basis column vector in dimension `dim` with a 1 at index `j`.
///
/// `ket(2, 0)` is `|0>` and `ket(2, 1)` is `|1>`.
pub fn ket(dim: usize, j: usize) -> Result<Mat> {
    if j >= dim {
        return Err(Error::InvalidIndex(format!(
            "basis index {j} out of range for dimension {dim}"
        )));
    }
    let mut out = Mat::zeros((dim, 1));
    out[(j, 0)] = C64::new(1.0, 0.0);
    Ok(out)
}

/// Tensor product `|j1>|j2>...|jn>` of basis vectors, where the k-th factor
/// lives in dimension `dims[k]`.
pub fn ket_list(dims: &[usize], indices: &[usize]) -> Result<Mat> {
    if dims.len() != indices.len() {
        return Err(Error::DimensionMismatch(format!(
            "{} dimensions given for {} basis indices",
            dims.len(),
            indices.len()
        )));
    }
    let mut out = Mat::ones((1, 1));
    for (&d, &j) in dims.iter().zip(indices) {
        out = kron(&out, &ket(d, j)?);
    }
    Ok(out)
}

/// The full tensor-product basis for subsystems with the given dimensions,
/// ordered lexicographically.
///
/// `all_kets(&[2, 3])` returns `|0,0>, |0,1>, |0,2>, |1,0>, |1,1>, |1,2>`.
pub fn all_kets(dims: &[usize]) -> Result<Vec<Mat>> {
    dims.iter()
        .map(|&d| 0..d)
        .multi_cartesian_product()
        .map(|ix| ket_list(dims, &ix))
        .collect()
}

/// Kronecker product of the given operators, left to right.
pub fn tensor(ops: &[&Mat]) -> Mat {
    let mut out = Mat::ones((1, 1));
    for op in ops {
        out = kron(&out, op);
    }
    out
}

/// `k`-fold Kronecker power of `m`. `tensor_pow(m, 0)` is the 1x1 identity.
pub fn tensor_pow(m: &Mat, k: usize) -> Mat {
    let mut out = Mat::ones((1, 1));
    for _ in 0..k {
        out = kron(&out, m);
    }
    out
}

fn reshape_nd(x: &Mat, shape: &[usize]) -> ArrayD<C64> {
    ArrayD::from_shape_vec(IxDyn(shape), x.iter().cloned().collect())
        .expect("shape was validated against the operator size")
}

fn collect_2d(t: &ArrayD<C64>, rows: usize, cols: usize) -> Mat {
    Mat::from_shape_vec((rows, cols), t.iter().cloned().collect())
        .expect("axis permutations preserve the element count")
}

/// Reorders the tensor factors of `x` so that the i-th factor of the result
/// is factor `perm[i]` of the input.
///
/// Works on vectors (either shape axis equal to 1) and on square operators,
/// where row and column factors are permuted together. `perm` must be a
/// bijection on `{1, ..., dims.len()}`.
pub fn syspermute(x: &Mat, perm: &[usize], dims: &[usize]) -> Result<Mat> {
    let n = dims.len();
    check_perm(perm, n)?;
    let (r, c) = x.dim();
    let axes0: Vec<usize> = perm.iter().map(|&p| p - 1).collect();

    if r == 1 || c == 1 {
        check_total_dim(r * c, dims, "vector")?;
        let t = reshape_nd(x, dims).permuted_axes(axes0.as_slice());
        Ok(collect_2d(&t, r, c))
    } else if r == c {
        check_total_dim(r, dims, "operator")?;
        let mut shape = dims.to_vec();
        shape.extend_from_slice(dims);
        let mut axes = axes0.clone();
        axes.extend(axes0.iter().map(|&a| n + a));
        let t = reshape_nd(x, &shape).permuted_axes(axes.as_slice());
        Ok(collect_2d(&t, r, c))
    } else {
        Err(Error::DimensionMismatch(format!(
            "syspermute expects a vector or a square operator, got shape {r}x{c}"
        )))
    }
}

/// Traces out the subsystems listed in `sys`, returning the operator on the
/// remaining factors.
///
/// An empty `sys` returns `x` unchanged; tracing over every subsystem
/// returns the 1x1 matrix holding the full trace. A column vector input is
/// promoted to the corresponding rank-one projector first.
pub fn partial_trace(x: &Mat, sys: &[usize], dims: &[usize]) -> Result<Mat> {
    let n = dims.len();
    check_sys(sys, n)?;

    if sys.is_empty() {
        return Ok(x.clone());
    }

    let rho = promote_to_operator(x, dims)?;

    if sys.len() == n {
        let tr = rho.diag().sum();
        return Ok(Mat::from_elem((1, 1), tr));
    }

    let rest: Vec<usize> = (1..=n).filter(|i| !sys.contains(i)).collect();
    let mut perm = sys.to_vec();
    perm.extend(&rest);
    let permuted = syspermute(&rho, &perm, dims)?;

    let dim_sys: usize = sys.iter().map(|&s| dims[s - 1]).product();
    let dim_keep: usize = rest.iter().map(|&s| dims[s - 1]).product();

    let mut out = Mat::zeros((dim_keep, dim_keep));
    for s in 0..dim_sys {
        let block = permuted.slice(s![
            s * dim_keep..(s + 1) * dim_keep,
            s * dim_keep..(s + 1) * dim_keep
        ]);
        out += &block;
    }
    Ok(out)
}

fn promote_to_operator(x: &Mat, dims: &[usize]) -> Result<Mat> {
    let (r, c) = x.dim();
    if c == 1 {
        check_total_dim(r, dims, "state vector")?;
        Ok(x.dot(&dag(x)))
    } else if r == c {
        check_total_dim(r, dims, "operator")?;
        Ok(x.clone())
    } else {
        Err(Error::DimensionMismatch(format!(
            "expected a column vector or a square operator, got shape {r}x{c}"
        )))
    }
}

/// Partial transpose on the subsystems listed in `sys`, for an operator with
/// square per-subsystem blocks. A column vector input is promoted to the
/// corresponding rank-one projector first.
pub fn partial_transpose(x: &Mat, sys: &[usize], dims: &[usize]) -> Result<Mat> {
    let rho = promote_to_operator(x, dims)?;
    let pairs: Vec<(usize, usize)> = dims.iter().map(|&d| (d, d)).collect();
    partial_transpose_rect(&rho, sys, &pairs)
}

/// Partial transpose for operators whose tensor factors may be non-square.
///
/// `dims[k] = (rk, ck)` declares that the k-th factor maps a `ck`-dimensional
/// space to an `rk`-dimensional one; transposed factors swap their row and
/// column dimensions in the result.
pub fn partial_transpose_rect(x: &Mat, sys: &[usize], dims: &[(usize, usize)]) -> Result<Mat> {
    let n = dims.len();
    check_sys(sys, n)?;
    let dim_row: Vec<usize> = dims.iter().map(|d| d.0).collect();
    let dim_col: Vec<usize> = dims.iter().map(|d| d.1).collect();
    let (r, c) = x.dim();
    check_total_dim(r, &dim_row, "operator rows")?;
    check_total_dim(c, &dim_col, "operator columns")?;

    let mut shape = dim_row.clone();
    shape.extend(&dim_col);
    let mut axes: Vec<usize> = (0..2 * n).collect();
    let mut new_rows = dim_row;
    let mut new_cols = dim_col;
    for &s in sys {
        axes.swap(s - 1, n + s - 1);
        std::mem::swap(&mut new_rows[s - 1], &mut new_cols[s - 1]);
    }

    let t = reshape_nd(x, &shape).permuted_axes(axes.as_slice());
    let nr: usize = new_rows.iter().product();
    let nc: usize = new_cols.iter().product();
    Ok(collect_2d(&t, nr, nc))
}

/// Fixes the subsystems in `sys` to the given `(row, col)` basis index pairs
/// and returns the remaining block.
///
/// For a tripartite `x` this computes, e.g.,
/// `(<i| ⊗ id ⊗ <j|) x (|k> ⊗ id ⊗ |l>)` via
/// `get_subblock(x, &[1, 3], &[(i, k), (j, l)], &[d1, d2, d3])`, which is a
/// `d2 x d2` matrix.
pub fn get_subblock(
    x: &Mat,
    sys: &[usize],
    indices: &[(usize, usize)],
    dims: &[usize],
) -> Result<Mat> {
    let n = dims.len();
    check_sys(sys, n)?;
    if sys.len() != indices.len() {
        return Err(Error::InvalidIndex(format!(
            "{} index pairs given for {} fixed subsystems",
            indices.len(),
            sys.len()
        )));
    }
    let (r, c) = x.dim();
    check_total_dim(r, dims, "operator rows")?;
    check_total_dim(c, dims, "operator columns")?;
    for (&s, &(i, j)) in sys.iter().zip(indices) {
        let d = dims[s - 1];
        if i >= d || j >= d {
            return Err(Error::InvalidIndex(format!(
                "index pair ({i}, {j}) out of range for subsystem {s} of dimension {d}"
            )));
        }
    }

    let mut shape = dims.to_vec();
    shape.extend_from_slice(dims);
    let t = reshape_nd(x, &shape);

    let mut info: Vec<SliceInfoElem> = vec![SliceInfoElem::from(..); 2 * n];
    for (&s, &(i, j)) in sys.iter().zip(indices) {
        info[s - 1] = SliceInfoElem::from(i as isize);
        info[n + s - 1] = SliceInfoElem::from(j as isize);
    }
    let sub = t.slice(info.as_slice());

    let dim_keep: usize = (1..=n)
        .filter(|i| !sys.contains(i))
        .map(|i| dims[i - 1])
        .product();
    Ok(Mat::from_shape_vec((dim_keep, dim_keep), sub.iter().cloned().collect())
        .expect("fixing subsystem indices leaves a square block"))
}

/// The operator exchanging the two subsystems named in `sys`, acting as the
/// identity on the rest.
///
/// `swap_operator((1, 2), &[2, 2])` is the two-qubit SWAP matrix. The
/// construction takes the partial transpose of the unnormalized maximally
/// entangled pair on the swapped factors.
pub fn swap_operator(sys: (usize, usize), dims: &[usize]) -> Result<Mat> {
    let n = dims.len();
    let (s1, s2) = sys;
    check_sys(&[s1, s2], n)?;

    let total: usize = dims.iter().product();
    let rest: Vec<usize> = (1..=n).filter(|&i| i != s1 && i != s2).collect();
    let mut perm = vec![s1, s2];
    perm.extend(&rest);
    let rearrange = inverse_permutation(&perm);

    let d1 = dims[s1 - 1];
    let d2 = dims[s2 - 1];
    let dim_rest = total / (d1 * d2);

    let mut g1 = Mat::zeros((d1 * d1, 1));
    for i in 0..d1 {
        g1 += &ket_list(&[d1, d1], &[i, i])?;
    }
    let mut g2 = Mat::zeros((d2 * d2, 1));
    for i in 0..d2 {
        g2 += &ket_list(&[d2, d2], &[i, i])?;
    }
    let g = g1.dot(&dag(&g2));

    let s = partial_transpose_rect(&g, &[2], &[(d1, d2), (d1, d2)])?;
    let p = tensor(&[&s, &Mat::eye(dim_rest)]);

    let dims_arranged: Vec<usize> = perm.iter().map(|&q| dims[q - 1]).collect();
    syspermute(&p, &rearrange, &dims_arranged)
}

/// The permutation operator `W` with `W (|x1> ⊗ ... ⊗ |xn>) =
/// |x_{perm(1)}> ⊗ ... ⊗ |x_{perm(n)}>` on subsystems of the given
/// dimensions.
pub fn permutation_operator(perm: &[usize], dims: &[usize]) -> Result<Mat> {
    check_perm(perm, dims.len())?;
    let total: usize = dims.iter().product();
    let mut w = Mat::zeros((total, total));
    for k in all_kets(dims)? {
        w += &syspermute(&k, perm, dims)?.dot(&dag(&k));
    }
    Ok(w)
}
