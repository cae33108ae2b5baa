//! Row equilibration.
//!
//! Multiplying row `i` of both `A` and `b` by the same factor `s_i` leaves
//! the solution of `Ax = b` unchanged, so no reverse step is needed on the
//! solution; the determinant of the scaled factors must be divided by
//! `Π s_i`, and norms are always computed from the original data. The
//! symmetric variant used for Cholesky scales columns as well, and there the
//! solution does need unscaling.

use crate::get_global_row_scaling;
use crate::internal_prelude::*;
use crate::assert;

/// Row equilibration policy, fixed when a factorization is constructed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scaling {
    /// Follow the process-wide default ([`crate::set_global_row_scaling`]).
    Auto,
    /// Equilibrate rows by their largest magnitude.
    Row,
    /// Factor the data as given.
    None,
}

impl Default for Scaling {
    fn default() -> Self {
        Self::Auto
    }
}

impl Scaling {
    /// Resolves `Auto` against the process-wide default.
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => {
                if get_global_row_scaling() {
                    Self::Row
                } else {
                    Self::None
                }
            }
            other => other,
        }
    }
}

/// First row whose entries are all zero, if any. Such a matrix is singular
/// before any elimination work is done.
pub fn zero_row<T: RealField>(A: MatRef<'_, T>) -> Option<usize> {
    let (m, n) = A.shape();
    'rows: for i in 0..m {
        for j in 0..n {
            if !A[(i, j)].is_zero() {
                continue 'rows;
            }
        }
        return Some(i);
    }
    None
}

/// Per-row scale factors `1 / max_j |a_ij|`; `1` for all-zero rows.
pub fn row_scale_factors<T: RealField>(A: MatRef<'_, T>) -> Vec<T> {
    let (m, n) = A.shape();
    let mut scale = Vec::with_capacity(m);
    for i in 0..m {
        let mut big = zero::<T>();
        for j in 0..n {
            let abs = A[(i, j)].abs();
            if abs > big {
                big = abs;
            }
        }
        if big.is_zero() {
            scale.push(one());
        } else {
            scale.push(big.recip());
        }
    }
    scale
}

/// Multiplies row `i` by `scale[i]`.
#[track_caller]
pub fn scale_rows_in_place<T: RealField>(A: MatMut<'_, T>, scale: &[T]) {
    let mut A = A;
    assert!(scale.len() == A.nrows());
    for j in 0..A.ncols() {
        let col = A.col_mut(j);
        for i in 0..col.len() {
            col[i] = col[i].mul(&scale[i]);
        }
    }
}

/// Symmetric scale factors `1 / sqrt(a_ii)` for positive diagonals; `1`
/// otherwise (a non-positive diagonal is left for the factorization to
/// reject).
pub fn sym_scale_factors<T: RealField>(A: MatRef<'_, T>) -> Vec<T> {
    let n = A.nrows();
    let mut scale = Vec::with_capacity(n);
    for i in 0..n {
        let d = &A[(i, i)];
        if *d > zero() {
            scale.push(d.sqrt().recip());
        } else {
            scale.push(one());
        }
    }
    scale
}

/// `a_ij ← s_i · a_ij · s_j`, preserving symmetry and definiteness.
#[track_caller]
pub fn scale_sym_in_place<T: RealField>(A: MatMut<'_, T>, scale: &[T]) {
    let mut A = A;
    assert!(all(A.nrows() == A.ncols(), scale.len() == A.nrows()));
    for j in 0..A.ncols() {
        let sj = scale[j].clone();
        let col = A.col_mut(j);
        for i in 0..col.len() {
            col[i] = col[i].mul(&scale[i]).mul(&sj);
        }
    }
}

/// Reverses symmetric scaling on a solution: `x_i ← s_i · x_i`. Only needed
/// when columns were scaled too; plain row equilibration leaves the solution
/// untouched.
#[track_caller]
pub fn unscale_solution_in_place<T: RealField>(x: MatMut<'_, T>, scale: &[T]) {
    scale_rows_in_place(x, scale);
}
