//! Triangular substitution kernels.
//!
//! Each kernel solves in place, column by column over the right-hand side:
//! solving `A X = B` is `ncols(B)` independent substitutions sharing one
//! factor. The factor itself is never written through.

use crate::internal_prelude::*;
use crate::assert;

/// Solves `L x = b` in place, where `L` is the strictly lower part of `tril`
/// with an implicit unit diagonal.
#[track_caller]
pub fn solve_unit_lower_triangular_in_place<T: RealField>(tril: MatRef<'_, T>, rhs: MatMut<'_, T>) {
    let mut rhs = rhs;
    let n = tril.nrows();
    assert!(all(tril.ncols() == n, rhs.nrows() == n));

    for col in 0..rhs.ncols() {
        let x = rhs.col_mut(col);
        for j in 0..n {
            let xj = x[j].clone();
            let l = tril.col(j);
            for i in j + 1..n {
                x[i] = x[i].sub(&l[i].mul(&xj));
            }
        }
    }
}

/// Solves `L x = b` in place, diagonal included.
#[track_caller]
pub fn solve_lower_triangular_in_place<T: RealField>(tril: MatRef<'_, T>, rhs: MatMut<'_, T>) {
    let mut rhs = rhs;
    let n = tril.nrows();
    assert!(all(tril.ncols() == n, rhs.nrows() == n));

    for col in 0..rhs.ncols() {
        let x = rhs.col_mut(col);
        for j in 0..n {
            let l = tril.col(j);
            let inv = l[j].recip();
            let xj = x[j].mul(&inv);
            x[j] = xj.clone();
            for i in j + 1..n {
                x[i] = x[i].sub(&l[i].mul(&xj));
            }
        }
    }
}

/// Solves `U x = b` in place, where `U` is the upper part of `triu`, diagonal
/// included.
#[track_caller]
pub fn solve_upper_triangular_in_place<T: RealField>(triu: MatRef<'_, T>, rhs: MatMut<'_, T>) {
    let mut rhs = rhs;
    let n = triu.nrows();
    assert!(all(triu.ncols() == n, rhs.nrows() == n));

    for col in 0..rhs.ncols() {
        let x = rhs.col_mut(col);
        for j in (0..n).rev() {
            let u = triu.col(j);
            let inv = u[j].recip();
            let xj = x[j].mul(&inv);
            x[j] = xj.clone();
            for i in 0..j {
                x[i] = x[i].sub(&u[i].mul(&xj));
            }
        }
    }
}

/// Solves `Lᵀ x = b` in place, where `L` is the lower part of `tril`,
/// diagonal included. Used by the Cholesky back-substitution.
#[track_caller]
pub fn solve_lower_triangular_transpose_in_place<T: RealField>(
    tril: MatRef<'_, T>,
    rhs: MatMut<'_, T>,
) {
    let mut rhs = rhs;
    let n = tril.nrows();
    assert!(all(tril.ncols() == n, rhs.nrows() == n));

    for col in 0..rhs.ncols() {
        let x = rhs.col_mut(col);
        for j in (0..n).rev() {
            let l = tril.col(j);
            let mut acc = x[j].clone();
            for i in j + 1..n {
                acc = acc.sub(&l[i].mul(&x[i]));
            }
            x[j] = acc.mul(&l[j].recip());
        }
    }
}
