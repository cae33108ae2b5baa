use crate::internal_prelude::*;
use crate::assert;

/// Error in the $L L^\top$ factorization.
#[derive(Copy, Clone, Debug)]
pub enum LltError {
    NonPositivePivot { index: usize },
}

impl core::fmt::Display for LltError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}
impl core::error::Error for LltError {}

/// Factors `A = L·Lᵀ` in place on the lower triangle, column by column,
/// without pivoting. The caller asserts symmetry; only the lower triangle is
/// read, and the strictly upper triangle is left untouched.
///
/// A non-positive value under the square root means the input is not
/// positive definite and fails the factorization. This is a distinct outcome
/// from LU's singularity: the SPD entry points do not fall back to LU.
#[track_caller]
pub fn cholesky_in_place<T: RealField>(A: MatMut<'_, T>) -> Result<(), LltError> {
    let mut A = A;
    let n = A.nrows();
    assert!(A.ncols() == n);

    for j in 0..n {
        let mut d = A[(j, j)].clone();
        for k in 0..j {
            let ljk = &A[(j, k)];
            d = d.sub(&ljk.mul(ljk));
        }
        if !(d > zero()) {
            return Err(LltError::NonPositivePivot { index: j });
        }
        let root = d.sqrt();
        let inv = root.recip();
        A[(j, j)] = root;

        for i in j + 1..n {
            let mut acc = A[(i, j)].clone();
            for k in 0..j {
                let prod = A[(i, k)].mul(&A[(j, k)]);
                acc = acc.sub(&prod);
            }
            A[(i, j)] = acc.mul(&inv);
        }
    }

    Ok(())
}
