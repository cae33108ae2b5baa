use dyn_stack::{MemBuffer, MemStack};

use crate::internal_prelude::*;
use crate::assert;
use crate::linalg::lu::partial_pivoting::factor;

/// Determinant from packed $LU$ factors: the product of `U`'s diagonal with
/// the sign of the row permutation, divided by the equilibration factors the
/// factorization applied to its working copy.
///
/// The product is accumulated at the backend's wide precision and narrowed
/// once, so the same internal value backs every output precision. A singular
/// factorization reports an exact zero.
#[track_caller]
pub fn determinant_from_lu<T: Widening>(
    LU: MatRef<'_, T>,
    transposition_count: usize,
    zero_pivot: Option<usize>,
    row_scale: Option<&[T]>,
) -> T {
    let n = LU.nrows();
    assert!(LU.ncols() == n);
    if let Some(scale) = row_scale {
        assert!(scale.len() == n);
    }

    if zero_pivot.is_some() {
        return zero();
    }

    let mut det = one::<T::Wide>();
    for i in 0..n {
        det = det.mul(&LU[(i, i)].widen());
    }
    if let Some(scale) = row_scale {
        for s in scale {
            det = det.div(&s.widen());
        }
    }

    let det = T::narrow(&det);
    if transposition_count % 2 == 0 {
        det
    } else {
        det.neg()
    }
}

/// Determinant of a square matrix, through a fresh unscaled factorization of
/// a working copy.
#[track_caller]
pub fn determinant<T: Widening>(mat: MatRef<'_, T>) -> T {
    let n = mat.nrows();
    assert!(mat.ncols() == n);

    let mut factors = mat.to_owned();
    let perm = &mut *vec![0usize; n];
    let perm_inv = &mut *vec![0usize; n];
    let (info, _) = factor::lu_in_place(
        factors.as_mut(),
        perm,
        perm_inv,
        MemStack::new(&mut MemBuffer::new(factor::lu_in_place_scratch::<T>(n, n))),
    );

    determinant_from_lu(factors.as_ref(), info.transposition_count, info.zero_pivot, None)
}
