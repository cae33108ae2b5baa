//! Sequential matrix product kernel.

use crate::internal_prelude::*;
use crate::assert;

/// Whether the destination is overwritten or accumulated into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Accum {
    Replace,
    Add,
}

/// `dst = [dst +] alpha · lhs · rhs`.
#[track_caller]
pub fn matmul<T: RealField>(
    dst: MatMut<'_, T>,
    accum: Accum,
    lhs: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    alpha: &T,
) {
    let mut dst = dst;
    assert!(all(
        dst.nrows() == lhs.nrows(),
        dst.ncols() == rhs.ncols(),
        lhs.ncols() == rhs.nrows(),
    ));

    if accum == Accum::Replace {
        dst.fill(T::zero());
    }

    for j in 0..rhs.ncols() {
        for k in 0..lhs.ncols() {
            let w = alpha.mul(&rhs[(k, j)]);
            let dst_col = dst.col_mut(j);
            let lhs_col = lhs.col(k);
            for i in 0..lhs_col.len() {
                dst_col[i] = dst_col[i].add(&lhs_col[i].mul(&w));
            }
        }
    }
}
