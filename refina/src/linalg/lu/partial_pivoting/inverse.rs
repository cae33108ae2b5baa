use dyn_stack::{MemStack, StackReq};

use crate::internal_prelude::*;
use crate::assert;
use crate::linalg::lu::partial_pivoting::solve;

pub fn inverse_scratch<T: RealField>(dim: usize) -> StackReq {
    solve::solve_in_place_scratch::<T>(dim, dim)
}

/// Writes `A⁻¹` to `dst` given the packed factors and row permutation: the
/// identity is used as the right-hand side, one unit column per solve.
#[track_caller]
pub fn inverse<T: RealField>(
    dst: MatMut<'_, T>,
    LU: MatRef<'_, T>,
    row_perm: PermRef<'_>,
    stack: &mut MemStack,
) {
    let n = LU.nrows();
    assert!(all(
        LU.ncols() == n,
        dst.nrows() == n,
        dst.ncols() == n,
        row_perm.len() == n,
    ));

    let mut dst = dst;
    for j in 0..n {
        for i in 0..n {
            dst[(i, j)] = if i == j { one() } else { zero() };
        }
    }
    solve::solve_in_place(LU, row_perm, dst.rb_mut(), stack);
}
