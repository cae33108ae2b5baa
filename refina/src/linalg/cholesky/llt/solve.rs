use crate::internal_prelude::*;
use crate::assert;
use crate::linalg::triangular_solve;

/// Solves `A x = rhs` in place given the Cholesky factor `L`.
#[track_caller]
pub fn solve_in_place<T: RealField>(L: MatRef<'_, T>, rhs: MatMut<'_, T>) {
    // A = L Lᵀ
    // x = L⁻ᵀ L⁻¹ rhs
    let n = L.nrows();
    assert!(all(L.ncols() == n, rhs.nrows() == n));

    let mut rhs = rhs;
    triangular_solve::solve_lower_triangular_in_place(L, rhs.rb_mut());
    triangular_solve::solve_lower_triangular_transpose_in_place(L, rhs.rb_mut());
}
