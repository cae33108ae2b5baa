use dyn_stack::{MemStack, StackReq};

use crate::internal_prelude::*;
use crate::assert;
use crate::linalg::triangular_solve;
use crate::perm::{permute_rows_in_place, permute_rows_in_place_scratch};

pub fn solve_in_place_scratch<T: RealField>(lu_dim: usize, rhs_ncols: usize) -> StackReq {
    permute_rows_in_place_scratch::<T>(lu_dim, rhs_ncols)
}

/// Solves `A x = rhs` in place given the packed factors and row permutation
/// produced by [`super::factor::lu_in_place`], one right-hand-side column at
/// a time.
#[track_caller]
pub fn solve_in_place<T: RealField>(
    LU: MatRef<'_, T>,
    row_perm: PermRef<'_>,
    rhs: MatMut<'_, T>,
    stack: &mut MemStack,
) {
    // LU = PA
    // P⁻¹ L U = A
    // A⁻¹ = U⁻¹ L⁻¹ P
    let n = LU.nrows();
    assert!(all(LU.ncols() == n, row_perm.len() == n, rhs.nrows() == n));

    let mut rhs = rhs;
    permute_rows_in_place(rhs.rb_mut(), row_perm, stack);
    triangular_solve::solve_unit_lower_triangular_in_place(LU, rhs.rb_mut());
    triangular_solve::solve_upper_triangular_in_place(LU, rhs.rb_mut());
}

#[cfg(test)]
mod tests {
    use super::super::factor;
    use super::*;
    use crate::linalg::matmul::{matmul, Accum};
    use crate::mat::Mat;
    use crate::utils::approx::{assert_mat_eq, ApproxEq};
    use dyn_stack::MemBuffer;
    use rand::prelude::*;
    use rand_distr::StandardNormal;

    #[test]
    fn solves_multiple_columns_against_one_factorization() {
        let rng = &mut StdRng::seed_from_u64(0);
        let n = 24;
        let k = 3;

        let A = Mat::from_fn(n, n, |_, _| rng.sample::<f64, _>(StandardNormal));
        let B = Mat::from_fn(n, k, |_, _| rng.sample::<f64, _>(StandardNormal));

        let mut LU = A.clone();
        let perm = &mut *vec![0usize; n];
        let perm_inv = &mut *vec![0usize; n];
        let (info, p) = factor::lu_in_place(
            LU.as_mut(),
            perm,
            perm_inv,
            MemStack::new(&mut MemBuffer::new(factor::lu_in_place_scratch::<f64>(n, n))),
        );
        assert!(info.zero_pivot.is_none());

        let mut X = B.clone();
        solve_in_place(
            LU.as_ref(),
            p,
            X.as_mut(),
            MemStack::new(&mut MemBuffer::new(solve_in_place_scratch::<f64>(n, k))),
        );

        let mut R = B.clone();
        matmul(R.as_mut(), Accum::Add, A.as_ref(), X.as_ref(), &-1.0);
        assert_mat_eq(
            R.as_ref(),
            Mat::zeros(n, k).as_ref(),
            &ApproxEq::with_tol(1e-10),
        );
    }
}
