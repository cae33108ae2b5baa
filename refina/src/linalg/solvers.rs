//! High-level solver objects.
//!
//! A solver owns its factorization and a private copy of the input: the
//! caller's matrix is never written through, and a solver can be used for any
//! number of solves against the one decomposition. Each solver offers a
//! simple variant (one decomposition, one substitution) and an accurate
//! variant that runs iterative refinement with wide residuals.

use dyn_stack::{MemBuffer, MemStack};

use crate::internal_prelude::*;
use crate::{assert, debug_assert};
use crate::linalg::cholesky::llt::{factor as llt_factor, solve as llt_solve};
use crate::linalg::equilibration::{self, Scaling};
use crate::linalg::lu::partial_pivoting::{
    factor as lu_factor, inverse as lu_inverse, solve as lu_solve,
};
use crate::linalg::reductions::{condition_number, determinant_from_lu};
use crate::linalg::refinement::{refine_in_place, RefineParams};
use crate::mat::has_non_finite;

pub use crate::linalg::cholesky::llt::factor::LltError;
pub use crate::linalg::lu::partial_pivoting::factor::LuError;

#[derive(Copy, Clone, Debug, Default)]
pub struct PartialPivLuParams {
    pub scaling: Scaling,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct LltParams {
    pub scaling: Scaling,
}

/// $LU$ decomposition with partial (row) pivoting, the general square
/// solver.
///
/// Singularity is an expected outcome, not a panic: the determinant of a
/// singular matrix is zero, its condition number is infinite, and solves
/// report [`LuError::SingularMatrix`].
#[derive(Clone, Debug)]
pub struct PartialPivLu<T> {
    A: Mat<T>,
    LU: Mat<T>,
    P: Perm,
    scale: Option<Vec<T>>,
    transposition_count: usize,
    zero_pivot: Option<usize>,
}

impl<T: RealField> PartialPivLu<T> {
    /// Factors a copy of `A`, equilibrating per the process-wide default.
    #[track_caller]
    pub fn new(A: MatRef<'_, T>) -> Self {
        Self::new_with(A, PartialPivLuParams::default())
    }

    #[track_caller]
    pub fn new_with(A: MatRef<'_, T>, params: PartialPivLuParams) -> Self {
        assert!(all(A.nrows() == A.ncols(), A.nrows() > 0));
        debug_assert!(has_non_finite(A).is_none());

        let n = A.nrows();
        let A = A.to_owned();
        let mut LU = A.clone();

        let zero_row = equilibration::zero_row(A.as_ref());
        let scale = match params.scaling.resolve() {
            Scaling::Row => {
                let scale = equilibration::row_scale_factors(A.as_ref());
                equilibration::scale_rows_in_place(LU.as_mut(), &scale);
                Some(scale)
            }
            _ => None,
        };

        if let Some(row) = zero_row {
            // singular before any elimination work
            return Self {
                A,
                LU,
                P: Perm::identity(n),
                scale,
                transposition_count: 0,
                zero_pivot: Some(row),
            };
        }

        let mut perm_fwd = vec![0usize; n];
        let mut perm_inv = vec![0usize; n];
        let (info, _) = lu_factor::lu_in_place(
            LU.as_mut(),
            &mut perm_fwd,
            &mut perm_inv,
            MemStack::new(&mut MemBuffer::new(lu_factor::lu_in_place_scratch::<T>(n, n))),
        );

        Self {
            A,
            LU,
            P: Perm::new(perm_fwd.into_boxed_slice(), perm_inv.into_boxed_slice()),
            scale,
            transposition_count: info.transposition_count,
            zero_pivot: info.zero_pivot,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.A.nrows()
    }

    #[inline]
    pub fn is_singular(&self) -> bool {
        self.zero_pivot.is_some()
    }

    /// The unit-lower factor, assembled from the packed working copy.
    pub fn L(&self) -> Mat<T> {
        let n = self.dim();
        Mat::from_fn(n, n, |i, j| {
            if i > j {
                self.LU[(i, j)].clone()
            } else if i == j {
                one()
            } else {
                zero()
            }
        })
    }

    /// The upper factor, assembled from the packed working copy.
    pub fn U(&self) -> Mat<T> {
        let n = self.dim();
        Mat::from_fn(n, n, |i, j| {
            if i <= j {
                self.LU[(i, j)].clone()
            } else {
                zero()
            }
        })
    }

    /// The row pivoting permutation.
    #[inline]
    pub fn P(&self) -> PermRef<'_> {
        self.P.as_ref()
    }

    fn solve_in_place_imp(&self, rhs: MatMut<'_, T>) {
        let mut rhs = rhs;
        if let Some(scale) = &self.scale {
            equilibration::scale_rows_in_place(rhs.rb_mut(), scale);
        }
        let (n, k) = rhs.shape();
        lu_solve::solve_in_place(
            self.LU.as_ref(),
            self.P.as_ref(),
            rhs,
            MemStack::new(&mut MemBuffer::new(lu_solve::solve_in_place_scratch::<T>(n, k))),
        );
    }

    /// Solves `A x = rhs` with one substitution per right-hand-side column.
    #[track_caller]
    pub fn solve(&self, rhs: MatRef<'_, T>) -> Result<Mat<T>, LuError> {
        assert!(rhs.nrows() == self.dim());
        if let Some(index) = self.zero_pivot {
            return Err(LuError::SingularMatrix { index });
        }
        let mut x = rhs.to_owned();
        self.solve_in_place_imp(x.as_mut());
        Ok(x)
    }

    /// `A⁻¹`, by solving against the identity.
    pub fn inverse(&self) -> Result<Mat<T>, LuError> {
        if let Some(index) = self.zero_pivot {
            return Err(LuError::SingularMatrix { index });
        }
        let n = self.dim();
        let mut inv = Mat::zeros(n, n);
        lu_inverse::inverse(
            inv.as_mut(),
            self.LU.as_ref(),
            self.P.as_ref(),
            MemStack::new(&mut MemBuffer::new(lu_inverse::inverse_scratch::<T>(n))),
        );
        if let Some(scale) = &self.scale {
            // the factors are those of S·A, so (S·A)⁻¹·S = A⁻¹
            for j in 0..n {
                let sj = scale[j].clone();
                for x in inv.col_mut(j) {
                    *x = x.mul(&sj);
                }
            }
        }
        Ok(inv)
    }
}

impl<T: Widening> PartialPivLu<T> {
    /// [`Self::solve`], then iterative refinement with wide residuals.
    #[track_caller]
    pub fn solve_accurate(&self, rhs: MatRef<'_, T>) -> Result<Mat<T>, LuError> {
        let mut x = self.solve(rhs)?;
        refine_in_place(
            self.A.as_ref(),
            rhs,
            x.as_mut(),
            &mut |d: MatMut<'_, T>| self.solve_in_place_imp(d),
            RefineParams::default(),
        );
        Ok(x)
    }

    /// [`Self::inverse`], refined column by column against the identity.
    pub fn inverse_accurate(&self) -> Result<Mat<T>, LuError> {
        let mut inv = self.inverse()?;
        let identity = Mat::<T>::identity(self.dim());
        refine_in_place(
            self.A.as_ref(),
            identity.as_ref(),
            inv.as_mut(),
            &mut |d: MatMut<'_, T>| self.solve_in_place_imp(d),
            RefineParams::default(),
        );
        Ok(inv)
    }

    /// Determinant from the factor diagonal and the pivot sign; exactly zero
    /// for singular input.
    pub fn determinant(&self) -> T {
        determinant_from_lu(
            self.LU.as_ref(),
            self.transposition_count,
            self.zero_pivot,
            self.scale.as_deref(),
        )
    }

    /// `‖A‖_∞ · ‖A⁻¹‖_∞`, using the accurately-computed inverse; positive
    /// infinity for singular input.
    pub fn cond(&self) -> T {
        match self.inverse_accurate() {
            Ok(inv) => condition_number(self.A.as_ref(), inv.as_ref()),
            Err(LuError::SingularMatrix { .. }) => T::infinity(),
        }
    }
}

/// $L L^\top$ decomposition, the solver for matrices the caller asserts are
/// symmetric positive definite. Symmetry is not verified; positive
/// definiteness is, and its absence is a distinct failure from singularity.
#[derive(Clone, Debug)]
pub struct Llt<T> {
    A: Mat<T>,
    L: Mat<T>,
    scale: Option<Vec<T>>,
}

impl<T: RealField> Llt<T> {
    /// Factors a copy of `A`, equilibrating symmetrically per the
    /// process-wide default.
    #[track_caller]
    pub fn new(A: MatRef<'_, T>) -> Result<Self, LltError> {
        Self::new_with(A, LltParams::default())
    }

    #[track_caller]
    pub fn new_with(A: MatRef<'_, T>, params: LltParams) -> Result<Self, LltError> {
        assert!(all(A.nrows() == A.ncols(), A.nrows() > 0));
        debug_assert!(has_non_finite(A).is_none());

        let n = A.nrows();
        let A = A.to_owned();
        let mut L = A.clone();

        let scale = match params.scaling.resolve() {
            Scaling::Row => {
                let scale = equilibration::sym_scale_factors(A.as_ref());
                equilibration::scale_sym_in_place(L.as_mut(), &scale);
                Some(scale)
            }
            _ => None,
        };

        llt_factor::cholesky_in_place(L.as_mut())?;
        for j in 1..n {
            for i in 0..j {
                L[(i, j)] = zero();
            }
        }

        Ok(Self { A, L, scale })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.A.nrows()
    }

    /// The lower factor of the equilibrated working copy.
    #[inline]
    pub fn L(&self) -> MatRef<'_, T> {
        self.L.as_ref()
    }

    fn solve_in_place_imp(&self, rhs: MatMut<'_, T>) {
        let mut rhs = rhs;
        if let Some(scale) = &self.scale {
            equilibration::scale_rows_in_place(rhs.rb_mut(), scale);
        }
        llt_solve::solve_in_place(self.L.as_ref(), rhs.rb_mut());
        if let Some(scale) = &self.scale {
            // columns were scaled too, so the solution needs the reverse step
            equilibration::unscale_solution_in_place(rhs, scale);
        }
    }

    /// Solves `A x = rhs`.
    #[track_caller]
    pub fn solve(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        assert!(rhs.nrows() == self.dim());
        let mut x = rhs.to_owned();
        self.solve_in_place_imp(x.as_mut());
        x
    }
}

impl<T: Widening> Llt<T> {
    /// [`Self::solve`], then iterative refinement with wide residuals.
    #[track_caller]
    pub fn solve_accurate(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        let mut x = self.solve(rhs);
        refine_in_place(
            self.A.as_ref(),
            rhs,
            x.as_mut(),
            &mut |d: MatMut<'_, T>| self.solve_in_place_imp(d),
            RefineParams::default(),
        );
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::reductions::norm_inf;
    use crate::utils::approx::{assert_mat_eq, ApproxEq};
    use refina_traits::{Big, DoubleF64};

    const FIXTURE: [[f64; 5]; 5] = [
        [1.0, 2.0, 3.0, 1.0, 2.0],
        [1.0, 2.0, 1.0, 2.0, 1.0],
        [2.0, 1.0, 0.0, 1.0, 2.0],
        [2.0, 1.0, 3.0, 2.0, 1.0],
        [2.0, 2.0, 1.0, 1.0, 5.0],
    ];
    const FIXTURE_RHS: [f64; 5] = [16.0, 9.0, 6.0, 14.0, 14.0];
    const FIXTURE_SOLUTION: [f64; 5] = [1.0, 2.0, 3.0, 0.0, 1.0];
    // row 3 is twice row 1
    const FIXTURE_SINGULAR: [[f64; 5]; 5] = [
        [1.0, 2.0, 3.0, 1.0, 2.0],
        [1.0, 2.0, 1.0, 2.0, 1.0],
        [2.0, 1.0, 0.0, 1.0, 2.0],
        [2.0, 4.0, 2.0, 4.0, 2.0],
        [2.0, 2.0, 1.0, 1.0, 5.0],
    ];
    const SPD: [[f64; 3]; 3] = [[4.0, 2.0, -2.0], [2.0, 10.0, 2.0], [-2.0, 2.0, 5.0]];
    const SPD_SOLUTION: [f64; 3] = [1.0, -2.0, 3.0];
    const SPD_RHS: [f64; 3] = [-6.0, -12.0, 9.0];

    fn mat<T: RealField, const N: usize>(rows: &[[f64; N]; N]) -> Mat<T> {
        Mat::from_fn(N, N, |i, j| T::from_f64(rows[i][j]))
    }

    fn col<T: RealField>(values: &[f64]) -> Mat<T> {
        Mat::from_fn(values.len(), 1, |i, _| T::from_f64(values[i]))
    }

    fn solve_recovers_exact_solution<T: Widening>(tol: f64) {
        let A = mat::<T, 5>(&FIXTURE);
        let b = col::<T>(&FIXTURE_RHS);

        for scaling in [Scaling::Row, Scaling::None] {
            let lu = PartialPivLu::new_with(A.as_ref(), PartialPivLuParams { scaling });
            assert!(!lu.is_singular());

            let x = lu.solve(b.as_ref()).unwrap();
            let xa = lu.solve_accurate(b.as_ref()).unwrap();
            for (i, &e) in FIXTURE_SOLUTION.iter().enumerate() {
                assert!((x[(i, 0)].to_f64() - e).abs() <= tol);
                assert!((xa[(i, 0)].to_f64() - e).abs() <= tol);
            }
        }
    }

    #[test]
    fn solve_fixture_f64() {
        solve_recovers_exact_solution::<f64>(1e-13);
    }
    #[test]
    fn solve_fixture_double() {
        solve_recovers_exact_solution::<DoubleF64>(1e-28);
    }
    #[test]
    fn solve_fixture_big() {
        solve_recovers_exact_solution::<Big>(1e-60);
    }

    fn determinant_matches_reference<T: Widening>(tol: f64) {
        let A = mat::<T, 5>(&FIXTURE);
        for scaling in [Scaling::Row, Scaling::None] {
            let lu = PartialPivLu::new_with(A.as_ref(), PartialPivLuParams { scaling });
            assert!((lu.determinant().to_f64() + 30.0).abs() <= tol);
        }
    }

    #[test]
    fn determinant_fixture_f64() {
        determinant_matches_reference::<f64>(1e-12);
    }
    #[test]
    fn determinant_fixture_double() {
        determinant_matches_reference::<DoubleF64>(1e-26);
    }
    #[test]
    fn determinant_fixture_big() {
        determinant_matches_reference::<Big>(1e-60);
    }

    fn singular_fixture_has_no_unique_solution<T: Widening>() {
        let A = mat::<T, 5>(&FIXTURE_SINGULAR);
        let b = col::<T>(&FIXTURE_RHS);

        for scaling in [Scaling::Row, Scaling::None] {
            let lu = PartialPivLu::new_with(A.as_ref(), PartialPivLuParams { scaling });
            assert!(lu.is_singular());
            assert!(lu.determinant().is_zero());
            assert!(matches!(
                lu.solve(b.as_ref()),
                Err(LuError::SingularMatrix { .. })
            ));
            assert!(matches!(lu.inverse(), Err(LuError::SingularMatrix { .. })));
            let cond = lu.cond();
            assert!(cond.is_infinite());
        }
    }

    #[test]
    fn singular_fixture_f64() {
        singular_fixture_has_no_unique_solution::<f64>();
    }
    #[test]
    fn singular_fixture_double() {
        singular_fixture_has_no_unique_solution::<DoubleF64>();
    }
    #[test]
    fn singular_fixture_big() {
        singular_fixture_has_no_unique_solution::<Big>();
    }

    #[test]
    fn all_zero_row_is_singular_immediately() {
        let A = Mat::<f64>::from_f64_rows(&[
            &[1.0, 2.0, 3.0],
            &[0.0, 0.0, 0.0],
            &[4.0, 5.0, 6.0],
        ]);
        let lu = PartialPivLu::new(A.as_ref());
        assert!(lu.is_singular());
        assert_eq!(lu.determinant(), 0.0);
    }

    fn cond_matches_reference<T: Widening>(tol: f64) {
        let A = mat::<T, 5>(&FIXTURE);
        for scaling in [Scaling::Row, Scaling::None] {
            let lu = PartialPivLu::new_with(A.as_ref(), PartialPivLuParams { scaling });
            assert!((lu.cond().to_f64() - 38.5).abs() <= tol);
        }
    }

    #[test]
    fn cond_fixture_f64() {
        cond_matches_reference::<f64>(1e-10);
    }
    #[test]
    fn cond_fixture_double() {
        cond_matches_reference::<DoubleF64>(1e-13);
    }
    #[test]
    fn cond_fixture_big() {
        cond_matches_reference::<Big>(1e-13);
    }

    fn inverse_round_trips<T: Widening>(tol: f64) {
        let A = mat::<T, 5>(&FIXTURE);
        let lu = PartialPivLu::new(A.as_ref());
        let inv = lu.inverse_accurate().unwrap();
        let product = &A * &inv;
        assert_mat_eq(
            product.as_ref(),
            Mat::<T>::identity(5).as_ref(),
            &ApproxEq::with_tol(T::from_f64(tol)),
        );
    }

    #[test]
    fn inverse_f64() {
        inverse_round_trips::<f64>(1e-13);
    }
    #[test]
    fn inverse_double() {
        inverse_round_trips::<DoubleF64>(1e-28);
    }
    #[test]
    fn inverse_big() {
        inverse_round_trips::<Big>(1e-60);
    }

    #[test]
    fn operations_never_spoil_the_source_matrix() {
        let A = Mat::<f64>::from_f64_rows(&[&[0.001, 2.0], &[3000.0, 4.0]]);
        let pristine = A.clone();

        let lu = PartialPivLu::new_with(
            A.as_ref(),
            PartialPivLuParams {
                scaling: Scaling::Row,
            },
        );
        let b = Mat::<f64>::from_f64_rows(&[&[1.0], &[2.0]]);
        let _ = lu.solve_accurate(b.as_ref()).unwrap();
        let _ = lu.inverse_accurate().unwrap();
        let _ = lu.determinant();
        let _ = lu.cond();

        assert_eq!(A, pristine);
        // the norm reads original data, so a prior equilibrated solve cannot
        // change it
        assert_eq!(norm_inf(A.as_ref()), 3004.0);
    }

    fn spd_solve_recovers_exact_solution<T: Widening>(tol: f64) {
        let A = mat::<T, 3>(&SPD);
        let b = col::<T>(&SPD_RHS);

        for scaling in [Scaling::Row, Scaling::None] {
            let llt = Llt::new_with(A.as_ref(), LltParams { scaling }).unwrap();
            let x = llt.solve(b.as_ref());
            let xa = llt.solve_accurate(b.as_ref());
            for (i, &e) in SPD_SOLUTION.iter().enumerate() {
                assert!((x[(i, 0)].to_f64() - e).abs() <= tol);
                assert!((xa[(i, 0)].to_f64() - e).abs() <= tol);
            }
        }
    }

    #[test]
    fn spd_solve_f64() {
        spd_solve_recovers_exact_solution::<f64>(1e-13);
    }
    #[test]
    fn spd_solve_double() {
        spd_solve_recovers_exact_solution::<DoubleF64>(1e-28);
    }
    #[test]
    fn spd_solve_big() {
        spd_solve_recovers_exact_solution::<Big>(1e-60);
    }

    #[test]
    fn non_spd_input_is_a_distinct_failure() {
        let A = Mat::<f64>::from_f64_rows(&[&[1.0, 2.0], &[2.0, 1.0]]);
        let err = Llt::new(A.as_ref()).unwrap_err();
        assert!(matches!(err, LltError::NonPositivePivot { index: 1 }));

        // the same matrix is perfectly fine for the general solver
        let lu = PartialPivLu::new(A.as_ref());
        assert!(!lu.is_singular());
    }

    #[test]
    fn matrix_rhs_solves_columns_independently() {
        let A = mat::<f64, 5>(&FIXTURE);
        let lu = PartialPivLu::new(A.as_ref());

        let B = Mat::<f64>::from_fn(5, 2, |i, j| {
            if j == 0 {
                FIXTURE_RHS[i]
            } else {
                2.0 * FIXTURE_RHS[i]
            }
        });
        let X = lu.solve_accurate(B.as_ref()).unwrap();
        for (i, &e) in FIXTURE_SOLUTION.iter().enumerate() {
            assert!((X[(i, 0)] - e).abs() <= 1e-13);
            assert!((X[(i, 1)] - 2.0 * e).abs() <= 1e-13);
        }
    }
}
