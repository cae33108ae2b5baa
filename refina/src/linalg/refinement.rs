//! Iterative refinement.
//!
//! Given a solution computed from a single decomposition, refinement
//! repeatedly computes the residual `r = b - A·x`, solves the correction
//! system `A·δ = r` with the existing factorization, and updates `x += δ`.
//!
//! The residual is computed at the backend's [`Widening::Wide`] precision:
//! the decomposition and substitution lose little accuracy compared to the
//! cancellation inside `b - A·x`, so widening just this step recovers nearly
//! all of it. Corrections are cheap since the factorization is reused.

use crate::internal_prelude::*;
use crate::assert;
use crate::linalg::matmul::{matmul, Accum};
use crate::linalg::reductions::norm_max::norm_max;

/// Stopping controls for the refinement loop.
#[derive(Clone, Debug)]
pub struct RefineParams<T> {
    /// Iteration budget; the only bound on the duration of an accurate solve.
    pub max_iters: usize,
    /// Convergence threshold on `‖δ‖ / ‖x‖`.
    pub tolerance: T,
}

impl<T: RealField> Default for RefineParams<T> {
    fn default() -> Self {
        Self {
            max_iters: 16,
            tolerance: T::epsilon(),
        }
    }
}

/// Outcome of a refinement run. Stagnation is not an error: it signals the
/// limit of representable precision, and the best available estimate is kept.
#[derive(Copy, Clone, Debug)]
pub struct RefineInfo {
    pub iterations: usize,
    pub stagnated: bool,
}

fn widen_mat<T: Widening>(mat: MatRef<'_, T>) -> Mat<T::Wide> {
    Mat::from_fn(mat.nrows(), mat.ncols(), |i, j| mat[(i, j)].widen())
}

/// Refines `x` towards the solution of `A x = rhs`, where `solve` applies an
/// existing factorization of `A` to a right-hand side in place.
///
/// Works identically for vector, matrix, and inversion right-hand sides
/// (inversion passes the identity). The loop stops when the correction drops
/// below `tolerance · ‖x‖`, when it stops decreasing, or when the budget is
/// exhausted.
#[track_caller]
pub fn refine_in_place<T: Widening>(
    A: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    x: MatMut<'_, T>,
    solve: &mut dyn FnMut(MatMut<'_, T>),
    params: RefineParams<T>,
) -> RefineInfo {
    let n = A.nrows();
    let k = rhs.ncols();
    assert!(all(
        A.ncols() == n,
        rhs.nrows() == n,
        x.nrows() == n,
        x.ncols() == k,
    ));

    let mut x = x;
    let A_wide = widen_mat(A);
    let rhs_wide = widen_mat(rhs);

    let mut info = RefineInfo {
        iterations: 0,
        stagnated: false,
    };
    let mut prev_norm: Option<T> = None;

    for iter in 0..params.max_iters {
        // r = rhs - A·x, at the wide precision
        let x_wide = widen_mat(x.rb());
        let mut r = rhs_wide.clone();
        matmul(
            r.as_mut(),
            Accum::Add,
            A_wide.as_ref(),
            x_wide.as_ref(),
            &one::<T::Wide>().neg(),
        );

        let mut delta = Mat::from_fn(n, k, |i, j| T::narrow(&r[(i, j)]));
        solve(delta.as_mut());

        let delta_norm = norm_max(delta.as_ref());
        if !delta_norm.is_finite() {
            info.stagnated = true;
            break;
        }
        if let Some(prev) = &prev_norm {
            if delta_norm >= *prev {
                // hit the representation's noise floor
                info.stagnated = true;
                break;
            }
        }

        for j in 0..k {
            for i in 0..n {
                let corrected = x[(i, j)].add(&delta[(i, j)]);
                x[(i, j)] = corrected;
            }
        }
        info.iterations = iter + 1;

        let x_norm = norm_max(x.rb());
        if delta_norm <= params.tolerance.mul(&x_norm) {
            log::trace!(
                target: "refina",
                "refinement converged after {} iteration(s)",
                info.iterations,
            );
            return info;
        }
        prev_norm = Some(delta_norm);
    }

    log::debug!(
        target: "refina",
        "refinement stopped before tolerance after {} iteration(s) (stagnated: {})",
        info.iterations,
        info.stagnated,
    );
    info
}
