//! Approximate comparisons for tests and diagnostics.

use crate::internal_prelude::*;
use crate::assert;

/// Absolute/relative tolerance pair.
#[derive(Clone, Debug)]
pub struct ApproxEq<T> {
    pub abs_tol: T,
    pub rel_tol: T,
}

impl<T: RealField> ApproxEq<T> {
    /// A tolerance a moderate amount above the backend's epsilon.
    pub fn eps() -> Self {
        let tol = T::epsilon().mul(&from_f64(128.0));
        Self {
            abs_tol: tol.clone(),
            rel_tol: tol,
        }
    }

    /// The same tolerance for both the absolute and relative test.
    pub fn with_tol(tol: T) -> Self {
        Self {
            abs_tol: tol.clone(),
            rel_tol: tol,
        }
    }

    pub fn test(&self, lhs: &T, rhs: &T) -> bool {
        let diff = lhs.sub(rhs).abs();
        let lhs_abs = lhs.abs();
        let rhs_abs = rhs.abs();
        let max = if lhs_abs > rhs_abs { lhs_abs } else { rhs_abs };

        diff <= self.abs_tol || diff <= self.rel_tol.mul(&max)
    }
}

/// Panics with the first differing element if the matrices are not
/// approximately equal.
#[track_caller]
pub fn assert_mat_eq<T: RealField>(lhs: MatRef<'_, T>, rhs: MatRef<'_, T>, cmp: &ApproxEq<T>) {
    assert!(all(lhs.nrows() == rhs.nrows(), lhs.ncols() == rhs.ncols()));
    for j in 0..lhs.ncols() {
        for i in 0..lhs.nrows() {
            let l = &lhs[(i, j)];
            let r = &rhs[(i, j)];
            if !cmp.test(l, r) {
                panic!(
                    "matrices differ at ({i}, {j}): {l:?} vs {r:?} (distance {:?})",
                    l.sub(r).abs(),
                );
            }
        }
    }
}
