//! `refina` solves dense square linear systems `Ax = b` and `AX = B` at three
//! interchangeable precisions behind one operation contract: native `f64`,
//! double-word extended precision ([`DoubleF64`]), and arbitrary precision
//! ([`Big`], MPFR-backed).
//!
//! The kernels are LU with partial pivoting and row equilibration for general
//! square matrices, and Cholesky (LLᵀ) for symmetric positive definite ones,
//! plus determinant, operator norm, and condition number. Every solver comes
//! in a "simple" (single decomposition) and an "accurate" variant; the
//! accurate variant runs iterative refinement, recomputing the residual at a
//! wider precision than the backend itself (see
//! [`linalg::refinement`]).
//!
//! ```
//! use refina::prelude::*;
//!
//! let A = Mat::<f64>::from_f64_rows(&[
//!     &[1.0, 2.0, 3.0, 1.0, 2.0],
//!     &[1.0, 2.0, 1.0, 2.0, 1.0],
//!     &[2.0, 1.0, 0.0, 1.0, 2.0],
//!     &[2.0, 1.0, 3.0, 2.0, 1.0],
//!     &[2.0, 2.0, 1.0, 1.0, 5.0],
//! ]);
//! let b = Mat::<f64>::from_f64_rows(&[&[16.0], &[9.0], &[6.0], &[14.0], &[14.0]]);
//!
//! let lu = PartialPivLu::new(A.as_ref());
//! let x = lu.solve_accurate(b.as_ref()).unwrap();
//! assert!((x[(2, 0)] - 3.0).abs() < 1e-14);
//! ```
//!
//! Solvers never mutate their input: each factorization works on an internal
//! copy. Calls are synchronous and single-threaded; the refinement iteration
//! budget is the only bound on a call's duration.

#![allow(non_snake_case)]

use core::sync::atomic::{AtomicBool, Ordering};

pub use equator::{assert, debug_assert};

pub mod linalg;
pub mod mat;
pub mod perm;
#[cfg(feature = "rand")]
pub mod stats;
pub mod utils;

pub use mat::{Mat, MatMut, MatRef};
pub use refina_traits::{
    get_global_precision, set_global_precision, Big, Double, DoubleF64, RealField, Widening,
};

static GLOBAL_ROW_SCALING: AtomicBool = AtomicBool::new(true);

/// Sets the process-wide default for row equilibration, consumed when a
/// factorization is constructed with [`linalg::equilibration::Scaling::Auto`].
#[inline]
pub fn set_global_row_scaling(enabled: bool) {
    GLOBAL_ROW_SCALING.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn get_global_row_scaling() -> bool {
    GLOBAL_ROW_SCALING.load(Ordering::Relaxed)
}

pub mod prelude {
    pub use crate::linalg::equilibration::Scaling;
    pub use crate::linalg::solvers::{Llt, PartialPivLu};
    pub use crate::mat::{Mat, MatMut, MatRef};
    pub use refina_traits::{Big, Double, DoubleF64, RealField, Widening};
}

pub(crate) mod internal_prelude {
    pub use crate::mat::{Mat, MatMut, MatRef};
    pub use crate::perm::{Perm, PermRef};
    #[allow(unused_imports)]
    pub use refina_traits::{from_f64, one, zero, RealField, Widening};
    #[allow(unused_imports)]
    pub use reborrow::*;
}
