//! Norms, determinant, and condition number.

pub mod determinant;
pub mod norm_inf;
pub mod norm_max;

pub use determinant::{determinant, determinant_from_lu};
pub use norm_inf::norm_inf;
pub use norm_max::norm_max;

use crate::internal_prelude::*;
use crate::assert;

/// `‖A‖_∞ · ‖A⁻¹‖_∞`, from the original (unscaled) matrix and a computed
/// inverse.
///
/// Callers signal a singular matrix by returning [`RealField::infinity`]
/// directly instead of computing an inverse; an infinite condition number is
/// an explicit result state, never an overflow artifact.
#[track_caller]
pub fn condition_number<T: RealField>(mat: MatRef<'_, T>, inverse: MatRef<'_, T>) -> T {
    assert!(all(
        mat.nrows() == mat.ncols(),
        inverse.nrows() == mat.nrows(),
        inverse.ncols() == mat.ncols(),
    ));
    norm_inf(mat).mul(&norm_inf(inverse))
}
