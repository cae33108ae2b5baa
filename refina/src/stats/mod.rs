//! Random matrices and error statistics for accuracy testing.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::internal_prelude::*;
use crate::assert;

/// Aggregate error between an expected and an actual array, measured in
/// `f64`. Used to validate refinement quality, not part of the solver's
/// runtime contract.
#[derive(Copy, Clone, Debug)]
pub struct ErrorStats {
    pub mse: f64,
    pub mean: f64,
    pub max: f64,
}

#[track_caller]
pub fn error_stats<T: RealField>(expected: MatRef<'_, T>, actual: MatRef<'_, T>) -> ErrorStats {
    assert!(all(
        expected.nrows() == actual.nrows(),
        expected.ncols() == actual.ncols(),
    ));
    let count = expected.nrows() * expected.ncols();
    assert!(count > 0);

    let mut sum_sq = 0.0;
    let mut sum = 0.0;
    let mut max = 0.0f64;
    for j in 0..expected.ncols() {
        for i in 0..expected.nrows() {
            let err = expected[(i, j)].sub(&actual[(i, j)]).abs().to_f64();
            sum_sq += err * err;
            sum += err;
            max = max.max(err);
        }
    }

    ErrorStats {
        mse: sum_sq / count as f64,
        mean: sum / count as f64,
        max,
    }
}

/// Matrix with standard normal entries.
pub fn random_mat<T: RealField, R: Rng>(rng: &mut R, nrows: usize, ncols: usize) -> Mat<T> {
    Mat::from_fn(nrows, ncols, |_, _| {
        T::from_f64(rng.sample::<f64, _>(StandardNormal))
    })
}

/// Matrix with integer entries in `[-max_abs, max_abs]`. Products of such
/// matrices against small integer solutions are exactly representable in
/// every backend, so solve errors can be measured against the true solution.
pub fn random_int_mat<T: RealField, R: Rng>(
    rng: &mut R,
    nrows: usize,
    ncols: usize,
    max_abs: i32,
) -> Mat<T> {
    Mat::from_fn(nrows, ncols, |_, _| {
        T::from_f64(rng.gen_range(-max_abs..=max_abs) as f64)
    })
}
