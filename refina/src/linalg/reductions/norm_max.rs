use crate::internal_prelude::*;

/// Largest absolute value of any element; zero for empty matrices. NaN
/// elements propagate to the result instead of being ignored.
pub fn norm_max<T: RealField>(mat: MatRef<'_, T>) -> T {
    let mut acc = zero::<T>();
    for j in 0..mat.ncols() {
        for i in 0..mat.nrows() {
            let abs = mat[(i, j)].abs();
            if abs.is_nan() {
                return abs;
            }
            if abs > acc {
                acc = abs;
            }
        }
    }
    acc
}
