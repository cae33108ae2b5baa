use dyn_stack::{MemStack, StackReq};

use crate::internal_prelude::*;
use crate::assert;
use crate::perm::swap_rows_idx;

/// Information about the resulting $LU$ factorization.
#[derive(Copy, Clone, Debug)]
pub struct PartialPivLuInfo {
    /// Number of transpositions that were performed, can be used to compute
    /// the determinant of $P$.
    pub transposition_count: usize,
    /// First pivot column whose candidates were all zero, if any. The
    /// factorization stopped at that column and the matrix is singular.
    pub zero_pivot: Option<usize>,
}

/// Error of a solve or inverse against a singular factorization.
#[derive(Copy, Clone, Debug)]
pub enum LuError {
    SingularMatrix { index: usize },
}

impl core::fmt::Display for LuError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}
impl core::error::Error for LuError {}

fn lu_in_place_unblocked<T: RealField>(
    A: MatMut<'_, T>,
    trans: &mut [usize],
) -> (usize, Option<usize>) {
    let mut A = A;
    let n = A.nrows();
    let mut n_trans = 0;

    for k in 0..n {
        let mut imax = k;
        let mut max = zero::<T>();
        for i in k..n {
            let abs = A[(i, k)].abs();
            if abs > max {
                max = abs;
                imax = i;
            }
        }

        if max.is_zero() || !max.is_finite() {
            return (n_trans, Some(k));
        }

        trans[k] = imax - k;
        if imax != k {
            swap_rows_idx(A.rb_mut(), k, imax);
            n_trans += 1;
        }

        let inv = A[(k, k)].recip();
        for i in k + 1..n {
            A[(i, k)] = A[(i, k)].mul(&inv);
        }
        for j in k + 1..n {
            let ukj = A[(k, j)].clone();
            for i in k + 1..n {
                let lik_ukj = A[(i, k)].mul(&ukj);
                A[(i, j)] = A[(i, j)].sub(&lik_ukj);
            }
        }
    }

    (n_trans, None)
}

#[inline]
pub fn lu_in_place_scratch<T: RealField>(nrows: usize, ncols: usize) -> StackReq {
    _ = ncols;
    StackReq::new::<usize>(nrows)
}

/// Factors the square matrix in place into unit-lower and upper triangular
/// factors, `LU = PA`, selecting each pivot as the largest-magnitude
/// candidate in its column.
///
/// The multipliers of `L` are stored in the vacated strictly lower triangle;
/// `U` occupies the diagonal and above. `perm`/`perm_inv` receive the row
/// permutation. A column with no nonzero pivot candidate marks the matrix
/// singular ([`PartialPivLuInfo::zero_pivot`]) and stops the elimination;
/// near-zero pivots are accepted and left to iterative refinement.
#[track_caller]
pub fn lu_in_place<'out, T: RealField>(
    A: MatMut<'_, T>,
    perm: &'out mut [usize],
    perm_inv: &'out mut [usize],
    stack: &mut MemStack,
) -> (PartialPivLuInfo, PermRef<'out>) {
    let mut A = A;
    let n = A.nrows();
    assert!(all(A.ncols() == n, perm.len() == n, perm_inv.len() == n));

    for (i, p) in perm.iter_mut().enumerate() {
        *p = i;
    }

    let (mut transpositions, _) = stack.make_with(n, |_| 0usize);
    let (n_transpositions, zero_pivot) = lu_in_place_unblocked(A.rb_mut(), &mut transpositions);

    let factored = match zero_pivot {
        Some(k) => k,
        None => n,
    };
    for idx in 0..factored {
        let t = transpositions[idx];
        perm.swap(idx, idx + t);
    }
    for i in 0..n {
        perm_inv[perm[i]] = i;
    }

    (
        PartialPivLuInfo {
            transposition_count: n_transpositions,
            zero_pivot,
        },
        PermRef::new(perm, perm_inv),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::matmul::{matmul, Accum};
    use crate::mat::Mat;
    use crate::perm::permute_rows;
    use crate::utils::approx::{assert_mat_eq, ApproxEq};
    use dyn_stack::MemBuffer;
    use rand::prelude::*;
    use rand_distr::StandardNormal;

    fn split_lu(LU: &Mat<f64>) -> (Mat<f64>, Mat<f64>) {
        let n = LU.nrows();
        let L = Mat::from_fn(n, n, |i, j| {
            if i > j {
                LU[(i, j)]
            } else if i == j {
                1.0
            } else {
                0.0
            }
        });
        let U = Mat::from_fn(n, n, |i, j| if i <= j { LU[(i, j)] } else { 0.0 });
        (L, U)
    }

    #[test]
    fn reconstructs_permuted_input() {
        let rng = &mut StdRng::seed_from_u64(0);
        for n in [1, 2, 3, 10, 24] {
            let A = Mat::from_fn(n, n, |_, _| rng.sample::<f64, _>(StandardNormal));

            let mut LU = A.clone();
            let perm = &mut *vec![0usize; n];
            let perm_inv = &mut *vec![0usize; n];
            let (info, p) = lu_in_place(
                LU.as_mut(),
                perm,
                perm_inv,
                MemStack::new(&mut MemBuffer::new(lu_in_place_scratch::<f64>(n, n))),
            );
            assert!(info.zero_pivot.is_none());

            let (L, U) = split_lu(&LU);
            let mut PA = Mat::zeros(n, n);
            permute_rows(PA.as_mut(), A.as_ref(), p);

            let mut R = PA.clone();
            matmul(R.as_mut(), Accum::Add, L.as_ref(), U.as_ref(), &-1.0);
            assert_mat_eq(
                R.as_ref(),
                Mat::zeros(n, n).as_ref(),
                &ApproxEq::with_tol(1e-12),
            );
        }
    }

    #[test]
    fn multipliers_are_bounded_by_pivoting() {
        let rng = &mut StdRng::seed_from_u64(1);
        let n = 16;
        let A = Mat::from_fn(n, n, |_, _| rng.sample::<f64, _>(StandardNormal));
        let mut LU = A.clone();
        let perm = &mut *vec![0usize; n];
        let perm_inv = &mut *vec![0usize; n];
        lu_in_place(
            LU.as_mut(),
            perm,
            perm_inv,
            MemStack::new(&mut MemBuffer::new(lu_in_place_scratch::<f64>(n, n))),
        );
        for j in 0..n {
            for i in j + 1..n {
                assert!(LU[(i, j)].abs() <= 1.0);
            }
        }
    }

    #[test]
    fn scaled_duplicate_row_is_singular() {
        // row 3 is twice row 1
        let A = Mat::<f64>::from_f64_rows(&[
            &[1.0, 2.0, 3.0, 1.0, 2.0],
            &[1.0, 2.0, 1.0, 2.0, 1.0],
            &[2.0, 1.0, 0.0, 1.0, 2.0],
            &[2.0, 4.0, 2.0, 4.0, 2.0],
            &[2.0, 2.0, 1.0, 1.0, 5.0],
        ]);
        let mut LU = A.clone();
        let perm = &mut *vec![0usize; 5];
        let perm_inv = &mut *vec![0usize; 5];
        let (info, _) = lu_in_place(
            LU.as_mut(),
            perm,
            perm_inv,
            MemStack::new(&mut MemBuffer::new(lu_in_place_scratch::<f64>(5, 5))),
        );
        assert_eq!(info.zero_pivot, Some(4));
    }
}
