//! Operator sugar on matrix references.

use core::ops::{Add, Mul, Neg, Sub};

use crate::internal_prelude::*;
use crate::assert;
use crate::linalg::matmul::{matmul, Accum};

impl<T: RealField> Mul for &Mat<T> {
    type Output = Mat<T>;

    #[track_caller]
    fn mul(self, rhs: Self) -> Mat<T> {
        let mut out = Mat::zeros(self.nrows(), rhs.ncols());
        matmul(out.as_mut(), Accum::Replace, self.as_ref(), rhs.as_ref(), &one());
        out
    }
}

impl<T: RealField> Add for &Mat<T> {
    type Output = Mat<T>;

    #[track_caller]
    fn add(self, rhs: Self) -> Mat<T> {
        assert!(self.shape() == rhs.shape());
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| {
            self[(i, j)].add(&rhs[(i, j)])
        })
    }
}

impl<T: RealField> Sub for &Mat<T> {
    type Output = Mat<T>;

    #[track_caller]
    fn sub(self, rhs: Self) -> Mat<T> {
        assert!(self.shape() == rhs.shape());
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| {
            self[(i, j)].sub(&rhs[(i, j)])
        })
    }
}

impl<T: RealField> Neg for &Mat<T> {
    type Output = Mat<T>;

    fn neg(self) -> Mat<T> {
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| self[(i, j)].neg())
    }
}
