//! Column-major dense matrix container and its borrowed views.

use core::fmt;
use core::ops::{Index, IndexMut};

use reborrow::{IntoConst, Reborrow, ReborrowMut};

use crate::assert;
use refina_traits::RealField;

/// Immutable view over column-major matrix data.
pub struct MatRef<'a, T> {
    data: &'a [T],
    nrows: usize,
    ncols: usize,
}

impl<T> Copy for MatRef<'_, T> {}
impl<T> Clone for MatRef<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> MatRef<'a, T> {
    /// Wraps a column-major slice. `data.len()` must equal `nrows * ncols`.
    #[inline]
    #[track_caller]
    pub fn from_column_major_slice(data: &'a [T], nrows: usize, ncols: usize) -> Self {
        assert!(data.len() == nrows * ncols);
        Self { data, nrows, ncols }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Column `j` as a contiguous slice.
    #[inline]
    #[track_caller]
    pub fn col(self, j: usize) -> &'a [T] {
        assert!(j < self.ncols);
        &self.data[j * self.nrows..(j + 1) * self.nrows]
    }

    pub fn to_owned(&self) -> Mat<T>
    where
        T: Clone,
    {
        Mat {
            data: self.data.to_vec(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    pub fn transpose(&self) -> Mat<T>
    where
        T: Clone,
    {
        let src = *self;
        Mat::from_fn(self.ncols, self.nrows, |i, j| src[(j, i)].clone())
    }
}

impl<T> Index<(usize, usize)> for MatRef<'_, T> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(all(i < self.nrows, j < self.ncols));
        &self.data[i + j * self.nrows]
    }
}

/// Mutable view over column-major matrix data.
pub struct MatMut<'a, T> {
    data: &'a mut [T],
    nrows: usize,
    ncols: usize,
}

impl<'a, T> MatMut<'a, T> {
    /// Wraps a column-major slice. `data.len()` must equal `nrows * ncols`.
    #[inline]
    #[track_caller]
    pub fn from_column_major_slice(data: &'a mut [T], nrows: usize, ncols: usize) -> Self {
        assert!(data.len() == nrows * ncols);
        Self { data, nrows, ncols }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Column `j` as a contiguous mutable slice.
    #[inline]
    #[track_caller]
    pub fn col_mut(&mut self, j: usize) -> &mut [T] {
        assert!(j < self.ncols);
        &mut self.data[j * self.nrows..(j + 1) * self.nrows]
    }

    #[track_caller]
    pub fn copy_from(&mut self, src: MatRef<'_, T>)
    where
        T: Clone,
    {
        assert!(all(self.nrows == src.nrows(), self.ncols == src.ncols()));
        self.data.clone_from_slice(src.data);
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        for x in self.data.iter_mut() {
            *x = value.clone();
        }
    }
}

impl<T> Index<(usize, usize)> for MatMut<'_, T> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(all(i < self.nrows, j < self.ncols));
        &self.data[i + j * self.nrows]
    }
}

impl<T> IndexMut<(usize, usize)> for MatMut<'_, T> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(all(i < self.nrows, j < self.ncols));
        &mut self.data[i + j * self.nrows]
    }
}

impl<'short, T> Reborrow<'short> for MatMut<'_, T> {
    type Target = MatRef<'short, T>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        MatRef {
            data: &*self.data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<'short, T> ReborrowMut<'short> for MatMut<'_, T> {
    type Target = MatMut<'short, T>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        MatMut {
            data: &mut *self.data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<'a, T> IntoConst for MatMut<'a, T> {
    type Target = MatRef<'a, T>;

    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            data: self.data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<'short, T> Reborrow<'short> for MatRef<'_, T> {
    type Target = MatRef<'short, T>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

/// Owned column-major matrix.
#[derive(Clone, PartialEq)]
pub struct Mat<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

impl<T> Mat<T> {
    #[track_caller]
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    pub fn as_ref(&self) -> MatRef<'_, T> {
        MatRef {
            data: &self.data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    #[inline]
    pub fn as_mut(&mut self) -> MatMut<'_, T> {
        MatMut {
            data: &mut self.data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    #[inline]
    #[track_caller]
    pub fn col(&self, j: usize) -> &[T] {
        self.as_ref().col(j)
    }

    #[inline]
    #[track_caller]
    pub fn col_mut(&mut self, j: usize) -> &mut [T] {
        assert!(j < self.ncols);
        &mut self.data[j * self.nrows..(j + 1) * self.nrows]
    }

    pub fn transpose(&self) -> Mat<T>
    where
        T: Clone,
    {
        self.as_ref().transpose()
    }
}

impl<T: RealField> Mat<T> {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::from_fn(nrows, ncols, |_, _| T::zero())
    }

    pub fn identity(dim: usize) -> Self {
        Self::from_fn(dim, dim, |i, j| if i == j { T::one() } else { T::zero() })
    }

    /// Builds a matrix from row-major `f64` literals, converting each element
    /// with [`RealField::from_f64`]. Convenient for fixtures.
    #[track_caller]
    pub fn from_f64_rows(rows: &[&[f64]]) -> Self {
        assert!(!rows.is_empty());
        let ncols = rows[0].len();
        for row in rows {
            assert!(row.len() == ncols);
        }
        Self::from_fn(rows.len(), ncols, |i, j| T::from_f64(rows[i][j]))
    }
}

impl<T> Index<(usize, usize)> for Mat<T> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(all(i < self.nrows, j < self.ncols));
        &self.data[i + j * self.nrows]
    }
}

impl<T> IndexMut<(usize, usize)> for Mat<T> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(all(i < self.nrows, j < self.ncols));
        &mut self.data[i + j * self.nrows]
    }
}

impl<T: fmt::Debug> fmt::Debug for Mat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

impl<T: fmt::Debug> fmt::Debug for MatRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = f.debug_list();
        for i in 0..self.nrows {
            rows.entry(&DebugRow { mat: *self, row: i });
        }
        rows.finish()
    }
}

impl<T: fmt::Debug> fmt::Debug for MatMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.rb().fmt(f)
    }
}

struct DebugRow<'a, T> {
    mat: MatRef<'a, T>,
    row: usize,
}

impl<T: fmt::Debug> fmt::Debug for DebugRow<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut row = f.debug_list();
        for j in 0..self.mat.ncols() {
            row.entry(&self.mat[(self.row, j)]);
        }
        row.finish()
    }
}

/// First element that is NaN or infinite, if any.
pub fn has_non_finite<T: RealField>(mat: MatRef<'_, T>) -> Option<(usize, usize)> {
    for j in 0..mat.ncols() {
        for i in 0..mat.nrows() {
            if !mat[(i, j)].is_finite() {
                return Some((i, j));
            }
        }
    }
    None
}
