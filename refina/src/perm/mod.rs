//! Row permutations and their application to matrices.

use dyn_stack::{MemStack, StackReq};

use crate::internal_prelude::*;
use crate::{assert, debug_assert};

/// Owned permutation, stored as a forward/inverse index pair.
#[derive(Clone, Debug)]
pub struct Perm {
    fwd: Box<[usize]>,
    inv: Box<[usize]>,
}

impl Perm {
    pub fn identity(len: usize) -> Self {
        let fwd: Box<[usize]> = (0..len).collect();
        let inv = fwd.clone();
        Self { fwd, inv }
    }

    /// `inv` must be the inverse of `fwd`.
    #[track_caller]
    pub fn new(fwd: Box<[usize]>, inv: Box<[usize]>) -> Self {
        assert!(fwd.len() == inv.len());
        debug_assert!(is_inverse(&fwd, &inv));
        Self { fwd, inv }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fwd.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fwd.is_empty()
    }

    #[inline]
    pub fn as_ref(&self) -> PermRef<'_> {
        PermRef {
            fwd: &self.fwd,
            inv: &self.inv,
        }
    }
}

/// Borrowed permutation.
#[derive(Copy, Clone, Debug)]
pub struct PermRef<'a> {
    fwd: &'a [usize],
    inv: &'a [usize],
}

impl<'a> PermRef<'a> {
    /// `inv` must be the inverse of `fwd`.
    #[track_caller]
    pub fn new(fwd: &'a [usize], inv: &'a [usize]) -> Self {
        assert!(fwd.len() == inv.len());
        debug_assert!(is_inverse(fwd, inv));
        Self { fwd, inv }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fwd.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fwd.is_empty()
    }

    #[inline]
    pub fn fwd(&self) -> &'a [usize] {
        self.fwd
    }

    #[inline]
    pub fn inv(&self) -> &'a [usize] {
        self.inv
    }

    /// The permutation mapping the other way.
    #[inline]
    pub fn inverse(self) -> PermRef<'a> {
        PermRef {
            fwd: self.inv,
            inv: self.fwd,
        }
    }
}

fn is_inverse(fwd: &[usize], inv: &[usize]) -> bool {
    fwd.len() == inv.len()
        && fwd.iter().all(|&f| f < inv.len())
        && fwd.iter().enumerate().all(|(i, &f)| inv[f] == i)
}

/// Swaps rows `a` and `b` of `mat`.
#[track_caller]
pub fn swap_rows_idx<T>(mat: MatMut<'_, T>, a: usize, b: usize) {
    let mut mat = mat;
    assert!(all(a < mat.nrows(), b < mat.nrows()));
    if a == b {
        return;
    }
    for j in 0..mat.ncols() {
        mat.col_mut(j).swap(a, b);
    }
}

/// `dst[i] = src[perm.fwd()[i]]`, column by column.
#[track_caller]
pub fn permute_rows<T: Clone>(dst: MatMut<'_, T>, src: MatRef<'_, T>, perm: PermRef<'_>) {
    let mut dst = dst;
    assert!(all(
        dst.nrows() == src.nrows(),
        dst.ncols() == src.ncols(),
        perm.len() == src.nrows(),
    ));
    let fwd = perm.fwd();
    for j in 0..src.ncols() {
        let src_col = src.col(j);
        let dst_col = dst.col_mut(j);
        for i in 0..src_col.len() {
            dst_col[i] = src_col[fwd[i]].clone();
        }
    }
}

pub fn permute_rows_in_place_scratch<T>(nrows: usize, ncols: usize) -> StackReq {
    _ = ncols;
    StackReq::new::<T>(nrows)
}

/// Applies `perm` to the rows of `mat`, using `stack` for a column of scratch.
#[track_caller]
pub fn permute_rows_in_place<T: Clone>(mat: MatMut<'_, T>, perm: PermRef<'_>, stack: &mut MemStack) {
    let mut mat = mat;
    let (m, n) = mat.shape();
    assert!(perm.len() == m);
    let fwd = perm.fwd();
    for j in 0..n {
        let col = mat.col_mut(j);
        let (tmp, _) = stack.make_with(m, |i| col[fwd[i]].clone());
        for i in 0..m {
            col[i] = tmp[i].clone();
        }
    }
}
