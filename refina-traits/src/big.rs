//! Arbitrary precision backend, backed by MPFR through [`rug`].
//!
//! Values carry their own precision; binary operations round the result at
//! the precision of the wider operand. Values constructed through
//! [`RealField::from_f64`] use the process-wide default precision.

use core::sync::atomic::{AtomicU32, Ordering};

use rug::float::Special;
use rug::Float;

use crate::double::{Double, DoubleF64};
use crate::{RealField, Widening};

static GLOBAL_PRECISION: AtomicU32 = AtomicU32::new(256);

/// Sets the default precision, in bits, of [`Big`] values constructed from
/// this point on. Consumed at value-construction time; existing values keep
/// the precision they were created with.
#[inline]
pub fn set_global_precision(prec: u32) {
    assert!(prec >= 4);
    GLOBAL_PRECISION.store(prec, Ordering::Relaxed);
}

#[inline]
pub fn get_global_precision() -> u32 {
    GLOBAL_PRECISION.load(Ordering::Relaxed)
}

/// Arbitrary precision floating point scalar.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub struct Big(pub Float);

impl Big {
    #[inline]
    pub fn new(value: Float) -> Self {
        Self(value)
    }

    #[inline]
    pub fn prec(&self) -> u32 {
        self.0.prec()
    }

    #[inline]
    fn binop_prec(&self, rhs: &Self) -> u32 {
        Ord::max(self.0.prec(), rhs.0.prec())
    }
}

impl RealField for Big {
    #[inline]
    fn zero() -> Self {
        Self(Float::new(get_global_precision()))
    }
    #[inline]
    fn one() -> Self {
        Self(Float::with_val(get_global_precision(), 1))
    }
    #[inline]
    fn from_f64(value: f64) -> Self {
        Self(Float::with_val(get_global_precision(), value))
    }
    #[inline]
    fn to_f64(&self) -> f64 {
        self.0.to_f64()
    }

    #[inline]
    fn add(&self, rhs: &Self) -> Self {
        Self(Float::with_val(self.binop_prec(rhs), &self.0 + &rhs.0))
    }
    #[inline]
    fn sub(&self, rhs: &Self) -> Self {
        Self(Float::with_val(self.binop_prec(rhs), &self.0 - &rhs.0))
    }
    #[inline]
    fn mul(&self, rhs: &Self) -> Self {
        Self(Float::with_val(self.binop_prec(rhs), &self.0 * &rhs.0))
    }
    #[inline]
    fn div(&self, rhs: &Self) -> Self {
        Self(Float::with_val(self.binop_prec(rhs), &self.0 / &rhs.0))
    }
    #[inline]
    fn neg(&self) -> Self {
        Self(Float::with_val(self.0.prec(), -&self.0))
    }
    #[inline]
    fn recip(&self) -> Self {
        Self(Float::with_val(self.0.prec(), self.0.recip_ref()))
    }
    #[inline]
    fn abs(&self) -> Self {
        Self(Float::with_val(self.0.prec(), self.0.abs_ref()))
    }
    #[inline]
    fn sqrt(&self) -> Self {
        Self(Float::with_val(self.0.prec(), self.0.sqrt_ref()))
    }

    #[inline]
    fn epsilon() -> Self {
        let prec = get_global_precision();
        Self(Float::with_val(prec, Float::i_exp(1, 1 - prec as i32)))
    }
    #[inline]
    fn min_positive() -> Self {
        // Far below any quantity the solver produces; MPFR's actual exponent
        // range is much wider still.
        Self(Float::with_val(get_global_precision(), Float::i_exp(1, -1_000_000)))
    }
    #[inline]
    fn nan() -> Self {
        Self(Float::with_val(get_global_precision(), Special::Nan))
    }
    #[inline]
    fn infinity() -> Self {
        Self(Float::with_val(get_global_precision(), Special::Infinity))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
    #[inline]
    fn is_nan(&self) -> bool {
        self.0.is_nan()
    }
    #[inline]
    fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

/// Residual precision used when upgrading [`DoubleF64`].
const DOUBLE_WIDE_PREC: u32 = 256;

impl Widening for DoubleF64 {
    type Wide = Big;

    #[inline]
    fn widen(&self) -> Big {
        let mut wide = Float::with_val(DOUBLE_WIDE_PREC, self.0);
        wide += self.1;
        Big(wide)
    }

    #[inline]
    fn narrow(wide: &Big) -> Self {
        let hi = wide.0.to_f64();
        if !hi.is_finite() {
            return Double(hi, hi);
        }
        let lo = Float::with_val(wide.0.prec(), &wide.0 - hi).to_f64();
        Double::from_parts(hi, lo)
    }
}

impl Widening for Big {
    type Wide = Big;

    #[inline]
    fn widen(&self) -> Big {
        Self(Float::with_val(2 * self.0.prec(), &self.0))
    }

    #[inline]
    fn narrow(wide: &Big) -> Self {
        Self(Float::with_val(get_global_precision(), &wide.0))
    }
}
