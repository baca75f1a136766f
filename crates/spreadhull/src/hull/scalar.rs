use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use std::fmt::Debug;

use crate::algebra::{ratio_to_f64, AlgebraicValue, RadicalTable, Rational};
use crate::error::KernelError;
use crate::projection::PlanePoint;

/// Coordinates the hull engine can orient and order.
///
/// Exact implementations decide signs without tolerance; `f64` uses the
/// coincidence tolerance of the floating path.
pub trait Scalar: Clone + Debug + PartialEq + Send + Sync {
    fn from_rational(r: &Rational) -> Self;
    fn add(&self, rhs: &Self) -> Result<Self, KernelError>;
    fn sub(&self, rhs: &Self) -> Result<Self, KernelError>;
    fn mul(&self, rhs: &Self) -> Result<Self, KernelError>;
    fn sign(&self) -> Ordering;
    fn to_f64(&self, radicals: &RadicalTable) -> f64;

    /// Total order for the lexicographic sweep. Only valid after `comparable` succeeded.
    fn order(&self, other: &Self) -> Ordering;

    /// Whether all values can be ordered against each other.
    fn comparable(_values: &[Self]) -> Result<(), KernelError> {
        Ok(())
    }

    fn coincident(a: &PlanePoint<Self>, b: &PlanePoint<Self>) -> bool {
        a == b
    }
}

impl Scalar for AlgebraicValue {
    #[inline]
    fn from_rational(r: &Rational) -> Self {
        AlgebraicValue::Rational(r.clone())
    }
    #[inline]
    fn add(&self, rhs: &Self) -> Result<Self, KernelError> {
        self.try_add(rhs)
    }
    #[inline]
    fn sub(&self, rhs: &Self) -> Result<Self, KernelError> {
        self.try_sub(rhs)
    }
    #[inline]
    fn mul(&self, rhs: &Self) -> Result<Self, KernelError> {
        self.try_mul(rhs)
    }
    #[inline]
    fn sign(&self) -> Ordering {
        AlgebraicValue::sign(self)
    }
    #[inline]
    fn to_f64(&self, radicals: &RadicalTable) -> f64 {
        AlgebraicValue::to_f64(self, radicals)
    }
    fn order(&self, other: &Self) -> Ordering {
        self.try_cmp(other).unwrap_or(Ordering::Equal)
    }
    /// Differences stay representable when at most one quadratic field occurs.
    fn comparable(values: &[Self]) -> Result<(), KernelError> {
        let mut field: Option<&BigInt> = None;
        for d in values.iter().filter_map(AlgebraicValue::field) {
            match field {
                None => field = Some(d),
                Some(f) if f != d => {
                    return Err(KernelError::FieldMismatch {
                        left: f.clone(),
                        right: d.clone(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Scalar for Rational {
    #[inline]
    fn from_rational(r: &Rational) -> Self {
        r.clone()
    }
    #[inline]
    fn add(&self, rhs: &Self) -> Result<Self, KernelError> {
        Ok(self + rhs)
    }
    #[inline]
    fn sub(&self, rhs: &Self) -> Result<Self, KernelError> {
        Ok(self - rhs)
    }
    #[inline]
    fn mul(&self, rhs: &Self) -> Result<Self, KernelError> {
        Ok(self * rhs)
    }
    #[inline]
    fn sign(&self) -> Ordering {
        if self.is_zero() {
            Ordering::Equal
        } else if self.is_positive() {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }
    #[inline]
    fn to_f64(&self, _radicals: &RadicalTable) -> f64 {
        ratio_to_f64(self)
    }
    #[inline]
    fn order(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// Distance below which two floating points are treated as one.
pub const FLOAT_COINCIDENCE: f64 = 1e-12;

impl Scalar for f64 {
    #[inline]
    fn from_rational(r: &Rational) -> Self {
        ratio_to_f64(r)
    }
    #[inline]
    fn add(&self, rhs: &Self) -> Result<Self, KernelError> {
        Ok(self + rhs)
    }
    #[inline]
    fn sub(&self, rhs: &Self) -> Result<Self, KernelError> {
        Ok(self - rhs)
    }
    #[inline]
    fn mul(&self, rhs: &Self) -> Result<Self, KernelError> {
        Ok(self * rhs)
    }
    #[inline]
    fn sign(&self) -> Ordering {
        self.partial_cmp(&0.0).unwrap_or(Ordering::Equal)
    }
    #[inline]
    fn to_f64(&self, _radicals: &RadicalTable) -> f64 {
        *self
    }
    #[inline]
    fn order(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
    fn comparable(values: &[Self]) -> Result<(), KernelError> {
        if values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(KernelError::NonFinite)
        }
    }
    fn coincident(a: &PlanePoint<Self>, b: &PlanePoint<Self>) -> bool {
        (a.x - b.x).hypot(a.y - b.y) < FLOAT_COINCIDENCE
    }
}
