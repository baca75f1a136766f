use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use super::util::{ratio_to_f64, split_square};
use super::{RadicalTable, Rational};
use crate::error::KernelError;

/// Exact real number: a rational, or `a + b·√d` in a real quadratic field.
///
/// Invariant for `Quadratic`: `b != 0` and `d > 1` is squarefree. Constructors
/// normalize, so two equal numbers always have equal representations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AlgebraicValue {
    Rational(Rational),
    Quadratic { a: Rational, b: Rational, d: BigInt },
}

use AlgebraicValue::{Quadratic, Rational as Rat};

impl AlgebraicValue {
    #[inline]
    pub fn zero() -> Self {
        Rat(Rational::zero())
    }

    #[inline]
    pub fn one() -> Self {
        Rat(Rational::one())
    }

    #[inline]
    pub fn from_integer(n: i64) -> Self {
        Rat(Rational::from_integer(BigInt::from(n)))
    }

    /// `a + b·√d` with an arbitrary non-negative radicand; square factors are pulled into `b`.
    pub fn quadratic(a: Rational, b: Rational, d: BigInt) -> Result<Self, KernelError> {
        if d.is_negative() {
            return Err(KernelError::NegativeRadicand {
                value: Rational::from_integer(d),
            });
        }
        let (k, m) = split_square(&d);
        let b = b * Rational::from_integer(k);
        if m.is_one() {
            return Ok(Rat(a + b));
        }
        Ok(Self::normalized(a, b, m))
    }

    /// `(a + b·√d) / c` with integer parts, as written in closed-form coordinates.
    pub fn from_parts(a: i64, b: i64, d: i64, c: i64) -> Result<Self, KernelError> {
        if c == 0 {
            return Err(KernelError::DivisionByZero);
        }
        let den = BigInt::from(c);
        Self::quadratic(
            Rational::new(BigInt::from(a), den.clone()),
            Rational::new(BigInt::from(b), den),
            BigInt::from(d),
        )
    }

    /// Assemble from an already-squarefree radicand.
    #[inline]
    fn normalized(a: Rational, b: Rational, d: BigInt) -> Self {
        if b.is_zero() {
            Rat(a)
        } else {
            Quadratic { a, b, d }
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self, Rat(r) if r.is_zero())
    }

    #[inline]
    pub fn as_rational(&self) -> Option<&Rational> {
        match self {
            Rat(r) => Some(r),
            Quadratic { .. } => None,
        }
    }

    /// Radicand of the field this value lives in; `None` for rationals.
    #[inline]
    pub fn field(&self) -> Option<&BigInt> {
        match self {
            Rat(_) => None,
            Quadratic { d, .. } => Some(d),
        }
    }

    /// Pure radical `b·√d` (or a plain rational zero).
    #[inline]
    fn is_pure(&self) -> bool {
        match self {
            Rat(r) => r.is_zero(),
            Quadratic { a, .. } => a.is_zero(),
        }
    }

    pub fn try_add(&self, other: &Self) -> Result<Self, KernelError> {
        match (self, other) {
            (Rat(x), Rat(y)) => Ok(Rat(x + y)),
            (Rat(x), Quadratic { a, b, d }) | (Quadratic { a, b, d }, Rat(x)) => Ok(Quadratic {
                a: a + x,
                b: b.clone(),
                d: d.clone(),
            }),
            (Quadratic { a: a1, b: b1, d: d1 }, Quadratic { a: a2, b: b2, d: d2 }) => {
                if d1 != d2 {
                    return Err(KernelError::FieldMismatch {
                        left: d1.clone(),
                        right: d2.clone(),
                    });
                }
                Ok(Self::normalized(a1 + a2, b1 + b2, d1.clone()))
            }
        }
    }

    #[inline]
    pub fn try_sub(&self, other: &Self) -> Result<Self, KernelError> {
        self.try_add(&-other.clone())
    }

    /// Product. Same-field values and rational scalings always close; two pure
    /// radicals from different fields close as `√d1·√d2 = g·√(d1·d2/g²)`.
    pub fn try_mul(&self, other: &Self) -> Result<Self, KernelError> {
        match (self, other) {
            (Rat(x), Rat(y)) => Ok(Rat(x * y)),
            (Rat(x), v) | (v, Rat(x)) => Ok(v.scale(x)),
            (Quadratic { a: a1, b: b1, d: d1 }, Quadratic { a: a2, b: b2, d: d2 }) => {
                if d1 == d2 {
                    let d = Rational::from_integer(d1.clone());
                    return Ok(Self::normalized(
                        a1 * a2 + b1 * b2 * d,
                        a1 * b2 + b1 * a2,
                        d1.clone(),
                    ));
                }
                if self.is_pure() && other.is_pure() {
                    let g = d1.gcd(d2);
                    let m = (d1 / &g) * (d2 / &g);
                    let coef = b1 * b2 * Rational::from_integer(g);
                    return Self::quadratic(Rational::zero(), coef, m);
                }
                Err(KernelError::FieldMismatch {
                    left: d1.clone(),
                    right: d2.clone(),
                })
            }
        }
    }

    /// Multiply by a rational; never leaves the field.
    pub fn scale(&self, k: &Rational) -> Self {
        match self {
            Rat(x) => Rat(x * k),
            Quadratic { a, b, d } => Self::normalized(a * k, b * k, d.clone()),
        }
    }

    /// `self²`, always inside the field of `self`.
    pub fn square(&self) -> Self {
        match self {
            Rat(x) => Rat(x * x),
            Quadratic { a, b, d } => {
                let dd = Rational::from_integer(d.clone());
                let two = Rational::from_integer(BigInt::from(2));
                Self::normalized(a * a + b * b * dd, two * a * b, d.clone())
            }
        }
    }

    /// Multiplicative inverse via the field conjugate: `1/(a+b√d) = (a-b√d)/(a²-b²d)`.
    pub fn try_recip(&self) -> Result<Self, KernelError> {
        match self {
            Rat(x) => {
                if x.is_zero() {
                    Err(KernelError::DivisionByZero)
                } else {
                    Ok(Rat(x.recip()))
                }
            }
            Quadratic { a, b, d } => {
                let norm = a * a - b * b * Rational::from_integer(d.clone());
                // norm is non-zero: d is not a perfect square and b != 0.
                Ok(Quadratic {
                    a: a / &norm,
                    b: -(b / &norm),
                    d: d.clone(),
                })
            }
        }
    }

    #[inline]
    pub fn try_div(&self, other: &Self) -> Result<Self, KernelError> {
        self.try_mul(&other.try_recip()?)
    }

    /// Exact sign, compared against zero.
    pub fn sign(&self) -> Ordering {
        match self {
            Rat(x) => x.cmp(&Rational::zero()),
            Quadratic { a, b, d } => {
                let sa = a.cmp(&Rational::zero());
                let sb = b.cmp(&Rational::zero());
                if sa == Ordering::Equal || sa == sb {
                    return sb;
                }
                // Opposite signs: the larger magnitude wins (a² vs b²d never tie).
                let lhs = a * a;
                let rhs = b * b * Rational::from_integer(d.clone());
                if lhs > rhs {
                    sa
                } else {
                    sb
                }
            }
        }
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.sign() == Ordering::Greater
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.sign() == Ordering::Less
    }

    /// Exact comparison; fails only when the difference is not representable.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, KernelError> {
        Ok(self.try_sub(other)?.sign())
    }

    /// Floating evaluation. Radicals come from the table; nothing else is approximated.
    pub fn to_f64(&self, radicals: &RadicalTable) -> f64 {
        match self {
            Rat(x) => ratio_to_f64(x),
            Quadratic { a, b, d } => ratio_to_f64(a) + ratio_to_f64(b) * radicals.sqrt(d),
        }
    }
}

impl Default for AlgebraicValue {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Rational> for AlgebraicValue {
    fn from(r: Rational) -> Self {
        Rat(r)
    }
}

impl Neg for AlgebraicValue {
    type Output = AlgebraicValue;
    fn neg(self) -> Self::Output {
        match self {
            Rat(x) => Rat(-x),
            Quadratic { a, b, d } => Quadratic { a: -a, b: -b, d },
        }
    }
}

impl fmt::Display for AlgebraicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rat(x) => write!(f, "{x}"),
            Quadratic { a, b, d } => {
                if !a.is_zero() {
                    write!(f, "{a} ")?;
                    if b.is_negative() {
                        write!(f, "- ")?;
                    } else {
                        write!(f, "+ ")?;
                    }
                } else if b.is_negative() {
                    write!(f, "-")?;
                }
                let mag = b.abs();
                if mag.is_one() {
                    write!(f, "√{d}")
                } else {
                    write!(f, "({mag})√{d}")
                }
            }
        }
    }
}
