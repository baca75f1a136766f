use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::util::ratio_to_f64;
use super::{AlgebraicValue, Rational};
use crate::error::KernelError;

/// Exact 3-vector.
pub type Vec3 = [AlgebraicValue; 3];

pub fn dot3(u: &Vec3, v: &Vec3) -> Result<AlgebraicValue, KernelError> {
    let mut acc = u[0].try_mul(&v[0])?;
    acc = acc.try_add(&u[1].try_mul(&v[1])?)?;
    acc.try_add(&u[2].try_mul(&v[2])?)
}

pub fn cross3(u: &Vec3, v: &Vec3) -> Result<Vec3, KernelError> {
    let c = |i: usize, j: usize| -> Result<AlgebraicValue, KernelError> {
        u[i].try_mul(&v[j])?.try_sub(&u[j].try_mul(&v[i])?)
    };
    Ok([c(1, 2)?, c(2, 0)?, c(0, 1)?])
}

/// Squared length.
#[inline]
pub fn quadrance(v: &Vec3) -> Result<AlgebraicValue, KernelError> {
    dot3(v, v)
}

pub fn quadrance_between(p: &Vec3, q: &Vec3) -> Result<AlgebraicValue, KernelError> {
    let d = [
        q[0].try_sub(&p[0])?,
        q[1].try_sub(&p[1])?,
        q[2].try_sub(&p[2])?,
    ];
    quadrance(&d)
}

/// Spread between two vectors: `1 − (u·v)² / (Q(u)·Q(v))`, i.e. `sin²` of the angle.
///
/// Errors with `DegenerateVector` when either vector has zero quadrance.
pub fn spread(u: &Vec3, v: &Vec3) -> Result<AlgebraicValue, KernelError> {
    let qu = quadrance(u)?;
    let qv = quadrance(v)?;
    if qu.is_zero() || qv.is_zero() {
        return Err(KernelError::DegenerateVector);
    }
    let d = dot3(u, v)?;
    let ratio = d.square().try_div(&qu.try_mul(&qv)?)?;
    AlgebraicValue::one().try_sub(&ratio)
}

/// Rational point on the unit circle: `((1 − t²)/(1 + t²), 2t/(1 + t²))`.
pub fn circle_param(t: &Rational) -> (Rational, Rational) {
    let one = Rational::one();
    let t2 = t * t;
    let den = &one + &t2;
    let two = Rational::from_integer(BigInt::from(2));
    ((&one - &t2) / &den, two * t / den)
}

/// Denominator class of a spread value; smaller is algebraically simpler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// Denominators {1, 2, 3, 4}.
    Simple = 1,
    /// Denominators {5, 6, 8, 9, 10, 12}.
    Intermediate = 2,
    /// Everything finer.
    Fine = 3,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Simple, Tier::Intermediate, Tier::Fine];

    pub fn of(r: &Rational) -> Tier {
        match r.denom().to_u64() {
            Some(1..=4) => Tier::Simple,
            Some(5 | 6 | 8 | 9 | 10 | 12) => Tier::Intermediate,
            _ => Tier::Fine,
        }
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Denominators introduced by this tier (`Fine` is open-ended).
    pub fn denominators(self) -> &'static [u64] {
        match self {
            Tier::Simple => &[1, 2, 3, 4],
            Tier::Intermediate => &[5, 6, 8, 9, 10, 12],
            Tier::Fine => &[],
        }
    }

    pub fn from_rank(rank: u8) -> Option<Tier> {
        match rank {
            1 => Some(Tier::Simple),
            2 => Some(Tier::Intermediate),
            3 => Some(Tier::Fine),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier{}", self.rank())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseSpreadError {
    #[error("expected 3 comma-separated spreads, got {0}")]
    Arity(usize),
    #[error("cannot parse spread `{0}`")]
    Syntax(String),
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Rotation parameters `(s1, s2, s3)`, each an exact rational in `[0, 1]`.
///
/// Ordering is lexicographic on the components and only used for stable output.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpreadTriple {
    s: [Rational; 3],
}

impl SpreadTriple {
    pub fn new(s1: Rational, s2: Rational, s3: Rational) -> Result<Self, KernelError> {
        let s = [s1, s2, s3];
        for v in &s {
            if v.is_negative() || *v > Rational::one() {
                return Err(KernelError::SpreadOutOfRange { value: v.clone() });
            }
        }
        Ok(Self { s })
    }

    /// Components clamped into `[0, 1]`; for generators that already stay in range.
    pub fn clamped(s: [Rational; 3]) -> Self {
        let (zero, one) = (Rational::zero(), Rational::one());
        Self {
            s: s.map(|v| v.max(zero.clone()).min(one.clone())),
        }
    }

    /// From `(numerator, denominator)` pairs.
    pub fn from_ratios(parts: [(i64, i64); 3]) -> Result<Self, KernelError> {
        let make = |(n, d): (i64, i64)| {
            if d == 0 {
                Err(KernelError::DivisionByZero)
            } else {
                Ok(Rational::new(BigInt::from(n), BigInt::from(d)))
            }
        };
        let [a, b, c] = parts;
        Self::new(make(a)?, make(b)?, make(c)?)
    }

    #[inline]
    pub fn components(&self) -> &[Rational; 3] {
        &self.s
    }

    /// Coarsest tier covering all three components.
    pub fn tier(&self) -> Tier {
        self.s.iter().map(Tier::of).max().unwrap_or(Tier::Simple)
    }

    pub fn to_f64(&self) -> [f64; 3] {
        [
            ratio_to_f64(&self.s[0]),
            ratio_to_f64(&self.s[1]),
            ratio_to_f64(&self.s[2]),
        ]
    }

    /// All three components are zero: the identity rotation.
    pub fn is_identity(&self) -> bool {
        self.s.iter().all(Zero::is_zero)
    }
}

impl fmt::Display for SpreadTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.s[0], self.s[1], self.s[2])
    }
}

impl FromStr for SpreadTriple {
    type Err = ParseSpreadError;

    /// Accepts `p/q`, integers and finite decimals, e.g. `1/2,0.25,0`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParseSpreadError::Arity(parts.len()));
        }
        let s1 = parse_component(parts[0])?;
        let s2 = parse_component(parts[1])?;
        let s3 = parse_component(parts[2])?;
        Ok(SpreadTriple::new(s1, s2, s3)?)
    }
}

fn parse_component(text: &str) -> Result<Rational, ParseSpreadError> {
    let bad = || ParseSpreadError::Syntax(text.to_string());
    if let Some((int, frac)) = text.split_once('.') {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let whole: BigInt = if int.is_empty() {
            BigInt::zero()
        } else {
            int.parse().map_err(|_| bad())?
        };
        let digits: BigInt = frac.parse().map_err(|_| bad())?;
        let scale = num_traits::pow(BigInt::from(10), frac.len());
        let mag = Rational::new(whole.abs() * &scale + digits, scale);
        return Ok(if int.starts_with('-') { -mag } else { mag });
    }
    text.parse::<Rational>().map_err(|_| bad())
}
