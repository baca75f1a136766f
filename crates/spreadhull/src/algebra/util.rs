use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::{AlgebraicValue, Rational};
use crate::error::KernelError;

/// Trial division bound for squarefree extraction. Whatever survives is either
/// a prime, a perfect square of a prime, or kept whole in the radicand.
const TRIAL_LIMIT: u64 = 1 << 16;

/// Rational `n/d` from machine integers. `d` must be non-zero.
#[inline]
pub fn rat(n: i64, d: i64) -> Rational {
    Rational::new(BigInt::from(n), BigInt::from(d))
}

/// Best-effort `f64` of an exact rational (large operands go through the integer parts).
pub fn ratio_to_f64(r: &Rational) -> f64 {
    match r.to_f64() {
        Some(v) if v.is_finite() => v,
        _ => {
            let n = r.numer().to_f64().unwrap_or(f64::NAN);
            let d = r.denom().to_f64().unwrap_or(f64::NAN);
            n / d
        }
    }
}

/// Split a non-negative integer into `(k, m)` with `n = k² · m` and `m` squarefree.
///
/// `0` maps to `(0, 1)`. Negative inputs are treated by absolute value.
pub fn split_square(n: &BigInt) -> (BigInt, BigInt) {
    let n = n.abs();
    if n.is_zero() {
        return (BigInt::zero(), BigInt::one());
    }
    if let Some(small) = n.to_u64() {
        let (k, m) = split_square_u64(small);
        return (BigInt::from(k), BigInt::from(m));
    }
    let mut rest = n;
    let mut k = BigInt::one();
    let mut m = BigInt::one();
    let mut p: u64 = 2;
    while p <= TRIAL_LIMIT {
        let bp = BigInt::from(p);
        if &bp * &bp > rest {
            break;
        }
        let mut e = 0u32;
        while (&rest % &bp).is_zero() {
            rest /= &bp;
            e += 1;
        }
        for _ in 0..e / 2 {
            k *= &bp;
        }
        if e % 2 == 1 {
            m *= &bp;
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if rest > BigInt::one() {
        let r = rest.sqrt();
        if &r * &r == rest {
            k *= r;
        } else {
            m *= rest;
        }
    }
    (k, m)
}

fn split_square_u64(mut rest: u64) -> (u64, u64) {
    let mut k = 1u64;
    let mut m = 1u64;
    let mut p = 2u64;
    while p <= TRIAL_LIMIT && p * p <= rest {
        let mut e = 0u32;
        while rest % p == 0 {
            rest /= p;
            e += 1;
        }
        k *= p.pow(e / 2);
        if e % 2 == 1 {
            m *= p;
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if rest > 1 {
        let r = rest.sqrt();
        if r * r == rest {
            k *= r;
        } else {
            m *= rest;
        }
    }
    (k, m)
}

/// Exact square root of a non-negative rational: `√(p/q) = (k/q)·√m` where `p·q = k²·m`.
///
/// This is the single place where the kernel introduces an irrational value.
pub fn sqrt_rational(r: &Rational) -> Result<AlgebraicValue, KernelError> {
    if r.is_negative() {
        return Err(KernelError::NegativeRadicand { value: r.clone() });
    }
    if r.is_zero() {
        return Ok(AlgebraicValue::zero());
    }
    let (k, m) = split_square(&(r.numer() * r.denom()));
    let coef = Rational::new(k, r.denom().clone());
    if m.is_one() {
        Ok(AlgebraicValue::Rational(coef))
    } else {
        AlgebraicValue::quadratic(Rational::zero(), coef, m)
    }
}

/// Deterministic primality by trial division (hull counts are small).
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}
