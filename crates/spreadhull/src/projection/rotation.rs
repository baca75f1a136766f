use nalgebra::Matrix3;
use num_traits::One;

use crate::algebra::{sqrt_rational, AlgebraicValue, Rational, SpreadTriple};
use crate::error::KernelError;

/// Entries of `R = Rz(s1) · Ry(s2) · Rx(s3)`.
#[derive(Clone, Debug)]
pub enum RotationCoefficients {
    /// Every entry closes in a single quadratic field.
    Exact(Box<[[AlgebraicValue; 3]; 3]>),
    /// Evaluated in floating point; `reason` says which entry could not be formed.
    Deferred {
        matrix: Matrix3<f64>,
        reason: KernelError,
    },
}

/// `(sin, cos) = (√s, √(1 − s))`.
fn sin_cos(s: &Rational) -> Result<(AlgebraicValue, AlgebraicValue), KernelError> {
    Ok((sqrt_rational(s)?, sqrt_rational(&(Rational::one() - s))?))
}

fn exact_matrix(triple: &SpreadTriple) -> Result<[[AlgebraicValue; 3]; 3], KernelError> {
    let [s1, s2, s3] = triple.components();
    let (a, b) = sin_cos(s1)?;
    let (c, d) = sin_cos(s2)?;
    let (e, f) = sin_cos(s3)?;
    let bc = b.try_mul(&c)?;
    let ac = a.try_mul(&c)?;
    Ok([
        [
            b.try_mul(&d)?,
            bc.try_mul(&e)?.try_sub(&a.try_mul(&f)?)?,
            bc.try_mul(&f)?.try_add(&a.try_mul(&e)?)?,
        ],
        [
            a.try_mul(&d)?,
            ac.try_mul(&e)?.try_add(&b.try_mul(&f)?)?,
            ac.try_mul(&f)?.try_sub(&b.try_mul(&e)?)?,
        ],
        [-c, d.try_mul(&e)?, d.try_mul(&f)?],
    ])
}

/// Exact coefficients if they close in the quadratic fields, otherwise a deferred floating matrix.
pub fn rotation_coefficients(triple: &SpreadTriple) -> RotationCoefficients {
    match exact_matrix(triple) {
        Ok(m) => RotationCoefficients::Exact(Box::new(m)),
        Err(reason) => RotationCoefficients::Deferred {
            matrix: rotation_matrix_f64(triple),
            reason,
        },
    }
}

pub fn rotation_matrix_f64(triple: &SpreadTriple) -> Matrix3<f64> {
    let [s1, s2, s3] = triple.to_f64();
    let (a, b) = (s1.sqrt(), (1.0 - s1).sqrt());
    let (c, d) = (s2.sqrt(), (1.0 - s2).sqrt());
    let (e, f) = (s3.sqrt(), (1.0 - s3).sqrt());
    Matrix3::new(
        b * d,
        b * c * e - a * f,
        b * c * f + a * e,
        a * d,
        a * c * e + b * f,
        a * c * f - b * e,
        -c,
        d * e,
        d * f,
    )
}
