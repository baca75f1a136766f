//! Rotation by spread triples and orthogonal projection to a coordinate plane.
//!
//! Purpose
//! - Build `R = Rz(s1) · Ry(s2) · Rx(s3)` from a spread triple (`sin = √s`,
//!   `cos = √(1 − s)`, all angles in `[0, π/2]`) and drop the coordinate along
//!   the plane normal. Output order matches input vertex order.
//! - Respect the caller's `NumericMode`: exact coefficients when they close in the
//!   quadratic fields, otherwise floating rotation promoted to exact binary fractions.
//!
//! References
//! - Code cross-refs: `RotationCoefficients`, `NumericMode`, `PlaneNormal`, `Projection`

mod rotation;
mod types;

pub use rotation::{rotation_coefficients, rotation_matrix_f64, RotationCoefficients};
pub use types::{NumericMode, ParseModeError, PlaneNormal, PlanePoint, ProjectedPoints, Projection};

use nalgebra::{Matrix3, Point3};

use crate::algebra::{dot3, AlgebraicValue, RadicalTable, Rational, SpreadTriple};
use crate::error::KernelError;
use crate::registry::Polytope;

/// Project `polytope` after rotating by `triple`. Pure; one point per vertex.
///
/// In `Exact` mode a coefficient or coordinate that leaves the quadratic fields
/// switches to promoted floating values and is reported in `Projection::fallback`.
pub fn project(
    polytope: &Polytope,
    triple: &SpreadTriple,
    plane: PlaneNormal,
    mode: NumericMode,
) -> Result<Projection, KernelError> {
    match mode {
        NumericMode::FastFloating => Ok(Projection {
            points: ProjectedPoints::Floating(floating_points(polytope, triple, plane)),
            fallback: None,
        }),
        NumericMode::ExactFloatingPromotion => Ok(Projection {
            points: ProjectedPoints::Promoted(promoted_points(polytope, triple, plane)?),
            fallback: None,
        }),
        NumericMode::Exact => {
            let reason = match rotation_coefficients(triple) {
                RotationCoefficients::Exact(m) => match exact_points(polytope, &m, plane) {
                    Ok(points) => {
                        return Ok(Projection {
                            points: ProjectedPoints::Exact(points),
                            fallback: None,
                        })
                    }
                    Err(e) => e,
                },
                RotationCoefficients::Deferred { reason, .. } => reason,
            };
            Ok(Projection {
                points: ProjectedPoints::Promoted(promoted_points(polytope, triple, plane)?),
                fallback: Some(reason),
            })
        }
    }
}

fn exact_points(
    polytope: &Polytope,
    m: &[[AlgebraicValue; 3]; 3],
    plane: PlaneNormal,
) -> Result<Vec<PlanePoint<AlgebraicValue>>, KernelError> {
    let (i, j) = plane.kept_axes();
    polytope
        .vertices()
        .iter()
        .map(|v| {
            Ok(PlanePoint {
                x: dot3(&m[i], v)?,
                y: dot3(&m[j], v)?,
            })
        })
        .collect()
}

/// Rotated vertices in floating point (cached `f64` coordinates times the `f64` matrix).
pub fn rotate_f64(polytope: &Polytope, triple: &SpreadTriple) -> Vec<Point3<f64>> {
    let m: Matrix3<f64> = rotation_matrix_f64(triple);
    polytope
        .vertices_f64()
        .iter()
        .map(|v| Point3::from(m * v))
        .collect()
}

pub fn floating_points(
    polytope: &Polytope,
    triple: &SpreadTriple,
    plane: PlaneNormal,
) -> Vec<PlanePoint<f64>> {
    let (i, j) = plane.kept_axes();
    rotate_f64(polytope, triple)
        .iter()
        .map(|p| PlanePoint { x: p[i], y: p[j] })
        .collect()
}

/// Floating projection promoted to exact binary fractions, so later orientation
/// tests are reproducible bit-for-bit given the same floating inputs.
pub fn promoted_points(
    polytope: &Polytope,
    triple: &SpreadTriple,
    plane: PlaneNormal,
) -> Result<Vec<PlanePoint<Rational>>, KernelError> {
    floating_points(polytope, triple, plane)
        .into_iter()
        .map(|p| {
            Ok(PlanePoint {
                x: Rational::from_float(p.x).ok_or(KernelError::NonFinite)?,
                y: Rational::from_float(p.y).ok_or(KernelError::NonFinite)?,
            })
        })
        .collect()
}

impl ProjectedPoints {
    /// Floating coordinates for reporting.
    pub fn to_f64(&self, radicals: &RadicalTable) -> Vec<PlanePoint<f64>> {
        use crate::hull::Scalar;
        fn conv<S: Scalar>(pts: &[PlanePoint<S>], radicals: &RadicalTable) -> Vec<PlanePoint<f64>> {
            pts.iter()
                .map(|p| PlanePoint {
                    x: p.x.to_f64(radicals),
                    y: p.y.to_f64(radicals),
                })
                .collect()
        }
        match self {
            ProjectedPoints::Exact(p) => conv(p, radicals),
            ProjectedPoints::Promoted(p) => conv(p, radicals),
            ProjectedPoints::Floating(p) => p.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ProjectedPoints::Exact(p) => p.len(),
            ProjectedPoints::Promoted(p) => p.len(),
            ProjectedPoints::Floating(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
