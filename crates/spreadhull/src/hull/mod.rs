//! Exact 2D convex hull (Andrew's monotone chain).
//!
//! Purpose
//! - Ordered counter-clockwise boundary of a projected point set, no repeated
//!   start point, collinear boundary points dropped.
//! - Orientation is the sign of an exact cross product for `AlgebraicValue` and
//!   `Rational` coordinates; only the `f64` path compares against zero in floating point.
//!
//! Notes
//! - Hull indices refer to the input slice, so callers can map back to vertices.
//! - The output starts at the lexicographically smallest point, which makes it
//!   reproducible for identical inputs.
//!
//! References
//! - Code cross-refs: `Scalar`, `PlanePoint`, `HullError::DegenerateProjection`

mod scalar;

pub use scalar::{Scalar, FLOAT_COINCIDENCE};

use std::cmp::Ordering;

use crate::error::{HullError, KernelError};
use crate::projection::PlanePoint;

/// `(a − o) × (b − o)`: positive for a left turn `o → a → b`.
pub fn orient<S: Scalar>(
    o: &PlanePoint<S>,
    a: &PlanePoint<S>,
    b: &PlanePoint<S>,
) -> Result<S, KernelError> {
    let l = a.x.sub(&o.x)?.mul(&b.y.sub(&o.y)?)?;
    let r = a.y.sub(&o.y)?.mul(&b.x.sub(&o.x)?)?;
    l.sub(&r)
}

/// Indices of the hull vertices in counter-clockwise order.
///
/// Errors with `DegenerateProjection` when fewer than three vertices survive.
pub fn convex_hull_indices<S: Scalar>(points: &[PlanePoint<S>]) -> Result<Vec<usize>, HullError> {
    let xs: Vec<S> = points.iter().map(|p| p.x.clone()).collect();
    let ys: Vec<S> = points.iter().map(|p| p.y.clone()).collect();
    S::comparable(&xs)?;
    S::comparable(&ys)?;

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        points[i]
            .x
            .order(&points[j].x)
            .then_with(|| points[i].y.order(&points[j].y))
    });
    order.dedup_by(|a, b| S::coincident(&points[*a], &points[*b]));
    let distinct = order.len();
    if distinct < 3 {
        return Err(HullError::DegenerateProjection {
            distinct,
            hull: distinct,
        });
    }

    let mut lower: Vec<usize> = Vec::with_capacity(distinct);
    for &k in &order {
        while lower.len() >= 2 && !left_turn(points, &lower, k)? {
            lower.pop();
        }
        lower.push(k);
    }
    let mut upper: Vec<usize> = Vec::with_capacity(distinct);
    for &k in order.iter().rev() {
        while upper.len() >= 2 && !left_turn(points, &upper, k)? {
            upper.pop();
        }
        upper.push(k);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    if hull.len() < 3 {
        return Err(HullError::DegenerateProjection {
            distinct,
            hull: hull.len(),
        });
    }
    Ok(hull)
}

#[inline]
fn left_turn<S: Scalar>(points: &[PlanePoint<S>], chain: &[usize], k: usize) -> Result<bool, KernelError> {
    let n = chain.len();
    let c = orient(&points[chain[n - 2]], &points[chain[n - 1]], &points[k])?;
    Ok(c.sign() == Ordering::Greater)
}

/// Hull vertices in counter-clockwise order.
pub fn convex_hull<S: Scalar>(points: &[PlanePoint<S>]) -> Result<Vec<PlanePoint<S>>, HullError> {
    Ok(convex_hull_indices(points)?
        .into_iter()
        .map(|i| points[i].clone())
        .collect())
}

#[cfg(test)]
mod tests;
