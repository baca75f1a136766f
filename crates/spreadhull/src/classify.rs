//! Hull classification and regularity scoring.
//!
//! Purpose
//! - Count hull vertices and flag degenerate corners (turn angle within about 1°
//!   of straight) by an exact comparison of spreads, never by thresholding an angle.
//! - Interior angles, edge lengths and a permutation-invariant regularity score.
//!
//! Model
//! - At hull vertex `i` with incoming edge `u` and outgoing edge `w`, the turn spread
//!   is `(u × w)² / (Q(u)·Q(w))`. The corner is degenerate when `u · w > 0` and the
//!   turn spread is at most `DEGENERATE_TURN_SPREAD`.
//! - `score = 1 / (1 + var_angle/100 + relvar_edge/0.01)`, angles in degrees and the
//!   edge variance taken relative to the squared mean edge length.
//!
//! References
//! - Code cross-refs: `convex_hull`, `Scalar`

use num_bigint::BigInt;
use std::cmp::Ordering;

use crate::algebra::{RadicalTable, Rational};
use crate::error::KernelError;
use crate::hull::Scalar;
use crate::projection::PlanePoint;

/// `(numerator, denominator)` of the turn-spread tolerance; slightly above `sin²(1°)`.
pub const DEGENERATE_TURN_SPREAD: (i64, i64) = (3046, 10_000_000);
/// Angle standard deviation (degrees) below which a hull counts as equiangular.
pub const EQUIANGULAR_STD_DEG: f64 = 0.5;
/// Edge coefficient of variation below which a hull counts as equilateral.
pub const EQUILATERAL_CV: f64 = 0.01;

/// Verdict for one ordered hull.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub count: usize,
    /// Any corner is degenerate, or the count is a symmetry artifact.
    pub degenerate: bool,
    /// Positions (in hull order) of corners within the straight-angle tolerance.
    pub degenerate_vertices: Vec<usize>,
    /// Odd count on a centrally symmetric polytope.
    pub symmetry_artifact: bool,
    /// Interior angles in degrees, in hull order.
    pub angles: Vec<f64>,
    /// `edge_lengths[i]` runs from hull vertex `i` to `i + 1`.
    pub edge_lengths: Vec<f64>,
    pub angle_variance: f64,
    pub edge_relative_variance: f64,
    pub score: f64,
    pub equiangular: bool,
    pub equilateral: bool,
}

impl Classification {
    /// Odd hull counts cannot come from a centrally symmetric point set.
    pub fn mark_symmetry_artifact(&mut self) {
        self.symmetry_artifact = true;
        self.degenerate = true;
    }

    pub fn min_angle(&self) -> f64 {
        self.angles.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_angle(&self) -> f64 {
        self.angles.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Classify an ordered (counter-clockwise) hull.
///
/// Errors with `DegenerateVector` if two consecutive hull points coincide.
pub fn classify<S: Scalar>(
    hull: &[PlanePoint<S>],
    radicals: &RadicalTable,
) -> Result<Classification, KernelError> {
    let n = hull.len();
    let tau = S::from_rational(&Rational::new(
        BigInt::from(DEGENERATE_TURN_SPREAD.0),
        BigInt::from(DEGENERATE_TURN_SPREAD.1),
    ));
    let mut edges = Vec::with_capacity(n);
    for i in 0..n {
        let (p, q) = (&hull[i], &hull[(i + 1) % n]);
        edges.push((q.x.sub(&p.x)?, q.y.sub(&p.y)?));
    }
    let mut quadrances = Vec::with_capacity(n);
    for (dx, dy) in &edges {
        let q = dx.mul(dx)?.add(&dy.mul(dy)?)?;
        if q.sign() != Ordering::Greater {
            return Err(KernelError::DegenerateVector);
        }
        quadrances.push(q);
    }

    let mut angles = Vec::with_capacity(n);
    let mut degenerate_vertices = Vec::new();
    for i in 0..n {
        let k = (i + n - 1) % n;
        let (ux, uy) = &edges[k];
        let (wx, wy) = &edges[i];
        let cross = ux.mul(wy)?.sub(&uy.mul(wx)?)?;
        let dot = ux.mul(wx)?.add(&uy.mul(wy)?)?;
        if n >= 3 && dot.sign() == Ordering::Greater {
            let bound = tau.mul(&quadrances[k])?.mul(&quadrances[i])?;
            if cross.mul(&cross)?.sub(&bound)?.sign() != Ordering::Greater {
                degenerate_vertices.push(i);
            }
        }
        let turn = cross
            .to_f64(radicals)
            .atan2(dot.to_f64(radicals))
            .to_degrees();
        angles.push(180.0 - turn);
    }
    let edge_lengths: Vec<f64> = quadrances.iter().map(|q| q.to_f64(radicals).sqrt()).collect();

    let (angle_variance, edge_relative_variance, score) = regularity(&angles, &edge_lengths);
    Ok(Classification {
        count: n,
        degenerate: n < 3 || !degenerate_vertices.is_empty(),
        degenerate_vertices,
        symmetry_artifact: false,
        equiangular: n >= 3 && angle_variance.sqrt() < EQUIANGULAR_STD_DEG,
        equilateral: n >= 3 && edge_relative_variance.sqrt() < EQUILATERAL_CV,
        angles,
        edge_lengths,
        angle_variance,
        edge_relative_variance,
        score,
    })
}

/// `(var_angle, relvar_edge, score)`; depends only on the two multisets.
pub fn regularity(angles: &[f64], edge_lengths: &[f64]) -> (f64, f64, f64) {
    let va = variance(angles);
    let mean_e = mean(edge_lengths);
    let ve = if mean_e > 0.0 {
        variance(edge_lengths) / (mean_e * mean_e)
    } else {
        0.0
    };
    (va, ve, regularity_score(va, ve))
}

#[inline]
pub fn regularity_score(angle_variance: f64, edge_relative_variance: f64) -> f64 {
    1.0 / (1.0 + angle_variance / 100.0 + edge_relative_variance / 0.01)
}

/// Sum in sorted order so the result is independent of input order.
fn sorted_sum(xs: &[f64]) -> f64 {
    let mut v = xs.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v.iter().sum()
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    sorted_sum(xs) / xs.len() as f64
}

/// Population variance.
fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let dev: Vec<f64> = xs.iter().map(|x| (x - m) * (x - m)).collect();
    sorted_sum(&dev) / xs.len() as f64
}
