//! One (polytope, spread triple) evaluation: rotate, project, hull, classify.

use crate::algebra::{RadicalTable, SpreadTriple};
use crate::classify::{classify, Classification};
use crate::error::{HullError, KernelError};
use crate::hull::{convex_hull_indices, Scalar};
use crate::projection::{
    project, promoted_points, NumericMode, PlaneNormal, PlanePoint, ProjectedPoints,
};
use crate::registry::Polytope;

/// Everything computed for one projection.
#[derive(Clone, Debug)]
pub struct ProjectionResult {
    pub mode: NumericMode,
    pub plane: PlaneNormal,
    /// Projected points, one per polytope vertex, in vertex order.
    pub points: Vec<PlanePoint<f64>>,
    /// Indices into `points`, counter-clockwise.
    pub hull: Vec<usize>,
    pub classification: Classification,
    /// Set when an `Exact` request was answered with promoted floating values.
    pub fallback: Option<KernelError>,
    /// Exact mode, no fallback, and exact polytope coordinates.
    pub exact: bool,
}

impl ProjectionResult {
    #[inline]
    pub fn count(&self) -> usize {
        self.classification.count
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.classification.degenerate
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.classification.score
    }

    pub fn hull_points(&self) -> Vec<PlanePoint<f64>> {
        self.hull.iter().map(|&i| self.points[i].clone()).collect()
    }
}

fn hull_and_classify<S: Scalar>(
    points: &[PlanePoint<S>],
    radicals: &RadicalTable,
) -> Result<(Vec<usize>, Classification), HullError> {
    let idx = convex_hull_indices(points)?;
    let hull: Vec<PlanePoint<S>> = idx.iter().map(|&i| points[i].clone()).collect();
    let class = classify(&hull, radicals)?;
    Ok((idx, class))
}

/// Run the pipeline for one grid point.
///
/// `DegenerateProjection` and `DegenerateVector` come back as errors for the caller
/// to record; field crossings in `Exact` mode are absorbed by promotion and reported
/// in `ProjectionResult::fallback`.
pub fn evaluate(
    polytope: &Polytope,
    triple: &SpreadTriple,
    plane: PlaneNormal,
    mode: NumericMode,
    radicals: &RadicalTable,
) -> Result<ProjectionResult, HullError> {
    let projection = project(polytope, triple, plane, mode)?;
    let mut fallback = projection.fallback;
    let (hull, mut classification) = match &projection.points {
        ProjectedPoints::Exact(pts) => match hull_and_classify(pts, radicals) {
            Ok(r) => r,
            Err(HullError::Kernel(e)) if e.needs_fallback() => {
                fallback = Some(e);
                hull_and_classify(&promoted_points(polytope, triple, plane)?, radicals)?
            }
            Err(e) => return Err(e),
        },
        ProjectedPoints::Promoted(pts) => hull_and_classify(pts, radicals)?,
        ProjectedPoints::Floating(pts) => hull_and_classify(pts, radicals)?,
    };
    if polytope.is_centrally_symmetric() && classification.count % 2 == 1 {
        classification.mark_symmetry_artifact();
    }
    let exact = mode == NumericMode::Exact && fallback.is_none() && !polytope.is_approximate();
    Ok(ProjectionResult {
        mode,
        plane,
        points: projection.points.to_f64(radicals),
        hull,
        classification,
        fallback,
        exact,
    })
}
