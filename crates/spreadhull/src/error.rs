//! Error and warning types shared across layers.
//!
//! - `KernelError`: exact-arithmetic faults (zero quadrance, field crossings, ...).
//! - `HullError`: the hull collapsed below three vertices or hit a kernel fault.
//! - `RegistryError`: malformed or unknown polytope definitions (fatal for that polytope).
//! - `Warning`: non-fatal conditions surfaced to the caller instead of aborting.

use num_bigint::BigInt;
use std::fmt;
use thiserror::Error;

use crate::algebra::Rational;

/// Faults raised by the algebraic number kernel.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KernelError {
    /// Zero-length vector where a spread or direction was required.
    #[error("degenerate vector: zero quadrance")]
    DegenerateVector,
    /// Arithmetic between `Q(√left)` and `Q(√right)` does not close in a single quadratic field.
    #[error("field mismatch: Q(√{left}) and Q(√{right}) do not combine")]
    FieldMismatch { left: BigInt, right: BigInt },
    #[error("division by zero")]
    DivisionByZero,
    /// Square root of a negative rational.
    #[error("negative radicand {value}")]
    NegativeRadicand { value: Rational },
    /// Square root of an irrational value: would need a nested radical.
    #[error("square root of {value} leaves the quadratic fields")]
    NestedRadical { value: String },
    #[error("spread {value} outside [0, 1]")]
    SpreadOutOfRange { value: Rational },
    /// NaN or infinite floating input.
    #[error("non-finite floating value")]
    NonFinite,
}

impl KernelError {
    #[inline]
    pub fn is_field_mismatch(&self) -> bool {
        matches!(self, KernelError::FieldMismatch { .. })
    }

    /// Exact arithmetic cannot represent the result; a floating fallback applies.
    #[inline]
    pub fn needs_fallback(&self) -> bool {
        matches!(
            self,
            KernelError::FieldMismatch { .. } | KernelError::NestedRadical { .. }
        )
    }
}

/// Hull construction failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HullError {
    /// Fewer than three distinct non-collinear boundary points.
    #[error("degenerate projection: hull has {hull} vertices ({distinct} distinct points)")]
    DegenerateProjection { distinct: usize, hull: usize },
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Registry failures. These abort registration of the affected polytope only.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("malformed polytope `{name}`: {reason}")]
    MalformedPolytope { name: String, reason: String },
    #[error("polytope `{0}` is already registered")]
    DuplicateName(String),
    #[error("unknown polytope `{0}`")]
    UnknownPolytope(String),
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

impl RegistryError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPolytope {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Non-fatal conditions recorded while building polytopes or sweeping a grid.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A declared circumradius disagrees with the one measured from the placed vertices.
    CircumradiusInconsistency {
        polytope: String,
        declared_quadrance: f64,
        measured_quadrance: f64,
    },
    /// Exact arithmetic crossed incompatible fields; the value was evaluated in floating point.
    FieldMismatchFallback { context: String, detail: String },
    /// Hull collapsed below three vertices.
    DegenerateProjection { polytope: String, spreads: String, distinct: usize },
    /// Zero-length vector met while classifying; the combination was skipped.
    DegenerateVector { polytope: String, spreads: String },
    /// Evaluation failed for another kernel reason (e.g. non-finite coordinates); skipped.
    EvaluationSkipped { polytope: String, spreads: String, detail: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::CircumradiusInconsistency {
                polytope,
                declared_quadrance,
                measured_quadrance,
            } => write!(
                f,
                "circumradius inconsistency in `{polytope}`: declared Q={declared_quadrance}, measured Q={measured_quadrance}"
            ),
            Warning::FieldMismatchFallback { context, detail } => {
                write!(f, "floating fallback in {context}: {detail}")
            }
            Warning::DegenerateProjection {
                polytope,
                spreads,
                distinct,
            } => write!(
                f,
                "degenerate projection of `{polytope}` at ({spreads}): {distinct} distinct points"
            ),
            Warning::DegenerateVector { polytope, spreads } => {
                write!(f, "degenerate vector in `{polytope}` at ({spreads})")
            }
            Warning::EvaluationSkipped {
                polytope,
                spreads,
                detail,
            } => write!(f, "evaluation of `{polytope}` at ({spreads}) skipped: {detail}"),
        }
    }
}

/// Per-kind warning tally reported next to search results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WarningSummary {
    pub circumradius_inconsistencies: usize,
    pub field_fallbacks: usize,
    pub degenerate_projections: usize,
    pub degenerate_vectors: usize,
    pub skipped_evaluations: usize,
}

impl WarningSummary {
    pub fn record(&mut self, w: &Warning) {
        match w {
            Warning::CircumradiusInconsistency { .. } => self.circumradius_inconsistencies += 1,
            Warning::FieldMismatchFallback { .. } => self.field_fallbacks += 1,
            Warning::DegenerateProjection { .. } => self.degenerate_projections += 1,
            Warning::DegenerateVector { .. } => self.degenerate_vectors += 1,
            Warning::EvaluationSkipped { .. } => self.skipped_evaluations += 1,
        }
    }

    pub fn merge(&mut self, other: &WarningSummary) {
        self.circumradius_inconsistencies += other.circumradius_inconsistencies;
        self.field_fallbacks += other.field_fallbacks;
        self.degenerate_projections += other.degenerate_projections;
        self.degenerate_vectors += other.degenerate_vectors;
        self.skipped_evaluations += other.skipped_evaluations;
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.circumradius_inconsistencies
            + self.field_fallbacks
            + self.degenerate_projections
            + self.degenerate_vectors
            + self.skipped_evaluations
    }
}
