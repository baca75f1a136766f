use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::algebra::{AlgebraicValue, Rational};
use crate::error::KernelError;

/// Coordinate axis normal to the projection plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaneNormal {
    X,
    Y,
    #[default]
    Z,
}

impl PlaneNormal {
    /// Kept coordinates in cyclic order: Z → (x, y), X → (y, z), Y → (z, x).
    #[inline]
    pub fn kept_axes(self) -> (usize, usize) {
        match self {
            PlaneNormal::Z => (0, 1),
            PlaneNormal::X => (1, 2),
            PlaneNormal::Y => (2, 0),
        }
    }

    pub const ALL: [PlaneNormal; 3] = [PlaneNormal::X, PlaneNormal::Y, PlaneNormal::Z];
}

impl fmt::Display for PlaneNormal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaneNormal::X => "x",
            PlaneNormal::Y => "y",
            PlaneNormal::Z => "z",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown {what} `{value}`")]
pub struct ParseModeError {
    what: &'static str,
    value: String,
}

impl FromStr for PlaneNormal {
    type Err = ParseModeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(PlaneNormal::X),
            "y" => Ok(PlaneNormal::Y),
            "z" => Ok(PlaneNormal::Z),
            _ => Err(ParseModeError {
                what: "plane normal",
                value: s.to_string(),
            }),
        }
    }
}

/// Arithmetic strategy threaded through projection and hull construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NumericMode {
    /// Exact quadratic-field arithmetic; falls back to `ExactFloatingPromotion`
    /// per evaluation when a value leaves the representable fields.
    #[default]
    Exact,
    /// Floating rotation, then every coordinate promoted to its exact binary fraction.
    ExactFloatingPromotion,
    /// Plain `f64` with a tolerance-based hull.
    FastFloating,
}

impl fmt::Display for NumericMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NumericMode::Exact => "exact",
            NumericMode::ExactFloatingPromotion => "promote",
            NumericMode::FastFloating => "fast",
        };
        f.write_str(s)
    }
}

impl FromStr for NumericMode {
    type Err = ParseModeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(NumericMode::Exact),
            "promote" | "promoted" => Ok(NumericMode::ExactFloatingPromotion),
            "fast" | "float" => Ok(NumericMode::FastFloating),
            _ => Err(ParseModeError {
                what: "numeric mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Point in the projection plane.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlanePoint<S> {
    pub x: S,
    pub y: S,
}

impl<S> PlanePoint<S> {
    #[inline]
    pub fn new(x: S, y: S) -> Self {
        Self { x, y }
    }
}

/// Projected points in the representation the mode produced.
#[derive(Clone, Debug)]
pub enum ProjectedPoints {
    Exact(Vec<PlanePoint<AlgebraicValue>>),
    Promoted(Vec<PlanePoint<Rational>>),
    Floating(Vec<PlanePoint<f64>>),
}

#[derive(Clone, Debug)]
pub struct Projection {
    pub points: ProjectedPoints,
    /// Why an `Exact` request was answered with promoted values.
    pub fallback: Option<KernelError>,
}
