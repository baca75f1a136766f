//! Exact algebraic number kernel.
//!
//! Purpose
//! - Exact rationals (`BigRational`) and elements `a + b√d` of a single real
//!   quadratic field, with closed arithmetic inside one field.
//! - Quadrance/spread primitives in rational trigonometry: no square roots are
//!   taken except when converting a quadrance to a length at the output edge.
//! - Spread triples and their denominator tiers.
//!
//! Model
//! - Every quadratic value is normalized: `b != 0` and `d > 1` squarefree, so
//!   structural equality coincides with numeric equality.
//! - Sums across different fields are not representable; they raise
//!   `KernelError::FieldMismatch` and the caller decides how to fall back.
//!
//! References
//! - Code cross-refs: `AlgebraicValue`, `RadicalTable`, `SpreadTriple`, `spread`

mod radicals;
mod spread;
mod util;
mod value;

pub use radicals::RadicalTable;
pub use spread::{
    circle_param, cross3, dot3, quadrance, quadrance_between, spread, ParseSpreadError,
    SpreadTriple, Tier, Vec3,
};
pub use util::{is_prime, rat, ratio_to_f64, sqrt_rational, split_square};
pub use value::AlgebraicValue;

/// Exact rational number used throughout the kernel.
pub type Rational = num_rational::BigRational;
