//! Exact projection of 3D polytopes and search for prime hull vertex counts.
//!
//! Pipeline per (polytope, spread triple): rotate by `Rz(s1) · Ry(s2) · Rx(s3)`,
//! drop one coordinate, take the convex hull, classify the polygon. Coordinates
//! stay in `Q` or a single `Q(√d)` as long as possible; crossings between fields
//! fall back to floating values promoted to exact binary fractions.
//!
//! Layers
//! - `algebra`: quadratic-field values, spreads, tiers.
//! - `registry`: named polytopes, compounds, the built-in catalogue.
//! - `projection`, `hull`, `classify`, `evaluate`: the per-combination pipeline.
//! - `search`: grids, the parallel driver and leaderboards.
//! - `render`: geometry for a drawing layer.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.

pub mod algebra;
pub mod classify;
pub mod error;
pub mod evaluate;
pub mod hull;
pub mod projection;
pub mod registry;
pub mod render;
pub mod search;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use algebra::{AlgebraicValue, Rational, SpreadTriple, Tier};
pub use error::{HullError, KernelError, RegistryError, Warning, WarningSummary};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::algebra::{rat, AlgebraicValue, RadicalTable, Rational, SpreadTriple, Tier};
    pub use crate::classify::{classify, Classification};
    pub use crate::error::{HullError, KernelError, RegistryError, Warning, WarningSummary};
    pub use crate::evaluate::{evaluate, ProjectionResult};
    pub use crate::hull::{convex_hull, convex_hull_indices, Scalar};
    pub use crate::projection::{project, NumericMode, PlaneNormal, PlanePoint};
    pub use crate::registry::{catalog, Polytope, PolytopeDef, Registry, ScaleStrategy, SymmetryTags};
    pub use crate::render::{render_data, RenderData};
    pub use crate::search::{
        search, CancelToken, DecimalGrid, ExplicitGrid, Leaderboard, RandomGrid, SearchConfig,
        SearchDriver, SearchHit, SearchOutcome, SpreadGrid, TieredGrid,
    };
}
