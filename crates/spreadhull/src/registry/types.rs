use nalgebra::Vector3;

use crate::algebra::{AlgebraicValue, Rational, SpreadTriple, Vec3};

/// Exact vertex coordinates.
pub type Vertex = Vec3;

/// Symmetry metadata. `central` is always re-measured at registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SymmetryTags {
    pub central: bool,
    pub vertex_transitive: bool,
}

impl SymmetryTags {
    pub const NONE: SymmetryTags = SymmetryTags {
        central: false,
        vertex_transitive: false,
    };

    #[inline]
    pub fn new(central: bool, vertex_transitive: bool) -> Self {
        Self {
            central,
            vertex_transitive,
        }
    }
}

/// How constituents are scaled before a compound takes their union.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleStrategy {
    /// Every part is scaled to the measured circumradius of the first part.
    MatchFirst,
    /// Every part is scaled to circumradius 1.
    UnitSphere,
    /// Parts are used exactly as registered.
    AsPlaced,
}

/// Closed set of polytope categories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolytopeKind {
    Base,
    Compound {
        parts: Vec<String>,
        strategy: ScaleStrategy,
    },
    /// Edge-truncation of `parent` at parameter `truncation` (fraction of each edge cut off per end).
    Subdivided { parent: String, truncation: Rational },
    /// `parent` turned by the rotation of `spreads`.
    Rotated { parent: String, spreads: SpreadTriple },
}

/// Unvalidated polytope definition handed to `Registry::register_def`.
#[derive(Clone, Debug)]
pub struct PolytopeDef {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub symmetry: SymmetryTags,
    pub kind: PolytopeKind,
    /// Closed-form circumradius² if the author has one; checked against the measured value.
    pub declared_circumradius_quadrance: Option<AlgebraicValue>,
    /// Coordinates already carry floating error (promoted binary fractions).
    pub approximate: bool,
}

impl PolytopeDef {
    pub fn base(name: &str, vertices: Vec<Vertex>, symmetry: SymmetryTags) -> Self {
        Self {
            name: name.to_string(),
            vertices,
            symmetry,
            kind: PolytopeKind::Base,
            declared_circumradius_quadrance: None,
            approximate: false,
        }
    }

    pub fn with_kind(mut self, kind: PolytopeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_declared_circumradius_quadrance(mut self, q: AlgebraicValue) -> Self {
        self.declared_circumradius_quadrance = Some(q);
        self
    }
}

/// Validated, immutable polytope.
#[derive(Clone, Debug)]
pub struct Polytope {
    pub(crate) name: String,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) vertices_f64: Vec<Vector3<f64>>,
    pub(crate) kind: PolytopeKind,
    pub(crate) symmetry: SymmetryTags,
    pub(crate) circumradius_quadrance: AlgebraicValue,
    pub(crate) approximate: bool,
}

impl Polytope {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Floating coordinates evaluated once at registration.
    #[inline]
    pub fn vertices_f64(&self) -> &[Vector3<f64>] {
        &self.vertices_f64
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn kind(&self) -> &PolytopeKind {
        &self.kind
    }

    #[inline]
    pub fn symmetry(&self) -> SymmetryTags {
        self.symmetry
    }

    #[inline]
    pub fn is_centrally_symmetric(&self) -> bool {
        self.symmetry.central
    }

    /// `max |v|²` over the placed vertices.
    #[inline]
    pub fn circumradius_quadrance(&self) -> &AlgebraicValue {
        &self.circumradius_quadrance
    }

    #[inline]
    pub fn is_approximate(&self) -> bool {
        self.approximate
    }
}
