//! Named polytopes, compounds and truncations.
//!
//! Purpose
//! - Validate vertex sets once, measure their circumradius and central symmetry
//!   exactly, and hand out immutable `Arc<Polytope>`s.
//! - Build compounds by rescaling constituents to a common circumradius that is
//!   always re-measured from placed vertices, never taken from a closed form.
//!
//! Model
//! - The registry is an explicit value owned by the caller; there is no global
//!   namespace. It also owns the `RadicalTable` for every field its polytopes use.
//! - Circumradius disagreements are recorded as `Warning::CircumradiusInconsistency`
//!   and construction continues with the measured value.
//! - Values that exact arithmetic cannot represent (e.g. `√(φ + 2)`) are evaluated in
//!   floating point, promoted back to binary fractions, and the polytope is marked approximate.
//!
//! References
//! - Code cross-refs: `Polytope`, `PolytopeKind`, `ScaleStrategy`, `catalog`

pub mod catalog;
mod types;

pub use types::{Polytope, PolytopeDef, PolytopeKind, ScaleStrategy, SymmetryTags, Vertex};

use nalgebra::Vector3;
use num_bigint::BigInt;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::algebra::{dot3, quadrance, sqrt_rational, AlgebraicValue, RadicalTable, Rational, SpreadTriple};
use crate::error::{KernelError, RegistryError, Warning};
use crate::projection::{rotation_coefficients, rotation_matrix_f64, RotationCoefficients};

/// Relative tolerance for circumradius checks once floating values are involved.
const APPROX_REL_TOL: f64 = 1e-9;

#[derive(Clone, Debug)]
pub struct Registry {
    polytopes: BTreeMap<String, Arc<Polytope>>,
    radicands: BTreeSet<BigInt>,
    radicals: RadicalTable,
    warnings: Vec<Warning>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            polytopes: BTreeMap::new(),
            radicands: BTreeSet::new(),
            radicals: RadicalTable::standard(),
            warnings: Vec::new(),
        }
    }

    /// Registry pre-populated with the built-in solids and compounds.
    pub fn with_catalog() -> Result<Self, RegistryError> {
        let mut reg = Self::new();
        catalog::install(&mut reg)?;
        Ok(reg)
    }

    pub fn register(
        &mut self,
        name: &str,
        vertices: Vec<Vertex>,
        symmetry: SymmetryTags,
    ) -> Result<Arc<Polytope>, RegistryError> {
        self.register_def(PolytopeDef::base(name, vertices, symmetry))
    }

    /// Register floating coordinates, promoted to their exact binary-fraction values.
    pub fn register_f64(
        &mut self,
        name: &str,
        vertices: &[[f64; 3]],
        symmetry: SymmetryTags,
    ) -> Result<Arc<Polytope>, RegistryError> {
        let mut exact = Vec::with_capacity(vertices.len());
        for (i, v) in vertices.iter().enumerate() {
            let mut out: [AlgebraicValue; 3] = Default::default();
            for (k, c) in v.iter().enumerate() {
                out[k] = promote(*c).map_err(|_| {
                    RegistryError::malformed(name, format!("vertex {i} has non-finite coordinate {c}"))
                })?;
            }
            exact.push(out);
        }
        let mut def = PolytopeDef::base(name, exact, symmetry);
        def.approximate = true;
        self.register_def(def)
    }

    /// Validate and insert a definition. Malformed input aborts this polytope only.
    pub fn register_def(&mut self, def: PolytopeDef) -> Result<Arc<Polytope>, RegistryError> {
        let PolytopeDef {
            name,
            vertices,
            symmetry,
            kind,
            declared_circumradius_quadrance,
            mut approximate,
        } = def;
        if self.polytopes.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        if vertices.is_empty() {
            return Err(RegistryError::malformed(&name, "empty vertex list"));
        }
        let mut vertices = dedup_vertices(vertices);
        self.learn_fields(&vertices);

        let measured = match measure_circumradius(&vertices) {
            Ok(q) => q,
            Err(e) if e.needs_fallback() => {
                self.record(Warning::FieldMismatchFallback {
                    context: format!("registry `{name}`"),
                    detail: e.to_string(),
                });
                vertices = dedup_vertices(promote_vertices(&vertices, &self.radicals)?);
                approximate = true;
                measure_circumradius(&vertices)?
            }
            Err(e) => return Err(e.into()),
        };
        if measured.is_zero() {
            return Err(RegistryError::malformed(&name, "all vertices at the origin"));
        }
        if let Some(declared) = &declared_circumradius_quadrance {
            if !same_quadrance(declared, &measured, approximate, &self.radicals) {
                self.record(Warning::CircumradiusInconsistency {
                    polytope: name.clone(),
                    declared_quadrance: declared.to_f64(&self.radicals),
                    measured_quadrance: measured.to_f64(&self.radicals),
                });
            }
        }

        let central = measure_central(&vertices, approximate, &self.radicals);
        if central != symmetry.central {
            warn!(
                polytope = %name,
                declared = symmetry.central,
                measured = central,
                "central symmetry tag disagrees with vertices; using measured"
            );
        }
        let vertices_f64 = float_vertices(&vertices, &self.radicals);
        if vertices_f64
            .iter()
            .any(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()))
        {
            return Err(RegistryError::malformed(&name, "coordinate does not evaluate to a finite value"));
        }

        debug!(polytope = %name, vertices = vertices.len(), central, approximate, "registered");
        let poly = Arc::new(Polytope {
            name: name.clone(),
            vertices,
            vertices_f64,
            kind,
            symmetry: SymmetryTags {
                central,
                vertex_transitive: symmetry.vertex_transitive,
            },
            circumradius_quadrance: measured,
            approximate,
        });
        self.polytopes.insert(name, Arc::clone(&poly));
        Ok(poly)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Polytope>, RegistryError> {
        self.polytopes
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownPolytope(name.to_string()))
    }

    /// Compound `a + b`, named `"{a}+{b}"`.
    pub fn compound(
        &mut self,
        a: &str,
        b: &str,
        strategy: ScaleStrategy,
    ) -> Result<Arc<Polytope>, RegistryError> {
        let name = format!("{a}+{b}");
        self.compound_named(&name, &[a, b], strategy)
    }

    /// Union of the scaled vertex sets of `parts`.
    pub fn compound_named(
        &mut self,
        name: &str,
        parts: &[&str],
        strategy: ScaleStrategy,
    ) -> Result<Arc<Polytope>, RegistryError> {
        if parts.is_empty() {
            return Err(RegistryError::malformed(name, "compound without constituents"));
        }
        let constituents = parts
            .iter()
            .map(|p| self.get(p))
            .collect::<Result<Vec<_>, _>>()?;

        // Re-derive every constituent's circumradius before trusting it.
        let mut measured = Vec::with_capacity(constituents.len());
        for part in &constituents {
            measured.push(self.remeasure(part)?);
        }
        let target = match strategy {
            ScaleStrategy::MatchFirst => Some(measured[0].clone()),
            ScaleStrategy::UnitSphere => Some(AlgebraicValue::one()),
            ScaleStrategy::AsPlaced => None,
        };

        let mut approximate = constituents.iter().any(|p| p.approximate);
        let mut union = Vec::new();
        for (part, from_q) in constituents.iter().zip(&measured) {
            let placed = match &target {
                None => part.vertices.clone(),
                // approximate parts scale in floating point
                Some(to_q) if approximate => scale_float(&part.vertices, from_q, to_q, &self.radicals)?,
                Some(to_q) => match scale_exact(&part.vertices, from_q, to_q) {
                    Ok(v) => v,
                    Err(e) if e.needs_fallback() => {
                        self.record(Warning::FieldMismatchFallback {
                            context: format!("compound `{name}` scaling `{}`", part.name),
                            detail: e.to_string(),
                        });
                        approximate = true;
                        scale_float(&part.vertices, from_q, to_q, &self.radicals)?
                    }
                    Err(e) => return Err(e.into()),
                },
            };
            if let Some(to_q) = &target {
                let after = self.measure_lenient(&placed)?;
                if !same_quadrance(&after, to_q, approximate, &self.radicals) {
                    self.record(Warning::CircumradiusInconsistency {
                        polytope: format!("{name}/{}", part.name),
                        declared_quadrance: to_q.to_f64(&self.radicals),
                        measured_quadrance: after.to_f64(&self.radicals),
                    });
                }
            }
            union.extend(placed);
        }

        let symmetry = SymmetryTags::new(measure_central(&union, approximate, &self.radicals), false);
        let mut def = PolytopeDef::base(name, union, symmetry).with_kind(PolytopeKind::Compound {
            parts: parts.iter().map(|p| p.to_string()).collect(),
            strategy,
        });
        def.declared_circumradius_quadrance = target;
        def.approximate = approximate;
        self.register_def(def)
    }

    /// Compound of `a` with a copy of `b` turned by `spread`, named `"{a}+{b}@{spread}"`.
    ///
    /// The turned copy is registered on its own as `"{b}@{spread}"` and then joined
    /// like any other part. Repeated calls return the existing registration.
    pub fn compound_rotated(
        &mut self,
        a: &str,
        b: &str,
        spread: &SpreadTriple,
        strategy: ScaleStrategy,
    ) -> Result<Arc<Polytope>, RegistryError> {
        let turned = format!("{b}@{spread}");
        let name = format!("{a}+{turned}");
        if let Ok(existing) = self.get(&name) {
            return Ok(existing);
        }
        self.get(a)?;
        if self.get(&turned).is_err() {
            let part = self.get(b)?;
            self.register_rotated(&turned, &part, spread)?;
        }
        self.compound_named(&name, &[a, &turned], strategy)
    }

    /// Register `part` rotated by `spread`. Exact when the rotation and the products
    /// stay in one quadratic field; otherwise the floating rotation is promoted and
    /// the copy is marked approximate.
    fn register_rotated(
        &mut self,
        name: &str,
        part: &Polytope,
        spread: &SpreadTriple,
    ) -> Result<Arc<Polytope>, RegistryError> {
        let exact = match rotation_coefficients(spread) {
            RotationCoefficients::Exact(m) => rotate_exact(&part.vertices, &m),
            RotationCoefficients::Deferred { reason, .. } => Err(reason),
        };
        let (vertices, approximate) = match exact {
            Ok(v) => (v, part.approximate),
            Err(e) if e.needs_fallback() => {
                self.record(Warning::FieldMismatchFallback {
                    context: format!("rotating `{}` by ({spread})", part.name),
                    detail: e.to_string(),
                });
                let m = rotation_matrix_f64(spread);
                let turned = float_vertices(&part.vertices, &self.radicals)
                    .iter()
                    .map(|v| promote_vector(&(m * v)))
                    .collect::<Result<Vec<_>, _>>()?;
                (turned, true)
            }
            Err(e) => return Err(e.into()),
        };
        let mut def = PolytopeDef::base(name, vertices, part.symmetry)
            .with_kind(PolytopeKind::Rotated {
                parent: part.name.clone(),
                spreads: spread.clone(),
            })
            .with_declared_circumradius_quadrance(part.circumradius_quadrance.clone());
        def.approximate = approximate;
        self.register_def(def)
    }

    /// Re-derive `name`'s circumradius from its vertices and compare with the stored one.
    pub fn check_circumradius(&mut self, name: &str) -> Result<Option<Warning>, RegistryError> {
        let poly = self.get(name)?;
        let before = self.warnings.len();
        self.remeasure(&poly)?;
        Ok(self.warnings.get(before).cloned())
    }

    fn remeasure(&mut self, poly: &Polytope) -> Result<AlgebraicValue, RegistryError> {
        let fresh = self.measure_lenient(&poly.vertices)?;
        if !same_quadrance(&fresh, &poly.circumradius_quadrance, poly.approximate, &self.radicals) {
            self.record(Warning::CircumradiusInconsistency {
                polytope: poly.name.clone(),
                declared_quadrance: poly.circumradius_quadrance.to_f64(&self.radicals),
                measured_quadrance: fresh.to_f64(&self.radicals),
            });
        }
        Ok(fresh)
    }

    /// Exact measurement, or the vertex of largest floating quadrance if fields collide.
    fn measure_lenient(&self, vertices: &[Vertex]) -> Result<AlgebraicValue, RegistryError> {
        match measure_circumradius(vertices) {
            Ok(q) => Ok(q),
            Err(e) if e.needs_fallback() => {
                let best = float_vertices(vertices, &self.radicals)
                    .iter()
                    .map(|v| v.norm_squared())
                    .fold(0.0_f64, f64::max);
                Ok(promote(best)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn learn_fields(&mut self, vertices: &[Vertex]) {
        let mut fresh = false;
        for c in vertices.iter().flatten() {
            if let Some(d) = c.field() {
                if !self.radicals.contains(d) && self.radicands.insert(d.clone()) {
                    fresh = true;
                }
            }
        }
        if fresh {
            self.radicals = RadicalTable::with_radicands(self.radicands.iter().cloned());
        }
    }

    fn record(&mut self, w: Warning) {
        warn!("{w}");
        self.warnings.push(w);
    }

    #[inline]
    pub fn radicals(&self) -> &RadicalTable {
        &self.radicals
    }

    /// Warnings raised while registering, in order.
    #[inline]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.polytopes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Polytope>> {
        self.polytopes.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polytopes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polytopes.is_empty()
    }
}

/// Drop repeated vertices, keeping first occurrences in order.
fn dedup_vertices(vertices: Vec<Vertex>) -> Vec<Vertex> {
    let mut seen = HashSet::with_capacity(vertices.len());
    vertices
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// `max |v|²`, exact.
pub(crate) fn measure_circumradius(vertices: &[Vertex]) -> Result<AlgebraicValue, KernelError> {
    let mut best = AlgebraicValue::zero();
    for v in vertices {
        let q = quadrance(v)?;
        if q.try_cmp(&best)? == Ordering::Greater {
            best = q;
        }
    }
    Ok(best)
}

/// Central symmetry of a vertex set. Exact unless the coordinates already carry
/// floating error, in which case `-v` only has to lie within `APPROX_REL_TOL` of the
/// circumradius of some vertex.
fn measure_central(vertices: &[Vertex], approximate: bool, radicals: &RadicalTable) -> bool {
    if !approximate {
        return is_centrally_symmetric(vertices);
    }
    let pts = float_vertices(vertices, radicals);
    let reach = pts.iter().map(|v| v.norm()).fold(0.0_f64, f64::max);
    if !reach.is_finite() {
        return is_centrally_symmetric(vertices);
    }
    let tol = APPROX_REL_TOL * reach.max(1.0);
    pts.iter().all(|v| pts.iter().any(|w| (v + w).norm() <= tol))
}

/// Exact test that `-v` is a vertex for every vertex `v`.
fn is_centrally_symmetric(vertices: &[Vertex]) -> bool {
    let set: HashSet<&Vertex> = vertices.iter().collect();
    vertices.iter().all(|v| {
        let neg = [-v[0].clone(), -v[1].clone(), -v[2].clone()];
        set.contains(&neg)
    })
}

fn same_quadrance(
    a: &AlgebraicValue,
    b: &AlgebraicValue,
    approximate: bool,
    radicals: &RadicalTable,
) -> bool {
    match a.try_cmp(b) {
        Ok(Ordering::Equal) => true,
        Ok(_) if !approximate => false,
        _ => {
            let (x, y) = (a.to_f64(radicals), b.to_f64(radicals));
            (x - y).abs() <= APPROX_REL_TOL * x.abs().max(y.abs())
        }
    }
}

/// Scale so that circumradius² goes from `from_q` to `to_q`, exactly.
fn scale_exact(
    vertices: &[Vertex],
    from_q: &AlgebraicValue,
    to_q: &AlgebraicValue,
) -> Result<Vec<Vertex>, KernelError> {
    let ratio = to_q.try_div(from_q)?;
    let factor = match ratio.as_rational() {
        Some(r) => sqrt_rational(r)?,
        None => {
            return Err(KernelError::NestedRadical {
                value: ratio.to_string(),
            })
        }
    };
    vertices
        .iter()
        .map(|v| {
            Ok([
                v[0].try_mul(&factor)?,
                v[1].try_mul(&factor)?,
                v[2].try_mul(&factor)?,
            ])
        })
        .collect()
}

fn scale_float(
    vertices: &[Vertex],
    from_q: &AlgebraicValue,
    to_q: &AlgebraicValue,
    radicals: &RadicalTable,
) -> Result<Vec<Vertex>, KernelError> {
    let factor = (to_q.to_f64(radicals) / from_q.to_f64(radicals)).sqrt();
    float_vertices(vertices, radicals)
        .iter()
        .map(|v| promote_vector(&(v * factor)))
        .collect()
}

fn rotate_exact(vertices: &[Vertex], m: &[[AlgebraicValue; 3]; 3]) -> Result<Vec<Vertex>, KernelError> {
    vertices
        .iter()
        .map(|v| Ok([dot3(&m[0], v)?, dot3(&m[1], v)?, dot3(&m[2], v)?]))
        .collect()
}

fn promote_vertices(vertices: &[Vertex], radicals: &RadicalTable) -> Result<Vec<Vertex>, KernelError> {
    float_vertices(vertices, radicals)
        .iter()
        .map(promote_vector)
        .collect()
}

fn float_vertices(vertices: &[Vertex], radicals: &RadicalTable) -> Vec<Vector3<f64>> {
    vertices
        .iter()
        .map(|v| {
            Vector3::new(
                v[0].to_f64(radicals),
                v[1].to_f64(radicals),
                v[2].to_f64(radicals),
            )
        })
        .collect()
}

fn promote_vector(v: &Vector3<f64>) -> Result<Vertex, KernelError> {
    Ok([promote(v.x)?, promote(v.y)?, promote(v.z)?])
}

/// Exact binary-fraction value of a finite float.
pub(crate) fn promote(x: f64) -> Result<AlgebraicValue, KernelError> {
    Rational::from_float(x)
        .map(AlgebraicValue::Rational)
        .ok_or(KernelError::NonFinite)
}

#[cfg(test)]
mod tests;
