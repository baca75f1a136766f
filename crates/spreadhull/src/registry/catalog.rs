//! Built-in solids and compounds.
//!
//! Coordinates are exact: integers, or `Q(√5)` values for the icosahedral family.
//! Tetrahedra are placed at `(±1, ±1, ±1)`: the base one takes the corners with
//! an odd number of minus signs, its dual the even ones. Truncations are cut from
//! the tetrahedron scaled by 3 so that the default `t = 1/3` lands on the integer
//! points `(±3, ±1, ±1)`.
//!
//! The snub cube (tribonacci coordinates) and the compound of five tetrahedra
//! (rotations by 72°) are authored in floating point and registered approximate.

use nalgebra::{Rotation3, Unit, Vector3};
use num_traits::{Signed, Zero};
use std::f64::consts::TAU;
use std::sync::Arc;

use super::{Polytope, PolytopeDef, PolytopeKind, Registry, ScaleStrategy, SymmetryTags, Vertex};
use crate::algebra::{rat, AlgebraicValue, Rational, SpreadTriple};
use crate::error::{KernelError, RegistryError};

pub const TETRAHEDRON: &str = "tetrahedron";
pub const DUAL_TETRAHEDRON: &str = "dual_tetrahedron";
pub const CUBE: &str = "cube";
pub const OCTAHEDRON: &str = "octahedron";
pub const CUBOCTAHEDRON: &str = "cuboctahedron";
pub const ICOSAHEDRON: &str = "icosahedron";
pub const DODECAHEDRON: &str = "dodecahedron";
pub const TRUNCATED_TETRAHEDRON: &str = "truncated_tetrahedron";
pub const TRUNCATED_DUAL_TETRAHEDRON: &str = "truncated_dual_tetrahedron";
pub const STELLA_OCTANGULA: &str = "stella_octangula";
pub const SNUB_CUBE: &str = "snub_cube";
pub const FIVE_TETRAHEDRA: &str = "compound_5_tetrahedra";

fn int(x: i64) -> AlgebraicValue {
    AlgebraicValue::from_integer(x)
}

fn ivert(x: i64, y: i64, z: i64) -> Vertex {
    [int(x), int(y), int(z)]
}

/// Signed vertices of the cube `(±1, ±1, ±1)`; `parity` selects the tetrahedron
/// with an even (`Some(true)`) or odd (`Some(false)`) number of minus signs.
fn cube_corners(parity: Option<bool>, scale: i64) -> Vec<Vertex> {
    let mut out = Vec::new();
    for sx in [1, -1] {
        for sy in [1, -1] {
            for sz in [1, -1] {
                let negatives = [sx, sy, sz].iter().filter(|s| **s < 0).count();
                let even = negatives % 2 == 0;
                if parity.map_or(true, |p| p == even) {
                    out.push(ivert(sx * scale, sy * scale, sz * scale));
                }
            }
        }
    }
    out
}

pub fn tetrahedron() -> PolytopeDef {
    PolytopeDef::base(TETRAHEDRON, cube_corners(Some(false), 1), SymmetryTags::new(false, true))
        .with_declared_circumradius_quadrance(int(3))
}

pub fn dual_tetrahedron() -> PolytopeDef {
    PolytopeDef::base(
        DUAL_TETRAHEDRON,
        cube_corners(Some(true), 1),
        SymmetryTags::new(false, true),
    )
    .with_declared_circumradius_quadrance(int(3))
}

pub fn cube() -> PolytopeDef {
    PolytopeDef::base(CUBE, cube_corners(None, 1), SymmetryTags::new(true, true))
        .with_declared_circumradius_quadrance(int(3))
}

pub fn octahedron() -> PolytopeDef {
    let mut v = Vec::new();
    for s in [1, -1] {
        v.push(ivert(s, 0, 0));
        v.push(ivert(0, s, 0));
        v.push(ivert(0, 0, s));
    }
    PolytopeDef::base(OCTAHEDRON, v, SymmetryTags::new(true, true))
        .with_declared_circumradius_quadrance(int(1))
}

/// Edge midpoints of the cube: all permutations of `(±1, ±1, 0)`.
pub fn cuboctahedron() -> PolytopeDef {
    let mut v = Vec::new();
    for a in [1, -1] {
        for b in [1, -1] {
            v.push(ivert(a, b, 0));
            v.push(ivert(a, 0, b));
            v.push(ivert(0, a, b));
        }
    }
    PolytopeDef::base(CUBOCTAHEDRON, v, SymmetryTags::new(true, true))
        .with_declared_circumradius_quadrance(int(2))
}

/// `φ = (1 + √5)/2` and `1/φ = φ − 1`.
fn golden() -> Result<(AlgebraicValue, AlgebraicValue), KernelError> {
    let phi = AlgebraicValue::from_parts(1, 1, 5, 2)?;
    let inv = AlgebraicValue::from_parts(-1, 1, 5, 2)?;
    Ok((phi, inv))
}

/// Cyclic permutations `(a, b, c) → (b, c, a) → (c, a, b)`.
fn cyclic(a: &AlgebraicValue, b: &AlgebraicValue, c: &AlgebraicValue, out: &mut Vec<Vertex>) {
    out.push([a.clone(), b.clone(), c.clone()]);
    out.push([b.clone(), c.clone(), a.clone()]);
    out.push([c.clone(), a.clone(), b.clone()]);
}

/// Cyclic permutations of `(0, ±1, ±φ)`.
pub fn icosahedron() -> Result<PolytopeDef, KernelError> {
    let (phi, _) = golden()?;
    let mut v = Vec::new();
    for s1 in [1, -1] {
        for s2 in [1, -1] {
            cyclic(&int(0), &int(s1), &phi.scale(&rat(s2, 1)), &mut v);
        }
    }
    // |v|² = 1 + φ² = φ + 2
    let q = phi.try_add(&int(2))?;
    Ok(PolytopeDef::base(ICOSAHEDRON, v, SymmetryTags::new(true, true))
        .with_declared_circumradius_quadrance(q))
}

/// `(±1, ±1, ±1)` plus cyclic permutations of `(0, ±1/φ, ±φ)`.
pub fn dodecahedron() -> Result<PolytopeDef, KernelError> {
    let (phi, inv) = golden()?;
    let mut v = cube_corners(None, 1);
    for s1 in [1, -1] {
        for s2 in [1, -1] {
            cyclic(&int(0), &inv.scale(&rat(s1, 1)), &phi.scale(&rat(s2, 1)), &mut v);
        }
    }
    Ok(PolytopeDef::base(DODECAHEDRON, v, SymmetryTags::new(true, true))
        .with_declared_circumradius_quadrance(int(3)))
}

/// Cut each edge `ab` of a tetrahedron at `a + t(b − a)` and `b + t(a − b)`.
///
/// `t = 0` gives the tetrahedron back; `t = 1/2` collapses to the six edge midpoints.
fn truncate(
    name: &str,
    parent: &str,
    corners: &[Vertex],
    t: &Rational,
) -> Result<PolytopeDef, RegistryError> {
    if t.is_negative() || *t > rat(1, 2) {
        return Err(RegistryError::malformed(
            name,
            format!("truncation {t} outside [0, 1/2]"),
        ));
    }
    let tv = AlgebraicValue::Rational(t.clone());
    let mut v = Vec::with_capacity(12);
    for i in 0..corners.len() {
        for j in 0..corners.len() {
            if i == j {
                continue;
            }
            let (a, b) = (&corners[i], &corners[j]);
            let mut p: Vertex = Default::default();
            for k in 0..3 {
                p[k] = a[k].try_add(&b[k].try_sub(&a[k])?.try_mul(&tv)?)?;
            }
            v.push(p);
        }
    }
    let def = PolytopeDef::base(name, v, SymmetryTags::new(false, true)).with_kind(
        PolytopeKind::Subdivided {
            parent: parent.to_string(),
            truncation: t.clone(),
        },
    );
    Ok(def)
}

pub fn truncated_tetrahedron(name: &str, t: &Rational) -> Result<PolytopeDef, RegistryError> {
    truncate(name, TETRAHEDRON, &cube_corners(Some(false), 3), t)
}

pub fn truncated_dual_tetrahedron(name: &str, t: &Rational) -> Result<PolytopeDef, RegistryError> {
    truncate(name, DUAL_TETRAHEDRON, &cube_corners(Some(true), 3), t)
}

/// Default truncation parameter (Archimedean truncated tetrahedron).
pub fn default_truncation() -> Rational {
    rat(1, 3)
}

/// Real root of `x³ − x² − x − 1`.
fn tribonacci() -> f64 {
    let r = 3.0 * 33f64.sqrt();
    (1.0 + (19.0 + r).cbrt() + (19.0 - r).cbrt()) / 3.0
}

/// One hand of the snub cube: even permutations of `(±1, ±1/ξ, ±ξ)` with an even
/// number of plus signs, odd permutations with an odd number. Not centrally symmetric.
pub fn snub_cube_vertices() -> Vec<[f64; 3]> {
    let xi = tribonacci();
    let base = [1.0, 1.0 / xi, xi];
    let even = [[0, 1, 2], [1, 2, 0], [2, 0, 1]];
    let odd = [[1, 0, 2], [0, 2, 1], [2, 1, 0]];
    let mut out = Vec::with_capacity(24);
    for (perms, parity) in [(even, 0), (odd, 1)] {
        for perm in perms {
            for plus in 0..8u32 {
                if plus.count_ones() % 2 != parity {
                    continue;
                }
                let sign = |k: usize| if plus >> k & 1 == 1 { 1.0 } else { -1.0 };
                out.push([
                    sign(0) * base[perm[0]],
                    sign(1) * base[perm[1]],
                    sign(2) * base[perm[2]],
                ]);
            }
        }
    }
    out
}

/// The base tetrahedron turned by `k · 72°`, `k = 0..5`, about the five-fold axis
/// `(1, φ, 0)`. The twenty points are the vertices of a dodecahedron, so the set
/// is centrally symmetric even though no single tetrahedron is.
pub fn five_tetrahedra_vertices() -> Vec<[f64; 3]> {
    let phi = (1.0 + 5f64.sqrt()) / 2.0;
    let axis = Unit::new_normalize(Vector3::new(1.0, phi, 0.0));
    let corners = [
        Vector3::new(-1.0, 1.0, 1.0),
        Vector3::new(1.0, -1.0, 1.0),
        Vector3::new(1.0, 1.0, -1.0),
        Vector3::new(-1.0, -1.0, -1.0),
    ];
    let mut out = Vec::with_capacity(20);
    for k in 0..5 {
        let r = Rotation3::from_axis_angle(&axis, k as f64 * TAU / 5.0);
        for c in &corners {
            let v = r * c;
            out.push([v.x, v.y, v.z]);
        }
    }
    out
}

/// Register every built-in solid and compound.
pub fn install(reg: &mut Registry) -> Result<(), RegistryError> {
    reg.register_def(tetrahedron())?;
    reg.register_def(dual_tetrahedron())?;
    reg.register_def(cube())?;
    reg.register_def(octahedron())?;
    reg.register_def(cuboctahedron())?;
    reg.register_def(icosahedron()?)?;
    reg.register_def(dodecahedron()?)?;
    let t = default_truncation();
    reg.register_def(truncated_tetrahedron(TRUNCATED_TETRAHEDRON, &t)?)?;
    reg.register_def(truncated_dual_tetrahedron(TRUNCATED_DUAL_TETRAHEDRON, &t)?)?;

    reg.compound_named(
        STELLA_OCTANGULA,
        &[TETRAHEDRON, DUAL_TETRAHEDRON],
        ScaleStrategy::AsPlaced,
    )?;
    reg.compound(TRUNCATED_TETRAHEDRON, DUAL_TETRAHEDRON, ScaleStrategy::MatchFirst)?;
    reg.compound(TRUNCATED_TETRAHEDRON, ICOSAHEDRON, ScaleStrategy::MatchFirst)?;
    // same parity: the tetrahedron's corners sit over the cut-off corners
    reg.compound(TRUNCATED_TETRAHEDRON, TETRAHEDRON, ScaleStrategy::MatchFirst)?;
    reg.compound(CUBE, OCTAHEDRON, ScaleStrategy::MatchFirst)?;
    reg.compound(ICOSAHEDRON, DODECAHEDRON, ScaleStrategy::MatchFirst)?;

    reg.register_f64(SNUB_CUBE, &snub_cube_vertices(), SymmetryTags::new(false, true))?;
    reg.register_f64(FIVE_TETRAHEDRA, &five_tetrahedra_vertices(), SymmetryTags::new(true, true))?;
    Ok(())
}

/// `b` turned about the z axis by each relative spread `s` (triple `(s, 0, 0)`)
/// against a fixed `a`, both at `a`'s circumradius. Existing registrations are reused.
pub fn rotated_pairs<I>(
    reg: &mut Registry,
    a: &str,
    b: &str,
    spreads: I,
) -> Result<Vec<Arc<Polytope>>, RegistryError>
where
    I: IntoIterator<Item = Rational>,
{
    spreads
        .into_iter()
        .map(|s| {
            let t = SpreadTriple::new(s, Rational::zero(), Rational::zero())?;
            reg.compound_rotated(a, b, &t, ScaleStrategy::MatchFirst)
        })
        .collect()
}

/// Name under which `variable_stella(t1, t2)` is registered, e.g. `stella_t1/3_1/4`.
pub fn variable_stella_name(t1: &Rational, t2: &Rational) -> String {
    format!("stella_t{t1}_{t2}")
}

/// Base tetrahedron truncated at `t1` and dual tetrahedron truncated at `t2`,
/// both scaled to unit circumradius. Reuses an existing registration.
pub fn variable_stella(
    reg: &mut Registry,
    t1: &Rational,
    t2: &Rational,
) -> Result<Arc<Polytope>, RegistryError> {
    let name = variable_stella_name(t1, t2);
    if let Ok(existing) = reg.get(&name) {
        return Ok(existing);
    }
    let base = format!("{name}/base");
    let dual = format!("{name}/dual");
    reg.register_def(truncated_tetrahedron(&base, t1)?)?;
    reg.register_def(truncated_dual_tetrahedron(&dual, t2)?)?;
    reg.compound_named(&name, &[&base, &dual], ScaleStrategy::UnitSphere)
}
