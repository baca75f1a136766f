use super::catalog::{self, *};
use super::*;
use crate::algebra::rat;
use crate::error::Warning;

fn ints(v: &[(i64, i64, i64)]) -> Vec<Vertex> {
    v.iter()
        .map(|&(x, y, z)| {
            [
                AlgebraicValue::from_integer(x),
                AlgebraicValue::from_integer(y),
                AlgebraicValue::from_integer(z),
            ]
        })
        .collect()
}

#[test]
fn catalog_installs_all_solids_and_compounds() {
    let reg = Registry::with_catalog().unwrap();
    assert_eq!(reg.len(), 17);
    let counts: Vec<(&str, usize)> = [
        (TETRAHEDRON, 4),
        (CUBE, 8),
        (OCTAHEDRON, 6),
        (CUBOCTAHEDRON, 12),
        (ICOSAHEDRON, 12),
        (DODECAHEDRON, 20),
        (TRUNCATED_TETRAHEDRON, 12),
        (STELLA_OCTANGULA, 8),
        ("truncated_tetrahedron+dual_tetrahedron", 16),
        ("cube+octahedron", 14),
        ("truncated_tetrahedron+tetrahedron", 16),
        (SNUB_CUBE, 24),
        (FIVE_TETRAHEDRA, 20),
    ]
    .into_iter()
    .collect();
    for (name, n) in counts {
        assert_eq!(reg.get(name).unwrap().vertex_count(), n, "{name}");
    }
    // no closed-form declaration disagrees with its measurement
    assert!(reg
        .warnings()
        .iter()
        .all(|w| !matches!(w, Warning::CircumradiusInconsistency { .. })));
}

#[test]
fn central_symmetry_is_measured() {
    let reg = Registry::with_catalog().unwrap();
    for name in [
        CUBE,
        OCTAHEDRON,
        CUBOCTAHEDRON,
        ICOSAHEDRON,
        DODECAHEDRON,
        STELLA_OCTANGULA,
        FIVE_TETRAHEDRA,
    ] {
        assert!(reg.get(name).unwrap().is_centrally_symmetric(), "{name}");
    }
    for name in [
        TETRAHEDRON,
        TRUNCATED_TETRAHEDRON,
        SNUB_CUBE,
        "truncated_tetrahedron+dual_tetrahedron",
        "truncated_tetrahedron+tetrahedron",
    ] {
        assert!(!reg.get(name).unwrap().is_centrally_symmetric(), "{name}");
    }
}

#[test]
fn exact_compound_scales_by_measured_circumradius() {
    let reg = Registry::with_catalog().unwrap();
    let tt = reg.get(TRUNCATED_TETRAHEDRON).unwrap();
    assert_eq!(tt.circumradius_quadrance(), &AlgebraicValue::from_integer(11));
    let c = reg.get("truncated_tetrahedron+dual_tetrahedron").unwrap();
    assert!(!c.is_approximate());
    assert_eq!(c.circumradius_quadrance(), &AlgebraicValue::from_integer(11));
    // dual tetrahedron scaled by √(11/3) = √33/3
    let k = AlgebraicValue::quadratic(rat(0, 1), rat(1, 3), 33.into()).unwrap();
    assert!(c.vertices().iter().any(|v| v[0] == k && v[1] == k && v[2] == k));
    assert!(matches!(
        c.kind(),
        PolytopeKind::Compound {
            strategy: ScaleStrategy::MatchFirst,
            ..
        }
    ));
}

#[test]
fn icosahedral_scaling_falls_back_to_float() {
    let reg = Registry::with_catalog().unwrap();
    let ico = reg.get(ICOSAHEDRON).unwrap();
    assert!(!ico.is_approximate());
    // φ + 2
    let q = AlgebraicValue::from_parts(5, 1, 5, 2).unwrap();
    assert_eq!(ico.circumradius_quadrance(), &q);

    let c = reg.get("truncated_tetrahedron+icosahedron").unwrap();
    assert!(c.is_approximate());
    assert_eq!(c.vertex_count(), 24);
    let r2 = c.circumradius_quadrance().to_f64(reg.radicals());
    assert!((r2 - 11.0).abs() < 1e-9);
    assert!(reg.warnings().iter().any(|w| matches!(
        w,
        Warning::FieldMismatchFallback { context, .. } if context.contains("truncated_tetrahedron+icosahedron")
    )));
}

#[test]
fn declared_circumradius_mismatch_warns_and_uses_measured() {
    let mut reg = Registry::new();
    let def = PolytopeDef::base(
        "square",
        ints(&[(1, 0, 0), (0, 1, 0), (-1, 0, 0), (0, -1, 0)]),
        SymmetryTags::new(true, true),
    )
    .with_declared_circumradius_quadrance(AlgebraicValue::from_integer(2));
    let p = reg.register_def(def).unwrap();
    assert_eq!(p.circumradius_quadrance(), &AlgebraicValue::one());
    assert_eq!(reg.warnings().len(), 1);
    assert!(matches!(
        &reg.warnings()[0],
        Warning::CircumradiusInconsistency { polytope, .. } if polytope == "square"
    ));
    assert_eq!(reg.check_circumradius("square").unwrap(), None);
}

#[test]
fn malformed_definitions_are_rejected() {
    let mut reg = Registry::new();
    assert!(matches!(
        reg.register("empty", vec![], SymmetryTags::NONE),
        Err(RegistryError::MalformedPolytope { .. })
    ));
    assert!(matches!(
        reg.register_f64("nan", &[[0.0, f64::NAN, 1.0]], SymmetryTags::NONE),
        Err(RegistryError::MalformedPolytope { .. })
    ));
    assert!(matches!(
        reg.register("origin", ints(&[(0, 0, 0)]), SymmetryTags::NONE),
        Err(RegistryError::MalformedPolytope { .. })
    ));
    reg.register("one", ints(&[(1, 0, 0)]), SymmetryTags::NONE)
        .unwrap();
    assert_eq!(
        reg.register("one", ints(&[(1, 0, 0)]), SymmetryTags::NONE)
            .unwrap_err(),
        RegistryError::DuplicateName("one".into())
    );
    assert_eq!(
        reg.get("missing").unwrap_err(),
        RegistryError::UnknownPolytope("missing".into())
    );
    assert!(reg.compound("one", "missing", ScaleStrategy::AsPlaced).is_err());
    // failed registrations leave nothing behind
    assert_eq!(reg.names().collect::<Vec<_>>(), vec!["one"]);
}

#[test]
fn float_vertices_are_promoted_exactly() {
    let mut reg = Registry::new();
    let p = reg
        .register_f64(
            "tri",
            &[[0.5, 0.0, 0.0], [0.0, 0.25, 0.0], [-0.125, -0.125, 0.0]],
            SymmetryTags::NONE,
        )
        .unwrap();
    assert!(p.is_approximate());
    assert_eq!(p.vertices()[0][0], AlgebraicValue::Rational(rat(1, 2)));
    assert_eq!(p.vertices_f64()[2].x, -0.125);
}

#[test]
fn truncation_limits() {
    let mut reg = Registry::new();
    let t0 = reg
        .register_def(catalog::truncated_tetrahedron("t0", &rat(0, 1)).unwrap())
        .unwrap();
    assert_eq!(t0.vertex_count(), 4);
    let half = reg
        .register_def(catalog::truncated_tetrahedron("half", &rat(1, 2)).unwrap())
        .unwrap();
    // edge midpoints of a tetrahedron form an octahedron
    assert_eq!(half.vertex_count(), 6);
    assert!(half.is_centrally_symmetric());
    assert!(catalog::truncated_tetrahedron("bad", &rat(3, 4)).is_err());
}

#[test]
fn variable_stella_has_unit_circumradius() {
    let mut reg = Registry::new();
    let (t1, t2) = (rat(1, 3), rat(1, 4));
    let s = catalog::variable_stella(&mut reg, &t1, &t2).unwrap();
    assert_eq!(s.name(), "stella_t1/3_1/4");
    assert_eq!(s.vertex_count(), 24);
    assert_eq!(s.circumradius_quadrance(), &AlgebraicValue::one());
    let again = catalog::variable_stella(&mut reg, &t1, &t2).unwrap();
    assert!(Arc::ptr_eq(&s, &again));
}

#[test]
fn cube_octahedron_compound_is_exact() {
    let reg = Registry::with_catalog().unwrap();
    let c = reg.get("cube+octahedron").unwrap();
    assert!(!c.is_approximate());
    assert!(c.is_centrally_symmetric());
    assert_eq!(c.circumradius_quadrance(), &AlgebraicValue::from_integer(3));
    let r3 = AlgebraicValue::quadratic(rat(0, 1), rat(1, 1), 3.into()).unwrap();
    assert!(c.vertices().contains(&[r3, AlgebraicValue::zero(), AlgebraicValue::zero()]));
}

#[test]
fn compound_of_non_central_parts_is_tagged_from_its_union() {
    let mut reg = Registry::new();
    reg.register_def(tetrahedron()).unwrap();
    reg.register_def(dual_tetrahedron()).unwrap();
    let tet = reg.get(TETRAHEDRON).unwrap();
    let dual = reg.get(DUAL_TETRAHEDRON).unwrap();
    assert!(!tet.is_centrally_symmetric() && !dual.is_centrally_symmetric());
    let union: Vec<Vertex> = tet.vertices().iter().chain(dual.vertices()).cloned().collect();
    assert!(measure_central(&union, false, reg.radicals()));
    assert!(!measure_central(tet.vertices(), false, reg.radicals()));

    let stella = reg
        .compound_named(STELLA_OCTANGULA, &[TETRAHEDRON, DUAL_TETRAHEDRON], ScaleStrategy::AsPlaced)
        .unwrap();
    assert!(stella.is_centrally_symmetric());
    assert!(reg.warnings().is_empty());
}

#[test]
fn approximate_symmetry_is_measured_within_tolerance() {
    let reg = Registry::with_catalog().unwrap();
    let five = reg.get(FIVE_TETRAHEDRA).unwrap();
    assert!(five.is_approximate());
    assert!(five.is_centrally_symmetric());
    let r2 = five.circumradius_quadrance().to_f64(reg.radicals());
    assert!((r2 - 3.0).abs() < 1e-9);

    let snub = reg.get(SNUB_CUBE).unwrap();
    assert!(snub.is_approximate());
    let q: Vec<f64> = snub.vertices_f64().iter().map(|v| v.norm_squared()).collect();
    assert!(q.iter().all(|x| (x - q[0]).abs() < 1e-9));
    // five nearest neighbours per vertex
    let v = snub.vertices_f64();
    let d: Vec<f64> = v.iter().skip(1).map(|w| (w - v[0]).norm()).collect();
    let edge = d.iter().copied().fold(f64::INFINITY, f64::min);
    assert_eq!(d.iter().filter(|x| (*x - edge).abs() < 1e-9).count(), 5);
}

#[test]
fn same_parity_truncated_compound_matches_circumradius() {
    let reg = Registry::with_catalog().unwrap();
    let c = reg.get("truncated_tetrahedron+tetrahedron").unwrap();
    assert!(!c.is_approximate());
    assert_eq!(c.circumradius_quadrance(), &AlgebraicValue::from_integer(11));
    // tetrahedron scaled by √(11/3): corner (−1, −1, −1) becomes −√33/3 on every axis
    let k = AlgebraicValue::quadratic(rat(0, 1), rat(-1, 3), 33.into()).unwrap();
    assert!(c.vertices().contains(&[k.clone(), k.clone(), k]));
}

#[test]
fn quarter_turn_of_a_tetrahedron_against_itself_is_the_stella() {
    let mut reg = Registry::with_catalog().unwrap();
    let quarter = "1,0,0".parse::<SpreadTriple>().unwrap();
    let c = reg
        .compound_rotated(TETRAHEDRON, TETRAHEDRON, &quarter, ScaleStrategy::MatchFirst)
        .unwrap();
    assert_eq!(c.name(), "tetrahedron+tetrahedron@1,0,0");
    assert!(!c.is_approximate());
    assert!(c.is_centrally_symmetric());
    let got: HashSet<Vertex> = c.vertices().iter().cloned().collect();
    let cube: HashSet<Vertex> = reg.get(CUBE).unwrap().vertices().iter().cloned().collect();
    assert_eq!(got, cube);
    let turned = reg.get("tetrahedron@1,0,0").unwrap();
    assert!(matches!(turned.kind(), PolytopeKind::Rotated { parent, .. } if parent == TETRAHEDRON));

    let again = reg
        .compound_rotated(TETRAHEDRON, TETRAHEDRON, &quarter, ScaleStrategy::MatchFirst)
        .unwrap();
    assert!(Arc::ptr_eq(&c, &again));
    assert!(reg
        .compound_rotated(TETRAHEDRON, "missing", &quarter, ScaleStrategy::MatchFirst)
        .is_err());
}

#[test]
fn mixed_field_relative_rotation_is_promoted() {
    let mut reg = Registry::with_catalog().unwrap();
    let before = reg.warnings().len();
    let pairs = rotated_pairs(&mut reg, TRUNCATED_TETRAHEDRON, TETRAHEDRON, [rat(0, 1), rat(1, 3)]).unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].name(), "truncated_tetrahedron+tetrahedron@0,0,0");
    assert!(!pairs[0].is_approximate());
    // √(1/3) and √(2/3) meet in one coordinate
    let turned = &pairs[1];
    assert!(turned.is_approximate());
    assert_eq!(turned.vertex_count(), 16);
    let r2 = turned.circumradius_quadrance().to_f64(reg.radicals());
    assert!((r2 - 11.0).abs() < 1e-9);
    assert!(reg.warnings()[before..].iter().any(|w| matches!(
        w,
        Warning::FieldMismatchFallback { context, .. } if context.contains("rotating `tetrahedron`")
    )));
}
