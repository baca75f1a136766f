use super::*;
use crate::algebra::{rat, AlgebraicValue};
use crate::registry::{catalog, SymmetryTags};
use proptest::prelude::*;

fn triple(parts: [(i64, i64); 3]) -> SpreadTriple {
    SpreadTriple::from_ratios(parts).unwrap()
}

fn catalog_registry() -> Registry {
    Registry::with_catalog().unwrap()
}

fn eval(
    reg: &Registry,
    name: &str,
    t: &SpreadTriple,
    plane: PlaneNormal,
    mode: NumericMode,
) -> ProjectionResult {
    let p = reg.get(name).unwrap();
    evaluate(&p, t, plane, mode, reg.radicals()).unwrap()
}

#[test]
fn truncated_tetrahedron_pentagon() {
    let reg = catalog_registry();
    let t = triple([(0, 1), (0, 1), (1, 2)]);
    let r = eval(&reg, catalog::TRUNCATED_TETRAHEDRON, &t, PlaneNormal::Z, NumericMode::Exact);
    assert_eq!(r.count(), 5);
    assert!(!r.is_degenerate());
    assert!(r.exact, "stays inside Q(√2)");
    let sum: f64 = r.classification.angles.iter().sum();
    assert!((sum - 540.0).abs() < 1e-9);
    assert!((r.score() - 0.0637).abs() < 1e-3);
}

#[test]
fn truncated_tetrahedron_dual_compound_heptagon() {
    let reg = catalog_registry();
    let name = "truncated_tetrahedron+dual_tetrahedron";
    assert_eq!(reg.get(name).unwrap().vertex_count(), 16);
    let t = triple([(1, 2), (1, 2), (1, 2)]);
    for mode in [NumericMode::Exact, NumericMode::ExactFloatingPromotion, NumericMode::FastFloating] {
        let r = eval(&reg, name, &t, PlaneNormal::X, mode);
        assert_eq!(r.count(), 7, "{mode}");
        assert!(!r.is_degenerate(), "{mode}");
        // documented regularity threshold for this scenario
        assert!(r.score() >= 0.5, "{mode}: {}", r.score());
        assert!(r.classification.edge_relative_variance < 0.01);
    }
    // √33 against Q(√2) coefficients: exact mode reports its fallback
    let r = eval(&reg, name, &t, PlaneNormal::X, NumericMode::Exact);
    assert!(r.fallback.is_some());
    assert!(!r.exact);

    // the heptagon shows on the x and y planes; the default z plane sees ten vertices
    let y = eval(&reg, name, &t, PlaneNormal::Y, NumericMode::Exact);
    assert_eq!(y.count(), 7);
    for mode in [NumericMode::Exact, NumericMode::FastFloating] {
        let z = eval(&reg, name, &t, PlaneNormal::Z, mode);
        assert_eq!(z.count(), 10, "{mode}");
        assert!((z.score() - 0.053).abs() < 1e-3, "{mode}: {}", z.score());
    }
    assert_eq!(SearchConfig::default().plane, PlaneNormal::Z);
}

#[test]
fn tetrahedron_face_on_is_a_triangle_with_interior_apex() {
    let reg = catalog_registry();
    // viewing direction (−1, 1, 1), through the vertex opposite a face
    let t = triple([(0, 1), (1, 3), (1, 2)]);
    let r = eval(&reg, catalog::TETRAHEDRON, &t, PlaneNormal::Z, NumericMode::Exact);
    assert_eq!(r.count(), 3);
    assert!(r.exact);
    assert!((r.score() - 1.0).abs() < 1e-9);
    let apex = (0..4).find(|i| !r.hull.contains(i)).unwrap();
    let h = r.hull_points();
    let p = &r.points[apex];
    for i in 0..3 {
        let (a, b) = (&h[i], &h[(i + 1) % 3]);
        let c = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        assert!(c > 1e-6, "apex must be strictly inside");
    }
}

/// Central, flat-ish point set: `(2, 0, 0)` sits exactly on the edge from
/// `(1, −1, 0)` to `(3, 1, 0)`, and `(2 + δ, 0, 0)` lies δ outside it, closer
/// than the floating coincidence tolerance.
fn nudged_parallelogram(reg: &mut Registry) -> Arc<Polytope> {
    let d = 5e-13;
    let half = [[3.0, 1.0, 0.0], [1.0, -1.0, 0.0], [2.0, 0.0, 0.0], [2.0 + d, 0.0, 0.0], [0.0, 0.0, 1.0]];
    let vertices: Vec<[f64; 3]> = half
        .iter()
        .flat_map(|v| [*v, [-v[0], -v[1], -v[2]]])
        .collect();
    reg.register_f64("nudged_parallelogram", &vertices, SymmetryTags::new(true, false))
        .unwrap()
}

#[test]
fn odd_floating_hull_of_a_central_polytope_is_a_symmetry_artifact() {
    let mut reg = Registry::new();
    let p = nudged_parallelogram(&mut reg);
    assert!(p.is_centrally_symmetric());
    let t = triple([(0, 1), (0, 1), (0, 1)]);

    // merging keeps the first point of each coincident pair, which breaks the symmetry
    let fast = evaluate(&p, &t, PlaneNormal::Z, NumericMode::FastFloating, reg.radicals()).unwrap();
    assert_eq!(fast.count(), 5);
    assert!(fast.classification.symmetry_artifact);
    assert!(fast.is_degenerate());

    let exact = evaluate(&p, &t, PlaneNormal::Z, NumericMode::Exact, reg.radicals()).unwrap();
    assert_eq!(exact.count(), 6);
    assert!(!exact.classification.symmetry_artifact);

    let cfg = SearchConfig {
        mode: NumericMode::FastFloating,
        prune_symmetric: false,
        ..SearchConfig::default().with_targets([5])
    };
    let out = SearchDriver::new(&reg, cfg).run(&[p], ExplicitGrid::new(vec![t]));
    assert_eq!(out.hits.len(), 1);
    assert!(out.hits[0].result.classification.symmetry_artifact);
    assert_eq!(out.stats.degenerate_matches, 1);
    assert!(out.leaderboard().for_count(5).is_empty());
}

#[test]
fn driver_hits_always_match_and_unmatched_ones_stay_off_the_board() {
    let reg = catalog_registry();
    let tt = reg.get(catalog::TRUNCATED_TETRAHEDRON).unwrap();
    let grid = ExplicitGrid::new(vec![triple([(0, 1), (0, 1), (1, 2)])]);
    let out = search(&reg, &[tt], grid, &[5].into_iter().collect());
    assert_eq!(out.hits.len(), 1);
    assert!(out.hits[0].matches_target);

    let mut unmatched = out.hits[0].clone();
    unmatched.matches_target = false;
    assert!(Leaderboard::build([&unmatched]).for_count(5).is_empty());
    assert_eq!(Leaderboard::build(&out.hits).for_count(5).len(), 1);
}

#[test]
fn simpler_tier_wins_between_equal_shapes() {
    let reg = catalog_registry();
    let tt = reg.get(catalog::TRUNCATED_TETRAHEDRON).unwrap();
    // s1 only spins the picture inside the projection plane
    let simple = triple([(0, 1), (0, 1), (1, 2)]);
    let fine = triple([(1, 7), (0, 1), (1, 2)]);
    let grid = ExplicitGrid::new(vec![fine.clone(), simple.clone()]);
    let out = search(&reg, &[tt], grid, &[5].into_iter().collect());
    assert_eq!(out.hits.len(), 2);
    let (a, b) = (&out.hits[0], &out.hits[1]);
    assert!((a.score() - b.score()).abs() < 1e-9);
    let board = out.leaderboard();
    let ranked = board.for_count(5);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].spreads, simple);
    assert_eq!(ranked[0].tier(), Tier::Simple);
    assert_eq!(ranked[1].tier(), Tier::Fine);
    assert!(!ranked[1].result.exact);
}

#[test]
fn comparator_prefers_smaller_polytopes_within_cluster() {
    let reg = catalog_registry();
    let t = triple([(0, 1), (1, 3), (1, 2)]);
    let polys = vec![
        reg.get(catalog::TETRAHEDRON).unwrap(),
        reg.get(catalog::STELLA_OCTANGULA).unwrap(),
    ];
    let out = SearchDriver::new(
        &reg,
        SearchConfig {
            prune_symmetric: false,
            ..SearchConfig::default().with_targets([3, 4, 6])
        },
    )
    .run(&polys, ExplicitGrid::new(vec![t]));
    let board = out.leaderboard();
    if let Some(best) = board.best(3) {
        assert_eq!(best.polytope.name(), catalog::TETRAHEDRON);
    }
    let reversed: Vec<&SearchHit> = out.hits.iter().rev().collect();
    let again = Leaderboard::build(reversed);
    for (n, ranked) in board.iter() {
        let key = |hs: &[SearchHit]| -> Vec<(String, String)> {
            hs.iter()
                .map(|h| (h.polytope.name().to_string(), h.spreads.to_string()))
                .collect()
        };
        assert_eq!(key(ranked), key(again.for_count(n)));
    }
}

fn rescored_hit(reg: &Registry, t: SpreadTriple, score: f64) -> SearchHit {
    let p = reg.get(catalog::TRUNCATED_TETRAHEDRON).unwrap();
    let mut result = evaluate(&p, &t, PlaneNormal::Z, NumericMode::Exact, reg.radicals()).unwrap();
    result.classification.score = score;
    SearchHit {
        polytope: p,
        spreads: t,
        result,
        matches_target: true,
    }
}

#[test]
fn close_scores_straddling_a_percent_boundary_still_prefer_the_simpler_tier() {
    let reg = catalog_registry();
    let simple = triple([(0, 1), (0, 1), (1, 2)]);
    let fine = triple([(1, 7), (0, 1), (1, 2)]);
    let hits = vec![
        rescored_hit(&reg, fine.clone(), 0.51001),
        rescored_hit(&reg, simple.clone(), 0.50999),
    ];
    let board = Leaderboard::build(&hits);
    let best = board.best(5).unwrap();
    assert_eq!(best.tier(), Tier::Simple);
    assert_eq!(best.spreads, simple);

    // a clear gap lets the better score win over the simpler tier
    let hits = vec![
        rescored_hit(&reg, fine.clone(), 0.53),
        rescored_hit(&reg, simple.clone(), 0.51),
    ];
    let board = Leaderboard::build(&hits);
    assert_eq!(board.best(5).unwrap().spreads, fine);

    // closeness chains: 0.515 bridges 0.51 and 0.519
    let mid = triple([(1, 3), (0, 1), (1, 2)]);
    let hits = vec![
        rescored_hit(&reg, fine.clone(), 0.519),
        rescored_hit(&reg, mid, 0.515),
        rescored_hit(&reg, simple.clone(), 0.51),
    ];
    let board = Leaderboard::build(&hits);
    let tiers: Vec<Tier> = board.for_count(5).iter().map(SearchHit::tier).collect();
    assert_eq!(tiers, vec![Tier::Simple, Tier::Simple, Tier::Fine]);
    assert_eq!(board.best(5).unwrap().score(), 0.515);
}

#[test]
fn flat_polytope_edge_on_is_a_degenerate_projection() {
    let mut reg = Registry::new();
    let v = |x: i64, y: i64| {
        [
            AlgebraicValue::from_integer(x),
            AlgebraicValue::from_integer(y),
            AlgebraicValue::zero(),
        ]
    };
    let sq = reg
        .register("flat_square", vec![v(1, 1), v(-1, 1), v(-1, -1), v(1, -1)], SymmetryTags::new(true, false))
        .unwrap();
    let t = triple([(0, 1), (0, 1), (1, 1)]);
    let p = reg.get("flat_square").unwrap();
    assert!(matches!(
        evaluate(&p, &t, PlaneNormal::Z, NumericMode::Exact, reg.radicals()),
        Err(HullError::DegenerateProjection { distinct: 2, .. })
    ));
    let out = search(&reg, &[sq], ExplicitGrid::new(vec![t]), &[3, 4].into_iter().collect());
    assert!(out.hits.is_empty());
    assert_eq!(out.warnings.degenerate_projections, 1);
}

#[test]
fn overflowing_floating_rotation_is_counted_as_skipped() {
    let mut reg = Registry::new();
    let big = 1.5e308;
    let p = reg
        .register_f64(
            "huge",
            &[[big, big, 0.0], [-big, -big, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            SymmetryTags::NONE,
        )
        .unwrap();
    assert!(!p.is_centrally_symmetric());
    // a 45° turn about z pushes x + y past f64::MAX
    let t = triple([(1, 2), (0, 1), (0, 1)]);
    assert!(matches!(
        evaluate(&p, &t, PlaneNormal::Z, NumericMode::FastFloating, reg.radicals()),
        Err(HullError::Kernel(KernelError::NonFinite))
    ));
    let cfg = SearchConfig {
        mode: NumericMode::FastFloating,
        ..SearchConfig::default().with_targets([3, 4])
    };
    let out = SearchDriver::new(&reg, cfg).run(&[p], ExplicitGrid::new(vec![t]));
    assert!(out.hits.is_empty());
    assert_eq!(out.stats.evaluations, 1);
    assert_eq!(out.warnings.skipped_evaluations, 1);
    assert_eq!(out.warnings.total(), 1);
}

#[test]
fn symmetric_polytopes_are_pruned_for_odd_targets() {
    let reg = catalog_registry();
    let polys = vec![
        reg.get(catalog::CUBE).unwrap(),
        reg.get(catalog::TRUNCATED_TETRAHEDRON).unwrap(),
    ];
    let grid = || TieredGrid::new(Tier::Simple);
    let pruned = SearchDriver::new(&reg, SearchConfig::default().with_targets([5, 7])).run(&polys, grid());
    assert_eq!(pruned.stats.pruned, 343);
    assert_eq!(pruned.stats.evaluations, 343);
    assert!(pruned.hits.iter().all(|h| h.polytope.name() != catalog::CUBE));

    let cfg = SearchConfig {
        prune_symmetric: false,
        ..SearchConfig::default().with_targets([5, 7])
    };
    let full = SearchDriver::new(&reg, cfg).run(&polys, grid());
    assert_eq!(full.stats.pruned, 0);
    assert_eq!(full.stats.evaluations, 686);
    // no cube hit at all: its counts are even
    assert!(full.hits.iter().all(|h| h.polytope.name() != catalog::CUBE));
    // pruning never changes the answer
    let key = |o: &SearchOutcome| -> Vec<(String, String)> {
        o.hits
            .iter()
            .map(|h| (h.polytope.name().to_string(), h.spreads.to_string()))
            .collect()
    };
    assert_eq!(key(&pruned), key(&full));
}

#[test]
fn cancellation_keeps_flushed_hits() {
    let reg = catalog_registry();
    let tt = reg.get(catalog::TRUNCATED_TETRAHEDRON).unwrap();
    let grid = ExplicitGrid::new(vec![
        triple([(0, 1), (0, 1), (1, 2)]),
        triple([(1, 3), (0, 1), (1, 2)]),
        triple([(1, 4), (0, 1), (1, 2)]),
    ]);
    let cancel = CancelToken::new();
    let cfg = SearchConfig {
        chunk_size: 1,
        ..SearchConfig::default().with_targets([5])
    };
    let driver = SearchDriver::new(&reg, cfg).with_cancel(cancel.clone());
    let mut flushed = 0;
    let out = driver.run_with(&[tt.clone()], grid, |batch| {
        flushed += batch.len();
        cancel.cancel();
    });
    assert!(out.cancelled);
    assert_eq!(flushed, 1);
    assert_eq!(out.hits.len(), 1);
    assert_eq!(out.stats.grid_points, 1);

    let pre = CancelToken::new();
    pre.cancel();
    let out = SearchDriver::new(&reg, SearchConfig::default())
        .with_cancel(pre)
        .run(&[tt], TieredGrid::new(Tier::Simple));
    assert!(out.cancelled);
    assert_eq!(out.stats.evaluations, 0);
}

#[test]
fn untested_targets_may_come_back_empty() {
    let reg = catalog_registry();
    let tet = reg.get(catalog::TETRAHEDRON).unwrap();
    let out = search(&reg, &[tet], TieredGrid::new(Tier::Simple), &[23].into_iter().collect());
    assert!(out.hits.is_empty());
    assert!(!out.cancelled);
    assert!(out.leaderboard().is_empty());
}

#[test]
fn repeated_triples_are_recorded_once() {
    let reg = catalog_registry();
    let tt = reg.get(catalog::TRUNCATED_TETRAHEDRON).unwrap();
    let t = triple([(0, 1), (0, 1), (1, 2)]);
    let cfg = SearchConfig {
        chunk_size: 1,
        ..SearchConfig::default().with_targets([5])
    };
    let out = SearchDriver::new(&reg, cfg).run(&[tt], ExplicitGrid::new(vec![t.clone(), t.clone(), t]));
    assert_eq!(out.stats.grid_points, 3);
    assert_eq!(out.hits.len(), 1);
}

#[test]
fn grids_enumerate_as_documented() {
    let g = DecimalGrid::with_precision(1);
    assert_eq!(g.total(), Some(1331));
    assert_eq!(g.values().len(), 11);
    assert_eq!(g.count(), 1331);

    let simple: Vec<_> = TieredGrid::new(Tier::Simple).collect();
    assert_eq!(simple.len(), 343);
    assert!(simple.iter().all(|t| t.tier() == Tier::Simple));

    let both: Vec<_> = TieredGrid::new(Tier::Intermediate).collect();
    assert_eq!(both.len(), 31 * 31 * 31);
    assert_eq!(&both[..343], &simple[..]);
    assert!(both[343..].iter().all(|t| t.tier() == Tier::Intermediate));
    let unique: HashSet<_> = both.iter().collect();
    assert_eq!(unique.len(), both.len());

    let values = TieredGrid::values_up_to(Tier::Fine, 13);
    assert!(values.contains(&rat(1, 7)) && values.contains(&rat(12, 13)));
    assert!(!values.contains(&rat(1, 14)));

    let r = RandomGrid::new(50, 12, 7);
    let drawn: Vec<_> = r.clone().collect();
    assert_eq!(drawn.len(), 50);
    assert_eq!(drawn[17], r.regenerate(17));
    assert_eq!(drawn, RandomGrid::new(50, 12, 7).collect::<Vec<_>>());
    assert_ne!(drawn, RandomGrid::new(50, 12, 8).collect::<Vec<_>>());
    assert_eq!(r.describe(), "random:50:12:7");

    let e = ExplicitGrid::new(vec![triple([(1, 2), (0, 1), (0, 1)])]);
    assert_eq!(e.total(), Some(1));
}

fn spread_strategy() -> impl Strategy<Value = SpreadTriple> {
    let comp = (1i64..=12).prop_flat_map(|q| (0..=q, Just(q)));
    (comp.clone(), comp.clone(), comp).prop_map(|(a, b, c)| triple([a, b, c]))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn centrally_symmetric_hulls_are_even(t in spread_strategy(), which in 0usize..5) {
        let reg = catalog_registry();
        let name = [
            catalog::CUBE,
            catalog::OCTAHEDRON,
            catalog::CUBOCTAHEDRON,
            catalog::ICOSAHEDRON,
            catalog::STELLA_OCTANGULA,
        ][which];
        let p = reg.get(name).unwrap();
        prop_assume!(p.is_centrally_symmetric());
        for mode in [NumericMode::Exact, NumericMode::ExactFloatingPromotion] {
            match evaluate(&p, &t, PlaneNormal::Z, mode, reg.radicals()) {
                Ok(r) => {
                    prop_assert_eq!(r.count() % 2, 0, "{} at {} ({})", name, t, mode);
                    prop_assert!(!r.classification.symmetry_artifact);
                }
                Err(HullError::DegenerateProjection { .. }) => {}
                Err(e) => prop_assert!(false, "{e}"),
            }
        }
    }

    #[test]
    fn evaluation_is_deterministic(t in spread_strategy(), plane in 0usize..3) {
        let reg = catalog_registry();
        let plane = PlaneNormal::ALL[plane];
        let p = reg.get("truncated_tetrahedron+dual_tetrahedron").unwrap();
        for mode in [NumericMode::Exact, NumericMode::ExactFloatingPromotion, NumericMode::FastFloating] {
            let a = evaluate(&p, &t, plane, mode, reg.radicals());
            let b = evaluate(&p, &t, plane, mode, reg.radicals());
            match (a, b) {
                (Ok(a), Ok(b)) => {
                    prop_assert_eq!(&a.hull, &b.hull);
                    prop_assert_eq!(&a.points, &b.points);
                    prop_assert_eq!(a.score().to_bits(), b.score().to_bits());
                }
                (Err(a), Err(b)) => prop_assert_eq!(a, b),
                _ => prop_assert!(false, "results diverged"),
            }
        }
    }

    #[test]
    fn leaderboard_never_holds_flat_corners(t in spread_strategy()) {
        let reg = catalog_registry();
        let polys: Vec<_> = reg.iter().cloned().collect();
        let cfg = SearchConfig {
            mode: NumericMode::ExactFloatingPromotion,
            prune_symmetric: false,
            ..SearchConfig::default().with_targets(3..=24)
        };
        let out = SearchDriver::new(&reg, cfg).run(&polys, ExplicitGrid::new(vec![t]));
        for (_, ranked) in out.leaderboard().iter() {
            for h in ranked {
                prop_assert!(h.result.classification.max_angle() < 179.0 + 1e-6);
                prop_assert!(!h.result.is_degenerate());
            }
        }
    }
}
