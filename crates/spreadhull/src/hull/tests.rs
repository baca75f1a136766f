use super::*;
use crate::algebra::{rat, AlgebraicValue, Rational};
use num_bigint::BigInt;
use proptest::prelude::*;

fn rp(x: i64, y: i64) -> PlanePoint<Rational> {
    PlanePoint::new(rat(x, 1), rat(y, 1))
}

fn sqrt2(k: (i64, i64)) -> AlgebraicValue {
    AlgebraicValue::quadratic(rat(0, 1), rat(k.0, k.1), BigInt::from(2)).unwrap()
}

fn assert_ccw<S: Scalar>(hull: &[PlanePoint<S>]) {
    let n = hull.len();
    for i in 0..n {
        let c = orient(&hull[i], &hull[(i + 1) % n], &hull[(i + 2) % n]).unwrap();
        assert_eq!(c.sign(), Ordering::Greater);
    }
}

#[test]
fn square_with_interior_and_edge_points() {
    let pts = vec![
        rp(2, 2),
        rp(0, 0),
        rp(1, 1),
        rp(2, 0),
        rp(1, 0), // on the bottom edge
        rp(0, 2),
        rp(0, 2), // duplicate
    ];
    let idx = convex_hull_indices(&pts).unwrap();
    assert_eq!(idx, vec![1, 3, 0, 5]);
    assert_ccw(&convex_hull(&pts).unwrap());
}

#[test]
fn exact_collinearity_in_quadratic_field() {
    // Square of side √2 with an exact edge midpoint at (√2/2, 0).
    let z = AlgebraicValue::zero;
    let pts = vec![
        PlanePoint::new(z(), z()),
        PlanePoint::new(sqrt2((1, 2)), z()),
        PlanePoint::new(sqrt2((1, 1)), z()),
        PlanePoint::new(sqrt2((1, 1)), sqrt2((1, 1))),
        PlanePoint::new(z(), sqrt2((1, 1))),
    ];
    let idx = convex_hull_indices(&pts).unwrap();
    assert_eq!(idx, vec![0, 2, 3, 4]);

    // All points on the line y = √2·x collapse.
    let line: Vec<_> = (0..5)
        .map(|k| {
            PlanePoint::new(
                AlgebraicValue::from_integer(k),
                sqrt2((k, 1)),
            )
        })
        .collect();
    assert_eq!(
        convex_hull_indices(&line).unwrap_err(),
        HullError::DegenerateProjection { distinct: 5, hull: 2 }
    );
}

#[test]
fn duplicates_only_is_degenerate() {
    let pts = vec![rp(1, 1); 4];
    assert_eq!(
        convex_hull_indices(&pts).unwrap_err(),
        HullError::DegenerateProjection { distinct: 1, hull: 1 }
    );
}

#[test]
fn mixed_fields_are_reported() {
    let r3 = AlgebraicValue::quadratic(rat(0, 1), rat(1, 1), BigInt::from(3)).unwrap();
    let pts = vec![
        PlanePoint::new(sqrt2((1, 1)), AlgebraicValue::zero()),
        PlanePoint::new(r3, AlgebraicValue::one()),
        PlanePoint::new(AlgebraicValue::zero(), AlgebraicValue::one()),
    ];
    match convex_hull_indices(&pts) {
        Err(HullError::Kernel(e)) => assert!(e.is_field_mismatch()),
        other => panic!("expected field mismatch, got {other:?}"),
    }
}

#[test]
fn floating_path_merges_near_duplicates() {
    let pts = vec![
        PlanePoint::new(0.0, 0.0),
        PlanePoint::new(1.0, 0.0),
        PlanePoint::new(1.0 + 1e-14, 1e-14),
        PlanePoint::new(0.0, 1.0),
    ];
    let idx = convex_hull_indices(&pts).unwrap();
    assert_eq!(idx.len(), 3);
    assert!(convex_hull_indices(&[PlanePoint::new(f64::NAN, 0.0)]).is_err());
}

#[test]
fn representations_agree_on_integer_points() {
    let raw = [(3, 1), (-2, 4), (0, 0), (5, -3), (1, 6), (-4, -1), (2, 2)];
    let q: Vec<_> = raw.iter().map(|&(x, y)| rp(x, y)).collect();
    let a: Vec<_> = raw
        .iter()
        .map(|&(x, y)| PlanePoint::new(AlgebraicValue::from_integer(x), AlgebraicValue::from_integer(y)))
        .collect();
    let f: Vec<_> = raw
        .iter()
        .map(|&(x, y)| PlanePoint::new(x as f64, y as f64))
        .collect();
    let hq = convex_hull_indices(&q).unwrap();
    assert_eq!(hq, convex_hull_indices(&a).unwrap());
    assert_eq!(hq, convex_hull_indices(&f).unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Same point multiset, any input order: identical ordered hull.
    #[test]
    fn hull_is_order_independent(
        raw in proptest::collection::vec((-20i64..20, -20i64..20), 3..40),
        seed in any::<u64>(),
    ) {
        let pts: Vec<_> = raw.iter().map(|&(x, y)| rp(x, y)).collect();
        let mut shuffled = pts.clone();
        // deterministic Fisher–Yates driven by `seed`
        let mut s = seed | 1;
        for i in (1..shuffled.len()).rev() {
            s ^= s << 13;
            s ^= s >> 7;
            s ^= s << 17;
            shuffled.swap(i, (s % (i as u64 + 1)) as usize);
        }
        let a = convex_hull(&pts);
        let b = convex_hull(&shuffled);
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(&a, &b);
                assert_ccw(&a);
                // every input point lies inside or on the hull
                let n = a.len();
                for p in &pts {
                    for i in 0..n {
                        let c = orient(&a[i], &a[(i + 1) % n], p).unwrap();
                        prop_assert!(c.sign() != Ordering::Less);
                    }
                }
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "mismatch: {a:?} vs {b:?}"),
        }
    }
}
