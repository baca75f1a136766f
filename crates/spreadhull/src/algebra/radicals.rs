use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;

use super::util::split_square;

/// Immutable lookup of `√d` for squarefree radicands.
///
/// Built once (typically by the registry, after all polytopes are known) and
/// shared read-only. Radicands outside the table are evaluated on demand
/// without being cached.
#[derive(Clone, Debug)]
pub struct RadicalTable {
    values: BTreeMap<BigInt, f64>,
}

impl RadicalTable {
    /// Squarefree radicands `2..=STANDARD_BOUND` are always present.
    pub const STANDARD_BOUND: u64 = 1024;

    pub fn standard() -> Self {
        Self::with_radicands(std::iter::empty())
    }

    /// Standard table extended by the squarefree parts of `extra`.
    pub fn with_radicands<I: IntoIterator<Item = BigInt>>(extra: I) -> Self {
        let mut values = BTreeMap::new();
        for d in 2..=Self::STANDARD_BOUND {
            let (_, m) = split_square(&BigInt::from(d));
            if m == BigInt::from(d) {
                values.insert(m, (d as f64).sqrt());
            }
        }
        for d in extra {
            let (_, m) = split_square(&d);
            if m > BigInt::from(1) {
                let v = eval(&m);
                values.entry(m).or_insert(v);
            }
        }
        Self { values }
    }

    /// `√d`, table hit or direct evaluation.
    #[inline]
    pub fn sqrt(&self, d: &BigInt) -> f64 {
        match self.values.get(d) {
            Some(v) => *v,
            None => eval(d),
        }
    }

    #[inline]
    pub fn contains(&self, d: &BigInt) -> bool {
        self.values.contains_key(d)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for RadicalTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn eval(d: &BigInt) -> f64 {
    d.to_f64().map(f64::sqrt).unwrap_or(f64::NAN)
}
