//! Spread-triple generators.
//!
//! All grids are plain iterators over `SpreadTriple`, so the driver consumes them
//! uniformly. `total()` is the number of triples the grid will yield when known.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

use crate::algebra::{Rational, SpreadTriple, Tier};

/// A finite, deterministic source of spread triples.
pub trait SpreadGrid: Iterator<Item = SpreadTriple> + Send {
    /// Triples still to come, if known.
    fn total(&self) -> Option<u64>;
    /// Short human-readable description for logs and provenance.
    fn describe(&self) -> String;
}

/// Cycles through `values³` in lexicographic index order.
#[derive(Clone, Debug)]
struct Odometer {
    len: usize,
    idx: [usize; 3],
    done: bool,
}

impl Odometer {
    fn new(len: usize) -> Self {
        Self {
            len,
            idx: [0; 3],
            done: len == 0,
        }
    }

    fn next(&mut self) -> Option<[usize; 3]> {
        if self.done {
            return None;
        }
        let out = self.idx;
        for k in (0..3).rev() {
            self.idx[k] += 1;
            if self.idx[k] < self.len {
                return Some(out);
            }
            self.idx[k] = 0;
        }
        self.done = true;
        Some(out)
    }

    fn remaining(&self) -> u64 {
        if self.done {
            return 0;
        }
        let l = self.len as u64;
        let pos = (self.idx[0] as u64 * l + self.idx[1] as u64) * l + self.idx[2] as u64;
        l * l * l - pos
    }
}

fn triple(values: &[Rational], idx: [usize; 3]) -> SpreadTriple {
    SpreadTriple::clamped([
        values[idx[0]].clone(),
        values[idx[1]].clone(),
        values[idx[2]].clone(),
    ])
}

/// Dense sweep `start, start + step, …, ≤ stop` on every component.
#[derive(Clone, Debug)]
pub struct DecimalGrid {
    values: Vec<Rational>,
    odometer: Odometer,
    label: String,
}

impl DecimalGrid {
    /// Values in `[start, stop]` clamped to `[0, 1]`. A non-positive step yields only `start`.
    pub fn new(start: Rational, stop: Rational, step: Rational) -> Self {
        let zero = Rational::zero();
        let one = Rational::one();
        let label = format!("decimal[{start}..{stop} step {step}]");
        let mut values = Vec::new();
        let mut v = start.clone().max(zero.clone());
        let stop = stop.min(one);
        while v <= stop {
            values.push(v.clone());
            if step <= zero {
                break;
            }
            v += &step;
        }
        Self {
            odometer: Odometer::new(values.len()),
            values,
            label,
        }
    }

    /// `0, 10^-p, …, 1` on every component.
    pub fn with_precision(precision: u32) -> Self {
        let step = Rational::new(BigInt::one(), num_traits::pow(BigInt::from(10), precision as usize));
        let mut g = Self::new(Rational::zero(), Rational::one(), step);
        g.label = format!("decimal:{precision}");
        g
    }

    pub fn values(&self) -> &[Rational] {
        &self.values
    }
}

impl Iterator for DecimalGrid {
    type Item = SpreadTriple;
    fn next(&mut self) -> Option<SpreadTriple> {
        let idx = self.odometer.next()?;
        Some(triple(&self.values, idx))
    }
}

impl SpreadGrid for DecimalGrid {
    fn total(&self) -> Option<u64> {
        Some(self.odometer.remaining())
    }
    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Rational sweep by tier: every triple of tier 1 first, then the triples that
/// first appear in tier 2, then tier 3. No triple is emitted twice.
#[derive(Clone, Debug)]
pub struct TieredGrid {
    max_tier: Tier,
    fine_max_denominator: u64,
    tier: Tier,
    values: Vec<Rational>,
    odometer: Odometer,
}

impl TieredGrid {
    /// Largest denominator used by the open-ended fine tier unless overridden.
    pub const DEFAULT_FINE_MAX_DENOMINATOR: u64 = 16;

    pub fn new(max_tier: Tier) -> Self {
        Self::with_fine_denominators(max_tier, Self::DEFAULT_FINE_MAX_DENOMINATOR)
    }

    pub fn with_fine_denominators(max_tier: Tier, fine_max_denominator: u64) -> Self {
        let values = Self::values_up_to(Tier::Simple, fine_max_denominator);
        Self {
            max_tier,
            fine_max_denominator,
            tier: Tier::Simple,
            odometer: Odometer::new(values.len()),
            values,
        }
    }

    /// Reduced fractions `p/q ∈ [0, 1]` whose tier is at most `tier`.
    pub fn values_up_to(tier: Tier, fine_max_denominator: u64) -> Vec<Rational> {
        let mut dens: BTreeSet<u64> = BTreeSet::new();
        for t in Tier::ALL.iter().filter(|t| **t <= tier) {
            dens.extend(t.denominators().iter().copied());
        }
        if tier == Tier::Fine {
            dens.extend(1..=fine_max_denominator);
        }
        let mut out = BTreeSet::new();
        for q in dens {
            for p in 0..=q {
                out.insert(Rational::new(BigInt::from(p), BigInt::from(q)));
            }
        }
        out.into_iter().collect()
    }
}

impl Iterator for TieredGrid {
    type Item = SpreadTriple;
    fn next(&mut self) -> Option<SpreadTriple> {
        loop {
            if let Some(idx) = self.odometer.next() {
                let t = triple(&self.values, idx);
                if t.tier() == self.tier {
                    return Some(t);
                }
                continue;
            }
            let next = Tier::from_rank(self.tier.rank() + 1)?;
            if next > self.max_tier {
                return None;
            }
            self.tier = next;
            self.values = Self::values_up_to(next, self.fine_max_denominator);
            self.odometer = Odometer::new(self.values.len());
        }
    }
}

impl SpreadGrid for TieredGrid {
    /// Unknown ahead of time: each tier is filtered while iterating.
    fn total(&self) -> Option<u64> {
        None
    }
    fn describe(&self) -> String {
        format!("tiered:{}", self.max_tier.rank())
    }
}

/// Replay token: `(seed, index)` fully determines one random triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Random rational triples `p/q` with `1 ≤ q ≤ max_denominator`, reproducible per index.
#[derive(Clone, Debug)]
pub struct RandomGrid {
    samples: u64,
    max_denominator: u64,
    seed: u64,
    next_index: u64,
}

impl RandomGrid {
    pub fn new(samples: u64, max_denominator: u64, seed: u64) -> Self {
        Self {
            samples,
            max_denominator: max_denominator.max(1),
            seed,
            next_index: 0,
        }
    }

    /// The triple drawn at `index`, independent of iteration state.
    pub fn regenerate(&self, index: u64) -> SpreadTriple {
        let mut rng = ReplayToken {
            seed: self.seed,
            index,
        }
        .to_std_rng();
        let mut draw = || {
            let q = rng.gen_range(1..=self.max_denominator);
            let p = rng.gen_range(0..=q);
            Rational::new(BigInt::from(p), BigInt::from(q))
        };
        // p ≤ q keeps every component in [0, 1]
        SpreadTriple::clamped([draw(), draw(), draw()])
    }
}

impl Iterator for RandomGrid {
    type Item = SpreadTriple;
    fn next(&mut self) -> Option<SpreadTriple> {
        if self.next_index >= self.samples {
            return None;
        }
        let t = self.regenerate(self.next_index);
        self.next_index += 1;
        Some(t)
    }
}

impl SpreadGrid for RandomGrid {
    fn total(&self) -> Option<u64> {
        Some(self.samples - self.next_index)
    }
    fn describe(&self) -> String {
        format!("random:{}:{}:{}", self.samples, self.max_denominator, self.seed)
    }
}

/// Caller-supplied triples, yielded in order.
#[derive(Clone, Debug)]
pub struct ExplicitGrid {
    triples: std::vec::IntoIter<SpreadTriple>,
}

impl ExplicitGrid {
    pub fn new(triples: Vec<SpreadTriple>) -> Self {
        Self {
            triples: triples.into_iter(),
        }
    }
}

impl Iterator for ExplicitGrid {
    type Item = SpreadTriple;
    fn next(&mut self) -> Option<SpreadTriple> {
        self.triples.next()
    }
}

impl SpreadGrid for ExplicitGrid {
    fn total(&self) -> Option<u64> {
        Some(self.triples.len() as u64)
    }
    fn describe(&self) -> String {
        format!("explicit:{}", self.triples.len())
    }
}
