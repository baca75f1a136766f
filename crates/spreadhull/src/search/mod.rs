//! Parallel sweep over polytopes × spread grid.
//!
//! Purpose
//! - Evaluate every (polytope, spread triple) pair, keep the hits whose hull count
//!   is a target, and hand them out batch by batch for persistence.
//! - Skip centrally symmetric polytopes when every target is odd (their hull
//!   counts are always even).
//!
//! Model
//! - The grid is pulled in chunks of `chunk_size` triples. Each chunk is evaluated
//!   with rayon; every worker folds into its own `Batch`, merged when the chunk
//!   completes. No state is shared during evaluation.
//! - Cancellation is checked before each grid point. Hits computed before the
//!   flag was seen are still merged and flushed.
//! - Hits are appended and never edited; the leaderboard is rebuilt from them.
//!
//! References
//! - Code cross-refs: `SpreadGrid`, `Leaderboard`, `evaluate`

mod cancel;
pub mod grid;
pub mod leaderboard;

pub use cancel::CancelToken;
pub use grid::{DecimalGrid, ExplicitGrid, RandomGrid, ReplayToken, SpreadGrid, TieredGrid};
pub use leaderboard::{compare_within_cluster, Leaderboard, SCORE_CLOSENESS};

use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::algebra::{is_prime, SpreadTriple, Tier};
use crate::error::{HullError, KernelError, Warning, WarningSummary};
use crate::evaluate::{evaluate, ProjectionResult};
use crate::projection::{NumericMode, PlaneNormal};
use crate::registry::{Polytope, Registry};

/// Prime hull counts searched when none are given.
pub const DEFAULT_TARGETS: [usize; 7] = [5, 7, 11, 13, 17, 19, 23];

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub targets: BTreeSet<usize>,
    pub plane: PlaneNormal,
    pub mode: NumericMode,
    /// Grid points per parallel batch.
    pub chunk_size: usize,
    /// Log progress every this many evaluations (0 disables).
    pub progress_every: u64,
    pub prune_symmetric: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGETS.into_iter().collect(),
            plane: PlaneNormal::Z,
            mode: NumericMode::Exact,
            chunk_size: 1024,
            progress_every: 100_000,
            prune_symmetric: true,
        }
    }
}

impl SearchConfig {
    pub fn with_targets<I: IntoIterator<Item = usize>>(mut self, targets: I) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    /// All targets odd: centrally symmetric polytopes cannot contribute.
    pub fn all_targets_odd(&self) -> bool {
        !self.targets.is_empty() && self.targets.iter().all(|t| t % 2 == 1)
    }

    pub fn all_targets_prime(&self) -> bool {
        self.targets.iter().all(|&t| is_prime(t as u64))
    }
}

/// One evaluated combination whose hull count hit a target.
#[derive(Clone, Debug)]
pub struct SearchHit {
    pub polytope: Arc<Polytope>,
    pub spreads: SpreadTriple,
    pub result: ProjectionResult,
    /// Hull count is one of the requested targets. The driver archives matching
    /// hits only, so this is `true` for everything it returns; `verify` in the CLI
    /// is the one caller that builds a hit with `false`.
    pub matches_target: bool,
}

impl SearchHit {
    #[inline]
    pub fn count(&self) -> usize {
        self.result.count()
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.result.score()
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.spreads.tier()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub grid_points: u64,
    pub evaluations: u64,
    /// Polytope × grid-point pairs skipped by symmetry pruning.
    pub pruned: u64,
    pub matches: u64,
    /// Matching hits excluded from leaderboards (degenerate corner or symmetry artifact).
    pub degenerate_matches: u64,
    pub elapsed: Duration,
}

#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Archive of matching hits, sorted by polytope name then spread triple.
    pub hits: Vec<SearchHit>,
    pub stats: SearchStats,
    pub warnings: WarningSummary,
    pub cancelled: bool,
}

impl SearchOutcome {
    pub fn leaderboard(&self) -> Leaderboard {
        Leaderboard::build(&self.hits)
    }
}

/// Per-worker accumulator.
#[derive(Default)]
struct Batch {
    hits: Vec<SearchHit>,
    warnings: WarningSummary,
    evaluations: u64,
    grid_points: u64,
}

impl Batch {
    fn merge(mut self, other: Batch) -> Batch {
        self.hits.extend(other.hits);
        self.warnings.merge(&other.warnings);
        self.evaluations += other.evaluations;
        self.grid_points += other.grid_points;
        self
    }

    fn note(&mut self, w: Warning) {
        debug!("{w}");
        self.warnings.record(&w);
    }
}

/// Search driver bound to a registry and a configuration.
pub struct SearchDriver<'a> {
    registry: &'a Registry,
    config: SearchConfig,
    cancel: CancelToken,
}

impl<'a> SearchDriver<'a> {
    pub fn new(registry: &'a Registry, config: SearchConfig) -> Self {
        Self {
            registry,
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Sweep without a batch sink.
    pub fn run<G>(&self, polytopes: &[Arc<Polytope>], grid: G) -> SearchOutcome
    where
        G: Iterator<Item = SpreadTriple>,
    {
        self.run_with(polytopes, grid, |_| {})
    }

    /// Sweep, calling `on_batch` with the new hits after every completed batch.
    pub fn run_with<G, F>(&self, polytopes: &[Arc<Polytope>], mut grid: G, mut on_batch: F) -> SearchOutcome
    where
        G: Iterator<Item = SpreadTriple>,
        F: FnMut(&[SearchHit]),
    {
        let started = Instant::now();
        let cfg = &self.config;
        let active: Vec<Arc<Polytope>> = if cfg.prune_symmetric && cfg.all_targets_odd() {
            polytopes
                .iter()
                .filter(|p| {
                    let keep = !p.is_centrally_symmetric();
                    if !keep {
                        debug!(polytope = p.name(), "pruned: centrally symmetric, all targets odd");
                    }
                    keep
                })
                .cloned()
                .collect()
        } else {
            polytopes.to_vec()
        };
        let pruned_per_point = (polytopes.len() - active.len()) as u64;

        let mut warnings = WarningSummary::default();
        for w in self.registry.warnings() {
            warnings.record(w);
        }
        let mut stats = SearchStats::default();
        let mut hits: Vec<SearchHit> = Vec::new();
        let mut seen: HashSet<(String, SpreadTriple)> = HashSet::new();
        let mut cancelled = false;
        let mut next_report = cfg.progress_every;
        let chunk_size = cfg.chunk_size.max(1);

        info!(
            polytopes = active.len(),
            pruned = polytopes.len() - active.len(),
            targets = ?cfg.targets,
            mode = %cfg.mode,
            plane = %cfg.plane,
            "search started"
        );
        loop {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let chunk: Vec<SpreadTriple> = grid.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            let batch = chunk
                .par_iter()
                .fold(Batch::default, |mut acc, triple| {
                    if self.cancel.is_cancelled() {
                        return acc;
                    }
                    acc.grid_points += 1;
                    for poly in &active {
                        self.evaluate_one(poly, triple, &mut acc);
                    }
                    acc
                })
                .reduce(Batch::default, Batch::merge);

            let mut fresh: Vec<SearchHit> = batch
                .hits
                .into_iter()
                .filter(|h| seen.insert((h.polytope.name().to_string(), h.spreads.clone())))
                .collect();
            fresh.sort_by(|a, b| {
                a.polytope
                    .name()
                    .cmp(b.polytope.name())
                    .then_with(|| a.spreads.cmp(&b.spreads))
            });
            stats.grid_points += batch.grid_points;
            stats.evaluations += batch.evaluations;
            stats.pruned += batch.grid_points * pruned_per_point;
            stats.matches += fresh.len() as u64;
            stats.degenerate_matches += fresh.iter().filter(|h| h.result.is_degenerate()).count() as u64;
            warnings.merge(&batch.warnings);
            if !fresh.is_empty() {
                on_batch(&fresh);
            }
            hits.extend(fresh);

            if cfg.progress_every > 0 && stats.evaluations >= next_report {
                info!(
                    grid_points = stats.grid_points,
                    evaluations = stats.evaluations,
                    matches = stats.matches,
                    warnings = warnings.total(),
                    elapsed_s = started.elapsed().as_secs_f64(),
                    "progress"
                );
                while next_report <= stats.evaluations {
                    next_report += cfg.progress_every;
                }
            }
        }

        hits.sort_by(|a, b| {
            a.polytope
                .name()
                .cmp(b.polytope.name())
                .then_with(|| a.spreads.cmp(&b.spreads))
        });
        stats.elapsed = started.elapsed();
        if warnings.field_fallbacks > 0 {
            warn!(
                count = warnings.field_fallbacks,
                "exact arithmetic fell back to promoted floating values"
            );
        }
        if warnings.skipped_evaluations > 0 {
            warn!(
                count = warnings.skipped_evaluations,
                "evaluations skipped on kernel errors"
            );
        }
        if warnings.circumradius_inconsistencies > 0 {
            warn!(
                count = warnings.circumradius_inconsistencies,
                "circumradius inconsistencies recorded while building polytopes"
            );
        }
        info!(
            grid_points = stats.grid_points,
            evaluations = stats.evaluations,
            matches = stats.matches,
            degenerate_matches = stats.degenerate_matches,
            warnings = warnings.total(),
            cancelled,
            elapsed_s = stats.elapsed.as_secs_f64(),
            "search finished"
        );
        SearchOutcome {
            hits,
            stats,
            warnings,
            cancelled,
        }
    }

    fn evaluate_one(&self, poly: &Arc<Polytope>, triple: &SpreadTriple, acc: &mut Batch) {
        let cfg = &self.config;
        acc.evaluations += 1;
        let result = match evaluate(poly, triple, cfg.plane, cfg.mode, self.registry.radicals()) {
            Ok(r) => r,
            Err(HullError::DegenerateProjection { distinct, .. }) => {
                acc.note(Warning::DegenerateProjection {
                    polytope: poly.name().to_string(),
                    spreads: triple.to_string(),
                    distinct,
                });
                return;
            }
            Err(HullError::Kernel(KernelError::DegenerateVector)) => {
                acc.note(Warning::DegenerateVector {
                    polytope: poly.name().to_string(),
                    spreads: triple.to_string(),
                });
                return;
            }
            Err(HullError::Kernel(e)) => {
                let w = Warning::EvaluationSkipped {
                    polytope: poly.name().to_string(),
                    spreads: triple.to_string(),
                    detail: e.to_string(),
                };
                warn!("{w}");
                acc.warnings.record(&w);
                return;
            }
        };
        if let Some(e) = &result.fallback {
            acc.note(Warning::FieldMismatchFallback {
                context: format!("{} at ({triple})", poly.name()),
                detail: e.to_string(),
            });
        }
        if cfg.targets.contains(&result.count()) {
            acc.hits.push(SearchHit {
                polytope: Arc::clone(poly),
                spreads: triple.clone(),
                result,
                matches_target: true,
            });
        }
    }
}

/// Sweep with default settings for `targets`.
pub fn search<G>(
    registry: &Registry,
    polytopes: &[Arc<Polytope>],
    grid: G,
    targets: &BTreeSet<usize>,
) -> SearchOutcome
where
    G: Iterator<Item = SpreadTriple>,
{
    let config = SearchConfig::default().with_targets(targets.iter().copied());
    SearchDriver::new(registry, config).run(polytopes, grid)
}

#[cfg(test)]
mod tests;
