//! Deterministic ranking of non-degenerate hits per target count.
//!
//! Hits are first grouped by closeness of score: sorted by score (higher first),
//! a new cluster starts wherever the gap to the previous score is at least
//! `SCORE_CLOSENESS`. Clusters rank in score order. Inside a cluster hits count as
//! equally regular and are ordered by tier (simpler first), then polytope vertex
//! count (fewer first), then exact score (higher first), then polytope name, then
//! spread triple.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use super::SearchHit;

/// Score gap below which two neighbouring hits count as equally regular.
pub const SCORE_CLOSENESS: f64 = 0.01;

/// Order between two hits of the same closeness cluster; `Less` ranks first.
pub fn compare_within_cluster(a: &SearchHit, b: &SearchHit) -> Ordering {
    a.tier()
        .cmp(&b.tier())
        .then_with(|| a.polytope.vertex_count().cmp(&b.polytope.vertex_count()))
        .then_with(|| b.score().total_cmp(&a.score()))
        .then_with(|| a.polytope.name().cmp(b.polytope.name()))
        .then_with(|| a.spreads.cmp(&b.spreads))
}

/// Cluster index per hit of a board already sorted by descending score.
fn closeness_clusters(sorted: &[SearchHit]) -> Vec<usize> {
    let mut ids = Vec::with_capacity(sorted.len());
    let mut id = 0;
    let mut prev: Option<f64> = None;
    for h in sorted {
        let s = h.score();
        if let Some(p) = prev {
            if p - s >= SCORE_CLOSENESS {
                id += 1;
            }
        }
        ids.push(id);
        prev = Some(s);
    }
    ids
}

fn rank(board: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut board = board;
    board.sort_by(|a, b| b.score().total_cmp(&a.score()).then_with(|| compare_within_cluster(a, b)));
    let ids = closeness_clusters(&board);
    let mut keyed: Vec<(usize, SearchHit)> = ids.into_iter().zip(board).collect();
    keyed.sort_by(|(ca, a), (cb, b)| ca.cmp(cb).then_with(|| compare_within_cluster(a, b)));
    keyed.into_iter().map(|(_, h)| h).collect()
}

/// Ranked hits per hull vertex count.
#[derive(Clone, Debug, Default)]
pub struct Leaderboard {
    boards: BTreeMap<usize, Vec<SearchHit>>,
}

impl Leaderboard {
    /// Rebuild from an archive of hits. Degenerate and non-matching hits are left
    /// out, and a repeated `(polytope, spreads)` pair is kept once.
    pub fn build<'a, I>(hits: I) -> Self
    where
        I: IntoIterator<Item = &'a SearchHit>,
    {
        let mut boards: BTreeMap<usize, Vec<SearchHit>> = BTreeMap::new();
        let mut seen = HashSet::new();
        for h in hits {
            if !h.matches_target || h.result.is_degenerate() {
                continue;
            }
            if !seen.insert((h.polytope.name().to_string(), h.spreads.clone())) {
                continue;
            }
            boards.entry(h.count()).or_default().push(h.clone());
        }
        let boards = boards.into_iter().map(|(n, board)| (n, rank(board))).collect();
        Self { boards }
    }

    /// Ranked hits for `count`; empty when nothing was found.
    pub fn for_count(&self, count: usize) -> &[SearchHit] {
        self.boards.get(&count).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn best(&self, count: usize) -> Option<&SearchHit> {
        self.for_count(count).first()
    }

    pub fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.boards.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[SearchHit])> {
        self.boards.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Keep the first `k` entries per count.
    pub fn truncate(&mut self, k: usize) {
        for board in self.boards.values_mut() {
            board.truncate(k);
        }
    }

    pub fn len(&self) -> usize {
        self.boards.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
