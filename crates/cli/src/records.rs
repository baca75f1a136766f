use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use spreadhull::render::RenderData;
use spreadhull::search::{Leaderboard, SearchHit, SearchOutcome};

/// One archived hit, flattened for downstream readers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    pub polytope: String,
    /// Exact label, e.g. `1/2,0,1/3`.
    pub spreads: String,
    pub spreads_f64: [f64; 3],
    pub tier: u8,
    pub plane: String,
    pub mode: String,
    pub count: usize,
    /// Hull vertices in the projection plane, counter-clockwise.
    pub hull: Vec<[f64; 2]>,
    pub angles: Vec<f64>,
    pub edge_lengths: Vec<f64>,
    pub angle_variance: f64,
    pub edge_relative_variance: f64,
    pub score: f64,
    pub degenerate: bool,
    pub symmetry_artifact: bool,
    pub equiangular: bool,
    pub equilateral: bool,
    pub exact: bool,
    pub fallback: Option<String>,
}

impl From<&SearchHit> for HitRecord {
    fn from(h: &SearchHit) -> Self {
        let r = &h.result;
        let c = &r.classification;
        Self {
            polytope: h.polytope.name().to_string(),
            spreads: h.spreads.to_string(),
            spreads_f64: h.spreads.to_f64(),
            tier: h.tier().rank(),
            plane: r.plane.to_string(),
            mode: r.mode.to_string(),
            count: r.count(),
            hull: r.hull_points().iter().map(|p| [p.x, p.y]).collect(),
            angles: c.angles.clone(),
            edge_lengths: c.edge_lengths.clone(),
            angle_variance: c.angle_variance,
            edge_relative_variance: c.edge_relative_variance,
            score: c.score,
            degenerate: c.degenerate,
            symmetry_artifact: c.symmetry_artifact,
            equiangular: c.equiangular,
            equilateral: c.equilateral,
            exact: r.exact,
            fallback: r.fallback.as_ref().map(|e| e.to_string()),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RankedRecord {
    pub rank: usize,
    #[serde(flatten)]
    pub hit: HitRecord,
}

/// Ranked records keyed by hull count.
pub fn leaderboard_records(board: &Leaderboard) -> BTreeMap<usize, Vec<RankedRecord>> {
    board
        .iter()
        .map(|(count, hits)| {
            let ranked = hits
                .iter()
                .enumerate()
                .map(|(i, h)| RankedRecord {
                    rank: i + 1,
                    hit: HitRecord::from(h),
                })
                .collect();
            (count, ranked)
        })
        .collect()
}

/// Run summary printed at the end of a search.
pub fn summary_json(outcome: &SearchOutcome, board: &Leaderboard) -> serde_json::Value {
    let s = &outcome.stats;
    let w = &outcome.warnings;
    let best: BTreeMap<usize, HitRecord> = board
        .counts()
        .filter_map(|c| board.best(c).map(|h| (c, HitRecord::from(h))))
        .collect();
    serde_json::json!({
        "cancelled": outcome.cancelled,
        "stats": {
            "grid_points": s.grid_points,
            "evaluations": s.evaluations,
            "pruned": s.pruned,
            "matches": s.matches,
            "degenerate_matches": s.degenerate_matches,
            "elapsed_s": s.elapsed.as_secs_f64(),
        },
        "warnings": {
            "circumradius_inconsistencies": w.circumradius_inconsistencies,
            "field_fallbacks": w.field_fallbacks,
            "degenerate_projections": w.degenerate_projections,
            "degenerate_vectors": w.degenerate_vectors,
            "skipped_evaluations": w.skipped_evaluations,
        },
        "best": best,
    })
}

pub fn render_json(r: &RenderData) -> serde_json::Value {
    serde_json::json!({
        "plane": r.plane.to_string(),
        "circumradius": r.circumradius,
        "rotated": r.rotated.iter().map(|p| [p.x, p.y, p.z]).collect::<Vec<_>>(),
        "hull": r.hull.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
        "ideal": r.ideal.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
    })
}

/// JSON-lines archive, appended and flushed once per completed batch.
pub struct ArchiveWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl ArchiveWriter {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating archive dir {}", parent.display()))?;
            }
        }
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn append(&mut self, hits: &[SearchHit]) -> Result<()> {
        for h in hits {
            serde_json::to_writer(&mut self.out, &HitRecord::from(h))?;
            self.out.write_all(b"\n")?;
        }
        self.out
            .flush()
            .with_context(|| format!("flushing {}", self.path.display()))?;
        self.written += hits.len();
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
