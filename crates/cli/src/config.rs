use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use spreadhull::algebra::{Rational, SpreadTriple, Tier};
use spreadhull::projection::{NumericMode, PlaneNormal};
use spreadhull::search::{
    DecimalGrid, ExplicitGrid, RandomGrid, SearchConfig, SpreadGrid, TieredGrid, DEFAULT_TARGETS,
};

/// Run parameters as read from `--config run.json`. Every field is optional;
/// command-line flags override what the file sets.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Registered names to sweep; empty means every registered polytope.
    pub polytopes: Vec<String>,
    /// CSV files with `x,y,z` columns, registered under their file stem.
    pub vertex_tables: Vec<PathBuf>,
    /// Variable stella compounds as `t1,t2`.
    pub stellas: Vec<String>,
    /// Relative-rotation compounds as `a,b,s`.
    pub rotated_pairs: Vec<String>,
    pub grid: Option<String>,
    pub targets: Vec<usize>,
    pub mode: Option<String>,
    pub plane: Option<String>,
    pub chunk_size: Option<usize>,
    pub progress_every: Option<u64>,
    pub prune_symmetric: Option<bool>,
    pub deadline_secs: Option<u64>,
    pub out: Option<PathBuf>,
    /// Leaderboard entries kept per target count.
    pub top: Option<usize>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Fields set in `other` replace ours; list fields replace when non-empty.
    pub fn overridden_by(mut self, other: RunConfig) -> Self {
        if !other.polytopes.is_empty() {
            self.polytopes = other.polytopes;
        }
        if !other.vertex_tables.is_empty() {
            self.vertex_tables = other.vertex_tables;
        }
        if !other.stellas.is_empty() {
            self.stellas = other.stellas;
        }
        if !other.rotated_pairs.is_empty() {
            self.rotated_pairs = other.rotated_pairs;
        }
        if !other.targets.is_empty() {
            self.targets = other.targets;
        }
        self.grid = other.grid.or(self.grid);
        self.mode = other.mode.or(self.mode);
        self.plane = other.plane.or(self.plane);
        self.chunk_size = other.chunk_size.or(self.chunk_size);
        self.progress_every = other.progress_every.or(self.progress_every);
        self.prune_symmetric = other.prune_symmetric.or(self.prune_symmetric);
        self.deadline_secs = other.deadline_secs.or(self.deadline_secs);
        self.out = other.out.or(self.out);
        self.top = other.top.or(self.top);
        self
    }

    pub fn grid_spec(&self) -> Result<GridSpec> {
        self.grid.as_deref().unwrap_or("tiered:2").parse()
    }

    pub fn search_config(&self) -> Result<SearchConfig> {
        let defaults = SearchConfig::default();
        let targets = if self.targets.is_empty() {
            DEFAULT_TARGETS.to_vec()
        } else {
            self.targets.clone()
        };
        if let Some(t) = targets.iter().find(|&&t| t < 3) {
            bail!("target count {t} is below 3");
        }
        Ok(SearchConfig {
            plane: match &self.plane {
                Some(p) => p.parse::<PlaneNormal>()?,
                None => defaults.plane,
            },
            mode: match &self.mode {
                Some(m) => m.parse::<NumericMode>()?,
                None => defaults.mode,
            },
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            progress_every: self.progress_every.unwrap_or(defaults.progress_every),
            prune_symmetric: self.prune_symmetric.unwrap_or(defaults.prune_symmetric),
            ..defaults.with_targets(targets)
        })
    }

    pub fn stella_params(&self) -> Result<Vec<(Rational, Rational)>> {
        self.stellas.iter().map(|s| parse_pair(s)).collect()
    }

    pub fn rotated_pair_params(&self) -> Result<Vec<RotatedPair>> {
        self.rotated_pairs.iter().map(|s| s.parse()).collect()
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out.clone().unwrap_or_else(|| PathBuf::from("data/search"))
    }
}

fn parse_pair(text: &str) -> Result<(Rational, Rational)> {
    let (a, b) = text
        .split_once(',')
        .ok_or_else(|| anyhow!("expected `t1,t2`, got `{text}`"))?;
    let t1: Rational = a.trim().parse().map_err(|_| anyhow!("bad truncation `{a}`"))?;
    let t2: Rational = b.trim().parse().map_err(|_| anyhow!("bad truncation `{b}`"))?;
    Ok((t1, t2))
}

/// `b` turned about the z axis by the relative spread `spread` against `a`.
#[derive(Clone, Debug, PartialEq)]
pub struct RotatedPair {
    pub a: String,
    pub b: String,
    pub spread: Rational,
}

impl FromStr for RotatedPair {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self> {
        match text.split(',').map(str::trim).collect::<Vec<_>>().as_slice() {
            &[a, b, s] if !a.is_empty() && !b.is_empty() => Ok(RotatedPair {
                a: a.to_string(),
                b: b.to_string(),
                spread: s.parse().map_err(|_| anyhow!("bad relative spread `{s}`"))?,
            }),
            _ => bail!("expected `a,b,s`, got `{text}`"),
        }
    }
}

/// Grid selection: `decimal:<precision>`, `tiered:<max_tier>[:<max_den>]`,
/// `random:<samples>:<max_den>:<seed>`, `explicit:<s1,s2,s3;...>`.
#[derive(Clone, Debug, PartialEq)]
pub enum GridSpec {
    Decimal(u32),
    Tiered { max_tier: Tier, fine_max_denominator: u64 },
    Random { samples: u64, max_denominator: u64, seed: u64 },
    Explicit(Vec<SpreadTriple>),
}

impl GridSpec {
    pub fn build(&self) -> Box<dyn SpreadGrid> {
        match self {
            GridSpec::Decimal(p) => Box::new(DecimalGrid::with_precision(*p)),
            GridSpec::Tiered {
                max_tier,
                fine_max_denominator,
            } => Box::new(TieredGrid::with_fine_denominators(*max_tier, *fine_max_denominator)),
            GridSpec::Random {
                samples,
                max_denominator,
                seed,
            } => Box::new(RandomGrid::new(*samples, *max_denominator, *seed)),
            GridSpec::Explicit(triples) => Box::new(ExplicitGrid::new(triples.clone())),
        }
    }
}

impl FromStr for GridSpec {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self> {
        let (kind, rest) = text.split_once(':').unwrap_or((text, ""));
        let nums = |n: usize| -> Result<Vec<u64>> {
            let parts: Vec<u64> = rest
                .split(':')
                .filter(|s| !s.is_empty())
                .map(|s| s.trim().parse::<u64>())
                .collect::<Result<_, _>>()
                .with_context(|| format!("grid `{text}`"))?;
            if parts.len() > n {
                bail!("grid `{text}`: at most {n} numbers");
            }
            Ok(parts)
        };
        match kind {
            "decimal" => {
                let p = nums(1)?.first().copied().unwrap_or(1);
                Ok(GridSpec::Decimal(u32::try_from(p)?))
            }
            "tiered" => {
                let p = nums(2)?;
                let rank = p.first().copied().unwrap_or(2);
                let max_tier = u8::try_from(rank)
                    .ok()
                    .and_then(Tier::from_rank)
                    .ok_or_else(|| anyhow!("grid `{text}`: tier must be 1, 2 or 3"))?;
                Ok(GridSpec::Tiered {
                    max_tier,
                    fine_max_denominator: p
                        .get(1)
                        .copied()
                        .unwrap_or(TieredGrid::DEFAULT_FINE_MAX_DENOMINATOR),
                })
            }
            "random" => match nums(3)?.as_slice() {
                &[samples, max_denominator, seed] => Ok(GridSpec::Random {
                    samples,
                    max_denominator,
                    seed,
                }),
                _ => bail!("grid `{text}`: expected random:<samples>:<max_den>:<seed>"),
            },
            "explicit" => {
                let triples = rest
                    .split(';')
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| s.parse::<SpreadTriple>().with_context(|| format!("spread triple `{s}`")))
                    .collect::<Result<Vec<_>>>()?;
                if triples.is_empty() {
                    bail!("grid `{text}`: no triples");
                }
                Ok(GridSpec::Explicit(triples))
            }
            other => bail!("unknown grid kind `{other}`"),
        }
    }
}
