use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

use spreadhull::prelude::*;

mod config;
mod provenance;
mod records;
mod tables;

use config::{RotatedPair, RunConfig};
use provenance::Payload;
use records::{ArchiveWriter, HitRecord};

#[derive(Parser)]
#[command(name = "spreadhull-cli", version)]
#[command(about = "Search spread-triple rotations whose polytope shadows have prime vertex counts")]
struct Cmd {
    /// Tracing filter, e.g. `info` or `spreadhull=debug`
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Sweep polytopes over a spread grid; write the hit archive and leaderboards
    Search(SearchArgs),
    /// Re-evaluate one polytope at one spread triple
    Verify {
        #[command(flatten)]
        target: TargetArgs,
        /// Fail unless the hull has this many vertices
        #[arg(long)]
        expect: Option<usize>,
    },
    /// List registered polytopes
    List {
        #[arg(long)]
        vertex_table: Vec<PathBuf>,
    },
    /// Print the drawing geometry for one polytope at one spread triple
    Render {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Debug, Default)]
struct SearchArgs {
    /// JSON run config; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_delimiter = ',')]
    polytopes: Vec<String>,
    /// CSV with x,y,z columns, registered under its file stem
    #[arg(long)]
    vertex_table: Vec<PathBuf>,
    /// Variable stella compound `t1,t2` (repeatable)
    #[arg(long)]
    stella: Vec<String>,
    /// Relative-rotation compound `a,b,s`: `b` turned about z by spread `s` (repeatable)
    #[arg(long)]
    rotated_pair: Vec<String>,
    /// decimal:<p> | tiered:<tier>[:<max_den>] | random:<n>:<max_den>:<seed> | explicit:<s1,s2,s3;...>
    #[arg(long)]
    grid: Option<String>,
    #[arg(long, value_delimiter = ',')]
    targets: Vec<usize>,
    /// exact | promote | fast
    #[arg(long)]
    mode: Option<String>,
    /// Shorthand for `--mode exact`
    #[arg(long, conflicts_with_all = ["mode", "no_exact"])]
    exact: bool,
    /// Shorthand for `--mode promote`
    #[arg(long, conflicts_with = "mode")]
    no_exact: bool,
    /// Projection plane normal: x | y | z
    #[arg(long)]
    plane: Option<String>,
    #[arg(long)]
    chunk_size: Option<usize>,
    #[arg(long)]
    progress_every: Option<u64>,
    /// Evaluate centrally symmetric polytopes even when every target is odd
    #[arg(long)]
    no_prune: bool,
    /// Cancel the sweep after this many seconds; finished batches are kept
    #[arg(long)]
    deadline_secs: Option<u64>,
    /// Output directory
    #[arg(long)]
    out: Option<PathBuf>,
    /// Leaderboard entries per count
    #[arg(long)]
    top: Option<usize>,
}

impl SearchArgs {
    fn to_run_config(&self) -> RunConfig {
        let mode = if self.exact {
            Some("exact".to_string())
        } else if self.no_exact {
            Some("promote".to_string())
        } else {
            self.mode.clone()
        };
        RunConfig {
            polytopes: self.polytopes.clone(),
            vertex_tables: self.vertex_table.clone(),
            stellas: self.stella.clone(),
            rotated_pairs: self.rotated_pair.clone(),
            grid: self.grid.clone(),
            targets: self.targets.clone(),
            mode,
            plane: self.plane.clone(),
            chunk_size: self.chunk_size,
            progress_every: self.progress_every,
            prune_symmetric: self.no_prune.then_some(false),
            deadline_secs: self.deadline_secs,
            out: self.out.clone(),
            top: self.top,
        }
    }
}

#[derive(Args, Debug)]
struct TargetArgs {
    #[arg(long)]
    polytope: String,
    /// Spread triple, e.g. `1/2,1/2,1/2`
    #[arg(long)]
    spreads: String,
    #[arg(long, default_value = "z")]
    plane: String,
    #[arg(long, default_value = "exact")]
    mode: String,
    #[arg(long)]
    vertex_table: Vec<PathBuf>,
    /// Variable stella compound `t1,t2`
    #[arg(long)]
    stella: Vec<String>,
    /// Relative-rotation compound `a,b,s`
    #[arg(long)]
    rotated_pair: Vec<String>,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_new(&cmd.log_level).context("parsing --log-level")?)
        .init();
    match cmd.action {
        Action::Search(args) => run_search(args),
        Action::Verify { target, expect } => verify(target, expect),
        Action::List { vertex_table } => list(vertex_table),
        Action::Render { target } => render(target),
        Action::Report => report(),
    }
}

/// Catalogue plus authored tables, variable stellas and relative-rotation compounds.
fn build_registry(
    vertex_tables: &[PathBuf],
    stellas: &[(Rational, Rational)],
    rotated: &[RotatedPair],
) -> Result<Registry> {
    let mut reg = Registry::with_catalog()?;
    for path in vertex_tables {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("vertex table {} has no file name", path.display()))?;
        let rows = tables::read_vertex_table(path)?;
        let p = reg.register_f64(&name, &rows, SymmetryTags::NONE)?;
        tracing::info!(polytope = p.name(), vertices = p.vertex_count(), "loaded vertex table");
    }
    for (t1, t2) in stellas {
        catalog::variable_stella(&mut reg, t1, t2)?;
    }
    for pair in rotated {
        for p in catalog::rotated_pairs(&mut reg, &pair.a, &pair.b, [pair.spread.clone()])? {
            tracing::info!(polytope = p.name(), vertices = p.vertex_count(), "registered rotated pair");
        }
    }
    for w in reg.warnings() {
        tracing::warn!("{w}");
    }
    Ok(reg)
}

fn select(reg: &Registry, names: &[String]) -> Result<Vec<Arc<Polytope>>> {
    if names.is_empty() {
        return Ok(reg.iter().cloned().collect());
    }
    names.iter().map(|n| Ok(reg.get(n)?)).collect()
}

fn run_search(args: SearchArgs) -> Result<()> {
    let cfg = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    }
    .overridden_by(args.to_run_config());
    let search_cfg = cfg.search_config()?;
    let grid_spec = cfg.grid_spec()?;
    let reg = build_registry(&cfg.vertex_tables, &cfg.stella_params()?, &cfg.rotated_pair_params()?)?;
    let polytopes = select(&reg, &cfg.polytopes)?;
    let out_dir = cfg.out_dir();
    let grid = grid_spec.build();
    let params = serde_json::json!({
        "config": &cfg,
        "grid": grid.describe(),
        "targets": &search_cfg.targets,
        "mode": search_cfg.mode.to_string(),
        "plane": search_cfg.plane.to_string(),
        "polytopes": polytopes.iter().map(|p| p.name()).collect::<Vec<_>>(),
    });
    let payload = Payload::new(params).with_inputs(
        cfg.vertex_tables
            .iter()
            .map(|p| p.to_string_lossy().into_owned()),
    );
    tracing::info!(
        grid = %grid.describe(),
        polytopes = polytopes.len(),
        out = %out_dir.display(),
        "search"
    );

    let cancel = CancelToken::new();
    if let Some(secs) = cfg.deadline_secs {
        let c = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            tracing::warn!(secs, "deadline reached; cancelling after the current batch");
            c.cancel();
        });
    }

    let archive_path = out_dir.join("hits.jsonl");
    let mut archive = ArchiveWriter::create(&archive_path)?;
    let mut write_error: Option<anyhow::Error> = None;
    let driver = SearchDriver::new(&reg, search_cfg).with_cancel(cancel.clone());
    let outcome = driver.run_with(&polytopes, grid, |batch| {
        if write_error.is_some() {
            return;
        }
        if let Err(e) = archive.append(batch) {
            write_error = Some(e);
            cancel.cancel();
        }
    });
    if let Some(e) = write_error {
        return Err(e.context("archive write failed; sweep stopped"));
    }
    provenance::write_sidecar(archive.path(), &payload)?;

    let mut board = outcome.leaderboard();
    board.truncate(cfg.top.unwrap_or(10));
    write_leaderboards(&board, &out_dir, &payload)?;

    let summary = records::summary_json(&outcome, &board);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    tracing::info!(
        archived = archive.written(),
        cancelled = outcome.cancelled,
        "search outputs written"
    );
    Ok(())
}

fn write_leaderboards(board: &Leaderboard, out_dir: &Path, payload: &Payload) -> Result<()> {
    let json_path = out_dir.join("leaderboard.json");
    std::fs::write(
        &json_path,
        serde_json::to_vec_pretty(&records::leaderboard_records(board))?,
    )
    .with_context(|| format!("writing {}", json_path.display()))?;
    provenance::write_sidecar(&json_path, payload)?;

    let mut df = tables::leaderboard_frame(board)?;
    let csv_path = out_dir.join("leaderboard.csv");
    tables::write_csv(&mut df, &csv_path)?;
    provenance::write_sidecar(&csv_path, payload)?;
    let parquet_path = out_dir.join("leaderboard.parquet");
    tables::write_parquet(&mut df, &parquet_path)?;
    provenance::write_sidecar(&parquet_path, payload)?;
    tracing::info!(rows = df.height(), "leaderboard tables written");
    Ok(())
}

fn evaluate_target(target: &TargetArgs) -> Result<(Registry, SearchHit)> {
    let extras = RunConfig {
        stellas: target.stella.clone(),
        rotated_pairs: target.rotated_pair.clone(),
        ..RunConfig::default()
    };
    let reg = build_registry(
        &target.vertex_table,
        &extras.stella_params()?,
        &extras.rotated_pair_params()?,
    )?;
    let polytope = reg.get(&target.polytope)?;
    let spreads: SpreadTriple = target
        .spreads
        .parse()
        .with_context(|| format!("spread triple `{}`", target.spreads))?;
    let plane: PlaneNormal = target.plane.parse()?;
    let mode: NumericMode = target.mode.parse()?;
    let result = evaluate(&polytope, &spreads, plane, mode, reg.radicals())?;
    if let Some(e) = &result.fallback {
        tracing::warn!(error = %e, "exact arithmetic fell back to promoted floating values");
    }
    let hit = SearchHit {
        polytope,
        spreads,
        result,
        matches_target: true,
    };
    Ok((reg, hit))
}

fn verify(target: TargetArgs, expect: Option<usize>) -> Result<()> {
    let (_reg, mut hit) = evaluate_target(&target)?;
    hit.matches_target = expect.map_or(true, |n| n == hit.count());
    println!("{}", serde_json::to_string_pretty(&HitRecord::from(&hit))?);
    if let Some(n) = expect {
        if n != hit.count() {
            bail!(
                "{} at ({}): expected {n} hull vertices, found {}",
                target.polytope,
                hit.spreads,
                hit.count()
            );
        }
        tracing::info!(count = n, "verified");
    }
    Ok(())
}

fn list(vertex_table: Vec<PathBuf>) -> Result<()> {
    let reg = build_registry(&vertex_table, &[], &[])?;
    let rows: Vec<serde_json::Value> = reg
        .iter()
        .map(|p| {
            serde_json::json!({
                "name": p.name(),
                "vertices": p.vertex_count(),
                "central": p.is_centrally_symmetric(),
                "circumradius_quadrance": p.circumradius_quadrance().to_string(),
                "approximate": p.is_approximate(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn render(target: TargetArgs) -> Result<()> {
    let (_reg, hit) = evaluate_target(&target)?;
    let data = render_data(&hit);
    println!("{}", serde_json::to_string_pretty(&records::render_json(&data))?);
    Ok(())
}

fn report() -> Result<()> {
    let obj = provenance::document(&serde_json::json!({}), &[], &[]);
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
