//! Tabular IO through polars: leaderboard export and authored vertex tables.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use spreadhull::search::Leaderboard;

/// One row per ranked hit.
pub fn leaderboard_frame(board: &Leaderboard) -> PolarsResult<DataFrame> {
    let mut count = Vec::new();
    let mut rank = Vec::new();
    let mut polytope = Vec::new();
    let mut spreads = Vec::new();
    let (mut s1, mut s2, mut s3) = (Vec::new(), Vec::new(), Vec::new());
    let mut tier = Vec::new();
    let mut score = Vec::new();
    let mut angle_variance = Vec::new();
    let mut edge_relative_variance = Vec::new();
    let mut min_angle = Vec::new();
    let mut exact = Vec::new();
    for (n, hits) in board.iter() {
        for (i, h) in hits.iter().enumerate() {
            let c = &h.result.classification;
            let f = h.spreads.to_f64();
            count.push(n as u32);
            rank.push(i as u32 + 1);
            polytope.push(h.polytope.name().to_string());
            spreads.push(h.spreads.to_string());
            s1.push(f[0]);
            s2.push(f[1]);
            s3.push(f[2]);
            tier.push(h.tier().rank() as u32);
            score.push(c.score);
            angle_variance.push(c.angle_variance);
            edge_relative_variance.push(c.edge_relative_variance);
            min_angle.push(c.min_angle());
            exact.push(h.result.exact);
        }
    }
    df!(
        "count" => count,
        "rank" => rank,
        "polytope" => polytope,
        "spreads" => spreads,
        "s1" => s1,
        "s2" => s2,
        "s3" => s3,
        "tier" => tier,
        "score" => score,
        "angle_variance" => angle_variance,
        "edge_relative_variance" => edge_relative_variance,
        "min_angle" => min_angle,
        "exact" => exact,
    )
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    ParquetWriter::new(file)
        .finish(df)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Read `x,y,z` rows from a CSV with a header line. Extra columns are ignored.
pub fn read_vertex_table(path: &Path) -> Result<Vec<[f64; 3]>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .select([
            col("x").cast(DataType::Float64),
            col("y").cast(DataType::Float64),
            col("z").cast(DataType::Float64),
        ])
        .collect()
        .with_context(|| format!("reading x,y,z from {}", path.display()))?;
    let x = df.column("x")?.f64()?;
    let y = df.column("y")?.f64()?;
    let z = df.column("z")?.f64()?;
    let mut out = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        match (x.get(i), y.get(i), z.get(i)) {
            (Some(a), Some(b), Some(c)) => out.push([a, b, c]),
            _ => bail!("{}: row {} has a missing coordinate", path.display(), i + 1),
        }
    }
    Ok(out)
}
