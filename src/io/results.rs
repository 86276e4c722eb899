//! Results handoff: one JSON document per analysis run.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::pipelines::runner::AnalysisResults;

/// Write `<prefix>.json` into `out_dir`, creating the directory if needed.
pub fn write_results(results: &AnalysisResults, out_dir: &Path, prefix: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let path = out_dir.join(format!("{}.json", prefix));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create results file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results).context("Failed to serialise results")?;
    writer.flush()?;
    tracing::info!(
        path = %path.display(),
        n_genes = results.genes().len(),
        "Wrote results"
    );
    Ok(path)
}
