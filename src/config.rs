//! # Configuration Logic
//!
//! ## Role
//! CLI argument parsing and validation.
//!
//! ## Validation
//! - Exactly one of `--analysis` / `--analysis-batch`
//! - Input files must exist
//! - `--nthreads` must be positive when given
//!
//! ## Example CLI
//! ```bash
//! rexomiser --analysis pfeiffer.json --data reference.json --out-dir results --nthreads 8
//! ```

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::error::{Result, RexomiserError};

#[derive(Parser, Debug, Clone)]
#[command(name = "rexomiser", version, about = "Exome variant prioritisation")]
#[command(group(ArgGroup::new("input").required(true).args(["analysis", "analysis_batch"])))]
pub struct Config {
    /// Analysis description (JSON)
    #[arg(long)]
    pub analysis: Option<PathBuf>,

    /// Batch file listing one analysis description per line
    #[arg(long = "analysis-batch")]
    pub analysis_batch: Option<PathBuf>,

    /// Reference data backing the annotation and phenotype services (JSON)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Output directory for results
    #[arg(long = "out-dir", default_value = "results")]
    pub out_dir: PathBuf,

    /// Number of worker threads (default: all cores)
    #[arg(long)]
    pub nthreads: Option<usize>,

    /// Run batch analyses concurrently
    #[arg(long = "parallel-batch")]
    pub parallel_batch: bool,

    /// Print span timings
    #[arg(long)]
    pub profile: bool,

    /// Debug-level logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable the progress heartbeat
    #[arg(long = "no-heartbeat")]
    pub no_heartbeat: bool,
}

impl Config {
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.is_some() && self.analysis_batch.is_some() {
            return Err(RexomiserError::config(
                "--analysis and --analysis-batch are mutually exclusive",
            ));
        }
        let inputs = [&self.analysis, &self.analysis_batch, &self.data];
        for path in inputs.into_iter().flatten() {
            if !path.exists() {
                return Err(RexomiserError::FileNotFound { path: path.clone() });
            }
        }
        if self.nthreads == Some(0) {
            return Err(RexomiserError::config("--nthreads must be at least 1"));
        }
        Ok(())
    }

    pub fn nthreads(&self) -> usize {
        self.nthreads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
