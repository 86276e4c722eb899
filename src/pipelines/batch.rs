//! # Batch Execution
//!
//! ## Role
//! Run a list of analysis descriptions against one shared pair of data
//! services.
//!
//! ## Contract
//! - Sequential by default, or concurrently across the rayon pool.
//! - Runs are independent. A failing run is logged and reported in its
//!   outcome; the remaining runs carry on.
//! - Each successful run writes `<outputPrefix>.json` into the output
//!   directory.
//! - Telemetry counts completed analyses in both modes. Stage and per-record
//!   counters are only reported for sequential batches, since concurrent runs
//!   would reset each other's counts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use rayon::prelude::*;
use tracing::info_span;

use super::builder::AnalysisBuilder;
use super::runner::AnalysisRunner;
use crate::io::{load_analysis, load_variants, write_results};
use crate::utils::telemetry::{Stage, TelemetryBlackboard};

/// Result of one analysis in a batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub analysis: PathBuf,
    pub result: anyhow::Result<PathBuf>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct BatchRunner<'a> {
    builder: &'a AnalysisBuilder,
    out_dir: PathBuf,
    parallel: bool,
    telemetry: Option<Arc<TelemetryBlackboard>>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(builder: &'a AnalysisBuilder, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            builder,
            out_dir: out_dir.into(),
            parallel: false,
            telemetry: None,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<TelemetryBlackboard>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Run every analysis, returning one outcome per input in input order.
    pub fn run(&self, analyses: &[PathBuf]) -> Vec<BatchOutcome> {
        if let Some(t) = &self.telemetry {
            t.set_total_analyses(analyses.len() as u64);
        }
        tracing::info!(
            n_analyses = analyses.len(),
            parallel = self.parallel,
            "Starting batch"
        );

        let run_one = |path: &PathBuf| {
            let result = self.run_analysis(path);
            if let Err(e) = &result {
                tracing::warn!(analysis = %path.display(), error = %format!("{:#}", e), "Analysis failed");
            }
            if let Some(t) = &self.telemetry {
                t.inc_analyses();
            }
            BatchOutcome {
                analysis: path.clone(),
                result,
            }
        };
        let outcomes: Vec<BatchOutcome> = if self.parallel {
            analyses.par_iter().map(run_one).collect()
        } else {
            analyses.iter().map(run_one).collect()
        };

        let n_failed = outcomes.iter().filter(|o| !o.succeeded()).count();
        tracing::info!(
            n_succeeded = outcomes.len() - n_failed,
            n_failed,
            "Batch complete"
        );
        outcomes
    }

    /// Load, build, run and write a single analysis.
    pub fn run_analysis(&self, path: &Path) -> anyhow::Result<PathBuf> {
        info_span!("analysis", path = %path.display()).in_scope(|| {
            self.set_stage(Stage::LoadingData);
            let spec = load_analysis(path)?;
            let analysis = self
                .builder
                .build(&spec)
                .with_context(|| format!("Invalid analysis {}", path.display()))?;
            let variants_path = spec
                .variants
                .as_deref()
                .with_context(|| format!("Analysis {} names no variants file", path.display()))?;
            let variants = load_variants(variants_path)?;

            let mut results = AnalysisRunner::new(&analysis, self.run_telemetry())
                .run(variants)
                .with_context(|| format!("Analysis {} aborted", path.display()))?;
            results.truncate_genes(analysis.num_genes());

            self.set_stage(Stage::WritingOutput);
            write_results(&results, &self.out_dir, analysis.output_prefix())
        })
    }

    /// Blackboard handed to a single run, none when runs overlap
    fn run_telemetry(&self) -> Option<Arc<TelemetryBlackboard>> {
        if self.parallel {
            None
        } else {
            self.telemetry.clone()
        }
    }

    fn set_stage(&self, stage: Stage) {
        if let Some(t) = self.run_telemetry() {
            t.set_stage(stage);
        }
    }
}
