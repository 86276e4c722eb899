//! # Analysis Runner
//!
//! ## Role
//! Execute a built `Analysis` over a variant collection.
//!
//! ## State machine
//! `Initialized -> VariantPhaseRunning -> Aggregating -> GenePhaseRunning -> Complete`
//!
//! Transitions only move one state forward; anything else is an internal
//! invariant violation and aborts the run.
//!
//! ## Modes
//! - `PASS_ONLY`: a record stops being evaluated at its first failure and is
//!   kept out of every later stage (failed variants are reported separately,
//!   failed genes likewise).
//! - `FULL`: every record is evaluated by every remaining step, so its failed
//!   set is the union of all steps it failed. Failed variants ride along with
//!   a gene that has at least one passing variant; genes that fail a gene
//!   filter stay in the gene collection.
//!
//! Variant steps run before gene aggregation and gene steps after it, each
//! group in declared order. Records within a phase are independent and are
//! evaluated on the rayon pool; each record runs its steps sequentially.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info_span, instrument};

use super::analysis::{Analysis, AnalysisMode, AnalysisStep, ScoringMode};
use super::scoring;
use crate::data::gene::{GeneId, GeneRecord};
use crate::data::variant::VariantRecord;
use crate::error::{Result, RexomiserError};
use crate::filters::{GeneFilter, VariantFilter};
use crate::utils::telemetry::{Stage, TelemetryBlackboard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    Initialized,
    VariantPhaseRunning,
    Aggregating,
    GenePhaseRunning,
    Complete,
}

impl RunState {
    fn next(self) -> Option<RunState> {
        match self {
            RunState::Initialized => Some(RunState::VariantPhaseRunning),
            RunState::VariantPhaseRunning => Some(RunState::Aggregating),
            RunState::Aggregating => Some(RunState::GenePhaseRunning),
            RunState::GenePhaseRunning => Some(RunState::Complete),
            RunState::Complete => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Final state of a run, handed to external renderers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResults {
    analysis_mode: AnalysisMode,
    scoring_mode: ScoringMode,
    /// Ranked genes with their variants and priority results
    genes: Vec<GeneRecord>,
    /// Genes removed by a gene filter (PASS_ONLY)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed_genes: Vec<GeneRecord>,
    /// Variants not attached to any reported gene
    failed_variants: Vec<VariantRecord>,
}

impl AnalysisResults {
    pub fn genes(&self) -> &[GeneRecord] {
        &self.genes
    }

    pub fn failed_genes(&self) -> &[GeneRecord] {
        &self.failed_genes
    }

    pub fn failed_variants(&self) -> &[VariantRecord] {
        &self.failed_variants
    }

    pub fn analysis_mode(&self) -> AnalysisMode {
        self.analysis_mode
    }

    pub fn gene(&self, gene_id: GeneId) -> Option<&GeneRecord> {
        self.genes.iter().find(|g| g.gene_id() == gene_id)
    }

    /// Keep only the `n` best genes. 0 keeps everything.
    pub fn truncate_genes(&mut self, n: usize) {
        if n > 0 {
            self.genes.truncate(n);
        }
    }
}

pub struct AnalysisRunner<'a> {
    analysis: &'a Analysis,
    telemetry: Option<Arc<TelemetryBlackboard>>,
    state: RunState,
}

impl<'a> AnalysisRunner<'a> {
    pub fn new(analysis: &'a Analysis, telemetry: Option<Arc<TelemetryBlackboard>>) -> Self {
        Self {
            analysis,
            telemetry,
            state: RunState::Initialized,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn advance(&mut self, to: RunState) -> Result<()> {
        if self.state.next() != Some(to) {
            return Err(RexomiserError::invariant(format!(
                "illegal run state transition {} -> {}",
                self.state, to
            )));
        }
        tracing::debug!(from = %self.state, to = %to, "Run state transition");
        self.state = to;
        Ok(())
    }

    fn set_stage(&self, stage: Stage) {
        if let Some(t) = &self.telemetry {
            t.set_stage(stage);
        }
    }

    /// Run every phase to completion.
    #[instrument(skip_all, fields(n_variants = variants.len(), mode = %self.analysis.mode()))]
    pub fn run(mut self, mut variants: Vec<VariantRecord>) -> Result<AnalysisResults> {
        let analysis = self.analysis;
        let mode = analysis.mode();
        let (variant_steps, gene_steps) = partition_steps(analysis.steps());

        self.advance(RunState::VariantPhaseRunning)?;
        self.set_stage(Stage::VariantPhase);
        info_span!("variant_phase", n_steps = variant_steps.len())
            .in_scope(|| self.run_variant_phase(&variant_steps, &mut variants));

        self.advance(RunState::Aggregating)?;
        self.set_stage(Stage::Aggregating);
        let (mut genes, failed_variants) =
            info_span!("aggregate_genes").in_scope(|| aggregate_genes(variants, mode))?;
        tracing::info!(
            n_genes = genes.len(),
            n_failed_variants = failed_variants.len(),
            "Aggregated variants into genes"
        );

        self.advance(RunState::GenePhaseRunning)?;
        self.set_stage(Stage::GenePhase);
        let mut failed_genes = info_span!("gene_phase", n_steps = gene_steps.len())
            .in_scope(|| self.run_gene_phase(&gene_steps, &mut genes))?;

        self.advance(RunState::Complete)?;
        self.set_stage(Stage::Scoring);
        let scoring_mode = analysis.scoring_mode();
        info_span!("score_genes").in_scope(|| {
            scoring::score_genes(&mut genes, scoring_mode);
            scoring::rank_genes(&mut genes);
            scoring::score_genes(&mut failed_genes, scoring_mode);
            scoring::rank_genes(&mut failed_genes);
        });

        Ok(AnalysisResults {
            analysis_mode: mode,
            scoring_mode,
            genes,
            failed_genes,
            failed_variants,
        })
    }

    fn run_variant_phase(&self, steps: &[&Arc<dyn VariantFilter>], variants: &mut [VariantRecord]) {
        let mode = self.analysis.mode();
        if let Some(t) = &self.telemetry {
            t.begin_variants(variants.len() as u64);
        }
        variants.par_iter_mut().for_each(|variant| {
            evaluate_variant(steps, variant, mode);
            if let Some(t) = &self.telemetry {
                t.inc_variants(1);
            }
        });
        let n_passed = variants.iter().filter(|v| v.passes_filters()).count();
        tracing::info!(
            n_variants = variants.len(),
            n_passed,
            "Variant filters complete"
        );
    }

    /// Returns the genes removed in PASS_ONLY mode.
    fn run_gene_phase(
        &self,
        steps: &[&AnalysisStep],
        genes: &mut Vec<GeneRecord>,
    ) -> Result<Vec<GeneRecord>> {
        let mode = self.analysis.mode();
        let mut failed_genes = Vec::new();
        if let Some(t) = &self.telemetry {
            t.begin_genes((genes.len() * steps.len()) as u64);
        }

        for step in steps {
            match step {
                AnalysisStep::Prioritiser(prioritiser) => {
                    prioritiser.prioritise_genes(genes);
                    let priority_type = prioritiser.priority_type();
                    if let Some(gene) = genes.iter().find(|g| g.priority_result(priority_type).is_none()) {
                        return Err(RexomiserError::invariant(format!(
                            "prioritiser {} left gene {} without a result",
                            priority_type,
                            gene.gene_id()
                        )));
                    }
                }
                AnalysisStep::GeneFilter(filter) => {
                    let filter: &dyn GeneFilter = filter.as_ref();
                    genes.par_iter_mut().for_each(|gene| {
                        let result = filter.run_filter(gene);
                        gene.add_filter_result(result);
                    });
                    if mode == AnalysisMode::PassOnly {
                        let (kept, failed): (Vec<_>, Vec<_>) =
                            genes.drain(..).partition(|g| g.passes_filters());
                        *genes = kept;
                        failed_genes.extend(failed);
                    }
                }
                AnalysisStep::VariantFilter(_) => {
                    return Err(RexomiserError::invariant(
                        "variant filter scheduled in the gene phase",
                    ));
                }
            }
            if let Some(t) = &self.telemetry {
                t.inc_genes(genes.len() as u64);
            }
            tracing::debug!(step = step.identifier(), n_genes = genes.len(), "Gene step complete");
        }
        Ok(failed_genes)
    }
}

fn partition_steps(steps: &[AnalysisStep]) -> (Vec<&Arc<dyn VariantFilter>>, Vec<&AnalysisStep>) {
    let mut variant_steps = Vec::new();
    let mut gene_steps = Vec::new();
    for step in steps {
        match step {
            AnalysisStep::VariantFilter(filter) => variant_steps.push(filter),
            other => gene_steps.push(other),
        }
    }
    (variant_steps, gene_steps)
}

/// Run a variant through its steps in order.
pub(crate) fn evaluate_variant(
    steps: &[&Arc<dyn VariantFilter>],
    variant: &mut VariantRecord,
    mode: AnalysisMode,
) {
    for step in steps {
        if mode == AnalysisMode::PassOnly && !variant.passes_filters() {
            break;
        }
        let result = step.evaluate(variant);
        variant.add_filter_result(result);
    }
}

/// Group variants by gene in order of first passing appearance.
///
/// Returns the genes and the variants not attached to any gene.
fn aggregate_genes(
    variants: Vec<VariantRecord>,
    mode: AnalysisMode,
) -> Result<(Vec<GeneRecord>, Vec<VariantRecord>)> {
    let (passing, failing): (Vec<_>, Vec<_>) =
        variants.into_iter().partition(|v| v.passes_filters());

    let mut genes: Vec<GeneRecord> = Vec::new();
    let mut index: HashMap<GeneId, usize> = HashMap::new();
    for variant in passing {
        match index.get(&variant.gene_id()) {
            Some(&i) => genes[i].add_variant(variant)?,
            None => {
                index.insert(variant.gene_id(), genes.len());
                genes.push(GeneRecord::from_variant(variant));
            }
        }
    }

    let mut unattached = Vec::new();
    for variant in failing {
        match (mode, index.get(&variant.gene_id())) {
            (AnalysisMode::Full, Some(&i)) => genes[i].add_variant(variant)?,
            _ => unattached.push(variant),
        }
    }

    if let Some(gene) = genes.iter().find(|g| g.n_passing_variants() == 0) {
        return Err(RexomiserError::invariant(format!(
            "gene {} aggregated without a passing variant",
            gene.gene_id()
        )));
    }
    Ok((genes, unattached))
}
