//! # Analysis Builder
//!
//! ## Role
//! Turn an `AnalysisSpec` into an executable `Analysis`, failing fast on any
//! configuration problem before a single record is processed.
//!
//! ## Contract
//! - One builder function per step tag. Each returns `Ok(Some(step))`,
//!   `Ok(None)` when the step is legitimately omitted (inheritance filter
//!   without pedigree or mode), or `Err(InvalidStep)` naming step and field.
//! - Frequency, known-variant and pathogenicity filters are always wrapped in
//!   their annotation data provider.
//! - A priority score filter must follow the prioritiser it references.
//!   Ordering is checked, never reordered.
//! - Steps registered with `with_step` precede the declared steps.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::instrument;

use super::analysis::{
    Analysis, AnalysisSpec, AnalysisStep, FrequencyFilterOptions, GeneIdFilterOptions,
    IntervalFilterOptions, PathogenicityFilterOptions, PriorityScoreFilterOptions,
    QualityFilterOptions, StepSpec, VariantEffectFilterOptions,
};
use crate::data::annotation::{FrequencySource, PathogenicitySource};
use crate::data::gene::GeneId;
use crate::data::interval::GeneticInterval;
use crate::data::pedigree::ModeOfInheritance;
use crate::data::priority::PriorityType;
use crate::error::{Result, RexomiserError};
use crate::filters::{
    EntrezGeneIdFilter, FrequencyDataProvider, FrequencyFilter, InheritanceFilter,
    IntervalFilter, KnownVariantFilter, PathogenicityDataProvider, PathogenicityFilter,
    PriorityScoreFilter, QualityFilter, RegulatoryFeatureFilter, VariantEffectFilter,
};
use crate::io::data_source::{PhenotypeDataService, VariantDataService};
use crate::prioritisers::PhivePrioritiser;

/// Builds analyses against a fixed pair of data services
pub struct AnalysisBuilder {
    variant_service: Arc<dyn VariantDataService>,
    phenotype_service: Arc<dyn PhenotypeDataService>,
    extra_steps: Vec<AnalysisStep>,
}

/// Per-build context threaded through the step builder functions
struct BuildContext<'a> {
    spec: &'a AnalysisSpec,
    frequency_sources: BTreeSet<FrequencySource>,
    pathogenicity_sources: BTreeSet<PathogenicitySource>,
    declared_prioritisers: HashSet<PriorityType>,
}

impl AnalysisBuilder {
    pub fn new(
        variant_service: Arc<dyn VariantDataService>,
        phenotype_service: Arc<dyn PhenotypeDataService>,
    ) -> Self {
        Self {
            variant_service,
            phenotype_service,
            extra_steps: Vec::new(),
        }
    }

    /// Register an externally implemented step.
    pub fn with_step(mut self, step: AnalysisStep) -> Self {
        self.extra_steps.push(step);
        self
    }

    #[instrument(skip_all, fields(n_declared = spec.steps.len()))]
    pub fn build(&self, spec: &AnalysisSpec) -> Result<Analysis> {
        let mut ctx = BuildContext {
            spec,
            frequency_sources: spec.frequency_sources.iter().copied().collect(),
            pathogenicity_sources: spec.pathogenicity_sources.iter().copied().collect(),
            declared_prioritisers: HashSet::new(),
        };

        let mut steps = Vec::with_capacity(self.extra_steps.len() + spec.steps.len());
        for step in &self.extra_steps {
            if let AnalysisStep::Prioritiser(p) = step {
                declare_prioritiser(&mut ctx, p.priority_type(), "prioritiser")?;
            }
            steps.push(step.clone());
        }

        for step_spec in &spec.steps {
            let built = match step_spec {
                StepSpec::QualityFilter(opts) => build_quality_filter(opts)?,
                StepSpec::IntervalFilter(opts) => build_interval_filter(opts)?,
                StepSpec::GeneIdFilter(opts) => build_gene_id_filter(opts)?,
                StepSpec::VariantEffectFilter(opts) => build_variant_effect_filter(opts)?,
                StepSpec::KnownVariantFilter(_) => self.build_known_variant_filter(&ctx)?,
                StepSpec::FrequencyFilter(opts) => self.build_frequency_filter(&ctx, opts)?,
                StepSpec::PathogenicityFilter(opts) => {
                    self.build_pathogenicity_filter(&ctx, opts)?
                }
                StepSpec::InheritanceFilter(_) => build_inheritance_filter(&ctx),
                StepSpec::PriorityScoreFilter(opts) => build_priority_score_filter(&ctx, opts)?,
                StepSpec::RegulatoryFeatureFilter(_) => {
                    Some(AnalysisStep::VariantFilter(Arc::new(RegulatoryFeatureFilter::new())))
                }
                StepSpec::PhivePrioritiser(_) => self.build_phive_prioritiser(&mut ctx)?,
            };
            match built {
                Some(step) => {
                    tracing::debug!(step = step_spec.name(), id = step.identifier(), "Added step");
                    steps.push(step);
                }
                None => tracing::info!(step = step_spec.name(), "Step omitted for this analysis"),
            }
        }

        tracing::info!(
            n_steps = steps.len(),
            mode = %spec.analysis_mode,
            "Built analysis"
        );
        Ok(Analysis {
            steps,
            mode: spec.analysis_mode,
            scoring_mode: spec.gene_score_mode,
            hpo_ids: spec.hpo_ids.clone(),
            mode_of_inheritance: spec.mode_of_inheritance,
            output_prefix: spec.output_prefix.clone(),
            num_genes: spec.num_genes,
        })
    }

    fn build_known_variant_filter(&self, ctx: &BuildContext<'_>) -> Result<Option<AnalysisStep>> {
        let sources = require_frequency_sources(ctx, "knownVariantFilter")?;
        let provider =
            FrequencyDataProvider::new(self.variant_service.clone(), sources, KnownVariantFilter::new());
        Ok(Some(AnalysisStep::VariantFilter(Arc::new(provider))))
    }

    fn build_frequency_filter(
        &self,
        ctx: &BuildContext<'_>,
        opts: &FrequencyFilterOptions,
    ) -> Result<Option<AnalysisStep>> {
        const STEP: &str = "frequencyFilter";
        let max_frequency = opts
            .max_frequency
            .ok_or_else(|| missing(STEP, "maxFrequency"))?;
        check_range(STEP, "maxFrequency", max_frequency as f64, 0.0, 100.0)?;
        let sources = require_frequency_sources(ctx, STEP)?;
        let filter = FrequencyFilter::new(max_frequency, opts.filter_out_all_known.unwrap_or(false));
        let provider = FrequencyDataProvider::new(self.variant_service.clone(), sources, filter);
        Ok(Some(AnalysisStep::VariantFilter(Arc::new(provider))))
    }

    fn build_pathogenicity_filter(
        &self,
        ctx: &BuildContext<'_>,
        opts: &PathogenicityFilterOptions,
    ) -> Result<Option<AnalysisStep>> {
        const STEP: &str = "pathogenicityFilter";
        let keep = opts
            .keep_non_pathogenic
            .ok_or_else(|| missing(STEP, "keepNonPathogenic"))?;
        let mut filter = PathogenicityFilter::new(keep);
        if let Some(min_score) = opts.min_pathogenicity_score {
            check_range(STEP, "minPathogenicityScore", min_score as f64, 0.0, 1.0)?;
            filter = filter.with_min_score(min_score);
        }
        if ctx.pathogenicity_sources.is_empty() {
            return Err(RexomiserError::invalid_step(
                STEP,
                "pathogenicitySources",
                "must list at least one source",
            ));
        }
        let provider = PathogenicityDataProvider::new(
            self.variant_service.clone(),
            ctx.pathogenicity_sources.clone(),
            filter,
        );
        Ok(Some(AnalysisStep::VariantFilter(Arc::new(provider))))
    }

    fn build_phive_prioritiser(&self, ctx: &mut BuildContext<'_>) -> Result<Option<AnalysisStep>> {
        const STEP: &str = "phivePrioritiser";
        if ctx.spec.hpo_ids.is_empty() {
            return Err(RexomiserError::invalid_step(STEP, "hpoIds", "must not be empty"));
        }
        declare_prioritiser(ctx, PriorityType::PhivePriority, STEP)?;
        let prioritiser =
            PhivePrioritiser::new(ctx.spec.hpo_ids.clone(), self.phenotype_service.clone());
        Ok(Some(AnalysisStep::Prioritiser(Arc::new(prioritiser))))
    }
}

fn missing(step: &str, field: &str) -> RexomiserError {
    RexomiserError::invalid_step(step, field, "is required")
}

fn check_range(step: &str, field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(RexomiserError::invalid_step(
            step,
            field,
            format!("must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

fn require_frequency_sources(ctx: &BuildContext<'_>, step: &str) -> Result<BTreeSet<FrequencySource>> {
    if ctx.frequency_sources.is_empty() {
        return Err(RexomiserError::invalid_step(
            step,
            "frequencySources",
            "must list at least one source",
        ));
    }
    Ok(ctx.frequency_sources.clone())
}

fn declare_prioritiser(ctx: &mut BuildContext<'_>, priority_type: PriorityType, step: &str) -> Result<()> {
    if !ctx.declared_prioritisers.insert(priority_type) {
        return Err(RexomiserError::config(format!(
            "{} step declares prioritiser {} more than once",
            step, priority_type
        )));
    }
    Ok(())
}

fn build_quality_filter(opts: &QualityFilterOptions) -> Result<Option<AnalysisStep>> {
    const STEP: &str = "qualityFilter";
    let min_quality = opts.min_quality.ok_or_else(|| missing(STEP, "minQuality"))?;
    check_range(STEP, "minQuality", min_quality, 0.0, f64::MAX)?;
    Ok(Some(AnalysisStep::VariantFilter(Arc::new(QualityFilter::new(min_quality)))))
}

fn build_interval_filter(opts: &IntervalFilterOptions) -> Result<Option<AnalysisStep>> {
    const STEP: &str = "intervalFilter";
    let raw = opts.interval.as_deref().ok_or_else(|| missing(STEP, "interval"))?;
    let interval: GeneticInterval = raw
        .parse()
        .map_err(|e: String| RexomiserError::invalid_step(STEP, "interval", e))?;
    Ok(Some(AnalysisStep::VariantFilter(Arc::new(IntervalFilter::new(interval)))))
}

fn build_gene_id_filter(opts: &GeneIdFilterOptions) -> Result<Option<AnalysisStep>> {
    const STEP: &str = "geneIdFilter";
    let ids = opts.gene_ids.as_ref().ok_or_else(|| missing(STEP, "geneIds"))?;
    if ids.is_empty() {
        return Err(RexomiserError::invalid_step(STEP, "geneIds", "must not be empty"));
    }
    let filter = EntrezGeneIdFilter::new(ids.iter().copied().map(GeneId));
    Ok(Some(AnalysisStep::VariantFilter(Arc::new(filter))))
}

fn build_variant_effect_filter(opts: &VariantEffectFilterOptions) -> Result<Option<AnalysisStep>> {
    const STEP: &str = "variantEffectFilter";
    let remove = opts.remove.as_ref().ok_or_else(|| missing(STEP, "remove"))?;
    let filter = VariantEffectFilter::new(remove.iter().copied());
    Ok(Some(AnalysisStep::VariantFilter(Arc::new(filter))))
}

fn build_inheritance_filter(ctx: &BuildContext<'_>) -> Option<AnalysisStep> {
    let mode = ctx.spec.mode_of_inheritance;
    match &ctx.spec.pedigree {
        Some(pedigree) if mode != ModeOfInheritance::Undefined && !pedigree.is_empty() => {
            let filter = InheritanceFilter::new(pedigree.clone(), mode);
            Some(AnalysisStep::VariantFilter(Arc::new(filter)))
        }
        _ => None,
    }
}

fn build_priority_score_filter(
    ctx: &BuildContext<'_>,
    opts: &PriorityScoreFilterOptions,
) -> Result<Option<AnalysisStep>> {
    const STEP: &str = "priorityScoreFilter";
    let priority_type = opts
        .priority_type
        .ok_or_else(|| missing(STEP, "priorityType"))?;
    let min_score = opts
        .min_priority_score
        .ok_or_else(|| missing(STEP, "minPriorityScore"))?;
    check_range(STEP, "minPriorityScore", min_score as f64, 0.0, 1.0)?;
    if !ctx.declared_prioritisers.contains(&priority_type) {
        return Err(RexomiserError::invalid_step(
            STEP,
            "priorityType",
            format!("references {} which is not declared by an earlier step", priority_type),
        ));
    }
    let filter = PriorityScoreFilter::new(priority_type, min_score);
    Ok(Some(AnalysisStep::GeneFilter(Arc::new(filter))))
}
