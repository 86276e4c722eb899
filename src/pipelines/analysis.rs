//! # Analysis Description
//!
//! ## Role
//! The parsed analysis document (`AnalysisSpec`, plain serde data) and the
//! validated, executable `Analysis` produced from it by `AnalysisBuilder`.
//!
//! ## Contract
//! - Steps are single-key objects `{ "<stepName>": { ...options } }` in
//!   declared order. Unknown step names and unknown enumerated values are
//!   rejected while parsing.
//! - Option fields are all optional at the serde level; mandatory ones are
//!   checked by the builder so the error names the step and field.
//! - `geneScoreMode` affects presentation only.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::annotation::{FrequencySource, PathogenicitySource};
use crate::data::pedigree::{ModeOfInheritance, Pedigree};
use crate::data::priority::PriorityType;
use crate::data::variant::VariantEffect;
use crate::filters::{GeneFilter, VariantFilter};
use crate::prioritisers::Prioritiser;

pub const DEFAULT_OUTPUT_PREFIX: &str = "rexomiser-results";

/// Whether failing records are dropped immediately or kept to the end
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMode {
    #[default]
    PassOnly,
    Full,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisMode::PassOnly => "PASS_ONLY",
            AnalysisMode::Full => "FULL",
        })
    }
}

/// How the priority component of the combined gene score is presented
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringMode {
    #[default]
    RawScore,
    RankBased,
}

fn default_output_prefix() -> String {
    DEFAULT_OUTPUT_PREFIX.to_string()
}

/// Analysis document as read from disk
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalysisSpec {
    /// Pre-annotated variant records, relative to the analysis document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pedigree: Option<Pedigree>,
    #[serde(default)]
    pub hpo_ids: Vec<String>,
    #[serde(default)]
    pub mode_of_inheritance: ModeOfInheritance,
    #[serde(default)]
    pub analysis_mode: AnalysisMode,
    #[serde(default)]
    pub gene_score_mode: ScoringMode,
    #[serde(default)]
    pub frequency_sources: Vec<FrequencySource>,
    #[serde(default)]
    pub pathogenicity_sources: Vec<PathogenicitySource>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    /// Genes written to output, 0 for all
    #[serde(default)]
    pub num_genes: usize,
}

impl AnalysisSpec {
    pub fn new() -> Self {
        Self {
            output_prefix: default_output_prefix(),
            ..Self::default()
        }
    }

    pub fn with_step(mut self, step: StepSpec) -> Self {
        self.steps.push(step);
        self
    }
}

/// One declared step with its raw options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepSpec {
    QualityFilter(QualityFilterOptions),
    IntervalFilter(IntervalFilterOptions),
    GeneIdFilter(GeneIdFilterOptions),
    VariantEffectFilter(VariantEffectFilterOptions),
    KnownVariantFilter(EmptyOptions),
    FrequencyFilter(FrequencyFilterOptions),
    PathogenicityFilter(PathogenicityFilterOptions),
    InheritanceFilter(EmptyOptions),
    PriorityScoreFilter(PriorityScoreFilterOptions),
    RegulatoryFeatureFilter(EmptyOptions),
    PhivePrioritiser(EmptyOptions),
}

impl StepSpec {
    /// Step name as written in the analysis document
    pub fn name(&self) -> &'static str {
        match self {
            StepSpec::QualityFilter(_) => "qualityFilter",
            StepSpec::IntervalFilter(_) => "intervalFilter",
            StepSpec::GeneIdFilter(_) => "geneIdFilter",
            StepSpec::VariantEffectFilter(_) => "variantEffectFilter",
            StepSpec::KnownVariantFilter(_) => "knownVariantFilter",
            StepSpec::FrequencyFilter(_) => "frequencyFilter",
            StepSpec::PathogenicityFilter(_) => "pathogenicityFilter",
            StepSpec::InheritanceFilter(_) => "inheritanceFilter",
            StepSpec::PriorityScoreFilter(_) => "priorityScoreFilter",
            StepSpec::RegulatoryFeatureFilter(_) => "regulatoryFeatureFilter",
            StepSpec::PhivePrioritiser(_) => "phivePrioritiser",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyOptions {}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QualityFilterOptions {
    #[serde(default)]
    pub min_quality: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IntervalFilterOptions {
    #[serde(default)]
    pub interval: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneIdFilterOptions {
    #[serde(default)]
    pub gene_ids: Option<Vec<u32>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VariantEffectFilterOptions {
    #[serde(default)]
    pub remove: Option<Vec<VariantEffect>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FrequencyFilterOptions {
    #[serde(default)]
    pub max_frequency: Option<f32>,
    #[serde(default)]
    pub filter_out_all_known: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PathogenicityFilterOptions {
    #[serde(default)]
    pub keep_non_pathogenic: Option<bool>,
    #[serde(default)]
    pub min_pathogenicity_score: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PriorityScoreFilterOptions {
    #[serde(default)]
    pub priority_type: Option<PriorityType>,
    #[serde(default)]
    pub min_priority_score: Option<f32>,
}

/// An executable step, dispatched by capability
#[derive(Clone)]
pub enum AnalysisStep {
    VariantFilter(Arc<dyn VariantFilter>),
    GeneFilter(Arc<dyn GeneFilter>),
    Prioritiser(Arc<dyn Prioritiser>),
}

impl AnalysisStep {
    pub fn is_variant_step(&self) -> bool {
        matches!(self, AnalysisStep::VariantFilter(_))
    }

    /// Stable identifier used in logs
    pub fn identifier(&self) -> &'static str {
        match self {
            AnalysisStep::VariantFilter(f) => f.filter_type().as_str(),
            AnalysisStep::GeneFilter(f) => f.filter_type().as_str(),
            AnalysisStep::Prioritiser(p) => p.priority_type().as_str(),
        }
    }
}

impl fmt::Debug for AnalysisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            AnalysisStep::VariantFilter(_) => "VariantFilter",
            AnalysisStep::GeneFilter(_) => "GeneFilter",
            AnalysisStep::Prioritiser(_) => "Prioritiser",
        };
        write!(f, "{}({})", kind, self.identifier())
    }
}

/// A validated analysis ready to run
#[derive(Clone, Debug)]
pub struct Analysis {
    pub(crate) steps: Vec<AnalysisStep>,
    pub(crate) mode: AnalysisMode,
    pub(crate) scoring_mode: ScoringMode,
    pub(crate) hpo_ids: Vec<String>,
    pub(crate) mode_of_inheritance: ModeOfInheritance,
    pub(crate) output_prefix: String,
    pub(crate) num_genes: usize,
}

impl Analysis {
    pub fn steps(&self) -> &[AnalysisStep] {
        &self.steps
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn scoring_mode(&self) -> ScoringMode {
        self.scoring_mode
    }

    pub fn hpo_ids(&self) -> &[String] {
        &self.hpo_ids
    }

    pub fn mode_of_inheritance(&self) -> ModeOfInheritance {
        self.mode_of_inheritance
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    pub fn num_genes(&self) -> usize {
        self.num_genes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analysis_document() {
        let json = r#"{
            "variants": "Pfeiffer.variants.json",
            "hpoIds": ["HP:0001156", "HP:0001363"],
            "modeOfInheritance": "AUTOSOMAL_DOMINANT",
            "analysisMode": "FULL",
            "frequencySources": ["THOUSAND_GENOMES", "ESP_ALL"],
            "pathogenicitySources": ["POLYPHEN", "SIFT"],
            "steps": [
                {"intervalFilter": {"interval": "chr10:123256200-123256300"}},
                {"qualityFilter": {"minQuality": 50.0}},
                {"knownVariantFilter": {}},
                {"frequencyFilter": {"maxFrequency": 1.0}},
                {"pathogenicityFilter": {"keepNonPathogenic": true}},
                {"phivePrioritiser": {}},
                {"priorityScoreFilter": {"priorityType": "PHIVE_PRIORITY", "minPriorityScore": 0.501}}
            ]
        }"#;
        let spec: AnalysisSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.analysis_mode, AnalysisMode::Full);
        assert_eq!(spec.gene_score_mode, ScoringMode::RawScore);
        assert_eq!(spec.output_prefix, DEFAULT_OUTPUT_PREFIX);
        assert_eq!(spec.steps.len(), 7);
        assert_eq!(spec.steps[1].name(), "qualityFilter");
        assert_eq!(
            spec.steps[1],
            StepSpec::QualityFilter(QualityFilterOptions {
                min_quality: Some(50.0)
            })
        );
        assert_eq!(
            spec.steps[6],
            StepSpec::PriorityScoreFilter(PriorityScoreFilterOptions {
                priority_type: Some(PriorityType::PhivePriority),
                min_priority_score: Some(0.501),
            })
        );
    }

    #[test]
    fn test_unknown_step_and_values_rejected() {
        let unknown_step = r#"{"steps": [{"bananaFilter": {}}]}"#;
        assert!(serde_json::from_str::<AnalysisSpec>(unknown_step).is_err());

        let unknown_mode = r#"{"modeOfInheritance": "MITOCHONDRIAL"}"#;
        let err = serde_json::from_str::<AnalysisSpec>(unknown_mode).unwrap_err();
        assert!(err.to_string().contains("AUTOSOMAL_DOMINANT"));

        let unknown_option = r#"{"steps": [{"qualityFilter": {"minQual": 3}}]}"#;
        assert!(serde_json::from_str::<AnalysisSpec>(unknown_option).is_err());
    }

    #[test]
    fn test_missing_option_parses_as_none() {
        let json = r#"{"steps": [{"qualityFilter": {}}]}"#;
        let spec: AnalysisSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.steps[0], StepSpec::QualityFilter(QualityFilterOptions::default()));
    }
}
