//! # Step Library: Filters
//!
//! ## Role
//! Independent, stateless predicate steps over variants and genes. Each step
//! holds only the configuration captured at construction and returns a
//! `FilterResult` tagged with its `FilterType`.
//!
//! ## Sub-modules
//! - `quality`, `interval`, `gene_id`, `variant_effect`: positional and call-level
//!   predicates
//! - `frequency`, `known_variant`, `pathogenicity`: predicates over annotation
//!   slots, always wrapped by `data_provider`
//! - `inheritance`: genotype pattern across a pedigree
//! - `regulatory_feature`: non-coding variants outside regulatory elements
//! - `priority_score`: gene-level threshold on a prior prioritiser's result
//! - `data_provider`: the annotation-fetching decorator
//!
//! Recording the outcome on the record is the runner's job. Filters never
//! touch the failed-step set.

pub mod data_provider;
pub mod frequency;
pub mod gene_id;
pub mod inheritance;
pub mod interval;
pub mod known_variant;
pub mod pathogenicity;
pub mod priority_score;
pub mod quality;
pub mod regulatory_feature;
pub mod variant_effect;

use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::gene::GeneRecord;
use crate::data::variant::VariantRecord;

pub use data_provider::{FrequencyDataProvider, PathogenicityDataProvider};
pub use frequency::FrequencyFilter;
pub use gene_id::EntrezGeneIdFilter;
pub use inheritance::InheritanceFilter;
pub use interval::IntervalFilter;
pub use known_variant::KnownVariantFilter;
pub use pathogenicity::PathogenicityFilter;
pub use priority_score::PriorityScoreFilter;
pub use quality::QualityFilter;
pub use regulatory_feature::RegulatoryFeatureFilter;
pub use variant_effect::VariantEffectFilter;

/// A predicate over a single variant.
pub trait VariantFilter: Send + Sync {
    fn filter_type(&self) -> FilterType;

    /// Pure pass/fail over the record and its current annotation.
    fn run_filter(&self, variant: &VariantRecord) -> FilterResult;

    /// Entry point used by the runner. Decorators override this to enrich the
    /// record before delegating to `run_filter`.
    fn evaluate(&self, variant: &mut VariantRecord) -> FilterResult {
        self.run_filter(variant)
    }
}

/// A predicate over a gene after aggregation.
pub trait GeneFilter: Send + Sync {
    fn filter_type(&self) -> FilterType;

    fn run_filter(&self, gene: &GeneRecord) -> FilterResult;
}
