//! # Data Module
//!
//! In-memory representations of the records flowing through an analysis.
//! This is the core "Model" layer.
//!
//! ## Ownership
//! - A `GeneRecord` owns its `VariantRecord`s. Variants only carry the gene
//!   identifier as a back-reference, never used for lifetime.
//! - Annotation, failed-step sets and priority results are append-only slots
//!   on the records, written exclusively by step execution.
//! - Reference data (phenotype mappings, animal models) is read-only and
//!   lives behind the data-access traits in `io::data_source`.

pub mod annotation;
pub mod filter_result;
pub mod gene;
pub mod interval;
pub mod pedigree;
pub mod phenotype;
pub mod priority;
pub mod regulatory;
pub mod variant;

// Re-export commonly used types
pub use annotation::{
    AnnotationRecord, FrequencyData, FrequencySource, PathogenicityData, PathogenicitySource,
    RsId,
};
pub use filter_result::{FailedSteps, FilterResult, FilterStatus, FilterType};
pub use gene::{GeneId, GeneRecord};
pub use interval::GeneticInterval;
pub use pedigree::{Genotype, ModeOfInheritance, Pedigree, PedigreeMember, Sex};
pub use phenotype::{AnimalModel, TermMapping};
pub use priority::{ModelMatch, PriorityResult, PriorityType};
pub use regulatory::{FeatureType, RegulatoryFeature};
pub use variant::{Chromosome, VariantEffect, VariantKey, VariantRecord};

/// Format the permitted values of an enumeration for error messages.
pub(crate) fn permitted<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
