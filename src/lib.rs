//! # Rexomiser Library
//!
//! Exome variant prioritisation: a configurable chain of variant and gene
//! filters followed by cross-species phenotype similarity scoring.
//!
//! ## Modules
//! - `config`: CLI argument parsing and validation
//! - `data`: Variant, gene, annotation and pedigree records
//! - `error`: Error types and result aliases
//! - `filters`: Variant and gene filter steps, annotation data providers
//! - `io`: Analysis documents, variant records, reference data services
//! - `pipelines`: Analysis building, phase execution, scoring, batches
//! - `prioritisers`: Gene prioritisers (Phive)
//! - `utils`: Telemetry and thread pools

pub mod config;
pub mod data;
pub mod error;
pub mod filters;
pub mod io;
pub mod pipelines;
pub mod prioritisers;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use data::{
    FilterResult, FilterType, GeneId, GeneRecord, PriorityResult, PriorityType, VariantRecord,
};
pub use error::{Result, RexomiserError};
pub use filters::{GeneFilter, VariantFilter};
pub use io::data_source::{InMemoryDataSource, PhenotypeDataService, VariantDataService};
pub use prioritisers::{PhivePrioritiser, Prioritiser};

pub use pipelines::{AnalysisBuilder, AnalysisResults, AnalysisRunner, BatchRunner};
