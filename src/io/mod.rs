//! # I/O Module
//!
//! File reading/writing boundaries and the reference data services.
//!
//! - `analysis`: analysis descriptions, batch files, variant records
//! - `data_source`: data-access traits and the in-memory JSON implementation
//! - `results`: JSON handoff of a finished run

pub mod analysis;
pub mod data_source;
pub mod results;

pub use analysis::{load_analysis, load_variants, read_batch_file};
pub use data_source::{InMemoryDataSource, PhenotypeDataService, VariantDataService};
pub use results::write_results;
