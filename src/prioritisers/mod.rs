//! # Prioritisers
//!
//! ## Role
//! Gene-level steps that attach a `PriorityResult` to every gene they see.
//! Unlike filters they never fail a gene; a later `PriorityScoreFilter`
//! thresholds their output.
//!
//! ## Sub-modules
//! - `phive`: cross-species phenotype similarity against mouse models
//!
//! Other scorers (e.g. gene-network random walk) are implemented outside the
//! crate and plug in through `AnalysisBuilder::with_step`.

pub mod phive;

use crate::data::gene::GeneRecord;
use crate::data::priority::PriorityType;

pub use phive::{PhivePrioritiser, QueryProfile};

pub trait Prioritiser: Send + Sync {
    fn priority_type(&self) -> PriorityType;

    /// Append exactly one `PriorityResult` of `priority_type()` to each gene.
    fn prioritise_genes(&self, genes: &mut [GeneRecord]);
}
