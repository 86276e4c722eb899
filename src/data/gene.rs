//! # Gene Records
//!
//! Genes are built during aggregation from the variants that survived the
//! variant phase and then carried through the gene-level steps.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter_result::{FailedSteps, FilterResult, FilterType};
use super::priority::{PriorityResult, PriorityType};
use super::variant::VariantRecord;
use crate::error::{Result, RexomiserError};

/// Entrez gene identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneId(pub u32);

impl GeneId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl From<u32> for GeneId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate gene with its variants and prioritisation results
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneRecord {
    gene_id: GeneId,
    symbol: String,
    variants: Vec<VariantRecord>,
    priority_results: Vec<PriorityResult>,
    failed_steps: FailedSteps,
    priority_score: f32,
    filter_score: f32,
    combined_score: f32,
}

impl GeneRecord {
    /// Start a gene from its first variant. A gene is never empty.
    pub fn from_variant(variant: VariantRecord) -> Self {
        Self {
            gene_id: variant.gene_id(),
            symbol: variant.gene_symbol().to_string(),
            variants: vec![variant],
            priority_results: Vec::new(),
            failed_steps: FailedSteps::new(),
            priority_score: 1.0,
            filter_score: 0.0,
            combined_score: 0.0,
        }
    }

    /// Add a variant belonging to this gene.
    ///
    /// A variant with another gene identifier is an aggregation bug and
    /// surfaces as an invariant violation.
    pub fn add_variant(&mut self, variant: VariantRecord) -> Result<()> {
        if variant.gene_id() != self.gene_id {
            return Err(RexomiserError::invariant(format!(
                "variant {} with gene {} added to gene {}",
                variant.key(),
                variant.gene_id(),
                self.gene_id
            )));
        }
        self.variants.push(variant);
        Ok(())
    }

    pub fn gene_id(&self) -> GeneId {
        self.gene_id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn variants(&self) -> &[VariantRecord] {
        &self.variants
    }

    pub fn passing_variants(&self) -> impl Iterator<Item = &VariantRecord> {
        self.variants.iter().filter(|v| v.passes_filters())
    }

    pub fn n_passing_variants(&self) -> usize {
        self.passing_variants().count()
    }

    pub fn priority_results(&self) -> &[PriorityResult] {
        &self.priority_results
    }

    /// Result of the first prioritiser of the given type that ran on this gene
    pub fn priority_result(&self, priority_type: PriorityType) -> Option<&PriorityResult> {
        self.priority_results
            .iter()
            .find(|r| r.priority_type() == priority_type)
    }

    pub fn add_priority_result(&mut self, result: PriorityResult) {
        self.priority_results.push(result);
    }

    pub fn failed_steps(&self) -> &FailedSteps {
        &self.failed_steps
    }

    pub fn add_filter_result(&mut self, result: FilterResult) {
        if !result.passed() {
            self.failed_steps.insert(result.filter_type());
        }
    }

    pub fn failed(&self, filter_type: FilterType) -> bool {
        self.failed_steps.contains(filter_type)
    }

    pub fn passes_filters(&self) -> bool {
        self.failed_steps.is_empty()
    }

    pub fn priority_score(&self) -> f32 {
        self.priority_score
    }

    pub fn filter_score(&self) -> f32 {
        self.filter_score
    }

    pub fn combined_score(&self) -> f32 {
        self.combined_score
    }

    pub(crate) fn set_scores(&mut self, priority_score: f32, filter_score: f32, combined_score: f32) {
        self.priority_score = priority_score;
        self.filter_score = filter_score;
        self.combined_score = combined_score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::variant::{Chromosome, VariantEffect};

    fn variant(gene: u32, pos: u32) -> VariantRecord {
        VariantRecord::new(
            Chromosome::new(2),
            pos,
            "A",
            "G",
            GeneId(gene),
            format!("GENE{}", gene),
            VariantEffect::MissenseVariant,
            60.0,
        )
    }

    #[test]
    fn test_gene_from_variant() {
        let gene = GeneRecord::from_variant(variant(42, 100));
        assert_eq!(gene.gene_id(), GeneId(42));
        assert_eq!(gene.symbol(), "GENE42");
        assert_eq!(gene.variants().len(), 1);
        assert!(gene.passes_filters());
    }

    #[test]
    fn test_add_variant_rejects_foreign_gene() {
        let mut gene = GeneRecord::from_variant(variant(42, 100));
        assert!(gene.add_variant(variant(42, 200)).is_ok());
        let err = gene.add_variant(variant(7, 300)).unwrap_err();
        assert!(matches!(err, RexomiserError::Invariant { .. }));
        assert_eq!(gene.variants().len(), 2);
    }

    #[test]
    fn test_priority_result_lookup() {
        let mut gene = GeneRecord::from_variant(variant(1, 1));
        assert!(gene.priority_result(PriorityType::PhivePriority).is_none());
        gene.add_priority_result(PriorityResult::new(PriorityType::PhivePriority, 0.75));
        assert_eq!(
            gene.priority_result(PriorityType::PhivePriority).map(|r| r.score()),
            Some(0.75)
        );
    }
}
