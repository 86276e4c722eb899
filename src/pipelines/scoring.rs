//! # Gene Scoring and Ranking
//!
//! - `priority_score`: product of the gene's priority results, 1 when none
//! - `filter_score`: best variant score over passing variants, 0 when none
//! - `combined_score`: mean of the two
//!
//! `RankBased` replaces the priority component with `1 - rank / n`, where
//! `rank` counts genes with a strictly higher raw priority score, so tied
//! genes share a rank and the top gene gets 1.

use std::cmp::Ordering;

use super::analysis::ScoringMode;
use crate::data::gene::GeneRecord;

pub fn raw_priority_score(gene: &GeneRecord) -> f32 {
    gene.priority_results().iter().map(|r| r.score()).product()
}

pub fn filter_score(gene: &GeneRecord) -> f32 {
    gene.passing_variants()
        .map(|v| v.variant_score())
        .fold(0.0, f32::max)
}

/// Assign priority, filter and combined scores to every gene.
pub fn score_genes(genes: &mut [GeneRecord], mode: ScoringMode) {
    let raw: Vec<f32> = genes.iter().map(raw_priority_score).collect();
    let priority: Vec<f32> = match mode {
        ScoringMode::RawScore => raw,
        ScoringMode::RankBased => rank_scores(&raw),
    };
    for (gene, priority_score) in genes.iter_mut().zip(priority) {
        let filter_score = filter_score(gene);
        let combined = (priority_score + filter_score) / 2.0;
        gene.set_scores(priority_score, filter_score, combined);
    }
}

fn rank_scores(raw: &[f32]) -> Vec<f32> {
    let n = raw.len() as f32;
    let mut sorted: Vec<f32> = raw.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    raw.iter()
        .map(|score| {
            let rank = sorted.partition_point(|s| s > score);
            1.0 - rank as f32 / n
        })
        .collect()
}

/// Descending combined score, then symbol, then gene id.
pub fn compare_genes(a: &GeneRecord, b: &GeneRecord) -> Ordering {
    b.combined_score()
        .total_cmp(&a.combined_score())
        .then_with(|| a.symbol().cmp(b.symbol()))
        .then_with(|| a.gene_id().cmp(&b.gene_id()))
}

pub fn rank_genes(genes: &mut [GeneRecord]) {
    genes.sort_by(compare_genes);
}
