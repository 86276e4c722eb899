//! # Phive: Cross-Species Phenotype Similarity
//!
//! ## Role
//! Score each gene by how well the phenotypes of its mouse models match the
//! patient's clinical phenotype terms.
//!
//! ## Algorithm
//! 1. Build a `QueryProfile` once per query: for every query term with at
//!    least one mapping, its best mapped model term (first encountered on
//!    ties), plus the baseline of a perfect model.
//!    - `max_best_score`: highest best-hit seen while building the baseline.
//!    - `average_best_score`: sum of every matched term's best score and the
//!      best reciprocal score of its best model term, over `2 * matched`.
//! 2. Per gene:
//!    - no known model: `NO_MODEL_SCORE`
//!    - no query term mapped at all: `NO_PHENOTYPE_HIT_SCORE`
//!    - otherwise, per model, a best-hits-rows-and-columns sweep over the
//!      model's phenotypes restricted to mapped model terms. Rows are query
//!      terms, columns model terms; non-zero best hits from both directions
//!      are summed, so terms shared by both directions count twice.
//!      `combined = 50 * (max / max_best + avg / average_best)`, clamped to
//!      100, each ratio contributing zero when its denominator is zero.
//!      The gene keeps the best model's `combined / 100`.
//!
//! The profile is read-only once built and shared by reference across the
//! rayon workers scoring genes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info_span, instrument};

use super::Prioritiser;
use crate::data::gene::GeneRecord;
use crate::data::phenotype::AnimalModel;
use crate::data::priority::{ModelMatch, PriorityResult, PriorityType};
use crate::io::data_source::PhenotypeDataService;

/// Score for a gene whose query terms have no mapping to any model term
pub const NO_PHENOTYPE_HIT_SCORE: f32 = 0.1;

/// Score for a gene without any known mouse model
pub const NO_MODEL_SCORE: f32 = 0.6;

const MAX_COMBINED_SCORE: f32 = 100.0;

/// Best mapping of a single query term
#[derive(Clone, Debug, PartialEq)]
struct BestHit {
    model_term: String,
    score: f32,
}

/// Mapping relation and baseline for one query, built once.
#[derive(Clone, Debug, Default)]
pub struct QueryProfile {
    /// Query terms with at least one mapping, in query order
    matched_terms: Vec<String>,
    /// query term -> model term -> similarity
    scores: HashMap<String, HashMap<String, f32>>,
    known_model_terms: HashSet<String>,
    max_best_score: f32,
    average_best_score: f32,
}

impl QueryProfile {
    /// Look up every query term and compute the baseline.
    ///
    /// A lookup error for a single term is logged and that term is treated
    /// as unmapped.
    pub fn build(query_terms: &[String], service: &dyn PhenotypeDataService) -> Self {
        let mut profile = Self::default();
        let mut best_hits: Vec<BestHit> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for term in query_terms {
            if !seen.insert(term.as_str()) {
                continue;
            }
            let mappings = match service.lookup_mapping(term) {
                Ok(mappings) => mappings,
                Err(e) => {
                    tracing::warn!(term = %term, error = %e, "Phenotype mapping lookup failed, treating as unmapped");
                    continue;
                }
            };

            let mut best: Option<BestHit> = None;
            for mapping in mappings {
                profile.known_model_terms.insert(mapping.model_term.clone());
                if best.as_ref().map_or(true, |b| mapping.score > b.score) {
                    best = Some(BestHit {
                        model_term: mapping.model_term.clone(),
                        score: mapping.score,
                    });
                }
                profile
                    .scores
                    .entry(term.clone())
                    .or_default()
                    .entry(mapping.model_term)
                    .or_insert(mapping.score);
            }
            if let Some(best) = best {
                profile.matched_terms.push(term.clone());
                best_hits.push(best);
            }
        }

        profile.compute_baseline(&best_hits);
        tracing::debug!(
            n_query_terms = query_terms.len(),
            n_matched = profile.matched_terms.len(),
            max_best_score = profile.max_best_score,
            average_best_score = profile.average_best_score,
            "Built phenotype query profile"
        );
        profile
    }

    fn compute_baseline(&mut self, best_hits: &[BestHit]) {
        let mut sum = 0.0f32;
        let mut count = 0usize;
        let mut max = 0.0f32;
        for hit in best_hits {
            sum += hit.score;
            count += 1;
            max = max.max(hit.score);

            let reciprocal = self.best_for_model_term(&hit.model_term);
            sum += reciprocal;
            count += 1;
            max = max.max(reciprocal);
        }
        self.max_best_score = max;
        self.average_best_score = if count > 0 { sum / count as f32 } else { 0.0 };
    }

    fn score(&self, query_term: &str, model_term: &str) -> Option<f32> {
        self.scores
            .get(query_term)
            .and_then(|row| row.get(model_term))
            .copied()
    }

    /// Best score of any matched query term against `model_term`
    fn best_for_model_term(&self, model_term: &str) -> f32 {
        self.matched_terms
            .iter()
            .filter_map(|q| self.score(q, model_term))
            .fold(0.0, f32::max)
    }

    pub fn matched_terms(&self) -> &[String] {
        &self.matched_terms
    }

    pub fn has_matches(&self) -> bool {
        !self.matched_terms.is_empty()
    }

    pub fn max_best_score(&self) -> f32 {
        self.max_best_score
    }

    pub fn average_best_score(&self) -> f32 {
        self.average_best_score
    }

    /// Combined score on [0, 100] for a single model, `None` when nothing in
    /// the sweep matched.
    pub fn score_model(&self, model: &AnimalModel) -> Option<f32> {
        let model_terms: Vec<&str> = model
            .phenotypes
            .iter()
            .map(String::as_str)
            .filter(|t| self.known_model_terms.contains(*t))
            .collect();
        let row_column_count = self.matched_terms.len() + model_terms.len();

        let mut max = 0.0f32;
        let mut sum = 0.0f32;
        for query_term in &self.matched_terms {
            let best = model_terms
                .iter()
                .filter_map(|m| self.score(query_term, m))
                .fold(0.0, f32::max);
            if best != 0.0 {
                sum += best;
                max = max.max(best);
            }
        }
        for model_term in &model_terms {
            let best = self.best_for_model_term(model_term);
            if best != 0.0 {
                sum += best;
                max = max.max(best);
            }
        }

        if sum == 0.0 {
            return None;
        }
        let avg = sum / row_column_count as f32;
        let combined = 50.0
            * (ratio(max, self.max_best_score) + ratio(avg, self.average_best_score));
        Some(combined.clamp(0.0, MAX_COMBINED_SCORE))
    }

    /// Gene score on [0, 1] and the model it came from.
    pub fn score_gene(&self, models: &[AnimalModel]) -> (f32, Option<ModelMatch>) {
        if models.is_empty() {
            return (NO_MODEL_SCORE, None);
        }
        if !self.has_matches() {
            return (NO_PHENOTYPE_HIT_SCORE, None);
        }
        let mut best_combined = 0.0f32;
        let mut best_model = None;
        for model in models {
            if let Some(combined) = self.score_model(model) {
                if combined > best_combined {
                    best_combined = combined;
                    best_model = Some(model);
                }
            }
        }
        let model_match = best_model.map(|m| ModelMatch {
            model_id: m.model_id.clone(),
            model_symbol: m.model_symbol.clone(),
        });
        (best_combined / MAX_COMBINED_SCORE, model_match)
    }
}

#[inline]
fn ratio(numerator: f32, denominator: f32) -> f32 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Mouse-model phenotype prioritiser
pub struct PhivePrioritiser {
    query_terms: Vec<String>,
    service: Arc<dyn PhenotypeDataService>,
}

impl PhivePrioritiser {
    pub fn new(query_terms: Vec<String>, service: Arc<dyn PhenotypeDataService>) -> Self {
        Self {
            query_terms,
            service,
        }
    }

    pub fn query_terms(&self) -> &[String] {
        &self.query_terms
    }
}

impl Prioritiser for PhivePrioritiser {
    fn priority_type(&self) -> PriorityType {
        PriorityType::PhivePriority
    }

    #[instrument(skip_all, fields(n_genes = genes.len()))]
    fn prioritise_genes(&self, genes: &mut [GeneRecord]) {
        let profile = info_span!("phive_baseline")
            .in_scope(|| QueryProfile::build(&self.query_terms, self.service.as_ref()));
        if !profile.has_matches() {
            tracing::info!("No query term maps to a model phenotype");
        }

        genes.par_iter_mut().for_each(|gene| {
            let models = match self.service.models_for_gene(gene.gene_id()) {
                Ok(models) => models,
                Err(e) => {
                    tracing::warn!(gene = %gene.gene_id(), error = %e, "Model lookup failed, treating as no model");
                    Vec::new()
                }
            };
            let (score, model) = profile.score_gene(&models);
            let mut result = PriorityResult::new(self.priority_type(), score);
            if let Some(model) = model {
                result = result.with_model(model);
            }
            gene.add_priority_result(result);
        });

        let n_with_model = genes
            .iter()
            .filter(|g| {
                g.priority_result(PriorityType::PhivePriority)
                    .is_some_and(|r| r.matched_model().is_some())
            })
            .count();
        tracing::info!(n_genes = genes.len(), n_with_model, "Phenotype scoring complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::gene::GeneId;
    use crate::data::phenotype::TermMapping;
    use crate::data::variant::{Chromosome, VariantEffect, VariantRecord};
    use crate::error::{Result, RexomiserError};
    use crate::io::data_source::InMemoryDataSource;

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn model(id: &str, phenotypes: &[&str]) -> AnimalModel {
        AnimalModel::new(id, format!("{}-sym", id), terms(phenotypes))
    }

    fn gene(id: u32) -> GeneRecord {
        GeneRecord::from_variant(VariantRecord::new(
            Chromosome::new(1),
            id,
            "A",
            "T",
            GeneId(id),
            format!("G{}", id),
            VariantEffect::MissenseVariant,
            100.0,
        ))
    }

    fn single_mapping() -> InMemoryDataSource {
        InMemoryDataSource::new().with_mapping("HP:1", "MP:1", 0.8)
    }

    #[test]
    fn test_baseline_single_mapping() {
        let profile = QueryProfile::build(&terms(&["HP:1"]), &single_mapping());
        assert_eq!(profile.max_best_score(), 0.8);
        assert!((profile.average_best_score() - 0.8).abs() < 1e-6);
        assert_eq!(profile.matched_terms(), &["HP:1".to_string()]);
    }

    #[test]
    fn test_perfect_model_scores_one() {
        let profile = QueryProfile::build(&terms(&["HP:1"]), &single_mapping());
        let (score, matched) = profile.score_gene(&[model("MGI:1", &["MP:1"])]);
        assert!((score - 1.0).abs() < 1e-6);
        assert_eq!(matched.map(|m| m.model_id), Some("MGI:1".to_string()));
    }

    #[test]
    fn test_unrelated_model_scores_zero() {
        let profile = QueryProfile::build(&terms(&["HP:1"]), &single_mapping());
        let (score, matched) = profile.score_gene(&[model("MGI:2", &["MP:2"])]);
        assert_eq!(score, 0.0);
        assert!(matched.is_none());
    }

    #[test]
    fn test_no_model_constant() {
        let profile = QueryProfile::build(&terms(&["HP:1"]), &single_mapping());
        assert_eq!(profile.score_gene(&[]).0, NO_MODEL_SCORE);

        let unmapped = QueryProfile::build(&terms(&["HP:9"]), &single_mapping());
        assert_eq!(unmapped.score_gene(&[]).0, NO_MODEL_SCORE);
    }

    #[test]
    fn test_no_phenotype_hit_constant() {
        let profile = QueryProfile::build(&terms(&["HP:9", "HP:10"]), &single_mapping());
        assert!(!profile.has_matches());
        assert_eq!(profile.max_best_score(), 0.0);
        assert_eq!(profile.average_best_score(), 0.0);
        let (score, _) = profile.score_gene(&[model("MGI:1", &["MP:1"])]);
        assert_eq!(score, NO_PHENOTYPE_HIT_SCORE);
    }

    #[test]
    fn test_ties_resolve_to_first_mapping() {
        let source = InMemoryDataSource::new()
            .with_mapping("HP:1", "MP:A", 0.5)
            .with_mapping("HP:1", "MP:B", 0.5)
            .with_mapping("HP:2", "MP:B", 0.9);
        let profile = QueryProfile::build(&terms(&["HP:1", "HP:2"]), &source);
        // HP:1 -> MP:A (0.5), reciprocal best for MP:A is 0.5
        // HP:2 -> MP:B (0.9), reciprocal best for MP:B is 0.9
        assert!((profile.average_best_score() - (0.5 + 0.5 + 0.9 + 0.9) / 4.0).abs() < 1e-6);
        assert_eq!(profile.max_best_score(), 0.9);
    }

    #[test]
    fn test_best_model_wins_and_is_recorded() {
        let source = InMemoryDataSource::new()
            .with_mapping("HP:1", "MP:1", 0.8)
            .with_mapping("HP:2", "MP:2", 0.4);
        let profile = QueryProfile::build(&terms(&["HP:1", "HP:2"]), &source);
        let models = [
            model("MGI:weak", &["MP:2"]),
            model("MGI:strong", &["MP:1", "MP:2"]),
            model("MGI:none", &["MP:99"]),
        ];
        let (score, matched) = profile.score_gene(&models);
        assert!(score > 0.0 && score <= 1.0);
        assert_eq!(matched.map(|m| m.model_id), Some("MGI:strong".to_string()));
    }

    #[test]
    fn test_combined_score_clamped() {
        // Baseline: max 0.9, average (0.9 + 0.9 + 0.1 + 0.1) / 4 = 0.5.
        // A model carrying only MP:1 averages 1.8 / 3 = 0.6, so the
        // unclamped score is 50 * (1 + 1.2) = 110.
        let source = InMemoryDataSource::new()
            .with_mapping("HP:1", "MP:1", 0.9)
            .with_mapping("HP:2", "MP:2", 0.1);
        let profile = QueryProfile::build(&terms(&["HP:1", "HP:2"]), &source);
        assert!((profile.average_best_score() - 0.5).abs() < 1e-6);

        let only_best = model("MGI:1", &["MP:1"]);
        assert_eq!(profile.score_model(&only_best), Some(MAX_COMBINED_SCORE));
        let (score, matched) = profile.score_gene(&[only_best]);
        assert_eq!(score, 1.0);
        assert_eq!(matched.map(|m| m.model_id), Some("MGI:1".to_string()));
    }

    struct FlakyService {
        inner: InMemoryDataSource,
    }

    impl PhenotypeDataService for FlakyService {
        fn lookup_mapping(&self, query_term: &str) -> Result<Vec<TermMapping>> {
            if query_term == "HP:broken" {
                return Err(RexomiserError::data_access("timeout"));
            }
            self.inner.lookup_mapping(query_term)
        }

        fn models_for_gene(&self, gene_id: GeneId) -> Result<Vec<AnimalModel>> {
            if gene_id == GeneId(13) {
                return Err(RexomiserError::data_access("timeout"));
            }
            self.inner.models_for_gene(gene_id)
        }
    }

    #[test]
    fn test_prioritise_genes_recovers_from_lookup_errors() {
        let inner = single_mapping()
            .with_model(GeneId(2), model("MGI:2", &["MP:1"]))
            .with_model(GeneId(3), model("MGI:3", &["MP:2"]));
        let service = Arc::new(FlakyService { inner });
        let prioritiser = PhivePrioritiser::new(terms(&["HP:broken", "HP:1"]), service);

        let mut genes = vec![gene(2), gene(3), gene(13), gene(20)];
        prioritiser.prioritise_genes(&mut genes);

        let scores: Vec<f32> = genes
            .iter()
            .map(|g| g.priority_result(PriorityType::PhivePriority).map(|r| r.score()).unwrap())
            .collect();
        assert!((scores[0] - 1.0).abs() < 1e-6);
        assert_eq!(scores[1], 0.0);
        assert_eq!(scores[2], NO_MODEL_SCORE);
        assert_eq!(scores[3], NO_MODEL_SCORE);
        assert!(genes.iter().all(|g| g.priority_results().len() == 1));
    }

    #[test]
    fn test_rescoring_is_deterministic() {
        let source = InMemoryDataSource::new()
            .with_mapping("HP:1", "MP:1", 0.8)
            .with_mapping("HP:1", "MP:2", 0.3)
            .with_mapping("HP:2", "MP:2", 0.6);
        let query = terms(&["HP:1", "HP:2"]);
        let models = [model("A", &["MP:2"]), model("B", &["MP:1", "MP:2"])];
        let first = QueryProfile::build(&query, &source).score_gene(&models);
        let second = QueryProfile::build(&query, &source).score_gene(&models);
        assert_eq!(first, second);
    }
}
