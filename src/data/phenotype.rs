//! # Phenotype Reference Data
//!
//! Query-to-model term mappings and animal models as returned by the
//! phenotype data service. Read-only once loaded.

use serde::{Deserialize, Serialize};

/// Similarity between a clinical (query) term and a model-organism term
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermMapping {
    pub query_term: String,
    pub model_term: String,
    /// Similarity on [0, 1]
    pub score: f32,
}

impl TermMapping {
    pub fn new(query_term: impl Into<String>, model_term: impl Into<String>, score: f32) -> Self {
        Self {
            query_term: query_term.into(),
            model_term: model_term.into(),
            score,
        }
    }
}

/// A model organism disrupting the gene, with its annotated phenotypes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalModel {
    pub model_id: String,
    pub model_symbol: String,
    pub phenotypes: Vec<String>,
}

impl AnimalModel {
    pub fn new(
        model_id: impl Into<String>,
        model_symbol: impl Into<String>,
        phenotypes: Vec<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            model_symbol: model_symbol.into(),
            phenotypes,
        }
    }
}
