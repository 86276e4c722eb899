//! # Priority Results
//!
//! One `PriorityResult` is appended to a gene per prioritiser that ran on it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prioritiser identity, also used by the priority score filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityType {
    PhivePriority,
    HiphivePriority,
    OmimPriority,
    PhenixPriority,
    ExomewalkerPriority,
}

impl PriorityType {
    pub const ALL: [PriorityType; 5] = [
        PriorityType::PhivePriority,
        PriorityType::HiphivePriority,
        PriorityType::OmimPriority,
        PriorityType::PhenixPriority,
        PriorityType::ExomewalkerPriority,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PriorityType::PhivePriority => "PHIVE_PRIORITY",
            PriorityType::HiphivePriority => "HIPHIVE_PRIORITY",
            PriorityType::OmimPriority => "OMIM_PRIORITY",
            PriorityType::PhenixPriority => "PHENIX_PRIORITY",
            PriorityType::ExomewalkerPriority => "EXOMEWALKER_PRIORITY",
        }
    }
}

impl fmt::Display for PriorityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("permitted types are: {}", super::permitted(&Self::ALL)))
    }
}

/// Animal model that produced a phenotype score
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMatch {
    pub model_id: String,
    pub model_symbol: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityResult {
    priority_type: PriorityType,
    /// Score on [0, 1]
    score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matched_model: Option<ModelMatch>,
}

impl PriorityResult {
    pub fn new(priority_type: PriorityType, score: f32) -> Self {
        Self {
            priority_type,
            score,
            matched_model: None,
        }
    }

    pub fn with_model(mut self, model: ModelMatch) -> Self {
        self.matched_model = Some(model);
        self
    }

    pub fn priority_type(&self) -> PriorityType {
        self.priority_type
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn matched_model(&self) -> Option<&ModelMatch> {
        self.matched_model.as_ref()
    }
}
