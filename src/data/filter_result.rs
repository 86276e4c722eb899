//! # Filter Results
//!
//! The outcome every filtering step produces for a record, and the
//! append-only set of failed step identifiers carried by variants and genes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable identifier of a filtering step. Used as the key in failed-step
/// sets and in reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    QualityFilter,
    IntervalFilter,
    EntrezGeneIdFilter,
    VariantEffectFilter,
    KnownVariantFilter,
    FrequencyFilter,
    PathogenicityFilter,
    InheritanceFilter,
    PriorityScoreFilter,
    RegulatoryFeatureFilter,
}

impl FilterType {
    pub const ALL: [FilterType; 10] = [
        FilterType::QualityFilter,
        FilterType::IntervalFilter,
        FilterType::EntrezGeneIdFilter,
        FilterType::VariantEffectFilter,
        FilterType::KnownVariantFilter,
        FilterType::FrequencyFilter,
        FilterType::PathogenicityFilter,
        FilterType::InheritanceFilter,
        FilterType::PriorityScoreFilter,
        FilterType::RegulatoryFeatureFilter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::QualityFilter => "QUALITY_FILTER",
            FilterType::IntervalFilter => "INTERVAL_FILTER",
            FilterType::EntrezGeneIdFilter => "ENTREZ_GENE_ID_FILTER",
            FilterType::VariantEffectFilter => "VARIANT_EFFECT_FILTER",
            FilterType::KnownVariantFilter => "KNOWN_VARIANT_FILTER",
            FilterType::FrequencyFilter => "FREQUENCY_FILTER",
            FilterType::PathogenicityFilter => "PATHOGENICITY_FILTER",
            FilterType::InheritanceFilter => "INHERITANCE_FILTER",
            FilterType::PriorityScoreFilter => "PRIORITY_SCORE_FILTER",
            FilterType::RegulatoryFeatureFilter => "REGULATORY_FEATURE_FILTER",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("permitted values are: {}", super::permitted(&Self::ALL)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterStatus {
    Pass,
    Fail,
}

/// Pass/fail outcome of one step for one record, tagged with the step that produced it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterResult {
    filter_type: FilterType,
    status: FilterStatus,
}

impl FilterResult {
    pub fn pass(filter_type: FilterType) -> Self {
        Self {
            filter_type,
            status: FilterStatus::Pass,
        }
    }

    pub fn fail(filter_type: FilterType) -> Self {
        Self {
            filter_type,
            status: FilterStatus::Fail,
        }
    }

    /// Pass when `passed` holds, fail otherwise
    pub fn from_bool(filter_type: FilterType, passed: bool) -> Self {
        if passed {
            Self::pass(filter_type)
        } else {
            Self::fail(filter_type)
        }
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn status(&self) -> FilterStatus {
        self.status
    }

    pub fn passed(&self) -> bool {
        self.status == FilterStatus::Pass
    }
}

/// Set of step identifiers a record has failed.
///
/// Membership only grows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailedSteps(BTreeSet<FilterType>);

impl FailedSteps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. Returns false if the step had already failed.
    pub fn insert(&mut self, filter_type: FilterType) -> bool {
        self.0.insert(filter_type)
    }

    pub fn contains(&self, filter_type: FilterType) -> bool {
        self.0.contains(&filter_type)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = FilterType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<FilterType> for FailedSteps {
    fn from_iter<I: IntoIterator<Item = FilterType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
