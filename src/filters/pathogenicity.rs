//! # Pathogenicity Filter
//!
//! Two policies:
//! - `keep_non_pathogenic`: variants whose effect is not missense-class always
//!   PASS; missense variants must reach `min_score`.
//! - otherwise every variant must reach `min_score` with its pathogenicity
//!   score (predicted for missense, per-effect constant for the rest).
//!
//! A missense variant with no predictions uses the missense default, so
//! absent data resolves to a defined value rather than an error.

use super::VariantFilter;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::variant::VariantRecord;

pub const DEFAULT_MIN_PATHOGENICITY_SCORE: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct PathogenicityFilter {
    keep_non_pathogenic: bool,
    min_score: f32,
}

impl PathogenicityFilter {
    pub fn new(keep_non_pathogenic: bool) -> Self {
        Self {
            keep_non_pathogenic,
            min_score: DEFAULT_MIN_PATHOGENICITY_SCORE,
        }
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn keeps_non_pathogenic(&self) -> bool {
        self.keep_non_pathogenic
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }
}

impl VariantFilter for PathogenicityFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::PathogenicityFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        if self.keep_non_pathogenic && !variant.effect().is_missense_class() {
            return FilterResult::pass(self.filter_type());
        }
        FilterResult::from_bool(
            self.filter_type(),
            variant.pathogenicity_score() >= self.min_score,
        )
    }
}
