//! Variant call quality threshold.

use super::VariantFilter;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::variant::VariantRecord;

#[derive(Clone, Debug, PartialEq)]
pub struct QualityFilter {
    min_quality: f64,
}

impl QualityFilter {
    pub fn new(min_quality: f64) -> Self {
        Self { min_quality }
    }

    pub fn min_quality(&self) -> f64 {
        self.min_quality
    }
}

impl VariantFilter for QualityFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::QualityFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        FilterResult::from_bool(self.filter_type(), variant.quality() >= self.min_quality)
    }
}
