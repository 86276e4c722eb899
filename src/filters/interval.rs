//! Genomic interval membership.

use super::VariantFilter;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::interval::GeneticInterval;
use crate::data::variant::VariantRecord;

#[derive(Clone, Debug, PartialEq)]
pub struct IntervalFilter {
    interval: GeneticInterval,
}

impl IntervalFilter {
    pub fn new(interval: GeneticInterval) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> &GeneticInterval {
        &self.interval
    }
}

impl VariantFilter for IntervalFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::IntervalFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        FilterResult::from_bool(
            self.filter_type(),
            self.interval.contains(variant.chrom(), variant.pos()),
        )
    }
}
