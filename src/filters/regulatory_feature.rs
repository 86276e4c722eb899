//! Non-coding variants outside known regulatory elements.
//!
//! Intergenic, upstream and regulatory-region variants pass only when they
//! fall inside a regulatory feature attached to the record. Every other
//! effect passes untouched.

use super::VariantFilter;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::variant::{VariantEffect, VariantRecord};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegulatoryFeatureFilter;

impl RegulatoryFeatureFilter {
    pub fn new() -> Self {
        Self
    }

    fn is_non_coding_regulatory(effect: VariantEffect) -> bool {
        matches!(
            effect,
            VariantEffect::IntergenicVariant
                | VariantEffect::UpstreamGeneVariant
                | VariantEffect::RegulatoryRegionVariant
        )
    }
}

impl VariantFilter for RegulatoryFeatureFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::RegulatoryFeatureFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        let passed = !Self::is_non_coding_regulatory(variant.effect()) || variant.in_regulatory_feature();
        FilterResult::from_bool(self.filter_type(), passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::gene::GeneId;
    use crate::data::regulatory::{FeatureType, RegulatoryFeature};
    use crate::data::variant::Chromosome;

    fn variant(pos: u32, effect: VariantEffect) -> VariantRecord {
        VariantRecord::new(Chromosome::new(1), pos, "A", "T", GeneId(3), "G3", effect, 40.0)
    }

    fn enhancer() -> RegulatoryFeature {
        RegulatoryFeature::new(Chromosome::new(1), 10, 100, FeatureType::Enhancer)
    }

    #[test]
    fn test_non_coding_needs_overlapping_feature() {
        let filter = RegulatoryFeatureFilter::new();
        for effect in [
            VariantEffect::IntergenicVariant,
            VariantEffect::UpstreamGeneVariant,
            VariantEffect::RegulatoryRegionVariant,
        ] {
            assert!(!filter.run_filter(&variant(50, effect)).passed(), "{}", effect);
            let inside = variant(50, effect).with_regulatory_feature(enhancer());
            assert!(filter.run_filter(&inside).passed(), "{}", effect);
            let outside = variant(500, effect).with_regulatory_feature(enhancer());
            assert!(!filter.run_filter(&outside).passed(), "{}", effect);
        }
    }

    #[test]
    fn test_other_effects_pass() {
        let filter = RegulatoryFeatureFilter::new();
        let result = filter.run_filter(&variant(500, VariantEffect::MissenseVariant));
        assert!(result.passed());
        assert_eq!(result.filter_type(), FilterType::RegulatoryFeatureFilter);
        assert!(filter
            .run_filter(&variant(500, VariantEffect::DownstreamGeneVariant))
            .passed());
    }
}
