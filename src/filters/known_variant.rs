//! Removal of variants already catalogued in a frequency database or dbSNP.

use super::VariantFilter;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::variant::VariantRecord;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KnownVariantFilter;

impl KnownVariantFilter {
    pub fn new() -> Self {
        Self
    }
}

impl VariantFilter for KnownVariantFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::KnownVariantFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        FilterResult::from_bool(
            self.filter_type(),
            !variant.frequency_data().is_represented_in_database(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::annotation::{FrequencyData, FrequencySource, RsId};
    use crate::data::gene::GeneId;
    use crate::data::variant::{Chromosome, VariantEffect};

    fn variant(data: FrequencyData) -> VariantRecord {
        VariantRecord::new(Chromosome::new(3), 10, "G", "A", GeneId(9), "G9", VariantEffect::StopGained, 99.0)
            .with_frequency_data(data)
    }

    #[test]
    fn test_known_variants_fail() {
        let filter = KnownVariantFilter::new();
        assert!(filter.run_filter(&variant(FrequencyData::new())).passed());
        assert!(!filter.run_filter(&variant(FrequencyData::new().with_rs_id(RsId(42)))).passed());
        let seen = FrequencyData::new().with_frequency(FrequencySource::Local, 0.001);
        assert!(!filter.run_filter(&variant(seen)).passed());
    }
}
