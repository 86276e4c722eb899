//! # Frequency Filter
//!
//! FAIL when any attached population frequency exceeds `max_frequency`
//! (percent). Variants without frequency data always PASS, unless the filter
//! is configured to remove every variant already catalogued somewhere
//! (a known frequency in any source, or a dbSNP identifier).

use super::VariantFilter;
use crate::data::annotation::FrequencyData;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::variant::VariantRecord;

#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyFilter {
    max_frequency: f32,
    fail_all_known: bool,
}

impl FrequencyFilter {
    pub fn new(max_frequency: f32, fail_all_known: bool) -> Self {
        Self {
            max_frequency,
            fail_all_known,
        }
    }

    pub fn max_frequency(&self) -> f32 {
        self.max_frequency
    }

    pub fn fails_all_known(&self) -> bool {
        self.fail_all_known
    }

    pub fn passes(&self, data: &FrequencyData) -> bool {
        if self.fail_all_known && data.is_represented_in_database() {
            return false;
        }
        data.frequencies().all(|(_, freq)| freq <= self.max_frequency)
    }
}

impl VariantFilter for FrequencyFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::FrequencyFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        FilterResult::from_bool(self.filter_type(), self.passes(variant.frequency_data()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::annotation::{FrequencySource, RsId};

    const THRESHOLD: f32 = 0.1;
    const PASS_FREQ: f32 = THRESHOLD - 0.02;
    const FAIL_FREQ: f32 = THRESHOLD + 1.0;

    fn passing_sets() -> Vec<FrequencyData> {
        vec![
            FrequencyData::new().with_frequency(FrequencySource::EspAll, PASS_FREQ),
            FrequencyData::new().with_frequency(FrequencySource::EspAfricanAmerican, PASS_FREQ),
            FrequencyData::new().with_frequency(FrequencySource::EspEuropeanAmerican, PASS_FREQ),
            FrequencyData::new()
                .with_rs_id(RsId(121918506))
                .with_frequency(FrequencySource::ThousandGenomes, PASS_FREQ),
        ]
    }

    #[test]
    fn test_filter_type() {
        assert_eq!(
            FrequencyFilter::new(THRESHOLD, false).filter_type(),
            FilterType::FrequencyFilter
        );
    }

    #[test]
    fn test_threshold() {
        let filter = FrequencyFilter::new(THRESHOLD, false);
        for data in passing_sets() {
            assert!(filter.passes(&data));
        }
        let failing = FrequencyData::new()
            .with_frequency(FrequencySource::EspAll, FAIL_FREQ)
            .with_frequency(FrequencySource::ExacFinnish, PASS_FREQ);
        assert!(!filter.passes(&failing));
    }

    #[test]
    fn test_no_frequency_data_always_passes() {
        for threshold in [0.0, THRESHOLD, 100.0] {
            assert!(FrequencyFilter::new(threshold, false).passes(&FrequencyData::new()));
            assert!(FrequencyFilter::new(threshold, true).passes(&FrequencyData::new()));
        }
    }

    #[test]
    fn test_fail_all_known() {
        let filter = FrequencyFilter::new(THRESHOLD, true);
        for data in passing_sets() {
            assert!(!filter.passes(&data));
        }
        assert!(!filter.passes(&FrequencyData::new().with_rs_id(RsId(1))));
    }
}
