//! Gene-level threshold on the score of a prioritiser that already ran.

use super::GeneFilter;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::gene::GeneRecord;
use crate::data::priority::PriorityType;

#[derive(Clone, Debug, PartialEq)]
pub struct PriorityScoreFilter {
    priority_type: PriorityType,
    min_priority_score: f32,
}

impl PriorityScoreFilter {
    pub fn new(priority_type: PriorityType, min_priority_score: f32) -> Self {
        Self {
            priority_type,
            min_priority_score,
        }
    }

    pub fn priority_type(&self) -> PriorityType {
        self.priority_type
    }

    pub fn min_priority_score(&self) -> f32 {
        self.min_priority_score
    }
}

impl GeneFilter for PriorityScoreFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::PriorityScoreFilter
    }

    /// A gene without a result for the referenced prioritiser FAILs.
    fn run_filter(&self, gene: &GeneRecord) -> FilterResult {
        let passed = gene
            .priority_result(self.priority_type)
            .is_some_and(|r| r.score() >= self.min_priority_score);
        FilterResult::from_bool(self.filter_type(), passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::gene::GeneId;
    use crate::data::priority::PriorityResult;
    use crate::data::variant::{Chromosome, VariantEffect, VariantRecord};

    fn gene() -> GeneRecord {
        GeneRecord::from_variant(VariantRecord::new(
            Chromosome::new(1),
            1,
            "A",
            "C",
            GeneId(1),
            "G1",
            VariantEffect::MissenseVariant,
            50.0,
        ))
    }

    #[test]
    fn test_threshold_on_named_prioritiser() {
        let filter = PriorityScoreFilter::new(PriorityType::PhivePriority, 0.5);
        let mut g = gene();
        assert!(!filter.run_filter(&g).passed());

        g.add_priority_result(PriorityResult::new(PriorityType::OmimPriority, 1.0));
        assert!(!filter.run_filter(&g).passed());

        g.add_priority_result(PriorityResult::new(PriorityType::PhivePriority, 0.5));
        assert!(filter.run_filter(&g).passed());

        let strict = PriorityScoreFilter::new(PriorityType::PhivePriority, 0.51);
        assert!(!strict.run_filter(&g).passed());
    }
}
