//! Gene identifier allow-list.

use std::collections::BTreeSet;

use super::VariantFilter;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::gene::GeneId;
use crate::data::variant::VariantRecord;

#[derive(Clone, Debug, PartialEq)]
pub struct EntrezGeneIdFilter {
    gene_ids: BTreeSet<GeneId>,
}

impl EntrezGeneIdFilter {
    pub fn new(gene_ids: impl IntoIterator<Item = GeneId>) -> Self {
        Self {
            gene_ids: gene_ids.into_iter().collect(),
        }
    }

    pub fn gene_ids(&self) -> &BTreeSet<GeneId> {
        &self.gene_ids
    }
}

impl VariantFilter for EntrezGeneIdFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::EntrezGeneIdFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        FilterResult::from_bool(self.filter_type(), self.gene_ids.contains(&variant.gene_id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::variant::{Chromosome, VariantEffect};

    #[test]
    fn test_allow_list() {
        let filter = EntrezGeneIdFilter::new([GeneId(2263), GeneId(4920)]);
        let make = |id: u32| {
            VariantRecord::new(Chromosome::new(1), 1, "A", "G", GeneId(id), "G", VariantEffect::MissenseVariant, 10.0)
        };
        assert!(filter.run_filter(&make(2263)).passed());
        assert!(filter.run_filter(&make(4920)).passed());
        assert!(!filter.run_filter(&make(1)).passed());
    }
}
