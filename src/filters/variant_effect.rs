//! Removal of variants by molecular effect.

use std::collections::BTreeSet;

use super::VariantFilter;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::variant::{VariantEffect, VariantRecord};

#[derive(Clone, Debug, PartialEq)]
pub struct VariantEffectFilter {
    off_target: BTreeSet<VariantEffect>,
}

impl VariantEffectFilter {
    pub fn new(off_target: impl IntoIterator<Item = VariantEffect>) -> Self {
        Self {
            off_target: off_target.into_iter().collect(),
        }
    }

    pub fn off_target_effects(&self) -> &BTreeSet<VariantEffect> {
        &self.off_target
    }
}

impl VariantFilter for VariantEffectFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::VariantEffectFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        FilterResult::from_bool(self.filter_type(), !self.off_target.contains(&variant.effect()))
    }
}
