//! # Inheritance Mode Filter
//!
//! FAIL variants whose genotype pattern across the pedigree is incompatible
//! with the configured mode of inheritance. `NO_CALL` never rules a variant
//! out. Recessive modes accept heterozygous affected members since a second
//! hit elsewhere in the gene can complete a compound heterozygote.
//!
//! X-linked modes require the variant to lie on chromosome X. Males carrying
//! the allele are treated as hemizygous regardless of the called genotype.

use super::VariantFilter;
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::pedigree::{Genotype, ModeOfInheritance, Pedigree, PedigreeMember, Sex};
use crate::data::variant::VariantRecord;

#[derive(Clone, Debug, PartialEq)]
pub struct InheritanceFilter {
    pedigree: Pedigree,
    mode: ModeOfInheritance,
}

impl InheritanceFilter {
    pub fn new(pedigree: Pedigree, mode: ModeOfInheritance) -> Self {
        Self { pedigree, mode }
    }

    pub fn mode(&self) -> ModeOfInheritance {
        self.mode
    }

    pub fn pedigree(&self) -> &Pedigree {
        &self.pedigree
    }

    fn is_compatible(&self, variant: &VariantRecord) -> bool {
        if self.mode.is_x_linked() && !variant.chrom().is_x() {
            return false;
        }
        self.pedigree.members.iter().all(|member| {
            let gt = variant.genotype(&member.name);
            gt == Genotype::NoCall || self.member_compatible(member, gt)
        })
    }

    fn member_compatible(&self, member: &PedigreeMember, gt: Genotype) -> bool {
        match (self.mode, member.affected) {
            (ModeOfInheritance::AutosomalDominant, true) => gt == Genotype::Het,
            (ModeOfInheritance::AutosomalDominant, false) => !gt.carries_alt(),
            (ModeOfInheritance::AutosomalRecessive, true) => gt.carries_alt(),
            (ModeOfInheritance::AutosomalRecessive, false) => gt != Genotype::HomVar,
            (ModeOfInheritance::XDominant | ModeOfInheritance::XRecessive, true) => {
                gt.carries_alt()
            }
            (ModeOfInheritance::XDominant | ModeOfInheritance::XRecessive, false) => {
                member.sex != Sex::Male || gt == Genotype::HomRef
            }
            (ModeOfInheritance::Undefined, _) => true,
        }
    }
}

impl VariantFilter for InheritanceFilter {
    fn filter_type(&self) -> FilterType {
        FilterType::InheritanceFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        FilterResult::from_bool(self.filter_type(), self.is_compatible(variant))
    }
}
