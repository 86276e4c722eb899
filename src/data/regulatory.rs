//! # Regulatory Features
//!
//! Non-coding genomic elements (enhancers, promoters, binding sites) attached
//! to a variant record. Coordinates are 1-based and both bounds inclusive.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::variant::{Chromosome, VariantEffect};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    Enhancer,
    Promoter,
    PromoterFlankingRegion,
    TfBindingSite,
    CtcfBindingSite,
    OpenChromatin,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryFeature {
    pub chrom: Chromosome,
    pub start: u32,
    pub end: u32,
    pub feature_type: FeatureType,
}

impl RegulatoryFeature {
    pub fn new(chrom: Chromosome, start: u32, end: u32, feature_type: FeatureType) -> Self {
        Self {
            chrom,
            start,
            end,
            feature_type,
        }
    }

    pub fn overlaps(&self, chrom: Chromosome, pos: u32) -> bool {
        chrom == self.chrom && (self.start..=self.end).contains(&pos)
    }

    /// Effect assigned to a variant falling inside this feature
    pub fn variant_effect(&self) -> VariantEffect {
        VariantEffect::RegulatoryRegionVariant
    }
}

impl fmt::Display for RegulatoryFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} chr{}:{}-{}", self.feature_type, self.chrom, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_inclusive() {
        let enhancer = RegulatoryFeature::new(Chromosome::new(1), 10, 100, FeatureType::Enhancer);
        assert!(enhancer.overlaps(Chromosome::new(1), 10));
        assert!(enhancer.overlaps(Chromosome::new(1), 100));
        assert!(!enhancer.overlaps(Chromosome::new(1), 101));
        assert!(!enhancer.overlaps(Chromosome::new(2), 50));
        assert_eq!(enhancer.variant_effect(), VariantEffect::RegulatoryRegionVariant);
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{"chrom": "chr1", "start": 10, "end": 100, "featureType": "ENHANCER"}"#;
        let feature: RegulatoryFeature = serde_json::from_str(json).unwrap();
        assert_eq!(
            feature,
            RegulatoryFeature::new(Chromosome::new(1), 10, 100, FeatureType::Enhancer)
        );
    }
}
