//! # Variant Records
//!
//! ## Role
//! A single called, effect-annotated variant as it moves through the
//! variant-level filter chain.
//!
//! ## Contract
//! - Positional identity (chromosome, position, ref, alt), gene identifier,
//!   molecular effect and quality are fixed at construction.
//! - Annotation slots (frequency, pathogenicity) are filled lazily by the
//!   annotation data provider. Regulatory features arrive with the record.
//! - The failed-step set is append-only. An empty set means "passing".

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::annotation::{FrequencyData, PathogenicityData};
use super::filter_result::{FailedSteps, FilterResult, FilterType};
use super::gene::GeneId;
use super::pedigree::Genotype;
use super::regulatory::RegulatoryFeature;

/// Chromosome number (1-22, 23=X, 24=Y, 25=MT)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chromosome(pub u8);

impl Chromosome {
    pub const X: Chromosome = Chromosome(23);
    pub const Y: Chromosome = Chromosome(24);
    pub const MT: Chromosome = Chromosome(25);

    pub fn new(idx: u8) -> Self {
        Self(idx)
    }

    pub fn is_x(self) -> bool {
        self == Self::X
    }
}

impl FromStr for Chromosome {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        let name = name
            .strip_prefix("chr")
            .or_else(|| name.strip_prefix("CHR"))
            .unwrap_or(name);
        match name {
            "X" | "x" => Ok(Self::X),
            "Y" | "y" => Ok(Self::Y),
            "M" | "MT" | "m" | "mt" => Ok(Self::MT),
            _ => match name.parse::<u8>() {
                Ok(n) if (1..=25).contains(&n) => Ok(Self(n)),
                _ => Err(format!("unrecognised chromosome '{}'", s)),
            },
        }
    }
}

impl TryFrom<String> for Chromosome {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Chromosome> for String {
    fn from(chrom: Chromosome) -> String {
        chrom.to_string()
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            23 => f.write_str("X"),
            24 => f.write_str("Y"),
            25 => f.write_str("MT"),
            n => write!(f, "{}", n),
        }
    }
}

/// Sequence Ontology effect of a variant on its gene, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariantEffect {
    FrameshiftElongation,
    FrameshiftTruncation,
    FrameshiftVariant,
    StopGained,
    StopLost,
    StartLost,
    SpliceAcceptorVariant,
    SpliceDonorVariant,
    MissenseVariant,
    InframeInsertion,
    DisruptiveInframeInsertion,
    InframeDeletion,
    DisruptiveInframeDeletion,
    SpliceRegionVariant,
    StopRetainedVariant,
    SynonymousVariant,
    FivePrimeUtrVariant,
    ThreePrimeUtrVariant,
    CodingTranscriptIntronVariant,
    NonCodingTranscriptExonVariant,
    NonCodingTranscriptIntronVariant,
    UpstreamGeneVariant,
    DownstreamGeneVariant,
    IntergenicVariant,
    RegulatoryRegionVariant,
    SequenceVariant,
}

impl VariantEffect {
    pub const ALL: [VariantEffect; 26] = [
        VariantEffect::FrameshiftElongation,
        VariantEffect::FrameshiftTruncation,
        VariantEffect::FrameshiftVariant,
        VariantEffect::StopGained,
        VariantEffect::StopLost,
        VariantEffect::StartLost,
        VariantEffect::SpliceAcceptorVariant,
        VariantEffect::SpliceDonorVariant,
        VariantEffect::MissenseVariant,
        VariantEffect::InframeInsertion,
        VariantEffect::DisruptiveInframeInsertion,
        VariantEffect::InframeDeletion,
        VariantEffect::DisruptiveInframeDeletion,
        VariantEffect::SpliceRegionVariant,
        VariantEffect::StopRetainedVariant,
        VariantEffect::SynonymousVariant,
        VariantEffect::FivePrimeUtrVariant,
        VariantEffect::ThreePrimeUtrVariant,
        VariantEffect::CodingTranscriptIntronVariant,
        VariantEffect::NonCodingTranscriptExonVariant,
        VariantEffect::NonCodingTranscriptIntronVariant,
        VariantEffect::UpstreamGeneVariant,
        VariantEffect::DownstreamGeneVariant,
        VariantEffect::IntergenicVariant,
        VariantEffect::RegulatoryRegionVariant,
        VariantEffect::SequenceVariant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantEffect::FrameshiftElongation => "FRAMESHIFT_ELONGATION",
            VariantEffect::FrameshiftTruncation => "FRAMESHIFT_TRUNCATION",
            VariantEffect::FrameshiftVariant => "FRAMESHIFT_VARIANT",
            VariantEffect::StopGained => "STOP_GAINED",
            VariantEffect::StopLost => "STOP_LOST",
            VariantEffect::StartLost => "START_LOST",
            VariantEffect::SpliceAcceptorVariant => "SPLICE_ACCEPTOR_VARIANT",
            VariantEffect::SpliceDonorVariant => "SPLICE_DONOR_VARIANT",
            VariantEffect::MissenseVariant => "MISSENSE_VARIANT",
            VariantEffect::InframeInsertion => "INFRAME_INSERTION",
            VariantEffect::DisruptiveInframeInsertion => "DISRUPTIVE_INFRAME_INSERTION",
            VariantEffect::InframeDeletion => "INFRAME_DELETION",
            VariantEffect::DisruptiveInframeDeletion => "DISRUPTIVE_INFRAME_DELETION",
            VariantEffect::SpliceRegionVariant => "SPLICE_REGION_VARIANT",
            VariantEffect::StopRetainedVariant => "STOP_RETAINED_VARIANT",
            VariantEffect::SynonymousVariant => "SYNONYMOUS_VARIANT",
            VariantEffect::FivePrimeUtrVariant => "FIVE_PRIME_UTR_VARIANT",
            VariantEffect::ThreePrimeUtrVariant => "THREE_PRIME_UTR_VARIANT",
            VariantEffect::CodingTranscriptIntronVariant => "CODING_TRANSCRIPT_INTRON_VARIANT",
            VariantEffect::NonCodingTranscriptExonVariant => "NON_CODING_TRANSCRIPT_EXON_VARIANT",
            VariantEffect::NonCodingTranscriptIntronVariant => {
                "NON_CODING_TRANSCRIPT_INTRON_VARIANT"
            }
            VariantEffect::UpstreamGeneVariant => "UPSTREAM_GENE_VARIANT",
            VariantEffect::DownstreamGeneVariant => "DOWNSTREAM_GENE_VARIANT",
            VariantEffect::IntergenicVariant => "INTERGENIC_VARIANT",
            VariantEffect::RegulatoryRegionVariant => "REGULATORY_REGION_VARIANT",
            VariantEffect::SequenceVariant => "SEQUENCE_VARIANT",
        }
    }

    /// Effects whose pathogenicity is taken from predicted scores rather
    /// than a fixed per-effect constant.
    pub fn is_missense_class(self) -> bool {
        matches!(self, VariantEffect::MissenseVariant)
    }

    /// Fixed pathogenicity for this class of effect. For missense this is
    /// the fallback used when no prediction is available.
    pub fn default_pathogenicity(self) -> f32 {
        match self {
            VariantEffect::FrameshiftElongation
            | VariantEffect::FrameshiftTruncation
            | VariantEffect::FrameshiftVariant
            | VariantEffect::StopGained
            | VariantEffect::StartLost => 0.95,
            VariantEffect::SpliceAcceptorVariant | VariantEffect::SpliceDonorVariant => 0.90,
            VariantEffect::InframeInsertion
            | VariantEffect::DisruptiveInframeInsertion
            | VariantEffect::InframeDeletion
            | VariantEffect::DisruptiveInframeDeletion => 0.85,
            VariantEffect::SpliceRegionVariant => 0.80,
            VariantEffect::StopLost => 0.70,
            VariantEffect::MissenseVariant => 0.60,
            VariantEffect::SynonymousVariant | VariantEffect::StopRetainedVariant => 0.10,
            _ => 0.0,
        }
    }
}

impl fmt::Display for VariantEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantEffect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("permitted effects are: {}", super::permitted(&Self::ALL)))
    }
}

/// Lookup key used against the variant data service
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey {
    pub chrom: Chromosome,
    pub pos: u32,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.chrom, self.pos, self.ref_allele, self.alt_allele
        )
    }
}

/// A pre-annotated variant call
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    chrom: Chromosome,
    pos: u32,
    #[serde(rename = "ref")]
    ref_allele: String,
    #[serde(rename = "alt")]
    alt_allele: String,
    gene_id: GeneId,
    gene_symbol: String,
    effect: VariantEffect,
    quality: f64,
    /// Genotype per pedigree member, keyed by sample name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    genotypes: BTreeMap<String, Genotype>,
    #[serde(default)]
    frequency_data: FrequencyData,
    #[serde(default)]
    pathogenicity_data: PathogenicityData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    regulatory_features: Vec<RegulatoryFeature>,
    #[serde(default, skip_deserializing)]
    failed_steps: FailedSteps,
}

impl VariantRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chrom: Chromosome,
        pos: u32,
        ref_allele: impl Into<String>,
        alt_allele: impl Into<String>,
        gene_id: GeneId,
        gene_symbol: impl Into<String>,
        effect: VariantEffect,
        quality: f64,
    ) -> Self {
        Self {
            chrom,
            pos,
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
            gene_id,
            gene_symbol: gene_symbol.into(),
            effect,
            quality,
            genotypes: BTreeMap::new(),
            frequency_data: FrequencyData::default(),
            pathogenicity_data: PathogenicityData::default(),
            regulatory_features: Vec::new(),
            failed_steps: FailedSteps::new(),
        }
    }

    pub fn with_genotype(mut self, sample: impl Into<String>, genotype: Genotype) -> Self {
        self.genotypes.insert(sample.into(), genotype);
        self
    }

    pub fn with_frequency_data(mut self, data: FrequencyData) -> Self {
        self.frequency_data = data;
        self
    }

    pub fn with_pathogenicity_data(mut self, data: PathogenicityData) -> Self {
        self.pathogenicity_data = data;
        self
    }

    pub fn with_regulatory_feature(mut self, feature: RegulatoryFeature) -> Self {
        self.regulatory_features.push(feature);
        self
    }

    pub fn chrom(&self) -> Chromosome {
        self.chrom
    }

    pub fn pos(&self) -> u32 {
        self.pos
    }

    pub fn ref_allele(&self) -> &str {
        &self.ref_allele
    }

    pub fn alt_allele(&self) -> &str {
        &self.alt_allele
    }

    pub fn gene_id(&self) -> GeneId {
        self.gene_id
    }

    pub fn gene_symbol(&self) -> &str {
        &self.gene_symbol
    }

    pub fn effect(&self) -> VariantEffect {
        self.effect
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn key(&self) -> VariantKey {
        VariantKey {
            chrom: self.chrom,
            pos: self.pos,
            ref_allele: self.ref_allele.clone(),
            alt_allele: self.alt_allele.clone(),
        }
    }

    /// Genotype of a sample, `NoCall` when the sample is absent
    pub fn genotype(&self, sample: &str) -> Genotype {
        self.genotypes.get(sample).copied().unwrap_or(Genotype::NoCall)
    }

    pub fn frequency_data(&self) -> &FrequencyData {
        &self.frequency_data
    }

    pub fn frequency_data_mut(&mut self) -> &mut FrequencyData {
        &mut self.frequency_data
    }

    pub fn pathogenicity_data(&self) -> &PathogenicityData {
        &self.pathogenicity_data
    }

    pub fn pathogenicity_data_mut(&mut self) -> &mut PathogenicityData {
        &mut self.pathogenicity_data
    }

    pub fn regulatory_features(&self) -> &[RegulatoryFeature] {
        &self.regulatory_features
    }

    /// Whether any attached regulatory feature spans this variant's position
    pub fn in_regulatory_feature(&self) -> bool {
        self.regulatory_features
            .iter()
            .any(|f| f.overlaps(self.chrom, self.pos))
    }

    pub fn failed_steps(&self) -> &FailedSteps {
        &self.failed_steps
    }

    /// Record the outcome of a step. Passing results leave the record untouched.
    pub fn add_filter_result(&mut self, result: FilterResult) {
        if !result.passed() {
            self.failed_steps.insert(result.filter_type());
        }
    }

    pub fn failed(&self, filter_type: FilterType) -> bool {
        self.failed_steps.contains(filter_type)
    }

    pub fn passes_filters(&self) -> bool {
        self.failed_steps.is_empty()
    }

    /// Pathogenicity on [0, 1]: best prediction for missense-class effects,
    /// the per-effect constant otherwise.
    pub fn pathogenicity_score(&self) -> f32 {
        if self.effect.is_missense_class() {
            self.pathogenicity_data
                .max_normalised_score()
                .unwrap_or_else(|| self.effect.default_pathogenicity())
        } else {
            self.effect.default_pathogenicity()
        }
    }

    /// Combined rarity and deleteriousness used to rank variants within a gene
    pub fn variant_score(&self) -> f32 {
        self.frequency_data.score() * self.pathogenicity_score()
    }
}
