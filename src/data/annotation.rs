//! # Variant Annotation
//!
//! Frequency and pathogenicity data attached to a `VariantRecord` by the
//! annotation data provider.
//!
//! ## Caching
//! Each annotation slot remembers which sources have already been queried,
//! independently of whether the data service returned anything for them.
//! A source is covered when it was queried or already carries a value, so
//! records loaded with annotation attached never reach the data service.
//! A decorator asking only for covered sources skips the fetch.
//!
//! ## Merging
//! Returned records are merged as a union. A value already present for a
//! source is never overwritten.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Population frequency databases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrequencySource {
    ThousandGenomes,
    EspAfricanAmerican,
    EspEuropeanAmerican,
    EspAll,
    ExacAfricanIncAfricanAmerican,
    ExacAmerican,
    ExacEastAsian,
    ExacFinnish,
    ExacNonFinnishEuropean,
    ExacOther,
    ExacSouthAsian,
    Local,
}

impl FrequencySource {
    pub const ALL: [FrequencySource; 12] = [
        FrequencySource::ThousandGenomes,
        FrequencySource::EspAfricanAmerican,
        FrequencySource::EspEuropeanAmerican,
        FrequencySource::EspAll,
        FrequencySource::ExacAfricanIncAfricanAmerican,
        FrequencySource::ExacAmerican,
        FrequencySource::ExacEastAsian,
        FrequencySource::ExacFinnish,
        FrequencySource::ExacNonFinnishEuropean,
        FrequencySource::ExacOther,
        FrequencySource::ExacSouthAsian,
        FrequencySource::Local,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FrequencySource::ThousandGenomes => "THOUSAND_GENOMES",
            FrequencySource::EspAfricanAmerican => "ESP_AFRICAN_AMERICAN",
            FrequencySource::EspEuropeanAmerican => "ESP_EUROPEAN_AMERICAN",
            FrequencySource::EspAll => "ESP_ALL",
            FrequencySource::ExacAfricanIncAfricanAmerican => "EXAC_AFRICAN_INC_AFRICAN_AMERICAN",
            FrequencySource::ExacAmerican => "EXAC_AMERICAN",
            FrequencySource::ExacEastAsian => "EXAC_EAST_ASIAN",
            FrequencySource::ExacFinnish => "EXAC_FINNISH",
            FrequencySource::ExacNonFinnishEuropean => "EXAC_NON_FINNISH_EUROPEAN",
            FrequencySource::ExacOther => "EXAC_OTHER",
            FrequencySource::ExacSouthAsian => "EXAC_SOUTH_ASIAN",
            FrequencySource::Local => "LOCAL",
        }
    }
}

impl fmt::Display for FrequencySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrequencySource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|src| src.as_str() == s)
            .ok_or_else(|| format!("permitted sources are: {}", super::permitted(&Self::ALL)))
    }
}

/// Predicted pathogenicity sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathogenicitySource {
    Polyphen,
    MutationTaster,
    Sift,
    Cadd,
    Remm,
}

impl PathogenicitySource {
    pub const ALL: [PathogenicitySource; 5] = [
        PathogenicitySource::Polyphen,
        PathogenicitySource::MutationTaster,
        PathogenicitySource::Sift,
        PathogenicitySource::Cadd,
        PathogenicitySource::Remm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PathogenicitySource::Polyphen => "POLYPHEN",
            PathogenicitySource::MutationTaster => "MUTATION_TASTER",
            PathogenicitySource::Sift => "SIFT",
            PathogenicitySource::Cadd => "CADD",
            PathogenicitySource::Remm => "REMM",
        }
    }

    /// Map a raw score onto [0, 1] where higher means more likely pathogenic.
    pub fn normalise(self, raw: f32) -> f32 {
        let normalised = match self {
            // SIFT: lower is more damaging
            PathogenicitySource::Sift => 1.0 - raw,
            // CADD phred-scaled
            PathogenicitySource::Cadd => 1.0 - 10f32.powf(-raw / 10.0),
            _ => raw,
        };
        normalised.clamp(0.0, 1.0)
    }

    /// Whether the raw score crosses the tool's own "damaging" threshold
    pub fn is_predicted_pathogenic(self, raw: f32) -> bool {
        match self {
            PathogenicitySource::Polyphen => raw > 0.956,
            PathogenicitySource::MutationTaster => raw > 0.94,
            PathogenicitySource::Sift => raw < 0.06,
            PathogenicitySource::Cadd => raw >= 20.0,
            PathogenicitySource::Remm => raw >= 0.5,
        }
    }
}

impl fmt::Display for PathogenicitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathogenicitySource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|src| src.as_str() == s)
            .ok_or_else(|| format!("permitted sources are: {}", super::permitted(&Self::ALL)))
    }
}

/// NCBI dbSNP reference SNP identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RsId(pub u32);

impl fmt::Display for RsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rs{}", self.0)
    }
}

/// One scored record returned by the variant data service
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnnotationRecord {
    Frequency {
        source: FrequencySource,
        frequency: f32,
    },
    Pathogenicity {
        source: PathogenicitySource,
        score: f32,
    },
    RsId(RsId),
}

/// Population frequencies attached to a variant (percent)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rs_id: Option<RsId>,
    #[serde(default)]
    frequencies: BTreeMap<FrequencySource, f32>,
    #[serde(skip)]
    queried: BTreeSet<FrequencySource>,
}

impl FrequencyData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frequency(mut self, source: FrequencySource, frequency: f32) -> Self {
        self.frequencies.entry(source).or_insert(frequency);
        self
    }

    pub fn with_rs_id(mut self, rs_id: RsId) -> Self {
        self.rs_id = Some(rs_id);
        self
    }

    pub fn rs_id(&self) -> Option<RsId> {
        self.rs_id
    }

    pub fn frequency(&self, source: FrequencySource) -> Option<f32> {
        self.frequencies.get(&source).copied()
    }

    pub fn frequencies(&self) -> impl Iterator<Item = (FrequencySource, f32)> + '_ {
        self.frequencies.iter().map(|(&s, &f)| (s, f))
    }

    pub fn has_known_frequency(&self) -> bool {
        !self.frequencies.is_empty()
    }

    /// Seen in any frequency source or catalogued in dbSNP
    pub fn is_represented_in_database(&self) -> bool {
        self.rs_id.is_some() || self.has_known_frequency()
    }

    pub fn max_frequency(&self) -> Option<f32> {
        self.frequencies.values().copied().reduce(f32::max)
    }

    /// Frequency component of the variant score: 1 when unseen, 0 above 2%.
    pub fn score(&self) -> f32 {
        match self.max_frequency() {
            None => 1.0,
            Some(max) if max <= 0.0 => 1.0,
            Some(max) if max > 2.0 => 0.0,
            Some(max) => 1.13533 - 0.13533 * max.exp(),
        }
    }

    /// Whether every requested source has been queried or carries a value
    pub fn covers(&self, sources: &BTreeSet<FrequencySource>) -> bool {
        sources
            .iter()
            .all(|s| self.queried.contains(s) || self.frequencies.contains_key(s))
    }

    /// Union the fetched records into this slot and mark `requested` as queried.
    pub fn merge(&mut self, requested: &BTreeSet<FrequencySource>, records: &[AnnotationRecord]) {
        for record in records {
            match *record {
                AnnotationRecord::Frequency { source, frequency } if requested.contains(&source) => {
                    self.frequencies.entry(source).or_insert(frequency);
                }
                AnnotationRecord::RsId(rs_id) => {
                    self.rs_id.get_or_insert(rs_id);
                }
                _ => {}
            }
        }
        self.queried.extend(requested.iter().copied());
    }
}

/// Predicted pathogenicity scores attached to a variant (raw tool scores)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathogenicityData {
    #[serde(default)]
    scores: BTreeMap<PathogenicitySource, f32>,
    #[serde(skip)]
    queried: BTreeSet<PathogenicitySource>,
}

impl PathogenicityData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, source: PathogenicitySource, score: f32) -> Self {
        self.scores.entry(source).or_insert(score);
        self
    }

    pub fn score(&self, source: PathogenicitySource) -> Option<f32> {
        self.scores.get(&source).copied()
    }

    pub fn has_predicted_score(&self) -> bool {
        !self.scores.is_empty()
    }

    /// Best normalised score across all sources, if any are known
    pub fn max_normalised_score(&self) -> Option<f32> {
        self.scores
            .iter()
            .map(|(src, &raw)| src.normalise(raw))
            .reduce(f32::max)
    }

    /// Any source predicting the variant as damaging
    pub fn is_predicted_pathogenic(&self) -> bool {
        self.scores
            .iter()
            .any(|(src, &raw)| src.is_predicted_pathogenic(raw))
    }

    pub fn covers(&self, sources: &BTreeSet<PathogenicitySource>) -> bool {
        sources
            .iter()
            .all(|s| self.queried.contains(s) || self.scores.contains_key(s))
    }

    pub fn merge(&mut self, requested: &BTreeSet<PathogenicitySource>, records: &[AnnotationRecord]) {
        for record in records {
            if let AnnotationRecord::Pathogenicity { source, score } = *record {
                if requested.contains(&source) {
                    self.scores.entry(source).or_insert(score);
                }
            }
        }
        self.queried.extend(requested.iter().copied());
    }
}
