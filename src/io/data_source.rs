//! # Data Access Capabilities
//!
//! ## Role
//! The boundary to external reference data: frequency and pathogenicity
//! annotation keyed by variant, phenotype term mappings, and animal models
//! keyed by gene.
//!
//! ## Contract
//! - Implementations must be safe for concurrent lookups (`Send + Sync`).
//!   Records are evaluated on rayon workers.
//! - Errors are returned, never panicked. The core treats every error as
//!   "no data" for that single lookup and logs it.
//! - No retries are applied by callers.
//!
//! `InMemoryDataSource` implements both traits over a JSON document and backs
//! the command-line binary and the tests.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info_span;

use crate::data::annotation::{AnnotationRecord, FrequencySource, PathogenicitySource, RsId};
use crate::data::gene::GeneId;
use crate::data::phenotype::{AnimalModel, TermMapping};
use crate::data::variant::VariantKey;
use crate::error::{Result, RexomiserError};

/// Source set requested by an annotation decorator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceSet {
    Frequency(BTreeSet<FrequencySource>),
    Pathogenicity(BTreeSet<PathogenicitySource>),
}

/// Frequency/pathogenicity lookup for single variants
pub trait VariantDataService: Send + Sync {
    /// Zero or more scored records for the variant, restricted to `sources`.
    fn fetch(&self, key: &VariantKey, sources: &SourceSet) -> Result<Vec<AnnotationRecord>>;
}

/// Phenotype ontology mappings and model-organism data
pub trait PhenotypeDataService: Send + Sync {
    /// Mappings from a query term to model terms, in table order.
    fn lookup_mapping(&self, query_term: &str) -> Result<Vec<TermMapping>>;

    /// Known animal models for a gene, each with its phenotype term set.
    fn models_for_gene(&self, gene_id: GeneId) -> Result<Vec<AnimalModel>>;
}

/// On-disk layout of the reference data document
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceDocument {
    #[serde(default)]
    variants: HashMap<String, Vec<StoredRecord>>,
    #[serde(default)]
    phenotype_mappings: Vec<TermMapping>,
    #[serde(default)]
    gene_models: HashMap<u32, Vec<AnimalModel>>,
}

#[derive(Debug, Deserialize)]
struct StoredRecord {
    source: String,
    value: f64,
}

/// Reference data held entirely in memory
#[derive(Clone, Debug, Default)]
pub struct InMemoryDataSource {
    annotations: HashMap<VariantKey, Vec<AnnotationRecord>>,
    mappings: HashMap<String, Vec<TermMapping>>,
    models: HashMap<GeneId, Vec<AnimalModel>>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a reference data document.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        info_span!("data_source_open", path = ?path).in_scope(|| {
            let file = File::open(path)
                .with_context(|| format!("Failed to open reference data {}", path.display()))?;
            let doc: ReferenceDocument = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse reference data {}", path.display()))?;
            let source = Self::from_document(doc)
                .with_context(|| format!("Invalid reference data in {}", path.display()))?;
            tracing::info!(
                n_variants = source.annotations.len(),
                n_query_terms = source.mappings.len(),
                n_genes = source.models.len(),
                "Loaded reference data"
            );
            Ok(source)
        })
    }

    /// Parse a reference data document held in a string.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: ReferenceDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    fn from_document(doc: ReferenceDocument) -> Result<Self> {
        let mut source = Self::new();
        for (key, records) in doc.variants {
            let key = parse_variant_key(&key)?;
            for record in records {
                source.add_annotation(key.clone(), parse_stored_record(&record)?);
            }
        }
        for mapping in doc.phenotype_mappings {
            source.add_mapping(mapping);
        }
        for (gene_id, models) in doc.gene_models {
            for model in models {
                source.add_model(GeneId(gene_id), model);
            }
        }
        Ok(source)
    }

    pub fn add_annotation(&mut self, key: VariantKey, record: AnnotationRecord) {
        self.annotations.entry(key).or_default().push(record);
    }

    /// Mappings keep insertion order per query term.
    pub fn add_mapping(&mut self, mapping: TermMapping) {
        self.mappings
            .entry(mapping.query_term.clone())
            .or_default()
            .push(mapping);
    }

    pub fn add_model(&mut self, gene_id: GeneId, model: AnimalModel) {
        self.models.entry(gene_id).or_default().push(model);
    }

    pub fn with_annotation(mut self, key: VariantKey, record: AnnotationRecord) -> Self {
        self.add_annotation(key, record);
        self
    }

    pub fn with_mapping(mut self, query_term: &str, model_term: &str, score: f32) -> Self {
        self.add_mapping(TermMapping::new(query_term, model_term, score));
        self
    }

    pub fn with_model(mut self, gene_id: GeneId, model: AnimalModel) -> Self {
        self.add_model(gene_id, model);
        self
    }
}

impl VariantDataService for InMemoryDataSource {
    fn fetch(&self, key: &VariantKey, sources: &SourceSet) -> Result<Vec<AnnotationRecord>> {
        let Some(records) = self.annotations.get(key) else {
            return Ok(Vec::new());
        };
        let selected = records
            .iter()
            .filter(|record| match (record, sources) {
                (AnnotationRecord::Frequency { source, .. }, SourceSet::Frequency(wanted)) => {
                    wanted.contains(source)
                }
                (AnnotationRecord::RsId(_), SourceSet::Frequency(_)) => true,
                (
                    AnnotationRecord::Pathogenicity { source, .. },
                    SourceSet::Pathogenicity(wanted),
                ) => wanted.contains(source),
                _ => false,
            })
            .copied()
            .collect();
        Ok(selected)
    }
}

impl PhenotypeDataService for InMemoryDataSource {
    fn lookup_mapping(&self, query_term: &str) -> Result<Vec<TermMapping>> {
        Ok(self.mappings.get(query_term).cloned().unwrap_or_default())
    }

    fn models_for_gene(&self, gene_id: GeneId) -> Result<Vec<AnimalModel>> {
        Ok(self.models.get(&gene_id).cloned().unwrap_or_default())
    }
}

/// Parse `chrom-pos-ref-alt`
fn parse_variant_key(key: &str) -> Result<VariantKey> {
    let parts: Vec<&str> = key.split('-').collect();
    if parts.len() != 4 {
        return Err(RexomiserError::config(format!(
            "variant key '{}' is not of the form chrom-pos-ref-alt",
            key
        )));
    }
    let chrom = parts[0].parse().map_err(RexomiserError::config)?;
    let pos = parts[1]
        .parse()
        .map_err(|e| RexomiserError::config(format!("bad position in '{}': {}", key, e)))?;
    Ok(VariantKey {
        chrom,
        pos,
        ref_allele: parts[2].to_string(),
        alt_allele: parts[3].to_string(),
    })
}

fn parse_stored_record(record: &StoredRecord) -> Result<AnnotationRecord> {
    if record.source == "DBSNP" {
        if record.value < 0.0 || record.value > u32::MAX as f64 {
            return Err(RexomiserError::config(format!(
                "dbSNP id {} is out of range",
                record.value
            )));
        }
        return Ok(AnnotationRecord::RsId(RsId(record.value as u32)));
    }
    if let Ok(source) = record.source.parse::<FrequencySource>() {
        return Ok(AnnotationRecord::Frequency {
            source,
            frequency: record.value as f32,
        });
    }
    if let Ok(source) = record.source.parse::<PathogenicitySource>() {
        return Ok(AnnotationRecord::Pathogenicity {
            source,
            score: record.value as f32,
        });
    }
    Err(RexomiserError::config(format!(
        "unknown annotation source '{}'",
        record.source
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::variant::Chromosome;

    const DOC: &str = r#"{
        "variants": {
            "1-100-A-T": [
                {"source": "ESP_ALL", "value": 0.4},
                {"source": "DBSNP", "value": 1234},
                {"source": "SIFT", "value": 0.01}
            ]
        },
        "phenotypeMappings": [
            {"queryTerm": "HP:0000001", "modelTerm": "MP:0000001", "score": 0.8},
            {"queryTerm": "HP:0000001", "modelTerm": "MP:0000002", "score": 0.5}
        ],
        "geneModels": {
            "2263": [{"modelId": "MGI:95523", "modelSymbol": "Fgfr2", "phenotypes": ["MP:0000001"]}]
        }
    }"#;

    fn key() -> VariantKey {
        VariantKey {
            chrom: Chromosome::new(1),
            pos: 100,
            ref_allele: "A".to_string(),
            alt_allele: "T".to_string(),
        }
    }

    #[test]
    fn test_fetch_restricts_to_requested_kind() {
        let source = InMemoryDataSource::from_json(DOC).unwrap();
        let freq = SourceSet::Frequency([FrequencySource::EspAll].into_iter().collect());
        let records = source.fetch(&key(), &freq).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.contains(&AnnotationRecord::RsId(RsId(1234))));

        let path = SourceSet::Pathogenicity([PathogenicitySource::Sift].into_iter().collect());
        let records = source.fetch(&key(), &path).unwrap();
        assert_eq!(records.len(), 1);

        let polyphen =
            SourceSet::Pathogenicity([PathogenicitySource::Polyphen].into_iter().collect());
        assert!(source.fetch(&key(), &polyphen).unwrap().is_empty());
    }

    #[test]
    fn test_mappings_keep_table_order() {
        let source = InMemoryDataSource::from_json(DOC).unwrap();
        let mappings = source.lookup_mapping("HP:0000001").unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].model_term, "MP:0000001");
        assert!(source.lookup_mapping("HP:9999999").unwrap().is_empty());
    }

    #[test]
    fn test_models_for_gene() {
        let source = InMemoryDataSource::from_json(DOC).unwrap();
        let models = source.models_for_gene(GeneId(2263)).unwrap();
        assert_eq!(models[0].model_symbol, "Fgfr2");
        assert!(source.models_for_gene(GeneId(1)).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_source_rejected() {
        let doc = r#"{"variants": {"1-100-A-T": [{"source": "GNOMAD", "value": 0.1}]}}"#;
        assert!(InMemoryDataSource::from_json(doc).is_err());
        let doc = r#"{"variants": {"1-100-A": []}}"#;
        assert!(InMemoryDataSource::from_json(doc).is_err());
    }
}
