//! End-to-end analysis runs through the public API.
//!
//! Builds analyses from JSON documents against an in-memory data source and
//! checks pass/fail bookkeeping, gene aggregation and phenotype scores.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use rexomiser::data::{
    AnnotationRecord, Chromosome, FilterResult, FilterType, FrequencySource, GeneId,
    PathogenicitySource, PriorityType, VariantEffect, VariantKey, VariantRecord,
};
use rexomiser::data::phenotype::AnimalModel;
use rexomiser::pipelines::{AnalysisBuilder, AnalysisResults, AnalysisRunner, AnalysisSpec, AnalysisStep};
use rexomiser::utils::threading::build_thread_pool;
use rexomiser::{InMemoryDataSource, RexomiserError, VariantFilter};

fn variant(gene: u32, symbol: &str, pos: u32, effect: VariantEffect, quality: f64) -> VariantRecord {
    VariantRecord::new(
        Chromosome::new(10),
        pos,
        "A",
        "G",
        GeneId(gene),
        symbol,
        effect,
        quality,
    )
}

fn reference_data() -> InMemoryDataSource {
    InMemoryDataSource::new()
        .with_mapping("HP:1", "MP:1", 0.8)
        .with_model(GeneId(2), AnimalModel::new("MGI:2", "G2-mouse", vec!["MP:1".to_string()]))
        .with_model(GeneId(3), AnimalModel::new("MGI:3", "G3-mouse", vec!["MP:2".to_string()]))
}

fn builder(source: InMemoryDataSource) -> AnalysisBuilder {
    let source = Arc::new(source);
    AnalysisBuilder::new(source.clone(), source)
}

fn parse(json: &str) -> AnalysisSpec {
    serde_json::from_str(json).unwrap()
}

fn run(builder: &AnalysisBuilder, spec: &AnalysisSpec, variants: Vec<VariantRecord>) -> AnalysisResults {
    let analysis = builder.build(spec).unwrap();
    AnalysisRunner::new(&analysis, None).run(variants).unwrap()
}

#[test]
fn test_scenario_low_quality_gene_excluded() {
    let spec = parse(r#"{"steps": [{"qualityFilter": {"minQuality": 50.0}}]}"#);
    let results = run(
        &builder(InMemoryDataSource::new()),
        &spec,
        vec![variant(1, "G1", 100, VariantEffect::MissenseVariant, 30.0)],
    );

    assert!(results.genes().is_empty());
    assert_eq!(results.failed_variants().len(), 1);
    assert!(results.failed_variants()[0].failed(FilterType::QualityFilter));
}

#[test]
fn test_scenario_phenotype_scores() {
    let spec = parse(r#"{"hpoIds": ["HP:1"], "steps": [{"phivePrioritiser": {}}]}"#);
    let results = run(
        &builder(reference_data()),
        &spec,
        vec![
            variant(2, "G2", 100, VariantEffect::StopGained, 90.0),
            variant(3, "G3", 200, VariantEffect::StopGained, 90.0),
            variant(4, "G4", 300, VariantEffect::StopGained, 90.0),
        ],
    );

    let score = |gene: u32| {
        results
            .gene(GeneId(gene))
            .and_then(|g| g.priority_result(PriorityType::PhivePriority))
            .map(|r| r.score())
            .unwrap()
    };
    assert!((score(2) - 1.0).abs() < 1e-6);
    assert_eq!(score(3), 0.0);
    // no model known for G4
    assert!((score(4) - 0.6).abs() < 1e-6);

    let matched = results
        .gene(GeneId(2))
        .and_then(|g| g.priority_result(PriorityType::PhivePriority))
        .and_then(|r| r.matched_model())
        .unwrap();
    assert_eq!(matched.model_id, "MGI:2");

    let order: Vec<u32> = results.genes().iter().map(|g| g.gene_id().0).collect();
    assert_eq!(order, vec![2, 4, 3]);
}

#[test]
fn test_unmatched_query_degrades_to_constant() {
    let spec = parse(r#"{"hpoIds": ["HP:999"], "steps": [{"phivePrioritiser": {}}]}"#);
    let results = run(
        &builder(reference_data()),
        &spec,
        vec![
            variant(2, "G2", 100, VariantEffect::StopGained, 90.0),
            variant(3, "G3", 200, VariantEffect::StopGained, 90.0),
        ],
    );
    for gene in results.genes() {
        let score = gene.priority_result(PriorityType::PhivePriority).unwrap().score();
        assert!((score - 0.1).abs() < 1e-6);
    }
}

/// Fails every variant at the given position
struct FailPosition(u32);

impl VariantFilter for FailPosition {
    fn filter_type(&self) -> FilterType {
        FilterType::QualityFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        FilterResult::from_bool(self.filter_type(), variant.pos() != self.0)
    }
}

/// Records which positions it evaluated and fails position 3
struct Recorder(Mutex<HashSet<u32>>);

impl VariantFilter for Recorder {
    fn filter_type(&self) -> FilterType {
        FilterType::IntervalFilter
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        self.0.lock().unwrap().insert(variant.pos());
        FilterResult::from_bool(self.filter_type(), variant.pos() != 3)
    }
}

fn run_with_recorder(mode: &str) -> (AnalysisResults, HashSet<u32>) {
    let recorder = Arc::new(Recorder(Mutex::new(HashSet::new())));
    let builder = builder(InMemoryDataSource::new())
        .with_step(AnalysisStep::VariantFilter(Arc::new(FailPosition(1))))
        .with_step(AnalysisStep::VariantFilter(recorder.clone()));
    let spec = parse(&format!(r#"{{"analysisMode": "{}"}}"#, mode));
    let variants = vec![
        variant(1, "G1", 1, VariantEffect::MissenseVariant, 90.0),
        variant(1, "G1", 2, VariantEffect::MissenseVariant, 90.0),
        variant(2, "G2", 3, VariantEffect::MissenseVariant, 90.0),
    ];
    let results = run(&builder, &spec, variants);
    let seen = recorder.0.lock().unwrap().clone();
    (results, seen)
}

#[test]
fn test_pass_only_skips_later_steps_for_failed_variants() {
    let (results, seen) = run_with_recorder("PASS_ONLY");
    assert_eq!(seen, HashSet::from([2, 3]));

    assert_eq!(results.genes().len(), 1);
    assert_eq!(results.genes()[0].variants().len(), 1);
    assert_eq!(results.failed_variants().len(), 2);
    let failed: Vec<usize> = results
        .failed_variants()
        .iter()
        .map(|v| v.failed_steps().len())
        .collect();
    assert_eq!(failed, vec![1, 1]);
}

#[test]
fn test_full_mode_evaluates_every_step() {
    let (results, seen) = run_with_recorder("FULL");
    assert_eq!(seen, HashSet::from([1, 2, 3]));

    // G1 keeps its failed variant alongside the passing one
    let g1 = results.gene(GeneId(1)).unwrap();
    assert_eq!(g1.variants().len(), 2);
    assert_eq!(g1.n_passing_variants(), 1);

    // G2 has no passing variant and is never aggregated
    assert!(results.gene(GeneId(2)).is_none());
    assert_eq!(results.failed_variants().len(), 1);
    assert!(results.failed_variants()[0].failed(FilterType::IntervalFilter));

    for gene in results.genes() {
        assert!(gene.n_passing_variants() > 0);
    }
}

#[test]
fn test_priority_score_filter_modes() {
    let json = |mode: &str| {
        format!(
            r#"{{"hpoIds": ["HP:1"], "analysisMode": "{}", "steps": [
                {{"phivePrioritiser": {{}}}},
                {{"priorityScoreFilter": {{"priorityType": "PHIVE_PRIORITY", "minPriorityScore": 0.5}}}}
            ]}}"#,
            mode
        )
    };
    let variants = || {
        vec![
            variant(2, "G2", 100, VariantEffect::StopGained, 90.0),
            variant(3, "G3", 200, VariantEffect::StopGained, 90.0),
        ]
    };
    let b = builder(reference_data());

    let results = run(&b, &parse(&json("PASS_ONLY")), variants());
    assert_eq!(results.genes().len(), 1);
    assert_eq!(results.failed_genes().len(), 1);
    assert_eq!(results.failed_genes()[0].gene_id(), GeneId(3));

    let results = run(&b, &parse(&json("FULL")), variants());
    assert_eq!(results.genes().len(), 2);
    assert!(results.failed_genes().is_empty());
    assert!(results.gene(GeneId(3)).unwrap().failed(FilterType::PriorityScoreFilter));
    assert!(results.gene(GeneId(2)).unwrap().passes_filters());
}

#[test]
fn test_annotation_filters_fetch_from_data_source() {
    let rare = variant(5, "G5", 10, VariantEffect::MissenseVariant, 90.0);
    let common = variant(6, "G6", 20, VariantEffect::MissenseVariant, 90.0);
    let benign = variant(7, "G7", 30, VariantEffect::MissenseVariant, 90.0);
    let key = |v: &VariantRecord| -> VariantKey { v.key() };

    let source = InMemoryDataSource::new()
        .with_annotation(
            key(&common),
            AnnotationRecord::Frequency {
                source: FrequencySource::EspAll,
                frequency: 5.0,
            },
        )
        .with_annotation(
            key(&rare),
            AnnotationRecord::Pathogenicity {
                source: PathogenicitySource::Polyphen,
                score: 0.99,
            },
        )
        .with_annotation(
            key(&benign),
            AnnotationRecord::Pathogenicity {
                source: PathogenicitySource::Polyphen,
                score: 0.1,
            },
        );
    let spec = parse(
        r#"{"frequencySources": ["ESP_ALL"], "pathogenicitySources": ["POLYPHEN"], "steps": [
            {"frequencyFilter": {"maxFrequency": 1.0}},
            {"pathogenicityFilter": {"keepNonPathogenic": false}}
        ]}"#,
    );
    let results = run(&builder(source), &spec, vec![rare, common, benign]);

    let ids: Vec<u32> = results.genes().iter().map(|g| g.gene_id().0).collect();
    assert_eq!(ids, vec![5]);
    let g5 = &results.genes()[0].variants()[0];
    assert_eq!(g5.pathogenicity_data().score(PathogenicitySource::Polyphen), Some(0.99));

    let failed: Vec<(u32, bool, bool)> = results
        .failed_variants()
        .iter()
        .map(|v| {
            (
                v.gene_id().0,
                v.failed(FilterType::FrequencyFilter),
                v.failed(FilterType::PathogenicityFilter),
            )
        })
        .collect();
    assert_eq!(failed, vec![(6, true, false), (7, false, true)]);
}

#[test]
fn test_runs_are_deterministic() {
    let spec = parse(
        r#"{"hpoIds": ["HP:1"], "analysisMode": "FULL", "geneScoreMode": "RANK_BASED", "steps": [
            {"qualityFilter": {"minQuality": 20.0}},
            {"phivePrioritiser": {}}
        ]}"#,
    );
    let b = builder(reference_data());
    let variants: Vec<VariantRecord> = (0..200u32)
        .map(|i| {
            variant(
                2 + i % 7,
                &format!("G{}", 2 + i % 7),
                i,
                VariantEffect::ALL[(i as usize) % VariantEffect::ALL.len()],
                (i % 50) as f64,
            )
        })
        .collect();

    let summarise = |results: &AnalysisResults| -> Vec<(u32, String, Vec<FilterType>)> {
        results
            .genes()
            .iter()
            .map(|g| {
                let failed = g.variants().iter().flat_map(|v| v.failed_steps().iter()).collect();
                (g.gene_id().0, format!("{:.6}", g.combined_score()), failed)
            })
            .collect()
    };

    let first = summarise(&run(&b, &spec, variants.clone()));
    let second = summarise(&run(&b, &spec, variants.clone()));
    assert_eq!(first, second);

    let single = build_thread_pool(1).unwrap();
    let serial = single.install(|| summarise(&run(&b, &spec, variants.clone())));
    let wide = build_thread_pool(4).unwrap();
    let parallel = wide.install(|| summarise(&run(&b, &spec, variants)));
    assert_eq!(serial, parallel);
    assert_eq!(first, serial);
}

#[test]
fn test_construction_errors_abort_before_running() {
    let b = builder(InMemoryDataSource::new());

    let spec = parse(r#"{"steps": [{"frequencyFilter": {"maxFrequency": 1.0}}]}"#);
    assert!(matches!(b.build(&spec), Err(RexomiserError::InvalidStep { .. })));

    let spec = parse(
        r#"{"steps": [{"priorityScoreFilter": {"priorityType": "PHIVE_PRIORITY", "minPriorityScore": 0.5}}]}"#,
    );
    assert!(matches!(b.build(&spec), Err(RexomiserError::InvalidStep { .. })));

    let bad = r#"{"steps": [{"frequencyFilter": {"maxFrequency": 1.0}}], "frequencySources": ["GNOMAD"]}"#;
    assert!(serde_json::from_str::<AnalysisSpec>(bad).is_err());
}
