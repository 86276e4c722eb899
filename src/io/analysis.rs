//! # Analysis Document Loading
//!
//! ## Role
//! Read analysis descriptions, batch files and pre-annotated variant records
//! from disk.
//!
//! ## Contract
//! - A relative `variants` path is resolved against the directory holding the
//!   analysis document.
//! - Batch files list one analysis path per line. Blank lines and lines
//!   starting with `#` are skipped and paths are trimmed. Relative paths are
//!   resolved against the batch file's directory.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info_span;

use crate::data::variant::VariantRecord;
use crate::pipelines::analysis::AnalysisSpec;

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.parent().unwrap_or_else(|| Path::new("")).join(path)
    }
}

/// Parse an analysis description, resolving its variants path.
pub fn load_analysis(path: &Path) -> Result<AnalysisSpec> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open analysis {}", path.display()))?;
    let mut spec: AnalysisSpec = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse analysis {}", path.display()))?;
    if let Some(variants) = spec.variants.take() {
        spec.variants = Some(resolve(path, &variants));
    }
    tracing::debug!(
        path = %path.display(),
        n_steps = spec.steps.len(),
        n_hpo_ids = spec.hpo_ids.len(),
        "Loaded analysis"
    );
    Ok(spec)
}

/// Read a JSON array of pre-annotated variant records.
pub fn load_variants(path: &Path) -> Result<Vec<VariantRecord>> {
    info_span!("load_variants", path = ?path).in_scope(|| {
        let file = File::open(path)
            .with_context(|| format!("Failed to open variants {}", path.display()))?;
        let variants: Vec<VariantRecord> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse variants {}", path.display()))?;
        tracing::info!(n_variants = variants.len(), "Loaded variants");
        Ok(variants)
    })
}

/// List the analysis documents named by a batch file.
pub fn read_batch_file(path: &Path) -> Result<Vec<PathBuf>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    let paths: Vec<PathBuf> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| resolve(path, Path::new(line)))
        .collect();
    if paths.is_empty() {
        anyhow::bail!("Batch file {} lists no analyses", path.display());
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_batch_file_skips_comments_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("batch.txt");
        let mut f = File::create(&batch).unwrap();
        writeln!(f, "# analyses for the cohort").unwrap();
        writeln!(f, "  first.json  ").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "/abs/second.json").unwrap();

        let paths = read_batch_file(&batch).unwrap();
        assert_eq!(paths, vec![dir.path().join("first.json"), PathBuf::from("/abs/second.json")]);
    }

    #[test]
    fn test_empty_batch_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("batch.txt");
        fs::write(&batch, "# nothing here\n\n").unwrap();
        assert!(read_batch_file(&batch).is_err());
    }

    #[test]
    fn test_variants_path_resolved_against_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = dir.path().join("proband.json");
        fs::write(
            &analysis,
            r#"{"variants": "proband.variants.json", "steps": [{"qualityFilter": {"minQuality": 10.0}}]}"#,
        )
        .unwrap();
        let spec = load_analysis(&analysis).unwrap();
        assert_eq!(spec.variants, Some(dir.path().join("proband.variants.json")));
    }

    #[test]
    fn test_load_variants() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.json");
        fs::write(
            &path,
            r#"[{"chrom": "chr10", "pos": 123256215, "ref": "T", "alt": "G",
                 "geneId": 2263, "geneSymbol": "FGFR2", "effect": "MISSENSE_VARIANT",
                 "quality": 100.0, "genotypes": {"proband": "HET"}}]"#,
        )
        .unwrap();
        let variants = load_variants(&path).unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].gene_symbol(), "FGFR2");
        assert!(variants[0].passes_filters());

        assert!(load_variants(&dir.path().join("missing.json")).is_err());
    }
}
