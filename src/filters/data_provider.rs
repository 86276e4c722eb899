//! # Annotation Data Provider
//!
//! ## Role
//! Decorator that lazily enriches a variant with frequency or pathogenicity
//! annotation before delegating to a wrapped predicate.
//!
//! ## Contract
//! - If the record's slot already covers every requested source, no fetch.
//!   A source is covered once queried or when the record arrived with a
//!   value for it.
//! - Otherwise exactly one `fetch` per record; results are unioned into the
//!   slot without overwriting entries already present.
//! - A fetch error is logged and the wrapped predicate runs on the record as
//!   it is, i.e. with "no data" for the missing sources. The sources are not
//!   marked as queried in that case.
//! - The wrapped predicate's result is returned unchanged.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::VariantFilter;
use crate::data::annotation::{FrequencySource, PathogenicitySource};
use crate::data::filter_result::{FilterResult, FilterType};
use crate::data::variant::VariantRecord;
use crate::io::data_source::{SourceSet, VariantDataService};

/// Attaches population frequencies before running `inner`.
pub struct FrequencyDataProvider<F> {
    service: Arc<dyn VariantDataService>,
    sources: BTreeSet<FrequencySource>,
    request: SourceSet,
    inner: F,
}

impl<F: VariantFilter> FrequencyDataProvider<F> {
    pub fn new(
        service: Arc<dyn VariantDataService>,
        sources: BTreeSet<FrequencySource>,
        inner: F,
    ) -> Self {
        let request = SourceSet::Frequency(sources.clone());
        Self {
            service,
            sources,
            request,
            inner,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: VariantFilter> VariantFilter for FrequencyDataProvider<F> {
    fn filter_type(&self) -> FilterType {
        self.inner.filter_type()
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        self.inner.run_filter(variant)
    }

    fn evaluate(&self, variant: &mut VariantRecord) -> FilterResult {
        if !variant.frequency_data().covers(&self.sources) {
            let key = variant.key();
            match self.service.fetch(&key, &self.request) {
                Ok(records) => variant.frequency_data_mut().merge(&self.sources, &records),
                Err(e) => {
                    tracing::warn!(variant = %key, error = %e, "Frequency lookup failed, treating as no data")
                }
            }
        }
        self.inner.run_filter(variant)
    }
}

/// Attaches pathogenicity predictions before running `inner`.
pub struct PathogenicityDataProvider<F> {
    service: Arc<dyn VariantDataService>,
    sources: BTreeSet<PathogenicitySource>,
    request: SourceSet,
    inner: F,
}

impl<F: VariantFilter> PathogenicityDataProvider<F> {
    pub fn new(
        service: Arc<dyn VariantDataService>,
        sources: BTreeSet<PathogenicitySource>,
        inner: F,
    ) -> Self {
        let request = SourceSet::Pathogenicity(sources.clone());
        Self {
            service,
            sources,
            request,
            inner,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: VariantFilter> VariantFilter for PathogenicityDataProvider<F> {
    fn filter_type(&self) -> FilterType {
        self.inner.filter_type()
    }

    fn run_filter(&self, variant: &VariantRecord) -> FilterResult {
        self.inner.run_filter(variant)
    }

    fn evaluate(&self, variant: &mut VariantRecord) -> FilterResult {
        if !variant.pathogenicity_data().covers(&self.sources) {
            let key = variant.key();
            match self.service.fetch(&key, &self.request) {
                Ok(records) => variant.pathogenicity_data_mut().merge(&self.sources, &records),
                Err(e) => {
                    tracing::warn!(variant = %key, error = %e, "Pathogenicity lookup failed, treating as no data")
                }
            }
        }
        self.inner.run_filter(variant)
    }
}
