//! Validation, inference and comparison chained into a single call.

use ab_bayes_types::posterior::VariantPosterior;
use ab_bayes_types::variant::{VariantInput, VariantSet};
use ab_bayes_types::{InferenceBackend, InferenceResult};
use serde::Serialize;
use tracing::{info, instrument};

use crate::comparison::{ComparisonEngine, PairwiseComparison};

#[cfg(test)]
#[path = "analysis_test.rs"]
mod analysis_test;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Analysis {
    pub backend: &'static str,
    pub posteriors: Vec<VariantPosterior>,
    /// One entry per non-control variant, in input order.
    pub comparisons: Vec<PairwiseComparison>,
}

/// Validates `variants` before anything is sent to `backend`, then analyzes them.
pub fn analyze_variants(
    backend: &dyn InferenceBackend,
    variants: Vec<VariantInput>,
    engine: &ComparisonEngine,
) -> InferenceResult<Analysis> {
    let variants = VariantSet::new(variants)?;
    analyze(backend, &variants, engine)
}

#[instrument(skip_all, fields(backend = backend.name(), n_variants = variants.len()))]
pub fn analyze(
    backend: &dyn InferenceBackend,
    variants: &VariantSet,
    engine: &ComparisonEngine,
) -> InferenceResult<Analysis> {
    let posteriors = backend.infer(variants)?;
    let comparisons = engine.compare_to_control(&posteriors)?;
    info!(n_comparisons = comparisons.len(), "Analysis finished.");
    Ok(Analysis { backend: backend.name(), posteriors, comparisons })
}
