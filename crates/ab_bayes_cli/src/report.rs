//! The persisted result of the `compare` command.

use std::time::Duration;

use ab_bayes::analysis::Analysis;
use ab_bayes::density::{DensityEstimator, DensityPoint};
use ab_bayes_types::diagnostics::CorrectnessWarning;
use ab_bayes_types::posterior::PosteriorData;
use ab_bayes_types::summary::ComparisonSummary;
use serde::Serialize;
use tracing::warn;

#[cfg(test)]
#[path = "report_test.rs"]
mod report_test;

#[derive(Debug, Default, Serialize)]
pub struct CompareReport {
    pub backends: Vec<BackendReport>,
    pub warnings: Vec<CorrectnessWarning>,
}

#[derive(Debug, Serialize)]
pub struct BackendReport {
    pub backend: &'static str,
    pub execution_time_secs: f64,
    pub control: String,
    pub variant: String,
    pub summary: ComparisonSummary,
    /// Control, variant and difference densities, in that order.
    pub densities: Vec<DensityReport>,
}

/// A density curve, or the reason it was skipped.
#[derive(Debug, PartialEq, Serialize)]
pub struct DensityReport {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<DensityPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl DensityReport {
    pub fn estimate(estimator: &DensityEstimator, posterior: &PosteriorData) -> Self {
        let label = posterior.label().to_string();
        match estimator.estimate(posterior) {
            Ok(curve) => Self {
                label,
                bandwidth: Some(curve.bandwidth()),
                points: curve.collect(),
                skipped: None,
            },
            Err(err) => {
                warn!("Skipping density of {label}: {err}");
                Self { label, bandwidth: None, points: Vec::new(), skipped: Some(err.to_string()) }
            }
        }
    }
}

/// Builds the report entry of a two-variant analysis. Returns `None` when the analysis holds no
/// comparison.
pub fn backend_report(
    analysis: &Analysis,
    elapsed: Duration,
    estimator: &DensityEstimator,
) -> Option<BackendReport> {
    let comparison = analysis.comparisons.first()?;
    let posterior_of = |name: &str| {
        analysis
            .posteriors
            .iter()
            .find(|variant_posterior| variant_posterior.name == name)
            .map(|variant_posterior| &variant_posterior.posterior)
    };

    let densities = [
        posterior_of(&comparison.control),
        posterior_of(&comparison.variant),
        Some(&comparison.difference),
    ]
    .into_iter()
    .flatten()
    .map(|posterior| DensityReport::estimate(estimator, posterior))
    .collect();

    Some(BackendReport {
        backend: analysis.backend,
        execution_time_secs: elapsed.as_secs_f64(),
        control: comparison.control.clone(),
        variant: comparison.variant.clone(),
        summary: comparison.summary,
        densities,
    })
}
