//! Correlation of a remote inference response back to the requested variants.
//!
//! The service identifies variants by key only. The control's statistics live under the
//! `pairwise_comparisons` entry keyed by `versus_control[0].compared_to_variant.key`, the compared
//! variant's under the entry keyed by `versus_control[0].key`. Array positions are never used.

use ab_bayes_types::diagnostics::CorrectnessWarning;
use ab_bayes_types::errors::{ComparisonError, RemoteInferenceError};
use ab_bayes_types::posterior::{PosteriorData, VariantPosterior};
use ab_bayes_types::remote_objects::{RemoteInferenceResponse, VariantComparison};
use ab_bayes_types::summary::ComparisonSummary;
use ab_bayes_types::variant::VariantSet;
use ab_bayes_types::{DiagnosticsSink, InferenceResult};
use serde::Serialize;
use uuid::Uuid;

use crate::comparison::{absolute_difference, aligned_points};

#[cfg(test)]
#[path = "correlation_test.rs"]
mod correlation_test;

/// Control, variant and "B vs A" posteriors of a two-variant remote response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AbPosteriors {
    pub control: PosteriorData,
    pub variant: PosteriorData,
    pub difference: PosteriorData,
}

/// The summary the service itself computed for `versus_control[0]`.
pub fn remote_summary(
    response: &RemoteInferenceResponse,
    diagnostics: &dyn DiagnosticsSink,
) -> InferenceResult<ComparisonSummary> {
    let versus_control = primary_comparison(response, diagnostics)?;
    let statistics = &versus_control.statistics;
    let relative = statistics
        .comparison_relative
        .ok_or_else(|| missing_field("comparison_relative", versus_control.key))?;
    let winning_probability = statistics
        .winning_probability
        .ok_or_else(|| missing_field("winning_probability", versus_control.key))?;

    Ok(ComparisonSummary::new(
        relative.proportional_difference * 100.0,
        relative.ci_lower * 100.0,
        relative.ci_upper * 100.0,
        winning_probability,
    ))
}

pub fn remote_posteriors_ab(
    response: &RemoteInferenceResponse,
    diagnostics: &dyn DiagnosticsSink,
) -> InferenceResult<AbPosteriors> {
    let versus_control = primary_comparison(response, diagnostics)?;
    let compared_to = versus_control
        .compared_to_variant
        .as_ref()
        .ok_or(ComparisonError::MissingComparedToVariant { key: versus_control.key })?;

    let pairwise = response.pairwise_by_key();
    let lookup = |key: Uuid| {
        pairwise.get(&key).copied().ok_or(ComparisonError::UnmatchedVariantKey { key })
    };
    let control_entry = lookup(compared_to.key)?;
    let variant_entry = lookup(versus_control.key)?;

    let control = PosteriorData::new(compared_to.name.clone(), posterior_samples(control_entry)?)?;
    let variant_name = variant_entry
        .name
        .clone()
        .or_else(|| versus_control.name.clone())
        .unwrap_or_else(|| versus_control.key.to_string());
    let variant = PosteriorData::new(variant_name, posterior_samples(variant_entry)?)?;

    let (control_points, variant_points) = aligned_points(&control, &variant, diagnostics);
    let difference = absolute_difference(control_points, variant_points)?;
    Ok(AbPosteriors { control, variant, difference })
}

/// One posterior per requested variant, in the order of `variants`.
pub fn variant_posteriors(
    response: &RemoteInferenceResponse,
    variants: &VariantSet,
    diagnostics: &dyn DiagnosticsSink,
) -> InferenceResult<Vec<VariantPosterior>> {
    if response.versus_control.is_empty() {
        return Err(ComparisonError::MissingVersusControl.into());
    }
    let expected = variants.len() - 1;
    if response.versus_control.len() != expected {
        diagnostics.report(CorrectnessWarning::UnexpectedComparisonCount {
            expected,
            found: response.versus_control.len(),
        });
    }

    let control_key = variants.control().variant_key();
    for versus_control in &response.versus_control {
        let compared_to = versus_control
            .compared_to_variant
            .as_ref()
            .ok_or(ComparisonError::MissingComparedToVariant { key: versus_control.key })?;
        if compared_to.key != control_key {
            return Err(ComparisonError::ControlKeyMismatch {
                expected: control_key,
                found: compared_to.key,
            }
            .into());
        }
    }

    let pairwise = response.pairwise_by_key();
    variants
        .iter()
        .map(|variant| -> InferenceResult<VariantPosterior> {
            let key = variant.variant_key();
            let entry =
                pairwise.get(&key).ok_or(ComparisonError::UnmatchedVariantKey { key })?;
            Ok(VariantPosterior::new(variant, posterior_samples(entry)?)?)
        })
        .collect()
}

fn primary_comparison<'a>(
    response: &'a RemoteInferenceResponse,
    diagnostics: &dyn DiagnosticsSink,
) -> Result<&'a VariantComparison, ComparisonError> {
    let versus_control =
        response.versus_control.first().ok_or(ComparisonError::MissingVersusControl)?;
    if response.versus_control.len() > 1 {
        diagnostics.report(CorrectnessWarning::UnexpectedComparisonCount {
            expected: 1,
            found: response.versus_control.len(),
        });
    }
    Ok(versus_control)
}

fn posterior_samples(entry: &VariantComparison) -> Result<Vec<f64>, RemoteInferenceError> {
    entry
        .statistics
        .posterior
        .as_ref()
        .and_then(|posterior| posterior.data.clone())
        .ok_or(RemoteInferenceError::MissingPosteriorData { key: entry.key })
}

fn missing_field(field: &str, key: Uuid) -> RemoteInferenceError {
    RemoteInferenceError::MissingField { field: field.to_string(), key }
}
