//! Comparison statistics derived from raw posterior samples.
//!
//! Given paired draws `(a_i, b_i)` of the control (A) and a variant (B):
//! - the relative lift `d_i = (b_i - a_i) / a_i` is computed for every pair with `a_i != 0`;
//! - `percent_difference` is `mean(d) * 100`, and the credible interval bounds are the
//!   `alpha / 2` and `1 - alpha / 2` percentiles of `d`, also in percent;
//! - `prob_b_better` is the fraction of all pairs with `b_i > a_i` (ties count for neither side);
//! - the absolute difference `b_i - a_i` is returned as its own posterior for plotting.

use ab_bayes_config::config::ComparisonConfig;
use ab_bayes_types::diagnostics::CorrectnessWarning;
use ab_bayes_types::errors::ComparisonError;
use ab_bayes_types::posterior::{PosteriorData, VariantPosterior};
use ab_bayes_types::summary::ComparisonSummary;
use ab_bayes_types::{DiagnosticsSink, SharedDiagnosticsSink};
use serde::Serialize;
use tracing::debug;

use crate::percentile::percentile_of_sorted;

#[cfg(test)]
#[path = "comparison_test.rs"]
mod comparison_test;

pub const DIFFERENCE_LABEL: &str = "b_vs_a_diff";

/// Outcome of comparing one variant against the control.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairwiseComparison {
    pub control: String,
    pub variant: String,
    pub summary: ComparisonSummary,
    /// Absolute difference `b_i - a_i`, labeled [`DIFFERENCE_LABEL`].
    pub difference: PosteriorData,
}

pub struct ComparisonEngine {
    config: ComparisonConfig,
    diagnostics: SharedDiagnosticsSink,
}

impl ComparisonEngine {
    pub fn new(config: ComparisonConfig, diagnostics: SharedDiagnosticsSink) -> Self {
        Self { config, diagnostics }
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    pub fn compare(
        &self,
        control: &PosteriorData,
        variant: &PosteriorData,
    ) -> Result<PairwiseComparison, ComparisonError> {
        let (control_points, variant_points) =
            aligned_points(control, variant, self.diagnostics.as_ref());
        let n_pairs = control_points.len();

        let mut relative = relative_differences(control_points, variant_points);
        let excluded = n_pairs - relative.len();
        if relative.is_empty() {
            return Err(ComparisonError::NoValidRelativeDifferences { total: n_pairs });
        }
        if excluded > 0 && fraction(excluded, n_pairs) > self.config.max_excluded_fraction {
            self.diagnostics.report(CorrectnessWarning::HighExclusionRate {
                excluded,
                total: n_pairs,
                max_fraction: self.config.max_excluded_fraction,
            });
        }

        let mean_relative = relative.iter().sum::<f64>() / as_f64(relative.len());
        relative.sort_by(f64::total_cmp);
        let alpha = self.config.significance_level;
        let (ci_lower, ci_upper) = match (
            percentile_of_sorted(&relative, alpha / 2.0),
            percentile_of_sorted(&relative, 1.0 - alpha / 2.0),
        ) {
            (Some(lower), Some(upper)) => (lower, upper),
            _ => return Err(ComparisonError::NoValidRelativeDifferences { total: n_pairs }),
        };

        let b_wins = control_points.iter().zip(variant_points).filter(|(a, b)| b > a).count();
        let prob_b_better = fraction(b_wins, n_pairs);

        let summary = ComparisonSummary::new(
            mean_relative * 100.0,
            ci_lower * 100.0,
            ci_upper * 100.0,
            prob_b_better,
        );
        debug!(
            control = control.label(),
            variant = variant.label(),
            n_pairs,
            excluded,
            ?summary,
            "Compared posteriors."
        );

        Ok(PairwiseComparison {
            control: control.label().to_string(),
            variant: variant.label().to_string(),
            summary,
            difference: absolute_difference(control_points, variant_points)?,
        })
    }

    /// Reduces a multi-variant posterior set to one comparison per non-control variant, in input
    /// order.
    pub fn compare_to_control(
        &self,
        posteriors: &[VariantPosterior],
    ) -> Result<Vec<PairwiseComparison>, ComparisonError> {
        let control = posteriors
            .iter()
            .find(|posterior| posterior.is_control)
            .ok_or(ComparisonError::MissingControlPosterior)?;
        posteriors
            .iter()
            .filter(|posterior| !posterior.is_control)
            .map(|variant| self.compare(&control.posterior, &variant.posterior))
            .collect()
    }
}

/// Paired views of both posteriors, truncated to the shorter one. A length mismatch is reported
/// to `diagnostics` and is never an error.
pub fn aligned_points<'a>(
    control: &'a PosteriorData,
    variant: &'a PosteriorData,
    diagnostics: &dyn DiagnosticsSink,
) -> (&'a [f64], &'a [f64]) {
    let (control_len, variant_len) = (control.n_draws(), variant.n_draws());
    if control_len != variant_len {
        diagnostics.report(CorrectnessWarning::SampleLengthMismatch { control_len, variant_len });
    }
    let n_pairs = control_len.min(variant_len);
    (&control.points()[..n_pairs], &variant.points()[..n_pairs])
}

pub fn absolute_difference(
    control_points: &[f64],
    variant_points: &[f64],
) -> Result<PosteriorData, ComparisonError> {
    let difference = control_points.iter().zip(variant_points).map(|(a, b)| b - a).collect();
    PosteriorData::new(DIFFERENCE_LABEL, difference)
}

// Pairs with a zero control draw (or a non-finite quotient) are left out.
fn relative_differences(control_points: &[f64], variant_points: &[f64]) -> Vec<f64> {
    control_points
        .iter()
        .zip(variant_points)
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, b)| (b - a) / a)
        .filter(|relative| relative.is_finite())
        .collect()
}

fn fraction(count: usize, total: usize) -> f64 {
    as_f64(count) / as_f64(total)
}

#[allow(clippy::as_conversions)]
fn as_f64(value: usize) -> f64 {
    value as f64
}
