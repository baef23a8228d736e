use crate::remote_objects::{
    ComparisonStatistics,
    ExecutionDetails,
    Posterior,
    RemoteInferenceResponse,
    Statistics,
    VariantComparison,
    VariantMetadata,
};
use crate::variant::{VariantInput, VariantSet};

pub const DEFAULT_RELATIVE_COMPARISON: ComparisonStatistics =
    ComparisonStatistics { proportional_difference: 0.1, ci_lower: 0.05, ci_upper: 0.15 };
pub const DEFAULT_WINNING_PROBABILITY: f64 = 0.9;

pub fn statistics_with_posterior(variant: &VariantInput, data: Option<Vec<f64>>) -> Statistics {
    Statistics {
        enrollments: Some(variant.enrollments()),
        conversions: Some(variant.conversions()),
        posterior: Some(Posterior { data, percentiles: None }),
        ..Default::default()
    }
}

pub fn pairwise_entry(variant: &VariantInput, data: Option<Vec<f64>>) -> VariantComparison {
    VariantComparison {
        key: variant.variant_key(),
        name: Some(variant.name().to_string()),
        is_control: Some(variant.is_control()),
        statistics: statistics_with_posterior(variant, data),
        compared_to_variant: None,
    }
}

pub fn versus_control_entry(variant: &VariantInput, control: &VariantInput) -> VariantComparison {
    VariantComparison {
        key: variant.variant_key(),
        name: Some(variant.name().to_string()),
        is_control: Some(false),
        statistics: Statistics {
            comparison_relative: Some(DEFAULT_RELATIVE_COMPARISON),
            winning_probability: Some(DEFAULT_WINNING_PROBABILITY),
            ..statistics_with_posterior(variant, None)
        },
        compared_to_variant: Some(VariantMetadata {
            key: control.variant_key(),
            name: control.name().to_string(),
        }),
    }
}

/// A response describing `variants`, with `posteriors[i]` as the samples of the i-th variant.
/// Pairwise entries are emitted in reverse order so callers cannot rely on positions.
pub fn response_for(
    variants: &VariantSet,
    posteriors: Vec<Option<Vec<f64>>>,
) -> RemoteInferenceResponse {
    let pairwise_comparisons = variants
        .iter()
        .zip(posteriors)
        .map(|(variant, data)| pairwise_entry(variant, data))
        .rev()
        .collect();
    let versus_control = variants
        .test_variants()
        .map(|variant| versus_control_entry(variant, variants.control()))
        .collect();
    RemoteInferenceResponse {
        pairwise_comparisons,
        versus_control,
        execution_details: ExecutionDetails {
            execution_time_micro_seconds: 1_250_000,
            execution_size: 4000,
        },
    }
}
