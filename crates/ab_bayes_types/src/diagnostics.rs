use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Non-fatal finding that may compromise the accuracy of a result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CorrectnessWarning {
    /// Control and variant posteriors had different lengths; both were truncated to the shorter.
    SampleLengthMismatch { control_len: usize, variant_len: usize },
    /// A response carried a different number of comparisons than the caller expected.
    UnexpectedComparisonCount { expected: usize, found: usize },
    /// Too many sample pairs were dropped from the relative difference (zero control draws).
    HighExclusionRate { excluded: usize, total: usize, max_fraction: f64 },
}

impl CorrectnessWarning {
    /// Stable identifier, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SampleLengthMismatch { .. } => "sample_length_mismatch",
            Self::UnexpectedComparisonCount { .. } => "unexpected_comparison_count",
            Self::HighExclusionRate { .. } => "high_exclusion_rate",
        }
    }
}

impl Display for CorrectnessWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SampleLengthMismatch { control_len, variant_len } => write!(
                f,
                "Posterior lengths differ (control: {control_len}, variant: {variant_len}); \
                 truncating to {}.",
                control_len.min(variant_len)
            ),
            Self::UnexpectedComparisonCount { expected, found } => {
                write!(f, "Unexpected number of comparisons: expected {expected}, found {found}.")
            }
            Self::HighExclusionRate { excluded, total, max_fraction } => write!(
                f,
                "{excluded} of {total} sample pairs were excluded from the relative difference \
                 (allowed fraction: {max_fraction})."
            ),
        }
    }
}
