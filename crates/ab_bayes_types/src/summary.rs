use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "summary_test.rs"]
mod summary_test;

/// Statistics comparing a variant (B) against the control (A).
///
/// `percent_difference`, `ci_lower` and `ci_upper` are relative lifts in percent.
/// `prob_a_better` is always exactly `1 - prob_b_better`; it is never estimated on its own.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawComparisonSummary")]
pub struct ComparisonSummary {
    percent_difference: f64,
    ci_lower: f64,
    ci_upper: f64,
    prob_b_better: f64,
    prob_a_better: f64,
}

// `prob_a_better` is re-derived on load, whatever the document says.
#[derive(Deserialize)]
struct RawComparisonSummary {
    percent_difference: f64,
    ci_lower: f64,
    ci_upper: f64,
    prob_b_better: f64,
}

impl From<RawComparisonSummary> for ComparisonSummary {
    fn from(raw: RawComparisonSummary) -> Self {
        Self::new(raw.percent_difference, raw.ci_lower, raw.ci_upper, raw.prob_b_better)
    }
}

impl ComparisonSummary {
    pub fn new(percent_difference: f64, ci_lower: f64, ci_upper: f64, prob_b_better: f64) -> Self {
        Self {
            percent_difference,
            ci_lower,
            ci_upper,
            prob_b_better,
            prob_a_better: 1.0 - prob_b_better,
        }
    }

    pub fn percent_difference(&self) -> f64 {
        self.percent_difference
    }

    pub fn ci_lower(&self) -> f64 {
        self.ci_lower
    }

    pub fn ci_upper(&self) -> f64 {
        self.ci_upper
    }

    pub fn prob_b_better(&self) -> f64 {
        self.prob_b_better
    }

    pub fn prob_a_better(&self) -> f64 {
        self.prob_a_better
    }
}
