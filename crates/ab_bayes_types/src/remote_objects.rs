//! Wire objects exchanged with the remote binomial-conversion inference service.
//!
//! The response identifies variants by key only. Entries must be located through
//! [`RemoteInferenceResponse::pairwise_by_key`], never by their position in the arrays.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::RemoteInferenceError;
use crate::variant::{VariantInput, VariantSet};

#[cfg(test)]
#[path = "remote_objects_test.rs"]
mod remote_objects_test;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInferenceRequest {
    pub variants: Vec<VariantInput>,
    pub return_posteriors: bool,
}

impl RemoteInferenceRequest {
    pub fn new(variants: &VariantSet, return_posteriors: bool) -> Self {
        Self { variants: variants.as_slice().to_vec(), return_posteriors }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteInferenceResponse {
    #[serde(default)]
    pub pairwise_comparisons: Vec<VariantComparison>,
    #[serde(default)]
    pub versus_control: Vec<VariantComparison>,
    pub execution_details: ExecutionDetails,
}

impl RemoteInferenceResponse {
    /// Rejects responses that are well-formed JSON but violate the service contract.
    pub fn validate(&self) -> Result<(), RemoteInferenceError> {
        let mut seen_keys = HashSet::with_capacity(self.pairwise_comparisons.len());
        for comparison in &self.pairwise_comparisons {
            if !seen_keys.insert(comparison.key) {
                return Err(RemoteInferenceError::InvalidField {
                    field: "key".to_string(),
                    key: comparison.key,
                    reason: "duplicate pairwise comparison key".to_string(),
                });
            }
        }
        for comparison in self.pairwise_comparisons.iter().chain(&self.versus_control) {
            comparison.statistics.validate(comparison.key)?;
        }
        Ok(())
    }

    pub fn pairwise_by_key(&self) -> HashMap<Uuid, &VariantComparison> {
        self.pairwise_comparisons.iter().map(|comparison| (comparison.key, comparison)).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantComparison {
    pub key: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_control: Option<bool>,
    pub statistics: Statistics,
    /// Present on `versus_control` entries: the variant this one was compared against.
    #[serde(default)]
    pub compared_to_variant: Option<VariantMetadata>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantMetadata {
    pub key: Uuid,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub enrollments: Option<u64>,
    #[serde(default)]
    pub conversions: Option<u64>,
    #[serde(default)]
    pub comparison_absolute: Option<ComparisonStatistics>,
    #[serde(default)]
    pub comparison_relative: Option<ComparisonStatistics>,
    #[serde(default)]
    pub winning_probability: Option<f64>,
    #[serde(default)]
    pub posterior: Option<Posterior>,
}

impl Statistics {
    fn validate(&self, key: Uuid) -> Result<(), RemoteInferenceError> {
        if let Some(probability) = self.winning_probability {
            if !(0.0..=1.0).contains(&probability) {
                return Err(RemoteInferenceError::InvalidField {
                    field: "winning_probability".to_string(),
                    key,
                    reason: format!("{probability} is not a probability"),
                });
            }
        }
        let data = self.posterior.as_ref().and_then(|posterior| posterior.data.as_ref());
        if let Some(data) = data {
            if data.iter().any(|point| !point.is_finite()) {
                return Err(RemoteInferenceError::InvalidField {
                    field: "posterior.data".to_string(),
                    key,
                    reason: "non-finite sample".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonStatistics {
    pub proportional_difference: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Posterior {
    /// Raw samples; only populated when the request asked for posteriors.
    #[serde(default)]
    pub data: Option<Vec<f64>>,
    #[serde(default)]
    pub percentiles: Option<PosteriorPercentiles>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PosteriorPercentiles {
    pub p05: f64,
    pub p10: f64,
    pub p15: f64,
    pub p20: f64,
    pub p25: f64,
    pub p30: f64,
    pub p35: f64,
    pub p40: f64,
    pub p45: f64,
    pub p50: f64,
    pub p55: f64,
    pub p60: f64,
    pub p65: f64,
    pub p70: f64,
    pub p75: f64,
    pub p80: f64,
    pub p85: f64,
    pub p90: f64,
    pub p95: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionDetails {
    pub execution_time_micro_seconds: u64,
    pub execution_size: u64,
}

impl ExecutionDetails {
    pub fn execution_time(&self) -> Duration {
        Duration::from_micros(self.execution_time_micro_seconds)
    }
}
