use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::errors::ComparisonError;
use crate::variant::VariantInput;

#[cfg(test)]
#[path = "posterior_test.rs"]
mod posterior_test;

/// A named, non-empty collection of finite posterior draws.
///
/// Equality compares the draws only: `label` is informational and may be overwritten for
/// display without changing the identity of the data.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "RawPosteriorData")]
pub struct PosteriorData {
    label: String,
    points: Vec<f64>,
}

// Serialized documents also carry `mean`; it is recomputed on load.
#[derive(Deserialize)]
struct RawPosteriorData {
    label: String,
    points: Vec<f64>,
}

impl TryFrom<RawPosteriorData> for PosteriorData {
    type Error = ComparisonError;

    fn try_from(raw: RawPosteriorData) -> Result<Self, Self::Error> {
        Self::new(raw.label, raw.points)
    }
}

impl PosteriorData {
    pub fn new(label: impl Into<String>, points: Vec<f64>) -> Result<Self, ComparisonError> {
        let label = label.into();
        if points.is_empty() {
            return Err(ComparisonError::EmptyPosterior { label });
        }
        if let Some(index) = points.iter().position(|point| !point.is_finite()) {
            return Err(ComparisonError::NonFiniteSample { label, index });
        }
        Ok(Self { label, points })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of draws; always at least one.
    pub fn n_draws(&self) -> usize {
        self.points.len()
    }

    pub fn mean(&self) -> f64 {
        #[allow(clippy::as_conversions)]
        let n_draws = self.points.len() as f64;
        self.points.iter().sum::<f64>() / n_draws
    }

    pub fn min(&self) -> f64 {
        self.points.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.points.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

impl PartialEq for PosteriorData {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl Serialize for PosteriorData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PosteriorData", 3)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("points", &self.points)?;
        state.serialize_field("mean", &self.mean())?;
        state.end()
    }
}

/// Latent conversion-rate posterior of one variant, tagged with the variant's identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantPosterior {
    pub variant_key: Uuid,
    pub name: String,
    pub is_control: bool,
    pub posterior: PosteriorData,
}

impl VariantPosterior {
    pub fn new(variant: &VariantInput, points: Vec<f64>) -> Result<Self, ComparisonError> {
        Ok(Self {
            variant_key: variant.variant_key(),
            name: variant.name().to_string(),
            is_control: variant.is_control(),
            posterior: PosteriorData::new(variant.name(), points)?,
        })
    }
}
