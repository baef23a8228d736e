use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

#[cfg(test)]
#[path = "variant_test.rs"]
mod variant_test;

/// Names given to variants built from raw counts: the control is `A`, test variants follow.
pub const VARIANT_NAMES: &str = "ABCDEFGHIJKLMNOPQRSTUV";

/// Trial data of a single experiment variant.
///
/// The `variant_key` is generated once at construction and is what backend responses are
/// correlated against; it never changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVariantInput")]
pub struct VariantInput {
    variant_key: Uuid,
    name: String,
    is_control: bool,
    enrollments: u64,
    conversions: u64,
}

#[derive(Deserialize)]
struct RawVariantInput {
    variant_key: Uuid,
    name: String,
    is_control: bool,
    enrollments: u64,
    conversions: u64,
}

impl TryFrom<RawVariantInput> for VariantInput {
    type Error = ValidationError;

    fn try_from(raw: RawVariantInput) -> Result<Self, Self::Error> {
        Self::with_key(raw.variant_key, raw.name, raw.is_control, raw.enrollments, raw.conversions)
    }
}

impl VariantInput {
    pub fn new(
        name: impl Into<String>,
        is_control: bool,
        enrollments: u64,
        conversions: u64,
    ) -> Result<Self, ValidationError> {
        Self::with_key(Uuid::new_v4(), name, is_control, enrollments, conversions)
    }

    /// Like [`VariantInput::new`], with an explicit key.
    pub fn with_key(
        variant_key: Uuid,
        name: impl Into<String>,
        is_control: bool,
        enrollments: u64,
        conversions: u64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if enrollments == 0 {
            return Err(ValidationError::NonPositiveEnrollments { name });
        }
        if conversions > enrollments {
            return Err(ValidationError::ConversionsExceedEnrollments {
                name,
                enrollments,
                conversions,
            });
        }
        Ok(Self { variant_key, name, is_control, enrollments, conversions })
    }

    pub fn variant_key(&self) -> Uuid {
        self.variant_key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_control(&self) -> bool {
        self.is_control
    }

    pub fn enrollments(&self) -> u64 {
        self.enrollments
    }

    pub fn conversions(&self) -> u64 {
        self.conversions
    }

    pub fn failures(&self) -> u64 {
        self.enrollments - self.conversions
    }
}

/// A non-empty, ordered list of variants with exactly one control and unique keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantSet {
    variants: Vec<VariantInput>,
    control_index: usize,
}

impl VariantSet {
    pub fn new(variants: Vec<VariantInput>) -> Result<Self, ValidationError> {
        if variants.is_empty() {
            return Err(ValidationError::EmptyVariantList);
        }

        let control_indices: Vec<usize> = variants
            .iter()
            .enumerate()
            .filter_map(|(index, variant)| variant.is_control().then_some(index))
            .collect();
        let control_index = match control_indices.as_slice() {
            [] => return Err(ValidationError::MissingControl),
            [index] => *index,
            _ => return Err(ValidationError::MultipleControls { count: control_indices.len() }),
        };

        let mut seen_keys = HashSet::with_capacity(variants.len());
        for variant in &variants {
            if !seen_keys.insert(variant.variant_key()) {
                return Err(ValidationError::DuplicateVariantKey { key: variant.variant_key() });
            }
        }

        Ok(Self { variants, control_index })
    }

    /// Builds a set from `(enrollments, conversions)` pairs, naming variants from
    /// [`VARIANT_NAMES`].
    pub fn from_counts(
        control: (u64, u64),
        test_variants: &[(u64, u64)],
    ) -> Result<Self, ValidationError> {
        let count = test_variants.len() + 1;
        if count > VARIANT_NAMES.len() {
            return Err(ValidationError::TooManyVariants { max: VARIANT_NAMES.len(), count });
        }

        let mut names = VARIANT_NAMES.chars();
        let mut variants = Vec::with_capacity(count);
        for (index, (enrollments, conversions)) in
            std::iter::once(control).chain(test_variants.iter().copied()).enumerate()
        {
            let name = names.next().map(String::from).unwrap_or_default();
            variants.push(VariantInput::new(name, index == 0, enrollments, conversions)?);
        }
        Self::new(variants)
    }

    pub fn control(&self) -> &VariantInput {
        &self.variants[self.control_index]
    }

    /// The non-control variants, in input order.
    pub fn test_variants(&self) -> impl Iterator<Item = &VariantInput> {
        self.variants.iter().filter(|variant| !variant.is_control())
    }

    pub fn as_slice(&self) -> &[VariantInput] {
        &self.variants
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VariantInput> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<'a> IntoIterator for &'a VariantSet {
    type Item = &'a VariantInput;
    type IntoIter = std::slice::Iter<'a, VariantInput>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
