//! Configuration of the posterior comparison engine.
//!
//! Every config struct can be validated with [`validator::Validate`] and flattened into a map of
//! `section.param_name -> {description, value, privacy}` through
//! [`dumping::SerializeConfig`].

pub mod config;
pub mod dumping;
pub mod loading;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::ValidationErrors;

pub const FIELD_SEPARATOR: &str = ".";
pub const IS_NONE_MARK: &str = "#is_none";

/// Dotted path of a parameter, e.g. `comparison.significance_level`.
pub type ParamPath = String;

/// Whether a param value may be written out in clear text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamPrivacy {
    Public,
    Private,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedParam {
    pub description: String,
    pub value: Value,
    pub privacy: ParamPrivacy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Failed to parse config file {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
    #[error("Failed to serialize config dump for {path}: {source}")]
    Serialize { path: String, source: serde_json::Error },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}
