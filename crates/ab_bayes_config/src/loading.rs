//! Loading of [`AbBayesConfig`] from a JSON file.
//!
//! Two layouts are accepted:
//! - nested sections, e.g. `{"comparison": {"significance_level": 0.1}}`;
//! - the flattened dump written by [`SerializeConfig::dump_to_file`], where every entry is a
//!   `section.param_name -> {description, value, privacy}` record.
//!
//! Sections and params missing from the file take their default values, and unknown params are
//! rejected. Redacted private params keep their defaults. The loaded config is validated before
//! it is returned.
//!
//! [`SerializeConfig::dump_to_file`]: crate::dumping::SerializeConfig::dump_to_file

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::info;
use validator::Validate;

use crate::config::AbBayesConfig;
use crate::{ConfigError, ParamPath, ParamPrivacy, SerializedParam, FIELD_SEPARATOR, IS_NONE_MARK};

#[cfg(test)]
#[path = "loading_test.rs"]
mod loading_test;

pub fn load_config(path: impl AsRef<Path>) -> Result<AbBayesConfig, ConfigError> {
    let path = path.as_ref();
    let display_path = path.display().to_string();
    let parse_error = |source| ConfigError::Parse { path: display_path.clone(), source };

    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: display_path.clone(), source })?;
    let raw: Value = serde_json::from_str(&contents).map_err(parse_error)?;
    let dump = serde_json::from_value::<BTreeMap<ParamPath, SerializedParam>>(raw.clone());
    let nested = match dump {
        Ok(dump) => nest_dumped_params(dump),
        Err(_) => raw,
    };
    let config: AbBayesConfig = serde_json::from_value(nested).map_err(parse_error)?;
    config.validate()?;
    info!("Loaded config from {display_path}.");
    Ok(config)
}

/// Loads the config at `path` if one is given, otherwise returns the validated defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<AbBayesConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = AbBayesConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Rebuilds the nested sections from a flattened dump, honoring `#is_none` flags.
fn nest_dumped_params(dump: BTreeMap<ParamPath, SerializedParam>) -> Value {
    let none_mark_suffix = format!("{FIELD_SEPARATOR}{IS_NONE_MARK}");
    let none_params: HashSet<ParamPath> = dump
        .iter()
        .filter(|(_, param)| param.value == Value::Bool(true))
        .filter_map(|(path, _)| path.strip_suffix(&none_mark_suffix).map(String::from))
        .collect();

    let mut root = Map::new();
    for (path, param) in dump {
        if path.ends_with(&none_mark_suffix) {
            continue;
        }
        let value = if none_params.contains(&path) { Value::Null } else { param.value };
        if param.privacy == ParamPrivacy::Private && value.is_null() {
            continue;
        }
        insert_at_path(&mut root, &path, value);
    }
    Value::Object(root)
}

fn insert_at_path(node: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once(FIELD_SEPARATOR) {
        None => {
            node.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = node.entry(head).or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child) = child {
                insert_at_path(child, rest, value);
            }
        }
    }
}
