//! Utils for serializing config objects into a flattened map and a JSON file.
//!
//! The elements structure is:
//!
//! ```json
//! "section.param_name": {
//!     "description": "Param description.",
//!     "value": json_value,
//!     "privacy": "public"
//! }
//! ```
//!
//! Optional params are accompanied by a `section.param_name.#is_none` flag. Private params are
//! written with a `null` value.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use crate::{ConfigError, ParamPath, ParamPrivacy, SerializedParam, FIELD_SEPARATOR, IS_NONE_MARK};

/// Serialization for configs.
pub trait SerializeConfig {
    /// Conversion of a configuration to a mapping of flattened parameters to their descriptions
    /// and values.
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam>;

    /// Writes the dump as pretty JSON, redacting private values. The file is replaced atomically.
    fn dump_to_file(&self, file_path: &str) -> Result<(), ConfigError> {
        let redacted: BTreeMap<ParamPath, SerializedParam> = self
            .dump()
            .into_iter()
            .map(|(path, mut param)| {
                if param.privacy == ParamPrivacy::Private {
                    param.value = Value::Null;
                }
                (path, param)
            })
            .collect();
        let contents = serde_json::to_string_pretty(&redacted)
            .map_err(|source| ConfigError::Serialize { path: file_path.to_string(), source })?;

        let io_error = |source| ConfigError::Io { path: file_path.to_string(), source };
        let path = Path::new(file_path);
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(directory).map_err(io_error)?;
        file.write_all(contents.as_bytes()).map_err(io_error)?;
        file.persist(path).map_err(|err| io_error(err.error))?;
        Ok(())
    }
}

/// Prepends `sub_config_name` to the ParamPath for each entry in `sub_config_dump`.
pub fn prepend_sub_config_name(
    sub_config_dump: BTreeMap<ParamPath, SerializedParam>,
    sub_config_name: &str,
) -> BTreeMap<ParamPath, SerializedParam> {
    sub_config_dump
        .into_iter()
        .map(|(field_name, param)| {
            (format!("{sub_config_name}{FIELD_SEPARATOR}{field_name}"), param)
        })
        .collect()
}

/// Serializes a single param of a config.
/// The returned pair is designed to be an input to a dumped config map.
pub fn ser_param<T: Serialize>(
    name: &str,
    value: &T,
    description: &str,
    privacy: ParamPrivacy,
) -> (ParamPath, SerializedParam) {
    (
        name.to_owned(),
        SerializedParam { description: description.to_owned(), value: json!(value), privacy },
    )
}

/// Serializes an optional param (or `default_value` when it is None) and adds an `#is_none` flag.
pub fn ser_optional_param<T: Serialize>(
    optional_param: &Option<T>,
    default_value: T,
    name: &str,
    description: &str,
    privacy: ParamPrivacy,
) -> BTreeMap<ParamPath, SerializedParam> {
    BTreeMap::from([
        ser_param(
            &format!("{name}{FIELD_SEPARATOR}{IS_NONE_MARK}"),
            &optional_param.is_none(),
            "Flag for an optional field.",
            ParamPrivacy::Public,
        ),
        ser_param(name, optional_param.as_ref().unwrap_or(&default_value), description, privacy),
    ])
}
