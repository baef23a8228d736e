use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
#[path = "output_test.rs"]
mod output_test;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Writes `value` as pretty JSON to a temporary file next to `path`, then renames it over `path`.
/// Readers never observe a partially written file.
pub fn write_json_atomically<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let contents = serde_json::to_string_pretty(value)?;
    let io_error = |source| OutputError::Io { path: path.to_path_buf(), source };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(directory).map_err(io_error)?;
    file.write_all(contents.as_bytes()).map_err(io_error)?;
    file.flush().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;

    debug!("Wrote {} bytes to {path:?}.", contents.len());
    Ok(())
}
