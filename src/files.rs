//! JSON document I/O shared by every pipeline step.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, WarboardError};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|source| WarboardError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| WarboardError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `value` to `path` with a trailing newline, creating parent
/// directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(value).map_err(|source| WarboardError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    payload.push('\n');
    write_text(path, &payload)
}

pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| WarboardError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| WarboardError::Write {
        path: path.to_path_buf(),
        source,
    })
}
