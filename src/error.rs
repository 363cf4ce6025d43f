//! Error types shared by the engine and the downstream steps.
//!
//! Only unexpected I/O or parse failures surface here; missing units, weapons
//! and parent catalogues are logged and skipped by the engine instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WarboardError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse XML in '{}': {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("failed to parse JSON in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML in '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Failures that are fatal for one faction but never for the whole run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("primary catalogue not found: {}", .0.display())]
    MissingPrimary(PathBuf),
}

pub type Result<T> = std::result::Result<T, WarboardError>;
