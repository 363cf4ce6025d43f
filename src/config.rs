//! Runtime configuration: directory layout from the environment, plus the
//! id-keyed special-case table loaded from YAML.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bsdata::output::StatOperation;
use crate::error::{Result, WarboardError};

pub const DEFAULT_BSDATA_DIR: &str = "data/bsdata/wh40k-10e";
pub const DEFAULT_PARSED_DIR: &str = "data/parsed";
pub const DEFAULT_MANUAL_DIR: &str = "data/manual";
pub const DEFAULT_OUTPUT_DIR: &str = "public/data";
pub const DEFAULT_SPECIAL_CASES_PATH: &str = "data/special_cases.yaml";

/// Where each pipeline step reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Checkout of the BSData game-system repository (`*.cat` files).
    pub bsdata_dir: PathBuf,
    /// Engine output, one JSON document per faction.
    pub parsed_dir: PathBuf,
    /// Hand-authored documents merged by `generate`.
    pub manual_dir: PathBuf,
    /// Merged documents consumed by the app and checked by `validate`.
    pub output_dir: PathBuf,
    pub special_cases_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bsdata_dir: PathBuf::from(DEFAULT_BSDATA_DIR),
            parsed_dir: PathBuf::from(DEFAULT_PARSED_DIR),
            manual_dir: PathBuf::from(DEFAULT_MANUAL_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            special_cases_path: PathBuf::from(DEFAULT_SPECIAL_CASES_PATH),
        }
    }
}

impl Settings {
    /// Read `WARBOARD_*` overrides, falling back to the repository defaults.
    pub fn from_env() -> Self {
        Settings {
            bsdata_dir: env_path("WARBOARD_BSDATA_DIR", DEFAULT_BSDATA_DIR),
            parsed_dir: env_path("WARBOARD_PARSED_DIR", DEFAULT_PARSED_DIR),
            manual_dir: env_path("WARBOARD_MANUAL_DIR", DEFAULT_MANUAL_DIR),
            output_dir: env_path("WARBOARD_OUTPUT_DIR", DEFAULT_OUTPUT_DIR),
            special_cases_path: env_path("WARBOARD_SPECIAL_CASES", DEFAULT_SPECIAL_CASES_PATH),
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Fixed stat modifier granted by an info-linked profile that carries no
/// modifier node of its own in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBonus {
    pub profile_id: String,
    /// Display name, for humans reading the table only. Never matched.
    #[serde(default)]
    pub name: Option<String>,
    pub stat: String,
    #[serde(default = "default_bonus_operation")]
    pub operation: StatOperation,
    pub value: i64,
}

fn default_bonus_operation() -> StatOperation {
    StatOperation::Add
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderModel {
    pub entry_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Known special cases, keyed by stable BSData ids rather than display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialCases {
    #[serde(default)]
    pub stat_bonuses: Vec<StatBonus>,
    #[serde(default)]
    pub leader_models: Vec<LeaderModel>,
}

impl SpecialCases {
    /// Load the table. A missing file is an empty table; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("special cases: {} not found, using empty table", path.display());
            return Ok(SpecialCases::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| WarboardError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| WarboardError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(SpecialCases::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn stat_bonus(&self, profile_id: &str) -> Option<&StatBonus> {
        self.stat_bonuses
            .iter()
            .find(|bonus| bonus.profile_id == profile_id)
    }

    pub fn is_leader_model(&self, entry_id: &str) -> bool {
        self.leader_models
            .iter()
            .any(|leader| leader.entry_id == entry_id)
    }
}
