//! Pipeline configuration.
//!
//! Every section is optional in the TOML file; missing sections fall back to
//! the built-in defaults.
//!
//! ```toml
//! [matching]
//! order = "data"
//!
//! [[subgroups]]
//! name = "Age>=65"
//! filter = { kind = "min_age", years = 65.0 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cohort_map::{MappingError, MappingSet};
use cohort_match::{FitOptions, MatchOptions};
use cohort_report::{Subgroup, default_subgroups};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid mapping in {path}: {source}")]
    Mapping {
        path: PathBuf,
        #[source]
        source: MappingError,
    },
}

/// Everything one run needs besides the workbook itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sheet names and column mappings per arm.
    pub mappings: MappingSet,
    pub fit: FitOptions,
    pub matching: MatchOptions,
    pub subgroups: Vec<Subgroup>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mappings: MappingSet::default(),
            fit: FitOptions::default(),
            matching: MatchOptions::default(),
            subgroups: default_subgroups(),
        }
    }
}

impl PipelineConfig {
    /// Loads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .mappings
            .validate()
            .map_err(|source| ConfigError::Mapping {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
