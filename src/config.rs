//! Registry configuration: optional TOML file, then environment overrides.
//!
//! ```toml
//! database = "stalls.db"
//! seed_examples = true
//! max_image_bytes = 5242880
//! log_filter = "stall_registry=debug"
//! ```

use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StallError};
use crate::image::DEFAULT_MAX_IMAGE_BYTES;

pub const DEFAULT_DATABASE: &str = ".stalls.db";
pub const DEFAULT_LOG_FILTER: &str = "stall_registry=info";

pub const ENV_DATABASE: &str = "STALL_REGISTRY_DB";
pub const ENV_SEED: &str = "STALL_REGISTRY_SEED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// SQLite file holding both collections.
    pub database: PathBuf,
    /// Write example stalls into an empty registry on initialization.
    pub seed_examples: bool,
    /// Largest image file accepted for ingestion.
    pub max_image_bytes: u64,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            seed_examples: true,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Loads `path` if given, otherwise defaults, then applies environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StallError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| StallError::Config(e.to_string()))
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(database) = var(ENV_DATABASE) {
            self.database = PathBuf::from(database);
        }
        if let Some(seed) = parse_var::<bool>(ENV_SEED)? {
            self.seed_examples = seed;
        }
        Ok(self)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| StallError::Config(format!("invalid {} value '{}': {}", key, raw, e))),
        None => Ok(None),
    }
}
