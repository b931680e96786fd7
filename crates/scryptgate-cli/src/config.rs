//! Configuration file support.
//!
//! Looks for `config.toml` in the platform config directory
//! (`~/.config/scryptgate/config.toml` on Linux) unless `--config` or
//! `SCRYPTGATE_CONFIG` points elsewhere. A missing default file is not an
//! error; a missing explicit file is.
//!
//! ```toml
//! [params]
//! N = 16384
//! r = 8
//! p = 1
//!
//! [derive]
//! key_length = 64
//! max_memory = 268435456
//! ```
//!
//! `[params]` is forwarded untyped so the core validator reports bad values
//! with its usual messages.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use scryptgate_core::bridge::DEFAULT_KEY_LENGTH;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("--params is not valid JSON")]
    ParamsJson(#[source] serde_json::Error),

    #[error("[params] table cannot be represented as JSON")]
    ParamsTable(#[source] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub params: Option<toml::Table>,
    pub derive: DeriveSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeriveSettings {
    pub key_length: usize,
    pub max_memory: Option<u64>,
}

impl Default for DeriveSettings {
    fn default() -> Self {
        Self {
            key_length: DEFAULT_KEY_LENGTH,
            max_memory: None,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// The parameter object to validate: `--params` if given, otherwise the
    /// `[params]` table, otherwise an empty object.
    pub fn resolve_params(&self, override_json: Option<&str>) -> Result<Value, ConfigError> {
        if let Some(json) = override_json {
            return serde_json::from_str(json).map_err(ConfigError::ParamsJson);
        }
        match &self.params {
            Some(table) => serde_json::to_value(table).map_err(ConfigError::ParamsTable),
            None => Ok(Value::Object(serde_json::Map::new())),
        }
    }
}

fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "scryptgate").map(|dirs| dirs.config_dir().join("config.toml"))
}
