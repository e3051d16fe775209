//! Run configuration: the classification endpoint URL.
//!
//! Loaded once at startup from a TOML file with an `[api]` table, by default
//! `relabel.toml` next to the running binary. The loaded value is passed into
//! the pipeline explicitly; nothing reads it as ambient state.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name looked up next to the binary when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "relabel.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("api.url is empty in {0}")]
    EmptyUrl(PathBuf),

    #[error("cannot locate the running executable: {0}")]
    NoExePath(std::io::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Classification endpoint URL requests are POSTed to.
    pub url: String,
}

impl Config {
    /// Parse the configuration at `path`.
    ///
    /// A missing `[api]` table or `url` key surfaces as a parse error; an
    /// empty URL is rejected too. All of these abort the run before any row
    /// is processed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.api.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl(path.to_path_buf()));
        }
        Ok(config)
    }

    /// Default config location: [`DEFAULT_CONFIG_FILE`] in the directory of
    /// the running binary.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let exe = std::env::current_exe().map_err(ConfigError::NoExePath)?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(dir.join(DEFAULT_CONFIG_FILE))
    }
}
