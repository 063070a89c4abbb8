use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common::config::{
    default_endpoint, Config, Mode, DEFAULT_BACKUP_DIR, DEFAULT_BUCKET_TYPES, DEFAULT_PARALLELISM,
    DEFAULT_PROGRESS_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::args::Overrides;

/// Settings shared by every subcommand. Read from an optional TOML file;
/// missing keys fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_endpoint")]
    pub source: Url,
    #[serde(default = "default_endpoint")]
    pub destination: Url,
    #[serde(default = "default_bucket_types")]
    pub bucket_types: Vec<String>,
    #[serde(default = "default_parallel")]
    pub parallel: NonZeroUsize,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_progress_interval", with = "humantime_serde")]
    pub progress_interval: Duration,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
}

fn default_bucket_types() -> Vec<String> {
    DEFAULT_BUCKET_TYPES.iter().map(|t| t.to_string()).collect()
}

fn default_parallel() -> NonZeroUsize {
    DEFAULT_PARALLELISM
}

fn default_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_progress_interval() -> Duration {
    DEFAULT_PROGRESS_INTERVAL
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BACKUP_DIR)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: default_endpoint(),
            destination: default_endpoint(),
            bucket_types: default_bucket_types(),
            parallel: default_parallel(),
            timeout: default_timeout(),
            progress_interval: default_progress_interval(),
            backup_dir: default_backup_dir(),
        }
    }
}

impl AppConfig {
    /// Load settings from `path`, or the defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self, StateError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(StateError::MissingFile(path.to_path_buf()));
        }

        let config_toml = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(source) = &overrides.source {
            self.source = source.clone();
        }
        if let Some(destination) = &overrides.destination {
            self.destination = destination.clone();
        }
        if let Some(bucket_types) = &overrides.bucket_types {
            self.bucket_types = bucket_types.clone();
        }
        if let Some(parallel) = overrides.parallel {
            self.parallel = parallel;
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = timeout;
        }
        if let Some(progress_interval) = overrides.progress_interval {
            self.progress_interval = progress_interval;
        }
        self
    }

    /// Run configuration for `mode`; per-subcommand flags are applied by the caller
    pub fn to_config(&self, mode: Mode) -> Config {
        Config {
            source: self.source.clone(),
            destination: self.destination.clone(),
            bucket_types: self.bucket_types.clone(),
            parallelism: self.parallel,
            request_timeout: self.timeout,
            progress_interval: self.progress_interval,
            mode,
            backup_dir: self.backup_dir.clone(),
            skip_existing: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
