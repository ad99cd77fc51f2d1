use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{InsightError, Result};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "phc_insights.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the survey exports and the telecom source file
    pub data_dir: PathBuf,
    /// Directory the artifacts are written to and served from
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Freshness window of the artifact cache
    pub cache_ttl_secs: u64,
    /// Write a rendered metrics snapshot next to the artifacts after a run
    pub metrics_snapshot: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("outputs"),
            log_dir: PathBuf::from("logs"),
            cache_ttl_secs: 30,
            metrics_snapshot: true,
        }
    }
}

impl Config {
    /// Load configuration from `PHC_CONFIG` (or `phc_insights.toml` when present),
    /// then apply `PHC_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match env::var("PHC_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            InsightError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = env::var("PHC_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("PHC_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("PHC_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Ok(ttl) = env::var("PHC_CACHE_TTL_SECS") {
            self.cache_ttl_secs = ttl.trim().parse().map_err(|_| {
                InsightError::Config(format!("PHC_CACHE_TTL_SECS is not a number: '{}'", ttl))
            })?;
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
