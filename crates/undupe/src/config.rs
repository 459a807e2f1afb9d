//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use undupe_core::{AlignmentEngine, Settings, Tab};

pub const DEFAULT_API_URL: &str = "https://undupify-updated.onrender.com";
pub const API_URL_ENV: &str = "UNDUPE_API_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Client configuration, loaded from `~/.config/undupe/config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the comparison service
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Deadline for a single alignment; 0 disables it
    pub diff_timeout_ms: u64,
    /// Where downloaded artifacts are written (defaults to the download dir)
    pub download_dir: Option<PathBuf>,
    /// Tab shown on startup
    pub default_tab: Tab,
    /// Default text column for dataset uploads
    pub text_column: Option<String>,
    /// Maximum number of matches requested for folder comparisons
    pub top_k: Option<u32>,
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 300,
            connect_timeout_secs: 10,
            diff_timeout_ms: 2000,
            download_dir: None,
            default_tab: Tab::default(),
            text_column: None,
            top_k: None,
            settings: Settings::default(),
        }
    }
}

impl Config {
    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("undupe").join("config.toml"))
    }

    /// Load from an explicit path (must exist) or the default location (optional)
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply environment overrides through the given lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn alignment_engine(&self) -> AlignmentEngine {
        let timeout = (self.diff_timeout_ms > 0).then(|| Duration::from_millis(self.diff_timeout_ms));
        AlignmentEngine::new().with_timeout(timeout)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
