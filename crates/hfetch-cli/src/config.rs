//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (TOML/JSON)
//! - Command-line arguments

use crate::cli::RequestArgs;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default read limit applied when neither the file nor the flags set one
pub const DEFAULT_MAX_BODY_SIZE: u64 = 10 * 1024 * 1024;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Request defaults
    pub request: RequestConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Defaults applied to every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Body read limit in bytes, 0 for unbounded
    pub max_body_size: u64,

    /// Follow redirects
    pub follow_redirects: bool,

    /// User-Agent sent when no header overrides it
    pub user_agent: Option<String>,

    /// Headers added to every request
    pub headers: BTreeMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (compact, full, json)
    pub format: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            follow_redirects: true,
            user_agent: None,
            headers: BTreeMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Request settings after flags have been laid over the file
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub timeout: Option<Duration>,
    pub max_body_size: u64,
    pub follow_redirects: bool,
    pub user_agent: Option<String>,
    /// File headers first, then flag headers; a flag replaces every file
    /// value for the same name
    pub headers: Vec<(String, String)>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration file");
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".hfetch.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("hfetch").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".hfetch.toml"));
        }

        paths
    }

    /// Lay command-line flags over the file's request defaults
    pub fn resolve(&self, args: &RequestArgs) -> ResolvedRequest {
        let defaults = &self.request;

        let timeout = args
            .timeout
            .or(defaults.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let mut headers: Vec<(String, String)> = defaults
            .headers
            .iter()
            .filter(|(name, _)| {
                !args
                    .headers
                    .iter()
                    .any(|(flag, _)| flag.eq_ignore_ascii_case(name))
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        headers.extend(args.headers.iter().cloned());

        ResolvedRequest {
            timeout,
            max_body_size: args.max_body_size.unwrap_or(defaults.max_body_size),
            follow_redirects: defaults.follow_redirects && !args.no_redirects,
            user_agent: defaults.user_agent.clone(),
            headers,
        }
    }
}
