//! Logging setup for the hfetch CLI
//!
//! This module provides:
//! - Structured logging setup on stderr
//! - Multiple output formats (compact, full, JSON)
//! - Redaction of credential-bearing headers

use crate::config;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!(
                "unknown log format '{other}' (expected compact, full or json)"
            ))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Apply the configuration file's `[logging]` section.
    ///
    /// The file only sets the level when no `-v` flag raised it.
    pub fn merge_with_file(&mut self, file: &config::LoggingConfig, verbosity: u8) -> Result<()> {
        if verbosity == 0 {
            self.level = file.level.clone();
        }
        self.format = file.format.parse()?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("HFETCH_LOG_FORMAT") {
            match format.parse() {
                Ok(parsed) => self.format = parsed,
                Err(_) => eprintln!("Invalid HFETCH_LOG_FORMAT '{}', using {:?}", format, self.format),
            }
        }
    }
}

/// Initialize the global logging system
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = create_env_filter(&config)?;
    let ansi = std::io::stderr().is_terminal();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(builder.with_ansi(ansi).compact().finish())
        }
        LogFormat::Full => tracing::subscriber::set_global_default(builder.with_ansi(ansi).finish()),
        LogFormat::Json => {
            // JSON should not have ANSI codes
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())
        }
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(config = ?config, "Logging system initialized");
    Ok(())
}

/// Create environment filter based on configuration
fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.level, e)))
}

/// Header redaction utilities
pub mod redaction {
    use hfetch_core::http::HeaderMap;

    /// Placeholder logged instead of a sensitive value
    pub const REDACTED: &str = "***";

    /// Check if a header name carries credentials
    pub fn is_sensitive_header(name: &str) -> bool {
        let name = name.to_lowercase();
        matches!(
            name.as_str(),
            "authorization" | "proxy-authorization" | "cookie" | "set-cookie"
        ) || name.contains("token")
            || name.contains("key")
            || name.contains("secret")
            || name.contains("password")
    }

    /// Render headers for a log line with credential values masked
    pub fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
        headers
            .iter()
            .map(|(name, value)| {
                let value = if is_sensitive_header(name.as_str()) {
                    REDACTED.to_string()
                } else {
                    String::from_utf8_lossy(value.as_bytes()).into_owned()
                };
                (name.as_str().to_string(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::redaction::*;
    use super::*;
    use hfetch_core::http::{HeaderMap, HeaderValue};

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(LoggingConfig::from_verbosity(0).level, "warn");
        assert_eq!(LoggingConfig::from_verbosity(1).level, "info");
        assert!(LoggingConfig::from_verbosity(2).source_location);

        let trace = LoggingConfig::from_verbosity(3);
        assert_eq!(trace.level, "trace");
        assert_eq!(trace.format, LogFormat::Full);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!(matches!("xml".parse::<LogFormat>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_file_level_yields_to_flags() {
        let file = config::LoggingConfig {
            level: "error".to_string(),
            format: "json".to_string(),
        };

        let mut quiet = LoggingConfig::from_verbosity(0);
        quiet.merge_with_file(&file, 0).unwrap();
        assert_eq!(quiet.level, "error");
        assert_eq!(quiet.format, LogFormat::Json);

        let mut verbose = LoggingConfig::from_verbosity(2);
        verbose.merge_with_file(&file, 2).unwrap();
        assert_eq!(verbose.level, "debug");
    }

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggingConfig {
            level: "hfetch=loudest".to_string(),
            ..LoggingConfig::default()
        };
        assert!(create_env_filter(&config).is_err());
    }

    #[test]
    fn test_sensitive_headers() {
        assert!(is_sensitive_header("Authorization"));
        assert!(is_sensitive_header("X-Api-Key"));
        assert!(is_sensitive_header("x-auth-token"));
        assert!(!is_sensitive_header("Accept"));
        assert!(!is_sensitive_header("If-None-Match"));
    }

    #[test]
    fn test_redact_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        headers.insert("accept", HeaderValue::from_static("text/html"));

        let redacted = redact_headers(&headers);
        assert!(redacted.contains(&("authorization".to_string(), REDACTED.to_string())));
        assert!(redacted.contains(&("accept".to_string(), "text/html".to_string())));
    }
}
