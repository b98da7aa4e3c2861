//! Error types and handling for the CLI
//!
//! Every failure leaving a handler is an [`Error`]. On the way out it is
//! converted into an [`AnnotatedError`] so the log carries a stable code for
//! it: caller mistakes are public, everything else is private.

use hfetch_core::AnnotatedError;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from hfetch-core library
    #[error("{0}")]
    Core(#[from] hfetch_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination or value
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// The server answered outside the success band
    #[error("Server responded with HTTP {status}")]
    HttpStatus { status: u16 },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(e) if e.is_input_error() => 6,
            Self::Core(hfetch_core::Error::Timeout { .. }) => 11,
            Self::Core(e) if e.is_transport() => 10,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::HttpStatus { .. } => 22,
            Self::Json(_) => 12,
            Self::Toml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }

    /// Whether the failure was caused by what the user typed or supplied
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Core(e) => e.is_input_error(),
            Self::FileNotFound { .. }
            | Self::Config(_)
            | Self::InvalidArgs(_)
            | Self::Json(_)
            | Self::Toml(_) => true,
            _ => false,
        }
    }

    /// Convert into an annotated error for structured logging
    #[track_caller]
    pub fn into_annotated(self) -> AnnotatedError {
        let summary = match &self {
            Self::Io(_) => "local I/O failed",
            Self::Core(e) if e.is_transport() => "request did not complete",
            Self::Core(_) => "request failed",
            Self::FileNotFound { .. } => "input file missing",
            Self::Config(_) | Self::Toml(_) => "configuration rejected",
            Self::InvalidArgs(_) => "arguments rejected",
            Self::HttpStatus { .. } => "unsuccessful response",
            Self::Json(_) => "payload is not valid JSON",
            Self::Other { .. } => "command failed",
        };

        if self.is_user_error() {
            AnnotatedError::wrap_public(summary, self)
        } else {
            AnnotatedError::wrap(summary, self)
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}
