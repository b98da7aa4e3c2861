//! Location-annotated errors with public/private rendering
//!
//! An [`AnnotatedError`] records where it was built and derives a stable code
//! from that location. Private errors render only their message and code, so
//! nothing about the call site reaches an untrusted consumer; public errors
//! render the file and line for debugging. Both keep the underlying cause for
//! logging through [`ErrorFields`].

use sha2::{Digest, Sha256};
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::path::Path;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error value carrying a deterministic code and a visibility flag
#[derive(Debug)]
pub struct AnnotatedError {
    message: String,
    code: String,
    public: bool,
    cause: Option<BoxError>,
    file: String,
    line: u32,
}

impl AnnotatedError {
    /// Private error without a cause
    #[track_caller]
    pub fn private(message: impl Into<String>) -> Self {
        Self::build(message.into(), false, None, Location::caller())
    }

    /// Public error without a cause
    #[track_caller]
    pub fn public(message: impl Into<String>) -> Self {
        Self::build(message.into(), true, None, Location::caller())
    }

    /// Private error wrapping a cause
    #[track_caller]
    pub fn wrap(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::build(message.into(), false, Some(cause.into()), Location::caller())
    }

    /// Public error wrapping a cause
    #[track_caller]
    pub fn wrap_public(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::build(message.into(), true, Some(cause.into()), Location::caller())
    }

    fn build(
        message: String,
        public: bool,
        cause: Option<BoxError>,
        location: &'static Location<'static>,
    ) -> Self {
        // Re-wrapping keeps the innermost site so the code stays stable.
        if let Some(cause) = cause {
            match cause.downcast::<AnnotatedError>() {
                Ok(inner) => {
                    let inner = *inner;
                    return Self {
                        message,
                        code: inner.code,
                        public,
                        cause: inner.cause,
                        file: inner.file,
                        line: inner.line,
                    };
                }
                Err(cause) => {
                    return Self::at(message, public, Some(cause), location);
                }
            }
        }

        Self::at(message, public, None, location)
    }

    fn at(
        message: String,
        public: bool,
        cause: Option<BoxError>,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            message,
            code: derive_code(location.file(), location.line()),
            public,
            cause,
            file: location.file().to_string(),
            line: location.line(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for AnnotatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.public {
            return write!(f, "{} [{}]", self.message, self.code);
        }

        match &self.cause {
            Some(cause) => write!(f, "{} [{}:{}]", cause, self.file, self.line),
            None => write!(f, "{} [{}:{}]", self.message, self.file, self.line),
        }
    }
}

impl StdError for AnnotatedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Derive the stable code for a source location.
///
/// Format: six upper-case hex digits of the path's SHA-256, the upper-cased
/// file stem, then `-<line>`.
pub fn derive_code(file: &str, line: u32) -> String {
    let digest = Sha256::digest(file.as_bytes());
    let prefix = hex::encode_upper(&digest[..3]);
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_uppercase()
        .replace(|c: char| !c.is_ascii_alphanumeric(), "_");

    format!("{}{}-{}", prefix, stem, line)
}

/// Structured log fields extracted from an error value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFields {
    pub message: String,
    pub file: String,
    pub line: u32,
    pub code: Option<String>,
    pub cause: Option<String>,
}

impl ErrorFields {
    /// Extract fields from any error.
    ///
    /// Annotated errors report their own site; anything else is attributed to
    /// the caller of this function.
    #[track_caller]
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        if let Some(annotated) = err.downcast_ref::<AnnotatedError>() {
            return Self {
                message: annotated.message.clone(),
                file: annotated.file.clone(),
                line: annotated.line,
                code: Some(annotated.code.clone()),
                cause: annotated.cause.as_ref().map(|c| c.to_string()),
            };
        }

        let location = Location::caller();
        Self {
            message: err.to_string(),
            file: location.file().to_string(),
            line: location.line(),
            code: None,
            cause: None,
        }
    }

    /// Record the fields as a single error event
    pub fn emit(&self, context: &str) {
        tracing::error!(
            error.message = %self.message,
            error.file = %self.file,
            error.line = self.line,
            error.code = self.code.as_deref().unwrap_or(""),
            error.cause = self.cause.as_deref().unwrap_or(""),
            "{}",
            context
        );
    }

    /// Same fields as [`emit`](ErrorFields::emit), at debug level.
    ///
    /// For callers that already showed the message to the user and only
    /// want the code and location in verbose logs.
    pub fn emit_debug(&self, context: &str) {
        tracing::debug!(
            error.message = %self.message,
            error.file = %self.file,
            error.line = self.line,
            error.code = self.code.as_deref().unwrap_or(""),
            error.cause = self.cause.as_deref().unwrap_or(""),
            "{}",
            context
        );
    }
}
