//! Error types for the hfetch core library
//!
//! Every fallible operation in this crate returns [`Result`]. Failures are
//! handed straight back to the caller; nothing in here retries.

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for request building, execution and response decoding
#[derive(Error, Debug)]
pub enum Error {
    /// A query-parameter entry was not a `[key, value]` pair
    #[error(r#"URL params must be [["key1", "value1"], ["key2", "value2"]], got {pair:?}"#)]
    InvalidParams { pair: Vec<String> },

    /// The target URL could not be parsed
    #[error("Invalid URL '{url}': {source}")]
    UrlParse {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The request method is not a valid HTTP token
    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    /// A request payload could not be serialized
    #[error("Failed to serialize request body: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Network, DNS or TLS failure while performing the call
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The call did not finish within the configured duration
    #[error("Request timed out{}", TimeoutLabel(*after))]
    Timeout { after: Option<Duration> },

    /// The caller cancelled the call before it finished
    #[error("Request cancelled")]
    Cancelled,

    /// The response body exceeded the configured read limit
    #[error("Response body too large: {limit} bytes")]
    BodyTooLarge { limit: u64 },

    /// Reading the response body failed
    #[error("Unable to read response body: {source}")]
    BodyRead {
        #[source]
        source: io::Error,
    },

    /// The response body was already consumed or released
    #[error("Response body already closed")]
    BodyClosed,

    /// The response body was read successfully but held no bytes
    #[error("Empty response body")]
    EmptyBody,

    /// The response body could not be decoded into the requested shape
    #[error("Failed to decode {format} response body: {source}")]
    Decode {
        format: DecodeFormat,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Fieldless classification of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParams,
    UrlParse,
    InvalidMethod,
    Serialization,
    Transport,
    Timeout,
    Cancelled,
    BodyTooLarge,
    BodyRead,
    BodyClosed,
    EmptyBody,
    Decode,
}

/// Body formats understood by the response decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFormat {
    Json,
    Xml,
}

impl fmt::Display for DecodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeFormat::Json => write!(f, "JSON"),
            DecodeFormat::Xml => write!(f, "XML"),
        }
    }
}

/// Renders the optional duration suffix of [`Error::Timeout`]
struct TimeoutLabel(Option<Duration>);

impl fmt::Display for TimeoutLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(after) => write!(f, " after {}ms", after.as_millis()),
            None => Ok(()),
        }
    }
}

impl Error {
    /// Create a transport error wrapping an arbitrary cause
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport {
            message: message.into(),
            source: Some(anyhow::Error::new(source)),
        }
    }

    /// Create a decode error for the given format
    pub fn decode<E>(format: DecodeFormat, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Decode {
            format,
            source: anyhow::Error::new(source),
        }
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParams { .. } => ErrorKind::InvalidParams,
            Error::UrlParse { .. } => ErrorKind::UrlParse,
            Error::InvalidMethod { .. } => ErrorKind::InvalidMethod,
            Error::Serialization { .. } => ErrorKind::Serialization,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::BodyTooLarge { .. } => ErrorKind::BodyTooLarge,
            Error::BodyRead { .. } => ErrorKind::BodyRead,
            Error::BodyClosed => ErrorKind::BodyClosed,
            Error::EmptyBody => ErrorKind::EmptyBody,
            Error::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Whether the call failed on the wire (timeouts and cancellation included)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::Timeout { .. } | Error::Cancelled
        )
    }

    /// Whether the failure was caused by the caller's input rather than the network
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidParams { .. }
                | Error::UrlParse { .. }
                | Error::InvalidMethod { .. }
                | Error::Serialization { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization { source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BodyTooLarge { limit: 1024 };
        assert_eq!(err.to_string(), "Response body too large: 1024 bytes");

        let err = Error::Timeout {
            after: Some(Duration::from_millis(250)),
        };
        assert_eq!(err.to_string(), "Request timed out after 250ms");

        let err = Error::Timeout { after: None };
        assert_eq!(err.to_string(), "Request timed out");
    }

    #[test]
    fn test_invalid_params_display() {
        let err = Error::InvalidParams {
            pair: vec!["only-key".to_string()],
        };
        assert!(err.to_string().starts_with("URL params must be"));
        assert!(err.to_string().contains("only-key"));
    }

    #[test]
    fn test_transport_classification() {
        assert!(Error::Cancelled.is_transport());
        assert!(Error::Timeout {
            after: Some(Duration::from_secs(1))
        }
        .is_transport());
        assert!(!Error::EmptyBody.is_transport());

        let err = Error::transport("connection refused", io::Error::other("refused"));
        assert!(err.is_transport());
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_decode_format_display() {
        let err = Error::decode(DecodeFormat::Xml, io::Error::other("bad tag"));
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().starts_with("Failed to decode XML response body"));
    }
}
