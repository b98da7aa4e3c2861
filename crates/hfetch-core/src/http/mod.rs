//! HTTP fetch abstraction
//!
//! This module provides:
//! - Request building with query-parameter merging and JSON bodies
//! - Per-call timeout, redirect and cancellation settings
//! - A pluggable transport seam with a `reqwest` implementation
//! - Response interpretation with conditional-revalidation helpers
//! - Size-bounded body reads and text/JSON/XML decoding

mod body;
pub mod builder;
pub mod options;
pub mod response;
pub mod transport;

pub use builder::{Request, JSON_CONTENT_TYPE};
pub use options::{merge_query_params, RequestOptions};
pub use response::Response;
pub use transport::{BodyStream, ExecSettings, RawResponse, ReqwestTransport, Transport, TransportRequest};

// Re-export commonly used types
pub use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
pub use reqwest::{Method, StatusCode};
pub use tokio_util::sync::CancellationToken;
