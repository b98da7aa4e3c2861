//! hfetch core - outbound HTTP calls with conditional revalidation
//!
//! This crate wraps a `reqwest` round trip in a small request/response
//! abstraction:
//!
//! - **Request building**: method, headers, query-parameter merging, JSON bodies
//! - **Execution settings**: timeout, redirect suppression, transport override,
//!   cancellation
//! - **Response interpretation**: success band, ETag / Last-Modified freshness
//!   checks, size-bounded body reads, text/JSON/XML decoding
//! - **Error annotation**: location-coded errors with public/private rendering
//!
//! # Example
//!
//! ```no_run
//! use hfetch_core::http::{Request, RequestOptions};
//! use std::time::Duration;
//!
//! async fn example() -> hfetch_core::Result<()> {
//!     let options = RequestOptions::new().param("id", "42");
//!     let mut response = Request::new("https://example.test/api", Some(options))?
//!         .with_timeout(Duration::from_secs(10))
//!         .execute()
//!         .await?;
//!
//!     if response.is_modified("\"abc\"", "") {
//!         let body = response.read_body(1 << 20).await?;
//!         println!("{} fresh bytes", body.len());
//!     }
//!     response.close();
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod error;
pub mod http;

// Re-export main types for convenience
pub use annotate::{AnnotatedError, ErrorFields};
pub use error::{DecodeFormat, Error, ErrorKind, Result};
pub use http::{Request, RequestOptions, Response};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
