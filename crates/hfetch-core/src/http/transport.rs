//! Transport seam between the request builder and the network
//!
//! A [`Transport`] performs exactly one round trip. [`ReqwestTransport`] is
//! the production implementation; anything else (recorded fixtures, proxies
//! with bespoke TLS) can be plugged in through [`Request::with_transport`].
//!
//! [`Request::with_transport`]: crate::http::Request::with_transport

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::{redirect, Method, StatusCode};
use url::Url;

use crate::{Error, Result};

/// Boxed response body stream.
///
/// I/O timeouts surface as [`io::ErrorKind::TimedOut`].
pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Per-call execution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecSettings {
    /// Total call duration, including the body read
    pub timeout: Option<Duration>,
    /// Follow `Location` on 3xx responses
    pub follow_redirects: bool,
}

impl Default for ExecSettings {
    fn default() -> Self {
        Self {
            timeout: None,
            follow_redirects: true,
        }
    }
}

/// A fully prepared outbound call handed to a [`Transport`]
#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<reqwest::Body>,
    pub settings: ExecSettings,
}

/// Status, headers and open body returned by a [`Transport`]
pub struct RawResponse {
    pub status: StatusCode,
    /// URL ultimately reached, after any followed redirects
    pub url: Url,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Performs one HTTP round trip
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return once the response head has arrived
    async fn send(&self, request: TransportRequest) -> Result<RawResponse>;
}

/// Production transport backed by `reqwest`.
///
/// Two clients are built once, one following redirects and one stopping at
/// the first 3xx, and every call is routed to the matching one so the
/// connection pool is shared across calls. The call's timeout is applied
/// per request.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    following: reqwest::Client,
    non_following: reqwest::Client,
}

static SHARED: OnceLock<Arc<dyn Transport>> = OnceLock::new();

impl ReqwestTransport {
    /// Transport with reqwest's default client settings
    pub fn new() -> Result<Self> {
        Self::with_client_builder(reqwest::Client::builder)
    }

    /// Transport whose clients start from a custom builder (TLS roots, proxies, user agent)
    pub fn with_client_builder<F>(factory: F) -> Result<Self>
    where
        F: Fn() -> reqwest::ClientBuilder,
    {
        let build = |policy: redirect::Policy| {
            factory()
                .redirect(policy)
                .build()
                .map_err(|e| Error::transport("Failed to create HTTP client", e))
        };

        Ok(Self {
            following: build(redirect::Policy::default())?,
            non_following: build(redirect::Policy::none())?,
        })
    }

    /// Process-wide default transport, built on first use
    pub fn shared() -> Result<Arc<dyn Transport>> {
        if let Some(transport) = SHARED.get() {
            return Ok(transport.clone());
        }

        let transport: Arc<dyn Transport> = Arc::new(Self::new()?);
        Ok(SHARED.get_or_init(|| transport).clone())
    }

    fn client(&self, settings: &ExecSettings) -> &reqwest::Client {
        if settings.follow_redirects {
            &self.following
        } else {
            &self.non_following
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse> {
        let mut builder = self
            .client(&request.settings)
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(timeout) = request.settings.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_request_error(e, request.settings.timeout))?;

        let status = response.status();
        let url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| {
                if e.is_timeout() {
                    io::Error::new(io::ErrorKind::TimedOut, e)
                } else {
                    io::Error::other(e)
                }
            })
        });

        Ok(RawResponse {
            status,
            url,
            headers,
            body: Box::pin(body),
        })
    }
}

/// Map a reqwest failure onto the crate's transport taxonomy
fn classify_request_error(error: reqwest::Error, timeout: Option<Duration>) -> Error {
    if error.is_timeout() {
        return Error::Timeout { after: timeout };
    }

    let message = if error.is_connect() {
        "Connection failed"
    } else if error.is_redirect() {
        "Redirect policy violated"
    } else if error.is_request() {
        "Failed to send request"
    } else {
        "HTTP transport failure"
    };

    Error::transport(message, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_settings_default() {
        let settings = ExecSettings::default();
        assert!(settings.follow_redirects);
        assert!(settings.timeout.is_none());
    }

    #[test]
    fn test_custom_builder_is_used() {
        let transport = ReqwestTransport::with_client_builder(|| {
            reqwest::Client::builder().user_agent("hfetch-test/1.0")
        });
        assert!(transport.is_ok());
    }

    #[test]
    fn test_shared_transport_is_reused() {
        let first = ReqwestTransport::shared().unwrap();
        let second = ReqwestTransport::shared().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_clients_are_reused_across_calls() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let transport = ReqwestTransport::with_client_builder(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            reqwest::Client::builder()
        })
        .unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);

        for follow_redirects in [true, false, true] {
            let settings = ExecSettings {
                timeout: Some(Duration::from_millis(200)),
                follow_redirects,
            };
            // Nothing listens on port 9 of the discard prefix; only the build count matters.
            let _ = transport
                .send(TransportRequest {
                    method: Method::GET,
                    url: Url::parse("http://127.0.0.1:9/").unwrap(),
                    headers: HeaderMap::new(),
                    body: None,
                    settings,
                })
                .await;
        }
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}
