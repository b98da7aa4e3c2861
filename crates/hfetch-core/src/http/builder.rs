//! Outbound request builder
//!
//! A [`Request`] is configured by value: every `with_*` method takes the
//! request by ownership and hands it back, and [`Request::execute`] consumes
//! it so the body is sent at most once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use crate::http::body::Deadline;
use crate::http::options::{merge_query_params, RequestOptions};
use crate::http::response::Response;
use crate::http::transport::{ExecSettings, ReqwestTransport, Transport, TransportRequest};
use crate::{Error, Result};

/// Content type set by [`Request::json`]
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// A single outbound HTTP call
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<reqwest::Body>,
    settings: ExecSettings,
    transport: Arc<dyn Transport>,
    cancellation: Option<CancellationToken>,
}

impl Request {
    /// Build a request for `url`, applying `options` if given.
    ///
    /// Query parameters are validated and merged before anything touches the
    /// network; see [`merge_query_params`] for the rules.
    pub fn new(url: &str, options: Option<RequestOptions>) -> Result<Self> {
        let options = options.unwrap_or_default();

        let mut target = Url::parse(url).map_err(|e| Error::UrlParse {
            url: url.to_string(),
            source: e,
        })?;

        if let Some(params) = &options.params {
            merge_query_params(&mut target, params)?;
        }

        let method = parse_method(options.method.as_deref())?;

        debug!(method = %method, url = %target, "Built request");

        Ok(Self {
            method,
            url: target,
            headers: options.headers.unwrap_or_default(),
            body: options.body,
            settings: ExecSettings::default(),
            transport: ReqwestTransport::shared()?,
            cancellation: None,
        })
    }

    /// Shorthand for a bodiless `GET`
    pub fn get(url: &str) -> Result<Self> {
        Self::new(url, None)
    }

    /// Route the call through a different transport
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Return the first redirect response instead of following it
    pub fn without_redirects(mut self) -> Self {
        self.settings.follow_redirects = false;
        self
    }

    /// Bound the whole call, body read included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    /// Replace the full header set
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Abort the call when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Serialize `payload` as the JSON body, replacing any previous body
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self> {
        let body = serde_json::to_vec(payload)?;

        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        self.body = Some(reqwest::Body::from(body));
        Ok(self)
    }

    /// HTTP method, `GET` unless the options named another
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL with the merged query string
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers that will be sent
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access for append-style header edits
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Timeout and redirect policy for [`execute`](Request::execute)
    pub fn settings(&self) -> &ExecSettings {
        &self.settings
    }

    /// Whether a body is attached
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Perform the call.
    ///
    /// The returned [`Response`] owns the open body stream. The timeout and
    /// cancellation token keep bounding the call until the body has been
    /// read. Nothing is retried: transport failures, timeouts and
    /// cancellation come straight back as errors.
    #[instrument(skip(self), fields(method = %self.method, url = %self.url))]
    pub async fn execute(self) -> Result<Response> {
        let Request {
            method,
            url,
            headers,
            body,
            settings,
            transport,
            cancellation,
        } = self;

        if cancellation.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(Error::Cancelled);
        }

        let request = TransportRequest {
            method,
            url,
            headers,
            body,
            settings,
        };

        let deadline = settings.timeout.map(Deadline::starting_now);
        let round_trip = async {
            match deadline {
                Some(d) => tokio::time::timeout_at(d.at, transport.send(request))
                    .await
                    .unwrap_or(Err(Error::Timeout {
                        after: Some(d.limit),
                    })),
                None => transport.send(request).await,
            }
        };

        let raw = match &cancellation {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => return Err(Error::Cancelled),
                    result = round_trip => result?,
                }
            }
            None => round_trip.await?,
        };

        debug!(status = raw.status.as_u16(), effective_url = %raw.url, "Received response");

        Ok(Response::from_raw(raw).with_limits(deadline, cancellation))
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Parse an HTTP method, defaulting to `GET`
fn parse_method(method: Option<&str>) -> Result<Method> {
    match method.map(str::trim) {
        None | Some("") => Ok(Method::GET),
        Some(m) => Method::from_bytes(m.to_uppercase().as_bytes()).map_err(|_| {
            Error::InvalidMethod {
                method: m.to_string(),
            }
        }),
    }
}
