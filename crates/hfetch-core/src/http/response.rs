//! Response interpretation: success band, freshness markers, bounded reads
//! and decode-on-demand.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, CONTENT_TYPE, ETAG, EXPIRES, LAST_MODIFIED};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::DecodeFormat;
use crate::http::body::{read_bounded, Deadline};
use crate::http::transport::{BodyStream, RawResponse};
use crate::{Error, Result};

/// Response to an executed [`Request`](crate::http::Request).
///
/// The body stream is owned by the response and can be read once. After a
/// read (successful or not) or after [`close`](Response::close), further
/// reads fail with [`Error::BodyClosed`].
pub struct Response {
    status: StatusCode,
    url: Url,
    headers: HeaderMap,
    body: Option<BodyStream>,
    deadline: Option<Deadline>,
    cancellation: Option<CancellationToken>,
}

impl Response {
    /// Wrap a raw transport response with no deadline or cancellation on the body read
    pub fn from_raw(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            url: raw.url,
            headers: raw.headers,
            body: Some(raw.body),
            deadline: None,
            cancellation: None,
        }
    }

    /// Carry the call's deadline and cancellation token over to the body read
    pub(crate) fn with_limits(
        mut self,
        deadline: Option<Deadline>,
        cancellation: Option<CancellationToken>,
    ) -> Self {
        self.deadline = deadline;
        self.cancellation = cancellation;
        self
    }

    /// Final status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers as received
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The URL ultimately reached, after any followed redirects
    pub fn effective_url(&self) -> &Url {
        &self.url
    }

    /// Verbatim `Content-Type` value, empty when absent
    pub fn content_type(&self) -> Cow<'_, str> {
        self.header_str(CONTENT_TYPE)
    }

    /// True for any status in `[200, 400)`.
    ///
    /// Redirects count: with redirects disabled a 3xx is a legitimate answer.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status.as_u16())
    }

    /// `Last-Modified`, or empty when the server sent `Expires: 0`
    pub fn last_modified(&self) -> Cow<'_, str> {
        if self.uncacheable() {
            return Cow::Borrowed("");
        }
        self.header_str(LAST_MODIFIED)
    }

    /// `ETag`, or empty when the server sent `Expires: 0`
    pub fn etag(&self) -> Cow<'_, str> {
        if self.uncacheable() {
            return Cow::Borrowed("");
        }
        self.header_str(ETAG)
    }

    /// [`last_modified`](Response::last_modified) parsed as an HTTP-date
    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        let value = self.last_modified();
        if value.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc2822(&value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Decide whether the resource changed since the caller's last fetch.
    ///
    /// A 304 or a matching non-empty validator means unchanged. A response
    /// without validators is reported as modified.
    pub fn is_modified(&self, last_etag: &str, last_modified: &str) -> bool {
        if self.status == StatusCode::NOT_MODIFIED {
            return false;
        }

        let etag = self.etag();
        if !etag.is_empty() && etag == last_etag {
            return false;
        }

        let modified = self.last_modified();
        if !modified.is_empty() && modified == last_modified {
            return false;
        }

        true
    }

    /// Read the body into memory.
    ///
    /// `max_body_size` of zero means unbounded; otherwise more than
    /// `max_body_size` bytes fails with [`Error::BodyTooLarge`]. An empty
    /// body fails with [`Error::EmptyBody`].
    pub async fn read_body(&mut self, max_body_size: u64) -> Result<Vec<u8>> {
        let body = self.body.take().ok_or(Error::BodyClosed)?;
        read_bounded(
            body,
            max_body_size,
            self.deadline,
            self.cancellation.as_ref(),
        )
        .await
    }

    /// Unbounded read as text. Invalid UTF-8 sequences become U+FFFD.
    pub async fn text(&mut self) -> Result<String> {
        let buffer = self.read_body(0).await?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Unbounded read decoded as JSON
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let buffer = self.read_body(0).await?;
        serde_json::from_slice(&buffer).map_err(|e| Error::decode(DecodeFormat::Json, e))
    }

    /// Unbounded read decoded as XML
    pub async fn xml<T: DeserializeOwned>(&mut self) -> Result<T> {
        let buffer = self.read_body(0).await?;
        let text =
            std::str::from_utf8(&buffer).map_err(|e| Error::decode(DecodeFormat::Xml, e))?;
        quick_xml::de::from_str(text).map_err(|e| Error::decode(DecodeFormat::Xml, e))
    }

    /// Release the body stream. Calling it again is a no-op.
    pub fn close(&mut self) {
        self.body = None;
    }

    /// Whether the body has been read or released
    pub fn is_closed(&self) -> bool {
        self.body.is_none()
    }

    /// First value of a header as a string, empty when absent.
    ///
    /// Bytes outside UTF-8 (obs-text in Latin-1) are replaced with U+FFFD
    /// rather than dropping the whole value.
    pub fn header_str(&self, name: HeaderName) -> Cow<'_, str> {
        match self.headers.get(name) {
            Some(value) => String::from_utf8_lossy(value.as_bytes()),
            None => Cow::Borrowed(""),
        }
    }

    fn uncacheable(&self) -> bool {
        self.header_str(EXPIRES) == "0"
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("closed", &self.body.is_none())
            .finish()
    }
}
