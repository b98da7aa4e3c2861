//! Request options and query-parameter merging

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::{Error, Result};

/// Configuration applied once when a [`Request`](crate::http::Request) is built
#[derive(Debug, Default)]
pub struct RequestOptions {
    /// HTTP method; `GET` when unset or empty
    pub method: Option<String>,
    /// Replaces the default empty header set
    pub headers: Option<HeaderMap>,
    /// Ordered `[key, value]` pairs appended to the URL query
    pub params: Option<Vec<Vec<String>>>,
    /// Raw request body
    pub body: Option<reqwest::Body>,
}

impl RequestOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Append one header value, keeping any existing values for the name
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .append(name, value);
        self
    }

    /// Replace the whole header set
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Append a `key=value` query pair
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(Vec::new)
            .push(vec![key.into(), value.into()]);
        self
    }

    /// Replace the query pairs
    pub fn params(mut self, params: Vec<Vec<String>>) -> Self {
        self.params = Some(params);
        self
    }

    /// Attach a raw body
    pub fn body(mut self, body: impl Into<reqwest::Body>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Merge `params` into the query of `url`.
///
/// Pairs whose value is blank after trimming are skipped; the value is
/// appended as given otherwise. Every pair is checked before the URL is
/// touched, so a malformed entry leaves `url` unchanged. The resulting query
/// is re-encoded with keys sorted and each key's values in arrival order.
pub fn merge_query_params(url: &mut Url, params: &[Vec<String>]) -> Result<()> {
    if let Some(bad) = params.iter().find(|pair| pair.len() != 2) {
        return Err(Error::InvalidParams { pair: bad.clone() });
    }

    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        query
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    for pair in params {
        let (key, value) = (&pair[0], &pair[1]);
        if value.trim().is_empty() {
            continue;
        }
        query.entry(key.clone()).or_default().push(value.clone());
    }

    if query.is_empty() {
        url.set_query(None);
        return Ok(());
    }

    url.query_pairs_mut().clear().extend_pairs(
        query
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key, value))),
    );

    Ok(())
}
