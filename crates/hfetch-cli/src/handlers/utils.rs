//! Helpers shared by the request-performing handlers

use crate::cli::RequestArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::redaction::redact_headers;
use hfetch_core::http::{
    HeaderMap, HeaderName, HeaderValue, Request, RequestOptions, ReqwestTransport, Response,
};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// A built request plus the read limit that applies to its body
#[derive(Debug)]
pub struct PreparedRequest {
    pub request: Request,
    pub max_body_size: u64,
}

/// Build the core request from flags and configuration
pub fn prepare_request(
    args: &RequestArgs,
    config: &Config,
    default_method: &str,
) -> Result<PreparedRequest> {
    let resolved = config.resolve(args);

    let params = args
        .params
        .iter()
        .map(|(key, value)| vec![key.clone(), value.clone()])
        .collect();

    let options = RequestOptions::new()
        .method(args.method.as_deref().unwrap_or(default_method))
        .headers(build_headers(&resolved.headers)?)
        .params(params);

    let mut request = Request::new(&args.url, Some(options))?;

    if let Some(timeout) = resolved.timeout {
        request = request.with_timeout(timeout);
    }
    if !resolved.follow_redirects {
        request = request.without_redirects();
    }
    if let Some(user_agent) = resolved.user_agent {
        let transport = ReqwestTransport::with_client_builder(move || {
            reqwest::Client::builder().user_agent(user_agent.clone())
        })?;
        request = request.with_transport(Arc::new(transport));
    }

    debug!(
        method = %request.method(),
        url = %request.url(),
        headers = ?redact_headers(request.headers()),
        "Prepared request"
    );

    Ok(PreparedRequest {
        request,
        max_body_size: resolved.max_body_size,
    })
}

/// Turn `(name, value)` pairs into a header map, keeping repeated names
pub fn build_headers(pairs: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::invalid_args(format!("invalid header name '{}'", name)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| Error::invalid_args(format!("invalid value for header '{}'", name)))?;
        headers.append(header_name, header_value);
    }
    Ok(headers)
}

/// Read the body, treating an empty one as nothing to print
pub async fn read_body_or_empty(response: &mut Response, max_body_size: u64) -> Result<Vec<u8>> {
    match response.read_body(max_body_size).await {
        Ok(body) => Ok(body),
        Err(hfetch_core::Error::EmptyBody) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Write the status line and headers, then a blank separator line
pub fn write_head(out: &mut impl Write, response: &Response) -> Result<()> {
    writeln!(out, "HTTP {}", response.status())?;
    for (name, value) in response.headers() {
        writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()))?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write a body verbatim, ending it with a newline
pub fn write_body(out: &mut impl Write, body: &[u8]) -> Result<()> {
    if body.is_empty() {
        return Ok(());
    }
    out.write_all(body)?;
    if !body.ends_with(b"\n") {
        writeln!(out)?;
    }
    Ok(())
}

/// Fail with the status code when the response is outside the success band
pub fn ensure_success(response: &Response) -> Result<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(Error::HttpStatus {
            status: response.status().as_u16(),
        })
    }
}

#[cfg(test)]
pub(crate) fn request_args(url: &str) -> RequestArgs {
    RequestArgs {
        url: url.to_string(),
        params: Vec::new(),
        headers: Vec::new(),
        method: None,
        timeout: None,
        no_redirects: false,
        max_body_size: None,
    }
}
