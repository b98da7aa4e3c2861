//! Shared test support utilities for integration tests

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use hfetch_core::http::{
    ExecSettings, HeaderMap, HeaderValue, Method, RawResponse, StatusCode, Transport,
    TransportRequest,
};
use hfetch_core::Result;
use url::Url;

/// What a [`CannedTransport`] saw when it was called
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub settings: ExecSettings,
}

/// Transport that answers every call with the same response and records the request
#[derive(Clone)]
pub struct CannedTransport {
    status: StatusCode,
    headers: Vec<(&'static str, &'static str)>,
    body: &'static str,
    seen: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl CannedTransport {
    pub fn new(status: u16, body: &'static str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            headers: Vec::new(),
            body,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("transport was never called")
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse> {
        let body = request
            .body
            .as_ref()
            .map(|b| b.as_bytes().unwrap_or_default().to_vec());

        self.seen.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers,
            body,
            settings: request.settings,
        });

        let mut headers = HeaderMap::new();
        for &(name, value) in &self.headers {
            headers.append(name, HeaderValue::from_static(value));
        }

        let chunks: Vec<io::Result<Bytes>> = if self.body.is_empty() {
            Vec::new()
        } else {
            vec![Ok(Bytes::from_static(self.body.as_bytes()))]
        };

        Ok(RawResponse {
            status: self.status,
            url: request.url,
            headers,
            body: Box::pin(stream::iter(chunks)),
        })
    }
}

/// Transport whose round trip never completes
#[derive(Debug, Clone, Default)]
pub struct PendingTransport;

#[async_trait]
impl Transport for PendingTransport {
    async fn send(&self, _request: TransportRequest) -> Result<RawResponse> {
        std::future::pending().await
    }
}

/// Transport that answers 200 at once, sends one chunk and then stalls the body forever
#[derive(Debug, Clone, Default)]
pub struct StallingBodyTransport;

#[async_trait]
impl Transport for StallingBodyTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse> {
        let first = stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(b"partial"))]);

        Ok(RawResponse {
            status: StatusCode::OK,
            url: request.url,
            headers: HeaderMap::new(),
            body: Box::pin(first.chain(stream::pending())),
        })
    }
}

/// Wrap a transport for [`hfetch_core::Request::with_transport`]
pub fn shared<T: Transport + 'static>(transport: T) -> Arc<dyn Transport> {
    Arc::new(transport)
}
