//! Size-bounded body collection

use std::io;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::http::transport::BodyStream;
use crate::{Error, Result};

/// Point in time by which the whole call, body included, must finish
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    pub(crate) at: Instant,
    pub(crate) limit: Duration,
}

impl Deadline {
    pub(crate) fn starting_now(limit: Duration) -> Self {
        Self {
            at: Instant::now() + limit,
            limit,
        }
    }
}

/// Drain `body` into memory.
///
/// A `limit` of zero reads without bound. Otherwise the read fails with
/// [`Error::BodyTooLarge`] as soon as more than `limit` bytes have arrived,
/// without buffering the rest of the stream. The read stops with
/// [`Error::Timeout`] once `deadline` passes and with [`Error::Cancelled`]
/// once `cancellation` fires.
pub(crate) async fn read_bounded(
    body: BodyStream,
    limit: u64,
    deadline: Option<Deadline>,
    cancellation: Option<&CancellationToken>,
) -> Result<Vec<u8>> {
    let timeout = deadline.map(|d| d.limit);
    let read = async {
        match deadline {
            Some(d) => tokio::time::timeout_at(d.at, drain(body, limit, timeout))
                .await
                .unwrap_or(Err(Error::Timeout {
                    after: Some(d.limit),
                })),
            None => drain(body, limit, timeout).await,
        }
    };

    match cancellation {
        Some(token) => {
            tokio::select! {
                _ = token.cancelled() => Err(Error::Cancelled),
                result = read => result,
            }
        }
        None => read.await,
    }
}

async fn drain(mut body: BodyStream, limit: u64, timeout: Option<Duration>) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| classify_read_error(e, timeout))?;

        if limit > 0 && (buffer.len() + chunk.len()) as u64 > limit {
            tracing::warn!(limit, "Response body exceeded read limit");
            return Err(Error::BodyTooLarge { limit });
        }
        buffer.extend_from_slice(&chunk);
    }

    if buffer.is_empty() {
        return Err(Error::EmptyBody);
    }

    Ok(buffer)
}

fn classify_read_error(error: io::Error, timeout: Option<Duration>) -> Error {
    if error.kind() == io::ErrorKind::TimedOut {
        return Error::Timeout { after: timeout };
    }
    Error::BodyRead { source: error }
}
