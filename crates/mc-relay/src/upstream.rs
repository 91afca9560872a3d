//! Upstream client.
//!
//! Opens one HTTP request against the configured backend and exposes the
//! response as status, headers and a single-pass chunk stream. The request
//! timeout is a total deadline: it bounds the open and every chunk read.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::stream::{BoxStream, Stream, StreamExt};
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::error::{RelayError, error_chain};
use crate::request::RelayRequest;

/// One read from upstream.
pub type ChunkResult = Result<Bytes, RelayError>;

/// Opens upstream connections.
///
/// The production implementation is [`UpstreamClient`]; tests substitute a
/// scripted connector.
#[async_trait]
pub trait UpstreamConnector: Send + Sync {
    async fn open(&self, request: &RelayRequest) -> Result<UpstreamHandle, RelayError>;
}

/// Observes whether an upstream connection has been released.
#[derive(Debug, Clone)]
pub struct ReleaseSignal {
    released: CancellationToken,
}

impl ReleaseSignal {
    pub fn is_released(&self) -> bool {
        self.released.is_cancelled()
    }

    /// Resolves once the connection has been dropped.
    pub async fn released(&self) {
        self.released.cancelled().await;
    }
}

/// Single-pass sequence of upstream chunks.
///
/// Owns the upstream connection: dropping the stream releases it.
pub struct ChunkStream {
    inner: BoxStream<'static, ChunkResult>,
    _release: DropGuard,
}

impl Stream for ChunkStream {
    type Item = ChunkResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream").finish_non_exhaustive()
    }
}

/// An open upstream response.
#[derive(Debug)]
pub struct UpstreamHandle {
    status: StatusCode,
    headers: HeaderMap,
    chunks: ChunkStream,
    release: ReleaseSignal,
}

impl UpstreamHandle {
    /// Wrap an arbitrary chunk stream as an upstream response.
    pub fn new<S>(status: StatusCode, headers: HeaderMap, stream: S) -> Self
    where
        S: Stream<Item = ChunkResult> + Send + 'static,
    {
        let released = CancellationToken::new();
        let release = ReleaseSignal {
            released: released.clone(),
        };
        Self {
            status,
            headers,
            chunks: ChunkStream {
                inner: stream.boxed(),
                _release: released.drop_guard(),
            },
            release,
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Signal that fires when this handle's connection is released.
    pub fn release_signal(&self) -> ReleaseSignal {
        self.release.clone()
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, ChunkStream) {
        (self.status, self.headers, self.chunks)
    }

    /// Read the whole body. The connection is released on return.
    pub async fn into_bytes(self) -> Result<Bytes, RelayError> {
        collect_chunks(self.chunks).await
    }
}

/// Concatenate every chunk of `chunks`, stopping at the first error.
pub async fn collect_chunks(mut chunks: ChunkStream) -> Result<Bytes, RelayError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = chunks.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

/// Upstream connector backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client with connection pooling suitable for one gateway.
    pub fn with_defaults() -> reqwest::Result<Self> {
        let client = Client::builder().pool_max_idle_per_host(10).build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl UpstreamConnector for UpstreamClient {
    async fn open(&self, request: &RelayRequest) -> Result<UpstreamHandle, RelayError> {
        let timeout = request.timeout();
        let deadline = Instant::now() + timeout;

        let mut builder = self
            .client
            .request(request.method().clone(), request.target().clone())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        debug!(target = %request.target(), timeout_ms = timeout.as_millis(), "Opening upstream");

        let response = match tokio::time::timeout_at(deadline, builder.send()).await {
            Err(_) => return Err(RelayError::UpstreamTimeout(timeout)),
            Ok(Err(e)) if e.is_timeout() => return Err(RelayError::UpstreamTimeout(timeout)),
            Ok(Err(e)) => return Err(RelayError::UpstreamUnavailable(error_chain(&e))),
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        let headers = response.headers().clone();
        debug!(%status, "Upstream answered");

        let chunks = deadline_chunks(response.bytes_stream(), deadline, timeout);
        Ok(UpstreamHandle::new(status, headers, chunks))
    }
}

/// Map a reqwest body stream to relay chunks under a total deadline.
///
/// The stream ends after the first error.
fn deadline_chunks<S>(
    body: S,
    deadline: Instant,
    timeout: std::time::Duration,
) -> impl Stream<Item = ChunkResult> + Send + 'static
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    let state = (body.boxed(), false);
    futures_util::stream::unfold(state, move |(mut body, done)| async move {
        if done {
            return None;
        }
        match tokio::time::timeout_at(deadline, body.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), (body, false))),
            Ok(Some(Err(e))) => Some((
                Err(RelayError::UpstreamStreamError(error_chain(&e))),
                (body, true),
            )),
            Ok(None) => None,
            Err(_) => Some((
                Err(RelayError::UpstreamStreamError(format!(
                    "deadline of {}ms elapsed mid-stream",
                    timeout.as_millis()
                ))),
                (body, true),
            )),
        }
    })
}
