//! Downstream writer contract.
//!
//! A writer wraps the inbound client connection. The relay drives it in a
//! fixed order: one `write_header`, any number of `write_chunk`, then
//! `close`. Adapters (axum, tests) implement the trait.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::RelayError;

/// Sink for one relayed response.
#[async_trait]
pub trait DownstreamWriter: Send {
    /// Send status and headers.
    ///
    /// # Errors
    ///
    /// `InvalidSequence` on a second call, `PeerGone` if the client left.
    async fn write_header(&mut self, status: StatusCode, headers: HeaderMap)
    -> Result<(), RelayError>;

    /// Send one chunk verbatim.
    ///
    /// # Errors
    ///
    /// `InvalidSequence` before `write_header` or after `close`, `PeerGone`
    /// if the client left, `DownstreamStalled` if a write timeout elapsed.
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), RelayError>;

    /// Finish the response. Idempotent.
    fn close(&mut self);

    /// True until the peer disconnects or `close` is called.
    fn is_alive(&self) -> bool;

    /// Whether `write_header` has succeeded.
    fn headers_sent(&self) -> bool;

    /// Handle that observes peer disconnect independently of the writer.
    fn liveness(&self) -> PeerLiveness;
}

/// Observable "peer has gone" signal.
///
/// Cloning shares the signal. The side that owns the connection trips it
/// with [`mark_gone`](Self::mark_gone) or by dropping a [`guard`](Self::guard).
#[derive(Debug, Clone, Default)]
pub struct PeerLiveness {
    gone: CancellationToken,
}

impl PeerLiveness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_gone(&self) {
        self.gone.cancel();
    }

    pub fn is_gone(&self) -> bool {
        self.gone.is_cancelled()
    }

    /// Resolves once the peer is gone.
    pub async fn gone(&self) {
        self.gone.cancelled().await;
    }

    /// Guard that marks the peer gone when dropped.
    #[must_use]
    pub fn guard(&self) -> DropGuard {
        self.gone.clone().drop_guard()
    }
}
