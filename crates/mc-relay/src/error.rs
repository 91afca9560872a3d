//! Relay error taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong while relaying one request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Connect, DNS or TLS failure before any response arrived.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// No response headers within the request timeout.
    #[error("Upstream did not respond within {}ms", .0.as_millis())]
    UpstreamTimeout(Duration),

    /// Reading the response body failed part-way.
    #[error("Upstream stream error: {0}")]
    UpstreamStreamError(String),

    /// The downstream client disconnected.
    #[error("Downstream peer disconnected")]
    PeerGone,

    /// A downstream write did not complete within the write timeout.
    #[error("Downstream write stalled for {}ms", .0.as_millis())]
    DownstreamStalled(Duration),

    /// A downstream writer was driven out of order.
    #[error("Invalid writer call sequence: {0}")]
    InvalidSequence(&'static str),

    /// The request was rejected before any network action.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

impl RelayError {
    /// Stable discriminant for client-side handling.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            Self::UpstreamStreamError(_) => "UPSTREAM_STREAM_ERROR",
            Self::PeerGone => "PEER_GONE",
            Self::DownstreamStalled(_) => "DOWNSTREAM_STALLED",
            Self::InvalidSequence(_) => "INVALID_SEQUENCE",
            Self::MalformedRequest(_) => "MALFORMED_REQUEST",
        }
    }

    /// Whether the failure originated at the upstream side.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable(_) | Self::UpstreamTimeout(_) | Self::UpstreamStreamError(_)
        )
    }
}

/// Flatten an error and its sources into one line.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
