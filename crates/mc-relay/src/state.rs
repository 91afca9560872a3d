//! Per-relay state, outcome and counters.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::RelayError;

/// Lifecycle tag of one relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStatus {
    /// Accepted, upstream not answered yet.
    Pending,
    /// Headers forwarded, chunks flowing.
    Streaming,
    Completed,
    Aborted,
    Failed,
}

impl RelayStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RelayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of the relay broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSide {
    Upstream,
    Downstream,
}

impl fmt::Display for FailureSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream => f.write_str("upstream"),
            Self::Downstream => f.write_str("downstream"),
        }
    }
}

/// How a relay ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Upstream closed cleanly and everything was written.
    Completed,
    /// Cancelled, or the downstream peer went away.
    Aborted,
    /// A read or write failed.
    Failed {
        side: FailureSide,
        reason: RelayError,
    },
}

impl RelayOutcome {
    pub const fn upstream_failure(reason: RelayError) -> Self {
        Self::Failed {
            side: FailureSide::Upstream,
            reason,
        }
    }

    pub const fn downstream_failure(reason: RelayError) -> Self {
        Self::Failed {
            side: FailureSide::Downstream,
            reason,
        }
    }

    /// Terminal status this outcome maps to.
    #[must_use]
    pub const fn status(&self) -> RelayStatus {
        match self {
            Self::Completed => RelayStatus::Completed,
            Self::Aborted => RelayStatus::Aborted,
            Self::Failed { .. } => RelayStatus::Failed,
        }
    }
}

/// Byte and chunk counters for one relay.
#[derive(Debug)]
pub struct RelayCounters {
    started: Instant,
    bytes: AtomicU64,
    chunks: AtomicU64,
    /// Micros from start to the first relayed chunk, `u64::MAX` until then.
    first_chunk_micros: AtomicU64,
}

impl Default for RelayCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayCounters {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            bytes: AtomicU64::new(0),
            chunks: AtomicU64::new(0),
            first_chunk_micros: AtomicU64::new(u64::MAX),
        }
    }

    /// Account for one chunk written downstream.
    pub fn record_chunk(&self, len: usize) {
        if self.chunks.fetch_add(1, Ordering::Relaxed) == 0 {
            let micros = u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX - 1);
            self.first_chunk_micros.store(micros, Ordering::Relaxed);
        }
        self.bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    pub fn chunks(&self) -> u64 {
        self.chunks.load(Ordering::Relaxed)
    }

    pub fn first_chunk_after(&self) -> Option<Duration> {
        match self.first_chunk_micros.load(Ordering::Relaxed) {
            u64::MAX => None,
            micros => Some(Duration::from_micros(micros)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Mutable state of one in-flight relay.
#[derive(Debug)]
pub struct RelayState {
    id: Uuid,
    status: RelayStatus,
    cancel: CancellationToken,
    counters: Arc<RelayCounters>,
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            status: RelayStatus::Pending,
            cancel: CancellationToken::new(),
            counters: Arc::new(RelayCounters::new()),
        }
    }

    /// State whose token is also cancelled when `parent` is.
    #[must_use]
    pub fn with_parent(parent: &CancellationToken) -> Self {
        Self {
            cancel: parent.child_token(),
            ..Self::new()
        }
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn status(&self) -> RelayStatus {
        self.status
    }

    /// Token shared with whoever needs to stop this relay.
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn counters(&self) -> Arc<RelayCounters> {
        Arc::clone(&self.counters)
    }

    /// Pending -> Streaming. Returns false from any other status.
    pub fn begin_streaming(&mut self) -> bool {
        if self.status == RelayStatus::Pending {
            self.status = RelayStatus::Streaming;
            true
        } else {
            false
        }
    }

    /// Move to the outcome's terminal status.
    ///
    /// Only the first call takes effect; later calls return false and leave
    /// the status untouched.
    pub fn finish(&mut self, outcome: &RelayOutcome) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = outcome.status();
        true
    }
}
