//! In-memory doubles for the relay seams.
//!
//! Available to this crate's tests and, through the `test-utils` feature,
//! to other crates' tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, StreamExt};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tokio::sync::Notify;

use crate::downstream::{DownstreamWriter, PeerLiveness};
use crate::error::RelayError;
use crate::request::RelayRequest;
use crate::upstream::{ChunkResult, ReleaseSignal, UpstreamConnector, UpstreamHandle};

#[derive(Debug, Default)]
struct RecordedResponse {
    status: Option<StatusCode>,
    headers: Option<HeaderMap>,
    chunks: Vec<Bytes>,
    closes: usize,
}

#[derive(Debug, Default)]
struct RecordingShared {
    response: Mutex<RecordedResponse>,
    changed: Notify,
}

/// Read side of a [`RecordingWriter`], usable after the writer moved away.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    shared: Arc<RecordingShared>,
}

impl Recording {
    fn lock(&self) -> MutexGuard<'_, RecordedResponse> {
        self.shared
            .response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.lock().status
    }

    pub fn headers(&self) -> Option<HeaderMap> {
        self.lock().headers.clone()
    }

    /// Chunks as lossy UTF-8, in write order.
    pub fn chunks(&self) -> Vec<String> {
        self.lock()
            .chunks
            .iter()
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect()
    }

    /// Every chunk concatenated.
    pub fn body(&self) -> String {
        let response = self.lock();
        let mut buf = BytesMut::new();
        for chunk in &response.chunks {
            buf.extend_from_slice(chunk);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Number of `close` calls that took effect.
    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    /// Resolve once at least `n` chunks were written.
    pub async fn wait_for_chunks(&self, n: usize) {
        loop {
            let changed = self.shared.changed.notified();
            if self.lock().chunks.len() >= n {
                return;
            }
            changed.await;
        }
    }
}

/// Downstream writer that records everything it is given.
///
/// Enforces the header/chunk/close ordering and can simulate a client that
/// disconnects.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    recording: Recording,
    liveness: PeerLiveness,
    headers_sent: bool,
    closed: bool,
    written: usize,
    disconnect_after: Option<usize>,
    fail_with: Option<RelayError>,
}

impl RecordingWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recording(&self) -> Recording {
        self.recording.clone()
    }

    /// The peer leaves right after the `n`-th chunk is written.
    #[must_use]
    pub const fn disconnect_after(mut self, n: usize) -> Self {
        self.disconnect_after = Some(n);
        self
    }

    /// Every chunk write fails with `err`.
    #[must_use]
    pub fn fail_writes_with(mut self, err: RelayError) -> Self {
        self.fail_with = Some(err);
        self
    }

    /// The peer leaves now.
    pub fn disconnect(&self) {
        self.liveness.mark_gone();
    }

    fn notify(&self) {
        self.recording.shared.changed.notify_waiters();
    }
}

#[async_trait]
impl DownstreamWriter for RecordingWriter {
    async fn write_header(
        &mut self,
        status: StatusCode,
        headers: HeaderMap,
    ) -> Result<(), RelayError> {
        if self.closed {
            return Err(RelayError::InvalidSequence("write_header after close"));
        }
        if self.headers_sent {
            return Err(RelayError::InvalidSequence("write_header called twice"));
        }
        if self.liveness.is_gone() {
            return Err(RelayError::PeerGone);
        }
        {
            let mut response = self.recording.lock();
            response.status = Some(status);
            response.headers = Some(headers);
        }
        self.headers_sent = true;
        self.notify();
        Ok(())
    }

    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), RelayError> {
        if !self.headers_sent {
            return Err(RelayError::InvalidSequence("write_chunk before write_header"));
        }
        if self.closed {
            return Err(RelayError::InvalidSequence("write_chunk after close"));
        }
        if self.liveness.is_gone() {
            return Err(RelayError::PeerGone);
        }
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }

        self.recording.lock().chunks.push(chunk);
        self.written += 1;
        if self.disconnect_after.is_some_and(|n| self.written >= n) {
            self.liveness.mark_gone();
        }
        self.notify();
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.recording.lock().closes += 1;
        self.notify();
    }

    fn is_alive(&self) -> bool {
        !self.closed && !self.liveness.is_gone()
    }

    fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    fn liveness(&self) -> PeerLiveness {
        self.liveness.clone()
    }
}

#[derive(Debug, Clone)]
enum Script {
    Respond(Vec<ChunkResult>),
    Fail(RelayError),
    Pending,
}

#[derive(Debug, Default)]
struct ConnectorShared {
    opens: AtomicUsize,
    last_release: Mutex<Option<ReleaseSignal>>,
    last_request: Mutex<Option<RelayRequest>>,
}

/// Upstream connector that replays a fixed script.
#[derive(Debug, Clone)]
pub struct ScriptedConnector {
    script: Script,
    status: StatusCode,
    headers: HeaderMap,
    hold_open: bool,
    shared: Arc<ConnectorShared>,
}

impl ScriptedConnector {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            hold_open: false,
            shared: Arc::default(),
        }
    }

    /// Respond 200 with these chunks, then end the stream.
    pub fn chunks<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self::script(
            parts
                .into_iter()
                .map(|p| Ok(Bytes::from_static(p.as_bytes())))
                .collect(),
        )
    }

    /// Respond 200 with an arbitrary chunk script, errors included.
    pub fn script(items: Vec<ChunkResult>) -> Self {
        Self::with_script(Script::Respond(items))
    }

    /// Every open fails with `err`.
    pub fn failing(err: RelayError) -> Self {
        Self::with_script(Script::Fail(err))
    }

    /// Every open hangs forever.
    pub fn pending() -> Self {
        Self::with_script(Script::Pending)
    }

    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Keep the stream open after the scripted chunks instead of ending it.
    #[must_use]
    pub const fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn open_calls(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    /// Release signal of the most recently opened handle.
    pub fn last_release(&self) -> Option<ReleaseSignal> {
        self.shared
            .last_release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<RelayRequest> {
        self.shared
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl UpstreamConnector for ScriptedConnector {
    async fn open(&self, request: &RelayRequest) -> Result<UpstreamHandle, RelayError> {
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        *self
            .shared
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.clone());

        let items = match &self.script {
            Script::Respond(items) => items.clone(),
            Script::Fail(err) => return Err(err.clone()),
            Script::Pending => std::future::pending().await,
        };

        let handle = if self.hold_open {
            let chunks = stream::iter(items).chain(stream::pending());
            UpstreamHandle::new(self.status, self.headers.clone(), chunks)
        } else {
            UpstreamHandle::new(self.status, self.headers.clone(), stream::iter(items))
        };

        *self
            .shared
            .last_release
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle.release_signal());
        Ok(handle)
    }
}
