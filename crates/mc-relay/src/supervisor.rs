//! Relay lifecycle supervisor.
//!
//! Owns one relay from open to terminal state: races the open against the
//! peer, writes headers, drives the pump, and guarantees the upstream is
//! released and the writer closed on every path.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode, header::CONTENT_TYPE};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::downstream::{DownstreamWriter, PeerLiveness};
use crate::error::RelayError;
use crate::headers::downstream_headers;
use crate::pump::pump;
use crate::request::RelayRequest;
use crate::state::{RelayCounters, RelayOutcome, RelayState, RelayStatus};
use crate::upstream::{UpstreamConnector, UpstreamHandle, collect_chunks};

/// Summary of one finished relay.
#[derive(Debug, Clone)]
pub struct RelayReport {
    pub relay_id: Uuid,
    pub outcome: RelayOutcome,
    pub status: RelayStatus,
    pub bytes: u64,
    pub chunks: u64,
    pub headers_sent: bool,
    pub elapsed: Duration,
    /// Time from start to the first relayed chunk; `None` if nothing was relayed.
    pub first_chunk_after: Option<Duration>,
}

/// JSON body written when a relay fails before headers.
#[derive(Debug, Serialize)]
struct GatewayErrorBody {
    error: String,
    status: u16,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Spawns and supervises relays against one upstream connector.
#[derive(Clone)]
pub struct RelaySupervisor {
    connector: Arc<dyn UpstreamConnector>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RelaySupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySupervisor")
            .field("shutdown", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl RelaySupervisor {
    pub fn new(connector: Arc<dyn UpstreamConnector>) -> Self {
        Self {
            connector,
            shutdown: CancellationToken::new(),
        }
    }

    /// Abort every in-flight relay and any started later.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Run one relay on its own task.
    pub fn spawn<W>(&self, request: RelayRequest, mut sink: W) -> JoinHandle<RelayReport>
    where
        W: DownstreamWriter + 'static,
    {
        let supervisor = self.clone();
        tokio::spawn(async move { supervisor.run(request, &mut sink).await })
    }

    /// Run one relay to completion on the current task.
    pub async fn run<W>(&self, request: RelayRequest, sink: &mut W) -> RelayReport
    where
        W: DownstreamWriter + ?Sized,
    {
        let mut state = RelayState::with_parent(&self.shutdown);
        let span = info_span!(
            "relay",
            relay_id = %state.id(),
            target = %request.target(),
            streaming = request.is_streaming(),
        );

        async move {
            let counters = state.counters();
            let cancel = state.cancel_token().clone();
            let liveness = sink.liveness();

            let outcome = self
                .drive(&request, sink, &mut state, &cancel, &counters, &liveness)
                .await;

            cancel.cancel();
            sink.close();
            state.finish(&outcome);

            let report = RelayReport {
                relay_id: state.id(),
                status: state.status(),
                outcome,
                bytes: counters.bytes(),
                chunks: counters.chunks(),
                headers_sent: sink.headers_sent(),
                elapsed: counters.elapsed(),
                first_chunk_after: counters.first_chunk_after(),
            };
            log_terminal(&report);
            report
        }
        .instrument(span)
        .await
    }

    async fn drive<W>(
        &self,
        request: &RelayRequest,
        sink: &mut W,
        state: &mut RelayState,
        cancel: &CancellationToken,
        counters: &RelayCounters,
        liveness: &PeerLiveness,
    ) -> RelayOutcome
    where
        W: DownstreamWriter + ?Sized,
    {
        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => return RelayOutcome::Aborted,
            () = liveness.gone() => {
                debug!("Peer left while opening upstream");
                return RelayOutcome::Aborted;
            }
            opened = self.connector.open(request) => opened,
        };

        let handle = match opened {
            Ok(handle) => handle,
            Err(e) => {
                reject(sink, &e).await;
                return RelayOutcome::upstream_failure(e);
            }
        };

        if request.is_streaming() {
            stream_response(handle, sink, state, cancel, counters, liveness).await
        } else {
            buffer_response(handle, sink, cancel, counters, liveness).await
        }
    }
}

async fn stream_response<W>(
    handle: UpstreamHandle,
    sink: &mut W,
    state: &mut RelayState,
    cancel: &CancellationToken,
    counters: &RelayCounters,
    liveness: &PeerLiveness,
) -> RelayOutcome
where
    W: DownstreamWriter + ?Sized,
{
    let (status, upstream_headers, mut chunks) = handle.into_parts();
    let headers = downstream_headers(&upstream_headers, true);

    if let Err(e) = sink.write_header(status, headers).await {
        return match e {
            RelayError::PeerGone => RelayOutcome::Aborted,
            other => RelayOutcome::downstream_failure(other),
        };
    }
    state.begin_streaming();
    debug!(%status, "Streaming upstream response");

    let watcher = async {
        liveness.gone().await;
        cancel.cancel();
    };

    let outcome = tokio::select! {
        outcome = pump(&mut chunks, sink, cancel, counters) => outcome,
        () = watcher => RelayOutcome::Aborted,
    };
    drop(chunks);
    outcome
}

async fn buffer_response<W>(
    handle: UpstreamHandle,
    sink: &mut W,
    cancel: &CancellationToken,
    counters: &RelayCounters,
    liveness: &PeerLiveness,
) -> RelayOutcome
where
    W: DownstreamWriter + ?Sized,
{
    let (status, upstream_headers, chunks) = handle.into_parts();

    let collected = tokio::select! {
        biased;
        () = cancel.cancelled() => return RelayOutcome::Aborted,
        () = liveness.gone() => return RelayOutcome::Aborted,
        collected = collect_chunks(chunks) => collected,
    };

    let body = match collected {
        Ok(body) => body,
        Err(e) => {
            reject(sink, &e).await;
            return RelayOutcome::upstream_failure(e);
        }
    };

    let headers = downstream_headers(&upstream_headers, false);
    if let Err(e) = sink.write_header(status, headers).await {
        return match e {
            RelayError::PeerGone => RelayOutcome::Aborted,
            other => RelayOutcome::downstream_failure(other),
        };
    }

    let len = body.len();
    if len > 0 {
        match sink.write_chunk(body).await {
            Ok(()) => counters.record_chunk(len),
            Err(RelayError::PeerGone) => return RelayOutcome::Aborted,
            Err(e) => return RelayOutcome::downstream_failure(e),
        }
    }
    RelayOutcome::Completed
}

/// Write one 502 JSON response if the client is still there and nothing has
/// been sent yet.
async fn reject<W>(sink: &mut W, err: &RelayError)
where
    W: DownstreamWriter + ?Sized,
{
    if sink.headers_sent() || !sink.is_alive() {
        return;
    }

    let body = GatewayErrorBody {
        error: format!("Gateway error: {err}"),
        status: StatusCode::BAD_GATEWAY.as_u16(),
        kind: err.kind(),
    };
    let bytes = match serde_json::to_vec(&body) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            warn!(error = %e, "Failed to encode gateway error body");
            return;
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Err(e) = sink.write_header(StatusCode::BAD_GATEWAY, headers).await {
        debug!(error = %e, "Gateway error response not delivered");
        return;
    }
    match sink.write_chunk(bytes).await {
        Ok(()) => {}
        Err(RelayError::PeerGone) => debug!("Peer left before the gateway error body"),
        Err(e) => warn!(error = %e, "Failed to write gateway error body"),
    }
}

fn log_terminal(report: &RelayReport) {
    let elapsed_ms = report.elapsed.as_millis();
    let first_chunk_ms = report.first_chunk_after.map(|d| d.as_millis());
    match &report.outcome {
        RelayOutcome::Completed => info!(
            bytes = report.bytes,
            chunks = report.chunks,
            elapsed_ms,
            first_chunk_ms,
            "Relay completed"
        ),
        RelayOutcome::Aborted => debug!(
            bytes = report.bytes,
            chunks = report.chunks,
            elapsed_ms,
            first_chunk_ms,
            "Relay aborted"
        ),
        RelayOutcome::Failed { side, reason } if report.headers_sent => error!(
            %side,
            kind = reason.kind(),
            error = %reason,
            bytes = report.bytes,
            elapsed_ms,
            first_chunk_ms,
            "Relay failed after headers were sent"
        ),
        RelayOutcome::Failed { side, reason } => warn!(
            %side,
            kind = reason.kind(),
            error = %reason,
            elapsed_ms,
            "Relay failed"
        ),
    }
}
