//! Chunk pump: moves upstream chunks to the downstream writer in order.

use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::downstream::DownstreamWriter;
use crate::error::RelayError;
use crate::state::{RelayCounters, RelayOutcome};
use crate::upstream::ChunkResult;

/// Relay every chunk of `chunks` to `sink` until one side ends.
///
/// The cancellation token is checked before each read and each write, and
/// both are raced against it, so a cancelled relay never writes another
/// byte. The writer's header must already have been sent; `close` is the
/// caller's job.
pub async fn pump<S, W>(
    chunks: &mut S,
    sink: &mut W,
    cancel: &CancellationToken,
    counters: &RelayCounters,
) -> RelayOutcome
where
    S: Stream<Item = ChunkResult> + Unpin + Send,
    W: DownstreamWriter + ?Sized,
{
    loop {
        if cancel.is_cancelled() || !sink.is_alive() {
            return RelayOutcome::Aborted;
        }

        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return RelayOutcome::Aborted,
            next = chunks.next() => next,
        };

        let chunk = match next {
            None => return RelayOutcome::Completed,
            Some(Err(e)) => return RelayOutcome::upstream_failure(e),
            Some(Ok(chunk)) => chunk,
        };

        if cancel.is_cancelled() {
            return RelayOutcome::Aborted;
        }

        let len = chunk.len();
        let written = tokio::select! {
            biased;
            () = cancel.cancelled() => return RelayOutcome::Aborted,
            written = sink.write_chunk(chunk) => written,
        };

        match written {
            Ok(()) => {
                counters.record_chunk(len);
                trace!(len, "Relayed chunk");
            }
            Err(RelayError::PeerGone) => return RelayOutcome::Aborted,
            Err(e) => return RelayOutcome::downstream_failure(e),
        }
    }
}
