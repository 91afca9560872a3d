//! Downstream writer backed by an axum response body.
//!
//! The relay task and the HTTP response are joined by two channels: a
//! oneshot carrying status and headers, and a bounded body channel of
//! capacity 1. Dropping the response body (client gone) trips the writer's
//! liveness signal.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use mc_relay::{DownstreamWriter, PeerLiveness, RelayError};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::DropGuard;

use crate::error::HttpError;

type BodyItem = Result<Bytes, io::Error>;

/// Status line and headers produced by the relay.
#[derive(Debug)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Relay-side half: implements [`DownstreamWriter`].
#[derive(Debug)]
pub struct ChannelWriter {
    head: Option<oneshot::Sender<ResponseHead>>,
    body: Option<mpsc::Sender<BodyItem>>,
    liveness: PeerLiveness,
    write_timeout: Option<Duration>,
    headers_sent: bool,
    closed: bool,
}

/// Handler-side half: resolves to the HTTP response once headers arrive.
#[derive(Debug)]
pub struct PendingResponse {
    head: oneshot::Receiver<ResponseHead>,
    body: mpsc::Receiver<BodyItem>,
    guard: DropGuard,
}

/// Create a connected writer / response pair.
///
/// With `write_timeout` set, a chunk the client does not accept in time
/// fails with `DownstreamStalled`.
pub fn channel_writer(write_timeout: Option<Duration>) -> (ChannelWriter, PendingResponse) {
    let (head_tx, head_rx) = oneshot::channel();
    let (body_tx, body_rx) = mpsc::channel(1);
    let liveness = PeerLiveness::new();
    let guard = liveness.guard();

    let writer = ChannelWriter {
        head: Some(head_tx),
        body: Some(body_tx),
        liveness,
        write_timeout,
        headers_sent: false,
        closed: false,
    };
    let pending = PendingResponse {
        head: head_rx,
        body: body_rx,
        guard,
    };
    (writer, pending)
}

impl ChannelWriter {
    fn gone(&self) -> RelayError {
        self.liveness.mark_gone();
        RelayError::PeerGone
    }
}

#[async_trait]
impl DownstreamWriter for ChannelWriter {
    async fn write_header(
        &mut self,
        status: StatusCode,
        headers: HeaderMap,
    ) -> Result<(), RelayError> {
        if self.closed {
            return Err(RelayError::InvalidSequence("write_header after close"));
        }
        let Some(head) = self.head.take() else {
            return Err(RelayError::InvalidSequence("write_header called twice"));
        };
        if self.liveness.is_gone() {
            return Err(RelayError::PeerGone);
        }
        head.send(ResponseHead { status, headers })
            .map_err(|_| self.gone())?;
        self.headers_sent = true;
        Ok(())
    }

    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), RelayError> {
        if self.closed {
            return Err(RelayError::InvalidSequence("write_chunk after close"));
        }
        if !self.headers_sent {
            return Err(RelayError::InvalidSequence("write_chunk before write_header"));
        }
        if self.liveness.is_gone() {
            return Err(RelayError::PeerGone);
        }
        let Some(body) = &self.body else {
            return Err(RelayError::InvalidSequence("write_chunk after close"));
        };

        let sent = match self.write_timeout {
            Some(limit) => tokio::time::timeout(limit, body.send(Ok(chunk)))
                .await
                .map_err(|_| RelayError::DownstreamStalled(limit))?,
            None => body.send(Ok(chunk)).await,
        };
        sent.map_err(|_| self.gone())
    }

    fn close(&mut self) {
        self.closed = true;
        self.head = None;
        self.body = None;
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

impl PendingResponse {
    /// Wait for the relay's headers and turn them into a streaming response.
    ///
    /// A relay that ends without writing headers yields a 500.
    pub async fn into_response(self) -> Response {
        let Ok(head) = self.head.await else {
            return HttpError::Internal("relay ended without a response".into()).into_response();
        };

        let body = GuardedBody {
            inner: ReceiverStream::new(self.body),
            _guard: self.guard,
        };
        let mut response = Response::new(Body::from_stream(body));
        *response.status_mut() = head.status;
        *response.headers_mut() = head.headers;
        response
    }
}

/// Body stream that marks the peer gone when the server drops it.
struct GuardedBody {
    inner: ReceiverStream<BodyItem>,
    _guard: DropGuard,
}

impl Stream for GuardedBody {
    type Item = BodyItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;
    use http_body_util::BodyExt;

    fn sse_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "text/event-stream".parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn chunks_reach_the_response_body() {
        let (mut writer, pending) = channel_writer(None);
        let relay = tokio::spawn(async move {
            writer.write_header(StatusCode::OK, sse_headers()).await.unwrap();
            writer.write_chunk(Bytes::from_static(b"data: a\n\n")).await.unwrap();
            writer.write_chunk(Bytes::from_static(b"data: b\n\n")).await.unwrap();
            writer.close();
        });

        let response = pending.into_response().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"data: a\n\ndata: b\n\n");
        relay.await.unwrap();
    }

    #[tokio::test]
    async fn dropped_body_marks_peer_gone() {
        let (mut writer, pending) = channel_writer(None);
        let liveness = writer.liveness();
        writer.write_header(StatusCode::OK, HeaderMap::new()).await.unwrap();

        drop(pending.into_response().await);
        assert!(liveness.is_gone());
        assert!(!writer.is_alive());
        let err = writer.write_chunk(Bytes::from_static(b"late")).await.unwrap_err();
        assert_eq!(err, RelayError::PeerGone);
    }

    #[tokio::test]
    async fn dropped_pending_fails_header_write() {
        let (mut writer, pending) = channel_writer(None);
        drop(pending);
        let err = writer.write_header(StatusCode::OK, HeaderMap::new()).await.unwrap_err();
        assert_eq!(err, RelayError::PeerGone);
        assert!(!writer.headers_sent());
    }

    #[tokio::test]
    async fn unread_body_stalls_with_write_timeout() {
        let limit = Duration::from_millis(50);
        let (mut writer, pending) = channel_writer(Some(limit));
        writer.write_header(StatusCode::OK, HeaderMap::new()).await.unwrap();
        let _response = pending.into_response().await;

        // Capacity 1: the first chunk is buffered, the second has nowhere to go.
        writer.write_chunk(Bytes::from_static(b"one")).await.unwrap();
        let err = writer.write_chunk(Bytes::from_static(b"two")).await.unwrap_err();
        assert_eq!(err, RelayError::DownstreamStalled(limit));
    }

    #[tokio::test]
    async fn enforces_call_order() {
        let (mut writer, _pending) = channel_writer(None);
        let err = writer.write_chunk(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidSequence(_)));

        writer.write_header(StatusCode::OK, HeaderMap::new()).await.unwrap();
        let err = writer.write_header(StatusCode::OK, HeaderMap::new()).await.unwrap_err();
        assert_eq!(err, RelayError::InvalidSequence("write_header called twice"));

        writer.close();
        writer.close();
        let err = writer.write_chunk(Bytes::new()).await.unwrap_err();
        assert_eq!(err, RelayError::InvalidSequence("write_chunk after close"));
    }

    #[tokio::test]
    async fn relay_without_headers_is_500() {
        let (writer, pending) = channel_writer(None);
        drop(writer);
        let response = pending.into_response().await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
