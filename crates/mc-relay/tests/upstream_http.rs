//! Relay tests against real sockets on the loopback interface.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use futures_util::stream;
use mc_relay::testing::RecordingWriter;
use mc_relay::{
    FailureSide, RelayError, RelayOutcome, RelayRequest, RelaySupervisor, UpstreamClient,
};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Seen {
    authorization: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<String>>>,
}

async fn fake_completions(State(seen): State<Seen>, headers: HeaderMap, body: String) -> Response {
    *seen.authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let streaming = body.contains("\"stream\":true");
    *seen.body.lock().unwrap() = Some(body);

    if streaming {
        let frames = stream::iter(vec![
            Ok::<_, Infallible>("data: {\"x\":1}\n\n"),
            Ok("data: [DONE]\n\n"),
        ]);
        Response::builder()
            .header(header::CONTENT_TYPE, "text/event-stream")
            .body(Body::from_stream(frames))
            .unwrap()
    } else {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#,
        )
            .into_response()
    }
}

async fn spawn_gateway() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(fake_completions))
        .with_state(seen.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn supervisor() -> RelaySupervisor {
    RelaySupervisor::new(Arc::new(UpstreamClient::with_defaults().unwrap()))
}

#[tokio::test]
async fn streams_from_real_gateway() {
    let (base, seen) = spawn_gateway().await;
    let request = RelayRequest::builder(format!("{base}/v1/chat/completions"))
        .method(http::Method::POST)
        .bearer_auth("secret")
        .json(&serde_json::json!({"model": "openclaw", "messages": [], "stream": true}))
        .streaming(true)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let mut writer = RecordingWriter::new();
    let recording = writer.recording();
    let report = supervisor().run(request, &mut writer).await;

    assert_eq!(report.outcome, RelayOutcome::Completed);
    assert_eq!(recording.body(), "data: {\"x\":1}\n\ndata: [DONE]\n\n");
    let headers = recording.headers().unwrap();
    assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
    assert!(!headers.contains_key(header::TRANSFER_ENCODING));
    assert_eq!(
        seen.authorization.lock().unwrap().as_deref(),
        Some("Bearer secret")
    );
}

#[tokio::test]
async fn buffered_response_from_real_gateway() {
    let (base, seen) = spawn_gateway().await;
    let request = RelayRequest::builder(format!("{base}/v1/chat/completions"))
        .method(http::Method::POST)
        .json(&serde_json::json!({"messages": [], "stream": false}))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let mut writer = RecordingWriter::new();
    let recording = writer.recording();
    let report = supervisor().run(request, &mut writer).await;

    assert_eq!(report.outcome, RelayOutcome::Completed);
    assert_eq!(recording.status(), Some(StatusCode::OK));
    let body: serde_json::Value = serde_json::from_str(&recording.body()).unwrap();
    assert_eq!(body["choices"][0]["message"]["content"], "hi");
    assert!(seen.authorization.lock().unwrap().is_none());
}

#[tokio::test]
async fn silent_upstream_times_out_with_single_502() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let request = RelayRequest::builder(format!("http://{addr}/v1/chat/completions"))
        .method(http::Method::POST)
        .streaming(true)
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let mut writer = RecordingWriter::new();
    let recording = writer.recording();
    let report = supervisor().run(request, &mut writer).await;

    assert_eq!(
        report.outcome,
        RelayOutcome::Failed {
            side: FailureSide::Upstream,
            reason: RelayError::UpstreamTimeout(Duration::from_millis(200)),
        }
    );
    assert!(report.elapsed < Duration::from_secs(2));
    assert_eq!(recording.status(), Some(StatusCode::BAD_GATEWAY));
    assert_eq!(recording.chunks().len(), 1);
    let body: serde_json::Value = serde_json::from_str(&recording.body()).unwrap();
    assert_eq!(body["type"], "UPSTREAM_TIMEOUT");
    assert_eq!(body["status"], 502);
}

#[tokio::test]
async fn refused_connection_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let request = RelayRequest::builder(format!("http://{addr}/v1/chat/completions"))
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let mut writer = RecordingWriter::new();
    let recording = writer.recording();
    let report = supervisor().run(request, &mut writer).await;

    assert!(matches!(
        report.outcome,
        RelayOutcome::Failed {
            reason: RelayError::UpstreamUnavailable(_),
            ..
        }
    ));
    let body: serde_json::Value = serde_json::from_str(&recording.body()).unwrap();
    assert_eq!(body["type"], "UPSTREAM_UNAVAILABLE");
}
