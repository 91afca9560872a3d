//! Router wiring tests driven through `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use bytes::Bytes;
use common::{MockCron, MockSessions, body_json, body_string, context, get, post_json};
use http_body_util::BodyExt;
use mc_axum::{CorsConfig, create_router};
use mc_core::{CronJob, HeartbeatState, ProviderError, SessionSummary};
use mc_relay::RelayError;
use mc_relay::testing::ScriptedConnector;
use tower::ServiceExt;

const GRACE: Duration = Duration::from_millis(500);
const CHAT: &str = r#"{"messages":[{"role":"user","content":"hi"}],"stream":true}"#;

#[tokio::test]
async fn health_returns_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(context(ScriptedConnector::pending(), dir.path()), &CorsConfig::AllowAll);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn chat_streams_gateway_frames_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let connector = ScriptedConnector::chunks(["data: {\"x\":1}\n\n", "data: [DONE]\n\n"]);
    let app = create_router(context(connector.clone(), dir.path()), &CorsConfig::AllowAll);

    let response = app.oneshot(post_json("/api/chat", CHAT)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");
    assert_eq!(response.headers()[CACHE_CONTROL], "no-cache");
    assert_eq!(response.headers()["x-accel-buffering"], "no");
    assert_eq!(
        body_string(response).await,
        "data: {\"x\":1}\n\ndata: [DONE]\n\n"
    );

    let request = connector.last_request().unwrap();
    assert_eq!(request.target().path(), "/v1/chat/completions");
    assert_eq!(request.headers()["authorization"], "Bearer mc-token");
    let payload: serde_json::Value = serde_json::from_slice(request.body().unwrap()).unwrap();
    assert_eq!(payload["messages"][0]["content"], "hi");
    assert_eq!(payload["stream"], true);
}

#[tokio::test]
async fn buffered_chat_mirrors_upstream_status() {
    let dir = tempfile::tempdir().unwrap();
    let connector = ScriptedConnector::chunks([r#"{"error":"rate limited"}"#])
        .with_status(StatusCode::TOO_MANY_REQUESTS);
    let app = create_router(context(connector, dir.path()), &CorsConfig::AllowAll);

    let response = app
        .oneshot(post_json("/api/chat", r#"{"messages":[]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(body_json(response).await["error"], "rate limited");
}

#[tokio::test]
async fn missing_messages_is_rejected_before_upstream() {
    let dir = tempfile::tempdir().unwrap();
    let connector = ScriptedConnector::chunks(["unused"]);
    let app = create_router(context(connector.clone(), dir.path()), &CorsConfig::AllowAll);

    let response = app
        .oneshot(post_json("/api/chat", r#"{"stream":true}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["type"], "MALFORMED_REQUEST");
    assert_eq!(body["status"], 400);
    assert_eq!(connector.open_calls(), 0);
}

#[tokio::test]
async fn unparseable_chat_body_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let connector = ScriptedConnector::chunks(["unused"]);
    let app = create_router(context(connector.clone(), dir.path()), &CorsConfig::AllowAll);

    let response = app.oneshot(post_json("/api/chat", "{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(connector.open_calls(), 0);
}

#[tokio::test]
async fn misconfigured_gateway_is_500_not_400() {
    let dir = tempfile::tempdir().unwrap();
    let connector = ScriptedConnector::chunks(["unused"]);
    let mut ctx = context(connector.clone(), dir.path());
    ctx.gateway = Arc::new(
        mc_core::GatewayConfig::new("http://gateway.test").with_timeout(Duration::ZERO),
    );
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app.oneshot(post_json("/api/chat", CHAT)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["status"], 500);
    assert!(body["error"].as_str().unwrap().contains("timeout must be positive"));
    assert_eq!(connector.open_calls(), 0);
}

#[tokio::test]
async fn unreachable_gateway_is_502() {
    let dir = tempfile::tempdir().unwrap();
    let connector =
        ScriptedConnector::failing(RelayError::UpstreamUnavailable("connection refused".into()));
    let app = create_router(context(connector, dir.path()), &CorsConfig::AllowAll);

    let response = app.oneshot(post_json("/api/chat", CHAT)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["status"], 502);
    assert_eq!(body["type"], "UPSTREAM_UNAVAILABLE");
    assert!(body["error"].as_str().unwrap().starts_with("Gateway error: "));
}

#[tokio::test]
async fn client_disconnect_releases_upstream() {
    let dir = tempfile::tempdir().unwrap();
    let connector = ScriptedConnector::chunks(["data: first\n\n"]).hold_open();
    let app = create_router(context(connector.clone(), dir.path()), &CorsConfig::AllowAll);

    let response = app.oneshot(post_json("/api/chat", CHAT)).await.unwrap();
    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    assert_eq!(frame.into_data().unwrap(), Bytes::from_static(b"data: first\n\n"));

    drop(body);
    let release = connector.last_release().unwrap();
    tokio::time::timeout(GRACE, release.released())
        .await
        .expect("upstream should be released after client disconnect");
}

#[tokio::test]
async fn status_combines_providers_and_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("status.json"),
        r#"{"recentActivity":[{"time":"2026-02-07T09:00:00.000Z","action":"Calendar sync","detail":"No events","type":"calendar"}],
            "tokenUsage":{"used":187432,"limit":1000000,"percentage":18.7}}"#,
    )
    .unwrap();
    let mut ctx = context(ScriptedConnector::pending(), dir.path());
    ctx.heartbeat = Arc::new(common::StaticHeartbeat(HeartbeatState {
        last_heartbeat: Some(serde_json::Value::from(1_700_000_000)),
        ..HeartbeatState::default()
    }));
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let body = body_json(app.oneshot(get("/api/status")).await.unwrap()).await;
    assert_eq!(body["agent"]["name"], "Zinbot");
    assert_eq!(body["agent"]["model"], "Claude Opus 4");
    assert_eq!(body["heartbeat"]["lastHeartbeat"], 1_700_000_000);

    let activity = body["recentActivity"].as_array().unwrap();
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0]["type"], "heartbeat");
    assert_eq!(activity[0]["time"], "2023-11-14T22:13:20.000Z");
    assert_eq!(activity[1]["action"], "Calendar sync");
    assert_eq!(body["tokenUsage"]["used"], 187_432);
}

#[tokio::test]
async fn status_reports_unreadable_heartbeat() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(context(ScriptedConnector::pending(), dir.path()), &CorsConfig::AllowAll);

    let body = body_json(app.oneshot(get("/api/status")).await.unwrap()).await;
    assert!(body["heartbeat"]["lastHeartbeat"].is_null());
    assert_eq!(body["heartbeat"]["lastChecks"], serde_json::json!({}));
    assert_eq!(body["heartbeat"]["note"], "Unable to read heartbeat state");
    assert_eq!(body["recentActivity"].as_array().unwrap().len(), 1);
    assert_eq!(body["tokenUsage"]["limit"], 0);
}

#[tokio::test]
async fn sessions_failure_is_reported_in_body() {
    let dir = tempfile::tempdir().unwrap();
    let mut sessions = MockSessions::new();
    sessions
        .expect_list_sessions()
        .times(1)
        .returning(|| Err(ProviderError::Unavailable("connection refused".into())));
    let mut ctx = context(ScriptedConnector::pending(), dir.path());
    ctx.sessions = Arc::new(sessions);
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app.oneshot(get("/api/sessions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["sessions"], serde_json::json!([]));
    assert_eq!(body["error"], "Unavailable: connection refused");
}

#[tokio::test]
async fn sessions_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let mut sessions = MockSessions::new();
    sessions.expect_list_sessions().returning(|| {
        Ok(vec![SessionSummary {
            key: "agent:main:telegram:42".into(),
            kind: "direct".into(),
            channel: "telegram".into(),
            display_name: "42".into(),
            model: "claude-opus-4-6".into(),
            total_tokens: 10,
            context_tokens: 200_000,
            updated_at: None,
            label: None,
        }])
    });
    let mut ctx = context(ScriptedConnector::pending(), dir.path());
    ctx.sessions = Arc::new(sessions);
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let body = body_json(app.oneshot(get("/api/sessions")).await.unwrap()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["sessions"][0]["displayName"], "42");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn cron_failure_is_reported_in_body() {
    let dir = tempfile::tempdir().unwrap();
    let mut cron = MockCron::new();
    cron.expect_list_jobs().times(1).returning(|| {
        Err(ProviderError::Timeout {
            command: "openclaw cron list --json".into(),
            secs: 10,
        })
    });
    let mut ctx = context(ScriptedConnector::pending(), dir.path());
    ctx.cron = Arc::new(cron);
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let response = app.oneshot(get("/api/cron")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["jobs"], serde_json::json!([]));
    assert!(body["error"].as_str().unwrap().contains("timed out after 10s"));
}

#[tokio::test]
async fn cron_jobs_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let mut cron = MockCron::new();
    cron.expect_list_jobs().returning(|| {
        Ok(vec![CronJob {
            id: "j1".into(),
            name: "Backup".into(),
            schedule: "0 3 * * *".into(),
            status: "active".into(),
            last_run: None,
            next_run: None,
            duration: Some("1520ms".into()),
            target: "main".into(),
            payload: "systemEvent".into(),
            description: String::new(),
            history: Vec::new(),
        }])
    });
    let mut ctx = context(ScriptedConnector::pending(), dir.path());
    ctx.cron = Arc::new(cron);
    let app = create_router(ctx, &CorsConfig::AllowAll);

    let body = body_json(app.oneshot(get("/api/cron")).await.unwrap()).await;
    assert_eq!(body["jobs"][0]["name"], "Backup");
    assert_eq!(body["jobs"][0]["lastRun"], serde_json::Value::Null);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn panels_serve_fixtures_or_empty_documents() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("tasks.json"),
        r#"{"columns":{"queue":[{"id":"t1","title":"Landing page","priority":"high","tags":["web"]}]}}"#,
    )
    .unwrap();
    let app = create_router(context(ScriptedConnector::pending(), dir.path()), &CorsConfig::AllowAll);

    let tasks = body_json(app.clone().oneshot(get("/api/tasks")).await.unwrap()).await;
    assert_eq!(tasks["columns"]["queue"][0]["title"], "Landing page");
    assert_eq!(tasks["columns"]["inProgress"], serde_json::json!([]));

    let agents = body_json(app.clone().oneshot(get("/api/agents")).await.unwrap()).await;
    assert_eq!(agents, serde_json::json!({"agents": [], "conversations": []}));

    let scout = body_json(app.clone().oneshot(get("/api/scout")).await.unwrap()).await;
    assert_eq!(scout["opportunities"], serde_json::json!([]));

    let costs = body_json(app.oneshot(get("/api/costs")).await.unwrap()).await;
    assert_eq!(costs["summary"]["thisMonth"], 0.0);
}

#[tokio::test]
async fn unknown_api_path_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(context(ScriptedConnector::pending(), dir.path()), &CorsConfig::AllowAll);

    let response = app.oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
