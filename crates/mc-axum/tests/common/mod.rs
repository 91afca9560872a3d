//! Test context builders shared by the router suites.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use mc_axum::AxumContext;
use mc_core::{
    AgentStatus, CronJob, CronProviderPort, FixedStatusProvider, GatewayConfig, HeartbeatPort,
    HeartbeatState, ProviderError, SessionSummary, SessionsPort,
};
use mc_relay::RelaySupervisor;
use mc_relay::testing::ScriptedConnector;
use mc_runtime::FilePanelSource;
use mockall::mock;

mock! {
    pub Cron {}

    #[async_trait]
    impl CronProviderPort for Cron {
        async fn list_jobs(&self) -> Result<Vec<CronJob>, ProviderError>;
    }
}

mock! {
    pub Sessions {}

    #[async_trait]
    impl SessionsPort for Sessions {
        async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ProviderError>;
    }
}

/// Heartbeat port returning a fixed state.
pub struct StaticHeartbeat(pub HeartbeatState);

#[async_trait]
impl HeartbeatPort for StaticHeartbeat {
    async fn heartbeat(&self) -> HeartbeatState {
        self.0.clone()
    }
}

/// Context whose gateway is `connector` and whose other ports are inert.
pub fn context(connector: ScriptedConnector, panel_dir: &Path) -> AxumContext {
    let mut cron = MockCron::new();
    cron.expect_list_jobs().returning(|| Ok(Vec::new()));
    let mut sessions = MockSessions::new();
    sessions.expect_list_sessions().returning(|| Ok(Vec::new()));

    AxumContext {
        gateway: Arc::new(GatewayConfig::new("http://gateway.test").with_token("mc-token")),
        relay: RelaySupervisor::new(Arc::new(connector)),
        write_timeout: None,
        status: Arc::new(FixedStatusProvider::new(AgentStatus::fallback("Zinbot"))),
        heartbeat: Arc::new(StaticHeartbeat(HeartbeatState::unavailable())),
        cron: Arc::new(cron),
        sessions: Arc::new(sessions),
        panels: Arc::new(FilePanelSource::new(panel_dir)),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
