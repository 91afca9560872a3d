//! Live sessions from the gateway's tool-invocation endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use http::Method;
use mc_core::{GatewayConfig, ProviderError, SessionSummary, SessionsPort};
use mc_relay::{RelayRequest, UpstreamConnector};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// Sessions requested per call.
pub const SESSION_LIMIT: u32 = 25;

#[derive(Debug, Default, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    result: Option<InvokeResult>,
}

#[derive(Debug, Default, Deserialize)]
struct InvokeResult {
    #[serde(default)]
    details: Option<InvokeDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct InvokeDetails {
    #[serde(default)]
    sessions: Vec<RawSession>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSession {
    key: String,
    kind: String,
    channel: Option<String>,
    display_name: Option<String>,
    model: Option<String>,
    total_tokens: Option<u64>,
    context_tokens: Option<u64>,
    updated_at: Option<i64>,
    label: Option<String>,
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl From<RawSession> for SessionSummary {
    fn from(raw: RawSession) -> Self {
        let display_name = filled(raw.display_name).unwrap_or_else(|| {
            raw.key
                .rsplit(':')
                .next()
                .unwrap_or_default()
                .to_string()
        });
        Self {
            kind: raw.kind,
            channel: filled(raw.channel).unwrap_or_else(|| "unknown".to_string()),
            display_name,
            model: raw
                .model
                .unwrap_or_default()
                .replacen("us.anthropic.", "", 1),
            total_tokens: raw.total_tokens.unwrap_or(0),
            context_tokens: raw.context_tokens.unwrap_or(0),
            updated_at: raw
                .updated_at
                .filter(|ms| *ms != 0)
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            label: filled(raw.label),
            key: raw.key,
        }
    }
}

/// Map a `/tools/invoke` response body to session summaries.
///
/// A body without `result.details.sessions` yields no sessions.
///
/// # Errors
///
/// `Parse` if the body is not JSON.
pub fn parse_sessions(body: &[u8]) -> Result<Vec<SessionSummary>, ProviderError> {
    let response: InvokeResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let sessions = response
        .result
        .and_then(|r| r.details)
        .map(|d| d.sessions)
        .unwrap_or_default();
    Ok(sessions.into_iter().map(SessionSummary::from).collect())
}

/// Sessions client that calls the gateway through the relay's upstream connector.
#[derive(Clone)]
pub struct GatewaySessions {
    connector: Arc<dyn UpstreamConnector>,
    gateway: Arc<GatewayConfig>,
}

impl std::fmt::Debug for GatewaySessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySessions")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl GatewaySessions {
    pub fn new(connector: Arc<dyn UpstreamConnector>, gateway: Arc<GatewayConfig>) -> Self {
        Self { connector, gateway }
    }

    fn request(&self) -> Result<RelayRequest, ProviderError> {
        let mut builder = RelayRequest::builder(self.gateway.tools_invoke_url())
            .method(Method::POST)
            .json(&json!({
                "tool": "sessions_list",
                "args": { "limit": SESSION_LIMIT, "messageLimit": 0 },
            }))
            .timeout(self.gateway.request_timeout);
        if let Some(token) = &self.gateway.token {
            builder = builder.bearer_auth(token);
        }
        builder
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl SessionsPort for GatewaySessions {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ProviderError> {
        let request = self.request()?;
        let handle = self
            .connector
            .open(&request)
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = handle.status();
        if !status.is_success() {
            warn!(%status, "Gateway answered sessions_list with an error status");
        }
        let body = handle
            .into_bytes()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let sessions = parse_sessions(&body)?;
        debug!(count = sessions.len(), "Listed gateway sessions");
        Ok(sessions)
    }
}
