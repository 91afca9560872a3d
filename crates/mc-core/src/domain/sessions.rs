//! Live gateway sessions served by `GET /api/sessions`.

use serde::{Deserialize, Serialize};

/// One conversation session known to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub key: String,
    pub kind: String,
    pub channel: String,
    pub display_name: String,
    pub model: String,
    pub total_tokens: u64,
    pub context_tokens: u64,
    /// RFC 3339 timestamp.
    pub updated_at: Option<String>,
    pub label: Option<String>,
}

/// `GET /api/sessions` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub count: usize,
    pub sessions: Vec<SessionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionsResponse {
    #[must_use]
    pub fn ok(sessions: Vec<SessionSummary>) -> Self {
        Self {
            count: sessions.len(),
            sessions,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            count: 0,
            sessions: Vec::new(),
            error: Some(error.into()),
        }
    }
}
