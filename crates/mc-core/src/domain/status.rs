//! Agent status shapes served by `GET /api/status`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model label used when the CLI output names none.
pub const DEFAULT_MODEL_LABEL: &str = "Claude Opus 4";

/// Note used when the heartbeat file cannot be read.
pub const HEARTBEAT_UNAVAILABLE_NOTE: &str = "Unable to read heartbeat state";

/// One messaging channel row from the status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub name: String,
    /// `ON` / `OFF` as printed.
    pub enabled: String,
    /// `OK` / `OFF` / `ERROR` as printed.
    pub state: String,
    pub detail: String,
}

/// Agent summary scraped from the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub name: String,
    pub status: String,
    pub model: String,
    pub active_sessions: u32,
    pub total_agents: u32,
    pub memory_files: u32,
    pub memory_chunks: u32,
    pub heartbeat_interval: String,
    pub channels: Vec<ChannelStatus>,
}

impl AgentStatus {
    /// Defaults reported when nothing could be scraped.
    #[must_use]
    pub fn fallback(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "active".to_string(),
            model: DEFAULT_MODEL_LABEL.to_string(),
            active_sessions: 0,
            total_agents: 1,
            memory_files: 46,
            memory_chunks: 225,
            heartbeat_interval: "1h".to_string(),
            channels: Vec::new(),
        }
    }
}

/// Contents of the heartbeat state file.
///
/// Unknown keys are kept so the dashboard sees the file as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatState {
    /// Unix timestamp in seconds, as written (number or numeric string).
    #[serde(default)]
    pub last_heartbeat: Option<Value>,
    #[serde(default)]
    pub last_checks: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HeartbeatState {
    /// State reported when the file is missing or unparseable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            last_heartbeat: None,
            last_checks: Map::new(),
            note: Some(HEARTBEAT_UNAVAILABLE_NOTE.to_string()),
            extra: Map::new(),
        }
    }

    /// Last heartbeat as a UTC time, if recorded and in range.
    #[must_use]
    pub fn last_heartbeat_at(&self) -> Option<DateTime<Utc>> {
        let secs = match self.last_heartbeat.as_ref()? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !secs.is_finite() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        DateTime::from_timestamp_millis((secs * 1000.0) as i64)
    }

    /// Activity entry describing this heartbeat, timed at `now` if none is recorded.
    #[must_use]
    pub fn activity_entry(&self, now: DateTime<Utc>) -> ActivityEntry {
        ActivityEntry {
            time: self
                .last_heartbeat_at()
                .unwrap_or(now)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            action: "Heartbeat check".to_string(),
            detail: self
                .note
                .clone()
                .unwrap_or_else(|| "Routine check".to_string()),
            kind: "heartbeat".to_string(),
        }
    }
}

/// One line of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub time: String,
    pub action: String,
    pub detail: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Token budget gauge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub used: u64,
    pub limit: u64,
    pub percentage: f64,
}

/// Full `GET /api/status` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub agent: AgentStatus,
    pub heartbeat: HeartbeatState,
    pub recent_activity: Vec<ActivityEntry>,
    pub token_usage: TokenUsage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_status_serializes_camel_case() {
        let json = serde_json::to_value(AgentStatus::fallback("Zinbot")).unwrap();
        assert_eq!(json["activeSessions"], 0);
        assert_eq!(json["heartbeatInterval"], "1h");
        assert_eq!(json["model"], DEFAULT_MODEL_LABEL);
    }

    #[test]
    fn heartbeat_keeps_unknown_keys() {
        let raw = r#"{"lastHeartbeat":1700000000,"lastChecks":{"email":1},"streak":4}"#;
        let hb: HeartbeatState = serde_json::from_str(raw).unwrap();
        assert_eq!(hb.extra.get("streak"), Some(&Value::from(4)));
        let back = serde_json::to_value(&hb).unwrap();
        assert_eq!(back["streak"], 4);
        assert_eq!(back["lastChecks"]["email"], 1);
    }

    #[test]
    fn heartbeat_activity_uses_recorded_time() {
        let hb = HeartbeatState {
            last_heartbeat: Some(Value::from(1_700_000_000)),
            ..HeartbeatState::default()
        };
        let entry = hb.activity_entry(Utc::now());
        assert!(entry.time.starts_with("2023-11-14T22:13:20"));
        assert_eq!(entry.detail, "Routine check");
        assert_eq!(entry.kind, "heartbeat");
    }

    #[test]
    fn heartbeat_timestamp_keeps_its_json_form() {
        let hb: HeartbeatState = serde_json::from_str(r#"{"lastHeartbeat":1700000000}"#).unwrap();
        assert_eq!(serde_json::to_string(&hb.last_heartbeat).unwrap(), "1700000000");

        let hb: HeartbeatState = serde_json::from_str(r#"{"lastHeartbeat":"1700000000.5"}"#).unwrap();
        assert_eq!(
            hb.last_heartbeat_at().map(|t| t.timestamp_millis()),
            Some(1_700_000_000_500)
        );

        let hb: HeartbeatState = serde_json::from_str(r#"{"lastHeartbeat":"yesterday"}"#).unwrap();
        assert_eq!(hb.last_heartbeat_at(), None);
        assert_eq!(hb.last_heartbeat, Some(Value::from("yesterday")));
    }

    #[test]
    fn unavailable_heartbeat_carries_note() {
        let now = Utc::now();
        let entry = HeartbeatState::unavailable().activity_entry(now);
        assert_eq!(entry.time, now.to_rfc3339_opts(SecondsFormat::Millis, true));
        assert_eq!(entry.detail, HEARTBEAT_UNAVAILABLE_NOTE);
    }
}
