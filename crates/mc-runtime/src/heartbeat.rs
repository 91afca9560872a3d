//! Heartbeat state file reader.

use std::path::PathBuf;

use async_trait::async_trait;
use mc_core::{HeartbeatPort, HeartbeatState};
use tracing::debug;

/// Reads the JSON heartbeat document the agent writes after each check.
#[derive(Debug, Clone)]
pub struct FileHeartbeat {
    path: PathBuf,
}

impl FileHeartbeat {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HeartbeatPort for FileHeartbeat {
    async fn heartbeat(&self) -> HeartbeatState {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Heartbeat state unreadable");
                return HeartbeatState::unavailable();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            debug!(path = %self.path.display(), error = %e, "Heartbeat state is not valid JSON");
            HeartbeatState::unavailable()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_state_and_keeps_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"lastHeartbeat":1700000000,"lastChecks":{{"email":1699999000}},"streak":4}}"#
        )
        .unwrap();

        let state = FileHeartbeat::new(file.path()).heartbeat().await;
        assert_eq!(state.last_heartbeat, Some(serde_json::Value::from(1_700_000_000)));
        assert_eq!(state.last_checks["email"], 1_699_999_000);
        assert_eq!(state.extra["streak"], 4);
        assert!(state.note.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let state = FileHeartbeat::new(dir.path().join("nope.json")).heartbeat().await;
        assert_eq!(state, HeartbeatState::unavailable());
    }

    #[tokio::test]
    async fn corrupt_file_is_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let state = FileHeartbeat::new(file.path()).heartbeat().await;
        assert_eq!(state.note.as_deref(), Some(mc_core::domain::status::HEARTBEAT_UNAVAILABLE_NOTE));
    }
}
