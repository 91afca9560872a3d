//! Cron jobs reported by the agent CLI.
//!
//! Jobs are only reported here; scheduling happens in the agent runtime.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One scheduled job as shown on the cron panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    pub id: String,
    pub name: String,
    /// Cron expression, or the schedule kind when no expression exists.
    pub schedule: String,
    /// `disabled`, `active`, `idle`, or the last run status verbatim.
    pub status: String,
    pub last_run: Option<String>,
    pub next_run: Option<String>,
    /// Last run duration, e.g. `"1520ms"`.
    pub duration: Option<String>,
    pub target: String,
    pub payload: String,
    pub description: String,
    pub history: Vec<Value>,
}

/// `GET /api/cron` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CronResponse {
    pub jobs: Vec<CronJob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
