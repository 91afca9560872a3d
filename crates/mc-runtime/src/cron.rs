//! Cron job listing via `<cli> cron list --json`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use mc_core::{CronJob, CronProviderPort, ProviderError};
use serde::Deserialize;
use tracing::debug;

use crate::cli::run_bounded;
use crate::config::RuntimeConfig;

const DESCRIPTION_LIMIT: usize = 120;

#[derive(Debug, Default, Deserialize)]
struct RawCronList {
    #[serde(default)]
    jobs: Vec<RawCronJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCronJob {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    schedule: Option<RawSchedule>,
    #[serde(default)]
    state: Option<RawState>,
    #[serde(default)]
    session_target: Option<String>,
    #[serde(default)]
    payload: Option<RawPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSchedule {
    expr: Option<String>,
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawState {
    last_status: Option<String>,
    last_run_at_ms: Option<f64>,
    next_run_at_ms: Option<f64>,
    last_duration_ms: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    kind: Option<String>,
    text: Option<String>,
}

/// Treat empty strings like missing ones.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Positive millisecond timestamp to an ISO-8601 UTC string.
fn iso_millis(ms: Option<f64>) -> Option<String> {
    let ms = ms.filter(|v| v.is_finite() && *v > 0.0)?;
    #[allow(clippy::cast_possible_truncation)]
    let dt = DateTime::from_timestamp_millis(ms as i64)?;
    Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl From<RawCronJob> for CronJob {
    fn from(raw: RawCronJob) -> Self {
        let state = raw.state.unwrap_or_default();
        let schedule = raw.schedule.unwrap_or_default();
        let payload = raw.payload.unwrap_or_default();

        let status = if raw.enabled {
            match non_empty(state.last_status.as_deref()) {
                Some("ok") => "active".to_string(),
                Some(other) => other.to_string(),
                None => "idle".to_string(),
            }
        } else {
            "disabled".to_string()
        };

        let name = non_empty(raw.name.as_deref())
            .map_or_else(|| raw.id.chars().take(8).collect(), str::to_string);

        Self {
            name,
            schedule: non_empty(schedule.expr.as_deref())
                .or_else(|| non_empty(schedule.kind.as_deref()))
                .unwrap_or("?")
                .to_string(),
            status,
            last_run: iso_millis(state.last_run_at_ms),
            next_run: iso_millis(state.next_run_at_ms),
            duration: state
                .last_duration_ms
                .filter(|ms| ms.abs() > f64::EPSILON)
                .map(|ms| format!("{ms}ms")),
            target: non_empty(raw.session_target.as_deref())
                .unwrap_or("main")
                .to_string(),
            payload: non_empty(payload.kind.as_deref()).unwrap_or("?").to_string(),
            description: payload
                .text
                .map(|t| t.chars().take(DESCRIPTION_LIMIT).collect())
                .unwrap_or_default(),
            history: Vec::new(),
            id: raw.id,
        }
    }
}

/// Map the CLI's JSON job list to dashboard jobs.
///
/// # Errors
///
/// `Parse` if `text` is not a JSON job list.
pub fn parse_cron_list(text: &str) -> Result<Vec<CronJob>, ProviderError> {
    let list: RawCronList =
        serde_json::from_str(text).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(list.jobs.into_iter().map(CronJob::from).collect())
}

/// Cron provider backed by the agent CLI.
#[derive(Debug, Clone)]
pub struct CliCronProvider {
    binary: PathBuf,
    timeout: Duration,
}

impl CliCronProvider {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            binary: config.cli_binary.clone(),
            timeout: config.cron_timeout,
        }
    }
}

#[async_trait]
impl CronProviderPort for CliCronProvider {
    async fn list_jobs(&self) -> Result<Vec<CronJob>, ProviderError> {
        let out = run_bounded(&self.binary, ["cron", "list", "--json"], self.timeout).await?;
        if !out.success {
            let detail = out.combined();
            return Err(ProviderError::CommandFailed(format!(
                "cron list exited with {}: {}",
                out.code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                detail.trim()
            )));
        }
        let jobs = parse_cron_list(&out.stdout)?;
        debug!(count = jobs.len(), "Listed cron jobs");
        Ok(jobs)
    }
}
