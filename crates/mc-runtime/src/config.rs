//! Runtime adapter configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default agent CLI binary.
pub const DEFAULT_CLI_BINARY: &str = "openclaw";

/// Default display name of the agent.
pub const DEFAULT_AGENT_NAME: &str = "Zinbot";

/// Default heartbeat state file written by the agent.
pub const DEFAULT_HEARTBEAT_PATH: &str = "/home/ubuntu/clawd/memory/heartbeat-state.json";

/// Default directory holding panel fixture documents.
pub const DEFAULT_PANEL_DIR: &str = "data";

pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_CRON_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the CLI, heartbeat and fixture adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Agent CLI binary, resolved through `PATH` when not absolute.
    pub cli_binary: PathBuf,
    pub agent_name: String,
    /// Limit for `<cli> status`.
    pub status_timeout: Duration,
    /// Limit for `<cli> cron list --json`.
    pub cron_timeout: Duration,
    pub heartbeat_path: PathBuf,
    pub panel_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cli_binary: PathBuf::from(DEFAULT_CLI_BINARY),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            status_timeout: DEFAULT_STATUS_TIMEOUT,
            cron_timeout: DEFAULT_CRON_TIMEOUT,
            heartbeat_path: PathBuf::from(DEFAULT_HEARTBEAT_PATH),
            panel_dir: PathBuf::from(DEFAULT_PANEL_DIR),
        }
    }
}
