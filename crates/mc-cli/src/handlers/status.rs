//! `status` command: one scrape of the agent CLI.

use anyhow::Result;
use mc_core::StatusProviderPort;
use mc_runtime::{CliStatusProvider, RuntimeConfig};

/// Scrape the agent status and render it as pretty JSON.
pub async fn execute(runtime: &RuntimeConfig) -> Result<String> {
    let provider = CliStatusProvider::new(runtime)?;
    let status = provider.agent_status().await;
    Ok(serde_json::to_string_pretty(&status)?)
}
