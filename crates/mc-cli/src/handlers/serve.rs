//! `serve` command.

use anyhow::Result;
use mc_axum::{ServerConfig, start_server};
use tracing::info;

pub async fn execute(config: ServerConfig) -> Result<()> {
    info!(
        addr = %config.listen_addr(),
        api_only = config.static_dir.is_none(),
        write_timeout_ms = config.write_timeout.map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
        "Starting Mission Control"
    );
    start_server(config).await
}
