//! Argument groups and their mapping onto adapter configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use mc_axum::{CorsConfig, DEFAULT_PORT, ServerConfig};
use mc_core::{
    DEFAULT_GATEWAY_MODEL, DEFAULT_GATEWAY_URL, DEFAULT_GATEWAY_USER, GatewayConfig,
};
use mc_runtime::RuntimeConfig;
use mc_runtime::config::{
    DEFAULT_AGENT_NAME, DEFAULT_CLI_BINARY, DEFAULT_HEARTBEAT_PATH, DEFAULT_PANEL_DIR,
};

/// Agent gateway connection.
#[derive(Debug, Clone, Args)]
pub struct GatewayArgs {
    /// Base address of the agent gateway
    #[arg(long, env = "MC_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL, global = true)]
    pub gateway_url: String,

    /// Bearer token for the gateway; no Authorization header when unset
    #[arg(long, env = "MC_GATEWAY_TOKEN", hide_env_values = true, global = true)]
    pub gateway_token: Option<String>,

    /// Total deadline for one gateway call, in seconds
    #[arg(
        long,
        env = "MC_REQUEST_TIMEOUT_SECS",
        default_value_t = 120,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub request_timeout_secs: u64,

    /// Model name sent with chat completions
    #[arg(long, env = "MC_GATEWAY_MODEL", default_value = DEFAULT_GATEWAY_MODEL, global = true)]
    pub gateway_model: String,

    /// `user` field sent with chat completions
    #[arg(long, env = "MC_GATEWAY_USER", default_value = DEFAULT_GATEWAY_USER, global = true)]
    pub gateway_user: String,
}

impl GatewayArgs {
    pub fn to_config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::new(self.gateway_url.clone())
            .with_timeout(Duration::from_secs(self.request_timeout_secs));
        if let Some(token) = &self.gateway_token {
            config = config.with_token(token.clone());
        }
        config.model.clone_from(&self.gateway_model);
        config.user.clone_from(&self.gateway_user);
        config
    }
}

/// Agent CLI and local state files.
#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    /// Agent CLI used for status and cron listings
    #[arg(long, env = "MC_CLI_BINARY", default_value = DEFAULT_CLI_BINARY, global = true)]
    pub cli_binary: PathBuf,

    /// Agent display name on the status panel
    #[arg(long, env = "MC_AGENT_NAME", default_value = DEFAULT_AGENT_NAME, global = true)]
    pub agent_name: String,

    /// Heartbeat state file written by the agent
    #[arg(long, env = "MC_HEARTBEAT_PATH", default_value = DEFAULT_HEARTBEAT_PATH, global = true)]
    pub heartbeat_path: PathBuf,

    /// Directory holding the panel fixture documents
    #[arg(long, env = "MC_PANEL_DIR", default_value = DEFAULT_PANEL_DIR, global = true)]
    pub panel_dir: PathBuf,
}

impl RuntimeArgs {
    pub fn to_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            cli_binary: self.cli_binary.clone(),
            agent_name: self.agent_name.clone(),
            heartbeat_path: self.heartbeat_path.clone(),
            panel_dir: self.panel_dir.clone(),
            ..RuntimeConfig::default()
        }
    }
}

/// `serve` options.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "MC_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to serve the dashboard on
    #[arg(short, long, env = "MC_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory containing the built frontend
    #[arg(long, env = "MC_STATIC_DIR", default_value = "frontend/dist")]
    pub static_dir: PathBuf,

    /// Directory served under /public
    #[arg(long, env = "MC_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Serve API endpoints only (do not serve static UI assets)
    #[arg(long)]
    pub api_only: bool,

    /// Allowed CORS origins; all origins when none are given
    #[arg(long = "allowed-origin", env = "MC_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Abort a chat relay when the client accepts no chunk for this long
    #[arg(long, env = "MC_WRITE_TIMEOUT_SECS")]
    pub write_timeout_secs: Option<u64>,
}

impl ServeArgs {
    /// Assemble the full server configuration.
    pub fn to_config(&self, gateway: &GatewayArgs, runtime: &RuntimeArgs) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            static_dir: (!self.api_only).then(|| self.static_dir.clone()),
            public_dir: (!self.api_only).then(|| self.public_dir.clone()),
            cors: if self.allowed_origins.is_empty() {
                CorsConfig::AllowAll
            } else {
                CorsConfig::AllowOrigins(self.allowed_origins.clone())
            },
            write_timeout: self
                .write_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            gateway: gateway.to_config(),
            runtime: runtime.to_config(),
        }
    }
}
