//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where concrete adapters are wired together.
//! Handlers only see the ports held by [`AxumContext`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use mc_core::ports::{
    CronProviderPort, HeartbeatPort, PanelSourcePort, SessionsPort, StatusProviderPort,
};
use mc_core::{ChatRequest, GatewayConfig};
use mc_relay::{RelaySupervisor, UpstreamClient, UpstreamConnector};
use mc_runtime::{
    CliCronProvider, CliStatusProvider, FileHeartbeat, FilePanelSource, GatewaySessions,
    RuntimeConfig,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3333;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// Built dashboard assets, served with SPA fallback.
    pub static_dir: Option<PathBuf>,
    /// Extra files served under `/public`.
    pub public_dir: Option<PathBuf>,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Per-chunk limit on downstream writes; unset waits for the client.
    pub write_timeout: Option<Duration>,
    /// Gateway endpoint and identity.
    pub gateway: GatewayConfig,
    /// Agent CLI and local state files.
    pub runtime: RuntimeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            static_dir: Some(PathBuf::from("frontend/dist")),
            public_dir: Some(PathBuf::from("public")),
            cors: CorsConfig::default(),
            write_timeout: None,
            gateway: GatewayConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Set the static directory for SPA serving.
    #[must_use]
    pub fn with_static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    /// `host:port` to bind.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// Gateway endpoint, token and chat identity.
    pub gateway: Arc<GatewayConfig>,
    /// Runs one relay task per chat request.
    pub relay: RelaySupervisor,
    /// Downstream write limit applied to chat responses.
    pub write_timeout: Option<Duration>,
    pub status: Arc<dyn StatusProviderPort>,
    pub heartbeat: Arc<dyn HeartbeatPort>,
    pub cron: Arc<dyn CronProviderPort>,
    pub sessions: Arc<dyn SessionsPort>,
    pub panels: Arc<dyn PanelSourcePort>,
}

/// Wire the production adapters.
///
/// One `reqwest` pool backs both the chat relay and the sessions client.
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let gateway = Arc::new(config.gateway.clone());
    let runtime = &config.runtime;

    info!(
        target: "mc.config",
        gateway = %gateway.base_url,
        gateway_token = gateway.token.is_some(),
        request_timeout_ms = u64::try_from(gateway.request_timeout.as_millis()).unwrap_or(u64::MAX),
        cli = %runtime.cli_binary.display(),
        heartbeat = %runtime.heartbeat_path.display(),
        panels = %runtime.panel_dir.display(),
        "Axum bootstrap resolved configuration"
    );

    check_gateway(&gateway)?;

    let connector: Arc<dyn UpstreamConnector> = Arc::new(UpstreamClient::with_defaults()?);

    Ok(AxumContext {
        relay: RelaySupervisor::new(Arc::clone(&connector)),
        write_timeout: config.write_timeout,
        status: Arc::new(CliStatusProvider::new(runtime)?),
        heartbeat: Arc::new(FileHeartbeat::new(runtime.heartbeat_path.clone())),
        cron: Arc::new(CliCronProvider::new(runtime)),
        sessions: Arc::new(GatewaySessions::new(connector, Arc::clone(&gateway))),
        panels: Arc::new(FilePanelSource::new(runtime.panel_dir.clone())),
        gateway,
    })
}

/// Reject gateway settings no chat request could be built from.
fn check_gateway(gateway: &GatewayConfig) -> Result<()> {
    let probe = ChatRequest {
        messages: Vec::new(),
        stream: true,
    };
    crate::handlers::chat::gateway_request(gateway, &probe)
        .with_context(|| format!("Invalid gateway configuration (url `{}`)", gateway.base_url))?;
    Ok(())
}

/// Start the web server and run until Ctrl-C.
///
/// On shutdown, in-flight relays are cancelled so streaming responses end
/// and the server can drain.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config)?;
    let relay = ctx.relay.clone();

    if let Some(dir) = &config.static_dir {
        info!("Serving static assets from: {}", dir.display());
    }
    let app = crate::routes::create_app(ctx, &config).layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Mission Control listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(relay))
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(relay: RelaySupervisor) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; shutting down");
    }
    info!("Shutdown requested; cancelling active relays");
    relay.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_dashboard_layout() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr(), "0.0.0.0:3333");
        assert_eq!(config.static_dir.as_deref(), Some(std::path::Path::new("frontend/dist")));
        assert!(config.write_timeout.is_none());
        assert!(matches!(config.cors, CorsConfig::AllowAll));
    }

    #[tokio::test]
    async fn bootstrap_wires_without_io() {
        let config = ServerConfig::default()
            .with_allowed_origins(vec!["http://localhost:5173".into()]);
        let ctx = bootstrap(&config).unwrap();
        assert_eq!(ctx.gateway.base_url, mc_core::DEFAULT_GATEWAY_URL);
        assert!(ctx.write_timeout.is_none());
    }

    #[test]
    fn zero_request_timeout_fails_startup() {
        let mut config = ServerConfig::default();
        config.gateway = config.gateway.with_timeout(Duration::ZERO);
        let err = bootstrap(&config).err().expect("zero timeout must be rejected");
        let chain = format!("{err:#}");
        assert!(chain.contains("Invalid gateway configuration"));
        assert!(chain.contains("timeout must be positive"));
    }

    #[test]
    fn unusable_gateway_url_fails_startup() {
        for url in ["not a url", "ftp://gateway.test"] {
            let config = ServerConfig {
                gateway: GatewayConfig::new(url),
                ..ServerConfig::default()
            };
            let err = bootstrap(&config).err().expect("bad gateway url must be rejected");
            assert!(format!("{err:#}").contains(url), "{url}: {err:#}");
        }
    }
}
