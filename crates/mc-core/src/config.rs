//! Gateway configuration.
//!
//! Built once at startup and shared read-only (`Arc<GatewayConfig>`) by every
//! component that talks to the agent gateway.

use std::fmt;
use std::time::Duration;

/// Default base address of the agent gateway.
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:18789";

/// Upper bound on a single gateway call, streaming included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Model name sent with every chat completion.
pub const DEFAULT_GATEWAY_MODEL: &str = "openclaw";

/// `user` field sent with every chat completion.
pub const DEFAULT_GATEWAY_USER: &str = "mission-control";

/// Connection settings for the external agent gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base address, e.g. `http://127.0.0.1:18789` (no trailing path).
    pub base_url: String,
    /// Bearer token. No `Authorization` header is sent when `None`.
    pub token: Option<String>,
    /// Total deadline for one gateway call.
    pub request_timeout: Duration,
    /// Model identifier forwarded in chat payloads.
    pub model: String,
    /// Caller identity forwarded in chat payloads.
    pub user: String,
}

impl GatewayConfig {
    /// Create a config pointing at `base_url` with default timeout and identity.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Join `path` onto the base address.
    ///
    /// ```
    /// use mc_core::GatewayConfig;
    ///
    /// let cfg = GatewayConfig::new("http://127.0.0.1:18789/");
    /// assert_eq!(
    ///     cfg.endpoint("/v1/chat/completions"),
    ///     "http://127.0.0.1:18789/v1/chat/completions"
    /// );
    /// ```
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// URL of the OpenAI-compatible chat completions endpoint.
    #[must_use]
    pub fn chat_completions_url(&self) -> String {
        self.endpoint("/v1/chat/completions")
    }

    /// URL of the tool invocation endpoint.
    #[must_use]
    pub fn tools_invoke_url(&self) -> String {
        self.endpoint("/tools/invoke")
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            model: DEFAULT_GATEWAY_MODEL.to_string(),
            user: DEFAULT_GATEWAY_USER.to_string(),
        }
    }
}

// Token stays out of logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("model", &self.model)
            .field("user", &self.user)
            .finish()
    }
}
