//! Status provider port.
//!
//! The agent's summary comes from scraping human-readable CLI output. This
//! port keeps that fragility in one adapter: callers get an `AgentStatus`
//! and never see text parsing or its failures.

use async_trait::async_trait;

use crate::domain::AgentStatus;

/// Source of the agent summary shown on the dashboard.
///
/// Implementations must not fail: missing or malformed data degrades to
/// [`AgentStatus::fallback`] field by field.
#[async_trait]
pub trait StatusProviderPort: Send + Sync {
    async fn agent_status(&self) -> AgentStatus;
}

/// Provider returning a fixed status, for tests and offline demos.
#[derive(Debug, Clone)]
pub struct FixedStatusProvider {
    status: AgentStatus,
}

impl FixedStatusProvider {
    #[must_use]
    pub const fn new(status: AgentStatus) -> Self {
        Self { status }
    }
}

#[async_trait]
impl StatusProviderPort for FixedStatusProvider {
    async fn agent_status(&self) -> AgentStatus {
        self.status.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn fixed_provider_returns_fixture() {
        let mut status = AgentStatus::fallback("Scout");
        status.active_sessions = 3;
        let provider: Arc<dyn StatusProviderPort> = Arc::new(FixedStatusProvider::new(status));

        let got = provider.agent_status().await;
        assert_eq!(got.name, "Scout");
        assert_eq!(got.active_sessions, 3);
    }
}
