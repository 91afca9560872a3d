//! Gateway sessions port.

use async_trait::async_trait;

use super::ProviderError;
use crate::domain::SessionSummary;

/// Lists live sessions from the agent gateway.
#[async_trait]
pub trait SessionsPort: Send + Sync {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ProviderError>;
}
