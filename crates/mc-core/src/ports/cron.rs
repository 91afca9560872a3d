//! Cron listing port.

use async_trait::async_trait;

use super::ProviderError;
use crate::domain::CronJob;

/// Lists the jobs scheduled in the agent runtime.
#[async_trait]
pub trait CronProviderPort: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<CronJob>, ProviderError>;
}
