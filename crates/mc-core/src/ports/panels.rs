//! Panel data port.

use async_trait::async_trait;

use crate::domain::{AgentRoster, CostReport, ScoutReport, StatusExtras, TaskBoard};

/// Source of the read-only panel documents.
///
/// Each method returns the empty document of its schema when no data exists.
#[async_trait]
pub trait PanelSourcePort: Send + Sync {
    async fn tasks(&self) -> TaskBoard;
    async fn costs(&self) -> CostReport;
    async fn scout(&self) -> ScoutReport;
    async fn agents(&self) -> AgentRoster;
    async fn status_extras(&self) -> StatusExtras;
}
