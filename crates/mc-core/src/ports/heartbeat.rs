//! Heartbeat state port.

use async_trait::async_trait;

use crate::domain::HeartbeatState;

/// Reads the agent's heartbeat bookkeeping.
///
/// Returns [`HeartbeatState::unavailable`] when nothing can be read.
#[async_trait]
pub trait HeartbeatPort: Send + Sync {
    async fn heartbeat(&self) -> HeartbeatState;
}
