//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define what the dashboard expects from the agent CLI, the gateway
//! and the filesystem. Implementations live in `mc-runtime`.
//!
//! # Design Rules
//!
//! - Only domain types in signatures
//! - Best-effort ports (status, heartbeat, panels) are infallible and return
//!   defaults; the rest return `ProviderError` so the handler can report it

pub mod cron;
pub mod heartbeat;
pub mod panels;
pub mod sessions;
pub mod status;

use thiserror::Error;

pub use cron::CronProviderPort;
pub use heartbeat::HeartbeatPort;
pub use panels::PanelSourcePort;
pub use sessions::SessionsPort;
pub use status::{FixedStatusProvider, StatusProviderPort};

/// Errors surfaced by collaborator ports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The external command could not be spawned or exited abnormally.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// The external command did not finish in time.
    #[error("Command `{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    /// Output was produced but could not be understood.
    #[error("Unparseable output: {0}")]
    Parse(String),

    /// A remote collaborator could not be reached.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}
