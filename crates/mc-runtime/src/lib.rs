//! OS-level adapters for Mission Control.
//!
//! Implements the `mc-core` ports against the outside world: the agent CLI
//! (status and cron), the heartbeat file, the gateway's tool endpoint and
//! the panel fixture directory.

#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod cron;
pub mod heartbeat;
pub mod panels;
pub mod sessions;
pub mod status;

#[cfg(all(test, unix))]
mod testing;

pub use cli::{CommandOutput, capture_bounded, run_bounded};
pub use config::RuntimeConfig;
pub use cron::{CliCronProvider, parse_cron_list};
pub use heartbeat::FileHeartbeat;
pub use panels::FilePanelSource;
pub use sessions::{GatewaySessions, parse_sessions};
pub use status::{CliStatusProvider, StatusPatterns};
