//! Shared application state type.

use crate::bootstrap::AxumContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// An Arc-wrapped `AxumContext` holding the gateway config, the relay
/// supervisor and the dashboard providers.
pub type AppState = Arc<AxumContext>;
