//! Axum web adapter for Mission Control.
//!
//! Serves the dashboard API, relays chat to the gateway through
//! [`mc_relay::RelaySupervisor`], and serves the built frontend.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod downstream;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, DEFAULT_PORT, ServerConfig, bootstrap, start_server};
pub use downstream::{ChannelWriter, PendingResponse, ResponseHead, channel_writer};
pub use error::HttpError;
pub use routes::{create_app, create_router, create_spa_router};
pub use state::AppState;
