//! HTTP request handlers for the Axum web server.
//!
//! Chat is relayed to the gateway; every other handler reads one provider
//! and degrades to a default document instead of failing.

pub mod chat;
pub mod cron;
pub mod panels;
pub mod sessions;
pub mod status;
