//! Mission Control command-line interface.
//!
//! Parses arguments (with `MC_*` environment fallbacks) into the server and
//! adapter configurations and dispatches to handlers.

#![deny(unsafe_code)]

pub mod commands;
pub mod config;
pub mod handlers;
pub mod logging;
pub mod parser;

pub use commands::Commands;
pub use config::{GatewayArgs, RuntimeArgs, ServeArgs};
pub use parser::Cli;
