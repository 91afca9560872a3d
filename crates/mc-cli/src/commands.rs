//! Subcommands.

use clap::Subcommand;

use crate::config::ServeArgs;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the dashboard web server
    Serve(ServeArgs),

    /// Print the agent status scraped from the CLI as JSON
    Status,
}
