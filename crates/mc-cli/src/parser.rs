//! Root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;
use crate::config::{GatewayArgs, RuntimeArgs};

/// Dashboard server and chat relay for an agent gateway.
#[derive(Debug, Parser)]
#[command(name = "mission-control")]
#[command(about = "Serve the Mission Control dashboard and relay chat to the agent gateway")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub gateway: GatewayArgs,

    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
