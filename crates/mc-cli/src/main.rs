//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};

use mc_cli::{Cli, Commands, handlers, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve(args) => {
            let config = args.to_config(&cli.gateway, &cli.runtime);
            handlers::serve::execute(config).await?;
        }
        Commands::Status => {
            let json = handlers::status::execute(&cli.runtime.to_config()).await?;
            println!("{json}");
        }
    }
    Ok(())
}
