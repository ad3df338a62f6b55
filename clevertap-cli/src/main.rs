mod api;
mod cli;
mod config;
mod workflow;

use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;

use cli::commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Connection(args) => {
            cli::commands::connection::handle_connection_command(args).await
        }
        Commands::Sync(args) => cli::commands::sync::handle_sync_command(args).await,
    }
}
