//! memvault - hybrid memory retrieval service.
//!
//! Main entry point for the memvault CLI and server.

mod cli;
mod cmd_data;
mod register;
mod server;

use clap::Parser;
use tracing::warn;

use memvault_config::ConfigLoader;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    if let Some(Commands::Serve { host, port }) = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    let warnings = config.validate()?;
    let _guard = server::init_tracing(&config.logging)?;
    for warning in warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }

    match cli.command {
        None | Some(Commands::Serve { .. }) => server::run_server(config).await,
        Some(Commands::Stats) => {
            let engine = register::build_engine(&config).await?;
            cmd_data::run_stats(&engine).await
        }
        Some(Commands::Seed { file }) => {
            let engine = register::build_engine(&config).await?;
            cmd_data::run_seed(&engine, &file).await.map(|_| ())
        }
    }
}
