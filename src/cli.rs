//! CLI definitions for memvault.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// memvault CLI.
#[derive(Parser)]
#[command(name = "memvault")]
#[command(about = "Hybrid memory retrieval service")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path. Defaults apply when omitted.
    #[arg(short, long, env = "MEMVAULT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub(crate) enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print aggregate statistics as JSON
    Stats,

    /// Load memories from a JSON array file
    Seed {
        /// Path to a JSON array of memories
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["memvault"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["memvault", "serve", "--port", "9000"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                host: None,
                port: Some(9000)
            })
        );
    }

    #[test]
    fn test_seed_with_global_config() {
        let cli =
            Cli::try_parse_from(["memvault", "seed", "data.json", "--config", "memvault.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("memvault.toml")));
        assert_eq!(
            cli.command,
            Some(Commands::Seed {
                file: PathBuf::from("data.json")
            })
        );
    }
}
