//! Command-line interface for tictactoe_webapp.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Tic-tac-toe client - browse, play and inspect the online game service
#[derive(Parser, Debug)]
#[command(name = "tictactoe_webapp")]
#[command(about = "Client for the online tic-tac-toe service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct Common {
    /// Path to the client configuration file
    #[arg(short, long, default_value = "tictactoe.toml")]
    pub config: PathBuf,

    /// Game server URL, overrides the configuration file
    #[arg(long)]
    pub server_url: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the terminal browser
    Browse {
        #[command(flatten)]
        common: Common,

        /// Location to open first
        #[arg(long)]
        start_url: Option<String>,
    },

    /// Render one location and print the resulting page
    Show {
        #[command(flatten)]
        common: Common,

        /// Location to render, e.g. /games/7
        url: String,
    },

    /// Print which state a location resolves to, without contacting the server
    Resolve {
        #[command(flatten)]
        common: Common,

        /// Location to resolve
        url: String,
    },

    /// Print the build identifier of the deployed server
    Version {
        #[command(flatten)]
        common: Common,
    },
}
