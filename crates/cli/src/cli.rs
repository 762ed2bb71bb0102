use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Performance analysis and narrated insights for a player's recent matches.
#[derive(Parser, Debug)]
#[command(name = "scope", about = "Player performance analysis from match telemetry")]
pub struct CliArgs {
    /// Config profile (overrides SCOPE_PROFILE)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Read match history from a JSON file instead of the match source URL
    #[arg(long, global = true)]
    pub matches: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score all eight axes and narrate each one
    Faultlines {
        player: String,
    },
    /// Deep-dive insight on a single axis, battle-history, playstyle or free-form topic
    Topic {
        player: String,
        topic: String,
    },
    /// Ask a question, optionally grounded in a player's profile
    Chat {
        message: String,

        /// Player whose profile should ground the answer
        #[arg(long)]
        player: Option<String>,

        /// JSON file with earlier turns: [{"role": "user", "content": "..."}]
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Show the resolved configuration without secrets
    Config,
}
