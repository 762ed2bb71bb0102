mod cli;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use scope_core::config::load_dotenv;
use scope_core::Config;

use crate::cli::{CliArgs, Command};

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let config = match &args.profile {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };

    if let Command::Config = args.command {
        return print_json(&config.redacted_summary(), args.pretty);
    }
    config.log_summary();

    let source = pipeline::match_source(args.matches.as_deref(), &config.source)?;
    let orchestrator = pipeline::build_orchestrator(&config, source)?;

    match args.command {
        Command::Faultlines { player } => {
            let report = orchestrator.faultlines(&player).await;
            info!(player = %player, status = %report.status, "report ready");
            print_json(&report, args.pretty)
        }
        Command::Topic { player, topic } => {
            let insight = orchestrator.topic_insight(&player, &topic).await;
            print_json(&insight, args.pretty)
        }
        Command::Chat {
            message,
            player,
            history,
        } => {
            let messages = pipeline::load_conversation(history.as_deref(), &message)?;
            let reply = orchestrator
                .chat(&messages, player.as_deref())
                .await
                .context("chat request rejected")?;
            print_json(&reply, args.pretty)
        }
        Command::Config => Ok(()),
    }
}
