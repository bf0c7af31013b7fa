//! Noughts - play tic-tac-toe in the terminal.

use anyhow::Result;
use clap::Parser;
use noughts::cli::{Cli, Command};
use noughts::{AppConfig, play, selfplay};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not interleave with the board.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Play {
            opponent,
            human,
            seed,
        } => run_play(config.with_overrides(opponent, human, seed)).await,
        Command::Selfplay { x, o, games, seed } => {
            let stats = selfplay(&config, x, o, games, seed).await?;
            println!("{}", stats);
            Ok(())
        }
    }
}

/// Run the interactive game
#[instrument(skip(config))]
async fn run_play(config: AppConfig) -> Result<()> {
    info!(opponent = %config.opponent(), "Starting interactive game");
    play(&config).await
}
