//! Command-line interface for noughts.

use crate::opponent::OpponentKind;
use clap::{Parser, Subcommand};
use noughts_core::Player;
use std::path::PathBuf;

/// Noughts - tic-tac-toe against random, heuristic or LLM-advised opponents
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Play tic-tac-toe in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./noughts.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play against the computer
    Play {
        /// Computer opponent
        #[arg(long, value_enum)]
        opponent: Option<OpponentKind>,

        /// Mark you play (x or o); X moves first
        #[arg(long)]
        human: Option<Player>,

        /// Seed for the random policy
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Pit two policies against each other
    Selfplay {
        /// Policy playing X
        #[arg(long, value_enum, default_value = "heuristic")]
        x: OpponentKind,

        /// Policy playing O
        #[arg(long, value_enum, default_value = "random")]
        o: OpponentKind,

        /// Number of games
        #[arg(short, long, default_value = "100")]
        games: u32,

        /// Seed for random policies
        #[arg(long)]
        seed: Option<u64>,
    },
}
