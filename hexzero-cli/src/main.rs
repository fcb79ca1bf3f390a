//! HEXZERO CLI - Command-line interface
//!
//! Commands:
//! - play: Human vs. computer over stdin
//! - self-play: Let the MCTS agent play itself and report the recorded games

mod human;
mod play_cmd;
mod self_play_cmd;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexzero_core::BoardConfig;

#[derive(Parser)]
#[command(name = "hexzero")]
#[command(about = "Hex connection game engine with MCTS self-play")]
struct Cli {
    /// Random seed for reproducible games
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Board configuration JSON file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the computer
    Play(play_cmd::PlayArgs),
    /// Run self-play games
    SelfPlay(self_play_cmd::SelfPlayArgs),
}

/// Board dimensions; flags override the config file
#[derive(Args, Clone, Debug, Default)]
pub struct BoardArgs {
    /// Square board side
    #[arg(long)]
    pub size: Option<usize>,

    /// Board width (columns)
    #[arg(long)]
    pub width: Option<usize>,

    /// Board height (rows)
    #[arg(long)]
    pub height: Option<usize>,
}

impl BoardArgs {
    pub fn apply(&self, mut config: BoardConfig) -> BoardConfig {
        if let Some(size) = self.size {
            config.width = size;
            config.height = size;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        config
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so boards and JSON on stdout stay clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base = load_board_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, base, cli.seed),
        Commands::SelfPlay(args) => self_play_cmd::run(args, base, cli.seed),
    }
}

/// Config file contents, or the defaults when no file is given
fn load_board_config(path: Option<&Path>) -> Result<BoardConfig> {
    match path {
        Some(path) => BoardConfig::load(path)
            .with_context(|| format!("Failed to load board config: {}", path.display())),
        None => Ok(BoardConfig::default()),
    }
}
