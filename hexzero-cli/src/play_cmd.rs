//! Play command - a human against the computer
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_opponent(), report_winner()
//! - Level 4: configuration

use std::io;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use hexzero_core::{Agent, Board, BoardConfig, Game, Player};
use hexzero_mcts::{MctsAgent, MctsConfig, RandomAgent};

use crate::human::HumanAgent;
use crate::BoardArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Let the computer open the game
    #[arg(long, conflicts_with = "human_first")]
    pub ai_first: bool,

    /// Open the game yourself (default)
    #[arg(long)]
    pub human_first: bool,

    /// Computer opponent
    #[arg(long, value_enum, default_value = "mcts")]
    pub opponent: Opponent,

    /// MCTS playouts per move
    #[arg(long, default_value = "400")]
    pub playouts: usize,

    /// Do not print the board after each move
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Opponent {
    Mcts,
    Random,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// The human is always player one (X, top to bottom); `--ai-first` lets the
/// computer place the first stone.
pub fn run(args: PlayArgs, base: BoardConfig, seed: Option<u64>) -> Result<()> {
    let config = args.board.apply(base);
    let board = Board::from_config(&config).context("Invalid board configuration")?;
    let start_player = usize::from(args.ai_first && !args.human_first);

    let mut human = HumanAgent::new(io::stdin().lock(), io::stdout());
    let mut opponent = build_opponent(&args, seed);

    tracing::info!(
        "Starting {}x{} game against {} ({} opens); enter moves as row,col",
        config.width,
        config.height,
        opponent.name(),
        if args.ai_first { "computer" } else { "human" }
    );

    let mut game = Game::new(board);
    let winner = game
        .play(&mut human, opponent.as_mut(), start_player, !args.quiet)
        .context("Game aborted")?;

    report_winner(winner);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_opponent(args: &PlayArgs, seed: Option<u64>) -> Box<dyn Agent> {
    match args.opponent {
        Opponent::Mcts => Box::new(MctsAgent::new(
            MctsConfig::default()
                .with_playouts(args.playouts)
                .with_seed(seed),
        )),
        Opponent::Random => Box::new(RandomAgent::new(seed)),
    }
}

fn report_winner(winner: Option<Player>) {
    match winner {
        Some(Player::One) => println!("You win!"),
        Some(Player::Two) => println!("The computer wins."),
        None => println!("Tie."),
    }
}
