//! Self-play command - the MCTS agent plays both sides
//!
//! Records are summarised, not written to disk.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: summarize_game(), compute_statistics()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use hexzero_core::{Board, BoardConfig, Game, Player, SelfPlayRecord};
use hexzero_mcts::{MctsAgent, MctsConfig};

use crate::BoardArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SelfPlayArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Number of games to play
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// MCTS playouts per move
    #[arg(long, default_value = "400")]
    pub playouts: usize,

    /// Temperature applied to the visit counts
    #[arg(long, default_value = "1.0")]
    pub temperature: f32,

    /// Print the board after each move
    #[arg(long)]
    pub show: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Summary of one self-play game
#[derive(Clone, Debug, Serialize)]
struct GameSummary {
    game_number: usize,
    /// Player id, `None` for a tie
    winner: Option<u8>,
    moves: usize,
    samples: usize,
}

/// Aggregated self-play results
#[derive(Clone, Debug, Serialize)]
struct SelfPlayResults {
    total_games: usize,
    player_one_wins: usize,
    player_two_wins: usize,
    ties: usize,
    total_samples: usize,
    avg_moves: f32,
    games: Vec<GameSummary>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run self-play command
///
/// 1. Build the board and agent
/// 2. Play the games
/// 3. Report results
pub fn run(args: SelfPlayArgs, base: BoardConfig, seed: Option<u64>) -> Result<()> {
    let config = args.board.apply(base);
    let board = Board::from_config(&config).context("Invalid board configuration")?;

    tracing::info!(
        "Starting self-play: {} games on {}x{}, {} playouts, temperature {}",
        args.games,
        config.width,
        config.height,
        args.playouts,
        args.temperature
    );

    let mut agent = MctsAgent::new(
        MctsConfig::default()
            .with_playouts(args.playouts)
            .with_seed(seed),
    );
    let results = play_games(Game::new(board), &mut agent, &args)?;

    report_results(&results, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_games(mut game: Game, agent: &mut MctsAgent, args: &SelfPlayArgs) -> Result<SelfPlayResults> {
    let progress = ProgressBar::new(args.games as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} games {msg}")?.progress_chars("=> "),
    );

    let mut games = Vec::with_capacity(args.games);
    for game_number in 1..=args.games {
        let record = game
            .self_play(agent, args.temperature, args.show)
            .with_context(|| format!("Self-play game {} failed", game_number))?;

        let summary = summarize_game(game_number, &record);
        tracing::info!(
            "Game {}: winner {:?}, {} moves",
            summary.game_number,
            record.winner,
            summary.moves
        );
        progress.set_message(format!("last winner: {}", format_winner(record.winner)));
        progress.inc(1);
        games.push(summary);
    }
    progress.finish_and_clear();

    Ok(compute_statistics(games))
}

fn report_results(results: &SelfPlayResults, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print_text_results(results);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn summarize_game(game_number: usize, record: &SelfPlayRecord) -> GameSummary {
    GameSummary {
        game_number,
        winner: record.winner.map(Player::id),
        // One sample per move
        moves: record.samples.len(),
        samples: record.samples.len(),
    }
}

fn compute_statistics(games: Vec<GameSummary>) -> SelfPlayResults {
    let wins_for = |player: Player| games.iter().filter(|g| g.winner == Some(player.id())).count();
    let player_one_wins = wins_for(Player::One);
    let player_two_wins = wins_for(Player::Two);
    let ties = games.iter().filter(|g| g.winner.is_none()).count();

    let total_moves: usize = games.iter().map(|g| g.moves).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    SelfPlayResults {
        total_games: games.len(),
        player_one_wins,
        player_two_wins,
        ties,
        total_samples: games.iter().map(|g| g.samples).sum(),
        avg_moves,
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn format_winner(winner: Option<Player>) -> String {
    match winner {
        Some(player) => format!("player {}", player),
        None => "tie".to_string(),
    }
}

fn print_text_results(results: &SelfPlayResults) {
    println!("\n=== Self-Play Results ===");
    println!("Total games:     {}", results.total_games);
    println!("Player 1 wins:   {}", results.player_one_wins);
    println!("Player 2 wins:   {}", results.player_two_wins);
    println!("Ties:            {}", results.ties);
    println!("Average moves:   {:.1}", results.avg_moves);
    println!("Samples:         {}", results.total_samples);

    println!("\nGames:");
    for game in &results.games {
        let winner = match game.winner {
            Some(id) => format!("player {}", id),
            None => "tie".to_string(),
        };
        println!("  #{:<3} {:<10} {} moves", game.game_number, winner, game.moves);
    }
}
