//! Error types for the game engine

use std::time::Duration;

use crate::board::Player;

/// Errors raised by the board, the encoder and the orchestrator
#[derive(Debug, thiserror::Error)]
pub enum HexError {
    /// Start player selector outside {0, 1}
    #[error("start player must be 0 (player one first) or 1 (player two first), got {0}")]
    InvalidStartPlayer(usize),

    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Move index is not among the available moves
    #[error("illegal move: {0}")]
    IllegalMove(usize),

    /// The history window and the occupancy map disagree
    #[error("broken state invariant at plane {plane}, cell ({row}, {col}): expected 1.0, found {value}")]
    BrokenInvariant {
        plane: usize,
        row: usize,
        col: usize,
        value: f32,
    },

    #[error("agent for player {player} took {elapsed:?} to move")]
    StalledAgent { player: Player, elapsed: Duration },

    /// An agent could not produce a move
    #[error("agent failed: {0}")]
    Agent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HexError>;
