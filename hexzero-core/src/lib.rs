//! HEXZERO Core - Hex game engine
//!
//! This crate provides the game engine for Hex on a configurable board:
//! - Board bookkeeping and coordinate mapping
//! - Edge-to-edge win detection (search and incremental union-find)
//! - Multi-plane state encoding with an 8-move history
//! - The agent capability and the game orchestrator, including self-play

pub mod agent;
pub mod board;
pub mod config;
pub mod connectivity;
pub mod encoder;
pub mod error;
pub mod game;
mod render;

// Re-exports for convenient access
pub use agent::{Agent, DEFAULT_TEMPERATURE};
pub use board::{Board, HistoryWindow, Player, HEX_NEIGHBORS, HISTORY_LEN};
pub use config::{BoardConfig, WinCheck, DEFAULT_SIZE};
pub use connectivity::{is_connected, BoundaryTracker, UnionFind};
pub use encoder::{StateTensor, STATE_PLANES};
pub use error::{HexError, Result};
pub use game::{Game, SelfPlayRecord, TrainingSample};
