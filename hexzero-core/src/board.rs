//! Board state, move bookkeeping and win detection
//!
//! Cells are addressed by a flat move index `row * width + col`. The grid is a
//! sheared rhombus: each cell touches the six neighbours listed in
//! [`HEX_NEIGHBORS`]. Player one links the top and bottom rows, player two
//! links the left and right columns.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::{BoardConfig, WinCheck};
use crate::connectivity::{is_connected, BoundaryTracker};
use crate::encoder::{encode_state, StateTensor};
use crate::error::{HexError, Result};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of past moves kept for the state encoding
pub const HISTORY_LEN: usize = 8;

/// Neighbour offsets as (d_row, d_col)
pub const HEX_NEIGHBORS: [(isize, isize); 6] = [
    (-1, 0), // up
    (-1, 1), // up-right
    (0, 1),  // right
    (1, 0),  // down
    (1, -1), // down-left
    (0, -1), // left
];

// ============================================================================
// PLAYER
// ============================================================================

/// Player identity. Discriminants match the conventional ids 1 and 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Connects top and bottom rows
    One = 1,
    /// Connects left and right columns
    Two = 2,
}

impl Player {
    /// Both players, in seating order
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

// ============================================================================
// HISTORY WINDOW
// ============================================================================

/// Most-recent-first window of the last [`HISTORY_LEN`] moves.
///
/// Always holds exactly `HISTORY_LEN` slots; `None` marks a slot that no move
/// has reached yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryWindow {
    entries: VecDeque<Option<(usize, Player)>>,
}

#[allow(clippy::len_without_is_empty)]
impl HistoryWindow {
    pub fn new() -> Self {
        Self {
            entries: std::iter::repeat(None).take(HISTORY_LEN).collect(),
        }
    }

    /// Push a move to the front, dropping the oldest slot
    pub fn push(&mut self, mv: usize, player: Player) {
        if self.entries.len() == HISTORY_LEN {
            self.entries.pop_back();
        }
        self.entries.push_front(Some((mv, player)));
    }

    /// Entry `index` moves ago (0 = most recent), `None` for an empty slot
    pub fn get(&self, index: usize) -> Option<(usize, Player)> {
        self.entries.get(index).copied().flatten()
    }

    /// Number of slots, recorded or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of slots holding a real move
    pub fn recorded(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<(usize, Player)>> + '_ {
        self.entries.iter().copied()
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Hex board (clone to search)
#[derive(Clone, Debug)]
pub struct Board {
    width: usize,
    height: usize,

    /// Played cells: move -> owner
    states: FxHashMap<usize, Player>,

    /// Unplayed cells, ascending
    available: BTreeSet<usize>,

    current_player: Player,
    last_move: Option<usize>,
    history: HistoryWindow,

    /// Incremental edge-to-edge connectivity
    tracker: BoundaryTracker,
    win_check: WinCheck,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create a board ready for play with player one to move
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HexError::InvalidDimensions { width, height });
        }

        let mut board = Self {
            width,
            height,
            states: FxHashMap::default(),
            available: BTreeSet::new(),
            current_player: Player::One,
            last_move: None,
            history: HistoryWindow::new(),
            tracker: BoundaryTracker::new(width, height),
            win_check: WinCheck::default(),
        };
        board.init_board(0)?;
        Ok(board)
    }

    pub fn from_config(config: &BoardConfig) -> Result<Self> {
        let mut board = Self::new(config.width, config.height)?;
        board.win_check = config.win_check;
        Ok(board)
    }

    /// Select the win detection strategy
    pub fn with_win_check(mut self, win_check: WinCheck) -> Self {
        self.win_check = win_check;
        self
    }

    /// Reset for a fresh game. `start_player` picks who moves first:
    /// 0 for player one, 1 for player two.
    pub fn init_board(&mut self, start_player: usize) -> Result<()> {
        let first = Player::ALL
            .get(start_player)
            .copied()
            .ok_or(HexError::InvalidStartPlayer(start_player))?;

        self.current_player = first;
        self.available = (0..self.width * self.height).collect();
        self.states.clear();
        self.last_move = None;
        self.history = HistoryWindow::new();
        self.tracker.reset();
        Ok(())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Player to move
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn last_move(&self) -> Option<usize> {
        self.last_move
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    pub fn win_check(&self) -> WinCheck {
        self.win_check
    }

    /// Unplayed moves in ascending order
    pub fn available_moves(&self) -> impl Iterator<Item = usize> + '_ {
        self.available.iter().copied()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn is_available(&self, mv: usize) -> bool {
        self.available.contains(&mv)
    }

    /// Owner of a cell, if played
    pub fn occupant(&self, mv: usize) -> Option<Player> {
        self.states.get(&mv).copied()
    }

    /// Played cells and their owners, in no particular order
    pub fn stones(&self) -> impl Iterator<Item = (usize, Player)> + '_ {
        self.states.iter().map(|(&mv, &player)| (mv, player))
    }

    /// Number of moves played since `init_board`
    pub fn move_count(&self) -> usize {
        self.states.len()
    }

    // ========================================================================
    // COORDINATES
    // ========================================================================

    /// Flat move index to (row, col)
    pub fn move_to_location(&self, mv: usize) -> (usize, usize) {
        (mv / self.width, mv % self.width)
    }

    /// (row, col) to flat move index.
    ///
    /// Returns `None` when the flat index falls outside the board. Only the
    /// flat index is checked, so `(0, width)` maps to the first cell of row 1.
    pub fn location_to_move(&self, row: isize, col: isize) -> Option<usize> {
        let mv = row.checked_mul(self.width as isize)?.checked_add(col)?;
        if mv < 0 || mv as usize >= self.size() {
            return None;
        }
        Some(mv as usize)
    }

    /// Like [`Board::location_to_move`] for a location of unknown arity.
    /// Anything but exactly two components yields `None`.
    pub fn location_to_move_slice(&self, location: &[isize]) -> Option<usize> {
        match *location {
            [row, col] => self.location_to_move(row, col),
            _ => None,
        }
    }

    /// On-board hex neighbours of a cell
    pub fn neighbors(&self, mv: usize) -> impl Iterator<Item = usize> + '_ {
        let (row, col) = self.move_to_location(mv);
        HEX_NEIGHBORS.iter().filter_map(move |&(dr, dc)| {
            let r = row as isize + dr;
            let c = col as isize + dc;
            if r < 0 || c < 0 || r >= self.height as isize || c >= self.width as isize {
                return None;
            }
            Some(r as usize * self.width + c as usize)
        })
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Place a stone for the player to move.
    ///
    /// Fails with [`HexError::IllegalMove`] and leaves the board untouched
    /// when `mv` is not available.
    pub fn do_move(&mut self, mv: usize) -> Result<()> {
        if !self.available.remove(&mv) {
            return Err(HexError::IllegalMove(mv));
        }

        let player = self.current_player;
        let friendly: Vec<usize> = self
            .neighbors(mv)
            .filter(|n| self.states.get(n) == Some(&player))
            .collect();

        self.states.insert(mv, player);
        self.history.push(mv, player);
        self.tracker.place(mv, player, friendly);
        self.current_player = player.opponent();
        self.last_move = Some(mv);
        Ok(())
    }

    // ========================================================================
    // WIN DETECTION
    // ========================================================================

    /// Winner, if either player links their two edges.
    /// Player one is checked first.
    pub fn has_a_winner(&self) -> Option<Player> {
        Player::ALL
            .into_iter()
            .find(|&player| self.is_winner(player))
    }

    /// Whether the game is over, and who won
    pub fn game_end(&self) -> (bool, Option<Player>) {
        match self.has_a_winner() {
            Some(winner) => (true, Some(winner)),
            None => (false, None),
        }
    }

    /// Does `player` link the cells matching `start` to those matching `end`?
    /// Predicates receive (row, col).
    pub fn connects<S, E>(&self, player: Player, start: S, end: E) -> bool
    where
        S: Fn(usize, usize) -> bool,
        E: Fn(usize, usize) -> bool,
    {
        is_connected(self, player, start, end)
    }

    /// Does `player` link their two edges?
    pub fn is_winner(&self, player: Player) -> bool {
        match self.win_check {
            WinCheck::Incremental => self.tracker.is_connected(player),
            WinCheck::Search => {
                let (last_row, last_col) = (self.height - 1, self.width - 1);
                match player {
                    Player::One => {
                        self.connects(player, |row, _| row == 0, |row, _| row == last_row)
                    }
                    Player::Two => {
                        self.connects(player, |_, col| col == 0, |_, col| col == last_col)
                    }
                }
            }
        }
    }

    // ========================================================================
    // STATE ENCODING
    // ========================================================================

    /// Feature planes from the perspective of the player to move
    pub fn current_state(&self) -> Result<StateTensor> {
        encode_state(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================
