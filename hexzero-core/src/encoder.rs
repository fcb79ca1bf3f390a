//! Feature-plane encoding of a position
//!
//! Layout, from the perspective of the player to move:
//! - planes 0, 2, 4, 6: opponent stones, now and 2, 4, 6 plies ago
//! - planes 1, 3, 5, 7: own stones, now and 2, 4, 6 plies ago
//! - plane 8: all ones when an even number of stones is on the board
//!
//! Rows are flipped so that output row 0 is the bottom row of the board.

use serde::Serialize;

use crate::board::{Board, HistoryWindow, Player, HISTORY_LEN};
use crate::error::{HexError, Result};

/// Planes in an encoded state: the history planes plus the turn indicator
pub const STATE_PLANES: usize = HISTORY_LEN + 1;

/// Dense `planes x rows x cols` tensor of `f32`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateTensor {
    planes: usize,
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl StateTensor {
    pub fn zeros(planes: usize, rows: usize, cols: usize) -> Self {
        Self {
            planes,
            rows,
            cols,
            data: vec![0.0; planes * rows * cols],
        }
    }

    /// (planes, rows, cols). Rows (board height) are on axis 1 and columns
    /// (board width) on axis 2, so a `width x height` board encodes as
    /// `(9, height, width)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.planes, self.rows, self.cols)
    }

    pub fn get(&self, plane: usize, row: usize, col: usize) -> f32 {
        self.data[self.offset(plane, row, col)]
    }

    pub fn set(&mut self, plane: usize, row: usize, col: usize, value: f32) {
        let offset = self.offset(plane, row, col);
        self.data[offset] = value;
    }

    /// One plane, row-major
    pub fn plane(&self, plane: usize) -> &[f32] {
        let len = self.rows * self.cols;
        &self.data[plane * len..(plane + 1) * len]
    }

    pub fn fill_plane(&mut self, plane: usize, value: f32) {
        let len = self.rows * self.cols;
        self.data[plane * len..(plane + 1) * len].fill(value);
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Reverse the row axis of every plane
    pub fn flip_rows(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        for plane in self.data.chunks_mut(rows * cols) {
            for row in 0..rows / 2 {
                let mirror = rows - 1 - row;
                let (head, tail) = plane.split_at_mut(mirror * cols);
                head[row * cols..(row + 1) * cols].swap_with_slice(&mut tail[..cols]);
            }
        }
    }

    fn offset(&self, plane: usize, row: usize, col: usize) -> usize {
        debug_assert!(plane < self.planes && row < self.rows && col < self.cols);
        (plane * self.rows + row) * self.cols + col
    }
}

/// Encode `board` for the player to move
pub fn encode_state(board: &Board) -> Result<StateTensor> {
    let stones: Vec<(usize, Player)> = board.stones().collect();
    encode_planes(
        board.width(),
        board.height(),
        board.current_player(),
        &stones,
        board.history(),
    )
}

fn encode_planes(
    width: usize,
    height: usize,
    me: Player,
    stones: &[(usize, Player)],
    history: &HistoryWindow,
) -> Result<StateTensor> {
    let mut tensor = StateTensor::zeros(STATE_PLANES, height, width);
    let location = |mv: usize| (mv / width, mv % width);

    if !stones.is_empty() {
        // Full snapshot on every history plane
        for &(mv, owner) in stones {
            let (row, col) = location(mv);
            let parity = usize::from(owner == me);
            for plane in (parity..HISTORY_LEN).step_by(2) {
                tensor.set(plane, row, col, 1.0);
            }
        }

        // Un-mark each recent move on the older planes of its parity
        let window = history.len();
        for first in [0, 1] {
            for i in (first..window.saturating_sub(2)).step_by(2) {
                let Some((mv, _)) = history.get(i) else {
                    continue;
                };
                let (row, col) = location(mv);
                for plane in (i + 2..window).step_by(2) {
                    let value = tensor.get(plane, row, col);
                    if value != 1.0 {
                        return Err(HexError::BrokenInvariant { plane, row, col, value });
                    }
                    tensor.set(plane, row, col, 0.0);
                }
            }
        }
    }

    if stones.len() % 2 == 0 {
        tensor.fill_plane(HISTORY_LEN, 1.0);
    }

    tensor.flip_rows();
    Ok(tensor)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Value at board (row, col), undoing the row flip
    fn cell(tensor: &StateTensor, plane: usize, row: usize, col: usize) -> f32 {
        let (_, rows, _) = tensor.shape();
        tensor.get(plane, rows - 1 - row, col)
    }

    fn board_after(width: usize, height: usize, moves: &[usize]) -> Board {
        let mut board = Board::new(width, height).unwrap();
        for &mv in moves {
            board.do_move(mv).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board() {
        let board = Board::new(11, 11).unwrap();
        let state = board.current_state().unwrap();

        assert_eq!(state.shape(), (9, 11, 11));
        for plane in 0..HISTORY_LEN {
            assert!(state.plane(plane).iter().all(|&v| v == 0.0));
        }
        assert!(state.plane(HISTORY_LEN).iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_turn_indicator_parity() {
        let mut board = Board::new(5, 5).unwrap();
        for mv in [12, 0, 24, 4, 20] {
            board.do_move(mv).unwrap();
            let state = board.current_state().unwrap();
            let expected = if board.move_count() % 2 == 0 { 1.0 } else { 0.0 };
            assert!(state.plane(HISTORY_LEN).iter().all(|&v| v == expected));
        }
    }

    #[test]
    fn test_row_axis_is_reversed() {
        // Player one plays (0, 1); player two is to move
        let board = board_after(3, 3, &[1]);
        let state = board.current_state().unwrap();

        // Opponent stone on plane 0, stored in the last output row
        assert_eq!(state.get(0, 2, 1), 1.0);
        assert_eq!(state.get(0, 0, 1), 0.0);
        assert_eq!(state.plane(0).iter().sum::<f32>(), 1.0);
        assert!(state.plane(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_perspective_split() {
        // One: 0, 8   Two: 4   -> Two to move
        let board = board_after(3, 3, &[0, 4, 8]);
        let state = board.current_state().unwrap();

        // Plane 0: all opponent (player one) stones
        assert_eq!(cell(&state, 0, 0, 0), 1.0);
        assert_eq!(cell(&state, 0, 2, 2), 1.0);
        assert_eq!(cell(&state, 0, 1, 1), 0.0);
        // Plane 1: own stones
        assert_eq!(cell(&state, 1, 1, 1), 1.0);
        assert_eq!(state.plane(1).iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_history_planes_replay_the_past() {
        // Ten moves on a 5x5 board, row-major order
        let moves: Vec<usize> = (0..10).collect();
        let board = board_after(5, 5, &moves);
        let state = board.current_state().unwrap();
        // Player one to move; opponent owns the odd moves, we own the even ones
        assert_eq!(board.current_player(), Player::One);

        let count = |plane: usize| state.plane(plane).iter().sum::<f32>() as usize;

        // Opponent: 5 stones now, then one fewer every two plies
        assert_eq!(count(0), 5);
        assert_eq!(count(2), 4);
        assert_eq!(count(4), 3);
        assert_eq!(count(6), 2);
        // Own stones follow the same pattern one ply behind
        assert_eq!(count(1), 5);
        assert_eq!(count(3), 4);
        assert_eq!(count(5), 3);
        assert_eq!(count(7), 2);

        // The most recent opponent move (9) is gone from plane 2 onward
        let (row, col) = (9 / 5, 9 % 5);
        assert_eq!(cell(&state, 0, row, col), 1.0);
        assert_eq!(cell(&state, 2, row, col), 0.0);
        assert_eq!(cell(&state, 6, row, col), 0.0);

        // Our move 2 predates the window and stays everywhere
        let (row, col) = (0, 2);
        for plane in [1, 3, 5, 7] {
            assert_eq!(cell(&state, plane, row, col), 1.0);
        }
    }

    #[test]
    fn test_encoding_is_pure() {
        let board = board_after(4, 4, &[5, 6, 9]);
        let first = board.current_state().unwrap();
        let second = board.current_state().unwrap();
        assert_eq!(first, second);
        assert_eq!(board.move_count(), 3);
    }

    #[test]
    fn test_broken_invariant_is_reported() {
        // History names a move the occupancy never saw
        let mut history = HistoryWindow::new();
        history.push(3, Player::Two);
        let stones = [(0, Player::One)];

        let result = encode_planes(2, 2, Player::One, &stones, &history);
        assert!(matches!(
            result,
            Err(HexError::BrokenInvariant { plane: 2, row: 1, col: 1, .. })
        ));
    }

    #[test]
    fn test_non_square_board_keeps_rows_on_axis_one() {
        // 4 columns, 2 rows; player one plays (1, 3)
        let board = board_after(4, 2, &[7]);
        let state = board.current_state().unwrap();

        assert_eq!(state.shape(), (STATE_PLANES, 2, 4));
        // Board row 1 is output row 0 after the flip
        assert_eq!(state.get(0, 0, 3), 1.0);
        assert_eq!(cell(&state, 0, 1, 3), 1.0);
        assert_eq!(state.plane(0).iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_flip_rows_odd_height() {
        let mut tensor = StateTensor::zeros(1, 3, 2);
        tensor.set(0, 0, 0, 1.0);
        tensor.set(0, 1, 1, 2.0);
        tensor.set(0, 2, 1, 3.0);
        tensor.flip_rows();
        assert_eq!(tensor.as_slice(), &[0.0, 3.0, 0.0, 2.0, 1.0, 0.0]);
    }
}
