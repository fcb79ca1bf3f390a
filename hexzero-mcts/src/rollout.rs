//! Random playouts for MCTS
//!
//! ## Architecture
//! - Level 3: Single rollout
//! - Level 4: Move order

use hexzero_core::{Board, Player, Result};
use rand::prelude::*;

// ============================================================================
// ROLLOUT RESULT
// ============================================================================

/// Result of a rollout simulation
#[derive(Clone, Debug, PartialEq)]
pub struct RolloutResult {
    /// Winner, or None if the depth limit cut the playout short
    pub winner: Option<Player>,
    /// Number of moves played
    pub moves_played: u32,
}

// ============================================================================
// CPU ROLLOUT (Level 3 - Single Rollout)
// ============================================================================

/// Play uniformly random moves on `board` until someone connects, the board
/// fills up, or `max_depth` moves have been played.
///
/// The board is consumed as scratch space; callers pass a clone.
pub fn cpu_rollout<R: Rng>(board: &mut Board, max_depth: u32, rng: &mut R) -> Result<RolloutResult> {
    let mut moves = shuffled_moves(board, rng);
    let mut moves_played = 0;
    let mut winner = board.has_a_winner();

    while winner.is_none() && moves_played < max_depth {
        let Some(mv) = moves.pop() else {
            break;
        };
        board.do_move(mv)?;
        moves_played += 1;
        winner = board.has_a_winner();
    }

    Ok(RolloutResult { winner, moves_played })
}

/// A random permutation of the free cells. Popping from it is the same as
/// drawing a uniform legal move each ply.
fn shuffled_moves<R: Rng>(board: &Board, rng: &mut R) -> Vec<usize> {
    let mut moves: Vec<usize> = board.available_moves().collect();
    moves.shuffle(rng);
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rollout_reaches_a_winner() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..10 {
            let mut board = Board::new(5, 5).unwrap();
            let result = cpu_rollout(&mut board, u32::MAX, &mut rng).unwrap();
            assert!(result.winner.is_some());
            assert_eq!(result.winner, board.has_a_winner());
            assert_eq!(result.moves_played as usize, board.move_count());
        }
    }

    #[test]
    fn test_rollout_respects_depth_limit() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut board = Board::new(11, 11).unwrap();
        let result = cpu_rollout(&mut board, 3, &mut rng).unwrap();
        assert_eq!(result.moves_played, 3);
        assert_eq!(result.winner, None);
        assert_eq!(board.move_count(), 3);
    }

    #[test]
    fn test_rollout_on_decided_board_plays_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut board = Board::new(2, 2).unwrap();
        // One: (0,0) (1,0)
        for mv in [0, 1, 2] {
            board.do_move(mv).unwrap();
        }
        let result = cpu_rollout(&mut board, 10, &mut rng).unwrap();
        assert_eq!(result.winner, Some(Player::One));
        assert_eq!(result.moves_played, 0);
    }
}
