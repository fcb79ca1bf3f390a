//! The agent capability consumed by the orchestrator

use crate::board::{Board, Player};
use crate::error::Result;

/// Temperature used when the caller has no preference
pub const DEFAULT_TEMPERATURE: f32 = 1e-3;

/// A move-selecting participant: human, search or learned.
///
/// Agents only ever see `&Board`; the orchestrator owns all mutation.
pub trait Agent {
    /// Tell the agent which side it plays
    fn set_player(&mut self, player: Player);

    /// Choose a move for the player to move on `board`
    fn get_action(&mut self, board: &Board, temperature: f32) -> Result<usize>;

    /// Choose a move and report a probability for every cell (zero on
    /// illegal cells). Agents without a distribution put all mass on the
    /// chosen move.
    fn get_action_with_probs(&mut self, board: &Board, temperature: f32) -> Result<(usize, Vec<f32>)> {
        let mv = self.get_action(board, temperature)?;
        let mut probs = vec![0.0; board.size()];
        if let Some(p) = probs.get_mut(mv) {
            *p = 1.0;
        }
        Ok((mv, probs))
    }

    /// Drop any state retained between moves (e.g. a search tree)
    fn reset_player(&mut self) {}

    /// Display name
    fn name(&self) -> &str {
        "agent"
    }
}
