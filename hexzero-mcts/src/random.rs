//! Uniform random agent

use hexzero_core::{Agent, Board, HexError, Player, Result};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Plays a uniformly random free cell
#[derive(Debug)]
pub struct RandomAgent {
    rng: ChaCha8Rng,
    player: Option<Player>,
}

impl RandomAgent {
    /// Seeded for reproducible games; `None` draws a seed from the OS
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng, player: None }
    }

    pub fn player(&self) -> Option<Player> {
        self.player
    }
}

impl Agent for RandomAgent {
    fn set_player(&mut self, player: Player) {
        self.player = Some(player);
    }

    fn get_action(&mut self, board: &Board, _temperature: f32) -> Result<usize> {
        let moves: Vec<usize> = board.available_moves().collect();
        moves
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| HexError::Agent("no legal moves".to_string()))
    }

    /// Uniform over the free cells
    fn get_action_with_probs(&mut self, board: &Board, temperature: f32) -> Result<(usize, Vec<f32>)> {
        let mv = self.get_action(board, temperature)?;
        let share = 1.0 / board.available_count() as f32;
        let mut probs = vec![0.0; board.size()];
        for free in board.available_moves() {
            probs[free] = share;
        }
        Ok((mv, probs))
    }

    fn name(&self) -> &str {
        "random"
    }
}
