//! MCTS Search Loop
//!
//! Implements the core MCTS algorithm:
//! 1. Selection - Use UCB1 to traverse tree
//! 2. Expansion - Add child node
//! 3. Simulation - Random rollout from the new position
//! 4. Backpropagation - Update statistics
//!
//! ## Architecture
//! - Level 2: Search loop coordination
//! - Level 3: Individual MCTS phases
//! - Level 4: Visit counts to move probabilities

use hexzero_core::{Board, Player, Result};
use rand::prelude::*;

use crate::rollout::cpu_rollout;
use crate::tree::{MctsTree, NodeId};
use crate::MctsConfig;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Result of MCTS search
#[derive(Debug)]
pub struct SearchResult {
    /// The final tree after search
    pub tree: MctsTree,
    /// Root visits, including any carried over from a reused tree
    pub total_simulations: u32,
    /// Statistics for each root move
    pub move_stats: Vec<MoveStatistics>,
}

/// Statistics for a single move at root
#[derive(Clone, Debug)]
pub struct MoveStatistics {
    pub mv: usize,
    pub visits: u32,
    pub win_rate: f32,
}

impl SearchResult {
    /// Get the best move (most visited)
    pub fn best_move(&self) -> Option<usize> {
        self.tree.best_move()
    }

    /// Get all moves sorted by visits
    pub fn moves_by_visits(&self) -> Vec<(usize, u32)> {
        let mut moves: Vec<_> = self.move_stats.iter().map(|s| (s.mv, s.visits)).collect();
        moves.sort_by(|a, b| b.1.cmp(&a.1));
        moves
    }

    /// Move probabilities over all `size` cells, shaped by `temperature`
    pub fn visit_probs(&self, size: usize, temperature: f32) -> Vec<f32> {
        visits_to_probs(&self.move_stats, size, temperature)
    }
}

// ============================================================================
// SEARCH LOOP (Level 2 - Main Coordination)
// ============================================================================

/// Run `config.playouts` MCTS iterations from the position on `board`.
///
/// `tree` must be rooted at that position; a fresh tree or a reused subtree
/// both work.
pub fn run_search<R: Rng>(
    mut tree: MctsTree,
    board: &Board,
    config: &MctsConfig,
    rng: &mut R,
) -> Result<SearchResult> {
    for _ in 0..config.playouts {
        run_single_iteration(&mut tree, board, config, rng)?;
    }

    let total_simulations = tree.total_simulations();
    let move_stats = collect_move_statistics(&tree);

    Ok(SearchResult {
        tree,
        total_simulations,
        move_stats,
    })
}

// ============================================================================
// MCTS PHASES (Level 3)
// ============================================================================

/// Single MCTS iteration on a scratch copy of the root position
fn run_single_iteration<R: Rng>(
    tree: &mut MctsTree,
    root_board: &Board,
    config: &MctsConfig,
    rng: &mut R,
) -> Result<()> {
    let mut board = root_board.clone();

    // Phase 1: Selection
    let path = tree.select_leaf(&mut board, config.exploration)?;
    let leaf_id = path.last().copied().unwrap_or(NodeId::ROOT);

    // Phase 2: Expansion (if not terminal)
    let leaf = tree.get(leaf_id);
    let simulation_node = if !leaf.is_terminal() && !leaf.is_fully_expanded() {
        tree.expand(leaf_id, &mut board, rng)?.unwrap_or(leaf_id)
    } else {
        leaf_id
    };

    // Phase 3: Simulation
    let winner = simulate_node(tree, simulation_node, &mut board, config.max_rollout_depth, rng)?;

    // Phase 4: Backpropagation
    tree.backpropagate(simulation_node, winner);
    Ok(())
}

/// Cached winner for decided positions, otherwise a random rollout
fn simulate_node<R: Rng>(
    tree: &MctsTree,
    node_id: NodeId,
    board: &mut Board,
    max_depth: u32,
    rng: &mut R,
) -> Result<Option<Player>> {
    if let Some(winner) = tree.get(node_id).cached_winner {
        return Ok(Some(winner));
    }
    Ok(cpu_rollout(board, max_depth, rng)?.winner)
}

// ============================================================================
// STATISTICS (Level 4 - Utilities)
// ============================================================================

/// Collect statistics for root moves
fn collect_move_statistics(tree: &MctsTree) -> Vec<MoveStatistics> {
    tree.move_statistics()
        .into_iter()
        .map(|(mv, visits, win_rate)| MoveStatistics { mv, visits, win_rate })
        .collect()
}

/// Turn root visit counts into a distribution over all `size` cells.
///
/// `p(a) ~ visits(a)^(1/T)`, evaluated as a softmax over `ln(visits) / T` so
/// small temperatures do not overflow. A temperature of zero or below puts
/// all mass on the most visited move. Cells that are not root children get
/// zero.
pub fn visits_to_probs(stats: &[MoveStatistics], size: usize, temperature: f32) -> Vec<f32> {
    let mut probs = vec![0.0; size];
    if stats.is_empty() {
        return probs;
    }

    if temperature <= 0.0 {
        if let Some(best) = stats.iter().max_by_key(|s| s.visits) {
            if let Some(p) = probs.get_mut(best.mv) {
                *p = 1.0;
            }
        }
        return probs;
    }

    let inv_temp = 1.0 / f64::from(temperature);
    let logits: Vec<f64> = stats
        .iter()
        .map(|s| inv_temp * (f64::from(s.visits) + 1e-10).ln())
        .collect();
    let max_logit = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = logits.iter().map(|l| (l - max_logit).exp()).collect();
    let total: f64 = weights.iter().sum();

    for (s, w) in stats.iter().zip(weights) {
        if let Some(p) = probs.get_mut(s.mv) {
            *p = (w / total) as f32;
        }
    }
    probs
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    /// One: (0,0) (1,0); Two: (2,1) (2,2); One to move. Cell (2,0) completes
    /// One's column and is also the only cell that finishes Two's row, so
    /// every other move loses to the reply at 6.
    const SHARED_CELL_POSITION: [usize; 4] = [0, 7, 3, 8];

    fn stats(pairs: &[(usize, u32)]) -> Vec<MoveStatistics> {
        pairs
            .iter()
            .map(|&(mv, visits)| MoveStatistics { mv, visits, win_rate: 0.5 })
            .collect()
    }

    #[test]
    fn test_search_spends_every_playout() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let board = Board::new(3, 3).unwrap();
        let config = MctsConfig::default().with_playouts(200);
        let tree = MctsTree::new(&board, &mut rng);

        let result = run_search(tree, &board, &config, &mut rng).unwrap();
        assert_eq!(result.total_simulations, 200);

        let child_visits: u32 = result.move_stats.iter().map(|s| s.visits).sum();
        assert_eq!(child_visits, 200);
        // Every opening gets tried on a 3x3 board
        assert_eq!(result.move_stats.len(), 9);
    }

    #[test]
    fn test_search_finds_the_only_safe_move() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut board = Board::new(3, 3).unwrap();
        for mv in SHARED_CELL_POSITION {
            board.do_move(mv).unwrap();
        }
        let config = MctsConfig::default().with_playouts(500);
        let tree = MctsTree::new(&board, &mut rng);

        let result = run_search(tree, &board, &config, &mut rng).unwrap();
        assert_eq!(result.best_move(), Some(6));

        let winning = result.move_stats.iter().find(|s| s.mv == 6).unwrap();
        assert_eq!(winning.win_rate, 1.0);
        for other in result.move_stats.iter().filter(|s| s.mv != 6) {
            assert!(other.visits < winning.visits);
            assert!(other.win_rate < 1.0, "move {} never lost", other.mv);
        }
    }

    #[test]
    fn test_search_on_decided_position() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut board = Board::new(2, 2).unwrap();
        for mv in [0, 1, 2] {
            board.do_move(mv).unwrap();
        }
        let config = MctsConfig::default().with_playouts(10);
        let tree = MctsTree::new(&board, &mut rng);

        let result = run_search(tree, &board, &config, &mut rng).unwrap();
        assert!(result.move_stats.is_empty());
        assert_eq!(result.best_move(), None);
        assert_eq!(result.total_simulations, 10);
    }

    #[test]
    fn test_probs_follow_visit_counts() {
        let probs = visits_to_probs(&stats(&[(0, 30), (2, 10)]), 4, 1.0);
        assert!((probs[0] - 0.75).abs() < 1e-6);
        assert!((probs[2] - 0.25).abs() < 1e-6);
        assert_eq!(probs[1], 0.0);
        assert_eq!(probs[3], 0.0);
    }

    #[test]
    fn test_low_temperature_is_nearly_greedy() {
        let probs = visits_to_probs(&stats(&[(0, 30), (1, 29)]), 2, 1e-3);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > 0.999);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_temperature_is_one_hot() {
        let probs = visits_to_probs(&stats(&[(1, 3), (3, 8)]), 4, 0.0);
        assert_eq!(probs, vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unvisited_children_get_negligible_mass() {
        let probs = visits_to_probs(&stats(&[(0, 10), (1, 0)]), 2, 1.0);
        assert!(probs[1] < 1e-9);
        assert!((probs[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_moves_by_visits_sorted() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let board = Board::new(3, 3).unwrap();
        let config = MctsConfig::default().with_playouts(50);
        let tree = MctsTree::new(&board, &mut rng);

        let result = run_search(tree, &board, &config, &mut rng).unwrap();
        let ordered = result.moves_by_visits();
        assert!(ordered.windows(2).all(|w| w[0].1 >= w[1].1));
    }
}
