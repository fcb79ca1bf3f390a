//! HEXZERO MCTS - Monte Carlo Tree Search agents
//!
//! This crate provides agents for the core game loop:
//! - `MctsAgent`: plain UCT with random rollouts and tree reuse
//! - `RandomAgent`: uniform random moves
//!
//! ## Architecture
//! - Level 1: MctsAgent (Agent implementation)
//! - Level 2: search loop (`search`)
//! - Level 3: tree and rollouts (`tree`, `rollout`)

pub mod random;
pub mod rollout;
pub mod search;
pub mod tree;

use hexzero_core::{Agent, Board, HexError, Player, Result};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

pub use random::RandomAgent;
pub use rollout::{cpu_rollout, RolloutResult};
pub use search::{run_search, visits_to_probs, MoveStatistics, SearchResult};
pub use tree::{MctsNode, MctsTree, NodeId, NodeStats};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// MCTS configuration
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Iterations per move
    pub playouts: usize,
    /// UCB1 exploration constant
    pub exploration: f32,
    /// Rollouts stop after this many moves and score as a draw
    pub max_rollout_depth: u32,
    /// Keep the subtree of the moves actually played between searches
    pub reuse_tree: bool,
    /// RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            playouts: 400,
            exploration: 1.41, // sqrt(2)
            max_rollout_depth: u32::MAX,
            reuse_tree: true,
            seed: None,
        }
    }
}

impl MctsConfig {
    pub fn with_playouts(mut self, playouts: usize) -> Self {
        self.playouts = playouts;
        self
    }

    pub fn with_exploration(mut self, exploration: f32) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_max_rollout_depth(mut self, depth: u32) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    pub fn with_reuse_tree(mut self, reuse: bool) -> Self {
        self.reuse_tree = reuse;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

// ============================================================================
// MCTS AGENT (Level 1)
// ============================================================================

/// Tree kept from the previous search, with the position it was rooted at
#[derive(Debug)]
struct RetainedTree {
    tree: MctsTree,
    root_board: Board,
}

/// Agent that picks moves by Monte Carlo tree search
#[derive(Debug)]
pub struct MctsAgent {
    config: MctsConfig,
    rng: ChaCha8Rng,
    player: Option<Player>,
    retained: Option<RetainedTree>,
}

impl MctsAgent {
    pub fn new(config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rng,
            player: None,
            retained: None,
        }
    }

    pub fn player(&self) -> Option<Player> {
        self.player
    }

    /// Is a tree from an earlier search being held?
    pub fn has_retained_tree(&self) -> bool {
        self.retained.is_some()
    }

    /// Search the position on `board` and return the finished search
    pub fn search(&mut self, board: &Board) -> Result<SearchResult> {
        let tree = match self.take_reusable_tree(board) {
            Some(tree) => tree,
            None => MctsTree::new(board, &mut self.rng),
        };
        let reused = tree.total_simulations();

        let result = run_search(tree, board, &self.config, &mut self.rng)?;

        tracing::debug!(
            "MCTS: {} playouts ({} reused), {} nodes, best {:?}",
            result.total_simulations,
            reused,
            result.tree.len(),
            result.best_move().map(|mv| board.move_to_location(mv))
        );
        Ok(result)
    }

    /// The retained tree re-rooted at `board`, if `board` descends from its
    /// root by moves the history window still remembers and the tree has
    /// expanded all of them.
    fn take_reusable_tree(&mut self, board: &Board) -> Option<MctsTree> {
        let retained = self.retained.take()?;
        if !self.config.reuse_tree || !descends_from(board, &retained.root_board) {
            return None;
        }

        let since = board.move_count() - retained.root_board.move_count();
        if since == 0 || since > board.history().len() {
            return None;
        }

        // History is most recent first
        let mut node = retained.tree.root();
        for i in (0..since).rev() {
            let (mv, player) = board.history().get(i)?;
            node = retained.tree.child(node, mv)?;
            if retained.tree.get(node).mover != player {
                return None;
            }
        }
        Some(retained.tree.into_subtree(node))
    }

    /// Draw a move from the search distribution
    fn pick_move(&mut self, board: &Board, result: &SearchResult, probs: &[f32]) -> Result<usize> {
        let sampled = WeightedIndex::new(probs)
            .ok()
            .map(|dist| dist.sample(&mut self.rng));

        sampled
            .or_else(|| result.best_move())
            .or_else(|| board.available_moves().next())
            .ok_or_else(|| HexError::Agent("no legal moves".to_string()))
    }
}

impl Agent for MctsAgent {
    fn set_player(&mut self, player: Player) {
        self.player = Some(player);
    }

    fn get_action(&mut self, board: &Board, temperature: f32) -> Result<usize> {
        self.get_action_with_probs(board, temperature).map(|(mv, _)| mv)
    }

    fn get_action_with_probs(&mut self, board: &Board, temperature: f32) -> Result<(usize, Vec<f32>)> {
        if board.available_count() == 0 {
            return Err(HexError::Agent("no legal moves".to_string()));
        }

        let result = self.search(board)?;
        let probs = result.visit_probs(board.size(), temperature);
        let mv = self.pick_move(board, &result, &probs)?;

        self.retained = self.config.reuse_tree.then(|| RetainedTree {
            tree: result.tree,
            root_board: board.clone(),
        });

        Ok((mv, probs))
    }

    fn reset_player(&mut self) {
        self.retained = None;
    }

    fn name(&self) -> &str {
        "mcts"
    }
}

/// Does `board` extend `earlier`: same dimensions, at least as many moves,
/// and every earlier stone still in place?
fn descends_from(board: &Board, earlier: &Board) -> bool {
    board.width() == earlier.width()
        && board.height() == earlier.height()
        && board.move_count() >= earlier.move_count()
        && earlier.stones().all(|(mv, player)| board.occupant(mv) == Some(player))
}

// ============================================================================
// TESTS
// ============================================================================
