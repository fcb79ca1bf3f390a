//! MCTS Tree structure and node management
//!
//! Uses arena allocation for efficient tree operations. Nodes do not store
//! positions: the searcher replays the moves along a path onto a clone of the
//! root board.
//!
//! ## Architecture
//! - Level 2: Tree operations (select_leaf, expand, backpropagate)
//! - Level 3: UCB1 calculation, node accessors
//! - Level 4: Statistics, re-rooting

use std::collections::VecDeque;

use hexzero_core::{Board, Player, Result};
use rand::prelude::*;

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Statistics for a tree node
#[derive(Clone, Debug, Default)]
pub struct NodeStats {
    /// Number of times this node was visited
    pub visits: u32,
    /// Total wins (from perspective of player who moved TO this node)
    pub wins: f32,
}

impl NodeStats {
    /// Win rate from this node's perspective
    pub fn win_rate(&self) -> f32 {
        if self.visits == 0 {
            0.5 // Prior for unexplored nodes
        } else {
            self.wins / self.visits as f32
        }
    }
}

/// A node in the MCTS tree
#[derive(Clone, Debug)]
pub struct MctsNode {
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Move that led to this node (None for root)
    pub incoming_move: Option<usize>,
    /// Player who made the incoming move
    pub mover: Player,
    /// Children: (move, node_id) pairs
    pub children: Vec<(usize, NodeId)>,
    /// Moves not yet expanded, popped from the back
    pub untried_moves: Vec<usize>,
    /// Visit/win statistics
    pub stats: NodeStats,
    /// Winner of the position, if it is decided
    pub cached_winner: Option<Player>,
}

impl MctsNode {
    /// Create a node for the position on `board`
    pub fn new<R: Rng>(
        board: &Board,
        parent: Option<NodeId>,
        incoming_move: Option<usize>,
        rng: &mut R,
    ) -> Self {
        let cached_winner = board.has_a_winner();

        // Generate untried moves only for undecided positions
        let mut untried_moves: Vec<usize> = if cached_winner.is_none() {
            board.available_moves().collect()
        } else {
            Vec::new()
        };
        untried_moves.shuffle(rng);

        Self {
            parent,
            incoming_move,
            mover: board.current_player().opponent(),
            children: Vec::new(),
            untried_moves,
            stats: NodeStats::default(),
            cached_winner,
        }
    }

    /// Is this a terminal node?
    pub fn is_terminal(&self) -> bool {
        self.cached_winner.is_some() || (self.untried_moves.is_empty() && self.children.is_empty())
    }

    /// Is this node fully expanded?
    pub fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty()
    }
}

// ============================================================================
// MCTS TREE (Level 2 - Tree Operations)
// ============================================================================

/// MCTS search tree with arena allocation
#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
}

impl MctsTree {
    /// Create a new tree rooted at the position on `board`
    pub fn new<R: Rng>(board: &Board, rng: &mut R) -> Self {
        Self {
            nodes: vec![MctsNode::new(board, None, None, rng)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child reached by `mv`, if expanded
    pub fn child(&self, node_id: NodeId, mv: usize) -> Option<NodeId> {
        self.get(node_id)
            .children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, id)| *id)
    }

    /// Select a leaf using UCB1, replaying the chosen moves onto `board`.
    ///
    /// Returns the path from root to the selected leaf.
    pub fn select_leaf(&self, board: &mut Board, exploration: f32) -> Result<Vec<NodeId>> {
        let mut path = vec![self.root()];
        let mut current = self.root();

        while self.get(current).is_fully_expanded() && !self.get(current).is_terminal() {
            let Some(best_child) = self.select_best_child(current, exploration) else {
                break;
            };
            if let Some(mv) = self.get(best_child).incoming_move {
                board.do_move(mv)?;
            }
            path.push(best_child);
            current = best_child;
        }

        Ok(path)
    }

    /// Expand a node by adding one child, playing its move on `board`.
    ///
    /// Returns the new child's NodeId, or None if the node is fully expanded.
    pub fn expand<R: Rng>(&mut self, node_id: NodeId, board: &mut Board, rng: &mut R) -> Result<Option<NodeId>> {
        let Some(mv) = self.get_mut(node_id).untried_moves.pop() else {
            return Ok(None);
        };
        board.do_move(mv)?;

        let child_id = NodeId(self.nodes.len());
        self.nodes.push(MctsNode::new(board, Some(node_id), Some(mv), rng));
        self.get_mut(node_id).children.push((mv, child_id));

        Ok(Some(child_id))
    }

    // ========================================================================
    // Level 3: Selection Helpers
    // ========================================================================

    /// Select best child using UCB1
    fn select_best_child(&self, node_id: NodeId, exploration: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.stats.visits;

        node.children
            .iter()
            .max_by(|(_, a), (_, b)| {
                let ucb_a = self.ucb1(*a, parent_visits, exploration);
                let ucb_b = self.ucb1(*b, parent_visits, exploration);
                ucb_a.partial_cmp(&ucb_b).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(_, id)| *id)
    }

    /// Calculate UCB1 value for a node
    ///
    /// UCB1 = wins/visits + C * sqrt(ln(parent_visits) / visits)
    fn ucb1(&self, node_id: NodeId, parent_visits: u32, exploration: f32) -> f32 {
        let stats = &self.get(node_id).stats;
        if stats.visits == 0 {
            return f32::INFINITY; // Prioritize unexplored nodes
        }

        let exploitation = stats.win_rate();
        let exploration_term =
            exploration * ((parent_visits.max(1) as f32).ln() / stats.visits as f32).sqrt();

        exploitation + exploration_term
    }

    // ========================================================================
    // Level 2: Backpropagation
    // ========================================================================

    /// Backpropagate a playout result from leaf to root.
    ///
    /// Each node is credited from the point of view of the player who moved
    /// into it. `None` (undecided playout) counts as half a win.
    pub fn backpropagate(&mut self, leaf_id: NodeId, winner: Option<Player>) {
        let mut current = Some(leaf_id);

        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.stats.visits += 1;
            node.stats.wins += match winner {
                Some(player) if player == node.mover => 1.0,
                Some(_) => 0.0,
                None => 0.5,
            };
            current = node.parent;
        }
    }

    // ========================================================================
    // Level 4: Statistics
    // ========================================================================

    /// Get the best move from root (most visits)
    pub fn best_move(&self) -> Option<usize> {
        self.get(self.root())
            .children
            .iter()
            .max_by_key(|(_, id)| self.get(*id).stats.visits)
            .map(|(mv, _)| *mv)
    }

    /// Root moves with their visit counts and win rates
    pub fn move_statistics(&self) -> Vec<(usize, u32, f32)> {
        self.get(self.root())
            .children
            .iter()
            .map(|(mv, id)| {
                let node = self.get(*id);
                (*mv, node.stats.visits, node.stats.win_rate())
            })
            .collect()
    }

    /// Get total simulations run (root visits)
    pub fn total_simulations(&self) -> u32 {
        self.get(self.root()).stats.visits
    }

    // ========================================================================
    // Level 4: Re-rooting
    // ========================================================================

    /// Keep only the subtree under `new_root`, which becomes the root
    pub fn into_subtree(self, new_root: NodeId) -> MctsTree {
        // Breadth-first order fixes the new ids
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([new_root]);
        while let Some(old_id) = queue.pop_front() {
            remap[old_id.0] = Some(NodeId(order.len()));
            order.push(old_id);
            queue.extend(self.nodes[old_id.0].children.iter().map(|(_, child)| *child));
        }

        let mut slots: Vec<Option<MctsNode>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes: Vec<MctsNode> = order
            .iter()
            .filter_map(|old_id| {
                let mut node = slots[old_id.0].take()?;
                node.parent = node.parent.and_then(|parent| remap[parent.0]);
                for (_, child) in &mut node.children {
                    if let Some(mapped) = remap[child.0] {
                        *child = mapped;
                    }
                }
                Some(node)
            })
            .collect();

        if let Some(root) = nodes.first_mut() {
            root.incoming_move = None;
        }
        MctsTree { nodes }
    }
}

// ============================================================================
// TESTS
// ============================================================================
