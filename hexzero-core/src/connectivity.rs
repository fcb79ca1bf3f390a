//! Edge-to-edge connectivity
//!
//! Two strategies answer "does this player link boundary A to boundary B":
//! - [`is_connected`]: breadth-first search over the player's stones, run on
//!   demand
//! - [`BoundaryTracker`]: union-find updated on every placement, with four
//!   virtual nodes standing for the board edges
//!
//! Both give the same answer on every reachable position.

use std::collections::VecDeque;

use crate::board::{Board, Player};

// ============================================================================
// BREADTH-FIRST SEARCH
// ============================================================================

/// Does `player` own a chain of adjacent stones from a cell matching `start`
/// to a cell matching `end`? Predicates receive (row, col).
///
/// Seeds are tried in row-major order. The visited set is shared by all seeds,
/// so each cell is expanded at most once per call.
pub fn is_connected<S, E>(board: &Board, player: Player, start: S, end: E) -> bool
where
    S: Fn(usize, usize) -> bool,
    E: Fn(usize, usize) -> bool,
{
    let mut visited = vec![false; board.size()];
    let mut queue = VecDeque::new();

    for seed in 0..board.size() {
        if visited[seed] || board.occupant(seed) != Some(player) {
            continue;
        }
        let (row, col) = board.move_to_location(seed);
        if !start(row, col) {
            continue;
        }

        visited[seed] = true;
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            let (row, col) = board.move_to_location(current);
            if end(row, col) {
                return true;
            }

            for next in board.neighbors(current) {
                if !visited[next] && board.occupant(next) == Some(player) {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }

    false
}

// ============================================================================
// UNION-FIND
// ============================================================================

/// Disjoint sets with union by size and path compression
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    /// `n` singleton sets
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    /// Root of the set containing `i`, compressing the path on the way
    pub fn find(&mut self, mut i: usize) -> usize {
        let root = self.root(i);
        while self.parent[i] != root {
            let next = self.parent[i];
            self.parent[i] = root;
            i = next;
        }
        root
    }

    /// Root of the set containing `i`, without mutation
    pub fn root(&self, mut i: usize) -> usize {
        while self.parent[i] != i {
            i = self.parent[i];
        }
        i
    }

    /// Merge the sets of `i` and `j`. Returns false if already merged.
    pub fn union(&mut self, i: usize, j: usize) -> bool {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i == root_j {
            return false;
        }

        let (small, large) = if self.size[root_i] < self.size[root_j] {
            (root_i, root_j)
        } else {
            (root_j, root_i)
        };
        self.parent[small] = large;
        self.size[large] += self.size[small];
        true
    }

    pub fn same_set(&self, i: usize, j: usize) -> bool {
        self.root(i) == self.root(j)
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

// ============================================================================
// BOUNDARY TRACKER
// ============================================================================

// Virtual node offsets past the last cell
const ONE_TOP: usize = 0;
const ONE_BOTTOM: usize = 1;
const TWO_LEFT: usize = 2;
const TWO_RIGHT: usize = 3;
const VIRTUAL_NODES: usize = 4;

/// Incremental win detection.
///
/// Cells are nodes `0..width*height`; the four board edges are extra nodes
/// after them. A stone is merged with its same-colour neighbours and with the
/// edges of its owner that it touches.
#[derive(Clone, Debug)]
pub struct BoundaryTracker {
    width: usize,
    height: usize,
    sets: UnionFind,
}

impl BoundaryTracker {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sets: UnionFind::new(width * height + VIRTUAL_NODES),
        }
    }

    /// Forget every placement
    pub fn reset(&mut self) {
        self.sets = UnionFind::new(self.width * self.height + VIRTUAL_NODES);
    }

    /// Record a stone at `mv`. `friendly` lists the adjacent cells already
    /// owned by `player`.
    pub fn place<I>(&mut self, mv: usize, player: Player, friendly: I)
    where
        I: IntoIterator<Item = usize>,
    {
        for neighbor in friendly {
            self.sets.union(mv, neighbor);
        }

        let (row, col) = (mv / self.width, mv % self.width);
        match player {
            Player::One => {
                if row == 0 {
                    self.sets.union(mv, self.edge(ONE_TOP));
                }
                if row == self.height - 1 {
                    self.sets.union(mv, self.edge(ONE_BOTTOM));
                }
            }
            Player::Two => {
                if col == 0 {
                    self.sets.union(mv, self.edge(TWO_LEFT));
                }
                if col == self.width - 1 {
                    self.sets.union(mv, self.edge(TWO_RIGHT));
                }
            }
        }
    }

    /// Are the two edges of `player` joined?
    pub fn is_connected(&self, player: Player) -> bool {
        match player {
            Player::One => self.sets.same_set(self.edge(ONE_TOP), self.edge(ONE_BOTTOM)),
            Player::Two => self.sets.same_set(self.edge(TWO_LEFT), self.edge(TWO_RIGHT)),
        }
    }

    fn edge(&self, offset: usize) -> usize {
        self.width * self.height + offset
    }
}

// ============================================================================
// TESTS
// ============================================================================
