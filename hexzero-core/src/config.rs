//! Board configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default board edge length
pub const DEFAULT_SIZE: usize = 11;

/// Strategy used by `Board::has_a_winner`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinCheck {
    /// Breadth-first search over the stones on every query
    Search,
    /// Union-find maintained on every move
    #[default]
    Incremental,
}

/// Board dimensions and win detection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    pub win_check: WinCheck,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            win_check: WinCheck::default(),
        }
    }
}

impl BoardConfig {
    /// `size x size` board
    pub fn square(size: usize) -> Self {
        Self {
            width: size,
            height: size,
            ..Default::default()
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
