//! Game configuration.
//!
//! Everything that used to be a module-level constant (board size, goal,
//! spawn odds, milestone thresholds) is carried explicitly so a board and
//! its controller depend on nothing but what they were built with.

use serde::{Deserialize, Serialize};

/// Side length of the default board.
pub const DEFAULT_BOARD_SIZE: usize = 5;

/// Tile value that wins the game.
pub const DEFAULT_WIN_VALUE: u32 = 4096;

/// Chance that a spawned tile is a 2 rather than a 4.
pub const DEFAULT_SPAWN_TWO_PROBABILITY: f64 = 0.9;

/// Tiles placed on a fresh board.
pub const DEFAULT_INITIAL_TILES: usize = 2;

/// Max-tile thresholds that each award one bonus tile.
pub const DEFAULT_MILESTONES: [u32; 7] = [64, 128, 256, 512, 1024, 2048, 4096];

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("board size must be at least 2, got {0}")]
    BoardTooSmall(usize),
    #[error("spawn probability must be within [0, 1], got {0}")]
    Probability(f64),
    #[error("win value must be a power of two >= 4, got {0}")]
    WinValue(u32),
    #[error("milestones must be strictly increasing")]
    Milestones,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    pub win_value: u32,
    pub spawn_two_probability: f64,
    pub initial_tiles: usize,
    pub milestones: Vec<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board_size: DEFAULT_BOARD_SIZE,
            win_value: DEFAULT_WIN_VALUE,
            spawn_two_probability: DEFAULT_SPAWN_TWO_PROBABILITY,
            initial_tiles: DEFAULT_INITIAL_TILES,
            milestones: DEFAULT_MILESTONES.to_vec(),
        }
    }
}

impl GameConfig {
    /// Check the values a board cannot sensibly be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < 2 {
            return Err(ConfigError::BoardTooSmall(self.board_size));
        }
        if !(0.0..=1.0).contains(&self.spawn_two_probability) {
            return Err(ConfigError::Probability(self.spawn_two_probability));
        }
        if self.win_value < 4 || !self.win_value.is_power_of_two() {
            return Err(ConfigError::WinValue(self.win_value));
        }
        if self.milestones.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::Milestones);
        }
        Ok(())
    }
}
