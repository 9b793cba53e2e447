//! # 4096 Game Core Engine
//!
//! A pure Rust implementation of the 4096 sliding-tile puzzle on a 5x5 grid:
//! the grid engine (slide, merge, spawn) and the game controller that tracks
//! win, game over, high score and bonus milestones. All randomness flows from
//! a single injected generator, so a fixed seed replays the same game.
//!
//! ## Example
//!
//! ```rust
//! use game_4096_core::{Direction, Game, GameConfig, MemoryHighScore};
//!
//! let mut game = Game::new(GameConfig::default(), 42, Box::new(MemoryHighScore::default()))
//!     .expect("default config is valid");
//! let moved = game.move_tiles(Direction::Left);
//! let state = game.state();
//! println!("Score: {}, Moved: {}", state.score, moved);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod board;
pub mod bonus;
pub mod config;
pub mod game;
pub mod highscore;
pub mod line;

pub use board::{Board, BoardError};
pub use bonus::BonusKind;
pub use config::{ConfigError, GameConfig};
pub use game::{Game, GameEvent, GameSnapshot, GameStatus};
pub use highscore::{FileHighScore, HighScoreError, HighScoreStore, MemoryHighScore};

/// The four directions tiles can slide in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// All directions, in the order used by [`Board::legal_moves`].
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Convert a u8 to a Direction (0=Up, 1=Down, 2=Left, 3=Right).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    /// Position of this direction in [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Rows move for left/right, columns for up/down.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Right and down walk their lines backwards.
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no direction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}
