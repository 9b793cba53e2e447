//! The grid engine: cell matrix, spawning, sliding and the terminal test.

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::bonus::BonusKind;
use crate::config::{ConfigError, GameConfig};
use crate::line::{is_mergeable, shift_and_merge};
use crate::Direction;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("board must have at least one row")]
    Empty,
    #[error("row {row} has {len} cells, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("cell ({row}, {col}) holds {value}, which is not a tile")]
    InvalidTile { row: usize, col: usize, value: u32 },
}

/// An NxN grid of tiles.
///
/// Cells are stored row-major in a flat vector (index `row * size + col`).
/// Empty cells are 0; tiles hold a power of two >= 2 or a bonus value.
/// The board owns the game's only random generator.
#[derive(Clone)]
pub struct Board<R = SmallRng> {
    size: usize,
    cells: Vec<u32>,
    score: u64,
    max_tile: u32,
    spawn_two_probability: f64,
    initial_tiles: usize,
    rng: R,
}

impl Board<SmallRng> {
    /// Create a board seeded from `seed`, with the configured starting tiles.
    pub fn new(config: &GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Board::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Board<R> {
    /// Create a board driven by an injected generator.
    pub fn with_rng(config: &GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut board = Board {
            size: config.board_size,
            cells: vec![0; config.board_size * config.board_size],
            score: 0,
            max_tile: 0,
            spawn_two_probability: config.spawn_two_probability,
            initial_tiles: config.initial_tiles,
            rng,
        };
        board.spawn_initial_tiles();
        Ok(board)
    }

    /// Build a board from explicit rows. The size comes from the rows, not
    /// the config; no tiles are spawned.
    pub fn from_rows(rows: &[Vec<u32>], config: &GameConfig, rng: R) -> Result<Self, BoardError> {
        config.validate()?;
        let size = rows.len();
        if size == 0 {
            return Err(BoardError::Empty);
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(BoardError::NotSquare {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            for (col, &value) in values.iter().enumerate() {
                if !is_valid_cell(value) {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
                cells.push(value);
            }
        }

        let max_tile = cells.iter().copied().max().unwrap_or(0);
        Ok(Board {
            size,
            cells,
            score: 0,
            max_tile,
            spawn_two_probability: config.spawn_two_probability,
            initial_tiles: config.initial_tiles,
            rng,
        })
    }

    /// Clear the grid and score and lay down fresh starting tiles.
    /// The generator keeps its state.
    pub fn reset(&mut self) {
        self.cells.fill(0);
        self.score = 0;
        self.max_tile = 0;
        self.spawn_initial_tiles();
    }

    /// Place a 2 (or, less often, a 4) on a uniformly chosen empty cell.
    /// Returns false only when the grid is full.
    pub fn spawn_random_tile(&mut self) -> bool {
        let Some((row, col)) = self.random_empty_cell() else {
            return false;
        };

        let value = if self.rng.gen::<f64>() < self.spawn_two_probability {
            2
        } else {
            4
        };
        self.cells[row * self.size + col] = value;
        self.max_tile = self.max_tile.max(value);
        true
    }

    /// Slide every line in `direction`, spawning one tile if anything moved.
    /// Returns whether the board changed.
    pub fn move_tiles(&mut self, direction: Direction) -> bool {
        let old_cells = self.cells.clone();
        let old_score = self.score;

        self.score += Self::slide(&mut self.cells, self.size, direction);

        let changed = self.cells != old_cells || self.score != old_score;
        if changed {
            self.spawn_random_tile();
            self.max_tile = self.cells.iter().copied().max().unwrap_or(0);
        }

        debug!(%direction, changed, score = self.score, "board move");
        changed
    }

    /// Like [`Board::move_tiles`] but takes a direction name. Unknown names
    /// leave the board untouched and return false.
    pub fn move_named(&mut self, name: &str) -> bool {
        match name.parse::<Direction>() {
            Ok(direction) => self.move_tiles(direction),
            Err(_) => false,
        }
    }

    /// Coordinates of empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }

    /// Whether any move is still possible: an empty cell, or two equal
    /// mergeable tiles side by side. Checking right and below covers all
    /// four neighbours.
    pub fn can_move(&self) -> bool {
        if self.cells.contains(&0) {
            return true;
        }

        let n = self.size;
        for row in 0..n {
            for col in 0..n {
                let current = self.cells[row * n + col];
                if !is_mergeable(current) {
                    continue;
                }
                if col + 1 < n && self.cells[row * n + col + 1] == current {
                    return true;
                }
                if row + 1 < n && self.cells[(row + 1) * n + col] == current {
                    return true;
                }
            }
        }

        false
    }

    /// Whether moving in `direction` would change the board. Spawns nothing.
    pub fn would_change(&self, direction: Direction) -> bool {
        let mut test_cells = self.cells.clone();
        Self::slide(&mut test_cells, self.size, direction) > 0 || test_cells != self.cells
    }

    /// Which moves would change the board, as [Up, Down, Left, Right].
    pub fn legal_moves(&self) -> [bool; 4] {
        Direction::ALL.map(|direction| self.would_change(direction))
    }

    /// Write `value` into an empty cell. Returns false if the cell is
    /// occupied or out of range.
    pub fn place_tile(&mut self, row: usize, col: usize, value: u32) -> bool {
        if row >= self.size || col >= self.size {
            return false;
        }
        let cell = &mut self.cells[row * self.size + col];
        if *cell != 0 {
            return false;
        }
        *cell = value;
        self.max_tile = self.max_tile.max(value);
        true
    }

    /// A uniformly chosen empty cell, if any.
    pub fn random_empty_cell(&mut self) -> Option<(usize, usize)> {
        let empty_cells = self.empty_cells();
        if empty_cells.is_empty() {
            return None;
        }
        Some(empty_cells[self.rng.gen_range(0..empty_cells.len())])
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cell values.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(self.cells[row * self.size + col])
    }

    /// An owned copy of the grid, one `Vec` per row.
    pub fn rows(&self) -> Vec<Vec<u32>> {
        if self.size == 0 {
            return Vec::new();
        }
        self.cells.chunks(self.size).map(<[u32]>::to_vec).collect()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn max_tile(&self) -> u32 {
        self.max_tile
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    // -------------------------------------------------------------------------
    // Private methods
    // -------------------------------------------------------------------------

    fn spawn_initial_tiles(&mut self) {
        for _ in 0..self.initial_tiles {
            self.spawn_random_tile();
        }
    }

    /// Slide a whole grid in `direction`, returning the points earned.
    fn slide(cells: &mut [u32], size: usize, direction: Direction) -> u64 {
        let mut total_reward = 0;
        let mut line = vec![0; size];

        for k in 0..size {
            let indices: Vec<usize> = (0..size).map(|i| line_index(size, direction, k, i)).collect();
            for (slot, &idx) in line.iter_mut().zip(&indices) {
                *slot = cells[idx];
            }
            total_reward += shift_and_merge(&mut line);
            for (&value, &idx) in line.iter().zip(&indices) {
                cells[idx] = value;
            }
        }

        total_reward
    }
}

/// Flat index of the `i`-th cell of line `k`, counted from the edge the
/// tiles move toward.
fn line_index(size: usize, direction: Direction, k: usize, i: usize) -> usize {
    let i = if direction.is_reversed() { size - 1 - i } else { i };
    if direction.is_horizontal() {
        k * size + i
    } else {
        i * size + k
    }
}

fn is_valid_cell(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two()) || BonusKind::is_bonus_value(value)
}

impl<R> fmt::Debug for Board<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{ score: {}, max_tile: {} }}",
            self.score, self.max_tile
        )?;
        for row in 0..self.size {
            for col in 0..self.size {
                let val = self.cells[row * self.size + col];
                if val == 0 {
                    write!(f, "    .")?;
                } else {
                    write!(f, "{:5}", val)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<R> fmt::Display for Board<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}", "------+".repeat(self.size));
        writeln!(f, "Score: {}", self.score)?;
        writeln!(f, "{}", border)?;
        for row in 0..self.size {
            write!(f, "|")?;
            for col in 0..self.size {
                let val = self.cells[row * self.size + col];
                match BonusKind::from_value(val) {
                    _ if val == 0 => write!(f, "      |")?,
                    Some(kind) => write!(f, "{:^6}|", kind.symbol())?,
                    None => write!(f, "{:^6}|", val)?,
                }
            }
            writeln!(f)?;
            writeln!(f, "{}", border)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
