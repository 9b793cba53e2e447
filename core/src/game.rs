//! The game controller: one board plus the session around it.
//!
//! A session is `Playing` until no move is left, at which point it is
//! `GameOver` for good. Reaching the win value sets `won` without ending the
//! game. Each milestone the max tile passes earns one bonus tile, at most one
//! per move.

use std::collections::BTreeSet;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::board::Board;
use crate::bonus::BonusKind;
use crate::config::{ConfigError, GameConfig};
use crate::highscore::HighScoreStore;
use crate::Direction;

const INSTRUCTIONS: &str = "Controls:\n  \
    w / ↑  - up\n  \
    a / ←  - left\n  \
    s / ↓  - down\n  \
    d / →  - right\n  \
    q      - quit\n  \
    r      - new game";

/// Immutable view of a game, for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub grid: Vec<Vec<u32>>,
    pub score: u64,
    pub max_tile: u32,
    pub game_over: bool,
    pub won: bool,
    pub high_score: u64,
    pub board_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    /// Reached the win value; moves are still allowed.
    Won,
    GameOver,
}

/// Something the player should be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Won {
        tile: u32,
    },
    BonusGranted {
        milestone: u32,
        kind: BonusKind,
        row: usize,
        col: usize,
    },
    NoRoomForBonus {
        milestone: u32,
    },
    GameOver {
        score: u64,
    },
    NewHighScore {
        score: u64,
    },
}

pub struct Game<R = SmallRng> {
    board: Board<R>,
    config: GameConfig,
    store: Box<dyn HighScoreStore>,
    game_over: bool,
    won: bool,
    high_score: u64,
    recorded_milestones: BTreeSet<u32>,
    events: Vec<GameEvent>,
}

impl Game<SmallRng> {
    /// Start a new game seeded from `seed`.
    pub fn new(
        config: GameConfig,
        seed: u64,
        store: Box<dyn HighScoreStore>,
    ) -> Result<Self, ConfigError> {
        Game::with_rng(config, SmallRng::seed_from_u64(seed), store)
    }
}

impl<R: Rng> Game<R> {
    /// Start a new game driven by an injected generator.
    pub fn with_rng(
        config: GameConfig,
        rng: R,
        store: Box<dyn HighScoreStore>,
    ) -> Result<Self, ConfigError> {
        let board = Board::with_rng(&config, rng)?;
        Game::from_board(board, config, store)
    }

    /// Start a session on an existing board.
    pub fn from_board(
        board: Board<R>,
        config: GameConfig,
        store: Box<dyn HighScoreStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let high_score = load_high_score(store.as_ref());
        Ok(Game {
            board,
            config,
            store,
            game_over: false,
            won: false,
            high_score,
            recorded_milestones: BTreeSet::new(),
            events: Vec::new(),
        })
    }

    /// Play one move.
    ///
    /// Returns true if the board changed. A rejected move (after game over,
    /// or one that moves nothing) returns false; if nothing can move at all
    /// the game is over afterwards.
    pub fn move_tiles(&mut self, direction: Direction) -> bool {
        if self.game_over {
            return false;
        }

        if !self.board.move_tiles(direction) {
            if !self.board.can_move() {
                self.finish();
            }
            return false;
        }

        self.check_win();
        self.check_milestones();

        if !self.board.can_move() {
            self.finish();
        }
        true
    }

    /// Play a move given by name; unknown names are rejected without effect.
    pub fn move_named(&mut self, name: &str) -> bool {
        match name.parse::<Direction>() {
            Ok(direction) => self.move_tiles(direction),
            Err(_) => false,
        }
    }

    /// Persist the score if it beats the high score. Returns true on a new
    /// record. Saving failures are logged, never returned.
    pub fn save_high_score(&mut self) -> bool {
        let score = self.board.score();
        if score <= self.high_score {
            return false;
        }

        self.high_score = score;
        self.events.push(GameEvent::NewHighScore { score });
        info!(score, "new high score");
        if let Err(err) = self.store.save(score) {
            warn!(%err, "could not save high score");
        }
        true
    }

    /// Abandon this game and deal a fresh board. The current score is saved
    /// first if it is a record.
    pub fn restart(&mut self) {
        self.events.clear();
        self.save_high_score();
        self.board.reset();
        self.game_over = false;
        self.won = false;
        self.recorded_milestones.clear();
        info!("new game");
    }

    /// Drain the notifications produced since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> GameSnapshot {
        GameSnapshot {
            grid: self.board.rows(),
            score: self.board.score(),
            max_tile: self.board.max_tile(),
            game_over: self.game_over,
            won: self.won,
            high_score: self.high_score,
            board_size: self.board.size(),
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.game_over {
            GameStatus::GameOver
        } else if self.won {
            GameStatus::Won
        } else {
            GameStatus::Playing
        }
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    pub fn score(&self) -> u64 {
        self.board.score()
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn board(&self) -> &Board<R> {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Which moves would change the board, as [Up, Down, Left, Right].
    /// All false once the game is over.
    pub fn legal_moves(&self) -> [bool; 4] {
        if self.game_over {
            return [false; 4];
        }
        self.board.legal_moves()
    }

    pub fn recorded_milestones(&self) -> &BTreeSet<u32> {
        &self.recorded_milestones
    }

    pub fn instructions() -> &'static str {
        INSTRUCTIONS
    }

    // -------------------------------------------------------------------------
    // Private methods
    // -------------------------------------------------------------------------

    fn check_win(&mut self) {
        let max_tile = self.board.max_tile();
        if self.won || max_tile < self.config.win_value {
            return;
        }
        self.won = true;
        self.events.push(GameEvent::Won { tile: max_tile });
        info!(max_tile, goal = self.config.win_value, "goal reached");
    }

    /// Grant one bonus tile for the lowest milestone reached but not yet
    /// rewarded. Later milestones wait for later moves.
    fn check_milestones(&mut self) {
        let max_tile = self.board.max_tile();
        let Some(milestone) = self
            .config
            .milestones
            .iter()
            .copied()
            .find(|m| max_tile >= *m && !self.recorded_milestones.contains(m))
        else {
            return;
        };
        self.recorded_milestones.insert(milestone);

        let Some((row, col)) = self.board.random_empty_cell() else {
            info!(milestone, "no room for bonus tile");
            self.events.push(GameEvent::NoRoomForBonus { milestone });
            return;
        };

        let kind = BonusKind::random(self.board.rng_mut());
        self.board.place_tile(row, col, kind.value());
        info!(milestone, ?kind, row, col, "bonus tile granted");
        self.events.push(GameEvent::BonusGranted {
            milestone,
            kind,
            row,
            col,
        });
    }

    fn finish(&mut self) {
        self.game_over = true;
        let score = self.board.score();
        self.events.push(GameEvent::GameOver { score });
        info!(score, "game over");
        self.save_high_score();
    }
}

fn load_high_score(store: &dyn HighScoreStore) -> u64 {
    match store.load() {
        Ok(score) => score.unwrap_or(0),
        Err(err) => {
            warn!(%err, "could not read high score, starting from 0");
            0
        }
    }
}
