//! High-score persistence.
//!
//! The score lives outside the game as a single plain integer. Stores report
//! failures as [`HighScoreError`]; the game controller treats any failure
//! (and a missing score) as "no record yet" and keeps playing.

use std::cell::Cell;
use std::fs;
use std::io;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(thiserror::Error, Debug)]
pub enum HighScoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("high score {contents:?} is not a number: {source}")]
    Parse {
        contents: String,
        source: ParseIntError,
    },
}

/// Somewhere to load and save the best score.
pub trait HighScoreStore {
    /// The stored score, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<u64>, HighScoreError>;

    fn save(&mut self, score: u64) -> Result<(), HighScoreError>;
}

/// A text file holding one integer.
#[derive(Debug, Clone)]
pub struct FileHighScore {
    path: PathBuf,
}

impl FileHighScore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileHighScore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScore {
    fn load(&self) -> Result<Option<u64>, HighScoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let trimmed = contents.trim();
        trimmed
            .parse::<u64>()
            .map(Some)
            .map_err(|source| HighScoreError::Parse {
                contents: trimmed.to_string(),
                source,
            })
    }

    fn save(&mut self, score: u64) -> Result<(), HighScoreError> {
        fs::write(&self.path, score.to_string())?;
        Ok(())
    }
}

/// In-memory store. Clones share the same slot, so a caller can keep a
/// handle to inspect what the game saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScore {
    value: Rc<Cell<Option<u64>>>,
}

impl MemoryHighScore {
    pub fn with_score(score: u64) -> Self {
        MemoryHighScore {
            value: Rc::new(Cell::new(Some(score))),
        }
    }

    pub fn get(&self) -> Option<u64> {
        self.value.get()
    }
}

impl HighScoreStore for MemoryHighScore {
    fn load(&self) -> Result<Option<u64>, HighScoreError> {
        Ok(self.value.get())
    }

    fn save(&mut self, score: u64) -> Result<(), HighScoreError> {
        self.value.set(Some(score));
        Ok(())
    }
}
