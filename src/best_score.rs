use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::GameError;

pub const DEFAULT_BEST_SCORE_FILE: &str = "best_score.txt";

/// Best score kept as a decimal number in a plain text file.
#[derive(Clone, Debug)]
pub struct BestScoreStore {
    path: PathBuf,
}

impl BestScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored score. A missing file counts as 0.
    pub fn load(&self) -> Result<u64, GameError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        let trimmed = contents.trim();
        trimmed
            .parse()
            .map_err(|_| GameError::Parse(trimmed.to_string()))
    }

    pub fn load_or_default(&self) -> u64 {
        self.load().unwrap_or_else(|err| {
            warn!("ignoring best score in {}: {}", self.path.display(), err);
            0
        })
    }

    pub fn save(&self, score: u64) -> Result<(), GameError> {
        fs::write(&self.path, score.to_string())?;
        Ok(())
    }
}

impl Default for BestScoreStore {
    fn default() -> Self {
        Self::new(DEFAULT_BEST_SCORE_FILE)
    }
}
