//! High score persistence
//!
//! A single integer, read once at startup and rewritten whenever the core
//! flushes a new best. A missing or unreadable store reads as 0.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Where the best score is kept between sessions
pub trait HighScoreStore {
    /// Stored high score; 0 if there is none or it cannot be read
    fn read_high_score(&self) -> u64;

    fn write_high_score(&self, score: u64) -> anyhow::Result<()>;
}

/// High score kept in a plain text file
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn read_high_score(&self) -> u64 {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                log::info!(
                    "No high score at {} ({}), starting fresh",
                    self.path.display(),
                    e
                );
                return 0;
            }
        };
        match text.trim().parse() {
            Ok(score) => {
                log::info!("Loaded high score {} from {}", score, self.path.display());
                score
            }
            Err(e) => {
                log::warn!(
                    "Ignoring corrupt high score file {}: {}",
                    self.path.display(),
                    e
                );
                0
            }
        }
    }

    fn write_high_score(&self, score: u64) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, format!("{score}\n"))
            .with_context(|| format!("writing high score to {}", self.path.display()))?;
        log::info!("High score {} saved", score);
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryHighScoreStore {
    score: Cell<u64>,
    writes: Cell<u32>,
}

impl MemoryHighScoreStore {
    pub fn new(score: u64) -> Self {
        Self {
            score: Cell::new(score),
            writes: Cell::new(0),
        }
    }

    /// Number of writes so far
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn read_high_score(&self) -> u64 {
        self.score.get()
    }

    fn write_high_score(&self, score: u64) -> anyhow::Result<()> {
        self.score.set(score);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl<T: HighScoreStore + ?Sized> HighScoreStore for std::rc::Rc<T> {
    fn read_high_score(&self) -> u64 {
        (**self).read_high_score()
    }

    fn write_high_score(&self, score: u64) -> anyhow::Result<()> {
        (**self).write_high_score(score)
    }
}
