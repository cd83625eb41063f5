//! Level sources
//!
//! A level file is plain text: one row of blocks per line, each row a
//! whitespace-separated list of non-negative integers giving each block's
//! starting lives (0 = empty cell). Blank lines are ignored. Every row must
//! have as many entries as the first.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

pub use crate::sim::LevelLayout;

/// Where levels come from
pub trait LevelSource {
    /// Load level `level` (1-based)
    fn load_level(&self, level: u32) -> anyhow::Result<LevelLayout>;

    /// Number of levels available; levels are numbered `1..=level_count()`
    fn level_count(&self) -> u32;
}

/// Parse the text of a level file
pub fn parse_level(text: &str) -> anyhow::Result<LevelLayout> {
    let mut lives = Vec::new();
    let mut rows = 0;
    let mut cols = 0;

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut count = 0;
        for (col, token) in line.split_whitespace().enumerate() {
            let value: u32 = token.parse().with_context(|| {
                format!(
                    "line {}, column {}: '{}' is not a non-negative integer",
                    line_no + 1,
                    col + 1,
                    token
                )
            })?;
            lives.push(value);
            count += 1;
        }
        if rows == 0 {
            cols = count;
        } else if count != cols {
            bail!(
                "line {}: expected {} columns, found {}",
                line_no + 1,
                cols,
                count
            );
        }
        rows += 1;
    }

    if rows == 0 {
        bail!("level has no rows");
    }
    Ok(LevelLayout { rows, cols, lives })
}

/// Levels stored as `level<N>.txt` files in a directory
#[derive(Debug, Clone)]
pub struct DirLevelSource {
    dir: PathBuf,
}

impl DirLevelSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn level_path(&self, level: u32) -> PathBuf {
        self.dir.join(format!("level{level}.txt"))
    }
}

impl LevelSource for DirLevelSource {
    fn load_level(&self, level: u32) -> anyhow::Result<LevelLayout> {
        let path = self.level_path(level);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading level {} from {}", level, path.display()))?;
        let layout = parse_level(&text)
            .with_context(|| format!("parsing level {} from {}", level, path.display()))?;
        log::info!(
            "Loaded level {} ({}x{}) from {}",
            level,
            layout.rows,
            layout.cols,
            path.display()
        );
        Ok(layout)
    }

    /// Counts contiguous level files starting at level 1
    fn level_count(&self) -> u32 {
        let mut count = 0;
        while self.level_path(count + 1).is_file() {
            count += 1;
        }
        count
    }
}

/// Levels held in memory as level-file text
#[derive(Debug, Clone, Default)]
pub struct StaticLevels {
    levels: Vec<String>,
}

impl StaticLevels {
    pub fn new<S: Into<String>>(levels: impl IntoIterator<Item = S>) -> Self {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    /// Levels shipped with the game
    pub fn builtin() -> Self {
        Self::new([
            include_str!("../levels/level1.txt"),
            include_str!("../levels/level2.txt"),
            include_str!("../levels/level3.txt"),
        ])
    }
}

impl LevelSource for StaticLevels {
    fn load_level(&self, level: u32) -> anyhow::Result<LevelLayout> {
        let Some(text) = level
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
        else {
            bail!("no level {} (have {})", level, self.levels.len());
        };
        parse_level(text).with_context(|| format!("parsing built-in level {level}"))
    }

    fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }
}
