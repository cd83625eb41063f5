//! Score, lives, level and high-score counters
//!
//! The core owns these and writes them through narrow update calls. Front
//! ends only read them.

use serde::{Deserialize, Serialize};

/// Player score
///
/// `total` is cumulative. `streak` counts hits since the last lost ball and is
/// the only part cleared by [`Score::reset_bonus`]. `checkpoint` is the total
/// captured when a level was completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    total: u64,
    checkpoint: u64,
    streak: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn checkpoint(&self) -> u64 {
        self.checkpoint
    }

    /// One point per piece hit
    pub fn increase(&mut self) {
        self.total += 1;
        self.streak += 1;
    }

    /// Clear the streak; cumulative score is kept
    pub fn reset_bonus(&mut self) {
        self.streak = 0;
    }

    /// Remember the current total as the level baseline
    pub fn set_checkpoint(&mut self) {
        self.checkpoint = self.total;
    }

    /// Drop everything earned since the last checkpoint (level restart)
    pub fn reset_to_checkpoint(&mut self) {
        self.total = self.checkpoint;
        self.streak = 0;
    }
}

/// Remaining player lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lives(u32);

impl Lives {
    pub fn new(lives: u32) -> Self {
        Self(lives)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn add_life(&mut self) {
        self.0 += 1;
    }

    /// Floors at zero
    pub fn subtract_life(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Current level number (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level(u32);

impl Level {
    pub fn new(level: u32) -> Self {
        Self(level)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn increment(&mut self) {
        self.0 += 1;
    }

    pub fn set(&mut self, level: u32) {
        self.0 = level;
    }
}

/// Best score seen, with a flag telling the core it has not been persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    value: u64,
    #[serde(skip)]
    dirty: bool,
}

impl HighScore {
    pub fn new(value: u64) -> Self {
        Self {
            value,
            dirty: false,
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }

    /// Raise the high score if `score` beats it. Returns true if it changed.
    pub fn update(&mut self, score: u64) -> bool {
        if score > self.value {
            self.value = score;
            self.dirty = true;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.value = 0;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Value to persist, if it changed since the last call
    pub fn take_dirty(&mut self) -> Option<u64> {
        if self.dirty {
            self.dirty = false;
            Some(self.value)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bonus_and_checkpoint() {
        let mut score = Score::new();
        for _ in 0..5 {
            score.increase();
        }
        assert_eq!(score.total(), 5);
        assert_eq!(score.streak(), 5);

        score.reset_bonus();
        assert_eq!(score.total(), 5);
        assert_eq!(score.streak(), 0);

        score.set_checkpoint();
        score.increase();
        score.increase();
        score.reset_to_checkpoint();
        assert_eq!(score.total(), 5);
        assert_eq!(score.checkpoint(), 5);
    }

    #[test]
    fn test_lives_floor() {
        let mut lives = Lives::new(1);
        lives.subtract_life();
        lives.subtract_life();
        assert_eq!(lives.get(), 0);
        assert!(lives.is_empty());
        lives.add_life();
        assert_eq!(lives.get(), 1);
    }

    #[test]
    fn test_high_score_dirty_tracking() {
        let mut high = HighScore::new(10);
        assert!(!high.update(10));
        assert_eq!(high.take_dirty(), None);

        assert!(high.update(11));
        assert_eq!(high.get(), 11);
        assert_eq!(high.take_dirty(), Some(11));
        assert_eq!(high.take_dirty(), None);

        high.clear();
        assert_eq!(high.take_dirty(), Some(0));
    }
}
