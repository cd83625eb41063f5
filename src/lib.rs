//! Breakout - A block-breaking arcade game core
//!
//! Core modules:
//! - `sim`: Simulation (ball physics, collisions, pieces, level grid, trackers)
//! - `game`: The game core that drives `sim` and talks to the collaborators
//! - `levels`: Level file parsing and level sources
//! - `highscores`: High-score stores
//! - `config`: Immutable game configuration

pub mod config;
pub mod game;
pub mod highscores;
pub mod levels;
pub mod sim;

pub use config::GameConfig;
pub use game::{AdminCommand, Command, Game};
pub use highscores::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
pub use levels::{DirLevelSource, LevelSource, StaticLevels, parse_level};
pub use sim::LevelLayout;

/// Game configuration defaults
pub mod consts {
    /// Nominal simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Window dimensions
    pub const WINDOW_WIDTH: f32 = 600.0;
    pub const WINDOW_HEIGHT: f32 = 600.0;
    /// HUD bar across the top; acts as the ceiling of the playfield
    pub const HUD_HEIGHT: f32 = 40.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 12.0;
    pub const PADDLE_STEP: f32 = 20.0;
    /// Ticks the paddle is ignored after a bounce (prevents sticking)
    pub const PADDLE_COOLDOWN_TICKS: u32 = 6;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Upward speed given on launch (pixels/s)
    pub const LAUNCH_SPEED: f32 = 150.0;
    /// Horizontal launch speed per pixel of pointer offset from center
    pub const LAUNCH_AIM_FACTOR: f32 = 1.0;

    /// Block grid geometry
    pub const BLOCK_WIDTH: f32 = 54.0;
    pub const BLOCK_HEIGHT: f32 = 20.0;
    pub const BLOCK_GAP: f32 = 5.0;

    /// Player defaults
    pub const STARTING_LIVES: u32 = 3;
    pub const FIRST_LEVEL: u32 = 1;

    /// Power-ups
    pub const POWER_UP_PROBABILITY: f64 = 0.2;
    pub const EXPAND_PADDLE_FACTOR: f32 = 1.5;
    pub const SPEED_BALL_FACTOR: f32 = 1.25;
    pub const SLOW_BALL_FACTOR: f32 = 0.75;
}
