//! Game configuration
//!
//! A single immutable value constructed once at startup and passed by
//! reference to everything that needs window geometry, speeds or odds.
//! Persisted as JSON; missing fields fall back to the defaults in `consts`.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::PowerUpKind;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Window ===
    pub window_width: f32,
    pub window_height: f32,
    /// Height of the HUD bar; the ball bounces off its lower edge
    pub hud_height: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Distance moved per move command
    pub paddle_step: f32,
    pub paddle_cooldown_ticks: u32,

    // === Ball ===
    pub ball_radius: f32,
    pub launch_speed: f32,
    pub launch_aim_factor: f32,

    // === Blocks ===
    pub block_width: f32,
    pub block_height: f32,
    pub block_gap: f32,

    // === Rules ===
    pub starting_lives: u32,
    pub first_level: u32,

    // === Power-ups ===
    /// Chance that a destroyed block leaves a power-up behind
    pub power_up_probability: f64,
    /// Names of the power-ups in the spawn registry
    pub power_ups: Vec<String>,
    pub expand_paddle_factor: f32,
    pub speed_ball_factor: f32,
    pub slow_ball_factor: f32,

    // === Simulation ===
    pub sim_dt: f32,
    /// RNG seed for power-up rolls (None = seeded from the clock by the driver)
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            hud_height: HUD_HEIGHT,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_step: PADDLE_STEP,
            paddle_cooldown_ticks: PADDLE_COOLDOWN_TICKS,

            ball_radius: BALL_RADIUS,
            launch_speed: LAUNCH_SPEED,
            launch_aim_factor: LAUNCH_AIM_FACTOR,

            block_width: BLOCK_WIDTH,
            block_height: BLOCK_HEIGHT,
            block_gap: BLOCK_GAP,

            starting_lives: STARTING_LIVES,
            first_level: FIRST_LEVEL,

            power_up_probability: POWER_UP_PROBABILITY,
            power_ups: PowerUpKind::ALL.iter().map(|k| k.name().to_string()).collect(),
            expand_paddle_factor: EXPAND_PADDLE_FACTOR,
            speed_ball_factor: SPEED_BALL_FACTOR,
            slow_ball_factor: SLOW_BALL_FACTOR,

            sim_dt: SIM_DT,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse a config from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load a config, falling back to defaults. Returns the fallback reason if any.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(path) {
            Ok(config) => (config, None),
            Err(e) => {
                let reason = format!("{e:#}");
                log::warn!("Using default config: {reason}");
                (Self::default(), Some(reason))
            }
        }
    }

    /// Write the config as pretty JSON
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing config {}", path.display()))
    }

    /// Human-readable problems with this config. Empty means it is sane.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let positive = [
            ("window_width", self.window_width),
            ("window_height", self.window_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_step", self.paddle_step),
            ("ball_radius", self.ball_radius),
            ("launch_speed", self.launch_speed),
            ("block_width", self.block_width),
            ("block_height", self.block_height),
            ("sim_dt", self.sim_dt),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                warnings.push(format!("{name} must be positive (got {value})"));
            }
        }
        if self.hud_height < 0.0 || self.hud_height >= self.window_height {
            warnings.push(format!(
                "hud_height {} must lie within the window height {}",
                self.hud_height, self.window_height
            ));
        }
        if self.paddle_width > self.window_width {
            warnings.push(format!(
                "paddle_width {} exceeds window_width {}",
                self.paddle_width, self.window_width
            ));
        }
        if !(0.0..=1.0).contains(&self.power_up_probability) {
            warnings.push(format!(
                "power_up_probability {} is outside [0, 1]",
                self.power_up_probability
            ));
        }
        for name in &self.power_ups {
            if PowerUpKind::from_name(name).is_none() {
                warnings.push(format!("unknown power-up '{name}'"));
            }
        }
        if self.block_gap < 0.0 {
            warnings.push(format!("block_gap must not be negative (got {})", self.block_gap));
        }
        if self.first_level == 0 {
            warnings.push("first_level is 0; levels are numbered from 1".to_string());
        }
        if self.starting_lives == 0 {
            warnings.push("starting_lives is 0; the game is over before it starts".to_string());
        }
        warnings
    }

    /// Horizontal center of the window (launch aim reference)
    pub fn center_x(&self) -> f32 {
        self.window_width / 2.0
    }
}
