//! Game state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{self, Axis};
use super::grid::LevelGrid;
use super::piece::{PowerUpKind, PowerUpRegistry};
use super::rect::Rect;
use super::trackers::{HighScore, Level, Lives, Score};
use crate::config::GameConfig;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay (ball may still be docked)
    Running,
    /// Physics frozen, status still evaluated
    Paused,
    /// Every piece is gone; waiting for the next level to load
    LevelCleared,
    /// Out of lives
    GameOver,
    /// Last level cleared
    Complete,
}

/// Things that happened during a tick or command, for the driver to render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Launched,
    PaddleHit,
    WallHit,
    PieceHit { row: usize, col: usize, lives: u32 },
    PieceDestroyed { row: usize, col: usize },
    PowerUpSpawned { row: usize, col: usize, kind: PowerUpKind },
    PowerUpCollected(PowerUpKind),
    BallLost,
    ScoreChanged(u64),
    LivesChanged(u32),
    LevelChanged(u32),
    HighScoreChanged(u64),
    /// "level passed"
    LevelPassed(u32),
    /// "out of lives"
    OutOfLives,
    /// "game complete"
    GameComplete,
    LevelLoadFailed { level: u32, message: String },
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Where `reset` puts the ball
    pub start: Vec2,
    /// Ticks before the paddle can be hit again (prevents sticking)
    #[serde(default)]
    pub paddle_cooldown: u32,
}

impl Ball {
    pub fn new(start: Vec2, radius: f32) -> Self {
        Self {
            pos: start,
            vel: Vec2::ZERO,
            radius,
            start,
            paddle_cooldown: 0,
        }
    }

    /// Back to the start position, at rest
    pub fn reset(&mut self) {
        self.pos = self.start;
        self.vel = Vec2::ZERO;
        self.paddle_cooldown = 0;
    }

    pub fn set_velocity(&mut self, vx: f32, vy: f32) {
        self.vel = Vec2::new(vx, vy);
    }

    /// Integrate position over `dt` seconds
    pub fn update_position(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Bounce off a rectangle the ball overlaps. Returns the flipped axis.
    pub fn resolve_collision(&mut self, rect: &Rect) -> Option<Axis> {
        let axis = collision::penetration_axis(&self.bounds(), rect)?;
        self.vel = collision::reflect(self.vel, axis);
        Some(axis)
    }

    pub fn reverse_x(&mut self) {
        self.vel.x = -self.vel.x;
    }

    pub fn reverse_y(&mut self) {
        self.vel.y = -self.vel.y;
    }

    pub fn scale_velocity(&mut self, factor: f32) {
        self.vel *= factor;
    }

    /// True if either velocity component is zero; such a ball follows the paddle
    pub fn is_at_rest(&self) -> bool {
        self.vel.x == 0.0 || self.vel.y == 0.0
    }

    /// True if the ball has no velocity at all and can be launched
    pub fn is_docked(&self) -> bool {
        self.vel == Vec2::ZERO
    }

    pub fn left(&self) -> f32 {
        self.pos.x - self.radius
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.radius
    }

    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }

    /// Bounding box used for all intersection tests
    pub fn bounds(&self) -> Rect {
        Rect::new(self.left(), self.top(), self.radius * 2.0, self.radius * 2.0)
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub rect: Rect,
    /// Top-left corner restored by `reset`
    pub start: Vec2,
}

impl Paddle {
    pub fn new(start: Vec2, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(start.x, start.y, width, height),
            start,
        }
    }

    /// Move horizontally, staying inside `[0, window_width]`.
    /// Returns the distance actually moved.
    pub fn move_by(&mut self, delta: f32, window_width: f32) -> f32 {
        let max_x = (window_width - self.rect.width()).max(0.0);
        let old_x = self.rect.pos.x;
        self.rect.pos.x = (old_x + delta).clamp(0.0, max_x);
        self.rect.pos.x - old_x
    }

    /// Back to the start position; width is kept
    pub fn reset(&mut self) {
        self.rect.pos = self.start;
    }

    /// Scale width around the left edge, capped at the window width and
    /// shifted back inside the window if it now overhangs
    pub fn scale_width(&mut self, factor: f32, window_width: f32) {
        let width = (self.rect.width() * factor).min(window_width);
        self.rect.size.x = width;
        self.move_by(0.0, window_width);
    }

    pub fn center_x(&self) -> f32 {
        self.rect.center().x
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Current phase
    pub phase: GamePhase,
    pub ball: Ball,
    pub paddle: Paddle,
    /// Pieces of the current level
    pub grid: LevelGrid,
    pub score: Score,
    pub lives: Lives,
    pub level: Level,
    pub high_score: HighScore,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Power-ups a destroyed block can turn into
    #[serde(skip)]
    pub registry: PowerUpRegistry,
    /// Seeded RNG for power-up rolls
    #[serde(skip)]
    pub rng: Pcg32,
    /// Events not yet drained by the driver
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh state for `grid`, with ball and paddle at their start positions
    pub fn new(config: &GameConfig, grid: LevelGrid, high_score: u64, seed: u64) -> Self {
        let paddle_start = Vec2::new(
            config.center_x() - config.paddle_width / 2.0,
            config.window_height - config.paddle_height,
        );
        // One pixel above the paddle
        let ball_start = Vec2::new(
            config.center_x(),
            config.window_height - config.ball_radius - config.paddle_height - 1.0,
        );

        Self {
            phase: GamePhase::Running,
            ball: Ball::new(ball_start, config.ball_radius),
            paddle: Paddle::new(paddle_start, config.paddle_width, config.paddle_height),
            grid,
            score: Score::new(),
            lives: Lives::new(config.starting_lives),
            level: Level::new(config.first_level),
            high_score: HighScore::new(high_score),
            time_ticks: 0,
            registry: PowerUpRegistry::from_names(&config.power_ups),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn reset_ball_paddle(&mut self) {
        self.ball.reset();
        self.paddle.reset();
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }
}
