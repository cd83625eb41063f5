//! Game core
//!
//! Owns the simulation state and the two collaborators: the level source and
//! the high-score store. The driver calls [`Game::step`] once per frame and
//! feeds player input through [`Game::handle`] between steps. Debug commands
//! go through [`Game::admin`], kept apart from normal play input.
//!
//! File I/O happens only at boundaries: level transitions, a lost ball, game
//! over, and admin commands. The per-tick physics in `sim` never touches it.

use anyhow::Context;

use crate::config::GameConfig;
use crate::highscores::HighScoreStore;
use crate::levels::LevelSource;
use crate::sim::{self, GameEvent, GamePhase, GameState, LevelGrid};

/// Player input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    /// Launch a docked ball, aimed by the pointer's x coordinate
    Launch { x: f32 },
}

/// Debug and cheat commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// Reload the current level and drop the points earned on it
    ResetLevel,
    TogglePause,
    AddLife,
    /// Knock out every piece; the level counts as passed on the next step
    ClearLevel,
    /// Knock out the lowest live piece
    DamageOneBlock,
    ClearHighScore,
    /// Every live piece loses one life
    DamageAllBlocks,
    JumpToLevel(u32),
}

pub struct Game {
    config: GameConfig,
    state: GameState,
    levels: Box<dyn LevelSource>,
    high_scores: Box<dyn HighScoreStore>,
}

impl Game {
    /// Start a game on the configured first level.
    ///
    /// Fails only if the first level cannot be loaded.
    pub fn new(
        config: GameConfig,
        levels: Box<dyn LevelSource>,
        high_scores: Box<dyn HighScoreStore>,
    ) -> anyhow::Result<Self> {
        for warning in config.validate() {
            log::warn!("Config: {warning}");
        }
        let grid = load_grid(levels.as_ref(), &config, config.first_level)
            .context("loading the first level")?;
        let high_score = high_scores.read_high_score();
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("Game initialized with seed: {}", seed);

        let state = GameState::new(&config, grid, high_score, seed);
        Ok(Self {
            config,
            state,
            levels,
            high_scores,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Advance one tick of `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let phase_before = self.state.phase;
        let lives_before = self.state.lives.get();

        sim::tick(&mut self.state, &self.config, dt);

        if self.state.phase != phase_before {
            log::info!("Phase {:?} -> {:?}", phase_before, self.state.phase);
            if self.state.phase == GamePhase::LevelCleared {
                self.advance_level();
            }
            self.flush_high_score();
        } else if self.state.lives.get() != lives_before {
            self.flush_high_score();
        }
    }

    /// Apply player input. Ignored unless the game is running.
    pub fn handle(&mut self, command: Command) {
        if self.state.phase != GamePhase::Running {
            return;
        }
        match command {
            Command::MoveLeft => self.move_paddle(-self.config.paddle_step),
            Command::MoveRight => self.move_paddle(self.config.paddle_step),
            Command::Launch { x } => self.launch(x),
        }
    }

    fn move_paddle(&mut self, delta: f32) {
        let moved = self.state.paddle.move_by(delta, self.config.window_width);
        // A ball sitting on the paddle goes with it
        if self.state.ball.is_at_rest() {
            self.state.ball.pos.x += moved;
        }
    }

    fn launch(&mut self, x: f32) {
        if !self.state.ball.is_docked() {
            return;
        }
        let vx = (x - self.config.center_x()) * self.config.launch_aim_factor;
        self.state.ball.set_velocity(vx, -self.config.launch_speed);
        self.state.push_event(GameEvent::Launched);
    }

    /// Apply a debug command
    pub fn admin(&mut self, command: AdminCommand) {
        log::debug!("Admin command {:?}", command);
        match command {
            AdminCommand::ResetLevel => self.reset_level(),
            AdminCommand::TogglePause => {
                self.state.phase = match self.state.phase {
                    GamePhase::Running => GamePhase::Paused,
                    GamePhase::Paused => GamePhase::Running,
                    other => other,
                };
            }
            AdminCommand::AddLife => {
                self.state.lives.add_life();
                let lives = self.state.lives.get();
                self.state.push_event(GameEvent::LivesChanged(lives));
            }
            AdminCommand::ClearLevel => self.state.grid.clear_all(),
            AdminCommand::DamageOneBlock => {
                sim::clear_lowest(&mut self.state);
            }
            AdminCommand::ClearHighScore => {
                self.state.high_score.clear();
                self.state.push_event(GameEvent::HighScoreChanged(0));
                self.flush_high_score();
            }
            AdminCommand::DamageAllBlocks => sim::damage_all(&mut self.state, &self.config),
            AdminCommand::JumpToLevel(level) => self.jump_to_level(level),
        }
    }

    /// Restart from the first level with full lives and no score.
    /// The high score, RNG and undrained events carry over.
    pub fn new_game(&mut self) -> anyhow::Result<()> {
        self.flush_high_score();
        let grid = load_grid(self.levels.as_ref(), &self.config, self.config.first_level)?;
        let high_score = self.state.high_score.get();
        let mut state = GameState::new(&self.config, grid, high_score, 0);
        std::mem::swap(&mut state.rng, &mut self.state.rng);
        for event in self.state.drain_events() {
            state.push_event(event);
        }
        self.state = state;

        let lives = self.state.lives.get();
        self.state
            .push_event(GameEvent::LevelChanged(self.config.first_level));
        self.state.push_event(GameEvent::ScoreChanged(0));
        self.state.push_event(GameEvent::LivesChanged(lives));
        self.state.push_event(GameEvent::HighScoreChanged(high_score));
        log::info!("New game started");
        Ok(())
    }

    /// Persist the high score if it changed. Failures are logged, never fatal.
    pub fn flush_high_score(&mut self) {
        if let Some(score) = self.state.high_score.take_dirty() {
            if let Err(e) = self.high_scores.write_high_score(score) {
                log::warn!("Failed to save high score: {e:#}");
            }
        }
    }

    fn advance_level(&mut self) {
        let current = self.state.level.get();
        if current >= self.levels.level_count() {
            self.state.reset_ball_paddle();
            self.state.phase = GamePhase::Complete;
            log::info!("All {} levels cleared", current);
            self.state.push_event(GameEvent::GameComplete);
            return;
        }

        let next = current + 1;
        match load_grid(self.levels.as_ref(), &self.config, next) {
            Ok(grid) => {
                self.state.grid = grid;
                self.state.score.set_checkpoint();
                self.state.level.increment();
                self.state.reset_ball_paddle();
                self.state.phase = GamePhase::Running;
                self.state.push_event(GameEvent::LevelChanged(next));
            }
            // Stay on the cleared level; an admin command can recover
            Err(e) => self.level_load_failed(next, e),
        }
    }

    fn reset_level(&mut self) {
        let level = self.state.level.get();
        match load_grid(self.levels.as_ref(), &self.config, level) {
            Ok(grid) => {
                self.state.grid = grid;
                self.state.reset_ball_paddle();
                self.state.score.reset_to_checkpoint();
                let total = self.state.score.total();
                self.state.push_event(GameEvent::ScoreChanged(total));
                if matches!(
                    self.state.phase,
                    GamePhase::LevelCleared | GamePhase::Complete
                ) {
                    self.state.phase = GamePhase::Running;
                }
            }
            Err(e) => self.level_load_failed(level, e),
        }
    }

    fn jump_to_level(&mut self, level: u32) {
        match load_grid(self.levels.as_ref(), &self.config, level) {
            Ok(grid) => {
                self.state.grid = grid;
                self.state.level.set(level);
                self.state.reset_ball_paddle();
                if self.state.phase != GamePhase::GameOver {
                    self.state.phase = GamePhase::Running;
                }
                self.state.push_event(GameEvent::LevelChanged(level));
            }
            Err(e) => self.level_load_failed(level, e),
        }
    }

    fn level_load_failed(&mut self, level: u32, error: anyhow::Error) {
        log::error!("Could not load level {}: {:#}", level, error);
        self.state.push_event(GameEvent::LevelLoadFailed {
            level,
            message: format!("{error:#}"),
        });
    }
}

fn load_grid(
    levels: &dyn LevelSource,
    config: &GameConfig,
    level: u32,
) -> anyhow::Result<LevelGrid> {
    let layout = levels.load_level(level)?;
    Ok(LevelGrid::from_layout(&layout, config))
}
