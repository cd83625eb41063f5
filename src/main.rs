//! Breakout headless driver
//!
//! Runs the game core at a fixed timestep with a simple autopilot standing in
//! for the player, and logs what happens. Rendering is left to front ends.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use breakout::consts::MAX_SUBSTEPS;
use breakout::sim::{GameEvent, GamePhase};
use breakout::{
    Command, DirLevelSource, FileHighScoreStore, Game, GameConfig, LevelSource, StaticLevels,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless breakout simulation", long_about = None)]
struct Cli {
    /// Directory of level<N>.txt files (built-in levels if omitted)
    #[arg(long)]
    levels: Option<PathBuf>,
    /// JSON config file; defaults are used if missing
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "highscore.txt")]
    high_score: PathBuf,
    /// Maximum simulation ticks to run
    #[arg(long, default_value_t = 36_000)]
    ticks: u64,
    /// Wall-clock length of one driver frame in milliseconds
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f32,
    /// Overrides the config seed
    #[arg(long)]
    seed: Option<u64>,
    /// Print the final state as JSON
    #[arg(long)]
    snapshot: bool,
    #[arg(long, short)]
    verbose: bool,
}

/// Fixed-timestep loop around the game core
struct Driver {
    game: Game,
    accumulator: f32,
    ticks: u64,
}

impl Driver {
    fn new(game: Game) -> Self {
        Self {
            game,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    /// Run one frame of `dt` seconds. Returns false once the game is over.
    fn update(&mut self, dt: f32) -> bool {
        let sim_dt = self.game.config().sim_dt;
        self.accumulator += dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= sim_dt && substeps < MAX_SUBSTEPS {
            self.autopilot();
            self.game.step(sim_dt);
            self.accumulator -= sim_dt;
            self.ticks += 1;
            substeps += 1;

            for event in self.game.drain_events() {
                log_event(&event);
            }
            if matches!(
                self.game.phase(),
                GamePhase::GameOver | GamePhase::Complete
            ) {
                return false;
            }
        }
        true
    }

    /// Launch when docked, otherwise chase the ball
    fn autopilot(&mut self) {
        let state = self.game.state();
        let ball_x = state.ball.pos.x;
        let paddle_x = state.paddle.center_x();

        if state.ball.is_docked() {
            // Off center, or the ball just bounces straight up and down
            let offset = if self.ticks % 2 == 0 { 40.0 } else { -40.0 };
            let aim = self.game.config().center_x() + offset;
            self.game.handle(Command::Launch { x: aim });
            return;
        }

        let margin = self.game.config().paddle_step / 2.0;
        if ball_x < paddle_x - margin {
            self.game.handle(Command::MoveLeft);
        } else if ball_x > paddle_x + margin {
            self.game.handle(Command::MoveRight);
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::LevelPassed(level) => log::info!("Level {level} passed"),
        GameEvent::OutOfLives => log::info!("Out of lives"),
        GameEvent::GameComplete => log::info!("Game complete"),
        GameEvent::LevelLoadFailed { level, message } => {
            log::error!("Level {level} failed to load: {message}")
        }
        GameEvent::LevelChanged(level) => log::info!("Now on level {level}"),
        GameEvent::PowerUpCollected(kind) => log::info!("Collected {}", kind.name()),
        other => log::trace!("{:?}", other),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.frame_ms <= 0.0 {
        anyhow::bail!("--frame-ms must be positive");
    }

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    log::info!("Breakout (headless) starting...");

    let mut config = match &cli.config {
        Some(path) => {
            let (config, warning) = GameConfig::load_or_default(path);
            if let Some(warning) = warning {
                log::warn!("{warning}");
            }
            config
        }
        None => GameConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let levels: Box<dyn LevelSource> = match &cli.levels {
        Some(dir) => {
            let source = DirLevelSource::new(dir);
            log::info!("{} levels in {}", source.level_count(), dir.display());
            Box::new(source)
        }
        None => Box::new(StaticLevels::builtin()),
    };
    let high_scores = Box::new(FileHighScoreStore::new(&cli.high_score));

    let game = Game::new(config, levels, high_scores).context("starting game")?;
    let mut driver = Driver::new(game);

    let frame_dt = cli.frame_ms / 1000.0;
    while driver.ticks < cli.ticks {
        if !driver.update(frame_dt) {
            break;
        }
    }
    driver.game.flush_high_score();

    let state = driver.game.state();
    log::info!(
        "Stopped after {} ticks: {:?}, level {}, score {}, high score {}, lives {}",
        driver.ticks,
        state.phase,
        state.level.get(),
        state.score.total(),
        state.high_score.get(),
        state.lives.get()
    );

    if cli.snapshot {
        println!("{}", serde_json::to_string_pretty(state)?);
    }
    Ok(())
}
