//! Simulation tick
//!
//! Advances the game state by one step. Order within a running tick:
//! paddle, borders, pieces, integrate, then status.

use rand::Rng;

use super::collision::border_contact;
use super::piece::PieceKind;
use super::state::{GameEvent, GamePhase, GameState};
use crate::config::GameConfig;

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, config: &GameConfig, dt: f32) {
    match state.phase {
        GamePhase::Running => {
            state.time_ticks += 1;
            resolve_paddle(state, config);
            resolve_borders(state, config);
            resolve_pieces(state, config);
            state.ball.update_position(dt);
        }
        // Frozen, but a level cleared from the admin surface still counts
        GamePhase::Paused => {}
        GamePhase::LevelCleared | GamePhase::GameOver | GamePhase::Complete => return,
    }

    evaluate_status(state);
}

fn resolve_paddle(state: &mut GameState, config: &GameConfig) {
    if state.ball.paddle_cooldown > 0 {
        state.ball.paddle_cooldown -= 1;
        return;
    }
    if state.ball.bounds().intersects(&state.paddle.rect) {
        let paddle = state.paddle.rect;
        if state.ball.resolve_collision(&paddle).is_some() {
            state.ball.paddle_cooldown = config.paddle_cooldown_ticks;
            state.push_event(GameEvent::PaddleHit);
        }
    }
}

fn resolve_borders(state: &mut GameState, config: &GameConfig) {
    let contact = border_contact(
        &state.ball.bounds(),
        state.ball.vel,
        config.window_width,
        config.window_height,
        config.hud_height,
    );

    if contact.lost {
        ball_lost(state);
        return;
    }
    if contact.side {
        state.ball.reverse_x();
    }
    if contact.ceiling {
        state.ball.reverse_y();
    }
    if contact.side || contact.ceiling {
        state.push_event(GameEvent::WallHit);
    }
}

/// Ball fell past the bottom: reset positions, lose a life, drop the streak
fn ball_lost(state: &mut GameState) {
    state.reset_ball_paddle();
    state.lives.subtract_life();
    state.score.reset_bonus();
    log::info!("Ball lost, {} lives left", state.lives.get());
    state.push_event(GameEvent::BallLost);
    state.push_event(GameEvent::LivesChanged(state.lives.get()));
}

fn resolve_pieces(state: &mut GameState, config: &GameConfig) {
    let ball_bounds = state.ball.bounds();

    for index in 0..state.grid.len() {
        let piece = state.grid.cell(index);
        if piece.is_destroyed() || !piece.rect.intersects(&ball_bounds) {
            continue;
        }
        let rect = piece.rect;
        state.ball.resolve_collision(&rect);
        hit_piece(state, config, index);

        state.score.increase();
        let total = state.score.total();
        state.push_event(GameEvent::ScoreChanged(total));
        if state.high_score.update(total) {
            state.push_event(GameEvent::HighScoreChanged(total));
        }
    }
}

/// Damage one piece and run its destruction hook if it dies
fn hit_piece(state: &mut GameState, config: &GameConfig, index: usize) {
    let (row, col) = state.grid.coords(index);
    let piece = state.grid.cell_mut(index);
    piece.take_damage();
    let lives = piece.lives();
    state.push_event(GameEvent::PieceHit { row, col, lives });

    if lives == 0 {
        state.push_event(GameEvent::PieceDestroyed { row, col });
        on_destroyed(state, config, index);
    }
}

/// Destruction hook: blocks may turn into a power-up, power-ups apply their effect
fn on_destroyed(state: &mut GameState, config: &GameConfig, index: usize) {
    match state.grid.cell(index).kind {
        PieceKind::Block => maybe_spawn_power_up(state, config, index),
        PieceKind::PowerUp(kind) => {
            log::debug!("Collected {:?}", kind);
            (kind.effect())(state, config);
            state.push_event(GameEvent::PowerUpCollected(kind));
        }
    }
}

fn maybe_spawn_power_up(state: &mut GameState, config: &GameConfig, index: usize) {
    let roll: f64 = state.rng.random();
    if roll >= config.power_up_probability {
        return;
    }

    let rect = state.grid.cell(index).rect;
    let Some(power_up) = state.registry.spawn(&mut state.rng, rect) else {
        return;
    };
    let PieceKind::PowerUp(kind) = power_up.kind else {
        return;
    };
    let (row, col) = state.grid.coords(index);
    *state.grid.cell_mut(index) = power_up;
    log::debug!("Spawned {:?} at ({}, {})", kind, row, col);
    state.push_event(GameEvent::PowerUpSpawned { row, col, kind });
}

/// Level cleared takes priority over out of lives
fn evaluate_status(state: &mut GameState) {
    if state.grid.has_won() {
        state.phase = GamePhase::LevelCleared;
        log::info!("Level {} passed", state.level.get());
        state.push_event(GameEvent::LevelPassed(state.level.get()));
    } else if state.lives.is_empty() {
        state.phase = GamePhase::GameOver;
        log::info!("Out of lives with score {}", state.score.total());
        state.push_event(GameEvent::OutOfLives);
    }
}

/// Damage every live piece once, running destruction hooks; no score is given
pub fn damage_all(state: &mut GameState, config: &GameConfig) {
    for index in 0..state.grid.len() {
        if !state.grid.cell(index).is_destroyed() {
            hit_piece(state, config, index);
        }
    }
}

/// Knock out the lowest live piece without running its destruction hook
pub fn clear_lowest(state: &mut GameState) -> bool {
    let Some((row, col)) = state.grid.lowest_active() else {
        return false;
    };
    if let Some(piece) = state.grid.get_mut(row, col) {
        piece.force_clear();
    }
    state.push_event(GameEvent::PieceDestroyed { row, col });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::{LevelGrid, LevelLayout};
    use crate::sim::piece::{Piece, PowerUpKind};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> GameConfig {
        GameConfig {
            power_up_probability: 0.0,
            ..Default::default()
        }
    }

    fn state_with(config: &GameConfig, rows: usize, cols: usize, lives: &[u32]) -> GameState {
        let layout = LevelLayout {
            rows,
            cols,
            lives: lives.to_vec(),
        };
        GameState::new(config, LevelGrid::from_layout(&layout, config), 0, 12345)
    }

    /// Put the ball on the underside of cell (row, col), moving up
    fn aim_at(state: &mut GameState, row: usize, col: usize) {
        let rect = state.grid.get(row, col).unwrap().rect;
        state.ball.pos = Vec2::new(rect.center().x, rect.bottom() + state.ball.radius - 2.0);
        state.ball.set_velocity(30.0, -200.0);
    }

    #[test]
    fn test_docked_ball_stays_put() {
        let config = config();
        let mut state = state_with(&config, 1, 1, &[1]);
        let start = state.ball.pos;
        for _ in 0..10 {
            tick(&mut state, &config, DT);
        }
        assert_eq!(state.ball.pos, start);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.time_ticks, 10);
    }

    #[test]
    fn test_hit_damages_and_scores() {
        let config = config();
        let mut state = state_with(&config, 2, 2, &[2, 0, 0, 3]);
        aim_at(&mut state, 0, 0);

        tick(&mut state, &config, DT);

        let piece = state.grid.get(0, 0).unwrap();
        assert_eq!(piece.lives(), 1);
        assert!(!piece.is_destroyed());
        assert_eq!(state.score.total(), 1);
        assert_eq!(state.high_score.get(), 1);
        // Bounced downward
        assert!(state.ball.vel.y > 0.0);
        assert_eq!(state.ball.vel.x, 30.0);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PieceHit { row: 0, col: 0, lives: 1 }));
        assert!(events.contains(&GameEvent::HighScoreChanged(1)));
    }

    #[test]
    fn test_destroying_last_piece_clears_level() {
        let config = config();
        let mut state = state_with(&config, 1, 2, &[1, 0]);
        aim_at(&mut state, 0, 0);

        tick(&mut state, &config, DT);

        assert!(state.grid.has_won());
        assert_eq!(state.phase, GamePhase::LevelCleared);
        assert!(state.drain_events().contains(&GameEvent::LevelPassed(1)));

        // Frozen until the core loads the next level
        let pos = state.ball.pos;
        tick(&mut state, &config, DT);
        assert_eq!(state.ball.pos, pos);
    }

    #[test]
    fn test_ball_lost_below_bottom() {
        let config = config();
        let mut state = state_with(&config, 1, 1, &[1]);
        state.score.increase();
        state.score.increase();
        state.paddle.move_by(-100.0, config.window_width);

        state.ball.pos = Vec2::new(300.0, config.window_height + state.ball.radius + 1.0);
        state.ball.set_velocity(0.0, 200.0);
        tick(&mut state, &config, DT);

        assert_eq!(state.lives.get(), config.starting_lives - 1);
        assert_eq!(state.ball.pos, state.ball.start);
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert_eq!(state.paddle.rect.pos, state.paddle.start);
        assert_eq!(state.score.total(), 2);
        assert_eq!(state.score.streak(), 0);
        let lost = state
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::BallLost)
            .count();
        assert_eq!(lost, 1);

        // Docked ball does not lose another life
        tick(&mut state, &config, DT);
        assert_eq!(state.lives.get(), config.starting_lives - 1);
    }

    #[test]
    fn test_last_life_lost_is_game_over() {
        let config = GameConfig {
            starting_lives: 1,
            ..config()
        };
        let mut state = state_with(&config, 1, 1, &[1]);
        state.ball.pos = Vec2::new(300.0, config.window_height + 20.0);
        state.ball.set_velocity(0.0, 200.0);

        tick(&mut state, &config, DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_events().contains(&GameEvent::OutOfLives));

        let ticks = state.time_ticks;
        tick(&mut state, &config, DT);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_side_wall_bounce() {
        let config = config();
        let mut state = state_with(&config, 1, 1, &[1]);
        state.ball.pos = Vec2::new(state.ball.radius - 1.0, 300.0);
        state.ball.set_velocity(-100.0, 50.0);

        tick(&mut state, &config, DT);
        assert_eq!(state.ball.vel, Vec2::new(100.0, 50.0));
        assert!(state.drain_events().contains(&GameEvent::WallHit));
    }

    #[test]
    fn test_ceiling_bounce() {
        let config = config();
        let mut state = state_with(&config, 1, 1, &[1]);
        // Far from the blocks horizontally
        state.ball.pos = Vec2::new(config.window_width - 20.0, config.hud_height + 2.0);
        state.ball.set_velocity(40.0, -100.0);

        tick(&mut state, &config, DT);
        assert_eq!(state.ball.vel, Vec2::new(40.0, 100.0));
    }

    #[test]
    fn test_paddle_bounce_with_cooldown() {
        let config = config();
        let mut state = state_with(&config, 1, 1, &[1]);
        let paddle = state.paddle.rect;
        state.ball.pos = Vec2::new(paddle.center().x, paddle.top() - state.ball.radius + 3.0);
        state.ball.set_velocity(20.0, 150.0);

        tick(&mut state, &config, DT);
        assert_eq!(state.ball.vel, Vec2::new(20.0, -150.0));
        assert_eq!(state.ball.paddle_cooldown, config.paddle_cooldown_ticks);
        assert!(state.drain_events().contains(&GameEvent::PaddleHit));

        // Still overlapping next tick, but the cooldown keeps it from flipping back
        tick(&mut state, &config, DT);
        assert_eq!(state.ball.vel, Vec2::new(20.0, -150.0));
    }

    #[test]
    fn test_paused_skips_physics_but_detects_clear() {
        let config = config();
        let mut state = state_with(&config, 1, 1, &[1]);
        state.ball.set_velocity(50.0, -50.0);
        state.phase = GamePhase::Paused;
        let pos = state.ball.pos;

        tick(&mut state, &config, DT);
        assert_eq!(state.ball.pos, pos);
        assert_eq!(state.phase, GamePhase::Paused);

        state.grid.clear_all();
        tick(&mut state, &config, DT);
        assert_eq!(state.phase, GamePhase::LevelCleared);
    }

    #[test]
    fn test_certain_power_up_spawn() {
        let config = GameConfig {
            power_up_probability: 1.0,
            ..Default::default()
        };
        let mut state = state_with(&config, 1, 2, &[1, 1]);
        aim_at(&mut state, 0, 0);

        tick(&mut state, &config, DT);

        let piece = state.grid.get(0, 0).unwrap();
        assert!(matches!(piece.kind, PieceKind::PowerUp(_)));
        assert_eq!(piece.lives(), 1);
        // A power-up keeps the level alive
        assert_eq!(state.phase, GamePhase::Running);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::PowerUpSpawned { row: 0, col: 0, .. }))
        );
    }

    #[test]
    fn test_empty_registry_spawns_nothing() {
        let config = GameConfig {
            power_up_probability: 1.0,
            power_ups: vec!["laser".into()],
            ..Default::default()
        };
        let mut state = state_with(&config, 1, 2, &[1, 1]);
        aim_at(&mut state, 0, 0);

        tick(&mut state, &config, DT);
        assert!(state.grid.get(0, 0).unwrap().is_destroyed());
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_collect_power_ups() {
        let config = config();
        let mut state = state_with(&config, 1, 5, &[0, 0, 0, 0, 1]);
        let width = state.paddle.rect.width();

        let cells = [
            PowerUpKind::ExpandPaddle,
            PowerUpKind::ExtraLife,
            PowerUpKind::SpeedBall,
            PowerUpKind::SlowBall,
        ];
        for (col, kind) in cells.into_iter().enumerate() {
            let rect = state.grid.get(0, col).unwrap().rect;
            state.grid.set(0, col, Piece::power_up(kind, rect).unwrap());
        }

        aim_at(&mut state, 0, 0);
        tick(&mut state, &config, DT);
        assert_eq!(state.paddle.rect.width(), width * config.expand_paddle_factor);
        assert!(state.grid.get(0, 0).unwrap().is_destroyed());

        aim_at(&mut state, 0, 1);
        tick(&mut state, &config, DT);
        assert_eq!(state.lives.get(), config.starting_lives + 1);

        aim_at(&mut state, 0, 2);
        tick(&mut state, &config, DT);
        // Bounced (30, -200) -> (30, 200), then scaled
        let expected = Vec2::new(30.0, 200.0) * config.speed_ball_factor;
        assert!((state.ball.vel - expected).length() < 1e-3);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::PowerUpCollected(PowerUpKind::SpeedBall))
        );

        aim_at(&mut state, 0, 3);
        tick(&mut state, &config, DT);
        let expected = Vec2::new(30.0, 200.0) * config.slow_ball_factor;
        assert!((state.ball.vel - expected).length() < 1e-3);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::PowerUpCollected(PowerUpKind::SlowBall))
        );
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_damage_all_and_clear_lowest() {
        let config = config();
        let mut state = state_with(&config, 2, 2, &[1, 2, 3, 0]);
        damage_all(&mut state, &config);
        assert_eq!(state.grid.lives(), vec![0, 1, 2, 0]);
        assert_eq!(state.score.total(), 0);

        assert!(clear_lowest(&mut state));
        assert_eq!(state.grid.lives(), vec![0, 1, 0, 0]);
        assert!(clear_lowest(&mut state));
        assert!(!clear_lowest(&mut state));
        assert!(state.grid.has_won());
    }

    #[test]
    fn test_power_up_rolls_are_deterministic() {
        let config = GameConfig {
            power_up_probability: 0.5,
            ..Default::default()
        };
        let run = || {
            let mut state = state_with(&config, 3, 4, &[1; 12]);
            damage_all(&mut state, &config);
            state
                .grid
                .iter()
                .map(|(_, _, p)| p.kind)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_ball_over_two_pieces_hits_both() {
        let config = config();
        let mut state = state_with(&config, 1, 3, &[1, 1, 1]);
        let left = state.grid.get(0, 0).unwrap().rect;
        let right = state.grid.get(0, 1).unwrap().rect;
        // Straddle the gap between the two cells, just under them
        let gap_center = (left.right() + right.left()) / 2.0;
        state.ball.pos = Vec2::new(gap_center, left.bottom() + state.ball.radius - 2.0);
        state.ball.set_velocity(30.0, -200.0);

        tick(&mut state, &config, DT);

        assert_eq!(state.grid.lives(), vec![0, 0, 1]);
        assert_eq!(state.score.total(), 2);
        // Flipped once per piece
        assert_eq!(state.ball.vel, Vec2::new(30.0, -200.0));
        let hits = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::PieceHit { .. }))
            .count();
        assert_eq!(hits, 2);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_only_touched_piece_is_damaged() {
        let config = config();
        let mut state = state_with(&config, 1, 3, &[1, 1, 1]);
        aim_at(&mut state, 0, 1);

        tick(&mut state, &config, DT);
        assert_eq!(state.grid.lives(), vec![1, 0, 1]);
    }
}
