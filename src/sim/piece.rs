//! Grid pieces: breakable blocks and collectible power-ups
//!
//! Every piece shares one data record (rect + lives). What happens when a
//! piece is destroyed depends on its [`PieceKind`]: blocks may leave a
//! power-up behind, power-ups apply an effect looked up in a function table.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::{GameEvent, GameState};
use crate::config::GameConfig;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Scale paddle width up
    ExpandPaddle,
    /// Scale ball velocity up
    SpeedBall,
    /// Scale ball velocity down
    SlowBall,
    /// One more player life
    ExtraLife,
}

/// Effect applied to the running game when a power-up is collected
pub type EffectFn = fn(&mut GameState, &GameConfig);

/// Builds a power-up piece in the cell of a destroyed block
pub type PowerUpCtor = fn(Rect) -> Option<Piece>;

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::ExpandPaddle,
        PowerUpKind::SpeedBall,
        PowerUpKind::SlowBall,
        PowerUpKind::ExtraLife,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::ExpandPaddle => "expand_paddle",
            PowerUpKind::SpeedBall => "speed_ball",
            PowerUpKind::SlowBall => "slow_ball",
            PowerUpKind::ExtraLife => "extra_life",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expand_paddle" | "expand" => Some(PowerUpKind::ExpandPaddle),
            "speed_ball" | "speed" => Some(PowerUpKind::SpeedBall),
            "slow_ball" | "slow" => Some(PowerUpKind::SlowBall),
            "extra_life" | "life" => Some(PowerUpKind::ExtraLife),
            _ => None,
        }
    }

    /// Entry in the effect table
    pub fn effect(&self) -> EffectFn {
        match self {
            PowerUpKind::ExpandPaddle => expand_paddle,
            PowerUpKind::SpeedBall => speed_ball,
            PowerUpKind::SlowBall => slow_ball,
            PowerUpKind::ExtraLife => extra_life,
        }
    }

    /// Entry in the constructor table
    pub fn constructor(&self) -> PowerUpCtor {
        match self {
            PowerUpKind::ExpandPaddle => |rect| Piece::power_up(PowerUpKind::ExpandPaddle, rect),
            PowerUpKind::SpeedBall => |rect| Piece::power_up(PowerUpKind::SpeedBall, rect),
            PowerUpKind::SlowBall => |rect| Piece::power_up(PowerUpKind::SlowBall, rect),
            PowerUpKind::ExtraLife => |rect| Piece::power_up(PowerUpKind::ExtraLife, rect),
        }
    }
}

fn expand_paddle(state: &mut GameState, config: &GameConfig) {
    state
        .paddle
        .scale_width(config.expand_paddle_factor, config.window_width);
}

fn speed_ball(state: &mut GameState, config: &GameConfig) {
    state.ball.scale_velocity(config.speed_ball_factor);
}

fn slow_ball(state: &mut GameState, config: &GameConfig) {
    state.ball.scale_velocity(config.slow_ball_factor);
}

fn extra_life(state: &mut GameState, _config: &GameConfig) {
    state.lives.add_life();
    state.push_event(GameEvent::LivesChanged(state.lives.get()));
}

/// Piece variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceKind {
    Block,
    PowerUp(PowerUpKind),
}

/// A piece in the level grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub rect: Rect,
    lives: u32,
}

impl Piece {
    /// A block with the given hit points (0 = empty cell)
    pub fn block(rect: Rect, lives: u32) -> Self {
        Self {
            kind: PieceKind::Block,
            rect,
            lives,
        }
    }

    /// A power-up; always one life. None if the rect has no area.
    pub fn power_up(kind: PowerUpKind, rect: Rect) -> Option<Self> {
        if rect.is_degenerate() {
            return None;
        }
        Some(Self {
            kind: PieceKind::PowerUp(kind),
            rect,
            lives: 1,
        })
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Lose one life, never going below zero
    pub fn take_damage(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn is_destroyed(&self) -> bool {
        self.lives == 0
    }

    /// Knock the piece out without running its destruction hook
    pub fn force_clear(&mut self) {
        self.lives = 0;
    }
}

/// The set of power-ups a destroyed block can turn into
#[derive(Debug, Clone, Default)]
pub struct PowerUpRegistry {
    entries: Vec<(PowerUpKind, PowerUpCtor)>,
}

impl PowerUpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every known power-up
    pub fn with_all() -> Self {
        let mut registry = Self::new();
        for kind in PowerUpKind::ALL {
            registry.register(kind, kind.constructor());
        }
        registry
    }

    /// Build from configured names; unknown names are logged and skipped
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut registry = Self::new();
        for name in names {
            match PowerUpKind::from_name(name.as_ref()) {
                Some(kind) => registry.register(kind, kind.constructor()),
                None => log::warn!("Unknown power-up '{}' left out of registry", name.as_ref()),
            }
        }
        registry
    }

    pub fn register(&mut self, kind: PowerUpKind, ctor: PowerUpCtor) {
        self.entries.push((kind, ctor));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = PowerUpKind> + '_ {
        self.entries.iter().map(|(kind, _)| *kind)
    }

    /// Draw a power-up uniformly and build it at `rect`.
    ///
    /// Failures (empty registry, constructor refusing the rect, constructor
    /// building the wrong kind) are logged and yield no power-up.
    pub fn spawn<R: Rng + ?Sized>(&self, rng: &mut R, rect: Rect) -> Option<Piece> {
        if self.entries.is_empty() {
            log::warn!("Power-up roll succeeded but the registry is empty");
            return None;
        }
        let (kind, ctor) = self.entries[rng.random_range(0..self.entries.len())];
        match ctor(rect) {
            Some(piece) if piece.kind == PieceKind::PowerUp(kind) => Some(piece),
            Some(piece) => {
                log::warn!("Constructor for {:?} built {:?}", kind, piece.kind);
                None
            }
            None => {
                log::warn!("Could not build {:?} at {:?}", kind, rect);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rect() -> Rect {
        Rect::new(5.0, 45.0, 54.0, 20.0)
    }

    #[test]
    fn test_single_life_destroyed_after_one_hit() {
        let mut piece = Piece::block(rect(), 1);
        assert!(!piece.is_destroyed());
        piece.take_damage();
        assert!(piece.is_destroyed());
    }

    #[test]
    fn test_power_up_has_one_life() {
        let piece = Piece::power_up(PowerUpKind::ExtraLife, rect()).unwrap();
        assert_eq!(piece.lives(), 1);
        assert_eq!(piece.kind, PieceKind::PowerUp(PowerUpKind::ExtraLife));
        assert!(Piece::power_up(PowerUpKind::ExtraLife, Rect::new(0.0, 0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_names_round_trip() {
        for kind in PowerUpKind::ALL {
            assert_eq!(PowerUpKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PowerUpKind::from_name(" Slow "), Some(PowerUpKind::SlowBall));
        assert_eq!(PowerUpKind::from_name("laser"), None);
    }

    #[test]
    fn test_registry_from_names_skips_unknown() {
        let registry = PowerUpRegistry::from_names(&["expand_paddle", "laser", "extra_life"]);
        assert_eq!(registry.len(), 2);
        let kinds: Vec<_> = registry.kinds().collect();
        assert_eq!(kinds, vec![PowerUpKind::ExpandPaddle, PowerUpKind::ExtraLife]);
    }

    #[test]
    fn test_empty_registry_spawns_nothing() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(PowerUpRegistry::new().spawn(&mut rng, rect()).is_none());
    }

    #[test]
    fn test_bad_constructor_spawns_nothing() {
        let mut registry = PowerUpRegistry::new();
        registry.register(PowerUpKind::SpeedBall, |_| None);
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(registry.spawn(&mut rng, rect()).is_none());

        let mut mismatched = PowerUpRegistry::new();
        mismatched.register(PowerUpKind::SpeedBall, |rect| Some(Piece::block(rect, 1)));
        assert!(mismatched.spawn(&mut rng, rect()).is_none());
    }

    #[test]
    fn test_registry_spawn_draws_every_kind() {
        let registry = PowerUpRegistry::with_all();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let piece = registry.spawn(&mut rng, rect()).unwrap();
            assert_eq!(piece.rect, rect());
            if let PieceKind::PowerUp(kind) = piece.kind {
                seen.insert(kind);
            }
        }
        assert_eq!(seen.len(), PowerUpKind::ALL.len());
    }

    proptest! {
        #[test]
        fn damage_is_floored(start in 0u32..10, hits in 0usize..30) {
            let mut piece = Piece::block(rect(), start);
            let mut last = piece.lives();
            for _ in 0..hits {
                piece.take_damage();
                prop_assert!(piece.lives() <= last);
                last = piece.lives();
            }
            prop_assert_eq!(piece.lives(), start.saturating_sub(hits as u32));
        }
    }
}
