//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - No file or terminal I/O
//! - Seeded RNG only
//! - Stable iteration order (row-major over the grid)

pub mod collision;
pub mod grid;
pub mod piece;
pub mod rect;
pub mod state;
pub mod tick;
pub mod trackers;

pub use collision::{Axis, BorderContact, border_contact, penetration_axis};
pub use grid::{LevelGrid, LevelLayout};
pub use piece::{EffectFn, Piece, PieceKind, PowerUpCtor, PowerUpKind, PowerUpRegistry};
pub use rect::Rect;
pub use state::{Ball, GameEvent, GamePhase, GameState, Paddle};
pub use tick::{clear_lowest, damage_all, tick};
pub use trackers::{HighScore, Level, Lives, Score};
