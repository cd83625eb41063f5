//! Collision detection for a circular ball against axis-aligned geometry
//!
//! The ball is tested by its bounding box. Response is a velocity flip on a
//! single axis; there is no position correction.

use glam::Vec2;

use super::rect::Rect;

/// Axis whose velocity component a collision flips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Which velocity component should flip when a ball's bounds overlap `rect`.
///
/// Vertical penetration is checked first: the ball's bottom edge at or past
/// the rect's bottom, or its top edge at or past the rect's top. Only if
/// neither holds is horizontal penetration checked the same way. Corner
/// overlaps therefore always resolve vertically.
pub fn penetration_axis(ball: &Rect, rect: &Rect) -> Option<Axis> {
    if ball.bottom() >= rect.bottom() || ball.top() <= rect.top() {
        Some(Axis::Vertical)
    } else if ball.left() <= rect.left() || ball.right() >= rect.right() {
        Some(Axis::Horizontal)
    } else {
        None
    }
}

/// Flip the component of `velocity` on `axis`
#[inline]
pub fn reflect(velocity: Vec2, axis: Axis) -> Vec2 {
    match axis {
        Axis::Horizontal => Vec2::new(-velocity.x, velocity.y),
        Axis::Vertical => Vec2::new(velocity.x, -velocity.y),
    }
}

/// Ball contact with the playfield borders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorderContact {
    /// Touching the left or right wall while moving into it
    pub side: bool,
    /// Touching the HUD ceiling while moving up
    pub ceiling: bool,
    /// Fully below the bottom of the window
    pub lost: bool,
}

/// Check a ball (bounds + velocity) against the window borders.
///
/// `ceiling` is the y coordinate of the playfield top (bottom of the HUD).
/// A ball counts as lost once its top edge is past `window_height`.
pub fn border_contact(
    ball: &Rect,
    velocity: Vec2,
    window_width: f32,
    window_height: f32,
    ceiling: f32,
) -> BorderContact {
    if ball.top() > window_height {
        return BorderContact {
            lost: true,
            ..Default::default()
        };
    }
    BorderContact {
        side: (ball.left() <= 0.0 && velocity.x < 0.0)
            || (ball.right() >= window_width && velocity.x > 0.0),
        ceiling: ball.top() <= ceiling && velocity.y < 0.0,
        lost: false,
    }
}
