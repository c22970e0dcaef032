//! Collision and bounds geometry
//!
//! Everything here is a pure function of its arguments. Positions are in
//! canvas pixel space (origin top-left, +y down).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Body, Explosion};
use crate::Millis;

/// Axis-aligned playable area `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Check whether two circles overlap
///
/// The envelope is shrunk by `threshold` so that circles which merely graze
/// each other don't count as a hit.
#[inline]
pub fn circles_overlap(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32, threshold: f32) -> bool {
    pos_a.distance(pos_b) < radius_a + radius_b - threshold
}

/// Check if a circle lies entirely inside the bounds
pub fn is_within_bounds(pos: Vec2, radius: f32, bounds: Bounds) -> bool {
    pos.x - radius >= 0.0
        && pos.x + radius <= bounds.width
        && pos.y - radius >= 0.0
        && pos.y + radius <= bounds.height
}

/// Clamp a circle's center so it stays inside the bounds
///
/// Used for the player only; enemies are allowed to leave.
pub fn constrain_to_bounds(pos: Vec2, radius: f32, bounds: Bounds) -> Vec2 {
    // max-then-min keeps the result defined even if the circle is wider than the canvas
    Vec2::new(
        pos.x.max(radius).min(bounds.width - radius),
        pos.y.max(radius).min(bounds.height - radius),
    )
}

/// Check if an entity has left the field and won't come back
///
/// True when, on some axis, the position is further than `margin` outside
/// the bounds and the velocity isn't carrying it back in. Entities that spawn
/// off-screen and fly inward are therefore kept.
pub fn has_left_bounds(pos: Vec2, vel: Vec2, margin: f32, bounds: Bounds) -> bool {
    (pos.x < -margin && vel.x <= 0.0)
        || (pos.x > bounds.width + margin && vel.x >= 0.0)
        || (pos.y < -margin && vel.y <= 0.0)
        || (pos.y > bounds.height + margin && vel.y >= 0.0)
}

/// Velocity from `from` toward `target` with magnitude `speed`
///
/// Coincident points give zero velocity rather than NaN.
#[inline]
pub fn velocity_toward(from: Vec2, target: Vec2, speed: f32) -> Vec2 {
    (target - from).normalize_or_zero() * speed
}

/// Growth progress of an explosion at `now`, in `[0, 1]`
pub fn explosion_progress(start_time: Millis, duration: Millis, now: Millis) -> f64 {
    if duration <= 0.0 {
        return 1.0;
    }
    ((now - start_time) / duration).clamp(0.0, 1.0)
}

/// Advance an explosion's radius to time `now`
///
/// Radius grows linearly from 0 to `max_radius` over `duration`. Returns the
/// updated explosion and whether it has finished.
pub fn advance_explosion(explosion: &Explosion, now: Millis) -> (Explosion, bool) {
    let progress = explosion_progress(explosion.start_time, explosion.duration, now);
    let updated = Explosion {
        radius: explosion.max_radius * progress as f32,
        ..explosion.clone()
    };
    (updated, progress >= 1.0)
}

/// Check if an explosion's current radius reaches a body
#[inline]
pub fn explosion_hits(explosion: &Explosion, body: &Body, threshold: f32) -> bool {
    circles_overlap(explosion.position, explosion.radius, body.position, body.radius, threshold)
}
