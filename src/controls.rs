//! Keyboard mapping and player movement
//!
//! The input layer keeps a [`HeldKeys`] set up to date from key events and,
//! at the configured input rate, turns it into a new player position with
//! [`next_position`]. Detonation is a one-shot [`Command::Explode`].

use glam::Vec2;

use crate::config::GameConfig;
use crate::sim::physics::constrain_to_bounds;

/// Movement direction (screen space, +y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A player command decoded from a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Explode,
}

impl Command {
    /// Decode a key name (browser `KeyboardEvent.key` style)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" | "W" | "ArrowUp" => Some(Command::Move(Direction::Up)),
            "s" | "S" | "ArrowDown" => Some(Command::Move(Direction::Down)),
            "a" | "A" | "ArrowLeft" => Some(Command::Move(Direction::Left)),
            "d" | "D" | "ArrowRight" => Some(Command::Move(Direction::Right)),
            " " => Some(Command::Explode),
            _ => None,
        }
    }
}

/// Directions currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    /// Apply a key event; returns the command it maps to, if any
    ///
    /// `Explode` is only reported on key-down.
    pub fn handle_key(&mut self, key: &str, pressed: bool) -> Option<Command> {
        match Command::from_key(key)? {
            Command::Move(direction) => {
                self.set(direction, pressed);
                Some(Command::Move(direction))
            }
            Command::Explode if pressed => Some(Command::Explode),
            Command::Explode => None,
        }
    }

    /// Keys that would steer from `from` toward `to`, ignoring axes already
    /// within `dead_zone`
    pub fn toward(from: Vec2, to: Vec2, dead_zone: f32) -> Self {
        let delta = to - from;
        Self {
            up: delta.y < -dead_zone,
            down: delta.y > dead_zone,
            left: delta.x < -dead_zone,
            right: delta.x > dead_zone,
        }
    }

    /// Unit-ish step direction; opposite keys cancel out
    fn step(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| match (neg, pos) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }

    pub fn is_idle(&self) -> bool {
        self.step() == Vec2::ZERO
    }
}

/// Player position after one input step
///
/// Moves `player_speed` pixels in the held direction (diagonals normalized
/// to the same speed) and keeps the ship on the canvas.
pub fn next_position(current: Vec2, held: HeldKeys, config: &GameConfig) -> Vec2 {
    let step = held.step().normalize_or_zero() * config.player_speed;
    constrain_to_bounds(current + step, config.player_radius, config.bounds())
}
