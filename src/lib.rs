//! Chain Reaction - a chain-explosion arcade game core
//!
//! Core modules:
//! - `sim`: Pure simulation (physics, formations, game state, tick)
//! - `config`: Immutable game tuning loaded at startup
//! - `controls`: Keyboard mapping and player movement intent
//! - `session`: Lifecycle wrapper owning the current state for a driver

pub mod config;
pub mod controls;
pub mod error;
pub mod session;
pub mod sim;

pub use config::GameConfig;
pub use error::{ConfigError, Error, Result};
pub use session::GameSession;

/// Timestamp in milliseconds, supplied by whoever drives the simulation
pub type Millis = f64;

/// Default game tuning
pub mod consts {
    /// Canvas dimensions (pixels)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Player ship
    pub const PLAYER_RADIUS: f32 = 15.0;
    /// Pixels per movement step
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_INITIAL_LIVES: u32 = 3;

    /// Explosion lifetime (ms) and final radius (pixels)
    pub const EXPLOSION_DURATION: f64 = 2000.0;
    pub const EXPLOSION_MAX_RADIUS: f32 = 100.0;

    /// Enemy ships
    pub const ENEMY_RADIUS: f32 = 12.0;
    /// Pixels per tick
    pub const ENEMY_BASE_SPEED: f32 = 2.0;
    pub const ENEMY_SPAWN_INTERVAL: f64 = 2000.0; // ms
    pub const ENEMIES_PER_FORMATION: u32 = 5;

    /// Scoring
    pub const BASE_ENEMY_POINTS: u64 = 100;
    pub const CHAIN_MULTIPLIER: f64 = 1.5;
    pub const LIFE_BONUS_THRESHOLD: u64 = 10_000;

    /// Movement input rate (Hz)
    pub const FRAME_RATE: u32 = 60;
    /// Shrinks the collision envelope so grazes don't count
    pub const COLLISION_DETECTION_THRESHOLD: f32 = 5.0;
}
