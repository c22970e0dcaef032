//! Game configuration
//!
//! A fixed set of named constants supplied once at startup. Every field falls
//! back to the defaults in [`crate::consts`], so a config file only needs to
//! list what it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::physics::Bounds;

/// Immutable game tuning, passed explicitly into formation generation and
/// the simulation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Canvas ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Player ===
    pub player_radius: f32,
    /// Pixels moved per input step
    pub player_speed: f32,
    pub player_initial_lives: u32,

    // === Explosions ===
    /// Milliseconds from ignition to full radius
    pub explosion_duration: f64,
    pub explosion_max_radius: f32,

    // === Enemies ===
    pub enemy_radius: f32,
    /// Pixels per tick
    pub enemy_base_speed: f32,
    /// Milliseconds between formation spawns
    pub enemy_spawn_interval: f64,
    pub enemies_per_formation: u32,

    // === Scoring ===
    pub base_enemy_points: u64,
    /// Raised to the chain depth of a tick's deepest new explosion
    pub chain_multiplier: f64,
    /// One extra life per multiple of this score
    pub life_bonus_threshold: u64,

    // === Physics ===
    /// Movement input rate (Hz), independent of the simulation tick
    pub frame_rate: u32,
    pub collision_threshold: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            player_radius: PLAYER_RADIUS,
            player_speed: PLAYER_SPEED,
            player_initial_lives: PLAYER_INITIAL_LIVES,

            explosion_duration: EXPLOSION_DURATION,
            explosion_max_radius: EXPLOSION_MAX_RADIUS,

            enemy_radius: ENEMY_RADIUS,
            enemy_base_speed: ENEMY_BASE_SPEED,
            enemy_spawn_interval: ENEMY_SPAWN_INTERVAL,
            enemies_per_formation: ENEMIES_PER_FORMATION,

            base_enemy_points: BASE_ENEMY_POINTS,
            chain_multiplier: CHAIN_MULTIPLIER,
            life_bonus_threshold: LIFE_BONUS_THRESHOLD,

            frame_rate: FRAME_RATE,
            collision_threshold: COLLISION_DETECTION_THRESHOLD,
        }
    }
}

impl GameConfig {
    /// Parse a JSON config, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded game config from {}", path.display());
        Ok(config)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            // Also rejects NaN
            if value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero",
                })
            }
        }

        positive("canvas_width", self.canvas_width.into())?;
        positive("canvas_height", self.canvas_height.into())?;
        positive("player_radius", self.player_radius.into())?;
        positive("player_speed", self.player_speed.into())?;
        positive("explosion_duration", self.explosion_duration)?;
        positive("explosion_max_radius", self.explosion_max_radius.into())?;
        positive("enemy_radius", self.enemy_radius.into())?;
        positive("enemy_base_speed", self.enemy_base_speed.into())?;
        positive("enemy_spawn_interval", self.enemy_spawn_interval)?;

        if self.player_initial_lives == 0 {
            return Err(ConfigError::Invalid {
                field: "player_initial_lives",
                reason: "must be at least one",
            });
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_rate",
                reason: "must be at least one",
            });
        }
        if self.life_bonus_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "life_bonus_threshold",
                reason: "must be at least one",
            });
        }
        if !(self.chain_multiplier >= 1.0) {
            return Err(ConfigError::Invalid {
                field: "chain_multiplier",
                reason: "must be at least 1.0",
            });
        }
        if !(self.collision_threshold >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "collision_threshold",
                reason: "must not be negative",
            });
        }
        if 2.0 * self.player_radius > self.canvas_width.min(self.canvas_height) {
            return Err(ConfigError::Invalid {
                field: "player_radius",
                reason: "player does not fit on the canvas",
            });
        }

        Ok(())
    }

    /// Playable area
    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.canvas_width, self.canvas_height)
    }

    /// Milliseconds between movement input steps
    pub fn input_interval(&self) -> f64 {
        1000.0 / f64::from(self.frame_rate)
    }
}
