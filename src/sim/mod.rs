//! Pure simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering,
//! input devices and wall-clock time:
//! - The driver supplies timestamps; nothing here reads a clock
//! - Randomness only enters through a `SpawnSource`
//! - Each transition returns a new `GameState` snapshot

pub mod autopilot;
pub mod formation;
pub mod physics;
pub mod state;
pub mod tick;

pub use autopilot::{Autopilot, AutopilotInput};
pub use formation::{
    FormationConfig, FormationKind, RandomSpawns, SpawnSource, StartSide, create_formation,
    random_formation,
};
pub use physics::{
    Bounds, advance_explosion, circles_overlap, constrain_to_bounds, explosion_hits,
    has_left_bounds, is_within_bounds, velocity_toward,
};
pub use state::{
    Body, EnemyShip, Explosion, GamePhase, GameState, Hud, PLAYER_ID, PlayerMove, PlayerShip, Ship,
};
pub use tick::tick;
