//! Enemy formation generation
//!
//! A formation is a batch of enemies spawned together just off one edge of
//! the canvas, sharing a formation id and arranged in a geometric pattern.
//! Generation itself is deterministic; randomness only enters through a
//! [`SpawnSource`] choosing which formation to build.

use std::f32::consts::{FRAC_PI_6, TAU};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::physics::velocity_toward;
use super::state::{Body, EnemyShip};
use crate::config::GameConfig;

/// Gap between enemies in a line or wave
pub const LINE_SPACING: f32 = 40.0;
/// Gap between successive V wing positions
pub const V_SPACING: f32 = 30.0;
/// Half-angle of the V
pub const V_ANGLE: f32 = FRAC_PI_6;
/// Ring radius for circle formations
pub const CIRCLE_RADIUS: f32 = 80.0;
/// Circle formations are centered this far above the canvas
pub const CIRCLE_CENTER_Y: f32 = -50.0;
pub const WAVE_AMPLITUDE: f32 = 50.0;
/// Radians per enemy index
pub const WAVE_FREQUENCY: f32 = 0.05;

/// Formation pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormationKind {
    Line,
    VFormation,
    Circle,
    Wave,
    /// Anything unrecognized; builds an empty formation
    #[serde(other)]
    Unknown,
}

impl FormationKind {
    /// Every pattern that actually produces enemies
    pub const ALL: [FormationKind; 4] = [
        FormationKind::Line,
        FormationKind::VFormation,
        FormationKind::Circle,
        FormationKind::Wave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormationKind::Line => "line",
            FormationKind::VFormation => "v-formation",
            FormationKind::Circle => "circle",
            FormationKind::Wave => "wave",
            FormationKind::Unknown => "unknown",
        }
    }

    /// Parse a pattern name; unrecognized names map to `Unknown`
    pub fn parse(s: &str) -> Self {
        match s {
            "line" => FormationKind::Line,
            "v-formation" => FormationKind::VFormation,
            "circle" => FormationKind::Circle,
            "wave" => FormationKind::Wave,
            _ => FormationKind::Unknown,
        }
    }
}

/// Canvas edge a formation enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl StartSide {
    pub const ALL: [StartSide; 4] = [StartSide::Top, StartSide::Bottom, StartSide::Left, StartSide::Right];
}

/// What to build
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationConfig {
    pub kind: FormationKind,
    pub enemy_count: u32,
    /// Pixels per tick
    pub speed: f32,
    pub start_side: StartSide,
}

/// Build the enemies for a formation
///
/// Returns `config.enemy_count` active enemies sharing `formation_id`, or an
/// empty batch for an unknown pattern.
pub fn create_formation(config: &FormationConfig, formation_id: &str, game: &GameConfig) -> Vec<EnemyShip> {
    let count = config.enemy_count as usize;
    let center = game.bounds().center();

    let placements: Vec<(Vec2, Vec2)> = match config.kind {
        FormationKind::Line => (0..count)
            .map(|i| {
                let pos = edge_position(config.start_side, i, LINE_SPACING, game);
                (pos, velocity_toward(pos, center, config.speed))
            })
            .collect(),

        FormationKind::VFormation => {
            let leader = edge_midpoint(config.start_side, game);
            // Wings trail behind the leader, away from the center
            let back = (leader - center).normalize_or_zero();
            (0..count)
                .map(|i| {
                    let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                    let offset = (i / 2) as f32 * V_SPACING;
                    let wing = Vec2::from_angle(side * V_ANGLE).rotate(back);
                    let pos = leader + wing * offset;
                    (pos, velocity_toward(pos, center, config.speed))
                })
                .collect()
        }

        FormationKind::Circle => {
            let ring_center = Vec2::new(game.canvas_width / 2.0, CIRCLE_CENTER_Y);
            (0..count)
                .map(|i| {
                    let angle = i as f32 / count as f32 * TAU;
                    let pos = ring_center + Vec2::from_angle(angle) * CIRCLE_RADIUS;
                    // Falls straight down rather than aiming at the center
                    (pos, Vec2::new(0.0, config.speed))
                })
                .collect()
        }

        FormationKind::Wave => (0..count)
            .map(|i| {
                let mut pos = edge_position(config.start_side, i, LINE_SPACING, game);
                pos.y += (i as f32 * WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE;
                (pos, velocity_toward(pos, center, config.speed))
            })
            .collect(),

        FormationKind::Unknown => {
            log::debug!("Unknown formation kind, spawning nothing");
            Vec::new()
        }
    };

    placements
        .into_iter()
        .enumerate()
        .map(|(i, (position, velocity))| EnemyShip {
            body: Body {
                id: format!("enemy-{formation_id}-{i}"),
                position,
                velocity,
                radius: game.enemy_radius,
                active: true,
            },
            points: game.base_enemy_points,
            formation_id: formation_id.to_string(),
        })
        .collect()
}

/// Slot `index` along an edge, one enemy radius off-screen
fn edge_position(side: StartSide, index: usize, spacing: f32, game: &GameConfig) -> Vec2 {
    let along = index as f32 * spacing + spacing;
    let r = game.enemy_radius;
    match side {
        StartSide::Top => Vec2::new(along, -r),
        StartSide::Bottom => Vec2::new(along, game.canvas_height + r),
        StartSide::Left => Vec2::new(-r, along),
        StartSide::Right => Vec2::new(game.canvas_width + r, along),
    }
}

/// Middle of an edge, one enemy radius off-screen
fn edge_midpoint(side: StartSide, game: &GameConfig) -> Vec2 {
    let r = game.enemy_radius;
    let (w, h) = (game.canvas_width, game.canvas_height);
    match side {
        StartSide::Top => Vec2::new(w / 2.0, -r),
        StartSide::Bottom => Vec2::new(w / 2.0, h + r),
        StartSide::Left => Vec2::new(-r, h / 2.0),
        StartSide::Right => Vec2::new(w + r, h / 2.0),
    }
}

/// Pick a uniformly random pattern and edge; size and speed come from config
pub fn random_formation<R: Rng + ?Sized>(rng: &mut R, game: &GameConfig) -> FormationConfig {
    let kind = FormationKind::ALL[rng.random_range(0..FormationKind::ALL.len())];
    let start_side = StartSide::ALL[rng.random_range(0..StartSide::ALL.len())];
    FormationConfig {
        kind,
        enemy_count: game.enemies_per_formation,
        speed: game.enemy_base_speed,
        start_side,
    }
}

/// Chooses the next formation to spawn
pub trait SpawnSource {
    fn next_formation(&mut self, game: &GameConfig) -> FormationConfig;
}

/// Uniformly random formations
#[derive(Debug, Clone)]
pub struct RandomSpawns<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomSpawns<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSpawns<Pcg32> {
    /// Reproducible spawn sequence
    pub fn seeded(seed: u64) -> Self {
        Self::new(Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> SpawnSource for RandomSpawns<R> {
    fn next_formation(&mut self, game: &GameConfig) -> FormationConfig {
        random_formation(&mut self.rng, game)
    }
}
