//! Game state and core simulation types
//!
//! Every transition here takes `&self` and returns a fresh snapshot, so a
//! renderer holding the previous state never sees a half-applied update.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{constrain_to_bounds, explosion_progress};
use crate::Millis;
use crate::config::GameConfig;

/// Id of the single player ship
pub const PLAYER_ID: &str = "player";

/// Coarse phase, derived from the state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Not started yet, or paused by the player
    Paused,
    /// Simulation advancing
    Running,
    /// Lives exhausted; only a reset leaves this phase
    GameOver,
}

/// Shape shared by every ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Unique for the entity's lifetime
    pub id: String,
    pub position: Vec2,
    /// Pixels per tick
    pub velocity: Vec2,
    pub radius: f32,
    /// False once logically removed
    pub active: bool,
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerShip {
    pub body: Body,
    /// Mirrors [`GameState::lives`]
    pub lives: u32,
    pub is_exploding: bool,
    pub explosion_start_time: Option<Millis>,
    pub explosion_radius: f32,
}

impl PlayerShip {
    /// Fresh ship centered on the canvas
    pub fn new(config: &GameConfig) -> Self {
        Self {
            body: Body {
                id: PLAYER_ID.to_string(),
                position: config.bounds().center(),
                velocity: Vec2::ZERO,
                radius: config.player_radius,
                active: true,
            },
            lives: config.player_initial_lives,
            is_exploding: false,
            explosion_start_time: None,
            explosion_radius: 0.0,
        }
    }
}

/// An enemy ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyShip {
    pub body: Body,
    /// Score value
    pub points: u64,
    /// Shared by all enemies spawned together
    pub formation_id: String,
}

/// Borrowed view over either kind of ship
#[derive(Debug, Clone, Copy)]
pub enum Ship<'a> {
    Player(&'a PlayerShip),
    Enemy(&'a EnemyShip),
}

impl<'a> Ship<'a> {
    pub fn body(&self) -> &'a Body {
        match *self {
            Ship::Player(player) => &player.body,
            Ship::Enemy(enemy) => &enemy.body,
        }
    }
}

/// An expanding blast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub id: String,
    pub position: Vec2,
    /// Current radius
    pub radius: f32,
    pub max_radius: f32,
    pub start_time: Millis,
    /// Milliseconds to reach `max_radius`
    pub duration: Millis,
    /// Causal hops from the player's detonation (0 = player)
    pub chain_depth: u32,
}

impl Explosion {
    /// A standard explosion igniting at `now` with zero radius
    pub fn ignite(id: String, position: Vec2, now: Millis, chain_depth: u32, config: &GameConfig) -> Self {
        Self {
            id,
            position,
            radius: 0.0,
            max_radius: config.explosion_max_radius,
            start_time: now,
            duration: config.explosion_duration,
            chain_depth,
        }
    }
}

/// Partial player position from the input layer; `None` keeps that axis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerMove {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

impl PlayerMove {
    pub fn to(pos: Vec2) -> Self {
        Self {
            x: Some(pos.x),
            y: Some(pos.y),
        }
    }
}

/// Text overlay values for the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub chain_multiplier: f64,
    pub max_chain_depth: u32,
    pub phase: GamePhase,
}

/// Complete game state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub player: PlayerShip,
    /// Unordered
    pub enemies: Vec<EnemyShip>,
    /// Unordered
    pub explosions: Vec<Explosion>,
    /// Never decreases
    pub score: u64,
    pub lives: u32,
    /// Display only
    pub level: u32,
    pub is_paused: bool,
    /// Terminal until reset
    pub is_game_over: bool,
    /// Multiplier applied on the most recent scoring tick
    pub chain_multiplier: f64,
    /// Deepest chain reached this game
    pub max_chain_depth: u32,
    pub last_enemy_spawn: Millis,
    /// Next entity ID
    next_id: u64,
}

impl GameState {
    /// Create the initial state: paused, full lives, player centered
    pub fn new(config: &GameConfig, now: Millis) -> Self {
        Self {
            player: PlayerShip::new(config),
            enemies: Vec::new(),
            explosions: Vec::new(),
            score: 0,
            lives: config.player_initial_lives,
            level: 1,
            is_paused: true,
            is_game_over: false,
            chain_multiplier: 1.0,
            max_chain_depth: 0,
            last_enemy_spawn: now,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Set lives, keeping the player's mirror in sync
    pub fn set_lives(&mut self, lives: u32) {
        self.lives = lives;
        self.player.lives = lives;
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_game_over {
            GamePhase::GameOver
        } else if self.is_paused {
            GamePhase::Paused
        } else {
            GamePhase::Running
        }
    }

    /// Active ships in draw order: enemies first, player on top
    pub fn ships(&self) -> impl Iterator<Item = Ship<'_>> {
        self.enemies
            .iter()
            .map(Ship::Enemy)
            .chain(std::iter::once(Ship::Player(&self.player)))
            .filter(|ship| ship.body().active)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            lives: self.lives,
            level: self.level,
            chain_multiplier: self.chain_multiplier,
            max_chain_depth: self.max_chain_depth,
            phase: self.phase(),
        }
    }

    /// Begin (or continue) play
    pub fn start(&self) -> Self {
        self.unpaused("start")
    }

    /// Continue after a pause
    pub fn resume(&self) -> Self {
        self.unpaused("resume")
    }

    fn unpaused(&self, action: &str) -> Self {
        if self.is_game_over {
            log::warn!("Ignoring {action}: game is over, reset first");
            return self.clone();
        }
        log::info!("Game running ({action})");
        Self {
            is_paused: false,
            ..self.clone()
        }
    }

    /// Freeze the simulation; nothing else changes
    pub fn pause(&self) -> Self {
        Self {
            is_paused: true,
            ..self.clone()
        }
    }

    /// Move the player, constrained to the canvas
    ///
    /// Ignored while the player is exploding or the game isn't running.
    pub fn with_player_moved(&self, mv: PlayerMove, config: &GameConfig) -> Self {
        if self.is_paused || self.is_game_over || self.player.is_exploding {
            return self.clone();
        }
        let current = self.player.body.position;
        let target = Vec2::new(mv.x.unwrap_or(current.x), mv.y.unwrap_or(current.y));
        let position = constrain_to_bounds(target, self.player.body.radius, config.bounds());

        let mut next = self.clone();
        next.player.body.position = position;
        next
    }

    /// Detonate the player's ship at its current position
    ///
    /// No-op while a detonation is already in progress or the game isn't
    /// running.
    pub fn with_explosion_triggered(&self, now: Millis, config: &GameConfig) -> Self {
        if self.player.is_exploding || self.is_paused || self.is_game_over {
            return self.clone();
        }

        let mut next = self.clone();
        let id = format!("explosion-{}", next.next_entity_id());
        next.explosions
            .push(Explosion::ignite(id, next.player.body.position, now, 0, config));
        next.player.is_exploding = true;
        next.player.explosion_start_time = Some(now);
        next.player.explosion_radius = 0.0;
        log::debug!("Player detonated at {:?}", next.player.body.position);
        next
    }

    /// Radius of the player's own blast at `now`
    pub fn player_explosion_radius(&self, now: Millis, config: &GameConfig) -> f32 {
        match self.player.explosion_start_time {
            Some(start) if self.player.is_exploding => {
                config.explosion_max_radius
                    * explosion_progress(start, config.explosion_duration, now) as f32
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(config: &GameConfig) -> GameState {
        GameState::new(config, 0.0).start()
    }

    #[test]
    fn test_initial_state() {
        let config = GameConfig::default();
        let state = GameState::new(&config, 1234.0);
        assert!(state.is_paused);
        assert!(!state.is_game_over);
        assert_eq!(state.lives, 3);
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.chain_multiplier, 1.0);
        assert_eq!(state.last_enemy_spawn, 1234.0);
        assert_eq!(state.player.body.position, Vec2::new(400.0, 300.0));
        assert_eq!(state.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_pause_only_sets_flag() {
        let config = GameConfig::default();
        let state = running(&config);
        let paused = state.pause();
        assert!(paused.is_paused);
        assert_eq!(
            GameState {
                is_paused: false,
                ..paused
            },
            state
        );
    }

    #[test]
    fn test_start_ignored_after_game_over() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 0.0);
        state.is_game_over = true;
        let started = state.start();
        assert!(started.is_paused);
        assert_eq!(started.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_player_move_partial_and_clamped() {
        let config = GameConfig::default();
        let state = running(&config);

        let moved = state.with_player_moved(PlayerMove { x: Some(100.0), y: None }, &config);
        assert_eq!(moved.player.body.position, Vec2::new(100.0, 300.0));

        let clamped = moved.with_player_moved(PlayerMove::to(Vec2::new(-40.0, 900.0)), &config);
        assert_eq!(clamped.player.body.position, Vec2::new(15.0, 585.0));
    }

    #[test]
    fn test_player_move_suppressed_while_exploding() {
        let config = GameConfig::default();
        let state = running(&config).with_explosion_triggered(10.0, &config);
        let moved = state.with_player_moved(PlayerMove::to(Vec2::new(50.0, 50.0)), &config);
        assert_eq!(moved.player.body.position, state.player.body.position);
    }

    #[test]
    fn test_trigger_explosion_once() {
        let config = GameConfig::default();
        let state = running(&config);

        let exploding = state.with_explosion_triggered(500.0, &config);
        assert!(exploding.player.is_exploding);
        assert_eq!(exploding.player.explosion_start_time, Some(500.0));
        assert_eq!(exploding.explosions.len(), 1);
        let blast = &exploding.explosions[0];
        assert_eq!(blast.chain_depth, 0);
        assert_eq!(blast.radius, 0.0);
        assert_eq!(blast.position, state.player.body.position);

        // Re-entrancy guard
        let again = exploding.with_explosion_triggered(600.0, &config);
        assert_eq!(again, exploding);
    }

    #[test]
    fn test_ships_draw_order() {
        let config = GameConfig::default();
        let mut state = running(&config);
        state.enemies.push(EnemyShip {
            body: Body {
                id: "enemy-a".into(),
                position: Vec2::new(10.0, 10.0),
                velocity: Vec2::ZERO,
                radius: 12.0,
                active: true,
            },
            points: 100,
            formation_id: "formation-1".into(),
        });

        let ids: Vec<_> = state.ships().map(|s| s.body().id.clone()).collect();
        assert_eq!(ids, vec!["enemy-a".to_string(), PLAYER_ID.to_string()]);
    }

    #[test]
    fn test_hud_tracks_state() {
        let config = GameConfig::default();
        let mut state = running(&config);
        state.score = 450;
        state.max_chain_depth = 2;
        state.chain_multiplier = 2.25;

        let hud = state.hud();
        assert_eq!(hud.score, 450);
        assert_eq!(hud.lives, 3);
        assert_eq!(hud.level, 1);
        assert_eq!(hud.max_chain_depth, 2);
        assert_eq!(hud.chain_multiplier, 2.25);
        assert_eq!(hud.phase, GamePhase::Running);
        assert_eq!(state.pause().hud().phase, GamePhase::Paused);
    }

    #[test]
    fn test_entity_ids_unique() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 0.0);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }
}
