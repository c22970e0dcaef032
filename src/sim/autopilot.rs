//! Demo autopilot
//!
//! Plays the game well enough for attract mode and the headless driver:
//! steer toward the densest cluster of on-screen enemies and detonate once
//! enough of them are inside the blast.

use glam::Vec2;

use super::physics::is_within_bounds;
use super::state::GameState;
use crate::config::GameConfig;
use crate::controls::HeldKeys;

/// What the autopilot wants to do this input step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutopilotInput {
    pub held: HeldKeys,
    pub detonate: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// Enemies that must be in reach before spending a life on a detonation
    pub min_targets: usize,
    /// Fraction of the max blast radius counted as "in reach" (enemies keep
    /// moving while the blast grows)
    pub reach_factor: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            min_targets: 3,
            reach_factor: 0.6,
        }
    }
}

impl Autopilot {
    pub fn decide(&self, state: &GameState, config: &GameConfig) -> AutopilotInput {
        if state.is_paused || state.is_game_over || state.player.is_exploding {
            return AutopilotInput::default();
        }

        let bounds = config.bounds();
        let visible: Vec<Vec2> = state
            .enemies
            .iter()
            .filter(|e| e.body.active && is_within_bounds(e.body.position, 0.0, bounds))
            .map(|e| e.body.position)
            .collect();
        if visible.is_empty() {
            return AutopilotInput::default();
        }

        let reach = config.explosion_max_radius * self.reach_factor;
        let player = state.player.body.position;
        let in_reach = |center: Vec2| visible.iter().filter(|p| p.distance(center) < reach).count();

        if in_reach(player) >= self.min_targets {
            log::debug!("Autopilot detonating near {} enemies", in_reach(player));
            return AutopilotInput {
                held: HeldKeys::default(),
                detonate: true,
            };
        }

        // Densest cluster wins, nearest breaks ties
        let target = visible
            .iter()
            .copied()
            .max_by(|a, b| {
                in_reach(*a).cmp(&in_reach(*b)).then_with(|| {
                    b.distance(player)
                        .partial_cmp(&a.distance(player))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
            })
            .unwrap_or(player);

        AutopilotInput {
            held: HeldKeys::toward(player, target, config.player_speed),
            detonate: false,
        }
    }
}
