//! Simulation step
//!
//! Advances a [`GameState`] snapshot to a timestamp. The step is a pure
//! function of the previous state, the timestamp, the config and the spawn
//! source; the driver decides how often to call it.

use super::formation::{SpawnSource, create_formation};
use super::physics::{advance_explosion, explosion_hits, has_left_bounds};
use super::state::{Explosion, GameState};
use crate::Millis;
use crate::config::GameConfig;

/// Advance the game to `now`
///
/// Paused and finished games come back unchanged. Otherwise, in order:
/// explosions grow and chain into enemies, destroyed enemies are scored,
/// score thresholds grant bonus lives, survivors move and stragglers despawn,
/// the player's detonation resolves, and a new formation spawns when due.
pub fn tick<S: SpawnSource + ?Sized>(
    state: &GameState,
    now: Millis,
    config: &GameConfig,
    spawns: &mut S,
) -> GameState {
    // Don't tick if paused or game over
    if state.is_paused || state.is_game_over {
        return state.clone();
    }

    let mut next = state.clone();
    let score_before = state.score;

    // --- EXPLOSIONS & CHAINS ---
    // First explosion in iteration order to reach an enemy claims it
    let mut destroyed = vec![false; state.enemies.len()];
    let mut surviving = Vec::with_capacity(state.explosions.len());
    let mut chained: Vec<Explosion> = Vec::new();

    for explosion in &state.explosions {
        let (updated, complete) = advance_explosion(explosion, now);
        if complete {
            continue;
        }

        for (idx, enemy) in state.enemies.iter().enumerate() {
            if !enemy.body.active || destroyed[idx] {
                continue;
            }
            if explosion_hits(&updated, &enemy.body, config.collision_threshold) {
                destroyed[idx] = true;
                let id = format!("explosion-{}", next.next_entity_id());
                chained.push(Explosion::ignite(
                    id,
                    enemy.body.position,
                    now,
                    updated.chain_depth + 1,
                    config,
                ));
            }
        }

        surviving.push(updated);
    }

    let destroyed_count = chained.len();
    let explosions_active = !surviving.is_empty() || !chained.is_empty();

    // --- SCORING ---
    if destroyed_count > 0 {
        let depth = chained.iter().map(|e| e.chain_depth).max().unwrap_or(0);
        let multiplier = config.chain_multiplier.powi(depth as i32);
        let points = (destroyed_count as f64 * config.base_enemy_points as f64 * multiplier).floor() as u64;

        next.score = next.score.saturating_add(points);
        next.max_chain_depth = next.max_chain_depth.max(depth);
        next.chain_multiplier = multiplier;
        log::debug!(
            "Destroyed {destroyed_count} enemies at chain depth {depth} (x{multiplier:.2}): +{points}"
        );
    } else if !explosions_active {
        next.chain_multiplier = 1.0;
    }

    surviving.append(&mut chained);
    next.explosions = surviving;

    // --- LIFE BONUS ---
    let threshold = config.life_bonus_threshold.max(1);
    let bonus = next.score / threshold - score_before / threshold;
    if bonus > 0 {
        let lives = next.lives.saturating_add(u32::try_from(bonus).unwrap_or(u32::MAX));
        next.set_lives(lives);
        log::info!("Score {} earned {bonus} bonus life(s), lives now {lives}", next.score);
    }

    // --- ENEMIES ---
    let bounds = config.bounds();
    next.enemies = state
        .enemies
        .iter()
        .zip(destroyed)
        .filter(|(enemy, destroyed)| enemy.body.active && !destroyed)
        .filter_map(|(enemy, _)| {
            let mut enemy = enemy.clone();
            enemy.body.position += enemy.body.velocity;
            // Let them clear the screen completely before despawning
            let margin = enemy.body.radius * 2.0;
            if has_left_bounds(enemy.body.position, enemy.body.velocity, margin, bounds) {
                None
            } else {
                Some(enemy)
            }
        })
        .collect();

    // --- PLAYER DETONATION ---
    if next.player.is_exploding {
        if let Some(start) = next.player.explosion_start_time {
            if now - start >= config.explosion_duration {
                next.player.is_exploding = false;
                next.player.explosion_start_time = None;
                next.player.explosion_radius = 0.0;

                let lives = next.lives.saturating_sub(1);
                next.set_lives(lives);
                log::debug!("Player detonation finished, lives now {lives}");

                if lives == 0 {
                    next.is_game_over = true;
                    next.is_paused = true;
                    log::info!(
                        "Game over: score {}, deepest chain {}",
                        next.score,
                        next.max_chain_depth
                    );
                }
            } else {
                next.player.explosion_radius = next.player_explosion_radius(now, config);
            }
        }
    }

    // --- SPAWN ---
    // At most one formation per tick; missed intervals are not made up
    if now - next.last_enemy_spawn >= config.enemy_spawn_interval {
        let formation = spawns.next_formation(config);
        let formation_id = format!("formation-{}", next.next_entity_id());
        let enemies = create_formation(&formation, &formation_id, config);
        log::debug!(
            "Spawned {} ({} enemies from {:?})",
            formation_id,
            enemies.len(),
            formation.start_side
        );
        next.enemies.extend(enemies);
        next.last_enemy_spawn = now;
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::formation::{FormationConfig, FormationKind, RandomSpawns, StartSide};
    use crate::sim::state::{Body, EnemyShip, PlayerMove};
    use glam::Vec2;
    use proptest::prelude::*;

    /// Always spawns the same formation
    struct FixedSpawns(FormationConfig);

    impl SpawnSource for FixedSpawns {
        fn next_formation(&mut self, _game: &GameConfig) -> FormationConfig {
            self.0
        }
    }

    fn line_from_top() -> FixedSpawns {
        FixedSpawns(FormationConfig {
            kind: FormationKind::Line,
            enemy_count: 5,
            speed: 2.0,
            start_side: StartSide::Top,
        })
    }

    fn running(config: &GameConfig) -> GameState {
        GameState::new(config, 0.0).start()
    }

    fn enemy_at(id: &str, position: Vec2, velocity: Vec2) -> EnemyShip {
        EnemyShip {
            body: Body {
                id: id.to_string(),
                position,
                velocity,
                radius: 12.0,
                active: true,
            },
            points: 100,
            formation_id: "formation-test".to_string(),
        }
    }

    fn blast_at(id: &str, position: Vec2, start_time: Millis, chain_depth: u32, config: &GameConfig) -> Explosion {
        Explosion::ignite(id.to_string(), position, start_time, chain_depth, config)
    }

    #[test]
    fn test_paused_state_unchanged() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 0.0);
        state.enemies.push(enemy_at("e", Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0)));
        state.explosions.push(blast_at("x", Vec2::new(100.0, 100.0), 0.0, 0, &config));
        assert!(state.is_paused);

        let next = tick(&state, 99_999.0, &config, &mut line_from_top());
        assert_eq!(next, state);
    }

    #[test]
    fn test_explosion_chain_scoring() {
        let config = GameConfig::default();
        let mut state = running(&config);
        state.explosions.push(blast_at("x", Vec2::new(100.0, 100.0), 0.0, 0, &config));
        state.enemies.push(enemy_at("near", Vec2::new(130.0, 100.0), Vec2::ZERO));
        state.enemies.push(enemy_at("far", Vec2::new(300.0, 100.0), Vec2::ZERO));

        // Radius 50 at t=1000: reaches "near" only
        let state = tick(&state, 1000.0, &config, &mut line_from_top());
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.explosions.len(), 2);
        let chained = &state.explosions[1];
        assert_eq!(chained.chain_depth, 1);
        assert_eq!(chained.position, Vec2::new(130.0, 100.0));
        assert_eq!(chained.radius, 0.0);
        assert_eq!(chained.start_time, 1000.0);
        assert_eq!(state.score, 150);
        assert_eq!(state.chain_multiplier, 1.5);
        assert_eq!(state.max_chain_depth, 1);

        // Bring the survivor within reach of the chained blast at x=130
        let mut state = state;
        state.enemies[0].body.position = Vec2::new(200.0, 100.0);
        // t=1600: chained radius 30, distance 70 -> miss; original radius 80, distance 100 -> miss
        let state = tick(&state, 1600.0, &config, &mut line_from_top());
        assert_eq!(state.enemies.len(), 1);
        // t=2900: original done; chained radius 95, distance 70 -> hit at depth 2
        let state = tick(&state, 2900.0, &config, &mut line_from_top());
        assert!(state.enemies.iter().all(|e| e.body.id != "far"));
        let deepest = state.explosions.iter().map(|e| e.chain_depth).max().unwrap();
        assert_eq!(deepest, 2);
        assert_eq!(state.score, 150 + 225);
        assert_eq!(state.chain_multiplier, 2.25);
        assert_eq!(state.max_chain_depth, 2);
    }

    #[test]
    fn test_single_hit_per_enemy_per_tick() {
        let config = GameConfig::default();
        let mut state = running(&config);
        state.explosions.push(blast_at("a", Vec2::new(100.0, 100.0), 0.0, 0, &config));
        state.explosions.push(blast_at("b", Vec2::new(105.0, 100.0), 0.0, 3, &config));
        state.enemies.push(enemy_at("target", Vec2::new(125.0, 100.0), Vec2::ZERO));

        let next = tick(&state, 1000.0, &config, &mut line_from_top());
        assert!(next.enemies.is_empty());
        // Both survivors plus exactly one chained explosion
        assert_eq!(next.explosions.len(), 3);
        let chained: Vec<_> = next.explosions.iter().filter(|e| e.start_time == 1000.0).collect();
        assert_eq!(chained.len(), 1);
        // First in iteration order wins the tie
        assert_eq!(chained[0].chain_depth, 1);
        assert_eq!(next.score, 150);
    }

    #[test]
    fn test_life_bonus_crossing() {
        let config = GameConfig {
            chain_multiplier: 1.0,
            ..GameConfig::default()
        };
        let mut state = running(&config);
        state.score = 9950;
        state.explosions.push(blast_at("x", Vec2::new(400.0, 300.0), 0.0, 0, &config));
        state.enemies.push(enemy_at("e", Vec2::new(430.0, 300.0), Vec2::ZERO));

        let next = tick(&state, 1000.0, &config, &mut line_from_top());
        assert_eq!(next.score, 10_050);
        assert_eq!(next.lives, state.lives + 1);
        assert_eq!(next.player.lives, next.lives);

        // No double credit on the following tick
        let after = tick(&next, 1016.0, &config, &mut line_from_top());
        assert_eq!(after.lives, next.lives);
    }

    #[test]
    fn test_life_bonus_multiple_thresholds() {
        let config = GameConfig {
            chain_multiplier: 1.0,
            life_bonus_threshold: 100,
            ..GameConfig::default()
        };
        let mut state = running(&config);
        state.explosions.push(blast_at("x", Vec2::new(400.0, 300.0), 0.0, 0, &config));
        for i in 0..3 {
            state
                .enemies
                .push(enemy_at(&format!("e{i}"), Vec2::new(420.0, 290.0 + i as f32 * 10.0), Vec2::ZERO));
        }

        let next = tick(&state, 1000.0, &config, &mut line_from_top());
        assert_eq!(next.score, 300);
        assert_eq!(next.lives, state.lives + 3);
    }

    #[test]
    fn test_multiplier_resets_when_idle() {
        let config = GameConfig::default();
        let mut state = running(&config);
        state.chain_multiplier = 2.25;

        // Explosion still burning: multiplier kept
        state.explosions.push(blast_at("x", Vec2::new(50.0, 50.0), 0.0, 0, &config));
        let burning = tick(&state, 500.0, &config, &mut line_from_top());
        assert_eq!(burning.chain_multiplier, 2.25);

        // Burned out: back to idle
        let idle = tick(&burning, 1999.0 + config.explosion_duration, &config, &mut line_from_top());
        assert!(idle.explosions.is_empty());
        assert_eq!(idle.chain_multiplier, 1.0);
    }

    #[test]
    fn test_enemies_move_and_despawn_off_screen() {
        let config = GameConfig::default();
        let mut state = running(&config);
        state.enemies.push(enemy_at("incoming", Vec2::new(400.0, -100.0), Vec2::new(0.0, 2.0)));
        state.enemies.push(enemy_at("leaving", Vec2::new(400.0, 630.0), Vec2::new(0.0, 2.0)));
        state.enemies.push(enemy_at("edge", Vec2::new(400.0, 610.0), Vec2::new(0.0, 2.0)));
        let mut ghost = enemy_at("ghost", Vec2::new(200.0, 200.0), Vec2::ZERO);
        ghost.body.active = false;
        state.enemies.push(ghost);

        let next = tick(&state, 16.0, &config, &mut line_from_top());
        let ids: Vec<_> = next.enemies.iter().map(|e| e.body.id.as_str()).collect();
        assert_eq!(ids, vec!["incoming", "edge"]);
        assert_eq!(next.enemies[0].body.position, Vec2::new(400.0, -98.0));
        assert_eq!(next.enemies[1].body.position, Vec2::new(400.0, 612.0));
    }

    #[test]
    fn test_player_detonation_costs_one_life() {
        let config = GameConfig::default();
        let state = running(&config).with_explosion_triggered(100.0, &config);

        let mid = tick(&state, 1100.0, &config, &mut line_from_top());
        assert!(mid.player.is_exploding);
        assert!((mid.player.explosion_radius - 50.0).abs() < 1e-3);
        assert_eq!(mid.lives, 3);

        let done = tick(&mid, 2100.0, &config, &mut line_from_top());
        assert!(!done.player.is_exploding);
        assert_eq!(done.player.explosion_start_time, None);
        assert_eq!(done.player.explosion_radius, 0.0);
        assert_eq!(done.lives, 2);
        assert_eq!(done.player.lives, 2);
        assert!(!done.is_game_over);

        // Exactly once per cycle
        let later = tick(&done, 2200.0, &config, &mut line_from_top());
        assert_eq!(later.lives, 2);
    }

    #[test]
    fn test_last_life_ends_game() {
        let config = GameConfig::default();
        let mut state = running(&config);
        state.set_lives(1);
        let t0 = 500.0;
        let state = state.with_explosion_triggered(t0, &config);

        let over = tick(&state, t0 + config.explosion_duration, &config, &mut line_from_top());
        assert_eq!(over.lives, 0);
        assert!(over.is_game_over);
        assert!(over.is_paused);

        // Terminal: nothing moves any more
        let frozen = tick(&over, t0 + 10_000.0, &config, &mut line_from_top());
        assert_eq!(frozen, over);
        assert_eq!(frozen.start(), over);
    }

    #[test]
    fn test_spawn_interval_without_debt() {
        let config = GameConfig::default();
        let state = running(&config);

        let early = tick(&state, 1999.0, &config, &mut line_from_top());
        assert!(early.enemies.is_empty());

        let first = tick(&early, 2000.0, &config, &mut line_from_top());
        assert_eq!(first.enemies.len(), 5);
        assert_eq!(first.last_enemy_spawn, 2000.0);
        let formation_id = first.enemies[0].formation_id.clone();
        assert!(first.enemies.iter().all(|e| e.formation_id == formation_id));

        // Several intervals elapsed, still one formation
        let second = tick(&first, 9000.0, &config, &mut line_from_top());
        assert_eq!(second.enemies.len(), 10);
        assert_eq!(second.last_enemy_spawn, 9000.0);
        assert_ne!(second.enemies[9].formation_id, formation_id);
    }

    #[test]
    fn test_unknown_formation_spawns_nothing() {
        let config = GameConfig::default();
        let state = running(&config);
        let mut spawns = FixedSpawns(FormationConfig {
            kind: FormationKind::Unknown,
            enemy_count: 5,
            speed: 2.0,
            start_side: StartSide::Left,
        });
        let next = tick(&state, 2000.0, &config, &mut spawns);
        assert!(next.enemies.is_empty());
        assert_eq!(next.last_enemy_spawn, 2000.0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = GameConfig::default();
        let mut a = running(&config);
        let mut b = running(&config);
        let mut spawns_a = RandomSpawns::seeded(99_999);
        let mut spawns_b = RandomSpawns::seeded(99_999);

        for frame in 1..=600 {
            let now = frame as f64 * 16.0;
            a = tick(&a, now, &config, &mut spawns_a);
            b = tick(&b, now, &config, &mut spawns_b);
        }
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_paused_tick_is_identity(now in 0.0f64..1.0e7, seed in any::<u64>()) {
            let config = GameConfig::default();
            let mut spawns = RandomSpawns::seeded(seed);
            let mut state = running(&config);
            for frame in 1..=200 {
                state = tick(&state, frame as f64 * 16.0, &config, &mut spawns);
            }
            let paused = state.pause();
            prop_assert_eq!(tick(&paused, now, &config, &mut spawns), paused);
        }

        #[test]
        fn prop_score_monotonic_and_chains_consistent(
            seed in any::<u64>(),
            steps in prop::collection::vec((1u32..40, any::<bool>(), 0.0f32..800.0, 0.0f32..600.0), 1..400),
        ) {
            let config = GameConfig::default();
            let mut spawns = RandomSpawns::seeded(seed);
            let mut state = running(&config);
            let mut now = 0.0;

            for (dt, detonate, x, y) in steps {
                now += f64::from(dt);
                let mut input = state.with_player_moved(PlayerMove { x: Some(x), y: Some(y) }, &config);
                // Detonate rarely so the game lasts
                if detonate && x < 80.0 {
                    input = input.with_explosion_triggered(now, &config);
                }

                let next = tick(&input, now, &config, &mut spawns);

                prop_assert!(next.score >= state.score);
                prop_assert_eq!(next.player.lives, next.lives);

                // Every new explosion either came from the player or from a live parent
                let parent_depths: Vec<u32> = input.explosions.iter().map(|e| e.chain_depth).collect();
                for explosion in &next.explosions {
                    let is_new = !input.explosions.iter().any(|e| e.id == explosion.id);
                    if is_new {
                        prop_assert!(explosion.chain_depth > 0);
                        prop_assert!(parent_depths.contains(&(explosion.chain_depth - 1)));
                    }
                    prop_assert!(explosion.chain_depth <= next.max_chain_depth || explosion.chain_depth == 0);
                }

                state = next;
            }
        }
    }
}
