//! Game session
//!
//! Owns the current [`GameState`] snapshot along with the config and spawn
//! source, and exposes the lifecycle and input operations a driver needs.
//! Every operation replaces the snapshot wholesale.

use rand_pcg::Pcg32;

use crate::Millis;
use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::sim::{GameState, PlayerMove, RandomSpawns, SpawnSource, tick};

/// A single player's game, from open to close
#[derive(Debug)]
pub struct GameSession<S: SpawnSource = RandomSpawns<Pcg32>> {
    config: GameConfig,
    spawns: S,
    state: Option<GameState>,
}

impl GameSession {
    /// Session with randomly chosen formations, reproducible from `seed`
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::new(config, RandomSpawns::seeded(seed))
    }
}

impl<S: SpawnSource> GameSession<S> {
    /// Create a session; no state exists until [`GameSession::open`]
    pub fn new(config: GameConfig, spawns: S) -> Self {
        Self {
            config,
            spawns,
            state: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Build the initial (paused) state
    pub fn open(&mut self, now: Millis) -> &GameState {
        log::info!("Opening game session");
        self.state.insert(GameState::new(&self.config, now))
    }

    /// Drop the state; later reads fail until reopened
    pub fn close(&mut self) -> Option<GameState> {
        log::info!("Closing game session");
        self.state.take()
    }

    /// Current snapshot
    pub fn state(&self) -> Result<&GameState> {
        self.state.as_ref().ok_or(Error::SessionNotInitialized)
    }

    fn apply<F>(&mut self, f: F) -> Result<&GameState>
    where
        F: FnOnce(&GameState, &GameConfig, &mut S) -> GameState,
    {
        let current = self.state.as_ref().ok_or(Error::SessionNotInitialized)?;
        let next = f(current, &self.config, &mut self.spawns);
        Ok(&*self.state.insert(next))
    }

    pub fn start_game(&mut self) -> Result<&GameState> {
        self.apply(|state, _, _| state.start())
    }

    pub fn pause_game(&mut self) -> Result<&GameState> {
        self.apply(|state, _, _| state.pause())
    }

    pub fn resume_game(&mut self) -> Result<&GameState> {
        self.apply(|state, _, _| state.resume())
    }

    /// Replace everything with a fresh initial state
    pub fn reset_game(&mut self, now: Millis) -> Result<&GameState> {
        log::info!("Resetting game");
        self.apply(|_, config, _| GameState::new(config, now))
    }

    pub fn update_player(&mut self, mv: PlayerMove) -> Result<&GameState> {
        self.apply(|state, config, _| state.with_player_moved(mv, config))
    }

    pub fn trigger_explosion(&mut self, now: Millis) -> Result<&GameState> {
        self.apply(|state, config, _| state.with_explosion_triggered(now, config))
    }

    /// Run one simulation step
    pub fn advance(&mut self, now: Millis) -> Result<&GameState> {
        self.apply(|state, config, spawns| tick(state, now, config, spawns))
    }
}
