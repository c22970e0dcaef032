//! Chain Reaction headless driver
//!
//! Runs a game at a fixed display cadence with the demo autopilot at the
//! controls, then prints the final HUD as JSON. Handy for balance checks:
//!
//!   RUST_LOG=debug cargo run -- --seed 7 --seconds 300

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use chain_reaction::controls::{HeldKeys, next_position};
use chain_reaction::sim::{Autopilot, GameState, PlayerMove};
use chain_reaction::{GameConfig, GameSession, Millis};

#[derive(Parser)]
#[command(name = "chain-reaction")]
#[command(about = "Play a headless Chain Reaction game with the demo autopilot")]
struct Args {
    /// JSON config overriding the default tuning
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for formation selection
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Simulated seconds to play (stops early on game over)
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,
    /// Simulation steps per second (display refresh rate)
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

/// Driver state around the session
struct Game {
    session: GameSession,
    autopilot: Autopilot,
    held: HeldKeys,
    /// Movement input is rate-limited separately from the simulation
    last_input: Millis,
    detonations: u32,
}

impl Game {
    fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            session: GameSession::seeded(config, seed),
            autopilot: Autopilot::default(),
            held: HeldKeys::default(),
            last_input: 0.0,
            detonations: 0,
        }
    }

    /// Feed input for this frame
    fn handle_input(&mut self, now: Millis) -> Result<()> {
        let config = self.session.config().clone();
        if now - self.last_input < config.input_interval() {
            return Ok(());
        }
        self.last_input = now;

        let state = self.session.state()?;
        let decision = self.autopilot.decide(state, &config);
        self.held = decision.held;

        if decision.detonate {
            self.session.trigger_explosion(now)?;
            self.detonations += 1;
        } else if !self.held.is_idle() && !state.player.is_exploding {
            let target = next_position(state.player.body.position, self.held, &config);
            self.session.update_player(PlayerMove::to(target))?;
        }
        Ok(())
    }

    /// Run one display frame
    fn update(&mut self, now: Millis) -> Result<&GameState> {
        self.handle_input(now)?;
        Ok(self.session.advance(now)?)
    }
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    anyhow::ensure!(args.fps > 0, "fps must be > 0");

    let frame_ms = 1000.0 / f64::from(args.fps);
    let end = args.seconds * 1000.0;
    let mut game = Game::new(config, args.seed);

    game.session.open(0.0);
    game.session.start_game()?;
    log::info!("Playing {}s at {} fps (seed {})", args.seconds, args.fps, args.seed);

    let mut now = 0.0;
    let mut next_report = 10_000.0;
    while now < end {
        now += frame_ms;
        let state = game.update(now)?;

        if now >= next_report {
            log::info!(
                "t={:.0}s score={} lives={} enemies={} explosions={}",
                now / 1000.0,
                state.score,
                state.lives,
                state.enemies.len(),
                state.explosions.len()
            );
            next_report += 10_000.0;
        }
        if state.is_game_over {
            break;
        }
    }

    let state = game.session.state()?;
    log::info!(
        "Finished at t={:.1}s after {} detonations",
        now / 1000.0,
        game.detonations
    );
    let hud = serde_json::to_string_pretty(&state.hud()).context("serializing HUD")?;
    println!("{hud}");

    Ok(())
}
