//! Meat Hook entry point
//!
//! Runs a headless demo session: the autopilot plays one round on a manually
//! stepped clock and the game-over summary is printed as JSON.
//!
//! Usage: `meat-hook [tuning.json] [seed]`

use meat_hook::sim::{Clock, GameEvent, GameState, ManualTime, autopilot, update_models};
use meat_hook::{HighScores, Tuning, TuningError};

/// Log a progress line every this many model ticks
const REPORT_EVERY_TICKS: u64 = 500;

fn load_tuning(path: Option<&str>) -> Result<Tuning, TuningError> {
    match path {
        Some(path) => Tuning::load(path),
        None => Ok(Tuning::default()),
    }
}

fn main() {
    env_logger::init();
    log::info!("Meat Hook (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let tuning_path = args.get(1).map(String::as_str);
    let tuning = match load_tuning(tuning_path) {
        Ok(tuning) => tuning,
        Err(err) => {
            log::error!(
                "Failed to load tuning from {}: {err}",
                tuning_path.unwrap_or("defaults")
            );
            std::process::exit(1);
        }
    };
    let seed = args
        .get(2)
        .and_then(|seed| seed.parse::<u64>().ok())
        .unwrap_or(0x5eed);
    let period = tuning.model_update_period_ms as f64;

    let time = ManualTime::new();
    let mut state = match GameState::new(tuning, Clock::new(time.clone()), seed) {
        Ok(state) => state,
        Err(err) => {
            log::error!("Unusable tuning: {err}");
            std::process::exit(1);
        }
    };
    state.set_running(true);

    let mut ticks: u64 = 0;
    loop {
        autopilot(&mut state);
        time.advance(period);
        let over = update_models(&mut state);
        ticks += 1;

        for event in state.drain_events() {
            match event {
                GameEvent::HookCatch { score, combo, .. } => {
                    log::debug!("Catch +{score} (combo {combo})");
                }
                GameEvent::LevelUp { label, .. } => log::info!("Reached {label}"),
                GameEvent::Experience { .. } | GameEvent::GameOver => {}
            }
        }

        if ticks % REPORT_EVERY_TICKS == 0 {
            let snapshot = state.snapshot();
            log::info!(
                "{:>5.1}s left | {} pts | {} ({:.0}%)",
                snapshot.timer,
                snapshot.score,
                snapshot.level_label,
                snapshot.experience * 100.0
            );
        }
        if over {
            break;
        }
    }

    let mut scores = HighScores::new();
    let summary = state.finish(&mut scores);
    log::info!("Played {ticks} ticks of {period}ms");
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize summary: {err}"),
    }
}
