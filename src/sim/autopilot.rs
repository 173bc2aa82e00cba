//! Demo player for headless runs
//!
//! Issues the same input calls a human would: chase the nearest free meat,
//! hook it once it is within range, blink toward it when it is far away.

use glam::Vec2;

use super::entity::Castable;
use super::state::{GameState, InputMode};

/// Seconds of lead when aiming at a moving meat
const AIM_LEAD_SECS: f32 = 0.15;
/// Blink only toward meats farther than this fraction of dagger reach
const BLINK_MIN_RATIO: f32 = 0.5;

/// Feed one round of input into the session
pub fn autopilot(state: &mut GameState) {
    let now = state.clock.now();
    if state.is_casting() || state.hook.state.pending || state.dagger.state.pending {
        return;
    }
    if !state.hook.is_ready(now) {
        return;
    }

    let pudge = state.pudge.body.pos;
    let Some((target, distance)) = nearest_free_meat(state, pudge) else {
        return;
    };

    if distance <= state.progression.hook_cast_range() {
        state.set_input_mode(InputMode::Hook);
        state.launch_input(target);
    } else if state.dagger.is_ready(now)
        && distance > state.progression.dagger_max_distance() * BLINK_MIN_RATIO
    {
        let landing = target.lerp(pudge, 0.5);
        state.set_input_mode(InputMode::Dagger);
        state.launch_input(landing);
    } else {
        state.player_move(target);
    }
}

/// Predicted position and distance of the closest meat no ability is holding
fn nearest_free_meat(state: &GameState, from: Vec2) -> Option<(Vec2, f32)> {
    state
        .meats
        .iter()
        .filter(|meat| meat.body.force_move_source.is_none())
        .map(|meat| {
            let lead = meat.body.pos + meat.delta * AIM_LEAD_SECS;
            (lead, from.distance(lead))
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MODEL_UPDATE_PERIOD_MS;
    use crate::sim::clock::{Clock, ManualTime};
    use crate::sim::tick::update_models;
    use crate::tuning::Tuning;

    #[test]
    fn test_autopilot_scores() {
        let time = ManualTime::new();
        let mut state = GameState::new(Tuning::default(), Clock::new(time.clone()), 99)
            .expect("valid tuning");
        state.initialize(20.0, 800.0, 600.0);
        state.set_running(true);

        loop {
            autopilot(&mut state);
            time.advance(MODEL_UPDATE_PERIOD_MS as f64);
            if update_models(&mut state) {
                break;
            }
        }
        assert!(state.hook.stats().uses > 0);
        assert!(state.progression.current_score() > 0);
    }

    #[test]
    fn test_autopilot_waits_while_paused() {
        let time = ManualTime::new();
        let mut state = GameState::new(Tuning::default(), Clock::new(time), 1)
            .expect("valid tuning");
        let dest = state.pudge.dest;
        autopilot(&mut state);
        assert_eq!(state.pudge.dest, dest);
        assert!(!state.hook.state.pending);
    }
}
