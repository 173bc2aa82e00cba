//! One model tick
//!
//! Order within a tick is fixed: the hook's catch check first (so a catch is
//! visible to the same tick's movement pass), then the clock read, then every
//! tracked object's model update, then the countdown.

use super::entity::{Castable, CastableId, LinkUpdate, Movable, MovableId, MoveContext, Stride};
use super::state::{GameEvent, GameState};

/// Advance the session by one model tick; returns true once the timer has run out
pub fn update_models(state: &mut GameState) -> bool {
    resolve_hook_attack(state);

    let previous = state.clock.now();
    let now = state.clock.update();
    let elapsed = ((now - previous) / 1000.0) as f32;

    update_pudge(state, now, elapsed);

    if state.hook.update_model(now, &state.progression) == LinkUpdate::Release {
        state.unlink_object(CastableId::Hook);
    }
    if state.dagger.update_model(now, &state.progression) == LinkUpdate::Release {
        state.unlink_object(CastableId::Dagger);
    }

    update_meats(state, now, elapsed);

    state.timer -= elapsed;
    if state.timer < 0.0 && !state.game_over {
        state.game_over = true;
        state.events.push(GameEvent::GameOver);
        log::info!(
            "Time up: score {} at {}",
            state.progression.current_score(),
            state.progression.current().label
        );
    }
    state.game_over
}

fn resolve_hook_attack(state: &mut GameState) {
    let now = state.clock.now();
    let Some(index) = state
        .hook
        .try_attack(now, state.meats.iter().map(|meat| &meat.body))
    else {
        return;
    };
    state.link_object(CastableId::Hook, MovableId::Meat(index));

    let victim = &state.meats[index];
    let pos = victim.body.pos;
    let distance = pos.distance(state.pudge.body.pos);
    let speed = victim.current_speed;
    let combo = state.hook.streak();

    let level_before = state.progression.current_level();
    let score = state.progression.gain_score(distance, speed, combo);
    let level = state.progression.current_level();

    state.events.push(GameEvent::HookCatch { score, combo, pos });
    state.events.push(GameEvent::Experience {
        level,
        ratio: state.progression.exp_value(),
    });
    if level != level_before {
        let label = state.progression.current().label.clone();
        log::info!("Level up: {label}");
        state.events.push(GameEvent::LevelUp { level, label });
    }
}

fn update_pudge(state: &mut GameState, now: f64, elapsed: f32) {
    let source = state
        .pudge
        .body
        .force_move_source
        .map(|id| state.castable(id).pos());
    if source.is_none() && state.is_casting() {
        return;
    }

    let stride = {
        let GameState {
            pudge,
            progression,
            rng,
            ..
        } = &mut *state;
        let mut ctx = MoveContext {
            now,
            elapsed,
            progression,
            rng,
        };
        pudge.update_model(source, &mut ctx)
    };

    if stride == Stride::Arrived {
        for id in state.pudge.castables.clone() {
            if state.try_cast(id) {
                state.stop_action();
                break;
            }
        }
        let field = state.progression.field();
        state.pudge.body.clip_to_field(field);
    }
}

fn update_meats(state: &mut GameState, now: f64, elapsed: f32) {
    let GameState {
        meats,
        hook,
        dagger,
        progression,
        rng,
        ..
    } = state;
    let mut ctx = MoveContext {
        now,
        elapsed,
        progression,
        rng,
    };
    for meat in meats.iter_mut() {
        let source = meat.body.force_move_source.map(|id| match id {
            CastableId::Hook => hook.pos(),
            CastableId::Dagger => dagger.pos(),
        });
        meat.update_model(source, &mut ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MODEL_UPDATE_PERIOD_MS;
    use crate::sim::clock::{Clock, ManualTime};
    use crate::sim::state::InputMode;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn session(tuning: Tuning) -> (GameState, ManualTime) {
        let time = ManualTime::new();
        let mut state = GameState::new(tuning, Clock::new(time.clone()), 1234)
            .expect("valid tuning");
        state.set_running(true);
        (state, time)
    }

    fn step(state: &mut GameState, time: &ManualTime) -> bool {
        time.advance(MODEL_UPDATE_PERIOD_MS as f64);
        update_models(state)
    }

    /// Park every meat in a corner, far from the action
    fn park_meats(state: &mut GameState) {
        for meat in &mut state.meats {
            meat.body.pos = Vec2::new(40.0, 40.0);
            meat.delta = Vec2::ZERO;
            meat.trend_end = f64::MAX;
        }
    }

    #[test]
    fn test_walk_then_hook_fires_on_arrival() {
        let mut tuning = Tuning::default();
        tuning.levels[0].hook_range_ratio = 0.3;
        let (mut state, time) = session(tuning);
        park_meats(&mut state);

        state.set_input_mode(InputMode::Hook);
        state.launch_input(Vec2::new(1000.0, 300.0));

        // 300 px at 300 px/s
        let mut fired_at = None;
        for _ in 0..120 {
            step(&mut state, &time);
            if !state.hook.state.pending {
                fired_at = Some(state.clock.now());
                break;
            }
        }
        let fired_at = fired_at.expect("hook should fire on arrival");
        assert!((fired_at - 1000.0).abs() <= MODEL_UPDATE_PERIOD_MS as f64);
        assert!((state.pudge.body.pos - Vec2::new(700.0, 300.0)).length() < 1.0);
        assert_eq!(state.pudge.dest, state.pudge.body.pos);
        assert!(state.hook.is_casting(state.clock.now()));
        assert_eq!(state.hook.trials(), &[false]);
    }

    #[test]
    fn test_pudge_frozen_during_backswing() {
        let (mut state, time) = session(Tuning::default());
        park_meats(&mut state);
        state.dagger.state.backswing_end = 500.0;
        state.pudge.dest = Vec2::new(600.0, 300.0);
        let start = state.pudge.body.pos;
        for _ in 0..10 {
            step(&mut state, &time);
        }
        assert_eq!(state.pudge.body.pos, start);
    }

    #[test]
    fn test_dagger_blink() {
        let (mut state, time) = session(Tuning::default());
        park_meats(&mut state);
        let start = state.pudge.body.pos;
        let click = Vec2::new(600.0, 300.0);

        state.set_input_mode(InputMode::Dagger);
        state.launch_input(click);
        assert_eq!(state.pudge.dest, start);

        step(&mut state, &time);
        assert!(!state.dagger.state.pending);
        assert_eq!(state.dagger.state.linked, Some(MovableId::Pudge));
        assert_eq!(state.pudge.body.force_move_source, Some(CastableId::Dagger));
        let cast_at = state.clock.now();

        // Blink completes by the end of backswing, then the link drops
        for _ in 0..15 {
            step(&mut state, &time);
        }
        assert!(state.clock.now() > cast_at + 120.0);
        assert_eq!(state.pudge.body.pos, click);
        assert_eq!(state.pudge.body.force_move_source, None);
        assert_eq!(state.dagger.state.linked, None);
        assert!(!state.dagger.is_ready(state.clock.now()));
        assert_eq!(state.dagger.stats().uses, 1);
    }

    #[test]
    fn test_catch_scores_and_drags_meat() {
        let mut tuning = Tuning::default();
        tuning.levels[0].hook_range_ratio = 0.3;
        let (mut state, time) = session(tuning);
        park_meats(&mut state);

        // Meat sitting right on the hook's path
        state.meats[3].body.pos = Vec2::new(520.0, 300.0);
        state.meats[3].current_speed = 90.0;
        state.register(CastableId::Hook, Vec2::new(700.0, 300.0));
        assert!(state.hook.state.pending);

        let mut caught = false;
        for _ in 0..20 {
            step(&mut state, &time);
            if state.meats[3].body.force_move_source == Some(CastableId::Hook) {
                caught = true;
                break;
            }
        }
        assert!(caught);
        assert!(state.progression.current_score() > 0);
        assert_eq!(state.hook.trials(), &[true]);

        let events = state.drain_events();
        assert!(matches!(events[0], GameEvent::HookCatch { combo: 1, .. }));
        assert!(matches!(events[1], GameEvent::Experience { level: 0, .. }));
        assert!(state.drain_events().is_empty());

        // Dragged back to the caster, then released somewhere random
        for _ in 0..40 {
            step(&mut state, &time);
        }
        assert_eq!(state.meats[3].body.force_move_source, None);
        assert_eq!(state.hook.state.linked, None);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let (mut state, time) = session(Tuning::default());
        state.player_move(Vec2::new(700.0, 300.0));
        step(&mut state, &time);

        state.set_running(false);
        // The first frozen tick may still pull stray meats inside the walls
        step(&mut state, &time);
        let pudge = state.pudge.body.pos;
        let meats: Vec<Vec2> = state.meats.iter().map(|m| m.body.pos).collect();
        let timer = state.timer;
        for _ in 0..50 {
            step(&mut state, &time);
        }
        assert_eq!(state.pudge.body.pos, pudge);
        assert_eq!(state.timer, timer);
        let after: Vec<Vec2> = state.meats.iter().map(|m| m.body.pos).collect();
        assert_eq!(after, meats);

        state.set_running(true);
        step(&mut state, &time);
        assert_ne!(state.pudge.body.pos, pudge);
    }

    #[test]
    fn test_pause_mid_backswing_resumes_in_place() {
        let (mut state, time) = session(Tuning::default());
        park_meats(&mut state);
        state.set_input_mode(InputMode::Dagger);
        state.launch_input(Vec2::new(600.0, 300.0));

        // Cast at 12 ms, backswing until 132 ms
        for _ in 0..5 {
            step(&mut state, &time);
        }
        assert_eq!(state.clock.now(), 60.0);
        let backswing_end = state.dagger.state.backswing_end;
        let skill_end = state.dagger.state.skill_end;
        let blink = state.dagger.pos();
        assert_eq!(backswing_end, 132.0);
        assert!((blink.x - 480.0).abs() < 1e-3);

        state.set_running(false);
        time.advance(10_000.0);
        for _ in 0..100 {
            step(&mut state, &time);
        }
        assert_eq!(state.clock.now(), 60.0);
        assert_eq!(state.dagger.state.backswing_end, backswing_end);
        assert_eq!(state.dagger.state.skill_end, skill_end);
        assert_eq!(state.dagger.pos(), blink);
        assert_eq!(state.pudge.body.pos, blink);
        assert!(state.dagger.is_casting(state.clock.now()));

        state.set_running(true);
        step(&mut state, &time);
        assert_eq!(state.clock.now(), 72.0);
        assert!(state.dagger.is_casting(state.clock.now()));
        assert!((state.dagger.pos().x - 500.0).abs() < 1e-3);
        assert_eq!(state.pudge.body.force_move_source, Some(CastableId::Dagger));
    }

    #[test]
    fn test_game_over_signalled_once() {
        let time = ManualTime::new();
        let mut state = GameState::new(Tuning::default(), Clock::new(time.clone()), 7)
            .expect("valid tuning");
        state.initialize(0.05, 800.0, 600.0);
        state.set_running(true);

        let mut ticks = 0;
        while !step(&mut state, &time) {
            ticks += 1;
            assert!(ticks < 10);
        }
        assert!(state.is_game_over());
        assert!(step(&mut state, &time));
        let overs = state
            .drain_events()
            .into_iter()
            .filter(|event| *event == GameEvent::GameOver)
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_level_up_event() {
        let mut tuning = Tuning::default();
        tuning.levels[0].score_threshold = Some(1);
        tuning.levels[0].hook_range_ratio = 0.3;
        let (mut state, time) = session(tuning);
        park_meats(&mut state);
        state.meats[0].body.pos = Vec2::new(450.0, 300.0);
        state.register(CastableId::Hook, Vec2::new(700.0, 300.0));

        let mut events = Vec::new();
        for _ in 0..20 {
            step(&mut state, &time);
            events.extend(state.drain_events());
        }
        assert_eq!(state.progression.current_level(), 1);
        assert!(events.iter().any(|event| matches!(
            event,
            GameEvent::LevelUp { level: 1, label } if label == "Lv2"
        )));
    }
}
