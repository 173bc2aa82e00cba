//! Session state and the link relation between abilities and actors
//!
//! `GameState` is the arena: it owns the clock, the progression context, the
//! single Pudge with its Hook and Dagger, and the meats. Entities refer to
//! each other only through [`MovableId`] / [`CastableId`] handles, and every
//! operation that touches more than one entity lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::dagger::Dagger;
use super::entity::{CastEffect, Castable, CastableId, Movable, MovableId, MoveContext};
use super::hook::Hook;
use super::meat::Meat;
use super::progression::Progression;
use super::pudge::Pudge;
use crate::consts::{DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH, DEFAULT_TIMER_SECS};
use crate::tuning::{Tuning, TuningError};

/// What a primary click does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMode {
    #[default]
    Move,
    Hook,
    Dagger,
}

impl InputMode {
    /// Ability armed by this mode
    pub fn ability(self) -> Option<CastableId> {
        match self {
            InputMode::Move => None,
            InputMode::Hook => Some(CastableId::Hook),
            InputMode::Dagger => Some(CastableId::Dagger),
        }
    }

    /// CSS cursor the host shows for this mode
    pub fn cursor(self) -> &'static str {
        match self {
            InputMode::Move => "auto",
            InputMode::Hook => "crosshair",
            InputMode::Dagger => "cell",
        }
    }
}

/// Notifications for the progression display, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A hook catch: points awarded, current combo, where the victim was
    HookCatch { score: u64, combo: u32, pos: Vec2 },
    /// Experience bar after a catch
    Experience { level: usize, ratio: f32 },
    LevelUp { level: usize, label: String },
    GameOver,
}

#[derive(Debug)]
pub struct GameState {
    pub seed: u64,
    pub clock: Clock,
    pub progression: Progression,
    pub pudge: Pudge,
    pub hook: Hook,
    pub dagger: Dagger,
    pub meats: Vec<Meat>,
    /// Countdown (seconds)
    pub timer: f32,
    pub input_mode: InputMode,
    pub(crate) game_over: bool,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a session on the default field; call [`initialize`](Self::initialize) to start over
    pub fn new(tuning: Tuning, clock: Clock, seed: u64) -> Result<Self, TuningError> {
        let mut state = Self {
            seed,
            clock,
            progression: Progression::new(tuning)?,
            // Spawned by initialize
            pudge: Pudge::new(Vec2::ZERO, 0.0),
            hook: Hook::new(),
            dagger: Dagger::new(),
            meats: Vec::new(),
            timer: DEFAULT_TIMER_SECS,
            input_mode: InputMode::Move,
            game_over: false,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.initialize(DEFAULT_TIMER_SECS, DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT);
        Ok(state)
    }

    /// Reseed progression, clock and entities for a new round
    pub fn initialize(&mut self, timer_seconds: f32, width: f32, height: f32) {
        self.clock.reset();
        self.progression.reset(width, height);
        self.rng = Pcg32::seed_from_u64(self.seed);

        let tuning = self.progression.tuning();
        let field = self.progression.field();
        self.pudge = Pudge::new(field, tuning.pudge_collision_size);
        self.pudge.add_castable([CastableId::Hook, CastableId::Dagger]);
        self.hook = Hook::new();
        self.dagger = Dagger::new();

        let meat_size = tuning.meat_collision_size;
        self.meats = (0..tuning.meat_amount)
            .map(|_| {
                let mut meat = Meat::new(meat_size);
                meat.body.randomize_position(field, &mut self.rng);
                meat
            })
            .collect();

        self.timer = timer_seconds;
        self.input_mode = InputMode::Move;
        self.game_over = false;
        self.events.clear();
        log::info!(
            "Session initialized: {}x{} field, {} meats, {:.0}s timer, seed {}",
            width,
            height,
            self.meats.len(),
            timer_seconds,
            self.seed
        );
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn set_running(&mut self, running: bool) {
        self.clock.set_state(running);
        log::info!("{}", if running { "Resumed" } else { "Paused" });
    }

    pub fn toggle_pause(&mut self) {
        self.set_running(!self.is_running());
    }

    /// Field resize from the host window
    pub fn set_boundary(&mut self, width: f32, height: f32) {
        self.progression.set_boundary(width, height);
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Take the queued display events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn castable(&self, id: CastableId) -> &dyn Castable {
        match id {
            CastableId::Hook => &self.hook,
            CastableId::Dagger => &self.dagger,
        }
    }

    pub fn castable_mut(&mut self, id: CastableId) -> &mut dyn Castable {
        match id {
            CastableId::Hook => &mut self.hook,
            CastableId::Dagger => &mut self.dagger,
        }
    }

    pub fn movable(&self, id: MovableId) -> Option<&dyn Movable> {
        match id {
            MovableId::Pudge => Some(&self.pudge as &dyn Movable),
            MovableId::Meat(index) => self.meats.get(index).map(|meat| meat as &dyn Movable),
        }
    }

    /// Whether any of Pudge's abilities is in backswing
    pub fn is_casting(&self) -> bool {
        let now = self.clock.now();
        self.pudge
            .castables
            .iter()
            .any(|&id| self.castable(id).is_casting(now))
    }

    // --- Input boundary ---

    /// Secondary click: walk there
    pub fn player_move(&mut self, target: Vec2) {
        if !self.is_running() {
            return;
        }
        self.register_move(target);
        self.input_mode = InputMode::Move;
    }

    /// Arm an ability for the next click, if it is ready
    pub fn set_input_mode(&mut self, mode: InputMode) {
        if !self.is_running() {
            return;
        }
        let now = self.clock.now();
        self.input_mode = match mode.ability() {
            Some(id) if self.castable(id).is_ready(now) => mode,
            _ => InputMode::Move,
        };
    }

    /// Primary click: aim the armed ability, then drop back to Move
    pub fn launch_input(&mut self, target: Vec2) {
        if !self.is_running() {
            return;
        }
        if let Some(id) = self.input_mode.ability() {
            self.register(id, target);
        }
        self.input_mode = InputMode::Move;
    }

    // --- Pudge orders ---

    /// New move order; ignored during backswing and cancels queued casts
    pub fn register_move(&mut self, target: Vec2) {
        if self.is_casting() {
            return;
        }
        self.pudge.dest = target;
        self.unregister_all();
    }

    pub fn stop_action(&mut self) {
        self.pudge.halt();
        self.unregister_all();
    }

    fn unregister_all(&mut self) {
        for id in self.pudge.castables.clone() {
            self.castable_mut(id).unregister();
        }
    }

    /// Queue an ability: walk to its cast origin, then fire on arrival
    pub fn register(&mut self, id: CastableId, target: Vec2) {
        let caster = self.pudge.body.pos;
        let src = {
            let Self {
                hook,
                dagger,
                progression,
                ..
            } = self;
            let castable: &mut dyn Castable = match id {
                CastableId::Hook => hook,
                CastableId::Dagger => dagger,
            };
            castable.aim(caster, target, progression)
        };
        self.register_move(src);
        self.castable_mut(id).state_mut().pending = true;
    }

    /// Fire `id` if it is pending and Pudge stands on its origin
    pub fn try_cast(&mut self, id: CastableId) -> bool {
        let now = self.clock.now();
        let effect = {
            let Self {
                hook,
                dagger,
                progression,
                pudge,
                ..
            } = self;
            let castable: &mut dyn Castable = match id {
                CastableId::Hook => hook,
                CastableId::Dagger => dagger,
            };
            castable.try_cast(&pudge.body, now, progression)
        };
        match effect {
            None => false,
            Some(CastEffect::Launched) => true,
            Some(CastEffect::LinkCaster) => {
                self.link_object(id, MovableId::Pudge);
                true
            }
        }
    }

    // --- Link relation ---

    /// Force-move `target` with `source`, replacing whatever either side held
    pub fn link_object(&mut self, source: CastableId, target: MovableId) {
        if self.movable(target).is_none() {
            return;
        }
        self.unlink_object(source);

        let previous = self
            .movable(target)
            .and_then(|movable| movable.body().force_move_source);
        if let Some(previous) = previous {
            self.castable_mut(previous).state_mut().linked = None;
        }

        self.castable_mut(source).state_mut().linked = Some(target);
        if let Some(movable) = self.movable_mut(target) {
            movable.body_mut().force_move_source = Some(source);
        }
    }

    /// Release whatever `source` holds; no-op when nothing is linked
    pub fn unlink_object(&mut self, source: CastableId) {
        let Some(target) = self.castable_mut(source).state_mut().linked.take() else {
            return;
        };
        let now = self.clock.now();
        let Self {
            pudge,
            meats,
            progression,
            rng,
            ..
        } = self;
        let movable: &mut dyn Movable = match target {
            MovableId::Pudge => pudge,
            MovableId::Meat(index) => match meats.get_mut(index) {
                Some(meat) => meat,
                None => return,
            },
        };
        movable.body_mut().force_move_source = None;
        let mut ctx = MoveContext {
            now,
            elapsed: 0.0,
            progression,
            rng,
        };
        movable.unlinked_postback(&mut ctx);
    }

    fn movable_mut(&mut self, id: MovableId) -> Option<&mut dyn Movable> {
        match id {
            MovableId::Pudge => Some(&mut self.pudge as &mut dyn Movable),
            MovableId::Meat(index) => self
                .meats
                .get_mut(index)
                .map(|meat| meat as &mut dyn Movable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::ManualTime;

    fn running_state() -> (GameState, ManualTime) {
        let time = ManualTime::new();
        let mut state = GameState::new(Tuning::default(), Clock::new(time.clone()), 42)
            .expect("valid tuning");
        state.set_running(true);
        (state, time)
    }

    #[test]
    fn test_initialize_layout() {
        let (state, _time) = running_state();
        assert_eq!(state.pudge.body.pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.pudge.castables, vec![CastableId::Hook, CastableId::Dagger]);
        assert_eq!(state.meats.len(), 10);
        assert!(state.meats.iter().all(|m| m.body.collision_size == 28.0));
        assert_eq!(state.timer, 60.0);
        assert!(state.hook.is_ready(0.0) && state.dagger.is_ready(0.0));
    }

    #[test]
    fn test_new_rejects_empty_level_table() {
        let mut tuning = Tuning::default();
        tuning.levels.clear();
        let result = GameState::new(tuning, Clock::new(ManualTime::new()), 1);
        assert!(matches!(result, Err(TuningError::NoLevels)));
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let (a, _) = running_state();
        let (b, _) = running_state();
        let pa: Vec<Vec2> = a.meats.iter().map(|m| m.body.pos).collect();
        let pb: Vec<Vec2> = b.meats.iter().map(|m| m.body.pos).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_input_gated_on_clock() {
        let time = ManualTime::new();
        let mut state = GameState::new(Tuning::default(), Clock::new(time), 1)
            .expect("valid tuning");
        state.player_move(Vec2::new(10.0, 10.0));
        assert_eq!(state.pudge.dest, Vec2::new(400.0, 300.0));
        state.set_input_mode(InputMode::Hook);
        assert_eq!(state.input_mode, InputMode::Move);
    }

    #[test]
    fn test_hook_registration_scenario() {
        let mut tuning = Tuning::default();
        tuning.levels[0].hook_range_ratio = 0.3;
        let time = ManualTime::new();
        let mut state = GameState::new(tuning, Clock::new(time), 9)
            .expect("valid tuning");
        state.set_running(true);

        state.set_input_mode(InputMode::Hook);
        assert_eq!(state.input_mode, InputMode::Hook);
        state.launch_input(Vec2::new(1000.0, 300.0));

        assert!((state.pudge.dest - Vec2::new(700.0, 300.0)).length() < 1e-3);
        assert!(state.hook.state.pending);
        assert!(!state.dagger.state.pending);
        assert_eq!(state.input_mode, InputMode::Move);
    }

    #[test]
    fn test_move_order_cancels_pending_cast() {
        let (mut state, _time) = running_state();
        state.register(CastableId::Dagger, Vec2::new(100.0, 100.0));
        assert!(state.dagger.state.pending);
        state.player_move(Vec2::new(500.0, 500.0));
        assert!(!state.dagger.state.pending);
        assert_eq!(state.pudge.dest, Vec2::new(500.0, 500.0));
    }

    #[test]
    fn test_set_input_mode_falls_back_when_not_ready() {
        let (mut state, _time) = running_state();
        state.dagger.state.skill_end = 5000.0;
        state.set_input_mode(InputMode::Dagger);
        assert_eq!(state.input_mode, InputMode::Move);
        state.set_input_mode(InputMode::Hook);
        assert_eq!(state.input_mode, InputMode::Hook);
        assert_eq!(state.input_mode.cursor(), "crosshair");
    }

    #[test]
    fn test_link_is_exclusive() {
        let (mut state, _time) = running_state();
        state.link_object(CastableId::Hook, MovableId::Meat(0));
        assert_eq!(state.meats[0].body.force_move_source, Some(CastableId::Hook));
        assert_eq!(state.hook.state.linked, Some(MovableId::Meat(0)));

        // Relinking moves the hook off meat 0, which recovers elsewhere
        state.link_object(CastableId::Hook, MovableId::Meat(1));
        assert_eq!(state.meats[0].body.force_move_source, None);
        assert_eq!(state.meats[1].body.force_move_source, Some(CastableId::Hook));

        // Another ability taking meat 1 leaves the hook empty-handed
        state.link_object(CastableId::Dagger, MovableId::Meat(1));
        assert_eq!(state.hook.state.linked, None);
        assert_eq!(state.meats[1].body.force_move_source, Some(CastableId::Dagger));
    }

    #[test]
    fn test_unlink_runs_postback_once() {
        let (mut state, _time) = running_state();
        state.link_object(CastableId::Hook, MovableId::Meat(2));
        state.meats[2].body.pos = Vec2::new(-500.0, -500.0);
        state.unlink_object(CastableId::Hook);
        let pos = state.meats[2].body.pos;
        assert!(pos.x >= 0.0 && pos.y >= 0.0);
        assert_eq!(state.meats[2].body.force_move_source, None);

        state.unlink_object(CastableId::Hook);
        assert_eq!(state.meats[2].body.pos, pos);
    }

    #[test]
    fn test_casting_blocks_move_orders() {
        let (mut state, _time) = running_state();
        state.dagger.state.backswing_end = 100.0;
        assert!(state.is_casting());
        state.register_move(Vec2::new(10.0, 10.0));
        assert_eq!(state.pudge.dest, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_link_ignores_missing_meat() {
        let (mut state, _time) = running_state();
        state.link_object(CastableId::Hook, MovableId::Meat(99));
        assert_eq!(state.hook.state.linked, None);
    }
}
