//! Capabilities shared by actors and abilities
//!
//! Actors implement [`Movable`]: they own a [`Body`] and either move on their
//! own or are force-moved by a linked ability. Abilities implement
//! [`Castable`]: they share the pending -> backswing -> cooldown -> ready
//! lifecycle stored in [`CastState`].
//!
//! Links between the two are stored as handles on both sides
//! (`CastState::linked` and `Body::force_move_source`); the owning
//! [`GameState`](super::GameState) keeps them in sync.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::progression::Progression;
use crate::consts::CAST_TOLERANCE;

/// Handle to a movable entity in the session arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovableId {
    Pudge,
    Meat(usize),
}

/// Handle to one of the session's abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastableId {
    Hook,
    Dagger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Position and hitbox of a movable entity
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub collision_size: f32,
    /// Ability currently dictating this body's position
    pub force_move_source: Option<CastableId>,
}

impl Body {
    pub fn new(pos: Vec2, collision_size: f32) -> Self {
        Self {
            pos,
            collision_size,
            force_move_source: None,
        }
    }

    #[inline]
    pub fn within_range(&self, point: Vec2, range: f32) -> bool {
        self.pos.distance(point) <= range
    }

    /// Whether `point` lies inside this body's hitbox
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.within_range(point, self.collision_size)
    }

    /// Clamp one axis into `[collision_size, extent - collision_size]`.
    /// Returns true if the position had to be moved.
    pub fn clip_pos(&mut self, axis: Axis, field: Vec2) -> bool {
        let size = self.collision_size;
        let (value, extent) = match axis {
            Axis::X => (&mut self.pos.x, field.x),
            Axis::Y => (&mut self.pos.y, field.y),
        };
        if *value < size {
            *value = size;
            return true;
        }
        let boundary = extent - size;
        if *value > boundary {
            *value = boundary;
            return true;
        }
        false
    }

    pub fn clip_to_field(&mut self, field: Vec2) {
        self.clip_pos(Axis::X, field);
        self.clip_pos(Axis::Y, field);
    }

    /// Uniformly random point in the field
    pub fn randomize_position(&mut self, field: Vec2, rng: &mut impl Rng) {
        self.pos = Vec2::new(rng.random::<f32>() * field.x, rng.random::<f32>() * field.y);
    }
}

/// Everything a movable may consult during one model update
pub struct MoveContext<'a> {
    /// Clock reading for this tick (ms)
    pub now: f64,
    /// Seconds since the previous tick
    pub elapsed: f32,
    pub progression: &'a Progression,
    pub rng: &'a mut Pcg32,
}

/// What a movable did during its update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stride {
    /// Travelled under its own policy
    Moved,
    /// Reached its destination this tick
    Arrived,
    /// Position dictated by a linked ability
    Forced,
}

pub trait Movable {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Self-movement policy for one tick
    fn normal_move(&mut self, ctx: &mut MoveContext<'_>) -> Stride;

    /// Called after an ability releases this body
    fn unlinked_postback(&mut self, _ctx: &mut MoveContext<'_>) {}

    /// Snap to the linked ability's position
    fn follow(&mut self, pos: Vec2) {
        self.body_mut().pos = pos;
    }

    /// `source` is the position of the linked ability, if any
    fn update_model(&mut self, source: Option<Vec2>, ctx: &mut MoveContext<'_>) -> Stride {
        match source {
            Some(pos) => {
                self.follow(pos);
                Stride::Forced
            }
            None => self.normal_move(ctx),
        }
    }
}

/// Lifecycle phase derived from the cast timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastPhase {
    Ready,
    Backswing,
    Cooldown,
}

/// State shared by every ability
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CastState {
    /// Current effect position (projectile tip, blink point)
    pub pos: Vec2,
    /// Waiting for the caster to reach `src`
    pub pending: bool,
    pub src: Vec2,
    pub dest: Vec2,
    pub linked: Option<MovableId>,
    pub backswing_end: f64,
    /// End of cooldown
    pub skill_end: f64,
}

impl CastState {
    #[inline]
    pub fn is_ready(&self, now: f64) -> bool {
        now >= self.skill_end
    }

    #[inline]
    pub fn is_casting(&self, now: f64) -> bool {
        now < self.backswing_end
    }

    pub fn phase(&self, now: f64) -> CastPhase {
        if self.is_casting(now) {
            CastPhase::Backswing
        } else if self.is_ready(now) {
            CastPhase::Ready
        } else {
            CastPhase::Cooldown
        }
    }
}

/// Side effect requested by a cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastEffect {
    /// Nothing to link yet
    Launched,
    /// Force-move the caster with this ability
    LinkCaster,
}

/// Whether an ability keeps its linked body after a model update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum LinkUpdate {
    Hold,
    Release,
}

pub trait Castable {
    fn id(&self) -> CastableId;
    fn state(&self) -> &CastState;
    fn state_mut(&mut self) -> &mut CastState;

    /// Where the caster must stand and where the effect goes, for a click at `target`
    fn src_dest_pos(&mut self, caster: Vec2, target: Vec2, progression: &Progression)
    -> (Vec2, Vec2);

    /// Start the effect; must set `backswing_end` and `skill_end`
    fn cast(&mut self, caster: Vec2, now: f64, progression: &Progression) -> CastEffect;

    fn update_model(&mut self, now: f64, progression: &Progression) -> LinkUpdate;

    fn pos(&self) -> Vec2 {
        self.state().pos
    }

    fn is_ready(&self, now: f64) -> bool {
        self.state().is_ready(now)
    }

    fn is_casting(&self, now: f64) -> bool {
        self.state().is_casting(now)
    }

    /// Store the targeting for a click; returns the point the caster must reach.
    /// The owner marks the cast pending once the caster has been redirected.
    fn aim(&mut self, caster: Vec2, target: Vec2, progression: &Progression) -> Vec2 {
        let (src, dest) = self.src_dest_pos(caster, target, progression);
        let state = self.state_mut();
        state.src = src;
        state.dest = dest;
        src
    }

    fn unregister(&mut self) {
        self.state_mut().pending = false;
    }

    /// Fire the pending cast if the caster has arrived at `src`
    fn try_cast(&mut self, caster: &Body, now: f64, progression: &Progression) -> Option<CastEffect> {
        let state = self.state();
        if state.pending && caster.within_range(state.src, CAST_TOLERANCE) {
            self.state_mut().pending = false;
            Some(self.cast(caster.pos, now, progression))
        } else {
            None
        }
    }
}
