//! Tick-driven simulation
//!
//! All gameplay logic lives here:
//! - Every timing decision reads the session `Clock`
//! - Seeded RNG only
//! - Stable iteration order (registration order for abilities, index order for meats)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod clock;
pub mod dagger;
pub mod entity;
pub mod hook;
pub mod meat;
pub mod progression;
pub mod pudge;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use clock::{Clock, ManualTime, TimeSource, WallTime};
pub use dagger::{Dagger, DaggerStats};
pub use entity::{
    Body, CastPhase, CastState, Castable, CastableId, Movable, MovableId, MoveContext, Stride,
};
pub use hook::{Hook, HookStats};
pub use meat::Meat;
pub use progression::Progression;
pub use pudge::Pudge;
pub use snapshot::{Circle, GameSummary, Snapshot};
pub use state::{GameEvent, GameState, InputMode};
pub use tick::update_models;
