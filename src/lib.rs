//! Meat Hook - a hook-and-blink arcade chase
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (clock, abilities, actors, scoring)
//! - `tuning`: Data-driven game balance
//! - `highscores`: In-memory leaderboard for the game-over screen

pub mod highscores;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use tuning::{LevelSetting, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Model tick period in milliseconds
    pub const MODEL_UPDATE_PERIOD_MS: u32 = 12;

    /// Default play field (pixels)
    pub const DEFAULT_FIELD_WIDTH: f32 = 800.0;
    pub const DEFAULT_FIELD_HEIGHT: f32 = 600.0;

    /// Countdown for a session (seconds)
    pub const DEFAULT_TIMER_SECS: f32 = 60.0;

    /// How close the caster must be to its cast origin before a pending cast fires
    pub const CAST_TOLERANCE: f32 = 1.0;

    /// Hook projectile speed (pixels/s)
    pub const HOOK_PROJECTILE_SPEED: f32 = 1600.0;

    /// Dagger reach as a fraction of the field diagonal
    pub const DAGGER_DISTANCE_RATIO: f32 = 0.70;
    /// Distance kept when the click is beyond dagger reach
    pub const DAGGER_PENALTY_RATIO: f32 = 0.8;
    pub const DAGGER_BACKSWING_MS: f64 = 120.0;
    pub const DAGGER_COOLDOWN_MS: f64 = 2400.0;

    pub const PUDGE_MOVEMENT_SPEED: f32 = 300.0;
    pub const PUDGE_COLLISION_SIZE: f32 = 24.0;
    pub const MEAT_COLLISION_SIZE: f32 = 28.0;
    pub const MEAT_AMOUNT: usize = 10;
}

/// Point at fraction `t` along the segment `from -> to`
#[inline]
pub fn lerp_point(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

/// Longest run of `true` anywhere in the sequence
pub fn max_streak(trials: &[bool]) -> u32 {
    let mut best = 0;
    let mut current = 0;
    for &hit in trials {
        if hit {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

/// Run of `true` at the end of the sequence
pub fn trailing_streak(trials: &[bool]) -> u32 {
    trials.iter().rev().take_while(|&&hit| hit).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_point() {
        let p = lerp_point(Vec2::new(0.0, 0.0), Vec2::new(10.0, -4.0), 0.5);
        assert_eq!(p, Vec2::new(5.0, -2.0));
        assert_eq!(lerp_point(Vec2::ONE, Vec2::ZERO, 0.0), Vec2::ONE);
    }

    #[test]
    fn test_streaks() {
        let trials = [true, true, false, true];
        assert_eq!(trailing_streak(&trials), 1);
        assert_eq!(max_streak(&trials), 2);

        assert_eq!(trailing_streak(&[]), 0);
        assert_eq!(max_streak(&[false, false]), 0);
        assert_eq!(trailing_streak(&[false, true, true, true]), 3);
    }
}
