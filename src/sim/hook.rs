//! Hook: long-range projectile that drags its first victim back to the caster

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, CastEffect, CastState, Castable, CastableId, LinkUpdate};
use super::progression::Progression;
use crate::{lerp_point, max_streak, trailing_streak};

/// Hook usage for the game-over screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookStats {
    pub uses: usize,
    pub hits: usize,
    pub accuracy_percent: u32,
    pub max_streak: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Hook {
    pub state: CastState,
    pub skill_start: f64,
    /// Moment of maximum extension (ms)
    pub skill_mid: f64,
    /// One entry per cast, flipped to true on a catch
    trials: Vec<bool>,
}

impl Hook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catch the first prey whose hitbox contains the hook tip.
    ///
    /// Only active during outbound travel. On a hit the hook turns around
    /// immediately and the return trip takes as long as the outbound one did.
    /// The caller links the returned prey index.
    pub fn try_attack<'a>(
        &mut self,
        now: f64,
        prey: impl IntoIterator<Item = &'a Body>,
    ) -> Option<usize> {
        if now >= self.skill_mid {
            return None;
        }
        let tip = self.state.pos;
        let (index, victim) = prey.into_iter().enumerate().find(|(_, body)| body.contains(tip))?;

        self.state.dest = victim.pos;
        self.skill_mid = now;
        self.state.skill_end = 2.0 * self.skill_mid - self.skill_start;
        self.state.backswing_end = self.state.skill_end;
        if let Some(last) = self.trials.last_mut() {
            *last = true;
        }
        Some(index)
    }

    /// Consecutive catches ending at the latest cast
    pub fn streak(&self) -> u32 {
        trailing_streak(&self.trials)
    }

    pub fn trials(&self) -> &[bool] {
        &self.trials
    }

    pub fn stats(&self) -> HookStats {
        let uses = self.trials.len();
        let hits = self.trials.iter().filter(|&&hit| hit).count();
        HookStats {
            uses,
            hits,
            accuracy_percent: (100.0 * hits as f32 / uses.max(1) as f32).round() as u32,
            max_streak: max_streak(&self.trials),
        }
    }

    /// Hook line endpoints while the projectile is out
    pub fn line(&self, now: f64) -> Option<(Vec2, Vec2)> {
        (!self.state.is_ready(now)).then_some((self.state.src, self.state.pos))
    }
}

impl Castable for Hook {
    fn id(&self) -> CastableId {
        CastableId::Hook
    }

    fn state(&self) -> &CastState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CastState {
        &mut self.state
    }

    /// Walk toward the click until it is within cast range
    fn src_dest_pos(
        &mut self,
        caster: Vec2,
        target: Vec2,
        progression: &Progression,
    ) -> (Vec2, Vec2) {
        let distance = caster.distance(target);
        let exceedance = (distance - progression.hook_cast_range()).max(0.0);
        let multiplier = if distance > 0.0 { exceedance / distance } else { 0.0 };
        (lerp_point(caster, target, multiplier), target)
    }

    fn cast(&mut self, caster: Vec2, now: f64, progression: &Progression) -> CastEffect {
        let cast_range = progression.hook_cast_range();
        let half_time =
            1000.0 * cast_range as f64 / progression.tuning().hook_projectile_speed as f64;
        self.skill_start = now;
        self.skill_mid = now + half_time;
        self.state.skill_end = self.skill_mid + half_time;
        self.state.backswing_end = self.state.skill_end;

        self.state.src = caster;
        self.state.pos = caster;
        let distance = caster.distance(self.state.dest);
        let multiplier = if distance > 0.0 { cast_range / distance } else { 1.0 };
        self.state.dest = lerp_point(caster, self.state.dest, multiplier);

        self.trials.push(false);
        CastEffect::Launched
    }

    fn update_model(&mut self, now: f64, _progression: &Progression) -> LinkUpdate {
        if self.state.is_ready(now) {
            return LinkUpdate::Release;
        }
        let half = self.state.skill_end - self.skill_mid;
        let multiplier = if half > 0.0 {
            ((self.skill_mid - now).abs() / half) as f32
        } else {
            0.0
        };
        self.state.pos = lerp_point(self.state.dest, self.state.src, multiplier);
        LinkUpdate::Hold
    }
}
