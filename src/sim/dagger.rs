//! Dagger: short-range blink with a backswing lock and a long cooldown

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{CastEffect, CastState, Castable, CastableId, LinkUpdate};
use super::progression::Progression;
use crate::lerp_point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaggerStats {
    pub uses: usize,
    /// Mean blink distance of the casts that fired
    pub average_distance: Option<f32>,
}

/// One aimed blink: the distance it would cover and whether it fired
#[derive(Debug, Clone, Copy, PartialEq)]
struct BlinkAttempt {
    distance: f32,
    cast: bool,
}

#[derive(Debug, Clone)]
pub struct Dagger {
    pub state: CastState,
    pub blink_finished: bool,
    attempts: Vec<BlinkAttempt>,
}

impl Default for Dagger {
    fn default() -> Self {
        Self {
            state: CastState::default(),
            blink_finished: true,
            attempts: Vec::new(),
        }
    }
}

impl Dagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining cooldown as a fraction of the full cooldown (0 when ready)
    pub fn cooldown_fraction(&self, now: f64, progression: &Progression) -> f32 {
        if self.state.is_ready(now) {
            return 0.0;
        }
        let cooldown = progression.tuning().dagger_cooldown_ms;
        ((self.state.skill_end - now) / cooldown).clamp(0.0, 1.0) as f32
    }

    pub fn stats(&self) -> DaggerStats {
        let distances: Vec<f32> = self
            .attempts
            .iter()
            .filter(|attempt| attempt.cast)
            .map(|attempt| attempt.distance)
            .collect();
        let uses = distances.len();
        DaggerStats {
            uses,
            average_distance: (uses > 0).then(|| distances.iter().sum::<f32>() / uses as f32),
        }
    }
}

impl Castable for Dagger {
    fn id(&self) -> CastableId {
        CastableId::Dagger
    }

    fn state(&self) -> &CastState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CastState {
        &mut self.state
    }

    /// Blink straight at the click; overreaching is penalized, not just capped
    fn src_dest_pos(
        &mut self,
        caster: Vec2,
        target: Vec2,
        progression: &Progression,
    ) -> (Vec2, Vec2) {
        let attempt = caster.distance(target);
        let limit = progression.dagger_max_distance();
        let result = if attempt <= limit {
            attempt
        } else {
            limit * progression.tuning().dagger_penalty_ratio
        };
        log::debug!("dagger: attempt {attempt:.0} limit {limit:.0} result {result:.0}");

        self.attempts.push(BlinkAttempt {
            distance: result,
            cast: false,
        });
        let multiplier = if attempt < 1.0 {
            1.0
        } else {
            (result / attempt).min(1.0)
        };
        (caster, lerp_point(caster, target, multiplier))
    }

    fn cast(&mut self, _caster: Vec2, now: f64, progression: &Progression) -> CastEffect {
        let tuning = progression.tuning();
        self.state.backswing_end = now + tuning.dagger_backswing_ms;
        self.state.skill_end = now + tuning.dagger_cooldown_ms;
        self.blink_finished = false;
        if let Some(last) = self.attempts.last_mut() {
            last.cast = true;
        }
        CastEffect::LinkCaster
    }

    fn update_model(&mut self, now: f64, progression: &Progression) -> LinkUpdate {
        if self.blink_finished {
            return LinkUpdate::Release;
        }
        let backswing = progression.tuning().dagger_backswing_ms;
        let remain = self.state.backswing_end - now;
        let multiplier = (remain.max(0.0) / backswing) as f32;
        self.state.pos = lerp_point(self.state.dest, self.state.src, multiplier);
        self.blink_finished = remain < 0.0;
        LinkUpdate::Hold
    }
}
