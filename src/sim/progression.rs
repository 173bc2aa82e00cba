//! Score, level and field context
//!
//! Owns the balance table together with everything that scales with it: the
//! current level, the cumulative score and the play field extent. Abilities
//! and actors read their level-scaled parameters from here.

use glam::Vec2;

use crate::consts::{DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH};
use crate::tuning::{LevelSetting, Tuning, TuningError};

#[derive(Debug, Clone)]
pub struct Progression {
    tuning: Tuning,
    current_level: usize,
    current_score: u64,
    field: Vec2,
    diagonal: f32,
}

impl Progression {
    /// Fails if the balance table is unusable
    pub fn new(tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::with_valid_tuning(tuning))
    }

    fn with_valid_tuning(tuning: Tuning) -> Self {
        let mut progression = Self {
            tuning,
            current_level: 0,
            current_score: 0,
            field: Vec2::ZERO,
            diagonal: 0.0,
        };
        progression.set_boundary(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT);
        progression
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Resize the play field
    pub fn set_boundary(&mut self, width: f32, height: f32) {
        self.field = Vec2::new(width, height);
        self.diagonal = self.field.length();
    }

    /// Start a fresh session on a field of the given size
    pub fn reset(&mut self, width: f32, height: f32) {
        self.current_level = 0;
        self.current_score = 0;
        self.set_boundary(width, height);
    }

    pub fn field(&self) -> Vec2 {
        self.field
    }

    pub fn diagonal(&self) -> f32 {
        self.diagonal
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn current_score(&self) -> u64 {
        self.current_score
    }

    /// Level row in effect
    pub fn current(&self) -> &LevelSetting {
        &self.tuning.levels[self.current_level]
    }

    pub fn hook_cast_range(&self) -> f32 {
        self.diagonal * self.current().hook_range_ratio
    }

    pub fn dagger_max_distance(&self) -> f32 {
        self.diagonal * self.tuning.dagger_distance_ratio
    }

    /// Award a successful catch; returns the points it was worth
    pub fn gain_score(&mut self, distance: f32, meat_speed: f32, hook_streak: u32) -> u64 {
        let prediction = distance * 1.6 + meat_speed * (0.8 + 0.2 * hook_streak as f32);
        let difficulty = (self.field.x * self.field.y).cbrt();
        let level_bonus = 50.0 * self.current_level as f32;
        let score = (prediction + difficulty + level_bonus).floor().max(0.0) as u64;

        self.current_score += score;
        let total = self.current_score;
        self.current_level = self
            .tuning
            .levels
            .iter()
            .position(|level| level.admits(total))
            .unwrap_or(self.tuning.levels.len() - 1);

        log::debug!(
            "catch: distance {:.0} speed {:.0} streak {} -> +{} (total {}, level {})",
            distance,
            meat_speed,
            hook_streak,
            score,
            total,
            self.current_level
        );
        score
    }

    /// Progress through the current level in [0, 1]; 1.0 at the top level
    pub fn exp_value(&self) -> f32 {
        let Some(threshold) = self.current().score_threshold else {
            return 1.0;
        };
        let base = match self.current_level {
            0 => 0,
            level => self.tuning.levels[level - 1].score_threshold.unwrap_or(0),
        };
        let span = threshold.saturating_sub(base);
        if span == 0 {
            return 1.0;
        }
        (self.current_score.saturating_sub(base) as f32 / span as f32).clamp(0.0, 1.0)
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::with_valid_tuning(Tuning::default())
    }
}
