//! Game balance data
//!
//! Every timing, speed and level constant lives here so a host can load an
//! alternate balance from JSON. Missing fields fall back to the defaults in
//! [`crate::consts`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::*;

/// Problems found while loading or validating a [`Tuning`]
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("level table is empty")]
    NoLevels,

    #[error("level {index} threshold must be greater than the previous one")]
    ThresholdOrder { index: usize },

    #[error("level {index} is unbounded but is not the last level")]
    UnboundedLevel { index: usize },

    #[error("last level must have an unbounded threshold")]
    BoundedLastLevel,

    #[error("dagger penalty ratio must be in (0, 1], got {0}")]
    PenaltyRatio(f32),

    #[error("dagger backswing ({backswing} ms) exceeds cooldown ({cooldown} ms)")]
    BackswingExceedsCooldown { backswing: f64, cooldown: f64 },

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("level {index}: {field} out of range")]
    LevelField { index: usize, field: &'static str },
}

/// One row of the level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSetting {
    /// Display text for the level indicator
    pub label: String,
    /// Highest cumulative score that still belongs to this level (`None` = unbounded)
    pub score_threshold: Option<u64>,
    /// Hook cast range as a fraction of the field diagonal
    pub hook_range_ratio: f32,
    /// Slowest meat speed (pixels/s)
    pub meat_speed_min: f32,
    /// Random speed added on top of the minimum (pixels/s)
    pub meat_speed_range: f32,
    /// Nominal time between meat heading changes (ms)
    pub meat_trend_period_ms: f64,
}

impl LevelSetting {
    fn new(
        label: &str,
        score_threshold: Option<u64>,
        hook_range_ratio: f32,
        meat_speed_min: f32,
        meat_speed_range: f32,
        meat_trend_period_ms: f64,
    ) -> Self {
        Self {
            label: label.to_string(),
            score_threshold,
            hook_range_ratio,
            meat_speed_min,
            meat_speed_range,
            meat_trend_period_ms,
        }
    }

    /// Whether a cumulative score still fits in this level
    pub fn admits(&self, score: u64) -> bool {
        self.score_threshold.is_none_or(|threshold| threshold >= score)
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub model_update_period_ms: u32,
    pub hook_projectile_speed: f32,
    pub dagger_distance_ratio: f32,
    pub dagger_penalty_ratio: f32,
    pub dagger_backswing_ms: f64,
    pub dagger_cooldown_ms: f64,
    pub pudge_movement_speed: f32,
    pub pudge_collision_size: f32,
    pub meat_collision_size: f32,
    pub meat_amount: usize,
    pub levels: Vec<LevelSetting>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            model_update_period_ms: MODEL_UPDATE_PERIOD_MS,
            hook_projectile_speed: HOOK_PROJECTILE_SPEED,
            dagger_distance_ratio: DAGGER_DISTANCE_RATIO,
            dagger_penalty_ratio: DAGGER_PENALTY_RATIO,
            dagger_backswing_ms: DAGGER_BACKSWING_MS,
            dagger_cooldown_ms: DAGGER_COOLDOWN_MS,
            pudge_movement_speed: PUDGE_MOVEMENT_SPEED,
            pudge_collision_size: PUDGE_COLLISION_SIZE,
            meat_collision_size: MEAT_COLLISION_SIZE,
            meat_amount: MEAT_AMOUNT,
            levels: default_levels(),
        }
    }
}

fn default_levels() -> Vec<LevelSetting> {
    vec![
        LevelSetting::new("Lv1", Some(6_000), 0.36, 40.0, 100.0, 4200.0),
        LevelSetting::new("Lv2", Some(15_000), 0.48, 55.0, 175.0, 3600.0),
        LevelSetting::new("Lv3", Some(37_500), 0.60, 70.0, 250.0, 3000.0),
        LevelSetting::new("Lv4", None, 0.72, 85.0, 325.0, 2400.0),
    ]
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning with {} levels", tuning.levels.len());
        Ok(tuning)
    }

    /// Read and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let positives = [
            ("model_update_period_ms", self.model_update_period_ms as f64),
            ("hook_projectile_speed", self.hook_projectile_speed as f64),
            ("dagger_distance_ratio", self.dagger_distance_ratio as f64),
            ("dagger_backswing_ms", self.dagger_backswing_ms),
            ("pudge_movement_speed", self.pudge_movement_speed as f64),
            ("pudge_collision_size", self.pudge_collision_size as f64),
            ("meat_collision_size", self.meat_collision_size as f64),
        ];
        if let Some((name, _)) = positives.iter().find(|(_, value)| !(*value > 0.0)) {
            return Err(TuningError::NonPositive(name));
        }

        if !(self.dagger_penalty_ratio > 0.0 && self.dagger_penalty_ratio <= 1.0) {
            return Err(TuningError::PenaltyRatio(self.dagger_penalty_ratio));
        }
        if self.dagger_backswing_ms > self.dagger_cooldown_ms {
            return Err(TuningError::BackswingExceedsCooldown {
                backswing: self.dagger_backswing_ms,
                cooldown: self.dagger_cooldown_ms,
            });
        }

        let Some(last) = self.levels.last() else {
            return Err(TuningError::NoLevels);
        };
        if last.score_threshold.is_some() {
            return Err(TuningError::BoundedLastLevel);
        }

        for (index, level) in self.levels.iter().enumerate() {
            let field = if !(level.hook_range_ratio > 0.0) {
                Some("hook_range_ratio")
            } else if !(level.meat_speed_min >= 0.0) {
                Some("meat_speed_min")
            } else if !(level.meat_speed_range >= 0.0) {
                Some("meat_speed_range")
            } else if !(level.meat_trend_period_ms > 0.0) {
                Some("meat_trend_period_ms")
            } else {
                None
            };
            if let Some(field) = field {
                return Err(TuningError::LevelField { index, field });
            }
        }

        let mut previous: Option<u64> = None;
        for (index, level) in self.levels.iter().enumerate().take(self.levels.len() - 1) {
            let Some(threshold) = level.score_threshold else {
                return Err(TuningError::UnboundedLevel { index });
            };
            if previous.is_some_and(|p| threshold <= p) {
                return Err(TuningError::ThresholdOrder { index });
            }
            previous = Some(threshold);
        }
        Ok(())
    }
}
