//! Read-only views of a session: the per-frame render snapshot and the
//! game-over summary

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::dagger::DaggerStats;
use super::entity::Body;
use super::hook::HookStats;
use super::state::{GameState, InputMode};
use crate::highscores::HighScores;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub pos: Vec2,
    pub radius: f32,
    /// Currently force-moved by an ability
    pub dragged: bool,
}

impl From<&Body> for Circle {
    fn from(body: &Body) -> Self {
        Self {
            pos: body.pos,
            radius: body.collision_size,
            dragged: body.force_move_source.is_some(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Seconds left, never negative
    pub timer: f32,
    pub score: u64,
    pub level_label: String,
    pub experience: f32,
    pub pudge: Circle,
    pub meats: Vec<Circle>,
    /// Caster to hook tip, while the hook is out
    pub hook_line: Option<(Vec2, Vec2)>,
    /// Remaining dagger cooldown in [0, 1]
    pub dagger_cooldown: f32,
    pub input_mode: InputMode,
    pub cursor: &'static str,
    pub running: bool,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub score: u64,
    pub level_label: String,
    /// Best score on record before this run
    pub best: Option<u64>,
    /// `score - best`, 0 when there was no record
    pub difference: i64,
    /// Leaderboard placement, if the run made the board
    pub rank: Option<usize>,
    pub hook: HookStats,
    pub dagger: DaggerStats,
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        let now = self.clock.now();
        Snapshot {
            timer: self.timer.max(0.0),
            score: self.progression.current_score(),
            level_label: self.progression.current().label.clone(),
            experience: self.progression.exp_value(),
            pudge: Circle::from(&self.pudge.body),
            meats: self.meats.iter().map(|meat| Circle::from(&meat.body)).collect(),
            hook_line: self.hook.line(now),
            dagger_cooldown: self.dagger.cooldown_fraction(now, &self.progression),
            input_mode: self.input_mode,
            cursor: self.input_mode.cursor(),
            running: self.is_running(),
            game_over: self.game_over,
        }
    }

    /// Stop the session and file its score
    pub fn finish(&mut self, scores: &mut HighScores) -> GameSummary {
        if self.is_running() {
            self.set_running(false);
        }
        let score = self.progression.current_score();
        let best = scores.top_score();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs_f64() * 1000.0)
            .unwrap_or_default();
        let rank = scores.add_score(score, self.progression.current_level(), timestamp);

        let summary = GameSummary {
            score,
            level_label: self.progression.current().label.clone(),
            best,
            difference: best.map_or(0, |best| score as i64 - best as i64),
            rank,
            hook: self.hook.stats(),
            dagger: self.dagger.stats(),
        };
        log::info!(
            "Game over: {} points ({}), hook {}/{} ({}%), dagger x{}",
            summary.score,
            summary.level_label,
            summary.hook.hits,
            summary.hook.uses,
            summary.hook.accuracy_percent,
            summary.dagger.uses
        );
        summary
    }
}
