//! Meat: fleeing target that bounces around the field

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use super::entity::{Axis, Body, Movable, MoveContext, Stride};
use crate::tuning::LevelSetting;

#[derive(Debug, Clone)]
pub struct Meat {
    pub body: Body,
    /// Velocity (pixels/s)
    pub delta: Vec2,
    pub current_speed: f32,
    pub trend_span: f64,
    /// Clock time of the next heading change (ms)
    pub trend_end: f64,
}

impl Meat {
    pub fn new(collision_size: f32) -> Self {
        Self {
            body: Body::new(Vec2::ZERO, collision_size),
            delta: Vec2::ZERO,
            current_speed: 0.0,
            trend_span: 0.0,
            trend_end: 0.0,
        }
    }

    /// Pick a new heading and speed from the level's range
    pub fn randomize_movement(&mut self, now: f64, level: &LevelSetting, rng: &mut impl Rng) {
        let radians = TAU * rng.random::<f32>();
        self.current_speed = level.meat_speed_min + rng.random::<f32>() * level.meat_speed_range;
        self.delta = Vec2::from_angle(radians) * self.current_speed;
        self.trend_span = (rng.random::<f64>() * 0.5 + 0.5) * level.meat_trend_period_ms;
        self.trend_end = now + self.trend_span;
    }
}

impl Movable for Meat {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn normal_move(&mut self, ctx: &mut MoveContext<'_>) -> Stride {
        if ctx.now >= self.trend_end {
            self.randomize_movement(ctx.now, ctx.progression.current(), ctx.rng);
        }
        let field = ctx.progression.field();
        if self.body.clip_pos(Axis::X, field) {
            self.delta.x = -self.delta.x;
        }
        if self.body.clip_pos(Axis::Y, field) {
            self.delta.y = -self.delta.y;
        }
        self.body.pos += self.delta * ctx.elapsed;
        Stride::Moved
    }

    /// Recover at a fresh spot after being dragged in
    fn unlinked_postback(&mut self, ctx: &mut MoveContext<'_>) {
        self.body.randomize_position(ctx.progression.field(), ctx.rng);
        self.randomize_movement(ctx.now, ctx.progression.current(), ctx.rng);
    }
}
