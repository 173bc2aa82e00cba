//! Pudge: the player-controlled caster

use glam::Vec2;

use super::entity::{Body, CastableId, Movable, MoveContext, Stride};

#[derive(Debug, Clone)]
pub struct Pudge {
    pub body: Body,
    /// Where the player last ordered a move
    pub dest: Vec2,
    /// Owned abilities in registration order
    pub castables: Vec<CastableId>,
}

impl Pudge {
    /// Spawn at the centre of the field
    pub fn new(field: Vec2, collision_size: f32) -> Self {
        let pos = field * 0.5;
        Self {
            body: Body::new(pos, collision_size),
            dest: pos,
            castables: Vec::new(),
        }
    }

    pub fn add_castable(&mut self, castables: impl IntoIterator<Item = CastableId>) {
        self.castables.extend(castables);
    }

    /// Collapse the move order onto the current position
    pub fn halt(&mut self) {
        self.dest = self.body.pos;
    }
}

impl Movable for Pudge {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Walk straight at `dest`.
    ///
    /// On arrival the position is left unclipped so the owner can fire pending
    /// casts at the exact arrival point; the owner clips afterwards.
    fn normal_move(&mut self, ctx: &mut MoveContext<'_>) -> Stride {
        let delta = self.dest - self.body.pos;
        let distance = delta.length();
        let budget = ctx.progression.tuning().pudge_movement_speed * ctx.elapsed;
        if distance <= budget {
            self.body.pos = self.dest;
            return Stride::Arrived;
        }
        self.body.pos += delta * (budget / distance);
        self.body.clip_to_field(ctx.progression.field());
        Stride::Moved
    }

    fn follow(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.dest = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::progression::Progression;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn step(pudge: &mut Pudge, progression: &Progression, elapsed: f32) -> Stride {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ctx = MoveContext {
            now: 0.0,
            elapsed,
            progression,
            rng: &mut rng,
        };
        pudge.update_model(None, &mut ctx)
    }

    #[test]
    fn test_spawns_at_centre() {
        let pudge = Pudge::new(Vec2::new(800.0, 600.0), 24.0);
        assert_eq!(pudge.body.pos, Vec2::new(400.0, 300.0));
        assert_eq!(pudge.dest, pudge.body.pos);
    }

    #[test]
    fn test_walks_at_fixed_speed_then_arrives() {
        let progression = Progression::default();
        let mut pudge = Pudge::new(progression.field(), 24.0);
        pudge.dest = Vec2::new(700.0, 300.0);

        assert_eq!(step(&mut pudge, &progression, 0.5), Stride::Moved);
        assert!((pudge.body.pos.x - 550.0).abs() < 1e-3);

        assert_eq!(step(&mut pudge, &progression, 1.0), Stride::Arrived);
        assert_eq!(pudge.body.pos, Vec2::new(700.0, 300.0));
    }

    #[test]
    fn test_moving_toward_wall_is_clipped() {
        let progression = Progression::default();
        let mut pudge = Pudge::new(progression.field(), 24.0);
        pudge.body.pos = Vec2::new(780.0, 300.0);
        pudge.dest = Vec2::new(2000.0, 300.0);
        assert_eq!(step(&mut pudge, &progression, 0.1), Stride::Moved);
        assert_eq!(pudge.body.pos.x, 776.0);
    }

    #[test]
    fn test_follow_resets_destination() {
        let progression = Progression::default();
        let mut pudge = Pudge::new(progression.field(), 24.0);
        pudge.dest = Vec2::new(10.0, 10.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ctx = MoveContext {
            now: 0.0,
            elapsed: 0.1,
            progression: &progression,
            rng: &mut rng,
        };
        let target = Vec2::new(123.0, 456.0);
        assert_eq!(pudge.update_model(Some(target), &mut ctx), Stride::Forced);
        assert_eq!(pudge.body.pos, target);
        assert_eq!(pudge.dest, target);
    }
}
