use crate::core::{Rng, Vec2};
use crate::domain::config::PhysicsParams;
use crate::domain::particle::Particle;
use crate::spatial::boundary::StadiumShape;

/// What happened to one particle during a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Inactive, untouched
    Idle,
    Moved,
    /// Hit a wall or cap and was reflected
    Bounced,
    /// Returning particle slowed below rest speed and went inactive
    Settled,
    /// Position or velocity was non-finite and got reset
    Recovered,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrateStats {
    pub active: u32,
    pub bounced: u32,
    pub settled: u32,
    pub recovered: u32,
}

/// Rotation is in degrees (what the style layer consumes)
const FULL_TURN: f32 = 360.0;

/// Advance one particle by one tick.
///
/// Normal physics, in order: friction, damping, jitter, integration,
/// boundary reflection, speed clamp, rotation. Returning particles only
/// decay and drift (still confined) until they come to rest.
pub fn integrate_particle(
    p: &mut Particle,
    shape: &StadiumShape,
    params: &PhysicsParams,
    rng: &mut Rng,
) -> StepOutcome {
    if !p.is_active {
        return StepOutcome::Idle;
    }

    if !(p.pos.is_finite() && p.vel.is_finite()) {
        p.pos = shape.rest_position(p.size);
        p.vel = Vec2::ZERO;
        if let Some(trail) = p.trail.as_mut() {
            trail.reset(p.pos);
        }
        return StepOutcome::Recovered;
    }

    if p.return_to_origin {
        p.vel *= params.return_decay;
        p.pos += p.vel;
        shape.confine(&mut p.pos, &mut p.vel, p.size, params.bounce);

        if p.speed() < params.rest_epsilon {
            p.vel = Vec2::ZERO;
            p.return_to_origin = false;
            p.is_active = false;
            return StepOutcome::Settled;
        }
        return StepOutcome::Moved;
    }

    p.vel *= params.friction;
    p.vel *= params.damping;

    if params.jitter > 0.0 {
        p.vel.x += rng.signed() * params.jitter;
        p.vel.y += rng.signed() * params.jitter;
    }

    p.pos += p.vel;
    let bounced = shape.reflect(&mut p.pos, &mut p.vel, p.size, params.bounce);

    p.vel = p.vel.clamp_length(params.max_speed);
    p.rotation = (p.rotation + p.rotation_speed).rem_euclid(FULL_TURN);

    if bounced {
        StepOutcome::Bounced
    } else {
        StepOutcome::Moved
    }
}

pub fn integrate_batch(
    batch: &mut [Particle],
    shape: &StadiumShape,
    params: &PhysicsParams,
    rng: &mut Rng,
) -> IntegrateStats {
    let mut stats = IntegrateStats::default();
    for p in batch.iter_mut() {
        match integrate_particle(p, shape, params, rng) {
            StepOutcome::Idle => continue,
            StepOutcome::Moved => {}
            StepOutcome::Bounced => stats.bounced += 1,
            StepOutcome::Settled => stats.settled += 1,
            StepOutcome::Recovered => stats.recovered += 1,
        }
        stats.active += 1;
    }
    stats
}
