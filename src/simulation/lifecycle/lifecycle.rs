//! Batch lifecycle
//!
//! Particles are only ever created by `spawn_batch` and only ever destroyed
//! by `destroy_batch`, `prune` and `reset_all`. Every path that drops a
//! particle releases its visual counterpart.

use crate::domain::host::{HostId, HostProfile, SizeClass};
use crate::domain::particle::{Particle, VisualVariant};
use crate::spatial::boundary::{MarginPolicy, StadiumShape};
use crate::spatial::poisson::{self, PoissonParams};
use crate::systems::trails::attach_trail;

use super::hover;
use super::visual_sink::VisualSink;
use super::EngineCore;

/// Initial spin range, degrees per tick
const ROTATION_SPEED: f32 = 1.5;

pub(super) fn register_host<S: VisualSink>(engine: &mut EngineCore<S>, profile: HostProfile) -> Option<HostId> {
    let profile = profile.sanitized();
    let shape = StadiumShape::new(profile.width, profile.height)
        .with_margins(MarginPolicy::from(&engine.config.physics));
    let id = engine.hosts.insert(profile, shape);
    if id.is_none() {
        console_warn!("pulse: host registry is full, host ignored");
    }
    id
}

pub(super) fn on_host_added<S: VisualSink>(engine: &mut EngineCore<S>, profile: HostProfile) -> Option<HostId> {
    prune(engine);
    let id = register_host(engine, profile)?;
    if engine.enabled {
        reinitialize(engine, id);
        engine.scheduler.start();
    }
    Some(id)
}

pub(super) fn on_host_removed<S: VisualSink>(engine: &mut EngineCore<S>, host: HostId) -> u32 {
    engine.hosts.detach(host);
    prune(engine)
}

/// Replace the host's batch with up to `count` new particles. Fewer are
/// created when the shape runs out of room. Returns how many were created.
///
/// The old batch is always destroyed first, so a host's particles stay one
/// contiguous run and never overlap a second, independently placed batch.
pub(super) fn spawn_batch<S: VisualSink>(engine: &mut EngineCore<S>, host: HostId, count: u32) -> u32 {
    if !engine.enabled || !engine.hosts.is_attached(host) {
        return 0;
    }
    destroy_batch(engine, host);
    if count == 0 {
        return 0;
    }
    let Some(entry) = engine.hosts.get(host) else {
        return 0;
    };
    let shape = entry.shape;
    let engaged = entry.engaged;
    let trail_length = entry.profile.trail_length;
    let palette_size = entry.profile.palette_size.max(1) as usize;
    let filled_ratio = entry.profile.filled_ratio;

    // classes that can never be placed would only shorten the batch
    let classes: Vec<(u8, SizeClass)> = entry
        .profile
        .size_classes
        .iter()
        .enumerate()
        .filter(|(_, c)| shape.can_fit(c.size))
        .map(|(i, c)| (i as u8, *c))
        .collect();
    if classes.is_empty() {
        console_warn!("pulse: no size class fits host {:?}", host);
        return 0;
    }

    let weights: Vec<f32> = classes.iter().map(|(_, c)| c.weight).collect();
    let picks: Vec<usize> = (0..count)
        .filter_map(|_| engine.rng.weighted_index(&weights))
        .collect();
    let sizes: Vec<f32> = picks.iter().map(|&k| classes[k].1.size).collect();
    let max_size = sizes.iter().copied().fold(0.0f32, f32::max);

    let params = PoissonParams {
        min_distance: max_size + engine.config.placement.spacing,
        max_attempts: engine.config.placement.max_attempts,
        seed_attempts: engine.config.placement.seed_attempts,
    };
    let positions = poisson::generate(&shape, params, count as usize, &sizes, &mut engine.rng);
    if positions.len() < count as usize {
        console_log!("pulse: host {:?} placed {} of {} particles", host, positions.len(), count);
    }

    let activation_speed = engine.config.physics.activation_speed;
    let spawned = positions.len() as u32;
    for (pos, &pick) in positions.into_iter().zip(&picks) {
        let (class_index, class) = classes[pick];
        let variant = VisualVariant {
            filled: engine.rng.chance(filled_ratio),
            scheme: engine.rng.index(palette_size) as u8,
        };
        let mut p = Particle::new(host, pos, class.size, class_index, variant);
        p.rotation = engine.rng.range(0.0, 360.0);
        p.rotation_speed = engine.rng.range(-ROTATION_SPEED, ROTATION_SPEED);
        attach_trail(&mut p, trail_length);
        if engaged {
            hover::activate(&mut p, activation_speed, &mut engine.rng);
        }

        engine.sink.spawn(host, &p);
        engine.particles.push(p);
    }

    if let Some(entry) = engine.hosts.get_mut(host) {
        entry.has_batch = true;
    }
    spawned
}

/// Remove every particle of `host`. Returns how many were removed.
pub(super) fn destroy_batch<S: VisualSink>(engine: &mut EngineCore<S>, host: HostId) -> u32 {
    let EngineCore { particles, sink, hosts, .. } = engine;
    let mut removed = 0;
    particles.retain(|p| {
        if p.host != host {
            return true;
        }
        sink.release(p.id);
        removed += 1;
        false
    });
    if let Some(entry) = hosts.get_mut(host) {
        entry.has_batch = false;
    }
    removed
}

/// Replace the host's batch with a fresh one sized from its profile
pub(super) fn reinitialize<S: VisualSink>(engine: &mut EngineCore<S>, host: HostId) -> u32 {
    if !engine.enabled || !engine.hosts.is_attached(host) {
        return 0;
    }
    let (min, max) = match engine.hosts.get(host) {
        Some(entry) => (entry.profile.min_particles, entry.profile.max_particles),
        None => return 0,
    };
    let count = engine.rng.range_u32(min, max);
    spawn_batch(engine, host, count)
}

/// Drop particles whose host is gone or detached, then forget detached
/// hosts so their ids go stale. Returns how many particles were removed.
pub(super) fn prune<S: VisualSink>(engine: &mut EngineCore<S>) -> u32 {
    let EngineCore { particles, sink, hosts, .. } = engine;
    let mut removed = 0;
    particles.retain(|p| {
        if hosts.is_attached(p.host) {
            return true;
        }
        sink.release(p.id);
        removed += 1;
        false
    });

    for id in hosts.detached_ids() {
        hosts.remove(id);
    }
    removed
}

/// Drop every particle and every per-host batch/hover record. Hosts stay
/// registered.
pub(super) fn reset_all<S: VisualSink>(engine: &mut EngineCore<S>) {
    let count = engine.particles.len();
    for p in engine.particles.drain(..) {
        engine.sink.release(p.id);
    }
    for (_, entry) in engine.hosts.iter_mut() {
        entry.has_batch = false;
        entry.engaged = false;
        entry.hover = Default::default();
    }
    if count > 0 {
        console_log!("pulse: reset, released {} particles", count);
    }
}
