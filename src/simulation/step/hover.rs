//! Pointer feed and engagement
//!
//! A host is engaged while it is hovered (pointer inside, or inside the
//! linger window after leaving) or flagged as processing. Engagement
//! changes are applied at the start of a tick: engaging wakes the host's
//! particles with a random kick, disengaging lets them coast to rest.

use crate::core::numeric::finite_clamped;
use crate::core::{Rng, Vec2};
use crate::domain::host::HostId;
use crate::domain::particle::Particle;

use super::visual_sink::VisualSink;
use super::EngineCore;

/// Pointer coordinates arrive as percent of the host
const POINTER_EXTENT: f32 = 100.0;

pub(super) fn pointer_enter<S: VisualSink>(engine: &mut EngineCore<S>, host: HostId) -> bool {
    let Some(entry) = engine.hosts.get_mut(host) else {
        return false;
    };
    entry.hover.inside = true;
    entry.hover.linger_until_ms = None;
    true
}

pub(super) fn pointer_move<S: VisualSink>(engine: &mut EngineCore<S>, host: HostId, x: f32, y: f32) -> bool {
    let (Some(x), Some(y)) = (
        finite_clamped(x, 0.0, POINTER_EXTENT),
        finite_clamped(y, 0.0, POINTER_EXTENT),
    ) else {
        return false;
    };
    let Some(entry) = engine.hosts.get_mut(host) else {
        return false;
    };
    let shape = &entry.shape;
    entry.hover.pointer = Some(Vec2::new(
        x / POINTER_EXTENT * shape.width(),
        y / POINTER_EXTENT * shape.height(),
    ));
    true
}

pub(super) fn pointer_leave<S: VisualSink>(engine: &mut EngineCore<S>, host: HostId) -> bool {
    let linger_until = engine.now_ms + engine.config.hover_linger_ms;
    let Some(entry) = engine.hosts.get_mut(host) else {
        return false;
    };
    entry.hover.inside = false;
    entry.hover.linger_until_ms = Some(linger_until);
    true
}

pub(super) fn set_host_processing<S: VisualSink>(engine: &mut EngineCore<S>, host: HostId, processing: bool) -> bool {
    let Some(entry) = engine.hosts.get_mut(host) else {
        return false;
    };
    entry.processing = processing;
    true
}

/// Clear every host's processing flag. Particles are left as they are;
/// engagement follows on the next tick.
pub(super) fn clear_transient_visual_state<S: VisualSink>(engine: &mut EngineCore<S>) -> u32 {
    let EngineCore { hosts, sink, .. } = engine;
    let mut cleared = 0;
    for (id, entry) in hosts.iter_mut() {
        if entry.processing {
            entry.processing = false;
            sink.processing_cleared(id);
            cleared += 1;
        }
    }
    cleared
}

/// Wake a particle with a random-direction kick of `speed * [0.5, 1)`
pub(super) fn activate(p: &mut Particle, speed: f32, rng: &mut Rng) {
    p.is_active = true;
    p.return_to_origin = false;
    let magnitude = speed * rng.range(0.5, 1.0);
    p.vel = Vec2::from_angle(rng.angle()) * magnitude;
}

/// Expire linger windows and apply engage/disengage transitions.
/// Returns the number of hosts that changed state.
pub(super) fn update_engagement<S: VisualSink>(engine: &mut EngineCore<S>) -> u32 {
    let EngineCore { hosts, particles, rng, config, now_ms, .. } = engine;
    let now = *now_ms;
    let speed = config.physics.activation_speed;
    let mut transitions = 0;

    for (id, entry) in hosts.iter_mut() {
        if entry.hover.linger_until_ms.is_some_and(|t| now >= t) {
            entry.hover.linger_until_ms = None;
            if !entry.hover.inside {
                entry.hover.pointer = None;
            }
        }
        if !entry.attached {
            continue;
        }

        let wants = entry.wants_engaged(now);
        if wants == entry.engaged {
            continue;
        }
        entry.engaged = wants;
        transitions += 1;

        for p in particles.iter_mut().filter(|p| p.host == id) {
            if wants {
                activate(p, speed, rng);
            } else if p.is_active {
                p.return_to_origin = true;
            }
        }
    }

    transitions
}
