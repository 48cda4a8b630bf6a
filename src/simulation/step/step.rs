//! One simulation tick
//!
//! Fixed order for every host: engagement transitions, integrate + cursor
//! force, then grid rebuild + collisions, then trails and visual sync. No
//! phase starts before the previous one has finished for all hosts.

use crate::core::numeric::sanitize_time;
use crate::systems::physics::{apply_cursor_force, integrate_batch, resolve_collisions};
use crate::systems::trails::record_trails;

use super::hover;
use super::perf_timer::{elapsed_or_zero, PerfTimer};
use super::visual_sink::{VisualSink, VisualState};
use super::EngineCore;

pub(super) fn frame<S: VisualSink>(engine: &mut EngineCore<S>, now_ms: f64) -> bool {
    if !engine.scheduler.begin_frame() {
        return false;
    }
    if !engine.enabled {
        engine.scheduler.stop();
        return false;
    }
    tick(engine, now_ms);
    engine.scheduler.is_running()
}

pub(super) fn tick<S: VisualSink>(engine: &mut EngineCore<S>, now_ms: f64) {
    if !engine.enabled {
        return;
    }
    let step_timer = PerfTimer::start_if(engine.perf_enabled);
    engine.perf_stats.reset();
    engine.now_ms = sanitize_time(now_ms, engine.now_ms);
    engine.frame += 1;

    let t = PerfTimer::start_if(engine.perf_enabled);
    hover::update_engagement(engine);
    engine.perf_stats.hover_ms = elapsed_or_zero(t);

    integrate_hosts(engine);
    collide_hosts(engine);
    sync_visuals(engine);

    engine.perf_stats.particle_count = engine.particles.len() as u32;
    engine.perf_stats.host_count = engine.hosts.len() as u32;
    engine.perf_stats.step_ms = elapsed_or_zero(step_timer);
}

fn integrate_hosts<S: VisualSink>(engine: &mut EngineCore<S>) {
    let t = PerfTimer::start_if(engine.perf_enabled);
    let EngineCore { hosts, particles, rng, config, now_ms, perf_stats, .. } = engine;

    for batch in particles.chunk_by_mut(|a, b| a.host == b.host) {
        // a removed host's particles wait for the next prune
        let Some(entry) = hosts.get(batch[0].host) else {
            continue;
        };

        let stats = integrate_batch(batch, &entry.shape, &config.physics, rng);
        perf_stats.active_particles += stats.active;
        perf_stats.bounces += stats.bounced;
        perf_stats.settled += stats.settled;
        perf_stats.recovered += stats.recovered;

        if config.cursor.enabled {
            if let Some(pointer) = entry.hover.force_origin(*now_ms) {
                perf_stats.cursor_pushes += apply_cursor_force(batch, pointer, &config.cursor);
            }
        }
    }

    perf_stats.integrate_ms = elapsed_or_zero(t);
}

fn collide_hosts<S: VisualSink>(engine: &mut EngineCore<S>) {
    if !engine.config.collision.enabled {
        return;
    }
    let t = PerfTimer::start_if(engine.perf_enabled);
    let EngineCore { hosts, particles, grid, config, candidates, perf_stats, .. } = engine;

    for batch in particles.chunk_by_mut(|a, b| a.host == b.host) {
        let Some(entry) = hosts.get(batch[0].host) else {
            continue;
        };
        if !batch.iter().any(|p| p.is_active) {
            continue;
        }

        grid.rebuild(batch);
        let stats = resolve_collisions(
            batch,
            grid,
            &entry.shape,
            config.collision.restitution,
            config.physics.bounce,
            candidates,
        );
        perf_stats.collision_checks += stats.checks;
        perf_stats.collisions_resolved += stats.resolved;
    }

    perf_stats.collision_ms = elapsed_or_zero(t);
}

/// Counterparts that vanished early are counted, never treated as errors.
fn sync_visuals<S: VisualSink>(engine: &mut EngineCore<S>) {
    let t = PerfTimer::start_if(engine.perf_enabled);
    let EngineCore { hosts, particles, sink, frame, perf_stats, .. } = engine;

    for batch in particles.chunk_by_mut(|a, b| a.host == b.host) {
        perf_stats.trail_followers += record_trails(batch);
    }

    sink.begin_frame(*frame);
    for p in particles.iter() {
        let Some(entry) = hosts.get(p.host) else {
            perf_stats.missing_visuals += 1;
            continue;
        };
        if !sink.update(&VisualState::of(p, &entry.shape)) {
            perf_stats.missing_visuals += 1;
        }
    }
    sink.end_frame();

    perf_stats.sync_ms = elapsed_or_zero(t);
}
