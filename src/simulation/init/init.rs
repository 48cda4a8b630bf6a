use crate::core::Rng;
use crate::domain::config::EngineConfig;
use crate::domain::host::{HostId, HostRegistry};
use crate::spatial::grid::SpatialGrid;

use super::lifecycle;
use super::perf_stats::PerfStats;
use super::scheduler::AnimationScheduler;
use super::visual_sink::VisualSink;
use super::EngineCore;

pub(super) fn create_engine_core<S: VisualSink>(config: EngineConfig, sink: S) -> EngineCore<S> {
    EngineCore {
        grid: SpatialGrid::new(config.grid_cells),
        rng: Rng::new(config.seed),
        enabled: config.enabled,
        config,
        hosts: HostRegistry::new(),
        particles: Vec::new(),
        scheduler: AnimationScheduler::new(),
        sink,
        now_ms: 0.0,
        frame: 0,
        candidates: Vec::new(),
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    }
}

/// Spawn a batch for every attached host without one and start the loop.
/// Returns the number of particles created.
pub(super) fn initialize<S: VisualSink>(engine: &mut EngineCore<S>) -> u32 {
    if !engine.enabled {
        return 0;
    }
    lifecycle::prune(engine);

    let pending: Vec<HostId> = engine
        .hosts
        .iter()
        .filter(|(_, entry)| entry.attached && !entry.has_batch)
        .map(|(id, _)| id)
        .collect();

    let mut spawned = 0;
    for id in pending {
        spawned += lifecycle::reinitialize(engine, id);
    }

    engine.scheduler.start();
    console_log!(
        "pulse: initialized {} hosts, {} particles",
        engine.hosts.len(),
        engine.particles.len()
    );
    spawned
}

/// Destroy everything, reseed, start over. Two resets in a row produce the
/// same batches.
pub(super) fn full_reset<S: VisualSink>(engine: &mut EngineCore<S>) -> u32 {
    lifecycle::reset_all(engine);
    engine.rng.reseed(engine.config.seed);
    initialize(engine)
}

/// Stop the loop and remove every visual counterpart. Hosts stay
/// registered so `initialize` can bring them back.
pub(super) fn teardown<S: VisualSink>(engine: &mut EngineCore<S>) {
    engine.scheduler.stop();
    lifecycle::reset_all(engine);
}
