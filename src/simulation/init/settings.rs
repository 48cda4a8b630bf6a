use crate::domain::config::EngineConfig;
use crate::spatial::boundary::MarginPolicy;
use crate::spatial::grid::SpatialGrid;

use super::init;
use super::perf_stats::PerfStats;
use super::visual_sink::VisualSink;
use super::EngineCore;

/// Disabling tears everything down; enabling runs `initialize`.
pub(super) fn set_enabled<S: VisualSink>(engine: &mut EngineCore<S>, enabled: bool) {
    engine.config.enabled = enabled;
    if enabled == engine.enabled {
        return;
    }
    if enabled {
        engine.enabled = true;
        init::initialize(engine);
    } else {
        init::teardown(engine);
        engine.enabled = false;
        console_log!("pulse: disabled");
    }
}

pub(super) fn apply_config<S: VisualSink>(engine: &mut EngineCore<S>, config: EngineConfig) {
    let margins = MarginPolicy::from(&config.physics);
    for (_, entry) in engine.hosts.iter_mut() {
        entry.shape = entry.shape.with_margins(margins);
    }
    engine.grid = SpatialGrid::new(config.grid_cells);
    let enabled = config.enabled;
    engine.config = config;

    if enabled != engine.enabled {
        set_enabled(engine, enabled);
    } else if engine.enabled {
        init::full_reset(engine);
    }
}

pub(super) fn enable_perf_metrics<S: VisualSink>(engine: &mut EngineCore<S>, enabled: bool) {
    engine.perf_enabled = enabled;
}

pub(super) fn get_perf_stats<S: VisualSink>(engine: &EngineCore<S>) -> PerfStats {
    engine.perf_stats.clone()
}
