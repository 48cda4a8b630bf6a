//! Engine orchestration
//!
//! `EngineCore` owns all simulation state: the host registry, the shared
//! particle list, the broad-phase grid, the scheduler and the visual sink.
//! Operation bodies live in the submodules as free functions over the core;
//! `Engine` (facade.rs) is the JS-facing wrapper.
//!
//! Particles of one host are always stored as one contiguous run, so a
//! tick can walk host batches with `chunk_by_mut` instead of grouping.

use crate::core::Rng;
use crate::domain::config::EngineConfig;
use crate::domain::host::{HostEntry, HostId, HostProfile, HostRegistry};
use crate::domain::particle::Particle;
use crate::spatial::grid::SpatialGrid;

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "render/visual_sink.rs"]
pub mod visual_sink;
#[path = "render/render_buffers.rs"]
pub mod render_buffers;
#[path = "scheduler/scheduler.rs"]
pub mod scheduler;
#[path = "lifecycle/lifecycle.rs"]
mod lifecycle;
#[path = "step/hover.rs"]
mod hover;
#[path = "step/step.rs"]
mod step;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::Engine;
pub use perf_stats::PerfStats;
pub use render_buffers::{RenderBuffers, SpawnRecord};
pub use scheduler::{AnimationScheduler, FrameHandle};
pub use visual_sink::{VisualSink, VisualState};

pub struct EngineCore<S: VisualSink = RenderBuffers> {
    config: EngineConfig,
    hosts: HostRegistry,
    particles: Vec<Particle>,
    grid: SpatialGrid,
    scheduler: AnimationScheduler,
    sink: S,
    rng: Rng,

    // State
    enabled: bool,
    now_ms: f64,
    frame: u64,
    candidates: Vec<usize>,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl EngineCore {
    pub fn new(config: EngineConfig) -> Self {
        init::create_engine_core(config, RenderBuffers::new())
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        Ok(Self::new(EngineConfig::from_json(json)?))
    }
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<S: VisualSink> EngineCore<S> {
    pub fn with_sink(config: EngineConfig, sink: S) -> Self {
        init::create_engine_core(config, sink)
    }

    // === DISCOVERY ===

    /// A host control appeared: prune, register, spawn its batch when enabled.
    /// `None` only when the registry is out of slots.
    pub fn on_host_added(&mut self, profile: HostProfile) -> Option<HostId> {
        lifecycle::on_host_added(self, profile)
    }

    /// A host control went away: mark it detached, then prune.
    pub fn on_host_removed(&mut self, host: HostId) -> u32 {
        lifecycle::on_host_removed(self, host)
    }

    /// Register without spawning (hosts known before `initialize`)
    pub fn register_host(&mut self, profile: HostProfile) -> Option<HostId> {
        lifecycle::register_host(self, profile)
    }

    /// Mark a host as gone without pruning; its particles keep simulating
    /// until the next maintenance pass.
    pub fn detach_host(&mut self, host: HostId) -> bool {
        self.hosts.detach(host)
    }

    // === POINTER / HOST STATE ===

    pub fn pointer_enter(&mut self, host: HostId) -> bool {
        hover::pointer_enter(self, host)
    }

    /// `x`, `y` in 0..100 relative to the host. Non-finite input is dropped.
    pub fn pointer_move(&mut self, host: HostId, x: f32, y: f32) -> bool {
        hover::pointer_move(self, host, x, y)
    }

    pub fn pointer_leave(&mut self, host: HostId) -> bool {
        hover::pointer_leave(self, host)
    }

    /// Keep a host's particles engaged while a long-running action is busy
    pub fn set_host_processing(&mut self, host: HostId, processing: bool) -> bool {
        hover::set_host_processing(self, host, processing)
    }

    pub fn clear_transient_visual_state(&mut self) -> u32 {
        hover::clear_transient_visual_state(self)
    }

    // === LIFECYCLE ===

    /// Replace the host's batch with up to `count` particles
    pub fn spawn_batch(&mut self, host: HostId, count: u32) -> u32 {
        lifecycle::spawn_batch(self, host, count)
    }

    pub fn reinitialize(&mut self, host: HostId) -> u32 {
        lifecycle::reinitialize(self, host)
    }

    pub fn prune(&mut self) -> u32 {
        lifecycle::prune(self)
    }

    pub fn reset_all(&mut self) {
        lifecycle::reset_all(self)
    }

    /// Spawn batches for every attached host that has none, start the loop
    pub fn initialize(&mut self) -> u32 {
        init::initialize(self)
    }

    pub fn full_reset(&mut self) -> u32 {
        init::full_reset(self)
    }

    pub fn teardown(&mut self) {
        init::teardown(self)
    }

    // === SETTINGS ===

    pub fn set_enabled(&mut self, enabled: bool) {
        settings::set_enabled(self, enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Swap the config; a running engine is fully reset with it
    pub fn apply_config(&mut self, config: EngineConfig) {
        settings::apply_config(self, config)
    }

    /// Enable or disable per-tick timings (counters are always kept)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled)
    }

    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    // === FRAME LOOP ===

    /// One simulation step at `now_ms`, regardless of the scheduler
    pub fn tick(&mut self, now_ms: f64) {
        step::tick(self, now_ms)
    }

    /// A scheduled frame fired. Ticks when running and enabled; returns
    /// whether the driver should request another frame.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        step::frame(self, now_ms)
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn arm_frame(&mut self, handle: FrameHandle) -> bool {
        self.scheduler.arm(handle)
    }

    pub fn take_cancelled_frames(&mut self) -> Vec<FrameHandle> {
        self.scheduler.take_cancelled()
    }

    pub fn take_start_request(&mut self) -> bool {
        self.scheduler.take_start_request()
    }

    // === ACCESSORS ===

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles_of(&self, host: HostId) -> impl Iterator<Item = &Particle> + '_ {
        self.particles.iter().filter(move |p| p.host == host)
    }

    pub fn hosts(&self) -> &HostRegistry {
        &self.hosts
    }

    pub fn host(&self, id: HostId) -> Option<&HostEntry> {
        self.hosts.get(id)
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
