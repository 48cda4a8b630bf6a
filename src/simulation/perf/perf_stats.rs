use wasm_bindgen::prelude::*;

/// Snapshot of the last tick. Timings stay at zero unless perf metrics are
/// enabled; counters are always filled.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(crate) step_ms: f64,
    pub(crate) hover_ms: f64,
    pub(crate) integrate_ms: f64,
    pub(crate) collision_ms: f64,
    pub(crate) sync_ms: f64,
    pub(crate) active_particles: u32,
    pub(crate) bounces: u32,
    pub(crate) settled: u32,
    pub(crate) recovered: u32,
    pub(crate) cursor_pushes: u32,
    pub(crate) collision_checks: u32,
    pub(crate) collisions_resolved: u32,
    pub(crate) trail_followers: u32,
    pub(crate) missing_visuals: u32,
    pub(crate) particle_count: u32,
    pub(crate) host_count: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn hover_ms(&self) -> f64 { self.hover_ms }
    #[wasm_bindgen(getter)]
    pub fn integrate_ms(&self) -> f64 { self.integrate_ms }
    #[wasm_bindgen(getter)]
    pub fn collision_ms(&self) -> f64 { self.collision_ms }
    #[wasm_bindgen(getter)]
    pub fn sync_ms(&self) -> f64 { self.sync_ms }

    #[wasm_bindgen(getter)]
    pub fn active_particles(&self) -> u32 { self.active_particles }
    #[wasm_bindgen(getter)]
    pub fn bounces(&self) -> u32 { self.bounces }
    #[wasm_bindgen(getter)]
    pub fn settled(&self) -> u32 { self.settled }
    #[wasm_bindgen(getter)]
    pub fn recovered(&self) -> u32 { self.recovered }
    #[wasm_bindgen(getter)]
    pub fn cursor_pushes(&self) -> u32 { self.cursor_pushes }
    #[wasm_bindgen(getter)]
    pub fn collision_checks(&self) -> u32 { self.collision_checks }
    #[wasm_bindgen(getter)]
    pub fn collisions_resolved(&self) -> u32 { self.collisions_resolved }
    #[wasm_bindgen(getter)]
    pub fn trail_followers(&self) -> u32 { self.trail_followers }
    /// Particles whose visual counterpart was already gone at sync time
    #[wasm_bindgen(getter)]
    pub fn missing_visuals(&self) -> u32 { self.missing_visuals }
    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.particle_count }
    #[wasm_bindgen(getter)]
    pub fn host_count(&self) -> u32 { self.host_count }
}
