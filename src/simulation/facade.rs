use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::api::frame_loop::{FrameLoop, SharedCore};
use crate::domain::config::EngineConfig;
use crate::domain::host::{HostId, HostProfile};

use super::perf_stats::PerfStats;
use super::EngineCore;

/// JS handle to one engine instance.
///
/// Host ids cross the boundary as packed `u32` (see `HostId::to_raw`).
/// After every call that can start or stop the loop, the frame driver is
/// synced with the scheduler.
#[wasm_bindgen]
pub struct Engine {
    core: SharedCore,
    frames: FrameLoop,
}

#[wasm_bindgen]
impl Engine {
    /// Create an engine from an optional JSON config (`EngineConfig`)
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Engine, JsValue> {
        let config = match config_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => EngineConfig::from_json(json).map_err(|e| JsValue::from_str(&e))?,
            _ => EngineConfig::default(),
        };
        Ok(Engine::with_config(config))
    }

    /// Register a host from a JSON `HostProfile`; spawns its batch when
    /// enabled. Returns the host id.
    pub fn register_host(&mut self, profile_json: &str) -> Result<u32, JsValue> {
        let profile = HostProfile::from_json(profile_json).map_err(|e| JsValue::from_str(&e))?;
        self.add_host(profile).ok_or_else(|| JsValue::from_str("host registry is full"))
    }

    /// Register a host with a built-in profile: `primary`, `secondary`, `icon`
    pub fn register_preset(&mut self, name: &str) -> Result<u32, JsValue> {
        let profile = HostProfile::preset(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown host preset: {}", name)))?;
        self.add_host(profile).ok_or_else(|| JsValue::from_str("host registry is full"))
    }

    pub fn remove_host(&mut self, host: u32) -> u32 {
        self.core.borrow_mut().on_host_removed(HostId::from_raw(host))
    }

    pub fn detach_host(&mut self, host: u32) -> bool {
        self.core.borrow_mut().detach_host(HostId::from_raw(host))
    }

    pub fn prune(&mut self) -> u32 {
        self.core.borrow_mut().prune()
    }

    pub fn pointer_enter(&mut self, host: u32) -> bool {
        self.core.borrow_mut().pointer_enter(HostId::from_raw(host))
    }

    pub fn pointer_move(&mut self, host: u32, x: f32, y: f32) -> bool {
        self.core.borrow_mut().pointer_move(HostId::from_raw(host), x, y)
    }

    pub fn pointer_leave(&mut self, host: u32) -> bool {
        self.core.borrow_mut().pointer_leave(HostId::from_raw(host))
    }

    pub fn set_host_processing(&mut self, host: u32, processing: bool) -> bool {
        self.core.borrow_mut().set_host_processing(HostId::from_raw(host), processing)
    }

    pub fn clear_transient_visual_state(&mut self) -> u32 {
        self.core.borrow_mut().clear_transient_visual_state()
    }

    pub fn initialize(&mut self) -> u32 {
        let spawned = self.core.borrow_mut().initialize();
        self.sync();
        spawned
    }

    pub fn full_reset(&mut self) -> u32 {
        let spawned = self.core.borrow_mut().full_reset();
        self.sync();
        spawned
    }

    pub fn teardown(&mut self) {
        self.core.borrow_mut().teardown();
        self.sync();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.core.borrow_mut().set_enabled(enabled);
        self.sync();
    }

    #[wasm_bindgen(getter)]
    pub fn enabled(&self) -> bool {
        self.core.borrow().is_enabled()
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.core.borrow().is_running()
    }

    pub fn set_config(&mut self, config_json: &str) -> Result<(), JsValue> {
        let config = EngineConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?;
        self.core.borrow_mut().apply_config(config);
        self.sync();
        Ok(())
    }

    pub fn config_json(&self) -> String {
        self.core.borrow().config().to_json()
    }

    /// Run one frame by hand, for pages that drive their own loop. Returns
    /// whether the engine is still running.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let mut core = self.core.borrow_mut();
        core.tick(now_ms);
        core.is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 {
        self.core.borrow().particle_count() as u32
    }

    #[wasm_bindgen(getter)]
    pub fn host_count(&self) -> u32 {
        self.core.borrow().host_count() as u32
    }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 {
        self.core.borrow().frame_count()
    }

    // === RENDER OUTPUT ===

    pub fn frame_len(&self) -> u32 {
        self.core.borrow().sink().frame_len() as u32
    }

    pub fn frame_ids(&self) -> Vec<u32> {
        self.core.borrow().sink().frame_ids().to_vec()
    }

    /// 5 floats per particle: x%, y%, rotation, opacity, size%
    pub fn frame_data(&self) -> Vec<f32> {
        self.core.borrow().sink().frame_data().to_vec()
    }

    pub fn trail_ids(&self) -> Vec<u32> {
        self.core.borrow().sink().trail_ids().to_vec()
    }

    /// 3 floats per follower: x%, y%, opacity
    pub fn trail_data(&self) -> Vec<f32> {
        self.core.borrow().sink().trail_data().to_vec()
    }

    pub fn take_spawned_json(&mut self) -> String {
        self.core.borrow_mut().sink_mut().take_spawned_json()
    }

    pub fn take_released(&mut self) -> Vec<u32> {
        self.core.borrow_mut().sink_mut().take_released()
    }

    pub fn take_processing_cleared(&mut self) -> Vec<u32> {
        self.core.borrow_mut().sink_mut().take_processing_cleared()
    }

    /// The page removed a particle's node on its own
    pub fn detach_visual(&mut self, id: u32) -> bool {
        self.core.borrow_mut().sink_mut().detach_visual(id)
    }

    /// Enable or disable per-tick timings (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.borrow_mut().enable_perf_metrics(enabled);
    }

    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.borrow().get_perf_stats()
    }
}

impl Engine {
    pub fn with_config(config: EngineConfig) -> Self {
        Self::from_core(EngineCore::new(config))
    }

    pub fn from_core(core: EngineCore) -> Self {
        let engine = Self { core: Rc::new(RefCell::new(core)), frames: FrameLoop::new() };
        engine.sync();
        engine
    }

    /// Shared handle for Rust-side embedders and tests
    pub fn core(&self) -> &Rc<RefCell<EngineCore>> {
        &self.core
    }

    pub fn add_host(&mut self, profile: HostProfile) -> Option<u32> {
        let id = self.core.borrow_mut().on_host_added(profile);
        self.sync();
        id.map(HostId::to_raw)
    }

    fn sync(&self) {
        self.frames.sync(&self.core);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let torn_down = match self.core.try_borrow_mut() {
            Ok(mut core) => {
                core.teardown();
                true
            }
            Err(_) => false,
        };
        if torn_down {
            self.sync();
        }
    }
}
