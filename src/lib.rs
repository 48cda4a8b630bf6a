//! Pulse Engine - energy particles for pill-shaped action buttons
//!
//! A small real-time 2D simulation running in WASM: Poisson-disk
//! placement inside a stadium shape, a uniform broad-phase grid, elastic
//! collisions and a cursor force field, driven by one frame loop shared by
//! every host control on the page.
//!
//! Architecture:
//! - core/        - RNG, vector math, numeric guards, logging macros
//! - domain/      - particles, hosts, config
//! - spatial/     - boundary shape, placement, broad phase
//! - systems/     - physics and trails
//! - simulation/  - engine orchestration + wasm facade
//! - api/         - public API and frame driver

// Logging macros (must be first so every module below sees them)
#[macro_use]
pub mod core;
pub mod spatial;
pub mod domain;
pub mod systems;
pub mod simulation;
pub mod api;

use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    console_log!("pulse engine {} initialized", env!("CARGO_PKG_VERSION"));
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use api::wasm::{Engine, PerfStats};
pub use domain::config::EngineConfig;
pub use domain::host::{HostId, HostProfile};
pub use simulation::{EngineCore, RenderBuffers, VisualSink};
