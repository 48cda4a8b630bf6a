use wasm_bindgen::prelude::*;

use crate::domain::host::HostProfile;

pub use crate::simulation::{Engine, PerfStats};

/// Names accepted by `Engine.register_preset`, as a JSON array
#[wasm_bindgen]
pub fn host_preset_names() -> String {
    serde_json::to_string(HostProfile::preset_names()).unwrap_or_else(|_| "[]".to_string())
}

/// Full profile of a preset as JSON, for pages that want to tweak one
/// before registering it with `Engine.register_host`.
#[wasm_bindgen]
pub fn host_preset_json(name: &str) -> Option<String> {
    let profile = HostProfile::preset(name)?;
    serde_json::to_string(&profile).ok()
}
