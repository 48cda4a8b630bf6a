//! Public surface
//!
//! - `wasm`        JS-facing exports
//! - `frame_loop`  browser frame driver behind `Engine`

pub mod frame_loop;
pub mod wasm;
