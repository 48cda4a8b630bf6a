//! Console logging macros
//!
//! On wasm32 the message goes to the browser console through `web_sys`.
//! Native builds (tests, benches) only type-check the format arguments, so
//! engine code can log freely without a JS runtime behind it.
//!
//! ```ignore
//! console_log!("spawned {} particles for host {:?}", count, host);
//! ```

macro_rules! console_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::log_1(&format!($($arg)*).into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}

macro_rules! console_warn {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::warn_1(&format!($($arg)*).into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}
