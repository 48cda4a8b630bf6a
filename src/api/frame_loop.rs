//! Frame driver
//!
//! Connects an engine's `AnimationScheduler` to the host environment. In the
//! browser that is `requestAnimationFrame` / `cancelAnimationFrame`; on
//! native targets there is nothing to drive, so the loop only drains the
//! scheduler's queues and callers tick the engine themselves.

use std::cell::RefCell;
use std::rc::Rc;

use crate::simulation::EngineCore;

pub type SharedCore = Rc<RefCell<EngineCore>>;

#[cfg(target_arch = "wasm32")]
pub use browser::FrameLoop;

#[cfg(not(target_arch = "wasm32"))]
pub use native::FrameLoop;

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use super::SharedCore;
    use crate::simulation::{EngineCore, FrameHandle};

    type FrameCallback = Closure<dyn FnMut(f64)>;
    type CallbackSlot = Rc<RefCell<Option<FrameCallback>>>;

    /// Owns the rAF callback. The callback only holds weak references, so
    /// dropping the engine (and this loop) frees everything.
    pub struct FrameLoop {
        callback: CallbackSlot,
    }

    impl FrameLoop {
        pub fn new() -> Self {
            Self { callback: Rc::new(RefCell::new(None)) }
        }

        /// Apply whatever the scheduler asked for since the last call
        pub fn sync(&self, core: &SharedCore) {
            let Some(window) = web_sys::window() else {
                return;
            };
            cancel_frames(&window, core);

            let start = core.borrow_mut().take_start_request();
            if start {
                self.ensure_callback(core);
                request_frame(&window, &self.callback, core);
            }
        }

        fn ensure_callback(&self, core: &SharedCore) {
            if self.callback.borrow().is_some() {
                return;
            }
            let weak_core = Rc::downgrade(core);
            let weak_slot = Rc::downgrade(&self.callback);

            let callback = Closure::wrap(Box::new(move |now_ms: f64| {
                let (Some(core), Some(slot)) = (weak_core.upgrade(), weak_slot.upgrade()) else {
                    return;
                };
                let again = core.borrow_mut().frame(now_ms);
                let Some(window) = web_sys::window() else {
                    return;
                };
                cancel_frames(&window, &core);
                if again {
                    request_frame(&window, &slot, &core);
                }
            }) as Box<dyn FnMut(f64)>);

            *self.callback.borrow_mut() = Some(callback);
        }
    }

    fn request_frame(window: &web_sys::Window, slot: &RefCell<Option<FrameCallback>>, core: &RefCell<EngineCore>) {
        let slot = slot.borrow();
        let Some(callback) = slot.as_ref() else {
            return;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(handle) => {
                core.borrow_mut().arm_frame(FrameHandle(handle));
            }
            Err(err) => {
                console_warn!("pulse: requestAnimationFrame failed: {:?}", err);
            }
        }
    }

    fn cancel_frames(window: &web_sys::Window, core: &RefCell<EngineCore>) {
        let cancelled = core.borrow_mut().take_cancelled_frames();
        for handle in cancelled {
            if let Err(err) = window.cancel_animation_frame(handle.0) {
                console_warn!("pulse: cancelAnimationFrame({}) failed: {:?}", handle.0, err);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::SharedCore;

    /// No frame source; the embedder calls `tick` directly.
    pub struct FrameLoop;

    impl FrameLoop {
        pub fn new() -> Self {
            FrameLoop
        }

        pub fn sync(&self, core: &SharedCore) {
            let mut core = core.borrow_mut();
            core.take_cancelled_frames();
            core.take_start_request();
        }
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
