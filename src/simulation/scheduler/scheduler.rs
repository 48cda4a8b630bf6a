//! Frame loop state machine
//!
//! One scheduler per engine. It does not know how frames are requested;
//! the driver (`requestAnimationFrame` in the browser, a plain loop in
//! tests) asks it what to do:
//!
//! - `take_start_request()` true  -> request a frame, then `arm(handle)`
//! - frame fires                  -> `begin_frame()`; false means stop here
//! - `take_cancelled()`           -> cancel each handle with the host
//!
//! `stop()` is idempotent: a pending handle is handed out for cancellation
//! exactly once.

/// Opaque id of a requested frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

#[derive(Debug, Default)]
pub struct AnimationScheduler {
    running: bool,
    pending: Option<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    start_requested: bool,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when this call started the loop
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.start_requested = true;
        true
    }

    /// Returns true when this call stopped the loop
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.start_requested = false;
        if let Some(handle) = self.pending.take() {
            self.cancelled.push(handle);
        }
        true
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Record the handle of the next requested frame. A handle that arrives
    /// after `stop()` is queued for cancellation right away.
    pub fn arm(&mut self, handle: FrameHandle) -> bool {
        if !self.running {
            self.cancelled.push(handle);
            return false;
        }
        if let Some(stale) = self.pending.replace(handle) {
            self.cancelled.push(stale);
        }
        true
    }

    /// The pending frame fired. Returns whether a tick should run.
    pub fn begin_frame(&mut self) -> bool {
        self.pending = None;
        self.running
    }

    pub fn take_cancelled(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.cancelled)
    }

    pub fn take_start_request(&mut self) -> bool {
        std::mem::replace(&mut self.start_requested, false)
    }
}
