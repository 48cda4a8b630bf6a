//! Default `VisualSink`: flat per-frame buffers for JS.
//!
//! Layout per frame:
//! - `frame_ids[i]`             particle id
//! - `frame_data[i * 5 ..][..5]` x%, y%, rotation (deg), opacity, size%
//! - `trail_ids[j]`             parent particle id
//! - `trail_data[j * 3 ..][..3]` x%, y%, opacity
//!
//! Creation and removal of DOM counterparts go through the spawn/release
//! queues, drained by JS after each frame.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::host::HostId;
use crate::domain::particle::{Particle, ParticleId};

use super::visual_sink::{VisualSink, VisualState};

pub const FRAME_STRIDE: usize = 5;
pub const TRAIL_STRIDE: usize = 3;

/// What JS needs to build a counterpart
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnRecord {
    pub id: u32,
    pub host: u32,
    pub size: f32,
    pub size_class: u8,
    pub filled: bool,
    pub scheme: u8,
    pub trail_length: u8,
}

#[derive(Default)]
pub struct RenderBuffers {
    live: HashSet<ParticleId>,
    spawned: Vec<SpawnRecord>,
    released: Vec<u32>,
    processing_cleared: Vec<u32>,
    frame_ids: Vec<u32>,
    frame_data: Vec<f32>,
    trail_ids: Vec<u32>,
    trail_data: Vec<f32>,
}

impl RenderBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_spawned(&mut self) -> Vec<SpawnRecord> {
        std::mem::take(&mut self.spawned)
    }

    pub fn take_spawned_json(&mut self) -> String {
        let records = self.take_spawned();
        serde_json::to_string(&records).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn take_released(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.released)
    }

    pub fn take_processing_cleared(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.processing_cleared)
    }

    /// JS reports that a counterpart vanished from the page on its own.
    /// The particle keeps simulating until its host is pruned.
    pub fn detach_visual(&mut self, id: u32) -> bool {
        self.live.remove(&ParticleId(id))
    }

    pub fn is_live(&self, id: ParticleId) -> bool {
        self.live.contains(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn frame_len(&self) -> usize {
        self.frame_ids.len()
    }

    pub fn frame_ids(&self) -> &[u32] {
        &self.frame_ids
    }

    pub fn frame_data(&self) -> &[f32] {
        &self.frame_data
    }

    pub fn trail_ids(&self) -> &[u32] {
        &self.trail_ids
    }

    pub fn trail_data(&self) -> &[f32] {
        &self.trail_data
    }

    /// Frame row for `id`, if it was written this frame
    pub fn row(&self, id: ParticleId) -> Option<&[f32]> {
        let i = self.frame_ids.iter().position(|&v| v == id.0)?;
        self.frame_data.get(i * FRAME_STRIDE..(i + 1) * FRAME_STRIDE)
    }
}

impl VisualSink for RenderBuffers {
    fn begin_frame(&mut self, _frame: u64) {
        self.frame_ids.clear();
        self.frame_data.clear();
        self.trail_ids.clear();
        self.trail_data.clear();
    }

    fn spawn(&mut self, host: HostId, particle: &Particle) {
        self.live.insert(particle.id);
        self.spawned.push(SpawnRecord {
            id: particle.id.0,
            host: host.to_raw(),
            size: particle.size,
            size_class: particle.size_class,
            filled: particle.variant.filled,
            scheme: particle.variant.scheme,
            trail_length: particle.trail_followers().len() as u8,
        });
    }

    fn update(&mut self, state: &VisualState<'_>) -> bool {
        if !self.live.contains(&state.id) {
            return false;
        }
        self.frame_ids.push(state.id.0);
        self.frame_data
            .extend_from_slice(&[state.x_pct, state.y_pct, state.rotation, state.opacity, state.size_pct]);

        for f in state.trail {
            self.trail_ids.push(state.id.0);
            self.trail_data
                .extend_from_slice(&[state.pct_x(f.pos.x), state.pct_y(f.pos.y), state.opacity * f.opacity]);
        }
        true
    }

    fn release(&mut self, id: ParticleId) {
        if !self.live.remove(&id) {
            return;
        }
        // never handed to JS: just forget it
        if let Some(i) = self.spawned.iter().position(|r| r.id == id.0) {
            self.spawned.remove(i);
            return;
        }
        self.released.push(id.0);
    }

    fn processing_cleared(&mut self, host: HostId) {
        self.processing_cleared.push(host.to_raw());
    }
}
