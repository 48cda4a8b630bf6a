//! Visual counterpart seam
//!
//! The engine never touches the page. Whatever draws particles implements
//! `VisualSink`; the default is `RenderBuffers`, which queues everything for
//! JS to pull.

use crate::domain::host::HostId;
use crate::domain::particle::{Particle, ParticleId, TrailParticle, VisualVariant};
use crate::spatial::boundary::StadiumShape;

/// Per-frame drawable state of one particle, in percent of its host
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState<'a> {
    pub id: ParticleId,
    pub host: HostId,
    pub x_pct: f32,
    pub y_pct: f32,
    /// Degrees
    pub rotation: f32,
    pub opacity: f32,
    /// Edge length as a percent of the host width
    pub size_pct: f32,
    pub variant: VisualVariant,
    /// Followers in host space; map with `pct_x` / `pct_y`
    pub trail: &'a [TrailParticle],
    width: f32,
    height: f32,
}

impl<'a> VisualState<'a> {
    pub fn of(p: &'a Particle, shape: &StadiumShape) -> Self {
        let width = shape.width();
        let height = shape.height();
        Self {
            id: p.id,
            host: p.host,
            x_pct: p.pos.x / width * 100.0,
            y_pct: p.pos.y / height * 100.0,
            rotation: p.rotation,
            opacity: if p.is_active { 1.0 } else { 0.0 },
            size_pct: p.size / width * 100.0,
            variant: p.variant,
            trail: p.trail_followers(),
            width,
            height,
        }
    }

    #[inline]
    pub fn pct_x(&self, x: f32) -> f32 {
        x / self.width * 100.0
    }

    #[inline]
    pub fn pct_y(&self, y: f32) -> f32 {
        y / self.height * 100.0
    }
}

pub trait VisualSink {
    fn begin_frame(&mut self, _frame: u64) {}

    /// A particle was created; build its counterpart
    fn spawn(&mut self, host: HostId, particle: &Particle);

    /// Push this frame's state. Returns false when the counterpart no
    /// longer exists (removed from the page before the engine pruned it).
    fn update(&mut self, state: &VisualState<'_>) -> bool;

    /// The particle is gone; drop its counterpart if it still exists
    fn release(&mut self, id: ParticleId);

    fn end_frame(&mut self) {}

    /// The host's "processing" look should be cleared
    fn processing_cleared(&mut self, _host: HostId) {}
}
