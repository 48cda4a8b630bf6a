//! Particle entity
//!
//! Positions are the top-left corner of the particle's square bounding box,
//! in the host's normalized space. `size` doubles as collision radius
//! (`size / 2`) and as pseudo-mass.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::core::Vec2;

use super::host::HostId;

/// Process-unique particle id. Ordering is meaningful: collision pairs are
/// only processed from the lower id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(pub u32);

static NEXT_PARTICLE_ID: AtomicU32 = AtomicU32::new(1);

/// Ids are shared by every engine instance in the process and never
/// handed out twice, resets included, up to `u32::MAX - 1` ids. The counter
/// saturates there: every later particle shares `u32::MAX`.
pub fn next_particle_id() -> ParticleId {
    take_id(&NEXT_PARTICLE_ID)
}

fn take_id(counter: &AtomicU32) -> ParticleId {
    let id = counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
        .unwrap_or(u32::MAX);
    ParticleId(id)
}

/// Cosmetic look, chosen at spawn and never read by the simulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisualVariant {
    pub filled: bool,
    pub scheme: u8,
}

/// Follower drawn a few frames behind its parent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailParticle {
    /// Frames behind the parent
    pub delay: u8,
    /// Opacity relative to the parent
    pub opacity: f32,
    pub pos: Vec2,
}

#[derive(Clone, Debug)]
pub struct Trail {
    followers: Vec<TrailParticle>,
    /// Most recent parent position first
    history: VecDeque<Vec2>,
}

impl Trail {
    const DELAY_STEP: u8 = 2;
    const OPACITY_FALLOFF: f32 = 0.6;

    pub fn new(len: u8, start: Vec2) -> Self {
        let followers: Vec<TrailParticle> = (0..len)
            .map(|i| TrailParticle {
                delay: (i + 1).saturating_mul(Self::DELAY_STEP),
                opacity: Self::OPACITY_FALLOFF.powi(i as i32 + 1),
                pos: start,
            })
            .collect();
        let depth = followers.last().map(|f| f.delay as usize + 1).unwrap_or(1);
        let mut history = VecDeque::with_capacity(depth);
        history.push_front(start);
        Self { followers, history }
    }

    /// Record the parent's latest position and slide followers along
    pub fn record(&mut self, pos: Vec2) {
        let depth = self.followers.last().map(|f| f.delay as usize + 1).unwrap_or(1);
        self.history.push_front(pos);
        self.history.truncate(depth);

        let oldest = self.history.back().copied().unwrap_or(pos);
        for f in self.followers.iter_mut() {
            f.pos = self.history.get(f.delay as usize).copied().unwrap_or(oldest);
        }
    }

    /// Collapse the trail onto `pos` (used when a particle is teleported)
    pub fn reset(&mut self, pos: Vec2) {
        self.history.clear();
        self.history.push_front(pos);
        for f in self.followers.iter_mut() {
            f.pos = pos;
        }
    }

    pub fn followers(&self) -> &[TrailParticle] {
        &self.followers
    }

    pub fn len(&self) -> usize {
        self.followers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.followers.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub id: ParticleId,
    /// Non-owning link to the host control; resolved through the registry
    pub host: HostId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Index into the host profile's size classes
    pub size_class: u8,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub is_active: bool,
    pub return_to_origin: bool,
    pub variant: VisualVariant,
    pub trail: Option<Trail>,
}

impl Particle {
    pub fn new(host: HostId, pos: Vec2, size: f32, size_class: u8, variant: VisualVariant) -> Self {
        Self {
            id: next_particle_id(),
            host,
            pos,
            vel: Vec2::ZERO,
            size,
            size_class,
            rotation: 0.0,
            rotation_speed: 0.0,
            is_active: false,
            return_to_origin: false,
            variant,
            trail: None,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        let r = self.radius();
        Vec2::new(self.pos.x + r, self.pos.y + r)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn trail_followers(&self) -> &[TrailParticle] {
        self.trail.as_ref().map(|t| t.followers()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_counter_saturates_instead_of_wrapping() {
        let counter = AtomicU32::new(u32::MAX - 1);
        assert_eq!(take_id(&counter), ParticleId(u32::MAX - 1));
        assert_eq!(take_id(&counter), ParticleId(u32::MAX));
        assert_eq!(take_id(&counter), ParticleId(u32::MAX));
        assert_eq!(counter.load(Ordering::Relaxed), u32::MAX);
    }

    #[test]
    fn ids_increase_and_never_repeat() {
        let a = next_particle_id();
        let b = next_particle_id();
        assert!(b > a);
    }

    #[test]
    fn center_is_offset_by_radius() {
        let p = Particle::new(HostId::new(0, 0), Vec2::new(10.0, 20.0), 4.0, 0, VisualVariant::default());
        assert_eq!(p.center(), Vec2::new(12.0, 22.0));
        assert_eq!(p.radius(), 2.0);
        assert!(!p.is_active);
    }

    #[test]
    fn trail_followers_lag_behind_parent() {
        let mut trail = Trail::new(2, Vec2::new(0.0, 0.0));
        assert_eq!(trail.len(), 2);
        for i in 1..=10 {
            trail.record(Vec2::new(i as f32, 0.0));
        }
        let f = trail.followers();
        // delays 2 and 4 frames
        assert_eq!(f[0].pos.x, 8.0);
        assert_eq!(f[1].pos.x, 6.0);
        assert!(f[0].opacity > f[1].opacity);
    }

    #[test]
    fn young_trail_uses_oldest_known_position() {
        let mut trail = Trail::new(2, Vec2::new(5.0, 5.0));
        trail.record(Vec2::new(6.0, 5.0));
        assert_eq!(trail.followers()[1].pos, Vec2::new(5.0, 5.0));

        trail.reset(Vec2::new(1.0, 1.0));
        assert!(trail.followers().iter().all(|f| f.pos == Vec2::new(1.0, 1.0)));
    }
}
