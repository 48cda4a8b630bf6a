//! Host controls
//!
//! A host is the visual control that displays one batch of particles. The
//! embedding page registers each host with an explicit `HostProfile`; the
//! engine never guesses a host's category from markup.
//!
//! Particles keep a `HostId` (slot index + generation) instead of a
//! reference. Removing a host bumps its slot generation, so stale ids simply
//! stop resolving.

use serde::{Deserialize, Serialize};

use crate::core::Vec2;
use crate::spatial::boundary::StadiumShape;

/// Generational handle into the `HostRegistry`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId {
    index: u16,
    generation: u16,
}

impl HostId {
    pub(crate) const fn new(index: u16, generation: u16) -> Self {
        Self { index, generation }
    }

    /// Packed form handed to JS
    pub fn to_raw(self) -> u32 {
        ((self.generation as u32) << 16) | self.index as u32
    }

    pub fn from_raw(raw: u32) -> Self {
        Self { index: (raw & 0xFFFF) as u16, generation: (raw >> 16) as u16 }
    }

    pub fn index(self) -> u16 {
        self.index
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeClass {
    pub size: f32,
    pub weight: f32,
}

/// What a host declares at registration time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostProfile {
    /// Pill extent in normalized units (<= 100)
    pub width: f32,
    pub height: f32,
    pub min_particles: u32,
    pub max_particles: u32,
    pub size_classes: Vec<SizeClass>,
    #[serde(default)]
    pub trail_length: u8,
    #[serde(default = "default_palette_size")]
    pub palette_size: u8,
    /// Chance a particle is drawn filled rather than outlined
    #[serde(default = "default_filled_ratio")]
    pub filled_ratio: f32,
}

fn default_palette_size() -> u8 {
    3
}

fn default_filled_ratio() -> f32 {
    0.5
}

const MAX_PARTICLES_PER_HOST: u32 = 256;
/// Smaller size classes are dropped; they would not render and would make
/// placement distances degenerate
pub const MIN_PARTICLE_SIZE: f32 = 0.5;

impl HostProfile {
    /// Main call-to-action button: wide pill, dense, mixed sizes
    pub fn primary() -> Self {
        Self {
            width: 100.0,
            height: 36.0,
            min_particles: 18,
            max_particles: 24,
            size_classes: vec![
                SizeClass { size: 3.0, weight: 4.0 },
                SizeClass { size: 4.5, weight: 3.0 },
                SizeClass { size: 6.0, weight: 2.0 },
                SizeClass { size: 8.0, weight: 1.0 },
            ],
            trail_length: 2,
            palette_size: 3,
            filled_ratio: 0.6,
        }
    }

    /// Secondary actions: slimmer pill, fewer and smaller particles
    pub fn secondary() -> Self {
        Self {
            width: 100.0,
            height: 30.0,
            min_particles: 10,
            max_particles: 14,
            size_classes: vec![
                SizeClass { size: 2.5, weight: 3.0 },
                SizeClass { size: 3.5, weight: 2.0 },
                SizeClass { size: 5.0, weight: 1.0 },
            ],
            trail_length: 0,
            palette_size: 2,
            filled_ratio: 0.4,
        }
    }

    /// Round icon button
    pub fn icon() -> Self {
        Self {
            width: 60.0,
            height: 60.0,
            min_particles: 6,
            max_particles: 8,
            size_classes: vec![
                SizeClass { size: 2.0, weight: 2.0 },
                SizeClass { size: 3.0, weight: 1.0 },
            ],
            trail_length: 0,
            palette_size: 2,
            filled_ratio: 0.5,
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "primary" => Some(Self::primary()),
            "secondary" => Some(Self::secondary()),
            "icon" => Some(Self::icon()),
            _ => None,
        }
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["primary", "secondary", "icon"]
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let profile: HostProfile = serde_json::from_str(json).map_err(|e| e.to_string())?;
        if profile.size_classes.is_empty() {
            return Err("host profile needs at least one size class".to_string());
        }
        Ok(profile.sanitized())
    }

    /// Clamp everything that could poison the simulation. Size classes with
    /// unusable size or weight are dropped; counts are ordered and capped.
    pub fn sanitized(mut self) -> Self {
        self.size_classes
            .retain(|c| c.size.is_finite() && c.size >= MIN_PARTICLE_SIZE && c.weight.is_finite() && c.weight > 0.0);
        let (lo, hi) = if self.min_particles <= self.max_particles {
            (self.min_particles, self.max_particles)
        } else {
            (self.max_particles, self.min_particles)
        };
        self.min_particles = lo.min(MAX_PARTICLES_PER_HOST);
        self.max_particles = hi.min(MAX_PARTICLES_PER_HOST);
        self.palette_size = self.palette_size.max(1);
        self.filled_ratio = if self.filled_ratio.is_finite() { self.filled_ratio.clamp(0.0, 1.0) } else { 0.5 };
        self
    }
}

/// Pointer bookkeeping for one host
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HoverState {
    /// Pointer currently over the host
    pub inside: bool,
    /// Last pointer position, already mapped onto the host's shape
    pub pointer: Option<Vec2>,
    /// Hover keeps counting until this time after the pointer left
    pub linger_until_ms: Option<f64>,
}

impl HoverState {
    pub fn is_hovering(&self, now_ms: f64) -> bool {
        self.inside || self.linger_until_ms.is_some_and(|t| now_ms < t)
    }

    /// Where the cursor force should act from, if anywhere
    pub fn force_origin(&self, now_ms: f64) -> Option<Vec2> {
        if self.is_hovering(now_ms) {
            self.pointer
        } else {
            None
        }
    }
}

#[derive(Clone, Debug)]
pub struct HostEntry {
    pub profile: HostProfile,
    pub shape: StadiumShape,
    /// Still part of the visible control tree
    pub attached: bool,
    pub hover: HoverState,
    /// Cosmetic "work in progress" trigger
    pub processing: bool,
    /// Particles currently engaged (activated) for this host
    pub engaged: bool,
    pub has_batch: bool,
}

impl HostEntry {
    fn new(profile: HostProfile, shape: StadiumShape) -> Self {
        Self {
            profile,
            shape,
            attached: true,
            hover: HoverState::default(),
            processing: false,
            engaged: false,
            has_batch: false,
        }
    }

    /// Should this host's particles be awake?
    pub fn wants_engaged(&self, now_ms: f64) -> bool {
        self.processing || self.hover.is_hovering(now_ms)
    }
}

struct Slot {
    generation: u16,
    entry: Option<HostEntry>,
}

#[derive(Default)]
pub struct HostRegistry {
    slots: Vec<Slot>,
    free: Vec<u16>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` only when every one of the 65536 slots is taken or
    /// retired.
    pub fn insert(&mut self, profile: HostProfile, shape: StadiumShape) -> Option<HostId> {
        let entry = HostEntry::new(profile, shape);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return Some(HostId::new(index, slot.generation));
        }
        let index = u16::try_from(self.slots.len()).ok()?;
        self.slots.push(Slot { generation: 0, entry: Some(entry) });
        Some(HostId::new(index, 0))
    }

    pub fn get(&self, id: HostId) -> Option<&HostEntry> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    pub fn get_mut(&mut self, id: HostId) -> Option<&mut HostEntry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Resolves and is still in the visible tree
    pub fn is_attached(&self, id: HostId) -> bool {
        self.get(id).is_some_and(|h| h.attached)
    }

    /// Mark a host as gone from the visible tree. Its particles stay until
    /// the next prune.
    pub fn detach(&mut self, id: HostId) -> bool {
        match self.get_mut(id) {
            Some(entry) if entry.attached => {
                entry.attached = false;
                true
            }
            _ => false,
        }
    }

    /// Drop a host and invalidate every id pointing at it. A slot whose
    /// generation is exhausted is retired instead of reused, so an old id
    /// can never resolve to a newer host.
    pub fn remove(&mut self, id: HostId) -> Option<HostEntry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(id.index);
        }
        Some(entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HostId, &HostEntry)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entry
                .as_ref()
                .map(|e| (HostId::new(i as u16, slot.generation), e))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (HostId, &mut HostEntry)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.entry
                .as_mut()
                .map(move |e| (HostId::new(i as u16, generation), e))
        })
    }

    pub fn ids(&self) -> Vec<HostId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn detached_ids(&self) -> Vec<HostId> {
        self.iter().filter(|(_, e)| !e.attached).map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
