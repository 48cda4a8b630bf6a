//! Stadium (pill) containment
//!
//! A host's particles live in `[0, W] x [0, H]`: a rectangle whose two short
//! ends are replaced by semicircles of radius `R = H / 2`. Particle positions
//! are the top-left corner of their bounding box, so every test here works on
//! the box `(x, y) .. (x + size, y + size)`.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::core::numeric::clamp_finite;
use crate::core::Vec2;
use crate::domain::config::PhysicsParams;

/// Edge of the normalized coordinate space
pub const SPACE_EXTENT: f32 = 100.0;

/// Smallest extent a host shape is allowed to collapse to
pub const MIN_EXTENT: f32 = 1.0;

const DEFAULT_WIDTH: f32 = SPACE_EXTENT;
const DEFAULT_HEIGHT: f32 = 40.0;

/// Comparison slack for float rounding on the clamped edges
const CONTAIN_EPS: f32 = 1e-4;
/// Extra inset when projecting back inside a cap
const PROJECT_EPS: f32 = 1e-3;
/// A box can touch both caps on short pills; two passes settle it
const CAP_PASSES: usize = 3;

/// Clearance between a particle's box and the shape outline.
/// Bigger particles get more room so they read as contained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarginPolicy {
    pub base: f32,
    pub large: f32,
    pub large_threshold: f32,
}

impl MarginPolicy {
    #[inline]
    pub fn for_size(&self, size: f32) -> f32 {
        if size >= self.large_threshold {
            self.large
        } else {
            self.base
        }
    }
}

impl Default for MarginPolicy {
    fn default() -> Self {
        MarginPolicy::from(&PhysicsParams::default())
    }
}

impl From<&PhysicsParams> for MarginPolicy {
    fn from(p: &PhysicsParams) -> Self {
        Self {
            base: p.margin,
            large: p.large_margin,
            large_threshold: p.large_size_threshold,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StadiumShape {
    width: f32,
    height: f32,
    margins: MarginPolicy,
}

impl StadiumShape {
    /// Build a shape from untrusted extents. Non-finite values fall back to
    /// a 100x40 pill, everything is clamped to `[MIN_EXTENT, SPACE_EXTENT]`
    /// and the width never drops below the height.
    pub fn new(width: f32, height: f32) -> Self {
        let height = clamp_finite(height, MIN_EXTENT, SPACE_EXTENT, DEFAULT_HEIGHT);
        let width = clamp_finite(width, MIN_EXTENT, SPACE_EXTENT, DEFAULT_WIDTH).max(height);
        Self { width, height, margins: MarginPolicy::default() }
    }

    pub fn with_margins(mut self, margins: MarginPolicy) -> Self {
        self.margins = margins;
        self
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.height * 0.5
    }

    #[inline]
    pub fn margins(&self) -> MarginPolicy {
        self.margins
    }

    #[inline]
    pub fn margin_for(&self, size: f32) -> f32 {
        self.margins.for_size(size)
    }

    #[inline]
    fn left_cap(&self) -> Vec2 {
        let r = self.radius();
        Vec2::new(r, r)
    }

    #[inline]
    fn right_cap(&self) -> Vec2 {
        let r = self.radius();
        Vec2::new(self.width - r, r)
    }

    /// Top-left position that centres a box of `size` in the shape
    pub fn rest_position(&self, size: f32) -> Vec2 {
        Vec2::new((self.width - size) * 0.5, (self.height - size) * 0.5)
    }

    /// Does the box at `(x, y)` with edge `size` sit inside the pill?
    pub fn contains(&self, x: f32, y: f32, size: f32) -> bool {
        if !(x.is_finite() && y.is_finite() && size.is_finite()) || size < 0.0 {
            return false;
        }
        let m = self.margin_for(size);

        if x < m - CONTAIN_EPS
            || y < m - CONTAIN_EPS
            || x + size > self.width - m + CONTAIN_EPS
            || y + size > self.height - m + CONTAIN_EPS
        {
            return false;
        }

        self.cap_violation(Vec2::new(x, y), size).is_none()
    }

    /// Whether any placement of a box this size can pass `contains`
    pub fn can_fit(&self, size: f32) -> bool {
        let p = self.rest_position(size);
        self.contains(p.x, p.y, size)
    }

    /// First cap centre that some corner of the box escapes from
    fn cap_violation(&self, pos: Vec2, size: f32) -> Option<Vec2> {
        let r = self.radius();
        let reach = r - self.margin_for(size);
        if reach <= 0.0 {
            return Some(self.left_cap());
        }
        let reach_sq = (reach + CONTAIN_EPS) * (reach + CONTAIN_EPS);

        let left = self.left_cap();
        let right = self.right_cap();
        let corners = [
            pos,
            Vec2::new(pos.x + size, pos.y),
            Vec2::new(pos.x, pos.y + size),
            Vec2::new(pos.x + size, pos.y + size),
        ];

        for corner in corners {
            if corner.x < r && (corner - left).length_squared() > reach_sq {
                return Some(left);
            }
            if corner.x > self.width - r && (corner - right).length_squared() > reach_sq {
                return Some(right);
            }
        }
        None
    }

    /// Rectangular part of the bounce: clamp each axis into
    /// `[m, extent - m - size]`, flip that velocity component inwards and
    /// scale it by `bounce`. Returns true when a wall was hit.
    pub fn reflect_axes(&self, pos: &mut Vec2, vel: &mut Vec2, size: f32, bounce: f32) -> bool {
        let m = self.margin_for(size);
        let max_x = (self.width - m - size).max(m);
        let max_y = (self.height - m - size).max(m);
        let mut hit = false;

        if pos.x < m {
            pos.x = m;
            vel.x = vel.x.abs() * bounce;
            hit = true;
        } else if pos.x > max_x {
            pos.x = max_x;
            vel.x = -vel.x.abs() * bounce;
            hit = true;
        }

        if pos.y < m {
            pos.y = m;
            vel.y = vel.y.abs() * bounce;
            hit = true;
        } else if pos.y > max_y {
            pos.y = max_y;
            vel.y = -vel.y.abs() * bounce;
            hit = true;
        }

        hit
    }

    /// Full containment: axis reflection, then pull the box back inside any
    /// cap it pokes out of and reflect the velocity off the cap normal.
    ///
    /// Afterwards `contains` holds for every size that `can_fit`.
    pub fn reflect(&self, pos: &mut Vec2, vel: &mut Vec2, size: f32, bounce: f32) -> bool {
        let mut hit = self.reflect_axes(pos, vel, size, bounce);

        for _ in 0..CAP_PASSES {
            let Some(cap) = self.cap_violation(*pos, size) else {
                break;
            };
            self.project_into_cap(pos, vel, size, bounce, cap);
            hit = true;
        }

        hit
    }

    /// Positional containment only (used after collision separation)
    pub fn confine(&self, pos: &mut Vec2, vel: &mut Vec2, size: f32, bounce: f32) {
        self.reflect(pos, vel, size, bounce);
    }

    fn project_into_cap(&self, pos: &mut Vec2, vel: &mut Vec2, size: f32, bounce: f32, cap: Vec2) {
        let half = size * 0.5;
        let r = self.radius();
        let reach = r - self.margin_for(size);
        // the box's circumscribed circle must sit inside the reachable disc
        let target = reach - size * FRAC_1_SQRT_2 - PROJECT_EPS;

        if target < 0.0 {
            // box too big for the cap: park it in the straight middle band
            let band_max = self.width - r - size;
            if band_max >= r {
                pos.x = pos.x.clamp(r, band_max);
            } else {
                *pos = self.rest_position(size);
            }
            *vel = Vec2::ZERO;
            return;
        }

        let centre = Vec2::new(pos.x + half, pos.y + half);
        let offset = centre - cap;
        let normal = offset.normalize();
        let normal = if normal == Vec2::ZERO { Vec2::new(0.0, 1.0) } else { normal };

        let new_centre = cap + normal * target.min(offset.length());
        pos.x = new_centre.x - half;
        pos.y = new_centre.y - half;

        let outward = vel.dot(normal);
        if outward > 0.0 {
            *vel -= normal * ((1.0 + bounce) * outward);
        }
    }
}

impl Default for StadiumShape {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}
