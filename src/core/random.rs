//! Xorshift32 random source
//!
//! Deterministic per engine instance (seeded from config) so batches,
//! jitter and tests are reproducible. Not suitable for anything but visuals.

/// Xorshift32 step
#[inline]
pub fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

#[derive(Clone, Debug)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        // xorshift never leaves zero
        Self { state: if seed == 0 { 0x9E37_79B9 } else { seed } }
    }

    pub fn reseed(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        xorshift32(&mut self.state)
    }

    /// Uniform in [0, 1)
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // 24 high bits -> exact f32 mantissa
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in [min, max)
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Uniform in [-1, 1)
    #[inline]
    pub fn signed(&mut self) -> f32 {
        self.range(-1.0, 1.0)
    }

    /// Uniform integer in [min, max] (inclusive). Swapped bounds are tolerated.
    pub fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = (hi - lo) as u64 + 1;
        lo + (self.next_u32() as u64 % span) as u32
    }

    /// Index in [0, len)
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u32() as usize) % len
    }

    /// Random angle in [0, 2π)
    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.next_f32() * std::f32::consts::TAU
    }

    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Weighted draw. Non-positive and non-finite weights never win.
    /// Returns `None` when no weight is usable.
    pub fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights
            .iter()
            .filter(|w| w.is_finite() && **w > 0.0)
            .sum();
        if total <= 0.0 {
            return None;
        }

        let mut pick = self.next_f32() * total;
        let mut last_valid = None;
        for (i, &w) in weights.iter().enumerate() {
            if !(w.is_finite() && w > 0.0) {
                continue;
            }
            if pick < w {
                return Some(i);
            }
            pick -= w;
            last_valid = Some(i);
        }
        // float rounding at the top end
        last_valid
    }
}
