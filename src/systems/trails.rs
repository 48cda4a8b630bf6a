//! Trail followers
//!
//! Followers are cosmetic: they replay the parent's recent positions and
//! never take part in collisions or boundary tests.

use crate::domain::particle::{Particle, Trail};

/// Give `p` a trail of `len` followers, or drop its trail when `len == 0`.
pub fn attach_trail(p: &mut Particle, len: u8) {
    p.trail = if len == 0 { None } else { Some(Trail::new(len, p.pos)) };
}

/// Feed this tick's positions into every trail. Inactive particles have
/// their trail collapsed so it doesn't smear when they wake up.
/// Returns the number of followers that moved.
pub fn record_trails(batch: &mut [Particle]) -> u32 {
    let mut followers = 0;
    for p in batch.iter_mut() {
        let pos = p.pos;
        let active = p.is_active;
        let Some(trail) = p.trail.as_mut() else {
            continue;
        };
        if active {
            trail.record(pos);
            followers += trail.len() as u32;
        } else {
            trail.reset(pos);
        }
    }
    followers
}
