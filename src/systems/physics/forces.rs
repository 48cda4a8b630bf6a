use crate::core::Vec2;
use crate::domain::config::CursorParams;
use crate::domain::particle::Particle;

/// Below this distance the push direction is undefined
const MIN_DISTANCE: f32 = 1e-4;

/// Push active particles away from `pointer` (host space).
///
/// The velocity delta is `(1 - d / radius) * strength`, pointing from the
/// pointer to the particle centre. Returning particles are left alone so
/// they can settle. Returns how many particles were pushed.
pub fn apply_cursor_force(batch: &mut [Particle], pointer: Vec2, params: &CursorParams) -> u32 {
    if !params.enabled || !pointer.is_finite() || params.radius <= 0.0 || params.strength <= 0.0 {
        return 0;
    }

    let radius = params.radius;
    let radius_sq = radius * radius;
    let mut affected = 0;

    for p in batch.iter_mut() {
        if !p.is_active || p.return_to_origin {
            continue;
        }
        let offset = p.center() - pointer;
        let dist_sq = offset.length_squared();
        if dist_sq >= radius_sq {
            continue;
        }
        let dist = dist_sq.sqrt();
        if dist <= MIN_DISTANCE {
            continue;
        }

        let push = (1.0 - dist / radius) * params.strength;
        p.vel += offset * (push / dist);
        affected += 1;
    }

    affected
}
