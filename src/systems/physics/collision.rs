use crate::core::Vec2;
use crate::domain::particle::Particle;
use crate::spatial::boundary::StadiumShape;
use crate::spatial::grid::SpatialGrid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Candidate pairs that passed the id/activity filter
    pub checks: u32,
    /// Pairs that overlapped and got a response
    pub resolved: u32,
}

/// Respond to an overlap between `a` and `b`.
///
/// Velocities are rotated into the collision-normal frame, the normal
/// components go through a 1-D elastic exchange with `size` as mass and are
/// scaled by `restitution`, then everything is rotated back. The pair is
/// pushed apart by half the overlap each. Returns false when the two do
/// not overlap.
pub fn collide_pair(a: &mut Particle, b: &mut Particle, restitution: f32) -> bool {
    let delta = b.center() - a.center();
    let reach = a.radius() + b.radius();
    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return false;
    }

    let dist = dist_sq.sqrt();
    // coincident centres: any axis will do
    let angle = if dist > 1e-6 { delta.y.atan2(delta.x) } else { 0.0 };
    let (sin, cos) = angle.sin_cos();

    // into the normal frame (rotate by -angle)
    let u1 = a.vel.rotate(-sin, cos);
    let u2 = b.vel.rotate(-sin, cos);

    let m1 = a.size.max(f32::EPSILON);
    let m2 = b.size.max(f32::EPSILON);
    let total = m1 + m2;
    let n1 = ((m1 - m2) * u1.x + 2.0 * m2 * u2.x) / total * restitution;
    let n2 = ((m2 - m1) * u2.x + 2.0 * m1 * u1.x) / total * restitution;

    a.vel = Vec2::new(n1, u1.y).rotate(sin, cos);
    b.vel = Vec2::new(n2, u2.y).rotate(sin, cos);

    let normal = Vec2::new(cos, sin);
    let half_overlap = (reach - dist) * 0.5;
    a.pos -= normal * half_overlap;
    b.pos += normal * half_overlap;

    true
}

/// Mutable access to two distinct elements
fn pair_mut(batch: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert!(i != j);
    if i < j {
        let (left, right) = batch.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = batch.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Narrow phase over one host batch. `grid` must have been rebuilt from
/// this batch. A pair is handled once, from the particle with the lower id.
/// Both particles are confined to `shape` again after separation.
pub fn resolve_collisions(
    batch: &mut [Particle],
    grid: &SpatialGrid,
    shape: &StadiumShape,
    restitution: f32,
    bounce: f32,
    candidates: &mut Vec<usize>,
) -> CollisionStats {
    let mut stats = CollisionStats::default();

    for i in 0..batch.len() {
        if !batch[i].is_active {
            continue;
        }
        grid.neighbors(batch[i].center(), candidates);

        for &j in candidates.iter() {
            if j == i || j >= batch.len() {
                continue;
            }
            if !batch[j].is_active || batch[j].id <= batch[i].id {
                continue;
            }
            stats.checks += 1;

            let (a, b) = pair_mut(batch, i, j);
            if collide_pair(a, b, restitution) {
                shape.confine(&mut a.pos, &mut a.vel, a.size, bounce);
                shape.confine(&mut b.pos, &mut b.vel, b.size, bounce);
                stats.resolved += 1;
            }
        }
    }

    stats
}
