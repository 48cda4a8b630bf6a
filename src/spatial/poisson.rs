//! Poisson-disk placement (Bridson)
//!
//! Produces well-spread, non-overlapping start positions inside a stadium.
//! Each output point `i` is the top-left corner of a box of `sizes[i]` and
//! passes `StadiumShape::contains` for that size. Running out of room is
//! normal: the result is simply shorter than requested.

use std::f32::consts::SQRT_2;

use crate::core::{Rng, Vec2};

use super::boundary::{StadiumShape, SPACE_EXTENT};

/// Sample-grid cells per axis over the whole space, at most
const MAX_GRID_CELLS: f32 = 100.0;
/// Distances below this would need more than `MAX_GRID_CELLS` cells per axis
const MIN_SAMPLE_DISTANCE: f32 = SPACE_EXTENT * SQRT_2 / MAX_GRID_CELLS;

/// Sampling knobs that stay constant for a whole batch
#[derive(Clone, Copy, Debug)]
pub struct PoissonParams {
    pub min_distance: f32,
    pub max_attempts: u32,
    pub seed_attempts: u32,
}

/// Background index: one slot per cell of edge `d / √2`, so a cell can
/// hold at most one accepted sample.
struct SampleGrid {
    cell: f32,
    cols: usize,
    rows: usize,
    slots: Vec<Option<u32>>,
}

impl SampleGrid {
    fn new(width: f32, height: f32, min_distance: f32) -> Self {
        let cell = min_distance / SQRT_2;
        let cols = ((width / cell).ceil() as usize).max(1);
        let rows = ((height / cell).ceil() as usize).max(1);
        Self { cell, cols, rows, slots: vec![None; cols * rows] }
    }

    #[inline]
    fn cell_of(&self, p: Vec2) -> (usize, usize) {
        let cx = ((p.x / self.cell).floor().max(0.0) as usize).min(self.cols - 1);
        let cy = ((p.y / self.cell).floor().max(0.0) as usize).min(self.rows - 1);
        (cx, cy)
    }

    fn insert(&mut self, p: Vec2, sample: u32) {
        let (cx, cy) = self.cell_of(p);
        self.slots[cy * self.cols + cx] = Some(sample);
    }

    /// Is `p` at least `min_distance` from every stored sample?
    /// With cell = d/√2 only the 5x5 block around `p` can hold a conflict.
    fn is_far_enough(&self, p: Vec2, points: &[Vec2], min_distance: f32) -> bool {
        let (cx, cy) = self.cell_of(p);
        let min_sq = min_distance * min_distance;

        let x0 = cx.saturating_sub(2);
        let y0 = cy.saturating_sub(2);
        let x1 = (cx + 2).min(self.cols - 1);
        let y1 = (cy + 2).min(self.rows - 1);

        for gy in y0..=y1 {
            for gx in x0..=x1 {
                if let Some(idx) = self.slots[gy * self.cols + gx] {
                    if (points[idx as usize] - p).length_squared() < min_sq {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Generate up to `target_count` positions, at least `min_distance` apart.
/// Very small distances are raised to `MIN_SAMPLE_DISTANCE` so the sample
/// grid stays bounded.
///
/// `sizes[i]` is the size class of the `i`-th accepted sample; at most
/// `sizes.len()` samples are produced.
pub fn generate(
    shape: &StadiumShape,
    params: PoissonParams,
    target_count: usize,
    sizes: &[f32],
    rng: &mut Rng,
) -> Vec<Vec2> {
    let target = target_count.min(sizes.len());
    if target == 0 || !params.min_distance.is_finite() || params.min_distance <= 0.0 {
        return Vec::new();
    }
    let d = params.min_distance.max(MIN_SAMPLE_DISTANCE);

    let width = shape.width();
    let height = shape.height();

    let Some(first) = seed_point(shape, sizes[0], params.seed_attempts, rng) else {
        return Vec::new();
    };

    let mut grid = SampleGrid::new(width, height, d);
    let mut points = Vec::with_capacity(target);
    let mut active: Vec<u32> = Vec::with_capacity(target);

    grid.insert(first, 0);
    points.push(first);
    active.push(0);

    while !active.is_empty() && points.len() < target {
        let slot = rng.index(active.len());
        let origin = points[active[slot] as usize];
        let size = sizes[points.len()];

        let mut accepted = None;
        for _ in 0..params.max_attempts {
            let radius = rng.range(d, 2.0 * d);
            let candidate = origin + Vec2::from_angle(rng.angle()) * radius;

            if candidate.x < 0.0 || candidate.y < 0.0 || candidate.x >= width || candidate.y >= height {
                continue;
            }
            if !grid.is_far_enough(candidate, &points, d) {
                continue;
            }
            if !shape.contains(candidate.x, candidate.y, size) {
                continue;
            }
            accepted = Some(candidate);
            break;
        }

        match accepted {
            Some(p) => {
                let idx = points.len() as u32;
                grid.insert(p, idx);
                points.push(p);
                active.push(idx);
            }
            None => {
                active.swap_remove(slot);
            }
        }
    }

    points
}

fn seed_point(shape: &StadiumShape, size: f32, attempts: u32, rng: &mut Rng) -> Option<Vec2> {
    if !shape.can_fit(size) {
        return None;
    }
    for _ in 0..attempts {
        let p = Vec2::new(rng.range(0.0, shape.width()), rng.range(0.0, shape.height()));
        if shape.contains(p.x, p.y, size) {
            return Some(p);
        }
    }
    // random tries all missed a thin shape; the centre is known to fit
    Some(shape.rest_position(size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(min_distance: f32) -> PoissonParams {
        PoissonParams { min_distance, max_attempts: 30, seed_attempts: 64 }
    }

    fn assert_spacing(points: &[Vec2], min_distance: f32) {
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                let d = (points[i] - points[j]).length();
                assert!(d >= min_distance, "points {} and {} are {} apart", i, j, d);
            }
        }
    }

    #[test]
    fn respects_minimum_spacing_and_containment() {
        let shape = StadiumShape::new(100.0, 40.0);
        let sizes = vec![4.0; 40];
        let mut rng = Rng::new(3);
        let points = generate(&shape, params(6.0), 40, &sizes, &mut rng);

        assert!(!points.is_empty());
        assert_spacing(&points, 6.0);
        for (p, s) in points.iter().zip(&sizes) {
            assert!(shape.contains(p.x, p.y, *s));
        }
    }

    #[test]
    fn mixed_sizes_are_checked_per_sample() {
        let shape = StadiumShape::new(100.0, 36.0);
        let sizes: Vec<f32> = (0..24).map(|i| if i % 3 == 0 { 8.0 } else { 3.0 }).collect();
        let mut rng = Rng::new(11);
        let points = generate(&shape, params(9.5), sizes.len(), &sizes, &mut rng);

        assert_spacing(&points, 9.5);
        for (p, s) in points.iter().zip(&sizes) {
            assert!(shape.contains(p.x, p.y, *s));
        }
    }

    #[test]
    fn overfull_request_returns_shorter_valid_list() {
        let shape = StadiumShape::new(40.0, 20.0);
        let sizes = vec![3.0; 500];
        let mut rng = Rng::new(8);
        let points = generate(&shape, params(5.0), 500, &sizes, &mut rng);

        assert!(!points.is_empty());
        assert!(points.len() < 500);
        assert_spacing(&points, 5.0);
    }

    #[test]
    fn nothing_fits_gives_empty_list() {
        let shape = StadiumShape::new(100.0, 10.0);
        let sizes = vec![8.0; 5];
        let mut rng = Rng::new(1);
        assert!(generate(&shape, params(10.0), 5, &sizes, &mut rng).is_empty());
    }

    #[test]
    fn degenerate_inputs_give_empty_list() {
        let shape = StadiumShape::new(100.0, 40.0);
        let mut rng = Rng::new(1);
        assert!(generate(&shape, params(5.0), 0, &[4.0], &mut rng).is_empty());
        assert!(generate(&shape, params(5.0), 3, &[], &mut rng).is_empty());
        assert!(generate(&shape, params(f32::NAN), 3, &[4.0; 3], &mut rng).is_empty());
        assert!(generate(&shape, params(0.0), 3, &[4.0; 3], &mut rng).is_empty());
    }

    #[test]
    fn never_exceeds_target() {
        let shape = StadiumShape::new(100.0, 40.0);
        let sizes = vec![2.0; 50];
        let mut rng = Rng::new(21);
        let points = generate(&shape, params(4.0), 7, &sizes, &mut rng);
        assert!(points.len() <= 7);
    }

    #[test]
    fn tiny_distance_is_floored_to_a_bounded_grid() {
        let shape = StadiumShape::new(100.0, 40.0);
        let sizes = vec![0.5; 400];
        let mut rng = Rng::new(5);
        let points = generate(&shape, params(1e-4), sizes.len(), &sizes, &mut rng);

        assert!(!points.is_empty());
        assert_spacing(&points, MIN_SAMPLE_DISTANCE - 1e-4);

        let grid = SampleGrid::new(100.0, 100.0, MIN_SAMPLE_DISTANCE);
        assert!(grid.cols <= 101 && grid.rows <= 101);
    }
}
