//! Broad-phase grid
//!
//! Fixed `N x N` partition of the 0..100 space, rebuilt every frame with a
//! counting sort into flat arrays (no per-cell allocations):
//! `cell_start[c]..cell_start[c + 1]` indexes `entries`, which holds
//! particle indices. Bucketing uses the centre of each particle's box.

use crate::core::Vec2;
use crate::domain::particle::Particle;

use super::boundary::SPACE_EXTENT;

pub struct SpatialGrid {
    requested_cells: u32,
    cells: u32,
    cell_size: f32,
    cell_start: Vec<u32>,
    cell_fill: Vec<u32>,
    entries: Vec<u32>,
}

impl SpatialGrid {
    pub fn new(cells: u32) -> Self {
        let cells = cells.clamp(1, 100);
        let mut grid = Self {
            requested_cells: cells,
            cells,
            cell_size: SPACE_EXTENT / cells as f32,
            cell_start: Vec::new(),
            cell_fill: Vec::new(),
            entries: Vec::new(),
        };
        grid.resize(cells);
        grid
    }

    fn resize(&mut self, cells: u32) {
        self.cells = cells;
        self.cell_size = SPACE_EXTENT / cells as f32;
        let total = (cells * cells) as usize;
        self.cell_start.clear();
        self.cell_start.resize(total + 1, 0);
        self.cell_fill.clear();
        self.cell_fill.resize(total, 0);
    }

    /// Cells per axis actually in use for the last rebuild
    #[inline]
    pub fn cells(&self) -> u32 {
        self.cells
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn cell_of(&self, p: Vec2) -> (u32, u32) {
        let max = (self.cells - 1) as f32;
        let cx = (p.x / self.cell_size).floor();
        let cy = (p.y / self.cell_size).floor();
        // NaN falls through `clamp` untouched; map it to cell 0
        let cx = if cx.is_finite() { cx.clamp(0.0, max) } else { 0.0 };
        let cy = if cy.is_finite() { cy.clamp(0.0, max) } else { 0.0 };
        (cx as u32, cy as u32)
    }

    #[inline]
    fn cell_index(&self, cx: u32, cy: u32) -> usize {
        (cy * self.cells + cx) as usize
    }

    /// Bucket every active particle of `batch`. The cell count is lowered
    /// when needed so a cell is never narrower than the widest particle,
    /// which keeps the 3x3 query exhaustive.
    pub fn rebuild(&mut self, batch: &[Particle]) {
        let max_size = batch
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.size)
            .fold(0.0f32, f32::max);
        let fit = if max_size > 0.0 {
            ((SPACE_EXTENT / max_size).floor() as u32).max(1)
        } else {
            self.requested_cells
        };
        let cells = self.requested_cells.min(fit);
        if cells != self.cells {
            self.resize(cells);
        }

        let total = (self.cells * self.cells) as usize;
        self.cell_fill.iter_mut().for_each(|c| *c = 0);

        // count
        for p in batch.iter().filter(|p| p.is_active) {
            let (cx, cy) = self.cell_of(p.center());
            let c = self.cell_index(cx, cy);
            self.cell_fill[c] += 1;
        }

        // prefix sums
        let mut running = 0u32;
        for c in 0..total {
            self.cell_start[c] = running;
            running += self.cell_fill[c];
            self.cell_fill[c] = 0;
        }
        self.cell_start[total] = running;

        // scatter
        self.entries.clear();
        self.entries.resize(running as usize, 0);
        for (i, p) in batch.iter().enumerate() {
            if !p.is_active {
                continue;
            }
            let (cx, cy) = self.cell_of(p.center());
            let c = self.cell_index(cx, cy);
            let slot = self.cell_start[c] + self.cell_fill[c];
            self.entries[slot as usize] = i as u32;
            self.cell_fill[c] += 1;
        }
    }

    /// Particle indices bucketed in the cell containing `point` and its 8
    /// neighbours. `out` is cleared first.
    pub fn neighbors(&self, point: Vec2, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.cell_of(point);
        let x0 = cx.saturating_sub(1);
        let y0 = cy.saturating_sub(1);
        let x1 = (cx + 1).min(self.cells - 1);
        let y1 = (cy + 1).min(self.cells - 1);

        for gy in y0..=y1 {
            for gx in x0..=x1 {
                let c = self.cell_index(gx, gy);
                let start = self.cell_start[c] as usize;
                let end = self.cell_start[c + 1] as usize;
                out.extend(self.entries[start..end].iter().map(|&i| i as usize));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rng;
    use crate::domain::host::HostId;
    use crate::domain::particle::{Particle, VisualVariant};

    fn particle_at(x: f32, y: f32, size: f32) -> Particle {
        let mut p = Particle::new(HostId::new(0, 0), Vec2::new(x, y), size, 0, VisualVariant::default());
        p.is_active = true;
        p
    }

    fn overlapping(a: &Particle, b: &Particle) -> bool {
        (a.center() - b.center()).length() < a.radius() + b.radius()
    }

    fn brute_force_pairs(batch: &[Particle]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..batch.len() {
            for j in (i + 1)..batch.len() {
                if batch[i].is_active && batch[j].is_active && overlapping(&batch[i], &batch[j]) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    fn grid_pairs(grid: &SpatialGrid, batch: &[Particle]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        let mut scratch = Vec::new();
        for i in 0..batch.len() {
            if !batch[i].is_active {
                continue;
            }
            grid.neighbors(batch[i].center(), &mut scratch);
            for &j in &scratch {
                if j > i && overlapping(&batch[i], &batch[j]) {
                    pairs.push((i, j));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    #[test]
    fn grid_pairs_match_brute_force() {
        let mut rng = Rng::new(77);
        for round in 0..20 {
            let batch: Vec<Particle> = (0..60)
                .map(|_| {
                    let size = [2.0, 4.0, 6.0, 8.0][rng.index(4)];
                    let mut p = particle_at(rng.range(0.0, 92.0), rng.range(0.0, 92.0), size);
                    p.is_active = rng.chance(0.9);
                    p
                })
                .collect();

            let mut grid = SpatialGrid::new(10);
            grid.rebuild(&batch);
            assert_eq!(grid_pairs(&grid, &batch), brute_force_pairs(&batch), "round {}", round);
        }
    }

    #[test]
    fn oversized_particles_shrink_the_grid() {
        let batch = vec![particle_at(10.0, 10.0, 25.0), particle_at(40.0, 10.0, 25.0)];
        let mut grid = SpatialGrid::new(10);
        grid.rebuild(&batch);
        assert_eq!(grid.cells(), 4);
        assert!(grid.cell_size() >= 25.0);
        assert_eq!(grid_pairs(&grid, &batch), brute_force_pairs(&batch));
    }

    #[test]
    fn inactive_particles_are_not_bucketed() {
        let mut batch = vec![particle_at(10.0, 10.0, 4.0), particle_at(11.0, 10.0, 4.0)];
        batch[1].is_active = false;
        let mut grid = SpatialGrid::new(10);
        grid.rebuild(&batch);
        assert_eq!(grid.len(), 1);

        let mut out = Vec::new();
        grid.neighbors(batch[0].center(), &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn neighbourhood_is_three_by_three() {
        let batch = vec![
            particle_at(15.0, 15.0, 2.0), // cell (1,1)
            particle_at(25.0, 25.0, 2.0), // cell (2,2)
            particle_at(45.0, 15.0, 2.0), // cell (4,1), outside
        ];
        let mut grid = SpatialGrid::new(10);
        grid.rebuild(&batch);

        let mut out = Vec::new();
        grid.neighbors(batch[0].center(), &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn out_of_range_points_clamp_to_edge_cells() {
        let grid = SpatialGrid::new(10);
        assert_eq!(grid.cell_of(Vec2::new(-5.0, 150.0)), (0, 9));
        assert_eq!(grid.cell_of(Vec2::new(f32::NAN, 50.0)), (0, 5));
    }
}
