use crate::grid::Position;
use crate::rng::SimpleRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A connected group of cells carrying a required-Sun quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: usize,
    /// Display color, packed 0xRRGGBB.
    pub color: u32,
    pub cells: Vec<Position>,
    /// Number of Suns this region must contain, `cells.len() / 2` once the
    /// region is finalized. Odd-sized regions floor the quota.
    pub required_suns: usize,
}

impl Region {
    pub fn new(id: usize, color: u32) -> Self {
        Self {
            id,
            color,
            cells: Vec::new(),
            required_suns: 0,
        }
    }
}

/// Owns the region list plus a flat cell-to-region lookup table.
///
/// The lookup table is the source of truth for membership queries and must
/// stay in sync with every region's cell list; all lookups go one direction
/// (position to id, id to metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionManager {
    grid_size: usize,
    regions: Vec<Region>,
    cell_to_region: Vec<Option<usize>>,
}

impl RegionManager {
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            regions: Vec::new(),
            cell_to_region: vec![None; grid_size * grid_size],
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.grid_size + col
    }

    /// Partition the grid into `num_regions` organic connected regions.
    ///
    /// Deterministic for a given `(grid_size, num_regions, seed)`: seed cells
    /// are placed at random (up to 100 attempts each), then all regions grow
    /// in parallel by multi-source BFS, each step expanding one randomly
    /// chosen region by one frontier cell with its unclaimed neighbors
    /// examined in shuffled order. Region sizes come out uneven; quotas are
    /// derived from the final sizes afterward.
    pub fn generate_random_regions(&mut self, num_regions: usize, seed: u32) {
        self.clear();

        let mut rng = SimpleRng::with_seed(seed as u64);
        let colors = palette(num_regions);

        // Place one seed cell per region, skipping already-claimed cells.
        // Ids are handed out in placement order so `regions[id].id == id`
        // holds even if a placement runs out of attempts.
        let mut queues: Vec<VecDeque<Position>> = Vec::new();
        for _ in 0..num_regions {
            let mut attempts = 0;
            while attempts < 100 {
                attempts += 1;
                let row = rng.next_below(self.grid_size);
                let col = rng.next_below(self.grid_size);
                let idx = self.index(row, col);
                if self.cell_to_region[idx].is_none() {
                    let id = self.regions.len();
                    let seed_pos = Position::new(row, col);
                    let mut region = Region::new(id, colors[id]);
                    region.cells.push(seed_pos);
                    self.cell_to_region[idx] = Some(id);
                    self.regions.push(region);
                    queues.push(VecDeque::from([seed_pos]));
                    break;
                }
            }
        }

        // Grow all regions together until every frontier queue drains.
        loop {
            let active: Vec<usize> = (0..queues.len())
                .filter(|&i| !queues[i].is_empty())
                .collect();
            if active.is_empty() {
                break;
            }

            let region_id = active[rng.next_below(active.len())];
            let Some(current) = queues[region_id].pop_front() else {
                continue;
            };

            let mut neighbors = orthogonal_candidates(current, self.grid_size);
            rng.shuffle(&mut neighbors);

            for neighbor in neighbors {
                let idx = self.index(neighbor.row, neighbor.col);
                if self.cell_to_region[idx].is_none() {
                    self.cell_to_region[idx] = Some(region_id);
                    self.regions[region_id].cells.push(neighbor);
                    queues[region_id].push_back(neighbor);
                }
            }
        }

        for region in &mut self.regions {
            region.required_suns = region.cells.len() / 2;
        }
    }

    /// Insert a pre-built region, updating the lookup table for its cells.
    pub fn add_region(&mut self, region: Region) {
        for pos in &region.cells {
            let idx = self.index(pos.row, pos.col);
            self.cell_to_region[idx] = Some(region.id);
        }
        self.regions.push(region);
    }

    /// Region id for a cell; `None` for unassigned or out-of-range
    /// coordinates.
    pub fn region_id_at(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.grid_size || col >= self.grid_size {
            return None;
        }
        self.cell_to_region[self.index(row, col)]
    }

    pub fn region(&self, region_id: usize) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == region_id)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.cell_to_region.fill(None);
    }

    /// True only when every cell resolved to a region. Growth can stall on a
    /// fragmented grid, so callers must tolerate `false`.
    pub fn is_complete(&self) -> bool {
        self.cell_to_region.iter().all(|entry| entry.is_some())
    }
}

fn orthogonal_candidates(pos: Position, grid_size: usize) -> Vec<Position> {
    let mut out = Vec::with_capacity(4);
    if pos.row > 0 {
        out.push(Position::new(pos.row - 1, pos.col));
    }
    if pos.row + 1 < grid_size {
        out.push(Position::new(pos.row + 1, pos.col));
    }
    if pos.col > 0 {
        out.push(Position::new(pos.row, pos.col - 1));
    }
    if pos.col + 1 < grid_size {
        out.push(Position::new(pos.row, pos.col + 1));
    }
    out
}

/// Evenly hue-spaced display colors (HSV with S = 0.6, V = 0.9).
fn palette(count: usize) -> Vec<u32> {
    let mut colors = Vec::with_capacity(count);
    for i in 0..count {
        let hue = i as f32 * 360.0 / count.max(1) as f32;
        let s = 0.6f32;
        let v = 0.9f32;
        let c = v * s;
        let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = if hue < 60.0 {
            (c, x, 0.0)
        } else if hue < 120.0 {
            (x, c, 0.0)
        } else if hue < 180.0 {
            (0.0, c, x)
        } else if hue < 240.0 {
            (0.0, x, c)
        } else if hue < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        let ri = ((r + m) * 255.0) as u32;
        let gi = ((g + m) * 255.0) as u32;
        let bi = ((b + m) * 255.0) as u32;
        colors.push((ri << 16) | (gi << 8) | bi);
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_regions() {
        let mut regions = RegionManager::new(6);
        regions.generate_random_regions(6, 42);
        assert_eq!(regions.regions().len(), 6);
        assert!(regions.is_complete());
    }

    #[test]
    fn all_cells_assigned() {
        let mut regions = RegionManager::new(6);
        regions.generate_random_regions(6, 123);

        let assigned = (0..6)
            .flat_map(|r| (0..6).map(move |c| (r, c)))
            .filter(|&(r, c)| regions.region_id_at(r, c).is_some())
            .count();
        assert_eq!(assigned, 36);
    }

    #[test]
    fn lookup_table_matches_cell_lists() {
        let mut regions = RegionManager::new(8);
        regions.generate_random_regions(8, 7);

        let mut covered = 0;
        for region in regions.regions() {
            for pos in &region.cells {
                assert_eq!(regions.region_id_at(pos.row, pos.col), Some(region.id));
                covered += 1;
            }
        }
        assert_eq!(covered, 64);
    }

    #[test]
    fn quotas_floor_region_size() {
        let mut regions = RegionManager::new(6);
        regions.generate_random_regions(5, 2024);
        for region in regions.regions() {
            assert_eq!(region.required_suns, region.cells.len() / 2);
        }
    }

    #[test]
    fn growth_is_deterministic() {
        let mut a = RegionManager::new(6);
        let mut b = RegionManager::new(6);
        a.generate_random_regions(6, 555);
        b.generate_random_regions(6, 555);
        assert_eq!(a, b);
    }

    #[test]
    fn regions_are_connected() {
        let mut regions = RegionManager::new(6);
        regions.generate_random_regions(4, 31);

        for region in regions.regions() {
            // Flood from the first cell, walking only region members.
            let mut seen = vec![region.cells[0]];
            let mut frontier = vec![region.cells[0]];
            while let Some(pos) = frontier.pop() {
                for next in orthogonal_candidates(pos, 6) {
                    if region.cells.contains(&next) && !seen.contains(&next) {
                        seen.push(next);
                        frontier.push(next);
                    }
                }
            }
            assert_eq!(seen.len(), region.cells.len());
        }
    }

    #[test]
    fn add_region_updates_lookup() {
        let mut regions = RegionManager::new(6);
        let mut region = Region::new(0, 0xff0000);
        region.cells = vec![Position::new(0, 0), Position::new(0, 1)];
        region.required_suns = 1;
        regions.add_region(region);

        assert_eq!(regions.region_id_at(0, 0), Some(0));
        assert_eq!(regions.region_id_at(0, 1), Some(0));
        assert_eq!(regions.region_id_at(1, 0), None);
        assert!(!regions.is_complete());
    }

    #[test]
    fn region_id_at_out_of_range_is_none() {
        let regions = RegionManager::new(6);
        assert_eq!(regions.region_id_at(6, 0), None);
        assert_eq!(regions.region_id_at(0, 99), None);
    }

    #[test]
    fn palette_colors_are_distinct() {
        let colors = palette(8);
        for i in 0..colors.len() {
            for j in i + 1..colors.len() {
                assert_ne!(colors[i], colors[j]);
            }
        }
    }
}
