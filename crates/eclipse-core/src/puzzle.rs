use crate::grid::{Cell, Error, Grid, Position};
use crate::region::RegionManager;
use serde::{Deserialize, Serialize};

/// Relationship between two adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClueKind {
    /// The two cells hold the same symbol.
    Equal,
    /// The two cells hold different symbols.
    NotEqual,
}

/// A relationship clue tying two orthogonally adjacent cells together.
/// The pair is unordered; lookups test both orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub a: Position,
    pub b: Position,
    pub kind: ClueKind,
}

/// The set of values a cell may legally take, over the three cell states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CandidateSet(u8);

impl CandidateSet {
    fn bit(cell: Cell) -> u8 {
        match cell {
            Cell::Empty => 1,
            Cell::Sun => 2,
            Cell::Moon => 4,
        }
    }

    fn insert(&mut self, cell: Cell) {
        self.0 |= Self::bit(cell);
    }

    pub fn contains(self, cell: Cell) -> bool {
        self.0 & Self::bit(cell) != 0
    }

    /// Number of placeable symbols in the set (`Empty` is not counted).
    pub fn symbol_count(self) -> usize {
        Cell::SYMBOLS
            .iter()
            .filter(|&&cell| self.contains(cell))
            .count()
    }

    /// The single placeable symbol, if exactly one remains.
    pub fn sole_symbol(self) -> Option<Cell> {
        let mut found = None;
        for &cell in &Cell::SYMBOLS {
            if self.contains(cell) {
                if found.is_some() {
                    return None;
                }
                found = Some(cell);
            }
        }
        found
    }
}

/// A puzzle instance: one grid, its region partition, and the relationship
/// clues. This is the unit of solving and generation; "what-if" exploration
/// always acts on a clone, never on a shared instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    grid: Grid,
    regions: RegionManager,
    clues: Vec<Clue>,
}

impl Puzzle {
    /// Create an empty puzzle. Grid and region manager are sized together;
    /// fails for odd sizes or sizes below 4.
    pub fn new(size: usize) -> Result<Self, Error> {
        let grid = Grid::new(size)?;
        let regions = RegionManager::new(size);
        Ok(Self {
            grid,
            regions,
            clues: Vec::new(),
        })
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn regions(&self) -> &RegionManager {
        &self.regions
    }

    pub fn regions_mut(&mut self) -> &mut RegionManager {
        &mut self.regions
    }

    pub fn add_clue(&mut self, clue: Clue) {
        self.clues.push(clue);
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    /// The clue between two positions, if any. Linear scan over the flat
    /// clue list, tested against both orderings.
    pub fn clue_between(&self, a: Position, b: Position) -> Option<ClueKind> {
        self.clues
            .iter()
            .find(|clue| (clue.a == a && clue.b == b) || (clue.a == b && clue.b == a))
            .map(|clue| clue.kind)
    }

    /// Would placing `value` at `(row, col)` be legal?
    ///
    /// Evaluates hypothetically against the current grid, which should still
    /// be empty at the target cell; placing `Empty` is always allowed.
    pub fn is_valid_placement(&self, row: usize, col: usize, value: Cell) -> bool {
        self.placement_allowed(&self.grid, row, col, value)
    }

    /// Is the whole grid legal?
    ///
    /// Re-derives validity from scratch: each filled cell is cleared,
    /// re-checked as a fresh placement, and restored. Quadratic in cell
    /// count, fine at the supported sizes, and only called at completion
    /// boundaries.
    pub fn is_valid(&self) -> bool {
        let mut working = self.grid.clone();
        for row in 0..self.grid.size() {
            for col in 0..self.grid.size() {
                let value = working.get(row, col);
                if value.is_empty() {
                    continue;
                }
                working.set(row, col, Cell::Empty);
                let ok = self.placement_allowed(&working, row, col, value);
                working.set(row, col, value);
                if !ok {
                    return false;
                }
            }
        }
        true
    }

    /// The set of values legally placeable at a cell. Always contains
    /// `Empty`; a filled cell contributes only its current value.
    pub fn get_possible_values(&self, row: usize, col: usize) -> CandidateSet {
        let mut possible = CandidateSet::default();
        possible.insert(Cell::Empty);

        if !self.grid.is_empty_at(row, col) {
            possible.insert(self.grid.get(row, col));
            return possible;
        }

        for &value in &Cell::SYMBOLS {
            if self.is_valid_placement(row, col, value) {
                possible.insert(value);
            }
        }
        possible
    }

    // The four placement rules, each evaluated against the grid passed in so
    // `is_valid` can run them on its clear-then-restore working copy.

    fn placement_allowed(&self, grid: &Grid, row: usize, col: usize, value: Cell) -> bool {
        if value.is_empty() {
            return true;
        }
        self.check_row_col_count(grid, row, col, value)
            && self.check_no_three_adjacent(grid, row, col, value)
            && self.check_region_quota(grid, row, col, value)
            && self.check_relationship_clues(grid, row, col, value)
    }

    /// A complete row or column holds exactly `size / 2` of each symbol, so
    /// the count excluding the target cell must stay below that.
    fn check_row_col_count(&self, grid: &Grid, row: usize, col: usize, value: Cell) -> bool {
        let size = grid.size();
        let half = size / 2;

        let row_count = (0..size)
            .filter(|&c| c != col && grid.get(row, c) == value)
            .count();
        if row_count >= half {
            return false;
        }

        let col_count = (0..size)
            .filter(|&r| r != row && grid.get(r, col) == value)
            .count();
        col_count < half
    }

    /// No run of three identical symbols through the target cell: two-before,
    /// two-after, and straddling windows on each axis.
    fn check_no_three_adjacent(&self, grid: &Grid, row: usize, col: usize, value: Cell) -> bool {
        let size = grid.size();

        if col >= 2 && grid.get(row, col - 1) == value && grid.get(row, col - 2) == value {
            return false;
        }
        if col + 2 < size && grid.get(row, col + 1) == value && grid.get(row, col + 2) == value {
            return false;
        }
        if col >= 1
            && col + 1 < size
            && grid.get(row, col - 1) == value
            && grid.get(row, col + 1) == value
        {
            return false;
        }

        if row >= 2 && grid.get(row - 1, col) == value && grid.get(row - 2, col) == value {
            return false;
        }
        if row + 2 < size && grid.get(row + 1, col) == value && grid.get(row + 2, col) == value {
            return false;
        }
        if row >= 1
            && row + 1 < size
            && grid.get(row - 1, col) == value
            && grid.get(row + 1, col) == value
        {
            return false;
        }

        true
    }

    /// Region quota: a Sun must not overshoot `required_suns`, and a Moon
    /// must leave room for the Suns still owed. The empty-cell count here
    /// includes the target cell itself (the check runs with it still empty),
    /// hence the `- 1` when a Moon claims it.
    fn check_region_quota(&self, grid: &Grid, row: usize, col: usize, value: Cell) -> bool {
        let Some(region_id) = self.regions.region_id_at(row, col) else {
            return true;
        };
        let Some(region) = self.regions.region(region_id) else {
            return true;
        };

        let sun_count = region
            .cells
            .iter()
            .filter(|pos| !(pos.row == row && pos.col == col))
            .filter(|pos| grid.get(pos.row, pos.col) == Cell::Sun)
            .count();

        if value == Cell::Sun && sun_count >= region.required_suns {
            return false;
        }

        if value == Cell::Moon {
            let empty_count = region
                .cells
                .iter()
                .filter(|pos| grid.get(pos.row, pos.col).is_empty())
                .count();
            let remaining_suns = region.required_suns.saturating_sub(sun_count);
            if remaining_suns > empty_count.saturating_sub(1) {
                return false;
            }
        }

        true
    }

    /// Clues against filled orthogonal neighbors; an empty neighbor imposes
    /// no constraint yet.
    fn check_relationship_clues(&self, grid: &Grid, row: usize, col: usize, value: Cell) -> bool {
        let current = Position::new(row, col);
        for neighbor in grid.orthogonal_neighbors(current) {
            let Some(kind) = self.clue_between(current, neighbor) else {
                continue;
            };
            let neighbor_value = grid.get(neighbor.row, neighbor.col);
            if neighbor_value.is_empty() {
                continue;
            }
            match kind {
                ClueKind::Equal if value != neighbor_value => return false,
                ClueKind::NotEqual if value == neighbor_value => return false,
                _ => {}
            }
        }
        true
    }
}
