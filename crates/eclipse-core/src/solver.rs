use crate::grid::{Cell, Position};
use crate::puzzle::Puzzle;
use serde::{Deserialize, Serialize};

/// A cell with exactly one legal symbol left, paired with that symbol.
/// This is the payload the hint system surfaces to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedMove {
    pub pos: Position,
    pub value: Cell,
    /// Human-readable explanation of why the move is forced.
    pub reason: String,
}

/// Ordering policy for the backtracking search: which empty cell to branch
/// on next, and in which order to try the two symbols. The solver plugs in
/// MRV with a fixed symbol order; the generator plugs in uniform-random cell
/// choice with a shuffled order.
pub(crate) trait SearchOrder {
    /// The next cell to branch on, or `None` when the search should fail at
    /// this node (dead end, or nothing sensible to pick).
    fn next_cell(&mut self, puzzle: &Puzzle) -> Option<Position>;

    /// The order in which to try the two symbols at the chosen cell.
    fn value_order(&mut self) -> [Cell; 2];
}

/// MRV cell selection with the fixed Sun-then-Moon value order.
pub(crate) struct MrvOrder;

impl SearchOrder for MrvOrder {
    fn next_cell(&mut self, puzzle: &Puzzle) -> Option<Position> {
        find_best_cell(puzzle)
    }

    fn value_order(&mut self) -> [Cell; 2] {
        Cell::SYMBOLS
    }
}

/// Depth-first backtracking over empty cells, shared by the solver and the
/// generator's randomized grid fill. Tries each symbol the placement rules
/// allow, recursing after a tentative placement and resetting the cell to
/// empty on failure. Terminal success is a complete grid that re-validates.
pub(crate) fn backtrack<O: SearchOrder>(puzzle: &mut Puzzle, order: &mut O) -> bool {
    if puzzle.grid().is_complete() {
        return puzzle.is_valid();
    }

    let Some(pos) = order.next_cell(puzzle) else {
        return false;
    };

    for value in order.value_order() {
        if puzzle.is_valid_placement(pos.row, pos.col, value) {
            puzzle.grid_mut().set(pos.row, pos.col, value);
            if backtrack(puzzle, order) {
                return true;
            }
            puzzle.grid_mut().set(pos.row, pos.col, Cell::Empty);
        }
    }

    false
}

/// The empty cell with the fewest legal symbols (minimum remaining values),
/// first-found on ties. Returns `None` if some empty cell has no legal
/// symbol at all, so callers fail fast instead of searching a dead branch.
/// A single-candidate cell is returned immediately; it cannot be beaten.
pub(crate) fn find_best_cell(puzzle: &Puzzle) -> Option<Position> {
    let mut best = None;
    let mut min_choices = usize::MAX;

    for row in 0..puzzle.size() {
        for col in 0..puzzle.size() {
            if !puzzle.grid().is_empty_at(row, col) {
                continue;
            }
            let count = puzzle.get_possible_values(row, col).symbol_count();
            if count == 0 {
                return None;
            }
            if count < min_choices {
                min_choices = count;
                best = Some(Position::new(row, col));
                if count == 1 {
                    return best;
                }
            }
        }
    }

    best
}

/// Solves a [`Puzzle`] in place: fixpoint propagation, then MRV
/// backtracking. Also answers bounded solution-count and forced-move
/// queries for uniqueness checking and hints.
///
/// Absence of a solution is a normal outcome (`false`/`0`/empty), never an
/// error. The solver mutates the borrowed puzzle; callers wanting to keep
/// the original intact hand it a clone.
pub struct Solver<'a> {
    puzzle: &'a mut Puzzle,
}

impl<'a> Solver<'a> {
    pub fn new(puzzle: &'a mut Puzzle) -> Self {
        Self { puzzle }
    }

    /// Solve the puzzle. On success the grid is complete and valid; on
    /// failure the grid is left as propagation shaped it.
    pub fn solve(&mut self) -> bool {
        self.propagate();
        backtrack(self.puzzle, &mut MrvOrder)
    }

    /// Count completions of the current grid, stopping once `max_count` is
    /// reached. `max_count = 2` distinguishes 0 / exactly 1 / 2-or-more
    /// without paying for full enumeration. The grid is unchanged on return.
    pub fn count_solutions(&mut self, max_count: usize) -> usize {
        let mut count = 0;
        self.count_recursive(&mut count, max_count);
        count
    }

    fn count_recursive(&mut self, count: &mut usize, max_count: usize) {
        if *count >= max_count {
            return;
        }

        if self.puzzle.grid().is_complete() {
            if self.puzzle.is_valid() {
                *count += 1;
            }
            return;
        }

        let Some(pos) = find_best_cell(self.puzzle) else {
            return;
        };
        let possible = self.puzzle.get_possible_values(pos.row, pos.col);

        for value in Cell::SYMBOLS {
            if !possible.contains(value) {
                continue;
            }
            self.puzzle.grid_mut().set(pos.row, pos.col, value);
            self.count_recursive(count, max_count);
            self.puzzle.grid_mut().set(pos.row, pos.col, Cell::Empty);

            if *count >= max_count {
                return;
            }
        }
    }

    /// Every naked single on the board right now: one non-mutating scan, no
    /// cascading. Applying one move may force others that this call does not
    /// report; it represents a single deduction step, not the fixpoint.
    pub fn get_forced_moves(&self) -> Vec<ForcedMove> {
        let mut forced = Vec::new();
        for row in 0..self.puzzle.size() {
            for col in 0..self.puzzle.size() {
                if !self.puzzle.grid().is_empty_at(row, col) {
                    continue;
                }
                let possible = self.puzzle.get_possible_values(row, col);
                if let Some(value) = possible.sole_symbol() {
                    forced.push(ForcedMove {
                        pos: Position::new(row, col),
                        value,
                        reason: format!(
                            "Cell ({}, {}) can only be {} - it's the only symbol left.",
                            row + 1,
                            col + 1,
                            value
                        ),
                    });
                }
            }
        }
        forced
    }

    /// Fill every cell with exactly one legal symbol, rescanning in
    /// row-major order until a full pass makes no change. Fills made early
    /// in a pass affect cells later in the same pass. Returns whether any
    /// cell was filled at all.
    pub fn propagate(&mut self) -> bool {
        let mut any_progress = false;
        let mut progress = true;

        while progress {
            progress = false;
            for row in 0..self.puzzle.size() {
                for col in 0..self.puzzle.size() {
                    if self.propagate_cell(row, col) {
                        progress = true;
                        any_progress = true;
                    }
                }
            }
        }

        any_progress
    }

    fn propagate_cell(&mut self, row: usize, col: usize) -> bool {
        if !self.puzzle.grid().is_empty_at(row, col) {
            return false;
        }
        let possible = self.puzzle.get_possible_values(row, col);
        if let Some(value) = possible.sole_symbol() {
            self.puzzle.grid_mut().set(row, col, value);
            return true;
        }
        false
    }

    /// Cheap dead-end detector: false as soon as any empty cell has no
    /// legal symbol. Necessary but not sufficient for solvability; no
    /// search is performed.
    pub fn is_solvable(&self) -> bool {
        for row in 0..self.puzzle.size() {
            for col in 0..self.puzzle.size() {
                if !self.puzzle.grid().is_empty_at(row, col) {
                    continue;
                }
                if self.puzzle.get_possible_values(row, col).symbol_count() == 0 {
                    return false;
                }
            }
        }
        true
    }
}
