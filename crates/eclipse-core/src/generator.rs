use crate::grid::{Cell, Error, Position};
use crate::puzzle::{Clue, ClueKind, Puzzle};
use crate::rng::{entropy_seed, SimpleRng};
use crate::solver::{backtrack, SearchOrder, Solver};
use serde::{Deserialize, Serialize};

/// Difficulty tier, used to scale the relationship-clue count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Ordinal tier: Easy = 0, Medium = 1, Hard = 2.
    pub fn tier(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn all_levels() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// Configuration for puzzle generation. Identical configurations reproduce
/// bit-identical puzzles; the seed is the single entropy input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Grid side length; must be even and at least 4.
    pub grid_size: usize,
    pub difficulty: Difficulty,
    pub num_regions: usize,
    /// Seed for the generator's random source. Externally derived (e.g.
    /// from a date); consumed here as an opaque 32-bit value.
    pub seed: u32,
    /// Stop removing cells once this many have been cleared.
    pub max_empty_cells: usize,
    pub use_relationship_clues: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_size: 6,
            difficulty: Difficulty::Medium,
            num_regions: 6,
            seed: 0,
            max_empty_cells: 16,
            use_relationship_clues: true,
        }
    }
}

impl GeneratorConfig {
    pub fn easy() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            max_empty_cells: 12,
            ..Self::default()
        }
    }

    pub fn medium() -> Self {
        Self::default()
    }

    pub fn hard() -> Self {
        Self {
            difficulty: Difficulty::Hard,
            max_empty_cells: 20,
            ..Self::default()
        }
    }

    /// Replace the seed with one drawn from OS entropy. The seed lands in
    /// the config, so the resulting puzzle stays reproducible afterward.
    pub fn with_random_seed(mut self) -> Self {
        self.seed = entropy_seed();
        self
    }
}

/// Uniform-random cell selection with a shuffled symbol order: the
/// generator's search policy. Exhaustive like the solver's, but trades
/// search efficiency for generation diversity.
struct RandomOrder<'r> {
    rng: &'r mut SimpleRng,
}

impl SearchOrder for RandomOrder<'_> {
    fn next_cell(&mut self, puzzle: &Puzzle) -> Option<Position> {
        let empty = puzzle.grid().empty_cells();
        if empty.is_empty() {
            return None;
        }
        Some(empty[self.rng.next_below(empty.len())])
    }

    fn value_order(&mut self) -> [Cell; 2] {
        let mut values = Cell::SYMBOLS;
        self.rng.shuffle(&mut values);
        values
    }
}

const MAX_ATTEMPTS: usize = 100;

/// Synthesizes puzzles: a solved grid by randomized backtracking, then
/// cell removal under a uniqueness guarantee, then optional relationship
/// clues. All randomness flows from one seeded source, so a configuration
/// fully determines the output.
pub struct Generator {
    config: GeneratorConfig,
    rng: SimpleRng,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = SimpleRng::with_seed(config.seed as u64);
        Self { config, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a puzzle. Errs only when the configured grid size is
    /// invalid; search-space exhaustion never escalates. After 100 failed
    /// attempts a half-revealed fallback puzzle is returned instead,
    /// trading the uniqueness guarantee for availability.
    pub fn generate(&mut self) -> Result<Puzzle, Error> {
        for _ in 0..MAX_ATTEMPTS {
            let mut solution = Puzzle::new(self.config.grid_size)?;
            let region_seed = self.rng.next_u32();
            solution
                .regions_mut()
                .generate_random_regions(self.config.num_regions, region_seed);

            // Some region layouts admit no valid grid at all; that just
            // burns the attempt.
            if !self.fill_grid(&mut solution) {
                continue;
            }

            let mut puzzle = Puzzle::new(self.config.grid_size)?;
            *puzzle.regions_mut() = solution.regions().clone();
            self.remove_cells(&solution, &mut puzzle);

            if self.config.use_relationship_clues {
                let target = 3 + 2 * self.config.difficulty.tier();
                self.add_relationship_clues(&mut puzzle, &solution, target);
            }

            if has_unique_solution(&puzzle) {
                return Ok(puzzle);
            }
        }

        self.fallback()
    }

    /// Rough difficulty score for a generated puzzle: empty cells times
    /// ten. The engine offers no finer ranking.
    pub fn evaluate_difficulty(&self, puzzle: &Puzzle) -> u32 {
        puzzle.grid().empty_cells().len() as u32 * 10
    }

    /// Produce a fully solved grid in place via the shared backtracking
    /// search with randomized cell and value order.
    fn fill_grid(&mut self, puzzle: &mut Puzzle) -> bool {
        let mut order = RandomOrder { rng: &mut self.rng };
        backtrack(puzzle, &mut order)
    }

    /// Starting from the full solution, clear cells in random order, keeping
    /// each clearance only if a disposable clone still has exactly one
    /// completion. Stops after `max_empty_cells` successful clearances.
    fn remove_cells(&mut self, solution: &Puzzle, puzzle: &mut Puzzle) {
        *puzzle.grid_mut() = solution.grid().clone();

        let size = self.config.grid_size;
        let mut positions: Vec<Position> = (0..size)
            .flat_map(|row| (0..size).map(move |col| Position::new(row, col)))
            .collect();
        self.rng.shuffle(&mut positions);

        let mut removed = 0;
        for pos in positions {
            if removed >= self.config.max_empty_cells {
                break;
            }

            let original = puzzle.grid().get(pos.row, pos.col);
            puzzle.grid_mut().set(pos.row, pos.col, Cell::Empty);

            if has_unique_solution(puzzle) {
                removed += 1;
            } else {
                puzzle.grid_mut().set(pos.row, pos.col, original);
            }
        }
    }

    /// Attach up to `target` relationship clues. Candidates are all
    /// orthogonally adjacent pairs in shuffled order; a pair qualifies while
    /// at least one side is still empty (fully filled pairs are redundant,
    /// both values being given already). The clue kind is inferred from the
    /// solution: Equal exactly when the solved values match.
    fn add_relationship_clues(&mut self, puzzle: &mut Puzzle, solution: &Puzzle, target: usize) {
        let size = self.config.grid_size;
        let mut candidates: Vec<(Position, Position)> = Vec::new();
        for row in 0..size {
            for col in 0..size {
                if col + 1 < size {
                    candidates.push((Position::new(row, col), Position::new(row, col + 1)));
                }
                if row + 1 < size {
                    candidates.push((Position::new(row, col), Position::new(row + 1, col)));
                }
            }
        }
        self.rng.shuffle(&mut candidates);

        let mut added = 0;
        for (a, b) in candidates {
            if added >= target {
                break;
            }

            let current_a = puzzle.grid().get(a.row, a.col);
            let current_b = puzzle.grid().get(b.row, b.col);
            if !current_a.is_empty() && !current_b.is_empty() {
                continue;
            }

            let solved_a = solution.grid().get(a.row, a.col);
            let solved_b = solution.grid().get(b.row, b.col);
            let kind = if solved_a == solved_b {
                ClueKind::Equal
            } else {
                ClueKind::NotEqual
            };

            puzzle.add_clue(Clue { a, b, kind });
            added += 1;
        }
    }

    /// Availability fallback: one more solved grid with a random half of its
    /// cells revealed as givens, returned without any uniqueness
    /// verification.
    fn fallback(&mut self) -> Result<Puzzle, Error> {
        let mut solution = Puzzle::new(self.config.grid_size)?;
        let region_seed = self.rng.next_u32();
        solution
            .regions_mut()
            .generate_random_regions(self.config.num_regions, region_seed);
        self.fill_grid(&mut solution);

        let mut simple = Puzzle::new(self.config.grid_size)?;
        *simple.regions_mut() = solution.regions().clone();

        let size = self.config.grid_size;
        let mut all_cells: Vec<Position> = (0..size)
            .flat_map(|row| (0..size).map(move |col| Position::new(row, col)))
            .collect();
        self.rng.shuffle(&mut all_cells);

        let cells_to_fill = size * size / 2;
        for pos in all_cells.into_iter().take(cells_to_fill) {
            let value = solution.grid().get(pos.row, pos.col);
            simple.grid_mut().set(pos.row, pos.col, value);
        }

        Ok(simple)
    }
}

fn has_unique_solution(puzzle: &Puzzle) -> bool {
    let mut trial = puzzle.clone();
    Solver::new(&mut trial).count_solutions(2) == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u32) -> GeneratorConfig {
        GeneratorConfig {
            seed,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn generates_a_puzzle_of_configured_size() {
        let mut generator = Generator::new(config(42));
        let puzzle = generator.generate().unwrap();
        assert_eq!(puzzle.size(), 6);
        assert!(!puzzle.regions().regions().is_empty());
    }

    #[test]
    fn generated_puzzle_is_solvable() {
        let mut generator = Generator::new(config(42));
        let puzzle = generator.generate().unwrap();

        let mut working = puzzle.clone();
        assert!(Solver::new(&mut working).solve());
        assert!(working.is_valid());
    }

    #[test]
    fn generated_puzzle_has_at_least_one_solution() {
        let mut generator = Generator::new(config(12345));
        let puzzle = generator.generate().unwrap();

        // Exactly one unless the availability fallback fired.
        let mut trial = puzzle.clone();
        assert!(Solver::new(&mut trial).count_solutions(2) >= 1);
    }

    #[test]
    fn generation_is_deterministic() {
        let mut a = Generator::new(config(777));
        let mut b = Generator::new(config(777));
        assert_eq!(a.generate().unwrap(), b.generate().unwrap());
    }

    #[test]
    fn different_seeds_give_different_puzzles() {
        let mut a = Generator::new(config(1));
        let mut b = Generator::new(config(2));
        assert_ne!(a.generate().unwrap(), b.generate().unwrap());
    }

    #[test]
    fn zero_removals_returns_the_full_solution() {
        let mut generator = Generator::new(GeneratorConfig {
            seed: 9,
            max_empty_cells: 0,
            ..GeneratorConfig::default()
        });
        let puzzle = generator.generate().unwrap();

        assert!(puzzle.grid().is_complete());
        assert!(puzzle.is_valid());
        assert!(puzzle.clues().is_empty());
        let mut trial = puzzle.clone();
        assert_eq!(Solver::new(&mut trial).count_solutions(2), 1);
    }

    #[test]
    fn respects_max_empty_cells() {
        let mut generator = Generator::new(GeneratorConfig {
            seed: 31,
            max_empty_cells: 6,
            use_relationship_clues: false,
            ..GeneratorConfig::default()
        });
        let puzzle = generator.generate().unwrap();
        // Holds for the normal path; the fallback reveals exactly half.
        let empties = puzzle.grid().empty_cells().len();
        assert!(empties <= 6 || empties == 18);
    }

    #[test]
    fn clues_are_consistent_with_some_solution() {
        let mut generator = Generator::new(config(2024));
        let puzzle = generator.generate().unwrap();

        let mut solved = puzzle.clone();
        if !Solver::new(&mut solved).solve() {
            return; // fallback puzzles carry no clues anyway
        }
        for clue in puzzle.clues() {
            let va = solved.grid().get(clue.a.row, clue.a.col);
            let vb = solved.grid().get(clue.b.row, clue.b.col);
            match clue.kind {
                ClueKind::Equal => assert_eq!(va, vb),
                ClueKind::NotEqual => assert_ne!(va, vb),
            }
        }
    }

    #[test]
    fn eight_by_eight_generation() {
        let mut generator = Generator::new(GeneratorConfig {
            seed: 300,
            grid_size: 8,
            num_regions: 8,
            difficulty: Difficulty::Hard,
            ..GeneratorConfig::default()
        });
        let puzzle = generator.generate().unwrap();
        assert_eq!(puzzle.size(), 8);
    }

    #[test]
    fn invalid_grid_size_is_rejected() {
        let mut generator = Generator::new(GeneratorConfig {
            grid_size: 5,
            ..GeneratorConfig::default()
        });
        assert!(generator.generate().is_err());
    }

    #[test]
    fn difficulty_score_tracks_empty_cells() {
        let generator = Generator::new(config(0));
        let mut puzzle = Puzzle::new(6).unwrap();
        assert_eq!(generator.evaluate_difficulty(&puzzle), 360);
        puzzle.grid_mut().set(0, 0, Cell::Sun);
        assert_eq!(generator.evaluate_difficulty(&puzzle), 350);
    }

    #[test]
    fn difficulty_tiers_scale_clue_targets() {
        assert_eq!(Difficulty::Easy.tier(), 0);
        assert_eq!(Difficulty::Medium.tier(), 1);
        assert_eq!(Difficulty::Hard.tier(), 2);
        assert!(Difficulty::Easy < Difficulty::Hard);
    }

    #[test]
    fn preset_configs_differ_in_removals() {
        assert!(GeneratorConfig::easy().max_empty_cells < GeneratorConfig::hard().max_empty_cells);
        assert_eq!(GeneratorConfig::medium(), GeneratorConfig::default());
    }
}
