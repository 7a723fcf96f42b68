//! Basic example of using the Eclipse puzzle engine

use eclipse_core::{Generator, GeneratorConfig, Grid, Solver};

fn main() {
    // Generate a puzzle from a fixed seed (swap in `with_random_seed()` for
    // a fresh one each run)
    println!("Generating a Medium difficulty 6x6 puzzle...\n");
    let config = GeneratorConfig {
        seed: 20240607,
        ..GeneratorConfig::default()
    };
    let mut generator = Generator::new(config);
    let puzzle = generator.generate().expect("valid configured size");

    println!("Generated puzzle:");
    println!("{}", puzzle.grid());

    // Show some stats
    println!("Empty cells: {}", puzzle.grid().empty_cells().len());
    println!("Regions: {}", puzzle.regions().regions().len());
    println!("Relationship clues: {}", puzzle.clues().len());
    println!(
        "Rough difficulty score: {}\n",
        generator.evaluate_difficulty(&puzzle)
    );

    // Ask for the forced moves a player could deduce right now
    let mut working = puzzle.clone();
    let solver = Solver::new(&mut working);
    let forced = solver.get_forced_moves();
    if let Some(hint) = forced.first() {
        println!("Hint: {}", hint.reason);
    } else {
        println!("No single-step deduction available - search required.");
    }

    // Solve it
    println!("\nSolving...\n");
    let mut working = puzzle.clone();
    if Solver::new(&mut working).solve() {
        println!("Solution:");
        println!("{}", working.grid());
    } else {
        println!("No solution found (this shouldn't happen for a generated puzzle!)");
    }

    // Check uniqueness
    let mut working = puzzle.clone();
    let solutions = Solver::new(&mut working).count_solutions(2);
    println!("Number of solutions (up to 2): {}", solutions);

    // Parse a grid from its compact string form
    println!("\n--- Parsing a grid from a string ---\n");
    let text = "SMMS.SMS.M..........SM.M.S.S....M.MS";
    match Grid::from_string(text) {
        Ok(grid) => {
            println!("Parsed grid:");
            println!("{}", grid);
            println!("Compact form: {}", grid.to_string_compact());
        }
        Err(err) => println!("Parse failed: {}", err),
    }
}
