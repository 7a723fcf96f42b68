//! Core engine for Eclipse, a binary-symbol logic puzzle on a square grid.
//!
//! Every cell holds a Sun, a Moon, or nothing. A completed grid must balance
//! the two symbols in every row and column, avoid runs of three, meet each
//! colored region's Sun quota, and satisfy the Equal/NotEqual relationship
//! clues between adjacent cells.
//!
//! The crate provides the data model ([`Grid`], [`RegionManager`],
//! [`Puzzle`]), the placement and whole-grid validity checks, a solver with
//! constraint propagation and MRV backtracking ([`Solver`]), and a seeded,
//! deterministic puzzle generator ([`Generator`]).
//!
//! The engine is single-threaded and performs no I/O; rendering, storage,
//! timing, and input handling belong to the embedding application. Nothing
//! here is internally synchronized, so a host must serialize access to any
//! given instance.

mod generator;
mod grid;
mod puzzle;
mod region;
mod rng;
mod solver;

pub use generator::{Difficulty, Generator, GeneratorConfig};
pub use grid::{Cell, Error, Grid, Position};
pub use puzzle::{CandidateSet, Clue, ClueKind, Puzzle};
pub use region::{Region, RegionManager};
pub use solver::{ForcedMove, Solver};
