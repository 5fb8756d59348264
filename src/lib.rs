//! Word-boggle solver: a prefix tree dictionary plus a grid search that walks
//! all eight directions without reusing a cell, with remove-and-drop rounds.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod grid;
pub mod solver;
pub mod utils;

pub use config::SolverConfig;
pub use dictionary::{Matcher, PrefixDictionary, WordMatch};
pub use error::{BoggleError, Result};
pub use grid::{Cell, Grid, Position};
pub use solver::{BoardSolver, FoundWord};
