use std::collections::HashSet;

use log::{debug, trace};
use rayon::prelude::*;

use crate::config::SolverConfig;
use crate::dictionary::{Matcher, WordMatch};
use crate::error::Result;
use crate::grid::{Grid, Position};

/// A word and the cells that spell it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundWord {
    pub word: String,
    pub path: Vec<Position>,
}

/// Working state of one depth first search from a single start cell
struct PathSearch<'g> {
    grid: &'g Grid,
    path: Vec<Position>,
    letters: Vec<char>,
    /// Row-major flags for cells already on `path`
    visited: Vec<bool>,
}

impl<'g> PathSearch<'g> {
    fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            path: Vec::new(),
            letters: Vec::new(),
            visited: vec![false; grid.width() * grid.height()],
        }
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.grid.width() + pos.col
    }

    fn push(&mut self, pos: Position, letter: char) {
        let idx = self.index(pos);
        self.visited[idx] = true;
        self.path.push(pos);
        self.letters.push(letter);
    }

    fn pop(&mut self) {
        if let Some(pos) = self.path.pop() {
            let idx = self.index(pos);
            self.visited[idx] = false;
            self.letters.pop();
        }
    }
}

/// Searches a grid for dictionary words along chains of adjacent cells
pub struct BoardSolver<'d, M: Matcher + ?Sized> {
    grid: Grid,
    matcher: &'d M,
    config: SolverConfig,
}

impl<'d, M: Matcher + ?Sized> BoardSolver<'d, M> {
    pub fn new(grid: Grid, matcher: &'d M) -> Self {
        Self::with_config(grid, matcher, SolverConfig::default())
    }

    pub fn with_config(grid: Grid, matcher: &'d M, config: SolverConfig) -> Self {
        Self {
            grid,
            matcher,
            config,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Words in discovery order: start cells row-major, then neighbours in fixed offset order
    pub fn solve(&self) -> Vec<String> {
        self.find_paths().into_iter().map(|f| f.word).collect()
    }

    /// Like [`BoardSolver::solve`] but keeps the path that spelled each word
    pub fn find_paths(&self) -> Vec<FoundWord> {
        let mut found = Vec::new();
        for start in self.grid.positions() {
            self.search_from(start, &mut |f: FoundWord| {
                found.push(f);
                true
            });
        }
        debug!("Found {} words on a {}x{} grid", found.len(), self.grid.width(), self.grid.height());
        self.finish(found)
    }

    /// First word in discovery order, without searching the rest of the grid
    pub fn first_word(&self) -> Option<FoundWord> {
        let mut first = None;
        for start in self.grid.positions() {
            self.search_from(start, &mut |f: FoundWord| {
                first = Some(f);
                false
            });
            if first.is_some() {
                break;
            }
        }
        first
    }

    /// Returns a solver over a copy of the grid with the path's cells emptied
    pub fn remove_path(&self, path: &[Position]) -> Result<Self> {
        Ok(self.with_grid(self.grid.remove_path(path)?))
    }

    /// Returns a solver over a copy of the grid with letters dropped to the bottom of each column
    pub fn compact_columns(&self) -> Self {
        self.with_grid(self.grid.compact_columns())
    }

    /// Repeatedly takes the first word found, removes it and lets the letters fall,
    /// until no word remains or `max_rounds` is reached
    pub fn solve_rounds(&self) -> Result<Vec<FoundWord>> {
        let mut words = Vec::new();
        let mut grid = self.grid.clone();
        for round in 0..self.config.max_rounds {
            let solver = self.with_grid(grid);
            let found = match solver.first_word() {
                Some(f) => f,
                None => {
                    debug!("No words left after {} rounds", round);
                    break;
                }
            };
            debug!("Round {}: removing {} at {:?}", round + 1, found.word, found.path);
            grid = solver.grid.remove_path(&found.path)?.compact_columns();
            words.push(found);
        }
        Ok(words)
    }

    fn with_grid(&self, grid: Grid) -> Self {
        Self {
            grid,
            matcher: self.matcher,
            config: self.config.clone(),
        }
    }

    /// Runs the search rooted at `start`, handing each word to `visit`.
    /// Returns false once `visit` has asked to stop.
    fn search_from<F>(&self, start: Position, visit: &mut F) -> bool
    where
        F: FnMut(FoundWord) -> bool,
    {
        let letter = match self.grid.get(start).and_then(|c| c.letter()) {
            Some(l) => l,
            None => return true,
        };
        let mut search = PathSearch::new(&self.grid);
        search.push(start, letter);
        self.extend(&mut search, visit)
    }

    fn extend<F>(&self, search: &mut PathSearch, visit: &mut F) -> bool
    where
        F: FnMut(FoundWord) -> bool,
    {
        let state = self.matcher.match_sequence(&search.letters);
        if state == WordMatch::CompleteWord {
            let found = FoundWord {
                word: search.letters.iter().collect(),
                path: search.path.clone(),
            };
            if !visit(found) {
                return false;
            }
            if !self.config.extend_past_words {
                return true;
            }
        }
        if !state.can_extend() {
            return true;
        }

        let Some(&head) = search.path.last() else {
            return true;
        };
        for next in self.grid.neighbours(head) {
            if search.visited[search.index(next)] {
                continue;
            }
            // Empty cells never join a path
            let Some(letter) = self.grid[next].letter() else {
                continue;
            };
            search.push(next, letter);
            let keep_going = self.extend(search, visit);
            search.pop();
            if !keep_going {
                return false;
            }
        }
        true
    }

    fn finish(&self, found: Vec<FoundWord>) -> Vec<FoundWord> {
        if !self.config.dedup {
            return found;
        }
        let mut seen = HashSet::new();
        found.into_iter().filter(|f| seen.insert(f.word.clone())).collect()
    }
}

impl<'d, M: Matcher + Sync + ?Sized> BoardSolver<'d, M> {
    /// Parallel [`BoardSolver::find_paths`]: each start cell is searched on the rayon pool
    /// and results are concatenated in start order, so the output is identical
    pub fn find_paths_par(&self) -> Vec<FoundWord> {
        let starts = self.grid.positions().collect::<Vec<_>>();
        let per_start = starts
            .into_par_iter()
            .map(|start| {
                let mut found = Vec::new();
                self.search_from(start, &mut |f: FoundWord| {
                    found.push(f);
                    true
                });
                trace!("{:?}: {} words", start, found.len());
                found
            })
            .collect::<Vec<_>>();
        self.finish(per_start.into_iter().flatten().collect())
    }

    pub fn solve_par(&self) -> Vec<String> {
        self.find_paths_par().into_iter().map(|f| f.word).collect()
    }
}
