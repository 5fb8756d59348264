use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::trace;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::dictionary::fold_case;
use crate::error::{BoggleError, Result};

/// Offsets `(dcol, drow)` visited when extending a path. The order is part of
/// the solver's output contract: row above, same row, row below, left to right.
#[rustfmt::skip]
pub const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Zero based (column, row) coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Applies an offset, returning None if it would go below zero
    pub fn offset(&self, dcol: isize, drow: isize) -> Option<Position> {
        let col = self.col.checked_add_signed(dcol)?;
        let row = self.row.checked_add_signed(drow)?;
        Some(Position { col, row })
    }

    /// True for the up to 8 cells touching this one, diagonals included
    pub fn is_adjacent(&self, other: Position) -> bool {
        *self != other && self.col.abs_diff(other.col) <= 1 && self.row.abs_diff(other.row) <= 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Letter(char),
}

impl Cell {
    pub fn letter(&self) -> Option<char> {
        match self {
            Cell::Empty => None,
            Cell::Letter(l) => Some(*l),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_char(&self) -> char {
        self.letter().unwrap_or(' ')
    }
}

impl From<char> for Cell {
    /// Spaces and underscores mark a removed cell, anything else is upper-cased
    fn from(c: char) -> Self {
        match c {
            ' ' | '_' => Cell::Empty,
            c => Cell::Letter(fold_case(c)),
        }
    }
}

/// Rectangular letter grid. Transforms return a new grid and leave the receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Indexed `[[row, col]]`
    cells: Array2<Cell>,
}

impl Grid {
    /// Builds a grid from rows of characters. All rows must have the same length
    pub fn from_rows(rows: Vec<Vec<char>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(BoggleError::InvalidGridShape(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                width
            )));
        }
        let flat = rows.into_iter().flatten().map(Cell::from).collect::<Vec<_>>();
        Self::from_cells(width, height, flat)
    }

    /// Builds a grid from one string per row
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        Self::from_rows(lines.iter().map(|l| l.as_ref().chars().collect()).collect())
    }

    /// Builds a grid from row-major characters split into rows of `width`
    pub fn from_flat<I: IntoIterator<Item = char>>(width: usize, chars: I) -> Result<Self> {
        let flat = chars.into_iter().map(Cell::from).collect::<Vec<_>>();
        if width == 0 || flat.len() % width != 0 {
            return Err(BoggleError::InvalidGridShape(format!(
                "{} cells cannot be split into rows of {}",
                flat.len(),
                width
            )));
        }
        let height = flat.len() / width;
        Self::from_cells(width, height, flat)
    }

    /// Parses a JSON array of rows, each an array of one letter strings. "" is an empty cell
    pub fn from_json_str(data: &str) -> Result<Self> {
        let raw_board: Vec<Vec<String>> = serde_json::from_str(data)?;
        let mut rows = Vec::with_capacity(raw_board.len());
        for (i, raw_row) in raw_board.iter().enumerate() {
            let mut row = Vec::with_capacity(raw_row.len());
            for (j, s) in raw_row.iter().enumerate() {
                let mut chars = s.chars();
                let c = match (chars.next(), chars.next()) {
                    (None, _) => ' ',
                    (Some(c), None) => c,
                    _ => {
                        return Err(BoggleError::InvalidGridShape(format!(
                            "cell ({}, {}) holds {:?}, expected one letter or \"\"",
                            j, i, s
                        )))
                    }
                };
                row.push(c);
            }
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        Self::from_json_str(&data)
    }

    fn from_cells(width: usize, height: usize, flat: Vec<Cell>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BoggleError::InvalidGridShape(
                "grid must have at least one cell".to_string(),
            ));
        }
        let cells = Array2::from_shape_vec((height, width), flat)
            .map_err(|e| BoggleError::InvalidGridShape(e.to_string()))?;
        Ok(Self { cells })
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.col < self.width() && pos.row < self.height()
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.cells.get([pos.row, pos.col]).copied()
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height()).flat_map(move |row| (0..self.width()).map(move |col| Position { col, row }))
    }

    /// In-bounds neighbours of `pos` in [`NEIGHBOUR_OFFSETS`] order
    pub fn neighbours(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(move |&(dc, dr)| pos.offset(dc, dr))
            .filter(move |p| self.in_bounds(*p))
    }

    /// Cell characters in row-major order. Empty cells come back as ' '
    pub fn values(&self) -> Vec<char> {
        self.cells.iter().map(Cell::as_char).collect()
    }

    /// Letters spelled by a path. Empty cells are skipped
    pub fn letters(&self, path: &[Position]) -> String {
        path.iter().filter_map(|p| self.get(*p).and_then(|c| c.letter())).collect()
    }

    /// Returns a copy with every position on the path blanked out
    pub fn remove_path(&self, path: &[Position]) -> Result<Grid> {
        let mut cells = self.cells.clone();
        for &pos in path {
            match cells.get_mut([pos.row, pos.col]) {
                Some(cell) => *cell = Cell::Empty,
                None => {
                    return Err(BoggleError::OutOfBoundsCoordinate {
                        col: pos.col,
                        row: pos.row,
                        width: self.width(),
                        height: self.height(),
                    })
                }
            }
        }
        trace!("Removed {} cells", path.len());
        Ok(Grid { cells })
    }

    /// Lets letters fall to the bottom of their column, keeping their order and
    /// padding the top with empty cells
    pub fn compact_columns(&self) -> Grid {
        let mut cells = self.cells.clone();
        let height = self.height();
        for mut column in cells.columns_mut() {
            let letters = column.iter().filter(|c| !c.is_empty()).copied().collect::<Vec<_>>();
            let gap = height - letters.len();
            for (i, cell) in column.iter_mut().enumerate() {
                *cell = if i < gap { Cell::Empty } else { letters[i - gap] };
            }
        }
        Grid { cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

impl std::ops::Index<Position> for Grid {
    type Output = Cell;

    fn index(&self, index: Position) -> &Self::Output {
        &self.cells[[index.row, index.col]]
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            let line = row.iter().map(Cell::as_char).collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puzzle() -> Grid {
        Grid::from_lines(&["ATG", "CAR", "CDO"]).unwrap()
    }

    #[test]
    fn test_to_string() {
        assert_eq!(puzzle().to_string(), "ATG\nCAR\nCDO\n");
    }

    #[test]
    fn test_values_roundtrip() {
        let p1 = puzzle();
        let p2 = Grid::from_flat(3, p1.values()).unwrap();
        assert_eq!(p1.to_string(), p2.to_string());
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_values_roundtrip_with_blanks() {
        let p1 = Grid::from_lines(&[" C_", "CAT"]).unwrap();
        assert_eq!(p1.values(), vec![' ', 'C', ' ', 'C', 'A', 'T']);
        let p2 = Grid::from_flat(3, p1.values()).unwrap();
        assert_eq!(p2[Position::new(0, 0)], Cell::Empty);
        assert_eq!(p2[Position::new(2, 0)], Cell::Empty);
        assert_eq!(p1.to_string(), p2.to_string());
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_non_ascii_letters_fold() {
        let g = Grid::from_lines(&["éte", "ßx "]).unwrap();
        assert_eq!(g.to_string(), "ÉTE\nßX \n");
    }

    #[test]
    fn test_rectangular_flat() {
        let g = Grid::from_flat(4, "ABCDEFGH".chars()).unwrap();
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 2);
        assert_eq!(g[Position::new(3, 1)], Cell::Letter('H'));
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(
            Grid::from_flat(3, "ABCDE".chars()),
            Err(BoggleError::InvalidGridShape(_))
        ));
        assert!(matches!(
            Grid::from_flat(0, "".chars()),
            Err(BoggleError::InvalidGridShape(_))
        ));
        assert!(matches!(
            Grid::from_lines(&["ABC", "DE", "FGH"]),
            Err(BoggleError::InvalidGridShape(_))
        ));
        let no_rows: Vec<Vec<char>> = vec![];
        assert!(matches!(Grid::from_rows(no_rows), Err(BoggleError::InvalidGridShape(_))));
    }

    #[test]
    fn test_blank_markers() {
        let g = Grid::from_lines(&[" C_", "cat"]).unwrap();
        assert_eq!(g[Position::new(0, 0)], Cell::Empty);
        assert_eq!(g[Position::new(2, 0)], Cell::Empty);
        assert_eq!(g[Position::new(1, 1)], Cell::Letter('A'));
        assert_eq!(g.to_string(), " C \nCAT\n");
    }

    #[test]
    fn test_remove_path_no_dropdown() {
        let p = puzzle();
        let removed = p.remove_path(&[Position::new(0, 0), Position::new(1, 0)]).unwrap();
        assert_eq!(removed.to_string(), "  G\nCAR\nCDO\n");
        // Receiver is untouched
        assert_eq!(p.to_string(), "ATG\nCAR\nCDO\n");
    }

    #[test]
    fn test_remove_path_out_of_bounds() {
        let err = puzzle()
            .remove_path(&[Position::new(0, 0), Position::new(3, 1)])
            .unwrap_err();
        match err {
            BoggleError::OutOfBoundsCoordinate { col, row, width, height } => {
                assert_eq!((col, row, width, height), (3, 1, 3, 3));
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn test_compact_columns() {
        let p = puzzle();
        let path = [
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(1, 1),
            Position::new(1, 2),
            Position::new(2, 2),
        ];
        let compacted = p.remove_path(&path).unwrap().compact_columns();
        // Column 0 keeps C, C; column 1 is cleared; G and R fall in column 2
        assert_eq!(compacted.to_string(), "   \nC G\nC R\n");
    }

    #[test]
    fn test_compact_preserves_order() {
        let g = Grid::from_lines(&["A", " ", "B", " ", "C"]).unwrap();
        assert_eq!(g.compact_columns().to_string(), " \n \nA\nB\nC\n");
    }

    #[test]
    fn test_compact_idempotent() {
        let g = Grid::from_lines(&["D A", " _T", "CO "]).unwrap();
        let once = g.compact_columns();
        let twice = once.compact_columns();
        assert_eq!(once, twice);
        assert_eq!(once.to_string(), "   \nD A\nCOT\n");
    }

    #[test]
    fn test_neighbours_order() {
        let g = puzzle();
        let centre = g.neighbours(Position::new(1, 1)).collect::<Vec<_>>();
        assert_eq!(
            centre,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(2, 0),
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(0, 2),
                Position::new(1, 2),
                Position::new(2, 2),
            ]
        );
        let corner = g.neighbours(Position::new(2, 2)).collect::<Vec<_>>();
        assert_eq!(
            corner,
            vec![Position::new(1, 1), Position::new(2, 1), Position::new(1, 2)]
        );
    }

    #[test]
    fn test_adjacency() {
        let p = Position::new(1, 1);
        assert!(p.is_adjacent(Position::new(0, 0)));
        assert!(p.is_adjacent(Position::new(2, 1)));
        assert!(!p.is_adjacent(p));
        assert!(!p.is_adjacent(Position::new(3, 1)));
    }

    #[test]
    fn test_from_json() {
        let g = Grid::from_json_str(r#"[["D", "", ""], ["C", "A", "T"], ["", "O", "G"]]"#).unwrap();
        assert_eq!(g.to_string(), "D  \nCAT\n OG\n");
        assert!(matches!(Grid::from_json_str("[[\"A\"], []]"), Err(BoggleError::InvalidGridShape(_))));
        assert!(matches!(Grid::from_json_str("{"), Err(BoggleError::Json(_))));
    }

    #[test]
    fn test_from_json_rejects_multi_letter_cells() {
        for data in [r#"[["QU", "A"], ["B", "C"]]"#, r#"[[" A", "B"]]"#] {
            assert!(
                matches!(Grid::from_json_str(data), Err(BoggleError::InvalidGridShape(_))),
                "{}",
                data
            );
        }
        // A lone space is a blank cell, like ""
        let g = Grid::from_json_str(r#"[[" ", "A"]]"#).unwrap();
        assert_eq!(g[Position::new(0, 0)], Cell::Empty);
    }
}
