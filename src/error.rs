//! Error types shared by the dictionary, grid and solver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoggleError {
    /// Reading a word list, grid or config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Grid input was not rectangular or had no cells.
    #[error("Invalid grid shape: {0}")]
    InvalidGridShape(String),

    /// A path referenced a cell outside the grid.
    #[error("Coordinate ({col}, {row}) is outside the {width}x{height} grid")]
    OutOfBoundsCoordinate {
        col: usize,
        row: usize,
        width: usize,
        height: usize,
    },

    /// A cached dictionary could not be written or read back.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BoggleError>;
