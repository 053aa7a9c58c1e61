pub mod binary_grid;
pub mod binary_group_finder;
pub mod group;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a grid of cell values was rejected before any labeling took place.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupFinderError {
    /// A row of the grid was absent.
    #[error("row {row} of the grid is absent")]
    NullInput { row: usize },

    /// The grid is not rectangular.
    #[error("grid is not rectangular: row {row} has {actual} cells but row 0 has {expected}")]
    Shape {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A cell held something other than 0 or 1.
    #[error("invalid cell value {value} at (x: {column}, y: {row}). Cells must be 0 or 1")]
    Value { row: usize, column: usize, value: i32 },
}
