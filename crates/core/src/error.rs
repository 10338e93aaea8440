//! Error types for grid operations and session configuration.

use thiserror::Error;

use crate::types::{Pos, MAX_GRID_DIM, MAX_KIND_COUNT, MIN_KIND_COUNT};

/// Failures of structural grid operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Coordinates outside `[0, cols) x [0, rows)`
    #[error("position ({col}, {row}) is outside the grid")]
    OutOfBounds { col: i64, row: i64 },
    /// Swap between two positions that are not 4-adjacent
    #[error("cannot swap ({}, {}) with ({}, {}): not adjacent", .a.col, .a.row, .b.col, .b.row)]
    InvalidMove { a: Pos, b: Pos },
    /// Operation that needs a tile found an empty slot
    #[error("slot ({}, {}) is empty", .0.col, .0.row)]
    EmptySlot(Pos),
    /// Area-clear trigger on a plain tile
    #[error("tile at ({}, {}) is not an area-clear tile", .0.col, .0.row)]
    NotSpecial(Pos),
    /// Text layout that cannot be turned into a grid
    #[error("malformed grid layout: {0}")]
    Malformed(String),
}

impl GridError {
    pub(crate) fn out_of_bounds(pos: Pos) -> Self {
        GridError::OutOfBounds {
            col: i64::from(pos.col),
            row: i64::from(pos.row),
        }
    }
}

/// Invalid session configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid dimensions {cols}x{rows} must be within 1..={max}", max = MAX_GRID_DIM)]
    Dimensions { cols: u16, rows: u16 },
    #[error("kind count {0} must be within {min}..={max}", min = MIN_KIND_COUNT, max = MAX_KIND_COUNT)]
    KindCount(u8),
    #[error("bomb spawn chance {0} exceeds 1000 per mille")]
    BombChance(u16),
    #[error("timed mode needs a non-zero duration")]
    ZeroDuration,
    #[error("max cascade rounds must be at least 1")]
    ZeroCascadeRounds,
    #[error("grid does not fit the configuration: {0}")]
    GridMismatch(String),
}
