//! Column-oriented tile grid: decode/encode of the row-major CSV payload and the
//! per-column height measurements the optimizer scores.

pub mod column;
pub mod grid;
pub mod stats;

use std::fmt;

pub use column::TileColumn;
pub use grid::TileGrid;
pub use stats::HeightStats;

/// Tile id as stored in the layer payload. Zero means empty.
pub type TileId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    /// Malformed or unsupported serialized payload.
    Format(String),
    /// Structurally invalid parameters (zero dimensions, empty column set).
    InvalidArgument(String),
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for LayerError {}
