use thiserror::Error;

use crate::grid::Cell;

pub type Result<T> = std::result::Result<T, PuzzleError>;

/// Structural failures reported to callers.
///
/// Invalid moves while drawing are not errors; they end the session (see `session::AbortReason`).
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("a marker already occupies cell {cell}")]
    DuplicateCell { cell: Cell },

    #[error("marker cell {cell} lies outside the grid")]
    MarkerOutOfGrid { cell: Cell },

    #[error("a drawing session is already active")]
    SessionActive,

    #[error("palette has no colors")]
    EmptyPalette,

    #[error("nodes_per_color must be at least 1")]
    ZeroNodesPerColor,

    #[error("level needs {groups} colors but the palette only has {colors}")]
    PaletteOverflow { groups: usize, colors: usize },

    #[error("{nodes} markers do not split into groups of {nodes_per_color}")]
    IncompleteColorGroup { nodes: usize, nodes_per_color: usize },

    #[error("level set contains no levels")]
    NoLevels,

    #[error("round {round} is out of range (1..={max})")]
    UnknownRound { round: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
