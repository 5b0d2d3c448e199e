use serde::{Deserialize, Serialize};

use crate::grid::Cell;
use crate::nodes::{ColorId, MarkerId};

/// Handle into the board's path table. Never reused within a board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathId(pub u32);

impl std::fmt::Display for PathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "path#{}", self.0)
    }
}

/// A finalized connection between two distinct markers of the same color.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommittedPath {
    cells: Vec<Cell>,
    start: MarkerId,
    end: MarkerId,
    color: ColorId,
}

impl CommittedPath {
    /// Callers guarantee `cells.len() >= 2`, distinct cells and `start != end`.
    pub(crate) fn new(cells: Vec<Cell>, start: MarkerId, end: MarkerId, color: ColorId) -> Self {
        debug_assert!(cells.len() >= 2);
        debug_assert_ne!(start, end);
        Self {
            cells,
            start,
            end,
            color,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn start(&self) -> MarkerId {
        self.start
    }

    pub fn end(&self) -> MarkerId {
        self.end
    }

    pub fn color(&self) -> ColorId {
        self.color
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn has_endpoint(&self, marker: MarkerId) -> bool {
        self.start == marker || self.end == marker
    }
}
