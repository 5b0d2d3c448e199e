use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::Cell;
use crate::path::PathId;

/// Which committed path covers each cell. At most one path per cell.
///
/// Ownership changes go through `Board::assign`, which evicts a previous occupant in full
/// before calling `insert`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OccupancyMap {
    #[serde(with = "crate::serde_cell_map")]
    cells: BTreeMap<Cell, PathId>,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(&self, cell: Cell) -> Option<PathId> {
        self.cells.get(&cell).copied()
    }

    /// Returns the previous occupant, if any.
    pub(crate) fn insert(&mut self, cell: Cell, path: PathId) -> Option<PathId> {
        self.cells.insert(cell, path)
    }

    pub fn clear(&mut self, cell: Cell) {
        self.cells.remove(&cell);
    }

    /// Clears `cell` only while it still maps to `path`.
    pub(crate) fn clear_if(&mut self, cell: Cell, path: PathId) -> bool {
        if self.cells.get(&cell) == Some(&path) {
            self.cells.remove(&cell);
            true
        } else {
            false
        }
    }

    pub(crate) fn clear_all(&mut self) {
        self.cells.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, PathId)> + '_ {
        self.cells.iter().map(|(cell, path)| (*cell, *path))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_if_leaves_newer_owner_alone() {
        let mut occ = OccupancyMap::new();
        let cell = Cell::new(1, 1);
        occ.insert(cell, PathId(1));
        occ.insert(cell, PathId(2));

        assert!(!occ.clear_if(cell, PathId(1)));
        assert_eq!(occ.at(cell), Some(PathId(2)));

        assert!(occ.clear_if(cell, PathId(2)));
        assert_eq!(occ.at(cell), None);
    }

    #[test]
    fn clear_is_noop_on_empty_cell() {
        let mut occ = OccupancyMap::new();
        occ.clear(Cell::new(3, 3));
        assert!(occ.is_empty());
    }
}
