use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::grid::Cell;
use crate::path::PathId;

/// Group identifier shared by the markers that must be joined.
pub type ColorId = u8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u32);

/// A colored endpoint placed on a cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Marker {
    pub id: MarkerId,
    pub cell: Cell,
    pub color: ColorId,
    /// Committed path currently terminating here. Non-owning; resolved through `Board`.
    pub owner: Option<PathId>,
}

impl Marker {
    pub fn is_connected(&self) -> bool {
        self.owner.is_some()
    }
}

/// Markers of the current round, addressable by id and by cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeRegistry {
    markers: Vec<Marker>,
    #[serde(with = "crate::serde_cell_map")]
    by_cell: BTreeMap<Cell, MarkerId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, cell: Cell, color: ColorId) -> Result<MarkerId> {
        if self.by_cell.contains_key(&cell) {
            return Err(PuzzleError::DuplicateCell { cell });
        }
        let id = MarkerId(self.markers.len() as u32);
        self.markers.push(Marker {
            id,
            cell,
            color,
            owner: None,
        });
        self.by_cell.insert(cell, id);
        Ok(id)
    }

    pub fn at(&self, cell: Cell) -> Option<&Marker> {
        self.by_cell.get(&cell).and_then(|id| self.get(*id))
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.0 as usize)
    }

    pub fn set_owner(&mut self, id: MarkerId, path: PathId) {
        if let Some(marker) = self.markers.get_mut(id.0 as usize) {
            marker.owner = Some(path);
        }
    }

    pub fn clear_owner(&mut self, id: MarkerId) {
        if let Some(marker) = self.markers.get_mut(id.0 as usize) {
            marker.owner = None;
        }
    }

    pub fn clear_all(&mut self) {
        self.markers.clear();
        self.by_cell.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_rejects_duplicate_cells() {
        let mut reg = NodeRegistry::new();
        reg.place(Cell::new(1, 1), 0).unwrap();
        let err = reg.place(Cell::new(1, 1), 2).unwrap_err();
        assert!(matches!(err, PuzzleError::DuplicateCell { cell } if cell == Cell::new(1, 1)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.at(Cell::new(1, 1)).map(|m| m.color), Some(0));
    }

    #[test]
    fn owner_round_trips_through_set_and_clear() {
        let mut reg = NodeRegistry::new();
        let id = reg.place(Cell::new(0, 0), 1).unwrap();
        assert!(!reg.get(id).unwrap().is_connected());

        reg.set_owner(id, PathId(7));
        assert_eq!(reg.get(id).unwrap().owner, Some(PathId(7)));

        reg.clear_owner(id);
        assert_eq!(reg.get(id).unwrap().owner, None);
    }

    #[test]
    fn clear_all_empties_both_indexes() {
        let mut reg = NodeRegistry::new();
        reg.place(Cell::new(0, 0), 0).unwrap();
        reg.place(Cell::new(2, 0), 0).unwrap();
        reg.clear_all();
        assert!(reg.is_empty());
        assert!(reg.at(Cell::new(0, 0)).is_none());
        // Ids restart after a clear.
        let id = reg.place(Cell::new(2, 0), 0).unwrap();
        assert_eq!(id, MarkerId(0));
    }
}
