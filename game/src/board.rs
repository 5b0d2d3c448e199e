use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PuzzleError, Result};
use crate::grid::{Cell, GridGeometry};
use crate::levels::clamp_colors;
use crate::nodes::{ColorId, Marker, NodeRegistry};
use crate::occupancy::OccupancyMap;
use crate::path::{CommittedPath, PathId};

/// Board-level changes for renderers and UI glue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BoardEvent {
    PathRegistered { path: PathId, color: ColorId },
    PathRemoved { path: PathId },
    /// Every marker is connected. Emitted at most once per round.
    Won,
}

/// Owns markers, committed paths and cell occupancy for one round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Board {
    geometry: GridGeometry,
    nodes: NodeRegistry,
    occupancy: OccupancyMap,
    paths: BTreeMap<PathId, CommittedPath>,
    next_path_id: u32,
    win_signaled: bool,
    #[serde(default)]
    events: Vec<BoardEvent>,
}

impl Board {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            nodes: NodeRegistry::new(),
            occupancy: OccupancyMap::new(),
            paths: BTreeMap::new(),
            next_path_id: 0,
            win_signaled: false,
            events: Vec::new(),
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    pub fn marker_at(&self, cell: Cell) -> Option<&Marker> {
        self.nodes.at(cell)
    }

    pub fn path(&self, id: PathId) -> Option<&CommittedPath> {
        self.paths.get(&id)
    }

    pub fn path_at(&self, cell: Cell) -> Option<PathId> {
        self.occupancy.at(cell)
    }

    pub fn paths(&self) -> impl Iterator<Item = (PathId, &CommittedPath)> {
        self.paths.iter().map(|(id, path)| (*id, path))
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Clears the board and places one marker per authored cell.
    ///
    /// Consecutive groups of `nodes_per_color` cells share a color; colors past the palette clamp
    /// to the last one. Nothing is mutated when the placement list is rejected.
    pub fn setup_round(
        &mut self,
        nodes: &[Cell],
        nodes_per_color: usize,
        palette_len: usize,
    ) -> Result<()> {
        let placements = clamp_colors(nodes, nodes_per_color, palette_len)?;
        self.setup_placements(&placements)
    }

    /// Like `setup_round`, with colors already assigned.
    pub fn setup_placements(&mut self, placements: &[(Cell, ColorId)]) -> Result<()> {
        let mut seen = BTreeMap::new();
        for (cell, _) in placements {
            if !self.geometry.is_in_grid(*cell) {
                return Err(PuzzleError::MarkerOutOfGrid { cell: *cell });
            }
            if seen.insert(*cell, ()).is_some() {
                return Err(PuzzleError::DuplicateCell { cell: *cell });
            }
        }

        self.clear();
        for (cell, color) in placements {
            self.nodes.place(*cell, *color)?;
        }
        debug!(markers = self.nodes.len(), "round placed");
        Ok(())
    }

    /// Removes every marker and path and resets the win latch.
    pub fn clear(&mut self) {
        let removed: Vec<PathId> = self.paths.keys().copied().collect();
        for path in removed {
            self.events.push(BoardEvent::PathRemoved { path });
        }
        self.paths.clear();
        self.occupancy.clear_all();
        self.nodes.clear_all();
        self.win_signaled = false;
    }

    /// Points `cell` at `path`, evicting a different previous occupant in full first.
    pub fn assign(&mut self, cell: Cell, path: PathId) {
        if let Some(prev) = self.occupancy.at(cell) {
            if prev != path {
                debug!(%cell, evicted = %prev, by = %path, "cell reassigned");
                self.remove_path(prev);
            }
        }
        self.occupancy.insert(cell, path);
    }

    /// Fully removes a committed path. Returns it if it was still registered.
    pub fn remove_path(&mut self, id: PathId) -> Option<CommittedPath> {
        let path = self.paths.remove(&id)?;

        for cell in path.cells() {
            self.occupancy.clear_if(*cell, id);
        }
        for marker in [path.start(), path.end()] {
            if self.nodes.get(marker).and_then(|m| m.owner) == Some(id) {
                self.nodes.clear_owner(marker);
            }
        }

        debug!(path = %id, color = path.color(), cells = path.len(), "path removed");
        self.events.push(BoardEvent::PathRemoved { path: id });
        self.evaluate_win();
        Some(path)
    }

    /// Commits a finished path: evicts conflicting occupants, claims every cell and links both
    /// endpoint markers. Suppressed (returns `None`) once the round has signalled a win.
    pub fn register_final_line(&mut self, path: CommittedPath) -> Option<PathId> {
        if self.win_signaled {
            debug!("round already won; registration suppressed");
            return None;
        }

        for cell in path.cells() {
            let Some(existing) = self.occupancy.at(*cell) else {
                continue;
            };
            let other_color = self.paths.get(&existing).map(|p| p.color());
            if other_color.is_some_and(|c| c != path.color()) {
                self.remove_path(existing);
            }
        }

        let id = PathId(self.next_path_id);
        self.next_path_id += 1;

        let cells = path.cells().to_vec();
        let (start, end, color) = (path.start(), path.end(), path.color());
        self.paths.insert(id, path);
        for cell in cells.iter() {
            self.assign(*cell, id);
        }
        self.nodes.set_owner(start, id);
        self.nodes.set_owner(end, id);

        info!(path = %id, color, cells = cells.len(), "path committed");
        self.events.push(BoardEvent::PathRegistered { path: id, color });
        self.evaluate_win();
        Some(id)
    }

    /// True when the board has markers and every one of them is connected.
    pub fn is_won(&self) -> bool {
        !self.nodes.is_empty() && self.nodes.iter().all(Marker::is_connected)
    }

    /// Whether `BoardEvent::Won` has fired this round.
    pub fn win_signaled(&self) -> bool {
        self.win_signaled
    }

    /// Re-checks the win condition, firing `BoardEvent::Won` on the first success of the round.
    pub fn evaluate_win(&mut self) -> bool {
        let won = self.is_won();
        if won && !self.win_signaled {
            self.win_signaled = true;
            info!(markers = self.nodes.len(), "all markers connected");
            self.events.push(BoardEvent::Won);
        }
        won
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Describes every broken occupancy or endpoint invariant. Empty when consistent.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut out = Vec::new();

        for (cell, id) in self.occupancy.iter() {
            match self.paths.get(&id) {
                Some(path) if path.contains(cell) => {}
                Some(_) => out.push(format!("{cell} maps to {id} which does not cover it")),
                None => out.push(format!("{cell} maps to unregistered {id}")),
            }
        }

        for (id, path) in self.paths.iter() {
            for cell in path.cells() {
                if self.occupancy.at(*cell) != Some(*id) {
                    out.push(format!("{id} covers {cell} but does not occupy it"));
                }
            }
        }

        for marker in self.nodes.iter() {
            let Some(owner) = marker.owner else {
                continue;
            };
            match self.paths.get(&owner) {
                Some(path) if path.has_endpoint(marker.id) => {}
                Some(_) => out.push(format!(
                    "marker at {} owned by {owner} which does not end there",
                    marker.cell
                )),
                None => out.push(format!(
                    "marker at {} owned by unregistered {owner}",
                    marker.cell
                )),
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::MarkerId;

    fn two_color_board() -> Board {
        let mut board = Board::new(GridGeometry::default());
        board
            .setup_placements(&[
                (Cell::new(0, 0), 0),
                (Cell::new(2, 0), 0),
                (Cell::new(0, 2), 1),
                (Cell::new(2, 2), 1),
            ])
            .unwrap();
        board
    }

    fn line(cells: &[(i32, i32)], start: u32, end: u32, color: ColorId) -> CommittedPath {
        CommittedPath::new(
            cells.iter().map(|&c| Cell::from(c)).collect(),
            MarkerId(start),
            MarkerId(end),
            color,
        )
    }

    #[test]
    fn register_claims_cells_and_links_endpoints() {
        let mut board = two_color_board();
        let id = board
            .register_final_line(line(&[(0, 0), (1, 0), (2, 0)], 0, 1, 0))
            .unwrap();

        for x in 0..3 {
            assert_eq!(board.path_at(Cell::new(x, 0)), Some(id));
        }
        assert_eq!(board.nodes().get(MarkerId(0)).unwrap().owner, Some(id));
        assert_eq!(board.nodes().get(MarkerId(1)).unwrap().owner, Some(id));
        assert!(board.invariant_violations().is_empty());
    }

    #[test]
    fn remove_path_clears_cells_and_owners() {
        let mut board = two_color_board();
        let id = board
            .register_final_line(line(&[(0, 0), (1, 0), (2, 0)], 0, 1, 0))
            .unwrap();

        let removed = board.remove_path(id).unwrap();
        assert_eq!(removed.len(), 3);
        assert!(board.occupancy().is_empty());
        assert!(board.nodes().iter().all(|m| m.owner.is_none()));
        assert!(board.remove_path(id).is_none());
    }

    #[test]
    fn assign_evicts_previous_occupant_in_full() {
        let mut board = two_color_board();
        let a = board
            .register_final_line(line(&[(0, 2), (1, 2), (1, 1), (2, 1), (2, 2)], 2, 3, 1))
            .unwrap();
        let b = board
            .register_final_line(line(&[(0, 0), (0, 1), (1, 1), (1, 0), (2, 0)], 0, 1, 0))
            .unwrap();

        assert!(board.path(a).is_none());
        assert_eq!(board.path_at(Cell::new(0, 2)), None);
        assert_eq!(board.path_at(Cell::new(2, 1)), None);
        assert_eq!(board.path_at(Cell::new(1, 1)), Some(b));
        assert!(board.nodes().get(MarkerId(2)).unwrap().owner.is_none());
        assert!(board.invariant_violations().is_empty());
    }

    #[test]
    fn win_fires_once_and_suppresses_later_registrations() {
        let mut board = two_color_board();
        board.register_final_line(line(&[(0, 0), (1, 0), (2, 0)], 0, 1, 0));
        board.register_final_line(line(&[(0, 2), (1, 2), (2, 2)], 2, 3, 1));

        assert!(board.is_won());
        assert!(board.evaluate_win());
        let wins = board
            .drain_events()
            .into_iter()
            .filter(|e| *e == BoardEvent::Won)
            .count();
        assert_eq!(wins, 1);

        assert!(board
            .register_final_line(line(&[(0, 1), (1, 1)], 0, 1, 0))
            .is_none());
    }

    #[test]
    fn setup_rejects_duplicates_without_touching_board() {
        let mut board = two_color_board();
        let err = board
            .setup_placements(&[(Cell::new(4, 4), 0), (Cell::new(4, 4), 0)])
            .unwrap_err();
        assert!(matches!(err, PuzzleError::DuplicateCell { .. }));
        assert_eq!(board.nodes().len(), 4);
    }

    #[test]
    fn setup_rejects_out_of_grid_markers() {
        let mut board = Board::new(GridGeometry::default());
        let err = board
            .setup_placements(&[(Cell::new(5, 0), 0)])
            .unwrap_err();
        assert!(matches!(err, PuzzleError::MarkerOutOfGrid { .. }));
    }

    #[test]
    fn empty_board_is_not_won() {
        let mut board = Board::new(GridGeometry::default());
        assert!(!board.is_won());
        assert!(!board.evaluate_win());
    }
}
