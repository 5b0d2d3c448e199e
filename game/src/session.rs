//! The in-progress path a player is dragging across the grid.
//!
//! A session lives from a press on a marker until it reaches a matching marker, is released, or
//! breaks a drawing rule. Rule violations end the session quietly; they are never errors.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Board;
use crate::grid::Cell;
use crate::nodes::{ColorId, MarkerId};
use crate::path::{CommittedPath, PathId};

/// Why a stimulus was dropped without changing the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No session is active.
    Idle,
    OutOfGrid,
    SameCell,
}

/// Why a session ended without committing a path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AbortReason {
    /// The step was diagonal or skipped cells.
    NotAdjacent,
    /// The step revisited a trail cell other than the previous one.
    SelfOverlap,
    /// The step landed back on the session's own start marker.
    StartReentry,
    /// The step landed on a marker of another color.
    ColorMismatch,
    /// The step landed on a committed path of the same color.
    SameColorPath,
    /// Fewer than two cells when finishing.
    TooShort,
    /// The trail does not end on a distinct marker of the session's color.
    NoEndpoint,
    /// The board already signalled a win this round.
    RoundWon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginOutcome {
    /// No marker under the pointer; nothing happened.
    NoMarker,
    /// A session started. `evicted` is the path that previously ended at the marker.
    Started {
        session: DrawingSession,
        evicted: Option<PathId>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtendOutcome {
    Ignored(IgnoreReason),
    /// The previous cell was revisited and the last cell dropped.
    Retracted { removed: Cell },
    /// The trail grew by one cell, possibly evicting another color's path.
    Extended { evicted: Option<PathId> },
    Finalized(PathId),
    Aborted(AbortReason),
}

impl ExtendOutcome {
    /// Finalized and aborted sessions must be discarded by the caller.
    pub fn ends_session(&self) -> bool {
        matches!(self, ExtendOutcome::Finalized(_) | ExtendOutcome::Aborted(_))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionEnd {
    Finalized(PathId),
    Aborted(AbortReason),
}

impl From<SessionEnd> for ExtendOutcome {
    fn from(end: SessionEnd) -> Self {
        match end {
            SessionEnd::Finalized(id) => ExtendOutcome::Finalized(id),
            SessionEnd::Aborted(reason) => ExtendOutcome::Aborted(reason),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawingSession {
    start: MarkerId,
    color: ColorId,
    trail: Vec<Cell>,
}

impl DrawingSession {
    /// Starts drawing from the marker at `cell`, evicting the path it already owns.
    pub fn begin_at(board: &mut Board, cell: Cell) -> BeginOutcome {
        let Some(marker) = board.marker_at(cell) else {
            debug!(%cell, "press ignored: no marker");
            return BeginOutcome::NoMarker;
        };
        let (start, color, owner) = (marker.id, marker.color, marker.owner);

        let evicted = owner.and_then(|path| board.remove_path(path).map(|_| path));
        if let Some(path) = evicted {
            debug!(%cell, %path, "restarting from connected marker");
        }

        debug!(%cell, color, "session started");
        BeginOutcome::Started {
            session: DrawingSession {
                start,
                color,
                trail: vec![cell],
            },
            evicted,
        }
    }

    pub fn start(&self) -> MarkerId {
        self.start
    }

    pub fn color(&self) -> ColorId {
        self.color
    }

    /// Visited cells in drawing order; the first is the start marker's cell.
    pub fn trail(&self) -> &[Cell] {
        &self.trail
    }

    pub fn last(&self) -> Option<Cell> {
        self.trail.last().copied()
    }

    /// Applies one pointer step. Callers drop the session when `ends_session()` holds.
    pub fn extend_to(&mut self, board: &mut Board, cell: Cell) -> ExtendOutcome {
        if !board.geometry().is_in_grid(cell) {
            return ExtendOutcome::Ignored(IgnoreReason::OutOfGrid);
        }

        let len = self.trail.len();
        let Some(last) = self.last() else {
            return self.abort(AbortReason::TooShort);
        };
        if last == cell {
            return ExtendOutcome::Ignored(IgnoreReason::SameCell);
        }

        if len >= 2 && self.trail[len - 2] == cell {
            self.trail.pop();
            debug!(removed = %last, "trail retracted");
            return ExtendOutcome::Retracted { removed: last };
        }

        if !last.is_orthogonal_neighbor(cell) {
            return self.abort(AbortReason::NotAdjacent);
        }

        if self.trail.contains(&cell) {
            return self.abort(AbortReason::SelfOverlap);
        }

        if let Some(marker) = board.marker_at(cell) {
            // Unreachable while the start stays trail[0]: self-overlap fires first.
            if marker.id == self.start {
                return self.abort(AbortReason::StartReentry);
            }
            if marker.color != self.color {
                return self.abort(AbortReason::ColorMismatch);
            }
            self.trail.push(cell);
            return self.finalize(board).into();
        }

        let mut evicted = None;
        if let Some(occupant) = board.path_at(cell) {
            let occupant_color = board.path(occupant).map(|p| p.color());
            if occupant_color == Some(self.color) {
                return self.abort(AbortReason::SameColorPath);
            }
            debug!(%cell, path = %occupant, "crossing another color; evicting it");
            board.remove_path(occupant);
            evicted = Some(occupant);
        }

        self.trail.push(cell);
        ExtendOutcome::Extended { evicted }
    }

    /// Pointer released: commits when the trail already ends on a matching marker, otherwise
    /// discards the trail.
    pub fn release(&mut self, board: &mut Board) -> SessionEnd {
        self.finalize(board)
    }

    /// Commits the trail as a path if it joins `start` to a distinct marker of the same color.
    pub fn finalize(&mut self, board: &mut Board) -> SessionEnd {
        if self.trail.len() < 2 {
            return self.end(AbortReason::TooShort);
        }

        let end = self
            .last()
            .and_then(|cell| board.marker_at(cell))
            .filter(|m| m.id != self.start && m.color == self.color)
            .map(|m| m.id);
        let Some(end) = end else {
            return self.end(AbortReason::NoEndpoint);
        };

        let cells = std::mem::take(&mut self.trail);
        let path = CommittedPath::new(cells, self.start, end, self.color);
        match board.register_final_line(path) {
            Some(id) => SessionEnd::Finalized(id),
            None => self.end(AbortReason::RoundWon),
        }
    }

    fn abort(&mut self, reason: AbortReason) -> ExtendOutcome {
        self.end(reason).into()
    }

    fn end(&mut self, reason: AbortReason) -> SessionEnd {
        debug!(?reason, cells = self.trail.len(), "session aborted");
        self.trail.clear();
        SessionEnd::Aborted(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridGeometry;

    fn pair_board() -> Board {
        let mut board = Board::new(GridGeometry::default());
        board
            .setup_placements(&[(Cell::new(0, 0), 0), (Cell::new(2, 0), 0)])
            .unwrap();
        board
    }

    fn started(board: &mut Board, cell: Cell) -> DrawingSession {
        match DrawingSession::begin_at(board, cell) {
            BeginOutcome::Started { session, .. } => session,
            BeginOutcome::NoMarker => panic!("expected a marker at {cell}"),
        }
    }

    #[test]
    fn release_without_endpoint_discards_trail() {
        let mut board = pair_board();
        let mut session = started(&mut board, Cell::new(0, 0));
        session.extend_to(&mut board, Cell::new(0, 1));

        assert_eq!(
            session.release(&mut board),
            SessionEnd::Aborted(AbortReason::NoEndpoint)
        );
        assert!(board.occupancy().is_empty());
    }

    #[test]
    fn release_on_start_only_is_too_short() {
        let mut board = pair_board();
        let mut session = started(&mut board, Cell::new(0, 0));
        assert_eq!(
            session.release(&mut board),
            SessionEnd::Aborted(AbortReason::TooShort)
        );
    }

    #[test]
    fn out_of_grid_step_is_ignored_not_aborted() {
        let mut board = pair_board();
        let mut session = started(&mut board, Cell::new(0, 0));
        assert_eq!(
            session.extend_to(&mut board, Cell::new(-1, 0)),
            ExtendOutcome::Ignored(IgnoreReason::OutOfGrid)
        );
        assert_eq!(session.trail(), &[Cell::new(0, 0)]);
    }
}
