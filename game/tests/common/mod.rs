#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use flowgrid::board::Board;
use flowgrid::grid::{Cell, GridGeometry};
use flowgrid::nodes::ColorId;
use flowgrid::playtest::{PuzzleInput, trace_inputs};
use flowgrid::session::{BeginOutcome, DrawingSession};

/// Lines that connect every marker of the first built-in round.
pub const ROUND_ONE: &[&[(i32, i32)]] = &[
    &[(4, 1), (4, 2), (4, 3)],
    &[(1, 1), (1, 2), (1, 3), (2, 3), (2, 4), (3, 4), (4, 4)],
    &[(1, 4), (0, 4), (0, 3), (0, 2), (0, 1), (0, 0), (1, 0), (2, 0), (2, 1), (2, 2)],
    &[(3, 3), (3, 2), (3, 1), (3, 0), (4, 0)],
];

pub fn cells(points: &[(i32, i32)]) -> Vec<Cell> {
    points.iter().map(|&(x, y)| Cell::new(x, y)).collect()
}

pub fn round_one_inputs() -> Vec<PuzzleInput> {
    ROUND_ONE
        .iter()
        .flat_map(|line| trace_inputs(&cells(line)))
        .collect()
}

pub fn board_with(placements: &[((i32, i32), ColorId)]) -> Board {
    let mut board = Board::new(GridGeometry::default());
    let placements: Vec<(Cell, ColorId)> = placements
        .iter()
        .map(|&((x, y), color)| (Cell::new(x, y), color))
        .collect();
    board.setup_placements(&placements).unwrap();
    board
}

pub fn begin(board: &mut Board, x: i32, y: i32) -> DrawingSession {
    match DrawingSession::begin_at(board, Cell::new(x, y)) {
        BeginOutcome::Started { session, .. } => session,
        BeginOutcome::NoMarker => panic!("no marker at ({x}, {y})"),
    }
}

pub fn unique_temp_path(tag: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("flowgrid_test_{tag}_{nanos}.{ext}"))
}
