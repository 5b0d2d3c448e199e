//! Human-readable snapshot of which markers are connected.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::board::Board;
use crate::grid::Cell;
use crate::nodes::ColorId;
use crate::path::PathId;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ColorReport {
    pub markers: usize,
    pub connected: usize,
    pub paths: Vec<PathId>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MarkerStatus {
    pub cell: Cell,
    pub color: ColorId,
    pub owner: Option<PathId>,
}

impl MarkerStatus {
    pub fn is_connected(&self) -> bool {
        self.owner.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ConnectionReport {
    /// One entry per marker, in placement order.
    pub markers: Vec<MarkerStatus>,
    pub colors: BTreeMap<ColorId, ColorReport>,
    pub occupied_cells: usize,
    pub won: bool,
    /// Broken occupancy/endpoint invariants. Always empty unless there is a bug.
    pub violations: Vec<String>,
}

impl ConnectionReport {
    pub fn from_board(board: &Board) -> Self {
        let mut colors: BTreeMap<ColorId, ColorReport> = BTreeMap::new();
        let mut markers = Vec::with_capacity(board.nodes().len());
        for marker in board.nodes().iter() {
            markers.push(MarkerStatus {
                cell: marker.cell,
                color: marker.color,
                owner: marker.owner,
            });
            let entry = colors.entry(marker.color).or_default();
            entry.markers += 1;
            if marker.is_connected() {
                entry.connected += 1;
            }
        }
        for (id, path) in board.paths() {
            colors.entry(path.color()).or_default().paths.push(id);
        }

        Self {
            markers,
            colors,
            occupied_cells: board.occupancy().len(),
            won: board.is_won(),
            violations: board.invariant_violations(),
        }
    }

    pub fn connected_markers(&self) -> usize {
        self.colors.values().map(|c| c.connected).sum()
    }

    pub fn total_markers(&self) -> usize {
        self.colors.values().map(|c| c.markers).sum()
    }

    /// Writes the report to the log: one line per marker, one per color, then the total.
    pub fn log(&self) {
        for marker in &self.markers {
            match marker.owner {
                Some(path) => info!(cell = %marker.cell, color = marker.color, %path, "connected"),
                None => info!(cell = %marker.cell, color = marker.color, "not connected"),
            }
        }
        for (color, report) in &self.colors {
            info!(
                color,
                connected = report.connected,
                markers = report.markers,
                paths = report.paths.len(),
                "connections"
            );
        }
        info!(
            connected = self.connected_markers(),
            markers = self.total_markers(),
            occupied = self.occupied_cells,
            won = self.won,
            "board"
        );
    }
}

impl fmt::Display for ConnectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}/{} markers connected, {} cells occupied{}",
            self.connected_markers(),
            self.total_markers(),
            self.occupied_cells,
            if self.won { ", won" } else { "" }
        )?;
        for marker in &self.markers {
            let status = if marker.is_connected() { "connected" } else { "not connected" };
            writeln!(f, "  {} color {}: {status}", marker.cell, marker.color)?;
        }
        for (color, report) in &self.colors {
            write!(f, "  color {color}: {}/{}", report.connected, report.markers)?;
            for path in &report.paths {
                write!(f, " {path}")?;
            }
            writeln!(f)?;
        }
        for violation in &self.violations {
            writeln!(f, "  ! {violation}")?;
        }
        Ok(())
    }
}
