use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Integer grid coordinate. `y = 0` is the bottom row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// True when `other` is exactly one axis-aligned step away.
    pub fn is_orthogonal_neighbor(self, other: Cell) -> bool {
        self.manhattan(other) == 1
    }
}

impl Add for Cell {
    type Output = Cell;

    fn add(self, rhs: Cell) -> Self::Output {
        Cell::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Cell {
    type Output = Cell;

    fn sub(self, rhs: Cell) -> Self::Output {
        Cell::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell::new(x, y)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const ZERO: WorldPos = WorldPos { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Cell <-> world conversion for a `width x height` grid anchored at `origin`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridGeometry {
    pub width: i32,
    pub height: i32,
    pub cell_size: f32,
    pub origin: WorldPos,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            cell_size: 1.0,
            origin: WorldPos::ZERO,
        }
    }
}

impl GridGeometry {
    pub fn new(width: i32, height: i32, cell_size: f32, origin: WorldPos) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
        }
    }

    pub fn cell_to_world(&self, cell: Cell) -> WorldPos {
        WorldPos::new(
            self.origin.x + cell.x as f32 * self.cell_size,
            self.origin.y + cell.y as f32 * self.cell_size,
        )
    }

    /// Nearest cell to `pos`. Never fails; the result may lie outside the grid.
    ///
    /// Half-way positions round to the even neighbour on each axis.
    pub fn world_to_cell(&self, pos: WorldPos) -> Cell {
        let rel_x = (pos.x - self.origin.x) / self.cell_size;
        let rel_y = (pos.y - self.origin.y) / self.cell_size;
        Cell::new(rel_x.round_ties_even() as i32, rel_y.round_ties_even() as i32)
    }

    pub fn is_in_grid(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize).saturating_mul(self.height.max(0) as usize)
    }

    /// Every in-grid cell, row by row from the bottom.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x, y)))
    }
}
