/// Grid geometry: discrete cells and world <-> cell conversion
///
/// Cells are addressed by (col, row) starting at the arena origin. A world
/// position belongs to the cell obtained by floor-dividing each axis by the
/// cell size. Cells map back to world space through their **center**, which
/// is the convention every path waypoint uses.

use serde::{Deserialize, Serialize};

use crate::geometry::WorldPosition;

/// Cell coordinates in the arena grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub col: i32,
    pub row: i32,
}

impl GridCell {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    #[inline]
    pub fn offset(&self, dc: i32, dr: i32) -> GridCell {
        GridCell::new(self.col + dc, self.row + dr)
    }

    /// True when `other` is one of the 8 surrounding cells
    pub fn is_adjacent(&self, other: &GridCell) -> bool {
        let dc = (self.col - other.col).abs();
        let dr = (self.row - other.row).abs();
        dc <= 1 && dr <= 1 && (dc + dr) > 0
    }

    /// True when `other` differs on both axes by exactly one
    pub fn is_diagonal_to(&self, other: &GridCell) -> bool {
        (self.col - other.col).abs() == 1 && (self.row - other.row).abs() == 1
    }
}

/// Grid dimensions and cell size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub columns: i32,
    pub rows: i32,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl GridSpec {
    pub fn new(columns: i32, rows: i32, cell_width: f32, cell_height: f32) -> Self {
        Self {
            columns,
            rows,
            cell_width,
            cell_height,
        }
    }

    /// Square cells
    pub fn square(columns: i32, rows: i32, cell_size: f32) -> Self {
        Self::new(columns, rows, cell_size, cell_size)
    }

    /// Convert world position to cell coordinate
    #[inline]
    pub fn world_to_cell(&self, pos: &WorldPosition) -> GridCell {
        GridCell {
            col: (pos.x / self.cell_width).floor() as i32,
            row: (pos.y / self.cell_height).floor() as i32,
        }
    }

    /// Center of a cell in world coordinates
    #[inline]
    pub fn cell_center(&self, cell: GridCell) -> WorldPosition {
        WorldPosition::new(
            (cell.col as f32 + 0.5) * self.cell_width,
            (cell.row as f32 + 0.5) * self.cell_height,
        )
    }

    /// Check if cell coordinates are within grid bounds
    #[inline]
    pub fn is_in_bounds(&self, cell: GridCell) -> bool {
        cell.col >= 0 && cell.col < self.columns && cell.row >= 0 && cell.row < self.rows
    }

    /// Diagonal size of one cell ("within one cell" tolerance)
    pub fn cell_diagonal(&self) -> f32 {
        (self.cell_width * self.cell_width + self.cell_height * self.cell_height).sqrt()
    }

    /// Arena extent covered by the grid, in pixels
    pub fn world_size(&self) -> (f32, f32) {
        (
            self.columns as f32 * self.cell_width,
            self.rows as f32 * self.cell_height,
        )
    }

    pub fn total_cells(&self) -> usize {
        (self.columns.max(0) * self.rows.max(0)) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_to_cell_floor_division() {
        let grid = GridSpec::new(20, 15, 40.0, 58.0);
        assert_eq!(grid.world_to_cell(&WorldPosition::new(0.0, 0.0)), GridCell::new(0, 0));
        assert_eq!(grid.world_to_cell(&WorldPosition::new(39.9, 57.9)), GridCell::new(0, 0));
        assert_eq!(grid.world_to_cell(&WorldPosition::new(40.0, 58.0)), GridCell::new(1, 1));
        assert_eq!(grid.world_to_cell(&WorldPosition::new(-1.0, 10.0)), GridCell::new(-1, 0));
    }

    #[test]
    fn test_cell_center_round_trip() {
        let grid = GridSpec::square(20, 15, 40.0);
        let cell = GridCell::new(19, 14);
        let center = grid.cell_center(cell);
        assert_eq!(center, WorldPosition::new(780.0, 580.0));
        assert_eq!(grid.world_to_cell(&center), cell);
    }

    #[test]
    fn test_bounds() {
        let grid = GridSpec::square(20, 15, 40.0);
        assert!(grid.is_in_bounds(GridCell::new(0, 0)));
        assert!(grid.is_in_bounds(GridCell::new(19, 14)));
        assert!(!grid.is_in_bounds(GridCell::new(20, 0)));
        assert!(!grid.is_in_bounds(GridCell::new(0, -1)));
        assert_eq!(grid.world_size(), (800.0, 600.0));
    }

    #[test]
    fn test_adjacency() {
        let c = GridCell::new(5, 5);
        assert!(c.is_adjacent(&GridCell::new(6, 6)));
        assert!(c.is_diagonal_to(&GridCell::new(4, 6)));
        assert!(!c.is_diagonal_to(&GridCell::new(5, 6)));
        assert!(!c.is_adjacent(&c));
        assert!(!c.is_adjacent(&GridCell::new(7, 5)));
    }
}
