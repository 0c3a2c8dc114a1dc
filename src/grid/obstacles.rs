// Dynamic obstacle set, rebuilt from world positions each query / tick

use std::collections::HashSet;

use super::cell::{GridCell, GridSpec};
use crate::geometry::WorldPosition;

/// Set of grid cells currently blocked
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    cells: HashSet<GridCell>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from obstacle world positions; positions outside the grid are dropped
    pub fn from_positions<'a, I>(grid: &GridSpec, positions: I) -> Self
    where
        I: IntoIterator<Item = &'a WorldPosition>,
    {
        let cells = positions
            .into_iter()
            .map(|pos| grid.world_to_cell(pos))
            .filter(|cell| grid.is_in_bounds(*cell))
            .collect();
        Self { cells }
    }

    pub fn from_cells<I: IntoIterator<Item = GridCell>>(cells: I) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, cell: GridCell) -> bool {
        self.cells.insert(cell)
    }

    #[inline]
    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }
}
