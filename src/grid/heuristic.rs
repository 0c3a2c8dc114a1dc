// Distance heuristics for A* (grid units)

use serde::{Deserialize, Serialize};

use super::cell::GridCell;

/// Heuristic used to order A* expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    /// |dx| + |dy|, admissible for 4-directional movement
    Manhattan,
    /// max(|dx|, |dy|), admissible for 8-directional movement
    Chebyshev,
    /// Straight-line distance
    Euclidean,
}

impl Heuristic {
    /// Pick the heuristic consistent with the movement model
    pub fn for_movement(allow_diagonal: bool) -> Self {
        if allow_diagonal {
            Heuristic::Chebyshev
        } else {
            Heuristic::Manhattan
        }
    }

    pub fn estimate(&self, a: GridCell, b: GridCell) -> f32 {
        let dx = (a.col - b.col).abs() as f32;
        let dy = (a.row - b.row).abs() as f32;
        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Chebyshev => dx.max(dy),
            Heuristic::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }
}
