// Grid pathfinding module
// World <-> cell conversion, dynamic obstacle sets and bounded A* search

pub mod cell;
pub mod heuristic;
pub mod obstacles;
pub mod pathfinding;

pub use cell::{GridCell, GridSpec};
pub use heuristic::Heuristic;
pub use obstacles::ObstacleSet;
pub use pathfinding::{GridPathfinder, Path, SearchOutcome, SearchStatus};
