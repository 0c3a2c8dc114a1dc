use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::{debug, trace};

use super::cell::{GridCell, GridSpec};
use super::heuristic::Heuristic;
use super::obstacles::ObstacleSet;
use crate::config::{pathfinding as path_config, AiConfig};
use crate::geometry::WorldPosition;

/// Step cost for an orthogonal move (grid units)
pub const ORTHOGONAL_COST: f32 = 1.0;
/// Step cost for a diagonal move (grid units)
pub const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// 4 orthogonal directions first, then the 4 diagonals
const DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),  // Up
    (1, 0),   // Right
    (0, 1),   // Down
    (-1, 0),  // Left
    (1, -1),  // Up-right
    (1, 1),   // Down-right
    (-1, 1),  // Down-left
    (-1, -1), // Up-left
];

// ============================================================================
// PATH
// ============================================================================

/// Ordered world waypoints from start to goal (cell centers)
///
/// An empty path means "no motion this tick", never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    waypoints: Vec<WorldPosition>,
}

impl Path {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_waypoints(waypoints: Vec<WorldPosition>) -> Self {
        Self { waypoints }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn waypoints(&self) -> &[WorldPosition] {
        &self.waypoints
    }

    pub fn first(&self) -> Option<&WorldPosition> {
        self.waypoints.first()
    }

    pub fn last(&self) -> Option<&WorldPosition> {
        self.waypoints.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorldPosition> {
        self.waypoints.iter()
    }

    pub fn into_waypoints(self) -> Vec<WorldPosition> {
        self.waypoints
    }

    /// Per-step costs in grid units (1 orthogonal, sqrt(2) diagonal)
    pub fn step_costs(&self, grid: &GridSpec) -> Vec<f32> {
        self.waypoints
            .windows(2)
            .map(|pair| {
                let a = grid.world_to_cell(&pair[0]);
                let b = grid.world_to_cell(&pair[1]);
                if a.is_diagonal_to(&b) {
                    DIAGONAL_COST
                } else {
                    ORTHOGONAL_COST
                }
            })
            .collect()
    }

    /// Total cost in grid units
    pub fn cost(&self, grid: &GridSpec) -> f32 {
        self.step_costs(grid).iter().sum()
    }

    /// Arc length in world pixels
    pub fn world_length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a WorldPosition;
    type IntoIter = std::slice::Iter<'a, WorldPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.iter()
    }
}

// ============================================================================
// SEARCH DIAGNOSTICS
// ============================================================================

/// Why a search produced the path it did
///
/// Only visible through [`GridPathfinder::search`]; `find_path` collapses every
/// non-`Found` status into an empty path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Found,
    /// Start and goal share a cell, nothing to plan
    SameCell,
    /// An endpoint is off-grid or inside an obstacle (no search performed)
    InvalidEndpoint,
    /// Open set exhausted
    Unreachable,
    /// Iteration cap hit before reaching the goal
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub path: Path,
    pub status: SearchStatus,
    /// Number of cells expanded (closed)
    pub expanded: usize,
    /// Cost of the returned path in grid units (0 when empty)
    pub cost: f32,
}

impl SearchOutcome {
    fn failed(status: SearchStatus, expanded: usize) -> Self {
        Self {
            path: Path::empty(),
            status,
            expanded,
            cost: 0.0,
        }
    }
}

// ============================================================================
// A* CORE
// ============================================================================

/// A* node for priority queue
#[derive(Debug, Clone)]
struct OpenNode {
    cell: GridCell,
    g_cost: f32,
    h_cost: f32,
    /// Insertion order, last tie-breaker
    seq: u64,
}

impl OpenNode {
    fn f_cost(&self) -> f32 {
        self.g_cost + self.h_cost
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    // BinaryHeap is a max-heap: reverse so the lowest f (then h, then seq) pops first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost()
            .total_cmp(&self.f_cost())
            .then_with(|| other.h_cost.total_cmp(&self.h_cost))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Bounded A* over a grid with a dynamic obstacle set
#[derive(Debug, Clone)]
pub struct GridPathfinder {
    grid: GridSpec,
    iteration_cap: usize,
    allow_diagonal: bool,
    heuristic: Heuristic,
}

impl GridPathfinder {
    /// Pathfinder with default cap and 8-directional movement
    pub fn new(grid: GridSpec) -> Self {
        Self {
            grid,
            iteration_cap: path_config::ITERATION_CAP,
            allow_diagonal: path_config::ALLOW_DIAGONAL,
            heuristic: Heuristic::for_movement(path_config::ALLOW_DIAGONAL),
        }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        let pf = &config.pathfinding;
        Self {
            grid: config.grid.spec(),
            iteration_cap: pf.iteration_cap.max(1),
            allow_diagonal: pf.allow_diagonal,
            heuristic: pf
                .heuristic
                .unwrap_or_else(|| Heuristic::for_movement(pf.allow_diagonal)),
        }
    }

    pub fn with_iteration_cap(mut self, cap: usize) -> Self {
        self.iteration_cap = cap.max(1);
        self
    }

    /// Toggle diagonal movement; also resets the heuristic to the matching default
    pub fn with_diagonal(mut self, allow_diagonal: bool) -> Self {
        self.allow_diagonal = allow_diagonal;
        self.heuristic = Heuristic::for_movement(allow_diagonal);
        self
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn iteration_cap(&self) -> usize {
        self.iteration_cap
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Find a path between two world positions, rebuilding the obstacle set
    /// from raw obstacle positions.
    pub fn find_path(
        &self,
        start: WorldPosition,
        goal: WorldPosition,
        obstacles: &[WorldPosition],
    ) -> Path {
        let obstacle_set = ObstacleSet::from_positions(&self.grid, obstacles);
        self.find_path_in(start, goal, &obstacle_set)
    }

    /// Find a path against a prebuilt obstacle set
    pub fn find_path_in(
        &self,
        start: WorldPosition,
        goal: WorldPosition,
        obstacles: &ObstacleSet,
    ) -> Path {
        self.search(start, goal, obstacles).path
    }

    /// Run the search and keep the diagnostic status
    pub fn search(
        &self,
        start: WorldPosition,
        goal: WorldPosition,
        obstacles: &ObstacleSet,
    ) -> SearchOutcome {
        let start_cell = self.grid.world_to_cell(&start);
        let goal_cell = self.grid.world_to_cell(&goal);

        if !self.grid.is_in_bounds(start_cell) || !self.grid.is_in_bounds(goal_cell) {
            debug!(?start_cell, ?goal_cell, "find_path: endpoint out of bounds");
            return SearchOutcome::failed(SearchStatus::InvalidEndpoint, 0);
        }

        if obstacles.contains(start_cell) || obstacles.contains(goal_cell) {
            debug!(?start_cell, ?goal_cell, "find_path: endpoint inside obstacle");
            return SearchOutcome::failed(SearchStatus::InvalidEndpoint, 0);
        }

        if start_cell == goal_cell {
            return SearchOutcome::failed(SearchStatus::SameCell, 0);
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
        let mut g_score: HashMap<GridCell, f32> = HashMap::new();
        let mut closed_set: HashSet<GridCell> = HashSet::new();
        let mut seq: u64 = 0;
        let mut expanded = 0usize;

        g_score.insert(start_cell, 0.0);
        open_set.push(OpenNode {
            cell: start_cell,
            g_cost: 0.0,
            h_cost: self.heuristic.estimate(start_cell, goal_cell),
            seq,
        });

        while let Some(current) = open_set.pop() {
            // Stale heap entry for an already-expanded cell
            if closed_set.contains(&current.cell) {
                continue;
            }

            if current.cell == goal_cell {
                let path = self.reconstruct_path(&came_from, goal_cell);
                trace!(
                    expanded,
                    waypoints = path.len(),
                    cost = current.g_cost,
                    "find_path: reached goal"
                );
                return SearchOutcome {
                    path,
                    status: SearchStatus::Found,
                    expanded,
                    cost: current.g_cost,
                };
            }

            if expanded >= self.iteration_cap {
                debug!(
                    ?start_cell,
                    ?goal_cell,
                    cap = self.iteration_cap,
                    "find_path: iteration cap reached, abandoning search"
                );
                return SearchOutcome::failed(SearchStatus::Abandoned, expanded);
            }

            closed_set.insert(current.cell);
            expanded += 1;

            for (neighbor, step_cost) in self.neighbors(current.cell, obstacles) {
                if closed_set.contains(&neighbor) {
                    continue;
                }

                let tentative_g = current.g_cost + step_cost;
                if tentative_g < *g_score.get(&neighbor).unwrap_or(&f32::INFINITY) {
                    came_from.insert(neighbor, current.cell);
                    g_score.insert(neighbor, tentative_g);
                    seq += 1;
                    open_set.push(OpenNode {
                        cell: neighbor,
                        g_cost: tentative_g,
                        h_cost: self.heuristic.estimate(neighbor, goal_cell),
                        seq,
                    });
                }
            }
        }

        debug!(?start_cell, ?goal_cell, expanded, "find_path: goal unreachable");
        SearchOutcome::failed(SearchStatus::Unreachable, expanded)
    }

    /// Walkable neighbors with their step cost
    fn neighbors(&self, cell: GridCell, obstacles: &ObstacleSet) -> Vec<(GridCell, f32)> {
        let directions = if self.allow_diagonal {
            &DIRECTIONS[..]
        } else {
            &DIRECTIONS[..4]
        };

        let is_free = |c: GridCell| self.grid.is_in_bounds(c) && !obstacles.contains(c);

        directions
            .iter()
            .filter_map(|&(dc, dr)| {
                let neighbor = cell.offset(dc, dr);
                if !is_free(neighbor) {
                    return None;
                }

                if dc != 0 && dr != 0 {
                    // NO CORNER-CUTTING: both orthogonal cells flanking the
                    // diagonal move must be free
                    if !is_free(cell.offset(dc, 0)) || !is_free(cell.offset(0, dr)) {
                        return None;
                    }
                    Some((neighbor, DIAGONAL_COST))
                } else {
                    Some((neighbor, ORTHOGONAL_COST))
                }
            })
            .collect()
    }

    /// Reconstruct path from A* came_from map, start -> goal, as cell centers
    fn reconstruct_path(&self, came_from: &HashMap<GridCell, GridCell>, goal: GridCell) -> Path {
        let mut cells = vec![goal];
        let mut current = goal;
        while let Some(&prev) = came_from.get(&current) {
            cells.push(prev);
            current = prev;
        }
        cells.reverse();

        Path::from_waypoints(cells.into_iter().map(|c| self.grid.cell_center(c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pathfinder_10x10() -> GridPathfinder {
        GridPathfinder::new(GridSpec::square(10, 10, 10.0))
    }

    fn cells_of(path: &Path, grid: &GridSpec) -> Vec<GridCell> {
        path.iter().map(|p| grid.world_to_cell(p)).collect()
    }

    #[test]
    fn test_simple_path() {
        let pf = pathfinder_10x10();
        let start = WorldPosition::new(0.0, 0.0);
        let goal = WorldPosition::new(90.0, 90.0);

        let path = pf.find_path(start, goal, &[]);

        assert!(!path.is_empty());
        let cell = pf.grid().cell_diagonal();
        assert!(path.first().unwrap().distance_to(&start) <= cell);
        assert!(path.last().unwrap().distance_to(&goal) <= cell);
    }

    #[test]
    fn test_every_open_pair_is_reachable() {
        let grids = [
            GridSpec::square(10, 10, 10.0),
            GridSpec::square(20, 15, 40.0),
            GridSpec::new(20, 15, 40.0, 58.0),
            GridSpec::new(7, 3, 25.0, 10.0),
        ];

        for grid in grids {
            let (w, h) = grid.world_size();
            let (right, bottom) = (w - 0.01, h - 0.01);
            // Corners, edge midpoints and the middle
            let probes = [
                WorldPosition::new(0.0, 0.0),
                WorldPosition::new(right, 0.0),
                WorldPosition::new(0.0, bottom),
                WorldPosition::new(right, bottom),
                WorldPosition::new(w * 0.5, 0.0),
                WorldPosition::new(0.0, h * 0.5),
                WorldPosition::new(right, h * 0.5),
                WorldPosition::new(w * 0.5, bottom),
                WorldPosition::new(w * 0.5, h * 0.5),
            ];

            for pf in [GridPathfinder::new(grid), GridPathfinder::new(grid).with_diagonal(false)] {
                let tolerance = grid.cell_diagonal();
                for start in probes {
                    for goal in probes {
                        if grid.world_to_cell(&start) == grid.world_to_cell(&goal) {
                            continue;
                        }
                        let path = pf.find_path(start, goal, &[]);
                        assert!(!path.is_empty(), "{start:?} -> {goal:?} on {grid:?}");
                        assert!(path.first().unwrap().distance_to(&start) <= tolerance);
                        assert!(path.last().unwrap().distance_to(&goal) <= tolerance);
                    }
                }
            }
        }
    }

    #[test]
    fn test_open_grid_is_cost_optimal() {
        let pf = pathfinder_10x10();
        let outcome = pf.search(
            WorldPosition::new(5.0, 5.0),
            WorldPosition::new(95.0, 95.0),
            &ObstacleSet::new(),
        );

        assert_eq!(outcome.status, SearchStatus::Found);
        // 9 diagonal steps
        assert_eq!(outcome.path.len(), 10);
        assert!((outcome.cost - 9.0 * DIAGONAL_COST).abs() < 0.001);
        assert!((outcome.path.cost(pf.grid()) - outcome.cost).abs() < 0.001);
    }

    #[test]
    fn test_path_with_obstacles() {
        let pf = pathfinder_10x10();
        let obstacles = [
            WorldPosition::new(40.0, 40.0),
            WorldPosition::new(40.0, 50.0),
            WorldPosition::new(50.0, 40.0),
            WorldPosition::new(50.0, 50.0),
        ];

        let path = pf.find_path(WorldPosition::new(0.0, 0.0), WorldPosition::new(90.0, 90.0), &obstacles);

        assert!(!path.is_empty());
        let blocked = ObstacleSet::from_positions(pf.grid(), &obstacles);
        for cell in cells_of(&path, pf.grid()) {
            assert!(!blocked.contains(cell));
        }
    }

    #[test]
    fn test_no_path_through_wall() {
        let pf = pathfinder_10x10();
        let wall: Vec<WorldPosition> = (0..10).map(|row| WorldPosition::new(50.0, row as f32 * 10.0)).collect();

        let outcome = pf.search(
            WorldPosition::new(0.0, 0.0),
            WorldPosition::new(90.0, 90.0),
            &ObstacleSet::from_positions(pf.grid(), &wall),
        );

        assert!(outcome.path.is_empty());
        assert_eq!(outcome.status, SearchStatus::Unreachable);
        assert!(pf.find_path(WorldPosition::new(0.0, 0.0), WorldPosition::new(90.0, 90.0), &wall).is_empty());
    }

    #[test]
    fn test_diagonal_movement() {
        let pf = GridPathfinder::new(GridSpec::square(20, 15, 40.0));
        let start = WorldPosition::new(0.0, 0.0);
        let goal = WorldPosition::new(760.0, 560.0);

        let path = pf.find_path(start, goal, &[]);

        assert!(path.last().unwrap().distance_to(&goal) <= pf.grid().cell_diagonal());
        let cells = cells_of(&path, pf.grid());
        assert!(cells.windows(2).any(|w| w[0].is_diagonal_to(&w[1])));
    }

    #[test]
    fn test_consecutive_cells_connected() {
        let pf = GridPathfinder::new(GridSpec::square(20, 15, 40.0));
        let obstacles: Vec<WorldPosition> = (2..12).map(|row| WorldPosition::new(400.0, row as f32 * 40.0)).collect();
        let path = pf.find_path(WorldPosition::new(20.0, 300.0), WorldPosition::new(780.0, 300.0), &obstacles);

        assert!(!path.is_empty());
        let cells = cells_of(&path, pf.grid());
        assert!(cells.windows(2).all(|w| w[0].is_adjacent(&w[1])));
    }

    #[test]
    fn test_no_corner_cutting() {
        let pf = pathfinder_10x10();
        let grid = *pf.grid();

        // Start at (0,0) with both orthogonal cells of the diagonal blocked
        let blocked = ObstacleSet::from_cells([GridCell::new(1, 0), GridCell::new(0, 1)]);
        let path = pf.find_path_in(grid.cell_center(GridCell::new(0, 0)), grid.cell_center(GridCell::new(5, 5)), &blocked);
        assert!(path.is_empty());

        // Staggered obstacles: every diagonal step must have both flankers free
        let blocked = ObstacleSet::from_cells([
            GridCell::new(3, 2),
            GridCell::new(2, 3),
            GridCell::new(5, 4),
            GridCell::new(6, 6),
            GridCell::new(4, 6),
        ]);
        let path = pf.find_path_in(grid.cell_center(GridCell::new(0, 0)), grid.cell_center(GridCell::new(9, 9)), &blocked);
        assert!(!path.is_empty());

        for w in cells_of(&path, &grid).windows(2) {
            if w[0].is_diagonal_to(&w[1]) {
                let dc = w[1].col - w[0].col;
                let dr = w[1].row - w[0].row;
                assert!(!blocked.contains(w[0].offset(dc, 0)));
                assert!(!blocked.contains(w[0].offset(0, dr)));
            }
        }
    }

    #[test]
    fn test_cumulative_cost_non_decreasing() {
        let pf = GridPathfinder::new(GridSpec::square(20, 15, 40.0));
        let obstacles = [WorldPosition::new(200.0, 200.0), WorldPosition::new(240.0, 240.0)];
        let path = pf.find_path(WorldPosition::new(10.0, 10.0), WorldPosition::new(700.0, 500.0), &obstacles);

        let mut cumulative = 0.0;
        for step in path.step_costs(pf.grid()) {
            assert!(step > 0.0);
            let next = cumulative + step;
            assert!(next >= cumulative);
            cumulative = next;
        }
    }

    #[test]
    fn test_invalid_endpoints() {
        let pf = pathfinder_10x10();
        let obstacles = ObstacleSet::from_cells([GridCell::new(5, 5)]);

        let inside = pf.search(WorldPosition::new(0.0, 0.0), WorldPosition::new(55.0, 55.0), &obstacles);
        assert_eq!(inside.status, SearchStatus::InvalidEndpoint);
        assert_eq!(inside.expanded, 0);

        let off_grid = pf.search(WorldPosition::new(0.0, 0.0), WorldPosition::new(150.0, 5.0), &obstacles);
        assert_eq!(off_grid.status, SearchStatus::InvalidEndpoint);

        let negative = pf.search(WorldPosition::new(-5.0, 0.0), WorldPosition::new(50.0, 5.0), &obstacles);
        assert!(negative.path.is_empty());
    }

    #[test]
    fn test_same_cell_is_empty() {
        let pf = pathfinder_10x10();
        let outcome = pf.search(WorldPosition::new(1.0, 1.0), WorldPosition::new(8.0, 8.0), &ObstacleSet::new());
        assert_eq!(outcome.status, SearchStatus::SameCell);
        assert!(outcome.path.is_empty());
    }

    #[test]
    fn test_iteration_cap_abandons() {
        let pf = GridPathfinder::new(GridSpec::square(20, 15, 40.0)).with_iteration_cap(1);
        let outcome = pf.search(WorldPosition::new(0.0, 0.0), WorldPosition::new(760.0, 560.0), &ObstacleSet::new());

        assert_eq!(outcome.status, SearchStatus::Abandoned);
        assert!(outcome.path.is_empty());
        assert!(outcome.expanded <= 1);
    }

    #[test]
    fn test_four_directional_mode() {
        let pf = pathfinder_10x10().with_diagonal(false);
        assert_eq!(pf.heuristic(), Heuristic::Manhattan);

        let path = pf.find_path(WorldPosition::new(0.0, 0.0), WorldPosition::new(90.0, 90.0), &[]);
        let cells = cells_of(&path, pf.grid());

        assert_eq!(cells.len(), 19);
        assert!(cells.windows(2).all(|w| !w[0].is_diagonal_to(&w[1])));
    }

    #[test]
    fn test_search_is_deterministic() {
        let pf = GridPathfinder::new(GridSpec::square(20, 15, 40.0)).with_heuristic(Heuristic::Euclidean);
        let obstacles = ObstacleSet::from_cells((3..10).map(|r| GridCell::new(8, r)));
        let a = pf.find_path_in(WorldPosition::new(30.0, 300.0), WorldPosition::new(700.0, 300.0), &obstacles);
        let b = pf.find_path_in(WorldPosition::new(30.0, 300.0), WorldPosition::new(700.0, 300.0), &obstacles);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_config_non_square_cells() {
        let mut config = AiConfig::default();
        config.grid.cell_size = (40.0, 58.0);
        config.pathfinding.allow_diagonal = false;
        let pf = GridPathfinder::from_config(&config);

        assert_eq!(pf.heuristic(), Heuristic::Manhattan);
        let path = pf.find_path(WorldPosition::new(10.0, 10.0), WorldPosition::new(100.0, 130.0), &[]);
        // (0,0) -> (2,2): 4 orthogonal steps
        assert_eq!(path.len(), 5);
        assert_eq!(*path.last().unwrap(), WorldPosition::new(100.0, 145.0));
    }
}
