/// Path following shared by every role
///
/// A `PathFollower` owns the cached path of one agent and a cursor into it.
/// The first waypoint of a fresh path is the center of the agent's own cell and
/// is skipped, so the agent never backtracks to its cell center before moving.
/// Waypoints closer than `WAYPOINT_REACH` are consumed.
///
/// When the path is exhausted (or was empty because the goal sits in the
/// agent's own cell) the follower falls back to a final approach: steer
/// straight at the exact goal if it is still beyond the arrival threshold but
/// within one cell.

use crate::config::steering as steering_config;
use crate::geometry::WorldPosition;
use crate::grid::{GridSpec, Path};

#[derive(Debug, Clone, Default)]
pub struct PathFollower {
    path: Path,
    cursor: usize,
    goal: Option<WorldPosition>,
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached path; `goal` is the exact target the path leads to
    pub fn set(&mut self, path: Path, goal: WorldPosition) {
        self.cursor = if path.len() > 1 { 1 } else { 0 };
        self.path = path;
        self.goal = Some(goal);
    }

    pub fn clear(&mut self) {
        self.path = Path::empty();
        self.cursor = 0;
        self.goal = None;
    }

    /// Whole cached path, including consumed waypoints
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn goal(&self) -> Option<WorldPosition> {
        self.goal
    }

    pub fn remaining(&self) -> &[WorldPosition] {
        self.path.waypoints().get(self.cursor..).unwrap_or(&[])
    }

    /// True while unconsumed waypoints remain
    pub fn has_path(&self) -> bool {
        !self.remaining().is_empty()
    }

    /// Pop reached waypoints and return the next one to steer at
    pub fn next_waypoint(&mut self, position: WorldPosition) -> Option<WorldPosition> {
        while let Some(head) = self.remaining().first().copied() {
            if position.distance_to(&head) > steering_config::WAYPOINT_REACH {
                return Some(head);
            }
            self.cursor += 1;
        }
        None
    }

    /// Point to head for this tick, or `None` to hold position
    pub fn steer(
        &mut self,
        position: WorldPosition,
        goal: WorldPosition,
        grid: &GridSpec,
        arrival_threshold: f32,
    ) -> Option<WorldPosition> {
        if let Some(waypoint) = self.next_waypoint(position) {
            return Some(waypoint);
        }

        let remaining = position.distance_to(&goal);
        let within_cell = remaining <= grid.cell_diagonal();
        let reach = arrival_threshold.max(steering_config::WAYPOINT_REACH);
        if remaining > reach && within_cell {
            Some(goal)
        } else {
            None
        }
    }
}
