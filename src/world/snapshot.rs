/// Per-tick read-only world state consumed by agents and the coordination hub
///
/// The host fills one `WorldSnapshot` at the start of every tick. Everything
/// the AI layer decides during that tick is derived from it; nothing in here is
/// mutated by agents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::geometry::WorldPosition;
use crate::grid::{GridSpec, ObstacleSet};
use crate::npc::Role;
use crate::storage::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: WorldPosition,
    #[serde(default = "default_alive")]
    pub alive: bool,
}

fn default_alive() -> bool {
    true
}

impl PlayerState {
    pub fn new(position: WorldPosition, alive: bool) -> Self {
        Self { position, alive }
    }
}

/// One adversarial agent as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub position: WorldPosition,
    pub role: Role,
}

impl AgentRecord {
    pub fn new(id: AgentId, position: WorldPosition, role: Role) -> Self {
        Self { id, position, role }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub player: PlayerState,
    /// Dynamic obstacle positions (grid-aligned ice blocks)
    #[serde(default)]
    pub obstacles: Vec<WorldPosition>,
    #[serde(default)]
    pub agents: Vec<AgentRecord>,
    /// Round timer in seconds
    #[serde(default)]
    pub timer: f32,
}

impl WorldSnapshot {
    pub fn new(player: PlayerState, timer: f32) -> Self {
        Self {
            player,
            obstacles: Vec::new(),
            agents: Vec::new(),
            timer,
        }
    }

    pub fn with_obstacles(mut self, obstacles: Vec<WorldPosition>) -> Self {
        self.obstacles = obstacles;
        self
    }

    pub fn with_agents(mut self, agents: Vec<AgentRecord>) -> Self {
        self.agents = agents;
        self
    }

    /// Parse a host snapshot; agent ids must be unique
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: WorldSnapshot = serde_json::from_str(json)?;

        let mut seen = HashSet::with_capacity(snapshot.agents.len());
        for record in &snapshot.agents {
            if !seen.insert(record.id) {
                return Err(SnapshotError::DuplicateAgent(record.id));
            }
        }

        Ok(snapshot)
    }

    /// Blocked cells for this tick
    pub fn obstacle_set(&self, grid: &GridSpec) -> ObstacleSet {
        ObstacleSet::from_positions(grid, &self.obstacles)
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentRecord> {
        self.agents.iter().find(|record| record.id == id)
    }

    /// `(id, position)` pairs in snapshot order
    pub fn agent_positions(&self) -> Vec<(AgentId, WorldPosition)> {
        self.agents.iter().map(|record| (record.id, record.position)).collect()
    }
}
