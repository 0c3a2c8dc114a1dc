/// Agent roles and per-tick behavior dispatch
///
/// Each role implements [`AgentBehavior`]; [`Agent`] is the closed set of roles
/// the tick loop drives. The role of an agent is fixed at construction.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::blocker::Blocker;
use super::directive::MotionDirective;
use super::hunter::Hunter;
use super::patroller::{Patroller, Waypoint};
use super::perception::Perception;
use super::status::AgentStatus;
use crate::config::AiConfig;
use crate::coordination::MessagePayload;
use crate::error::AgentError;
use crate::geometry::WorldPosition;
use crate::grid::{GridPathfinder, Path};
use crate::storage::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hunter,
    Patroller,
    Blocker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hunter => "hunter",
            Role::Patroller => "patroller",
            Role::Blocker => "blocker",
        }
    }
}

/// Deterministic per-agent RNG
pub(crate) fn agent_rng(seed: u64, id: AgentId) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(id as u64))
}

/// Per-tick decision logic of one agent
pub trait AgentBehavior {
    fn id(&self) -> AgentId;

    fn role(&self) -> Role;

    /// Turn this tick's perception into a motion directive
    ///
    /// Never fails: an empty path means holding position.
    fn update(&mut self, perception: &Perception<'_>, pathfinder: &GridPathfinder) -> MotionDirective;

    /// Flags describing what the last `update` did
    fn status(&self) -> AgentStatus;

    /// Outgoing coordination report produced by the last `update`, if any
    fn take_report(&mut self) -> Option<MessagePayload>;

    fn cached_path(&self) -> &Path;

    /// Restore round-start memory
    fn reset(&mut self);
}

#[derive(Debug, Clone)]
pub enum Agent {
    Hunter(Hunter),
    Patroller(Patroller),
    Blocker(Blocker),
}

impl Agent {
    pub fn hunter(id: AgentId, aggression: f32, config: &AiConfig) -> Result<Self, AgentError> {
        Hunter::new(id, aggression, config).map(Agent::Hunter)
    }

    pub fn patroller(id: AgentId, waypoints: Vec<Waypoint>, config: &AiConfig) -> Result<Self, AgentError> {
        Patroller::new(id, waypoints, config).map(Agent::Patroller)
    }

    pub fn blocker(id: AgentId, points: Vec<WorldPosition>, config: &AiConfig) -> Result<Self, AgentError> {
        Blocker::new(id, points, config).map(Agent::Blocker)
    }

    fn behavior(&self) -> &dyn AgentBehavior {
        match self {
            Agent::Hunter(a) => a,
            Agent::Patroller(a) => a,
            Agent::Blocker(a) => a,
        }
    }

    fn behavior_mut(&mut self) -> &mut dyn AgentBehavior {
        match self {
            Agent::Hunter(a) => a,
            Agent::Patroller(a) => a,
            Agent::Blocker(a) => a,
        }
    }
}

impl AgentBehavior for Agent {
    fn id(&self) -> AgentId {
        self.behavior().id()
    }

    fn role(&self) -> Role {
        self.behavior().role()
    }

    fn update(&mut self, perception: &Perception<'_>, pathfinder: &GridPathfinder) -> MotionDirective {
        self.behavior_mut().update(perception, pathfinder)
    }

    fn status(&self) -> AgentStatus {
        self.behavior().status()
    }

    fn take_report(&mut self) -> Option<MessagePayload> {
        self.behavior_mut().take_report()
    }

    fn cached_path(&self) -> &Path {
        self.behavior().cached_path()
    }

    fn reset(&mut self) {
        self.behavior_mut().reset()
    }
}
