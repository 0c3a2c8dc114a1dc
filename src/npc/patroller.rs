/// Patroller: cycles an ordered list of waypoints
///
/// On arrival the patroller dwells for the waypoint's wait time, slowly
/// turning to look around, then moves on to the neighbouring waypoint. The
/// cycling direction may flip when leaving a waypoint. Paths are only
/// recomputed when the cached one is exhausted.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::agent::{agent_rng, AgentBehavior, Role};
use super::directive::{DirectiveKind, MotionDirective};
use super::perception::Perception;
use super::status::AgentStatus;
use super::steering::PathFollower;
use crate::config::{steering as steering_config, AiConfig, PatrollerConfig};
use crate::coordination::MessagePayload;
use crate::error::AgentError;
use crate::geometry::{Vec2, WorldPosition};
use crate::grid::{GridPathfinder, Path};
use crate::storage::AgentId;

/// Patrol stop with a dwell time in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: WorldPosition,
    #[serde(default)]
    pub dwell: f32,
}

impl Waypoint {
    pub fn new(x: f32, y: f32, dwell: f32) -> Self {
        Self {
            position: WorldPosition::new(x, y),
            dwell,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Patroller {
    id: AgentId,
    waypoints: Vec<Waypoint>,
    config: PatrollerConfig,
    seed: u64,
    rng: StdRng,

    index: usize,
    /// +1 or -1
    step: isize,
    /// Round time at which the current dwell started
    arrived_at: Option<f32>,
    follower: PathFollower,
    status: AgentStatus,
}

impl Patroller {
    pub fn new(id: AgentId, waypoints: Vec<Waypoint>, config: &AiConfig) -> Result<Self, AgentError> {
        if waypoints.is_empty() {
            return Err(AgentError::NoWaypoints(id));
        }
        if let Some(bad) = waypoints.iter().find(|wp| wp.dwell < 0.0 || wp.dwell.is_nan()) {
            return Err(AgentError::InvalidParameter {
                agent: id,
                reason: format!("negative dwell time {} at waypoint {:?}", bad.dwell, bad.position),
            });
        }

        Ok(Self {
            id,
            waypoints,
            config: config.patroller,
            seed: config.seed,
            rng: agent_rng(config.seed, id),
            index: 0,
            step: 1,
            arrived_at: None,
            follower: PathFollower::new(),
            status: AgentStatus::IDLE,
        })
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_waypoint(&self) -> Waypoint {
        self.waypoints[self.index]
    }

    fn advance(&mut self) {
        if self.rng.random_bool(self.config.reverse_chance) {
            self.step = -self.step;
            trace!(patroller = self.id, step = self.step, "patrol direction reversed");
        }
        let len = self.waypoints.len() as isize;
        self.index = (self.index as isize + self.step).rem_euclid(len) as usize;
        self.arrived_at = None;
        // Cached path leads to the old waypoint
        self.follower.clear();
    }
}

impl AgentBehavior for Patroller {
    fn id(&self) -> AgentId {
        self.id
    }

    fn role(&self) -> Role {
        Role::Patroller
    }

    fn update(&mut self, perception: &Perception<'_>, pathfinder: &GridPathfinder) -> MotionDirective {
        self.status = AgentStatus::empty();
        let mut waypoint = self.current_waypoint();

        if perception.position.distance_to(&waypoint.position) < self.config.arrival_threshold {
            let arrived_at = *self.arrived_at.get_or_insert(perception.now);
            let elapsed = perception.now - arrived_at;

            if elapsed < waypoint.dwell {
                self.status |= AgentStatus::HOLDING | AgentStatus::IDLE;
                let look = Vec2::from_angle(elapsed * steering_config::LOOK_AROUND_RATE);
                return MotionDirective::wait_facing(look);
            }

            self.advance();
            waypoint = self.current_waypoint();
        }

        if !self.follower.has_path() {
            self.status |= AgentStatus::PATHFINDING;
            let path = pathfinder.find_path_in(perception.position, waypoint.position, perception.obstacles);
            self.follower.set(path, waypoint.position);
        }

        match self.follower.steer(
            perception.position,
            waypoint.position,
            pathfinder.grid(),
            self.config.arrival_threshold,
        ) {
            Some(next) => {
                self.status |= AgentStatus::MOVING;
                MotionDirective::toward(DirectiveKind::Patrol, perception.position, next)
            }
            None => {
                self.status |= AgentStatus::IDLE;
                if self.follower.path().is_empty()
                    && perception.position.distance_to(&waypoint.position) > pathfinder.grid().cell_diagonal()
                {
                    self.status |= AgentStatus::BLOCKED;
                }
                MotionDirective::hold()
            }
        }
    }

    fn status(&self) -> AgentStatus {
        self.status
    }

    fn take_report(&mut self) -> Option<MessagePayload> {
        None
    }

    fn cached_path(&self) -> &Path {
        self.follower.path()
    }

    fn reset(&mut self) {
        self.rng = agent_rng(self.seed, self.id);
        self.index = 0;
        self.step = 1;
        self.arrived_at = None;
        self.follower.clear();
        self.status = AgentStatus::IDLE;
    }
}
