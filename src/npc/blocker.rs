/// Blocker: occupies strategic points to cut off escape routes
///
/// On arrival the blocker holds the point for `block_duration` seconds with a
/// small random idle motion, announces the point to the hub, then picks a
/// different strategic point (preferably one no other agent is standing on).
/// A living player coming within `trap_radius` of the held point is reported
/// once per hold as a sprung trap.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use super::agent::{agent_rng, AgentBehavior, Role};
use super::directive::{DirectiveKind, MotionDirective};
use super::perception::Perception;
use super::status::AgentStatus;
use super::steering::PathFollower;
use crate::config::{AiConfig, BlockerConfig};
use crate::coordination::MessagePayload;
use crate::error::AgentError;
use crate::geometry::{Vec2, WorldPosition};
use crate::grid::{GridPathfinder, Path};
use crate::storage::AgentId;

#[derive(Debug, Clone)]
pub struct Blocker {
    id: AgentId,
    points: Vec<WorldPosition>,
    config: BlockerConfig,
    seed: u64,
    rng: StdRng,

    index: usize,
    /// Round time at which the current hold started
    holding_since: Option<f32>,
    trap_reported: bool,
    follower: PathFollower,
    status: AgentStatus,
    report: Option<MessagePayload>,
}

impl Blocker {
    pub fn new(id: AgentId, points: Vec<WorldPosition>, config: &AiConfig) -> Result<Self, AgentError> {
        if points.is_empty() {
            return Err(AgentError::NoStrategicPoints(id));
        }

        Ok(Self {
            id,
            points,
            config: config.blocker,
            seed: config.seed,
            rng: agent_rng(config.seed, id),
            index: 0,
            holding_since: None,
            trap_reported: false,
            follower: PathFollower::new(),
            status: AgentStatus::IDLE,
            report: None,
        })
    }

    pub fn strategic_points(&self) -> &[WorldPosition] {
        &self.points
    }

    pub fn current_point(&self) -> WorldPosition {
        self.points[self.index]
    }

    pub fn is_holding(&self) -> bool {
        self.holding_since.is_some()
    }

    /// Random point other than the current one, avoiding points other agents occupy
    fn pick_next_point(&mut self, perception: &Perception<'_>) -> usize {
        let n = self.points.len();
        if n == 1 {
            return 0;
        }

        let occupied = |point: &WorldPosition| {
            perception
                .others(self.id)
                .any(|record| record.position.distance_to(point) < self.config.arrival_threshold)
        };

        let free: Vec<usize> = (0..n)
            .filter(|&i| i != self.index && !occupied(&self.points[i]))
            .collect();

        if free.is_empty() {
            let pick = self.rng.random_range(0..n - 1);
            if pick >= self.index {
                pick + 1
            } else {
                pick
            }
        } else {
            free[self.rng.random_range(0..free.len())]
        }
    }

    /// Report the trap once per hold; the arrival report goes out first
    fn check_trap(&mut self, perception: &Perception<'_>, point: WorldPosition) {
        if self.trap_reported || self.report.is_some() || !perception.player.alive {
            return;
        }
        if perception.player.position.distance_to(&point) <= self.config.trap_radius {
            self.status |= AgentStatus::DETECTING;
            self.trap_reported = true;
            self.report = Some(MessagePayload::TrapSet { position: point });
            trace!(blocker = self.id, ?point, "trap sprung");
        }
    }

    fn idle_motion(&mut self, position: WorldPosition) -> MotionDirective {
        let point = self.current_point();
        if self.rng.random_bool(self.config.jitter_chance) {
            let r = self.config.jitter_radius;
            let jitter = Vec2::new(self.rng.random_range(-r..=r), self.rng.random_range(-r..=r));
            let look = position.offset(jitter);
            MotionDirective::new(DirectiveKind::Block, jitter, Some(look))
        } else {
            MotionDirective::new(DirectiveKind::Block, Vec2::ZERO, Some(point))
        }
    }
}

impl AgentBehavior for Blocker {
    fn id(&self) -> AgentId {
        self.id
    }

    fn role(&self) -> Role {
        Role::Blocker
    }

    fn update(&mut self, perception: &Perception<'_>, pathfinder: &GridPathfinder) -> MotionDirective {
        self.status = AgentStatus::empty();
        let mut point = self.current_point();

        if perception.position.distance_to(&point) < self.config.arrival_threshold {
            let since = match self.holding_since {
                Some(since) => since,
                None => {
                    self.holding_since = Some(perception.now);
                    self.trap_reported = false;
                    self.report = Some(MessagePayload::StrategicPoint { point });
                    trace!(blocker = self.id, ?point, "holding strategic point");
                    perception.now
                }
            };

            if perception.now - since < self.config.block_duration {
                self.status |= AgentStatus::HOLDING;
                self.check_trap(perception, point);
                return self.idle_motion(perception.position);
            }

            self.index = self.pick_next_point(perception);
            self.holding_since = None;
            self.follower.clear();
            point = self.current_point();
        } else if self.holding_since.is_some() {
            // Drifted off the point while holding
            self.holding_since = None;
        }

        if !self.follower.has_path() {
            self.status |= AgentStatus::PATHFINDING;
            let path = pathfinder.find_path_in(perception.position, point, perception.obstacles);
            self.follower.set(path, point);
        }

        match self
            .follower
            .steer(perception.position, point, pathfinder.grid(), self.config.arrival_threshold)
        {
            Some(next) => {
                self.status |= AgentStatus::MOVING;
                MotionDirective::toward(DirectiveKind::Move, perception.position, next)
            }
            None => {
                self.status |= AgentStatus::IDLE;
                MotionDirective::hold()
            }
        }
    }

    fn status(&self) -> AgentStatus {
        self.status
    }

    fn take_report(&mut self) -> Option<MessagePayload> {
        self.report.take()
    }

    fn cached_path(&self) -> &Path {
        self.follower.path()
    }

    fn reset(&mut self) {
        self.rng = agent_rng(self.seed, self.id);
        self.index = 0;
        self.holding_since = None;
        self.trap_reported = false;
        self.follower.clear();
        self.status = AgentStatus::IDLE;
        self.report = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ObstacleSet;
    use crate::world::{AgentRecord, PlayerState};

    fn corners() -> Vec<WorldPosition> {
        vec![
            WorldPosition::new(150.0, 150.0),
            WorldPosition::new(550.0, 150.0),
            WorldPosition::new(150.0, 450.0),
            WorldPosition::new(550.0, 450.0),
        ]
    }

    fn perception<'a>(
        obstacles: &'a ObstacleSet,
        agents: &'a [AgentRecord],
        me: WorldPosition,
        now: f32,
    ) -> Perception<'a> {
        Perception {
            position: me,
            player: PlayerState::new(WorldPosition::new(700.0, 500.0), true),
            obstacles,
            agents,
            inbox: &[],
            now,
            dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn test_holds_and_reports_point() {
        let config = AiConfig::default();
        let pf = GridPathfinder::from_config(&config);
        let obstacles = ObstacleSet::new();
        let mut blocker = Blocker::new(9, corners(), &config).unwrap();
        let here = WorldPosition::new(150.0, 150.0);

        let directive = blocker.update(&perception(&obstacles, &[], here, 0.0), &pf);
        assert_eq!(directive.kind, DirectiveKind::Block);
        assert!(blocker.is_holding());
        assert_eq!(
            blocker.take_report(),
            Some(MessagePayload::StrategicPoint { point: here })
        );

        // Announced once per hold
        blocker.update(&perception(&obstacles, &[], here, 1.0), &pf);
        assert!(blocker.take_report().is_none());
        assert!(blocker.status().contains(AgentStatus::HOLDING));
    }

    #[test]
    fn test_moves_to_different_point_after_duration() {
        let config = AiConfig::default();
        let pf = GridPathfinder::from_config(&config);
        let obstacles = ObstacleSet::new();
        let mut blocker = Blocker::new(9, corners(), &config).unwrap();
        let here = WorldPosition::new(150.0, 150.0);

        blocker.update(&perception(&obstacles, &[], here, 0.0), &pf);
        let directive = blocker.update(&perception(&obstacles, &[], here, 5.0), &pf);

        assert_eq!(directive.kind, DirectiveKind::Move);
        assert_ne!(blocker.current_point(), here);
        assert!(!blocker.is_holding());
        assert!(!blocker.cached_path().is_empty());
    }

    #[test]
    fn test_avoids_occupied_points() {
        let config = AiConfig::default();
        let pf = GridPathfinder::from_config(&config);
        let obstacles = ObstacleSet::new();
        let points = vec![
            WorldPosition::new(150.0, 150.0),
            WorldPosition::new(550.0, 150.0),
            WorldPosition::new(150.0, 450.0),
        ];
        let others = [
            AgentRecord::new(1, WorldPosition::new(550.0, 150.0), Role::Blocker),
        ];
        let here = WorldPosition::new(150.0, 150.0);

        for seed in 0..8u64 {
            let mut config = config.clone();
            config.seed = seed;
            let mut blocker = Blocker::new(9, points.clone(), &config).unwrap();
            blocker.update(&perception(&obstacles, &others, here, 0.0), &pf);
            blocker.update(&perception(&obstacles, &others, here, 5.0), &pf);
            assert_eq!(blocker.current_point(), WorldPosition::new(150.0, 450.0));
        }
    }

    #[test]
    fn test_jitter_always_moves_when_certain() {
        let mut config = AiConfig::default();
        config.blocker.jitter_chance = 1.0;
        let pf = GridPathfinder::from_config(&config);
        let obstacles = ObstacleSet::new();
        let mut blocker = Blocker::new(9, corners(), &config).unwrap();

        let directive = blocker.update(&perception(&obstacles, &[], WorldPosition::new(150.0, 150.0), 0.0), &pf);
        assert_eq!(directive.kind, DirectiveKind::Block);
        let target = directive.target.unwrap();
        assert!((target.x - 150.0).abs() <= 10.0 && (target.y - 150.0).abs() <= 10.0);
    }

    #[test]
    fn test_trap_reported_once_per_hold() {
        let config = AiConfig::default();
        let pf = GridPathfinder::from_config(&config);
        let obstacles = ObstacleSet::new();
        let mut blocker = Blocker::new(9, corners(), &config).unwrap();
        let here = WorldPosition::new(150.0, 150.0);
        let mut seen = perception(&obstacles, &[], here, 0.0);
        seen.player = PlayerState::new(WorldPosition::new(250.0, 150.0), true);

        // Arrival tick announces the point, the trap follows on the next tick
        blocker.update(&seen, &pf);
        assert!(matches!(blocker.take_report(), Some(MessagePayload::StrategicPoint { .. })));

        seen.now = 0.1;
        blocker.update(&seen, &pf);
        assert_eq!(blocker.take_report(), Some(MessagePayload::TrapSet { position: here }));
        assert!(blocker.status().contains(AgentStatus::HOLDING | AgentStatus::DETECTING));

        seen.now = 0.2;
        blocker.update(&seen, &pf);
        assert!(blocker.take_report().is_none());

        // A far or dead player never springs it
        let mut blocker = Blocker::new(9, corners(), &config).unwrap();
        let mut dead = perception(&obstacles, &[], here, 0.0);
        dead.player = PlayerState::new(WorldPosition::new(160.0, 150.0), false);
        blocker.update(&dead, &pf);
        blocker.take_report();
        dead.now = 0.1;
        blocker.update(&dead, &pf);
        assert!(blocker.take_report().is_none());
    }

    #[test]
    fn test_requires_points() {
        let config = AiConfig::default();
        assert_eq!(Blocker::new(2, vec![], &config).err(), Some(AgentError::NoStrategicPoints(2)));
    }
}
