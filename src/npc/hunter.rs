/// Hunter: actively chases the player
///
/// Decision order each tick:
/// - player dead: wander
/// - inside attack radius: `attack` straight at the player, cached path dropped
/// - inside detection radius: chase a short-horizon prediction of the player
///   (or a flank point when a coordinated attack names this hunter), repathing
///   at most once per repath interval
/// - out of range: keep closing on the last known position until patience runs
///   out, then wander
///
/// Shared intel (sightings and coordinated attacks from the inbox) refreshes
/// the last known position and patience.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use super::agent::{agent_rng, AgentBehavior, Role};
use super::directive::{DirectiveKind, MotionDirective};
use super::perception::Perception;
use super::status::AgentStatus;
use super::steering::PathFollower;
use crate::config::{hunter as hunter_config, steering as steering_config, AiConfig, HunterConfig};
use crate::coordination::{MessagePayload, Tactic};
use crate::error::AgentError;
use crate::geometry::{ArenaBounds, Vec2, WorldPosition};
use crate::grid::{GridPathfinder, Path, SearchStatus};
use crate::storage::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunterMode {
    Wander,
    Chase,
    Search,
    Attack,
}

#[derive(Debug, Clone)]
pub struct Hunter {
    id: AgentId,
    /// 0 = cautious, 1 = relentless
    aggression: f32,
    config: HunterConfig,
    bounds: ArenaBounds,
    seed: u64,
    rng: StdRng,

    // Round memory
    mode: HunterMode,
    follower: PathFollower,
    last_player: Option<WorldPosition>,
    /// Player displacement over the last observed tick
    player_motion: Vec2,
    out_of_range: f32,
    since_repath: f32,
    /// Timestamp of the newest shared intel already absorbed
    intel_seen: f32,
    wander_target: Option<WorldPosition>,

    status: AgentStatus,
    report: Option<MessagePayload>,
}

impl Hunter {
    pub fn new(id: AgentId, aggression: f32, config: &AiConfig) -> Result<Self, AgentError> {
        if !(0.0..=1.0).contains(&aggression) {
            return Err(AgentError::InvalidParameter {
                agent: id,
                reason: format!("aggression {aggression} outside 0..=1"),
            });
        }

        Ok(Self {
            id,
            aggression,
            config: config.hunter,
            bounds: config.arena,
            seed: config.seed,
            rng: agent_rng(config.seed, id),
            mode: HunterMode::Wander,
            follower: PathFollower::new(),
            last_player: None,
            player_motion: Vec2::ZERO,
            out_of_range: 0.0,
            since_repath: config.hunter.repath_interval,
            intel_seen: f32::NEG_INFINITY,
            wander_target: None,
            status: AgentStatus::IDLE,
            report: None,
        })
    }

    pub fn aggression(&self) -> f32 {
        self.aggression
    }

    pub fn mode(&self) -> HunterMode {
        self.mode
    }

    pub fn last_known_player(&self) -> Option<WorldPosition> {
        self.last_player
    }

    /// Seconds out of range before giving up, scaled by aggression
    pub fn patience(&self) -> f32 {
        self.config.patience * (1.0 + self.aggression)
    }

    /// Linear extrapolation of the player's last displacement, clamped to the arena
    pub fn predict_player(&self, player: WorldPosition) -> WorldPosition {
        let lead = self.player_motion.scale(self.config.prediction_factor);
        self.bounds.clamp(player.offset(lead))
    }

    fn observe_player(&mut self, player: WorldPosition) {
        self.player_motion = match self.last_player {
            Some(last) => last.delta_to(&player),
            None => Vec2::ZERO,
        };
        self.last_player = Some(player);
        self.out_of_range = 0.0;
    }

    /// Take newer shared sightings into account
    fn absorb_intel(&mut self, perception: &Perception<'_>) {
        if let Some((position, timestamp)) = perception.latest_player_intel() {
            if timestamp > self.intel_seen {
                self.intel_seen = timestamp;
                self.last_player = Some(position);
                self.player_motion = Vec2::ZERO;
                self.out_of_range = 0.0;
                trace!(hunter = self.id, ?position, "absorbed shared player intel");
            }
        }
    }

    /// Flank point for pincer / surround, if this hunter is part of one
    fn flank_point(&self, perception: &Perception<'_>, player: WorldPosition) -> Option<WorldPosition> {
        let (slot, count, tactic) = perception.attack_slot(self.id)?;
        let offset = match tactic {
            Tactic::Pincer => {
                let approach = player.direction_to(&perception.position);
                let side = if slot % 2 == 0 { 1.0 } else { -1.0 };
                let lateral = if approach.is_zero() {
                    Vec2::new(side, 0.0)
                } else {
                    approach.perpendicular().scale(side)
                };
                lateral.scale(self.config.flank_distance)
            }
            Tactic::Surround => {
                let angle = std::f32::consts::TAU * slot as f32 / count.max(1) as f32;
                Vec2::from_angle(angle).scale(self.config.flank_distance)
            }
        };
        Some(self.bounds.clamp(player.offset(offset)))
    }

    /// Throttled path recomputation
    fn repath(
        &mut self,
        perception: &Perception<'_>,
        pathfinder: &GridPathfinder,
        goal: WorldPosition,
        force: bool,
    ) {
        if !force && self.since_repath < self.config.repath_interval {
            return;
        }
        self.since_repath = 0.0;
        self.status |= AgentStatus::PATHFINDING;

        let outcome = pathfinder.search(perception.position, goal, perception.obstacles);
        if !matches!(outcome.status, SearchStatus::Found | SearchStatus::SameCell) {
            self.status |= AgentStatus::BLOCKED;
        }
        self.follower.set(outcome.path, goal);
    }

    fn follow(
        &mut self,
        kind: DirectiveKind,
        perception: &Perception<'_>,
        pathfinder: &GridPathfinder,
        goal: WorldPosition,
    ) -> MotionDirective {
        match self
            .follower
            .steer(perception.position, goal, pathfinder.grid(), steering_config::WAYPOINT_REACH)
        {
            Some(next) => {
                self.status |= AgentStatus::MOVING;
                MotionDirective::toward(kind, perception.position, next)
            }
            None => MotionDirective::hold(),
        }
    }

    fn finish(&mut self, directive: MotionDirective) -> MotionDirective {
        if directive.is_motionless() && !self.status.contains(AgentStatus::ATTACKING) {
            self.status |= AgentStatus::IDLE;
        }
        directive
    }

    fn pick_wander_target(&mut self, from: WorldPosition) -> WorldPosition {
        let r = self.config.wander_radius;
        let dx = self.rng.random_range(-r..=r);
        let dy = self.rng.random_range(-r..=r);
        self.bounds.clamp(WorldPosition::new(from.x + dx, from.y + dy))
    }

    fn wander(&mut self, perception: &Perception<'_>, pathfinder: &GridPathfinder) -> MotionDirective {
        if self.mode != HunterMode::Wander {
            self.mode = HunterMode::Wander;
            self.wander_target = None;
            self.follower.clear();
        }

        let arrived = self
            .wander_target
            .is_some_and(|t| t.distance_to(&perception.position) <= hunter_config::WANDER_ARRIVAL);
        let stuck = !self.follower.has_path() && self.since_repath >= self.config.repath_interval;

        if self.wander_target.is_none() || arrived || stuck {
            let target = self.pick_wander_target(perception.position);
            self.wander_target = Some(target);
            self.repath(perception, pathfinder, target, true);
        }

        match self.wander_target {
            Some(target) => self.follow(DirectiveKind::Patrol, perception, pathfinder, target),
            None => MotionDirective::hold(),
        }
    }
}

impl AgentBehavior for Hunter {
    fn id(&self) -> AgentId {
        self.id
    }

    fn role(&self) -> Role {
        Role::Hunter
    }

    fn update(&mut self, perception: &Perception<'_>, pathfinder: &GridPathfinder) -> MotionDirective {
        self.status = AgentStatus::empty();
        self.since_repath += perception.dt;

        if !perception.player.alive {
            let directive = self.wander(perception, pathfinder);
            return self.finish(directive);
        }

        let player = perception.player.position;
        let distance = perception.distance_to_player();

        if distance < self.config.attack_radius {
            self.status |= AgentStatus::ATTACKING | AgentStatus::DETECTING;
            self.observe_player(player);
            self.mode = HunterMode::Attack;
            self.follower.clear();
            return self.finish(MotionDirective::toward(DirectiveKind::Attack, perception.position, player));
        }

        if distance < self.config.detection_radius {
            self.status |= AgentStatus::DETECTING;
            if self.mode != HunterMode::Chase {
                self.mode = HunterMode::Chase;
                // Newly acquired target: no stale displacement, no throttle wait
                self.last_player = None;
                self.since_repath = self.config.repath_interval;
            }
            self.observe_player(player);

            let goal = self
                .flank_point(perception, player)
                .unwrap_or_else(|| self.predict_player(player));

            let before = self.since_repath;
            self.repath(perception, pathfinder, goal, false);
            if before >= self.config.repath_interval {
                self.report = Some(MessagePayload::PlayerSighting { position: player });
            }

            let directive = self.follow(DirectiveKind::Move, perception, pathfinder, goal);
            return self.finish(directive);
        }

        // Out of own detection range
        self.absorb_intel(perception);
        self.out_of_range += perception.dt;

        match self.last_player {
            Some(last) if self.out_of_range <= self.patience() => {
                if self.mode != HunterMode::Search {
                    self.mode = HunterMode::Search;
                    self.since_repath = self.config.repath_interval;
                }
                self.repath(perception, pathfinder, last, false);
                let directive = self.follow(DirectiveKind::Move, perception, pathfinder, last);
                self.finish(directive)
            }
            _ => {
                let directive = self.wander(perception, pathfinder);
                self.finish(directive)
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
        self.mode = HunterMode::Wander;
        self.follower.clear();
        self.last_player = None;
        self.player_motion = Vec2::ZERO;
        self.out_of_range = 0.0;
        self.since_repath = self.config.repath_interval;
        self.intel_seen = f32::NEG_INFINITY;
        self.wander_target = None;
        self.status = AgentStatus::IDLE;
        self.report = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::{Message, MessageSender};
    use crate::grid::ObstacleSet;
    use crate::world::PlayerState;

    struct Scene {
        obstacles: ObstacleSet,
        inbox: Vec<Message>,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                obstacles: ObstacleSet::new(),
                inbox: Vec::new(),
            }
        }

        fn perception(&self, me: WorldPosition, player: WorldPosition, alive: bool, now: f32) -> Perception<'_> {
            Perception {
                position: me,
                player: PlayerState::new(player, alive),
                obstacles: &self.obstacles,
                agents: &[],
                inbox: &self.inbox,
                now,
                dt: 1.0 / 60.0,
            }
        }
    }

    fn hunter() -> (Hunter, GridPathfinder) {
        let config = AiConfig::default();
        (Hunter::new(0, 0.8, &config).unwrap(), GridPathfinder::from_config(&config))
    }

    #[test]
    fn test_attack_inside_radius() {
        let (mut hunter, pf) = hunter();
        let scene = Scene::new();

        let directive = hunter.update(
            &scene.perception(WorldPosition::new(100.0, 100.0), WorldPosition::new(140.0, 100.0), true, 0.0),
            &pf,
        );

        assert_eq!(directive.kind, DirectiveKind::Attack);
        assert!((directive.direction.x - 1.0).abs() < 0.001);
        assert!(hunter.status().contains(AgentStatus::ATTACKING));
        assert!(hunter.cached_path().is_empty());
    }

    #[test]
    fn test_chase_paths_toward_player_and_reports() {
        let (mut hunter, pf) = hunter();
        let scene = Scene::new();

        let directive = hunter.update(
            &scene.perception(WorldPosition::new(100.0, 100.0), WorldPosition::new(300.0, 100.0), true, 0.0),
            &pf,
        );

        assert_eq!(directive.kind, DirectiveKind::Move);
        assert!(directive.direction.x > 0.5);
        assert!(hunter.status().contains(AgentStatus::DETECTING | AgentStatus::PATHFINDING));
        assert_eq!(hunter.mode(), HunterMode::Chase);
        assert!(matches!(hunter.take_report(), Some(MessagePayload::PlayerSighting { .. })));
        assert!(hunter.take_report().is_none());
    }

    #[test]
    fn test_repath_is_throttled() {
        let (mut hunter, pf) = hunter();
        let scene = Scene::new();
        let me = WorldPosition::new(100.0, 100.0);

        hunter.update(&scene.perception(me, WorldPosition::new(300.0, 100.0), true, 0.0), &pf);
        assert!(hunter.status().contains(AgentStatus::PATHFINDING));

        // 10 ticks later (< 0.5s): still following the cached path
        for tick in 1..=10 {
            hunter.update(&scene.perception(me, WorldPosition::new(300.0, 110.0), true, tick as f32 / 60.0), &pf);
            assert!(!hunter.status().contains(AgentStatus::PATHFINDING));
        }
    }

    #[test]
    fn test_prediction_is_clamped() {
        let (mut hunter, _) = hunter();
        hunter.observe_player(WorldPosition::new(700.0, 300.0));
        hunter.observe_player(WorldPosition::new(760.0, 300.0));

        // 760 + 2 * 60 = 880, clamped to 770
        assert_eq!(hunter.predict_player(WorldPosition::new(760.0, 300.0)), WorldPosition::new(770.0, 300.0));
    }

    #[test]
    fn test_gives_up_after_patience() {
        let (mut hunter, pf) = hunter();
        let scene = Scene::new();
        let me = WorldPosition::new(100.0, 100.0);

        hunter.update(&scene.perception(me, WorldPosition::new(300.0, 100.0), true, 0.0), &pf);

        // Player vanishes far away; patience = 0.5 * 1.8 = 0.9s = 54 ticks
        let far = WorldPosition::new(700.0, 500.0);
        for tick in 1..=50 {
            hunter.update(&scene.perception(me, far, true, tick as f32 / 60.0), &pf);
        }
        assert_eq!(hunter.mode(), HunterMode::Search);

        for tick in 51..=60 {
            hunter.update(&scene.perception(me, far, true, tick as f32 / 60.0), &pf);
        }
        assert_eq!(hunter.mode(), HunterMode::Wander);
    }

    #[test]
    fn test_dead_player_means_wander() {
        let (mut hunter, pf) = hunter();
        let scene = Scene::new();

        let directive = hunter.update(
            &scene.perception(WorldPosition::new(400.0, 300.0), WorldPosition::new(410.0, 300.0), false, 0.0),
            &pf,
        );

        assert_ne!(directive.kind, DirectiveKind::Attack);
        assert_eq!(hunter.mode(), HunterMode::Wander);
    }

    #[test]
    fn test_shared_intel_refreshes_search() {
        let (mut hunter, pf) = hunter();
        let mut scene = Scene::new();
        scene.inbox.push(Message::new(
            MessageSender::Agent(5),
            MessagePayload::PlayerSighting { position: WorldPosition::new(500.0, 400.0) },
            1.0,
            300.0,
        ));

        let directive = hunter.update(
            &scene.perception(WorldPosition::new(100.0, 100.0), WorldPosition::new(700.0, 500.0), true, 1.0),
            &pf,
        );

        assert_eq!(hunter.last_known_player(), Some(WorldPosition::new(500.0, 400.0)));
        assert_eq!(hunter.mode(), HunterMode::Search);
        assert_eq!(directive.kind, DirectiveKind::Move);
    }

    #[test]
    fn test_pincer_flank_offsets_goal() {
        let (mut hunter, pf) = hunter();
        let mut scene = Scene::new();
        let player = WorldPosition::new(400.0, 300.0);
        scene.inbox.push(Message::new(
            MessageSender::System,
            MessagePayload::CoordinatedAttack {
                player_position: player,
                detecting: vec![0, 1],
                tactic: Tactic::Pincer,
            },
            0.0,
            300.0,
        ));

        let me = WorldPosition::new(250.0, 300.0);
        let perception = scene.perception(me, player, true, 0.0);
        let flank = hunter.flank_point(&perception, player).unwrap();
        assert!((flank.distance_to(&player) - 60.0).abs() < 0.01);
        assert!((flank.x - player.x).abs() < 0.01);

        hunter.update(&perception, &pf);
        assert_eq!(hunter.follower.goal(), Some(flank));
    }

    #[test]
    fn test_invalid_aggression_rejected() {
        let config = AiConfig::default();
        assert!(matches!(
            Hunter::new(3, 1.5, &config),
            Err(AgentError::InvalidParameter { agent: 3, .. })
        ));
    }

    #[test]
    fn test_reset_forgets_player() {
        let (mut hunter, pf) = hunter();
        let scene = Scene::new();
        hunter.update(
            &scene.perception(WorldPosition::new(100.0, 100.0), WorldPosition::new(300.0, 100.0), true, 0.0),
            &pf,
        );
        hunter.reset();

        assert!(hunter.last_known_player().is_none());
        assert!(hunter.cached_path().is_empty());
        assert_eq!(hunter.mode(), HunterMode::Wander);
    }
}
