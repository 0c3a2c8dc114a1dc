/// Headless simulation runner
///
/// Drives [`ArenaSimulation`] with a scripted player for a fixed simulated
/// duration, integrates agent motion from the directives, detects catches and
/// collects [`SimulationMetrics`]. A catch ends the round: agents and the hub
/// are reset and everyone respawns.

use std::path::Path as FsPath;
use std::time::Instant;

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::metrics::{MetricsCollector, SimulationMetrics};
use super::player::{PlayerStrategy, ScriptedPlayer};
use super::tick::{ArenaSimulation, TickOutput, TickReport};
use crate::config::AiConfig;
use crate::error::{ConfigError, RunnerError};
use crate::geometry::WorldPosition;
use crate::grid::{GridSpec, ObstacleSet};
use crate::npc::{Agent, AgentBehavior, DirectiveKind, Role, Waypoint};
use crate::storage::SpatialHash;
use crate::world::{AgentRecord, PlayerState, WorldSnapshot};

/// Obstacle layout of the test map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleDensity {
    Low,
    Medium,
    High,
}

impl ObstacleDensity {
    pub fn layout(&self) -> Vec<WorldPosition> {
        match self {
            ObstacleDensity::Low => vec![WorldPosition::new(300.0, 300.0), WorldPosition::new(400.0, 400.0)],
            ObstacleDensity::Medium => [200.0, 400.0]
                .iter()
                .flat_map(|&y| [200.0, 400.0, 600.0].into_iter().map(move |x| WorldPosition::new(x, y)))
                .collect(),
            ObstacleDensity::High => (0..10)
                .flat_map(|i| (0..4).map(move |j| WorldPosition::new(200.0 + 40.0 * i as f32, 200.0 + 58.0 * j as f32)))
                .collect(),
        }
    }
}

const PLAYER_START: WorldPosition = WorldPosition { x: 400.0, y: 300.0 };
const PROGRESS_EVERY: u64 = 600;

fn patrol_route() -> Vec<Waypoint> {
    vec![
        Waypoint::new(200.0, 200.0, 1.0),
        Waypoint::new(400.0, 200.0, 0.5),
        Waypoint::new(400.0, 400.0, 1.0),
        Waypoint::new(200.0, 400.0, 0.5),
    ]
}

fn strategic_points() -> Vec<WorldPosition> {
    vec![
        WorldPosition::new(150.0, 150.0),
        WorldPosition::new(550.0, 150.0),
        WorldPosition::new(150.0, 450.0),
        WorldPosition::new(550.0, 450.0),
    ]
}

fn fruits() -> Vec<WorldPosition> {
    vec![
        WorldPosition::new(100.0, 100.0),
        WorldPosition::new(700.0, 100.0),
        WorldPosition::new(100.0, 500.0),
        WorldPosition::new(700.0, 500.0),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub num_hunters: usize,
    pub num_patrollers: usize,
    pub num_blockers: usize,
    /// Simulated seconds
    pub simulation_duration: f32,
    pub player_strategy: PlayerStrategy,
    pub map_obstacles: ObstacleDensity,
    /// An agent closer than this catches the player
    pub capture_distance: f32,
    /// Agent movement speed (pixels per second)
    pub agent_speed: f32,
    pub ai: AiConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            num_hunters: 2,
            num_patrollers: 1,
            num_blockers: 1,
            simulation_duration: 60.0,
            player_strategy: PlayerStrategy::Evasive,
            map_obstacles: ObstacleDensity::Medium,
            capture_distance: 40.0,
            agent_speed: 120.0,
            ai: AiConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RunnerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ai.validate()?;
        if self.simulation_duration <= 0.0 {
            return Err(ConfigError::Invalid("simulation_duration must be positive".into()));
        }
        if self.capture_distance <= 0.0 || self.agent_speed <= 0.0 {
            return Err(ConfigError::Invalid("capture_distance and agent_speed must be positive".into()));
        }
        Ok(())
    }

    pub fn total_agents(&self) -> usize {
        self.num_hunters + self.num_patrollers + self.num_blockers
    }
}

pub struct SimulationRunner {
    config: RunnerConfig,
    sim: ArenaSimulation,
    grid: GridSpec,
    /// Round-start positions
    spawn: Vec<AgentRecord>,
    roster: Vec<AgentRecord>,
    player: ScriptedPlayer,
    obstacles: Vec<WorldPosition>,
    obstacle_set: ObstacleSet,
    metrics: MetricsCollector,
}

impl SimulationRunner {
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        config.validate()?;

        let ai = &config.ai;
        let mut sim = ArenaSimulation::new(ai.clone());
        let mut spawn = Vec::with_capacity(config.total_agents());
        let mut next_id = 0u32;

        for i in 0..config.num_hunters {
            let aggression = (0.7 + 0.1 * i as f32).min(1.0);
            sim.add_agent(Agent::hunter(next_id, aggression, ai)?)?;
            spawn.push(AgentRecord::new(
                next_id,
                ai.arena.clamp(WorldPosition::new(100.0 + 100.0 * i as f32, 100.0)),
                Role::Hunter,
            ));
            next_id += 1;
        }

        for i in 0..config.num_patrollers {
            sim.add_agent(Agent::patroller(next_id, patrol_route(), ai)?)?;
            spawn.push(AgentRecord::new(
                next_id,
                ai.arena.clamp(WorldPosition::new(300.0 + 50.0 * i as f32, 300.0)),
                Role::Patroller,
            ));
            next_id += 1;
        }

        let points = strategic_points();
        for i in 0..config.num_blockers {
            // Each blocker starts on its own corner
            let mut own = points.clone();
            own.rotate_left(i % points.len());
            let start = own[0];
            sim.add_agent(Agent::blocker(next_id, own, ai)?)?;
            spawn.push(AgentRecord::new(next_id, start, Role::Blocker));
            next_id += 1;
        }

        let grid = ai.grid.spec();
        let obstacles = config.map_obstacles.layout();
        let obstacle_set = ObstacleSet::from_positions(&grid, &obstacles);
        let player = ScriptedPlayer::new(PLAYER_START, config.player_strategy, fruits(), ai.arena).with_seed(ai.seed);

        info!(
            hunters = config.num_hunters,
            patrollers = config.num_patrollers,
            blockers = config.num_blockers,
            obstacles = obstacles.len(),
            "simulation configured"
        );

        Ok(Self {
            roster: spawn.clone(),
            spawn,
            sim,
            grid,
            player,
            obstacles,
            obstacle_set,
            metrics: MetricsCollector::new(),
            config,
        })
    }

    /// Forward per-tick telemetry from the underlying simulation
    pub fn with_telemetry(mut self, sender: Sender<TickReport>) -> Self {
        self.sim = self.sim.with_telemetry(sender);
        self
    }

    pub fn simulation(&self) -> &ArenaSimulation {
        &self.sim
    }

    pub fn roster(&self) -> &[AgentRecord] {
        &self.roster
    }

    /// Run for the configured duration and return the final metrics
    pub fn run(&mut self) -> SimulationMetrics {
        let dt = self.config.ai.tick_delta;
        let steps = (self.config.simulation_duration / dt).round() as u64;
        info!(steps, "simulation started");

        let mut round_start = 0.0f32;
        let mut clock = 0.0f32;

        for step in 0..steps {
            clock = step as f32 * dt;
            if step % PROGRESS_EVERY == 0 {
                info!(step, steps, catches = self.metrics.catches(), "progress");
            }

            let agent_positions: Vec<WorldPosition> = self.roster.iter().map(|r| r.position).collect();
            self.player.step(&agent_positions);

            let snapshot = WorldSnapshot {
                player: PlayerState::new(self.player.position, self.player.alive),
                obstacles: self.obstacles.clone(),
                agents: self.roster.clone(),
                timer: clock - round_start,
            };

            let started = Instant::now();
            let output = self.sim.step(&snapshot);
            self.metrics.record_tick(
                output.directives.len(),
                started.elapsed(),
                output.messages.len(),
                output.coordinated_attacks(),
            );

            self.integrate(&output, dt);

            if let Some((catcher, distance)) = self.catcher() {
                let survived = clock - round_start;
                info!(step, catcher, distance, survived, "player caught");
                self.metrics.record_catch(survived);
                self.record_paths();
                self.respawn();
                round_start = clock;
            }
        }

        self.record_paths();
        let simulated = steps as f32 * dt;
        let metrics = self.metrics.finish(simulated, (clock + dt - round_start).max(0.0));
        info!(
            catches = metrics.catches,
            coordination_events = metrics.coordination_events,
            "simulation finished"
        );
        metrics
    }

    /// Apply directives: constant-speed motion, never into a blocked cell
    fn integrate(&mut self, output: &TickOutput, dt: f32) {
        let step = self.config.agent_speed * dt;
        let (width, height) = self.grid.world_size();

        for decision in &output.directives {
            if decision.directive.kind == DirectiveKind::Wait || decision.directive.is_motionless() {
                continue;
            }
            let Some(record) = self.roster.iter_mut().find(|r| r.id == decision.id) else {
                continue;
            };

            let moved = record.position.offset(decision.directive.direction.scale(step));
            let next = WorldPosition::new(moved.x.clamp(0.0, width - 0.01), moved.y.clamp(0.0, height - 0.01));
            if !self.obstacle_set.contains(self.grid.world_to_cell(&next)) {
                record.position = next;
            }
        }
    }

    /// Closest agent strictly inside the capture distance
    fn catcher(&self) -> Option<(u32, f32)> {
        if !self.player.alive {
            return None;
        }
        let mut index = SpatialHash::new();
        for record in &self.roster {
            index.insert(record.id, record.position);
        }
        index
            .find_nearest(&self.player.position, self.config.capture_distance)
            .filter(|(_, distance)| *distance < self.config.capture_distance)
    }

    fn record_paths(&mut self) {
        for agent in self.sim.agents() {
            let path = agent.cached_path();
            self.metrics.record_path(path.world_length(), path.len());
        }
    }

    fn respawn(&mut self) {
        self.sim.reset_round();
        self.roster = self.spawn.clone();
        self.player = ScriptedPlayer::new(PLAYER_START, self.config.player_strategy, fruits(), self.config.ai.arena)
            .with_seed(self.config.ai.seed);
        debug!("round restarted after catch");
    }
}
