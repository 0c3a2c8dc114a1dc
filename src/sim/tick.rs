/// Tick loop: snapshot -> agents -> hub, once per frame
///
/// Ordering within one tick:
/// 1. the obstacle set is rebuilt once from the snapshot and shared read-only
/// 2. every agent updates against the same snapshot, with an inbox built from
///    messages the hub already held before this tick
/// 3. agents' outgoing reports are forwarded to the hub
/// 4. the hub updates (prune, detect, emit)
///
/// A detection reported during tick N therefore reaches other agents at N+1.

use crossbeam_channel::Sender;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::AiConfig;
use crate::coordination::{CoordinationHub, Message, MessageKind, MessageSender};
use crate::error::AgentError;
use crate::grid::GridPathfinder;
use crate::npc::{Agent, AgentBehavior, AgentStatus, MotionDirective, Perception, Role};
use crate::storage::AgentId;
use crate::world::WorldSnapshot;

/// Decision of one agent for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDirective {
    pub id: AgentId,
    pub role: Role,
    pub directive: MotionDirective,
    pub status: AgentStatus,
}

/// Everything produced by one tick
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub directives: Vec<AgentDirective>,
    /// Outward coordination messages (agent reports + system messages)
    pub messages: Vec<Message>,
}

impl TickOutput {
    pub fn directive_for(&self, id: AgentId) -> Option<&AgentDirective> {
        self.directives.iter().find(|d| d.id == id)
    }

    pub fn coordinated_attacks(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.kind() == MessageKind::CoordinatedAttack)
            .count()
    }
}

/// Telemetry record published per tick
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub timer: f32,
    pub directives: Vec<(AgentId, MotionDirective)>,
    /// Raw `AgentStatus` bits per agent
    pub statuses: Vec<(AgentId, u32)>,
    pub messages: usize,
    pub coordinated_attacks: usize,
}

pub struct ArenaSimulation {
    config: AiConfig,
    pathfinder: GridPathfinder,
    hub: CoordinationHub,
    agents: Vec<Agent>,
    tick: u64,
    telemetry: Option<Sender<TickReport>>,
}

impl ArenaSimulation {
    pub fn new(config: AiConfig) -> Self {
        Self {
            pathfinder: GridPathfinder::from_config(&config),
            hub: CoordinationHub::new(config.coordination),
            agents: Vec::new(),
            tick: 0,
            telemetry: None,
            config,
        }
    }

    /// Publish a `TickReport` per tick (non-blocking, dropped when full or disconnected)
    pub fn with_telemetry(mut self, sender: Sender<TickReport>) -> Self {
        self.telemetry = Some(sender);
        self
    }

    pub fn add_agent(&mut self, agent: Agent) -> Result<(), AgentError> {
        if self.agents.iter().any(|a| a.id() == agent.id()) {
            return Err(AgentError::DuplicateId(agent.id()));
        }
        debug!(id = agent.id(), role = agent.role().as_str(), "agent registered");
        self.agents.push(agent);
        Ok(())
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn pathfinder(&self) -> &GridPathfinder {
        &self.pathfinder
    }

    pub fn hub(&self) -> &CoordinationHub {
        &self.hub
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Run one tick against a snapshot taken at tick start
    ///
    /// Agents absent from the snapshot are skipped for this tick.
    pub fn step(&mut self, snapshot: &WorldSnapshot) -> TickOutput {
        let obstacles = snapshot.obstacle_set(self.pathfinder.grid());
        let now = snapshot.timer;
        let dt = self.config.tick_delta;

        let mut directives = Vec::with_capacity(self.agents.len());
        let mut reports = Vec::new();

        for agent in &mut self.agents {
            let Some(record) = snapshot.agent(agent.id()) else {
                trace!(id = agent.id(), "agent missing from snapshot, skipped");
                continue;
            };

            let inbox = self.hub.get_messages_for(record.id, record.position, now);
            let perception = Perception {
                position: record.position,
                player: snapshot.player,
                obstacles: &obstacles,
                agents: &snapshot.agents,
                inbox: &inbox,
                now,
                dt,
            };

            let directive = agent.update(&perception, &self.pathfinder);
            if let Some(payload) = agent.take_report() {
                reports.push((agent.id(), payload));
            }

            directives.push(AgentDirective {
                id: agent.id(),
                role: agent.role(),
                directive,
                status: agent.status(),
            });
        }

        // Reports become visible to other agents from the next tick
        for (id, payload) in reports {
            self.hub.send_message(MessageSender::Agent(id), payload, now);
        }
        let messages = self.hub.update(&snapshot.agent_positions(), snapshot);

        let output = TickOutput { directives, messages };
        self.publish(&output, now);
        self.tick += 1;
        output
    }

    fn publish(&self, output: &TickOutput, timer: f32) {
        let Some(sender) = &self.telemetry else {
            return;
        };

        let report = TickReport {
            tick: self.tick,
            timer,
            directives: output.directives.iter().map(|d| (d.id, d.directive)).collect(),
            statuses: output.directives.iter().map(|d| (d.id, d.status.bits())).collect(),
            messages: output.messages.len(),
            coordinated_attacks: output.coordinated_attacks(),
        };

        if sender.try_send(report).is_err() {
            trace!(tick = self.tick, "telemetry receiver full or gone, report dropped");
        }
    }

    /// Round start: reset every agent and the hub
    pub fn reset_round(&mut self) {
        for agent in &mut self.agents {
            agent.reset();
        }
        self.hub.reset();
        self.tick = 0;
        debug!(agents = self.agents.len(), "round reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::WorldPosition;
    use crate::npc::DirectiveKind;
    use crate::world::{AgentRecord, PlayerState};

    fn sim_with_hunters(positions: &[(AgentId, WorldPosition)]) -> ArenaSimulation {
        let config = AiConfig::default();
        let mut sim = ArenaSimulation::new(config.clone());
        for (id, _) in positions {
            sim.add_agent(Agent::hunter(*id, 0.8, &config).unwrap()).unwrap();
        }
        sim
    }

    fn snapshot(player: WorldPosition, agents: &[(AgentId, WorldPosition)], timer: f32) -> WorldSnapshot {
        WorldSnapshot::new(PlayerState::new(player, true), timer).with_agents(
            agents
                .iter()
                .map(|(id, pos)| AgentRecord::new(*id, *pos, Role::Hunter))
                .collect(),
        )
    }

    #[test]
    fn test_attack_emitted_same_tick() {
        let agents = [(0, WorldPosition::new(100.0, 100.0))];
        let mut sim = sim_with_hunters(&agents);

        let out = sim.step(&snapshot(WorldPosition::new(140.0, 100.0), &agents, 0.0));

        assert_eq!(out.directive_for(0).map(|d| d.directive.kind), Some(DirectiveKind::Attack));
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn test_detection_visible_next_tick() {
        // Hunter 0 sees the player, hunter 1 is far away but within comm range of 0
        let agents = [
            (0, WorldPosition::new(200.0, 300.0)),
            (1, WorldPosition::new(100.0, 560.0)),
        ];
        let mut sim = sim_with_hunters(&agents);
        let player = WorldPosition::new(450.0, 300.0);

        let first = sim.step(&snapshot(player, &agents, 0.0));
        assert!(first
            .messages
            .iter()
            .any(|m| m.sender == MessageSender::Agent(0) && m.kind() == MessageKind::PlayerLocation));
        // Hunter 1 saw nothing during tick N
        assert_eq!(sim.hub().get_messages_for(1, agents[1].1, 0.0).len(), 1);
        let Agent::Hunter(h1) = sim.agent(1).unwrap() else { panic!("hunter expected") };
        assert!(h1.last_known_player().is_none());

        // Tick N+1: the sighting reaches hunter 1 through its inbox
        sim.step(&snapshot(player, &agents, 1.0 / 60.0));
        let Agent::Hunter(h1) = sim.agent(1).unwrap() else { panic!("hunter expected") };
        assert_eq!(h1.last_known_player(), Some(player));
    }

    #[test]
    fn test_coordinated_attack_and_telemetry() {
        let agents = [
            (0, WorldPosition::new(300.0, 300.0)),
            (1, WorldPosition::new(500.0, 300.0)),
        ];
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut sim = sim_with_hunters(&agents).with_telemetry(tx);

        let out = sim.step(&snapshot(WorldPosition::new(400.0, 300.0), &agents, 0.0));
        assert_eq!(out.coordinated_attacks(), 1);

        let report = rx.try_recv().unwrap();
        assert_eq!(report.tick, 0);
        assert_eq!(report.coordinated_attacks, 1);
        assert_eq!(report.directives.len(), 2);
    }

    #[test]
    fn test_disconnected_telemetry_is_ignored() {
        let agents = [(0, WorldPosition::new(100.0, 100.0))];
        let (tx, rx) = crossbeam_channel::bounded(1);
        drop(rx);
        let mut sim = sim_with_hunters(&agents).with_telemetry(tx);

        sim.step(&snapshot(WorldPosition::new(700.0, 500.0), &agents, 0.0));
        sim.step(&snapshot(WorldPosition::new(700.0, 500.0), &agents, 0.1));
        assert_eq!(sim.tick_count(), 2);
    }

    #[test]
    fn test_duplicate_ids_and_reset() {
        let config = AiConfig::default();
        let agents = [(0, WorldPosition::new(100.0, 100.0))];
        let mut sim = sim_with_hunters(&agents);

        assert_eq!(
            sim.add_agent(Agent::hunter(0, 0.5, &config).unwrap()),
            Err(AgentError::DuplicateId(0))
        );

        sim.step(&snapshot(WorldPosition::new(200.0, 100.0), &agents, 0.0));
        sim.reset_round();
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.hub().history_len(), 0);
        assert!(sim.agents()[0].cached_path().is_empty());
    }
}
