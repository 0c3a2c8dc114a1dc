/// Coordination hub: message log, multi-detection events, shared knowledge
///
/// The hub is a plain accumulate / prune / query structure evaluated once per
/// tick, after every agent has updated:
///
/// 1. agents' outgoing reports are appended with [`CoordinationHub::send_message`]
/// 2. [`CoordinationHub::update`] refreshes sender positions, prunes expired
///    messages and knowledge, and raises at most one system coordinated-attack
///    message when two or more agents have the player in sight
/// 3. on the next tick each agent's inbox is built with
///    [`CoordinationHub::get_messages_for`]
///
/// There is no global instance; the tick loop owns the hub (or shares it through
/// [`super::SharedHub`]).

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::knowledge::{KnowledgeEntry, KnowledgeKey, SharedKnowledge};
use super::message::{Message, MessageKind, MessagePayload, MessageSender, Tactic};
use crate::config::CoordinationConfig;
use crate::geometry::WorldPosition;
use crate::storage::{AgentId, SpatialHash, SpatialHashConfig};
use crate::world::WorldSnapshot;

/// Running counters, reset with the hub
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HubStats {
    pub messages_sent: u64,
    pub coordinated_attacks: u64,
    pub knowledge_debounced: u64,
}

#[derive(Debug, Clone)]
pub struct CoordinationHub {
    config: CoordinationConfig,
    /// Live messages, pruned by TTL
    messages: VecDeque<Message>,
    /// Capped record of everything sent, oldest evicted
    history: VecDeque<Message>,
    /// Messages emitted since the previous `update`
    outbox: Vec<Message>,
    /// Last reported agent positions
    positions: SpatialHash,
    knowledge: SharedKnowledge,
    now: f32,
    stats: HubStats,
}

impl Default for CoordinationHub {
    fn default() -> Self {
        Self::new(CoordinationConfig::default())
    }
}

impl CoordinationHub {
    pub fn new(config: CoordinationConfig) -> Self {
        let positions = SpatialHash::with_config(SpatialHashConfig {
            cell_size: config.detection_radius * 0.5,
        });

        Self {
            knowledge: SharedKnowledge::new(config.knowledge_capacity, config.knowledge_debounce),
            messages: VecDeque::new(),
            history: VecDeque::with_capacity(config.max_message_history),
            outbox: Vec::new(),
            positions,
            now: 0.0,
            stats: HubStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &CoordinationConfig {
        &self.config
    }

    /// Evaluate one tick; returns every message emitted since the last call
    pub fn update(&mut self, agent_positions: &[(AgentId, WorldPosition)], snapshot: &WorldSnapshot) -> Vec<Message> {
        self.now = snapshot.timer;

        let stale: Vec<AgentId> = self
            .positions
            .ids()
            .filter(|id| !agent_positions.iter().any(|(present, _)| present == id))
            .collect();
        for id in stale {
            self.positions.remove(id);
        }
        for (id, pos) in agent_positions {
            self.positions.insert(*id, *pos);
        }

        self.prune();

        if snapshot.player.alive {
            let player = snapshot.player.position;
            let detecting = self.detecting_agents(&player);

            if detecting.len() >= 2 {
                let tactic = Tactic::for_detectors(detecting.len());
                debug!(
                    ?detecting,
                    ?tactic,
                    timer = self.now,
                    "coordinated attack triggered"
                );
                self.stats.coordinated_attacks += 1;
                self.send_message(
                    MessageSender::System,
                    MessagePayload::CoordinatedAttack {
                        player_position: player,
                        detecting,
                        tactic,
                    },
                    self.now,
                );
            }
        }

        std::mem::take(&mut self.outbox)
    }

    /// Agents strictly inside the shared detection radius, sorted by id
    fn detecting_agents(&self, player: &WorldPosition) -> Vec<AgentId> {
        let radius = self.config.detection_radius;
        self.positions
            .query_radius(player, radius)
            .into_iter()
            .filter(|id| {
                self.positions
                    .get_position(*id)
                    .is_some_and(|pos| pos.distance_to(player) < radius)
            })
            .collect()
    }

    fn prune(&mut self) {
        let (now, ttl) = (self.now, self.config.message_ttl);
        let before = self.messages.len();
        self.messages.retain(|msg| msg.is_fresh(now, ttl));
        if before != self.messages.len() {
            trace!(pruned = before - self.messages.len(), "pruned expired messages");
        }
        self.knowledge.prune(now, ttl);
    }

    /// Append a message to the live log (TTL-pruned) and the capped history
    pub fn send_message(&mut self, sender: MessageSender, payload: MessagePayload, timestamp: f32) -> Message {
        let message = Message::new(sender, payload, timestamp, self.config.communication_range);
        let max = self.config.max_message_history.max(1);

        self.record_knowledge(&message);

        // Live log lifetime is owned by `prune`
        self.messages.push_back(message.clone());

        self.history.push_back(message.clone());
        while self.history.len() > max {
            self.history.pop_front();
        }

        self.outbox.push(message.clone());
        self.stats.messages_sent += 1;
        trace!(?sender, kind = ?message.kind(), timestamp, "message sent");
        message
    }

    fn record_knowledge(&mut self, message: &Message) {
        let key = match message.kind() {
            MessageKind::PlayerLocation => KnowledgeKey::LastPlayerPositions,
            MessageKind::StrategicPoint => KnowledgeKey::StrategicPointsControlled,
            MessageKind::TrapSet => KnowledgeKey::TrapsActive,
            MessageKind::CoordinatedAttack => KnowledgeKey::AttackPhases,
        };
        self.update_shared_knowledge(key, message.payload.position(), message.sender, message.timestamp);
    }

    /// Messages relevant to one listener
    ///
    /// Excludes the listener's own messages, anything aged `>= message_ttl`,
    /// and agent messages whose sender is out of range (or has no known
    /// position). System messages skip the range check.
    pub fn get_messages_for(&self, agent_id: AgentId, agent_pos: WorldPosition, now: f32) -> Vec<Message> {
        let ttl = self.config.message_ttl;

        self.messages
            .iter()
            .filter(|msg| msg.sender != MessageSender::Agent(agent_id))
            .filter(|msg| msg.is_fresh(now, ttl))
            .filter(|msg| match msg.sender {
                MessageSender::System => true,
                MessageSender::Agent(sender) => self
                    .positions
                    .get_position(sender)
                    .is_some_and(|sender_pos| sender_pos.distance_to(&agent_pos) <= msg.range_limit),
            })
            .cloned()
            .collect()
    }

    /// Record into the shared knowledge store; `false` when debounced
    pub fn update_shared_knowledge(
        &mut self,
        key: KnowledgeKey,
        position: WorldPosition,
        source: MessageSender,
        timestamp: f32,
    ) -> bool {
        let accepted = self.knowledge.record(
            key,
            KnowledgeEntry {
                position,
                source,
                recorded_at: timestamp,
            },
        );
        if !accepted {
            self.stats.knowledge_debounced += 1;
            trace!(?key, timestamp, "knowledge write debounced");
        }
        accepted
    }

    /// Latest unexpired entry for a key
    pub fn get_shared_knowledge(&self, key: KnowledgeKey, now: f32) -> Option<KnowledgeEntry> {
        self.knowledge.latest(key, now, self.config.message_ttl).copied()
    }

    pub fn knowledge(&self) -> &SharedKnowledge {
        &self.knowledge
    }

    /// Live (unpruned) messages, oldest first
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn history(&self) -> impl Iterator<Item = &Message> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Last position the hub knows for an agent
    pub fn agent_position(&self, id: AgentId) -> Option<WorldPosition> {
        self.positions.get_position(id)
    }

    pub fn stats(&self) -> HubStats {
        self.stats
    }

    /// Round start: forget everything
    pub fn reset(&mut self) {
        self.messages.clear();
        self.history.clear();
        self.outbox.clear();
        self.positions.clear();
        self.knowledge.clear();
        self.now = 0.0;
        self.stats = HubStats::default();
    }
}
