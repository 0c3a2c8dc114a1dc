/// Coordination messages exchanged between agents through the hub
///
/// Messages are ephemeral: they are visible for `message_ttl` seconds and, for
/// agent-authored messages, only to listeners within the sender's range.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::geometry::WorldPosition;
use crate::storage::AgentId;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    /// The hub itself; never range-limited
    System,
    Agent(AgentId),
}

impl MessageSender {
    pub fn agent_id(&self) -> Option<AgentId> {
        match self {
            MessageSender::System => None,
            MessageSender::Agent(id) => Some(*id),
        }
    }
}

/// Group tactic suggested with a coordinated attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tactic {
    /// Two detectors close in from opposite flanks
    Pincer,
    /// Three or more detectors spread around the player
    Surround,
}

impl Tactic {
    pub fn for_detectors(count: usize) -> Self {
        if count >= 3 {
            Tactic::Surround
        } else {
            Tactic::Pincer
        }
    }
}

/// Type tag of a message (derived from its payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    PlayerLocation,
    StrategicPoint,
    TrapSet,
    CoordinatedAttack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePayload {
    PlayerSighting {
        position: WorldPosition,
    },
    StrategicPoint {
        point: WorldPosition,
    },
    TrapSet {
        position: WorldPosition,
    },
    CoordinatedAttack {
        player_position: WorldPosition,
        detecting: Vec<AgentId>,
        tactic: Tactic,
    },
}

impl MessagePayload {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessagePayload::PlayerSighting { .. } => MessageKind::PlayerLocation,
            MessagePayload::StrategicPoint { .. } => MessageKind::StrategicPoint,
            MessagePayload::TrapSet { .. } => MessageKind::TrapSet,
            MessagePayload::CoordinatedAttack { .. } => MessageKind::CoordinatedAttack,
        }
    }

    /// The world position this payload is about
    pub fn position(&self) -> WorldPosition {
        match self {
            MessagePayload::PlayerSighting { position } => *position,
            MessagePayload::StrategicPoint { point } => *point,
            MessagePayload::TrapSet { position } => *position,
            MessagePayload::CoordinatedAttack { player_position, .. } => *player_position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Ulid,
    pub sender: MessageSender,
    pub payload: MessagePayload,
    /// Round time (seconds) at which the message was sent
    pub timestamp: f32,
    /// Listener must be within this distance of the sender (agent messages only)
    pub range_limit: f32,
}

impl Message {
    pub fn new(sender: MessageSender, payload: MessagePayload, timestamp: f32, range_limit: f32) -> Self {
        Self {
            id: Ulid::new(),
            sender,
            payload,
            timestamp,
            range_limit,
        }
    }

    #[inline]
    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.sender == MessageSender::System
    }

    #[inline]
    pub fn age(&self, now: f32) -> f32 {
        now - self.timestamp
    }

    /// Strictly younger than `ttl`
    #[inline]
    pub fn is_fresh(&self, now: f32, ttl: f32) -> bool {
        self.age(now) < ttl
    }

    /// Detecting agents and tactic, for coordinated-attack messages
    pub fn attack_plan(&self) -> Option<(&[AgentId], Tactic)> {
        match &self.payload {
            MessagePayload::CoordinatedAttack { detecting, tactic, .. } => Some((detecting.as_slice(), *tactic)),
            _ => None,
        }
    }
}
