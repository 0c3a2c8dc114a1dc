// What an agent is allowed to see during one tick

use crate::coordination::{Message, MessagePayload, Tactic};
use crate::geometry::WorldPosition;
use crate::grid::ObstacleSet;
use crate::storage::AgentId;
use crate::world::{AgentRecord, PlayerState};

/// Read-only per-tick view handed to `AgentBehavior::update`
#[derive(Debug, Clone, Copy)]
pub struct Perception<'a> {
    /// The agent's own position at tick start
    pub position: WorldPosition,
    pub player: PlayerState,
    pub obstacles: &'a ObstacleSet,
    /// Every agent in the snapshot (may include the agent itself)
    pub agents: &'a [AgentRecord],
    /// Messages the hub considers relevant to this agent
    pub inbox: &'a [Message],
    /// Round timer (seconds)
    pub now: f32,
    /// Tick delta (seconds)
    pub dt: f32,
}

impl<'a> Perception<'a> {
    #[inline]
    pub fn distance_to_player(&self) -> f32 {
        self.position.distance_to(&self.player.position)
    }

    /// Other agents' positions, excluding `me`
    pub fn others(&self, me: AgentId) -> impl Iterator<Item = &'a AgentRecord> + 'a {
        self.agents.iter().filter(move |record| record.id != me)
    }

    /// Freshest player position shared by someone else, with its timestamp
    pub fn latest_player_intel(&self) -> Option<(WorldPosition, f32)> {
        self.inbox
            .iter()
            .filter_map(|msg| match &msg.payload {
                MessagePayload::PlayerSighting { position } => Some((*position, msg.timestamp)),
                MessagePayload::CoordinatedAttack { player_position, .. } => Some((*player_position, msg.timestamp)),
                _ => None,
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Latest coordinated attack that names `me`: (slot, detector count, tactic)
    pub fn attack_slot(&self, me: AgentId) -> Option<(usize, usize, Tactic)> {
        self.inbox
            .iter()
            .rev()
            .filter_map(|msg| msg.attack_plan())
            .find_map(|(detecting, tactic)| {
                detecting
                    .iter()
                    .position(|id| *id == me)
                    .map(|slot| (slot, detecting.len(), tactic))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::MessageSender;
    use crate::npc::Role;

    #[test]
    fn test_intel_and_attack_slot() {
        let obstacles = ObstacleSet::new();
        let inbox = vec![
            Message::new(
                MessageSender::Agent(4),
                MessagePayload::PlayerSighting { position: WorldPosition::new(10.0, 10.0) },
                1.0,
                300.0,
            ),
            Message::new(
                MessageSender::System,
                MessagePayload::CoordinatedAttack {
                    player_position: WorldPosition::new(20.0, 20.0),
                    detecting: vec![3, 7],
                    tactic: Tactic::Pincer,
                },
                2.0,
                300.0,
            ),
        ];
        let agents = [
            AgentRecord::new(7, WorldPosition::ORIGIN, Role::Hunter),
            AgentRecord::new(3, WorldPosition::ORIGIN, Role::Hunter),
        ];
        let perception = Perception {
            position: WorldPosition::ORIGIN,
            player: PlayerState::new(WorldPosition::new(30.0, 40.0), true),
            obstacles: &obstacles,
            agents: &agents,
            inbox: &inbox,
            now: 2.5,
            dt: 1.0 / 60.0,
        };

        assert_eq!(perception.distance_to_player(), 50.0);
        assert_eq!(perception.latest_player_intel(), Some((WorldPosition::new(20.0, 20.0), 2.0)));
        assert_eq!(perception.attack_slot(7), Some((1, 2, Tactic::Pincer)));
        assert_eq!(perception.attack_slot(4), None);
        assert_eq!(perception.others(7).count(), 1);
    }
}
