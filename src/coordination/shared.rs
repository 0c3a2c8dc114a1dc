// Thread-safe handle to a coordination hub
// Single writer (the tick loop), many readers (host threads building inboxes)

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::hub::CoordinationHub;
use super::message::Message;
use crate::geometry::WorldPosition;
use crate::storage::AgentId;
use crate::world::WorldSnapshot;

#[derive(Debug, Clone, Default)]
pub struct SharedHub {
    inner: Arc<RwLock<CoordinationHub>>,
}

impl SharedHub {
    pub fn new(hub: CoordinationHub) -> Self {
        Self {
            inner: Arc::new(RwLock::new(hub)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, CoordinationHub> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, CoordinationHub> {
        self.inner.write()
    }

    /// Run the per-tick hub update under the write lock
    pub fn update(&self, agent_positions: &[(AgentId, WorldPosition)], snapshot: &WorldSnapshot) -> Vec<Message> {
        self.inner.write().update(agent_positions, snapshot)
    }

    pub fn messages_for(&self, agent_id: AgentId, agent_pos: WorldPosition, now: f32) -> Vec<Message> {
        self.inner.read().get_messages_for(agent_id, agent_pos, now)
    }
}
