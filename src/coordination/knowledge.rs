// Shared knowledge: bounded rolling buffers keyed by topic, owned by the hub

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::message::MessageSender;
use crate::geometry::WorldPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeKey {
    LastPlayerPositions,
    StrategicPointsControlled,
    TrapsActive,
    AttackPhases,
}

impl KnowledgeKey {
    pub const ALL: [KnowledgeKey; 4] = [
        KnowledgeKey::LastPlayerPositions,
        KnowledgeKey::StrategicPointsControlled,
        KnowledgeKey::TrapsActive,
        KnowledgeKey::AttackPhases,
    ];

    /// Keys whose writes are debounced
    pub fn is_latency_sensitive(&self) -> bool {
        matches!(self, KnowledgeKey::LastPlayerPositions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub position: WorldPosition,
    pub source: MessageSender,
    pub recorded_at: f32,
}

#[derive(Debug, Clone)]
pub struct SharedKnowledge {
    buffers: HashMap<KnowledgeKey, VecDeque<KnowledgeEntry>>,
    capacity: usize,
    debounce: f32,
}

impl SharedKnowledge {
    pub fn new(capacity: usize, debounce: f32) -> Self {
        let buffers = KnowledgeKey::ALL
            .iter()
            .map(|key| (*key, VecDeque::with_capacity(capacity.max(1))))
            .collect();

        Self {
            buffers,
            capacity: capacity.max(1),
            debounce: debounce.max(0.0),
        }
    }

    /// Append an entry, evicting the oldest past capacity
    ///
    /// Returns `false` when the write is dropped by the debounce window of a
    /// latency-sensitive key.
    pub fn record(&mut self, key: KnowledgeKey, entry: KnowledgeEntry) -> bool {
        let buffer = self.buffers.entry(key).or_default();

        if key.is_latency_sensitive() {
            if let Some(last) = buffer.back() {
                if entry.recorded_at - last.recorded_at < self.debounce {
                    return false;
                }
            }
        }

        buffer.push_back(entry);
        while buffer.len() > self.capacity {
            buffer.pop_front();
        }
        true
    }

    /// Most recent entry younger than `ttl`
    pub fn latest(&self, key: KnowledgeKey, now: f32, ttl: f32) -> Option<&KnowledgeEntry> {
        self.buffers
            .get(&key)?
            .back()
            .filter(|entry| now - entry.recorded_at < ttl)
    }

    /// All retained entries for a key, oldest first
    pub fn entries(&self, key: KnowledgeKey) -> impl Iterator<Item = &KnowledgeEntry> {
        self.buffers.get(&key).into_iter().flat_map(|buffer| buffer.iter())
    }

    pub fn len(&self, key: KnowledgeKey) -> usize {
        self.buffers.get(&key).map_or(0, VecDeque::len)
    }

    /// Drop entries older than `ttl`
    pub fn prune(&mut self, now: f32, ttl: f32) {
        for buffer in self.buffers.values_mut() {
            while buffer.front().is_some_and(|entry| now - entry.recorded_at >= ttl) {
                buffer.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        for buffer in self.buffers.values_mut() {
            buffer.clear();
        }
    }
}
