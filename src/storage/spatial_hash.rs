/// Spatial hash of agent positions for radius queries
///
/// The arena is divided into square buckets; each agent lives in exactly one
/// bucket. Radius queries only visit the buckets overlapping the query circle
/// instead of checking every agent.
///
/// Used by:
/// - the coordination hub (which agents see the player, where is a sender)
/// - the simulation runner (is any agent close enough to catch the player)

use std::collections::HashMap;

use crate::config::coordination as coordination_config;
use crate::geometry::WorldPosition;

/// Agent identifier shared by every module
pub type AgentId = u32;

/// Bucket coordinates in the spatial hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BucketCoord {
    x: i32,
    y: i32,
}

/// Spatial hash configuration
#[derive(Debug, Clone, Copy)]
pub struct SpatialHashConfig {
    /// Size of each bucket (in world units)
    /// Smaller = finer queries, more buckets visited per radius
    pub cell_size: f32,
}

impl Default for SpatialHashConfig {
    fn default() -> Self {
        Self {
            // Half the shared detection radius keeps a detection query to a 5x5 block
            cell_size: coordination_config::DETECTION_RADIUS * 0.5,
        }
    }
}

/// Spatial hash grid keyed by agent id
#[derive(Debug, Clone)]
pub struct SpatialHash {
    buckets: HashMap<BucketCoord, Vec<AgentId>>,
    positions: HashMap<AgentId, WorldPosition>,
    config: SpatialHashConfig,
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialHash {
    /// Create new spatial hash with default config
    pub fn new() -> Self {
        Self::with_config(SpatialHashConfig::default())
    }

    pub fn with_config(config: SpatialHashConfig) -> Self {
        Self {
            buckets: HashMap::new(),
            positions: HashMap::new(),
            config: SpatialHashConfig {
                cell_size: config.cell_size.max(1.0),
            },
        }
    }

    #[inline]
    fn bucket_of(&self, pos: &WorldPosition) -> BucketCoord {
        BucketCoord {
            x: (pos.x / self.config.cell_size).floor() as i32,
            y: (pos.y / self.config.cell_size).floor() as i32,
        }
    }

    /// Insert or update agent position
    pub fn insert(&mut self, agent_id: AgentId, position: WorldPosition) {
        if let Some(old_pos) = self.positions.get(&agent_id) {
            let old_bucket = self.bucket_of(old_pos);
            if old_bucket == self.bucket_of(&position) {
                self.positions.insert(agent_id, position);
                return;
            }
            if let Some(ids) = self.buckets.get_mut(&old_bucket) {
                ids.retain(|&id| id != agent_id);
                if ids.is_empty() {
                    self.buckets.remove(&old_bucket);
                }
            }
        }

        let bucket = self.bucket_of(&position);
        self.buckets.entry(bucket).or_default().push(agent_id);
        self.positions.insert(agent_id, position);
    }

    pub fn remove(&mut self, agent_id: AgentId) {
        if let Some(pos) = self.positions.remove(&agent_id) {
            let bucket = self.bucket_of(&pos);
            if let Some(ids) = self.buckets.get_mut(&bucket) {
                ids.retain(|&id| id != agent_id);
                if ids.is_empty() {
                    self.buckets.remove(&bucket);
                }
            }
        }
    }

    /// Agents within `radius` of `center` (inclusive), sorted by id
    pub fn query_radius(&self, center: &WorldPosition, radius: f32) -> Vec<AgentId> {
        let mut result = Vec::new();
        let radius_squared = radius * radius;

        let center_bucket = self.bucket_of(center);
        let bucket_radius = (radius / self.config.cell_size).ceil() as i32;

        for dy in -bucket_radius..=bucket_radius {
            for dx in -bucket_radius..=bucket_radius {
                let bucket = BucketCoord {
                    x: center_bucket.x + dx,
                    y: center_bucket.y + dy,
                };

                if let Some(ids) = self.buckets.get(&bucket) {
                    for &agent_id in ids {
                        if let Some(pos) = self.positions.get(&agent_id) {
                            if center.distance_squared_to(pos) <= radius_squared {
                                result.push(agent_id);
                            }
                        }
                    }
                }
            }
        }

        // HashMap iteration order is not stable; keep results deterministic
        result.sort_unstable();
        result
    }

    /// Nearest agent to a position within `max_radius`
    pub fn find_nearest(&self, center: &WorldPosition, max_radius: f32) -> Option<(AgentId, f32)> {
        self.query_radius(center, max_radius)
            .into_iter()
            .filter_map(|id| self.positions.get(&id).map(|pos| (id, center.distance_to(pos))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn get_position(&self, agent_id: AgentId) -> Option<WorldPosition> {
        self.positions.get(&agent_id).copied()
    }

    /// Every indexed agent id, in no particular order
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.positions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.positions.clear();
    }
}
