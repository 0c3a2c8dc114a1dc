// Spatial indexing for agent positions

pub mod spatial_hash;

pub use spatial_hash::{AgentId, SpatialHash, SpatialHashConfig};
