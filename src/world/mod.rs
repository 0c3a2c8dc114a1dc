// World state handed to the AI layer each tick

pub mod snapshot;

pub use snapshot::{AgentRecord, PlayerState, WorldSnapshot};
