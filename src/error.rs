// Error types for fallible setup operations
// The per-tick path never returns errors: failures there degrade to empty paths
// and `wait` directives.

use thiserror::Error;

/// Configuration loading / validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Invalid role parameters at agent construction
#[derive(Debug, Error, PartialEq)]
pub enum AgentError {
    #[error("patroller {0} needs at least one waypoint")]
    NoWaypoints(u32),

    #[error("blocker {0} needs at least one strategic point")]
    NoStrategicPoints(u32),

    #[error("agent {agent}: {reason}")]
    InvalidParameter { agent: u32, reason: String },

    #[error("agent id {0} is already registered")]
    DuplicateId(u32),
}

/// Headless runner setup failures
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// World snapshot decoding failures
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate agent id {0} in snapshot")]
    DuplicateAgent(u32),
}
