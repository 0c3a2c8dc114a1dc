/// Centralized configuration for the arena AI layer
///
/// The const modules below are the single source of truth for default values.
/// `AiConfig` mirrors them as a serde structure so a host (or the headless
/// runner) can override any subset from JSON; missing fields fall back to the
/// constants.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::geometry::{ArenaBounds, WorldPosition};
use crate::grid::{GridSpec, Heuristic};

/// Arena / grid configuration constants
pub mod arena {
    /// Grid dimensions: 20x15 cells of 40px = 800x600 arena
    pub const GRID_COLUMNS: i32 = 20;
    pub const GRID_ROWS: i32 = 15;
    pub const CELL_WIDTH: f32 = 40.0;
    pub const CELL_HEIGHT: f32 = 40.0;

    /// Playable area used to clamp predicted and wander targets
    pub const MIN_X: f32 = 50.0;
    pub const MIN_Y: f32 = 50.0;
    pub const MAX_X: f32 = 770.0;
    pub const MAX_Y: f32 = 572.0;

    /// Fixed simulation step (60 Hz)
    pub const TICK_DELTA: f32 = 1.0 / 60.0;
}

/// Pathfinding configuration constants
pub mod pathfinding {
    /// Maximum number of node expansions before a search is abandoned
    pub const ITERATION_CAP: usize = 1000;

    /// 8-directional movement with corner-cutting guard
    pub const ALLOW_DIAGONAL: bool = true;
}

/// Hunter tuning constants
pub mod hunter {
    pub const DETECTION_RADIUS: f32 = 300.0;
    pub const ATTACK_RADIUS: f32 = 50.0;
    /// Minimum seconds between two path recomputations
    pub const REPATH_INTERVAL: f32 = 0.5;
    /// Seconds out of detection range before giving up the chase (30 frames)
    pub const PATIENCE: f32 = 0.5;
    /// Multiplier applied to the player's last displacement
    pub const PREDICTION_FACTOR: f32 = 2.0;
    pub const WANDER_RADIUS: f32 = 200.0;
    /// A wander target closer than this is replaced by a new one
    pub const WANDER_ARRIVAL: f32 = 20.0;
    /// Distance from the player of a pincer / surround flank point
    pub const FLANK_DISTANCE: f32 = 60.0;
    pub const AGGRESSION: f32 = 0.8;
}

/// Patroller tuning constants
pub mod patroller {
    pub const ARRIVAL_THRESHOLD: f32 = 20.0;
    /// Chance to reverse the cycling direction when leaving a waypoint
    pub const REVERSE_CHANCE: f64 = 0.1;
}

/// Blocker tuning constants
pub mod blocker {
    pub const ARRIVAL_THRESHOLD: f32 = 30.0;
    pub const BLOCK_DURATION: f32 = 5.0;
    /// Per-tick chance of a small idle motion while blocking
    pub const JITTER_CHANCE: f64 = 0.1;
    pub const JITTER_RADIUS: f32 = 10.0;
    /// Player this close to a held point springs the trap
    pub const TRAP_RADIUS: f32 = 200.0;
}

/// Path following constants
pub mod steering {
    /// A waypoint closer than this is considered reached and popped
    pub const WAYPOINT_REACH: f32 = 4.0;
    /// Look-around rotation while dwelling (radians per second)
    pub const LOOK_AROUND_RATE: f32 = std::f32::consts::FRAC_PI_2;
}

/// Coordination hub constants
pub mod coordination {
    /// Shared detection radius used for coordinated attacks
    pub const DETECTION_RADIUS: f32 = 200.0;
    pub const MESSAGE_TTL: f32 = 5.0;
    pub const MAX_MESSAGE_HISTORY: usize = 50;
    pub const COMMUNICATION_RANGE: f32 = 300.0;
    pub const KNOWLEDGE_CAPACITY: usize = 10;
    /// Debounce window for latency-sensitive knowledge keys
    pub const KNOWLEDGE_DEBOUNCE: f32 = 0.5;
}

/// Grid section of the configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: i32,
    pub rows: i32,
    /// `grid_cell_size` as (width, height) in pixels
    pub cell_size: (f32, f32),
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: arena::GRID_COLUMNS,
            rows: arena::GRID_ROWS,
            cell_size: (arena::CELL_WIDTH, arena::CELL_HEIGHT),
        }
    }
}

impl GridConfig {
    pub fn spec(&self) -> GridSpec {
        GridSpec::new(self.columns, self.rows, self.cell_size.0, self.cell_size.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    pub iteration_cap: usize,
    pub allow_diagonal: bool,
    /// Overrides the movement-derived heuristic when set
    pub heuristic: Option<Heuristic>,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            iteration_cap: pathfinding::ITERATION_CAP,
            allow_diagonal: pathfinding::ALLOW_DIAGONAL,
            heuristic: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HunterConfig {
    pub detection_radius: f32,
    pub attack_radius: f32,
    pub repath_interval: f32,
    pub patience: f32,
    pub prediction_factor: f32,
    pub wander_radius: f32,
    pub flank_distance: f32,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            detection_radius: hunter::DETECTION_RADIUS,
            attack_radius: hunter::ATTACK_RADIUS,
            repath_interval: hunter::REPATH_INTERVAL,
            patience: hunter::PATIENCE,
            prediction_factor: hunter::PREDICTION_FACTOR,
            wander_radius: hunter::WANDER_RADIUS,
            flank_distance: hunter::FLANK_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrollerConfig {
    pub arrival_threshold: f32,
    pub reverse_chance: f64,
}

impl Default for PatrollerConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: patroller::ARRIVAL_THRESHOLD,
            reverse_chance: patroller::REVERSE_CHANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockerConfig {
    pub arrival_threshold: f32,
    pub block_duration: f32,
    pub jitter_chance: f64,
    pub jitter_radius: f32,
    pub trap_radius: f32,
}

impl Default for BlockerConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: blocker::ARRIVAL_THRESHOLD,
            block_duration: blocker::BLOCK_DURATION,
            jitter_chance: blocker::JITTER_CHANCE,
            jitter_radius: blocker::JITTER_RADIUS,
            trap_radius: blocker::TRAP_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    pub detection_radius: f32,
    pub message_ttl: f32,
    pub max_message_history: usize,
    pub communication_range: f32,
    pub knowledge_capacity: usize,
    pub knowledge_debounce: f32,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            detection_radius: coordination::DETECTION_RADIUS,
            message_ttl: coordination::MESSAGE_TTL,
            max_message_history: coordination::MAX_MESSAGE_HISTORY,
            communication_range: coordination::COMMUNICATION_RANGE,
            knowledge_capacity: coordination::KNOWLEDGE_CAPACITY,
            knowledge_debounce: coordination::KNOWLEDGE_DEBOUNCE,
        }
    }
}

/// Complete configuration surface of the AI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub grid: GridConfig,
    pub pathfinding: PathfindingConfig,
    pub arena: ArenaBounds,
    pub hunter: HunterConfig,
    pub patroller: PatrollerConfig,
    pub blocker: BlockerConfig,
    pub coordination: CoordinationConfig,
    pub tick_delta: f32,
    /// Base seed for per-agent RNGs (agent id is mixed in)
    pub seed: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            pathfinding: PathfindingConfig::default(),
            arena: ArenaBounds::new(
                WorldPosition::new(arena::MIN_X, arena::MIN_Y),
                WorldPosition::new(arena::MAX_X, arena::MAX_Y),
            ),
            hunter: HunterConfig::default(),
            patroller: PatrollerConfig::default(),
            blocker: BlockerConfig::default(),
            coordination: CoordinationConfig::default(),
            tick_delta: arena::TICK_DELTA,
            seed: 0x5EED,
        }
    }
}

impl AiConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: AiConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Reject values that would make the tick loop misbehave
    ///
    /// Everything accepted here must be safe on the per-tick path, which never
    /// returns errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns <= 0 || self.grid.rows <= 0 {
            return Err(ConfigError::Invalid("grid dimensions must be positive".into()));
        }
        positive("grid_cell_size.0", self.grid.cell_size.0)?;
        positive("grid_cell_size.1", self.grid.cell_size.1)?;
        if self.pathfinding.iteration_cap == 0 {
            return Err(ConfigError::Invalid("iteration_cap must be at least 1".into()));
        }

        // NaN bounds fail both comparisons
        let arena = &self.arena;
        if !(arena.min.x <= arena.max.x) || !(arena.min.y <= arena.max.y) {
            return Err(ConfigError::Invalid(format!(
                "arena min ({}, {}) must not exceed max ({}, {})",
                arena.min.x, arena.min.y, arena.max.x, arena.max.y
            )));
        }

        let hunter = &self.hunter;
        non_negative("hunter.detection_radius", hunter.detection_radius)?;
        non_negative("hunter.attack_radius", hunter.attack_radius)?;
        non_negative("hunter.repath_interval", hunter.repath_interval)?;
        non_negative("hunter.patience", hunter.patience)?;
        non_negative("hunter.prediction_factor", hunter.prediction_factor)?;
        non_negative("hunter.wander_radius", hunter.wander_radius)?;
        non_negative("hunter.flank_distance", hunter.flank_distance)?;
        if hunter.attack_radius > hunter.detection_radius {
            return Err(ConfigError::Invalid(
                "attack_radius must not exceed detection_radius".into(),
            ));
        }

        non_negative("patroller.arrival_threshold", self.patroller.arrival_threshold)?;
        non_negative("blocker.arrival_threshold", self.blocker.arrival_threshold)?;
        non_negative("blocker.block_duration", self.blocker.block_duration)?;
        non_negative("blocker.jitter_radius", self.blocker.jitter_radius)?;
        non_negative("blocker.trap_radius", self.blocker.trap_radius)?;

        let coordination = &self.coordination;
        non_negative("coordination.detection_radius", coordination.detection_radius)?;
        non_negative("coordination.communication_range", coordination.communication_range)?;
        non_negative("coordination.knowledge_debounce", coordination.knowledge_debounce)?;
        positive("coordination.message_ttl", coordination.message_ttl)?;
        if coordination.max_message_history == 0 || coordination.knowledge_capacity == 0 {
            return Err(ConfigError::Invalid("history and knowledge capacities must be >= 1".into()));
        }

        if !(0.0..=1.0).contains(&self.patroller.reverse_chance)
            || !(0.0..=1.0).contains(&self.blocker.jitter_chance)
        {
            return Err(ConfigError::Invalid("probabilities must be within 0..=1".into()));
        }
        positive("tick_delta", self.tick_delta)?;
        Ok(())
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be >= 0, got {value}")))
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}
