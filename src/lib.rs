//! Arena AI: tactical decision-making for a 2D chase arena
//!
//! Each frame the host hands a [`WorldSnapshot`] to an [`ArenaSimulation`],
//! which updates every agent (hunter, patroller, blocker) against it, routes
//! their reports through the [`CoordinationHub`] and returns one
//! [`MotionDirective`] per agent. Movement itself stays with the host.

pub mod config;
pub mod coordination;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod npc;
pub mod sim;
pub mod storage;
pub mod world;

pub use config::AiConfig;
pub use coordination::{CoordinationHub, Message, MessagePayload, SharedHub};
pub use error::{AgentError, ConfigError, RunnerError, SnapshotError};
pub use geometry::{ArenaBounds, Vec2, WorldPosition};
pub use grid::{GridPathfinder, GridSpec, Path};
pub use npc::{Agent, AgentBehavior, AgentStatus, DirectiveKind, MotionDirective, Role};
pub use sim::{ArenaSimulation, SimulationRunner, TickOutput};
pub use world::{AgentRecord, PlayerState, WorldSnapshot};
