pub mod agent;  // Role dispatch + AgentBehavior trait
pub mod blocker;
pub mod directive;
pub mod hunter;
pub mod patroller;
pub mod perception;
pub mod status;  // Bitwise per-tick state flags
pub mod steering;  // Cached path following + final approach

pub use agent::{Agent, AgentBehavior, Role};
pub use blocker::Blocker;
pub use directive::{DirectiveKind, MotionDirective};
pub use hunter::{Hunter, HunterMode};
pub use patroller::{Patroller, Waypoint};
pub use perception::Perception;
pub use status::AgentStatus;
pub use steering::PathFollower;
