// Simulation layer
// Per-frame tick loop plus the headless runner used for tuning and benchmarks

pub mod metrics;
pub mod player;
pub mod runner;
pub mod tick;

pub use metrics::{MetricsCollector, SimulationMetrics};
pub use player::{PlayerStrategy, ScriptedPlayer};
pub use runner::{ObstacleDensity, RunnerConfig, SimulationRunner};
pub use tick::{AgentDirective, ArenaSimulation, TickOutput, TickReport};
