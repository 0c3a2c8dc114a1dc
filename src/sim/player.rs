// Scripted player used by the headless runner

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geometry::{ArenaBounds, WorldPosition};

/// Player movement script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStrategy {
    /// Run away from the closest agent
    Evasive,
    /// Seeded random walk, one of {-2, 0, 2} per axis each tick
    Random,
    /// Walk from fruit to fruit
    Strategic,
}

/// Pixels per tick
const EVASIVE_SPEED: f32 = 3.0;
const STRATEGIC_SPEED: f32 = 2.0;
const RANDOM_STEP: f32 = 2.0;
/// Fruit is picked up inside this distance
const PICKUP_RADIUS: f32 = 10.0;
const DEFAULT_SEED: u64 = 0x91A7;

#[derive(Debug, Clone)]
pub struct ScriptedPlayer {
    pub position: WorldPosition,
    pub alive: bool,
    strategy: PlayerStrategy,
    fruits: Vec<WorldPosition>,
    collected: usize,
    bounds: ArenaBounds,
    rng: StdRng,
}

impl ScriptedPlayer {
    pub fn new(position: WorldPosition, strategy: PlayerStrategy, fruits: Vec<WorldPosition>, bounds: ArenaBounds) -> Self {
        Self {
            position,
            alive: true,
            strategy,
            fruits,
            collected: 0,
            bounds,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
        }
    }

    /// Reseed the random walk
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn strategy(&self) -> PlayerStrategy {
        self.strategy
    }

    pub fn fruits_collected(&self) -> usize {
        self.collected
    }

    /// Advance one tick given the agents' current positions
    pub fn step(&mut self, agents: &[WorldPosition]) {
        if !self.alive {
            return;
        }

        let next = match self.strategy {
            PlayerStrategy::Evasive => {
                let closest = agents
                    .iter()
                    .min_by(|a, b| a.distance_squared_to(&self.position).total_cmp(&b.distance_squared_to(&self.position)));
                match closest {
                    Some(threat) => self.position.offset(threat.direction_to(&self.position).scale(EVASIVE_SPEED)),
                    None => self.position,
                }
            }
            PlayerStrategy::Strategic => match self.fruits.first().copied() {
                Some(fruit) => {
                    if self.position.distance_to(&fruit) <= PICKUP_RADIUS {
                        self.fruits.remove(0);
                        self.collected += 1;
                        self.position
                    } else {
                        self.position.offset(self.position.direction_to(&fruit).scale(STRATEGIC_SPEED))
                    }
                }
                None => self.position,
            },
            PlayerStrategy::Random => {
                let dx = self.rng.random_range(-1..=1) as f32 * RANDOM_STEP;
                let dy = self.rng.random_range(-1..=1) as f32 * RANDOM_STEP;
                WorldPosition::new(self.position.x + dx, self.position.y + dy)
            }
        };

        self.position = self.bounds.clamp(next);
    }
}
