//! AI strategy engine: memory, interchangeable strategies and the factory
//! that ranks them.

pub mod abilities;
pub mod factory;
pub mod memory;
pub mod placement;
pub mod strategy;
pub mod targeting;

use serde::{Deserialize, Serialize};

pub use abilities::{DefensiveAbilities, OffensiveAbilities};
pub use factory::StrategyFactory;
pub use memory::{AiMemory, KnownHit, SunkShip};
pub use placement::{ClusteredPlacement, DistributedPlacement};
pub use strategy::{Recommendation, Strategy, StrategyContext, StrategyKind, StrategyResult};
pub use targeting::{calc_density, HuntTarget, ProbabilityDensity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorProfile {
    Aggressive,
    Balanced,
    Defensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub difficulty: Difficulty,
    pub behavior: BehaviorProfile,
    /// Randomized tries per ship before the exhaustive scan.
    pub clustered_attempts: usize,
    pub distributed_attempts: usize,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Advanced,
            behavior: BehaviorProfile::Balanced,
            clustered_attempts: 100,
            distributed_attempts: 50,
        }
    }
}
