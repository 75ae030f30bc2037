//! The strategy seam: every decision algorithm implements [`Strategy`] and is
//! ranked per turn by the factory.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::memory::AiMemory;
use super::AiSettings;
use crate::abilities::ReadyAbility;
use crate::core::common::{Coord, ShipId};
use crate::core::ship::{ShipPlacement, ShipType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Targeting,
    Placement,
    Ability,
}

/// The action a strategy recommends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recommendation {
    Attack {
        target: Coord,
    },
    Placement {
        placements: Vec<ShipPlacement>,
    },
    Ability {
        ship: ShipId,
        ability_id: String,
        target: Option<Coord>,
    },
    /// Nothing worth doing.
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: String,
    pub action: Recommendation,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Recommendation>,
}

impl StrategyResult {
    pub fn new(strategy: &str, action: Recommendation, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            strategy: strategy.to_string(),
            action,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<Recommendation>) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Target coordinate when the action is an attack.
    pub fn attack_target(&self) -> Option<Coord> {
        match self.action {
            Recommendation::Attack { target } => Some(target),
            _ => None,
        }
    }
}

/// Read-only view a strategy decides from.
pub struct StrategyContext<'a> {
    pub settings: &'a AiSettings,
    pub memory: &'a AiMemory,
    pub width: usize,
    pub height: usize,
    /// Enemy ship lengths not yet confirmed sunk.
    pub remaining_sizes: &'a [usize],
    /// Own roster, used for placement.
    pub fleet: &'a [ShipType],
    pub ready_abilities: &'a [ReadyAbility],
    /// Damage taken by the own fleet, in `[0, 1]`.
    pub threat: f64,
    pub turn: u32,
}

impl StrategyContext<'_> {
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// All cells, row-major.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| Coord::new(x, y)))
    }

    /// Cells never fired at, row-major.
    pub fn unshot(&self) -> Vec<Coord> {
        self.coords().filter(|c| !self.memory.has_shot(*c)).collect()
    }
}

/// A decision algorithm.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> StrategyKind;

    fn is_applicable(&self, ctx: &StrategyContext<'_>) -> bool;

    /// Score in `[0, 1]` used to rank applicable strategies.
    fn calculate_priority(&self, ctx: &StrategyContext<'_>) -> f64;

    fn execute(&self, ctx: &StrategyContext<'_>, rng: &mut SmallRng) -> StrategyResult;
}
