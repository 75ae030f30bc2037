//! Timed modifiers produced by abilities.

use serde::{Deserialize, Serialize};

use super::definition::EffectType;
use crate::core::common::{Coord, PlayerId, ShipId};

/// When an effect ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiry {
    /// Counts down once per owner turn end.
    Turns,
    /// Spent by the owner's next attack; turn ends do not touch it.
    NextAttack,
    /// Lives as long as the source ability is enabled.
    Permanent,
}

/// Who produced an effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSource {
    pub ability_id: String,
    pub ship_id: ShipId,
    pub player: PlayerId,
}

/// What an effect applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    Coordinate(Coord),
    Area(Vec<Coord>),
    Ship(ShipId),
}

/// A live modifier attached to an ability instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub effect_type: EffectType,
    pub magnitude: f64,
    pub remaining_duration: u32,
    pub expiry: Expiry,
    pub source: EffectSource,
    pub target: Option<EffectTarget>,
    pub applied_turn: u32,
}

impl ActiveEffect {
    pub fn applies_to_ship(&self, ship: ShipId) -> bool {
        match &self.target {
            Some(EffectTarget::Ship(id)) => *id == ship,
            None => self.source.ship_id == ship,
            _ => false,
        }
    }

    pub fn is_live(&self) -> bool {
        match self.expiry {
            Expiry::Turns => self.remaining_duration > 0,
            Expiry::NextAttack | Expiry::Permanent => true,
        }
    }

    /// Cells covered by a coordinate or area target.
    pub fn cells(&self) -> &[Coord] {
        match &self.target {
            Some(EffectTarget::Area(cells)) => cells,
            Some(EffectTarget::Coordinate(c)) => core::slice::from_ref(c),
            _ => &[],
        }
    }
}
