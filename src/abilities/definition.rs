//! Immutable ability templates.

use serde::{Deserialize, Serialize};

use crate::core::ship::{Era, Ship, ShipClass};

/// How an ability is put into play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityType {
    /// Activated on the owner's turn.
    Active,
    /// Always on while the ship floats.
    Passive,
    /// Activated automatically when one of its triggers fires.
    Triggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityCategory {
    Offensive,
    Defensive,
    Reconnaissance,
    Support,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Acts on the owning ship.
    OwnShip,
    /// Needs a coordinate on the enemy board.
    Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The owner's side fires an attack.
    OnAttack,
    /// The owning ship takes damage and survives.
    OnDamage,
    /// The owner's turn begins.
    OnTurnStart,
}

/// The modifier kinds the combat resolver and processor understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    DamageBoost,
    ArmorPenetration,
    ArmorBoost,
    Reveal,
    Stealth,
    Detection,
}

/// Static description of one effect an ability produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub effect_type: EffectType,
    pub magnitude: f64,
    /// Turns the effect stays live. Ignored for effects spent on the next
    /// attack and for passives.
    #[serde(default)]
    pub duration: u32,
}

impl EffectDescriptor {
    pub const fn new(effect_type: EffectType, magnitude: f64, duration: u32) -> Self {
        Self {
            effect_type,
            magnitude,
            duration,
        }
    }
}

/// Ship constraints an ability needs. Empty lists accept everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRequirements {
    #[serde(default)]
    pub ship_classes: Vec<ShipClass>,
    #[serde(default)]
    pub eras: Vec<Era>,
    #[serde(default)]
    pub min_size: Option<usize>,
}

impl AbilityRequirements {
    pub fn allows_class(&self, class: ShipClass) -> bool {
        self.ship_classes.is_empty() || self.ship_classes.contains(&class)
    }

    pub fn allows_era(&self, era: Era) -> bool {
        self.eras.is_empty() || self.eras.contains(&era)
    }

    pub fn allows_size(&self, size: usize) -> bool {
        self.min_size.map_or(true, |min| size >= min)
    }

    /// Why `ship` fails these requirements, if it does.
    pub fn check(&self, ship: &Ship) -> Result<(), String> {
        if !self.allows_class(ship.class()) {
            return Err(format!("{:?} cannot use this ability", ship.class()));
        }
        if !self.allows_era(ship.era()) {
            return Err(format!("{:?}-era ships cannot use this ability", ship.era()));
        }
        if !self.allows_size(ship.size()) {
            return Err(format!(
                "ship size {} is below the required {}",
                ship.size(),
                self.min_size.unwrap_or(0)
            ));
        }
        Ok(())
    }
}

/// Immutable ability template shared by every instance of the ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub ability_type: AbilityType,
    pub category: AbilityCategory,
    pub target_type: TargetType,
    #[serde(default)]
    pub requirements: AbilityRequirements,
    #[serde(default)]
    pub cooldown_turns: u32,
    /// `None` means unlimited.
    #[serde(default)]
    pub max_uses: Option<u32>,
    pub effects: Vec<EffectDescriptor>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

impl AbilityDefinition {
    /// First descriptor of the given type.
    pub fn effect(&self, effect_type: EffectType) -> Option<&EffectDescriptor> {
        self.effects.iter().find(|e| e.effect_type == effect_type)
    }

    pub fn has_trigger(&self, trigger: Trigger) -> bool {
        self.triggers.contains(&trigger)
    }
}
