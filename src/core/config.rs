use core::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ship::{Era, ShipClass, ShipType};
use crate::abilities::{builtin_definitions, AbilityDefinition, AbilityRegistry, AbilitySettings, RegistryError};
use crate::ai::AiSettings;
use crate::combat::CombatSettings;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 10;

/// Ship lengths of the standard fleet, largest first.
pub const STANDARD_FLEET_SIZES: [usize; 5] = [5, 4, 3, 3, 2];

/// Smallest ship length; the checkerboard scan relies on it being 2.
pub const MIN_SHIP_SIZE: usize = 2;

pub const DEFAULT_MAX_ABILITIES_PER_SHIP: usize = 2;

/// Per-cell damage multiplier for area attacks.
pub const DEFAULT_AREA_MULTIPLIER: f64 = 0.5;

pub const NORMAL_ATTACK_DAMAGE: u32 = 1;
pub const SPECIAL_ATTACK_DAMAGE: u32 = 2;

/// The standard five-ship roster.
pub fn standard_fleet() -> Vec<ShipType> {
    vec![
        ShipType::new("carrier", "Carrier", ShipClass::Carrier, Era::WorldWar2, 5)
            .with_ratings(2, 1)
            .with_abilities(&["air_scout", "damage_control"]),
        ShipType::new("battleship", "Battleship", ShipClass::Battleship, Era::Dreadnought, 4)
            .with_ratings(4, 4)
            .with_abilities(&["all_big_guns"]),
        ShipType::new("cruiser", "Cruiser", ShipClass::Cruiser, Era::WorldWar1, 3)
            .with_ratings(2, 2)
            .with_abilities(&["rangefinder"]),
        ShipType::new("submarine", "Submarine", ShipClass::Submarine, Era::WorldWar2, 3)
            .with_ratings(0, 2)
            .with_abilities(&["silent_running"]),
        ShipType::new("destroyer", "Destroyer", ShipClass::Destroyer, Era::Modern, 2)
            .with_ratings(1, 1)
            .with_abilities(&["radar_sweep"]),
    ]
}

/// Errors raised while loading or checking a battle configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Io(String),
    InvalidBoard { width: usize, height: usize },
    EmptyFleet,
    ShipTooLarge { id: String, size: usize },
    DuplicateShipType(String),
    Registry(RegistryError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "Failed to parse configuration: {}", e),
            ConfigError::Io(e) => write!(f, "Failed to read configuration: {}", e),
            ConfigError::InvalidBoard { width, height } => {
                write!(f, "Board {}x{} is not playable", width, height)
            }
            ConfigError::EmptyFleet => write!(f, "Fleet roster is empty"),
            ConfigError::ShipTooLarge { id, size } => {
                write!(f, "Ship type '{}' of size {} does not fit the board", id, size)
            }
            ConfigError::DuplicateShipType(id) => write!(f, "Ship type '{}' is listed twice", id),
            ConfigError::Registry(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<RegistryError> for ConfigError {
    fn from(err: RegistryError) -> Self {
        ConfigError::Registry(err)
    }
}

/// Static configuration of a battle, loaded once at battle start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub width: usize,
    pub height: usize,
    pub fleet: Vec<ShipType>,
    pub abilities: Vec<AbilityDefinition>,
    pub combat: CombatSettings,
    pub ability_settings: AbilitySettings,
    pub ai: AiSettings,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            fleet: standard_fleet(),
            abilities: builtin_definitions(),
            combat: CombatSettings::default(),
            ability_settings: AbilitySettings::default(),
            ai: AiSettings::default(),
        }
    }
}

impl BattleConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject rosters that cannot be played on the configured board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidBoard {
                width: self.width,
                height: self.height,
            });
        }
        if self.fleet.is_empty() {
            return Err(ConfigError::EmptyFleet);
        }
        for (i, ship) in self.fleet.iter().enumerate() {
            if ship.size == 0 || (ship.size > self.width && ship.size > self.height) {
                return Err(ConfigError::ShipTooLarge {
                    id: ship.id.clone(),
                    size: ship.size,
                });
            }
            if self.fleet[..i].iter().any(|s| s.id == ship.id) {
                return Err(ConfigError::DuplicateShipType(ship.id.clone()));
            }
        }
        Ok(())
    }

    /// Build the ability registry for these definitions.
    pub fn registry(&self) -> Result<AbilityRegistry, ConfigError> {
        Ok(AbilityRegistry::from_definitions(self.abilities.clone())?)
    }

    pub fn ship_type(&self, id: &str) -> Option<&ShipType> {
        self.fleet.iter().find(|s| s.id == id)
    }

    /// Ship lengths of the configured roster, in roster order.
    pub fn fleet_sizes(&self) -> Vec<usize> {
        self.fleet.iter().map(|s| s.size).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_matches_standard_sizes() {
        let config = BattleConfig::default();
        assert_eq!(config.fleet_sizes(), STANDARD_FLEET_SIZES.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = BattleConfig::from_json_str(r#"{ "width": 8, "height": 8 }"#).unwrap();
        assert_eq!(config.width, 8);
        assert_eq!(config.fleet.len(), 5);
    }

    #[test]
    fn oversized_ship_is_rejected() {
        let json = r#"{ "width": 3, "height": 3,
            "fleet": [{ "id": "big", "name": "Big", "class": "carrier", "era": "modern", "size": 5 }] }"#;
        assert!(matches!(
            BattleConfig::from_json_str(json),
            Err(ConfigError::ShipTooLarge { .. })
        ));
    }
}
