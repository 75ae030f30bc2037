//! Decides which abilities a ship receives.

use std::collections::HashMap;

use super::registry::AbilityRegistry;
use crate::core::config::DEFAULT_MAX_ABILITIES_PER_SHIP;
use crate::core::ship::{Era, ShipClass, ShipType};

/// Maps ship class and era to eligible ability ids, derived from the
/// registry's requirement lists.
#[derive(Debug, Clone)]
pub struct AbilityFactory {
    by_class: HashMap<ShipClass, Vec<String>>,
    by_era: HashMap<Era, Vec<String>>,
    min_size: HashMap<String, usize>,
    max_per_ship: usize,
}

const CLASSES: [ShipClass; 5] = [
    ShipClass::Carrier,
    ShipClass::Battleship,
    ShipClass::Cruiser,
    ShipClass::Submarine,
    ShipClass::Destroyer,
];
const ERAS: [Era; 4] = [Era::Dreadnought, Era::WorldWar1, Era::WorldWar2, Era::Modern];

impl AbilityFactory {
    pub fn new(registry: &AbilityRegistry) -> Self {
        Self::with_limit(registry, DEFAULT_MAX_ABILITIES_PER_SHIP)
    }

    pub fn with_limit(registry: &AbilityRegistry, max_per_ship: usize) -> Self {
        let mut by_class: HashMap<ShipClass, Vec<String>> = HashMap::new();
        let mut by_era: HashMap<Era, Vec<String>> = HashMap::new();
        let mut min_size = HashMap::new();
        for def in registry.definitions() {
            for class in CLASSES {
                if def.requirements.allows_class(class) {
                    by_class.entry(class).or_default().push(def.id.clone());
                }
            }
            for era in ERAS {
                if def.requirements.allows_era(era) {
                    by_era.entry(era).or_default().push(def.id.clone());
                }
            }
            if let Some(min) = def.requirements.min_size {
                min_size.insert(def.id.clone(), min);
            }
        }
        Self {
            by_class,
            by_era,
            min_size,
            max_per_ship,
        }
    }

    pub fn max_per_ship(&self) -> usize {
        self.max_per_ship
    }

    pub fn class_abilities(&self, class: ShipClass) -> &[String] {
        self.by_class.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn era_abilities(&self, era: Era) -> &[String] {
        self.by_era.get(&era).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when class, era and size constraints all pass.
    pub fn is_eligible(&self, ship_type: &ShipType, ability_id: &str) -> bool {
        let class_ok = self.class_abilities(ship_type.class).iter().any(|a| a == ability_id);
        let era_ok = self.era_abilities(ship_type.era).iter().any(|a| a == ability_id);
        let size_ok = self
            .min_size
            .get(ability_id)
            .map_or(true, |&min| ship_type.size >= min);
        class_ok && era_ok && size_ok
    }

    /// Ability ids to instantiate for `ship_type`: the type's own list first,
    /// then the class defaults, keeping only eligible ids, capped per ship.
    pub fn abilities_for(&self, ship_type: &ShipType) -> Vec<String> {
        let mut chosen: Vec<String> = Vec::new();
        let candidates = ship_type
            .abilities
            .iter()
            .chain(self.class_abilities(ship_type.class).iter());
        for id in candidates {
            if chosen.len() >= self.max_per_ship {
                break;
            }
            if chosen.contains(id) {
                continue;
            }
            if self.is_eligible(ship_type, id) {
                chosen.push(id.clone());
            } else {
                log::debug!("{} is not eligible for {}", id, ship_type.name);
            }
        }
        chosen
    }
}
