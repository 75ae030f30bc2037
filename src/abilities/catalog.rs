//! Built-in ability definitions and the effect implementations keyed by
//! ability id.

use serde::{Deserialize, Serialize};

use super::definition::{
    AbilityCategory, AbilityDefinition, AbilityRequirements, AbilityType, EffectDescriptor,
    EffectType, TargetType, Trigger,
};
use super::effects::{ActiveEffect, EffectSource, EffectTarget, Expiry};
use super::processor::{AbilityContext, AbilityProcessor};
use crate::core::common::{Coord, ErrorCode, ShipId, ValidationResult};
use crate::core::ship::{Era, ShipClass};

/// Damage multiplier of "All Big Guns".
pub const DAMAGE_BOOST_FACTOR: f64 = 1.5;

/// Effect implementation bound to an ability id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    /// Multiplies the next attack's base damage.
    DamageBoost,
    /// Reduces target armor for a number of turns.
    ArmorPiercing,
    /// Reveals a square area of the enemy board.
    Reveal,
    /// Lets the ship evade attackers with weaker detection.
    Stealth,
    /// Counters enemy stealth.
    Detection,
    /// Adds to the ship's armor rating.
    ArmorBoost,
}

/// What a successful effect function produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectOutcome {
    pub effects: Vec<ActiveEffect>,
    pub messages: Vec<String>,
    pub detected_ships: Vec<ShipId>,
    pub revealed_cells: Vec<Coord>,
}

impl AbilityKind {
    /// The descriptor type a definition must carry for this implementation.
    pub fn effect_type(&self) -> EffectType {
        match self {
            AbilityKind::DamageBoost => EffectType::DamageBoost,
            AbilityKind::ArmorPiercing => EffectType::ArmorPenetration,
            AbilityKind::Reveal => EffectType::Reveal,
            AbilityKind::Stealth => EffectType::Stealth,
            AbilityKind::Detection => EffectType::Detection,
            AbilityKind::ArmorBoost => EffectType::ArmorBoost,
        }
    }

    /// Ability-specific predicate, run after the generic lifecycle checks.
    pub fn validate(
        &self,
        def: &AbilityDefinition,
        ctx: &AbilityContext<'_>,
        processor: &AbilityProcessor,
        result: &mut ValidationResult,
    ) {
        match self {
            AbilityKind::DamageBoost => {
                if processor.has_effect(ctx.ship.id(), EffectType::DamageBoost) {
                    result.error(
                        ErrorCode::EffectAlreadyActive,
                        format!("{} already has a damage boost loaded", ctx.ship.name()),
                    );
                }
            }
            AbilityKind::Reveal => match ctx.target {
                Some(c) if ctx.enemy_board.in_bounds(c) => {}
                Some(c) => result.error(
                    ErrorCode::InvalidTarget,
                    format!("{} target {} is off the enemy board", def.name, c),
                ),
                None => result.error(
                    ErrorCode::InvalidTarget,
                    format!("{} needs a target coordinate", def.name),
                ),
            },
            _ => {
                if def.target_type == TargetType::Coordinate && ctx.target.is_none() {
                    result.error(
                        ErrorCode::InvalidTarget,
                        format!("{} needs a target coordinate", def.name),
                    );
                }
            }
        }
    }

    /// Run the effect. Only called once validation passed.
    pub fn execute(&self, def: &AbilityDefinition, ctx: &mut AbilityContext<'_>) -> EffectOutcome {
        let effect_type = self.effect_type();
        let descriptor = def
            .effect(effect_type)
            .copied()
            .unwrap_or(EffectDescriptor::new(effect_type, 0.0, 0));
        let source = EffectSource {
            ability_id: def.id.clone(),
            ship_id: ctx.ship.id(),
            player: ctx.player,
        };
        let mut outcome = EffectOutcome::default();
        let (expiry, target) = match self {
            AbilityKind::DamageBoost => {
                outcome.messages.push(format!(
                    "{} loads a x{} salvo for the next attack",
                    ctx.ship.name(),
                    descriptor.magnitude
                ));
                (Expiry::NextAttack, EffectTarget::Ship(ctx.ship.id()))
            }
            AbilityKind::Reveal => {
                let center = ctx.target.unwrap_or(Coord::new(0, 0));
                let radius = descriptor.magnitude.max(0.0) as usize;
                let area = square_area(center, radius, ctx.enemy_board.width(), ctx.enemy_board.height());
                let detected = ctx.enemy_board.reveal(&area);
                outcome.messages.push(format!(
                    "{} reveals {} cells around {}; {} ship(s) detected",
                    def.name,
                    area.len(),
                    center,
                    detected.len()
                ));
                outcome.detected_ships = detected;
                outcome.revealed_cells = area.clone();
                (Expiry::Turns, EffectTarget::Area(area))
            }
            _ => {
                outcome.messages.push(format!(
                    "{} gains {:?} {} for {} turn(s)",
                    ctx.ship.name(),
                    effect_type,
                    descriptor.magnitude,
                    descriptor.duration
                ));
                (Expiry::Turns, EffectTarget::Ship(ctx.ship.id()))
            }
        };
        let remaining_duration = match expiry {
            Expiry::Turns => descriptor.duration.max(1),
            Expiry::NextAttack => 1,
            Expiry::Permanent => 0,
        };
        outcome.effects.push(ActiveEffect {
            effect_type,
            magnitude: descriptor.magnitude,
            remaining_duration,
            expiry,
            source,
            target: Some(target),
            applied_turn: ctx.turn,
        });
        outcome
    }
}

/// In-bounds cells within Chebyshev distance `radius` of `center`, row-major.
pub fn square_area(center: Coord, radius: usize, width: usize, height: usize) -> Vec<Coord> {
    let x0 = center.x.saturating_sub(radius);
    let y0 = center.y.saturating_sub(radius);
    let x1 = center.x.saturating_add(radius).min(width.saturating_sub(1));
    let y1 = center.y.saturating_add(radius).min(height.saturating_sub(1));
    let mut cells = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            cells.push(Coord::new(x, y));
        }
    }
    cells
}

/// Implementation for a built-in ability id.
pub fn implementation_for(id: &str) -> Option<AbilityKind> {
    let kind = match id {
        "all_big_guns" => AbilityKind::DamageBoost,
        "armor_piercing" | "rangefinder" => AbilityKind::ArmorPiercing,
        "air_scout" => AbilityKind::Reveal,
        "smoke_screen" | "silent_running" => AbilityKind::Stealth,
        "sonar_ping" | "radar_sweep" => AbilityKind::Detection,
        "damage_control" | "reinforced_hull" => AbilityKind::ArmorBoost,
        _ => return None,
    };
    Some(kind)
}

struct Builtin {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    ability_type: AbilityType,
    category: AbilityCategory,
    target_type: TargetType,
    classes: &'static [ShipClass],
    eras: &'static [Era],
    min_size: Option<usize>,
    cooldown: u32,
    uses: Option<u32>,
    effect: EffectDescriptor,
    triggers: &'static [Trigger],
}

const BUILTIN: &[Builtin] = &[
    Builtin {
        id: "all_big_guns",
        name: "All Big Guns",
        description: "Uniform main battery: the next attack deals 1.5x base damage.",
        ability_type: AbilityType::Active,
        category: AbilityCategory::Offensive,
        target_type: TargetType::OwnShip,
        classes: &[ShipClass::Battleship],
        eras: &[Era::Dreadnought, Era::WorldWar1],
        min_size: None,
        cooldown: 3,
        uses: Some(2),
        effect: EffectDescriptor::new(EffectType::DamageBoost, DAMAGE_BOOST_FACTOR, 1),
        triggers: &[],
    },
    Builtin {
        id: "armor_piercing",
        name: "Armor Piercing Shells",
        description: "Ignore 3 points of target armor for two turns.",
        ability_type: AbilityType::Active,
        category: AbilityCategory::Offensive,
        target_type: TargetType::OwnShip,
        classes: &[ShipClass::Battleship, ShipClass::Cruiser],
        eras: &[],
        min_size: Some(3),
        cooldown: 2,
        uses: None,
        effect: EffectDescriptor::new(EffectType::ArmorPenetration, 3.0, 2),
        triggers: &[],
    },
    Builtin {
        id: "air_scout",
        name: "Air Scout",
        description: "Reveal a 3x3 area of the enemy board for two turns.",
        ability_type: AbilityType::Active,
        category: AbilityCategory::Reconnaissance,
        target_type: TargetType::Coordinate,
        classes: &[ShipClass::Carrier],
        eras: &[Era::WorldWar2, Era::Modern],
        min_size: None,
        cooldown: 3,
        uses: Some(3),
        effect: EffectDescriptor::new(EffectType::Reveal, 1.0, 2),
        triggers: &[],
    },
    Builtin {
        id: "smoke_screen",
        name: "Smoke Screen",
        description: "Hide the ship from attackers without detection for two turns.",
        ability_type: AbilityType::Active,
        category: AbilityCategory::Defensive,
        target_type: TargetType::OwnShip,
        classes: &[ShipClass::Destroyer, ShipClass::Cruiser],
        eras: &[],
        min_size: None,
        cooldown: 4,
        uses: Some(2),
        effect: EffectDescriptor::new(EffectType::Stealth, 1.0, 2),
        triggers: &[],
    },
    Builtin {
        id: "sonar_ping",
        name: "Sonar Ping",
        description: "Detect stealthed ships for two turns.",
        ability_type: AbilityType::Active,
        category: AbilityCategory::Reconnaissance,
        target_type: TargetType::OwnShip,
        classes: &[ShipClass::Destroyer, ShipClass::Submarine],
        eras: &[Era::WorldWar2, Era::Modern],
        min_size: None,
        cooldown: 3,
        uses: None,
        effect: EffectDescriptor::new(EffectType::Detection, 1.0, 2),
        triggers: &[],
    },
    Builtin {
        id: "silent_running",
        name: "Silent Running",
        description: "Go quiet and evade attackers through the next enemy turn.",
        ability_type: AbilityType::Active,
        category: AbilityCategory::Defensive,
        target_type: TargetType::OwnShip,
        classes: &[ShipClass::Submarine],
        eras: &[],
        min_size: None,
        cooldown: 3,
        uses: None,
        effect: EffectDescriptor::new(EffectType::Stealth, 1.0, 2),
        triggers: &[],
    },
    Builtin {
        id: "damage_control",
        name: "Damage Control",
        description: "When hit, crews shore up the hull: +2 armor for two turns.",
        ability_type: AbilityType::Triggered,
        category: AbilityCategory::Defensive,
        target_type: TargetType::OwnShip,
        classes: &[],
        eras: &[Era::WorldWar2, Era::Modern],
        min_size: Some(3),
        cooldown: 3,
        uses: None,
        effect: EffectDescriptor::new(EffectType::ArmorBoost, 2.0, 2),
        triggers: &[Trigger::OnDamage],
    },
    Builtin {
        id: "radar_sweep",
        name: "Radar Sweep",
        description: "At turn start, detect stealthed ships for one turn.",
        ability_type: AbilityType::Triggered,
        category: AbilityCategory::Reconnaissance,
        target_type: TargetType::OwnShip,
        classes: &[ShipClass::Destroyer, ShipClass::Cruiser],
        eras: &[Era::Modern],
        min_size: None,
        cooldown: 2,
        uses: None,
        effect: EffectDescriptor::new(EffectType::Detection, 1.0, 1),
        triggers: &[Trigger::OnTurnStart],
    },
    Builtin {
        id: "rangefinder",
        name: "Rangefinder",
        description: "Optical fire control: attacks ignore 1 armor this turn.",
        ability_type: AbilityType::Triggered,
        category: AbilityCategory::Offensive,
        target_type: TargetType::OwnShip,
        classes: &[ShipClass::Battleship, ShipClass::Cruiser],
        eras: &[Era::WorldWar1, Era::WorldWar2],
        min_size: None,
        cooldown: 4,
        uses: None,
        effect: EffectDescriptor::new(EffectType::ArmorPenetration, 1.0, 1),
        triggers: &[Trigger::OnAttack],
    },
    Builtin {
        id: "reinforced_hull",
        name: "Reinforced Hull",
        description: "Permanent +1 armor.",
        ability_type: AbilityType::Passive,
        category: AbilityCategory::Defensive,
        target_type: TargetType::OwnShip,
        classes: &[ShipClass::Battleship, ShipClass::Carrier],
        eras: &[],
        min_size: Some(4),
        cooldown: 0,
        uses: None,
        effect: EffectDescriptor::new(EffectType::ArmorBoost, 1.0, 0),
        triggers: &[],
    },
];

/// Every built-in ability definition, in registration order.
pub fn builtin_definitions() -> Vec<AbilityDefinition> {
    BUILTIN
        .iter()
        .map(|s| AbilityDefinition {
            id: s.id.to_string(),
            name: s.name.to_string(),
            description: s.description.to_string(),
            ability_type: s.ability_type,
            category: s.category,
            target_type: s.target_type,
            requirements: AbilityRequirements {
                ship_classes: s.classes.to_vec(),
                eras: s.eras.to_vec(),
                min_size: s.min_size,
            },
            cooldown_turns: s.cooldown,
            max_uses: s.uses,
            effects: vec![s.effect],
            triggers: s.triggers.to_vec(),
        })
        .collect()
}
