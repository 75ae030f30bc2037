//! Ship definitions, placements and damage bookkeeping.

use core::fmt;
use serde::{Deserialize, Serialize};

use super::common::{Coord, PlayerId, ShipId};

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

    /// Cells covered by a ship of `len` anchored at `origin`. Coordinates
    /// saturate at `usize::MAX`; callers bound-check with [`Board::fits`].
    ///
    /// [`Board::fits`]: crate::core::board::Board::fits
    pub fn cells(self, origin: Coord, len: usize) -> impl Iterator<Item = Coord> {
        (0..len).map(move |k| match self {
            Orientation::Horizontal => Coord::new(origin.x.saturating_add(k), origin.y),
            Orientation::Vertical => Coord::new(origin.x, origin.y.saturating_add(k)),
        })
    }
}

/// Hull class. Ability eligibility is keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipClass {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

/// Technological era of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    Dreadnought,
    WorldWar1,
    WorldWar2,
    Modern,
}

/// Static ship configuration loaded once at battle start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipType {
    pub id: String,
    pub name: String,
    pub class: ShipClass,
    pub era: Era,
    pub size: usize,
    /// Defaults to `size` when omitted.
    #[serde(default)]
    pub hit_points: Option<u32>,
    #[serde(default)]
    pub armor: u32,
    #[serde(default)]
    pub firepower: u32,
    /// Abilities this type asks for, ahead of the class defaults.
    #[serde(default)]
    pub abilities: Vec<String>,
}

impl ShipType {
    pub fn new(id: &str, name: &str, class: ShipClass, era: Era, size: usize) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            class,
            era,
            size,
            hit_points: None,
            armor: 0,
            firepower: 1,
            abilities: Vec::new(),
        }
    }

    pub fn with_ratings(mut self, armor: u32, firepower: u32) -> Self {
        self.armor = armor;
        self.firepower = firepower;
        self
    }

    pub fn with_abilities(mut self, ids: &[&str]) -> Self {
        self.abilities = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn max_hit_points(&self) -> u32 {
        self.hit_points.unwrap_or(self.size as u32)
    }
}

/// A requested placement of a ship type on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipPlacement {
    pub ship_type: String,
    pub origin: Coord,
    pub orientation: Orientation,
}

impl ShipPlacement {
    pub fn new(ship_type: &str, origin: Coord, orientation: Orientation) -> Self {
        Self {
            ship_type: ship_type.to_string(),
            origin,
            orientation,
        }
    }
}

/// Outcome of applying damage to a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Hit points were reduced; the ship is still afloat.
    Damaged,
    /// This damage took the ship to zero hit points.
    Sunk,
    /// The ship was already sunk; nothing changed.
    AlreadySunk,
}

/// A ship placed in a battle.
///
/// `is_sunk` is true exactly when `hit_points` is zero, and once set it never
/// clears. Both only change through [`Ship::apply_damage`].
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    id: ShipId,
    owner: PlayerId,
    type_id: String,
    name: String,
    class: ShipClass,
    era: Era,
    size: usize,
    hit_points: u32,
    max_hit_points: u32,
    armor: u32,
    firepower: u32,
    positions: Vec<Coord>,
    hits: Vec<Coord>,
    is_sunk: bool,
    sunk_on_turn: Option<u32>,
    abilities: Vec<crate::abilities::AbilityInstanceId>,
}

impl Ship {
    /// Build a ship from its static type at the given placement.
    pub fn new(
        id: ShipId,
        owner: PlayerId,
        ship_type: &ShipType,
        origin: Coord,
        orientation: Orientation,
    ) -> Self {
        let max_hit_points = ship_type.max_hit_points();
        Self {
            id,
            owner,
            type_id: ship_type.id.clone(),
            name: ship_type.name.clone(),
            class: ship_type.class,
            era: ship_type.era,
            size: ship_type.size,
            hit_points: max_hit_points,
            max_hit_points,
            armor: ship_type.armor,
            firepower: ship_type.firepower,
            positions: orientation.cells(origin, ship_type.size).collect(),
            hits: Vec::new(),
            is_sunk: max_hit_points == 0,
            sunk_on_turn: None,
            abilities: Vec::new(),
        }
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    pub fn era(&self) -> Era {
        self.era
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hit_points(&self) -> u32 {
        self.hit_points
    }

    pub fn max_hit_points(&self) -> u32 {
        self.max_hit_points
    }

    pub fn armor(&self) -> u32 {
        self.armor
    }

    pub fn firepower(&self) -> u32 {
        self.firepower
    }

    /// Occupied cells, bow first.
    pub fn positions(&self) -> &[Coord] {
        &self.positions
    }

    /// Cells hit so far, in hit order.
    pub fn hits(&self) -> &[Coord] {
        &self.hits
    }

    pub fn is_sunk(&self) -> bool {
        self.is_sunk
    }

    pub fn sunk_on_turn(&self) -> Option<u32> {
        self.sunk_on_turn
    }

    pub fn abilities(&self) -> &[crate::abilities::AbilityInstanceId] {
        &self.abilities
    }

    pub(crate) fn attach_ability(&mut self, id: crate::abilities::AbilityInstanceId) {
        self.abilities.push(id);
    }

    pub fn occupies(&self, coord: Coord) -> bool {
        self.positions.contains(&coord)
    }

    /// Record that `coord` was struck. Returns `false` if the ship does not
    /// occupy it or it was already struck.
    pub(crate) fn register_hit(&mut self, coord: Coord) -> bool {
        if !self.occupies(coord) || self.hits.contains(&coord) {
            return false;
        }
        self.hits.push(coord);
        true
    }

    /// Subtract `amount` hit points, saturating at zero. Sinking happens
    /// exactly once and records the turn.
    pub(crate) fn apply_damage(&mut self, amount: u32, turn: u32) -> DamageOutcome {
        if self.is_sunk {
            return DamageOutcome::AlreadySunk;
        }
        self.hit_points = self.hit_points.saturating_sub(amount);
        if self.hit_points == 0 {
            self.is_sunk = true;
            self.sunk_on_turn = Some(turn);
            DamageOutcome::Sunk
        } else {
            DamageOutcome::Damaged
        }
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ id: {}, name: \"{}\", hp: {}/{}, cells: {:?}, hits: {}, sunk: {} }}",
            self.id,
            self.name,
            self.hit_points,
            self.max_hit_points,
            self.positions,
            self.hits.len(),
            self.is_sunk,
        )
    }
}
