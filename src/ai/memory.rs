//! What one AI agent has learned about the enemy board.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::combat::{AttackOutcome, AttackResult};
use crate::core::common::{Coord, ShipId};

/// A confirmed hit and, when reported, the ship it landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownHit {
    pub coord: Coord,
    pub ship: Option<ShipId>,
}

/// A ship confirmed sunk, with every position known to belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunkShip {
    pub ship_id: ShipId,
    pub size: usize,
    pub positions: Vec<Coord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiMemory {
    shots_fired: BTreeSet<Coord>,
    hits: Vec<KnownHit>,
    misses: Vec<Coord>,
    sunk_ships: Vec<SunkShip>,
}

impl AiMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shots_fired(&self) -> &BTreeSet<Coord> {
        &self.shots_fired
    }

    pub fn hits(&self) -> &[KnownHit] {
        &self.hits
    }

    pub fn misses(&self) -> &[Coord] {
        &self.misses
    }

    pub fn sunk_ships(&self) -> &[SunkShip] {
        &self.sunk_ships
    }

    pub fn has_shot(&self, coord: Coord) -> bool {
        self.shots_fired.contains(&coord)
    }

    pub fn is_hit(&self, coord: Coord) -> bool {
        self.hits.iter().any(|h| h.coord == coord)
    }

    pub fn is_miss(&self, coord: Coord) -> bool {
        self.misses.contains(&coord)
    }

    /// Fold an attack result into memory, one cell at a time.
    pub fn record(&mut self, result: &AttackResult) {
        for cell in result.cell_results() {
            self.record_cell(cell);
        }
    }

    fn record_cell(&mut self, cell: &AttackResult) {
        let coord = cell.coordinate;
        self.shots_fired.insert(coord);
        match cell.outcome {
            AttackOutcome::Miss => {
                if !self.is_hit(coord) && !self.is_miss(coord) {
                    self.misses.push(coord);
                }
            }
            AttackOutcome::Hit | AttackOutcome::Sunk => {
                self.misses.retain(|&m| m != coord);
                if !self.is_hit(coord) {
                    self.hits.push(KnownHit {
                        coord,
                        ship: cell.ship_id,
                    });
                }
                if cell.outcome == AttackOutcome::Sunk {
                    if let Some(ship_id) = cell.ship_id {
                        self.record_sinking(ship_id, coord, cell.ship_size);
                    }
                }
            }
        }
    }

    fn record_sinking(&mut self, ship_id: ShipId, last: Coord, size: Option<usize>) {
        if self.sunk_ships.iter().any(|s| s.ship_id == ship_id) {
            return;
        }
        let mut positions: Vec<Coord> = self
            .hits
            .iter()
            .filter(|h| h.ship == Some(ship_id))
            .map(|h| h.coord)
            .collect();
        if !positions.contains(&last) {
            positions.push(last);
        }
        positions.sort();
        self.sunk_ships.push(SunkShip {
            ship_id,
            size: size.unwrap_or(positions.len()),
            positions,
        });
    }

    pub fn is_sunk_cell(&self, coord: Coord) -> bool {
        self.sunk_ships.iter().any(|s| s.positions.contains(&coord))
    }

    /// Confirmed hits not yet attributed to a sunk ship, oldest first.
    pub fn unsunk_hits(&self) -> Vec<Coord> {
        self.hits
            .iter()
            .filter(|h| match h.ship {
                Some(id) => !self.sunk_ships.iter().any(|s| s.ship_id == id),
                None => !self.is_sunk_cell(h.coord),
            })
            .map(|h| h.coord)
            .collect()
    }

    /// `fleet` minus one entry per confirmed sinking of that size.
    pub fn remaining_sizes(&self, fleet: &[usize]) -> Vec<usize> {
        let mut remaining = fleet.to_vec();
        for sunk in &self.sunk_ships {
            if let Some(i) = remaining.iter().position(|&s| s == sunk.size) {
                remaining.remove(i);
            }
        }
        remaining
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(x: usize, y: usize, ship: u32) -> AttackResult {
        let mut r = AttackResult::miss(Coord::new(x, y));
        r.outcome = AttackOutcome::Hit;
        r.ship_id = Some(ShipId(ship));
        r
    }

    #[test]
    fn sinking_clears_unsunk_hits() {
        let mut memory = AiMemory::new();
        memory.record(&hit(3, 3, 1));
        assert_eq!(memory.unsunk_hits(), vec![Coord::new(3, 3)]);

        let mut sunk = hit(3, 4, 1);
        sunk.outcome = AttackOutcome::Sunk;
        sunk.ship_sunk = true;
        sunk.ship_size = Some(2);
        memory.record(&sunk);

        assert!(memory.unsunk_hits().is_empty());
        assert_eq!(memory.sunk_ships()[0].positions, vec![Coord::new(3, 3), Coord::new(3, 4)]);
        assert_eq!(memory.remaining_sizes(&[5, 4, 3, 3, 2]), vec![5, 4, 3, 3]);
    }

    #[test]
    fn repeat_miss_on_hit_cell_keeps_the_hit() {
        let mut memory = AiMemory::new();
        memory.record(&hit(1, 1, 0));
        memory.record(&AttackResult::miss(Coord::new(1, 1)));
        assert!(memory.is_hit(Coord::new(1, 1)));
        assert!(memory.misses().is_empty());
    }
}
