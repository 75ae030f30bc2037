//! Game board state: a width×height grid of cells, the fleet placed on it,
//! and the hit/miss record.

use core::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::common::{BoardError, Coord, ShipId};
use super::ship::{Orientation, Ship};

/// One grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ship: Option<ShipId>,
    pub is_hit: bool,
    /// Number of live reveal effects covering this cell.
    reveals: u16,
}

impl Cell {
    pub fn is_revealed(&self) -> bool {
        self.reveals > 0
    }
}

/// Result of striking a single cell, before any damage maths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strike {
    /// The cell was struck earlier; nothing changed.
    AlreadyHit,
    /// Empty water; recorded as a miss.
    Miss,
    /// A ship occupies the cell; the cell is now marked hit.
    Ship(ShipId),
}

/// Main board state: ship placements, hits, misses.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    ships: Vec<Ship>,
    hits: Vec<Coord>,
    misses: Vec<Coord>,
}

impl Board {
    /// Create an empty board (no ships placed).
    pub fn new(width: usize, height: usize) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            ships: Vec::new(),
            hits: Vec::new(),
            misses: Vec::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> Result<usize, BoardError> {
        if self.in_bounds(coord) {
            Ok(coord.y * self.width + coord.x)
        } else {
            Err(BoardError::OutOfBounds(coord))
        }
    }

    pub fn cell(&self, coord: Coord) -> Result<&Cell, BoardError> {
        let idx = self.index(coord)?;
        Ok(&self.cells[idx])
    }

    /// Every coordinate on the board in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Coord::new(x, y)))
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id() == id)
    }

    pub(crate) fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.id() == id)
    }

    pub fn ship_at(&self, coord: Coord) -> Option<&Ship> {
        let id = self.cell(coord).ok()?.ship?;
        self.ship(id)
    }

    pub fn hits(&self) -> &[Coord] {
        &self.hits
    }

    pub fn misses(&self) -> &[Coord] {
        &self.misses
    }

    /// Returns `true` when at least one ship is placed and all are sunk.
    pub fn all_sunk(&self) -> bool {
        !self.ships.is_empty() && self.ships.iter().all(|s| s.is_sunk())
    }

    /// Check that `len` cells from `origin` lie on the board.
    pub fn fits(&self, origin: Coord, orientation: Orientation, len: usize) -> Result<(), BoardError> {
        let span = len.saturating_sub(1);
        let end = match orientation {
            Orientation::Horizontal => origin.x.checked_add(span).map(|x| Coord::new(x, origin.y)),
            Orientation::Vertical => origin.y.checked_add(span).map(|y| Coord::new(origin.x, y)),
        };
        match end {
            Some(end) if self.in_bounds(origin) && self.in_bounds(end) => Ok(()),
            _ => Err(BoardError::OutOfBounds(origin)),
        }
    }

    /// Check that `len` cells from `origin` fit and are free.
    pub fn can_place(&self, origin: Coord, orientation: Orientation, len: usize) -> Result<(), BoardError> {
        self.fits(origin, orientation, len)?;
        for c in orientation.cells(origin, len) {
            if self.cell(c)?.ship.is_some() {
                return Err(BoardError::ShipOverlaps(c));
            }
        }
        Ok(())
    }

    /// Place a ship. Fails without mutation on out-of-bounds or overlap.
    pub fn place(&mut self, ship: Ship) -> Result<(), BoardError> {
        if self.ship(ship.id()).is_some() {
            return Err(BoardError::ShipAlreadyPlaced(ship.id()));
        }
        let mut indices = Vec::with_capacity(ship.positions().len());
        for &c in ship.positions() {
            let idx = self.index(c)?;
            if self.cells[idx].ship.is_some() {
                return Err(BoardError::ShipOverlaps(c));
            }
            indices.push(idx);
        }
        for idx in indices {
            self.cells[idx].ship = Some(ship.id());
        }
        self.ships.push(ship);
        Ok(())
    }

    /// Returns a random non-overlapping (origin, orientation) for a ship of
    /// `len`, trying at most `attempts` times.
    pub fn random_placement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        len: usize,
        attempts: usize,
    ) -> Result<(Coord, Orientation), BoardError> {
        if len == 0 || (len > self.width && len > self.height) {
            return Err(BoardError::UnableToPlaceShip);
        }
        for _ in 0..attempts {
            let orient = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_x, max_y) = match orient {
                Orientation::Horizontal if len <= self.width => (self.width - len, self.height - 1),
                Orientation::Vertical if len <= self.height => (self.width - 1, self.height - len),
                _ => continue,
            };
            let origin = Coord::new(rng.random_range(0..=max_x), rng.random_range(0..=max_y));
            if self.can_place(origin, orient, len).is_ok() {
                return Ok((origin, orient));
            }
        }
        Err(BoardError::UnableToPlaceShip)
    }

    /// Strike a cell: mark it hit if a ship occupies it, otherwise record a
    /// miss. Re-striking a hit cell changes nothing.
    pub fn strike(&mut self, coord: Coord) -> Result<Strike, BoardError> {
        let idx = self.index(coord)?;
        if self.cells[idx].is_hit {
            return Ok(Strike::AlreadyHit);
        }
        let occupant = self.cells[idx].ship;
        match occupant {
            Some(id) => {
                self.cells[idx].is_hit = true;
                self.hits.push(coord);
                self.misses.retain(|&m| m != coord);
                if let Some(ship) = self.ship_mut(id) {
                    ship.register_hit(coord);
                }
                Ok(Strike::Ship(id))
            }
            None => {
                self.record_miss(coord);
                Ok(Strike::Miss)
            }
        }
    }

    /// Add `coord` to the miss list without touching the cell.
    pub(crate) fn record_miss(&mut self, coord: Coord) {
        if !self.misses.contains(&coord) {
            self.misses.push(coord);
        }
    }

    /// Mark every in-bounds cell of `area` revealed. Returns the ids of ships
    /// seen on a cell that was not already revealed.
    pub fn reveal(&mut self, area: &[Coord]) -> Vec<ShipId> {
        let mut detected = Vec::new();
        for &c in area {
            let Ok(idx) = self.index(c) else { continue };
            let cell = &mut self.cells[idx];
            if !cell.is_revealed() {
                if let Some(id) = cell.ship {
                    if !detected.contains(&id) {
                        detected.push(id);
                    }
                }
            }
            cell.reveals = cell.reveals.saturating_add(1);
        }
        detected
    }

    /// Undo one [`Board::reveal`] over `area`.
    pub fn conceal(&mut self, area: &[Coord]) {
        for &c in area {
            if let Ok(idx) = self.index(c) {
                let cell = &mut self.cells[idx];
                cell.reveals = cell.reveals.saturating_sub(1);
            }
        }
    }

    /// Sum of remaining over maximum hit points for the fleet.
    pub fn fleet_integrity(&self) -> f64 {
        let max: u32 = self.ships.iter().map(|s| s.max_hit_points()).sum();
        if max == 0 {
            return 1.0;
        }
        let left: u32 = self.ships.iter().map(|s| s.hit_points()).sum();
        left as f64 / max as f64
    }

    /// Render the board as text. `reveal` shows unhit ship cells.
    pub fn render(&self, reveal: bool) -> String {
        let mut out = String::from("   ");
        for x in 0..self.width {
            out.push(' ');
            out.push((b'A' + (x % 26) as u8) as char);
        }
        out.push('\n');
        for y in 0..self.height {
            out.push_str(&format!("{:2} ", y + 1));
            for x in 0..self.width {
                let c = Coord::new(x, y);
                let cell = &self.cells[y * self.width + x];
                let ch = if cell.is_hit {
                    match self.ship_at(c) {
                        Some(s) if s.is_sunk() => '#',
                        _ => 'X',
                    }
                } else if self.misses.contains(&c) {
                    'o'
                } else if cell.ship.is_some() && (reveal || cell.is_revealed()) {
                    'S'
                } else if cell.is_revealed() {
                    '~'
                } else {
                    '.'
                };
                out.push(' ');
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{\n  size: {}x{},\n  hits: {:?},\n  misses: {:?},\n  ships: {:?}\n}}",
            self.width, self.height, self.hits, self.misses, self.ships
        )
    }
}
