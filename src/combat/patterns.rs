//! Attack kinds and the cell patterns area attacks cover.

use serde::{Deserialize, Serialize};

use super::rate_limit::ActionKind;
use crate::core::common::Coord;
use crate::core::ship::Orientation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackPattern {
    Single,
    /// Every cell within `radius` (Chebyshev) of the target.
    Square { radius: usize },
    /// `length` cells starting at the target, running right or down.
    Line { orientation: Orientation, length: usize },
    /// The target plus `arm` cells in each orthogonal direction.
    Cross { arm: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    #[default]
    Normal,
    Special,
    Area(AttackPattern),
}

impl AttackKind {
    pub fn action_kind(&self) -> ActionKind {
        match self {
            AttackKind::Normal => ActionKind::Attack,
            AttackKind::Special => ActionKind::SpecialAttack,
            AttackKind::Area(_) => ActionKind::AreaAttack,
        }
    }
}

impl AttackPattern {
    /// In-bounds cells hit by this pattern, target first, the rest
    /// row-major.
    pub fn cells(&self, target: Coord, width: usize, height: usize) -> Vec<Coord> {
        let in_bounds = |c: &Coord| c.x < width && c.y < height;
        if !in_bounds(&target) {
            return Vec::new();
        }
        // Nothing past the longer board side can land.
        let span = width.max(height);
        let mut rest: Vec<Coord> = match *self {
            AttackPattern::Single => Vec::new(),
            AttackPattern::Square { radius } => {
                crate::abilities::square_area(target, radius.min(span), width, height)
            }
            AttackPattern::Line { orientation, length } => {
                orientation.cells(target, length.clamp(1, span)).collect()
            }
            AttackPattern::Cross { arm } => {
                let mut cells = Vec::new();
                for d in 1..=arm.min(span) {
                    cells.push(Coord::new(target.x.saturating_add(d), target.y));
                    cells.push(Coord::new(target.x, target.y.saturating_add(d)));
                    if let Some(x) = target.x.checked_sub(d) {
                        cells.push(Coord::new(x, target.y));
                    }
                    if let Some(y) = target.y.checked_sub(d) {
                        cells.push(Coord::new(target.x, y));
                    }
                }
                cells
            }
        };
        rest.retain(|c| *c != target && in_bounds(c));
        rest.sort();
        rest.dedup();
        let mut cells = Vec::with_capacity(rest.len() + 1);
        cells.push(target);
        cells.extend(rest);
        cells
    }
}
