//! Fleet placement strategies.

use rand::rngs::SmallRng;
use rand::Rng;

use super::strategy::{Recommendation, Strategy, StrategyContext, StrategyKind, StrategyResult};
use super::BehaviorProfile;
use crate::core::board::Board;
use crate::core::common::{Coord, PlayerId, ShipId};
use crate::core::ship::{Orientation, Ship, ShipPlacement, ShipType};

/// Half-open rectangle of allowed origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Zone {
    x0: usize,
    x1: usize,
    y0: usize,
    y1: usize,
}

impl Zone {
    fn whole(width: usize, height: usize) -> Self {
        Self {
            x0: 0,
            x1: width,
            y0: 0,
            y1: height,
        }
    }

    fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// First free (origin, orientation) in row-major order, horizontal before
/// vertical.
fn exhaustive_scan(board: &Board, len: usize) -> Option<(Coord, Orientation)> {
    board.coords().find_map(|origin| {
        Orientation::ALL
            .into_iter()
            .find(|&o| board.can_place(origin, o, len).is_ok())
            .map(|o| (origin, o))
    })
}

fn random_in_zone(rng: &mut SmallRng, board: &Board, len: usize, zone: Zone, attempts: usize) -> Option<(Coord, Orientation)> {
    if zone.is_empty() {
        return None;
    }
    for _ in 0..attempts {
        let orient = if rng.random() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let origin = Coord::new(rng.random_range(zone.x0..zone.x1), rng.random_range(zone.y0..zone.y1));
        if board.can_place(origin, orient, len).is_ok() {
            return Some((origin, orient));
        }
    }
    None
}

/// Place every ship of `fleet`, each in the zone `zone_for` picks, falling
/// back to the exhaustive scan. Returns the placements and how many ships
/// needed the fallback or could not be placed at all.
fn place_fleet(
    ctx: &StrategyContext<'_>,
    rng: &mut SmallRng,
    attempts: usize,
    zone_for: impl Fn(usize) -> Zone,
) -> (Vec<ShipPlacement>, usize, usize) {
    let mut placements = Vec::with_capacity(ctx.fleet.len());
    let (mut fallbacks, mut unplaced) = (0, 0);
    let Ok(mut board) = Board::new(ctx.width, ctx.height) else {
        return (placements, 0, ctx.fleet.len());
    };
    for (i, ship_type) in ctx.fleet.iter().enumerate() {
        let zone = zone_for(i);
        let spot = match random_in_zone(rng, &board, ship_type.size, zone, attempts) {
            Some(spot) => Some(spot),
            None => {
                fallbacks += 1;
                exhaustive_scan(&board, ship_type.size)
            }
        };
        match spot {
            Some((origin, orientation)) => {
                if commit(&mut board, i, ship_type, origin, orientation) {
                    placements.push(ShipPlacement::new(&ship_type.id, origin, orientation));
                } else {
                    unplaced += 1;
                }
            }
            None => {
                log::warn!("no room left for {} ({} cells)", ship_type.name, ship_type.size);
                unplaced += 1;
            }
        }
    }
    (placements, fallbacks, unplaced)
}

fn commit(board: &mut Board, index: usize, ship_type: &ShipType, origin: Coord, orientation: Orientation) -> bool {
    let ship = Ship::new(ShipId(index as u32), PlayerId(0), ship_type, origin, orientation);
    board.place(ship).is_ok()
}

fn summary(label: &str, placed: usize, fallbacks: usize, unplaced: usize) -> String {
    let mut text = format!("{}: {} ship(s) placed", label, placed);
    if fallbacks > 0 {
        text.push_str(&format!(", {} by exhaustive scan", fallbacks));
    }
    if unplaced > 0 {
        text.push_str(&format!(", {} left unplaced", unplaced));
    }
    text
}

/// Uniformly random layout over the whole board, used when no placement
/// strategy applies.
pub(crate) fn random_layout(ctx: &StrategyContext<'_>, rng: &mut SmallRng) -> (Vec<ShipPlacement>, usize) {
    let whole = Zone::whole(ctx.width, ctx.height);
    let (placements, _, unplaced) = place_fleet(ctx, rng, ctx.settings.clustered_attempts, |_| whole);
    (placements, unplaced)
}

/// Packs the fleet into one random quadrant.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClusteredPlacement;

impl Strategy for ClusteredPlacement {
    fn name(&self) -> &'static str {
        "clustered_placement"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Placement
    }

    fn is_applicable(&self, ctx: &StrategyContext<'_>) -> bool {
        !ctx.fleet.is_empty() && ctx.width >= 2 && ctx.height >= 2
    }

    fn calculate_priority(&self, ctx: &StrategyContext<'_>) -> f64 {
        match ctx.settings.behavior {
            BehaviorProfile::Defensive => 0.7,
            BehaviorProfile::Balanced => 0.5,
            BehaviorProfile::Aggressive => 0.3,
        }
    }

    fn execute(&self, ctx: &StrategyContext<'_>, rng: &mut SmallRng) -> StrategyResult {
        let (hw, hh) = (ctx.width / 2, ctx.height / 2);
        let quadrant = rng.random_range(0..4usize);
        let zone = Zone {
            x0: if quadrant % 2 == 0 { 0 } else { hw },
            x1: if quadrant % 2 == 0 { hw } else { ctx.width },
            y0: if quadrant < 2 { 0 } else { hh },
            y1: if quadrant < 2 { hh } else { ctx.height },
        };
        let (placements, fallbacks, unplaced) =
            place_fleet(ctx, rng, ctx.settings.clustered_attempts, |_| zone);
        let confidence = if unplaced > 0 { 0.2 } else { 0.7 - 0.05 * fallbacks as f64 };
        let reasoning = summary(&format!("clustered in quadrant {}", quadrant), placements.len(), fallbacks, unplaced);
        StrategyResult::new(self.name(), Recommendation::Placement { placements }, confidence, reasoning)
    }
}

/// Spreads the fleet, one ship per zone of a ⌈√n⌉×⌈√n⌉ grid.
#[derive(Debug, Default, Clone, Copy)]
pub struct DistributedPlacement;

impl Strategy for DistributedPlacement {
    fn name(&self) -> &'static str {
        "distributed_placement"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Placement
    }

    fn is_applicable(&self, ctx: &StrategyContext<'_>) -> bool {
        !ctx.fleet.is_empty()
    }

    fn calculate_priority(&self, ctx: &StrategyContext<'_>) -> f64 {
        match ctx.settings.behavior {
            BehaviorProfile::Defensive => 0.5,
            BehaviorProfile::Balanced => 0.6,
            BehaviorProfile::Aggressive => 0.6,
        }
    }

    fn execute(&self, ctx: &StrategyContext<'_>, rng: &mut SmallRng) -> StrategyResult {
        let n = ctx.fleet.len();
        let k = (n as f64).sqrt().ceil().max(1.0) as usize;
        let (zw, zh) = (ctx.width.div_ceil(k), ctx.height.div_ceil(k));
        let (width, height) = (ctx.width, ctx.height);
        let (placements, fallbacks, unplaced) =
            place_fleet(ctx, rng, ctx.settings.distributed_attempts, |i| {
                let (zx, zy) = (i % k, (i / k) % k);
                let zone = Zone {
                    x0: zx * zw,
                    x1: ((zx + 1) * zw).min(width),
                    y0: zy * zh,
                    y1: ((zy + 1) * zh).min(height),
                };
                if zone.is_empty() {
                    Zone::whole(width, height)
                } else {
                    zone
                }
            });
        let confidence = if unplaced > 0 { 0.2 } else { 0.75 - 0.05 * fallbacks as f64 };
        let reasoning = summary(&format!("distributed over {}x{} zones", k, k), placements.len(), fallbacks, unplaced);
        StrategyResult::new(self.name(), Recommendation::Placement { placements }, confidence, reasoning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustive_scan_prefers_horizontal_row_major() {
        let board = Board::new(4, 4).unwrap();
        assert_eq!(exhaustive_scan(&board, 3), Some((Coord::new(0, 0), Orientation::Horizontal)));
    }

    #[test]
    fn exhaustive_scan_finds_the_only_gap() {
        let mut board = Board::new(2, 2).unwrap();
        let filler = ShipType::new("f", "Filler", crate::core::ship::ShipClass::Destroyer, crate::core::ship::Era::Modern, 2);
        assert!(commit(&mut board, 0, &filler, Coord::new(0, 0), Orientation::Horizontal));
        assert_eq!(exhaustive_scan(&board, 2), Some((Coord::new(0, 1), Orientation::Horizontal)));
        assert!(commit(&mut board, 1, &filler, Coord::new(0, 1), Orientation::Horizontal));
        assert_eq!(exhaustive_scan(&board, 2), None);
    }
}
