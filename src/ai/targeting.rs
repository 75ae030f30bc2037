// Attack targeting: hunt/target heuristics and probability density.

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

use super::strategy::{Recommendation, Strategy, StrategyContext, StrategyKind, StrategyResult};
use super::Difficulty;
use crate::core::common::Coord;
use crate::core::ship::Orientation;

/// Hunt mode fires on the checkerboard; target mode works the neighbours of
/// a confirmed, unsunk hit.
#[derive(Debug, Default, Clone, Copy)]
pub struct HuntTarget;

impl HuntTarget {
    /// Unshot in-bounds neighbours of unsunk hits. When two hits line up,
    /// only the cells extending that line are returned.
    fn target_candidates(ctx: &StrategyContext<'_>) -> (Vec<Coord>, bool) {
        let hits = ctx.memory.unsunk_hits();
        let mut candidates = Vec::new();
        let mut aligned = Vec::new();
        for h in &hits {
            for n in h.orthogonal_neighbors() {
                if !ctx.in_bounds(n) || ctx.memory.has_shot(n) || candidates.contains(&n) {
                    continue;
                }
                candidates.push(n);
                // mirror of n across h
                let mirror = (2 * h.x).checked_sub(n.x).zip((2 * h.y).checked_sub(n.y));
                if let Some((mx, my)) = mirror {
                    if hits.contains(&Coord::new(mx, my)) {
                        aligned.push(n);
                    }
                }
            }
        }
        if aligned.is_empty() {
            (candidates, false)
        } else {
            (aligned, true)
        }
    }
}

impl Strategy for HuntTarget {
    fn name(&self) -> &'static str {
        "hunt_target"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Targeting
    }

    fn is_applicable(&self, ctx: &StrategyContext<'_>) -> bool {
        ctx.coords().any(|c| !ctx.memory.has_shot(c))
    }

    fn calculate_priority(&self, ctx: &StrategyContext<'_>) -> f64 {
        if ctx.memory.unsunk_hits().is_empty() {
            0.4
        } else {
            0.9
        }
    }

    fn execute(&self, ctx: &StrategyContext<'_>, rng: &mut SmallRng) -> StrategyResult {
        let (candidates, aligned) = Self::target_candidates(ctx);
        if let Some(&target) = candidates.choose(rng) {
            let reasoning = if aligned {
                format!("extending a line of hits to {}", target)
            } else {
                format!("probing next to a confirmed hit at {}", target)
            };
            let alternatives = candidates
                .iter()
                .filter(|&&c| c != target)
                .map(|&target| Recommendation::Attack { target })
                .collect();
            return StrategyResult::new(
                self.name(),
                Recommendation::Attack { target },
                if aligned { 0.8 } else { 0.6 },
                reasoning,
            )
            .with_alternatives(alternatives);
        }

        let unshot = ctx.unshot();
        let parity: Vec<Coord> = unshot.iter().copied().filter(Coord::is_even_parity).collect();
        let (pool, reasoning) = if parity.is_empty() {
            (&unshot, "checkerboard exhausted, sweeping remaining cells")
        } else {
            (&parity, "hunting on the checkerboard")
        };
        match pool.choose(rng) {
            Some(&target) => StrategyResult::new(
                self.name(),
                Recommendation::Attack { target },
                1.0 / pool.len() as f64,
                reasoning,
            ),
            None => StrategyResult::new(self.name(), Recommendation::Hold, 0.0, "no cell left to fire at"),
        }
    }
}

/// Weight of a placement per observed hit it covers.
const HIT_BIAS: f64 = 10.0;

/// Per-cell likelihood, row-major, as a percentage of the total count.
///
/// Every placement of every remaining ship size that avoids known misses and
/// sunk cells adds its weight to each unshot cell it covers. Placements
/// covering `n` confirmed hits weigh `HIT_BIAS^n`, so an open board reduces
/// to a plain count. Cells already fired at score zero.
pub fn calc_density(ctx: &StrategyContext<'_>) -> Vec<f64> {
    let (w, h) = (ctx.width, ctx.height);
    let mut counts = vec![0.0f64; w * h];
    let blocked = |c: Coord| ctx.memory.is_miss(c) || ctx.memory.is_sunk_cell(c);

    for &len in ctx.remaining_sizes {
        if len == 0 {
            continue;
        }
        for orient in Orientation::ALL {
            let (max_x, max_y) = match orient {
                Orientation::Horizontal if len <= w => (w - len, h - 1),
                Orientation::Vertical if len <= h => (w - 1, h - len),
                _ => continue,
            };
            for y in 0..=max_y {
                for x in 0..=max_x {
                    let origin = Coord::new(x, y);
                    if orient.cells(origin, len).any(blocked) {
                        continue;
                    }
                    let n_hits = orient.cells(origin, len).filter(|&c| ctx.memory.is_hit(c)).count();
                    let weight = HIT_BIAS.powi(n_hits as i32);
                    for c in orient.cells(origin, len) {
                        if !ctx.memory.has_shot(c) {
                            counts[c.y * w + c.x] += weight;
                        }
                    }
                }
            }
        }
    }

    let total: f64 = counts.iter().sum();
    if total > 0.0 {
        for v in counts.iter_mut() {
            *v = *v / total * 100.0;
        }
    }
    counts
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProbabilityDensity;

impl Strategy for ProbabilityDensity {
    fn name(&self) -> &'static str {
        "probability_density"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Targeting
    }

    fn is_applicable(&self, ctx: &StrategyContext<'_>) -> bool {
        ctx.settings.difficulty >= Difficulty::Advanced
            && !ctx.remaining_sizes.is_empty()
            && ctx.coords().any(|c| !ctx.memory.has_shot(c))
    }

    fn calculate_priority(&self, ctx: &StrategyContext<'_>) -> f64 {
        if !ctx.memory.unsunk_hits().is_empty() {
            return 0.6;
        }
        match ctx.settings.difficulty {
            Difficulty::Expert => 0.85,
            _ => 0.75,
        }
    }

    fn execute(&self, ctx: &StrategyContext<'_>, _rng: &mut SmallRng) -> StrategyResult {
        let density = calc_density(ctx);
        let mut ranked: Vec<(Coord, f64)> = ctx
            .coords()
            .map(|c| (c, density[c.y * ctx.width + c.x]))
            .filter(|&(_, p)| p > 0.0)
            .collect();
        // stable: equal scores keep row-major order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let Some(&(target, pct)) = ranked.first() else {
            return match ctx.unshot().first() {
                Some(&target) => StrategyResult::new(
                    self.name(),
                    Recommendation::Attack { target },
                    0.0,
                    "no placement fits the remaining ships, taking the first open cell",
                ),
                None => StrategyResult::new(self.name(), Recommendation::Hold, 0.0, "no cell left to fire at"),
            };
        };
        let alternatives = ranked
            .iter()
            .skip(1)
            .take(3)
            .map(|&(target, _)| Recommendation::Attack { target })
            .collect();
        StrategyResult::new(
            self.name(),
            Recommendation::Attack { target },
            pct / 100.0,
            format!("{} holds {:.1}% of the placement density", target, pct),
        )
        .with_alternatives(alternatives)
    }
}
