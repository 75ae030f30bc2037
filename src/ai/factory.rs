//! Ranks the registered strategies and runs the winner.

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

use super::abilities::{DefensiveAbilities, OffensiveAbilities};
use super::placement::{random_layout, ClusteredPlacement, DistributedPlacement};
use super::strategy::{Recommendation, Strategy, StrategyContext, StrategyKind, StrategyResult};
use super::targeting::{HuntTarget, ProbabilityDensity};
use crate::core::common::Coord;

pub const FALLBACK_STRATEGY: &str = "random_fallback";

/// An explicit, ordered list of strategies. Registration order breaks
/// priority ties.
pub struct StrategyFactory {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for StrategyFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl StrategyFactory {
    pub fn new() -> Self {
        Self { strategies: Vec::new() }
    }

    /// Every built-in strategy.
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory.register(Box::new(HuntTarget));
        factory.register(Box::new(ProbabilityDensity));
        factory.register(Box::new(ClusteredPlacement));
        factory.register(Box::new(DistributedPlacement));
        factory.register(Box::new(OffensiveAbilities));
        factory.register(Box::new(DefensiveAbilities));
        factory
    }

    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    pub fn strategies(&self) -> &[Box<dyn Strategy>] {
        &self.strategies
    }

    /// Applicable strategies of `kind` with their priorities, highest first.
    pub fn ranked(&self, kind: StrategyKind, ctx: &StrategyContext<'_>) -> Vec<(&dyn Strategy, f64)> {
        let mut ranked: Vec<(&dyn Strategy, f64)> = self
            .strategies
            .iter()
            .filter(|s| s.kind() == kind && s.is_applicable(ctx))
            .map(|s| (s.as_ref(), s.calculate_priority(ctx).clamp(0.0, 1.0)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Run the top-ranked strategy of `kind`, or the random fallback when
    /// none applies.
    pub fn select(&self, kind: StrategyKind, ctx: &StrategyContext<'_>, rng: &mut SmallRng) -> StrategyResult {
        let ranked = self.ranked(kind, ctx);
        match ranked.first() {
            Some(&(strategy, priority)) => {
                log::debug!(
                    "{:?}: {} (priority {:.2}) over {} other(s)",
                    kind,
                    strategy.name(),
                    priority,
                    ranked.len() - 1
                );
                strategy.execute(ctx, rng)
            }
            None => Self::fallback(kind, ctx, rng),
        }
    }

    /// A uniformly random legal choice, so the AI never stalls.
    pub fn fallback(kind: StrategyKind, ctx: &StrategyContext<'_>, rng: &mut SmallRng) -> StrategyResult {
        match kind {
            StrategyKind::Targeting => {
                let unshot = ctx.unshot();
                // Cells reported as misses can hide an evading ship.
                let pool: Vec<Coord> = if unshot.is_empty() {
                    ctx.coords().filter(|&c| !ctx.memory.is_hit(c)).collect()
                } else {
                    unshot
                };
                match pool.choose(rng) {
                    Some(&target) => StrategyResult::new(
                        FALLBACK_STRATEGY,
                        Recommendation::Attack { target },
                        0.0,
                        "no targeting strategy applies, firing at random",
                    ),
                    None => StrategyResult::new(FALLBACK_STRATEGY, Recommendation::Hold, 0.0, "nothing left to fire at"),
                }
            }
            StrategyKind::Placement => {
                let (placements, unplaced) = random_layout(ctx, rng);
                let reasoning = if unplaced == 0 {
                    "random layout".to_string()
                } else {
                    format!("random layout, {} ship(s) did not fit", unplaced)
                };
                StrategyResult::new(FALLBACK_STRATEGY, Recommendation::Placement { placements }, 0.0, reasoning)
            }
            StrategyKind::Ability => {
                StrategyResult::new(FALLBACK_STRATEGY, Recommendation::Hold, 0.0, "no ability worth using")
            }
        }
    }
}
