//! Ability-use strategies. Abilities are classified by keywords in their
//! display names.

use rand::rngs::SmallRng;

use super::strategy::{Recommendation, Strategy, StrategyContext, StrategyKind, StrategyResult};
use super::targeting::calc_density;
use super::{BehaviorProfile, Difficulty};
use crate::abilities::{ReadyAbility, TargetType};
use crate::core::common::Coord;

pub const OFFENSIVE_KEYWORDS: &[&str] = &["gun", "piercing", "strike", "barrage", "salvo", "torpedo", "scout", "sonar"];
pub const DEFENSIVE_KEYWORDS: &[&str] = &["smoke", "silent", "screen", "evasive", "repair", "control", "hull"];

fn matches_any(ability: &ReadyAbility, vocabulary: &[&str]) -> bool {
    let name = ability.name.to_lowercase();
    vocabulary.iter().any(|k| name.contains(k))
}

fn candidates<'a>(ctx: &'a StrategyContext<'_>, vocabulary: &'static [&'static str]) -> impl Iterator<Item = &'a ReadyAbility> {
    ctx.ready_abilities.iter().filter(move |a| matches_any(a, vocabulary))
}

/// Densest unshot cell, for abilities that need a coordinate.
fn best_target(ctx: &StrategyContext<'_>) -> Option<Coord> {
    let density = calc_density(ctx);
    let mut best: Option<(Coord, f64)> = None;
    for c in ctx.coords() {
        let p = density[c.y * ctx.width + c.x];
        if p > 0.0 && best.map_or(true, |(_, b)| p > b) {
            best = Some((c, p));
        }
    }
    best.map(|(c, _)| c).or_else(|| ctx.unshot().first().copied())
}

fn recommend(ctx: &StrategyContext<'_>, ability: &ReadyAbility) -> Recommendation {
    let target = match ability.target_type {
        TargetType::Coordinate => best_target(ctx),
        TargetType::OwnShip => None,
    };
    Recommendation::Ability {
        ship: ability.ship,
        ability_id: ability.ability_id.clone(),
        target,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OffensiveAbilities;

impl Strategy for OffensiveAbilities {
    fn name(&self) -> &'static str {
        "offensive_abilities"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Ability
    }

    fn is_applicable(&self, ctx: &StrategyContext<'_>) -> bool {
        ctx.settings.difficulty >= Difficulty::Intermediate && candidates(ctx, OFFENSIVE_KEYWORDS).next().is_some()
    }

    fn calculate_priority(&self, ctx: &StrategyContext<'_>) -> f64 {
        match ctx.settings.behavior {
            BehaviorProfile::Aggressive => 0.85,
            _ => 0.6,
        }
    }

    fn execute(&self, ctx: &StrategyContext<'_>, _rng: &mut SmallRng) -> StrategyResult {
        let mut found = candidates(ctx, OFFENSIVE_KEYWORDS);
        let Some(ability) = found.next() else {
            return StrategyResult::new(self.name(), Recommendation::Hold, 0.0, "no offensive ability ready");
        };
        let alternatives = found.map(|a| recommend(ctx, a)).collect();
        StrategyResult::new(
            self.name(),
            recommend(ctx, ability),
            self.calculate_priority(ctx),
            format!("pressing the attack with {}", ability.name),
        )
        .with_alternatives(alternatives)
    }
}

/// Applies only while the own fleet is badly damaged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefensiveAbilities;

pub const THREAT_THRESHOLD: f64 = 0.5;

impl Strategy for DefensiveAbilities {
    fn name(&self) -> &'static str {
        "defensive_abilities"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Ability
    }

    fn is_applicable(&self, ctx: &StrategyContext<'_>) -> bool {
        ctx.settings.difficulty >= Difficulty::Intermediate
            && ctx.threat > THREAT_THRESHOLD
            && candidates(ctx, DEFENSIVE_KEYWORDS).next().is_some()
    }

    fn calculate_priority(&self, ctx: &StrategyContext<'_>) -> f64 {
        ctx.threat.clamp(0.0, 1.0)
    }

    fn execute(&self, ctx: &StrategyContext<'_>, _rng: &mut SmallRng) -> StrategyResult {
        let mut found = candidates(ctx, DEFENSIVE_KEYWORDS);
        let Some(ability) = found.next() else {
            return StrategyResult::new(self.name(), Recommendation::Hold, 0.0, "no defensive ability ready");
        };
        let alternatives = found.map(|a| recommend(ctx, a)).collect();
        StrategyResult::new(
            self.name(),
            recommend(ctx, ability),
            ctx.threat,
            format!("threat at {:.0}%, covering with {}", ctx.threat * 100.0, ability.name),
        )
        .with_alternatives(alternatives)
    }
}
