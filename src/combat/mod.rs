//! Attack validation and resolution.

pub mod modifiers;
pub mod patterns;
pub mod rate_limit;
pub mod resolver;

use serde::{Deserialize, Serialize};

use crate::core::config::{DEFAULT_AREA_MULTIPLIER, NORMAL_ATTACK_DAMAGE, SPECIAL_ATTACK_DAMAGE};

pub use modifiers::{apply_armor, armor_multiplier, compute_damage, OffensiveModifiers};
pub use patterns::{AttackKind, AttackPattern};
pub use rate_limit::{ActionKind, RateLimit, RateLimiter};
pub use resolver::{AttackOutcome, AttackRequest, AttackResult, CombatArena, CombatResolver, TurnInfo};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    pub normal_damage: u32,
    pub special_damage: u32,
    /// Per-cell multiplier for area attacks.
    pub area_multiplier: f64,
    /// Floor for damage on a landed hit.
    pub min_hit_damage: u32,
    /// A valid attack hands the turn to the opponent.
    pub end_turn_after_attack: bool,
    /// Turns longer than this (as reported by the caller) are rejected.
    pub turn_time_limit_ms: Option<u64>,
    pub attack_limit: RateLimit,
    pub special_limit: RateLimit,
    pub area_limit: RateLimit,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            normal_damage: NORMAL_ATTACK_DAMAGE,
            special_damage: SPECIAL_ATTACK_DAMAGE,
            area_multiplier: DEFAULT_AREA_MULTIPLIER,
            min_hit_damage: 1,
            end_turn_after_attack: true,
            turn_time_limit_ms: None,
            attack_limit: RateLimit::new(1, 1),
            special_limit: RateLimit::new(1, 3),
            area_limit: RateLimit::new(1, 5),
        }
    }
}

impl CombatSettings {
    pub fn limit(&self, kind: ActionKind) -> RateLimit {
        match kind {
            ActionKind::Attack => self.attack_limit,
            ActionKind::SpecialAttack => self.special_limit,
            ActionKind::AreaAttack => self.area_limit,
        }
    }

    /// Longest window any limit looks back over.
    pub fn max_window(&self) -> u32 {
        self.attack_limit
            .window_turns
            .max(self.special_limit.window_turns)
            .max(self.area_limit.window_turns)
    }
}
