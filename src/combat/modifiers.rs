//! Damage modifier pipeline: offensive multipliers first, then the
//! defender's armor.

/// Floor on the armor damage multiplier.
pub const MIN_ARMOR_MULTIPLIER: f64 = 0.2;
/// Damage lost per point of effective armor.
pub const ARMOR_STEP: f64 = 0.1;

/// Attacker-side modifiers collected for one attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffensiveModifiers {
    pub boost: f64,
    pub penetration: f64,
    pub detection: f64,
}

impl Default for OffensiveModifiers {
    fn default() -> Self {
        Self {
            boost: 1.0,
            penetration: 0.0,
            detection: 0.0,
        }
    }
}

/// `max(0.2, 1 - 0.1 * max(0, armor - penetration))`
pub fn armor_multiplier(armor: f64, penetration: f64) -> f64 {
    let effective = (armor - penetration).max(0.0);
    (1.0 - ARMOR_STEP * effective).max(MIN_ARMOR_MULTIPLIER)
}

/// `round(base * armor_multiplier)`
pub fn apply_armor(base: f64, armor: f64, penetration: f64) -> u32 {
    (base * armor_multiplier(armor, penetration)).round().max(0.0) as u32
}

/// Full pipeline for one cell: base × cell multiplier × boost, then armor.
pub fn compute_damage(base: u32, cell_multiplier: f64, offense: &OffensiveModifiers, armor: f64) -> u32 {
    let raw = base as f64 * cell_multiplier * offense.boost;
    apply_armor(raw, armor, offense.penetration)
}
