//! Per ship×ability mutable state.

use serde::{Deserialize, Serialize};

use super::effects::ActiveEffect;
use crate::core::common::{PlayerId, ShipId};

/// Index of an instance inside the processor's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilityInstanceId(pub u32);

/// Lifecycle state derived from an instance's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityState {
    Ready,
    OnCooldown,
    Exhausted,
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityUsageStats {
    pub activations: u32,
    pub effects_applied: u32,
    pub last_activated_turn: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityInstance {
    pub id: AbilityInstanceId,
    pub ability_id: String,
    pub ship_id: ShipId,
    pub owner: PlayerId,
    pub is_active: bool,
    /// Set once the owning ship sinks; never cleared short of a reset.
    pub disabled: bool,
    pub current_cooldown: u32,
    pub remaining_uses: Option<u32>,
    pub effects: Vec<ActiveEffect>,
    pub stats: AbilityUsageStats,
}

impl AbilityInstance {
    pub fn new(
        id: AbilityInstanceId,
        ability_id: &str,
        ship_id: ShipId,
        owner: PlayerId,
        max_uses: Option<u32>,
    ) -> Self {
        Self {
            id,
            ability_id: ability_id.to_string(),
            ship_id,
            owner,
            is_active: true,
            disabled: false,
            current_cooldown: 0,
            remaining_uses: max_uses,
            effects: Vec::new(),
            stats: AbilityUsageStats::default(),
        }
    }

    /// Disabled overrides everything; exhaustion outranks cooldown.
    pub fn state(&self) -> AbilityState {
        if self.disabled {
            AbilityState::Disabled
        } else if self.remaining_uses == Some(0) {
            AbilityState::Exhausted
        } else if self.current_cooldown > 0 {
            AbilityState::OnCooldown
        } else {
            AbilityState::Ready
        }
    }

    /// Advance one owner turn: cooldown drops by one (floor 0) and timed
    /// effects tick down. Returns the effects that ran out.
    pub fn update_turn_end(&mut self) -> Vec<ActiveEffect> {
        self.current_cooldown = self.current_cooldown.saturating_sub(1);
        for effect in &mut self.effects {
            if effect.expiry == super::effects::Expiry::Turns {
                effect.remaining_duration = effect.remaining_duration.saturating_sub(1);
            }
        }
        let (live, expired): (Vec<_>, Vec<_>) = self.effects.drain(..).partition(|e| e.is_live());
        self.effects = live;
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> AbilityInstance {
        AbilityInstance::new(AbilityInstanceId(0), "x", ShipId(1), PlayerId(1), Some(1))
    }

    #[test]
    fn state_precedence() {
        let mut inst = instance();
        assert_eq!(inst.state(), AbilityState::Ready);
        inst.current_cooldown = 2;
        assert_eq!(inst.state(), AbilityState::OnCooldown);
        inst.remaining_uses = Some(0);
        assert_eq!(inst.state(), AbilityState::Exhausted);
        inst.disabled = true;
        assert_eq!(inst.state(), AbilityState::Disabled);
    }

    #[test]
    fn cooldown_floors_at_zero() {
        let mut inst = instance();
        inst.current_cooldown = 1;
        inst.update_turn_end();
        inst.update_turn_end();
        assert_eq!(inst.current_cooldown, 0);
    }
}
