//! Validation, activation and turn bookkeeping for ability instances.
//!
//! Every public mutation follows the same shape: validate first, then
//! commit. A rejected activation leaves cooldowns, uses, effects and the
//! per-turn counters exactly as they were.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::EffectOutcome;
use super::definition::{AbilityCategory, AbilityDefinition, AbilityType, EffectType, TargetType, Trigger};
use super::effects::{ActiveEffect, EffectSource, EffectTarget, Expiry};
use super::instance::{AbilityInstance, AbilityInstanceId, AbilityState};
use super::registry::AbilityRegistry;
use crate::core::board::Board;
use crate::core::common::{Coord, ErrorCode, PlayerId, ShipId, ValidationError, ValidationResult};
use crate::core::ship::Ship;

/// Processor-wide limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySettings {
    /// Player-initiated activations allowed per turn. Zero disables the cap.
    pub max_activations_per_turn: u32,
    /// Turns every ability of a player stays locked after one of them fires.
    pub global_cooldown_turns: u32,
    pub max_abilities_per_ship: usize,
}

impl Default for AbilitySettings {
    fn default() -> Self {
        Self {
            max_activations_per_turn: 1,
            global_cooldown_turns: 0,
            max_abilities_per_ship: crate::core::config::DEFAULT_MAX_ABILITIES_PER_SHIP,
        }
    }
}

/// Everything an ability needs to validate or run.
pub struct AbilityContext<'a> {
    pub player: PlayerId,
    pub ship: &'a Ship,
    pub target: Option<Coord>,
    pub enemy_board: &'a mut Board,
    pub turn: u32,
}

/// Outcome of an activation attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityExecutionResult {
    pub success: bool,
    pub ability_id: String,
    pub ship_id: Option<ShipId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<ActiveEffect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detected_ships: Vec<ShipId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revealed_cells: Vec<Coord>,
}

impl AbilityExecutionResult {
    pub(crate) fn failed(ability_id: &str, ship_id: Option<ShipId>, validation: ValidationResult) -> Self {
        Self {
            success: false,
            ability_id: ability_id.to_string(),
            ship_id,
            errors: validation.errors,
            warnings: validation.warnings,
            ..Self::default()
        }
    }

    /// The validation verdict carried by this result.
    pub fn validation(&self) -> ValidationResult {
        ValidationResult {
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// An activatable ability, as seen by a decision maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyAbility {
    pub instance: AbilityInstanceId,
    pub ship: ShipId,
    pub ability_id: String,
    pub name: String,
    pub category: AbilityCategory,
    pub target_type: TargetType,
}

/// Serializable processor state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorState {
    pub instances: Vec<AbilityInstance>,
    pub activations: BTreeMap<PlayerId, u32>,
    pub global_cooldowns: BTreeMap<PlayerId, u32>,
}

#[derive(Debug)]
pub struct AbilityProcessor {
    registry: Arc<AbilityRegistry>,
    settings: AbilitySettings,
    state: ProcessorState,
}

impl AbilityProcessor {
    pub fn new(registry: Arc<AbilityRegistry>, settings: AbilitySettings) -> Self {
        Self {
            registry,
            settings,
            state: ProcessorState::default(),
        }
    }

    pub fn restore(registry: Arc<AbilityRegistry>, settings: AbilitySettings, state: ProcessorState) -> Self {
        Self {
            registry,
            settings,
            state,
        }
    }

    pub fn registry(&self) -> &AbilityRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &AbilitySettings {
        &self.settings
    }

    pub fn state_snapshot(&self) -> ProcessorState {
        self.state.clone()
    }

    /// Drop every instance and counter.
    pub fn reset(&mut self) {
        self.state = ProcessorState::default();
    }

    /// Create an instance of `def` for `ship` and attach its id to the ship.
    /// Passive abilities come with their permanent effect already applied.
    pub fn instantiate(&mut self, def: &AbilityDefinition, ship: &mut Ship) -> AbilityInstanceId {
        let id = AbilityInstanceId(self.state.instances.len() as u32);
        let mut instance = AbilityInstance::new(id, &def.id, ship.id(), ship.owner(), def.max_uses);
        if def.ability_type == AbilityType::Passive {
            for descriptor in &def.effects {
                instance.effects.push(ActiveEffect {
                    effect_type: descriptor.effect_type,
                    magnitude: descriptor.magnitude,
                    remaining_duration: 0,
                    expiry: Expiry::Permanent,
                    source: EffectSource {
                        ability_id: def.id.clone(),
                        ship_id: ship.id(),
                        player: ship.owner(),
                    },
                    target: Some(EffectTarget::Ship(ship.id())),
                    applied_turn: 0,
                });
            }
        }
        log::debug!("{} gains ability {} ({:?})", ship.name(), def.id, id);
        self.state.instances.push(instance);
        ship.attach_ability(id);
        id
    }

    pub fn instance(&self, id: AbilityInstanceId) -> Option<&AbilityInstance> {
        self.state.instances.get(id.0 as usize)
    }

    pub fn instances(&self) -> &[AbilityInstance] {
        &self.state.instances
    }

    pub fn instances_for_ship(&self, ship: ShipId) -> impl Iterator<Item = &AbilityInstance> {
        self.state.instances.iter().filter(move |i| i.ship_id == ship)
    }

    pub fn find(&self, ship: ShipId, ability_id: &str) -> Option<AbilityInstanceId> {
        self.instances_for_ship(ship)
            .find(|i| i.ability_id == ability_id)
            .map(|i| i.id)
    }

    pub fn state(&self, id: AbilityInstanceId) -> Option<AbilityState> {
        self.instance(id).map(AbilityInstance::state)
    }

    pub fn activations_this_turn(&self, player: PlayerId) -> u32 {
        self.state.activations.get(&player).copied().unwrap_or(0)
    }

    pub fn global_cooldown(&self, player: PlayerId) -> u32 {
        self.state.global_cooldowns.get(&player).copied().unwrap_or(0)
    }

    fn cap_reached(&self, player: PlayerId) -> bool {
        self.settings.max_activations_per_turn > 0
            && self.activations_this_turn(player) >= self.settings.max_activations_per_turn
    }

    /// Check whether an instance may activate now. Never panics, never
    /// mutates.
    pub fn validate(&self, id: AbilityInstanceId, ctx: &AbilityContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let Some(instance) = self.instance(id) else {
            result.error(ErrorCode::AbilityNotFound, format!("no ability instance {:?}", id));
            return result;
        };
        let (Some(def), Some(kind)) = (
            self.registry.get(&instance.ability_id),
            self.registry.kind(&instance.ability_id),
        ) else {
            result.error(
                ErrorCode::AbilityNotFound,
                format!("ability '{}' is not registered", instance.ability_id),
            );
            return result;
        };
        if instance.ship_id != ctx.ship.id() || instance.owner != ctx.player {
            result.error(
                ErrorCode::InvalidPlayer,
                format!("{} does not belong to {} of {}", def.name, ctx.ship.name(), ctx.player),
            );
            return result;
        }
        if instance.disabled || ctx.ship.is_sunk() {
            result.error(ErrorCode::AbilityDisabled, format!("{} is sunk", ctx.ship.name()));
        }
        if !instance.is_active {
            result.error(ErrorCode::AbilityInactive, format!("{} is inactive", def.name));
        }
        if def.ability_type == AbilityType::Passive {
            result.error(ErrorCode::AbilityPassive, format!("{} is always on", def.name));
        }
        if instance.current_cooldown > 0 {
            result.error(
                ErrorCode::AbilityOnCooldown,
                format!("{} is on cooldown for {} more turn(s)", def.name, instance.current_cooldown),
            );
        }
        if instance.remaining_uses == Some(0) {
            result.error(ErrorCode::NoUsesRemaining, format!("{} has no uses left", def.name));
        }
        if let Err(reason) = def.requirements.check(ctx.ship) {
            result.error(ErrorCode::RequirementsNotMet, reason);
        }
        if def.ability_type == AbilityType::Active {
            if self.cap_reached(ctx.player) {
                result.error(
                    ErrorCode::ActivationLimitReached,
                    format!(
                        "{} already used {} ability activation(s) this turn",
                        ctx.player, self.settings.max_activations_per_turn
                    ),
                );
            }
            let gcd = self.global_cooldown(ctx.player);
            if gcd > 0 {
                result.error(
                    ErrorCode::GlobalCooldown,
                    format!("abilities locked for {} more turn(s)", gcd),
                );
            }
        }
        kind.validate(def, ctx, self, &mut result);
        result
    }

    /// Re-validate, run the effect, and only then commit cooldown, uses and
    /// effects.
    pub fn activate(&mut self, id: AbilityInstanceId, ctx: &mut AbilityContext<'_>) -> AbilityExecutionResult {
        let validation = self.validate(id, ctx);
        let ability_id = self
            .instance(id)
            .map(|i| i.ability_id.clone())
            .unwrap_or_default();
        if !validation.is_valid() {
            log::debug!("{} rejected: {:?}", ability_id, validation.code());
            return AbilityExecutionResult::failed(&ability_id, Some(ctx.ship.id()), validation);
        }
        let (Some(def), Some(kind)) = (self.registry.get(&ability_id).cloned(), self.registry.kind(&ability_id))
        else {
            return AbilityExecutionResult::failed(
                &ability_id,
                Some(ctx.ship.id()),
                ValidationResult::rejected(ErrorCode::AbilityNotFound, "ability vanished from registry"),
            );
        };
        let EffectOutcome {
            effects,
            messages,
            detected_ships,
            revealed_cells,
        } = kind.execute(&def, ctx);

        let settings = self.settings;
        let instance = &mut self.state.instances[id.0 as usize];
        instance.current_cooldown = def.cooldown_turns;
        if let Some(uses) = instance.remaining_uses.as_mut() {
            *uses = uses.saturating_sub(1);
        }
        instance.effects.extend(effects.iter().cloned());
        instance.stats.activations += 1;
        instance.stats.effects_applied += effects.len() as u32;
        instance.stats.last_activated_turn = Some(ctx.turn);
        if def.ability_type == AbilityType::Active {
            *self.state.activations.entry(ctx.player).or_insert(0) += 1;
            if settings.global_cooldown_turns > 0 {
                self.state
                    .global_cooldowns
                    .insert(ctx.player, settings.global_cooldown_turns);
            }
        }
        log::info!("{} activated {} on turn {}", ctx.ship.name(), def.name, ctx.turn);

        AbilityExecutionResult {
            success: true,
            ability_id,
            ship_id: Some(ctx.ship.id()),
            effects,
            messages,
            errors: Vec::new(),
            warnings: validation.warnings,
            detected_ships,
            revealed_cells,
        }
    }

    /// Tick one instance: cooldown down by one (floor 0), effects age, dead
    /// effects drop. Returns the expired effects.
    pub fn update_turn_end(&mut self, id: AbilityInstanceId) -> Vec<ActiveEffect> {
        match self.state.instances.get_mut(id.0 as usize) {
            Some(instance) => instance.update_turn_end(),
            None => Vec::new(),
        }
    }

    /// Close `player`'s turn: tick each of their instances, age the global
    /// cooldown and clear the activation counter.
    pub fn end_turn(&mut self, player: PlayerId) -> Vec<ActiveEffect> {
        let ids: Vec<_> = self
            .state
            .instances
            .iter()
            .filter(|i| i.owner == player)
            .map(|i| i.id)
            .collect();
        let mut expired = Vec::new();
        for id in ids {
            expired.extend(self.update_turn_end(id));
        }
        if let Some(gcd) = self.state.global_cooldowns.get_mut(&player) {
            *gcd = gcd.saturating_sub(1);
        }
        self.state.activations.remove(&player);
        expired
    }

    /// Reset the per-turn activation counter for `player`.
    pub fn begin_turn(&mut self, player: PlayerId) {
        self.state.activations.remove(&player);
    }

    /// Scan `ship`'s triggered abilities listening for `trigger` and
    /// activate those that validate. Only successes are returned.
    pub fn fire_trigger(
        &mut self,
        trigger: Trigger,
        ship: &Ship,
        enemy_board: &mut Board,
        turn: u32,
    ) -> Vec<AbilityExecutionResult> {
        let ids: Vec<_> = self
            .instances_for_ship(ship.id())
            .filter(|i| {
                self.registry.get(&i.ability_id).map_or(false, |d| {
                    d.ability_type == AbilityType::Triggered && d.has_trigger(trigger)
                })
            })
            .map(|i| i.id)
            .collect();
        let mut fired = Vec::new();
        for id in ids {
            let mut ctx = AbilityContext {
                player: ship.owner(),
                ship,
                target: None,
                enemy_board: &mut *enemy_board,
                turn,
            };
            let result = self.activate(id, &mut ctx);
            if result.success {
                fired.push(result);
            } else {
                log::debug!("{:?} trigger skipped for {}: {:?}", trigger, ship.name(), result.errors);
            }
        }
        fired
    }

    /// Mark every ability of `ship` disabled. Used when the ship sinks.
    pub fn disable_ship(&mut self, ship: ShipId) {
        for instance in self.state.instances.iter_mut().filter(|i| i.ship_id == ship) {
            instance.disabled = true;
        }
    }

    /// Live effects applying to `ship`, from enabled instances.
    pub fn effects_for_ship(&self, ship: ShipId) -> impl Iterator<Item = &ActiveEffect> {
        self.state
            .instances
            .iter()
            .filter(|i| !i.disabled)
            .flat_map(|i| i.effects.iter())
            .filter(move |e| e.is_live() && e.applies_to_ship(ship))
    }

    pub fn has_effect(&self, ship: ShipId, effect_type: EffectType) -> bool {
        self.effects_for_ship(ship).any(|e| e.effect_type == effect_type)
    }

    /// Strongest live magnitude of `effect_type` on `ship`, or 0.
    pub fn get_effect_magnitude(&self, ship: ShipId, effect_type: EffectType) -> f64 {
        self.effects_for_ship(ship)
            .filter(|e| e.effect_type == effect_type)
            .map(|e| e.magnitude)
            .fold(0.0, f64::max)
    }

    /// The ship among `ships` carrying the strongest `effect_type`.
    pub fn strongest_effect(
        &self,
        ships: impl IntoIterator<Item = ShipId>,
        effect_type: EffectType,
    ) -> Option<(ShipId, f64)> {
        let mut best: Option<(ShipId, f64)> = None;
        for ship in ships {
            let magnitude = self.get_effect_magnitude(ship, effect_type);
            if magnitude > 0.0 && best.map_or(true, |(_, m)| magnitude > m) {
                best = Some((ship, magnitude));
            }
        }
        best
    }

    /// Remove `ship`'s effects of `effect_type` that are spent by an attack.
    pub fn consume_next_attack(&mut self, ship: ShipId, effect_type: EffectType) {
        for instance in &mut self.state.instances {
            instance.effects.retain(|e| {
                !(e.expiry == Expiry::NextAttack && e.effect_type == effect_type && e.applies_to_ship(ship))
            });
        }
    }

    /// Active abilities of `player` that could be activated right now on
    /// one of the floating ships of `board`.
    pub fn ready_abilities(&self, player: PlayerId, board: &Board) -> Vec<ReadyAbility> {
        if self.cap_reached(player) || self.global_cooldown(player) > 0 {
            return Vec::new();
        }
        self.state
            .instances
            .iter()
            .filter(|i| i.owner == player && i.is_active && i.state() == AbilityState::Ready)
            .filter_map(|i| {
                let ship = board.ship(i.ship_id).filter(|s| !s.is_sunk())?;
                let def = self.registry.get(&i.ability_id)?;
                if def.ability_type != AbilityType::Active || def.requirements.check(ship).is_err() {
                    return None;
                }
                if def.effect(EffectType::DamageBoost).is_some()
                    && self.has_effect(ship.id(), EffectType::DamageBoost)
                {
                    return None;
                }
                Some(ReadyAbility {
                    instance: i.id,
                    ship: ship.id(),
                    ability_id: def.id.clone(),
                    name: def.name.clone(),
                    category: def.category,
                    target_type: def.target_type,
                })
            })
            .collect()
    }
}
