//! Combat resolution: validate, then strike, then run the modifier pipeline
//! and settle sinkings.

use serde::{Deserialize, Serialize};

use super::modifiers::{compute_damage, OffensiveModifiers};
use super::patterns::AttackKind;
use super::rate_limit::RateLimiter;
use super::CombatSettings;
use crate::abilities::{AbilityExecutionResult, AbilityProcessor, EffectType, Trigger};
use crate::core::board::{Board, Strike};
use crate::core::common::{Coord, ErrorCode, GamePhase, PlayerId, ShipId, ValidationResult};
use crate::core::ship::DamageOutcome;

/// An attack as submitted by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRequest {
    pub player: PlayerId,
    pub target: Coord,
    #[serde(default)]
    pub kind: AttackKind,
    /// Ship the attack is fired from. When absent, the whole fleet's
    /// offensive effects are considered.
    #[serde(default)]
    pub ship: Option<ShipId>,
    /// Time the player has spent on this turn, as measured by the caller.
    #[serde(default)]
    pub elapsed_ms: Option<u64>,
}

impl AttackRequest {
    pub fn new(player: PlayerId, target: Coord) -> Self {
        Self {
            player,
            target,
            kind: AttackKind::Normal,
            ship: None,
            elapsed_ms: None,
        }
    }

    pub fn with_kind(mut self, kind: AttackKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn from_ship(mut self, ship: ShipId) -> Self {
        self.ship = Some(ship);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackOutcome {
    Hit,
    Miss,
    Sunk,
}

/// Result of an attack. Area attacks carry one entry per affected cell in
/// `chain_reaction`, with the aggregate in the top-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    pub coordinate: Coord,
    pub outcome: AttackOutcome,
    pub ship_id: Option<ShipId>,
    pub ship_sunk: bool,
    /// Length of the ship, reported only when it sinks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_size: Option<usize>,
    pub damage_dealt: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain_reaction: Vec<AttackResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggered: Vec<AbilityExecutionResult>,
}

impl AttackResult {
    pub fn miss(coordinate: Coord) -> Self {
        Self {
            coordinate,
            outcome: AttackOutcome::Miss,
            ship_id: None,
            ship_sunk: false,
            ship_size: None,
            damage_dealt: 0,
            chain_reaction: Vec::new(),
            warnings: Vec::new(),
            triggered: Vec::new(),
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, AttackOutcome::Hit | AttackOutcome::Sunk)
    }

    /// Per-cell results: the chain for area attacks, otherwise `self`.
    pub fn cell_results(&self) -> Box<dyn Iterator<Item = &AttackResult> + '_> {
        if self.chain_reaction.is_empty() {
            Box::new(std::iter::once(self))
        } else {
            Box::new(self.chain_reaction.iter())
        }
    }

    /// Fold per-cell results into one composite centred on `coordinate`.
    fn composite(coordinate: Coord, cells: Vec<AttackResult>) -> Self {
        let mut result = AttackResult::miss(coordinate);
        if cells.iter().any(|c| c.outcome == AttackOutcome::Sunk) {
            result.outcome = AttackOutcome::Sunk;
        } else if cells.iter().any(|c| c.outcome == AttackOutcome::Hit) {
            result.outcome = AttackOutcome::Hit;
        }
        result.ship_sunk = cells.iter().any(|c| c.ship_sunk);
        result.ship_size = cells.iter().find_map(|c| c.ship_size);
        result.ship_id = cells
            .iter()
            .find(|c| c.coordinate == coordinate && c.ship_id.is_some())
            .or_else(|| cells.iter().find(|c| c.ship_id.is_some()))
            .and_then(|c| c.ship_id);
        result.damage_dealt = cells.iter().map(|c| c.damage_dealt).sum();
        result.chain_reaction = cells;
        result
    }
}

/// The turn state an attack is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnInfo {
    pub phase: GamePhase,
    pub current_player: PlayerId,
    pub turn: u32,
}

/// Mutable state an attack touches.
pub struct CombatArena<'a> {
    pub attacker: &'a mut Board,
    pub defender: &'a mut Board,
    pub abilities: &'a mut AbilityProcessor,
}

#[derive(Debug)]
pub struct CombatResolver {
    settings: CombatSettings,
    limiter: RateLimiter,
}

impl CombatResolver {
    pub fn new(settings: CombatSettings) -> Self {
        Self {
            settings,
            limiter: RateLimiter::new(),
        }
    }

    pub fn restore(settings: CombatSettings, limiter: RateLimiter) -> Self {
        Self { settings, limiter }
    }

    pub fn settings(&self) -> &CombatSettings {
        &self.settings
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn reset(&mut self) {
        self.limiter.reset();
    }

    /// Check an attack without touching any state.
    pub fn validate(&self, req: &AttackRequest, turn: &TurnInfo, arena: &CombatArena<'_>) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if turn.phase != GamePhase::Active {
            result.error(ErrorCode::GameNotActive, format!("game is in {:?} phase", turn.phase));
        }
        if req.player != turn.current_player {
            result.error(
                ErrorCode::NotYourTurn,
                format!("it is {}'s turn, not {}'s", turn.current_player, req.player),
            );
        }
        if let (Some(limit), Some(elapsed)) = (self.settings.turn_time_limit_ms, req.elapsed_ms) {
            if elapsed > limit {
                result.error(
                    ErrorCode::TurnTimeExceeded,
                    format!("turn took {} ms, limit is {} ms", elapsed, limit),
                );
            }
        }
        if !arena.defender.in_bounds(req.target) {
            result.error(
                ErrorCode::OutOfBounds,
                format!(
                    "{} is outside the {}x{} board",
                    req.target,
                    arena.defender.width(),
                    arena.defender.height()
                ),
            );
        } else if arena.defender.cell(req.target).map_or(false, |c| c.is_hit) {
            result.warn("cell already attacked");
        }
        if let Some(id) = req.ship {
            match arena.attacker.ship(id) {
                Some(ship) if ship.owner() != req.player => {
                    result.error(ErrorCode::InvalidAttacker, format!("{} is not yours", ship.name()))
                }
                Some(ship) if ship.is_sunk() => {
                    result.error(ErrorCode::InvalidAttacker, format!("{} is sunk", ship.name()))
                }
                Some(_) => {}
                None => result.error(ErrorCode::InvalidAttacker, format!("{} is not in your fleet", id)),
            }
        }
        let kind = req.kind.action_kind();
        let limit = self.settings.limit(kind);
        if !self.limiter.check(req.player, kind, &limit, turn.turn) {
            result.error(
                ErrorCode::RateLimited,
                format!(
                    "{:?} allowed {} time(s) per {} turn(s)",
                    kind, limit.max_actions, limit.window_turns
                ),
            );
        }
        result
    }

    /// Validate and, if valid, execute an attack. A rejection leaves every
    /// board, ability and counter untouched.
    pub fn resolve(
        &mut self,
        req: &AttackRequest,
        turn: &TurnInfo,
        arena: &mut CombatArena<'_>,
    ) -> Result<AttackResult, ValidationResult> {
        let validation = self.validate(req, turn, arena);
        if !validation.is_valid() {
            log::debug!("attack by {} at {} rejected: {:?}", req.player, req.target, validation.code());
            return Err(validation);
        }
        for w in &validation.warnings {
            log::warn!("attack by {} at {}: {}", req.player, req.target, w);
        }
        self.limiter
            .record(req.player, req.kind.action_kind(), turn.turn, self.settings.max_window());

        let firing: Vec<ShipId> = match req.ship {
            Some(id) => vec![id],
            None => floating(arena.attacker),
        };

        let mut triggered = Vec::new();
        for id in &firing {
            if let Some(ship) = arena.attacker.ship(*id) {
                triggered.extend(
                    arena
                        .abilities
                        .fire_trigger(Trigger::OnAttack, ship, arena.defender, turn.turn),
                );
            }
        }

        let boost = arena
            .abilities
            .strongest_effect(firing.iter().copied(), EffectType::DamageBoost);
        let offense = OffensiveModifiers {
            boost: boost.map_or(1.0, |(_, m)| m),
            penetration: arena
                .abilities
                .strongest_effect(firing.iter().copied(), EffectType::ArmorPenetration)
                .map_or(0.0, |(_, m)| m),
            detection: arena
                .abilities
                .strongest_effect(floating(arena.attacker), EffectType::Detection)
                .map_or(0.0, |(_, m)| m),
        };

        let (base, cell_multiplier, cells) = match req.kind {
            AttackKind::Normal => (self.settings.normal_damage, 1.0, vec![req.target]),
            AttackKind::Special => (self.settings.special_damage, 1.0, vec![req.target]),
            AttackKind::Area(pattern) => (
                self.settings.normal_damage,
                self.settings.area_multiplier,
                pattern.cells(req.target, arena.defender.width(), arena.defender.height()),
            ),
        };

        let mut results: Vec<AttackResult> = cells
            .iter()
            .map(|&c| self.resolve_cell(c, base, cell_multiplier, &offense, turn.turn, arena))
            .collect();

        if let Some((ship, _)) = boost {
            arena.abilities.consume_next_attack(ship, EffectType::DamageBoost);
        }

        let mut result = if matches!(req.kind, AttackKind::Area(_)) {
            AttackResult::composite(req.target, results)
        } else {
            results.remove(0)
        };
        result.warnings = validation.warnings;
        triggered.append(&mut result.triggered);
        result.triggered = triggered;
        log::debug!(
            "{} attacks {}: {:?} ({} damage)",
            req.player,
            req.target,
            result.outcome,
            result.damage_dealt
        );
        Ok(result)
    }

    fn resolve_cell(
        &self,
        coord: Coord,
        base: u32,
        cell_multiplier: f64,
        offense: &OffensiveModifiers,
        turn: u32,
        arena: &mut CombatArena<'_>,
    ) -> AttackResult {
        let mut result = AttackResult::miss(coord);
        let occupant = match arena.defender.cell(coord) {
            Ok(cell) if cell.is_hit => return result,
            Ok(cell) => cell.ship,
            Err(_) => return result,
        };
        let Some(ship_id) = occupant else {
            arena.defender.record_miss(coord);
            return result;
        };
        let Some(ship) = arena.defender.ship(ship_id) else {
            return result;
        };
        let stealth = arena.abilities.get_effect_magnitude(ship_id, EffectType::Stealth);
        if !ship.is_sunk() && stealth > 0.0 && stealth > offense.detection {
            log::debug!("{} evades the attack at {}", ship.name(), coord);
            arena.defender.record_miss(coord);
            return result;
        }
        let armor = ship.armor() as f64 + arena.abilities.get_effect_magnitude(ship_id, EffectType::ArmorBoost);
        let damage = compute_damage(base, cell_multiplier, offense, armor).max(self.settings.min_hit_damage);

        if !matches!(arena.defender.strike(coord), Ok(Strike::Ship(_))) {
            return result;
        }
        result.outcome = AttackOutcome::Hit;
        result.ship_id = Some(ship_id);
        let Some(ship) = arena.defender.ship_mut(ship_id) else {
            return result;
        };
        let before = ship.hit_points();
        // A ship struck on every cell goes down whatever its hit points.
        let damage = if ship.hits().len() == ship.size() { before } else { damage };
        match ship.apply_damage(damage, turn) {
            DamageOutcome::Sunk => {
                result.outcome = AttackOutcome::Sunk;
                result.ship_sunk = true;
                result.ship_size = Some(ship.size());
                result.damage_dealt = before;
                log::info!("{} of {} sunk at {} on turn {}", ship.name(), ship.owner(), coord, turn);
                arena.abilities.disable_ship(ship_id);
            }
            DamageOutcome::Damaged => {
                result.damage_dealt = before - ship.hit_points();
                if let Some(ship) = arena.defender.ship(ship_id) {
                    result.triggered =
                        arena
                            .abilities
                            .fire_trigger(Trigger::OnDamage, ship, arena.attacker, turn);
                }
            }
            DamageOutcome::AlreadySunk => {}
        }
        result
    }
}

fn floating(board: &Board) -> Vec<ShipId> {
    board
        .ships()
        .iter()
        .filter(|s| !s.is_sunk())
        .map(|s| s.id())
        .collect()
}
