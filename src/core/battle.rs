//! Battle orchestration: fleets, phases and turns, with every player action
//! routed through the combat resolver or the ability processor.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::common::{BoardError, Coord, ErrorCode, GamePhase, GameStatus, PlayerId, ShipId, ValidationResult};
use super::config::{BattleConfig, ConfigError};
use super::ship::{Ship, ShipPlacement};
use crate::abilities::{
    AbilityContext, AbilityExecutionResult, AbilityFactory, AbilityProcessor, AbilityRegistry, ActiveEffect,
    EffectType, ProcessorState, ReadyAbility, Trigger,
};
use crate::combat::{AttackKind, AttackRequest, AttackResult, CombatArena, CombatResolver, RateLimiter, TurnInfo};

/// An action a player submits on their turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    Attack {
        target: Coord,
        #[serde(default)]
        kind: AttackKind,
        #[serde(default)]
        ship: Option<ShipId>,
        #[serde(default)]
        elapsed_ms: Option<u64>,
    },
    UseAbility {
        ship: ShipId,
        ability_id: String,
        #[serde(default)]
        target: Option<Coord>,
    },
    EndTurn,
}

impl PlayerAction {
    pub fn attack(target: Coord) -> Self {
        PlayerAction::Attack {
            target,
            kind: AttackKind::Normal,
            ship: None,
            elapsed_ms: None,
        }
    }
}

/// What happened when a turn closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub ended_by: PlayerId,
    pub next_player: PlayerId,
    pub turn: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expired_effects: Vec<ActiveEffect>,
    /// Turn-start triggers of the next player.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggered: Vec<AbilityExecutionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "result", rename_all = "snake_case")]
pub enum ActionOutcome {
    Attack(AttackResult),
    Ability(AbilityExecutionResult),
    TurnEnded(TurnSummary),
    Rejected(ValidationResult),
}

impl ActionOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ActionOutcome::Rejected(_))
            || matches!(self, ActionOutcome::Ability(r) if !r.success)
    }
}

/// What one player may see of the battle when deciding a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player: PlayerId,
    pub phase: GamePhase,
    pub turn: u32,
    pub your_turn: bool,
    pub width: usize,
    pub height: usize,
    /// Lengths of every enemy ship, sunk or not.
    pub enemy_fleet_sizes: Vec<usize>,
    /// Enemy cells currently revealed that hold an unhit ship segment.
    pub revealed_targets: Vec<Coord>,
    pub ready_abilities: Vec<ReadyAbility>,
    /// Remaining over maximum hit points of the own fleet.
    pub fleet_integrity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Side {
    player: PlayerId,
    board: Board,
    deployed: bool,
}

/// Errors raised while encoding or decoding a [`BattleSnapshot`].
#[derive(Debug)]
pub enum SnapshotError {
    Encode(String),
    Decode(String),
    Config(ConfigError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Encode(e) => write!(f, "failed to encode snapshot: {}", e),
            SnapshotError::Decode(e) => write!(f, "failed to decode snapshot: {}", e),
            SnapshotError::Config(e) => write!(f, "snapshot carries an invalid config: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Complete serializable battle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    config: BattleConfig,
    sides: [Side; 2],
    abilities: ProcessorState,
    limiter: RateLimiter,
    phase: GamePhase,
    current: usize,
    turn: u32,
    winner: Option<PlayerId>,
    next_ship_id: u32,
}

impl BattleSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }
}

#[derive(Debug)]
pub struct Battle {
    config: BattleConfig,
    registry: Arc<AbilityRegistry>,
    factory: AbilityFactory,
    sides: [Side; 2],
    abilities: AbilityProcessor,
    resolver: CombatResolver,
    phase: GamePhase,
    current: usize,
    turn: u32,
    winner: Option<PlayerId>,
    next_ship_id: u32,
}

impl Battle {
    /// Build a battle from `config`, registering its ability definitions.
    pub fn new(config: BattleConfig, players: [PlayerId; 2]) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = Arc::new(config.registry()?);
        Self::with_registry(config, registry, players)
    }

    /// Build a battle sharing an existing registry.
    pub fn with_registry(
        config: BattleConfig,
        registry: Arc<AbilityRegistry>,
        players: [PlayerId; 2],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.width, config.height).map_err(|_| ConfigError::InvalidBoard {
            width: config.width,
            height: config.height,
        })?;
        let sides = players.map(|player| Side {
            player,
            board: board.clone(),
            deployed: false,
        });
        Ok(Self {
            factory: AbilityFactory::with_limit(&registry, config.ability_settings.max_abilities_per_ship),
            abilities: AbilityProcessor::new(registry.clone(), config.ability_settings),
            resolver: CombatResolver::new(config.combat),
            registry,
            config,
            sides,
            phase: GamePhase::Setup,
            current: 0,
            turn: 0,
            winner: None,
            next_ship_id: 0,
        })
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<AbilityRegistry> {
        &self.registry
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn players(&self) -> [PlayerId; 2] {
        [self.sides[0].player, self.sides[1].player]
    }

    pub fn current_player(&self) -> PlayerId {
        self.sides[self.current].player
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.side_index(player).map(|i| self.sides[1 - i].player)
    }

    pub fn turn_info(&self) -> TurnInfo {
        TurnInfo {
            phase: self.phase,
            current_player: self.current_player(),
            turn: self.turn,
        }
    }

    /// The board holding `player`'s fleet.
    pub fn board(&self, player: PlayerId) -> Option<&Board> {
        self.side_index(player).map(|i| &self.sides[i].board)
    }

    pub fn abilities(&self) -> &AbilityProcessor {
        &self.abilities
    }

    pub fn ability_factory(&self) -> &AbilityFactory {
        &self.factory
    }

    /// Live effects on `ship`, for display.
    pub fn effects_on(&self, ship: ShipId) -> Vec<ActiveEffect> {
        self.abilities.effects_for_ship(ship).cloned().collect()
    }

    pub fn status_for(&self, player: PlayerId) -> GameStatus {
        match self.winner {
            Some(w) if w == player => GameStatus::Won,
            Some(_) => GameStatus::Lost,
            None => GameStatus::InProgress,
        }
    }

    /// The fog-of-war view for `player`.
    pub fn view_for(&self, player: PlayerId) -> Option<PlayerView> {
        let idx = self.side_index(player)?;
        let own = &self.sides[idx].board;
        let enemy = &self.sides[1 - idx].board;
        let revealed_targets = enemy
            .coords()
            .filter(|&c| {
                enemy
                    .cell(c)
                    .map_or(false, |cell| cell.is_revealed() && cell.ship.is_some() && !cell.is_hit)
            })
            .collect();
        Some(PlayerView {
            player,
            phase: self.phase,
            turn: self.turn,
            your_turn: self.phase == GamePhase::Active && idx == self.current,
            width: enemy.width(),
            height: enemy.height(),
            enemy_fleet_sizes: enemy.ships().iter().map(|s| s.size()).collect(),
            revealed_targets,
            ready_abilities: self.abilities.ready_abilities(player, own),
            fleet_integrity: own.fleet_integrity(),
        })
    }

    fn side_index(&self, player: PlayerId) -> Option<usize> {
        self.sides.iter().position(|s| s.player == player)
    }

    /// `(own, enemy)` boards for side `idx`.
    fn boards_mut(&mut self, idx: usize) -> (&mut Board, &mut Board) {
        let (first, second) = self.sides.split_at_mut(1);
        if idx == 0 {
            (&mut first[0].board, &mut second[0].board)
        } else {
            (&mut second[0].board, &mut first[0].board)
        }
    }

    /// Place `player`'s fleet. Nothing changes unless every placement is
    /// valid.
    pub fn deploy(&mut self, player: PlayerId, placements: &[ShipPlacement]) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if self.phase != GamePhase::Setup {
            result.error(ErrorCode::GameNotActive, "fleets can only be deployed during setup");
            return result;
        }
        let Some(idx) = self.side_index(player) else {
            result.error(ErrorCode::InvalidPlayer, format!("{} is not in this battle", player));
            return result;
        };
        if self.sides[idx].deployed {
            result.error(ErrorCode::InvalidPlacement, format!("{} has already deployed", player));
            return result;
        }
        if placements.is_empty() {
            result.error(ErrorCode::FleetEmpty, "no ships to deploy");
            return result;
        }
        if placements.len() > self.config.fleet.len() {
            result.warn("more ships placed than required");
        }

        let mut board = self.sides[idx].board.clone();
        for (i, p) in placements.iter().enumerate() {
            let Some(ship_type) = self.config.ship_type(&p.ship_type) else {
                result.error(ErrorCode::UnknownShipType, format!("unknown ship type '{}'", p.ship_type));
                continue;
            };
            if let Err(e) = board.fits(p.origin, p.orientation, ship_type.size) {
                result.error(ErrorCode::OutOfBounds, format!("{}: {}", ship_type.name, e));
                continue;
            }
            let id = ShipId(self.next_ship_id + i as u32);
            let ship = Ship::new(id, player, ship_type, p.origin, p.orientation);
            if let Err(e) = board.place(ship) {
                let code = match e {
                    BoardError::OutOfBounds(_) => ErrorCode::OutOfBounds,
                    _ => ErrorCode::InvalidPlacement,
                };
                result.error(code, format!("{}: {}", ship_type.name, e));
            }
        }
        if !result.is_valid() {
            log::debug!("deployment of {} rejected: {:?}", player, result.code());
            return result;
        }

        for i in 0..placements.len() {
            let id = ShipId(self.next_ship_id + i as u32);
            let Some(ship) = board.ship_mut(id) else { continue };
            let Some(ship_type) = self.config.ship_type(ship.type_id()) else { continue };
            for ability_id in self.factory.abilities_for(ship_type) {
                if let Some(def) = self.registry.get(&ability_id) {
                    self.abilities.instantiate(def, ship);
                }
            }
        }
        self.next_ship_id += placements.len() as u32;
        self.sides[idx].board = board;
        self.sides[idx].deployed = true;
        log::info!("{} deployed {} ship(s)", player, placements.len());
        result
    }

    /// Leave setup once both fleets are deployed. The first player's
    /// turn-start triggers fire.
    pub fn start(&mut self) -> ValidationResult {
        if self.phase != GamePhase::Setup {
            return ValidationResult::rejected(ErrorCode::GameNotActive, "battle already started");
        }
        let mut result = ValidationResult::ok();
        for side in &self.sides {
            if !side.deployed {
                result.error(ErrorCode::FleetEmpty, format!("{} has not deployed", side.player));
            }
        }
        if !result.is_valid() {
            return result;
        }
        self.phase = GamePhase::Active;
        self.current = 0;
        self.turn = 1;
        log::info!("battle started, {} moves first", self.current_player());
        self.begin_turn();
        result
    }

    fn check_turn(&self, player: PlayerId) -> Result<usize, ValidationResult> {
        let Some(idx) = self.side_index(player) else {
            return Err(ValidationResult::rejected(
                ErrorCode::InvalidPlayer,
                format!("{} is not in this battle", player),
            ));
        };
        if self.phase != GamePhase::Active {
            return Err(ValidationResult::rejected(
                ErrorCode::GameNotActive,
                format!("game is in {:?} phase", self.phase),
            ));
        }
        if idx != self.current {
            return Err(ValidationResult::rejected(
                ErrorCode::NotYourTurn,
                format!("it is {}'s turn", self.current_player()),
            ));
        }
        Ok(idx)
    }

    /// Resolve an attack by `player`. The request's own player field is
    /// overwritten with `player`.
    pub fn attack(&mut self, player: PlayerId, mut request: AttackRequest) -> Result<AttackResult, ValidationResult> {
        request.player = player;
        let Some(idx) = self.side_index(player) else {
            return Err(ValidationResult::rejected(
                ErrorCode::InvalidPlayer,
                format!("{} is not in this battle", player),
            ));
        };
        let turn = self.turn_info();
        let result = {
            let (first, second) = self.sides.split_at_mut(1);
            let (attacker, defender) = if idx == 0 {
                (&mut first[0].board, &mut second[0].board)
            } else {
                (&mut second[0].board, &mut first[0].board)
            };
            let mut arena = CombatArena {
                attacker,
                defender,
                abilities: &mut self.abilities,
            };
            self.resolver.resolve(&request, &turn, &mut arena)?
        };

        if self.sides[1 - idx].board.all_sunk() {
            self.phase = GamePhase::Finished;
            self.winner = Some(player);
            log::info!("{} wins on turn {}", player, self.turn);
        } else if self.resolver.settings().end_turn_after_attack {
            self.finish_turn();
        }
        Ok(result)
    }

    /// Activate `ability_id` on one of `player`'s ships.
    pub fn use_ability(
        &mut self,
        player: PlayerId,
        ship: ShipId,
        ability_id: &str,
        target: Option<Coord>,
    ) -> AbilityExecutionResult {
        let idx = match self.check_turn(player) {
            Ok(idx) => idx,
            Err(v) => return AbilityExecutionResult::failed(ability_id, Some(ship), v),
        };
        let Some(instance) = self.abilities.find(ship, ability_id) else {
            return AbilityExecutionResult::failed(
                ability_id,
                Some(ship),
                ValidationResult::rejected(
                    ErrorCode::AbilityNotFound,
                    format!("{} has no ability '{}'", ship, ability_id),
                ),
            );
        };
        let turn = self.turn;
        let (first, second) = self.sides.split_at_mut(1);
        let (own, enemy) = if idx == 0 {
            (&first[0].board, &mut second[0].board)
        } else {
            (&second[0].board, &mut first[0].board)
        };
        let Some(ship_ref) = own.ship(ship) else {
            return AbilityExecutionResult::failed(
                ability_id,
                Some(ship),
                ValidationResult::rejected(ErrorCode::InvalidPlayer, format!("{} is not in your fleet", ship)),
            );
        };
        let mut ctx = AbilityContext {
            player,
            ship: ship_ref,
            target,
            enemy_board: enemy,
            turn,
        };
        self.abilities.activate(instance, &mut ctx)
    }

    /// Close `player`'s turn.
    pub fn end_turn(&mut self, player: PlayerId) -> Result<TurnSummary, ValidationResult> {
        self.check_turn(player)?;
        Ok(self.finish_turn())
    }

    fn finish_turn(&mut self) -> TurnSummary {
        let ended_by = self.current_player();
        let expired = self.abilities.end_turn(ended_by);
        {
            let (_, enemy) = self.boards_mut(self.current);
            for effect in expired.iter().filter(|e| e.effect_type == EffectType::Reveal) {
                enemy.conceal(effect.cells());
            }
        }
        self.current = 1 - self.current;
        self.turn += 1;
        let triggered = self.begin_turn();
        log::debug!("turn {}: {} to move", self.turn, self.current_player());
        TurnSummary {
            ended_by,
            next_player: self.current_player(),
            turn: self.turn,
            expired_effects: expired,
            triggered,
        }
    }

    fn begin_turn(&mut self) -> Vec<AbilityExecutionResult> {
        let player = self.current_player();
        self.abilities.begin_turn(player);
        let turn = self.turn;
        let idx = self.current;
        let (first, second) = self.sides.split_at_mut(1);
        let (own, enemy) = if idx == 0 {
            (&first[0].board, &mut second[0].board)
        } else {
            (&second[0].board, &mut first[0].board)
        };
        let mut fired = Vec::new();
        for ship in own.ships().iter().filter(|s| !s.is_sunk()) {
            fired.extend(self.abilities.fire_trigger(Trigger::OnTurnStart, ship, enemy, turn));
        }
        fired
    }

    /// Single entry point for scripted and hosted play.
    pub fn submit(&mut self, player: PlayerId, action: PlayerAction) -> ActionOutcome {
        match action {
            PlayerAction::Attack {
                target,
                kind,
                ship,
                elapsed_ms,
            } => {
                let request = AttackRequest {
                    player,
                    target,
                    kind,
                    ship,
                    elapsed_ms,
                };
                match self.attack(player, request) {
                    Ok(result) => ActionOutcome::Attack(result),
                    Err(v) => ActionOutcome::Rejected(v),
                }
            }
            PlayerAction::UseAbility {
                ship,
                ability_id,
                target,
            } => ActionOutcome::Ability(self.use_ability(player, ship, &ability_id, target)),
            PlayerAction::EndTurn => match self.end_turn(player) {
                Ok(summary) => ActionOutcome::TurnEnded(summary),
                Err(v) => ActionOutcome::Rejected(v),
            },
        }
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            config: self.config.clone(),
            sides: self.sides.clone(),
            abilities: self.abilities.state_snapshot(),
            limiter: self.resolver.limiter().clone(),
            phase: self.phase,
            current: self.current,
            turn: self.turn,
            winner: self.winner,
            next_ship_id: self.next_ship_id,
        }
    }

    /// Rebuild a battle from a snapshot, sharing `registry`.
    pub fn restore(snapshot: BattleSnapshot, registry: Arc<AbilityRegistry>) -> Result<Self, SnapshotError> {
        snapshot.config.validate().map_err(SnapshotError::Config)?;
        let config = snapshot.config;
        Ok(Self {
            factory: AbilityFactory::with_limit(&registry, config.ability_settings.max_abilities_per_ship),
            abilities: AbilityProcessor::restore(registry.clone(), config.ability_settings, snapshot.abilities),
            resolver: CombatResolver::restore(config.combat, snapshot.limiter),
            registry,
            config,
            sides: snapshot.sides,
            phase: snapshot.phase,
            current: snapshot.current.min(1),
            turn: snapshot.turn,
            winner: snapshot.winner,
            next_ship_id: snapshot.next_ship_id,
        })
    }

    /// Back to setup with empty boards and no ability state.
    pub fn reset(&mut self) {
        for side in &mut self.sides {
            if let Ok(board) = Board::new(self.config.width, self.config.height) {
                side.board = board;
            }
            side.deployed = false;
        }
        self.abilities.reset();
        self.resolver.reset();
        self.phase = GamePhase::Setup;
        self.current = 0;
        self.turn = 0;
        self.winner = None;
        self.next_ship_id = 0;
        log::info!("battle reset");
    }
}
