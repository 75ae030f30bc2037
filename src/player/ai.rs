use rand::rngs::SmallRng;

use super::Player;
use crate::ai::{AiMemory, AiSettings, Recommendation, StrategyContext, StrategyFactory, StrategyKind, StrategyResult};
use crate::core::battle::{ActionOutcome, PlayerAction, PlayerView};
use crate::core::common::PlayerId;
use crate::core::ship::{ShipPlacement, ShipType};

/// Strategy-driven AI player.
pub struct AiPlayer {
    id: PlayerId,
    settings: AiSettings,
    memory: AiMemory,
    factory: StrategyFactory,
    last_targeting: Option<StrategyResult>,
    last_ability: Option<StrategyResult>,
}

impl AiPlayer {
    pub fn new(id: PlayerId, settings: AiSettings) -> Self {
        Self::with_factory(id, settings, StrategyFactory::with_defaults())
    }

    pub fn with_factory(id: PlayerId, settings: AiSettings, factory: StrategyFactory) -> Self {
        Self {
            id,
            settings,
            memory: AiMemory::new(),
            factory,
            last_targeting: None,
            last_ability: None,
        }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    /// Read-only memory, for spectators and debugging.
    pub fn memory(&self) -> &AiMemory {
        &self.memory
    }

    /// The targeting decision of the last planned turn.
    pub fn last_result(&self) -> Option<&StrategyResult> {
        self.last_targeting.as_ref()
    }

    pub fn last_ability_result(&self) -> Option<&StrategyResult> {
        self.last_ability.as_ref()
    }

    /// Threat grows with damage taken by the own fleet.
    pub fn assess_threat(view: &PlayerView) -> f64 {
        (1.0 - view.fleet_integrity).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.memory.clear();
        self.last_targeting = None;
        self.last_ability = None;
    }
}

impl Player for AiPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn place_fleet(&mut self, rng: &mut SmallRng, fleet: &[ShipType], width: usize, height: usize) -> Vec<ShipPlacement> {
        let ctx = StrategyContext {
            settings: &self.settings,
            memory: &self.memory,
            width,
            height,
            remaining_sizes: &[],
            fleet,
            ready_abilities: &[],
            threat: 0.0,
            turn: 0,
        };
        let result = self.factory.select(StrategyKind::Placement, &ctx, rng);
        log::info!("{} placement: {}", self.id, result.reasoning);
        match result.action {
            Recommendation::Placement { placements } => placements,
            _ => Vec::new(),
        }
    }

    fn plan_turn(&mut self, rng: &mut SmallRng, view: &PlayerView) -> Vec<PlayerAction> {
        let remaining = self.memory.remaining_sizes(&view.enemy_fleet_sizes);
        let ctx = StrategyContext {
            settings: &self.settings,
            memory: &self.memory,
            width: view.width,
            height: view.height,
            remaining_sizes: &remaining,
            fleet: &[],
            ready_abilities: &view.ready_abilities,
            threat: Self::assess_threat(view),
            turn: view.turn,
        };

        let mut actions = Vec::new();
        let ability = self.factory.select(StrategyKind::Ability, &ctx, rng);
        if let Recommendation::Ability {
            ship,
            ability_id,
            target,
        } = &ability.action
        {
            log::info!("{} ability: {}", self.id, ability.reasoning);
            actions.push(PlayerAction::UseAbility {
                ship: *ship,
                ability_id: ability_id.clone(),
                target: *target,
            });
        }

        let revealed = view.revealed_targets.iter().copied().find(|c| !self.memory.has_shot(*c));
        let targeting = match revealed {
            Some(target) => StrategyResult::new(
                "revealed_target",
                Recommendation::Attack { target },
                1.0,
                format!("scouts spotted a ship at {}", target),
            ),
            None => self.factory.select(StrategyKind::Targeting, &ctx, rng),
        };
        if let Some(target) = targeting.attack_target() {
            log::debug!("{} targets {}: {}", self.id, target, targeting.reasoning);
            actions.push(PlayerAction::attack(target));
        }

        self.last_ability = Some(ability);
        self.last_targeting = Some(targeting);
        actions
    }

    fn observe(&mut self, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Attack(result) => self.memory.record(result),
            ActionOutcome::Ability(result) if !result.success => {
                log::debug!("{} ability {} failed: {:?}", self.id, result.ability_id, result.errors);
            }
            ActionOutcome::Rejected(v) => log::warn!("{} action rejected: {:?}", self.id, v.errors),
            _ => {}
        }
    }
}
