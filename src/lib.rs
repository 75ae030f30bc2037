//! Turn-based naval combat: a ship/board model, a special-ability system, a
//! combat resolver and a strategy-driven AI, with an optional async host for
//! running many isolated battles.

pub mod abilities;
pub mod ai;
pub mod combat;
pub mod core;
pub mod harness;
#[cfg(feature = "std")]
pub mod host;
#[cfg(feature = "std")]
mod logging;
pub mod player;

pub use crate::abilities::{
    AbilityDefinition, AbilityExecutionResult, AbilityFactory, AbilityProcessor, AbilityRegistry, AbilityState,
    ActiveEffect, EffectType,
};
pub use crate::ai::{AiMemory, AiSettings, BehaviorProfile, Difficulty, StrategyFactory, StrategyResult};
pub use crate::combat::{AttackKind, AttackOutcome, AttackPattern, AttackRequest, AttackResult, CombatResolver};
pub use crate::core::*;
pub use crate::harness::Script;
#[cfg(feature = "std")]
pub use crate::host::{BattleApi, GameHandle, GameHost};
#[cfg(feature = "std")]
pub use logging::{init_logging, init_logging_with};
pub use crate::player::{play_turn, AiPlayer, Player};
