//! Ship and board model, battle configuration and turn orchestration.

pub mod battle;
pub mod board;
pub mod common;
pub mod config;
pub mod ship;

pub use battle::{ActionOutcome, Battle, BattleSnapshot, PlayerAction, PlayerView, SnapshotError, TurnSummary};
pub use board::{Board, Cell, Strike};
pub use common::{
    BoardError, Coord, ErrorCode, GamePhase, GameStatus, PlayerId, ShipId, ValidationError, ValidationResult,
};
pub use config::*;
pub use ship::{DamageOutcome, Era, Orientation, Ship, ShipClass, ShipPlacement, ShipType};
