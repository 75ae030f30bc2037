//! Player trait and implementations
//!
//! A player decides from a [`PlayerView`] and learns from the outcomes of
//! its actions. It never touches the battle directly: [`play_turn`] submits
//! on its behalf.

use rand::rngs::SmallRng;

use crate::core::battle::{ActionOutcome, Battle, PlayerAction, PlayerView};
use crate::core::common::{GamePhase, PlayerId};
use crate::core::ship::{ShipPlacement, ShipType};

/// Interface implemented by different player types.
pub trait Player: Send {
    fn id(&self) -> PlayerId;

    /// Lay out `fleet` on a `width`×`height` board.
    fn place_fleet(&mut self, rng: &mut SmallRng, fleet: &[ShipType], width: usize, height: usize)
        -> Vec<ShipPlacement>;

    /// Actions for this turn, in submission order.
    fn plan_turn(&mut self, rng: &mut SmallRng, view: &PlayerView) -> Vec<PlayerAction>;

    /// Inform the player of the outcome of one of its own actions.
    fn observe(&mut self, _outcome: &ActionOutcome) {}
}

/// Plan and submit one turn for `player`. Stops early once the battle
/// finishes or the turn passes to the opponent.
pub fn play_turn(player: &mut dyn Player, rng: &mut SmallRng, battle: &mut Battle) -> Vec<ActionOutcome> {
    let id = player.id();
    let Some(view) = battle.view_for(id) else {
        return Vec::new();
    };
    if !view.your_turn {
        return Vec::new();
    }
    let mut outcomes = Vec::new();
    for action in player.plan_turn(rng, &view) {
        if battle.phase() != GamePhase::Active || battle.current_player() != id {
            break;
        }
        let outcome = battle.submit(id, action);
        player.observe(&outcome);
        outcomes.push(outcome);
    }
    // The turn must pass even when nothing ended it.
    if battle.phase() == GamePhase::Active && battle.current_player() == id {
        let outcome = battle.submit(id, PlayerAction::EndTurn);
        player.observe(&outcome);
        outcomes.push(outcome);
    }
    outcomes
}

pub mod ai;
pub use ai::AiPlayer;
