//! Per (player, action kind) action counters over a sliding window of turns.

use serde::{Deserialize, Serialize};

use crate::core::common::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    SpecialAttack,
    AreaAttack,
}

/// At most `max_actions` within any `window_turns` consecutive turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub max_actions: u32,
    pub window_turns: u32,
}

impl RateLimit {
    pub const fn new(max_actions: u32, window_turns: u32) -> Self {
        Self {
            max_actions,
            window_turns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    player: PlayerId,
    kind: ActionKind,
    turn: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiter {
    history: Vec<Entry>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn in_window(limit: &RateLimit, recorded: u32, now: u32) -> bool {
        now.saturating_sub(recorded) < limit.window_turns.max(1)
    }

    /// Actions of `kind` by `player` counted against `limit` at turn `now`.
    pub fn count(&self, player: PlayerId, kind: ActionKind, limit: &RateLimit, now: u32) -> u32 {
        self.history
            .iter()
            .filter(|e| e.player == player && e.kind == kind && Self::in_window(limit, e.turn, now))
            .count() as u32
    }

    /// Whether one more action fits. Does not record anything.
    pub fn check(&self, player: PlayerId, kind: ActionKind, limit: &RateLimit, now: u32) -> bool {
        self.count(player, kind, limit, now) < limit.max_actions
    }

    /// Record an action and forget entries older than `max_window` turns.
    pub fn record(&mut self, player: PlayerId, kind: ActionKind, now: u32, max_window: u32) {
        self.history
            .retain(|e| now.saturating_sub(e.turn) < max_window.max(1));
        self.history.push(Entry { player, kind, turn: now });
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
