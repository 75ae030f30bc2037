#![cfg(feature = "std")]
//! Hosting many battles at once. Each battle lives in its own task and is
//! only reached through its command channel, so actions on one game are
//! applied strictly one at a time and games never share state.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use rand::rngs::SmallRng;
use tokio::sync::{mpsc, oneshot};

use crate::abilities::AbilityRegistry;
use crate::core::battle::{ActionOutcome, Battle, BattleSnapshot, PlayerAction, PlayerView};
use crate::core::common::{GameStatus, PlayerId, ValidationResult};
use crate::core::config::BattleConfig;
use crate::core::ship::ShipPlacement;
use crate::player::Player;

pub type GameId = u64;

/// Queued commands per game before senders wait.
const COMMAND_BUFFER: usize = 32;

enum Command {
    Deploy {
        player: PlayerId,
        placements: Vec<ShipPlacement>,
        reply: oneshot::Sender<ValidationResult>,
    },
    Start {
        reply: oneshot::Sender<ValidationResult>,
    },
    Submit {
        player: PlayerId,
        action: PlayerAction,
        reply: oneshot::Sender<ActionOutcome>,
    },
    View {
        player: PlayerId,
        reply: oneshot::Sender<Option<PlayerView>>,
    },
    Snapshot {
        reply: oneshot::Sender<BattleSnapshot>,
    },
    Status {
        player: PlayerId,
        reply: oneshot::Sender<GameStatus>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
}

/// Async access to one battle.
#[async_trait::async_trait]
pub trait BattleApi: Send + Sync {
    async fn deploy(&self, player: PlayerId, placements: Vec<ShipPlacement>) -> anyhow::Result<ValidationResult>;
    async fn start(&self) -> anyhow::Result<ValidationResult>;
    async fn submit(&self, player: PlayerId, action: PlayerAction) -> anyhow::Result<ActionOutcome>;
    async fn view(&self, player: PlayerId) -> anyhow::Result<Option<PlayerView>>;
    async fn snapshot(&self) -> anyhow::Result<BattleSnapshot>;
    async fn status(&self, player: PlayerId) -> anyhow::Result<GameStatus>;
    async fn reset(&self) -> anyhow::Result<()>;
}

/// Cloneable handle to a hosted battle.
#[derive(Clone)]
pub struct GameHandle {
    id: GameId,
    tx: mpsc::Sender<Command>,
}

impl GameHandle {
    pub fn id(&self) -> GameId {
        self.id
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> anyhow::Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| anyhow!("game {} has shut down", self.id))?;
        rx.await.map_err(|_| anyhow!("game {} dropped the request", self.id))
    }
}

#[async_trait::async_trait]
impl BattleApi for GameHandle {
    async fn deploy(&self, player: PlayerId, placements: Vec<ShipPlacement>) -> anyhow::Result<ValidationResult> {
        self.request(|reply| Command::Deploy {
            player,
            placements,
            reply,
        })
        .await
    }

    async fn start(&self) -> anyhow::Result<ValidationResult> {
        self.request(|reply| Command::Start { reply }).await
    }

    async fn submit(&self, player: PlayerId, action: PlayerAction) -> anyhow::Result<ActionOutcome> {
        self.request(|reply| Command::Submit { player, action, reply }).await
    }

    async fn view(&self, player: PlayerId) -> anyhow::Result<Option<PlayerView>> {
        self.request(|reply| Command::View { player, reply }).await
    }

    async fn snapshot(&self) -> anyhow::Result<BattleSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    async fn status(&self, player: PlayerId) -> anyhow::Result<GameStatus> {
        self.request(|reply| Command::Status { player, reply }).await
    }

    async fn reset(&self) -> anyhow::Result<()> {
        self.request(|reply| Command::Reset { reply }).await
    }
}

/// Plan and submit one turn for `player` through `api`, ending the turn if
/// none of the actions did.
pub async fn play_turn<A: BattleApi + ?Sized>(
    api: &A,
    player: &mut dyn Player,
    rng: &mut SmallRng,
) -> anyhow::Result<Vec<ActionOutcome>> {
    let id = player.id();
    let view = api.view(id).await?.ok_or_else(|| anyhow!("{} is not in this game", id))?;
    if !view.your_turn {
        return Ok(Vec::new());
    }
    let mut outcomes = Vec::new();
    for action in player.plan_turn(rng, &view) {
        let outcome = api.submit(id, action).await?;
        player.observe(&outcome);
        let attacked = matches!(outcome, ActionOutcome::Attack(_));
        outcomes.push(outcome);
        if attacked {
            break;
        }
    }
    if api.view(id).await?.map_or(false, |v| v.your_turn) {
        let outcome = api.submit(id, PlayerAction::EndTurn).await?;
        player.observe(&outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

async fn run_game(id: GameId, mut battle: Battle, mut rx: mpsc::Receiver<Command>) {
    log::debug!("game {} running", id);
    while let Some(command) = rx.recv().await {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            Command::Deploy {
                player,
                placements,
                reply,
            } => {
                let _ = reply.send(battle.deploy(player, &placements));
            }
            Command::Start { reply } => {
                let _ = reply.send(battle.start());
            }
            Command::Submit { player, action, reply } => {
                let _ = reply.send(battle.submit(player, action));
            }
            Command::View { player, reply } => {
                let _ = reply.send(battle.view_for(player));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(battle.snapshot());
            }
            Command::Status { player, reply } => {
                let _ = reply.send(battle.status_for(player));
            }
            Command::Reset { reply } => {
                battle.reset();
                let _ = reply.send(());
            }
        }
    }
    log::debug!("game {} closed", id);
}

/// Owns the shared ability registry and the handles of every live game.
pub struct GameHost {
    config: BattleConfig,
    registry: Arc<AbilityRegistry>,
    games: HashMap<GameId, GameHandle>,
    next_id: GameId,
}

impl GameHost {
    pub fn new(config: BattleConfig) -> anyhow::Result<Self> {
        config.validate().map_err(|e| anyhow!(e))?;
        let registry = Arc::new(config.registry().map_err(|e| anyhow!(e))?);
        Ok(Self {
            config,
            registry,
            games: HashMap::new(),
            next_id: 0,
        })
    }

    /// Spawn a new battle task. Must be called inside a tokio runtime.
    pub fn create_game(&mut self, players: [PlayerId; 2]) -> anyhow::Result<GameHandle> {
        let battle = Battle::with_registry(self.config.clone(), self.registry.clone(), players)
            .map_err(|e| anyhow!(e))?;
        let id = self.next_id;
        self.next_id += 1;
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(run_game(id, battle, rx));
        let handle = GameHandle { id, tx };
        self.games.insert(id, handle.clone());
        log::info!("game {} created for {} vs {}", id, players[0], players[1]);
        Ok(handle)
    }

    pub fn game(&self, id: GameId) -> Option<GameHandle> {
        self.games.get(&id).cloned()
    }

    /// Forget a game. Its task stops once every outstanding handle is gone.
    pub fn close(&mut self, id: GameId) -> bool {
        self.games.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
