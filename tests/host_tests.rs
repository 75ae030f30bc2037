#![cfg(feature = "std")]

use naval_combat::host::play_turn;
use naval_combat::{
    ActionOutcome, AiPlayer, AiSettings, BattleApi, BattleConfig, Coord, ErrorCode, GamePhase, GameHost, GameStatus,
    Orientation, Player, PlayerAction, PlayerId, ShipPlacement,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn layout() -> Vec<ShipPlacement> {
    vec![
        ShipPlacement::new("carrier", Coord::new(0, 0), Orientation::Horizontal),
        ShipPlacement::new("battleship", Coord::new(0, 2), Orientation::Horizontal),
        ShipPlacement::new("cruiser", Coord::new(0, 4), Orientation::Horizontal),
        ShipPlacement::new("submarine", Coord::new(0, 6), Orientation::Horizontal),
        ShipPlacement::new("destroyer", Coord::new(0, 8), Orientation::Horizontal),
    ]
}

#[tokio::test]
async fn test_hosted_ai_game_finishes() {
    let config = BattleConfig::default();
    let mut host = GameHost::new(config.clone()).unwrap();
    let handle = host.create_game([P1, P2]).unwrap();

    let mut players = [
        AiPlayer::new(P1, AiSettings::default()),
        AiPlayer::new(P2, AiSettings::default()),
    ];
    let mut rngs = [SmallRng::seed_from_u64(3), SmallRng::seed_from_u64(4)];
    for (player, rng) in players.iter_mut().zip(rngs.iter_mut()) {
        let placements = player.place_fleet(rng, &config.fleet, config.width, config.height);
        assert!(handle.deploy(player.id(), placements).await.unwrap().is_valid());
    }
    assert!(handle.start().await.unwrap().is_valid());

    let mut rounds = 0;
    while handle.status(P1).await.unwrap() == GameStatus::InProgress && rounds < 1000 {
        for (player, rng) in players.iter_mut().zip(rngs.iter_mut()) {
            play_turn(&handle, player, rng).await.unwrap();
        }
        rounds += 1;
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase(), GamePhase::Finished);
    let winner = snapshot.winner().unwrap();
    assert_eq!(handle.status(winner).await.unwrap(), GameStatus::Won);
}

#[tokio::test]
async fn test_games_do_not_share_state() {
    let mut host = GameHost::new(BattleConfig::default()).unwrap();
    let first = host.create_game([P1, P2]).unwrap();
    let second = host.create_game([P1, P2]).unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(host.len(), 2);

    for handle in [&first, &second] {
        assert!(handle.deploy(P1, layout()).await.unwrap().is_valid());
        assert!(handle.deploy(P2, layout()).await.unwrap().is_valid());
        assert!(handle.start().await.unwrap().is_valid());
    }

    let outcome = first.submit(P1, PlayerAction::attack(Coord::new(0, 0))).await.unwrap();
    assert!(matches!(outcome, ActionOutcome::Attack(_)));

    assert_eq!(first.snapshot().await.unwrap().turn(), 2);
    assert_eq!(second.snapshot().await.unwrap().turn(), 1);
    assert!(second.view(P1).await.unwrap().unwrap().your_turn);
    assert!(!first.view(P1).await.unwrap().unwrap().your_turn);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_submissions_are_serialized() {
    let mut host = GameHost::new(BattleConfig::default()).unwrap();
    let handle = host.create_game([P1, P2]).unwrap();
    assert!(handle.deploy(P1, layout()).await.unwrap().is_valid());
    assert!(handle.deploy(P2, layout()).await.unwrap().is_valid());
    assert!(handle.start().await.unwrap().is_valid());

    // Two racing attacks by the same player: exactly one lands.
    let a = tokio::spawn({
        let handle = handle.clone();
        async move { handle.submit(P1, PlayerAction::attack(Coord::new(9, 9))).await }
    });
    let b = tokio::spawn({
        let handle = handle.clone();
        async move { handle.submit(P1, PlayerAction::attack(Coord::new(9, 8))).await }
    });
    let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
    let landed = outcomes.iter().filter(|o| matches!(o, ActionOutcome::Attack(_))).count();
    assert_eq!(landed, 1);
    let rejected = outcomes.iter().find_map(|o| match o {
        ActionOutcome::Rejected(v) => Some(v.clone()),
        _ => None,
    });
    assert!(rejected.unwrap().has_code(ErrorCode::NotYourTurn));
}

#[tokio::test]
async fn test_closed_game_is_forgotten() {
    let mut host = GameHost::new(BattleConfig::default()).unwrap();
    let handle = host.create_game([P1, P2]).unwrap();
    let id = handle.id();
    assert!(host.game(id).is_some());
    assert!(host.close(id));
    assert!(host.game(id).is_none());
    assert!(host.is_empty());

    // an outstanding handle keeps the game alive
    handle.reset().await.unwrap();
    assert_eq!(handle.status(P1).await.unwrap(), GameStatus::InProgress);
}

#[tokio::test]
async fn test_invalid_config_is_refused() {
    let config = BattleConfig {
        width: 0,
        ..BattleConfig::default()
    };
    assert!(GameHost::new(config).is_err());
}
