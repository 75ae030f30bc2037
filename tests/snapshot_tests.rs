use naval_combat::{
    Battle, BattleConfig, BattleSnapshot, Coord, EffectType, GamePhase, Orientation, PlayerAction, PlayerId, ShipId,
    ShipPlacement, SnapshotError,
};

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

fn mid_game() -> Battle {
    let mut battle = Battle::new(BattleConfig::default(), [P1, P2]).unwrap();
    assert!(battle.deploy(P1, &layout()).is_valid());
    assert!(battle.deploy(P2, &layout()).is_valid());
    assert!(battle.start().is_valid());

    let scout = battle.use_ability(P1, ShipId(0), "air_scout", Some(Coord::new(1, 1)));
    assert!(scout.success, "{:?}", scout.errors);
    assert!(!battle.submit(P1, PlayerAction::attack(Coord::new(0, 0))).is_rejected());
    assert!(!battle.submit(P2, PlayerAction::attack(Coord::new(9, 9))).is_rejected());
    battle
}

#[test]
fn test_snapshot_survives_bincode() {
    let battle = mid_game();
    let snapshot = battle.snapshot();
    let bytes = snapshot.to_bytes().unwrap();
    let decoded = BattleSnapshot::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, snapshot);
    assert_eq!(decoded.phase(), GamePhase::Active);
    assert_eq!(decoded.turn(), 3);
    assert_eq!(decoded.winner(), None);
}

#[test]
fn test_restored_battle_plays_on_identically() {
    let mut original = mid_game();
    let bytes = original.snapshot().to_bytes().unwrap();
    let snapshot = BattleSnapshot::from_bytes(&bytes).unwrap();
    let mut restored = Battle::restore(snapshot, original.registry().clone()).unwrap();

    assert_eq!(restored.current_player(), P1);
    assert_eq!(
        restored.abilities().instances().len(),
        original.abilities().instances().len()
    );
    // the scouting reveal carries over
    assert!(restored.board(P2).unwrap().cell(Coord::new(2, 2)).unwrap().is_revealed());
    assert!(restored.effects_on(ShipId(0)).iter().any(|e| e.effect_type == EffectType::Reveal));

    let moves = [
        (P1, PlayerAction::attack(Coord::new(1, 0))),
        (P2, PlayerAction::attack(Coord::new(8, 9))),
        (P1, PlayerAction::attack(Coord::new(2, 0))),
        (P2, PlayerAction::EndTurn),
    ];
    for (player, action) in moves {
        let a = original.submit(player, action.clone());
        let b = restored.submit(player, action);
        assert_eq!(a, b);
    }
    assert_eq!(original.snapshot(), restored.snapshot());
}

#[test]
fn test_garbage_bytes_are_a_decode_error() {
    let err = BattleSnapshot::from_bytes(&[0xff, 0x01, 0x02]).unwrap_err();
    assert!(matches!(err, SnapshotError::Decode(_)));
}

#[test]
fn test_restore_rejects_a_broken_config() {
    let battle = mid_game();
    let mut bytes = battle.snapshot().to_bytes().unwrap();
    // width is the first field of the leading config
    bytes[..8].copy_from_slice(&0u64.to_le_bytes());
    let snapshot = BattleSnapshot::from_bytes(&bytes).unwrap();
    let err = Battle::restore(snapshot, battle.registry().clone()).unwrap_err();
    assert!(matches!(err, SnapshotError::Config(_)));
}
