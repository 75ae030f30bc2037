use naval_combat::combat::{apply_armor, AttackKind, AttackPattern};
use naval_combat::{
    ActionOutcome, AttackOutcome, AttackRequest, Battle, BattleConfig, Coord, Era, ErrorCode, GamePhase, Orientation,
    PlayerAction, PlayerId, ShipClass, ShipId, ShipPlacement, ShipType,
};

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn patrol() -> ShipType {
    ShipType::new("patrol", "Patrol Boat", ShipClass::Destroyer, Era::Modern, 2)
}

fn frigate() -> ShipType {
    ShipType::new("frigate", "Frigate", ShipClass::Cruiser, Era::Modern, 3)
}

/// A battle without abilities. P1's ships get ids first.
fn started(fleet: Vec<ShipType>, p1: &[ShipPlacement], p2: &[ShipPlacement], tweak: impl FnOnce(&mut BattleConfig)) -> Battle {
    let mut config = BattleConfig {
        fleet,
        abilities: Vec::new(),
        ..BattleConfig::default()
    };
    tweak(&mut config);
    let mut battle = Battle::new(config, [P1, P2]).unwrap();
    assert!(battle.deploy(P1, p1).is_valid());
    assert!(battle.deploy(P2, p2).is_valid());
    assert!(battle.start().is_valid());
    battle
}

fn duel() -> Battle {
    started(
        vec![patrol()],
        &[ShipPlacement::new("patrol", Coord::new(8, 8), Orientation::Horizontal)],
        &[ShipPlacement::new("patrol", Coord::new(3, 3), Orientation::Vertical)],
        |_| {},
    )
}

fn rejected_code(outcome: &ActionOutcome) -> Option<ErrorCode> {
    match outcome {
        ActionOutcome::Rejected(v) => v.code(),
        _ => None,
    }
}

#[test]
fn test_hit_then_sink() {
    let mut battle = duel();
    let enemy = ShipId(1);

    let first = battle.attack(P1, AttackRequest::new(P1, Coord::new(3, 3))).unwrap();
    assert_eq!(first.outcome, AttackOutcome::Hit);
    assert_eq!(first.ship_id, Some(enemy));
    assert_eq!(first.damage_dealt, 1);
    assert_eq!(battle.board(P2).unwrap().ship(enemy).unwrap().hit_points(), 1);
    assert_eq!(battle.current_player(), P2);

    let reply = battle.attack(P2, AttackRequest::new(P2, Coord::new(0, 0))).unwrap();
    assert_eq!(reply.outcome, AttackOutcome::Miss);

    let second = battle.attack(P1, AttackRequest::new(P1, Coord::new(3, 4))).unwrap();
    assert_eq!(second.outcome, AttackOutcome::Sunk);
    assert!(second.ship_sunk);
    assert_eq!(second.ship_size, Some(2));
    let ship = battle.board(P2).unwrap().ship(enemy).unwrap();
    assert!(ship.is_sunk());
    assert_eq!(ship.sunk_on_turn(), Some(3));
    assert_eq!(battle.phase(), GamePhase::Finished);
    assert_eq!(battle.winner(), Some(P1));
}

#[test]
fn test_out_of_bounds_changes_nothing() {
    let mut battle = duel();
    let before = battle.snapshot();
    let outcome = battle.submit(P1, PlayerAction::attack(Coord::new(10, 3)));
    assert_eq!(rejected_code(&outcome), Some(ErrorCode::OutOfBounds));
    assert_eq!(battle.snapshot(), before);
    assert_eq!(battle.current_player(), P1);
}

#[test]
fn test_attack_out_of_turn_is_rejected() {
    let mut battle = duel();
    let before = battle.snapshot();
    let outcome = battle.submit(P2, PlayerAction::attack(Coord::new(8, 8)));
    assert_eq!(rejected_code(&outcome), Some(ErrorCode::NotYourTurn));
    assert_eq!(battle.snapshot(), before);
}

#[test]
fn test_attack_before_start_is_rejected() {
    let config = BattleConfig {
        fleet: vec![patrol()],
        abilities: Vec::new(),
        ..BattleConfig::default()
    };
    let mut battle = Battle::new(config, [P1, P2]).unwrap();
    let outcome = battle.submit(P1, PlayerAction::attack(Coord::new(0, 0)));
    assert_eq!(rejected_code(&outcome), Some(ErrorCode::GameNotActive));
}

#[test]
fn test_reattack_warns_and_consumes_turn() {
    let mut battle = duel();
    battle.attack(P1, AttackRequest::new(P1, Coord::new(3, 3))).unwrap();
    battle.attack(P2, AttackRequest::new(P2, Coord::new(0, 0))).unwrap();

    let again = battle.attack(P1, AttackRequest::new(P1, Coord::new(3, 3))).unwrap();
    assert_eq!(again.outcome, AttackOutcome::Miss);
    assert_eq!(again.damage_dealt, 0);
    assert_eq!(again.warnings, vec!["cell already attacked".to_string()]);
    assert_eq!(battle.board(P2).unwrap().ship(ShipId(1)).unwrap().hit_points(), 1);
    assert_eq!(battle.current_player(), P2);
}

#[test]
fn test_rate_limit_per_turn() {
    let mut battle = started(
        vec![frigate()],
        &[ShipPlacement::new("frigate", Coord::new(0, 9), Orientation::Horizontal)],
        &[ShipPlacement::new("frigate", Coord::new(5, 5), Orientation::Horizontal)],
        |c| c.combat.end_turn_after_attack = false,
    );
    battle.attack(P1, AttackRequest::new(P1, Coord::new(0, 0))).unwrap();
    let err = battle.attack(P1, AttackRequest::new(P1, Coord::new(1, 0))).unwrap_err();
    assert!(err.has_code(ErrorCode::RateLimited));
    assert!(!battle.board(P2).unwrap().misses().contains(&Coord::new(1, 0)));

    battle.end_turn(P1).unwrap();
    battle.end_turn(P2).unwrap();
    assert!(battle.attack(P1, AttackRequest::new(P1, Coord::new(1, 0))).is_ok());
}

#[test]
fn test_special_attacks_are_rate_limited_separately() {
    let mut battle = started(
        vec![frigate()],
        &[ShipPlacement::new("frigate", Coord::new(0, 9), Orientation::Horizontal)],
        &[ShipPlacement::new("frigate", Coord::new(5, 5), Orientation::Horizontal)],
        |c| c.combat.end_turn_after_attack = false,
    );
    let special = |c: Coord| AttackRequest::new(P1, c).with_kind(AttackKind::Special);

    let hit = battle.attack(P1, special(Coord::new(5, 5))).unwrap();
    assert_eq!(hit.damage_dealt, 2);
    battle.end_turn(P1).unwrap();
    battle.end_turn(P2).unwrap();

    let err = battle.attack(P1, special(Coord::new(6, 5))).unwrap_err();
    assert!(err.has_code(ErrorCode::RateLimited));
    assert!(battle.attack(P1, AttackRequest::new(P1, Coord::new(0, 0))).is_ok());
    battle.end_turn(P1).unwrap();
    battle.end_turn(P2).unwrap();

    assert!(battle.attack(P1, special(Coord::new(0, 1))).is_ok());
}

#[test]
fn test_turn_time_limit() {
    let mut battle = started(
        vec![patrol()],
        &[ShipPlacement::new("patrol", Coord::new(8, 8), Orientation::Horizontal)],
        &[ShipPlacement::new("patrol", Coord::new(3, 3), Orientation::Vertical)],
        |c| c.combat.turn_time_limit_ms = Some(30_000),
    );
    let mut slow = AttackRequest::new(P1, Coord::new(3, 3));
    slow.elapsed_ms = Some(45_000);
    let err = battle.attack(P1, slow).unwrap_err();
    assert!(err.has_code(ErrorCode::TurnTimeExceeded));

    let mut quick = AttackRequest::new(P1, Coord::new(3, 3));
    quick.elapsed_ms = Some(1_000);
    assert!(battle.attack(P1, quick).is_ok());
}

#[test]
fn test_firing_ship_must_be_own_and_afloat() {
    let mut battle = duel();
    let err = battle
        .attack(P1, AttackRequest::new(P1, Coord::new(3, 3)).from_ship(ShipId(1)))
        .unwrap_err();
    assert!(err.has_code(ErrorCode::InvalidAttacker));
    assert!(battle
        .attack(P1, AttackRequest::new(P1, Coord::new(3, 3)).from_ship(ShipId(0)))
        .is_ok());
}

#[test]
fn test_area_attack_chain() {
    let mut battle = started(
        vec![frigate(), patrol()],
        &[
            ShipPlacement::new("frigate", Coord::new(0, 9), Orientation::Horizontal),
            ShipPlacement::new("patrol", Coord::new(8, 0), Orientation::Horizontal),
        ],
        &[
            ShipPlacement::new("frigate", Coord::new(3, 4), Orientation::Horizontal),
            ShipPlacement::new("patrol", Coord::new(0, 0), Orientation::Vertical),
        ],
        |_| {},
    );
    let request = AttackRequest::new(P1, Coord::new(4, 4)).with_kind(AttackKind::Area(AttackPattern::Square { radius: 1 }));
    let result = battle.attack(P1, request).unwrap();

    assert_eq!(result.chain_reaction.len(), 9);
    assert_eq!(result.chain_reaction[0].coordinate, Coord::new(4, 4));
    assert_eq!(result.outcome, AttackOutcome::Sunk);
    assert!(result.ship_sunk);
    assert_eq!(result.ship_size, Some(3));
    assert_eq!(result.ship_id, Some(ShipId(2)));
    assert_eq!(result.damage_dealt, 3);
    let hits = result.chain_reaction.iter().filter(|r| r.is_hit()).count();
    assert_eq!(hits, 3);
    assert_eq!(battle.board(P2).unwrap().misses().len(), 6);
    assert_eq!(battle.phase(), GamePhase::Active);
}

#[test]
fn test_oversized_area_patterns_are_clipped_to_the_board() {
    let patterns = [
        (Coord::new(1, 1), AttackPattern::Square { radius: usize::MAX }, 100),
        (Coord::new(3, 0), AttackPattern::Cross { arm: usize::MAX }, 19),
        (
            Coord::new(0, 3),
            AttackPattern::Line {
                orientation: Orientation::Horizontal,
                length: usize::MAX,
            },
            10,
        ),
    ];
    for (target, pattern, cells) in patterns {
        let mut battle = duel();
        let outcome = battle.submit(
            P1,
            PlayerAction::Attack {
                target,
                kind: AttackKind::Area(pattern),
                ship: None,
                elapsed_ms: None,
            },
        );
        let ActionOutcome::Attack(result) = &outcome else {
            panic!("{:?} was not resolved: {:?}", pattern, outcome);
        };
        assert_eq!(result.chain_reaction.len(), cells, "{:?}", pattern);
        assert!(result.chain_reaction.iter().any(|r| r.is_hit()), "{:?}", pattern);
    }
}

#[test]
fn test_armor_reduces_damage_with_floor() {
    let mut armored = frigate();
    armored.armor = 8;
    armored.hit_points = Some(10);
    let mut battle = started(
        vec![armored],
        &[ShipPlacement::new("frigate", Coord::new(0, 9), Orientation::Horizontal)],
        &[ShipPlacement::new("frigate", Coord::new(5, 5), Orientation::Horizontal)],
        |_| {},
    );
    // heavy armor rounds a normal hit down to zero; the floor still applies
    let result = battle.attack(P1, AttackRequest::new(P1, Coord::new(5, 5))).unwrap();
    assert_eq!(result.damage_dealt, 1);
    assert_eq!(apply_armor(10.0, 5.0, 3.0), 8);
}

#[test]
fn test_ship_struck_everywhere_sinks_despite_hit_points() {
    let mut sturdy = patrol();
    sturdy.hit_points = Some(5);
    let mut battle = started(
        vec![sturdy],
        &[ShipPlacement::new("patrol", Coord::new(8, 8), Orientation::Horizontal)],
        &[ShipPlacement::new("patrol", Coord::new(3, 3), Orientation::Vertical)],
        |_| {},
    );
    battle.attack(P1, AttackRequest::new(P1, Coord::new(3, 3))).unwrap();
    battle.attack(P2, AttackRequest::new(P2, Coord::new(0, 0))).unwrap();
    let last = battle.attack(P1, AttackRequest::new(P1, Coord::new(3, 4))).unwrap();
    assert_eq!(last.outcome, AttackOutcome::Sunk);
    assert_eq!(last.damage_dealt, 4);
    assert_eq!(battle.winner(), Some(P1));
}
