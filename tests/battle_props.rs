use naval_combat::{
    AiPlayer, AiSettings, AttackKind, AttackPattern, Battle, BattleConfig, Coord, GamePhase, Player, PlayerAction,
    PlayerId, ShipId,
};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

const PLAYERS: [PlayerId; 2] = [PlayerId(1), PlayerId(2)];
const ABILITY_IDS: [&str; 6] = [
    "all_big_guns",
    "air_scout",
    "silent_running",
    "sonar_ping",
    "damage_control",
    "reinforced_hull",
];

fn deployed(seed: u64) -> Battle {
    let config = BattleConfig::default();
    let mut battle = Battle::new(config.clone(), PLAYERS).unwrap();
    let mut rng = SmallRng::seed_from_u64(seed);
    for id in PLAYERS {
        let mut ai = AiPlayer::new(id, AiSettings::default());
        let placements = ai.place_fleet(&mut rng, &config.fleet, config.width, config.height);
        assert!(battle.deploy(id, &placements).is_valid());
    }
    assert!(battle.start().is_valid());
    battle
}

fn kind(k: u8) -> AttackKind {
    match k {
        0 => AttackKind::Normal,
        1 => AttackKind::Special,
        2 => AttackKind::Area(AttackPattern::Square { radius: 1 }),
        _ => AttackKind::Area(AttackPattern::Cross { arm: 2 }),
    }
}

fn action() -> impl Strategy<Value = (usize, PlayerAction)> {
    prop_oneof![
        4 => (0..2usize, 0..12usize, 0..12usize, 0..4u8).prop_map(|(p, x, y, k)| {
            (p, PlayerAction::Attack {
                target: Coord::new(x, y),
                kind: kind(k),
                ship: None,
                elapsed_ms: None,
            })
        }),
        2 => (0..2usize, 0..12u32, 0..ABILITY_IDS.len(), proptest::option::of((0..10usize, 0..10usize)))
            .prop_map(|(p, ship, a, target)| {
                (p, PlayerAction::UseAbility {
                    ship: ShipId(ship),
                    ability_id: ABILITY_IDS[a].to_string(),
                    target: target.map(|(x, y)| Coord::new(x, y)),
                })
            }),
        1 => (0..2usize).prop_map(|p| (p, PlayerAction::EndTurn)),
    ]
}

fn check_invariants(battle: &Battle) -> Result<(), TestCaseError> {
    for id in PLAYERS {
        for ship in battle.board(id).unwrap().ships() {
            prop_assert!(ship.hit_points() <= ship.max_hit_points());
            prop_assert!(ship.hits().len() <= ship.size());
            if ship.hit_points() == 0 || ship.hits().len() == ship.size() {
                prop_assert!(ship.is_sunk(), "{} should be sunk", ship.id());
            }
        }
    }
    match battle.winner() {
        Some(winner) => {
            prop_assert_eq!(battle.phase(), GamePhase::Finished);
            let loser = battle.opponent_of(winner).unwrap();
            prop_assert!(battle.board(loser).unwrap().all_sunk());
        }
        None => prop_assert_eq!(battle.phase(), GamePhase::Active),
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rejected_actions_leave_no_trace(seed in any::<u64>(), actions in prop::collection::vec(action(), 1..60)) {
        let mut battle = deployed(seed);
        for (p, action) in actions {
            let before = battle.snapshot();
            let outcome = battle.submit(PLAYERS[p], action);
            if outcome.is_rejected() {
                prop_assert_eq!(&battle.snapshot(), &before, "rejected {:?} mutated the battle", outcome);
            }
        }
    }

    #[test]
    fn ships_and_phase_stay_consistent(seed in any::<u64>(), actions in prop::collection::vec(action(), 1..120)) {
        let mut battle = deployed(seed);
        let mut turn = battle.turn();
        for (p, action) in actions {
            battle.submit(PLAYERS[p], action);
            prop_assert!(battle.turn() >= turn);
            turn = battle.turn();
            check_invariants(&battle)?;
        }
    }

    #[test]
    fn integrity_only_falls(seed in any::<u64>(), shots in prop::collection::vec((0..10usize, 0..10usize), 1..80)) {
        let mut battle = deployed(seed);
        let mut integrity = [1.0f64; 2];
        for (x, y) in shots {
            let player = battle.current_player();
            battle.submit(player, PlayerAction::attack(Coord::new(x, y)));
            for (i, id) in PLAYERS.into_iter().enumerate() {
                let now = battle.board(id).unwrap().fleet_integrity();
                prop_assert!(now <= integrity[i] + 1e-9);
                integrity[i] = now;
            }
            if battle.phase() == GamePhase::Finished {
                break;
            }
        }
    }
}
