use naval_combat::abilities::{builtin_definitions, AbilityKind, RegistryError};
use naval_combat::{
    AbilityExecutionResult, AbilityRegistry, AbilityState, AttackOutcome, AttackRequest, Battle, BattleConfig, Coord,
    EffectType, Era, ErrorCode, Orientation, PlayerId, ShipClass, ShipId, ShipPlacement, ShipType,
};

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn roster() -> Vec<ShipType> {
    vec![
        ShipType::new("battleship", "Battleship", ShipClass::Battleship, Era::Dreadnought, 4),
        ShipType::new("carrier", "Carrier", ShipClass::Carrier, Era::WorldWar2, 5),
        ShipType::new("submarine", "Submarine", ShipClass::Submarine, Era::WorldWar2, 3),
        ShipType::new("destroyer", "Destroyer", ShipClass::Destroyer, Era::Modern, 2),
    ]
}

/// Each side deploys a single ship: P1's gets id 0, P2's id 1.
fn one_on_one(mine: &str, theirs: &str) -> Battle {
    let config = BattleConfig {
        fleet: roster(),
        ..BattleConfig::default()
    };
    let mut battle = Battle::new(config, [P1, P2]).unwrap();
    assert!(battle
        .deploy(P1, &[ShipPlacement::new(mine, Coord::new(0, 9), Orientation::Horizontal)])
        .is_valid());
    assert!(battle
        .deploy(P2, &[ShipPlacement::new(theirs, Coord::new(5, 5), Orientation::Horizontal)])
        .is_valid());
    assert!(battle.start().is_valid());
    battle
}

fn pass_round(battle: &mut Battle) {
    battle.end_turn(P1).unwrap();
    battle.end_turn(P2).unwrap();
}

fn code(result: &AbilityExecutionResult) -> Option<ErrorCode> {
    result.errors.first().map(|e| e.code)
}

#[test]
fn test_builtin_registry() {
    let registry = AbilityRegistry::builtin();
    assert_eq!(registry.len(), builtin_definitions().len());
    assert_eq!(registry.len(), 10);
    assert_eq!(registry.kind("air_scout"), Some(AbilityKind::Reveal));
    let guns = registry.get("all_big_guns").unwrap();
    assert_eq!(guns.cooldown_turns, 3);
    assert_eq!(guns.max_uses, Some(2));
}

#[test]
fn test_unknown_implementation_is_a_registry_error() {
    let mut def = AbilityRegistry::builtin().get("smoke_screen").unwrap().clone();
    def.id = "torpedo_spread".to_string();
    assert_eq!(
        AbilityRegistry::from_definitions(vec![def]).unwrap_err(),
        RegistryError::UnknownImplementation("torpedo_spread".to_string())
    );
}

#[test]
fn test_abilities_follow_class_and_era() {
    let battle = one_on_one("battleship", "submarine");
    let ids: Vec<_> = battle
        .abilities()
        .instances_for_ship(ShipId(0))
        .map(|i| i.ability_id.as_str())
        .collect();
    assert_eq!(ids, vec!["all_big_guns", "armor_piercing"]);
    let ids: Vec<_> = battle
        .abilities()
        .instances_for_ship(ShipId(1))
        .map(|i| i.ability_id.as_str())
        .collect();
    assert_eq!(ids, vec!["sonar_ping", "silent_running"]);
    assert_eq!(battle.board(P1).unwrap().ship(ShipId(0)).unwrap().abilities().len(), 2);
}

#[test]
fn test_cooldown_and_uses() {
    let mut battle = one_on_one("battleship", "battleship");
    let guns = battle.abilities().find(ShipId(0), "all_big_guns").unwrap();

    let first = battle.use_ability(P1, ShipId(0), "all_big_guns", None);
    assert!(first.success, "{:?}", first.errors);
    let instance = battle.abilities().instance(guns).unwrap();
    assert_eq!(instance.current_cooldown, 3);
    assert_eq!(instance.remaining_uses, Some(1));

    // the boosted salvo deals round(1 * 1.5) and is spent
    let hit = battle.attack(P1, AttackRequest::new(P1, Coord::new(5, 5))).unwrap();
    assert_eq!(hit.damage_dealt, 2);
    assert!(!battle.effects_on(ShipId(0)).iter().any(|e| e.effect_type == EffectType::DamageBoost));
    battle.end_turn(P2).unwrap();

    let early = battle.use_ability(P1, ShipId(0), "all_big_guns", None);
    assert_eq!(code(&early), Some(ErrorCode::AbilityOnCooldown));
    pass_round(&mut battle);
    let still = battle.use_ability(P1, ShipId(0), "all_big_guns", None);
    assert_eq!(code(&still), Some(ErrorCode::AbilityOnCooldown));
    pass_round(&mut battle);

    let second = battle.use_ability(P1, ShipId(0), "all_big_guns", None);
    assert!(second.success, "{:?}", second.errors);
    assert_eq!(battle.abilities().instance(guns).unwrap().remaining_uses, Some(0));
    assert_eq!(battle.abilities().state(guns), Some(AbilityState::Exhausted));
}

#[test]
fn test_one_activation_per_turn() {
    let mut battle = one_on_one("battleship", "battleship");
    assert!(battle.use_ability(P1, ShipId(0), "all_big_guns", None).success);
    let second = battle.use_ability(P1, ShipId(0), "armor_piercing", None);
    assert_eq!(code(&second), Some(ErrorCode::ActivationLimitReached));
    pass_round(&mut battle);
    assert!(battle.use_ability(P1, ShipId(0), "armor_piercing", None).success);
}

#[test]
fn test_rejected_activation_changes_nothing() {
    let mut battle = one_on_one("battleship", "battleship");
    let before = battle.snapshot();
    let wrong_turn = battle.use_ability(P2, ShipId(1), "all_big_guns", None);
    assert_eq!(code(&wrong_turn), Some(ErrorCode::NotYourTurn));
    let not_mine = battle.use_ability(P1, ShipId(1), "all_big_guns", None);
    assert!(!not_mine.success);
    let unknown = battle.use_ability(P1, ShipId(0), "air_scout", None);
    assert_eq!(code(&unknown), Some(ErrorCode::AbilityNotFound));
    assert_eq!(battle.snapshot(), before);
}

#[test]
fn test_stealth_evades_undetected_attack() {
    let mut battle = one_on_one("battleship", "submarine");
    battle.end_turn(P1).unwrap();
    let hide = battle.use_ability(P2, ShipId(1), "silent_running", None);
    assert!(hide.success, "{:?}", hide.errors);
    battle.end_turn(P2).unwrap();

    let shot = battle.attack(P1, AttackRequest::new(P1, Coord::new(6, 5))).unwrap();
    assert_eq!(shot.outcome, AttackOutcome::Miss);
    let board = battle.board(P2).unwrap();
    assert!(board.misses().contains(&Coord::new(6, 5)));
    assert!(!board.cell(Coord::new(6, 5)).unwrap().is_hit);
    assert_eq!(board.ship(ShipId(1)).unwrap().hit_points(), 3);
}

#[test]
fn test_detection_counters_stealth() {
    let mut battle = one_on_one("destroyer", "submarine");
    battle.end_turn(P1).unwrap();
    assert!(battle.use_ability(P2, ShipId(1), "silent_running", None).success);
    battle.end_turn(P2).unwrap();

    assert!(battle.use_ability(P1, ShipId(0), "sonar_ping", None).success);
    let shot = battle.attack(P1, AttackRequest::new(P1, Coord::new(6, 5))).unwrap();
    assert_eq!(shot.outcome, AttackOutcome::Hit);
}

#[test]
fn test_air_scout_reveals_then_expires() {
    let mut battle = one_on_one("carrier", "submarine");
    let missing = battle.use_ability(P1, ShipId(0), "air_scout", None);
    assert_eq!(code(&missing), Some(ErrorCode::InvalidTarget));

    let scout = battle.use_ability(P1, ShipId(0), "air_scout", Some(Coord::new(6, 5)));
    assert!(scout.success, "{:?}", scout.errors);
    assert_eq!(scout.revealed_cells.len(), 9);
    assert_eq!(scout.detected_ships, vec![ShipId(1)]);
    let view = battle.view_for(P1).unwrap();
    assert_eq!(
        view.revealed_targets,
        vec![Coord::new(5, 5), Coord::new(6, 5), Coord::new(7, 5)]
    );

    pass_round(&mut battle);
    assert_eq!(battle.view_for(P1).unwrap().revealed_targets.len(), 3);
    pass_round(&mut battle);
    assert!(battle.view_for(P1).unwrap().revealed_targets.is_empty());
}

#[test]
fn test_damage_control_triggers_on_hit() {
    let mut battle = one_on_one("battleship", "carrier");
    let hit = battle.attack(P1, AttackRequest::new(P1, Coord::new(5, 5))).unwrap();
    assert_eq!(hit.outcome, AttackOutcome::Hit);
    assert!(hit.triggered.iter().any(|t| t.ability_id == "damage_control" && t.success));
    assert!(battle
        .effects_on(ShipId(1))
        .iter()
        .any(|e| e.effect_type == EffectType::ArmorBoost && e.magnitude == 2.0));
}

#[test]
fn test_passive_is_always_on() {
    let mut fleet = roster();
    fleet[0] = fleet[0].clone().with_abilities(&["reinforced_hull"]);
    let config = BattleConfig {
        fleet,
        ..BattleConfig::default()
    };
    let mut battle = Battle::new(config, [P1, P2]).unwrap();
    assert!(battle
        .deploy(P1, &[ShipPlacement::new("battleship", Coord::new(0, 0), Orientation::Horizontal)])
        .is_valid());
    assert!(battle
        .deploy(P2, &[ShipPlacement::new("destroyer", Coord::new(0, 0), Orientation::Horizontal)])
        .is_valid());
    assert!(battle.start().is_valid());

    assert!(battle
        .effects_on(ShipId(0))
        .iter()
        .any(|e| e.effect_type == EffectType::ArmorBoost && e.magnitude == 1.0));
    let result = battle.use_ability(P1, ShipId(0), "reinforced_hull", None);
    assert_eq!(code(&result), Some(ErrorCode::AbilityPassive));
}

#[test]
fn test_sinking_disables_abilities() {
    let config = BattleConfig {
        fleet: roster(),
        ..BattleConfig::default()
    };
    let mut battle = Battle::new(config, [P1, P2]).unwrap();
    assert!(battle
        .deploy(P1, &[ShipPlacement::new("battleship", Coord::new(0, 9), Orientation::Horizontal)])
        .is_valid());
    let p2 = [
        ShipPlacement::new("destroyer", Coord::new(3, 3), Orientation::Vertical),
        ShipPlacement::new("battleship", Coord::new(0, 0), Orientation::Horizontal),
    ];
    assert!(battle.deploy(P2, &p2).is_valid());
    assert!(battle.start().is_valid());

    battle.attack(P1, AttackRequest::new(P1, Coord::new(3, 3))).unwrap();
    battle.attack(P2, AttackRequest::new(P2, Coord::new(9, 0))).unwrap();
    let sunk = battle.attack(P1, AttackRequest::new(P1, Coord::new(3, 4))).unwrap();
    assert!(sunk.ship_sunk);

    let states: Vec<_> = battle
        .abilities()
        .instances_for_ship(ShipId(1))
        .map(|i| i.state())
        .collect();
    assert!(!states.is_empty());
    assert!(states.iter().all(|s| *s == AbilityState::Disabled));
    let attempt = battle.use_ability(P2, ShipId(1), "smoke_screen", None);
    assert_eq!(code(&attempt), Some(ErrorCode::AbilityDisabled));
}

#[test]
fn test_armor_piercing_through_an_attack() {
    let monitor = ShipType {
        hit_points: Some(40),
        ..ShipType::new("monitor", "Monitor", ShipClass::Cruiser, Era::WorldWar1, 3).with_ratings(5, 1)
    };
    let mut config = BattleConfig {
        fleet: vec![roster().remove(0), monitor],
        abilities: BattleConfig::default()
            .abilities
            .into_iter()
            .filter(|d| d.id == "armor_piercing")
            .collect(),
        ..BattleConfig::default()
    };
    config.combat.normal_damage = 10;
    let mut battle = Battle::new(config, [P1, P2]).unwrap();
    assert!(battle
        .deploy(P1, &[ShipPlacement::new("battleship", Coord::new(0, 9), Orientation::Horizontal)])
        .is_valid());
    assert!(battle
        .deploy(P2, &[ShipPlacement::new("monitor", Coord::new(5, 5), Orientation::Horizontal)])
        .is_valid());
    assert!(battle.start().is_valid());

    let shells = battle.use_ability(P1, ShipId(0), "armor_piercing", None);
    assert!(shells.success, "{:?}", shells.errors);
    let has_penetration =
        |b: &Battle| b.effects_on(ShipId(0)).iter().any(|e| e.effect_type == EffectType::ArmorPenetration);
    assert!(has_penetration(&battle));

    // armor 5 less penetration 3 leaves 2: 10 * 0.8
    let first = battle.attack(P1, AttackRequest::new(P1, Coord::new(5, 5))).unwrap();
    assert_eq!(first.outcome, AttackOutcome::Hit);
    assert_eq!(first.damage_dealt, 8);
    battle.end_turn(P2).unwrap();

    assert!(has_penetration(&battle));
    let second = battle.attack(P1, AttackRequest::new(P1, Coord::new(6, 5))).unwrap();
    assert_eq!(second.damage_dealt, 8);
    assert!(!has_penetration(&battle));
    battle.end_turn(P2).unwrap();

    // full armor again: 10 * 0.5
    let third = battle.attack(P1, AttackRequest::new(P1, Coord::new(7, 5))).unwrap();
    assert_eq!(third.damage_dealt, 5);
    let monitor = battle.board(P2).unwrap().ship(ShipId(1)).unwrap();
    assert_eq!(monitor.hit_points(), 40 - 8 - 8 - 5);
}
