use super::*;
use crate::{apply_action, execute_turn};

#[test]
fn resource_actions_apply_before_tactical_regardless_of_submission_order() {
    let content = base_content();
    let state = duel_state(&content);
    let mut rng = make_rng();

    // The burn is submitted first but depends on the allocation; if the
    // orchestrator ran them in submission order the turn would reject.
    let actions = vec![
        envelope(
            "player_one",
            Some(1),
            Action::Burn {
                intensity: BurnIntensity::Hard,
                sector_adjustment: 0,
                facing: None,
            },
        ),
        envelope(
            "player_one",
            None,
            Action::AllocateEnergy {
                subsystem: SubsystemKind::Engines,
                new_total: 3,
            },
        ),
        coast("player_two", 2),
    ];
    let outcome = execute_turn(&state, &actions, &content, &mut rng);
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert!(ship(&outcome.state, 0).transfer.is_some());
}

#[test]
fn tactical_actions_resolve_in_ascending_sequence() {
    let content = base_content();
    let state = duel_state(&content);
    let mut rng = make_rng();

    let actions = vec![coast("player_one", 5), coast("player_two", 2)];
    let outcome = execute_turn(&state, &actions, &content, &mut rng);
    assert!(outcome.errors.is_empty());

    // player_two's drift entry precedes player_one's.
    let actors: Vec<&str> = outcome.log.iter().map(|e| e.player_id.0.as_str()).collect();
    let first_one = actors.iter().position(|a| *a == "player_one").unwrap();
    let first_two = actors.iter().position(|a| *a == "player_two").unwrap();
    assert!(first_two < first_one);
}

#[test]
fn committed_turn_advances_meta_and_active_player() {
    let content = base_content();
    let state = duel_state(&content);
    let mut rng = make_rng();

    let actions = vec![coast("player_one", 1), coast("player_two", 2)];
    let outcome = execute_turn(&state, &actions, &content, &mut rng);

    assert_eq!(outcome.state.meta.turn, 1);
    assert_eq!(outcome.state.active_player, 1);
    assert_eq!(outcome.state.log.len(), outcome.log.len());
    assert!(outcome.log.iter().all(|e| e.turn == 0), "entries carry the resolving turn");
}

#[test]
fn rejected_turn_is_byte_identical_to_prior_snapshot() {
    let content = base_content();
    let mut state = duel_state(&content);
    power_up(&mut state, 0, SubsystemKind::Engines, 3);
    let mut rng = make_rng();

    let actions = vec![
        envelope(
            "player_one",
            Some(1),
            Action::Burn {
                intensity: BurnIntensity::Hard,
                sector_adjustment: 0,
                facing: None,
            },
        ),
        // Rotation thrusters are dark: this fails and poisons the slice.
        envelope(
            "player_two",
            Some(2),
            Action::Rotate {
                facing: Facing::Prograde,
            },
        ),
    ];
    let outcome = execute_turn(&state, &actions, &content, &mut rng);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.log.is_empty());
    assert_eq!(
        serde_json::to_string(&outcome.state).unwrap(),
        serde_json::to_string(&state).unwrap(),
    );
}

#[test]
fn every_validation_failure_is_collected() {
    let content = base_content();
    let state = duel_state(&content);
    let mut rng = make_rng();

    let actions = vec![
        envelope(
            "player_one",
            None,
            Action::AllocateEnergy {
                subsystem: SubsystemKind::Engines,
                new_total: 20,
            },
        ),
        envelope("player_two", Some(1), Action::VentHeat { amount: 4 }),
    ];
    let outcome = execute_turn(&state, &actions, &content, &mut rng);
    assert_eq!(outcome.errors.len(), 2);
    assert!(outcome.errors[0].message.contains("cannot allocate"));
    assert!(outcome.errors[1].message.contains("cannot vent"));
}

#[test]
#[should_panic(expected = "not in the snapshot")]
fn unknown_player_reference_panics() {
    let content = base_content();
    let state = duel_state(&content);
    let mut rng = make_rng();
    let _ = execute_turn(&state, &[coast("player_ghost", 1)], &content, &mut rng);
}

#[test]
#[should_panic(expected = "not in the snapshot")]
fn unknown_fire_target_panics() {
    let content = base_content();
    let state = duel_state(&content);
    let mut rng = make_rng();
    let actions = vec![envelope(
        "player_one",
        Some(1),
        Action::FireWeapon {
            weapon: SubsystemKind::Laser,
            target: PlayerId("player_ghost".to_string()),
            aimed_subsystem: None,
            facing: None,
        },
    )];
    let _ = execute_turn(&state, &actions, &content, &mut rng);
}

#[test]
fn destroyed_ships_cannot_act() {
    let content = base_content();
    let mut state = duel_state(&content);
    state.players[0].alive = false;
    let mut rng = make_rng();

    let outcome = execute_turn(&state, &[coast("player_one", 1)], &content, &mut rng);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].message.contains("ship is destroyed"));
}

#[test]
fn rotation_needs_powered_thrusters() {
    let content = base_content();
    let mut state = duel_state(&content);
    let mut rng = make_rng();

    let rotate = envelope(
        "player_one",
        Some(1),
        Action::Rotate {
            facing: Facing::Retrograde,
        },
    );
    let rejected = execute_turn(&state, std::slice::from_ref(&rotate), &content, &mut rng);
    assert!(rejected.errors[0].message.contains("rotation thrusters"));

    power_up(&mut state, 0, SubsystemKind::RotationThrusters, 1);
    let outcome = execute_turn(&state, &[rotate], &content, &mut rng);
    assert!(outcome.errors.is_empty());
    assert_eq!(ship(&outcome.state, 0).facing, Facing::Retrograde);
}

#[test]
fn coasting_with_scoop_recovers_ring_velocity_worth_of_mass() {
    let content = base_content();
    let mut state = duel_state(&content);
    state.players[0].ship.reaction_mass = 5;
    power_up(&mut state, 0, SubsystemKind::FuelScoop, 1);
    let mut rng = make_rng();

    let outcome = execute_turn(&state, &[coast("player_one", 1)], &content, &mut rng);
    // Ring 3's angular velocity is 2.
    assert_eq!(ship(&outcome.state, 0).reaction_mass, 7);
}

#[test]
fn scoop_recovery_clamps_at_capacity() {
    let content = base_content();
    let mut state = duel_state(&content);
    state.players[0].ship.reaction_mass = state.players[0].ship.max_reaction_mass - 1;
    power_up(&mut state, 0, SubsystemKind::FuelScoop, 1);
    let mut rng = make_rng();

    let outcome = execute_turn(&state, &[coast("player_one", 1)], &content, &mut rng);
    let ship = ship(&outcome.state, 0);
    assert_eq!(ship.reaction_mass, ship.max_reaction_mass);
}

#[test]
fn overclock_heat_then_vent_over_two_turns() {
    let content = base_content();
    let mut state = duel_state(&content);
    power_up(&mut state, 0, SubsystemKind::Laser, 4); // at overclock threshold
    let mut rng = make_rng();

    let turn_one = execute_turn(&state, &[coast("player_one", 1)], &content, &mut rng);
    assert_eq!(ship(&turn_one.state, 0).heat.current_heat, 2);

    let actions = vec![
        envelope("player_one", None, Action::VentHeat { amount: 2 }),
        coast("player_one", 1),
    ];
    let turn_two = execute_turn(&turn_one.state, &actions, &content, &mut rng);
    assert!(turn_two.errors.is_empty(), "{:?}", turn_two.errors);
    // 2 carried + 2 new from overclock − 2 vented.
    let ship = ship(&turn_two.state, 0);
    assert_eq!(ship.heat.current_heat, 2);
    assert_eq!(ship.heat.heat_to_vent, 0);
    assert!(
        ship.reactor.energy_to_return + ship.heat.heat_to_vent <= ship.reactor.max_return_rate
    );
}

#[test]
fn apply_action_is_the_single_ship_transform() {
    let content = base_content();
    let mut state = duel_state(&content);
    let mut rng = make_rng();

    let log = apply_action(&mut state, &coast("player_one", 1), &content, &mut rng).unwrap();
    assert!(!log.is_empty());
    assert_eq!(state.players[0].ship.sector, 2, "drifted by ring velocity");
    // apply_action leaves turn bookkeeping to execute_turn.
    assert_eq!(state.meta.turn, 0);
}

#[test]
fn full_round_is_deterministic_under_a_fixed_seed() {
    let content = content_with_crit(0.5);

    let run = || {
        let mut state = duel_state(&content);
        power_up(&mut state, 0, SubsystemKind::Railgun, 2);
        power_up(&mut state, 0, SubsystemKind::Engines, 2);
        power_up(&mut state, 1, SubsystemKind::Shields, 2);
        let mut rng = make_rng();
        for _ in 0..4 {
            let actions = vec![
                envelope(
                    "player_one",
                    Some(1),
                    Action::FireWeapon {
                        weapon: SubsystemKind::Railgun,
                        target: PlayerId("player_two".to_string()),
                        aimed_subsystem: Some(SubsystemKind::Shields),
                        facing: None,
                    },
                ),
                coast("player_two", 2),
            ];
            let outcome = execute_turn(&state, &actions, &content, &mut rng);
            assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
            state = outcome.state;
            if !state.players[1].alive {
                break;
            }
        }
        serde_json::to_string(&state).unwrap()
    };

    assert_eq!(run(), run());
}
