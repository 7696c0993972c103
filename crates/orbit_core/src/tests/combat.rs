use super::*;
use crate::combat::resolve_weapon_fire;
use crate::energy_ledger_balanced;

/// Both ships on ring 3, target six sectors ahead — inside the railgun's
/// spinal envelope (2 × 3 = 6) and every turret/broadside test's reach.
fn skirmish(crit_chance: f32) -> (GameState, GameContent) {
    let content = content_with_crit(crit_chance);
    let mut state = duel_state(&content);
    power_up(&mut state, 0, SubsystemKind::Railgun, 2);
    power_up(&mut state, 0, SubsystemKind::Engines, 1);
    (state, content)
}

fn fire_railgun(
    state: &mut GameState,
    content: &GameContent,
    aimed: Option<SubsystemKind>,
) -> Result<Vec<String>, String> {
    let mut rng = make_rng();
    resolve_weapon_fire(state, 0, 1, SubsystemKind::Railgun, aimed, content, &mut rng)
}

#[test]
fn shields_absorb_damage_into_heat() {
    let (mut state, content) = skirmish(0.0);
    power_up(&mut state, 1, SubsystemKind::Shields, 3);

    let lines = fire_railgun(&mut state, &content, None).unwrap();

    let target = ship(&state, 1);
    assert_eq!(target.hull, 8, "5 damage - 3 absorbed = 2 to hull");
    assert_eq!(target.heat.current_heat, 3, "absorbed damage becomes heat");
    assert!(lines[0].contains("3 absorbed as heat"), "{lines:?}");
}

#[test]
fn absorbed_heat_never_exceeds_shield_allocation() {
    let (mut state, content) = skirmish(0.0);
    power_up(&mut state, 1, SubsystemKind::Shields, 6);

    fire_railgun(&mut state, &content, None).unwrap();

    let target = ship(&state, 1);
    assert_eq!(target.hull, 10, "full absorption");
    assert_eq!(target.heat.current_heat, 5, "heat capped at damage dealt");
}

#[test]
fn unpowered_shields_do_not_absorb() {
    let (mut state, content) = skirmish(0.0);

    fire_railgun(&mut state, &content, None).unwrap();

    let target = ship(&state, 1);
    assert_eq!(target.hull, 5);
    assert_eq!(target.heat.current_heat, 0);
}

#[test]
fn hull_reaching_zero_destroys_the_ship() {
    let (mut state, content) = skirmish(1.0);
    state.players[1].ship.hull = 4;
    power_up(&mut state, 1, SubsystemKind::Laser, 2);

    let lines = fire_railgun(&mut state, &content, Some(SubsystemKind::Laser)).unwrap();

    assert!(!state.players[1].alive);
    assert_eq!(ship(&state, 1).hull, 0);
    assert!(lines.iter().any(|l| l.contains("destroyed")), "{lines:?}");
    // A destroyed ship takes no critical hit on top.
    assert!(ship(&state, 1).subsystem(SubsystemKind::Laser).unwrap().is_powered);
}

#[test]
fn critical_hit_unpowers_declared_subsystem() {
    let (mut state, content) = skirmish(1.0);
    power_up(&mut state, 1, SubsystemKind::Shields, 3);
    let pool_before = ship(&state, 1).reactor.available_energy;

    let lines = fire_railgun(&mut state, &content, Some(SubsystemKind::Shields)).unwrap();

    let target = ship(&state, 1);
    let shields = target.subsystem(SubsystemKind::Shields).unwrap();
    assert!(!shields.is_powered);
    assert_eq!(shields.allocated_energy, 0);
    assert_eq!(
        target.reactor.available_energy,
        pool_before + 3,
        "scattered energy returns straight to the pool"
    );
    assert_eq!(
        target.heat.current_heat,
        3 + 3,
        "absorbed damage plus scattered energy"
    );
    assert!(energy_ledger_balanced(target));
    assert!(lines.iter().any(|l| l.contains("critical hit")), "{lines:?}");
}

#[test]
fn critical_roll_never_fires_at_zero_chance() {
    let (mut state, content) = skirmish(0.0);
    power_up(&mut state, 1, SubsystemKind::Shields, 3);

    fire_railgun(&mut state, &content, Some(SubsystemKind::Shields)).unwrap();

    assert!(ship(&state, 1).subsystem(SubsystemKind::Shields).unwrap().is_powered);
}

#[test]
fn critical_hit_on_unpowered_subsystem_fizzles() {
    let (mut state, content) = skirmish(1.0);

    let lines = fire_railgun(&mut state, &content, Some(SubsystemKind::Laser)).unwrap();

    assert!(!lines.iter().any(|l| l.contains("critical hit")), "{lines:?}");
}

#[test]
fn recoil_compensated_by_powered_engines_and_mass() {
    let (mut state, content) = skirmish(0.0);

    let lines = fire_railgun(&mut state, &content, None).unwrap();

    let attacker = ship(&state, 0);
    assert_eq!(attacker.reaction_mass, 7, "1 mass spent as compensation");
    assert!(attacker.transfer.is_none());
    assert!(lines.iter().any(|l| l.contains("recoil compensated")), "{lines:?}");
}

#[test]
fn uncontrolled_recoil_pushes_one_ring_opposite_facing() {
    let (mut state, content) = skirmish(0.0);
    // Engines dark and tank dry: no compensation possible.
    crate::deallocate_energy(&mut state.players[0].ship, SubsystemKind::Engines, 1);
    state.players[0].ship.reaction_mass = 0;

    let lines = fire_railgun(&mut state, &content, None).unwrap();

    let attacker = ship(&state, 0);
    let transfer = attacker.transfer.as_ref().expect("recoil burn attached");
    assert_eq!(
        transfer.destination_ring, 2,
        "prograde ship is pushed inward"
    );
    assert!(transfer.arrive_next_turn);
    assert!(
        lines.iter().any(|l| l.contains("uncontrolled recoil")),
        "{lines:?}"
    );
}

#[test]
fn uncontrolled_recoil_mid_transfer_is_log_only() {
    let (mut state, content) = skirmish(0.0);
    crate::deallocate_energy(&mut state.players[0].ship, SubsystemKind::Engines, 1);
    state.players[0].ship.reaction_mass = 0;
    state.players[0].ship.transfer = Some(crate::TransferState {
        destination_ring: 5,
        sector_adjustment: 0,
        arrive_next_turn: true,
        destination_well: None,
    });

    let lines = fire_railgun(&mut state, &content, None).unwrap();

    let transfer = ship(&state, 0).transfer.as_ref().unwrap();
    assert_eq!(transfer.destination_ring, 5, "existing transfer untouched");
    assert!(
        lines.iter().any(|l| l.contains("no additional effect")),
        "{lines:?}"
    );
}

#[test]
fn firing_marks_the_weapon_used() {
    let (mut state, content) = skirmish(0.0);

    fire_railgun(&mut state, &content, None).unwrap();
    assert!(ship(&state, 0).subsystem(SubsystemKind::Railgun).unwrap().used_this_turn);

    let err = fire_railgun(&mut state, &content, None).unwrap_err();
    assert!(err.contains("already fired this turn"), "{err}");
}

#[test]
fn firing_validations_reject_bad_mounts_and_targets() {
    let (mut state, content) = skirmish(0.0);

    let mut rng = make_rng();
    let err = resolve_weapon_fire(
        &mut state,
        0,
        1,
        SubsystemKind::FuelScoop,
        None,
        &content,
        &mut rng,
    )
    .unwrap_err();
    assert!(err.contains("not a weapon"), "{err}");

    let err =
        resolve_weapon_fire(&mut state, 0, 1, SubsystemKind::Laser, None, &content, &mut rng)
            .unwrap_err();
    assert!(err.contains("not powered"), "{err}");

    // Below the railgun's firing minimum of 2.
    state.players[0].ship.subsystem_mut(SubsystemKind::Railgun).unwrap().allocated_energy = 1;
    let err = fire_railgun(&mut state, &content, None).unwrap_err();
    assert!(err.contains("needs at least 2 energy"), "{err}");
    state.players[0].ship.subsystem_mut(SubsystemKind::Railgun).unwrap().allocated_energy = 2;

    state.players[1].alive = false;
    let err = fire_railgun(&mut state, &content, None).unwrap_err();
    assert!(err.contains("already destroyed"), "{err}");
}

#[test]
fn out_of_range_target_is_a_validation_error() {
    let (mut state, content) = skirmish(0.0);
    state.players[1].ship.ring = 5;

    let err = fire_railgun(&mut state, &content, None).unwrap_err();
    assert!(err.contains("out of range"), "{err}");
}

#[test]
fn astern_target_reports_wrong_facing() {
    let (mut state, content) = skirmish(0.0);
    // Ring 2 shrinks the envelope to 4; sector 6 of 8 is two astern.
    state.players[0].ship.ring = 2;
    state.players[0].ship.sector = 0;
    state.players[1].ship.ring = 2;
    state.players[1].ship.sector = 6;

    let err = fire_railgun(&mut state, &content, None).unwrap_err();
    assert!(err.contains("astern"), "{err}");
}
