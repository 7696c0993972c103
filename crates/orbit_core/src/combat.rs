//! Combat resolution: firing validation, shield absorption, critical
//! hits, recoil handling.
//!
//! Shields convert incoming damage into thermal load rather than
//! nullifying it: absorbed points land 1:1 on the target's heat ledger.
//! The critical-hit roll is the engine's only nondeterminism and comes
//! from the injected RNG.

use rand::Rng;

use crate::weapons::{calculate_firing_solutions, can_compensate_recoil};
use crate::{GameContent, GameState, SubsystemKind, TransferState};

/// Resolve one weapon shot from `attacker_index` against `target_index`.
///
/// On success returns the result lines for log assembly; on a validation
/// failure returns the message and leaves both ships untouched.
pub(crate) fn resolve_weapon_fire(
    state: &mut GameState,
    attacker_index: usize,
    target_index: usize,
    weapon_kind: SubsystemKind,
    aimed_subsystem: Option<SubsystemKind>,
    content: &GameContent,
    rng: &mut impl Rng,
) -> Result<Vec<String>, String> {
    let weapon = content
        .weapon_def(weapon_kind)
        .ok_or_else(|| format!("{} is not a weapon", weapon_kind.label()))?
        .clone();

    {
        let attacker = &state.players[attacker_index];
        let mount = attacker
            .ship
            .subsystem(weapon_kind)
            .ok_or_else(|| format!("{} is not fitted", weapon_kind.label()))?;
        if !mount.is_powered {
            return Err(format!("{} is not powered", weapon_kind.label()));
        }
        if mount.used_this_turn {
            return Err(format!("{} already fired this turn", weapon_kind.label()));
        }
        if mount.allocated_energy < weapon.min_energy {
            return Err(format!(
                "{} needs at least {} energy (has {})",
                weapon_kind.label(),
                weapon.min_energy,
                mount.allocated_energy
            ));
        }

        let target = &state.players[target_index];
        if !target.alive {
            return Err(format!("{} is already destroyed", target.name));
        }
        let solution = calculate_firing_solutions(
            &weapon,
            &attacker.ship,
            &state.players,
            &attacker.id,
            None,
            content,
        )
        .into_iter()
        .find(|s| s.target == target.id)
        .ok_or_else(|| format!("{} is out of reach", target.name))?;
        if !solution.in_range {
            if solution.wrong_facing {
                return Err(format!("{} is astern; rotate first", target.name));
            }
            return Err(format!("{} is out of range", target.name));
        }
    }

    let mut lines = Vec::new();
    let target_name = state.players[target_index].name.clone();

    state.players[attacker_index]
        .ship
        .subsystem_mut(weapon_kind)
        .expect("weapon mount checked above")
        .used_this_turn = true;

    // Shield absorption, then hull damage.
    let target_ship = &mut state.players[target_index].ship;
    let shield_strength = target_ship
        .subsystem(SubsystemKind::Shields)
        .filter(|s| s.is_powered)
        .map_or(0, |s| s.allocated_energy);
    let absorbed = weapon.damage.min(shield_strength);
    let to_hull = weapon.damage - absorbed;
    target_ship.heat.current_heat += absorbed;
    target_ship.hull = target_ship.hull.saturating_sub(to_hull);
    let hull_after = target_ship.hull;

    if absorbed > 0 {
        lines.push(format!(
            "{} hits {target_name}: {to_hull} to hull, {absorbed} absorbed as heat",
            weapon_kind.label()
        ));
    } else {
        lines.push(format!(
            "{} hits {target_name}: {to_hull} to hull",
            weapon_kind.label()
        ));
    }

    if hull_after == 0 {
        state.players[target_index].alive = false;
        lines.push(format!("{target_name} destroyed"));
    } else if let Some(aimed) = aimed_subsystem {
        if rng.gen::<f32>() < content.constants.crit_chance {
            lines.extend(apply_critical_hit(state, target_index, aimed, &target_name));
        }
    }

    if weapon.recoil {
        lines.push(handle_recoil(state, attacker_index, content));
    }

    Ok(lines)
}

/// A successful critical roll against a powered subsystem knocks it
/// offline: its energy returns straight to the pool (capped at capacity)
/// and the same amount lands as heat.
fn apply_critical_hit(
    state: &mut GameState,
    target_index: usize,
    aimed: SubsystemKind,
    target_name: &str,
) -> Option<String> {
    let ship = &mut state.players[target_index].ship;
    let subsystem = ship.subsystem_mut(aimed)?;
    if !subsystem.is_powered || subsystem.allocated_energy == 0 {
        return None;
    }
    let scattered = subsystem.allocated_energy;
    subsystem.allocated_energy = 0;
    subsystem.is_powered = false;
    ship.reactor.available_energy =
        (ship.reactor.available_energy + scattered).min(ship.reactor.total_capacity);
    ship.heat.current_heat += scattered;
    Some(format!(
        "critical hit on {target_name}: {} knocked offline, {scattered} energy scattered as heat",
        aimed.label()
    ))
}

/// Recoil weapons need powered engines and reaction mass to compensate;
/// otherwise the shot shoves the ship one ring opposite its facing.
fn handle_recoil(state: &mut GameState, attacker_index: usize, content: &GameContent) -> String {
    let ship = &mut state.players[attacker_index].ship;
    if can_compensate_recoil(ship, content) {
        ship.reaction_mass -= content.constants.recoil_mass_cost;
        return format!(
            "recoil compensated ({} mass)",
            content.constants.recoil_mass_cost
        );
    }
    if ship.transfer.is_some() {
        return "uncontrolled recoil during transfer: no additional effect".to_string();
    }
    let pushed = i64::from(ship.ring) - ship.facing.ring_direction();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to ring table range
    let destination = pushed.clamp(1, i64::from(content.ring_count())) as u32;
    ship.transfer = Some(TransferState {
        destination_ring: destination,
        sector_adjustment: 0,
        arrive_next_turn: true,
        destination_well: None,
    });
    format!("uncontrolled recoil burn: pushed toward ring {destination}")
}
