//! Turn orchestrator.
//!
//! `apply_action` runs the fixed phase order for one acting ship:
//! 1. Resolve any pending transfer completion.
//! 2. Apply rotation if the action requests a different facing.
//! 3. Apply burn or well-transfer initiation.
//! 4. Resolve weapon fire.
//! 5. Apply fuel-scoop recovery when coasting.
//! 6. Apply ordinary orbital drift (skipped right after a transfer).
//! 7. Accrue overclock heat.
//! 8. Run settlement (energy return + heat venting), then reset the
//!    per-turn subsystem flags.
//!
//! Resource-management actions (allocate/deallocate/vent) bypass the
//! pipeline and apply as plain ledger operations.
//!
//! `execute_turn` batches a turn slice: resource actions first in
//! submission order, then tactical actions in ascending `sequence`. The
//! batch is transactional — any collected error discards the candidate
//! state and the caller keeps the prior snapshot.

use ahash::AHashSet;
use rand::Rng;

use crate::combat::resolve_weapon_fire;
use crate::reactor;
use crate::rings::{drift_sector, ring_config};
use crate::transfer::{initiate_burn, initiate_well_transfer, resolve_transfer_arrival};
use crate::{
    Action, ActionEnvelope, GameContent, GameState, PlayerId, SubsystemKind, TurnError,
    TurnLogEntry,
};

/// Result of a batched turn slice.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The committed snapshot, or a clone of the prior one when rejected.
    pub state: GameState,
    pub errors: Vec<TurnError>,
    /// Entries appended this slice; empty when the slice was rejected.
    pub log: Vec<TurnLogEntry>,
}

/// Apply a single action to the acting ship.
///
/// Validation failures come back as `Err` and may leave the state
/// partially mutated; use [`execute_turn`] for transactional semantics.
///
/// # Panics
/// Panics if the envelope references a player id that is not in the
/// snapshot — a broken caller contract, not a validation failure.
pub fn apply_action(
    state: &mut GameState,
    envelope: &ActionEnvelope,
    content: &GameContent,
    rng: &mut impl Rng,
) -> Result<Vec<TurnLogEntry>, TurnError> {
    let player_index = require_player_index(state, &envelope.player_id);
    let fail = |message: String| TurnError {
        player_id: envelope.player_id.clone(),
        message,
    };
    if !state.players[player_index].alive {
        return Err(fail("ship is destroyed".to_string()));
    }

    if envelope.action.is_resource_management() {
        return apply_resource_action(state, player_index, envelope, content).map_err(fail);
    }
    apply_tactical_action(state, player_index, envelope, content, rng).map_err(fail)
}

/// Batched, ordered turn resolution. All-or-nothing: if any action fails
/// validation the prior snapshot is returned unchanged alongside the
/// collected errors.
pub fn execute_turn(
    state: &GameState,
    actions: &[ActionEnvelope],
    content: &GameContent,
    rng: &mut impl Rng,
) -> TurnOutcome {
    // Broken references fail loudly before any work happens.
    let mut verified: AHashSet<&PlayerId> = AHashSet::new();
    for envelope in actions {
        if verified.insert(&envelope.player_id) {
            require_player_index(state, &envelope.player_id);
        }
        if let Action::FireWeapon { target, .. } = &envelope.action {
            if verified.insert(target) {
                require_player_index(state, target);
            }
        }
    }

    let mut candidate = state.clone();
    let mut errors = Vec::new();
    let mut log = Vec::new();

    // Resource management first in submission order, then tactical actions
    // strictly by ascending sequence; the stable sort keeps submission
    // order for equal or missing sequence numbers.
    let resource = actions.iter().filter(|e| e.action.is_resource_management());
    let mut tactical: Vec<&ActionEnvelope> = actions
        .iter()
        .filter(|e| !e.action.is_resource_management())
        .collect();
    tactical.sort_by_key(|e| e.sequence.unwrap_or(u32::MAX));

    for envelope in resource.chain(tactical) {
        match apply_action(&mut candidate, envelope, content, rng) {
            Ok(entries) => log.extend(entries),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        candidate.meta.turn += 1;
        advance_active_player(&mut candidate);
        candidate.log.extend(log.iter().cloned());
        TurnOutcome {
            state: candidate,
            errors,
            log,
        }
    } else {
        TurnOutcome {
            state: state.clone(),
            errors,
            log: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resource-management actions
// ---------------------------------------------------------------------------

fn apply_resource_action(
    state: &mut GameState,
    player_index: usize,
    envelope: &ActionEnvelope,
    content: &GameContent,
) -> Result<Vec<TurnLogEntry>, String> {
    let turn = state.meta.turn;
    let player = &mut state.players[player_index];
    let ship = &mut player.ship;

    let result = match envelope.action {
        Action::AllocateEnergy { subsystem, new_total } => {
            let def = content
                .subsystem_def(subsystem)
                .ok_or_else(|| format!("{} has no subsystem definition", subsystem.label()))?;
            let current = ship
                .subsystem(subsystem)
                .map_or(0, |s| s.allocated_energy);
            if new_total > def.max_energy {
                return Err(format!(
                    "cannot allocate {new_total} to {} (max {})",
                    subsystem.label(),
                    def.max_energy
                ));
            }
            if new_total < current {
                return Err(format!(
                    "use deallocate to reduce {} below {current}",
                    subsystem.label()
                ));
            }
            if new_total - current > ship.reactor.available_energy {
                return Err(format!(
                    "not enough available energy (need {}, have {})",
                    new_total - current,
                    ship.reactor.available_energy
                ));
            }
            let applied = reactor::allocate_energy(ship, subsystem, new_total, content);
            debug_assert!(applied, "allocation pre-checks must match ledger rules");
            format!(
                "{} powered at {new_total} ({} left in pool)",
                subsystem.label(),
                ship.reactor.available_energy
            )
        }
        Action::DeallocateEnergy { subsystem, amount } => {
            let current = ship
                .subsystem(subsystem)
                .map_or(0, |s| s.allocated_energy);
            let freed = amount.min(current);
            if freed == 0 {
                return Err(format!("{} has no energy to release", subsystem.label()));
            }
            if ship.reactor.energy_to_return + ship.heat.heat_to_vent + freed
                > ship.reactor.max_return_rate
            {
                return Err(format!(
                    "return bandwidth saturated ({} of {} committed)",
                    ship.reactor.energy_to_return + ship.heat.heat_to_vent,
                    ship.reactor.max_return_rate
                ));
            }
            let applied = reactor::deallocate_energy(ship, subsystem, amount);
            debug_assert!(applied, "deallocation pre-checks must match ledger rules");
            format!("released {freed} from {} (queued for return)", subsystem.label())
        }
        Action::VentHeat { amount } => {
            if amount == 0 || ship.heat.heat_to_vent + amount > ship.heat.current_heat {
                return Err(format!(
                    "cannot vent {amount} heat ({} present, {} already committed)",
                    ship.heat.current_heat, ship.heat.heat_to_vent
                ));
            }
            if ship.reactor.energy_to_return + ship.heat.heat_to_vent + amount
                > ship.reactor.max_return_rate
            {
                return Err(format!(
                    "return bandwidth saturated ({} of {} committed)",
                    ship.reactor.energy_to_return + ship.heat.heat_to_vent,
                    ship.reactor.max_return_rate
                ));
            }
            let applied = reactor::request_heat_vent(ship, amount);
            debug_assert!(applied, "vent pre-checks must match ledger rules");
            format!("committed {amount} heat to vent")
        }
        _ => unreachable!("routed by is_resource_management"),
    };

    Ok(vec![entry(turn, player.id.clone(), player.name.clone(), &envelope.action, result)])
}

// ---------------------------------------------------------------------------
// Tactical phase pipeline
// ---------------------------------------------------------------------------

fn apply_tactical_action(
    state: &mut GameState,
    player_index: usize,
    envelope: &ActionEnvelope,
    content: &GameContent,
    rng: &mut impl Rng,
) -> Result<Vec<TurnLogEntry>, String> {
    let turn = state.meta.turn;
    let player_id = state.players[player_index].id.clone();
    let player_name = state.players[player_index].name.clone();
    let mut log = Vec::new();
    let push = |log: &mut Vec<TurnLogEntry>, text: String| {
        log.push(entry(
            turn,
            player_id.clone(),
            player_name.clone(),
            &envelope.action,
            text,
        ));
    };

    // Phase 1: pending transfer completion.
    let transfer_completed = {
        let ship = &mut state.players[player_index].ship;
        match resolve_transfer_arrival(ship, content) {
            Some(text) => {
                push(&mut log, text);
                true
            }
            None => false,
        }
    };

    // Phase 2: rotation, when the action asks for a different facing.
    if let Some(facing) = envelope.action.requested_facing() {
        let ship = &mut state.players[player_index].ship;
        if facing != ship.facing {
            let thrusters_powered = ship
                .subsystem(SubsystemKind::RotationThrusters)
                .is_some_and(|t| t.is_powered);
            if !thrusters_powered {
                return Err("rotation thrusters are not powered".to_string());
            }
            ship.facing = facing;
            push(&mut log, format!("rotated to {}", facing.label()));
        }
    }

    // Phase 3: propulsion.
    match &envelope.action {
        Action::Burn {
            intensity,
            sector_adjustment,
            ..
        } => {
            let ship = &mut state.players[player_index].ship;
            let text = initiate_burn(ship, *intensity, *sector_adjustment, content)?;
            push(&mut log, text);
        }
        Action::WellTransfer {
            destination_well,
            sector_adjustment,
        } => {
            let ship = &mut state.players[player_index].ship;
            let text =
                initiate_well_transfer(ship, destination_well, *sector_adjustment, content)?;
            push(&mut log, text);
        }
        _ => {}
    }

    // Phase 4: weapon fire.
    if let Action::FireWeapon {
        weapon,
        target,
        aimed_subsystem,
        ..
    } = &envelope.action
    {
        let target_index = require_player_index(state, target);
        let lines = resolve_weapon_fire(
            state,
            player_index,
            target_index,
            *weapon,
            *aimed_subsystem,
            content,
            rng,
        )?;
        for line in lines {
            push(&mut log, line);
        }
    }

    // Phase 5: fuel-scoop recovery while coasting.
    if matches!(envelope.action, Action::Coast) {
        let ship = &mut state.players[player_index].ship;
        let scoop_active = ship
            .subsystem(SubsystemKind::FuelScoop)
            .is_some_and(|s| s.is_powered);
        if scoop_active {
            let velocity = ring_config(content, ship.ring).angular_velocity;
            let recovered = velocity.min(ship.max_reaction_mass - ship.reaction_mass);
            if recovered > 0 {
                ship.reaction_mass += recovered;
                push(&mut log, format!("scooped {recovered} reaction mass"));
            }
        }
    }

    // Phase 6: orbital drift — a ship that just completed a transfer has
    // already moved this turn.
    if !transfer_completed {
        let ship = &mut state.players[player_index].ship;
        let ring = ring_config(content, ship.ring);
        let drifted = drift_sector(ship.sector, ring);
        if drifted != ship.sector {
            ship.sector = drifted;
            push(&mut log, format!("drifted to sector {drifted}"));
        }
    }

    // Phase 7: overclock heat.
    {
        let ship = &mut state.players[player_index].ship;
        let added = reactor::accrue_overclock_heat(ship, content);
        if added > 0 {
            push(&mut log, format!("overclock heat +{added}"));
        }
    }

    // Phase 8: settlement, then per-turn flag reset.
    {
        let ship = &mut state.players[player_index].ship;
        let outcome = reactor::process_energy_return(ship);
        if outcome.energy_returned > 0 || outcome.heat_vented > 0 {
            push(
                &mut log,
                format!(
                    "settled: {} energy returned, {} heat vented",
                    outcome.energy_returned, outcome.heat_vented
                ),
            );
        }
        for subsystem in &mut ship.subsystems {
            subsystem.used_this_turn = false;
        }
    }

    Ok(log)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn entry(
    turn: u64,
    player_id: PlayerId,
    player_name: String,
    action: &Action,
    result: String,
) -> TurnLogEntry {
    TurnLogEntry {
        turn,
        player_id,
        player_name,
        action: action.label().to_string(),
        result,
    }
}

fn require_player_index(state: &GameState, id: &PlayerId) -> usize {
    state
        .players
        .iter()
        .position(|p| &p.id == id)
        .unwrap_or_else(|| panic!("player {id} is not in the snapshot"))
}

fn advance_active_player(state: &mut GameState) {
    let count = state.players.len();
    if count == 0 {
        return;
    }
    for step in 1..=count {
        let index = (state.active_player + step) % count;
        if state.players[index].alive {
            state.active_player = index;
            return;
        }
    }
}
