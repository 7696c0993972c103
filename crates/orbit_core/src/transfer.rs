//! Orbital transfer state machine.
//!
//! A ship is either stable (no `TransferState`) or in-transfer. Burns and
//! well transfers attach a transfer record; the first phase of the next
//! action application consumes it, remapping the sector onto the
//! destination ring's grid and applying the stored aim adjustment.

use crate::rings::{map_sector_on_transfer, ring_config};
use crate::{BurnIntensity, GameContent, ShipState, SubsystemKind, TransferState, WellId};

/// Start a ring-to-ring transfer. Returns the log text on success and a
/// validation message otherwise; rejected burns leave the ship untouched.
pub(crate) fn initiate_burn(
    ship: &mut ShipState,
    intensity: BurnIntensity,
    sector_adjustment: i32,
    content: &GameContent,
) -> Result<String, String> {
    if ship.transfer.is_some() {
        return Err("already mid-transfer".to_string());
    }
    if !(-1..=1).contains(&sector_adjustment) {
        return Err("sector adjustment must be -1, 0, or +1".to_string());
    }
    let cost = content
        .burn_cost(intensity)
        .unwrap_or_else(|| panic!("burn cost table missing {} intensity", intensity.label()));

    spend_propulsion(ship, cost.energy, cost.reaction_mass)?;

    let direction = ship.facing.ring_direction();
    let destination = clamp_ring(
        i64::from(ship.ring) + direction * i64::from(cost.rings),
        content.ring_count(),
    );
    ship.transfer = Some(TransferState {
        destination_ring: destination,
        sector_adjustment,
        arrive_next_turn: true,
        destination_well: None,
    });
    Ok(format!(
        "{} burn {}: ring {} -> {} ({} energy, {} mass committed)",
        intensity.label(),
        ship.facing.label(),
        ship.ring,
        destination,
        cost.energy,
        cost.reaction_mass,
    ))
}

/// Start a well-to-well transfer through a precomputed transfer window.
pub(crate) fn initiate_well_transfer(
    ship: &mut ShipState,
    destination_well: &WellId,
    sector_adjustment: i32,
    content: &GameContent,
) -> Result<String, String> {
    if ship.transfer.is_some() {
        return Err("already mid-transfer".to_string());
    }
    if !(-1..=1).contains(&sector_adjustment) {
        return Err("sector adjustment must be -1, 0, or +1".to_string());
    }
    if &ship.well == destination_well {
        return Err(format!("already orbiting {destination_well}"));
    }
    let Some(link) = content.well_link(&ship.well, destination_well, ship.ring) else {
        return Err(format!(
            "no transfer window to {destination_well} from ring {}",
            ship.ring
        ));
    };
    let (to_ring, energy, mass) = (link.to_ring, link.energy, link.reaction_mass);

    spend_propulsion(ship, energy, mass)?;

    ship.transfer = Some(TransferState {
        destination_ring: to_ring,
        sector_adjustment,
        arrive_next_turn: true,
        destination_well: Some(destination_well.clone()),
    });
    Ok(format!(
        "transfer window to {destination_well}: ring {} -> {} ({energy} energy, {mass} mass committed)",
        ship.ring, to_ring,
    ))
}

/// Consume a pending transfer, moving the ship onto the destination ring.
/// Returns the log text when a transfer completed, `None` for stable ships.
pub(crate) fn resolve_transfer_arrival(
    ship: &mut ShipState,
    content: &GameContent,
) -> Option<String> {
    if !ship.transfer.as_ref().is_some_and(|t| t.arrive_next_turn) {
        return None;
    }
    let transfer = ship.transfer.take().expect("transfer checked above");

    let mapped = map_sector_on_transfer(content, ship.ring, transfer.destination_ring, ship.sector);
    let count = ring_config(content, transfer.destination_ring).sector_count;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // rem_euclid of sector count
    let sector =
        (i64::from(mapped) + i64::from(transfer.sector_adjustment)).rem_euclid(i64::from(count)) as u32;

    ship.ring = transfer.destination_ring;
    ship.sector = sector;
    if let Some(well) = transfer.destination_well {
        ship.well = well;
        Some(format!(
            "arrived at {} ring {} sector {sector}",
            ship.well, ship.ring
        ))
    } else {
        Some(format!("arrived at ring {} sector {sector}", ship.ring))
    }
}

/// Common propulsion spend for burns and well transfers: powered engines
/// with enough allocated energy plus enough reaction mass. Spent engine
/// energy is parked in the deferred return queue, not destroyed.
fn spend_propulsion(ship: &mut ShipState, energy: u32, mass: u32) -> Result<(), String> {
    let engines = ship
        .subsystem(SubsystemKind::Engines)
        .ok_or_else(|| "engines are not powered".to_string())?;
    if !engines.is_powered {
        return Err("engines are not powered".to_string());
    }
    if engines.allocated_energy < energy {
        return Err(format!(
            "not enough engine energy (need {energy}, have {})",
            engines.allocated_energy
        ));
    }
    if ship.reaction_mass < mass {
        return Err(format!(
            "not enough reaction mass (need {mass}, have {})",
            ship.reaction_mass
        ));
    }
    ship.reaction_mass -= mass;
    let engines = ship
        .subsystem_mut(SubsystemKind::Engines)
        .expect("engines checked above");
    engines.allocated_energy -= energy;
    engines.is_powered = engines.allocated_energy > 0;
    ship.reactor.energy_to_return += energy;
    Ok(())
}

fn clamp_ring(ring: i64, ring_count: u32) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to ring table range
    let clamped = ring.clamp(1, i64::from(ring_count)) as u32;
    clamped
}
