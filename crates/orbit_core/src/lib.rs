//! `orbit_core` — deterministic turn resolution for the orbital ring game.
//!
//! No IO, no network, no clock. All randomness (the critical-hit roll)
//! comes through the caller-injected Rng, so a fixed seed replays a fixed
//! battle. Snapshots are plain serializable data.

mod combat;
mod engine;
mod id;
mod reactor;
mod rings;
mod transfer;
mod types;
mod weapons;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use engine::{apply_action, execute_turn, TurnOutcome};
pub use id::seeded_uuid;
pub use reactor::{
    accrue_overclock_heat, allocate_energy, deallocate_energy, energy_ledger_balanced,
    process_energy_return, request_heat_vent, SettlementOutcome,
};
pub use rings::{drift_sector, map_sector_on_transfer, sector_distance};
pub use types::*;
pub use weapons::{calculate_firing_solutions, can_compensate_recoil, FiringSolution};

#[cfg(test)]
mod tests;
