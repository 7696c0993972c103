//! Weapon-arc range resolution.
//!
//! `calculate_firing_solutions` evaluates every live enemy in the
//! attacker's well against one weapon and reports, per target, whether it
//! can be hit plus the supporting distance data. The two warning flags
//! (`wrong_facing`, `requires_engines`) are consumed by UI and planner
//! layers; the combat resolver itself only reads `in_range`.

use crate::rings::{ring_config, sector_distance};
use crate::{Facing, GameContent, PlayerId, PlayerState, ShipState, SubsystemKind, WeaponArc, WeaponDef};

/// Guard against floating-point misses at exact sector boundaries when
/// projecting a sector span onto a ring with a different sector count.
const BOUNDARY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FiringSolution {
    pub target: PlayerId,
    pub in_range: bool,
    /// Ring distance plus shortest sector distance; display data only.
    pub distance: u32,
    pub ring_distance: u32,
    pub sector_distance: u32,
    /// Target would be reachable if the ship rotated first (spinal arcs).
    pub wrong_facing: bool,
    /// Firing would trigger an uncontrolled recoil burn as things stand.
    pub requires_engines: bool,
}

/// Evaluate `weapon` from `attacker` against every live enemy.
///
/// `pending_facing` overrides the ship's current facing so callers can
/// preview a rotate-then-fire sequence before committing it.
#[must_use]
pub fn calculate_firing_solutions(
    weapon: &WeaponDef,
    attacker: &ShipState,
    players: &[PlayerState],
    self_id: &PlayerId,
    pending_facing: Option<Facing>,
    content: &GameContent,
) -> Vec<FiringSolution> {
    let facing = pending_facing.unwrap_or(attacker.facing);
    let requires_engines = weapon.recoil && !can_compensate_recoil(attacker, content);

    players
        .iter()
        .filter(|p| p.alive && &p.id != self_id && p.ship.well == attacker.well)
        .map(|enemy| {
            let target = &enemy.ship;
            let ring_distance = attacker.ring.abs_diff(target.ring);
            let (in_range, wrong_facing) = match weapon.arc {
                WeaponArc::Spinal => spinal_envelope(weapon, attacker, target, facing, content),
                WeaponArc::Broadside => (
                    ring_distance >= 1
                        && ring_distance <= weapon.ring_range
                        && sectors_overlap(attacker, target, content),
                    false,
                ),
                WeaponArc::Turret => (
                    ring_distance <= weapon.ring_range && sectors_overlap(attacker, target, content),
                    false,
                ),
            };
            let sector_dist = display_sector_distance(attacker, target, content);
            FiringSolution {
                target: enemy.id.clone(),
                in_range,
                distance: ring_distance + sector_dist,
                ring_distance,
                sector_distance: sector_dist,
                wrong_facing,
                requires_engines,
            }
        })
        .collect()
}

/// Whether firing a recoil weapon would be absorbed by the engines:
/// powered engines with at least 1 energy and enough reaction mass.
#[must_use]
pub fn can_compensate_recoil(ship: &ShipState, content: &GameContent) -> bool {
    ship.subsystem(SubsystemKind::Engines)
        .is_some_and(|e| e.is_powered && e.allocated_energy >= 1)
        && ship.reaction_mass >= content.constants.recoil_mass_cost
}

/// Spinal arc: same ring, tangential, facing direction, range `2 × ring`.
/// Returns `(in_range, wrong_facing)`.
fn spinal_envelope(
    weapon: &WeaponDef,
    attacker: &ShipState,
    target: &ShipState,
    facing: Facing,
    content: &GameContent,
) -> (bool, bool) {
    debug_assert_eq!(weapon.arc, WeaponArc::Spinal);
    if attacker.ring != target.ring {
        return (false, false);
    }
    let count = ring_config(content, attacker.ring).sector_count;
    let range = 2 * attacker.ring;
    // Signed sector offset in the facing direction, wrapped at the seam.
    let forward = match facing {
        Facing::Prograde => (target.sector + count - attacker.sector) % count,
        Facing::Retrograde => (attacker.sector + count - target.sector) % count,
    };
    if forward <= range {
        return (true, false);
    }
    // Out of range ahead — reachable astern?
    let backward = (count - forward) % count;
    (false, backward <= range)
}

/// Broadside/turret coverage: project the attacker's sector boundaries
/// onto the target ring's grid and test membership in the covered span.
fn sectors_overlap(attacker: &ShipState, target: &ShipState, content: &GameContent) -> bool {
    let s_from = ring_config(content, attacker.ring).sector_count;
    let s_to = ring_config(content, target.ring).sector_count;
    let ratio = f64::from(s_to) / f64::from(s_from);
    // First and last target sectors the attacker's arc covers. The epsilon
    // keeps exact boundary hits from flipping to the neighboring sector.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // floored, non-negative
    let first = ((f64::from(attacker.sector) * ratio + BOUNDARY_EPSILON).floor() as u32) % s_to;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // floored, non-negative
    let last = ((f64::from(attacker.sector + 1) * ratio - BOUNDARY_EPSILON).floor() as u32) % s_to;
    sector_in_wrapped_span(target.sector, first, last)
}

fn sector_in_wrapped_span(sector: u32, first: u32, last: u32) -> bool {
    if first <= last {
        sector >= first && sector <= last
    } else {
        sector >= first || sector <= last
    }
}

fn display_sector_distance(attacker: &ShipState, target: &ShipState, content: &GameContent) -> u32 {
    if attacker.ring == target.ring {
        let count = ring_config(content, attacker.ring).sector_count;
        sector_distance(attacker.sector, target.sector, count)
    } else {
        // Compare on the target's grid after an angular remap.
        let mapped =
            crate::rings::map_sector_on_transfer(content, attacker.ring, target.ring, attacker.sector);
        let count = ring_config(content, target.ring).sector_count;
        sector_distance(mapped, target.sector, count)
    }
}
