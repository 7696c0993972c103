//! Energy/heat resource ledger.
//!
//! All ledger arithmetic is `u32`. Energy never leaves the system: it sits
//! in the reactor pool, in a subsystem allocation, or in the deferred
//! return queue, and `available + Σ allocated + pending == capacity` holds
//! in every reachable state.
//!
//! Mutators here are silent no-ops on constraint violations and report
//! applied/rejected through their return value; the turn orchestrator is
//! the layer that turns rejections into collected errors.

use crate::{GameContent, ShipState, SubsystemKind};

/// What the settlement phase actually moved, for log assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub energy_returned: u32,
    pub heat_vented: u32,
}

/// Raise a subsystem's allocation to `new_total`, drawing from the pool.
///
/// Rejects (returns `false`, no side effect) if the subsystem or its def is
/// missing, `new_total` exceeds the configured maximum, the pool cannot
/// cover the increase, or `new_total` is below the current allocation —
/// decreases go through [`deallocate_energy`].
pub fn allocate_energy(
    ship: &mut ShipState,
    kind: SubsystemKind,
    new_total: u32,
    content: &GameContent,
) -> bool {
    let Some(def) = content.subsystem_def(kind) else {
        return false;
    };
    if new_total > def.max_energy {
        return false;
    }
    let Some(current) = ship.subsystem(kind).map(|s| s.allocated_energy) else {
        return false;
    };
    if new_total < current {
        return false;
    }
    let diff = new_total - current;
    if diff > ship.reactor.available_energy {
        return false;
    }
    ship.reactor.available_energy -= diff;
    let subsystem = ship.subsystem_mut(kind).expect("subsystem checked above");
    subsystem.allocated_energy = new_total;
    subsystem.is_powered = new_total > 0;
    debug_assert!(energy_ledger_balanced(ship));
    true
}

/// Release up to `amount` energy from a subsystem into the deferred return
/// queue. The freed energy does not rejoin the pool until settlement, and
/// the request is rejected up front if it would push the queue past the
/// shared return bandwidth.
pub fn deallocate_energy(ship: &mut ShipState, kind: SubsystemKind, amount: u32) -> bool {
    let Some(current) = ship.subsystem(kind).map(|s| s.allocated_energy) else {
        return false;
    };
    let freed = amount.min(current);
    if freed == 0 {
        return false;
    }
    if ship.reactor.energy_to_return + ship.heat.heat_to_vent + freed > ship.reactor.max_return_rate
    {
        return false;
    }
    let subsystem = ship.subsystem_mut(kind).expect("subsystem checked above");
    subsystem.allocated_energy -= freed;
    subsystem.is_powered = subsystem.allocated_energy > 0;
    ship.reactor.energy_to_return += freed;
    debug_assert!(energy_ledger_balanced(ship));
    true
}

/// Commit `amount` additional heat for dissipation at settlement.
///
/// Rejected if the committed total would exceed the current heat or crowd
/// the shared return bandwidth already claimed by pending energy returns.
pub fn request_heat_vent(ship: &mut ShipState, amount: u32) -> bool {
    if amount == 0 {
        return false;
    }
    let committed = ship.heat.heat_to_vent + amount;
    if committed > ship.heat.current_heat {
        return false;
    }
    if ship.reactor.energy_to_return + committed > ship.reactor.max_return_rate {
        return false;
    }
    ship.heat.heat_to_vent = committed;
    true
}

/// One turn of overclock heat: every powered subsystem allocated at or
/// above its overclock threshold adds its fixed heat increment. Returns
/// the total added.
pub fn accrue_overclock_heat(ship: &mut ShipState, content: &GameContent) -> u32 {
    let mut added = 0;
    for subsystem in &ship.subsystems {
        if !subsystem.is_powered {
            continue;
        }
        let Some(def) = content.subsystem_def(subsystem.kind) else {
            continue;
        };
        if let Some(threshold) = def.overclock_threshold {
            if subsystem.allocated_energy >= threshold {
                added += def.overclock_heat;
            }
        }
    }
    ship.heat.current_heat += added;
    added
}

/// Settlement: apply deferred energy returns and committed heat venting,
/// sharing `max_return_rate` as total bandwidth.
///
/// Venting is honored up to the committed amount (bounded by current
/// heat); energy return takes whatever bandwidth is left and can also be
/// starved by a full reactor. Unreturned energy stays queued for the next
/// settlement.
pub fn process_energy_return(ship: &mut ShipState) -> SettlementOutcome {
    let reactor = &mut ship.reactor;
    let heat = &mut ship.heat;

    let vent_capacity = reactor.max_return_rate.saturating_sub(heat.heat_to_vent);
    let max_fit = reactor.total_capacity.saturating_sub(reactor.available_energy);
    let returned = reactor.energy_to_return.min(vent_capacity).min(max_fit);
    reactor.available_energy += returned;
    reactor.energy_to_return -= returned;

    let vented = heat.heat_to_vent.min(heat.current_heat);
    heat.current_heat -= vented;
    heat.heat_to_vent = 0;

    debug_assert!(energy_ledger_balanced(ship));
    SettlementOutcome {
        energy_returned: returned,
        heat_vented: vented,
    }
}

/// Closure check: pool + allocations + pending returns == capacity.
#[must_use]
pub fn energy_ledger_balanced(ship: &ShipState) -> bool {
    ship.reactor.available_energy + ship.allocated_total() + ship.reactor.energy_to_return
        == ship.reactor.total_capacity
}
