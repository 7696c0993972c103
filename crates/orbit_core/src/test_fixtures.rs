//! Shared test fixtures for orbit_core and downstream crates.
//!
//! `base_content()` is the full shipped-style content table (five rings,
//! the complete subsystem catalog, all three weapons, two wells).
//! `duel_state()` is a two-player skirmish with fresh, unallocated ships.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::smallvec;

use crate::{
    BurnCostDef, BurnIntensity, Constants, Facing, GameContent, GameState, HeatState, MetaState,
    PlayerId, PlayerState, ReactorState, RingConfigDef, ShipState, SubsystemDef, SubsystemKind,
    SubsystemState, WeaponArc, WeaponDef, WellDef, WellId, WellLinkDef,
};

/// Five rings with distinct sector counts so cross-ring mapping is
/// exercised, two wells joined by one transfer window per direction.
pub fn base_content() -> GameContent {
    GameContent {
        content_version: "test".to_string(),
        rings: vec![
            ring(1, 3, 90.0, 6),
            ring(2, 2, 130.0, 8),
            ring(3, 2, 170.0, 12),
            ring(4, 1, 210.0, 16),
            ring(5, 1, 250.0, 24),
        ],
        subsystems: vec![
            subsystem(SubsystemKind::Engines, 1, 6, None, 0),
            subsystem(SubsystemKind::RotationThrusters, 1, 2, None, 0),
            subsystem(SubsystemKind::FuelScoop, 1, 2, None, 0),
            subsystem(SubsystemKind::Laser, 1, 5, Some(4), 2),
            subsystem(SubsystemKind::Railgun, 2, 6, Some(5), 3),
            subsystem(SubsystemKind::Missiles, 2, 4, Some(4), 2),
            subsystem(SubsystemKind::Shields, 1, 6, None, 0),
        ],
        weapons: vec![
            WeaponDef {
                kind: SubsystemKind::Laser,
                arc: WeaponArc::Broadside,
                damage: 3,
                min_energy: 1,
                ring_range: 2,
                recoil: false,
            },
            WeaponDef {
                kind: SubsystemKind::Railgun,
                arc: WeaponArc::Spinal,
                damage: 5,
                min_energy: 2,
                ring_range: 0,
                recoil: true,
            },
            WeaponDef {
                kind: SubsystemKind::Missiles,
                arc: WeaponArc::Turret,
                damage: 4,
                min_energy: 2,
                ring_range: 3,
                recoil: false,
            },
        ],
        burn_costs: vec![
            BurnCostDef {
                intensity: BurnIntensity::Standard,
                rings: 1,
                energy: 1,
                reaction_mass: 1,
            },
            BurnCostDef {
                intensity: BurnIntensity::Hard,
                rings: 2,
                energy: 2,
                reaction_mass: 2,
            },
            BurnCostDef {
                intensity: BurnIntensity::Extreme,
                rings: 3,
                energy: 4,
                reaction_mass: 3,
            },
        ],
        wells: vec![
            WellDef {
                id: WellId("well_meridian".to_string()),
                name: "Meridian".to_string(),
            },
            WellDef {
                id: WellId("well_kestrel".to_string()),
                name: "Kestrel".to_string(),
            },
        ],
        well_links: vec![
            WellLinkDef {
                from_well: WellId("well_meridian".to_string()),
                to_well: WellId("well_kestrel".to_string()),
                from_ring: 5,
                to_ring: 2,
                energy: 3,
                reaction_mass: 2,
            },
            WellLinkDef {
                from_well: WellId("well_kestrel".to_string()),
                to_well: WellId("well_meridian".to_string()),
                from_ring: 2,
                to_ring: 5,
                energy: 3,
                reaction_mass: 2,
            },
        ],
        constants: Constants {
            crit_chance: 0.1,
            recoil_mass_cost: 1,
            start_hull: 10,
            start_reaction_mass: 8,
            reactor_capacity: 12,
            reactor_max_return_rate: 3,
            start_ring: 3,
        },
    }
}

/// Two fresh ships on ring 3 of the primary well: sector 0 facing
/// prograde and sector 6 facing retrograde. Nothing allocated.
pub fn duel_state(content: &GameContent) -> GameState {
    GameState {
        meta: MetaState {
            turn: 0,
            seed: 42,
            schema_version: 1,
            content_version: content.content_version.clone(),
        },
        players: vec![
            player("player_one", "Arless", fresh_ship(content, 0, Facing::Prograde)),
            player("player_two", "Brightwake", fresh_ship(content, 6, Facing::Retrograde)),
        ],
        active_player: 0,
        log: Vec::new(),
    }
}

pub fn player(id: &str, name: &str, ship: ShipState) -> PlayerState {
    PlayerState {
        id: PlayerId(id.to_string()),
        name: name.to_string(),
        alive: true,
        ship,
    }
}

pub fn fresh_ship(content: &GameContent, sector: u32, facing: Facing) -> ShipState {
    let c = &content.constants;
    ShipState {
        well: content.wells[0].id.clone(),
        ring: c.start_ring,
        sector,
        facing,
        reaction_mass: c.start_reaction_mass,
        max_reaction_mass: c.start_reaction_mass,
        hull: c.start_hull,
        max_hull: c.start_hull,
        transfer: None,
        subsystems: smallvec![
            SubsystemState::unpowered(SubsystemKind::Engines),
            SubsystemState::unpowered(SubsystemKind::RotationThrusters),
            SubsystemState::unpowered(SubsystemKind::FuelScoop),
            SubsystemState::unpowered(SubsystemKind::Laser),
            SubsystemState::unpowered(SubsystemKind::Railgun),
            SubsystemState::unpowered(SubsystemKind::Missiles),
            SubsystemState::unpowered(SubsystemKind::Shields),
        ],
        reactor: ReactorState {
            available_energy: c.reactor_capacity,
            total_capacity: c.reactor_capacity,
            max_return_rate: c.reactor_max_return_rate,
            energy_to_return: 0,
        },
        heat: HeatState::default(),
    }
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

fn ring(number: u32, angular_velocity: u32, radius: f32, sector_count: u32) -> RingConfigDef {
    RingConfigDef {
        ring: number,
        angular_velocity,
        radius,
        sector_count,
    }
}

fn subsystem(
    kind: SubsystemKind,
    min_energy: u32,
    max_energy: u32,
    overclock_threshold: Option<u32>,
    overclock_heat: u32,
) -> SubsystemDef {
    SubsystemDef {
        kind,
        min_energy,
        max_energy,
        overclock_threshold,
        overclock_heat,
    }
}
