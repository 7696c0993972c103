//! Content loading and initial-state construction shared by the CLI and
//! any session layer. The engine itself never reads files; everything it
//! needs arrives as a validated `GameContent`.

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::path::Path;

use orbit_core::{
    BurnCostDef, BurnIntensity, Constants, Facing, GameContent, GameState, HeatState, MetaState,
    PlayerId, PlayerState, ReactorState, RingConfigDef, ShipState, SubsystemDef, SubsystemKind,
    SubsystemState, WeaponArc, WeaponDef, WellDef, WellId, WellLinkDef,
};

/// The full subsystem catalog every ship carries.
const SUBSYSTEM_CATALOG: [SubsystemKind; 7] = [
    SubsystemKind::Engines,
    SubsystemKind::RotationThrusters,
    SubsystemKind::FuelScoop,
    SubsystemKind::Laser,
    SubsystemKind::Railgun,
    SubsystemKind::Missiles,
    SubsystemKind::Shields,
];

#[derive(Deserialize)]
struct RingsFile {
    content_version: String,
    rings: Vec<RingConfigDef>,
}

#[derive(Deserialize)]
struct SubsystemsFile {
    subsystems: Vec<SubsystemDef>,
}

#[derive(Deserialize)]
struct WeaponsFile {
    weapons: Vec<WeaponDef>,
}

#[derive(Deserialize)]
struct BurnCostsFile {
    burn_costs: Vec<BurnCostDef>,
}

#[derive(Deserialize)]
struct WellsFile {
    wells: Vec<WellDef>,
    links: Vec<WellLinkDef>,
}

/// Validates cross-references in loaded content, panicking on any
/// authoring error: a mis-authored content pack is a build artifact
/// problem, not a runtime condition to recover from.
pub fn validate_content(content: &GameContent) {
    assert!(!content.rings.is_empty(), "content defines no rings");
    for (index, ring) in content.rings.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)] // ring tables are tiny
        let expected = index as u32 + 1;
        assert_eq!(
            ring.ring, expected,
            "rings must be numbered contiguously from 1, found {} at position {index}",
            ring.ring,
        );
        assert!(ring.sector_count > 0, "ring {} has no sectors", ring.ring);
        assert!(
            ring.angular_velocity < ring.sector_count,
            "ring {} drifts a full revolution per turn",
            ring.ring,
        );
    }

    for kind in SUBSYSTEM_CATALOG {
        let def = content
            .subsystem_def(kind)
            .unwrap_or_else(|| panic!("subsystem catalog is missing {}", kind.label()));
        assert!(
            def.min_energy <= def.max_energy,
            "{} has inverted energy bounds",
            kind.label(),
        );
        if let Some(threshold) = def.overclock_threshold {
            assert!(
                threshold <= def.max_energy,
                "{} overclock threshold exceeds its maximum",
                kind.label(),
            );
        }
    }

    for weapon in &content.weapons {
        let def = content
            .subsystem_def(weapon.kind)
            .unwrap_or_else(|| panic!("weapon {} has no subsystem definition", weapon.kind.label()));
        assert!(
            weapon.min_energy <= def.max_energy,
            "weapon {} can never reach its firing minimum",
            weapon.kind.label(),
        );
        assert!(
            weapon.arc == WeaponArc::Spinal || weapon.ring_range >= 1,
            "weapon {} has a zero ring range",
            weapon.kind.label(),
        );
    }

    for intensity in [
        BurnIntensity::Standard,
        BurnIntensity::Hard,
        BurnIntensity::Extreme,
    ] {
        assert!(
            content.burn_cost(intensity).is_some(),
            "burn cost table is missing the {} intensity",
            intensity.label(),
        );
    }

    let well_known = |id: &WellId| content.wells.iter().any(|w| &w.id == id);
    for link in &content.well_links {
        assert!(
            well_known(&link.from_well),
            "well link references unknown well '{}'",
            link.from_well,
        );
        assert!(
            well_known(&link.to_well),
            "well link references unknown well '{}'",
            link.to_well,
        );
        assert_ne!(
            link.from_well, link.to_well,
            "well link from '{}' to itself",
            link.from_well,
        );
        assert!(
            content.ring(link.from_ring).is_some() && content.ring(link.to_ring).is_some(),
            "well link '{}' -> '{}' references an unknown ring",
            link.from_well,
            link.to_well,
        );
    }

    assert!(
        content.ring(content.constants.start_ring).is_some(),
        "start ring {} is not in the ring table",
        content.constants.start_ring,
    );
}

/// Load a content pack from a directory of JSON files and validate it.
pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let rings_file: RingsFile =
        read_json(&dir.join("rings.json")).context("loading rings.json")?;
    let subsystems_file: SubsystemsFile =
        read_json(&dir.join("subsystems.json")).context("loading subsystems.json")?;
    let weapons_file: WeaponsFile =
        read_json(&dir.join("weapons.json")).context("loading weapons.json")?;
    let burn_costs_file: BurnCostsFile =
        read_json(&dir.join("burn_costs.json")).context("loading burn_costs.json")?;
    let wells_file: WellsFile =
        read_json(&dir.join("wells.json")).context("loading wells.json")?;
    let constants: Constants =
        read_json(&dir.join("constants.json")).context("loading constants.json")?;

    let content = GameContent {
        content_version: rings_file.content_version,
        rings: rings_file.rings,
        subsystems: subsystems_file.subsystems,
        weapons: weapons_file.weapons,
        burn_costs: burn_costs_file.burn_costs,
        wells: wells_file.wells,
        well_links: wells_file.links,
        constants,
    };
    validate_content(&content);
    Ok(content)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// The shipped content tables, for callers that don't carry a content
/// directory. Six rings around two wells, the full weapon set.
pub fn default_content() -> GameContent {
    let meridian = WellId("well_meridian".to_string());
    let kestrel = WellId("well_kestrel".to_string());
    let content = GameContent {
        content_version: "0.1.0".to_string(),
        rings: vec![
            RingConfigDef { ring: 1, angular_velocity: 3, radius: 90.0, sector_count: 6 },
            RingConfigDef { ring: 2, angular_velocity: 2, radius: 130.0, sector_count: 8 },
            RingConfigDef { ring: 3, angular_velocity: 2, radius: 170.0, sector_count: 12 },
            RingConfigDef { ring: 4, angular_velocity: 1, radius: 210.0, sector_count: 16 },
            RingConfigDef { ring: 5, angular_velocity: 1, radius: 250.0, sector_count: 24 },
            RingConfigDef { ring: 6, angular_velocity: 1, radius: 290.0, sector_count: 32 },
        ],
        subsystems: vec![
            SubsystemDef { kind: SubsystemKind::Engines, min_energy: 1, max_energy: 6, overclock_threshold: None, overclock_heat: 0 },
            SubsystemDef { kind: SubsystemKind::RotationThrusters, min_energy: 1, max_energy: 2, overclock_threshold: None, overclock_heat: 0 },
            SubsystemDef { kind: SubsystemKind::FuelScoop, min_energy: 1, max_energy: 2, overclock_threshold: None, overclock_heat: 0 },
            SubsystemDef { kind: SubsystemKind::Laser, min_energy: 1, max_energy: 5, overclock_threshold: Some(4), overclock_heat: 2 },
            SubsystemDef { kind: SubsystemKind::Railgun, min_energy: 2, max_energy: 6, overclock_threshold: Some(5), overclock_heat: 3 },
            SubsystemDef { kind: SubsystemKind::Missiles, min_energy: 2, max_energy: 4, overclock_threshold: Some(4), overclock_heat: 2 },
            SubsystemDef { kind: SubsystemKind::Shields, min_energy: 1, max_energy: 6, overclock_threshold: None, overclock_heat: 0 },
        ],
        weapons: vec![
            WeaponDef { kind: SubsystemKind::Laser, arc: WeaponArc::Broadside, damage: 3, min_energy: 1, ring_range: 2, recoil: false },
            WeaponDef { kind: SubsystemKind::Railgun, arc: WeaponArc::Spinal, damage: 5, min_energy: 2, ring_range: 0, recoil: true },
            WeaponDef { kind: SubsystemKind::Missiles, arc: WeaponArc::Turret, damage: 4, min_energy: 2, ring_range: 3, recoil: false },
        ],
        burn_costs: vec![
            BurnCostDef { intensity: BurnIntensity::Standard, rings: 1, energy: 1, reaction_mass: 1 },
            BurnCostDef { intensity: BurnIntensity::Hard, rings: 2, energy: 2, reaction_mass: 2 },
            BurnCostDef { intensity: BurnIntensity::Extreme, rings: 3, energy: 4, reaction_mass: 3 },
        ],
        wells: vec![
            WellDef { id: meridian.clone(), name: "Meridian".to_string() },
            WellDef { id: kestrel.clone(), name: "Kestrel".to_string() },
        ],
        well_links: vec![
            WellLinkDef { from_well: meridian.clone(), to_well: kestrel.clone(), from_ring: 6, to_ring: 2, energy: 3, reaction_mass: 2 },
            WellLinkDef { from_well: kestrel, to_well: meridian, from_ring: 2, to_ring: 6, energy: 3, reaction_mass: 2 },
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
    };
    validate_content(&content);
    content
}

/// Build the opening snapshot: one fresh ship per named player, spread
/// evenly around the starting ring of the first well, alternating facing
/// so neighbours start pointed apart.
pub fn build_initial_state(
    player_names: &[String],
    content: &GameContent,
    seed: u64,
    rng: &mut impl Rng,
) -> GameState {
    assert!(!player_names.is_empty(), "a game needs at least one player");
    let c = &content.constants;
    let start_well = content.wells.first().expect("validated content has wells");
    let sector_count = content
        .ring(c.start_ring)
        .expect("validated start ring")
        .sector_count;

    #[allow(clippy::cast_possible_truncation)] // player counts are tiny
    let player_count = player_names.len() as u32;
    let players = player_names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            #[allow(clippy::cast_possible_truncation)] // player counts are tiny
            let slot = index as u32;
            let facing = if index % 2 == 0 {
                Facing::Prograde
            } else {
                Facing::Retrograde
            };
            PlayerState {
                id: PlayerId(format!("player_{}", orbit_core::seeded_uuid(rng))),
                name: name.clone(),
                alive: true,
                ship: ShipState {
                    well: start_well.id.clone(),
                    ring: c.start_ring,
                    sector: slot * sector_count / player_count,
                    facing,
                    reaction_mass: c.start_reaction_mass,
                    max_reaction_mass: c.start_reaction_mass,
                    hull: c.start_hull,
                    max_hull: c.start_hull,
                    transfer: None,
                    subsystems: SUBSYSTEM_CATALOG
                        .iter()
                        .map(|&kind| SubsystemState::unpowered(kind))
                        .collect(),
                    reactor: ReactorState {
                        available_energy: c.reactor_capacity,
                        total_capacity: c.reactor_capacity,
                        max_return_rate: c.reactor_max_return_rate,
                        energy_to_return: 0,
                    },
                    heat: HeatState::default(),
                },
            }
        })
        .collect();

    GameState {
        meta: MetaState {
            turn: 0,
            seed,
            schema_version: 1,
            content_version: content.content_version.clone(),
        },
        players,
        active_player: 0,
        log: Vec::new(),
    }
}

/// Seed the session RNG and build the opening snapshot in one step. The
/// returned RNG must be the one fed to every subsequent `execute_turn`
/// for the session to replay deterministically.
pub fn new_session(
    player_names: &[String],
    content: &GameContent,
    seed: u64,
) -> (GameState, ChaCha8Rng) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let state = build_initial_state(player_names, content, seed, &mut rng);
    (state, rng)
}
