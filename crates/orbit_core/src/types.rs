//! Type definitions for `orbit_core`.
//!
//! All public state, content, action, and log types used by the turn
//! resolution engine. Snapshots (`GameState`) are plain data: everything
//! here serializes, nothing carries behavior beyond small accessors.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(PlayerId);
string_id!(WellId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// Orientation of a ship relative to its orbital motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Prograde,
    Retrograde,
}

impl Facing {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Facing::Prograde => Facing::Retrograde,
            Facing::Retrograde => Facing::Prograde,
        }
    }

    /// Ring direction a burn in this facing pushes toward: prograde burns
    /// raise the orbit (+1 ring per burn step), retrograde burns lower it.
    #[must_use]
    pub fn ring_direction(self) -> i64 {
        match self {
            Facing::Prograde => 1,
            Facing::Retrograde => -1,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Facing::Prograde => "prograde",
            Facing::Retrograde => "retrograde",
        }
    }
}

/// Fixed catalog of ship subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsystemKind {
    Engines,
    RotationThrusters,
    FuelScoop,
    Laser,
    Railgun,
    Missiles,
    Shields,
}

impl SubsystemKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SubsystemKind::Engines => "engines",
            SubsystemKind::RotationThrusters => "rotation thrusters",
            SubsystemKind::FuelScoop => "fuel scoop",
            SubsystemKind::Laser => "laser",
            SubsystemKind::Railgun => "railgun",
            SubsystemKind::Missiles => "missiles",
            SubsystemKind::Shields => "shields",
        }
    }
}

/// How hard a burn pushes, keyed into the content burn-cost table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnIntensity {
    Standard,
    Hard,
    Extreme,
}

impl BurnIntensity {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            BurnIntensity::Standard => "standard",
            BurnIntensity::Hard => "hard",
            BurnIntensity::Extreme => "extreme",
        }
    }
}

/// Firing-arc policy of a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponArc {
    /// Tangential, same ring only, in the ship's facing direction.
    Spinal,
    /// Radial, different rings only, covered-sector overlap.
    Broadside,
    /// Omnidirectional, any ring within range, same overlap math.
    Turret,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    /// Seat order is fixed for the whole session; `active_player` indexes it.
    pub players: Vec<PlayerState>,
    pub active_player: usize,
    /// Append-only narration feed. Never read back by the engine.
    pub log: Vec<TurnLogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub turn: u64,
    pub seed: u64,
    pub schema_version: u32,
    pub content_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
    pub ship: ShipState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipState {
    pub well: WellId,
    pub ring: u32,
    /// Only meaningful relative to the current ring's sector count.
    pub sector: u32,
    pub facing: Facing,
    pub reaction_mass: u32,
    pub max_reaction_mass: u32,
    pub hull: u32,
    pub max_hull: u32,
    pub transfer: Option<TransferState>,
    pub subsystems: SmallVec<[SubsystemState; 8]>,
    pub reactor: ReactorState,
    pub heat: HeatState,
}

impl ShipState {
    #[must_use]
    pub fn subsystem(&self, kind: SubsystemKind) -> Option<&SubsystemState> {
        self.subsystems.iter().find(|s| s.kind == kind)
    }

    pub fn subsystem_mut(&mut self, kind: SubsystemKind) -> Option<&mut SubsystemState> {
        self.subsystems.iter_mut().find(|s| s.kind == kind)
    }

    /// Sum of energy currently allocated across all subsystems.
    #[must_use]
    pub fn allocated_total(&self) -> u32 {
        self.subsystems.iter().map(|s| s.allocated_energy).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemState {
    pub kind: SubsystemKind,
    /// Invariant: `is_powered` ⇔ `allocated_energy > 0`.
    pub is_powered: bool,
    pub allocated_energy: u32,
    /// Set when a weapon fires; cleared by the turn's reset phase.
    pub used_this_turn: bool,
}

impl SubsystemState {
    #[must_use]
    pub fn unpowered(kind: SubsystemKind) -> Self {
        SubsystemState {
            kind,
            is_powered: false,
            allocated_energy: 0,
            used_this_turn: false,
        }
    }
}

/// Per-ship energy ledger.
///
/// Closed system: `available_energy + Σ allocated_energy + energy_to_return`
/// equals `total_capacity` in every reachable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactorState {
    pub available_energy: u32,
    pub total_capacity: u32,
    /// Bandwidth shared between energy reclaim and heat venting per turn.
    pub max_return_rate: u32,
    /// Energy freed by deallocations and burns, pending bandwidth-limited
    /// return to the pool at settlement.
    pub energy_to_return: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeatState {
    pub current_heat: u32,
    /// Amount committed to dissipate at this turn's settlement.
    /// Always ≤ `current_heat` when committed.
    pub heat_to_vent: u32,
}

/// One-turn-delayed movement between rings or gravitational wells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferState {
    pub destination_ring: u32,
    /// Aim offset applied after the angular sector mapping, ∈ {-1, 0, +1}.
    pub sector_adjustment: i32,
    pub arrive_next_turn: bool,
    /// Set for well-to-well transfers; the arrival swaps the ship's well.
    pub destination_well: Option<WellId>,
}

// ---------------------------------------------------------------------------
// Action types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub player_id: PlayerId,
    /// Interleaving order for tactical actions within one turn slice.
    /// Resource-management actions leave this unset.
    pub sequence: Option<u32>,
    pub action: Action,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Coast,
    Burn {
        intensity: BurnIntensity,
        sector_adjustment: i32,
        /// Optional facing request resolved before the burn.
        facing: Option<Facing>,
    },
    Rotate {
        facing: Facing,
    },
    AllocateEnergy {
        subsystem: SubsystemKind,
        new_total: u32,
    },
    DeallocateEnergy {
        subsystem: SubsystemKind,
        amount: u32,
    },
    VentHeat {
        amount: u32,
    },
    FireWeapon {
        weapon: SubsystemKind,
        target: PlayerId,
        /// Subsystem declared for the critical-hit roll.
        aimed_subsystem: Option<SubsystemKind>,
        /// Optional facing request resolved before firing.
        facing: Option<Facing>,
    },
    WellTransfer {
        destination_well: WellId,
        sector_adjustment: i32,
    },
}

impl Action {
    /// Resource-management actions apply before tactical ones and carry no
    /// sequence ordering among themselves.
    #[must_use]
    pub fn is_resource_management(&self) -> bool {
        matches!(
            self,
            Action::AllocateEnergy { .. } | Action::DeallocateEnergy { .. } | Action::VentHeat { .. }
        )
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Action::Coast => "coast",
            Action::Burn { .. } => "burn",
            Action::Rotate { .. } => "rotate",
            Action::AllocateEnergy { .. } => "allocate_energy",
            Action::DeallocateEnergy { .. } => "deallocate_energy",
            Action::VentHeat { .. } => "vent_heat",
            Action::FireWeapon { .. } => "fire_weapon",
            Action::WellTransfer { .. } => "well_transfer",
        }
    }

    /// The facing this action asks for, if any.
    #[must_use]
    pub fn requested_facing(&self) -> Option<Facing> {
        match self {
            Action::Rotate { facing } => Some(*facing),
            Action::Burn { facing, .. } | Action::FireWeapon { facing, .. } => *facing,
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Log and error types
// ---------------------------------------------------------------------------

/// Human-readable record of one state change. Purely observational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnLogEntry {
    pub turn: u64,
    pub player_id: PlayerId,
    pub player_name: String,
    pub action: String,
    pub result: String,
}

/// A validation failure collected by `execute_turn`. Any non-empty error
/// list discards the whole turn slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnError {
    pub player_id: PlayerId,
    pub message: String,
}

impl std::fmt::Display for TurnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.player_id, self.message)
    }
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub rings: Vec<RingConfigDef>,
    pub subsystems: Vec<SubsystemDef>,
    pub weapons: Vec<WeaponDef>,
    pub burn_costs: Vec<BurnCostDef>,
    pub wells: Vec<WellDef>,
    pub well_links: Vec<WellLinkDef>,
    pub constants: Constants,
}

impl GameContent {
    /// Ring configuration by ring number, `None` for unknown rings.
    #[must_use]
    pub fn ring(&self, ring: u32) -> Option<&RingConfigDef> {
        self.rings.iter().find(|r| r.ring == ring)
    }

    /// Number of rings per well. Rings are numbered `1..=ring_count()`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // ring tables are tiny
    pub fn ring_count(&self) -> u32 {
        self.rings.len() as u32
    }

    #[must_use]
    pub fn subsystem_def(&self, kind: SubsystemKind) -> Option<&SubsystemDef> {
        self.subsystems.iter().find(|s| s.kind == kind)
    }

    #[must_use]
    pub fn weapon_def(&self, kind: SubsystemKind) -> Option<&WeaponDef> {
        self.weapons.iter().find(|w| w.kind == kind)
    }

    #[must_use]
    pub fn burn_cost(&self, intensity: BurnIntensity) -> Option<&BurnCostDef> {
        self.burn_costs.iter().find(|b| b.intensity == intensity)
    }

    /// Transfer window between two wells departing from a specific ring.
    #[must_use]
    pub fn well_link(&self, from: &WellId, to: &WellId, from_ring: u32) -> Option<&WellLinkDef> {
        self.well_links
            .iter()
            .find(|l| &l.from_well == from && &l.to_well == to && l.from_ring == from_ring)
    }
}

/// Static per-ring constants. Rings differ in sector count, so sector
/// indices are only comparable within one ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingConfigDef {
    pub ring: u32,
    /// Sectors advanced per turn by ordinary orbital motion.
    pub angular_velocity: u32,
    pub radius: f32,
    pub sector_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemDef {
    pub kind: SubsystemKind,
    pub min_energy: u32,
    pub max_energy: u32,
    /// Allocation at or above this is overclocking and accrues heat.
    pub overclock_threshold: Option<u32>,
    /// Heat generated per turn while overclocked and powered.
    pub overclock_heat: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponDef {
    pub kind: SubsystemKind,
    pub arc: WeaponArc,
    pub damage: u32,
    /// Minimum allocated energy required to fire.
    pub min_energy: u32,
    /// Ring reach for broadside/turret arcs. Spinal range is `2 × ring`.
    pub ring_range: u32,
    pub recoil: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnCostDef {
    pub intensity: BurnIntensity,
    pub rings: u32,
    pub energy: u32,
    pub reaction_mass: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellDef {
    pub id: WellId,
    pub name: String,
}

/// Precomputed transfer point between two gravitational wells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellLinkDef {
    pub from_well: WellId,
    pub to_well: WellId,
    pub from_ring: u32,
    pub to_ring: u32,
    pub energy: u32,
    pub reaction_mass: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Probability that a hit cripples the declared subsystem.
    pub crit_chance: f32,
    /// Reaction mass spent to compensate a recoil weapon.
    pub recoil_mass_cost: u32,
    pub start_hull: u32,
    pub start_reaction_mass: u32,
    pub reactor_capacity: u32,
    pub reactor_max_return_rate: u32,
    pub start_ring: u32,
}
