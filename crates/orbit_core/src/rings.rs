//! Ring topology math: sector distance, cross-ring mapping, orbital drift.
//!
//! Rings are concentric lanes with differing sector counts. The cross-ring
//! mapping preserves angular position by proportion and rounds to the
//! nearest destination sector; because of the rounding it is not invertible
//! between rings with different sector counts, and that is intentional.

use crate::{GameContent, RingConfigDef};

/// Shortest-path distance between two sectors on the same ring.
#[must_use]
pub fn sector_distance(a: u32, b: u32, sector_count: u32) -> u32 {
    let raw = a.abs_diff(b);
    raw.min(sector_count - raw)
}

/// Map a sector index from one ring's grid onto another's, preserving
/// angular position: `round((sector / S1) * S2) mod S2`.
///
/// Same-ring mapping is the identity. Cross-ring round trips may not return
/// the starting sector.
///
/// # Panics
/// Panics if either ring is not in the content table; actions referencing
/// unknown rings are a broken caller contract, not a validation failure.
#[must_use]
pub fn map_sector_on_transfer(
    content: &GameContent,
    from_ring: u32,
    to_ring: u32,
    sector: u32,
) -> u32 {
    let s1 = ring_config(content, from_ring).sector_count;
    let s2 = ring_config(content, to_ring).sector_count;
    let angle = f64::from(sector) / f64::from(s1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // rounded, non-negative
    let mapped = (angle * f64::from(s2)).round() as u32;
    mapped % s2
}

/// One turn of ordinary orbital motion: advance by the ring's angular
/// velocity, wrapping at the sector count.
#[must_use]
pub fn drift_sector(sector: u32, ring: &RingConfigDef) -> u32 {
    (sector + ring.angular_velocity) % ring.sector_count
}

pub(crate) fn ring_config(content: &GameContent, ring: u32) -> &RingConfigDef {
    content
        .ring(ring)
        .unwrap_or_else(|| panic!("ring {ring} is not in the content ring table"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_content;

    #[test]
    fn sector_distance_direct_path() {
        assert_eq!(sector_distance(2, 5, 12), 3);
    }

    #[test]
    fn sector_distance_wraps_around() {
        // 1 and 11 on a 12-sector ring are 2 apart through the seam.
        assert_eq!(sector_distance(1, 11, 12), 2);
    }

    #[test]
    fn sector_distance_same_sector_is_zero() {
        assert_eq!(sector_distance(7, 7, 24), 0);
    }

    #[test]
    fn sector_distance_antipodal() {
        assert_eq!(sector_distance(0, 6, 12), 6);
    }

    #[test]
    fn same_ring_mapping_is_identity() {
        let content = base_content();
        for ring in &content.rings {
            for sector in 0..ring.sector_count {
                assert_eq!(
                    map_sector_on_transfer(&content, ring.ring, ring.ring, sector),
                    sector,
                    "identity failed on ring {} sector {sector}",
                    ring.ring
                );
            }
        }
    }

    #[test]
    fn mapping_outward_scales_proportionally() {
        let content = base_content();
        // Ring 3 has 12 sectors, ring 5 has 24: sector 6 (half-turn) → 12.
        assert_eq!(map_sector_on_transfer(&content, 3, 5, 6), 12);
        assert_eq!(map_sector_on_transfer(&content, 3, 5, 0), 0);
    }

    #[test]
    fn mapping_inward_rounds_to_nearest() {
        let content = base_content();
        // Ring 5 (24 sectors) → ring 3 (12): sector 7 is at 7/24 of a turn,
        // 7/24 * 12 = 3.5, rounds to 4.
        assert_eq!(map_sector_on_transfer(&content, 5, 3, 7), 4);
    }

    #[test]
    fn mapping_wraps_at_full_turn() {
        let content = base_content();
        // Ring 2 (8 sectors) → ring 1 (6): sector 7 is at 7/8 of a turn,
        // 7/8 * 6 = 5.25 → 5; sector at 11/12 of ring 3 maps near the seam.
        assert_eq!(map_sector_on_transfer(&content, 2, 1, 7), 5);
        // 11/12 * 6 = 5.5 rounds to 6, which wraps to sector 0.
        assert_eq!(map_sector_on_transfer(&content, 3, 1, 11), 0);
    }

    #[test]
    fn cross_ring_round_trip_may_lose_position() {
        let content = base_content();
        // 24 → 6 → 24 collapses fine detail; sector 5 lands on 4 after the
        // round trip. The loss is part of the model.
        let down = map_sector_on_transfer(&content, 5, 1, 5);
        let back = map_sector_on_transfer(&content, 1, 5, down);
        assert_eq!(down, 1);
        assert_eq!(back, 4);
    }

    #[test]
    fn drift_advances_by_angular_velocity() {
        let content = base_content();
        let ring1 = content.ring(1).unwrap();
        assert_eq!(ring1.angular_velocity, 3);
        assert_eq!(drift_sector(0, ring1), 3);
    }

    #[test]
    fn drift_wraps_at_sector_count() {
        let content = base_content();
        let ring1 = content.ring(1).unwrap();
        // 6-sector ring: sector 5 + velocity 3 wraps to 2.
        assert_eq!(drift_sector(5, ring1), 2);
    }

    #[test]
    #[should_panic(expected = "not in the content ring table")]
    fn unknown_ring_panics() {
        let content = base_content();
        let _ = map_sector_on_transfer(&content, 1, 99, 0);
    }
}
