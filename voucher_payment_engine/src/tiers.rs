//! The static tier catalog: volume-quantity bands and PPP-tier discount factors.
//!
//! Both schedules are pure data. The volume bands partition the positive integers with no gaps
//! and no overlaps, so every valid quantity resolves to exactly one band.
use crate::db_types::PppTier;

/// A quantity range `[min, max]` (or `[min, ∞)` when `max` is `None`) and the bulk-order discount
/// factor that applies to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeBand {
    pub min: i64,
    pub max: Option<i64>,
    pub discount: f64,
}

/// Upper bound on a single order's quantity, enforced at the validation boundary.
///
/// Keeps `unit_price × quantity` comfortably inside `i64` cents for any realistic rate.
pub const MAX_ORDER_QUANTITY: i64 = 1_000_000;

pub const VOLUME_BANDS: [VolumeBand; 4] = [
    VolumeBand { min: 1, max: Some(100), discount: 1.00 },
    VolumeBand { min: 101, max: Some(400), discount: 0.95 },
    VolumeBand { min: 401, max: Some(800), discount: 0.90 },
    VolumeBand { min: 801, max: None, discount: 0.85 },
];

/// Returns the volume band for the given quantity.
///
/// Total over the positive integers. Quantities below 1 are a caller bug (validation happens at
/// the boundary) and clamp to the first band rather than panicking.
pub fn volume_band(quantity: i64) -> VolumeBand {
    debug_assert!(quantity >= 1, "volume_band called with non-positive quantity {quantity}");
    VOLUME_BANDS
        .iter()
        .find(|band| quantity >= band.min && band.max.map(|max| quantity <= max).unwrap_or(true))
        .copied()
        .unwrap_or(VOLUME_BANDS[0])
}

impl PppTier {
    /// The regional discount factor for this tier.
    pub fn discount(&self) -> f64 {
        match self {
            PppTier::Global => 1.00,
            PppTier::Tier1 => 0.80,
            PppTier::Tier2 => 0.65,
            PppTier::Tier3 => 0.50,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bands_partition_the_positive_integers() {
        // Walk a generous range and check that each quantity lands in exactly one band.
        for q in 1..=2000_i64 {
            let matches = VOLUME_BANDS
                .iter()
                .filter(|b| q >= b.min && b.max.map(|max| q <= max).unwrap_or(true))
                .count();
            assert_eq!(matches, 1, "quantity {q} matched {matches} bands");
        }
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(volume_band(1).discount, 1.00);
        assert_eq!(volume_band(100).discount, 1.00);
        assert_eq!(volume_band(101).discount, 0.95);
        assert_eq!(volume_band(400).discount, 0.95);
        assert_eq!(volume_band(401).discount, 0.90);
        assert_eq!(volume_band(800).discount, 0.90);
        assert_eq!(volume_band(801).discount, 0.85);
        assert_eq!(volume_band(1_000_000).discount, 0.85);
        assert_eq!(volume_band(801).max, None);
    }

    #[test]
    fn ppp_factors() {
        assert_eq!(PppTier::Global.discount(), 1.00);
        assert_eq!(PppTier::Tier1.discount(), 0.80);
        assert_eq!(PppTier::Tier2.discount(), 0.65);
        assert_eq!(PppTier::Tier3.discount(), 0.50);
        // Deeper tiers never cost more.
        let factors = [PppTier::Global, PppTier::Tier1, PppTier::Tier2, PppTier::Tier3].map(|t| t.discount());
        assert!(factors.windows(2).all(|w| w[0] >= w[1]));
    }
}
