// ============================================================================
// Matching Policy Configuration
// Named policy values for matching, search and fare behavior
// ============================================================================

use crate::errors::{EngineError, EngineResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable policy for the matching engine.
///
/// All thresholds that drive the merge-vs-spawn decision live here so the
/// matching logic itself contains no magic literals. `Default` yields the
/// reference policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchingPolicy {
    /// Maximum acceptable distance (km) between a ride's current last stop
    /// and a new booking's destination for merge eligibility. The check is
    /// strict: a candidate at exactly this distance is rejected.
    pub max_detour_km: f64,

    /// Per-vehicle luggage ceiling. A candidate ride is excluded when its
    /// total luggage plus the incoming count would exceed this.
    pub luggage_ceiling: u32,

    /// Radius (meters) of the nearest-available-vehicle search when no
    /// ride can be merged into.
    pub vehicle_search_radius_m: f64,

    /// Flat fare component, in integer money units.
    pub base_fare: i64,

    /// Fare per kilometer of great-circle distance, in integer money units.
    pub per_km_rate: i64,
}

impl Default for MatchingPolicy {
    /// The reference policy: 5 km detour, luggage ceiling 4, 50 km vehicle
    /// search radius, fare = 50 + 12/km.
    fn default() -> Self {
        Self {
            max_detour_km: 5.0,
            luggage_ceiling: 4,
            vehicle_search_radius_m: 50_000.0,
            base_fare: 50,
            per_km_rate: 12,
        }
    }
}

impl MatchingPolicy {
    /// Builder method: Set the merge detour threshold in kilometers
    pub fn with_max_detour_km(mut self, km: f64) -> Self {
        self.max_detour_km = km;
        self
    }

    /// Builder method: Set the per-vehicle luggage ceiling
    pub fn with_luggage_ceiling(mut self, ceiling: u32) -> Self {
        self.luggage_ceiling = ceiling;
        self
    }

    /// Builder method: Set the vehicle search radius in meters
    pub fn with_vehicle_search_radius_m(mut self, radius: f64) -> Self {
        self.vehicle_search_radius_m = radius;
        self
    }

    /// Builder method: Set the fare components
    pub fn with_fare(mut self, base_fare: i64, per_km_rate: i64) -> Self {
        self.base_fare = base_fare;
        self.per_km_rate = per_km_rate;
        self
    }

    /// Validate the policy
    pub fn validate(&self) -> EngineResult<()> {
        if !self.max_detour_km.is_finite() || self.max_detour_km <= 0.0 {
            return Err(EngineError::Validation(
                "detour threshold must be positive".to_string(),
            ));
        }

        if !self.vehicle_search_radius_m.is_finite() || self.vehicle_search_radius_m <= 0.0 {
            return Err(EngineError::Validation(
                "vehicle search radius must be positive".to_string(),
            ));
        }

        if self.base_fare < 0 || self.per_km_rate < 0 {
            return Err(EngineError::Validation(
                "fare components cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_policy() {
        let policy = MatchingPolicy::default();
        assert_eq!(policy.max_detour_km, 5.0);
        assert_eq!(policy.luggage_ceiling, 4);
        assert_eq!(policy.vehicle_search_radius_m, 50_000.0);
        assert_eq!(policy.base_fare, 50);
        assert_eq!(policy.per_km_rate, 12);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let policy = MatchingPolicy::default()
            .with_max_detour_km(2.5)
            .with_luggage_ceiling(6)
            .with_fare(100, 20);

        assert_eq!(policy.max_detour_km, 2.5);
        assert_eq!(policy.luggage_ceiling, 6);
        assert_eq!(policy.base_fare, 100);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(MatchingPolicy::default()
            .with_max_detour_km(0.0)
            .validate()
            .is_err());
        assert!(MatchingPolicy::default()
            .with_vehicle_search_radius_m(-1.0)
            .validate()
            .is_err());
        assert!(MatchingPolicy::default().with_fare(-1, 12).validate().is_err());
    }
}
