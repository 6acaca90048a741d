// ============================================================================
// Engine Factory
// Creates matching engines with proper configuration
// ============================================================================

use crate::domain::MatchingPolicy;
use crate::engine::MatchingEngine;
use crate::errors::EngineResult;
use crate::interfaces::{EventHandler, VehicleDirectory};
use crate::registry::{BookingLedger, InMemoryVehicleDirectory, RideRegistry};
use std::sync::Arc;

/// Creates a matching engine from a policy, with fresh stores and the
/// in-memory vehicle directory.
///
/// # Example
/// ```
/// use ridepool_engine::prelude::*;
/// use ridepool_engine::engine::factory::create_from_policy;
/// use std::sync::Arc;
///
/// let engine =
///     create_from_policy(MatchingPolicy::default(), Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(engine.policy().luggage_ceiling, 4);
/// ```
pub fn create_from_policy(
    policy: MatchingPolicy,
    event_handler: Arc<dyn EventHandler>,
) -> EngineResult<MatchingEngine> {
    policy.validate()?;

    Ok(MatchingEngine::new(
        policy,
        Arc::new(RideRegistry::new()),
        Arc::new(BookingLedger::new()),
        Arc::new(InMemoryVehicleDirectory::new()),
        event_handler,
    ))
}

/// Builder for creating matching engines with fluent API
///
/// # Example
/// ```
/// use ridepool_engine::prelude::*;
/// use ridepool_engine::engine::factory::RidePoolBuilder;
/// use std::sync::Arc;
///
/// let engine = RidePoolBuilder::new()
///     .max_detour_km(2.5)
///     .luggage_ceiling(6)
///     .build(Arc::new(NoOpEventHandler))
///     .unwrap();
/// assert_eq!(engine.policy().max_detour_km, 2.5);
/// ```
pub struct RidePoolBuilder {
    policy: MatchingPolicy,
    vehicles: Option<Arc<dyn VehicleDirectory>>,
}

impl RidePoolBuilder {
    /// Start from the reference policy
    pub fn new() -> Self {
        Self {
            policy: MatchingPolicy::default(),
            vehicles: None,
        }
    }

    // ========================================================================
    // Policy Configuration
    // ========================================================================

    /// Set the merge detour threshold in kilometers
    pub fn max_detour_km(mut self, km: f64) -> Self {
        self.policy.max_detour_km = km;
        self
    }

    /// Set the per-vehicle luggage ceiling
    pub fn luggage_ceiling(mut self, ceiling: u32) -> Self {
        self.policy.luggage_ceiling = ceiling;
        self
    }

    /// Set the vehicle search radius in meters
    pub fn vehicle_search_radius_m(mut self, radius: f64) -> Self {
        self.policy.vehicle_search_radius_m = radius;
        self
    }

    /// Set the fare components
    pub fn fare(mut self, base_fare: i64, per_km_rate: i64) -> Self {
        self.policy = self.policy.with_fare(base_fare, per_km_rate);
        self
    }

    /// Replace the whole policy
    pub fn policy(mut self, policy: MatchingPolicy) -> Self {
        self.policy = policy;
        self
    }

    // ========================================================================
    // Collaborator Configuration
    // ========================================================================

    /// Use a custom vehicle directory (e.g. one backed by a geospatial
    /// index). Defaults to the in-memory linear scan.
    pub fn vehicle_directory(mut self, vehicles: Arc<dyn VehicleDirectory>) -> Self {
        self.vehicles = Some(vehicles);
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the matching engine
    pub fn build(self, event_handler: Arc<dyn EventHandler>) -> EngineResult<MatchingEngine> {
        self.policy.validate()?;

        let vehicles = self
            .vehicles
            .unwrap_or_else(|| Arc::new(InMemoryVehicleDirectory::new()));

        Ok(MatchingEngine::new(
            self.policy,
            Arc::new(RideRegistry::new()),
            Arc::new(BookingLedger::new()),
            vehicles,
            event_handler,
        ))
    }

    /// Get the policy without building (for inspection)
    pub fn get_policy(&self) -> &MatchingPolicy {
        &self.policy
    }
}

impl Default for RidePoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
