// ============================================================================
// Vehicle Directory Interface
// Defines the contract for the consumed geospatial vehicle lookup
// ============================================================================

use crate::domain::{Vehicle, VehicleId};
use crate::geo::Coordinate;
use std::sync::Arc;

/// The vehicle location index consumed by the matching engine.
///
/// The engine treats this as an external capability: it only needs
/// registration, by-id lookup (to toggle availability on lifecycle
/// transitions) and the nearest-available query. Implementations may be
/// backed by anything from an in-memory scan to a geospatial index.
pub trait VehicleDirectory: Send + Sync {
    /// Add a vehicle to the directory
    fn register(&self, vehicle: Vehicle) -> Arc<Vehicle>;

    /// Look up a vehicle by id
    fn get(&self, id: VehicleId) -> Option<Arc<Vehicle>>;

    /// Find the nearest available vehicle within `max_radius_m` meters of
    /// `point` with at least `min_capacity` seats, or None.
    ///
    /// "Available" means the claim flag is set; the caller still has to win
    /// `try_claim` before binding the vehicle to a ride.
    fn find_nearest_available(
        &self,
        point: Coordinate,
        max_radius_m: f64,
        min_capacity: u32,
    ) -> Option<Arc<Vehicle>>;

    /// Directory name for logging/metrics
    fn name(&self) -> &str;
}
