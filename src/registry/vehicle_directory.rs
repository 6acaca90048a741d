// ============================================================================
// In-Memory Vehicle Directory
// Linear-scan implementation of the vehicle lookup interface
// ============================================================================

use crate::domain::{Vehicle, VehicleId};
use crate::geo::{haversine_km, Coordinate};
use crate::interfaces::VehicleDirectory;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory vehicle directory backed by a great-circle linear scan.
///
/// Fine for test fleets and single-node deployments; a production
/// directory would swap in a geospatial index behind the same trait.
pub struct InMemoryVehicleDirectory {
    vehicles: RwLock<HashMap<VehicleId, Arc<Vehicle>>>,
}

impl InMemoryVehicleDirectory {
    pub fn new() -> Self {
        Self {
            vehicles: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.vehicles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.read().is_empty()
    }
}

impl Default for InMemoryVehicleDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleDirectory for InMemoryVehicleDirectory {
    fn register(&self, vehicle: Vehicle) -> Arc<Vehicle> {
        let vehicle = Arc::new(vehicle);
        self.vehicles
            .write()
            .insert(vehicle.id, Arc::clone(&vehicle));
        vehicle
    }

    fn get(&self, id: VehicleId) -> Option<Arc<Vehicle>> {
        self.vehicles.read().get(&id).map(Arc::clone)
    }

    fn find_nearest_available(
        &self,
        point: Coordinate,
        max_radius_m: f64,
        min_capacity: u32,
    ) -> Option<Arc<Vehicle>> {
        let max_radius_km = max_radius_m / 1000.0;

        self.vehicles
            .read()
            .values()
            .filter(|v| v.is_available() && v.capacity >= min_capacity)
            .map(|v| (haversine_km(point, v.location), Arc::clone(v)))
            .filter(|(distance_km, _)| *distance_km <= max_radius_km)
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, vehicle)| vehicle)
    }

    fn name(&self) -> &str {
        "in-memory-linear-scan"
    }
}
