// ============================================================================
// Vehicle Domain Model
// ============================================================================

use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleId(Uuid);

impl VehicleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VehicleId {
    fn default() -> Self {
        Self::new()
    }
}

/// A pool vehicle with fixed seat and luggage capacity.
///
/// Availability is an atomic claim flag: false means the vehicle is bound
/// to exactly one active ride. `try_claim` is a CAS, so two rides spawning
/// concurrently can never bind the same vehicle.
#[derive(Debug)]
pub struct Vehicle {
    pub id: VehicleId,
    pub driver_name: String,
    pub license_plate: String,
    /// Total seats, fixed for the lifetime of the vehicle
    pub capacity: u32,
    pub luggage_capacity: u32,
    pub location: Coordinate,
    pub registered_at: DateTime<Utc>,

    available: AtomicBool,
}

impl Vehicle {
    pub fn new(
        driver_name: impl Into<String>,
        license_plate: impl Into<String>,
        capacity: u32,
        luggage_capacity: u32,
        location: Coordinate,
    ) -> Self {
        Self {
            id: VehicleId::new(),
            driver_name: driver_name.into(),
            license_plate: license_plate.into(),
            capacity,
            luggage_capacity,
            location,
            registered_at: Utc::now(),
            available: AtomicBool::new(true),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Atomically claim the vehicle for a new ride.
    /// Returns true for exactly one caller; losers see false.
    pub fn try_claim(&self) -> bool {
        self.available
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Free the vehicle on ride completion.
    pub fn release(&self) {
        self.available.store(true, Ordering::Release);
    }
}
