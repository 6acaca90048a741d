// ============================================================================
// Ride Registry
// Concurrent store of in-progress and historical rides
// ============================================================================

use crate::domain::{BookingId, Ride, RideId};
use crossbeam_skiplist::SkipMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Concurrent ride store.
///
/// Rides are kept in a lock-free skip map keyed by an insertion sequence
/// number, so candidate scans observe rides in creation order — the
/// registry iteration order the greedy matcher depends on. A secondary
/// index serves by-id lookups. Rides are never removed; completed rides
/// remain as history.
pub struct RideRegistry {
    /// Insertion-ordered ride sequence for candidate scans
    rides: SkipMap<u64, Arc<Ride>>,

    /// By-id index for lifecycle lookups
    index: RwLock<HashMap<RideId, Arc<Ride>>>,

    /// Monotonic insertion sequence
    sequence: AtomicU64,
}

impl RideRegistry {
    pub fn new() -> Self {
        Self {
            rides: SkipMap::new(),
            index: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Store a new ride and hand back its shared handle.
    pub fn insert(&self, ride: Ride) -> Arc<Ride> {
        let ride = Arc::new(ride);
        let seq = self.sequence.fetch_add(1, Ordering::AcqRel);

        self.rides.insert(seq, Arc::clone(&ride));
        self.index.write().insert(ride.id, Arc::clone(&ride));

        ride
    }

    pub fn get(&self, id: RideId) -> Option<Arc<Ride>> {
        self.index.read().get(&id).map(Arc::clone)
    }

    /// Candidate rides for a merge, in insertion order: accepting
    /// passengers, at least one seat free, and room for the incoming
    /// luggage under the ceiling.
    ///
    /// The filters are a point-in-time read; the conditional merge re-checks
    /// the seat predicate at apply time.
    pub fn find_candidates(&self, luggage_count: u32, luggage_ceiling: u32) -> Vec<Arc<Ride>> {
        self.rides
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .filter(|ride| {
                ride.status().accepts_passengers()
                    && ride.available_seats() >= 1
                    && ride.total_luggage() + luggage_count <= luggage_ceiling
            })
            .collect()
    }

    /// The ride currently listing this booking as a passenger, if any.
    pub fn find_ride_with_booking(&self, booking_id: BookingId) -> Option<Arc<Ride>> {
        self.rides
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .find(|ride| ride.contains_booking(booking_id))
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }
}

impl Default for RideRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ride::PassengerEntry;
    use crate::domain::{RideStatus, Vehicle};
    use crate::geo::Coordinate;

    fn vehicle() -> Vehicle {
        Vehicle::new("D", "PLATE-1", 4, 4, Coordinate::new(0.0, 0.0))
    }

    fn entry(luggage: u32) -> PassengerEntry {
        PassengerEntry {
            booking_id: BookingId::new(),
            source: Coordinate::new(0.0, 0.0),
            destination: Coordinate::new(0.05, 0.0),
            luggage_count: luggage,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let registry = RideRegistry::new();
        let ride = registry.insert(Ride::new(&vehicle(), entry(0)));

        assert_eq!(registry.len(), 1);
        let found = registry.get(ride.id).unwrap();
        assert_eq!(found.id, ride.id);
        assert!(registry.get(RideId::new()).is_none());
    }

    #[test]
    fn test_candidates_in_insertion_order() {
        let registry = RideRegistry::new();
        let first = registry.insert(Ride::new(&vehicle(), entry(0)));
        let second = registry.insert(Ride::new(&vehicle(), entry(0)));

        let candidates = registry.find_candidates(0, 4);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, first.id);
        assert_eq!(candidates[1].id, second.id);
    }

    #[test]
    fn test_candidates_filter_luggage_ceiling() {
        let registry = RideRegistry::new();
        registry.insert(Ride::new(&vehicle(), entry(3)));

        // 3 + 2 > ceiling 4: excluded
        assert!(registry.find_candidates(2, 4).is_empty());
        // 3 + 1 <= 4: included
        assert_eq!(registry.find_candidates(1, 4).len(), 1);
    }

    #[test]
    fn test_candidates_filter_status_and_seats() {
        let registry = RideRegistry::new();
        let started = registry.insert(Ride::new(&vehicle(), entry(0)));
        started.set_status(RideStatus::Started);

        let full_vehicle = Vehicle::new("D", "PLATE-2", 1, 4, Coordinate::new(0.0, 0.0));
        registry.insert(Ride::new(&full_vehicle, entry(0)));

        assert!(registry.find_candidates(0, 4).is_empty());
    }

    #[test]
    fn test_find_ride_with_booking() {
        let registry = RideRegistry::new();
        let founder = entry(1);
        let booking_id = founder.booking_id;
        let ride = registry.insert(Ride::new(&vehicle(), founder));

        let found = registry.find_ride_with_booking(booking_id).unwrap();
        assert_eq!(found.id, ride.id);
        assert!(registry.find_ride_with_booking(BookingId::new()).is_none());
    }
}
