// ============================================================================
// Ride Domain Model
// Shared-ride entity with atomic seat/luggage reservation
// ============================================================================

use crate::domain::booking::BookingId;
use crate::domain::vehicle::{Vehicle, VehicleId};
use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RideId(Uuid);

impl RideId {
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

impl Default for RideId {
    fn default() -> Self {
        Self::new()
    }
}

/// A passenger slot on a ride: the booking it belongs to plus the trip
/// endpoints and luggage it contributes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PassengerEntry {
    pub booking_id: BookingId,
    pub source: Coordinate,
    pub destination: Coordinate,
    pub luggage_count: u32,
}

// ============================================================================
// Ride State Machine
// ============================================================================

pub mod state {
    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    /// Canonical ride status set. Rides advance Matching -> Started ->
    /// Completed; there is no ride-level cancellation, only per-passenger
    /// removal, which leaves the status untouched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(u8)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum RideStatus {
        /// Accepting new passengers
        Matching = 0,
        Started = 1,
        Completed = 2,
    }

    impl RideStatus {
        pub fn from_u8(val: u8) -> Self {
            match val {
                0 => RideStatus::Matching,
                1 => RideStatus::Started,
                _ => RideStatus::Completed,
            }
        }

        /// Only a Matching ride accepts new passengers.
        pub fn accepts_passengers(&self) -> bool {
            matches!(self, RideStatus::Matching)
        }

        pub fn is_terminal(&self) -> bool {
            matches!(self, RideStatus::Completed)
        }
    }
}

// ============================================================================
// Counter Packing
// ============================================================================

// available_seats and total_luggage share one atomic word so the seat
// predicate and both counter mutations commit in a single CAS. Seats live
// in the high half, luggage in the low half.
fn pack(seats: u32, luggage: u32) -> u64 {
    ((seats as u64) << 32) | luggage as u64
}

fn unpack(word: u64) -> (u32, u32) {
    ((word >> 32) as u32, word as u32)
}

// ============================================================================
// Ride Entity
// ============================================================================

/// A shared-vehicle trip aggregating one or more bookings.
///
/// Invariants, after every completed operation:
/// - `available_seats + passenger_count == capacity`
/// - `total_luggage == sum(passenger luggage)`
/// - neither counter ever underflows.
///
/// The route is append-only. A merge appends only the new destination;
/// a cancelled passenger's stops are not removed.
#[derive(Debug)]
pub struct Ride {
    pub id: RideId,
    pub vehicle_id: VehicleId,
    /// Seat capacity snapshot of the bound vehicle
    pub capacity: u32,
    pub created_at: DateTime<Utc>,

    /// Packed (available_seats, total_luggage)
    counters: AtomicU64,
    status: AtomicU8,
    passengers: RwLock<SmallVec<[PassengerEntry; 4]>>,
    route: RwLock<SmallVec<[Coordinate; 8]>>,
}

impl Ride {
    /// Create a ride around its founding booking. The founder takes one
    /// seat immediately and the route starts as [source, destination].
    pub fn new(vehicle: &Vehicle, founder: PassengerEntry) -> Self {
        let mut route = SmallVec::new();
        route.push(founder.source);
        route.push(founder.destination);

        let mut passengers = SmallVec::new();
        let luggage = founder.luggage_count;
        passengers.push(founder);

        Self {
            id: RideId::new(),
            vehicle_id: vehicle.id,
            capacity: vehicle.capacity,
            created_at: Utc::now(),
            counters: AtomicU64::new(pack(vehicle.capacity.saturating_sub(1), luggage)),
            status: AtomicU8::new(state::RideStatus::Matching as u8),
            passengers: RwLock::new(passengers),
            route: RwLock::new(route),
        }
    }

    // ========================================================================
    // Atomic Getters
    // ========================================================================

    pub fn available_seats(&self) -> u32 {
        unpack(self.counters.load(Ordering::Acquire)).0
    }

    pub fn total_luggage(&self) -> u32 {
        unpack(self.counters.load(Ordering::Acquire)).1
    }

    pub fn status(&self) -> state::RideStatus {
        state::RideStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Unconditional status write. Transition-order validation is the
    /// lifecycle layer's decision, not the entity's.
    pub fn set_status(&self, new_status: state::RideStatus) {
        self.status.store(new_status as u8, Ordering::Release);
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn passenger_count(&self) -> usize {
        self.passengers.read().len()
    }

    pub fn passenger_booking_ids(&self) -> Vec<BookingId> {
        self.passengers.read().iter().map(|p| p.booking_id).collect()
    }

    pub fn contains_booking(&self, booking_id: BookingId) -> bool {
        self.passengers
            .read()
            .iter()
            .any(|p| p.booking_id == booking_id)
    }

    /// The ride's current last stop. The route is never empty.
    pub fn last_stop(&self) -> Coordinate {
        let route = self.route.read();
        route[route.len() - 1]
    }

    pub fn route_len(&self) -> usize {
        self.route.read().len()
    }

    pub fn route_snapshot(&self) -> Vec<Coordinate> {
        self.route.read().to_vec()
    }

    // ========================================================================
    // Conditional Updates
    // ========================================================================

    /// Conditional merge: atomically reserve one seat and the passenger's
    /// luggage, then append the passenger entry and their destination stop.
    ///
    /// The predicate (ride accepts passengers, at least one seat free at
    /// apply time) and both counter mutations commit in a single CAS on the
    /// packed word. When the predicate fails — another request consumed the
    /// last seat — nothing is touched and false is reported. Two concurrent
    /// callers racing for the last seat: exactly one CAS wins.
    ///
    /// The luggage ceiling is the candidate scan's concern; the reservation
    /// re-checks only the seat predicate.
    pub fn try_add_passenger(&self, entry: PassengerEntry) -> bool {
        if !self.status().accepts_passengers() {
            return false;
        }

        loop {
            let current = self.counters.load(Ordering::Acquire);
            let (seats, luggage) = unpack(current);

            if seats == 0 {
                return false; // Seat taken by a concurrent request
            }

            let next = pack(seats - 1, luggage + entry.luggage_count);

            if self
                .counters
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // The reserved seat is ours; the list appends cannot race
                // another reservation of the same slot.
                self.route.write().push(entry.destination);
                self.passengers.write().push(entry);
                return true;
            }
            // CAS failed against a concurrent update, re-evaluate
        }
    }

    /// Compensating update for cancellation: remove the passenger entry,
    /// restore one seat and release the passenger's luggage.
    ///
    /// Returns the removed entry, or None when the booking is not (or no
    /// longer) a passenger on this ride. The route keeps the cancelled
    /// passenger's stops.
    pub fn try_remove_passenger(&self, booking_id: BookingId) -> Option<PassengerEntry> {
        let mut passengers = self.passengers.write();

        let idx = passengers
            .iter()
            .position(|p| p.booking_id == booking_id)?;
        let entry = passengers.remove(idx);

        // Removal holds the write lock, so one restore per removed entry.
        let restored = entry.luggage_count;
        let _ = self
            .counters
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let (seats, luggage) = unpack(current);
                Some(pack(seats + 1, luggage.saturating_sub(restored)))
            });

        Some(entry)
    }
}
