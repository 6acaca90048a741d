// ============================================================================
// Matching Engine
// Core business logic for merging bookings into shared rides
// ============================================================================

use crate::domain::ride::PassengerEntry;
use crate::domain::{BookingId, MatchingPolicy, Ride, RideId, UserId, VehicleId};
use crate::errors::{EngineError, EngineResult};
use crate::fare::calculate_fare;
use crate::geo::{haversine_km, Coordinate};
use crate::interfaces::{EventHandler, RideEvent, VehicleDirectory};
use crate::registry::{BookingLedger, RideRegistry};
use chrono::Utc;
use std::sync::Arc;

/// A trip request as submitted by the caller.
#[derive(Debug, Clone)]
pub struct RideRequest {
    pub user_id: UserId,
    pub source: Coordinate,
    pub destination: Coordinate,
    pub luggage_count: u32,
}

/// Successful outcome of a ride request. Either way the booking ends up
/// Matched; the variants tell the caller whether they share a cab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Joined an existing in-progress ride
    Merged {
        ride_id: RideId,
        vehicle_id: VehicleId,
        booking_id: BookingId,
        cost: i64,
    },
    /// Spawned a new ride around this booking
    NewRide {
        ride_id: RideId,
        vehicle_id: VehicleId,
        booking_id: BookingId,
        cost: i64,
    },
}

impl MatchOutcome {
    pub fn ride_id(&self) -> RideId {
        match self {
            MatchOutcome::Merged { ride_id, .. } | MatchOutcome::NewRide { ride_id, .. } => {
                *ride_id
            },
        }
    }

    pub fn booking_id(&self) -> BookingId {
        match self {
            MatchOutcome::Merged { booking_id, .. } | MatchOutcome::NewRide { booking_id, .. } => {
                *booking_id
            },
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, MatchOutcome::Merged { .. })
    }
}

/// Ride-pooling matching engine.
///
/// Serves many concurrent independent requests against shared ride and
/// vehicle records without a global lock; the only serialization points
/// are the per-record atomic updates (seat reservation CAS, vehicle claim
/// CAS, booking status CAS).
pub struct MatchingEngine {
    /// Matching and fare policy
    policy: MatchingPolicy,

    /// In-progress and historical rides
    rides: Arc<RideRegistry>,

    /// Booking records
    bookings: Arc<BookingLedger>,

    /// Vehicle location index (consumed capability)
    vehicles: Arc<dyn VehicleDirectory>,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,
}

impl MatchingEngine {
    /// Create a new matching engine
    pub fn new(
        policy: MatchingPolicy,
        rides: Arc<RideRegistry>,
        bookings: Arc<BookingLedger>,
        vehicles: Arc<dyn VehicleDirectory>,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            policy,
            rides,
            bookings,
            vehicles,
            event_handler,
        }
    }

    pub fn policy(&self) -> &MatchingPolicy {
        &self.policy
    }

    pub fn rides(&self) -> &Arc<RideRegistry> {
        &self.rides
    }

    pub fn bookings(&self) -> &Arc<BookingLedger> {
        &self.bookings
    }

    pub fn vehicles(&self) -> &Arc<dyn VehicleDirectory> {
        &self.vehicles
    }

    pub(crate) fn event_handler(&self) -> &Arc<dyn EventHandler> {
        &self.event_handler
    }

    /// Submit a trip request: merge into an in-progress ride when one is
    /// close enough, otherwise spawn a new ride on the nearest available
    /// vehicle.
    ///
    /// Matching is greedy first-fit in registry insertion order, and the
    /// conditional merge is attempted once: when a concurrent request wins
    /// the last seat between scan and apply, this request does not retry
    /// other candidates and falls through to new-ride creation.
    ///
    /// On `NoVehicleAvailable` the booking stays Pending; the caller decides
    /// whether to cancel it.
    pub fn request_ride(&self, request: RideRequest) -> EngineResult<MatchOutcome> {
        self.validate_request(&request)?;

        let mut events = Vec::new();

        // 1. Fare is fixed at creation; the booking starts Pending.
        let cost = calculate_fare(&self.policy, request.source, request.destination);
        let booking = self.bookings.create(
            request.user_id,
            request.source,
            request.destination,
            request.luggage_count,
            cost,
        );
        events.push(RideEvent::BookingCreated {
            booking_id: booking.id,
            cost,
            timestamp: Utc::now(),
        });
        tracing::debug!(
            booking = %booking.id.as_uuid(),
            cost,
            luggage = request.luggage_count,
            "booking created"
        );

        // 2-4. Greedy candidate scan and one-shot conditional merge.
        if let Some(ride) = self.try_merge(&request, booking.id, &mut events) {
            booking.mark_matched();
            events.push(RideEvent::RideMerged {
                ride_id: ride.id,
                booking_id: booking.id,
                vehicle_id: ride.vehicle_id,
                timestamp: Utc::now(),
            });
            self.event_handler.on_events(events);

            tracing::info!(
                ride = %ride.id.as_uuid(),
                booking = %booking.id.as_uuid(),
                "merged into existing ride"
            );
            return Ok(MatchOutcome::Merged {
                ride_id: ride.id,
                vehicle_id: ride.vehicle_id,
                booking_id: booking.id,
                cost,
            });
        }

        // 5. No merge: claim the nearest available vehicle. A lost claim
        // race counts as no vehicle found.
        let vehicle = self
            .vehicles
            .find_nearest_available(request.source, self.policy.vehicle_search_radius_m, 1)
            .filter(|v| v.try_claim());

        let Some(vehicle) = vehicle else {
            events.push(RideEvent::NoVehicleAvailable {
                booking_id: booking.id,
                timestamp: Utc::now(),
            });
            self.event_handler.on_events(events);

            tracing::warn!(
                booking = %booking.id.as_uuid(),
                radius_m = self.policy.vehicle_search_radius_m,
                "no vehicle available; booking left pending"
            );
            return Err(EngineError::NoVehicleAvailable);
        };

        // 6. Spawn a ride around the booking; the booking flips to Matched
        // only after the ride exists.
        let ride = self.rides.insert(Ride::new(
            &vehicle,
            PassengerEntry {
                booking_id: booking.id,
                source: request.source,
                destination: request.destination,
                luggage_count: request.luggage_count,
            },
        ));
        booking.mark_matched();

        events.push(RideEvent::RideCreated {
            ride_id: ride.id,
            booking_id: booking.id,
            vehicle_id: vehicle.id,
            timestamp: Utc::now(),
        });
        self.event_handler.on_events(events);

        tracing::info!(
            ride = %ride.id.as_uuid(),
            booking = %booking.id.as_uuid(),
            vehicle = %vehicle.id.as_uuid(),
            "new ride created"
        );
        Ok(MatchOutcome::NewRide {
            ride_id: ride.id,
            vehicle_id: vehicle.id,
            booking_id: booking.id,
            cost,
        })
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    /// Scan candidates in insertion order and take the first whose last stop
    /// is strictly within the detour threshold of the new destination.
    /// Returns the ride on a successful conditional merge.
    fn try_merge(
        &self,
        request: &RideRequest,
        booking_id: BookingId,
        events: &mut Vec<RideEvent>,
    ) -> Option<Arc<Ride>> {
        let candidates = self
            .rides
            .find_candidates(request.luggage_count, self.policy.luggage_ceiling);

        for ride in candidates {
            let detour_km = haversine_km(request.destination, ride.last_stop());
            if detour_km >= self.policy.max_detour_km {
                continue;
            }

            // First acceptable candidate wins the scan; the reservation is
            // attempted exactly once.
            let applied = ride.try_add_passenger(PassengerEntry {
                booking_id,
                source: request.source,
                destination: request.destination,
                luggage_count: request.luggage_count,
            });

            if applied {
                return Some(ride);
            }

            // Seat consumed by a concurrent request: downgrade to the
            // new-ride path, no rescan of remaining candidates.
            events.push(RideEvent::SeatConflict {
                ride_id: ride.id,
                booking_id,
                timestamp: Utc::now(),
            });
            tracing::warn!(
                ride = %ride.id.as_uuid(),
                booking = %booking_id.as_uuid(),
                "seat reservation conflict, falling back to new ride"
            );
            return None;
        }

        None
    }

    fn validate_request(&self, request: &RideRequest) -> EngineResult<()> {
        if !request.source.is_valid() {
            return Err(EngineError::Validation(
                "source is not a valid coordinate pair".to_string(),
            ));
        }

        if !request.destination.is_valid() {
            return Err(EngineError::Validation(
                "destination is not a valid coordinate pair".to_string(),
            ));
        }

        if request.luggage_count > self.policy.luggage_ceiling {
            return Err(EngineError::Validation(format!(
                "luggage count {} exceeds ceiling {}",
                request.luggage_count, self.policy.luggage_ceiling
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingStatus, Vehicle};
    use crate::interfaces::NoOpEventHandler;
    use crate::registry::InMemoryVehicleDirectory;

    fn engine_with_vehicle_at(location: Coordinate) -> MatchingEngine {
        let vehicles = Arc::new(InMemoryVehicleDirectory::new());
        vehicles.register(Vehicle::new("Driver", "PLATE-1", 4, 4, location));

        MatchingEngine::new(
            MatchingPolicy::default(),
            Arc::new(RideRegistry::new()),
            Arc::new(BookingLedger::new()),
            vehicles,
            Arc::new(NoOpEventHandler),
        )
    }

    fn request(destination: Coordinate, luggage: u32) -> RideRequest {
        RideRequest {
            user_id: UserId::new(),
            source: Coordinate::new(0.0, 0.0),
            destination,
            luggage_count: luggage,
        }
    }

    #[test]
    fn test_first_request_spawns_ride() {
        let engine = engine_with_vehicle_at(Coordinate::new(0.001, 0.0));
        let outcome = engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 2))
            .unwrap();

        assert!(!outcome.is_merged());
        let ride = engine.rides().get(outcome.ride_id()).unwrap();
        assert_eq!(ride.available_seats(), 3);
        assert_eq!(ride.total_luggage(), 2);
        assert_eq!(ride.route_len(), 2);

        let booking = engine.bookings().get(outcome.booking_id()).unwrap();
        assert_eq!(booking.status(), BookingStatus::Matched);
    }

    #[test]
    fn test_second_request_merges_when_close() {
        let engine = engine_with_vehicle_at(Coordinate::new(0.001, 0.0));
        let first = engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 2))
            .unwrap();

        // Destination ~1.1 km from the ride's last stop, within the 5 km
        // detour threshold
        let second = engine
            .request_ride(request(Coordinate::new(0.06, 0.0), 1))
            .unwrap();

        assert!(second.is_merged());
        assert_eq!(second.ride_id(), first.ride_id());

        let ride = engine.rides().get(first.ride_id()).unwrap();
        assert_eq!(ride.available_seats(), 2);
        assert_eq!(ride.total_luggage(), 3);
        assert_eq!(ride.route_len(), 3);
    }

    #[test]
    fn test_distant_destination_does_not_merge() {
        let engine = engine_with_vehicle_at(Coordinate::new(0.001, 0.0));
        engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 0))
            .unwrap();

        // ~11 km from the last stop: past the detour threshold, and no
        // second vehicle to spawn on
        let result = engine.request_ride(request(Coordinate::new(0.15, 0.0), 0));
        assert_eq!(result.unwrap_err(), EngineError::NoVehicleAvailable);
    }

    #[test]
    fn test_no_vehicle_leaves_booking_pending() {
        let engine = MatchingEngine::new(
            MatchingPolicy::default(),
            Arc::new(RideRegistry::new()),
            Arc::new(BookingLedger::new()),
            Arc::new(InMemoryVehicleDirectory::new()),
            Arc::new(NoOpEventHandler),
        );

        let result = engine.request_ride(request(Coordinate::new(0.05, 0.0), 0));
        assert_eq!(result.unwrap_err(), EngineError::NoVehicleAvailable);

        // The booking exists and was never auto-cancelled
        assert_eq!(engine.bookings().len(), 1);
    }

    #[test]
    fn test_luggage_over_ceiling_rejected() {
        let engine = engine_with_vehicle_at(Coordinate::new(0.001, 0.0));
        let result = engine.request_ride(request(Coordinate::new(0.05, 0.0), 5));
        assert!(matches!(result, Err(EngineError::Validation(_))));
        // Validation happens before booking creation
        assert!(engine.bookings().is_empty());
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let engine = engine_with_vehicle_at(Coordinate::new(0.001, 0.0));
        let result = engine.request_ride(RideRequest {
            user_id: UserId::new(),
            source: Coordinate::new(200.0, 0.0),
            destination: Coordinate::new(0.05, 0.0),
            luggage_count: 0,
        });
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_luggage_ceiling_excludes_candidate() {
        let engine = engine_with_vehicle_at(Coordinate::new(0.001, 0.0));
        let vehicles = Arc::clone(engine.vehicles());
        vehicles.register(Vehicle::new(
            "Second Driver",
            "PLATE-2",
            4,
            4,
            Coordinate::new(0.002, 0.0),
        ));

        let first = engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 3))
            .unwrap();

        // Close enough to merge, but 3 + 2 exceeds the ceiling of 4:
        // excluded from the scan, spawns its own ride
        let second = engine
            .request_ride(request(Coordinate::new(0.055, 0.0), 2))
            .unwrap();

        assert!(!second.is_merged());
        assert_ne!(second.ride_id(), first.ride_id());
    }
}
