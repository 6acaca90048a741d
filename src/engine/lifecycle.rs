// ============================================================================
// Lifecycle Manager
// Ride status transitions and booking cancellation with compensation
// ============================================================================

use crate::domain::{BookingId, RideId, RideStatus};
use crate::engine::MatchingEngine;
use crate::errors::{EngineError, EngineResult};
use crate::interfaces::RideEvent;
use chrono::Utc;

/// Outcome of a booking cancellation. The ride-side compensation is a
/// distinct result, not an error: an unmatched booking has no ride to
/// compensate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The passenger entry was removed and seat/luggage restored
    RemovedFromRide { ride_id: RideId },
    /// No ride listed this booking (not yet assigned)
    NotYetAssigned,
}

impl MatchingEngine {
    /// Drive a ride to Started or Completed.
    ///
    /// Any other target status is rejected; cancellation is a per-booking
    /// operation, not a ride status. The write is unconditional: transition
    /// order (Matching -> Started -> Completed) is not validated.
    ///
    /// Completion performs the compensating side effects: the bound vehicle
    /// becomes available again and every passenger booking is marked
    /// Completed regardless of prior status. The sweep is best-effort, not
    /// transactional with the ride-status write.
    pub fn update_ride_status(&self, ride_id: RideId, new_status: RideStatus) -> EngineResult<()> {
        if !matches!(new_status, RideStatus::Started | RideStatus::Completed) {
            return Err(EngineError::Validation(
                "ride status update must be Started or Completed".to_string(),
            ));
        }

        let ride = self
            .rides()
            .get(ride_id)
            .ok_or(EngineError::RideNotFound(ride_id))?;

        ride.set_status(new_status);

        let mut events = vec![RideEvent::RideStatusChanged {
            ride_id,
            status: new_status,
            timestamp: Utc::now(),
        }];
        tracing::info!(
            ride = %ride_id.as_uuid(),
            status = ?new_status,
            "ride status updated"
        );

        if new_status == RideStatus::Completed {
            if let Some(vehicle) = self.vehicles().get(ride.vehicle_id) {
                vehicle.release();
                events.push(RideEvent::VehicleReleased {
                    vehicle_id: vehicle.id,
                    ride_id,
                    timestamp: Utc::now(),
                });
            }

            for booking_id in ride.passenger_booking_ids() {
                if let Some(booking) = self.bookings().get(booking_id) {
                    booking.mark_completed();
                }
            }
        }

        self.event_handler().on_events(events);
        Ok(())
    }

    /// Cancel a booking and compensate its ride, if any.
    ///
    /// The booking flips to Cancelled first; the ride-side removal (seat
    /// restored, luggage released) follows as a second atomic step. The
    /// vehicle is NOT released — only full ride completion frees it.
    pub fn cancel_booking(&self, booking_id: BookingId) -> EngineResult<CancelOutcome> {
        let booking = self
            .bookings()
            .get(booking_id)
            .ok_or(EngineError::BookingNotFound(booking_id))?;

        if !booking.try_cancel() {
            return Err(EngineError::InvalidState(
                "cannot cancel a completed or already cancelled booking".to_string(),
            ));
        }

        let mut events = vec![RideEvent::BookingCancelled {
            booking_id,
            timestamp: Utc::now(),
        }];
        tracing::info!(booking = %booking_id.as_uuid(), "booking cancelled");

        let outcome = match self.rides().find_ride_with_booking(booking_id) {
            Some(ride) => match ride.try_remove_passenger(booking_id) {
                Some(entry) => {
                    events.push(RideEvent::PassengerRemoved {
                        ride_id: ride.id,
                        booking_id,
                        luggage_released: entry.luggage_count,
                        timestamp: Utc::now(),
                    });
                    CancelOutcome::RemovedFromRide { ride_id: ride.id }
                },
                // Raced with another removal between lookup and apply
                None => CancelOutcome::NotYetAssigned,
            },
            None => CancelOutcome::NotYetAssigned,
        };

        self.event_handler().on_events(events);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingStatus, MatchingPolicy, UserId, Vehicle};
    use crate::engine::RideRequest;
    use crate::geo::Coordinate;
    use crate::interfaces::{NoOpEventHandler, VehicleDirectory};
    use crate::registry::{BookingLedger, InMemoryVehicleDirectory, RideRegistry};
    use std::sync::Arc;

    fn engine() -> MatchingEngine {
        let vehicles = Arc::new(InMemoryVehicleDirectory::new());
        vehicles.register(Vehicle::new(
            "Driver",
            "PLATE-1",
            4,
            4,
            Coordinate::new(0.001, 0.0),
        ));

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
    fn test_completion_frees_vehicle_and_completes_bookings() {
        let engine = engine();
        let outcome = engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 1))
            .unwrap();
        let ride = engine.rides().get(outcome.ride_id()).unwrap();
        let vehicle = engine.vehicles().get(ride.vehicle_id).unwrap();
        assert!(!vehicle.is_available());

        engine
            .update_ride_status(outcome.ride_id(), RideStatus::Completed)
            .unwrap();

        assert_eq!(ride.status(), RideStatus::Completed);
        assert!(vehicle.is_available());
        let booking = engine.bookings().get(outcome.booking_id()).unwrap();
        assert_eq!(booking.status(), BookingStatus::Completed);
    }

    #[test]
    fn test_status_update_rejects_unknown_ride() {
        let engine = engine();
        let missing = RideId::new();
        assert_eq!(
            engine.update_ride_status(missing, RideStatus::Started),
            Err(EngineError::RideNotFound(missing))
        );
    }

    #[test]
    fn test_status_update_rejects_matching_target() {
        let engine = engine();
        let outcome = engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 0))
            .unwrap();

        let result = engine.update_ride_status(outcome.ride_id(), RideStatus::Matching);
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_status_update_does_not_validate_transition_order() {
        let engine = engine();
        let outcome = engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 0))
            .unwrap();
        let ride = engine.rides().get(outcome.ride_id()).unwrap();

        // Completed before Started is accepted, by design
        engine
            .update_ride_status(outcome.ride_id(), RideStatus::Completed)
            .unwrap();
        assert_eq!(ride.status(), RideStatus::Completed);

        engine
            .update_ride_status(outcome.ride_id(), RideStatus::Started)
            .unwrap();
        assert_eq!(ride.status(), RideStatus::Started);
    }

    #[test]
    fn test_cancel_matched_booking_restores_ride_counters() {
        let engine = engine();
        let first = engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 2))
            .unwrap();
        let second = engine
            .request_ride(request(Coordinate::new(0.06, 0.0), 1))
            .unwrap();
        assert!(second.is_merged());

        let ride = engine.rides().get(first.ride_id()).unwrap();
        assert_eq!(ride.available_seats(), 2);
        assert_eq!(ride.total_luggage(), 3);

        let outcome = engine.cancel_booking(second.booking_id()).unwrap();
        assert_eq!(
            outcome,
            CancelOutcome::RemovedFromRide {
                ride_id: first.ride_id()
            }
        );
        // Seat restored by exactly one, luggage reduced by exactly the
        // cancelled booking's count
        assert_eq!(ride.available_seats(), 3);
        assert_eq!(ride.total_luggage(), 2);
        assert_eq!(ride.passenger_count(), 1);

        // Vehicle stays bound to the ride
        let vehicle = engine.vehicles().get(ride.vehicle_id).unwrap();
        assert!(!vehicle.is_available());
    }

    #[test]
    fn test_cancel_unmatched_booking_reports_not_yet_assigned() {
        use crate::interfaces::{RecordingEventHandler, RideEvent};

        // No vehicles: the request fails with NoVehicleAvailable but the
        // booking is created and stays Pending
        let recorder = Arc::new(RecordingEventHandler::new());
        let engine = MatchingEngine::new(
            MatchingPolicy::default(),
            Arc::new(RideRegistry::new()),
            Arc::new(BookingLedger::new()),
            Arc::new(InMemoryVehicleDirectory::new()),
            Arc::clone(&recorder) as Arc<dyn crate::interfaces::EventHandler>,
        );

        let result = engine.request_ride(request(Coordinate::new(0.05, 0.0), 1));
        assert_eq!(result.unwrap_err(), EngineError::NoVehicleAvailable);

        let booking_id = recorder
            .take_events()
            .into_iter()
            .find_map(|event| match event {
                RideEvent::BookingCreated { booking_id, .. } => Some(booking_id),
                _ => None,
            })
            .unwrap();

        let outcome = engine.cancel_booking(booking_id).unwrap();
        assert_eq!(outcome, CancelOutcome::NotYetAssigned);

        let booking = engine.bookings().get(booking_id).unwrap();
        assert_eq!(booking.status(), BookingStatus::Cancelled);
        assert!(engine.rides().is_empty());
    }

    #[test]
    fn test_cancel_unknown_booking() {
        let engine = engine();
        let missing = BookingId::new();
        assert_eq!(
            engine.cancel_booking(missing),
            Err(EngineError::BookingNotFound(missing))
        );
    }

    #[test]
    fn test_double_cancel_fails_with_invalid_state() {
        let engine = engine();
        let outcome = engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 1))
            .unwrap();

        engine.cancel_booking(outcome.booking_id()).unwrap();
        let second = engine.cancel_booking(outcome.booking_id());
        assert!(matches!(second, Err(EngineError::InvalidState(_))));
    }

    #[test]
    fn test_cancel_completed_booking_fails() {
        let engine = engine();
        let outcome = engine
            .request_ride(request(Coordinate::new(0.05, 0.0), 1))
            .unwrap();
        engine
            .update_ride_status(outcome.ride_id(), RideStatus::Completed)
            .unwrap();

        let result = engine.cancel_booking(outcome.booking_id());
        assert!(matches!(result, Err(EngineError::InvalidState(_))));
    }
}
