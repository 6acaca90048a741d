// ============================================================================
// Event Handler Interface
// Defines the contract for handling matching and lifecycle events
// ============================================================================

use crate::domain::{BookingId, RideId, RideStatus, VehicleId};
use chrono::{DateTime, Utc};
use crossbeam::queue::SegQueue;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the matching engine
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RideEvent {
    /// Booking record created in Pending
    BookingCreated {
        booking_id: BookingId,
        cost: i64,
        timestamp: DateTime<Utc>,
    },

    /// Booking merged into an existing ride
    RideMerged {
        ride_id: RideId,
        booking_id: BookingId,
        vehicle_id: VehicleId,
        timestamp: DateTime<Utc>,
    },

    /// Seat reservation predicate failed against a concurrent request;
    /// the engine falls through to new-ride creation
    SeatConflict {
        ride_id: RideId,
        booking_id: BookingId,
        timestamp: DateTime<Utc>,
    },

    /// New ride spawned around the booking
    RideCreated {
        ride_id: RideId,
        booking_id: BookingId,
        vehicle_id: VehicleId,
        timestamp: DateTime<Utc>,
    },

    /// No vehicle within the search radius; booking left Pending
    NoVehicleAvailable {
        booking_id: BookingId,
        timestamp: DateTime<Utc>,
    },

    /// Ride status written by the lifecycle manager
    RideStatusChanged {
        ride_id: RideId,
        status: RideStatus,
        timestamp: DateTime<Utc>,
    },

    /// Vehicle freed on ride completion
    VehicleReleased {
        vehicle_id: VehicleId,
        ride_id: RideId,
        timestamp: DateTime<Utc>,
    },

    /// Booking cancelled
    BookingCancelled {
        booking_id: BookingId,
        timestamp: DateTime<Utc>,
    },

    /// Compensating removal of a cancelled passenger from its ride
    PassengerRemoved {
        ride_id: RideId,
        booking_id: BookingId,
        luggage_released: u32,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing matching engine events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle a ride event
    fn on_event(&self, event: RideEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<RideEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: RideEvent) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: RideEvent) {
        tracing::debug!("Matching engine event: {:?}", event);
    }
}

/// Event handler that records events into a lock-free queue, so concurrent
/// tests can assert on the emitted stream without extra synchronization.
#[derive(Default)]
pub struct RecordingEventHandler {
    events: SegQueue<RideEvent>,
}

impl RecordingEventHandler {
    pub fn new() -> Self {
        Self {
            events: SegQueue::new(),
        }
    }

    /// Drain every recorded event in arrival order.
    pub fn take_events(&self) -> Vec<RideEvent> {
        let mut drained = Vec::new();
        while let Some(event) = self.events.pop() {
            drained.push(event);
        }
        drained
    }
}

impl EventHandler for RecordingEventHandler {
    fn on_event(&self, event: RideEvent) {
        self.events.push(event);
    }
}
