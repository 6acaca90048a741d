// ============================================================================
// Ridepool Engine Library
// Concurrency-safe ride-pooling matching engine
// ============================================================================

//! # Ridepool Engine
//!
//! A concurrency-safe matching engine for shared-vehicle trip requests.
//!
//! ## Features
//!
//! - **Merge-vs-spawn matching**: greedy first-fit scan of in-progress
//!   rides with a configurable detour threshold
//! - **Atomic seat reservation**: seat and luggage counters commit in a
//!   single CAS, so racing requests can never overbook a ride
//! - **Two-entity lifecycle**: booking and ride state machines with
//!   compensating actions (seat release, luggage restore, vehicle
//!   re-availability) on cancellation and completion
//! - **Pluggable vehicle lookup** behind the `VehicleDirectory` trait
//!
//! ## Example
//!
//! ```rust
//! use ridepool_engine::prelude::*;
//! use ridepool_engine::geo::Coordinate;
//! use std::sync::Arc;
//!
//! let engine = RidePoolBuilder::new()
//!     .build(Arc::new(NoOpEventHandler))
//!     .unwrap();
//!
//! engine.vehicles().register(Vehicle::new(
//!     "Rahul Driver",
//!     "MH-01-AB-1234",
//!     4,
//!     4,
//!     Coordinate::new(72.8775, 19.0755),
//! ));
//!
//! let outcome = engine
//!     .request_ride(RideRequest {
//!         user_id: UserId::new(),
//!         source: Coordinate::new(72.8777, 19.0760),
//!         destination: Coordinate::new(72.9300, 19.1200),
//!         luggage_count: 2,
//!     })
//!     .unwrap();
//!
//! assert!(!outcome.is_merged()); // First booking spawns a new ride
//! ```

pub mod domain;
pub mod engine;
pub mod errors;
pub mod fare;
pub mod geo;
pub mod interfaces;
pub mod registry;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::booking::state::BookingStatus;
    pub use crate::domain::ride::state::RideStatus;
    pub use crate::domain::{
        Booking, BookingId, MatchingPolicy, PassengerEntry, Ride, RideId, UserId, Vehicle,
        VehicleId,
    };
    pub use crate::engine::{
        create_from_policy, CancelOutcome, MatchOutcome, MatchingEngine, RidePoolBuilder,
        RideRequest,
    };
    pub use crate::errors::{EngineError, EngineResult};
    pub use crate::interfaces::{
        EventHandler, LoggingEventHandler, NoOpEventHandler, RecordingEventHandler, RideEvent,
        VehicleDirectory,
    };
    pub use crate::registry::{BookingLedger, InMemoryVehicleDirectory, RideRegistry};
}
