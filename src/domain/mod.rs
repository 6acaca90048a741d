// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod booking;
pub mod config;
pub mod ride;
pub mod vehicle;

pub use booking::{Booking, BookingId, UserId};
pub use config::MatchingPolicy;
pub use ride::{PassengerEntry, Ride, RideId};
pub use vehicle::{Vehicle, VehicleId};

// Re-export state machines
pub use booking::state::BookingStatus;
pub use ride::state::RideStatus;
