// ============================================================================
// Engine Errors
// Error types for matching and lifecycle operations
// ============================================================================

use crate::domain::{BookingId, RideId};
use std::fmt;

/// Errors that can occur during matching and lifecycle operations.
///
/// Every failure is scoped to a single request; no variant is fatal to
/// the engine, which keeps serving subsequent requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed input (invalid coordinates, luggage over the ceiling,
    /// invalid status value)
    Validation(String),
    /// No booking with the given id
    BookingNotFound(BookingId),
    /// No ride with the given id
    RideNotFound(RideId),
    /// Optimistic seat reservation predicate failed: a concurrent request
    /// consumed the seat between scan and apply. The matching engine
    /// downgrades this to new-ride creation and never surfaces it from
    /// `request_ride`.
    SeatConflict(RideId),
    /// No available vehicle within the configured search radius
    NoVehicleAvailable,
    /// Operation not permitted given the current status
    InvalidState(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Validation(reason) => write!(f, "validation failed: {}", reason),
            EngineError::BookingNotFound(id) => write!(f, "booking not found: {}", id.as_uuid()),
            EngineError::RideNotFound(id) => write!(f, "ride not found: {}", id.as_uuid()),
            EngineError::SeatConflict(id) => {
                write!(f, "seat reservation conflict on ride {}", id.as_uuid())
            },
            EngineError::NoVehicleAvailable => {
                write!(f, "no available vehicle within search radius")
            },
            EngineError::InvalidState(reason) => write!(f, "invalid state: {}", reason),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
