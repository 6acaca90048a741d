// ============================================================================
// Booking Domain Model
// ============================================================================

use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU8, Ordering};
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookingId(Uuid);

impl BookingId {
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

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to the owning user. Account management is out of scope, so
/// this is opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UserId(Uuid);

impl UserId {
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Booking State Machine
// ============================================================================

pub mod state {
    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(u8)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum BookingStatus {
        /// Created, not yet attached to a ride
        Pending = 0,
        /// Attached to a ride (merged or founding passenger)
        Matched = 1,
        Cancelled = 2,
        Completed = 3,
    }

    impl BookingStatus {
        pub fn from_u8(val: u8) -> Self {
            match val {
                0 => BookingStatus::Pending,
                1 => BookingStatus::Matched,
                2 => BookingStatus::Cancelled,
                3 => BookingStatus::Completed,
                _ => BookingStatus::Cancelled,
            }
        }

        /// Terminal states permit no further mutation.
        pub fn is_terminal(&self) -> bool {
            matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
        }

        pub fn can_be_cancelled(&self) -> bool {
            matches!(self, BookingStatus::Pending | BookingStatus::Matched)
        }
    }
}

// ============================================================================
// Booking Entity
// ============================================================================

/// A single passenger's trip request.
///
/// Status lives in an atomic so concurrent lifecycle operations never
/// read-modify-write it in separate steps. Cost is computed at creation
/// and immutable afterwards.
#[derive(Debug)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub source: Coordinate,
    pub destination: Coordinate,
    pub luggage_count: u32,
    pub cost: i64,
    pub created_at: DateTime<Utc>,

    status: AtomicU8,
}

impl Booking {
    pub fn new(
        user_id: UserId,
        source: Coordinate,
        destination: Coordinate,
        luggage_count: u32,
        cost: i64,
    ) -> Self {
        Self {
            id: BookingId::new(),
            user_id,
            source,
            destination,
            luggage_count,
            cost,
            created_at: Utc::now(),
            status: AtomicU8::new(state::BookingStatus::Pending as u8),
        }
    }

    pub fn status(&self) -> state::BookingStatus {
        state::BookingStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Flip to Matched after the ride-side change has succeeded.
    pub fn mark_matched(&self) {
        self.status
            .store(state::BookingStatus::Matched as u8, Ordering::Release);
    }

    /// Batch completion when the ride finishes. Applied regardless of the
    /// prior status, matching the best-effort completion sweep.
    pub fn mark_completed(&self) {
        self.status
            .store(state::BookingStatus::Completed as u8, Ordering::Release);
    }

    /// Atomically cancel this booking.
    /// Returns false when the booking is already in a terminal state, or
    /// when a concurrent cancel won the race.
    pub fn try_cancel(&self) -> bool {
        let current = self.status.load(Ordering::Acquire);
        let status = state::BookingStatus::from_u8(current);

        if !status.can_be_cancelled() {
            return false;
        }

        self.status
            .compare_exchange(
                current,
                state::BookingStatus::Cancelled as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
