// ============================================================================
// Booking Ledger
// Concurrent store of booking records
// ============================================================================

use crate::domain::{Booking, BookingId, UserId};
use crate::geo::Coordinate;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Booking record store. Bookings mutate only through their own atomic
/// status field, so the ledger itself needs nothing more than a shared
/// index.
pub struct BookingLedger {
    bookings: RwLock<HashMap<BookingId, Arc<Booking>>>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
        }
    }

    /// Create a booking in Pending and store it.
    pub fn create(
        &self,
        user_id: UserId,
        source: Coordinate,
        destination: Coordinate,
        luggage_count: u32,
        cost: i64,
    ) -> Arc<Booking> {
        let booking = Arc::new(Booking::new(user_id, source, destination, luggage_count, cost));
        self.bookings
            .write()
            .insert(booking.id, Arc::clone(&booking));
        booking
    }

    pub fn get(&self, id: BookingId) -> Option<Arc<Booking>> {
        self.bookings.read().get(&id).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.bookings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.read().is_empty()
    }
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookingStatus;

    #[test]
    fn test_create_and_get() {
        let ledger = BookingLedger::new();
        let booking = ledger.create(
            UserId::new(),
            Coordinate::new(72.8777, 19.0760),
            Coordinate::new(72.9300, 19.1200),
            2,
            170,
        );

        assert_eq!(ledger.len(), 1);
        let found = ledger.get(booking.id).unwrap();
        assert_eq!(found.status(), BookingStatus::Pending);
        assert_eq!(found.cost, 170);
        assert!(ledger.get(BookingId::new()).is_none());
    }
}
