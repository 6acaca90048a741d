// ============================================================================
// Registry Module
// Concurrent in-memory stores for rides, bookings and vehicles
// ============================================================================

mod booking_ledger;
mod ride_registry;
mod vehicle_directory;

pub use booking_ledger::BookingLedger;
pub use ride_registry::RideRegistry;
pub use vehicle_directory::InMemoryVehicleDirectory;
