// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod event_handler;
mod vehicle_directory;

pub use event_handler::{
    EventHandler, LoggingEventHandler, NoOpEventHandler, RecordingEventHandler, RideEvent,
};
pub use vehicle_directory::VehicleDirectory;
