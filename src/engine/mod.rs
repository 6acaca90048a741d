// ============================================================================
// Engine Module
// Contains the core matching and lifecycle business logic
// ============================================================================

mod lifecycle;
mod matching_engine;

pub mod factory;

pub use factory::{create_from_policy, RidePoolBuilder};
pub use lifecycle::CancelOutcome;
pub use matching_engine::{MatchOutcome, MatchingEngine, RideRequest};
