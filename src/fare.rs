// ============================================================================
// Fare Calculator
// Pure function of trip distance and fare policy
// ============================================================================

use crate::domain::MatchingPolicy;
use crate::geo::{haversine_km, Coordinate};

/// Compute the fare for a trip, rounded to the nearest integer money unit.
///
/// `base_fare + distance_km * per_km_rate`, using the great-circle distance
/// between source and destination. With the reference policy a 10 km trip
/// costs 170.
pub fn calculate_fare(policy: &MatchingPolicy, source: Coordinate, destination: Coordinate) -> i64 {
    let distance_km = haversine_km(source, destination);
    (policy.base_fare as f64 + distance_km * policy.per_km_rate as f64).round() as i64
}
