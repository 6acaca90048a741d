// ============================================================================
// Basic Usage Example
// ============================================================================

use ridepool_engine::geo::Coordinate;
use ridepool_engine::prelude::*;
use std::sync::Arc;

fn main() {
    println!("=== Ridepool Engine Example ===\n");

    // Create an engine with the reference policy
    let engine = RidePoolBuilder::new()
        .build(Arc::new(LoggingEventHandler))
        .unwrap();

    // Register a small fleet near Mumbai
    println!("Registering fleet...");
    let fleet = [
        ("Rahul Driver", "MH-01-AB-1234", Coordinate::new(72.8775, 19.0755)),
        ("Anita Driver", "MH-01-CD-5678", Coordinate::new(72.8800, 19.0700)),
    ];
    for (driver, plate, location) in fleet {
        let vehicle = engine.vehicles().register(Vehicle::new(driver, plate, 4, 4, location));
        println!("  {} ({})", vehicle.driver_name, vehicle.license_plate);
    }

    // First request spawns a ride
    println!("\n=== First Request ===");
    let airport = Coordinate::new(72.8679, 19.0896);
    let first = engine
        .request_ride(RideRequest {
            user_id: UserId::new(),
            source: Coordinate::new(72.8777, 19.0760),
            destination: airport,
            luggage_count: 2,
        })
        .unwrap();

    match &first {
        MatchOutcome::NewRide { ride_id, cost, .. } => {
            println!("New ride started: {} (fare {})", ride_id.as_uuid(), cost);
        },
        MatchOutcome::Merged { ride_id, cost, .. } => {
            println!("Merged into ride: {} (fare {})", ride_id.as_uuid(), cost);
        },
    }

    // Second request heads the same way and shares the cab
    println!("\n=== Second Request (same direction) ===");
    let second = engine
        .request_ride(RideRequest {
            user_id: UserId::new(),
            source: Coordinate::new(72.8820, 19.0780),
            destination: Coordinate::new(72.8690, 19.0920), // ~300 m from the airport stop
            luggage_count: 1,
        })
        .unwrap();
    println!(
        "Merged: {} (ride {})",
        second.is_merged(),
        second.ride_id().as_uuid()
    );

    let ride = engine.rides().get(first.ride_id()).unwrap();
    println!(
        "Ride now has {} passengers, {} seats free, luggage {}",
        ride.passenger_count(),
        ride.available_seats(),
        ride.total_luggage()
    );

    // Second passenger changes plans
    println!("\n=== Cancellation ===");
    match engine.cancel_booking(second.booking_id()).unwrap() {
        CancelOutcome::RemovedFromRide { ride_id } => {
            println!("Removed from ride {}", ride_id.as_uuid());
        },
        CancelOutcome::NotYetAssigned => println!("Booking was not yet assigned"),
    }
    println!(
        "Seats free again: {}, luggage {}",
        ride.available_seats(),
        ride.total_luggage()
    );

    // Drive the ride to completion
    println!("\n=== Lifecycle ===");
    engine
        .update_ride_status(first.ride_id(), RideStatus::Started)
        .unwrap();
    engine
        .update_ride_status(first.ride_id(), RideStatus::Completed)
        .unwrap();

    let vehicle = engine.vehicles().get(ride.vehicle_id).unwrap();
    println!(
        "Ride completed; {} is available again: {}",
        vehicle.driver_name,
        vehicle.is_available()
    );

    let booking = engine.bookings().get(first.booking_id()).unwrap();
    println!("First booking status: {:?}", booking.status());
}
