mod domain;
mod error;
mod messages;
mod clients;

mod directory;
mod friendships;
mod registry;
mod appointments;
mod scheduler;
mod visibility;

mod app_system;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

use chrono::{Duration, Utc};
use tracing::{error, info, Instrument};

use crate::app_system::{setup_tracing, BookingSystem};
use crate::domain::{EventCreate, UserCreate};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting application with complete booking system");

    // Create the entire booking system (starts all services)
    let system = BookingSystem::new();

    // Register two users: an event owner with a private profile and a booker
    let alice = system
        .directory
        .register_user(UserCreate::private("Alice", "alice@example.com"))
        .await
        .map_err(|e| e.to_string())?;
    let bob = system
        .directory
        .register_user(UserCreate::new("Bob", "bob@example.com"))
        .await
        .map_err(|e| e.to_string())?;

    info!(owner_id = %alice, booker_id = %bob, "Users registered");

    // Alice publishes a bookable slot starting an hour from now
    let start = Utc::now() + Duration::hours(1);
    let event = system
        .scheduling
        .create_event(EventCreate::new(&alice, start, start + Duration::hours(1)))
        .await
        .map_err(|e| e.to_string())?;

    info!(event_id = %event.id, "Event created");

    // Bob books the slot; the request flows through booker validation,
    // event lookup, and the atomic slot claim
    let span = tracing::info_span!("booking_flow");
    let appointment = async {
        info!("Booking the event");
        system
            .scheduling
            .book(event.id.clone(), bob.clone())
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    info!(appointment_id = %appointment.id, status = %appointment.status, "Appointment requested");

    // A second booking on the same event is refused while the slot is held
    match system.scheduling.book(event.id.clone(), bob.clone()).await {
        Ok(_) => error!("Second booking unexpectedly succeeded"),
        Err(e) => info!(error = %e, "Second booking refused as expected"),
    }

    // Alice approves the pending request
    let approved = system
        .scheduling
        .approve(appointment.id.clone(), alice.clone())
        .await
        .map_err(|e| e.to_string())?;

    info!(status = %approved.status, "Appointment approved");

    // Bob cannot see Alice's email until she accepts his friend request
    let before = system
        .visibility
        .view_profile(&bob, &alice)
        .await
        .map_err(|e| e.to_string())?;
    info!(email = ?before.email, "Profile before friendship");

    let request = system
        .friendships
        .send_request(bob.clone(), alice.clone())
        .await
        .map_err(|e| e.to_string())?;
    system
        .friendships
        .accept(request.id, alice.clone())
        .await
        .map_err(|e| e.to_string())?;

    let after = system
        .visibility
        .view_profile(&bob, &alice)
        .await
        .map_err(|e| e.to_string())?;
    info!(email = ?after.email, "Profile after friendship");

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
