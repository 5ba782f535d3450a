use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::client_method;
use crate::domain::{Appointment, Event, EventCreate, EventView};
use crate::error::SchedulingError;
use crate::messages::SchedulingRequest;

/// Client for the Scheduling actor, which hosts the event registry and the
/// appointment book behind a single mailbox.
#[derive(Clone)]
pub struct SchedulingClient {
    sender: mpsc::Sender<SchedulingRequest>,
}

impl SchedulingClient {
    pub fn new(sender: mpsc::Sender<SchedulingRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), String> {
        debug!("Sending shutdown request");
        self.sender
            .send(SchedulingRequest::Shutdown)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

client_method!(SchedulingClient => fn create_event(event: EventCreate) -> Event as SchedulingRequest::CreateEvent, Error = SchedulingError);
client_method!(SchedulingClient => fn get_event(id: String) -> Option<EventView> as SchedulingRequest::GetEvent, Error = SchedulingError);
client_method!(SchedulingClient => fn list_public_events() -> Vec<EventView> as SchedulingRequest::ListPublicEvents, Error = SchedulingError);
client_method!(SchedulingClient => fn list_events_by_owner(viewer_id: String, owner_id: String) -> Vec<EventView> as SchedulingRequest::ListEventsByOwner, Error = SchedulingError);
client_method!(SchedulingClient => fn is_owned_by(event_id: String, user_id: String) -> bool as SchedulingRequest::IsOwnedBy, Error = SchedulingError);
client_method!(SchedulingClient => fn book(event_id: String, booker_id: String) -> Appointment as SchedulingRequest::Book, Error = SchedulingError);
client_method!(SchedulingClient => fn approve(appointment_id: String, acting_user_id: String) -> Appointment as SchedulingRequest::Approve, Error = SchedulingError);
client_method!(SchedulingClient => fn reject(appointment_id: String, acting_user_id: String) -> Appointment as SchedulingRequest::Reject, Error = SchedulingError);
client_method!(SchedulingClient => fn cancel(appointment_id: String, acting_user_id: String) -> Appointment as SchedulingRequest::Cancel, Error = SchedulingError);
client_method!(SchedulingClient => fn list_by_user(user_id: String) -> Vec<Appointment> as SchedulingRequest::ListByUser, Error = SchedulingError);
client_method!(SchedulingClient => fn list_incoming(owner_id: String) -> Vec<Appointment> as SchedulingRequest::ListIncoming, Error = SchedulingError);
