use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::appointments::AppointmentBook;
use crate::clients::{DirectoryClient, FriendshipClient, SchedulingClient};
use crate::domain::{Appointment, Event, EventCreate, EventView};
use crate::error::{SchedulingError, VisibilityError};
use crate::messages::{SchedulingRequest, ServiceResponse};
use crate::registry::EventRegistry;
use crate::visibility::Visibility;

/// Macro for clean error response handling
macro_rules! send_error {
    ($respond_to:expr, $error:expr) => {{
        let _ = $respond_to.send(Err($error));
        return;
    }};
}

/// Root actor hosting the event registry and the appointment book behind one
/// mailbox. Booking, approval, cancellation, and availability reads are all
/// handled one message at a time, so the check-and-create that guards the
/// exclusive slot cannot interleave with a concurrent booker.
pub struct SchedulingService {
    receiver: mpsc::Receiver<SchedulingRequest>,
    registry: EventRegistry,
    book: AppointmentBook,
    directory: DirectoryClient,
    visibility: Visibility,
}

impl SchedulingService {
    pub fn new(
        buffer_size: usize,
        directory: DirectoryClient,
        friendships: FriendshipClient,
    ) -> (Self, SchedulingClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            registry: EventRegistry::new(),
            book: AppointmentBook::new(),
            visibility: Visibility::new(directory.clone(), friendships),
            directory,
        };
        let client = SchedulingClient::new(sender);
        (service, client)
    }

    #[instrument(name = "scheduling_service", skip(self))]
    pub async fn run(mut self) {
        info!("SchedulingService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SchedulingRequest::CreateEvent { event, respond_to } => {
                    self.handle_create_event(event, respond_to).await;
                }
                SchedulingRequest::GetEvent { id, respond_to } => {
                    self.handle_get_event(id, respond_to);
                }
                SchedulingRequest::ListPublicEvents { respond_to } => {
                    self.handle_list_public_events(respond_to);
                }
                SchedulingRequest::ListEventsByOwner {
                    viewer_id,
                    owner_id,
                    respond_to,
                } => {
                    self.handle_list_events_by_owner(viewer_id, owner_id, respond_to)
                        .await;
                }
                SchedulingRequest::IsOwnedBy {
                    event_id,
                    user_id,
                    respond_to,
                } => {
                    debug!("Processing is_owned_by request");
                    let _ = respond_to.send(Ok(self.registry.is_owned_by(&event_id, &user_id)));
                }
                SchedulingRequest::Book {
                    event_id,
                    booker_id,
                    respond_to,
                } => {
                    self.handle_book(event_id, booker_id, respond_to).await;
                }
                SchedulingRequest::Approve {
                    appointment_id,
                    acting_user_id,
                    respond_to,
                } => {
                    self.handle_approve(appointment_id, acting_user_id, respond_to);
                }
                SchedulingRequest::Reject {
                    appointment_id,
                    acting_user_id,
                    respond_to,
                } => {
                    self.handle_reject(appointment_id, acting_user_id, respond_to);
                }
                SchedulingRequest::Cancel {
                    appointment_id,
                    acting_user_id,
                    respond_to,
                } => {
                    self.handle_cancel(appointment_id, acting_user_id, respond_to);
                }
                SchedulingRequest::ListByUser {
                    user_id,
                    respond_to,
                } => {
                    debug!("Processing list_by_user request");
                    let _ = respond_to.send(Ok(self.book.list_by_user(&user_id)));
                }
                SchedulingRequest::ListIncoming {
                    owner_id,
                    respond_to,
                } => {
                    self.handle_list_incoming(owner_id, respond_to);
                }
                SchedulingRequest::Shutdown => {
                    info!("SchedulingService shutting down");
                    break;
                }
            }
        }

        info!("SchedulingService stopped");
    }

    /// Annotates events with their derived availability from the active
    /// index. Availability is never stored, so it cannot drift.
    fn annotate(&self, events: Vec<Event>) -> Vec<EventView> {
        events
            .into_iter()
            .map(|event| {
                let available = !self.book.is_event_active(&event.id);
                EventView { event, available }
            })
            .collect()
    }

    #[instrument(fields(owner_id = %event.owner_id), skip(self, event, respond_to))]
    async fn handle_create_event(
        &mut self,
        event: EventCreate,
        respond_to: ServiceResponse<Event, SchedulingError>,
    ) {
        debug!("Processing create_event request");

        // Step 1: the owner must exist
        match self.directory.get_user(event.owner_id.clone()).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                error!("Event owner not found");
                send_error!(respond_to, SchedulingError::UserNotFound(event.owner_id));
            }
            Err(e) => {
                error!(error = %e, "Owner lookup failed");
                send_error!(
                    respond_to,
                    SchedulingError::ActorCommunicationError(e.to_string())
                );
            }
        }

        // Step 2: range and calendar validation, then the insert
        let result = self.registry.create(event);
        match &result {
            Ok(event) => info!(event_id = %event.id, "Event created successfully"),
            Err(e) => error!(error = %e, "Event creation failed"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(event_id = %id), skip(self, respond_to))]
    fn handle_get_event(
        &self,
        id: String,
        respond_to: ServiceResponse<Option<EventView>, SchedulingError>,
    ) {
        debug!("Processing get_event request");

        let view = self.registry.get(&id).cloned().map(|event| {
            let available = !self.book.is_event_active(&event.id);
            EventView { event, available }
        });
        let _ = respond_to.send(Ok(view));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_list_public_events(
        &self,
        respond_to: ServiceResponse<Vec<EventView>, SchedulingError>,
    ) {
        debug!("Processing list_public_events request");

        let views = self.annotate(self.registry.list_public());
        info!(event_count = views.len(), "Listed public events");
        let _ = respond_to.send(Ok(views));
    }

    /// The visibility gate runs first; when it denies the viewer, only the
    /// public listing is queried and the private rows are never fetched.
    #[instrument(fields(viewer_id = %viewer_id, owner_id = %owner_id), skip(self, respond_to))]
    async fn handle_list_events_by_owner(
        &mut self,
        viewer_id: String,
        owner_id: String,
        respond_to: ServiceResponse<Vec<EventView>, SchedulingError>,
    ) {
        debug!("Processing list_events_by_owner request");

        let viewable = match self.visibility.can_view(&viewer_id, &owner_id).await {
            Ok(viewable) => viewable,
            Err(VisibilityError::UserNotFound(id)) => {
                error!("Schedule owner not found");
                send_error!(respond_to, SchedulingError::UserNotFound(id));
            }
            Err(e) => {
                error!(error = %e, "Visibility check failed");
                send_error!(
                    respond_to,
                    SchedulingError::ActorCommunicationError(e.to_string())
                );
            }
        };

        let events = if viewable {
            self.registry.list_by_owner(&owner_id)
        } else {
            self.registry.list_public_by_owner(&owner_id)
        };

        let _ = respond_to.send(Ok(self.annotate(events)));
    }

    /// Booking: booker and event must exist, owners cannot book their own
    /// events, and the slot claim is atomic with the availability check.
    #[instrument(fields(event_id = %event_id, booker_id = %booker_id), skip(self, respond_to))]
    async fn handle_book(
        &mut self,
        event_id: String,
        booker_id: String,
        respond_to: ServiceResponse<Appointment, SchedulingError>,
    ) {
        info!("Processing book request");

        // Step 1: validate the booker via the directory
        match self.directory.get_user(booker_id.clone()).await {
            Ok(Some(user)) => debug!(user_name = %user.name, "Booker validation successful"),
            Ok(None) => {
                error!("Booker not found");
                send_error!(respond_to, SchedulingError::UserNotFound(booker_id));
            }
            Err(e) => {
                error!(error = %e, "Booker validation failed");
                send_error!(
                    respond_to,
                    SchedulingError::ActorCommunicationError(e.to_string())
                );
            }
        }

        // Step 2: the event must exist and must not belong to the booker
        let owner_id = match self.registry.get(&event_id) {
            Some(event) => event.owner_id.clone(),
            None => {
                error!("Event not found");
                send_error!(respond_to, SchedulingError::EventNotFound(event_id));
            }
        };
        if owner_id == booker_id {
            error!("Self-booking refused");
            send_error!(respond_to, SchedulingError::SelfBooking(event_id));
        }

        // Step 3: claim the slot (atomic within this handler turn)
        let result = self.book.book(&event_id, &booker_id);
        match &result {
            Ok(appt) => info!(appointment_id = %appt.id, status = %appt.status, "Appointment created"),
            Err(e) => error!(error = %e, "Booking refused"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(appointment_id = %appointment_id, acting_user_id = %acting_user_id), skip(self, respond_to))]
    fn handle_approve(
        &mut self,
        appointment_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Appointment, SchedulingError>,
    ) {
        debug!("Processing approve request");

        if let Err(e) = self.authorize_owner(&appointment_id, &acting_user_id) {
            error!(error = %e, "Approve refused");
            send_error!(respond_to, e);
        }

        let result = self.book.approve(&appointment_id);
        match &result {
            Ok(appt) => info!(status = %appt.status, "Appointment approved"),
            Err(e) => error!(error = %e, "Approve refused"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(appointment_id = %appointment_id, acting_user_id = %acting_user_id), skip(self, respond_to))]
    fn handle_reject(
        &mut self,
        appointment_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Appointment, SchedulingError>,
    ) {
        debug!("Processing reject request");

        if let Err(e) = self.authorize_owner(&appointment_id, &acting_user_id) {
            error!(error = %e, "Reject refused");
            send_error!(respond_to, e);
        }

        let result = self.book.reject(&appointment_id);
        match &result {
            Ok(appt) => info!(status = %appt.status, "Appointment rejected"),
            Err(e) => error!(error = %e, "Reject refused"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(appointment_id = %appointment_id, acting_user_id = %acting_user_id), skip(self, respond_to))]
    fn handle_cancel(
        &mut self,
        appointment_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Appointment, SchedulingError>,
    ) {
        debug!("Processing cancel request");

        match self.book.get(&appointment_id) {
            Some(appt) if appt.booked_by != acting_user_id => {
                error!("Cancel refused: not the booker");
                send_error!(
                    respond_to,
                    SchedulingError::Forbidden(
                        "Only the booker can cancel this appointment".to_string()
                    )
                );
            }
            Some(_) => {}
            None => {
                error!("Appointment not found");
                send_error!(
                    respond_to,
                    SchedulingError::AppointmentNotFound(appointment_id)
                );
            }
        }

        let result = self.book.cancel(&appointment_id);
        match &result {
            Ok(appt) => info!(status = %appt.status, "Appointment cancelled"),
            Err(e) => error!(error = %e, "Cancel refused"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(owner_id = %owner_id), skip(self, respond_to))]
    fn handle_list_incoming(
        &self,
        owner_id: String,
        respond_to: ServiceResponse<Vec<Appointment>, SchedulingError>,
    ) {
        debug!("Processing list_incoming request");

        let owned: Vec<String> = self
            .registry
            .list_by_owner(&owner_id)
            .into_iter()
            .map(|e| e.id)
            .collect();
        let pending = self.book.list_pending_on(&owned);

        info!(request_count = pending.len(), "Listed incoming requests");
        let _ = respond_to.send(Ok(pending));
    }

    /// Approve and reject belong to the event owner alone.
    fn authorize_owner(
        &self,
        appointment_id: &str,
        acting_user_id: &str,
    ) -> Result<(), SchedulingError> {
        let appt = self
            .book
            .get(appointment_id)
            .ok_or_else(|| SchedulingError::AppointmentNotFound(appointment_id.to_string()))?;

        if !self.registry.is_owned_by(&appt.event_id, acting_user_id) {
            return Err(SchedulingError::Forbidden(
                "Only the event owner can resolve this appointment".to_string(),
            ));
        }
        Ok(())
    }
}
