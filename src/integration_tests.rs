#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::app_system::BookingSystem;
    use crate::domain::{AppointmentStatus, EventCreate, UserCreate};
    use crate::error::{FriendshipError, SchedulingError};

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap()
    }

    async fn register(system: &BookingSystem, name: &str) -> String {
        system
            .directory
            .register_user(UserCreate::new(name, format!("{}@example.com", name.to_lowercase())))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn booking_lifecycle_end_to_end() {
        let system = BookingSystem::new();
        let owner = register(&system, "Alice").await;
        let booker = register(&system, "Bob").await;
        let other = register(&system, "Carol").await;

        let event = system
            .scheduling
            .create_event(EventCreate::new(&owner, hour(10), hour(11)))
            .await
            .unwrap();

        // visible and available to everyone before any booking
        let listed = system.scheduling.list_public_events().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].available);

        // first booking claims the slot as Pending
        let appt = system
            .scheduling
            .book(event.id.clone(), booker.clone())
            .await
            .unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);

        let view = system
            .scheduling
            .get_event(event.id.clone())
            .await
            .unwrap()
            .unwrap();
        assert!(!view.available);

        // a second booker is refused while the slot is held
        let err = system
            .scheduling
            .book(event.id.clone(), other.clone())
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::EventUnavailable(event.id.clone()));

        // the owner sees the request and approves it
        let incoming = system.scheduling.list_incoming(owner.clone()).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].id, appt.id);

        let booked = system
            .scheduling
            .approve(appt.id.clone(), owner.clone())
            .await
            .unwrap();
        assert_eq!(booked.status, AppointmentStatus::Booked);

        // the booker cancels; the slot frees and can be claimed again
        let cancelled = system
            .scheduling
            .cancel(appt.id.clone(), booker.clone())
            .await
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        let rebooked = system
            .scheduling
            .book(event.id.clone(), other.clone())
            .await
            .unwrap();
        assert_ne!(rebooked.id, appt.id);

        // the first booker's history keeps the cancelled appointment
        let history = system.scheduling.list_by_user(booker.clone()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, AppointmentStatus::Cancelled);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_bookings_have_exactly_one_winner() {
        let system = BookingSystem::new();
        let owner = register(&system, "Alice").await;

        let mut bookers = Vec::new();
        for i in 0..8 {
            bookers.push(register(&system, &format!("Booker{i}")).await);
        }

        let event = system
            .scheduling
            .create_event(EventCreate::new(&owner, hour(9), hour(10)))
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for booker in bookers {
            let scheduling = system.scheduling.clone();
            let event_id = event.id.clone();
            tasks.push(tokio::spawn(async move {
                scheduling.book(event_id, booker).await
            }));
        }

        let mut winners = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(appt) => {
                    assert_eq!(appt.status, AppointmentStatus::Pending);
                    winners += 1;
                }
                Err(e) => assert_eq!(e, SchedulingError::EventUnavailable(event.id.clone())),
            }
        }
        assert_eq!(winners, 1);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn friendship_rules_across_the_system() {
        let system = BookingSystem::new();
        let alice = register(&system, "Alice").await;
        let bob = register(&system, "Bob").await;

        // self and unknown addressees are refused before the graph is touched
        let err = system
            .friendships
            .send_request(alice.clone(), "user_99".to_string())
            .await
            .unwrap_err();
        assert_eq!(err, FriendshipError::UserNotFound("user_99".to_string()));

        let err = system
            .friendships
            .send_request(alice.clone(), alice.clone())
            .await
            .unwrap_err();
        assert_eq!(err, FriendshipError::SelfRequest);

        let edge = system
            .friendships
            .send_request(alice.clone(), bob.clone())
            .await
            .unwrap();

        // duplicates are refused in both directions while the edge is active
        for (from, to) in [(&alice, &bob), (&bob, &alice)] {
            let err = system
                .friendships
                .send_request(from.clone(), to.clone())
                .await
                .unwrap_err();
            assert!(matches!(err, FriendshipError::DuplicateRequest(_, _)));
        }

        // the requester cannot resolve their own request
        let err = system
            .friendships
            .accept(edge.id.clone(), alice.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, FriendshipError::Forbidden(_)));

        // rejection is terminal; a fresh request creates a second edge
        system
            .friendships
            .reject(edge.id.clone(), bob.clone())
            .await
            .unwrap();
        system
            .friendships
            .send_request(bob.clone(), alice.clone())
            .await
            .unwrap();
        assert_eq!(system.friendships.get_edge_count().await.unwrap(), 2);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn friendship_gates_the_private_schedule() {
        let system = BookingSystem::new();
        let viewer = register(&system, "Alice").await;
        let owner = system
            .directory
            .register_user(UserCreate::private("Bob", "bob@example.com"))
            .await
            .unwrap();

        system
            .scheduling
            .create_event(EventCreate::new(&owner, hour(10), hour(11)))
            .await
            .unwrap();
        let mut private = EventCreate::new(&owner, hour(12), hour(13));
        private.is_public = false;
        system.scheduling.create_event(private).await.unwrap();

        // a stranger sees the public slice only; the owner sees everything
        let seen = system
            .scheduling
            .list_events_by_owner(viewer.clone(), owner.clone())
            .await
            .unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].event.is_public);

        let own = system
            .scheduling
            .list_events_by_owner(owner.clone(), owner.clone())
            .await
            .unwrap();
        assert_eq!(own.len(), 2);

        // an accepted friendship opens the gate
        let edge = system
            .friendships
            .send_request(viewer.clone(), owner.clone())
            .await
            .unwrap();
        system
            .friendships
            .accept(edge.id.clone(), owner.clone())
            .await
            .unwrap();

        let seen = system
            .scheduling
            .list_events_by_owner(viewer.clone(), owner.clone())
            .await
            .unwrap();
        assert_eq!(seen.len(), 2);

        // removal closes it again
        system
            .friendships
            .remove(edge.id, viewer.clone())
            .await
            .unwrap();
        let seen = system
            .scheduling
            .list_events_by_owner(viewer.clone(), owner.clone())
            .await
            .unwrap();
        assert_eq!(seen.len(), 1);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn event_creation_is_validated() {
        let system = BookingSystem::new();
        let owner = register(&system, "Alice").await;

        let err = system
            .scheduling
            .create_event(EventCreate::new("user_99", hour(10), hour(11)))
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::UserNotFound("user_99".to_string()));

        let err = system
            .scheduling
            .create_event(EventCreate::new(&owner, hour(11), hour(10)))
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::InvalidRange);

        system
            .scheduling
            .create_event(EventCreate::new(&owner, hour(10), hour(12)))
            .await
            .unwrap();
        let err = system
            .scheduling
            .create_event(EventCreate::new(&owner, hour(11), hour(13)))
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::OverlappingEvent(owner.clone()));

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn booking_and_resolution_are_authorized() {
        let system = BookingSystem::new();
        let owner = register(&system, "Alice").await;
        let booker = register(&system, "Bob").await;
        let stranger = register(&system, "Carol").await;

        let event = system
            .scheduling
            .create_event(EventCreate::new(&owner, hour(10), hour(11)))
            .await
            .unwrap();

        // unknown booker and unknown event
        let err = system
            .scheduling
            .book(event.id.clone(), "user_99".to_string())
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::UserNotFound("user_99".to_string()));

        let err = system
            .scheduling
            .book("event_99".to_string(), booker.clone())
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::EventNotFound("event_99".to_string()));

        // owners cannot book their own events
        let err = system
            .scheduling
            .book(event.id.clone(), owner.clone())
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::SelfBooking(event.id.clone()));

        let appt = system
            .scheduling
            .book(event.id.clone(), booker.clone())
            .await
            .unwrap();

        // only the event owner approves or rejects
        let err = system
            .scheduling
            .approve(appt.id.clone(), booker.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));

        // only the booker cancels
        let err = system
            .scheduling
            .cancel(appt.id.clone(), stranger.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));

        let rejected = system
            .scheduling
            .reject(appt.id.clone(), owner.clone())
            .await
            .unwrap();
        assert_eq!(rejected.status, AppointmentStatus::Rejected);

        // rejection freed the slot
        let view = system
            .scheduling
            .get_event(event.id.clone())
            .await
            .unwrap()
            .unwrap();
        assert!(view.available);

        system.shutdown().await.unwrap();
    }
}
