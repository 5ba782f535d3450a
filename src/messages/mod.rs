use tokio::sync::oneshot;

use crate::domain::{
    Appointment, Event, EventCreate, EventView, Friendship, ProfilePatch, User, UserCreate,
};
use crate::error::{DirectoryError, FriendshipError, SchedulingError};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for actor communication. Each variant carries its
/// parameters and a oneshot channel for the response.

#[derive(Debug)]
pub enum DirectoryRequest {
    RegisterUser {
        user: UserCreate,
        respond_to: ServiceResponse<String, DirectoryError>,
    },
    GetUser {
        id: String,
        respond_to: ServiceResponse<Option<User>, DirectoryError>,
    },
    FindUserByName {
        name: String,
        respond_to: ServiceResponse<Option<User>, DirectoryError>,
    },
    SearchUsers {
        fragment: String,
        respond_to: ServiceResponse<Vec<User>, DirectoryError>,
    },
    UpdateProfile {
        id: String,
        patch: ProfilePatch,
        respond_to: ServiceResponse<User, DirectoryError>,
    },
    ListUsers {
        respond_to: ServiceResponse<Vec<User>, DirectoryError>,
    },
    Shutdown,
    #[cfg(test)]
    GetUserCount {
        respond_to: ServiceResponse<usize, DirectoryError>,
    },
}

#[derive(Debug)]
pub enum FriendshipRequest {
    SendRequest {
        requester_id: String,
        addressee_id: String,
        respond_to: ServiceResponse<Friendship, FriendshipError>,
    },
    Accept {
        friendship_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Friendship, FriendshipError>,
    },
    Reject {
        friendship_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Friendship, FriendshipError>,
    },
    Remove {
        friendship_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<(), FriendshipError>,
    },
    ListFriends {
        user_id: String,
        respond_to: ServiceResponse<Vec<Friendship>, FriendshipError>,
    },
    ListPending {
        user_id: String,
        respond_to: ServiceResponse<Vec<Friendship>, FriendshipError>,
    },
    AreConnected {
        a: String,
        b: String,
        respond_to: ServiceResponse<bool, FriendshipError>,
    },
    Shutdown,
    #[cfg(test)]
    GetEdgeCount {
        respond_to: ServiceResponse<usize, FriendshipError>,
    },
}

#[derive(Debug)]
pub enum SchedulingRequest {
    CreateEvent {
        event: EventCreate,
        respond_to: ServiceResponse<Event, SchedulingError>,
    },
    GetEvent {
        id: String,
        respond_to: ServiceResponse<Option<EventView>, SchedulingError>,
    },
    ListPublicEvents {
        respond_to: ServiceResponse<Vec<EventView>, SchedulingError>,
    },
    ListEventsByOwner {
        viewer_id: String,
        owner_id: String,
        respond_to: ServiceResponse<Vec<EventView>, SchedulingError>,
    },
    IsOwnedBy {
        event_id: String,
        user_id: String,
        respond_to: ServiceResponse<bool, SchedulingError>,
    },
    Book {
        event_id: String,
        booker_id: String,
        respond_to: ServiceResponse<Appointment, SchedulingError>,
    },
    Approve {
        appointment_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Appointment, SchedulingError>,
    },
    Reject {
        appointment_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Appointment, SchedulingError>,
    },
    Cancel {
        appointment_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Appointment, SchedulingError>,
    },
    ListByUser {
        user_id: String,
        respond_to: ServiceResponse<Vec<Appointment>, SchedulingError>,
    },
    ListIncoming {
        owner_id: String,
        respond_to: ServiceResponse<Vec<Appointment>, SchedulingError>,
    },
    Shutdown,
}
