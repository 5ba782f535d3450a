use thiserror::Error;

use crate::domain::AppointmentStatus;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DirectoryError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("Email already registered: {0}")]
    EmailAlreadyExists(String),
    #[error("User validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FriendshipError {
    #[error("Friendship not found: {0}")]
    NotFound(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Cannot send a friend request to yourself")]
    SelfRequest,
    #[error("An active friendship or pending request already exists between {0} and {1}")]
    DuplicateRequest(String, String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid friendship state: {0}")]
    InvalidState(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchedulingError {
    #[error("Event not found: {0}")]
    EventNotFound(String),
    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Event end time must be after start time")]
    InvalidRange,
    #[error("Event time overlaps with another event owned by {0}")]
    OverlappingEvent(String),
    #[error("Cannot book your own event: {0}")]
    SelfBooking(String),
    #[error("Event already has an active booking: {0}")]
    EventUnavailable(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid appointment state: {status}")]
    InvalidState { status: AppointmentStatus },
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum VisibilityError {
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
