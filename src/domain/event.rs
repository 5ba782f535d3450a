use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time-bounded event published by its owner. Immutable once created;
/// whether it can still be booked is a derived property, never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub owner_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_public: bool,
    pub description: Option<String>,
}

impl Event {
    /// True when the given range intersects this event's range.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }
}

/// Payload for publishing a new event. Events are public by default.
#[derive(Debug, Clone)]
pub struct EventCreate {
    pub owner_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_public: bool,
    pub description: Option<String>,
}

impl EventCreate {
    pub fn new(
        owner_id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            start_time,
            end_time,
            is_public: true,
            description: None,
        }
    }
}

/// An event annotated with its derived availability: true iff no appointment
/// on the event is currently Pending or Booked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventView {
    pub event: Event,
    pub available: bool,
}
