use std::collections::HashMap;

use crate::domain::{Event, EventCreate};
use crate::error::SchedulingError;

/// In-memory event store. Owns event records and their creation-time
/// validation. Availability is not kept here: it derives from the
/// appointment book's active index at read time.
pub struct EventRegistry {
    events: HashMap<String, Event>,
    order: Vec<String>,
    next_id: u64,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    /// Validates the time range and the owner's calendar, then stores the
    /// event. Events touching only at an endpoint do not overlap.
    pub fn create(&mut self, payload: EventCreate) -> Result<Event, SchedulingError> {
        if payload.end_time <= payload.start_time {
            return Err(SchedulingError::InvalidRange);
        }
        let clash = self.events.values().any(|e| {
            e.owner_id == payload.owner_id && e.overlaps(payload.start_time, payload.end_time)
        });
        if clash {
            return Err(SchedulingError::OverlappingEvent(payload.owner_id));
        }

        let id = format!("event_{}", self.next_id);
        self.next_id += 1;

        let event = Event {
            id: id.clone(),
            owner_id: payload.owner_id,
            start_time: payload.start_time,
            end_time: payload.end_time,
            is_public: payload.is_public,
            description: payload.description,
        };
        self.events.insert(id.clone(), event.clone());
        self.order.push(id);
        Ok(event)
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn is_owned_by(&self, event_id: &str, user_id: &str) -> bool {
        self.get(event_id).map_or(false, |e| e.owner_id == user_id)
    }

    pub fn list_public(&self) -> Vec<Event> {
        self.listed(|e| e.is_public)
    }

    pub fn list_by_owner(&self, owner_id: &str) -> Vec<Event> {
        self.listed(|e| e.owner_id == owner_id)
    }

    /// The gate-failed path of `list_events_by_owner`: private rows are never
    /// touched, not fetched-then-filtered.
    pub fn list_public_by_owner(&self, owner_id: &str) -> Vec<Event> {
        self.listed(|e| e.is_public && e.owner_id == owner_id)
    }

    fn listed(&self, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        self.order
            .iter()
            .filter_map(|id| self.events.get(id))
            .filter(|e| keep(e))
            .cloned()
            .collect()
    }
}
