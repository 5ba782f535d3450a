use std::collections::HashMap;

use chrono::Utc;

use crate::domain::{Appointment, AppointmentStatus};
use crate::error::SchedulingError;

/// In-memory appointment store with the exclusive-slot index. `active` maps
/// an event id to its single Pending or Booked appointment; every transition
/// that frees or claims a slot goes through this struct, keeping the index
/// and the records in step.
pub struct AppointmentBook {
    appointments: HashMap<String, Appointment>,
    order: Vec<String>,
    active: HashMap<String, String>,
    next_id: u64,
}

impl Default for AppointmentBook {
    fn default() -> Self {
        Self::new()
    }
}

impl AppointmentBook {
    pub fn new() -> Self {
        Self {
            appointments: HashMap::new(),
            order: Vec::new(),
            active: HashMap::new(),
            next_id: 1,
        }
    }

    /// True when an appointment currently occupies the event's slot.
    pub fn is_event_active(&self, event_id: &str) -> bool {
        self.active.contains_key(event_id)
    }

    /// Creates a Pending appointment, claiming the event's booking slot.
    /// Fails with `EventUnavailable` when the slot is already held.
    pub fn book(&mut self, event_id: &str, booker_id: &str) -> Result<Appointment, SchedulingError> {
        if self.active.contains_key(event_id) {
            return Err(SchedulingError::EventUnavailable(event_id.to_string()));
        }

        let id = format!("appointment_{}", self.next_id);
        self.next_id += 1;

        let appointment = Appointment {
            id: id.clone(),
            event_id: event_id.to_string(),
            booked_by: booker_id.to_string(),
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
        };
        self.active.insert(event_id.to_string(), id.clone());
        self.appointments.insert(id.clone(), appointment.clone());
        self.order.push(id);
        Ok(appointment)
    }

    pub fn get(&self, id: &str) -> Option<&Appointment> {
        self.appointments.get(id)
    }

    /// Pending -> Booked. The slot stays claimed. Ownership of the event has
    /// already been authorized by the caller.
    pub fn approve(&mut self, appointment_id: &str) -> Result<Appointment, SchedulingError> {
        let appt = self.pending_mut(appointment_id)?;
        appt.status = AppointmentStatus::Booked;
        Ok(appt.clone())
    }

    /// Pending -> Rejected, freeing the slot.
    pub fn reject(&mut self, appointment_id: &str) -> Result<Appointment, SchedulingError> {
        let appt = self.pending_mut(appointment_id)?;
        appt.status = AppointmentStatus::Rejected;
        let snapshot = appt.clone();
        self.release(&snapshot.event_id, appointment_id);
        Ok(snapshot)
    }

    /// Pending or Booked -> Cancelled, freeing the slot. The booker's
    /// identity has already been authorized by the caller.
    pub fn cancel(&mut self, appointment_id: &str) -> Result<Appointment, SchedulingError> {
        let appt = self
            .appointments
            .get_mut(appointment_id)
            .ok_or_else(|| SchedulingError::AppointmentNotFound(appointment_id.to_string()))?;

        if !appt.status.is_active() {
            return Err(SchedulingError::InvalidState {
                status: appt.status,
            });
        }

        appt.status = AppointmentStatus::Cancelled;
        let snapshot = appt.clone();
        self.release(&snapshot.event_id, appointment_id);
        Ok(snapshot)
    }

    /// Every appointment booked by the user, any status, insertion order.
    pub fn list_by_user(&self, user_id: &str) -> Vec<Appointment> {
        self.order
            .iter()
            .filter_map(|id| self.appointments.get(id))
            .filter(|a| a.booked_by == user_id)
            .cloned()
            .collect()
    }

    /// Pending appointments on the given events, insertion order.
    pub fn list_pending_on(&self, event_ids: &[String]) -> Vec<Appointment> {
        self.order
            .iter()
            .filter_map(|id| self.appointments.get(id))
            .filter(|a| {
                a.status == AppointmentStatus::Pending && event_ids.contains(&a.event_id)
            })
            .cloned()
            .collect()
    }

    /// Active appointments on one event; the exclusivity invariant says this
    /// never exceeds 1.
    pub fn active_count_on(&self, event_id: &str) -> usize {
        self.appointments
            .values()
            .filter(|a| a.event_id == event_id && a.status.is_active())
            .count()
    }

    fn pending_mut(&mut self, appointment_id: &str) -> Result<&mut Appointment, SchedulingError> {
        let appt = self
            .appointments
            .get_mut(appointment_id)
            .ok_or_else(|| SchedulingError::AppointmentNotFound(appointment_id.to_string()))?;

        if appt.status != AppointmentStatus::Pending {
            return Err(SchedulingError::InvalidState {
                status: appt.status,
            });
        }
        Ok(appt)
    }

    fn release(&mut self, event_id: &str, appointment_id: &str) {
        // clear the index only while it still points at this appointment
        if self.active.get(event_id).map(String::as_str) == Some(appointment_id) {
            self.active.remove(event_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_slot_is_exclusive() {
        let mut book = AppointmentBook::new();
        book.book("event_1", "user_2").unwrap();

        let err = book.book("event_1", "user_3").unwrap_err();
        assert_eq!(err, SchedulingError::EventUnavailable("event_1".to_string()));
        assert_eq!(book.active_count_on("event_1"), 1);

        // a different event is unaffected
        book.book("event_2", "user_3").unwrap();
    }

    #[test]
    fn cancel_frees_the_slot_for_a_new_booking() {
        let mut book = AppointmentBook::new();
        let appt = book.book("event_1", "user_2").unwrap();

        let cancelled = book.cancel(&appt.id).unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert!(!book.is_event_active("event_1"));

        let again = book.book("event_1", "user_3").unwrap();
        assert_ne!(again.id, appt.id);
        assert_eq!(book.active_count_on("event_1"), 1);
    }

    #[test]
    fn approve_keeps_the_slot_reject_frees_it() {
        let mut book = AppointmentBook::new();
        let a = book.book("event_1", "user_2").unwrap();
        let booked = book.approve(&a.id).unwrap();
        assert_eq!(booked.status, AppointmentStatus::Booked);
        assert!(book.is_event_active("event_1"));

        let b = book.book("event_2", "user_2").unwrap();
        let rejected = book.reject(&b.id).unwrap();
        assert_eq!(rejected.status, AppointmentStatus::Rejected);
        assert!(!book.is_event_active("event_2"));
    }

    #[test]
    fn approve_and_reject_require_pending() {
        let mut book = AppointmentBook::new();
        let a = book.book("event_1", "user_2").unwrap();
        book.approve(&a.id).unwrap();

        // Booked can be cancelled but not re-approved or rejected
        assert!(matches!(
            book.approve(&a.id).unwrap_err(),
            SchedulingError::InvalidState {
                status: AppointmentStatus::Booked
            }
        ));
        assert!(matches!(
            book.reject(&a.id).unwrap_err(),
            SchedulingError::InvalidState {
                status: AppointmentStatus::Booked
            }
        ));
        book.cancel(&a.id).unwrap();
    }

    #[test]
    fn terminal_appointments_are_immutable() {
        let mut book = AppointmentBook::new();
        let a = book.book("event_1", "user_2").unwrap();
        book.cancel(&a.id).unwrap();

        for result in [
            book.approve(&a.id),
            book.reject(&a.id),
            book.cancel(&a.id),
        ] {
            assert!(matches!(
                result.unwrap_err(),
                SchedulingError::InvalidState {
                    status: AppointmentStatus::Cancelled
                }
            ));
        }
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut book = AppointmentBook::new();
        assert_eq!(
            book.cancel("appointment_9").unwrap_err(),
            SchedulingError::AppointmentNotFound("appointment_9".to_string())
        );
    }

    #[test]
    fn listings_keep_insertion_order() {
        let mut book = AppointmentBook::new();
        let a = book.book("event_1", "user_2").unwrap();
        let b = book.book("event_2", "user_2").unwrap();
        book.book("event_3", "user_5").unwrap();
        book.cancel(&a.id).unwrap();

        // any status, insertion order
        let mine = book.list_by_user("user_2");
        assert_eq!(
            mine.iter().map(|x| x.id.as_str()).collect::<Vec<_>>(),
            vec![a.id.as_str(), b.id.as_str()]
        );

        let pending = book.list_pending_on(&["event_1".to_string(), "event_2".to_string()]);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b.id);
    }
}
