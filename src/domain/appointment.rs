use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Appointment lifecycle. Appointments start Pending (approval policy) and
/// occupy the event's single booking slot until they reach a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Booked,
    Cancelled,
    Rejected,
    Failed,
}

impl AppointmentStatus {
    /// Active appointments hold the event's booking slot.
    pub fn is_active(self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Booked)
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Booked => "BOOKED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Rejected => "REJECTED",
            AppointmentStatus::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// A booking of an event by a user. The event outlives the appointment;
/// `event_id` is a reference, not ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub event_id: String,
    pub booked_by: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}
