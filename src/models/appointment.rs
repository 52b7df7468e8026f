//! Appointment rows (doctor schedule slots and patient bookings) and their
//! lifecycle rules.
//!
//! Status changes are plain overwrites on the backend; [`AppointmentStatus::can_transition_to`]
//! is the only place the allowed moves are written down. Booking does not look
//! for overlapping slots, so two bookings for the same doctor and time can both
//! succeed.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::doctor::DoctorSummary;

/// Length of one bookable slot.
pub const SLOT_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Booked,
    Completed,
    Cancelled,
    Blocked,
    Available,
}

impl AppointmentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Blocked => "blocked",
            AppointmentStatus::Available => "available",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        use AppointmentStatus::*;
        [Pending, Confirmed, Booked, Completed, Cancelled, Blocked, Available]
            .into_iter()
            .find(|s| s.as_str() == raw.trim())
    }

    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
                | (Available, Blocked)
                | (Available, Booked)
                | (Blocked, Available)
                | (Booked, Completed)
                | (Booked, Cancelled)
        )
    }

    /// Statuses a doctor may give a slot when creating it on the schedule.
    pub fn is_slot_status(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Available | AppointmentStatus::Booked | AppointmentStatus::Blocked
        )
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// End of a slot that starts at `start`. Wraps past midnight.
pub fn slot_end(start: NaiveTime) -> NaiveTime {
    start.overflowing_add_signed(Duration::minutes(SLOT_MINUTES)).0
}

/// `date >= today` and not cancelled.
pub fn is_upcoming(date: NaiveDate, status: AppointmentStatus, today: NaiveDate) -> bool {
    date >= today && status != AppointmentStatus::Cancelled
}

/// `date < today` or completed. Evaluated independently of [`is_upcoming`]: a
/// completed appointment dated today or later satisfies both.
pub fn is_past(date: NaiveDate, status: AppointmentStatus, today: NaiveDate) -> bool {
    date < today || status == AppointmentStatus::Completed
}

/// Action offered next to a schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleAction {
    Block,
    Unblock,
    Reschedule,
}

impl ScheduleAction {
    pub fn for_status(status: AppointmentStatus) -> Option<Self> {
        match status {
            AppointmentStatus::Available => Some(ScheduleAction::Block),
            AppointmentStatus::Booked => Some(ScheduleAction::Reschedule),
            AppointmentStatus::Blocked => Some(ScheduleAction::Unblock),
            _ => None,
        }
    }
}

/// A row of the doctor's own schedule (`appointments`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorAppointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewDoctorAppointment {
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub patient_id: Option<Uuid>,
    pub patient_name: Option<String>,
    pub notes: Option<String>,
}

/// Today's counts on the doctor dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DaySummary {
    pub total_appointments: usize,
    pub completed: usize,
    pub pending: usize,
}

impl DaySummary {
    /// `total` counts booked slots only; `pending` is booked minus completed,
    /// floored at zero.
    pub fn from_rows(rows: &[DoctorAppointment]) -> Self {
        let booked = rows
            .iter()
            .filter(|a| a.status == AppointmentStatus::Booked)
            .count();
        let completed = rows
            .iter()
            .filter(|a| a.status == AppointmentStatus::Completed)
            .count();
        DaySummary {
            total_appointments: booked,
            completed,
            pending: booked.saturating_sub(completed),
        }
    }
}

/// Minimal patient columns embedded into bookings shown to a doctor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientContact {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A booking made by a patient (`patient_appointments`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientAppointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub prescription: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctors: Option<DoctorSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_profiles: Option<PatientContact>,
}

impl PatientAppointment {
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        is_upcoming(self.appointment_date, self.status, today)
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        is_past(self.appointment_date, self.status, today)
    }

    /// Counts as a medical record once a diagnosis or prescription is written.
    pub fn has_clinical_notes(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.diagnosis) || filled(&self.prescription)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewPatientAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub symptoms: Option<String>,
    pub status: AppointmentStatus,
}

/// What a doctor records during or after a consultation. Absent fields are
/// left untouched.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ConsultationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PatientSummary {
    pub upcoming_appointments: usize,
    pub total_appointments: usize,
    pub medical_records: usize,
}

impl PatientSummary {
    pub fn from_rows(rows: &[PatientAppointment], today: NaiveDate) -> Self {
        PatientSummary {
            upcoming_appointments: rows.iter().filter(|a| a.is_upcoming(today)).count(),
            total_appointments: rows.len(),
            medical_records: rows.iter().filter(|a| a.has_clinical_notes()).count(),
        }
    }
}
