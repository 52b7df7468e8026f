use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::appointment::AppointmentStatus;

/// A row of `veterinary_doctors`. Managed outside this application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VeterinaryDoctor {
    pub id: Uuid,
    pub full_name: String,
    pub specialization: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form availability document, passed through untouched.
    #[serde(default)]
    pub available_slots: Option<serde_json::Value>,
    #[serde(default)]
    pub verified: bool,
}

/// An animal owned by a patient (`animal_health_records`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Owner-assigned tag, e.g. "COW-001".
    pub animal_id: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub last_vaccination: Option<NaiveDate>,
    #[serde(default)]
    pub current_treatment: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assigned_vet_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable animal fields. Also the insert payload once `patient_id` is attached.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnimalRecordFields {
    pub animal_id: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub last_vaccination: Option<NaiveDate>,
    pub current_treatment: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAnimalRecord {
    pub patient_id: Uuid,
    #[serde(flatten)]
    pub fields: AnimalRecordFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VetSummary {
    pub full_name: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalSummary {
    pub animal_id: String,
    pub species: String,
}

/// Option list entry for the booking form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalOption {
    pub id: Uuid,
    pub animal_id: String,
    pub species: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VetAppointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub vet_id: Uuid,
    #[serde(default)]
    pub animal_id: Option<Uuid>,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub treatment_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veterinary_doctors: Option<VetSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_health_records: Option<AnimalSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewVetAppointment {
    pub patient_id: Uuid,
    pub vet_id: Uuid,
    pub animal_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}
