use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient's own profile (`patient_profiles`); the id is the identity id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientProfile {
    pub id: Uuid,
    pub full_name: String,
    pub age: i32,
    pub gender: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub allergies: Option<Vec<String>>,
    #[serde(default)]
    pub current_medications: Option<Vec<String>>,
    #[serde(default)]
    pub medical_history: Option<Vec<String>>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub emergency_contact_phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Self-service edit of a patient profile.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientProfilePatch {
    pub full_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub blood_group: Option<String>,
    pub allergies: Vec<String>,
    pub current_medications: Vec<String>,
    pub medical_history: Vec<String>,
}
