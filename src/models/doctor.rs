use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A `doctors` row. The id is the doctor's identity id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub medical_license: String,
    pub specialization: String,
    #[serde(default)]
    pub experience_years: i32,
    #[serde(default)]
    pub consultation_fee: f64,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// Name used in greetings: the last word of the full name.
    pub fn short_name(&self) -> &str {
        short_name(&self.full_name)
    }
}

pub fn short_name(full_name: &str) -> &str {
    full_name.split_whitespace().last().unwrap_or("Doctor")
}

/// Doctor columns embedded into appointment rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorSummary {
    pub full_name: String,
    pub specialization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,
}

/// Fields a doctor may change on their own profile.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DoctorProfilePatch {
    pub full_name: String,
    pub specialization: String,
    pub experience_years: i32,
    pub consultation_fee: f64,
    pub languages: Vec<String>,
}

pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good Morning"
    } else if hour < 17 {
        "Good Afternoon"
    } else {
        "Good Evening"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_name_is_last_word() {
        assert_eq!(short_name("Dr. Anjali Mehta"), "Mehta");
        assert_eq!(short_name("Mehta"), "Mehta");
        assert_eq!(short_name("   "), "Doctor");
    }

    #[test]
    fn greeting_boundaries() {
        assert_eq!(greeting(0), "Good Morning");
        assert_eq!(greeting(11), "Good Morning");
        assert_eq!(greeting(12), "Good Afternoon");
        assert_eq!(greeting(16), "Good Afternoon");
        assert_eq!(greeting(17), "Good Evening");
        assert_eq!(greeting(23), "Good Evening");
    }

    #[test]
    fn row_with_defaults_deserializes() {
        let doctor: Doctor = serde_json::from_value(json!({
            "id": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "full_name": "Dr. Anjali Mehta",
            "medical_license": "MH-12345-2018",
            "specialization": "General Medicine",
            "created_at": "2024-03-01T10:00:00.123456+00:00",
            "updated_at": "2024-03-01T10:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(doctor.short_name(), "Mehta");
        assert!(doctor.languages.is_empty());
        assert!(!doctor.verified);
    }
}
