use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";

/// Conditions that put a patient on the follow-up list.
pub const FOLLOW_UP_CONDITIONS: [&str; 2] = ["Diabetes", "Hypertension"];

/// A clinical record in `patients`, owned by one doctor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub full_name: String,
    pub age: i32,
    pub gender: String,
    pub phone: String,
    pub village: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub total_visits: i32,
    #[serde(default)]
    pub last_visit_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Case-insensitive substring match against name, village and conditions.
    /// An empty term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.full_name.to_lowercase().contains(&term)
            || self.village.to_lowercase().contains(&term)
            || self.conditions.iter().any(|c| c.to_lowercase().contains(&term))
    }

    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    pub fn needs_follow_up(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| FOLLOW_UP_CONDITIONS.contains(&c.as_str()))
    }
}

/// Insert payload for a new clinical record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewPatient {
    pub doctor_id: Uuid,
    pub full_name: String,
    pub age: i32,
    pub gender: String,
    pub phone: String,
    pub village: String,
    pub conditions: Vec<String>,
    pub notes: Option<String>,
    pub status: String,
    pub total_visits: i32,
}

/// Editable fields of an existing record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientPatch {
    pub full_name: String,
    pub age: i32,
    pub gender: String,
    pub phone: String,
    pub village: String,
    pub conditions: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PatientStats {
    pub total: usize,
    pub active: usize,
    pub follow_up: usize,
}

impl PatientStats {
    pub fn from_rows(rows: &[Patient]) -> Self {
        PatientStats {
            total: rows.len(),
            active: rows.iter().filter(|p| p.is_active()).count(),
            follow_up: rows.iter().filter(|p| p.needs_follow_up()).count(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn patient(name: &str, village: &str, conditions: &[&str], status: &str) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            full_name: name.to_string(),
            age: 40,
            gender: "Male".to_string(),
            phone: "9876543210".to_string(),
            village: village.to_string(),
            conditions: conditions.iter().map(|c| c.to_string()).collect(),
            status: status.to_string(),
            total_visits: 0,
            last_visit_date: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rows = vec![
            patient("Aman Sharma", "Nabha", &[], "active"),
            patient("Ravi Kumar", "Patiala", &[], "active"),
        ];
        let hits: Vec<_> = rows.iter().filter(|p| p.matches_search("sharma")).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].full_name, "Aman Sharma");
    }

    #[test]
    fn search_covers_village_and_conditions() {
        let p = patient("Ravi Kumar", "Patiala", &["Hypertension"], "active");
        assert!(p.matches_search("PATI"));
        assert!(p.matches_search("tension"));
        assert!(p.matches_search(""));
        assert!(!p.matches_search("asthma"));
    }

    #[test]
    fn stats_count_active_and_follow_up() {
        let rows = vec![
            patient("A", "X", &["Diabetes"], "active"),
            patient("B", "X", &["Hypertension", "Asthma"], "inactive"),
            patient("C", "X", &["diabetes"], "active"),
        ];
        let stats = PatientStats::from_rows(&rows);
        assert_eq!(stats, PatientStats { total: 3, active: 2, follow_up: 2 });
    }
}
