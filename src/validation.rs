//! Form schemas.
//!
//! Each `*Form` is the raw submission as it arrives from the client: every field
//! optional and loosely typed (numbers may arrive as strings and vice versa).
//! `validate()` checks the form and returns the typed value the handlers write to
//! the backend. Only the first failing rule per field is reported.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::appointment::{AppointmentStatus, ConsultationPatch};
use crate::models::doctor::DoctorProfilePatch;
use crate::models::patient::{NewPatient, PatientPatch, STATUS_ACTIVE};
use crate::models::profile::PatientProfilePatch;
use crate::models::veterinary::AnimalRecordFields;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

/// Field name to message, one entry per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` unless `field` already has an error.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn check(&mut self, field: &'static str, ok: bool, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[cfg(test)]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

/// A submitted text field. Numbers and booleans are accepted and kept in their
/// JSON text form; `null` and absent fields become empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text(String);

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(Text(match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        }))
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text(s.to_string())
    }
}

impl Text {
    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn trimmed(&self) -> &str {
        self.0.trim()
    }

    /// Trimmed value, or `None` when blank.
    pub fn optional(&self) -> Option<String> {
        let t = self.trimmed();
        (!t.is_empty()).then(|| t.to_string())
    }
}

fn chars(s: &str) -> usize {
    s.chars().count()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Coerces a numeric field: blank reads as 0, fractions are rejected.
fn whole_number(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &Text,
    min: (i64, &str),
    max: Option<(i64, &str)>,
) -> Option<i32> {
    let text = raw.trimmed();
    let number = if text.is_empty() {
        0.0
    } else {
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => {
                errors.add(field, "Expected a number");
                return None;
            }
        }
    };
    if number < min.0 as f64 {
        errors.add(field, min.1);
        return None;
    }
    if let Some((limit, message)) = max {
        if number > limit as f64 {
            errors.add(field, message);
            return None;
        }
    }
    if number.fract() != 0.0 {
        errors.add(field, "Must be a whole number");
        return None;
    }
    Some(number as i32)
}

fn required_date(errors: &mut ValidationErrors, field: &'static str, raw: &Text) -> Option<NaiveDate> {
    let text = raw.trimmed();
    if text.is_empty() {
        errors.add(field, "Date is required");
        return None;
    }
    parse_date(text).or_else(|| {
        errors.add(field, "Date must be YYYY-MM-DD");
        None
    })
}

fn optional_date(errors: &mut ValidationErrors, field: &'static str, raw: &Text) -> Option<NaiveDate> {
    let text = raw.trimmed();
    if text.is_empty() {
        return None;
    }
    parse_date(text).or_else(|| {
        errors.add(field, "Date must be YYYY-MM-DD");
        None
    })
}

fn required_time(errors: &mut ValidationErrors, field: &'static str, raw: &Text) -> Option<NaiveTime> {
    let text = raw.trimmed();
    if text.is_empty() {
        errors.add(field, "Time is required");
        return None;
    }
    parse_time(text).or_else(|| {
        errors.add(field, "Time must be HH:MM");
        None
    })
}

fn required_id(errors: &mut ValidationErrors, field: &'static str, raw: &Text, missing: &str) -> Option<Uuid> {
    let text = raw.trimmed();
    if text.is_empty() {
        errors.add(field, missing);
        return None;
    }
    Uuid::parse_str(text).ok().or_else(|| {
        errors.add(field, "Invalid selection");
        None
    })
}

fn max_chars(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize, message: &str) {
    errors.check(field, chars(value) <= max, message);
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    errors.check("email", is_valid_email(email), "Invalid email address");
}

fn check_password(errors: &mut ValidationErrors, password: &str) {
    errors.check(
        "password",
        chars(password) >= MIN_PASSWORD_LEN,
        "Password must be at least 6 characters",
    );
}

// ─── Authentication ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignInForm {
    pub email: Text,
    pub password: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = self.email.trimmed();
        check_email(&mut errors, email);
        check_password(&mut errors, self.password.raw());
        errors.finish(|| Credentials {
            email: email.to_string(),
            password: self.password.raw().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DoctorSignUpForm {
    pub email: Text,
    pub password: Text,
    pub full_name: Text,
    pub medical_license: Text,
    pub specialization: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorSignUp {
    pub credentials: Credentials,
    pub full_name: String,
    pub medical_license: String,
    pub specialization: String,
}

impl DoctorSignUpForm {
    pub fn validate(&self) -> Result<DoctorSignUp, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = self.email.trimmed();
        check_email(&mut errors, email);
        check_password(&mut errors, self.password.raw());
        let full_name = self.full_name.trimmed();
        errors.check("full_name", chars(full_name) >= 2, "Full name is required");
        let license = self.medical_license.trimmed();
        errors.check("medical_license", chars(license) >= 5, "Medical license is required");
        let specialization = self.specialization.trimmed();
        errors.check("specialization", chars(specialization) >= 2, "Specialization is required");
        errors.finish(|| DoctorSignUp {
            credentials: Credentials {
                email: email.to_string(),
                password: self.password.raw().to_string(),
            },
            full_name: full_name.to_string(),
            medical_license: license.to_string(),
            specialization: specialization.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientSignUpForm {
    pub email: Text,
    pub password: Text,
    pub full_name: Text,
    pub age: Text,
    pub gender: Text,
    pub phone: Text,
    pub address: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientSignUp {
    pub credentials: Credentials,
    pub full_name: String,
    pub age: i32,
    pub gender: String,
    pub phone: String,
    pub address: Option<String>,
}

impl PatientSignUpForm {
    pub fn validate(&self) -> Result<PatientSignUp, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = self.email.trimmed();
        check_email(&mut errors, email);
        check_password(&mut errors, self.password.raw());
        let full_name = self.full_name.trimmed();
        errors.check("full_name", chars(full_name) >= 2, "Full name is required");
        let age = whole_number(
            &mut errors,
            "age",
            &self.age,
            (1, "Age must be at least 1"),
            Some((150, "Age must be valid")),
        );
        let gender = self.gender.trimmed();
        errors.check("gender", GENDERS.contains(&gender), "Please select a gender");
        let phone = self.phone.trimmed();
        errors.check("phone", chars(phone) >= 10, "Phone number must be at least 10 digits");
        errors.finish(|| PatientSignUp {
            credentials: Credentials {
                email: email.to_string(),
                password: self.password.raw().to_string(),
            },
            full_name: full_name.to_string(),
            age: age.unwrap_or_default(),
            gender: gender.to_string(),
            phone: phone.to_string(),
            address: self.address.optional(),
        })
    }
}

// ─── Doctor side ─────────────────────────────────────────────────────────────

/// The clinical record form, used for both create and edit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub full_name: Text,
    pub age: Text,
    pub gender: Text,
    pub phone: Text,
    pub village: Text,
    pub conditions: Text,
    pub notes: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientDraft {
    pub full_name: String,
    pub age: i32,
    pub gender: String,
    pub phone: String,
    pub village: String,
    pub conditions: Vec<String>,
    pub notes: Option<String>,
}

impl PatientForm {
    pub fn validate(&self) -> Result<PatientDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let full_name = self.full_name.trimmed();
        errors.check("full_name", chars(full_name) >= 2, "Name must be at least 2 characters");
        max_chars(&mut errors, "full_name", full_name, 100, "Name must be less than 100 characters");

        let age = whole_number(
            &mut errors,
            "age",
            &self.age,
            (1, "Age must be at least 1"),
            Some((150, "Age must be valid")),
        );

        let gender = self.gender.raw();
        errors.check("gender", !gender.is_empty(), "Please select a gender");

        let phone = self.phone.trimmed();
        errors.check("phone", chars(phone) >= 10, "Phone number must be at least 10 digits");
        max_chars(&mut errors, "phone", phone, 15, "Phone number must be less than 15 digits");

        let village = self.village.trimmed();
        errors.check("village", chars(village) >= 2, "Village name is required");
        max_chars(&mut errors, "village", village, 100, "Village name must be less than 100 characters");

        let conditions = self.conditions.trimmed();
        max_chars(&mut errors, "conditions", conditions, 500, "Conditions must be less than 500 characters");

        let notes = self.notes.trimmed();
        max_chars(&mut errors, "notes", notes, 2000, "Notes must be less than 2000 characters");

        errors.finish(|| PatientDraft {
            full_name: full_name.to_string(),
            age: age.unwrap_or_default(),
            gender: gender.to_string(),
            phone: phone.to_string(),
            village: village.to_string(),
            conditions: split_list(conditions),
            notes: self.notes.optional(),
        })
    }
}

impl PatientDraft {
    pub fn into_new_patient(self, doctor_id: Uuid) -> NewPatient {
        NewPatient {
            doctor_id,
            full_name: self.full_name,
            age: self.age,
            gender: self.gender,
            phone: self.phone,
            village: self.village,
            conditions: self.conditions,
            notes: self.notes,
            status: STATUS_ACTIVE.to_string(),
            total_visits: 0,
        }
    }

    pub fn into_patch(self) -> PatientPatch {
        PatientPatch {
            full_name: self.full_name,
            age: self.age,
            gender: self.gender,
            phone: self.phone,
            village: self.village,
            conditions: self.conditions,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DoctorProfileForm {
    pub full_name: Text,
    pub specialization: Text,
    pub experience_years: Text,
    pub consultation_fee: Text,
    pub languages: Text,
}

impl DoctorProfileForm {
    pub fn validate(&self) -> Result<DoctorProfilePatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let full_name = self.full_name.trimmed();
        errors.check("full_name", chars(full_name) >= 2, "Full name is required");
        let specialization = self.specialization.trimmed();
        errors.check("specialization", chars(specialization) >= 2, "Specialization is required");
        let experience = whole_number(
            &mut errors,
            "experience_years",
            &self.experience_years,
            (0, "Experience cannot be negative"),
            Some((70, "Experience must be valid")),
        );
        let fee_text = self.consultation_fee.trimmed();
        let fee = if fee_text.is_empty() {
            Some(0.0)
        } else {
            match fee_text.parse::<f64>() {
                Ok(f) if f.is_finite() && f >= 0.0 => Some(f),
                Ok(_) => {
                    errors.add("consultation_fee", "Fee cannot be negative");
                    None
                }
                Err(_) => {
                    errors.add("consultation_fee", "Expected a number");
                    None
                }
            }
        };
        errors.finish(|| DoctorProfilePatch {
            full_name: full_name.to_string(),
            specialization: specialization.to_string(),
            experience_years: experience.unwrap_or_default(),
            consultation_fee: fee.unwrap_or_default(),
            languages: split_list(self.languages.raw()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SlotForm {
    pub date: Text,
    pub start_time: Text,
    pub status: Text,
    pub patient_name: Text,
    pub notes: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: AppointmentStatus,
    pub patient_name: Option<String>,
    pub notes: Option<String>,
}

impl SlotForm {
    pub fn validate(&self) -> Result<Slot, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date = required_date(&mut errors, "date", &self.date);
        let start_time = required_time(&mut errors, "start_time", &self.start_time);
        let status = match self.status.optional() {
            None => Some(AppointmentStatus::Blocked),
            Some(raw) => match AppointmentStatus::parse(&raw) {
                Some(s) if s.is_slot_status() => Some(s),
                _ => {
                    errors.add("status", "Status must be available, booked or blocked");
                    None
                }
            },
        };
        max_chars(&mut errors, "patient_name", self.patient_name.trimmed(), 100, "Name must be less than 100 characters");
        max_chars(&mut errors, "notes", self.notes.trimmed(), 2000, "Notes must be less than 2000 characters");
        match (date, start_time, status) {
            (Some(date), Some(start_time), Some(status)) if errors.is_empty() => Ok(Slot {
                date,
                start_time,
                status,
                patient_name: self.patient_name.optional(),
                notes: self.notes.optional(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RescheduleForm {
    pub date: Text,
    pub start_time: Text,
}

impl RescheduleForm {
    pub fn validate(&self) -> Result<(NaiveDate, NaiveTime), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date = required_date(&mut errors, "date", &self.date);
        let start = required_time(&mut errors, "start_time", &self.start_time);
        match (date, start) {
            (Some(d), Some(t)) => Ok((d, t)),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    pub status: Text,
}

impl StatusForm {
    pub fn validate(&self) -> Result<AppointmentStatus, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match AppointmentStatus::parse(self.status.raw()) {
            Some(status) => Ok(status),
            None => {
                errors.add("status", "Unknown status");
                Err(errors)
            }
        }
    }
}

/// Consultation notes. A field left out of the submission is left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConsultationForm {
    pub status: Option<Text>,
    pub diagnosis: Option<Text>,
    pub prescription: Option<Text>,
    pub notes: Option<Text>,
}

impl ConsultationForm {
    pub fn validate(&self) -> Result<ConsultationPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let status = match &self.status {
            None => None,
            Some(raw) => {
                let parsed = AppointmentStatus::parse(raw.raw());
                errors.check("status", parsed.is_some(), "Unknown status");
                parsed
            }
        };
        let mut text = |field: &'static str, value: &Option<Text>| {
            value.as_ref().map(|v| {
                let t = v.trimmed();
                max_chars(&mut errors, field, t, 2000, "Must be less than 2000 characters");
                t.to_string()
            })
        };
        let diagnosis = text("diagnosis", &self.diagnosis);
        let prescription = text("prescription", &self.prescription);
        let notes = text("notes", &self.notes);
        if status.is_none() && diagnosis.is_none() && prescription.is_none() && notes.is_none() {
            errors.add("status", "Nothing to update");
        }
        errors.finish(|| ConsultationPatch {
            status,
            diagnosis,
            prescription,
            notes,
        })
    }
}

// ─── Patient side ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientProfileForm {
    pub full_name: Text,
    pub phone: Text,
    pub address: Text,
    pub emergency_contact: Text,
    pub emergency_contact_phone: Text,
    pub blood_group: Text,
    pub allergies: Text,
    pub current_medications: Text,
    pub medical_history: Text,
}

impl PatientProfileForm {
    pub fn validate(&self) -> Result<PatientProfilePatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let full_name = self.full_name.trimmed();
        errors.check("full_name", chars(full_name) >= 2, "Full name is required");
        let phone = self.phone.trimmed();
        errors.check("phone", chars(phone) >= 10, "Phone number must be at least 10 digits");
        if let Some(emergency) = self.emergency_contact_phone.optional() {
            errors.check(
                "emergency_contact_phone",
                chars(&emergency) >= 10,
                "Phone number must be at least 10 digits",
            );
        }
        errors.finish(|| PatientProfilePatch {
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            address: self.address.optional(),
            emergency_contact: self.emergency_contact.optional(),
            emergency_contact_phone: self.emergency_contact_phone.optional(),
            blood_group: self.blood_group.optional(),
            allergies: split_list(self.allergies.raw()),
            current_medications: split_list(self.current_medications.raw()),
            medical_history: split_list(self.medical_history.raw()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookingForm {
    pub doctor_id: Text,
    pub date: Text,
    pub time: Text,
    pub symptoms: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub symptoms: Option<String>,
}

impl BookingForm {
    pub fn validate(&self) -> Result<Booking, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let doctor_id = required_id(&mut errors, "doctor_id", &self.doctor_id, "Choose a doctor");
        let date = required_date(&mut errors, "date", &self.date);
        let start_time = required_time(&mut errors, "time", &self.time);
        max_chars(&mut errors, "symptoms", self.symptoms.trimmed(), 2000, "Symptoms must be less than 2000 characters");
        match (doctor_id, date, start_time) {
            (Some(doctor_id), Some(date), Some(start_time)) if errors.is_empty() => Ok(Booking {
                doctor_id,
                date,
                start_time,
                symptoms: self.symptoms.optional(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnimalRecordForm {
    pub animal_id: Text,
    pub species: Text,
    pub breed: Text,
    pub age: Text,
    pub last_vaccination: Text,
    pub current_treatment: Text,
    pub notes: Text,
}

impl AnimalRecordForm {
    pub fn validate(&self) -> Result<AnimalRecordFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let animal_id = self.animal_id.trimmed();
        errors.check("animal_id", !animal_id.is_empty(), "Animal ID is required");
        let species = self.species.trimmed();
        errors.check("species", !species.is_empty(), "Species is required");
        let age = match self.age.trimmed() {
            "" => None,
            _ => whole_number(
                &mut errors,
                "age",
                &self.age,
                (0, "Age cannot be negative"),
                Some((100, "Age must be valid")),
            ),
        };
        let last_vaccination = optional_date(&mut errors, "last_vaccination", &self.last_vaccination);
        max_chars(&mut errors, "current_treatment", self.current_treatment.trimmed(), 2000, "Treatment must be less than 2000 characters");
        max_chars(&mut errors, "notes", self.notes.trimmed(), 2000, "Notes must be less than 2000 characters");
        errors.finish(|| AnimalRecordFields {
            animal_id: animal_id.to_string(),
            species: species.to_string(),
            breed: self.breed.optional(),
            age,
            last_vaccination,
            current_treatment: self.current_treatment.optional(),
            notes: self.notes.optional(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VetBookingForm {
    pub vet_id: Text,
    pub animal_id: Text,
    pub appointment_date: Text,
    pub appointment_time: Text,
    pub notes: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VetBooking {
    pub vet_id: Uuid,
    pub animal_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

impl VetBookingForm {
    pub fn validate(&self) -> Result<VetBooking, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let vet_id = required_id(&mut errors, "vet_id", &self.vet_id, "Choose a veterinarian");
        let animal_id = required_id(&mut errors, "animal_id", &self.animal_id, "Choose an animal");
        let date = required_date(&mut errors, "appointment_date", &self.appointment_date);
        let time = required_time(&mut errors, "appointment_time", &self.appointment_time);
        max_chars(&mut errors, "notes", self.notes.trimmed(), 2000, "Notes must be less than 2000 characters");
        match (vet_id, animal_id, date, time) {
            (Some(vet_id), Some(animal_id), Some(date), Some(time)) if errors.is_empty() => Ok(VetBooking {
                vet_id,
                animal_id,
                date,
                time,
                notes: self.notes.optional(),
            }),
            _ => Err(errors),
        }
    }
}
