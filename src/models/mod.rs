pub mod appointment;
pub mod doctor;
pub mod identity;
pub mod patient;
pub mod profile;
pub mod veterinary;

pub use appointment::{AppointmentStatus, DoctorAppointment, PatientAppointment};
pub use doctor::{Doctor, DoctorSummary};
pub use identity::Role;
pub use patient::Patient;
pub use profile::PatientProfile;
pub use veterinary::{AnimalRecord, VetAppointment, VeterinaryDoctor};

/// Up to two uppercase initials from a display name ("Aman Sharma" -> "AS").
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}
