// Tables owned by the managed backend. The schema is fixed externally; this
// module only names what the application reads and writes.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Doctors,
    Patients,
    Appointments,
    PatientProfiles,
    PatientAppointments,
    VeterinaryDoctors,
    AnimalHealthRecords,
    VetAppointments,
    UserRoles,
}

impl Table {
    #[cfg(test)]
    pub const ALL: [Table; 9] = [
        Table::Doctors,
        Table::Patients,
        Table::Appointments,
        Table::PatientProfiles,
        Table::PatientAppointments,
        Table::VeterinaryDoctors,
        Table::AnimalHealthRecords,
        Table::VetAppointments,
        Table::UserRoles,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Table::Doctors => "doctors",
            Table::Patients => "patients",
            Table::Appointments => "appointments",
            Table::PatientProfiles => "patient_profiles",
            Table::PatientAppointments => "patient_appointments",
            Table::VeterinaryDoctors => "veterinary_doctors",
            Table::AnimalHealthRecords => "animal_health_records",
            Table::VetAppointments => "vet_appointments",
            Table::UserRoles => "user_roles",
        }
    }

    /// Columns that tie a row to an identity. A caller may touch a row when one
    /// of these equals its id; tables with no owner columns are readable by any
    /// signed-in identity.
    pub const fn owner_columns(self) -> &'static [&'static str] {
        match self {
            Table::Doctors => &["id"],
            Table::Patients => &["doctor_id"],
            Table::Appointments => &["doctor_id"],
            Table::PatientProfiles => &["id"],
            Table::PatientAppointments => &["patient_id", "doctor_id"],
            Table::VeterinaryDoctors => &[],
            Table::AnimalHealthRecords => &["patient_id"],
            Table::VetAppointments => &["patient_id"],
            Table::UserRoles => &["user_id"],
        }
    }

    /// Whether rows may be read without an owner match.
    pub const fn publicly_readable(self) -> bool {
        matches!(self, Table::Doctors | Table::VeterinaryDoctors)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A foreign key from `from.column` to `to.id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub from: Table,
    pub column: &'static str,
    pub to: Table,
}

pub const RELATIONSHIPS: &[Relationship] = &[
    Relationship { from: Table::AnimalHealthRecords, column: "assigned_vet_id", to: Table::VeterinaryDoctors },
    Relationship { from: Table::Appointments, column: "doctor_id", to: Table::Doctors },
    Relationship { from: Table::Appointments, column: "patient_id", to: Table::Patients },
    Relationship { from: Table::Patients, column: "doctor_id", to: Table::Doctors },
    Relationship { from: Table::PatientAppointments, column: "doctor_id", to: Table::Doctors },
    Relationship { from: Table::PatientAppointments, column: "patient_id", to: Table::PatientProfiles },
    Relationship { from: Table::VetAppointments, column: "animal_id", to: Table::AnimalHealthRecords },
    Relationship { from: Table::VetAppointments, column: "vet_id", to: Table::VeterinaryDoctors },
];

pub fn relationship(from: Table, to: Table) -> Option<&'static Relationship> {
    RELATIONSHIPS.iter().find(|r| r.from == from && r.to == to)
}
