//! Routes, the role-specific sidebar and route guarding.

use serde::Serialize;

use crate::models::Role;
use crate::session::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Auth,
    Dashboard,
    Patients,
    Schedule,
    Profile,
    PatientDashboard,
    PatientAppointments,
    PatientRecords,
    PatientProfile,
    VeterinaryAppointments,
    AnimalRecords,
    VeterinaryEmergency,
    VeterinaryKnowledge,
    NotFound,
}

impl AppRoute {
    pub const ALL: [AppRoute; 14] = [
        AppRoute::Auth,
        AppRoute::Dashboard,
        AppRoute::Patients,
        AppRoute::Schedule,
        AppRoute::Profile,
        AppRoute::PatientDashboard,
        AppRoute::PatientAppointments,
        AppRoute::PatientRecords,
        AppRoute::PatientProfile,
        AppRoute::VeterinaryAppointments,
        AppRoute::AnimalRecords,
        AppRoute::VeterinaryEmergency,
        AppRoute::VeterinaryKnowledge,
        AppRoute::NotFound,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            AppRoute::Auth => "/",
            AppRoute::Dashboard => "/dashboard",
            AppRoute::Patients => "/patients",
            AppRoute::Schedule => "/schedule",
            AppRoute::Profile => "/profile",
            AppRoute::PatientDashboard => "/patient-dashboard",
            AppRoute::PatientAppointments => "/patient-appointments",
            AppRoute::PatientRecords => "/patient-records",
            AppRoute::PatientProfile => "/patient-profile",
            AppRoute::VeterinaryAppointments => "/veterinary-appointments",
            AppRoute::AnimalRecords => "/animal-records",
            AppRoute::VeterinaryEmergency => "/veterinary-emergency",
            AppRoute::VeterinaryKnowledge => "/veterinary-knowledge",
            AppRoute::NotFound => "*",
        }
    }

    /// `None` for routes anyone may open.
    pub const fn required_role(self) -> Option<Role> {
        match self {
            AppRoute::Auth | AppRoute::NotFound => None,
            AppRoute::Dashboard | AppRoute::Patients | AppRoute::Schedule | AppRoute::Profile => {
                Some(Role::Doctor)
            }
            _ => Some(Role::Patient),
        }
    }

    /// Resolves a request path by its first segment, so `/patients/<id>`
    /// belongs to [`AppRoute::Patients`].
    pub fn from_path(path: &str) -> AppRoute {
        let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
        AppRoute::ALL
            .into_iter()
            .filter(|r| *r != AppRoute::NotFound)
            .find(|r| r.path().trim_start_matches('/') == first)
            .unwrap_or(AppRoute::NotFound)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    pub label: &'static str,
    pub items: Vec<MenuItem>,
}

fn group(label: &'static str, routes: &[(&'static str, AppRoute)]) -> MenuGroup {
    MenuGroup {
        label,
        items: routes
            .iter()
            .map(|&(title, route)| MenuItem { title, url: route.path() })
            .collect(),
    }
}

pub fn menu_for(role: Option<Role>) -> Vec<MenuGroup> {
    match role {
        Some(Role::Doctor) => vec![group(
            "Doctor Portal",
            &[
                ("Dashboard", AppRoute::Dashboard),
                ("Patients", AppRoute::Patients),
                ("Schedule", AppRoute::Schedule),
                ("Profile", AppRoute::Profile),
            ],
        )],
        Some(Role::Patient) => vec![
            group(
                "Patient Portal",
                &[
                    ("Dashboard", AppRoute::PatientDashboard),
                    ("Appointments", AppRoute::PatientAppointments),
                    ("Medical Records", AppRoute::PatientRecords),
                    ("Profile", AppRoute::PatientProfile),
                ],
            ),
            group(
                "Veterinary Services",
                &[
                    ("Vet Appointments", AppRoute::VeterinaryAppointments),
                    ("Animal Records", AppRoute::AnimalRecords),
                    ("Emergency Help", AppRoute::VeterinaryEmergency),
                    ("Knowledge Corner", AppRoute::VeterinaryKnowledge),
                ],
            ),
        ],
        None => Vec::new(),
    }
}

pub const fn home_for(role: Role) -> &'static str {
    match role {
        Role::Doctor => AppRoute::Dashboard.path(),
        Role::Patient => AppRoute::PatientDashboard.path(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// No usable session; send to `/`.
    SignIn,
    /// Signed in under another role; send to that role's home.
    RedirectHome(&'static str),
}

pub fn guard(route: AppRoute, session: Option<&SessionContext>) -> Access {
    match route.required_role() {
        None => Access::Allow,
        Some(required) => guard_role(required, session),
    }
}

pub fn guard_role(required: Role, session: Option<&SessionContext>) -> Access {
    match session.and_then(|s| s.identity.role) {
        None => Access::SignIn,
        Some(role) if role == required => Access::Allow,
        Some(role) => Access::RedirectHome(home_for(role)),
    }
}
