//! HTTP surface. Every view re-reads owner-scoped rows from the backend on each
//! request; every mutation answers with a notification and the re-fetched list.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::{Local, NaiveDate, Timelike};
use serde::Serialize;

use crate::backend::Backend;
use crate::error::AppError;
use crate::models::Role;
use crate::nav::{menu_for, MenuGroup};

#[cfg(test)]
macro_rules! test_app {
    ($harness:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($harness.state.clone())
                .app_data($harness.key.clone())
                .configure(crate::handlers::configure::<crate::backend::memory::MemoryBackend>)
                .default_service(actix_web::web::to(crate::handlers::not_found)),
        )
        .await
    };
}

pub mod auth;
pub mod doctor;
pub mod patient;
pub mod veterinary;

pub struct AppState<B> {
    pub backend: B,
    pub secure_cookies: bool,
}

impl<B> AppState<B> {
    pub fn new(backend: B, secure_cookies: bool) -> Self {
        AppState {
            backend,
            secure_cookies,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A one-line message for the user, shown as a toast by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct Page<'a, T> {
    menu: Vec<MenuGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<&'a Notification>,
    #[serde(flatten)]
    view: T,
}

/// A view for a signed-in role, with that role's menu.
pub fn page<T: Serialize>(role: Role, view: T) -> HttpResponse {
    HttpResponse::Ok().json(Page {
        menu: menu_for(Some(role)),
        notification: None,
        view,
    })
}

/// The answer to a successful mutation: a success notification plus the
/// refreshed view.
pub fn outcome<T: Serialize>(status: StatusCode, role: Role, message: &str, view: T) -> HttpResponse {
    let notification = Notification::success(message);
    HttpResponse::build(status).json(Page {
        menu: menu_for(Some(role)),
        notification: Some(&notification),
        view,
    })
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn current_hour() -> u32 {
    Local::now().hour()
}

pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound)
}

pub fn configure<B: Backend + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(auth::index::<B>))
        .service(
            web::scope("/auth")
                .route("/sign-in", web::post().to(auth::sign_in::<B>))
                .route("/sign-up/doctor", web::post().to(auth::sign_up_doctor::<B>))
                .route("/sign-up/patient", web::post().to(auth::sign_up_patient::<B>))
                .route("/sign-out", web::post().to(auth::sign_out::<B>)),
        )
        // Doctor
        .route("/dashboard", web::get().to(doctor::dashboard::<B>))
        .service(
            web::scope("/patients")
                .service(
                    web::resource("")
                        .route(web::get().to(doctor::list_patients::<B>))
                        .route(web::post().to(doctor::create_patient::<B>)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::put().to(doctor::update_patient::<B>))
                        .route(web::delete().to(doctor::delete_patient::<B>)),
                ),
        )
        .service(
            web::scope("/schedule")
                .route("", web::get().to(doctor::schedule::<B>))
                .route("/slots", web::post().to(doctor::create_slot::<B>))
                .route("/consultations", web::get().to(doctor::consultations::<B>))
                .route("/consultations/{id}", web::patch().to(doctor::update_consultation::<B>))
                .route("/{id}/status", web::patch().to(doctor::set_slot_status::<B>))
                .route("/{id}/reschedule", web::patch().to(doctor::reschedule::<B>)),
        )
        .service(
            web::resource("/profile")
                .route(web::get().to(doctor::profile::<B>))
                .route(web::put().to(doctor::update_profile::<B>)),
        )
        // Patient
        .route("/patient-dashboard", web::get().to(patient::dashboard::<B>))
        .service(
            web::resource("/patient-appointments")
                .route(web::get().to(patient::appointments::<B>))
                .route(web::post().to(patient::book_appointment::<B>)),
        )
        .route("/patient-records", web::get().to(patient::records::<B>))
        .service(
            web::resource("/patient-profile")
                .route(web::get().to(patient::profile::<B>))
                .route(web::put().to(patient::update_profile::<B>)),
        )
        // Veterinary
        .service(
            web::resource("/veterinary-appointments")
                .route(web::get().to(veterinary::appointments::<B>))
                .route(web::post().to(veterinary::book_appointment::<B>)),
        )
        .service(
            web::scope("/animal-records")
                .service(
                    web::resource("")
                        .route(web::get().to(veterinary::animal_records::<B>))
                        .route(web::post().to(veterinary::create_animal::<B>)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::put().to(veterinary::update_animal::<B>))
                        .route(web::delete().to(veterinary::delete_animal::<B>)),
                ),
        )
        .route("/veterinary-emergency", web::get().to(veterinary::emergency))
        .route("/veterinary-knowledge", web::get().to(veterinary::knowledge));
}
