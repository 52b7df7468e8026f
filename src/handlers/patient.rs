//! Patient self-service: dashboard, bookings, medical records and profile.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use futures::try_join;
use serde::Serialize;
use tracing::info;

use crate::backend::{fetch_all, fetch_one, insert_row, update_rows, Backend};
use crate::error::AppError;
use crate::handlers::{outcome, page, today, AppState};
use crate::models::appointment::{slot_end, NewPatientAppointment, PatientSummary};
use crate::models::{initials, AppointmentStatus, Doctor, PatientAppointment, PatientProfile, Role};
use crate::query::Query;
use crate::schema::Table;
use crate::session::{PatientSession, SessionContext};
use crate::validation::{BookingForm, PatientProfileForm};

/// How many bookings the dashboard lists.
const RECENT_LIMIT: usize = 3;

fn own_appointments(session: &SessionContext, doctor_columns: &[&'static str]) -> Query {
    Query::from(Table::PatientAppointments)
        .embed(Table::Doctors, doctor_columns)
        .eq("patient_id", session.user_id())
}

#[derive(Serialize)]
struct DashboardView<'a> {
    date: NaiveDate,
    stats: PatientSummary,
    recent_appointments: &'a [PatientAppointment],
}

pub async fn dashboard<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
) -> Result<HttpResponse, AppError> {
    let query = own_appointments(&session, &["full_name", "specialization"]).order("appointment_date", true);
    let rows: Vec<PatientAppointment> = fetch_all(&state.backend, session.token(), &query)
        .await
        .map_err(AppError::failed("load appointments"))?;
    let date = today();
    Ok(page(
        Role::Patient,
        DashboardView {
            date,
            stats: PatientSummary::from_rows(&rows, date),
            recent_appointments: &rows[..rows.len().min(RECENT_LIMIT)],
        },
    ))
}

// ─── Appointments ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AppointmentsView<'a> {
    today: NaiveDate,
    upcoming: Vec<&'a PatientAppointment>,
    past: Vec<&'a PatientAppointment>,
    doctors: &'a [Doctor],
}

/// Both lists are filtered independently, so one row can land in each.
fn appointments_view<'a>(today: NaiveDate, rows: &'a [PatientAppointment], doctors: &'a [Doctor]) -> AppointmentsView<'a> {
    AppointmentsView {
        today,
        upcoming: rows.iter().filter(|a| a.is_upcoming(today)).collect(),
        past: rows.iter().filter(|a| a.is_past(today)).collect(),
        doctors,
    }
}

async fn load_appointments<B: Backend>(
    backend: &B,
    session: &SessionContext,
) -> Result<(Vec<PatientAppointment>, Vec<Doctor>), AppError> {
    let bookings = own_appointments(session, &["full_name", "specialization", "consultation_fee"])
        .order("appointment_date", true);
    let doctors = Query::from(Table::Doctors).eq("verified", true);
    try_join!(
        fetch_all::<PatientAppointment, B>(backend, session.token(), &bookings),
        fetch_all::<Doctor, B>(backend, session.token(), &doctors),
    )
    .map_err(AppError::failed("load appointments"))
}

pub async fn appointments<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
) -> Result<HttpResponse, AppError> {
    let (rows, doctors) = load_appointments(&state.backend, &session).await?;
    Ok(page(Role::Patient, appointments_view(today(), &rows, &doctors)))
}

/// Books a 30-minute consultation. New bookings always start out pending;
/// overlapping bookings are not detected.
pub async fn book_appointment<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
    form: web::Json<BookingForm>,
) -> Result<HttpResponse, AppError> {
    let booking = form.validate()?;
    let row = NewPatientAppointment {
        patient_id: session.user_id(),
        doctor_id: booking.doctor_id,
        appointment_date: booking.date,
        start_time: booking.start_time,
        end_time: slot_end(booking.start_time),
        symptoms: booking.symptoms,
        status: AppointmentStatus::Pending,
    };
    let created: PatientAppointment = insert_row(&state.backend, session.token(), Table::PatientAppointments, &row)
        .await
        .map_err(AppError::failed("book appointment"))?;
    info!(appointment_id = %created.id, doctor_id = %created.doctor_id, "appointment booked");

    let (rows, doctors) = load_appointments(&state.backend, &session).await?;
    Ok(outcome(
        StatusCode::CREATED,
        Role::Patient,
        "Appointment booked successfully!",
        appointments_view(today(), &rows, &doctors),
    ))
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RecordsView {
    profile: PatientProfile,
    records: Vec<PatientAppointment>,
}

pub async fn records<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
) -> Result<HttpResponse, AppError> {
    let backend = &state.backend;
    let profile = Query::from(Table::PatientProfiles).eq("id", session.user_id());
    let records = own_appointments(&session, &["full_name", "specialization"])
        .not_null("diagnosis")
        .order("appointment_date", false);
    let (profile, records) = try_join!(
        fetch_one::<PatientProfile, B>(backend, session.token(), profile),
        fetch_all::<PatientAppointment, B>(backend, session.token(), &records),
    )
    .map_err(AppError::failed("load medical records"))?;
    Ok(page(Role::Patient, RecordsView { profile, records }))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProfileView<'a> {
    initials: String,
    email: Option<&'a str>,
    profile: PatientProfile,
}

async fn load_profile<'a, B: Backend>(backend: &B, session: &'a SessionContext) -> Result<ProfileView<'a>, AppError> {
    let query = Query::from(Table::PatientProfiles).eq("id", session.user_id());
    let profile: PatientProfile = fetch_one(backend, session.token(), query)
        .await
        .map_err(AppError::failed("load profile"))?;
    Ok(ProfileView {
        initials: initials(&profile.full_name),
        email: session.identity.email.as_deref(),
        profile,
    })
}

pub async fn profile<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
) -> Result<HttpResponse, AppError> {
    let view = load_profile(&state.backend, &session).await?;
    Ok(page(Role::Patient, view))
}

pub async fn update_profile<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
    form: web::Json<PatientProfileForm>,
) -> Result<HttpResponse, AppError> {
    let patch = form.validate()?;
    let query = Query::from(Table::PatientProfiles).eq("id", session.user_id());
    update_rows(&state.backend, session.token(), &query, &patch)
        .await
        .map_err(AppError::failed("update profile"))?;

    let view = load_profile(&state.backend, &session).await?;
    Ok(outcome(StatusCode::OK, Role::Patient, "Profile updated successfully!", view))
}
