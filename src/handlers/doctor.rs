//! Doctor views: dashboard, patient records, schedule, consultations and profile.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use futures::try_join;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::backend::{delete_rows, fetch_all, fetch_one, insert_row, update_rows, Backend};
use crate::error::AppError;
use crate::handlers::{current_hour, outcome, page, today, AppState};
use crate::models::appointment::{slot_end, DaySummary, NewDoctorAppointment, ScheduleAction};
use crate::models::doctor::{greeting, short_name};
use crate::models::patient::PatientStats;
use crate::models::{initials, AppointmentStatus, Doctor, DoctorAppointment, Patient, PatientAppointment, Role};
use crate::query::Query;
use crate::schema::Table;
use crate::session::{DoctorSession, SessionContext};
use crate::validation::{
    parse_date, ConsultationForm, DoctorProfileForm, PatientForm, RescheduleForm, SlotForm, StatusForm,
    ValidationErrors,
};

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NameRow {
    full_name: String,
}

#[derive(Serialize)]
struct DashboardStats {
    #[serde(flatten)]
    today: DaySummary,
    total_patients: u64,
}

#[derive(Serialize)]
struct DashboardView {
    greeting: &'static str,
    doctor_name: String,
    date: NaiveDate,
    stats: DashboardStats,
}

pub async fn dashboard<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
) -> Result<HttpResponse, AppError> {
    let backend = &state.backend;
    let token = session.token();
    let date = today();

    let doctor = Query::from(Table::Doctors)
        .columns(&["full_name"])
        .eq("id", session.user_id())
        .limit(1);
    let day = Query::from(Table::Appointments)
        .eq("doctor_id", session.user_id())
        .eq("appointment_date", date);
    let patients = Query::from(Table::Patients).eq("doctor_id", session.user_id());

    let (names, appointments, total_patients) = try_join!(
        fetch_all::<NameRow, B>(backend, token, &doctor),
        fetch_all::<DoctorAppointment, B>(backend, token, &day),
        backend.count(token, &patients),
    )
    .map_err(AppError::failed("load dashboard"))?;

    let doctor_name = names
        .first()
        .map(|n| short_name(&n.full_name))
        .unwrap_or("Doctor")
        .to_string();

    Ok(page(
        Role::Doctor,
        DashboardView {
            greeting: greeting(current_hour()),
            doctor_name,
            date,
            stats: DashboardStats {
                today: DaySummary::from_rows(&appointments),
                total_patients,
            },
        },
    ))
}

// ─── Patients ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Serialize)]
struct PatientRow<'a> {
    #[serde(flatten)]
    patient: &'a Patient,
    initials: String,
}

#[derive(Serialize)]
struct PatientsView<'a> {
    stats: PatientStats,
    search: &'a str,
    patients: Vec<PatientRow<'a>>,
}

/// Stats cover every fetched row; the list shows only search matches.
fn patients_view<'a>(rows: &'a [Patient], search: &'a str) -> PatientsView<'a> {
    PatientsView {
        stats: PatientStats::from_rows(rows),
        search,
        patients: rows
            .iter()
            .filter(|p| p.matches_search(search))
            .map(|patient| PatientRow {
                patient,
                initials: initials(&patient.full_name),
            })
            .collect(),
    }
}

async fn load_patients<B: Backend>(backend: &B, session: &SessionContext) -> Result<Vec<Patient>, AppError> {
    let query = Query::from(Table::Patients)
        .eq("doctor_id", session.user_id())
        .order("last_visit_date", false);
    fetch_all(backend, session.token(), &query)
        .await
        .map_err(AppError::failed("load patients"))
}

fn own_patient(session: &SessionContext, id: Uuid) -> Query {
    Query::from(Table::Patients)
        .eq("id", id)
        .eq("doctor_id", session.user_id())
}

pub async fn list_patients<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let rows = load_patients(&state.backend, &session).await?;
    let search = params.q.as_deref().unwrap_or("");
    Ok(page(Role::Doctor, patients_view(&rows, search)))
}

pub async fn create_patient<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    form: web::Json<PatientForm>,
) -> Result<HttpResponse, AppError> {
    let draft = form.validate()?;
    let row = draft.into_new_patient(session.user_id());
    let created: Patient = insert_row(&state.backend, session.token(), Table::Patients, &row)
        .await
        .map_err(AppError::failed("create patient record"))?;
    info!(doctor_id = %session.user_id(), patient_id = %created.id, "patient record created");

    let rows = load_patients(&state.backend, &session).await?;
    Ok(outcome(
        StatusCode::CREATED,
        Role::Doctor,
        "Patient record created successfully",
        patients_view(&rows, ""),
    ))
}

pub async fn update_patient<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    id: web::Path<Uuid>,
    form: web::Json<PatientForm>,
) -> Result<HttpResponse, AppError> {
    let patch = form.validate()?.into_patch();
    let id = id.into_inner();
    update_rows(&state.backend, session.token(), &own_patient(&session, id), &patch)
        .await
        .map_err(AppError::failed("update patient record"))?;
    info!(patient_id = %id, "patient record updated");

    let rows = load_patients(&state.backend, &session).await?;
    Ok(outcome(
        StatusCode::OK,
        Role::Doctor,
        "Patient record updated successfully",
        patients_view(&rows, ""),
    ))
}

pub async fn delete_patient<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    delete_rows(&state.backend, session.token(), &own_patient(&session, id))
        .await
        .map_err(AppError::failed("delete patient record"))?;
    info!(patient_id = %id, "patient record deleted");

    let rows = load_patients(&state.backend, &session).await?;
    Ok(outcome(
        StatusCode::OK,
        Role::Doctor,
        "Patient record deleted successfully",
        patients_view(&rows, ""),
    ))
}

// ─── Schedule ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DayParams {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Serialize)]
struct ScheduleRow<'a> {
    #[serde(flatten)]
    appointment: &'a DoctorAppointment,
    action: Option<ScheduleAction>,
}

#[derive(Serialize)]
struct ScheduleView<'a> {
    date: NaiveDate,
    label: String,
    previous_date: NaiveDate,
    next_date: NaiveDate,
    appointments: Vec<ScheduleRow<'a>>,
}

fn schedule_view(date: NaiveDate, rows: &[DoctorAppointment]) -> ScheduleView<'_> {
    ScheduleView {
        date,
        label: date.format("%A, %-d %B %Y").to_string(),
        previous_date: date.pred_opt().unwrap_or(date),
        next_date: date.succ_opt().unwrap_or(date),
        appointments: rows
            .iter()
            .map(|appointment| ScheduleRow {
                appointment,
                action: ScheduleAction::for_status(appointment.status),
            })
            .collect(),
    }
}

async fn load_day<B: Backend>(
    backend: &B,
    session: &SessionContext,
    date: NaiveDate,
) -> Result<Vec<DoctorAppointment>, AppError> {
    let query = Query::from(Table::Appointments)
        .eq("doctor_id", session.user_id())
        .eq("appointment_date", date)
        .order("start_time", true);
    fetch_all(backend, session.token(), &query)
        .await
        .map_err(AppError::failed("load schedule"))
}

fn own_slot(session: &SessionContext, id: Uuid) -> Query {
    Query::from(Table::Appointments)
        .eq("id", id)
        .eq("doctor_id", session.user_id())
}

#[derive(Serialize)]
struct StatusPatch {
    status: AppointmentStatus,
}

#[derive(Serialize)]
struct ReschedulePatch {
    appointment_date: NaiveDate,
    start_time: chrono::NaiveTime,
    end_time: chrono::NaiveTime,
}

pub async fn schedule<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    params: web::Query<DayParams>,
) -> Result<HttpResponse, AppError> {
    let date = match params.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        None => today(),
        Some(raw) => parse_date(raw).ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.add("date", "Date must be YYYY-MM-DD");
            AppError::Validation(errors)
        })?,
    };
    let rows = load_day(&state.backend, &session, date).await?;
    Ok(page(Role::Doctor, schedule_view(date, &rows)))
}

pub async fn create_slot<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    form: web::Json<SlotForm>,
) -> Result<HttpResponse, AppError> {
    let slot = form.validate()?;
    let row = NewDoctorAppointment {
        doctor_id: session.user_id(),
        appointment_date: slot.date,
        start_time: slot.start_time,
        end_time: slot_end(slot.start_time),
        status: slot.status,
        patient_id: None,
        patient_name: slot.patient_name,
        notes: slot.notes,
    };
    let created: DoctorAppointment = insert_row(&state.backend, session.token(), Table::Appointments, &row)
        .await
        .map_err(AppError::failed("add time slot"))?;
    info!(appointment_id = %created.id, status = %created.status, "time slot added");

    let rows = load_day(&state.backend, &session, slot.date).await?;
    Ok(outcome(
        StatusCode::CREATED,
        Role::Doctor,
        "Time slot added successfully",
        schedule_view(slot.date, &rows),
    ))
}

pub async fn set_slot_status<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    id: web::Path<Uuid>,
    form: web::Json<StatusForm>,
) -> Result<HttpResponse, AppError> {
    let next = form.validate()?;
    let query = own_slot(&session, id.into_inner());
    let current: DoctorAppointment = fetch_one(&state.backend, session.token(), query.clone())
        .await
        .map_err(AppError::failed("update appointment"))?;
    if !current.status.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: current.status,
            to: next,
        });
    }
    update_rows(&state.backend, session.token(), &query, &StatusPatch { status: next })
        .await
        .map_err(AppError::failed("update appointment"))?;
    info!(appointment_id = %current.id, from = %current.status, to = %next, "slot status changed");

    let message = match next {
        AppointmentStatus::Blocked => "Time slot blocked",
        AppointmentStatus::Available => "Time slot unblocked",
        _ => "Appointment status updated",
    };
    let rows = load_day(&state.backend, &session, current.appointment_date).await?;
    Ok(outcome(
        StatusCode::OK,
        Role::Doctor,
        message,
        schedule_view(current.appointment_date, &rows),
    ))
}

pub async fn reschedule<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    id: web::Path<Uuid>,
    form: web::Json<RescheduleForm>,
) -> Result<HttpResponse, AppError> {
    let (date, start) = form.validate()?;
    let patch = ReschedulePatch {
        appointment_date: date,
        start_time: start,
        end_time: slot_end(start),
    };
    update_rows(&state.backend, session.token(), &own_slot(&session, id.into_inner()), &patch)
        .await
        .map_err(AppError::failed("reschedule appointment"))?;

    let rows = load_day(&state.backend, &session, date).await?;
    Ok(outcome(
        StatusCode::OK,
        Role::Doctor,
        "Appointment rescheduled",
        schedule_view(date, &rows),
    ))
}

// ─── Consultations ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ConsultationsView {
    today: NaiveDate,
    consultations: Vec<PatientAppointment>,
}

async fn load_consultations<B: Backend>(
    backend: &B,
    session: &SessionContext,
) -> Result<ConsultationsView, AppError> {
    let query = Query::from(Table::PatientAppointments)
        .embed(Table::PatientProfiles, &["full_name", "phone"])
        .eq("doctor_id", session.user_id())
        .order("appointment_date", true);
    let consultations = fetch_all(backend, session.token(), &query)
        .await
        .map_err(AppError::failed("load consultations"))?;
    Ok(ConsultationsView {
        today: today(),
        consultations,
    })
}

pub async fn consultations<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
) -> Result<HttpResponse, AppError> {
    let view = load_consultations(&state.backend, &session).await?;
    Ok(page(Role::Doctor, view))
}

pub async fn update_consultation<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    id: web::Path<Uuid>,
    form: web::Json<ConsultationForm>,
) -> Result<HttpResponse, AppError> {
    let patch = form.validate()?;
    let query = Query::from(Table::PatientAppointments)
        .eq("id", id.into_inner())
        .eq("doctor_id", session.user_id());

    if let Some(next) = patch.status {
        let current: PatientAppointment = fetch_one(&state.backend, session.token(), query.clone())
            .await
            .map_err(AppError::failed("update consultation"))?;
        if !current.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: current.status,
                to: next,
            });
        }
    }
    update_rows(&state.backend, session.token(), &query, &patch)
        .await
        .map_err(AppError::failed("update consultation"))?;

    let view = load_consultations(&state.backend, &session).await?;
    Ok(outcome(StatusCode::OK, Role::Doctor, "Consultation updated successfully", view))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProfileView {
    initials: String,
    profile: Doctor,
}

async fn load_profile<B: Backend>(backend: &B, session: &SessionContext) -> Result<ProfileView, AppError> {
    let query = Query::from(Table::Doctors).eq("id", session.user_id());
    let profile: Doctor = fetch_one(backend, session.token(), query)
        .await
        .map_err(AppError::failed("load profile"))?;
    Ok(ProfileView {
        initials: initials(&profile.full_name),
        profile,
    })
}

pub async fn profile<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
) -> Result<HttpResponse, AppError> {
    let view = load_profile(&state.backend, &session).await?;
    Ok(page(Role::Doctor, view))
}

pub async fn update_profile<B: Backend>(
    state: web::Data<AppState<B>>,
    session: DoctorSession,
    form: web::Json<DoctorProfileForm>,
) -> Result<HttpResponse, AppError> {
    let patch = form.validate()?;
    let query = Query::from(Table::Doctors).eq("id", session.user_id());
    update_rows(&state.backend, session.token(), &query, &patch)
        .await
        .map_err(AppError::failed("update profile"))?;

    let view = load_profile(&state.backend, &session).await?;
    Ok(outcome(StatusCode::OK, Role::Doctor, "Profile updated successfully", view))
}
