//! Veterinary services for patients: animal records, vet bookings and the
//! static emergency and knowledge pages.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use futures::try_join;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::backend::{delete_rows, fetch_all, insert_row, update_rows, Backend};
use crate::content;
use crate::error::AppError;
use crate::handlers::{outcome, page, AppState};
use crate::models::veterinary::{AnimalOption, NewAnimalRecord, NewVetAppointment};
use crate::models::{AnimalRecord, AppointmentStatus, Role, VetAppointment, VeterinaryDoctor};
use crate::query::Query;
use crate::schema::Table;
use crate::session::{PatientSession, SessionContext};
use crate::validation::{AnimalRecordForm, VetBookingForm};

// ─── Vet appointments ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AppointmentsView {
    vets: Vec<VeterinaryDoctor>,
    animals: Vec<AnimalOption>,
    appointments: Vec<VetAppointment>,
}

async fn load_appointments<B: Backend>(backend: &B, session: &SessionContext) -> Result<AppointmentsView, AppError> {
    let vets = Query::from(Table::VeterinaryDoctors).eq("verified", true);
    let animals = Query::from(Table::AnimalHealthRecords)
        .columns(&["id", "animal_id", "species"])
        .eq("patient_id", session.user_id());
    let appointments = Query::from(Table::VetAppointments)
        .embed(Table::VeterinaryDoctors, &["full_name", "specialization"])
        .embed(Table::AnimalHealthRecords, &["animal_id", "species"])
        .eq("patient_id", session.user_id())
        .order("appointment_date", false);
    let (vets, animals, appointments) = try_join!(
        fetch_all::<VeterinaryDoctor, B>(backend, session.token(), &vets),
        fetch_all::<AnimalOption, B>(backend, session.token(), &animals),
        fetch_all::<VetAppointment, B>(backend, session.token(), &appointments),
    )
    .map_err(AppError::failed("load vet appointments"))?;
    Ok(AppointmentsView {
        vets,
        animals,
        appointments,
    })
}

pub async fn appointments<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
) -> Result<HttpResponse, AppError> {
    let view = load_appointments(&state.backend, &session).await?;
    Ok(page(Role::Patient, view))
}

pub async fn book_appointment<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
    form: web::Json<VetBookingForm>,
) -> Result<HttpResponse, AppError> {
    let booking = form.validate()?;
    let row = NewVetAppointment {
        patient_id: session.user_id(),
        vet_id: booking.vet_id,
        animal_id: booking.animal_id,
        appointment_date: booking.date,
        appointment_time: booking.time,
        notes: booking.notes,
        status: AppointmentStatus::Pending,
    };
    let created: VetAppointment = insert_row(&state.backend, session.token(), Table::VetAppointments, &row)
        .await
        .map_err(AppError::failed("book appointment"))?;
    info!(appointment_id = %created.id, vet_id = %created.vet_id, "vet appointment booked");

    let view = load_appointments(&state.backend, &session).await?;
    Ok(outcome(StatusCode::CREATED, Role::Patient, "Appointment booked successfully", view))
}

// ─── Animal records ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AnimalsView {
    animals: Vec<AnimalRecord>,
}

fn own_animal(session: &SessionContext, id: Uuid) -> Query {
    Query::from(Table::AnimalHealthRecords)
        .eq("id", id)
        .eq("patient_id", session.user_id())
}

async fn load_animals<B: Backend>(backend: &B, session: &SessionContext) -> Result<AnimalsView, AppError> {
    let query = Query::from(Table::AnimalHealthRecords)
        .eq("patient_id", session.user_id())
        .order("created_at", false);
    let animals = fetch_all(backend, session.token(), &query)
        .await
        .map_err(AppError::failed("load animal records"))?;
    Ok(AnimalsView { animals })
}

pub async fn animal_records<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
) -> Result<HttpResponse, AppError> {
    let view = load_animals(&state.backend, &session).await?;
    Ok(page(Role::Patient, view))
}

pub async fn create_animal<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
    form: web::Json<AnimalRecordForm>,
) -> Result<HttpResponse, AppError> {
    let row = NewAnimalRecord {
        patient_id: session.user_id(),
        fields: form.validate()?,
    };
    let created: AnimalRecord = insert_row(&state.backend, session.token(), Table::AnimalHealthRecords, &row)
        .await
        .map_err(AppError::failed("add animal record"))?;
    info!(record_id = %created.id, tag = %created.animal_id, "animal record added");

    let view = load_animals(&state.backend, &session).await?;
    Ok(outcome(StatusCode::CREATED, Role::Patient, "Animal record added successfully", view))
}

pub async fn update_animal<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
    id: web::Path<Uuid>,
    form: web::Json<AnimalRecordForm>,
) -> Result<HttpResponse, AppError> {
    let fields = form.validate()?;
    let id = id.into_inner();
    update_rows(&state.backend, session.token(), &own_animal(&session, id), &fields)
        .await
        .map_err(AppError::failed("update animal record"))?;
    info!(record_id = %id, "animal record updated");

    let view = load_animals(&state.backend, &session).await?;
    Ok(outcome(StatusCode::OK, Role::Patient, "Animal record updated successfully", view))
}

pub async fn delete_animal<B: Backend>(
    state: web::Data<AppState<B>>,
    session: PatientSession,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    delete_rows(&state.backend, session.token(), &own_animal(&session, id))
        .await
        .map_err(AppError::failed("delete animal record"))?;
    info!(record_id = %id, "animal record deleted");

    let view = load_animals(&state.backend, &session).await?;
    Ok(outcome(StatusCode::OK, Role::Patient, "Animal record deleted successfully", view))
}

// ─── Static pages ────────────────────────────────────────────────────────────

pub async fn emergency(_session: PatientSession) -> HttpResponse {
    page(Role::Patient, content::EMERGENCY)
}

pub async fn knowledge(_session: PatientSession) -> HttpResponse {
    page(Role::Patient, content::KNOWLEDGE)
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::test::{self, TestRequest};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::handlers::test_support::Harness;
    use crate::schema::Table;

    async fn seed_vet(harness: &Harness, name: &str, verified: bool) -> Value {
        harness
            .backend()
            .seed(
                Table::VeterinaryDoctors,
                json!({
                    "full_name": name,
                    "specialization": "Large Animals",
                    "phone": "9812345678",
                    "verified": verified
                }),
            )
            .await
    }

    async fn seed_animal(harness: &Harness, patient_id: Uuid, tag: &str) -> Value {
        harness
            .backend()
            .seed(
                Table::AnimalHealthRecords,
                json!({ "patient_id": patient_id, "animal_id": tag, "species": "Cow" }),
            )
            .await
    }

    #[actix_web::test]
    async fn animal_record_lifecycle() {
        let harness = Harness::new();
        let (patient_id, cookie) = harness.patient("p@example.com", "Gurpreet Kaur").await;
        let app = test_app!(harness);

        let req = TestRequest::post()
            .uri("/animal-records")
            .cookie(cookie.clone())
            .set_json(json!({
                "animal_id": " COW-001 ",
                "species": "Cow",
                "breed": "Sahiwal",
                "age": "4",
                "last_vaccination": "2024-01-15"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["notification"]["message"], "Animal record added successfully");
        let animal = &body["animals"][0];
        assert_eq!(animal["animal_id"], "COW-001");
        assert_eq!(animal["age"], 4);
        assert_eq!(animal["patient_id"], patient_id.to_string());
        let id = animal["id"].as_str().unwrap().to_string();

        let req = TestRequest::put()
            .uri(&format!("/animal-records/{id}"))
            .cookie(cookie.clone())
            .set_json(json!({
                "animal_id": "COW-001",
                "species": "Cow",
                "current_treatment": "Deworming"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["notification"]["message"], "Animal record updated successfully");
        assert_eq!(body["animals"][0]["current_treatment"], "Deworming");

        let req = TestRequest::delete()
            .uri(&format!("/animal-records/{id}"))
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["notification"]["message"], "Animal record deleted successfully");
        assert!(body["animals"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn animal_without_tag_or_species_is_rejected() {
        let harness = Harness::new();
        let (_, cookie) = harness.patient("p@example.com", "Gurpreet Kaur").await;
        let app = test_app!(harness);
        let req = TestRequest::post()
            .uri("/animal-records")
            .cookie(cookie)
            .set_json(json!({ "animal_id": "   ", "age": "-1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"]["animal_id"], "Animal ID is required");
        assert_eq!(body["errors"]["species"], "Species is required");
        assert_eq!(body["errors"]["age"], "Age cannot be negative");
        assert_eq!(harness.backend().call_count("insert").await, 0);
    }

    #[actix_web::test]
    async fn other_owners_animals_are_invisible_and_untouchable() {
        let harness = Harness::new();
        let (owner_id, _) = harness.patient("owner@example.com", "Harjit Singh").await;
        let (_, cookie) = harness.patient("p@example.com", "Gurpreet Kaur").await;
        let theirs = seed_animal(&harness, owner_id, "BUF-007").await;
        let app = test_app!(harness);

        let req = TestRequest::get().uri("/animal-records").cookie(cookie.clone()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["animals"].as_array().unwrap().is_empty());

        let req = TestRequest::delete()
            .uri(&format!("/animal-records/{}", theirs["id"].as_str().unwrap()))
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(harness.backend().rows(Table::AnimalHealthRecords).await.len(), 1);
    }

    #[actix_web::test]
    async fn vet_booking_starts_pending_with_embeds() {
        let harness = Harness::new();
        let (patient_id, cookie) = harness.patient("p@example.com", "Gurpreet Kaur").await;
        let vet = seed_vet(&harness, "Dr. Balwinder Sandhu", true).await;
        seed_vet(&harness, "Dr. Unverified", false).await;
        let animal = seed_animal(&harness, patient_id, "COW-001").await;
        let app = test_app!(harness);

        let req = TestRequest::get().uri("/veterinary-appointments").cookie(cookie.clone()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["vets"].as_array().unwrap().len(), 1);
        assert_eq!(body["animals"][0]["animal_id"], "COW-001");
        assert!(body["animals"][0].get("breed").is_none());

        let req = TestRequest::post()
            .uri("/veterinary-appointments")
            .cookie(cookie)
            .set_json(json!({
                "vet_id": vet["id"],
                "animal_id": animal["id"],
                "appointment_date": "2030-03-01",
                "appointment_time": "11:15",
                "notes": "Limping on left foreleg"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["notification"]["message"], "Appointment booked successfully");
        let booked = &body["appointments"][0];
        assert_eq!(booked["status"], "pending");
        assert_eq!(booked["appointment_time"], "11:15:00");
        assert_eq!(booked["veterinary_doctors"]["full_name"], "Dr. Balwinder Sandhu");
        assert_eq!(booked["animal_health_records"]["animal_id"], "COW-001");
    }

    #[actix_web::test]
    async fn vet_booking_requires_every_choice() {
        let harness = Harness::new();
        let (_, cookie) = harness.patient("p@example.com", "Gurpreet Kaur").await;
        let app = test_app!(harness);
        let req = TestRequest::post()
            .uri("/veterinary-appointments")
            .cookie(cookie)
            .set_json(json!({ "appointment_date": "2030-03-01" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"]["vet_id"], "Choose a veterinarian");
        assert_eq!(body["errors"]["animal_id"], "Choose an animal");
        assert!(body["errors"].get("appointment_date").is_none());
    }

    #[actix_web::test]
    async fn vet_appointments_list_newest_first() {
        let harness = Harness::new();
        let (patient_id, cookie) = harness.patient("p@example.com", "Gurpreet Kaur").await;
        let vet = seed_vet(&harness, "Dr. Balwinder Sandhu", true).await;
        for date in ["2024-01-10", "2024-05-02", "2024-03-20"] {
            harness
                .backend()
                .seed(
                    Table::VetAppointments,
                    json!({
                        "patient_id": patient_id,
                        "vet_id": vet["id"],
                        "appointment_date": date,
                        "appointment_time": "09:00:00",
                        "status": "completed"
                    }),
                )
                .await;
        }
        let app = test_app!(harness);

        let req = TestRequest::get().uri("/veterinary-appointments").cookie(cookie).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let dates: Vec<_> = body["appointments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["appointment_date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, ["2024-05-02", "2024-03-20", "2024-01-10"]);
    }

    #[actix_web::test]
    async fn failed_load_reports_generic_message() {
        let harness = Harness::new();
        let (_, cookie) = harness.patient("p@example.com", "Gurpreet Kaur").await;
        harness.backend().fail_table(Table::AnimalHealthRecords).await;
        let app = test_app!(harness);
        let req = TestRequest::get().uri("/animal-records").cookie(cookie).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["notification"]["message"], "Failed to load animal records");
    }

    #[actix_web::test]
    async fn static_pages_need_a_patient() {
        let harness = Harness::new();
        let (_, patient) = harness.patient("p@example.com", "Gurpreet Kaur").await;
        let (_, doctor) = harness.doctor("dr@example.com", "Dr. Anjali Mehta").await;
        let app = test_app!(harness);

        let req = TestRequest::get().uri("/veterinary-emergency").cookie(patient.clone()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["helpline"], "+91-9876543210");
        assert!(body["whatsapp_link"].as_str().unwrap().starts_with("https://wa.me/"));
        assert_eq!(body["emergency_signs"].as_array().unwrap().len(), 8);

        let req = TestRequest::get().uri("/veterinary-knowledge").cookie(patient).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["common_diseases"][1]["title"], "Mastitis");

        let req = TestRequest::get().uri("/veterinary-knowledge").cookie(doctor).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/dashboard");
    }
}
