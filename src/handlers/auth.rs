use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::backend::Backend;
use crate::config::APP_NAME;
use crate::crypto::SessionKey;
use crate::error::AppError;
use crate::handlers::{AppState, Notification};
use crate::models::Role;
use crate::nav::{home_for, AppRoute};
use crate::session::{removal_cookie, SessionContext, SessionProvider};
use crate::validation::{DoctorSignUpForm, PatientSignUpForm, SignInForm};

const ACCOUNT_CREATED: &str = "Account created successfully! Please sign in.";

fn see_other(location: &str) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location));
    builder
}

/// Role selection and sign-in. A live session with a role goes straight home;
/// a session the auth service has dropped is cleared.
pub async fn index<B: Backend>(
    state: web::Data<AppState<B>>,
    session: Option<SessionContext>,
) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    if let Some(session) = session {
        if !SessionProvider::new(&state.backend).is_live(&session).await {
            response.cookie(removal_cookie());
        } else if let Some(role) = session.identity.role {
            return see_other(home_for(role)).finish();
        }
    }
    response.json(json!({
        "app": APP_NAME,
        "roles": [Role::Doctor, Role::Patient],
        "sign_in": "/auth/sign-in",
        "sign_up": {
            "doctor": "/auth/sign-up/doctor",
            "patient": "/auth/sign-up/patient",
        },
    }))
}

pub async fn sign_in<B: Backend>(
    state: web::Data<AppState<B>>,
    key: web::Data<SessionKey>,
    form: web::Json<SignInForm>,
) -> Result<HttpResponse, AppError> {
    let session = SessionProvider::new(&state.backend).sign_in(&form).await?;
    let cookie = session.cookie(&key, state.secure_cookies)?;
    let home = session
        .identity
        .role
        .map(home_for)
        .unwrap_or(AppRoute::Auth.path());
    Ok(see_other(home).cookie(cookie).finish())
}

pub async fn sign_up_doctor<B: Backend>(
    state: web::Data<AppState<B>>,
    form: web::Json<DoctorSignUpForm>,
) -> Result<HttpResponse, AppError> {
    SessionProvider::new(&state.backend).sign_up_doctor(&form).await?;
    Ok(HttpResponse::Created().json(json!({ "notification": Notification::success(ACCOUNT_CREATED) })))
}

pub async fn sign_up_patient<B: Backend>(
    state: web::Data<AppState<B>>,
    form: web::Json<PatientSignUpForm>,
) -> Result<HttpResponse, AppError> {
    SessionProvider::new(&state.backend).sign_up_patient(&form).await?;
    Ok(HttpResponse::Created().json(json!({ "notification": Notification::success(ACCOUNT_CREATED) })))
}

pub async fn sign_out<B: Backend>(
    state: web::Data<AppState<B>>,
    session: Option<SessionContext>,
) -> HttpResponse {
    if let Some(session) = session {
        SessionProvider::new(&state.backend).sign_out(&session).await;
    }
    see_other(AppRoute::Auth.path()).cookie(removal_cookie()).finish()
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::{header, StatusCode};
    use actix_web::test::{self, TestRequest};
    use serde_json::{json, Value};

    use crate::handlers::test_support::Harness;
    use crate::session::SESSION_COOKIE;

    fn session_cookie<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.into_owned())
    }

    #[actix_web::test]
    async fn doctor_signs_up_then_signs_in() {
        let harness = Harness::new();
        let app = test_app!(harness);

        let req = TestRequest::post()
            .uri("/auth/sign-up/doctor")
            .set_json(json!({
                "email": "anjali@example.com",
                "password": "secret1",
                "full_name": "Dr. Anjali Mehta",
                "medical_license": "PB-2019-4471",
                "specialization": "General Medicine"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["notification"]["message"], "Account created successfully! Please sign in.");

        let req = TestRequest::post()
            .uri("/auth/sign-in")
            .set_json(json!({ "email": "anjali@example.com", "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/dashboard");
        let cookie = session_cookie(&resp).expect("session cookie set");

        let req = TestRequest::get().uri("/dashboard").cookie(cookie.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["doctor_name"], "Mehta");

        let req = TestRequest::get().uri("/").cookie(cookie).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/dashboard");
    }

    #[actix_web::test]
    async fn short_password_blocks_sign_up() {
        let harness = Harness::new();
        let app = test_app!(harness);
        let req = TestRequest::post()
            .uri("/auth/sign-up/patient")
            .set_json(json!({
                "email": "p@example.com",
                "password": "12345",
                "full_name": "Gurpreet Kaur",
                "age": "34",
                "gender": "Female",
                "phone": "9876543210"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"]["password"], "Password must be at least 6 characters");
        assert!(harness.backend().calls().await.is_empty());
    }

    #[actix_web::test]
    async fn wrong_password_returns_service_message() {
        let harness = Harness::new();
        harness.patient("p@example.com", "Gurpreet Kaur").await;
        let app = test_app!(harness);
        let req = TestRequest::post()
            .uri("/auth/sign-in")
            .set_json(json!({ "email": "p@example.com", "password": "wrong-password" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&resp).is_none());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["notification"]["message"], "Invalid login credentials");
    }

    #[actix_web::test]
    async fn sign_out_revokes_token_and_clears_cookie() {
        let harness = Harness::new();
        let (_, cookie) = harness.patient("p@example.com", "Gurpreet Kaur").await;
        let app = test_app!(harness);

        let req = TestRequest::post().uri("/auth/sign-out").cookie(cookie.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(session_cookie(&resp).unwrap().value(), "");
        assert_eq!(harness.backend().call_count("auth sign_out").await, 1);

        // The old cookie still opens, but the backend no longer accepts its token.
        let req = TestRequest::get().uri("/patient-dashboard").cookie(cookie).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[actix_web::test]
    async fn revoked_session_at_index_is_cleared() {
        let harness = Harness::new();
        let (_, cookie) = harness.doctor("dr@example.com", "Dr. Anjali Mehta").await;
        let app = test_app!(harness);

        let req = TestRequest::post().uri("/auth/sign-out").cookie(cookie.clone()).to_request();
        test::call_service(&app, req).await;

        let resp = test::call_service(&app, TestRequest::get().uri("/").cookie(cookie).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(session_cookie(&resp).unwrap().value(), "");
    }

    #[actix_web::test]
    async fn index_lists_roles_when_signed_out() {
        let harness = Harness::new();
        let app = test_app!(harness);
        let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["roles"], json!(["doctor", "patient"]));
        assert_eq!(body["app"], "NabhaArogya");
    }
}
