//! Identity and session handling.
//!
//! The backend issues the access token; this module only carries it. A
//! [`SessionContext`] is sealed into an HTTP-only cookie after sign-in, opened
//! again by the extractors below on every guarded request, and removed on
//! sign-out.

use std::ops::Deref;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{fetch_one, AuthSession, AuthUser, Backend, BackendError};
use crate::crypto::SessionKey;
use crate::error::AppError;
use crate::models::identity::UserRoleRow;
use crate::models::Role;
use crate::nav::{guard, guard_role, Access, AppRoute};
use crate::query::Query;
use crate::schema::Table;
use crate::validation::{DoctorSignUp, DoctorSignUpForm, PatientSignUp, PatientSignUpForm, SignInForm};

pub const SESSION_COOKIE: &str = "arogya_session";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
    /// `None` when the account has neither a role row nor a role claim.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionContext {
    pub identity: Identity,
    pub access_token: String,
}

impl SessionContext {
    pub fn user_id(&self) -> Uuid {
        self.identity.id
    }

    pub fn token(&self) -> &str {
        &self.access_token
    }

    pub fn seal(&self, key: &SessionKey) -> anyhow::Result<String> {
        key.seal(&serde_json::to_vec(self)?)
    }

    pub fn open(key: &SessionKey, sealed: &str) -> anyhow::Result<Self> {
        let bytes = key.open(sealed)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn cookie(&self, key: &SessionKey, secure: bool) -> Result<Cookie<'static>, AppError> {
        let sealed = self
            .seal(key)
            .map_err(|e| AppError::Internal(format!("sealing session: {e}")))?;
        Ok(Cookie::build(SESSION_COOKIE, sealed)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .finish())
    }
}

/// A cookie that clears the session cookie in the browser.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

fn session_from_request(req: &HttpRequest) -> Result<SessionContext, AppError> {
    let key = req
        .app_data::<web::Data<SessionKey>>()
        .ok_or_else(|| AppError::Internal("session key not registered".into()))?;
    let cookie = req.cookie(SESSION_COOKIE).ok_or(AppError::SignInRequired)?;
    SessionContext::open(key, cookie.value()).map_err(|e| {
        debug!(error = %e, "discarding unreadable session cookie");
        AppError::SignInRequired
    })
}

/// Checks the session against the route table. Paths the table does not know
/// are held to `role`.
fn require_role(req: &HttpRequest, role: Role) -> Result<SessionContext, AppError> {
    let session = session_from_request(req)?;
    let access = match AppRoute::from_path(req.path()) {
        AppRoute::NotFound => guard_role(role, Some(&session)),
        route => guard(route, Some(&session)),
    };
    match access {
        Access::Allow => Ok(session),
        Access::SignIn => Err(AppError::SignInRequired),
        Access::RedirectHome(home) => {
            debug!(user_id = %session.user_id(), path = req.path(), home, "role mismatch");
            Err(AppError::WrongRole { home })
        }
    }
}

impl FromRequest for SessionContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(session_from_request(req))
    }
}

/// A session whose identity has the doctor role.
#[derive(Debug, Clone)]
pub struct DoctorSession(pub SessionContext);

/// A session whose identity has the patient role.
#[derive(Debug, Clone)]
pub struct PatientSession(pub SessionContext);

impl FromRequest for DoctorSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(require_role(req, Role::Doctor).map(DoctorSession))
    }
}

impl FromRequest for PatientSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(require_role(req, Role::Patient).map(PatientSession))
    }
}

impl Deref for DoctorSession {
    type Target = SessionContext;
    fn deref(&self) -> &SessionContext {
        &self.0
    }
}

impl Deref for PatientSession {
    type Target = SessionContext;
    fn deref(&self) -> &SessionContext {
        &self.0
    }
}

/// Role claim written into the user's metadata at sign-up.
pub fn metadata_role(user: &AuthUser) -> Option<Role> {
    user.user_metadata
        .get("role")
        .and_then(Value::as_str)
        .and_then(Role::parse)
}

fn doctor_metadata(form: &DoctorSignUp) -> Value {
    json!({
        "full_name": form.full_name,
        "medical_license": form.medical_license,
        "specialization": form.specialization,
        "role": Role::Doctor,
    })
}

fn patient_metadata(form: &PatientSignUp) -> Value {
    json!({
        "full_name": form.full_name,
        "age": form.age,
        "gender": form.gender,
        "phone": form.phone,
        "address": form.address,
        "role": Role::Patient,
    })
}

/// Sign-in, sign-up and sign-out against the auth service. Every operation
/// validates its form first and makes no call when validation fails.
pub struct SessionProvider<'a, B> {
    backend: &'a B,
}

impl<'a, B: Backend> SessionProvider<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        SessionProvider { backend }
    }

    pub async fn sign_in(&self, form: &SignInForm) -> Result<SessionContext, AppError> {
        let credentials = form.validate()?;
        let session = self
            .backend
            .sign_in_with_password(&credentials.email, &credentials.password)
            .await
            .map_err(|e| {
                warn!(email = %credentials.email, error = %e, "sign-in refused");
                AppError::Auth(e.user_message("Failed to sign in"))
            })?;
        let role = self.resolve_role(&session).await;
        info!(user_id = %session.user.id, role = ?role, "signed in");
        Ok(SessionContext {
            identity: Identity {
                id: session.user.id,
                email: session.user.email.clone(),
                role,
            },
            access_token: session.access_token,
        })
    }

    /// Role from `user_roles`, falling back to the sign-up role claim.
    pub async fn resolve_role(&self, session: &AuthSession) -> Option<Role> {
        let query = Query::from(Table::UserRoles)
            .columns(&["role"])
            .eq("user_id", session.user.id);
        match fetch_one::<UserRoleRow, _>(self.backend, &session.access_token, query).await {
            Ok(row) => Some(row.role),
            Err(BackendError::NotFound) => metadata_role(&session.user),
            Err(e) => {
                warn!(user_id = %session.user.id, error = %e, "role lookup failed, using sign-up claim");
                metadata_role(&session.user)
            }
        }
    }

    pub async fn sign_up_doctor(&self, form: &DoctorSignUpForm) -> Result<(), AppError> {
        let sign_up = form.validate()?;
        self.register(&sign_up.credentials.email, &sign_up.credentials.password, doctor_metadata(&sign_up))
            .await
    }

    pub async fn sign_up_patient(&self, form: &PatientSignUpForm) -> Result<(), AppError> {
        let sign_up = form.validate()?;
        self.register(&sign_up.credentials.email, &sign_up.credentials.password, patient_metadata(&sign_up))
            .await
    }

    async fn register(&self, email: &str, password: &str, metadata: Value) -> Result<(), AppError> {
        self.backend
            .sign_up(email, password, metadata)
            .await
            .map_err(|e| {
                warn!(email, error = %e, "sign-up refused");
                AppError::Auth(e.user_message("Failed to create account"))
            })?;
        info!(email, "account created");
        Ok(())
    }

    /// Whether the auth service still accepts the session's token. Only a
    /// rejected token counts as dead; an unreachable service does not.
    pub async fn is_live(&self, session: &SessionContext) -> bool {
        match self.backend.get_user(session.token()).await {
            Ok(_) => true,
            Err(BackendError::Unauthorized) => {
                debug!(user_id = %session.user_id(), "stored session no longer accepted");
                false
            }
            Err(e) => {
                warn!(user_id = %session.user_id(), error = %e, "could not verify session");
                true
            }
        }
    }

    /// Revokes the token with the auth service. A failure is logged only; the
    /// caller drops the cookie regardless.
    pub async fn sign_out(&self, session: &SessionContext) {
        match self.backend.sign_out(session.token()).await {
            Ok(()) => info!(user_id = %session.user_id(), "signed out"),
            Err(e) => warn!(user_id = %session.user_id(), error = %e, "sign-out call failed"),
        }
    }
}
