//! Web-layer error taxonomy and its HTTP mapping.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::backend::BackendError;
use crate::handlers::Notification;
use crate::models::AppointmentStatus;
use crate::session::removal_cookie;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Field-level problems; nothing was sent to the backend.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// Sign-in or sign-up refused by the auth service.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// A data call failed. Only `action` is shown to the user.
    #[error("failed to {action}: {source}")]
    Backend {
        action: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("sign-in required")]
    SignInRequired,
    #[error("session expired")]
    SessionExpired,
    #[error("route belongs to another role")]
    WrongRole { home: &'static str },
    #[error("cannot change status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Maps a backend failure for `action` ("load patients", "delete record").
    /// A rejected token ends the session instead.
    pub fn failed(action: &'static str) -> impl FnOnce(BackendError) -> AppError {
        move |source| match source {
            BackendError::Unauthorized => AppError::SessionExpired,
            source => AppError::Backend { action, source },
        }
    }

    fn notification(&self) -> Option<Notification> {
        let message = match self {
            AppError::Auth(message) => message.clone(),
            AppError::Backend { action, .. } => format!("Failed to {action}"),
            AppError::InvalidTransition { from, to } => {
                format!("An appointment cannot move from {from} to {to}")
            }
            AppError::NotFound => "Page not found".to_string(),
            AppError::Internal(_) => "Something went wrong".to_string(),
            _ => return None,
        };
        Some(Notification::error(message))
    }
}

fn redirect(location: &str) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location));
    builder
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Backend {
                source: BackendError::NotFound,
                ..
            } => StatusCode::NOT_FOUND,
            AppError::Backend { .. } => StatusCode::BAD_GATEWAY,
            AppError::SignInRequired | AppError::SessionExpired | AppError::WrongRole { .. } => {
                StatusCode::SEE_OTHER
            }
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::SignInRequired => return redirect("/").cookie(removal_cookie()).finish(),
            AppError::SessionExpired => {
                warn!("backend rejected session token, signing out");
                return redirect("/").cookie(removal_cookie()).finish();
            }
            AppError::WrongRole { home } => return redirect(home).finish(),
            AppError::Validation(errors) => {
                debug!(count = errors.len(), fields = ?errors.fields().collect::<Vec<_>>(), "form rejected");
                return HttpResponse::build(self.status_code()).json(json!({ "errors": errors }));
            }
            AppError::Backend { action, source } => error!(action, error = %source, "backend call failed"),
            AppError::Internal(detail) => error!(detail = %detail, "internal error"),
            _ => {}
        }
        let body = self.notification().map(|n| json!({ "notification": n }));
        HttpResponse::build(self.status_code()).json(body.unwrap_or_default())
    }
}
