//! The managed backend that owns every row and every account.
//!
//! [`AuthApi`] and [`DataApi`] are the only seams through which the application
//! talks to it. Production uses [`supabase::SupabaseClient`]; tests use an
//! in-memory stand-in that also plays the part of the backend's row policies.

pub mod supabase;

#[cfg(test)]
pub mod memory;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::query::Query;
use crate::schema::Table;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("access token rejected")]
    Unauthorized,
    #[error("no matching row")]
    NotFound,
    #[error("unexpected response from backend: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// Message suitable for showing to a user after a failed sign-in or sign-up.
    /// The backend's own wording is used when it gave one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            BackendError::Status { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// The authenticated user record issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

#[allow(async_fn_in_trait)]
pub trait AuthApi {
    /// Registers an account. `metadata` is stored on the user and read by the
    /// backend's sign-up trigger.
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<(), BackendError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError>;
}

#[allow(async_fn_in_trait)]
pub trait DataApi {
    async fn select(&self, access_token: &str, query: &Query) -> Result<Vec<Value>, BackendError>;

    /// Exact number of rows matching the query's filters.
    async fn count(&self, access_token: &str, query: &Query) -> Result<u64, BackendError>;

    /// Inserts one row and returns it as stored.
    async fn insert(&self, access_token: &str, table: Table, row: Value) -> Result<Value, BackendError>;

    /// Applies `patch` to every row matching the query's filters; returns the
    /// updated rows.
    async fn update(&self, access_token: &str, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError>;

    /// Deletes rows matching the query's filters; returns how many went.
    async fn delete(&self, access_token: &str, query: &Query) -> Result<u64, BackendError>;
}

pub trait Backend: AuthApi + DataApi {}

impl<T: AuthApi + DataApi> Backend for T {}

pub async fn fetch_all<T, B>(backend: &B, token: &str, query: &Query) -> Result<Vec<T>, BackendError>
where
    T: DeserializeOwned,
    B: DataApi,
{
    let rows = backend.select(token, query).await?;
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect()
}

pub async fn fetch_one<T, B>(backend: &B, token: &str, query: Query) -> Result<T, BackendError>
where
    T: DeserializeOwned,
    B: DataApi,
{
    let query = query.limit(1);
    let row = backend
        .select(token, &query)
        .await?
        .into_iter()
        .next()
        .ok_or(BackendError::NotFound)?;
    Ok(serde_json::from_value(row)?)
}

pub async fn insert_row<T, S, B>(backend: &B, token: &str, table: Table, row: &S) -> Result<T, BackendError>
where
    T: DeserializeOwned,
    S: Serialize,
    B: DataApi,
{
    let stored = backend.insert(token, table, serde_json::to_value(row)?).await?;
    Ok(serde_json::from_value(stored)?)
}

/// Updates the rows matched by `query`; an empty match is `NotFound`.
pub async fn update_rows<S, B>(backend: &B, token: &str, query: &Query, patch: &S) -> Result<usize, BackendError>
where
    S: Serialize,
    B: DataApi,
{
    let updated = backend.update(token, query, serde_json::to_value(patch)?).await?;
    if updated.is_empty() {
        return Err(BackendError::NotFound);
    }
    Ok(updated.len())
}

/// Deletes the rows matched by `query`; an empty match is `NotFound`.
pub async fn delete_rows<B>(backend: &B, token: &str, query: &Query) -> Result<u64, BackendError>
where
    B: DataApi,
{
    match backend.delete(token, query).await? {
        0 => Err(BackendError::NotFound),
        n => Ok(n),
    }
}
