use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::backend::{AuthApi, AuthSession, AuthUser, BackendError, DataApi};
use crate::query::Query;
use crate::schema::Table;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the hosted backend: the REST table API under `/rest/v1` and
/// the auth API under `/auth/v1`.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, BackendError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(SupabaseClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn rest_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("apikey", &self.anon_key).bearer_auth(token)
    }
}

/// Updates and deletes always carry a row filter.
fn require_filter(query: &Query) -> Result<(), BackendError> {
    if query.has_filters() {
        return Ok(());
    }
    Err(BackendError::Status {
        status: 400,
        message: format!("refusing unfiltered write to {}", query.table),
    })
}

/// Total from a `Content-Range` header such as `0-24/57` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// Pulls the human-readable message out of an error body. The auth API uses
/// `msg` or `error_description`, the table API uses `message`.
pub fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

async fn status_error(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let mut message = error_message(&body);
    if message.is_empty() {
        message = status.canonical_reason().unwrap_or("request failed").to_string();
    }
    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Error mapping for table calls: a rejected token is reported separately so
/// the caller can end the session.
async fn data_error(response: Response) -> BackendError {
    if response.status() == StatusCode::UNAUTHORIZED {
        return BackendError::Unauthorized;
    }
    status_error(response).await
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl AuthApi for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<(), BackendError> {
        debug!(email, "signing up");
        let response = self
            .authed(self.http.post(self.auth_url("signup")), &self.anon_key)
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        debug!(email, "signing in");
        let response = self
            .authed(self.http.post(self.auth_url("token")), &self.anon_key)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        read_json(response).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .authed(self.http.post(self.auth_url("logout")), access_token)
            .send()
            .await?;
        // An already-expired token has nothing left to revoke.
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(status_error(response).await)
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let response = self
            .authed(self.http.get(self.auth_url("user")), access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(data_error(response).await);
        }
        read_json(response).await
    }
}

impl DataApi for SupabaseClient {
    async fn select(&self, access_token: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        debug!(table = %query.table, query = %query.to_query_string(), "select");
        let response = self
            .authed(self.http.get(self.rest_url(query.table)), access_token)
            .query(&query.to_params())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(data_error(response).await);
        }
        read_json(response).await
    }

    async fn count(&self, access_token: &str, query: &Query) -> Result<u64, BackendError> {
        let mut params = query.filter_params();
        params.push(("select".to_string(), "id".to_string()));
        let response = self
            .authed(self.http.head(self.rest_url(query.table)), access_token)
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(data_error(response).await);
        }
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .and_then(parse_content_range_total);
        match total {
            Some(n) => Ok(n),
            None => {
                warn!(table = %query.table, "count response had no usable Content-Range");
                Err(BackendError::Status {
                    status: response.status().as_u16(),
                    message: "missing row count".into(),
                })
            }
        }
    }

    async fn insert(&self, access_token: &str, table: Table, row: Value) -> Result<Value, BackendError> {
        debug!(%table, "insert");
        let response = self
            .authed(self.http.post(self.rest_url(table)), access_token)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(data_error(response).await);
        }
        let mut rows: Vec<Value> = read_json(response).await?;
        if rows.is_empty() {
            return Err(BackendError::NotFound);
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(&self, access_token: &str, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError> {
        debug!(table = %query.table, "update");
        require_filter(query)?;
        let response = self
            .authed(self.http.patch(self.rest_url(query.table)), access_token)
            .header("Prefer", "return=representation")
            .query(&query.filter_params())
            .json(&patch)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(data_error(response).await);
        }
        read_json(response).await
    }

    async fn delete(&self, access_token: &str, query: &Query) -> Result<u64, BackendError> {
        debug!(table = %query.table, "delete");
        require_filter(query)?;
        let response = self
            .authed(self.http.delete(self.rest_url(query.table)), access_token)
            .header("Prefer", "return=representation")
            .query(&query.filter_params())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(data_error(response).await);
        }
        let rows: Vec<Value> = read_json(response).await?;
        Ok(rows.len() as u64)
    }
}
