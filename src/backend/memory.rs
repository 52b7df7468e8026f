//! In-process stand-in for the managed backend, used by tests.
//!
//! Rows are JSON objects kept per table. Reads and writes are limited to rows
//! whose owner column matches the caller, as the hosted row policies would do,
//! and sign-up creates the `doctors` / `patient_profiles` / `user_roles` rows the
//! hosted sign-up trigger creates. Every call is logged as `"<op> <table>"` so
//! tests can assert which calls were made.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::{AuthApi, AuthSession, AuthUser, BackendError, DataApi};
use crate::query::{Filter, Query};
use crate::schema::{relationship, Table};

struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Default)]
struct State {
    tables: HashMap<Table, Vec<Value>>,
    accounts: Vec<Account>,
    tokens: HashMap<String, Uuid>,
    failing: HashSet<Table>,
    calls: Vec<String>,
}

impl State {
    fn caller(&self, token: &str) -> Result<Uuid, BackendError> {
        self.tokens.get(token).copied().ok_or(BackendError::Unauthorized)
    }

    fn check_failing(&self, table: Table) -> Result<(), BackendError> {
        if self.failing.contains(&table) {
            return Err(BackendError::Status {
                status: 500,
                message: format!("simulated failure on {table}"),
            });
        }
        Ok(())
    }

    fn insert_row(&mut self, table: Table, mut row: Value) -> Value {
        let now = Utc::now().to_rfc3339();
        if let Some(obj) = row.as_object_mut() {
            obj.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
            obj.entry("created_at").or_insert_with(|| json!(now));
            if table != Table::UserRoles {
                obj.entry("updated_at").or_insert_with(|| json!(now));
            }
        }
        self.tables.entry(table).or_default().push(row.clone());
        row
    }
}

pub struct MemoryBackend {
    state: Mutex<State>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend {
            state: Mutex::new(State::default()),
        }
    }

    /// Stores a row directly, bypassing policies. Fills `id` and timestamps.
    pub async fn seed(&self, table: Table, row: Value) -> Value {
        self.state.lock().await.insert_row(table, row)
    }

    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.state.lock().await.tables.get(&table).cloned().unwrap_or_default()
    }

    /// Makes every data call on `table` fail with a server error.
    pub async fn fail_table(&self, table: Table) {
        self.state.lock().await.failing.insert(table);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    pub async fn call_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Creates an account and returns a live access token for it.
    pub async fn register(&self, email: &str, metadata: Value) -> (Uuid, String) {
        self.sign_up(email, "secret123", metadata)
            .await
            .expect("memory sign-up succeeds");
        let session = self
            .sign_in_with_password(email, "secret123")
            .await
            .expect("memory sign-in succeeds");
        self.state.lock().await.calls.clear();
        (session.user.id, session.access_token)
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches_filters(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| match f {
        Filter::Eq(col, val) => row.get(col).and_then(text_of).as_deref() == Some(val.as_str()),
        Filter::IsNull(col) => row.get(col).is_none_or(Value::is_null),
        Filter::NotNull(col) => row.get(col).is_some_and(|v| !v.is_null()),
    })
}

fn owned_by(table: Table, row: &Value, caller: Uuid) -> bool {
    let id = caller.to_string();
    table
        .owner_columns()
        .iter()
        .any(|col| row.get(*col).and_then(Value::as_str) == Some(id.as_str()))
}

fn readable(table: Table, row: &Value, caller: Uuid) -> bool {
    table.publicly_readable() || owned_by(table, row, caller)
}

fn compare_json(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => text_of(a).cmp(&text_of(b)),
    }
}

/// Postgres default null placement: last when ascending, first when descending.
fn sort_rows(rows: &mut [Value], column: &str, ascending: bool) {
    rows.sort_by(|a, b| {
        let x = a.get(column).filter(|v| !v.is_null());
        let y = b.get(column).filter(|v| !v.is_null());
        match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => if ascending { Ordering::Greater } else { Ordering::Less },
            (Some(_), None) => if ascending { Ordering::Less } else { Ordering::Greater },
            (Some(x), Some(y)) => {
                let ord = compare_json(x, y);
                if ascending { ord } else { ord.reverse() }
            }
        }
    });
}

fn project(row: &Value, columns: &[&str]) -> Value {
    if columns.is_empty() || columns == ["*"] {
        return row.clone();
    }
    let mut out = Map::new();
    for col in columns {
        if let Some(v) = row.get(*col) {
            out.insert(col.to_string(), v.clone());
        }
    }
    Value::Object(out)
}

impl AuthApi for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push("auth sign_up".into());
        if state
            .accounts
            .iter()
            .any(|a| a.user.email.as_deref() == Some(email))
        {
            return Err(BackendError::Status {
                status: 422,
                message: "User already registered".into(),
            });
        }

        let id = Uuid::new_v4();
        let meta = |key: &str| metadata.get(key).cloned().unwrap_or(Value::Null);
        match metadata.get("role").and_then(Value::as_str) {
            Some("doctor") => {
                state.insert_row(
                    Table::Doctors,
                    json!({
                        "id": id,
                        "full_name": meta("full_name"),
                        "medical_license": meta("medical_license"),
                        "specialization": meta("specialization"),
                        "experience_years": 0,
                        "consultation_fee": 0,
                        "languages": [],
                        "verified": false,
                        "avatar_url": null
                    }),
                );
                state.insert_row(Table::UserRoles, json!({ "user_id": id, "role": "doctor" }));
            }
            Some("patient") => {
                state.insert_row(
                    Table::PatientProfiles,
                    json!({
                        "id": id,
                        "full_name": meta("full_name"),
                        "age": meta("age"),
                        "gender": meta("gender"),
                        "phone": meta("phone"),
                        "address": meta("address"),
                        "allergies": [],
                        "current_medications": [],
                        "medical_history": []
                    }),
                );
                state.insert_row(Table::UserRoles, json!({ "user_id": id, "role": "patient" }));
            }
            _ => {}
        }

        state.accounts.push(Account {
            user: AuthUser {
                id,
                email: Some(email.to_string()),
                user_metadata: metadata,
            },
            password: password.to_string(),
        });
        Ok(())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push("auth sign_in".into());
        let user = state
            .accounts
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
            .map(|a| a.user.clone())
            .ok_or_else(|| BackendError::Status {
                status: 400,
                message: "Invalid login credentials".into(),
            })?;
        let token = Uuid::new_v4().to_string();
        state.tokens.insert(token.clone(), user.id);
        Ok(AuthSession {
            access_token: token,
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push("auth sign_out".into());
        state.tokens.remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let state = self.state.lock().await;
        let id = state.caller(access_token)?;
        state
            .accounts
            .iter()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
            .ok_or(BackendError::Unauthorized)
    }
}

impl DataApi for MemoryBackend {
    async fn select(&self, access_token: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("select {}", query.table));
        let caller = state.caller(access_token)?;
        state.check_failing(query.table)?;

        let mut rows: Vec<Value> = state
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| readable(query.table, r, caller))
                    .filter(|r| matches_filters(r, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            sort_rows(&mut rows, &order.column, order.ascending);
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut shaped = project(&row, &query.columns);
            for embed in &query.embeds {
                let related = relationship(query.table, embed.table)
                    .and_then(|rel| row.get(rel.column).and_then(text_of))
                    .and_then(|fk| {
                        state.tables.get(&embed.table).and_then(|target| {
                            target
                                .iter()
                                .find(|t| t.get("id").and_then(text_of).as_deref() == Some(fk.as_str()))
                        })
                    })
                    .map(|t| project(t, &embed.columns))
                    .unwrap_or(Value::Null);
                if let Some(obj) = shaped.as_object_mut() {
                    obj.insert(embed.table.name().to_string(), related);
                }
            }
            out.push(shaped);
        }
        Ok(out)
    }

    async fn count(&self, access_token: &str, query: &Query) -> Result<u64, BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("count {}", query.table));
        let caller = state.caller(access_token)?;
        state.check_failing(query.table)?;
        let n = state
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| readable(query.table, r, caller) && matches_filters(r, &query.filters))
                    .count()
            })
            .unwrap_or(0);
        Ok(n as u64)
    }

    async fn insert(&self, access_token: &str, table: Table, row: Value) -> Result<Value, BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("insert {table}"));
        let caller = state.caller(access_token)?;
        state.check_failing(table)?;
        if !owned_by(table, &row, caller) {
            return Err(BackendError::Status {
                status: 403,
                message: format!("new row violates row-level security policy for table \"{table}\""),
            });
        }
        Ok(state.insert_row(table, row))
    }

    async fn update(&self, access_token: &str, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("update {}", query.table));
        let caller = state.caller(access_token)?;
        state.check_failing(query.table)?;
        let now = Utc::now().to_rfc3339();
        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(&query.table) {
            for row in rows.iter_mut() {
                if !owned_by(query.table, row, caller) || !matches_filters(row, &query.filters) {
                    continue;
                }
                if let (Some(obj), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
                    for (k, v) in changes {
                        obj.insert(k.clone(), v.clone());
                    }
                    obj.insert("updated_at".into(), json!(now));
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, access_token: &str, query: &Query) -> Result<u64, BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("delete {}", query.table));
        let caller = state.caller(access_token)?;
        state.check_failing(query.table)?;
        let Some(rows) = state.tables.get_mut(&query.table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !(owned_by(query.table, row, caller) && matches_filters(row, &query.filters)));
        Ok((before - rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fetch_all;

    #[tokio::test]
    async fn sign_up_runs_profile_trigger() {
        let backend = MemoryBackend::new();
        let (id, token) = backend
            .register("dr@example.com", json!({ "role": "doctor", "full_name": "Dr. A Mehta" }))
            .await;
        let q = Query::from(Table::Doctors).eq("id", id);
        let rows = backend.select(&token, &q).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["full_name"], "Dr. A Mehta");
        let roles = backend.rows(Table::UserRoles).await;
        assert_eq!(roles[0]["role"], "doctor");
    }

    #[tokio::test]
    async fn rows_are_scoped_to_owner() {
        let backend = MemoryBackend::new();
        let (a, token_a) = backend.register("a@example.com", json!({ "role": "doctor" })).await;
        let (_b, token_b) = backend.register("b@example.com", json!({ "role": "doctor" })).await;
        backend
            .insert(&token_a, Table::Patients, json!({ "doctor_id": a, "full_name": "X" }))
            .await
            .unwrap();

        let q = Query::from(Table::Patients);
        assert_eq!(backend.select(&token_a, &q).await.unwrap().len(), 1);
        assert!(backend.select(&token_b, &q).await.unwrap().is_empty());
        assert_eq!(backend.delete(&token_b, &q).await.unwrap(), 0);

        let err = backend
            .insert(&token_b, Table::Patients, json!({ "doctor_id": a, "full_name": "Y" }))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn ordering_places_nulls_like_postgres() {
        let backend = MemoryBackend::new();
        let (a, token) = backend.register("a@example.com", json!({ "role": "doctor" })).await;
        for (name, date) in [("A", json!("2024-01-02")), ("B", Value::Null), ("C", json!("2024-03-01"))] {
            backend
                .seed(Table::Patients, json!({ "doctor_id": a, "full_name": name, "last_visit_date": date }))
                .await;
        }
        let desc = backend
            .select(&token, &Query::from(Table::Patients).order("last_visit_date", false))
            .await
            .unwrap();
        let names: Vec<_> = desc.iter().map(|r| r["full_name"].as_str().unwrap()).collect();
        assert_eq!(names, ["B", "C", "A"]);

        let asc = backend
            .select(&token, &Query::from(Table::Patients).order("last_visit_date", true))
            .await
            .unwrap();
        let names: Vec<_> = asc.iter().map(|r| r["full_name"].as_str().unwrap()).collect();
        assert_eq!(names, ["A", "C", "B"]);
    }

    #[tokio::test]
    async fn embeds_follow_foreign_keys() {
        let backend = MemoryBackend::new();
        let (doctor, _) = backend
            .register("dr@example.com", json!({ "role": "doctor", "full_name": "Dr. Mehta", "specialization": "GP" }))
            .await;
        let (patient, token) = backend.register("p@example.com", json!({ "role": "patient" })).await;
        backend
            .seed(Table::PatientAppointments, json!({ "patient_id": patient, "doctor_id": doctor }))
            .await;
        let q = Query::from(Table::PatientAppointments).embed(Table::Doctors, &["full_name"]);
        let rows: Vec<Value> = fetch_all(&backend, &token, &q).await.unwrap();
        assert_eq!(rows[0]["doctors"], json!({ "full_name": "Dr. Mehta" }));
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let backend = MemoryBackend::new();
        let err = backend.select("stale", &Query::from(Table::Patients)).await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized));
    }
}
