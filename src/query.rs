//! Read/filter descriptions for the backend's auto-generated table API.
//!
//! A [`Query`] renders to PostgREST query parameters, e.g.
//! `select=*,doctors(full_name)&patient_id=eq.<id>&order=appointment_date.asc`.
//! The same value is used as the row filter for updates and deletes.

use crate::schema::Table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    IsNull(String),
    NotNull(String),
}

/// A related table pulled in through a foreign key, rendered as `table(cols)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub table: Table,
    pub columns: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: Table,
    pub columns: Vec<&'static str>,
    pub embeds: Vec<Embed>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn from(table: Table) -> Self {
        Query {
            table,
            columns: Vec::new(),
            embeds: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn embed(mut self, table: Table, columns: &[&'static str]) -> Self {
        self.embeds.push(Embed {
            table,
            columns: columns.to_vec(),
        });
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::IsNull(column.to_string()));
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::NotNull(column.to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn select_clause(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.embeds.len());
        if self.columns.is_empty() {
            parts.push("*".to_string());
        } else {
            parts.push(self.columns.join(","));
        }
        for embed in &self.embeds {
            let cols = if embed.columns.is_empty() {
                "*".to_string()
            } else {
                embed.columns.join(",")
            };
            parts.push(format!("{}({})", embed.table.name(), cols));
        }
        parts.join(",")
    }

    /// Query parameters for a read. Values are left unescaped; the HTTP client
    /// encodes them.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select_clause())];
        params.extend(self.filter_params());
        if let Some(order) = &self.order {
            let dir = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Only the row filters, for update and delete requests.
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|f| match f {
                Filter::Eq(col, val) => (col.clone(), format!("eq.{val}")),
                Filter::IsNull(col) => (col.clone(), "is.null".to_string()),
                Filter::NotNull(col) => (col.clone(), "not.is.null".to_string()),
            })
            .collect()
    }

    pub fn to_query_string(&self) -> String {
        self.to_params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}
