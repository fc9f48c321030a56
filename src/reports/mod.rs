//! Aggregate reports
//!
//! Read-only `GROUP BY` / `JOIN` / `LIMIT` queries behind every dashboard
//! chart and table. Each function takes a borrowed connection and returns
//! fully materialized rows.

pub mod appointments;
pub mod doctors;
pub mod patients;
pub mod services;

use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;

use crate::db::DbResult;
use crate::filter::FilterClause;

/// Top-N sizes used by the dashboard
pub const TOP_DOCTORS: usize = 5;
pub const TOP_PATIENTS: usize = 5;
pub const TOP_SERVICES: usize = 10;

/// Label for a NULL category; NULLs group together under it
pub const MISSING_LABEL: &str = "(sin valor)";

/// A category label with its row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledCount {
    pub label: String,
    pub count: i64,
}

impl LabeledCount {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            label: row
                .get::<_, Option<String>>(0)?
                .unwrap_or_else(|| MISSING_LABEL.to_string()),
            count: row.get(1)?,
        })
    }
}

/// Run a query whose `WHERE` comes from a filter clause
///
/// `head` holds everything up to the `WHERE`, `tail` everything after it.
pub(crate) fn query_filtered<T, F>(
    conn: &Connection,
    head: &str,
    clause: &FilterClause,
    tail: &str,
    map: F,
) -> DbResult<Vec<T>>
where
    F: FnMut(&Row) -> rusqlite::Result<T>,
{
    let sql = format!("{}{} {}", head, clause.where_sql(), tail);
    tracing::debug!(sql = %sql, params = clause.params().len(), "report query");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(clause.params()), map)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Run a parameterless query
pub(crate) fn query_all<T, F>(conn: &Connection, sql: &str, map: F) -> DbResult<Vec<T>>
where
    F: FnMut(&Row) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
